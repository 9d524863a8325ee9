//! Shared numeric building blocks for the indicator family.
//!
//! All series functions are whole-series transforms over `&[f64]`, aligned
//! index-for-index with their input. NaN marks "not defined yet"; comparisons
//! against NaN are false, so crossing detection stays quiet through warmup.

/// Simple moving average with a minimum window of one: every index averages
/// the most recent `min(i + 1, period)` values, so there is no NaN warmup.
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }
        let window = (i + 1).min(period);
        out.push(sum / window as f64);
    }
    out
}

/// Simple moving average requiring a full window: NaN for the first
/// `period - 1` indices.
pub fn sma_strict(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    let mut sum: f64 = values[..period].iter().sum();
    out[period - 1] = sum / period as f64;
    for i in period..values.len() {
        sum += values[i] - values[i - period];
        out[i] = sum / period as f64;
    }
    out
}

/// Span-based exponential moving average with normalized weights
/// (`alpha = 2 / (span + 1)`): each value is the alpha-decayed weighted mean
/// of all observations so far, so early values are unbiased rather than
/// seeded from an SMA. Leading NaNs pass through; the recursion starts at the
/// first finite value.
pub fn ewm_mean(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if span == 0 {
        return out;
    }
    let decay = 1.0 - 2.0 / (span as f64 + 1.0);
    let mut num = 0.0;
    let mut den = 0.0;
    let mut started = false;
    for (i, &v) in values.iter().enumerate() {
        if !started {
            if v.is_nan() {
                continue;
            }
            started = true;
        }
        num = v + decay * num;
        den = 1.0 + decay * den;
        out[i] = num / den;
    }
    out
}

/// Rolling sample standard deviation (n - 1 denominator) over a full window:
/// NaN for the first `period - 1` indices.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period < 2 || values.len() < period {
        return out;
    }
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        let mean: f64 = window.iter().sum::<f64>() / period as f64;
        let var: f64 =
            window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        out[i] = var.sqrt();
    }
    out
}

/// Daily log returns `ln(v[t] / v[t-1])`; NaN at index 0.
pub fn log_returns(values: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        out[i] = (values[i] / values[i - 1]).ln();
    }
    out
}

/// Strict crossing above: true at `t` iff `s1[t] > s2[t]` and
/// `s1[t-1] <= s2[t-1]`. False at index 0 and wherever an operand is NaN.
pub fn crossed_above(s1: &[f64], s2: &[f64]) -> Vec<bool> {
    crossing(s1, s2, |a, b| a > b, |a, b| a <= b)
}

/// Strict crossing below: true at `t` iff `s1[t] < s2[t]` and
/// `s1[t-1] >= s2[t-1]`.
pub fn crossed_below(s1: &[f64], s2: &[f64]) -> Vec<bool> {
    crossing(s1, s2, |a, b| a < b, |a, b| a >= b)
}

fn crossing(
    s1: &[f64],
    s2: &[f64],
    now: fn(f64, f64) -> bool,
    before: fn(f64, f64) -> bool,
) -> Vec<bool> {
    debug_assert_eq!(s1.len(), s2.len());
    let mut out = vec![false; s1.len()];
    for i in 1..s1.len() {
        out[i] = now(s1[i], s2[i]) && before(s1[i - 1], s2[i - 1]);
    }
    out
}

/// -1/0/+1 sign; NaN in, NaN out.
pub fn sign(value: f64) -> f64 {
    if value.is_nan() {
        f64::NAN
    } else if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Ordinary least squares without an intercept: solve the normal equations
/// `X'X b = X'y` for the coefficient vector. `columns` holds the regressors
/// column-major, each the same length as `y`. Returns None when the normal
/// matrix is singular.
pub fn ols_no_intercept(columns: &[Vec<f64>], y: &[f64]) -> Option<Vec<f64>> {
    let k = columns.len();
    let n = y.len();
    if k == 0 || n < k {
        return None;
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for (a, col_a) in columns.iter().enumerate() {
        debug_assert_eq!(col_a.len(), n);
        for (b, col_b) in columns.iter().enumerate().skip(a) {
            let dot: f64 = col_a.iter().zip(col_b).map(|(x, z)| x * z).sum();
            xtx[a][b] = dot;
            xtx[b][a] = dot;
        }
        xty[a] = col_a.iter().zip(y).map(|(x, z)| x * z).sum();
    }

    solve_linear(&mut xtx, &mut xty)
}

/// Gaussian elimination with partial pivoting on a k-by-k system.
fn solve_linear(matrix: &mut [Vec<f64>], rhs: &mut [f64]) -> Option<Vec<f64>> {
    let k = rhs.len();
    for col in 0..k {
        let pivot_row = (col..k)
            .max_by(|&a, &b| {
                matrix[a][col]
                    .abs()
                    .partial_cmp(&matrix[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if matrix[pivot_row][col].abs() < 1e-12 {
            return None;
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..k {
            let factor = matrix[row][col] / matrix[col][col];
            for c in col..k {
                matrix[row][c] -= factor * matrix[col][c];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; k];
    for row in (0..k).rev() {
        let mut acc = rhs[row];
        for col in (row + 1)..k {
            acc -= matrix[row][col] * solution[col];
        }
        solution[row] = acc / matrix[row][row];
    }
    Some(solution)
}
