//! CSV file price history adapter.
//!
//! Reads daily bars from `<symbol>.csv` files with the column layout
//! `Date,Open,High,Low,Close,Adj Close,Volume`. Empty price fields become
//! NaN so gap filling stays a domain concern.

use crate::domain::error::SigtraderError;
use crate::domain::price::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, SigtraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SigtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| SigtraderError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                SigtraderError::Data {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            let open = parse_field(&record, 1, "open")?;
            let high = parse_field(&record, 2, "high")?;
            let low = parse_field(&record, 3, "low")?;
            let close = parse_field(&record, 4, "close")?;
            let adj_close = parse_field(&record, 5, "adj close")?;
            let volume = parse_field(&record, 6, "volume")?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                date,
                open,
                high,
                low,
                close,
                adj_close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

/// An empty field is a quote gap, not an error: it parses to NaN and gets
/// forward-filled downstream.
fn parse_field(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, SigtraderError> {
    let raw = record.get(index).ok_or_else(|| SigtraderError::Data {
        reason: format!("missing {} column", name),
    })?;
    if raw.trim().is_empty() {
        return Ok(f64::NAN);
    }
    raw.trim().parse().map_err(|e| SigtraderError::Data {
        reason: format!("invalid {} value: {}", name, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_history(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceBar>, SigtraderError> {
        let mut bars = self.read_bars(symbol)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SigtraderError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(symbol) = name_str.strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SigtraderError> {
        let bars = self.read_bars(symbol)?;
        match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, bars.len()))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "Date,Open,High,Low,Close,Adj Close,Volume\n\
            2024-01-15,100.0,110.0,90.0,105.0,104.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,109.0,60000\n\
            2024-01-17,110.0,120.0,105.0,115.0,114.0,55000\n";

        fs::write(path.join("BHP.csv"), csv_content).unwrap();
        fs::write(
            path.join("CBA.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n",
        )
        .unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_history_returns_correct_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
        let bars = adapter.fetch_history("BHP", start, end).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, 104.0);
        assert_eq!(bars[0].volume, 50000.0);
    }

    #[test]
    fn fetch_history_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();
        let bars = adapter.fetch_history("BHP", start, end).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn fetch_history_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!(adapter.fetch_history("XYZ", start, end).is_err());
    }

    #[test]
    fn empty_fields_become_nan() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("GAP.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-15,100.0,,90.0,105.0,104.0,50000\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let bars = adapter.fetch_history("GAP", start, end).unwrap();
        assert!(bars[0].high.is_nan());
        assert_eq!(bars[0].open, 100.0);
    }

    #[test]
    fn rows_sorted_by_date() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(
            path.join("OOO.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-17,1,1,1,1,1,1\n\
             2024-01-15,2,2,2,2,2,2\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(path);

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let bars = adapter.fetch_history("OOO", start, end).unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
    }

    #[test]
    fn list_symbols_returns_sorted_names() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["BHP", "CBA"]);
    }

    #[test]
    fn data_range_reports_span() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let range = adapter.data_range("BHP").unwrap().unwrap();
        assert_eq!(range.0, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(range.1, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(range.2, 3);

        assert_eq!(adapter.data_range("CBA").unwrap(), None);
    }
}
