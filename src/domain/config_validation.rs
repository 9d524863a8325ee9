//! Configuration validation and the indicator registry.
//!
//! Turns raw config lookups into validated run parameters before anything
//! touches price data, so bad values fail with a section/key diagnostic
//! instead of surfacing mid-run.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::{Band, Cross, IndicatorKind};
use crate::domain::position::PositionBound;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DataConfig {
    pub csv_dir: PathBuf,
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub capital: f64,
    pub transaction_fee: f64,
    pub position_bound: PositionBound,
}

#[derive(Debug, Clone)]
pub struct CombinerSettings {
    pub sections: Vec<String>,
    pub min_to_long: u32,
    pub min_to_short: u32,
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<DataConfig, SigtraderError> {
    let csv_dir = require_string(config, "data", "csv_dir")?;
    let symbol = require_string(config, "data", "symbol")?;
    let start_date = parse_date(config, "data", "start_date")?;
    let end_date = parse_date(config, "data", "end_date")?;

    if start_date >= end_date {
        return Err(SigtraderError::ConfigInvalid {
            section: "data".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }

    Ok(DataConfig {
        csv_dir: PathBuf::from(csv_dir),
        symbol,
        start_date,
        end_date,
    })
}

pub fn validate_simulation_config(
    config: &dyn ConfigPort,
) -> Result<SimulationConfig, SigtraderError> {
    let capital = config.get_double("simulation", "capital", 1_000_000.0);
    if capital <= 0.0 {
        return Err(SigtraderError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "capital".to_string(),
            reason: "capital must be positive".to_string(),
        });
    }

    let transaction_fee = config.get_double("simulation", "transaction_fee", 0.0);
    if transaction_fee < 0.0 {
        return Err(SigtraderError::ConfigInvalid {
            section: "simulation".to_string(),
            key: "transaction_fee".to_string(),
            reason: "transaction_fee must be non-negative".to_string(),
        });
    }

    let position_bound = match config
        .get_string("simulation", "position_type")
        .unwrap_or_else(|| "long_short".to_string())
        .as_str()
    {
        "long" => PositionBound::LongOnly,
        "short" => PositionBound::ShortOnly,
        "long_short" => PositionBound::LongShort,
        other => {
            return Err(SigtraderError::ConfigInvalid {
                section: "simulation".to_string(),
                key: "position_type".to_string(),
                reason: format!("unknown position_type '{other}', expected long, short or long_short"),
            });
        }
    };

    Ok(SimulationConfig {
        capital,
        transaction_fee,
        position_bound,
    })
}

pub fn validate_combiner_config(
    config: &dyn ConfigPort,
) -> Result<CombinerSettings, SigtraderError> {
    let list = require_string(config, "combiner", "indicators")?;
    let sections: Vec<String> = list
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if sections.len() < 2 {
        return Err(SigtraderError::ConfigInvalid {
            section: "combiner".to_string(),
            key: "indicators".to_string(),
            reason: "need at least two indicator sections".to_string(),
        });
    }

    let min_to_long = config.get_int("combiner", "min_to_long", 0);
    let min_to_short = config.get_int("combiner", "min_to_short", 0);
    if min_to_long < 1 || min_to_short < 1 {
        return Err(SigtraderError::ConfigInvalid {
            section: "combiner".to_string(),
            key: "min_to_long".to_string(),
            reason: "vote thresholds must be at least 1".to_string(),
        });
    }

    Ok(CombinerSettings {
        sections,
        min_to_long: min_to_long as u32,
        min_to_short: min_to_short as u32,
    })
}

/// The indicator registry: resolve a config section into an
/// [`IndicatorKind`]. The `name` key selects the variant (defaulting to the
/// section name) and the remaining keys override that variant's defaults.
pub fn parse_indicator(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<IndicatorKind, SigtraderError> {
    let name = config
        .get_string(section, "name")
        .unwrap_or_else(|| section.to_string());

    let kind = match name.as_str() {
        "ma_crossover" => IndicatorKind::MaCrossover {
            short_period: require_period(config, section, "short_period", 20)?,
            long_period: require_period(config, section, "long_period", 60)?,
        },
        "macd" => IndicatorKind::Macd {
            short_period: require_period(config, section, "short_period", 12)?,
            long_period: require_period(config, section, "long_period", 26)?,
            signal_period: require_period(config, section, "signal_period", 9)?,
        },
        "rsi" => IndicatorKind::Rsi {
            period: require_period(config, section, "period", 14)?,
            lower_threshold: config.get_double(section, "lower_threshold", 30.0),
            upper_threshold: config.get_double(section, "upper_threshold", 70.0),
            long_when: parse_cross(config, section, "long_when", Cross::Above)?,
            short_when: parse_cross(config, section, "short_when", Cross::Below)?,
            exit_threshold: config
                .get_string(section, "exit_threshold")
                .map(|s| {
                    s.parse::<f64>().map_err(|_| SigtraderError::ConfigInvalid {
                        section: section.to_string(),
                        key: "exit_threshold".to_string(),
                        reason: "expected a number".to_string(),
                    })
                })
                .transpose()?,
        },
        "sma_mean_reversion" => {
            let period = require_period(config, section, "period", 41)?;
            let multiplier = config.get_double(section, "threshold_multiplier", 4.0);
            let band = match config
                .get_string(section, "threshold_method")
                .unwrap_or_else(|| "constant".to_string())
                .as_str()
            {
                "constant" => Band::Constant(multiplier),
                "stdev" => Band::StdevMult(multiplier),
                other => {
                    return Err(SigtraderError::ConfigInvalid {
                        section: section.to_string(),
                        key: "threshold_method".to_string(),
                        reason: format!("unknown threshold_method '{other}', expected constant or stdev"),
                    });
                }
            };
            IndicatorKind::MeanReversion { period, band }
        }
        "lag" => IndicatorKind::Lag {
            lag_days: require_period(config, section, "lag_days", 2)?,
        },
        "simple_momentum" => IndicatorKind::Momentum,
        other => {
            return Err(SigtraderError::ConfigInvalid {
                section: section.to_string(),
                key: "name".to_string(),
                reason: format!(
                    "unknown indicator '{other}', expected one of ma_crossover, macd, rsi, \
                     sma_mean_reversion, lag, simple_momentum"
                ),
            });
        }
    };

    Ok(kind)
}

fn require_string(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<String, SigtraderError> {
    match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(SigtraderError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        }),
    }
}

fn parse_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<NaiveDate, SigtraderError> {
    let value = require_string(config, section, key)?;
    NaiveDate::parse_from_str(&value, "%Y-%m-%d").map_err(|_| SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("invalid {key} format, expected YYYY-MM-DD"),
    })
}

fn require_period(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<usize, SigtraderError> {
    let value = config.get_int(section, key, default);
    if value < 1 {
        return Err(SigtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{key} must be positive"),
        });
    }
    Ok(value as usize)
}

fn parse_cross(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: Cross,
) -> Result<Cross, SigtraderError> {
    match config.get_string(section, key).as_deref() {
        None => Ok(default),
        Some("crossed_above") => Ok(Cross::Above),
        Some("crossed_below") => Ok(Cross::Below),
        Some(other) => Err(SigtraderError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("unknown crossing '{other}', expected crossed_above or crossed_below"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn data_config_complete() {
        let cfg = config(
            r#"
[data]
csv_dir = /tmp/prices
symbol = AAPL
start_date = 2020-01-01
end_date = 2024-01-01
"#,
        );
        let data = validate_data_config(&cfg).unwrap();
        assert_eq!(data.symbol, "AAPL");
        assert_eq!(data.csv_dir, PathBuf::from("/tmp/prices"));
    }

    #[test]
    fn data_config_missing_symbol() {
        let cfg = config(
            r#"
[data]
csv_dir = /tmp/prices
start_date = 2020-01-01
end_date = 2024-01-01
"#,
        );
        let err = validate_data_config(&cfg).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigMissing { .. }));
    }

    #[test]
    fn data_config_inverted_dates() {
        let cfg = config(
            r#"
[data]
csv_dir = /tmp/prices
symbol = AAPL
start_date = 2024-01-01
end_date = 2020-01-01
"#,
        );
        let err = validate_data_config(&cfg).unwrap_err();
        assert!(matches!(err, SigtraderError::ConfigInvalid { .. }));
    }

    #[test]
    fn simulation_defaults() {
        let cfg = config("[simulation]\n");
        let sim = validate_simulation_config(&cfg).unwrap();
        assert_eq!(sim.capital, 1_000_000.0);
        assert_eq!(sim.transaction_fee, 0.0);
        assert_eq!(sim.position_bound, PositionBound::LongShort);
    }

    #[test]
    fn simulation_rejects_negative_fee() {
        let cfg = config("[simulation]\ntransaction_fee = -1\n");
        assert!(validate_simulation_config(&cfg).is_err());
    }

    #[test]
    fn simulation_position_type_long() {
        let cfg = config("[simulation]\nposition_type = long\n");
        let sim = validate_simulation_config(&cfg).unwrap();
        assert_eq!(sim.position_bound, PositionBound::LongOnly);
    }

    #[test]
    fn registry_resolves_each_variant() {
        let cfg = config(
            r#"
[ma_crossover]
[macd]
[rsi]
[sma_mean_reversion]
[lag]
[simple_momentum]
"#,
        );
        assert_eq!(
            parse_indicator(&cfg, "ma_crossover").unwrap(),
            IndicatorKind::ma_crossover_default()
        );
        assert_eq!(
            parse_indicator(&cfg, "macd").unwrap(),
            IndicatorKind::macd_default()
        );
        assert_eq!(
            parse_indicator(&cfg, "rsi").unwrap(),
            IndicatorKind::rsi_default()
        );
        assert_eq!(
            parse_indicator(&cfg, "sma_mean_reversion").unwrap(),
            IndicatorKind::mean_reversion_default()
        );
        assert_eq!(
            parse_indicator(&cfg, "lag").unwrap(),
            IndicatorKind::Lag { lag_days: 2 }
        );
        assert_eq!(
            parse_indicator(&cfg, "simple_momentum").unwrap(),
            IndicatorKind::Momentum
        );
    }

    #[test]
    fn registry_name_key_overrides_section() {
        let cfg = config("[indicator]\nname = macd\nshort_period = 5\n");
        let kind = parse_indicator(&cfg, "indicator").unwrap();
        assert_eq!(
            kind,
            IndicatorKind::Macd {
                short_period: 5,
                long_period: 26,
                signal_period: 9
            }
        );
    }

    #[test]
    fn registry_unknown_name() {
        let cfg = config("[indicator]\nname = vwap\n");
        assert!(parse_indicator(&cfg, "indicator").is_err());
    }

    #[test]
    fn registry_rejects_zero_period() {
        let cfg = config("[rsi]\nperiod = 0\n");
        assert!(parse_indicator(&cfg, "rsi").is_err());
    }

    #[test]
    fn rsi_exit_threshold_parsed() {
        let cfg = config("[rsi]\nexit_threshold = 50\n");
        let kind = parse_indicator(&cfg, "rsi").unwrap();
        let IndicatorKind::Rsi { exit_threshold, .. } = kind else {
            panic!("wrong kind");
        };
        assert_eq!(exit_threshold, Some(50.0));
    }

    #[test]
    fn mean_reversion_stdev_band() {
        let cfg = config("[sma_mean_reversion]\nthreshold_method = stdev\nthreshold_multiplier = 2\n");
        let kind = parse_indicator(&cfg, "sma_mean_reversion").unwrap();
        assert_eq!(
            kind,
            IndicatorKind::MeanReversion {
                period: 41,
                band: Band::StdevMult(2.0)
            }
        );
    }

    #[test]
    fn combiner_settings_parsed() {
        let cfg = config(
            r#"
[combiner]
indicators = macd, rsi, ma_crossover
min_to_long = 2
min_to_short = 2
"#,
        );
        let settings = validate_combiner_config(&cfg).unwrap();
        assert_eq!(settings.sections, vec!["macd", "rsi", "ma_crossover"]);
        assert_eq!(settings.min_to_long, 2);
    }

    #[test]
    fn combiner_requires_two_sections() {
        let cfg = config("[combiner]\nindicators = macd\nmin_to_long = 1\nmin_to_short = 1\n");
        assert!(validate_combiner_config(&cfg).is_err());
    }

    #[test]
    fn combiner_requires_thresholds() {
        let cfg = config("[combiner]\nindicators = macd, rsi\n");
        assert!(validate_combiner_config(&cfg).is_err());
    }
}
