//! CSV report adapter.
//!
//! Exports the equity curve and the worst drawdown episodes as flat CSV
//! files for downstream plotting.

use crate::domain::error::SigtraderError;
use crate::domain::performance::DrawdownEpisode;
use crate::domain::portfolio::EquitySeries;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn report_error(e: csv::Error) -> SigtraderError {
    SigtraderError::Data {
        reason: format!("report write error: {}", e),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write_equity(
        &self,
        equity: &EquitySeries,
        output_path: &str,
    ) -> Result<(), SigtraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(report_error)?;
        wtr.write_record([
            "date",
            "log_return",
            "cum_return",
            "strategy_log_return",
            "strategy_cum_return",
            "commission",
            "capital",
            "net_cum_return",
        ])
        .map_err(report_error)?;

        for i in 0..equity.dates.len() {
            wtr.write_record([
                equity.dates[i].format("%Y-%m-%d").to_string(),
                equity.log_returns[i].to_string(),
                equity.cum_returns[i].to_string(),
                equity.strategy_log_returns[i].to_string(),
                equity.strategy_cum_returns[i].to_string(),
                equity.commission[i].to_string(),
                equity.capital[i].to_string(),
                equity.net_cum_returns[i].to_string(),
            ])
            .map_err(report_error)?;
        }

        wtr.flush()?;
        Ok(())
    }

    fn write_drawdowns(
        &self,
        episodes: &[DrawdownEpisode],
        output_path: &str,
    ) -> Result<(), SigtraderError> {
        let mut wtr = csv::Writer::from_path(output_path).map_err(report_error)?;
        wtr.write_record(["start", "end", "days", "max_drawdown"])
            .map_err(report_error)?;

        for ep in episodes {
            wtr.write_record([
                ep.start.format("%Y-%m-%d").to_string(),
                ep.end.format("%Y-%m-%d").to_string(),
                ep.days.to_string(),
                ep.max_drawdown.to_string(),
            ])
            .map_err(report_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
