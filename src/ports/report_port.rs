//! Report output port trait.

use crate::domain::error::SigtraderError;
use crate::domain::performance::DrawdownEpisode;
use crate::domain::portfolio::EquitySeries;

/// Port for exporting simulation results.
pub trait ReportPort {
    fn write_equity(
        &self,
        equity: &EquitySeries,
        output_path: &str,
    ) -> Result<(), SigtraderError>;

    fn write_drawdowns(
        &self,
        episodes: &[DrawdownEpisode],
        output_path: &str,
    ) -> Result<(), SigtraderError>;
}
