use crate::axis::{self, AxisCurve};
use crate::config::{SmoothingConfig, StreamParams};
use crate::ecology::{EcologicalAssessment, assess_ecology};
use crate::error::Result;
use crate::hydraulics::{HydraulicMetrics, compute_hydraulics, compute_hydraulics_on_axis};
use crate::meander::{MeanderPath, synthesize_on_axis};
use log::{info, warn};
use serde::Serialize;

// Everything one recomputation produces for a StreamParams value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorationDesign {
    pub meander_path: MeanderPath,
    pub hydraulics: HydraulicMetrics,
    pub ecology: EcologicalAssessment,
}

/// Run the full pipeline: smooth the valley, synthesize the meander, then
/// derive hydraulics and the ecological assessment.
///
/// Parameters are validated before any geometry is built. A valley line
/// shorter than two points yields an empty path and sinuosity 1.
pub fn design_channel(
    params: &StreamParams,
    smoothing: &SmoothingConfig,
    points_per_wave: usize,
) -> Result<RestorationDesign> {
    params.validate()?;

    match axis::smooth(&params.valley_line, smoothing) {
        Ok(axis) => design_on_axis(params, &axis, points_per_wave),
        Err(e) => {
            warn!("{}; reporting the valley as an unmodified channel", e);
            let meander_path = MeanderPath::default();
            let hydraulics = compute_hydraulics(params, &meander_path)?;
            Ok(assemble(params, meander_path, hydraulics))
        }
    }
}

/// Same as [`design_channel`] on an axis that was smoothed beforehand.
///
/// Sweeps and calibration reuse one axis across many amplitude and
/// wavelength choices.
pub fn design_on_axis<A: AxisCurve + ?Sized>(
    params: &StreamParams,
    axis: &A,
    points_per_wave: usize,
) -> Result<RestorationDesign> {
    params.validate()?;
    let meander_path =
        synthesize_on_axis(axis, params.amplitude, params.wavelength, points_per_wave);
    let hydraulics = compute_hydraulics_on_axis(params, &meander_path, axis)?;
    Ok(assemble(params, meander_path, hydraulics))
}

fn assemble(
    params: &StreamParams,
    meander_path: MeanderPath,
    hydraulics: HydraulicMetrics,
) -> RestorationDesign {
    let ecology = assess_ecology(&hydraulics, params);

    info!(
        "Sinuosity {:.3}, velocity {:.2} -> {:.2} m/s, health {}",
        hydraulics.sinuosity_index,
        hydraulics.original_velocity,
        hydraulics.new_velocity,
        ecology.health
    );

    RestorationDesign {
        meander_path,
        hydraulics,
        ecology,
    }
}
