use crate::axis::{self, AxisCurve};
use crate::config::{SmoothingConfig, StreamParams};
use crate::error::Result;
use crate::meander::{MeanderPath, effective_wavelength, resample_axis};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const WATER_DENSITY: f64 = 1000.0; // kg/m^3
pub const GRAVITY: f64 = 9.81; // m/s^2

// Bankfull hydraulics of the valley alignment and the redesigned channel (SI units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydraulicMetrics {
    pub original_slope: f64,      // m/m
    pub new_slope: f64,           // m/m
    pub sinuosity_index: f64,     // >= 1
    pub original_velocity: f64,   // m/s
    pub new_velocity: f64,        // m/s
    pub shear_stress: f64,        // Pa
    pub stream_power: f64,        // W/m
    pub channel_length: f64,      // m
    pub valley_length: f64,       // m, along the smoothed axis
    pub radius_of_curvature: f64, // m, 0 for a straight design
    pub hydraulic_radius: f64,    // m
    pub discharge: f64,           // m^3/s
}

/// Hydraulic radius of a rectangular section, `W*D / (W + 2D)`.
#[inline(always)]
pub fn hydraulic_radius(width: f64, depth: f64) -> f64 {
    let wetted_perimeter = width + 2.0 * depth;
    if wetted_perimeter > 0.0 {
        (width * depth) / wetted_perimeter
    } else {
        0.0
    }
}

/// Manning's equation, `v = (1/n) R^(2/3) S^(1/2)`.
#[inline(always)]
pub fn manning_velocity(n: f64, r: f64, slope: f64) -> f64 {
    #[inline(always)]
    fn pow_2_3(x: f64) -> f64 {
        x.cbrt().powi(2)
    }

    if n <= 0.0 || r <= 0.0 || slope <= 0.0 {
        return 0.0;
    }
    (1.0 / n) * pow_2_3(r) * slope.sqrt()
}

/// Boundary shear by the slope-area method, `rho g R S` (Pa).
#[inline(always)]
pub fn boundary_shear(r: f64, slope: f64) -> f64 {
    WATER_DENSITY * GRAVITY * r * slope
}

/// Bend radius of a sinusoidal planform, `lambda^2 / (4 pi^2 a)`; zero without amplitude.
pub fn radius_of_curvature(wavelength: f64, amplitude: f64) -> f64 {
    if amplitude > 0.0 {
        wavelength.powi(2) / (4.0 * PI * PI * amplitude)
    } else {
        0.0
    }
}

/// Channel length over valley length, floored at 1.
pub fn sinuosity_index(channel_length: f64, valley_length: f64) -> f64 {
    if valley_length > 0.0 && channel_length.is_finite() {
        (channel_length / valley_length).max(1.0)
    } else {
        1.0
    }
}

/// Valley length along `axis`, sampled at the same stations as `path`.
///
/// A zero-amplitude path is made of exactly these samples, so it measures
/// the same length and reports a sinuosity of exactly 1.
pub fn valley_length_on_axis<A: AxisCurve + ?Sized>(axis: &A, path: &MeanderPath) -> f64 {
    if path.len() < 2 {
        return axis.length();
    }
    resample_axis(axis, path.len()).length_m()
}

/// Compare the straightened valley against the synthesized channel.
///
/// Lengthening the channel over the same elevation drop lowers the energy
/// slope by the sinuosity; velocity, shear and stream power follow from
/// Manning's equation on a bankfull rectangular section.
///
/// The valley axis is smoothed with the default [`SmoothingConfig`]; use
/// [`compute_hydraulics_on_axis`] when the path was built on another axis.
/// A valley line too short to smooth is measured as a plain polyline.
pub fn compute_hydraulics(params: &StreamParams, path: &MeanderPath) -> Result<HydraulicMetrics> {
    params.validate()?;
    let valley_length = match axis::smooth(&params.valley_line, &SmoothingConfig::default()) {
        Ok(axis) => valley_length_on_axis(&axis, path),
        Err(_) => params.valley_line.length_m(),
    };
    Ok(metrics(params, path, valley_length))
}

pub fn compute_hydraulics_on_axis<A: AxisCurve + ?Sized>(
    params: &StreamParams,
    path: &MeanderPath,
    axis: &A,
) -> Result<HydraulicMetrics> {
    params.validate()?;
    Ok(metrics(params, path, valley_length_on_axis(axis, path)))
}

fn metrics(params: &StreamParams, path: &MeanderPath, valley_length: f64) -> HydraulicMetrics {
    let channel_length = path.length_m();
    let sinuosity = sinuosity_index(channel_length, valley_length);

    let original_slope = params.valley_slope_percent / 100.0;
    let new_slope = original_slope / sinuosity;

    let width = params.bankfull_width;
    let depth = params.bankfull_depth;
    let r = hydraulic_radius(width, depth);

    let original_velocity = manning_velocity(params.mannings_n, r, original_slope);
    let new_velocity = manning_velocity(params.mannings_n, r, new_slope);

    let shear_stress = boundary_shear(r, new_slope);
    let discharge = new_velocity * (width * depth);
    let stream_power = WATER_DENSITY * GRAVITY * discharge * new_slope;

    HydraulicMetrics {
        original_slope,
        new_slope,
        sinuosity_index: sinuosity,
        original_velocity,
        new_velocity,
        shear_stress,
        stream_power,
        channel_length,
        valley_length,
        radius_of_curvature: radius_of_curvature(
            effective_wavelength(params.wavelength),
            params.amplitude,
        ),
        hydraulic_radius: r,
        discharge,
    }
}
