//! Meander-path synthesis.
//!
//! The restored centerline is built by marching along the smoothed valley
//! axis in equal arc-length steps and pushing each sample sideways by a
//! damped sinusoid of the design wavelength. Every step depends only on the
//! axis, so long paths are evaluated in parallel.

use crate::axis::{self, AxisCurve};
use crate::config::{GeoPoint, SmoothingConfig, ValleyLine, polyline_length};
use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Wavelengths below this floor are clamped (m).
pub const MIN_WAVELENGTH_M: f64 = 10.0;

pub const DEFAULT_POINTS_PER_WAVE: usize = 20;

// Exponent applied to the end taper; small values keep full amplitude over most of the reach
const DAMPENING_EXPONENT: f64 = 0.2;

// Step counts above this are computed on the rayon pool
const PARALLEL_STEP_THRESHOLD: usize = 4096;

// Synthesized channel centerline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeanderPath(Vec<GeoPoint>);

impl MeanderPath {
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Geodesic length in meters; zero for an empty or single-point path.
    pub fn length_m(&self) -> f64 {
        polyline_length(&self.0)
    }

    /// Planar `[lon, lat]` pairs, the order map layers expect.
    pub fn to_lon_lat(&self) -> Vec<[f64; 2]> {
        self.0.iter().map(|p| [p.lon, p.lat]).collect()
    }

    pub fn to_valley_line(&self) -> ValleyLine {
        ValleyLine::new(self.0.clone())
    }
}

impl From<Vec<GeoPoint>> for MeanderPath {
    fn from(points: Vec<GeoPoint>) -> Self {
        MeanderPath(points)
    }
}

/// Clamp a design wavelength to the practical floor.
pub fn effective_wavelength(wavelength: f64) -> f64 {
    if wavelength.is_finite() && wavelength >= MIN_WAVELENGTH_M {
        wavelength
    } else {
        MIN_WAVELENGTH_M
    }
}

/// Smooth the valley line and synthesize the meander along it.
///
/// Returns an empty path when the valley line has fewer than two points.
pub fn synthesize_meander(
    valley: &ValleyLine,
    amplitude: f64,
    wavelength: f64,
    points_per_wave: usize,
    smoothing: &SmoothingConfig,
) -> MeanderPath {
    match axis::smooth(valley, smoothing) {
        Ok(axis) => synthesize_on_axis(&axis, amplitude, wavelength, points_per_wave),
        Err(e) => {
            warn!("No meander synthesized: {}", e);
            MeanderPath::default()
        }
    }
}

/// Displace samples of an already smoothed axis by the damped sinusoid.
pub fn synthesize_on_axis<A: AxisCurve + ?Sized>(
    axis: &A,
    amplitude: f64,
    wavelength: f64,
    points_per_wave: usize,
) -> MeanderPath {
    let wavelength_eff = effective_wavelength(wavelength);
    if wavelength_eff != wavelength {
        warn!(
            "Wavelength {} m is below the {} m floor, using {} m",
            wavelength, MIN_WAVELENGTH_M, wavelength_eff
        );
    }
    let amplitude = if amplitude.is_finite() {
        amplitude.max(0.0)
    } else {
        0.0
    };
    let axis_length = axis.length();
    let total_steps =
        ((axis_length / wavelength_eff) * points_per_wave.max(1) as f64).ceil() as usize;

    // Degenerate axis: nothing to march along
    if total_steps == 0 {
        return MeanderPath(vec![axis.point_at(0.0)]);
    }

    debug!(
        "Synthesizing {} steps over {:.1} m (amplitude {} m, wavelength {} m)",
        total_steps, axis_length, amplitude, wavelength_eff
    );

    let step = |i: usize| {
        let (fraction, distance) = station(i, total_steps, axis_length);
        // Offsets vanish at both ends; sin(pi) is not exactly zero
        if i == 0 || i == total_steps {
            return axis.point_at(distance);
        }
        displaced_point(axis, fraction, distance, amplitude, wavelength_eff)
    };

    let points = if total_steps > PARALLEL_STEP_THRESHOLD {
        (0..=total_steps).into_par_iter().map(step).collect()
    } else {
        (0..=total_steps).map(step).collect()
    };
    MeanderPath(points)
}

/// The axis sampled at the stations a path of `samples` points uses.
///
/// With zero amplitude [`synthesize_on_axis`] returns exactly these points,
/// so lengths measured on the two are directly comparable.
pub fn resample_axis<A: AxisCurve + ?Sized>(axis: &A, samples: usize) -> MeanderPath {
    if samples == 0 {
        return MeanderPath::default();
    }
    let total_steps = samples - 1;
    if total_steps == 0 {
        return MeanderPath(vec![axis.point_at(0.0)]);
    }
    let axis_length = axis.length();
    let points = (0..=total_steps)
        .map(|i| axis.point_at(station(i, total_steps, axis_length).1))
        .collect();
    MeanderPath(points)
}

// (fraction of the reach, meters along the axis) for step i
#[inline]
fn station(i: usize, total_steps: usize, axis_length: f64) -> (f64, f64) {
    let fraction = i as f64 / total_steps as f64;
    (fraction, fraction * axis_length)
}

#[inline]
fn displaced_point<A: AxisCurve + ?Sized>(
    axis: &A,
    fraction: f64,
    distance: f64,
    amplitude: f64,
    wavelength: f64,
) -> GeoPoint {
    let origin = axis.point_at(distance);

    // Taper toward both ends so the channel meets the valley endpoints
    let dampening = (fraction * PI).sin().max(0.0);
    let current_amplitude = amplitude * dampening.powf(DAMPENING_EXPONENT);
    let offset = current_amplitude * (2.0 * PI * distance / wavelength).sin();
    if offset == 0.0 {
        return origin;
    }

    let bearing = axis.bearing_at(distance);
    let side = if offset > 0.0 { 90.0 } else { 270.0 };
    origin.destination((bearing + side) % 360.0, offset.abs())
}
