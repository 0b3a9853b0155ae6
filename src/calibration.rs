//! Amplitude calibration against a target sinuosity.
//!
//! Sinuosity grows with amplitude at a fixed wavelength, so the amplitude
//! that reaches `sinuosity_target` is found with a secant iteration kept
//! inside a shrinking bracket (bisection when a secant step leaves it).

use crate::axis::{self, AxisCurve};
use crate::config::{SmoothingConfig, StreamParams};
use crate::error::Result;
use crate::hydraulics::{sinuosity_index, valley_length_on_axis};
use crate::meander::{effective_wavelength, synthesize_on_axis};
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationOptions {
    pub points_per_wave: usize,
    pub tolerance: f64, // on sinuosity
    pub max_iterations: usize,
    /// Upper amplitude bound (m); defaults to the effective wavelength.
    pub max_amplitude: Option<f64>,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        CalibrationOptions {
            points_per_wave: crate::meander::DEFAULT_POINTS_PER_WAVE,
            tolerance: 1e-3,
            max_iterations: 60,
            max_amplitude: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationResult {
    pub amplitude: f64,
    pub sinuosity: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Find the amplitude whose meander reaches `params.sinuosity_target`.
pub fn calibrate_amplitude(
    params: &StreamParams,
    smoothing: &SmoothingConfig,
    options: &CalibrationOptions,
) -> Result<CalibrationResult> {
    params.validate()?;
    let axis = axis::smooth(&params.valley_line, smoothing)?;
    Ok(calibrate_on_axis(params, &axis, options))
}

pub fn calibrate_on_axis<A: AxisCurve + ?Sized>(
    params: &StreamParams,
    axis: &A,
    options: &CalibrationOptions,
) -> CalibrationResult {
    let target = params.sinuosity_target;
    let sinuosity_at = |amplitude: f64| {
        let path = synthesize_on_axis(axis, amplitude, params.wavelength, options.points_per_wave);
        sinuosity_index(path.length_m(), valley_length_on_axis(axis, &path))
    };

    let mut lo = 0.0;
    let mut f_lo = sinuosity_at(lo) - target;
    if target.is_nan() || target <= 1.0 || f_lo >= 0.0 {
        return CalibrationResult {
            amplitude: 0.0,
            sinuosity: f_lo + target,
            iterations: 0,
            converged: true,
        };
    }

    let mut hi = options
        .max_amplitude
        .unwrap_or_else(|| effective_wavelength(params.wavelength));
    let mut f_hi = sinuosity_at(hi) - target;
    if f_hi < 0.0 {
        warn!(
            "Sinuosity target {:.3} is out of reach: {:.1} m of amplitude only gives {:.3}",
            target,
            hi,
            f_hi + target
        );
        return CalibrationResult {
            amplitude: hi,
            sinuosity: f_hi + target,
            iterations: 0,
            converged: false,
        };
    }

    let mut a = hi;
    let mut f_a = f_hi;
    let mut iter = 0;
    while iter < options.max_iterations {
        iter += 1;

        // Secant step across the bracket, bisection if it lands outside
        let mut next = if (f_hi - f_lo) != 0.0 {
            hi - f_hi * (hi - lo) / (f_hi - f_lo)
        } else {
            0.5 * (lo + hi)
        };
        if !(next > lo && next < hi) {
            next = 0.5 * (lo + hi);
        }

        a = next;
        f_a = sinuosity_at(a) - target;
        debug!(
            "calibration iter {}: amplitude {:.4} m, sinuosity {:.5}",
            iter,
            a,
            f_a + target
        );

        if f_a.abs() <= options.tolerance {
            return CalibrationResult {
                amplitude: a,
                sinuosity: f_a + target,
                iterations: iter,
                converged: true,
            };
        }

        if f_a < 0.0 {
            lo = a;
            f_lo = f_a;
        } else {
            hi = a;
            f_hi = f_a;
        }
    }

    warn!(
        "Amplitude calibration did not converge after {} iterations (sinuosity {:.4}, target {:.4})",
        iter,
        f_a + target,
        target
    );
    CalibrationResult {
        amplitude: a,
        sinuosity: f_a + target,
        iterations: iter,
        converged: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeoPoint, ValleyLine};
    use crate::error::MeanderError;

    fn params(target: f64) -> StreamParams {
        StreamParams {
            sinuosity_target: target,
            valley_line: ValleyLine::new(vec![
                GeoPoint::new(45.0, -122.0),
                GeoPoint::new(45.0005, -121.99685),
                GeoPoint::new(45.0, -121.9937),
            ]),
            ..StreamParams::default()
        }
    }

    fn calibrate(p: &StreamParams) -> Result<CalibrationResult> {
        calibrate_amplitude(p, &SmoothingConfig::default(), &CalibrationOptions::default())
    }

    #[test]
    fn reaches_the_target_sinuosity() {
        let result = calibrate(&params(1.3)).unwrap();
        assert!(result.converged);
        assert!((result.sinuosity - 1.3).abs() <= 1e-3);
        assert!(result.amplitude > 0.0 && result.amplitude < 100.0);
    }

    #[test]
    fn higher_targets_need_more_amplitude() {
        let options = CalibrationOptions::default();
        let smoothing = SmoothingConfig::default();
        let low = calibrate_amplitude(&params(1.15), &smoothing, &options).unwrap();
        let high = calibrate_amplitude(&params(1.45), &smoothing, &options).unwrap();
        assert!(high.amplitude > low.amplitude);
    }

    #[test]
    fn small_target_on_a_sharp_bend_still_needs_amplitude() {
        let mut p = params(1.02);
        p.valley_line = ValleyLine::new(vec![
            GeoPoint::new(45.0, -122.0),
            GeoPoint::new(45.003, -121.998),
            GeoPoint::new(45.0, -121.996),
        ]);
        let result = calibrate(&p).unwrap();
        assert!(result.converged);
        assert!(result.amplitude > 0.0);
        assert!((result.sinuosity - 1.02).abs() <= 1e-3);
    }

    #[test]
    fn target_of_one_needs_no_meander() {
        let result = calibrate(&params(1.0)).unwrap();
        assert_eq!(result.amplitude, 0.0);
        assert!(result.converged);
    }

    #[test]
    fn unreachable_target_reports_the_bound() {
        let options = CalibrationOptions {
            max_amplitude: Some(5.0),
            ..CalibrationOptions::default()
        };
        let result =
            calibrate_amplitude(&params(3.0), &SmoothingConfig::default(), &options).unwrap();
        assert!(!result.converged);
        assert_eq!(result.amplitude, 5.0);
        assert!(result.sinuosity < 3.0);
    }

    #[test]
    fn short_valley_cannot_be_calibrated() {
        let mut p = params(1.3);
        p.valley_line = ValleyLine::new(vec![GeoPoint::new(45.0, -122.0)]);
        let err = calibrate(&p).unwrap_err();
        assert_eq!(err, MeanderError::InsufficientPoints { count: 1 });
    }
}
