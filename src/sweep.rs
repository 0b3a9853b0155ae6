use crate::axis;
use crate::config::{SmoothingConfig, StreamParams};
use crate::error::{MeanderError, Result};
use crate::io::results::SweepRecord;
use crate::pipeline::design_on_axis;
use indicatif::ProgressBar;
use log::info;
use rayon::prelude::*;
use std::sync::Arc;

// Amplitude x wavelength combinations to evaluate
#[derive(Debug, Clone, PartialEq)]
pub struct SweepGrid {
    pub amplitudes: Vec<f64>,
    pub wavelengths: Vec<f64>,
}

impl SweepGrid {
    pub fn new(amplitudes: Vec<f64>, wavelengths: Vec<f64>) -> Result<Self> {
        if amplitudes.is_empty() || wavelengths.is_empty() {
            return Err(MeanderError::InvalidGrid {
                reason: "amplitude and wavelength axes need at least one value".to_string(),
            });
        }
        if let Some(bad) = amplitudes
            .iter()
            .chain(wavelengths.iter())
            .find(|v| !v.is_finite())
        {
            return Err(MeanderError::InvalidGrid {
                reason: format!("non-finite grid value {}", bad),
            });
        }
        Ok(SweepGrid {
            amplitudes,
            wavelengths,
        })
    }

    /// Evenly spaced values over both (inclusive) ranges.
    pub fn linspace(
        amplitude_range: (f64, f64),
        amplitude_steps: usize,
        wavelength_range: (f64, f64),
        wavelength_steps: usize,
    ) -> Result<Self> {
        Self::new(
            linspace(amplitude_range, amplitude_steps),
            linspace(wavelength_range, wavelength_steps),
        )
    }

    pub fn len(&self) -> usize {
        self.amplitudes.len() * self.wavelengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Amplitude-major ordering
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.amplitudes
            .iter()
            .flat_map(|&a| self.wavelengths.iter().map(move |&w| (a, w)))
            .collect()
    }
}

fn linspace((start, end): (f64, f64), steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..steps)
            .map(|i| start + (end - start) * i as f64 / (steps - 1) as f64)
            .collect(),
    }
}

/// Evaluate every grid pair against one shared valley axis.
///
/// Pairs are independent and run on the current rayon pool; records come
/// back in grid order.
pub fn run_sweep(
    params: &StreamParams,
    smoothing: &SmoothingConfig,
    grid: &SweepGrid,
    points_per_wave: usize,
    progress: Option<Arc<ProgressBar>>,
) -> Result<Vec<SweepRecord>> {
    params.validate()?;
    let axis = axis::smooth(&params.valley_line, smoothing)?;
    let pairs = grid.pairs();

    info!(
        "Sweeping {} amplitudes x {} wavelengths on {} threads",
        grid.amplitudes.len(),
        grid.wavelengths.len(),
        rayon::current_num_threads()
    );

    let records = pairs
        .par_iter()
        .map(|&(amplitude, wavelength)| {
            let candidate = StreamParams {
                amplitude,
                wavelength,
                ..params.clone()
            };
            let design = design_on_axis(&candidate, &axis, points_per_wave);
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            design.map(|d| SweepRecord::new(amplitude, wavelength, &d))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(pb) = &progress {
        pb.finish();
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GeoPoint, ValleyLine};

    fn params() -> StreamParams {
        StreamParams {
            valley_line: ValleyLine::new(vec![
                GeoPoint::new(45.0, -122.0),
                GeoPoint::new(45.0005, -121.99685),
                GeoPoint::new(45.0, -121.9937),
            ]),
            ..StreamParams::default()
        }
    }

    #[test]
    fn linspace_includes_both_ends() {
        let grid = SweepGrid::linspace((0.0, 30.0), 4, (50.0, 50.0), 1).unwrap();
        assert_eq!(grid.amplitudes, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(grid.wavelengths, vec![50.0]);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn empty_axis_is_rejected() {
        let err = SweepGrid::linspace((0.0, 30.0), 0, (50.0, 100.0), 3).unwrap_err();
        assert!(matches!(err, MeanderError::InvalidGrid { .. }));
        assert!(SweepGrid::new(vec![f64::NAN], vec![100.0]).is_err());
    }

    #[test]
    fn records_come_back_in_grid_order() {
        let grid = SweepGrid::linspace((0.0, 20.0), 3, (80.0, 120.0), 2).unwrap();
        let records = run_sweep(&params(), &SmoothingConfig::default(), &grid, 20, None).unwrap();
        assert_eq!(records.len(), 6);
        let got: Vec<(f64, f64)> = records.iter().map(|r| (r.amplitude, r.wavelength)).collect();
        assert_eq!(got, grid.pairs());
    }

    #[test]
    fn sinuosity_grows_along_the_amplitude_axis() {
        let grid = SweepGrid::linspace((0.0, 30.0), 4, (100.0, 100.0), 1).unwrap();
        let records = run_sweep(&params(), &SmoothingConfig::default(), &grid, 20, None).unwrap();
        for w in records.windows(2) {
            assert!(w[1].sinuosity_index >= w[0].sinuosity_index);
        }
    }

    #[test]
    fn progress_bar_counts_every_pair() {
        let grid = SweepGrid::linspace((5.0, 25.0), 3, (60.0, 140.0), 3).unwrap();
        let pb = Arc::new(ProgressBar::hidden());
        run_sweep(&params(), &SmoothingConfig::default(), &grid, 20, Some(pb.clone())).unwrap();
        assert_eq!(pb.position(), 9);
    }
}
