//! Stream-restoration geometry: turn a straightened valley line into a
//! meandering channel centerline and estimate what the redesign does to
//! slope, velocity, shear, stream power and habitat.
//!
//! The pipeline runs strictly forward, each stage a pure function:
//!
//! valley points -> [`axis::smooth`] -> [`meander::synthesize_on_axis`]
//! -> [`hydraulics::compute_hydraulics`] -> [`ecology::assess_ecology`]
//!
//! [`pipeline::design_channel`] runs all four for one [`StreamParams`] value.

pub mod axis;
pub mod calibration;
pub mod config;
pub mod ecology;
pub mod error;
pub mod hydraulics;
pub mod io;
pub mod meander;
pub mod pipeline;
pub mod sweep;

pub use config::{GeoPoint, SmoothingConfig, StreamParams, ValleyLine};
pub use ecology::{EcologicalAssessment, StreamHealth};
pub use error::{MeanderError, Result};
pub use hydraulics::HydraulicMetrics;
pub use meander::MeanderPath;
pub use pipeline::{RestorationDesign, design_channel};
