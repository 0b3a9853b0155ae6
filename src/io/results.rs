use crate::ecology::{HyporheicPotential, SedimentRegime, StreamHealth};
use crate::pipeline::RestorationDesign;
use serde::Serialize;

// One row of sweep output, flattened for tabular writers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRecord {
    pub amplitude: f64,
    pub wavelength: f64,
    pub sinuosity_index: f64,
    pub new_slope: f64,
    pub new_velocity: f64,
    pub shear_stress: f64,
    pub stream_power: f64,
    pub radius_of_curvature: f64,
    pub channel_length: f64,
    pub habitat_units: u32,
    pub health: StreamHealth,
    pub hyporheic_potential: HyporheicPotential,
    pub sediment_regime: SedimentRegime,
    pub warning_count: usize,
}

impl SweepRecord {
    pub fn new(amplitude: f64, wavelength: f64, design: &RestorationDesign) -> Self {
        let h = &design.hydraulics;
        let e = &design.ecology;
        SweepRecord {
            amplitude,
            wavelength,
            sinuosity_index: h.sinuosity_index,
            new_slope: h.new_slope,
            new_velocity: h.new_velocity,
            shear_stress: h.shear_stress,
            stream_power: h.stream_power,
            radius_of_curvature: h.radius_of_curvature,
            channel_length: h.channel_length,
            habitat_units: e.habitat_units,
            health: e.health,
            hyporheic_potential: e.hyporheic_potential,
            sediment_regime: e.sediment_regime,
            warning_count: e.warnings.len(),
        }
    }
}
