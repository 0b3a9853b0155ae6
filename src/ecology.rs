//! Ecological and geomorphic assessment of a redesigned channel.
//!
//! Every classification is a table of threshold rules evaluated in order,
//! first match wins, so each policy can be read and tested on its own.

use crate::config::StreamParams;
use crate::hydraulics::{HydraulicMetrics, boundary_shear};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pool-riffle spacing in channel widths.
pub const POOL_RIFFLE_SPACING_WIDTHS: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamHealth {
    Degraded,
    Recovering,
    Stable,
    HighRisk,
}

impl fmt::Display for StreamHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StreamHealth::Degraded => "Degraded",
            StreamHealth::Recovering => "Recovering",
            StreamHealth::Stable => "Stable",
            StreamHealth::HighRisk => "High Risk (Avulsion)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HyporheicPotential {
    Low,
    Medium,
    High,
}

impl fmt::Display for HyporheicPotential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SedimentRegime {
    Aggradation,
    Equilibrium,
    Degradation,
}

impl fmt::Display for SedimentRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SedimentRegime::Aggradation => "Aggradation (deposition)",
            SedimentRegime::Equilibrium => "Equilibrium",
            SedimentRegime::Degradation => "Degradation (scour)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EcologicalAssessment {
    pub habitat_units: u32,
    pub hyporheic_potential: HyporheicPotential,
    pub sediment_regime: SedimentRegime,
    pub stress_ratio: f64,
    pub health: StreamHealth,
    pub warnings: Vec<String>,
}

// Quantities the health rules look at
#[derive(Debug, Clone, Copy)]
pub struct HealthInputs {
    pub sinuosity: f64,
    pub radius_of_curvature: f64,
    pub bankfull_width: f64,
    /// Radius of curvature over bankfull width; infinite for a zero width.
    pub curvature_ratio: f64,
}

impl HealthInputs {
    pub fn new(metrics: &HydraulicMetrics, params: &StreamParams) -> Self {
        let width = params.bankfull_width;
        let curvature_ratio = if width > 0.0 {
            metrics.radius_of_curvature / width
        } else {
            f64::INFINITY
        };
        HealthInputs {
            sinuosity: metrics.sinuosity_index,
            radius_of_curvature: metrics.radius_of_curvature,
            bankfull_width: width,
            curvature_ratio,
        }
    }
}

pub struct HealthRule {
    pub name: &'static str,
    pub health: StreamHealth,
    pub applies: fn(&HealthInputs) -> bool,
    pub warning: Option<fn(&HealthInputs) -> String>,
}

fn tight_bends(i: &HealthInputs) -> bool {
    i.curvature_ratio < 2.0 && i.sinuosity > 1.05
}

fn avulsion_warning(i: &HealthInputs) -> String {
    format!(
        "Avulsion risk: radius of curvature {:.1} m is only {:.2}x the bankfull width of {:.1} m (bends tighter than 2x width tend to cut off)",
        i.radius_of_curvature, i.curvature_ratio, i.bankfull_width
    )
}

fn straightened(i: &HealthInputs) -> bool {
    i.sinuosity < 1.2
}

fn straightened_warning(i: &HealthInputs) -> String {
    format!(
        "Channel is effectively straightened (sinuosity {:.2} < 1.20); expect limited pool-riffle habitat",
        i.sinuosity
    )
}

fn recovering(i: &HealthInputs) -> bool {
    i.sinuosity > 1.2 && i.sinuosity < 1.5
}

fn always(_: &HealthInputs) -> bool {
    true
}

/// Health policy in priority order. The last rule always matches.
pub const HEALTH_RULES: &[HealthRule] = &[
    HealthRule {
        name: "avulsion",
        health: StreamHealth::HighRisk,
        applies: tight_bends,
        warning: Some(avulsion_warning),
    },
    HealthRule {
        name: "straightened",
        health: StreamHealth::Degraded,
        applies: straightened,
        warning: Some(straightened_warning),
    },
    HealthRule {
        name: "recovering",
        health: StreamHealth::Recovering,
        applies: recovering,
        warning: None,
    },
    HealthRule {
        name: "stable",
        health: StreamHealth::Stable,
        applies: always,
        warning: None,
    },
];

/// First matching health rule for the given inputs.
pub fn classify_health(inputs: &HealthInputs) -> &'static HealthRule {
    HEALTH_RULES
        .iter()
        .find(|rule| (rule.applies)(inputs))
        .unwrap_or(&HEALTH_RULES[HEALTH_RULES.len() - 1])
}

// Highest threshold first: the first exceeded threshold gives the category
const HYPORHEIC_THRESHOLDS: &[(f64, HyporheicPotential)] = &[
    (1.5, HyporheicPotential::High),
    (1.3, HyporheicPotential::Medium),
];

pub fn hyporheic_potential(sinuosity: f64) -> HyporheicPotential {
    HYPORHEIC_THRESHOLDS
        .iter()
        .find(|(threshold, _)| sinuosity > *threshold)
        .map(|(_, potential)| *potential)
        .unwrap_or(HyporheicPotential::Low)
}

/// New boundary shear relative to the shear the original slope would carry.
pub fn stress_ratio(metrics: &HydraulicMetrics) -> f64 {
    if metrics.original_slope == 0.0 {
        return 1.0;
    }
    // same hydraulic radius, original slope
    let reference = boundary_shear(metrics.hydraulic_radius, metrics.original_slope);
    if reference > 0.0 {
        metrics.shear_stress / reference
    } else {
        1.0
    }
}

pub fn sediment_regime(stress_ratio: f64) -> SedimentRegime {
    if stress_ratio < 0.6 {
        SedimentRegime::Aggradation
    } else if stress_ratio > 1.2 {
        SedimentRegime::Degradation
    } else {
        SedimentRegime::Equilibrium
    }
}

pub fn habitat_units(channel_length: f64, bankfull_width: f64) -> u32 {
    let spacing = POOL_RIFFLE_SPACING_WIDTHS * bankfull_width;
    if spacing > 0.0 && channel_length.is_finite() {
        (channel_length / spacing).floor().max(0.0) as u32
    } else {
        0
    }
}

/// Derive habitat, hyporheic, sediment and health indicators from the hydraulics.
pub fn assess_ecology(metrics: &HydraulicMetrics, params: &StreamParams) -> EcologicalAssessment {
    let inputs = HealthInputs::new(metrics, params);
    let rule = classify_health(&inputs);
    let warnings = rule.warning.map(|w| w(&inputs)).into_iter().collect();

    let ratio = stress_ratio(metrics);

    EcologicalAssessment {
        habitat_units: habitat_units(metrics.channel_length, params.bankfull_width),
        hyporheic_potential: hyporheic_potential(metrics.sinuosity_index),
        sediment_regime: sediment_regime(ratio),
        stress_ratio: ratio,
        health: rule.health,
        warnings,
    }
}
