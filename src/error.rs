use thiserror::Error;

pub type Result<T> = std::result::Result<T, MeanderError>;

// Errors surfaced by the restoration pipeline before any metric is computed
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeanderError {
    /// The valley line needs at least two points to define an axis.
    #[error("valley line must have at least 2 points, got {count}")]
    InsufficientPoints { count: usize },

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("invalid sweep grid: {reason}")]
    InvalidGrid { reason: String },
}

impl MeanderError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        MeanderError::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}
