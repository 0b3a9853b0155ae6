use crate::error::{MeanderError, Result};
use geo::{Bearing, Destination, Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }

    /// Great-circle distance in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        Haversine::distance(self.to_point(), other.to_point())
    }

    /// Forward azimuth in degrees clockwise from north.
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        Haversine::bearing(self.to_point(), other.to_point())
    }

    /// Point reached by travelling `distance_m` along `bearing_deg`.
    pub fn destination(&self, bearing_deg: f64, distance_m: f64) -> GeoPoint {
        Haversine::destination(self.to_point(), bearing_deg, distance_m).into()
    }

    // geo uses x = longitude, y = latitude
    pub(crate) fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<Point<f64>> for GeoPoint {
    fn from(point: Point<f64>) -> Self {
        GeoPoint {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

// Sum of great-circle segment lengths along an ordered run of points
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

// Degraded (straightened) reference alignment, in the order the editor drew it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValleyLine(Vec<GeoPoint>);

impl ValleyLine {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        ValleyLine(points)
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fewer than two points cannot define an axis.
    pub fn is_degenerate(&self) -> bool {
        self.0.len() < 2
    }

    pub fn length_m(&self) -> f64 {
        polyline_length(&self.0)
    }
}

impl From<Vec<GeoPoint>> for ValleyLine {
    fn from(points: Vec<GeoPoint>) -> Self {
        ValleyLine(points)
    }
}

// Design parameters for one restoration computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamParams {
    pub valley_slope_percent: f64, // % grade, 0-100
    pub bankfull_width: f64,       // m
    pub bankfull_depth: f64,       // m
    pub mannings_n: f64,           // roughness
    pub wavelength: f64,           // m, floored at MIN_WAVELENGTH_M when used
    pub amplitude: f64,            // m
    pub sinuosity_target: f64,     // informational, used by calibration
    pub valley_line: ValleyLine,
}

impl Default for StreamParams {
    fn default() -> Self {
        StreamParams {
            valley_slope_percent: 2.5,
            bankfull_width: 8.0,
            bankfull_depth: 1.2,
            mannings_n: 0.045,
            wavelength: 100.0,
            amplitude: 20.0,
            sinuosity_target: 1.4,
            valley_line: ValleyLine::default(),
        }
    }
}

impl StreamParams {
    /// Reject parameter sets the hydraulic formulas cannot evaluate.
    ///
    /// The valley line is not checked here: a short line is a degenerate
    /// geometry with defined fallbacks, not an invalid design.
    pub fn validate(&self) -> Result<()> {
        if !self.bankfull_width.is_finite() || self.bankfull_width <= 0.0 {
            return Err(MeanderError::invalid(
                "bankfullWidth",
                self.bankfull_width,
                "must be a positive number of meters",
            ));
        }
        if !self.bankfull_depth.is_finite() || self.bankfull_depth <= 0.0 {
            return Err(MeanderError::invalid(
                "bankfullDepth",
                self.bankfull_depth,
                "must be a positive number of meters",
            ));
        }
        if !self.mannings_n.is_finite() || self.mannings_n <= 0.0 {
            return Err(MeanderError::invalid(
                "manningsN",
                self.mannings_n,
                "roughness must be positive",
            ));
        }
        if !(0.0..=100.0).contains(&self.valley_slope_percent) {
            return Err(MeanderError::invalid(
                "valleySlopePercent",
                self.valley_slope_percent,
                "grade must lie within 0-100 %",
            ));
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(MeanderError::invalid(
                "amplitude",
                self.amplitude,
                "must be zero or a positive number of meters",
            ));
        }
        // below-floor wavelengths are clamped, only non-numbers are rejected
        if !self.wavelength.is_finite() {
            return Err(MeanderError::invalid(
                "wavelength",
                self.wavelength,
                "must be finite",
            ));
        }
        Ok(())
    }

    pub fn with_amplitude(&self, amplitude: f64) -> Self {
        StreamParams {
            amplitude,
            ..self.clone()
        }
    }

    pub fn with_wavelength(&self, wavelength: f64) -> Self {
        StreamParams {
            wavelength,
            ..self.clone()
        }
    }
}

// Spline fitting knobs for the valley axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    pub sharpness: f64,    // 0 = polyline, 1 = loosest curve
    pub resolution: usize, // total samples along the spline
    pub lookahead_m: f64,  // forward difference used for bearings
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        SmoothingConfig {
            sharpness: 0.85,
            resolution: 1000,
            lookahead_m: 1.0,
        }
    }
}

// Configuration structure for CSV column name mapping
#[derive(Debug, Clone)]
pub struct ColumnConfig {
    pub lat: String,
    pub lon: String,
}

impl ColumnConfig {
    pub fn new() -> Self {
        ColumnConfig {
            lat: "lat".to_string(),
            lon: "lon".to_string(),
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_params_are_valid() {
        assert!(StreamParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_channel_geometry() {
        let params = StreamParams {
            bankfull_width: 0.0,
            ..StreamParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(MeanderError::InvalidParameter {
                name: "bankfullWidth",
                ..
            })
        ));

        let params = StreamParams {
            bankfull_depth: -1.0,
            ..StreamParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(MeanderError::InvalidParameter {
                name: "bankfullDepth",
                ..
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_slope_and_roughness() {
        let steep = StreamParams {
            valley_slope_percent: 120.0,
            ..StreamParams::default()
        };
        assert!(steep.validate().is_err());

        let smooth = StreamParams {
            mannings_n: 0.0,
            ..StreamParams::default()
        };
        assert!(smooth.validate().is_err());
    }

    #[test]
    fn short_wavelength_is_not_an_error() {
        let params = StreamParams::default().with_wavelength(0.0);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        assert_relative_eq!(a.distance_to(&b), 111_195.0, max_relative = 1e-3);
        assert_relative_eq!(a.bearing_to(&b), 90.0, epsilon = 1e-9);
    }

    #[test]
    fn destination_inverts_distance_and_bearing() {
        let origin = GeoPoint::new(45.0, -122.0);
        let target = origin.destination(37.0, 250.0);
        assert_relative_eq!(origin.distance_to(&target), 250.0, max_relative = 1e-9);
        assert_relative_eq!(origin.bearing_to(&target), 37.0, epsilon = 1e-6);
    }
}
