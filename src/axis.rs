//! Valley-axis smoothing and arc-length parametrization.
//!
//! The valley line is fitted with a piecewise cubic Bezier spline whose
//! control points are pulled toward the neighbouring segment midpoints, so
//! the curve passes through every input vertex with a continuous tangent.
//! The spline is sampled densely and queried by geodesic arc length.

use crate::config::{GeoPoint, SmoothingConfig, ValleyLine};
use crate::error::{MeanderError, Result};
use log::debug;

/// Arc-length queries the meander synthesizer needs from an axis.
///
/// Any curve (a different spline library, a projected polyline) can stand
/// in for [`SmoothedAxis`] by implementing this trait.
pub trait AxisCurve: Sync {
    /// Total curve length in meters.
    fn length(&self) -> f64;

    /// Point at `distance` meters from the start, clamped to `[0, length]`.
    fn point_at(&self, distance: f64) -> GeoPoint;

    /// Forward azimuth in degrees at `distance` meters from the start.
    fn bearing_at(&self, distance: f64) -> f64;
}

#[derive(Debug, Clone)]
pub struct SmoothedAxis {
    vertices: Vec<GeoPoint>,
    cumulative: Vec<f64>, // meters from the first vertex
    lookahead_m: f64,
}

/// Fit a smooth curve through the valley line.
pub fn smooth(valley: &ValleyLine, config: &SmoothingConfig) -> Result<SmoothedAxis> {
    if valley.is_degenerate() {
        return Err(MeanderError::InsufficientPoints {
            count: valley.len(),
        });
    }

    let vertices = bezier_spline(valley.points(), config.sharpness, config.resolution);
    let mut cumulative = Vec::with_capacity(vertices.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for w in vertices.windows(2) {
        total += w[0].distance_to(&w[1]);
        cumulative.push(total);
    }

    debug!(
        "Smoothed {} valley points into {} spline samples ({:.1} m)",
        valley.len(),
        vertices.len(),
        total
    );

    Ok(SmoothedAxis {
        vertices,
        cumulative,
        lookahead_m: config.lookahead_m.max(f64::EPSILON),
    })
}

impl SmoothedAxis {
    /// Dense spline samples, first and last equal to the valley endpoints.
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }
}

impl AxisCurve for SmoothedAxis {
    fn length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn point_at(&self, distance: f64) -> GeoPoint {
        let length = self.length();
        let last = self.vertices[self.vertices.len() - 1];
        if distance.is_nan() || distance <= 0.0 {
            return self.vertices[0];
        }
        if distance >= length {
            return last;
        }

        // First sample at or beyond the requested distance
        let idx = self.cumulative.partition_point(|&c| c < distance);
        let start = self.vertices[idx - 1];
        let end = self.vertices[idx];
        let overshoot = distance - self.cumulative[idx - 1];
        let segment = self.cumulative[idx] - self.cumulative[idx - 1];
        if segment <= 0.0 {
            return end;
        }
        start.destination(start.bearing_to(&end), overshoot)
    }

    fn bearing_at(&self, distance: f64) -> f64 {
        let length = self.length();
        if length <= 0.0 {
            return 0.0;
        }
        let distance = distance.clamp(0.0, length);
        // Near the end the lookahead would collapse onto the last point,
        // so look back over the final stretch instead
        let (from, to) = if distance + self.lookahead_m > length {
            ((length - self.lookahead_m).max(0.0), length)
        } else {
            (distance, distance + self.lookahead_m)
        };
        self.point_at(from).bearing_to(&self.point_at(to))
    }
}

// Piecewise cubic Bezier through `points` in planar lon/lat space
fn bezier_spline(points: &[GeoPoint], sharpness: f64, resolution: usize) -> Vec<GeoPoint> {
    let n = points.len();
    let sharpness = sharpness.clamp(0.0, 1.0);
    let xy: Vec<[f64; 2]> = points.iter().map(|p| [p.lon, p.lat]).collect();

    let centers: Vec<[f64; 2]> = xy
        .windows(2)
        .map(|w| [(w[0][0] + w[1][0]) / 2.0, (w[0][1] + w[1][1]) / 2.0])
        .collect();

    // (incoming, outgoing) handle for every vertex
    let mut controls: Vec<([f64; 2], [f64; 2])> = Vec::with_capacity(n);
    controls.push((xy[0], xy[0]));
    for i in 0..centers.len().saturating_sub(1) {
        let p = xy[i + 1];
        let dx = p[0] - (centers[i][0] + centers[i + 1][0]) / 2.0;
        let dy = p[1] - (centers[i][1] + centers[i + 1][1]) / 2.0;
        let handle = |c: [f64; 2]| {
            [
                (1.0 - sharpness) * p[0] + sharpness * (c[0] + dx),
                (1.0 - sharpness) * p[1] + sharpness * (c[1] + dy),
            ]
        };
        controls.push((handle(centers[i]), handle(centers[i + 1])));
    }
    controls.push((xy[n - 1], xy[n - 1]));

    let per_segment = resolution.div_ceil(n - 1).max(1);
    let mut out = Vec::with_capacity(per_segment * (n - 1) + 1);
    for seg in 0..n - 1 {
        let p0 = xy[seg];
        let c1 = controls[seg].1;
        let c2 = controls[seg + 1].0;
        let p3 = xy[seg + 1];
        for step in 0..per_segment {
            let t = step as f64 / per_segment as f64;
            let [lon, lat] = cubic_bezier(t, p0, c1, c2, p3);
            out.push(GeoPoint::new(lat, lon));
        }
    }
    out.push(points[n - 1]);
    out
}

#[inline(always)]
fn cubic_bezier(t: f64, p0: [f64; 2], c1: [f64; 2], c2: [f64; 2], p3: [f64; 2]) -> [f64; 2] {
    let u = 1.0 - t;
    let b0 = u * u * u;
    let b1 = 3.0 * u * u * t;
    let b2 = 3.0 * u * t * t;
    let b3 = t * t * t;
    [
        b0 * p0[0] + b1 * c1[0] + b2 * c2[0] + b3 * p3[0],
        b0 * p0[1] + b1 * c1[1] + b2 * c2[1] + b3 * p3[1],
    ]
}
