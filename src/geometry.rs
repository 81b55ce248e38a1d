//! Default spherical geometry provider.
//!
//! Decoding uses the `polyline` crate at precision 5 (the directions-API
//! standard), simplification uses the `geo` crate's Douglas-Peucker, and
//! lengths sum haversine segment distances. Bearings use the initial
//! great-circle bearing formula. The on-segment test projects into a
//! cos-latitude-scaled plane, which is accurate for the short segments a
//! route editor works with.

use geo::{Distance, Haversine, LineString, Point, Simplify};

use crate::latlng::LatLng;
use crate::traits::GeometryProvider;

#[derive(Debug, Clone, Copy, Default)]
pub struct GreatCircleGeometry;

fn to_line_string(points: &[LatLng]) -> LineString<f64> {
    // geo uses (x, y) = (lng, lat) order
    points.iter().map(|p| (p.lng, p.lat)).collect()
}

fn from_line_string(line: &LineString<f64>) -> Vec<LatLng> {
    line.coords().map(|c| LatLng::new(c.y, c.x)).collect()
}

impl GeometryProvider for GreatCircleGeometry {
    fn decode_path(&self, encoded: &str) -> Vec<LatLng> {
        polyline::decode_polyline(encoded, 5)
            .map(|line| from_line_string(&line))
            .unwrap_or_default()
    }

    fn simplify(&self, points: &[LatLng], tolerance: f64) -> Vec<LatLng> {
        if points.len() < 3 {
            return points.to_vec();
        }
        from_line_string(&to_line_string(points).simplify(&tolerance))
    }

    fn spherical_length(&self, points: &[LatLng]) -> f64 {
        points
            .windows(2)
            .map(|pair| {
                Haversine.distance(
                    Point::new(pair[0].lng, pair[0].lat),
                    Point::new(pair[1].lng, pair[1].lat),
                )
            })
            .sum()
    }

    fn spherical_bearing(&self, a: LatLng, b: LatLng) -> f64 {
        let lat1 = a.lat.to_radians();
        let lat2 = b.lat.to_radians();
        let dlng = (b.lng - a.lng).to_radians();

        let y = dlng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();

        y.atan2(x).to_degrees()
    }

    fn point_on_segment(&self, point: LatLng, a: LatLng, b: LatLng, tolerance: f64) -> bool {
        let cos_lat = ((a.lat + b.lat) / 2.0).to_radians().cos();

        let dx = (b.lng - a.lng) * cos_lat;
        let dy = b.lat - a.lat;
        let px = (point.lng - a.lng) * cos_lat;
        let py = point.lat - a.lat;

        let seg_len_sq = dx * dx + dy * dy;
        let (off_x, off_y) = if seg_len_sq < 1e-24 {
            // degenerate segment collapses to endpoint a
            (px, py)
        } else {
            let t = ((px * dx + py * dy) / seg_len_sq).clamp(0.0, 1.0);
            (px - t * dx, py - t * dy)
        };

        (off_x * off_x + off_y * off_y).sqrt() <= tolerance
    }
}
