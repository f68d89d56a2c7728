//! Polygon measurements over integer contour points.

use imageproc::point::Point;
use serde::{Deserialize, Serialize};

/// Rotated rectangle: center, side lengths and orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: [f64; 2],
    /// `[width, height]`; width is measured along `angle_deg`.
    pub size: [f64; 2],
    /// Direction of the width side from +x, degrees in [0, 180).
    pub angle_deg: f64,
}

/// Raw spatial moments of a closed polygon (Green's theorem form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    /// `(m10 / m00, m01 / m00)`, or `None` when the enclosed area is zero.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        if self.m00.abs() < f64::EPSILON {
            return None;
        }
        Some([self.m10 / self.m00, self.m01 / self.m00])
    }
}

/// Signed shoelace area; positive for counter-clockwise traversal in a
/// y-up frame.
pub fn signed_area(points: &[Point<i32>]) -> f64 {
    moments(points).m00
}

/// Absolute enclosed area.
pub fn polygon_area(points: &[Point<i32>]) -> f64 {
    signed_area(points).abs()
}

pub fn moments(points: &[Point<i32>]) -> PolygonMoments {
    let n = points.len();
    let mut acc = PolygonMoments {
        m00: 0.0,
        m10: 0.0,
        m01: 0.0,
    };
    if n < 3 {
        return acc;
    }

    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let (x0, y0) = (f64::from(p.x), f64::from(p.y));
        let (x1, y1) = (f64::from(q.x), f64::from(q.y));
        let cross = x0 * y1 - x1 * y0;
        acc.m00 += cross;
        acc.m10 += (x0 + x1) * cross;
        acc.m01 += (y0 + y1) * cross;
    }

    acc.m00 /= 2.0;
    acc.m10 /= 6.0;
    acc.m01 /= 6.0;
    acc
}

/// Arithmetic mean of the points.
pub fn mean_point(points: &[Point<i32>]) -> Option<[f64; 2]> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| f64::from(p.x)).sum();
    let sy: f64 = points.iter().map(|p| f64::from(p.y)).sum();
    Some([sx / n, sy / n])
}

/// Minimum-area enclosing rectangle.
///
/// Evaluates every convex-hull edge direction; the first direction reaching
/// the minimum area wins. One point yields a zero-size rectangle, two
/// distinct points a zero-height rectangle along the segment.
pub fn min_area_rect(points: &[Point<i32>]) -> Option<RotatedRect> {
    let first = *points.first()?;

    let mut hull: Vec<[f64; 2]> = if points.len() >= 3 {
        imageproc::geometry::convex_hull(points)
            .into_iter()
            .map(|p| [f64::from(p.x), f64::from(p.y)])
            .collect()
    } else {
        points
            .iter()
            .map(|p| [f64::from(p.x), f64::from(p.y)])
            .collect()
    };
    hull.dedup();
    if hull.len() >= 2 && hull.first() == hull.last() {
        hull.pop();
    }

    match hull.len() {
        0 | 1 => Some(RotatedRect {
            center: [f64::from(first.x), f64::from(first.y)],
            size: [0.0, 0.0],
            angle_deg: 0.0,
        }),
        2 => {
            let [a, b] = [hull[0], hull[1]];
            let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
            Some(RotatedRect {
                center: [(a[0] + b[0]) / 2.0, (a[1] + b[1]) / 2.0],
                size: [dx.hypot(dy), 0.0],
                angle_deg: wrap_degrees(dy.atan2(dx).to_degrees()),
            })
        }
        n => {
            let mut best: Option<(f64, RotatedRect)> = None;
            for i in 0..n {
                let a = hull[i];
                let b = hull[(i + 1) % n];
                let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
                let len = dx.hypot(dy);
                if len < f64::EPSILON {
                    continue;
                }
                let u = [dx / len, dy / len];
                let v = [-u[1], u[0]];

                let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
                let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
                for p in &hull {
                    let pu = p[0] * u[0] + p[1] * u[1];
                    let pv = p[0] * v[0] + p[1] * v[1];
                    min_u = min_u.min(pu);
                    max_u = max_u.max(pu);
                    min_v = min_v.min(pv);
                    max_v = max_v.max(pv);
                }

                let width = max_u - min_u;
                let height = max_v - min_v;
                let area = width * height;
                if best.as_ref().map_or(true, |(a, _)| area < *a) {
                    let cu = (min_u + max_u) / 2.0;
                    let cv = (min_v + max_v) / 2.0;
                    best = Some((
                        area,
                        RotatedRect {
                            center: [cu * u[0] + cv * v[0], cu * u[1] + cv * v[1]],
                            size: [width, height],
                            angle_deg: wrap_degrees(u[1].atan2(u[0]).to_degrees()),
                        },
                    ));
                }
            }
            best.map(|(_, rect)| rect)
        }
    }
}

/// Drop interior points of straight horizontal, vertical and diagonal runs,
/// keeping only their endpoints.
pub fn compress_chain(points: Vec<Point<i32>>) -> Vec<Point<i32>> {
    let n = points.len();
    if n <= 2 {
        return points;
    }

    let step = |a: Point<i32>, b: Point<i32>| ((b.x - a.x).signum(), (b.y - a.y).signum());
    let kept: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let cur = points[i];
            let next = points[(i + 1) % n];
            step(prev, cur) != step(cur, next)
        })
        .map(|i| points[i])
        .collect();

    if kept.is_empty() {
        // Every step identical: cannot happen for a closed chain, keep the input.
        points
    } else {
        kept
    }
}

fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(180.0);
    if wrapped >= 180.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(raw: &[(i32, i32)]) -> Vec<Point<i32>> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn square_area_and_centroid() {
        let sq = pts(&[(0, 0), (4, 0), (4, 4), (0, 4)]);
        assert_relative_eq!(polygon_area(&sq), 16.0);
        let c = moments(&sq).centroid().expect("non-degenerate");
        assert_relative_eq!(c[0], 2.0);
        assert_relative_eq!(c[1], 2.0);
    }

    #[test]
    fn centroid_is_orientation_independent() {
        let cw = pts(&[(0, 0), (0, 6), (2, 6), (2, 0)]);
        let mut ccw = cw.clone();
        ccw.reverse();
        let a = moments(&cw).centroid().expect("cw");
        let b = moments(&ccw).centroid().expect("ccw");
        assert_relative_eq!(a[0], b[0]);
        assert_relative_eq!(a[1], b[1]);
        assert_relative_eq!(a[0], 1.0);
        assert_relative_eq!(a[1], 3.0);
    }

    #[test]
    fn zero_area_has_no_centroid() {
        let line = pts(&[(0, 0), (1, 0), (2, 0), (1, 0)]);
        assert!(moments(&line).centroid().is_none());
        assert!(moments(&pts(&[(3, 3)])).centroid().is_none());
    }

    #[test]
    fn min_area_rect_axis_aligned_block() {
        let block = pts(&[(10, 10), (10, 11), (11, 11), (11, 10)]);
        let r = min_area_rect(&block).expect("rect");
        assert_relative_eq!(r.center[0], 10.5, epsilon = 1e-9);
        assert_relative_eq!(r.center[1], 10.5, epsilon = 1e-9);
        assert_relative_eq!(r.size[0] * r.size[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn min_area_rect_rotated_square() {
        let diamond = pts(&[(5, 0), (10, 5), (5, 10), (0, 5)]);
        let r = min_area_rect(&diamond).expect("rect");
        assert_relative_eq!(r.center[0], 5.0, epsilon = 1e-9);
        assert_relative_eq!(r.center[1], 5.0, epsilon = 1e-9);
        assert_relative_eq!(r.size[0], 50f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(r.size[1], 50f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(r.angle_deg.rem_euclid(90.0), 45.0, epsilon = 1e-9);
    }

    #[test]
    fn min_area_rect_small_inputs() {
        let one = min_area_rect(&pts(&[(4, 7)])).expect("rect");
        assert_eq!(one.center, [4.0, 7.0]);
        assert_eq!(one.size, [0.0, 0.0]);

        let two = min_area_rect(&pts(&[(0, 0), (3, 4)])).expect("rect");
        assert_relative_eq!(two.size[0], 5.0);
        assert_relative_eq!(two.center[0], 1.5);
        assert_relative_eq!(two.center[1], 2.0);

        assert!(min_area_rect(&[]).is_none());
    }

    #[test]
    fn compress_keeps_only_corners() {
        let ring = pts(&[
            (0, 0),
            (1, 0),
            (2, 0),
            (2, 1),
            (2, 2),
            (1, 2),
            (0, 2),
            (0, 1),
        ]);
        let compressed = compress_chain(ring);
        assert_eq!(compressed, pts(&[(0, 0), (2, 0), (2, 2), (0, 2)]));
    }
}
