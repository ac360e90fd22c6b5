//! Scalar geometry primitives shared by the adjacency index, the weight
//! calculator, and the transfer operator. All functions are total: degenerate
//! input produces a defined value (usually zero), never NaN.

use crate::float_types::Real;
use nalgebra::{Point3, Vector3};

/// Area-weighted face normal via Newell's method.
///
/// Works for arbitrary planar polygons regardless of convexity. The returned
/// vector's magnitude is twice the polygon area; degenerate polygons yield
/// the zero vector.
pub fn newell_normal(points: &[Point3<Real>]) -> Vector3<Real> {
    let mut n = Vector3::zeros();
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Unit face normal and area of a polygon, computed together from the Newell
/// vector. A degenerate polygon reports a zero normal and zero area.
pub fn face_normal_and_area(points: &[Point3<Real>]) -> (Vector3<Real>, Real) {
    let n = newell_normal(points);
    let len = n.norm();
    if len <= Real::EPSILON {
        (Vector3::zeros(), 0.0)
    } else {
        (n / len, len * 0.5)
    }
}

/// Interior angle at `corner` between the edges toward `prev` and `next`.
///
/// Uses atan2 of the cross and dot products, which stays stable as the angle
/// approaches 0 or π where acos of a normalized dot product loses precision.
/// Returns 0 for zero-length edges.
pub fn corner_angle(prev: &Point3<Real>, corner: &Point3<Real>, next: &Point3<Real>) -> Real {
    let e1 = prev - corner;
    let e2 = next - corner;
    if e1.norm_squared() <= Real::EPSILON || e2.norm_squared() <= Real::EPSILON {
        return 0.0;
    }
    e1.cross(&e2).norm().atan2(e1.dot(&e2))
}

/// Angle in `[0, π]` between two unit normals.
pub fn normal_angle(n1: &Vector3<Real>, n2: &Vector3<Real>) -> Real {
    n1.dot(n2).clamp(-1.0, 1.0).acos()
}

/// Closest point on triangle `(a, b, c)` to `p`.
///
/// Voronoi-region walk over the triangle's vertices, edges, and interior.
pub fn closest_point_on_triangle(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
    c: &Point3<Real>,
) -> Point3<Real> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Barycentric coordinates of `p` with respect to triangle `(a, b, c)`,
/// clamped to the triangle. A degenerate triangle attributes everything to
/// its first vertex.
pub fn barycentric(
    p: &Point3<Real>,
    a: &Point3<Real>,
    b: &Point3<Real>,
    c: &Point3<Real>,
) -> [Real; 3] {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;

    let d00 = v0.dot(&v0);
    let d01 = v0.dot(&v1);
    let d11 = v1.dot(&v1);
    let d20 = v2.dot(&v0);
    let d21 = v2.dot(&v1);

    let denom = d00 * d11 - d01 * d01;
    if denom.abs() <= Real::EPSILON {
        return [1.0, 0.0, 0.0];
    }

    let v = ((d11 * d20 - d01 * d21) / denom).clamp(0.0, 1.0);
    let w = ((d00 * d21 - d01 * d20) / denom).clamp(0.0, 1.0 - v);
    [1.0 - v - w, v, w]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float_types::PI;

    #[test]
    fn newell_unit_square() {
        let square = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let (n, area) = face_normal_and_area(&square);
        assert!((n - Vector3::z()).norm() < 1e-12);
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_face_reports_zero() {
        let sliver = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let (n, area) = face_normal_and_area(&sliver);
        assert_eq!(n, Vector3::zeros());
        assert_eq!(area, 0.0);
    }

    #[test]
    fn corner_angle_right_angle() {
        let angle = corner_angle(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!((angle - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn corner_angle_near_degenerate_is_finite() {
        // Nearly collinear edges: acos-based math would wobble here.
        let angle = corner_angle(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 1e-9, 0.0),
        );
        assert!(angle.is_finite());
        assert!(angle < 1e-6);

        let flat = corner_angle(
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(-1.0, 1e-9, 0.0),
        );
        assert!((flat - PI).abs() < 1e-6);
    }

    #[test]
    fn closest_point_regions() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(2.0, 0.0, 0.0);
        let c = Point3::new(0.0, 2.0, 0.0);

        // Above the interior projects straight down.
        let q = closest_point_on_triangle(&Point3::new(0.5, 0.5, 3.0), &a, &b, &c);
        assert!((q - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);

        // Beyond a vertex clamps to the vertex.
        let q = closest_point_on_triangle(&Point3::new(-1.0, -1.0, 0.0), &a, &b, &c);
        assert!((q - a).norm() < 1e-12);

        // Beyond an edge clamps onto the edge.
        let q = closest_point_on_triangle(&Point3::new(1.0, -1.0, 0.0), &a, &b, &c);
        assert!((q - Point3::new(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn barycentric_centroid() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 0.0, 0.0);
        let c = Point3::new(0.0, 1.0, 0.0);
        let centroid = Point3::new(1.0 / 3.0, 1.0 / 3.0, 0.0);
        let bc = barycentric(&centroid, &a, &b, &c);
        for w in bc {
            assert!((w - 1.0 / 3.0).abs() < 1e-12);
        }
    }
}
