// Copyright 2025 Lars Brubaker
// License: MIT
//
// Plain geometric types and intersection primitives. Everything here is
// straight floating-point arithmetic; the sign-critical tests live in the
// predicates module. The intersection routines fail closed: a degenerate
// query returns None instead of a fabricated point, and callers are expected
// to tolerate the missing point.

pub type Real = f64;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    #[inline]
    pub fn new(x: Real, y: Real) -> Self {
        Point { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    pub fn distance_sq(&self, other: &Point) -> Real {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Midpoint of the segment from self to other.
    #[inline]
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }
}

/// Axis-aligned bounding rectangle. A freshly created rectangle is empty
/// (contains nothing) until a point is added.
#[derive(Clone, Copy, Debug)]
pub struct Rect {
    pub xmin: Real,
    pub ymin: Real,
    pub xmax: Real,
    pub ymax: Real,
}

impl Rect {
    pub fn new() -> Self {
        Rect {
            xmin: Real::MAX,
            ymin: Real::MAX,
            xmax: Real::MIN,
            ymax: Real::MIN,
        }
    }

    pub fn from_points<'a, I: IntoIterator<Item = &'a Point>>(points: I) -> Self {
        let mut r = Rect::new();
        for p in points {
            r.expand(p);
        }
        r
    }

    /// Grow the rectangle to cover the given point.
    pub fn expand(&mut self, p: &Point) {
        if p.x < self.xmin {
            self.xmin = p.x;
        }
        if p.y < self.ymin {
            self.ymin = p.y;
        }
        if p.x > self.xmax {
            self.xmax = p.x;
        }
        if p.y > self.ymax {
            self.ymax = p.y;
        }
    }

    #[inline]
    pub fn width(&self) -> Real {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn height(&self) -> Real {
        self.ymax - self.ymin
    }

    /// Inclusive containment test. An empty rectangle contains nothing.
    #[inline]
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// Expand the shorter axis symmetrically so width == height.
    pub fn square(&mut self) {
        let w = self.width();
        let h = self.height();
        if w > h {
            let pad = 0.5 * (w - h);
            self.ymin -= pad;
            self.ymax += pad;
        } else {
            let pad = 0.5 * (h - w);
            self.xmin -= pad;
            self.xmax += pad;
        }
    }
}

impl Default for Rect {
    fn default() -> Self {
        Rect::new()
    }
}

/// Strict segment/segment intersection via a translate-rotate reduction:
/// translate so p1 is the origin, rotate so p2 lies on the positive x-axis,
/// then intersect against the transformed q segment. Returns None for any
/// degenerate configuration: shared endpoints, a zero-length first segment,
/// parallel or non-crossing segments. A crossing exactly at p1 or p2 does
/// not count; the q segment must cut the interior of p1-p2.
pub fn segments_intersect(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> Option<Point> {
    // Segments sharing an endpoint do not count as intersecting.
    if p1 == q1 || p1 == q2 || p2 == q1 || p2 == q2 {
        return None;
    }

    let x2 = p2.x - p1.x;
    let y2 = p2.y - p1.y;
    let mut x3 = q1.x - p1.x;
    let mut y3 = q1.y - p1.y;
    let mut x4 = q2.x - p1.x;
    let mut y4 = q2.y - p1.y;

    let dist = (x2 * x2 + y2 * y2).sqrt();
    if dist == 0.0 {
        return None;
    }

    // Rotate q1 and q2 into the frame where p1-p2 is the x-axis.
    let cos = x2 / dist;
    let sin = y2 / dist;

    let nx = x3 * cos + y3 * sin;
    y3 = y3 * cos - x3 * sin;
    x3 = nx;
    let nx = x4 * cos + y4 * sin;
    y4 = y4 * cos - x4 * sin;
    x4 = nx;

    // The q segment must straddle the x-axis. Collinear segments fall into
    // the same-side case and are rejected.
    if (y3 < 0.0 && y4 < 0.0) || (y3 >= 0.0 && y4 >= 0.0) {
        return None;
    }

    let pos = x4 + (x3 - x4) * y4 / (y4 - y3);
    if pos <= 0.0 || pos >= dist {
        return None;
    }

    Some(Point::new(p1.x + pos * cos, p1.y + pos * sin))
}

/// Intersect a ray starting inside (or on) `rect` with the rectangle's
/// boundary. Returns None if the ray origin lies outside the rectangle.
pub fn box_ray_intersection(rect: &Rect, p: &Point, dx: Real, dy: Real) -> Option<Point> {
    if !rect.contains(p) {
        return None;
    }

    // Nearest crossing with the two vertical sides.
    let (t1, x1, y1) = if dx < 0.0 {
        let t = (rect.xmin - p.x) / dx;
        (t, rect.xmin, p.y + t * dy)
    } else if dx > 0.0 {
        let t = (rect.xmax - p.x) / dx;
        (t, rect.xmax, p.y + t * dy)
    } else {
        (Real::MAX, 0.0, 0.0)
    };

    // Nearest crossing with the two horizontal sides.
    let (t2, x2, y2) = if dy < 0.0 {
        let t = (rect.ymin - p.y) / dy;
        (t, p.x + t * dx, rect.ymin)
    } else if dy > 0.0 {
        let t = (rect.ymax - p.y) / dy;
        (t, p.x + t * dx, rect.ymax)
    } else {
        (Real::MAX, 0.0, 0.0)
    };

    if t1 == Real::MAX && t2 == Real::MAX {
        // Zero-direction ray.
        return None;
    }

    if t1 < t2 {
        Some(Point::new(x1, y1))
    } else {
        Some(Point::new(x2, y2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_expand_and_contains() {
        let mut r = Rect::new();
        assert!(!r.contains(&Point::new(0.0, 0.0)));
        r.expand(&Point::new(0.0, 0.0));
        r.expand(&Point::new(2.0, 1.0));
        assert!(r.contains(&Point::new(1.0, 0.5)));
        assert!(r.contains(&Point::new(2.0, 1.0)));
        assert!(!r.contains(&Point::new(2.1, 0.5)));
    }

    #[test]
    fn rect_square_grows_short_axis() {
        let mut r = Rect::from_points([Point::new(0.0, 0.0), Point::new(4.0, 2.0)].iter());
        r.square();
        assert_eq!(r.width(), r.height());
        assert_eq!(r.width(), 4.0);
        // Centered growth.
        assert_eq!(r.ymin, -1.0);
        assert_eq!(r.ymax, 3.0);
    }

    #[test]
    fn segments_crossing() {
        let p = segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 1.0),
            &Point::new(0.0, 1.0),
            &Point::new(1.0, 0.0),
        )
        .unwrap();
        assert!((p.x - 0.5).abs() < 1e-12, "x={}", p.x);
        assert!((p.y - 0.5).abs() < 1e-12, "y={}", p.y);
    }

    #[test]
    fn segments_shared_endpoint_is_none() {
        let r = segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(2.0, 1.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn segments_parallel_is_none() {
        let r = segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(0.0, 1.0),
            &Point::new(1.0, 1.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn segments_zero_length_is_none() {
        let r = segments_intersect(
            &Point::new(0.5, 0.5),
            &Point::new(0.5, 0.5),
            &Point::new(0.0, 1.0),
            &Point::new(1.0, 0.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn segments_disjoint_is_none() {
        let r = segments_intersect(
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
            &Point::new(3.0, -1.0),
            &Point::new(3.0, 1.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn segments_touching_at_p1_is_none() {
        // The first segment starts on the second one; a touch is not a cut.
        let r = segments_intersect(
            &Point::new(0.5, 0.0),
            &Point::new(0.5, 1.0),
            &Point::new(0.0, 0.0),
            &Point::new(1.0, 0.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn box_ray_hits_right_side() {
        let r = Rect::from_points([Point::new(0.0, 0.0), Point::new(2.0, 2.0)].iter());
        let p = box_ray_intersection(&r, &Point::new(1.0, 1.0), 1.0, 0.0).unwrap();
        assert_eq!(p, Point::new(2.0, 1.0));
    }

    #[test]
    fn box_ray_diagonal_picks_nearer_side() {
        let r = Rect::from_points([Point::new(0.0, 0.0), Point::new(4.0, 2.0)].iter());
        let p = box_ray_intersection(&r, &Point::new(1.0, 1.0), 1.0, 1.0).unwrap();
        // Top edge is closer than the right edge.
        assert_eq!(p, Point::new(2.0, 2.0));
    }

    #[test]
    fn box_ray_outside_origin_is_none() {
        let r = Rect::from_points([Point::new(0.0, 0.0), Point::new(1.0, 1.0)].iter());
        assert!(box_ray_intersection(&r, &Point::new(5.0, 5.0), -1.0, 0.0).is_none());
    }
}
