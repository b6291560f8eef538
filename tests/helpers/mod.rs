// Copyright 2025 Lars Brubaker
// Shared test utilities for trigon tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use trigon::{triangulate, Behavior, Mesh, Point, Pslg, Segment};

/// Close the points `from..from + count` into a ring of segments.
pub fn ring(pslg: &mut Pslg, from: usize, count: usize) {
    for i in 0..count {
        pslg.segments
            .push(Segment::new(from + i, from + (i + 1) % count));
    }
}

/// Unit square with all four sides constrained.
pub fn unit_square_pslg() -> Pslg {
    let mut pslg = Pslg::from_points(vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
        Point::new(0.0, 1.0),
    ]);
    ring(&mut pslg, 0, 4);
    pslg
}

/// A 3x3 square with a 1x1 square hole punched out of the middle.
pub fn square_with_hole_pslg() -> Pslg {
    let mut pslg = Pslg::from_points(vec![
        Point::new(0.0, 0.0),
        Point::new(3.0, 0.0),
        Point::new(3.0, 3.0),
        Point::new(0.0, 3.0),
        Point::new(1.0, 1.0),
        Point::new(2.0, 1.0),
        Point::new(2.0, 2.0),
        Point::new(1.0, 2.0),
    ]);
    ring(&mut pslg, 0, 4);
    ring(&mut pslg, 4, 4);
    pslg.holes.push(Point::new(1.5, 1.5));
    pslg
}

/// `n` points drawn uniformly from the unit square.
pub fn random_points(n: usize, seed: u64) -> Vec<Point> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)))
        .collect()
}

/// Triangulate with default behavior; panics on failure.
pub fn build(pslg: &Pslg) -> Mesh {
    triangulate(pslg, Behavior::default()).expect("triangulation failed")
}

/// Total signed area of the live triangles. Triangles are positively
/// oriented, so this is the area the mesh covers.
pub fn total_area(mesh: &Mesh) -> f64 {
    let mut total = 0.0;
    for (_, tri) in mesh.triangles.iter() {
        let [a, b, c] = tri.vertices;
        let pa = mesh.vertex_point(a);
        let pb = mesh.vertex_point(b);
        let pc = mesh.vertex_point(c);
        total += 0.5 * ((pb.x - pa.x) * (pc.y - pa.y) - (pc.x - pa.x) * (pb.y - pa.y));
    }
    total
}

/// Centroid of a live triangle.
pub fn centroid(mesh: &Mesh, tri: u32) -> Point {
    let [a, b, c] = mesh.triangles[tri].vertices;
    let pa = mesh.vertex_point(a);
    let pb = mesh.vertex_point(b);
    let pc = mesh.vertex_point(c);
    Point::new((pa.x + pb.x + pc.x) / 3.0, (pa.y + pb.y + pc.y) / 3.0)
}

/// Signed area of a simple polygon.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    0.5 * area
}
