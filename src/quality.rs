// Copyright 2025 Lars Brubaker
// License: MIT
//
// Mesh quality reporting. Statistic makes one pass over the triangles and
// accumulates extremes plus an angle histogram; QualityMeasure scores every
// triangle with three classic shape measures normalized so an equilateral
// triangle scores 1. Neither pass mutates the mesh.
//
// Design:
//   - Angles are bucketed by comparing cos^2 against a precomputed table,
//     so the hot loop does no trig at all; the two reported extreme angles
//     cost one acos each at the end.
//   - Edge lengths, altitudes and aspect ratios are carried squared until
//     finalization.
//   - The orientation determinant doubles as twice the signed area.

use crate::geom::Real;
use crate::mesh::{Mesh, MINUS1, PLUS1};

// ──────────────────────────────── Statistic ────────────────────────────────

/// Extremes and an interior-angle histogram for a mesh, filled by `update`.
#[derive(Clone, Debug, Default)]
pub struct Statistic {
    pub shortest_edge: Real,
    pub longest_edge: Real,
    /// Shortest altitude over any triangle's longest edge.
    pub shortest_altitude: Real,
    /// Best longest-edge to altitude ratio; 2/sqrt(3) for an equilateral
    /// triangle.
    pub smallest_aspect_ratio: Real,
    /// Worst longest-edge to altitude ratio.
    pub largest_aspect_ratio: Real,
    pub smallest_area: Real,
    pub largest_area: Real,
    /// Degrees.
    pub smallest_angle: Real,
    /// Degrees.
    pub largest_angle: Real,
    /// Angle counts in `sample_degrees` equal buckets over [0, 180); three
    /// entries per triangle.
    pub angle_histogram: Vec<usize>,
}

impl Statistic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute all statistics for the mesh. `sample_degrees` is the
    /// histogram bucket count; 18 gives the classic ten-degree buckets.
    pub fn update(&mut self, mesh: &Mesh, sample_degrees: usize) {
        debug_assert!(sample_degrees >= 4 && sample_degrees % 2 == 0);
        let radconst = std::f64::consts::PI / sample_degrees as Real;
        let degconst = 180.0 / std::f64::consts::PI;

        // cos^2 of each bucket boundary in the acute half. An angle lands
        // in the first bucket whose boundary it is below.
        let table_len = sample_degrees / 2 - 1;
        let mut cossquaretable = vec![0.0; table_len];
        for (i, entry) in cossquaretable.iter_mut().enumerate() {
            let c = (radconst * (i + 1) as Real).cos();
            *entry = c * c;
        }
        self.angle_histogram = vec![0; sample_degrees];

        // Seed the minima with a value larger than anything in the mesh.
        let span = mesh.bounds.width() + mesh.bounds.height();
        let mut minaltitude = span * span;
        let mut shortest = minaltitude;
        let mut longest = 0.0;
        let mut smallestarea = minaltitude;
        let mut biggestarea = 0.0;
        // Aspect ratios of slivers dwarf any span-derived seed.
        let mut bestaspect = Real::MAX;
        let mut worstaspect = 0.0;
        // Tracked as cos^2: the smallest angle maximizes it; the biggest
        // angle minimizes it while everything is acute, then maximizes it
        // over the obtuse angles.
        let mut smallestangle = 0.0;
        let mut biggestangle = 2.0;
        let mut acutebiggest = true;

        for (_, tri) in mesh.triangles.iter() {
            let p = [
                mesh.vertex_point(tri.vertices[0]),
                mesh.vertex_point(tri.vertices[1]),
                mesh.vertex_point(tri.vertices[2]),
            ];

            let mut dx = [0.0; 3];
            let mut dy = [0.0; 3];
            let mut edgelength = [0.0; 3];
            let mut trilongest2: Real = 0.0;
            for i in 0..3 {
                let j = PLUS1[i];
                let k = MINUS1[i];
                dx[i] = p[j].x - p[k].x;
                dy[i] = p[j].y - p[k].y;
                edgelength[i] = dx[i] * dx[i] + dy[i] * dy[i];
                trilongest2 = trilongest2.max(edgelength[i]);
                longest = edgelength[i].max(longest);
                shortest = edgelength[i].min(shortest);
            }

            // Twice the signed area; positive for a healthy triangle.
            let triarea = mesh.predicates.counterclockwise(p[0], p[1], p[2]);
            smallestarea = triarea.min(smallestarea);
            biggestarea = triarea.max(biggestarea);

            let triminaltitude2 = triarea * triarea / trilongest2;
            minaltitude = triminaltitude2.min(minaltitude);
            let triaspect2 = trilongest2 / triminaltitude2;
            bestaspect = triaspect2.min(bestaspect);
            worstaspect = triaspect2.max(worstaspect);

            for i in 0..3 {
                let j = PLUS1[i];
                let k = MINUS1[i];
                // The opposite-edge vectors meet at corner i reversed, so
                // a non-positive dot product means an acute corner.
                let dotproduct = dx[j] * dx[k] + dy[j] * dy[k];
                let cossquare = dotproduct * dotproduct / (edgelength[j] * edgelength[k]);
                let mut tendegree = table_len;
                for ii in (0..table_len).rev() {
                    if cossquare > cossquaretable[ii] {
                        tendegree = ii;
                    }
                }
                if dotproduct <= 0.0 {
                    self.angle_histogram[tendegree] += 1;
                    if cossquare > smallestangle {
                        smallestangle = cossquare;
                    }
                    if acutebiggest && cossquare < biggestangle {
                        biggestangle = cossquare;
                    }
                } else {
                    self.angle_histogram[sample_degrees - 1 - tendegree] += 1;
                    if acutebiggest || cossquare > biggestangle {
                        biggestangle = cossquare;
                        acutebiggest = false;
                    }
                }
            }
        }

        self.shortest_edge = shortest.sqrt();
        self.longest_edge = longest.sqrt();
        self.shortest_altitude = minaltitude.sqrt();
        self.smallest_aspect_ratio = bestaspect.sqrt();
        self.largest_aspect_ratio = worstaspect.sqrt();
        self.smallest_area = 0.5 * smallestarea;
        self.largest_area = 0.5 * biggestarea;
        self.smallest_angle = if smallestangle >= 1.0 {
            0.0
        } else {
            degconst * smallestangle.sqrt().acos()
        };
        self.largest_angle = if biggestangle >= 1.0 {
            180.0
        } else if acutebiggest {
            degconst * biggestangle.sqrt().acos()
        } else {
            180.0 - degconst * biggestangle.sqrt().acos()
        };
    }
}

// ──────────────────────────────── QualityMeasure ────────────────────────────

/// Per-triangle shape scores aggregated over the mesh. Alpha is the minimum
/// corner angle over its equilateral value; eta relates area to the edge
/// length sum of squares; q is the inradius to circumradius ratio. All three
/// reach 1 exactly on an equilateral triangle and fall toward 0 as triangles
/// degenerate.
#[derive(Clone, Debug, Default)]
pub struct QualityMeasure {
    pub area_min: Real,
    pub area_max: Real,
    pub area_total: Real,
    /// Triangles with exactly zero area.
    pub area_zero: usize,

    pub alpha_min: Real,
    pub alpha_max: Real,
    pub alpha_ave: Real,
    /// Area-weighted average.
    pub alpha_area: Real,

    pub eta_min: Real,
    pub eta_max: Real,
    pub eta_ave: Real,
    pub eta_area: Real,

    pub q_min: Real,
    pub q_max: Real,
    pub q_ave: Real,
    pub q_area: Real,
}

impl QualityMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset and rescore every triangle in the mesh.
    pub fn update(&mut self, mesh: &Mesh) {
        *self = QualityMeasure {
            area_min: Real::MAX,
            area_max: Real::MIN,
            alpha_min: Real::MAX,
            alpha_max: Real::MIN,
            eta_min: Real::MAX,
            eta_max: Real::MIN,
            q_min: Real::MAX,
            q_max: Real::MIN,
            ..QualityMeasure::default()
        };

        let mut n = 0;
        for (_, tri) in mesh.triangles.iter() {
            n += 1;
            let a = mesh.vertex_point(tri.vertices[0]);
            let b = mesh.vertex_point(tri.vertices[1]);
            let c = mesh.vertex_point(tri.vertices[2]);

            let ab = a.distance_sq(&b).sqrt();
            let bc = b.distance_sq(&c).sqrt();
            let ca = c.distance_sq(&a).sqrt();
            let area =
                0.5 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y)).abs();

            self.area_min = area.min(self.area_min);
            self.area_max = area.max(self.area_max);
            self.area_total += area;
            if area == 0.0 {
                self.area_zero += 1;
            }

            self.measure_alpha(ab, bc, ca, area);
            self.measure_eta(ab, bc, ca, area);
            self.measure_q(ab, bc, ca, area);
        }

        if n > 0 {
            self.alpha_ave /= n as Real;
            self.eta_ave /= n as Real;
            self.q_ave /= n as Real;
        }
        if self.area_total > 0.0 {
            self.alpha_area /= self.area_total;
            self.eta_area /= self.area_total;
            self.q_area /= self.area_total;
        }
    }

    /// Minimum corner angle, normalized from [0, 60 degrees] to [0, 1].
    fn measure_alpha(&mut self, ab: Real, bc: Real, ca: Real, area: Real) {
        let ab2 = ab * ab;
        let bc2 = bc * bc;
        let ca2 = ca * ca;

        let corner = |adj1: Real, adj2: Real, adj1_2: Real, adj2_2: Real, opp2: Real| {
            if adj1 == 0.0 || adj2 == 0.0 {
                std::f64::consts::PI
            } else {
                let cos = ((adj1_2 + adj2_2 - opp2) / (2.0 * adj1 * adj2)).clamp(-1.0, 1.0);
                cos.acos()
            }
        };

        let alpha = if ab == 0.0 && bc == 0.0 && ca == 0.0 {
            // A triangle collapsed to a point: three equal angles.
            2.0 * std::f64::consts::PI / 3.0
        } else {
            let a_angle = corner(ca, ab, ca2, ab2, bc2);
            let b_angle = corner(ab, bc, ab2, bc2, ca2);
            let c_angle = corner(bc, ca, bc2, ca2, ab2);
            a_angle.min(b_angle).min(c_angle)
        };
        let alpha = alpha * 3.0 / std::f64::consts::PI;

        self.alpha_min = alpha.min(self.alpha_min);
        self.alpha_max = alpha.max(self.alpha_max);
        self.alpha_ave += alpha;
        self.alpha_area += area * alpha;
    }

    /// 4 sqrt(3) area over the sum of squared edge lengths.
    fn measure_eta(&mut self, ab: Real, bc: Real, ca: Real, area: Real) {
        let denom = ab * ab + bc * bc + ca * ca;
        let eta = if denom == 0.0 {
            0.0
        } else {
            4.0 * 3.0_f64.sqrt() * area / denom
        };

        self.eta_min = eta.min(self.eta_min);
        self.eta_max = eta.max(self.eta_max);
        self.eta_ave += eta;
        self.eta_area += area * eta;
    }

    /// Twice the inradius over the circumradius, via the side lengths only.
    fn measure_q(&mut self, ab: Real, bc: Real, ca: Real, area: Real) {
        let denom = ab * bc * ca;
        let q = if denom == 0.0 {
            0.0
        } else {
            (bc + ca - ab) * (ca + ab - bc) * (ab + bc - ca) / denom
        };

        self.q_min = q.min(self.q_min);
        self.q_max = q.max(self.q_max);
        self.q_ave += q;
        self.q_area += area * q;
    }
}

// ──────────────────────────────── Tests ────────────────────────────────
