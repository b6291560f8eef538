// Copyright 2025 Lars Brubaker
// License: MIT
//
// Adaptive-precision orientation and incircle tests, after Shewchuk. Each
// query first runs the cheap floating-point formula and accepts the result
// when its magnitude clears a forward error bound; only near-degenerate
// inputs fall through to the exact arithmetic in the `robust` crate. Cell
// counters record how often each stage settles a query, so callers can see
// how hard their input is leaning on the exact path.

use std::cell::Cell;

use robust::Coord;

use crate::geom::{Point, Real};

// One half the machine epsilon: the largest power of two such that
// 1.0 + EPSILON rounds to 1.0 in IEEE 754 double precision.
const EPSILON: Real = f64::EPSILON * 0.5;

// Forward error bounds for the naive determinant formulas, from Shewchuk's
// "Adaptive Precision Floating-Point Arithmetic and Fast Robust Geometric
// Predicates". A naive result smaller in magnitude than the bound cannot be
// trusted, not even for its sign.
const CCW_ERR_BOUND_A: Real = (3.0 + 16.0 * EPSILON) * EPSILON;
const ICC_ERR_BOUND_A: Real = (10.0 + 96.0 * EPSILON) * EPSILON;

#[inline]
fn coord(p: Point) -> Coord<Real> {
    Coord { x: p.x, y: p.y }
}

/// Snapshot of the filter counters, taken with [`Predicates::counters`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PredicateCounters {
    /// Orientation tests performed.
    pub ccw_tests: u64,
    /// Orientation tests that fell through to exact arithmetic.
    pub ccw_exact: u64,
    /// Incircle tests performed.
    pub incircle_tests: u64,
    /// Incircle tests that fell through to exact arithmetic.
    pub incircle_exact: u64,
}

/// Geometric predicate kernel. With `exact` enabled (the default for any
/// mesh built through this crate) every sign decision is reliable; without
/// it the naive formulas are returned as-is, which is only safe for inputs
/// known to be far from degenerate.
pub struct Predicates {
    exact: bool,
    ccw_tests: Cell<u64>,
    ccw_exact: Cell<u64>,
    incircle_tests: Cell<u64>,
    incircle_exact: Cell<u64>,
}

impl Predicates {
    pub fn new(exact: bool) -> Self {
        Predicates {
            exact,
            ccw_tests: Cell::new(0),
            ccw_exact: Cell::new(0),
            incircle_tests: Cell::new(0),
            incircle_exact: Cell::new(0),
        }
    }

    pub fn counters(&self) -> PredicateCounters {
        PredicateCounters {
            ccw_tests: self.ccw_tests.get(),
            ccw_exact: self.ccw_exact.get(),
            incircle_tests: self.incircle_tests.get(),
            incircle_exact: self.incircle_exact.get(),
        }
    }

    /// Twice the signed area of the triangle `pa`, `pb`, `pc`. Positive when
    /// the points wind counterclockwise, negative when clockwise, and exactly
    /// zero when they are collinear.
    pub fn counterclockwise(&self, pa: Point, pb: Point, pc: Point) -> Real {
        self.ccw_tests.set(self.ccw_tests.get() + 1);

        let detleft = (pa.x - pc.x) * (pb.y - pc.y);
        let detright = (pa.y - pc.y) * (pb.x - pc.x);
        let det = detleft - detright;

        if !self.exact {
            return det;
        }

        // When the two products differ in sign (or either is zero), the
        // subtraction cannot cancel and the naive sign is already exact.
        let detsum = if detleft > 0.0 {
            if detright <= 0.0 {
                return det;
            }
            detleft + detright
        } else if detleft < 0.0 {
            if detright >= 0.0 {
                return det;
            }
            -detleft - detright
        } else {
            return det;
        };

        let errbound = CCW_ERR_BOUND_A * detsum;
        if det >= errbound || -det >= errbound {
            return det;
        }

        self.ccw_exact.set(self.ccw_exact.get() + 1);
        robust::orient2d(coord(pa), coord(pb), coord(pc))
    }

    /// Incircle test. Positive when `pd` lies strictly inside the circle
    /// through `pa`, `pb`, `pc` (which must wind counterclockwise), negative
    /// outside, zero when all four are cocircular.
    pub fn incircle(&self, pa: Point, pb: Point, pc: Point, pd: Point) -> Real {
        self.incircle_tests.set(self.incircle_tests.get() + 1);

        let adx = pa.x - pd.x;
        let bdx = pb.x - pd.x;
        let cdx = pc.x - pd.x;
        let ady = pa.y - pd.y;
        let bdy = pb.y - pd.y;
        let cdy = pc.y - pd.y;

        let bdxcdy = bdx * cdy;
        let cdxbdy = cdx * bdy;
        let alift = adx * adx + ady * ady;

        let cdxady = cdx * ady;
        let adxcdy = adx * cdy;
        let blift = bdx * bdx + bdy * bdy;

        let adxbdy = adx * bdy;
        let bdxady = bdx * ady;
        let clift = cdx * cdx + cdy * cdy;

        let det =
            alift * (bdxcdy - cdxbdy) + blift * (cdxady - adxcdy) + clift * (adxbdy - bdxady);

        if !self.exact {
            return det;
        }

        let permanent = (bdxcdy.abs() + cdxbdy.abs()) * alift
            + (cdxady.abs() + adxcdy.abs()) * blift
            + (adxbdy.abs() + bdxady.abs()) * clift;
        let errbound = ICC_ERR_BOUND_A * permanent;
        if det > errbound || -det > errbound {
            return det;
        }

        self.incircle_exact.set(self.incircle_exact.get() + 1);
        robust::incircle(coord(pa), coord(pb), coord(pc), coord(pd))
    }

    /// Circumcenter of the counterclockwise triangle `org`, `dest`, `apex`.
    ///
    /// With a positive `offconstant` the result is Üngör's off-center: a
    /// point shifted off the shortest edge, used instead of the circumcenter
    /// whenever it lies closer to that edge. Also returns `(xi, eta)`, the
    /// center's coordinates in the frame spanned by the org→dest and
    /// org→apex axes, for interpolating vertex data at the new point.
    pub fn find_circumcenter(
        &self,
        org: Point,
        dest: Point,
        apex: Point,
        offconstant: Real,
    ) -> (Point, Real, Real) {
        let xdo = dest.x - org.x;
        let ydo = dest.y - org.y;
        let xao = apex.x - org.x;
        let yao = apex.y - org.y;
        let dodist = xdo * xdo + ydo * ydo;
        let aodist = xao * xao + yao * yao;
        let dadist =
            (dest.x - apex.x) * (dest.x - apex.x) + (dest.y - apex.y) * (dest.y - apex.y);

        // In exact mode the divisor goes through the adaptive orientation
        // test, which keeps it positive for any noncollinear triple.
        let denominator = if self.exact {
            0.5 / self.counterclockwise(dest, apex, org)
        } else {
            0.5 / (xdo * yao - xao * ydo)
        };

        let mut dx = (yao * dodist - ydo * aodist) * denominator;
        let mut dy = (xdo * aodist - xao * dodist) * denominator;

        // Identify the shortest edge and, if requested, slide the new point
        // toward it. Three cases: shortest is org-dest, org-apex, dest-apex.
        if dodist < aodist && dodist < dadist {
            if offconstant > 0.0 {
                let dxoff = 0.5 * xdo - offconstant * ydo;
                let dyoff = 0.5 * ydo + offconstant * xdo;
                if dxoff * dxoff + dyoff * dyoff < dx * dx + dy * dy {
                    dx = dxoff;
                    dy = dyoff;
                }
            }
        } else if aodist < dadist {
            if offconstant > 0.0 {
                let dxoff = 0.5 * xao + offconstant * yao;
                let dyoff = 0.5 * yao - offconstant * xao;
                if dxoff * dxoff + dyoff * dyoff < dx * dx + dy * dy {
                    dx = dxoff;
                    dy = dyoff;
                }
            }
        } else if offconstant > 0.0 {
            let dxoff = 0.5 * (apex.x - dest.x) - offconstant * (apex.y - dest.y);
            let dyoff = 0.5 * (apex.y - dest.y) + offconstant * (apex.x - dest.x);
            // Here the distance is measured from the destination vertex.
            if dxoff * dxoff + dyoff * dyoff < (dx - xdo) * (dx - xdo) + (dy - ydo) * (dy - ydo) {
                dx = xdo + dxoff;
                dy = ydo + dyoff;
            }
        }

        let xi = (yao * dx - xao * dy) * (2.0 * denominator);
        let eta = (xdo * dy - ydo * dx) * (2.0 * denominator);

        (Point::new(org.x + dx, org.y + dy), xi, eta)
    }
}

// ──────────────────────────────── Tests ────────────────────────────────
