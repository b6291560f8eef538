// Copyright 2025 Lars Brubaker
// License: MIT
//
// Point ordering for divide-and-conquer consumers. `sort` is a randomized
// quicksort over (x, then y) with an insertion-sort floor. `alternate_axes`
// arranges a slice for alternating cuts: a quickselect places the median
// on one axis, then each half is split on the other axis, recursively.
// The partition scheme leaves pivot-valued elements between the two scan
// positions, so neither recursion revisits them.
//
// All randomness comes from a caller-seeded generator; the same seed over
// the same input always yields the same order.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geom::Point;

const INSERTION_CUTOFF: usize = 32;

pub struct VertexSorter {
    rng: StdRng,
}

impl VertexSorter {
    pub fn new(seed: u64) -> Self {
        VertexSorter {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Sort points by x, breaking ties by y.
    pub fn sort(&mut self, points: &mut [Point]) {
        let n = points.len();
        if n < INSERTION_CUTOFF {
            for i in 1..n {
                let a = points[i];
                let mut j = i;
                while j > 0 && axis_less(&a, &points[j - 1], 0) {
                    points[j] = points[j - 1];
                    j -= 1;
                }
                points[j] = a;
            }
            return;
        }

        let pivot = points[self.rng.random_range(0..n)];
        let mut left: isize = -1;
        let mut right: isize = n as isize;
        while left < right {
            loop {
                left += 1;
                if !(left <= right && axis_less(&points[left as usize], &pivot, 0)) {
                    break;
                }
            }
            loop {
                right -= 1;
                if !(left <= right && axis_less(&pivot, &points[right as usize], 0)) {
                    break;
                }
            }
            if left < right {
                points.swap(left as usize, right as usize);
            }
        }

        // Elements caught between the scans equal the pivot and are done.
        if left > 1 {
            self.sort(&mut points[..left as usize]);
        }
        if right < n as isize - 2 {
            self.sort(&mut points[(right + 1) as usize..]);
        }
    }

    /// Arrange points so recursive halving alternates between vertical and
    /// horizontal cuts: the first cut splits at the x-median, the halves at
    /// their y-medians, and so on.
    pub fn alternate_axes(&mut self, points: &mut [Point]) {
        self.alternate(points, 0);
    }

    fn alternate(&mut self, points: &mut [Point], axis: usize) {
        let n = points.len();
        let divider = n >> 1;
        // Two or three points are handled specially downstream and want
        // plain x-order.
        let axis = if n <= 3 { 0 } else { axis };

        self.median_split(points, divider, axis);

        if n - divider >= 2 {
            if divider >= 2 {
                self.alternate(&mut points[..divider], 1 - axis);
            }
            self.alternate(&mut points[divider..], 1 - axis);
        }
    }

    /// Quickselect: put the rank-`median` point (by the given axis) at
    /// index `median`, smaller points before it, larger after it.
    fn median_split(&mut self, points: &mut [Point], median: usize, axis: usize) {
        let n = points.len();
        if n < 2 {
            return;
        }
        if n == 2 {
            if axis_less(&points[1], &points[0], axis) {
                points.swap(0, 1);
            }
            return;
        }

        let pivot = points[self.rng.random_range(0..n)];
        let mut left: isize = -1;
        let mut right: isize = n as isize;
        while left < right {
            loop {
                left += 1;
                if !(left <= right && axis_less(&points[left as usize], &pivot, axis)) {
                    break;
                }
            }
            loop {
                right -= 1;
                if !(left <= right && axis_less(&pivot, &points[right as usize], axis)) {
                    break;
                }
            }
            if left < right {
                points.swap(left as usize, right as usize);
            }
        }

        // At most one side still contains the median position.
        if left > median as isize {
            self.median_split(&mut points[..left as usize], median, axis);
        }
        if (right + 1) < median as isize {
            let offset = (right + 1) as usize;
            self.median_split(&mut points[offset..], median - offset, axis);
        }
    }
}

/// Lexicographic order on (primary, secondary) coordinate for the axis:
/// axis 0 compares x then y, axis 1 compares y then x.
fn axis_less(p: &Point, q: &Point, axis: usize) -> bool {
    let (pk, ps) = if axis == 0 { (p.x, p.y) } else { (p.y, p.x) };
    let (qk, qs) = if axis == 0 { (q.x, q.y) } else { (q.y, q.x) };
    pk < qk || (pk == qk && ps < qs)
}

// ──────────────────────────────── Tests ────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scrambled(n: usize, seed: u64) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| Point::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0)))
            .collect()
    }

    #[test]
    fn sort_orders_lexicographically() {
        let mut points = scrambled(100, 3);
        // A couple of exact duplicates and an x-tie.
        points.push(points[10]);
        points.push(Point::new(points[20].x, -10.0));
        let mut sorter = VertexSorter::new(1);
        sorter.sort(&mut points);
        for w in points.windows(2) {
            assert!(!axis_less(&w[1], &w[0], 0), "{:?} before {:?}", w[0], w[1]);
        }
    }

    #[test]
    fn short_slices_sort_too() {
        let mut points = scrambled(9, 4);
        VertexSorter::new(1).sort(&mut points);
        for w in points.windows(2) {
            assert!(!axis_less(&w[1], &w[0], 0));
        }
    }

    #[test]
    fn alternate_axes_splits_by_medians() {
        let mut points = scrambled(64, 5);
        let mut sorter = VertexSorter::new(9);
        sorter.alternate_axes(&mut points);

        // Top split is by x.
        let divider = points.len() >> 1;
        let left_max = points[..divider]
            .iter()
            .cloned()
            .reduce(|a, b| if axis_less(&a, &b, 0) { b } else { a })
            .unwrap();
        let right_min = points[divider..]
            .iter()
            .cloned()
            .reduce(|a, b| if axis_less(&a, &b, 0) { a } else { b })
            .unwrap();
        assert!(!axis_less(&right_min, &left_max, 0));

        // Each half then splits by y.
        for half in [&points[..divider], &points[divider..]] {
            let mid = half.len() >> 1;
            let below = half[..mid]
                .iter()
                .cloned()
                .reduce(|a, b| if axis_less(&a, &b, 1) { b } else { a })
                .unwrap();
            let above = half[mid..]
                .iter()
                .cloned()
                .reduce(|a, b| if axis_less(&a, &b, 1) { a } else { b })
                .unwrap();
            assert!(!axis_less(&above, &below, 1));
        }
    }

    #[test]
    fn sorting_is_deterministic_for_a_seed() {
        let points = scrambled(200, 6);
        let mut first = points.clone();
        let mut second = points;
        VertexSorter::new(11).sort(&mut first);
        VertexSorter::new(11).sort(&mut second);
        assert_eq!(first, second);
    }
}
