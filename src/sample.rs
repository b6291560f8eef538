// Copyright 2025 Lars Brubaker
// License: MIT
//
// Random triangle sampling for the point locator. The sample size grows
// with the cube root of the triangle count, which balances sampling cost
// against walk length. Draws are stratified across the pool's slot range
// and mapped to live slots by the caller, so a draw costs no pool scan
// here. The generator is seeded, making location (and everything layered
// on it) reproducible run to run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLE_FACTOR: u64 = 11;

pub struct Sampler {
    rng: StdRng,
    samples: u32,
    triangle_count: u32,
}

impl Sampler {
    pub fn new(seed: u64) -> Self {
        Sampler {
            rng: StdRng::seed_from_u64(seed),
            samples: 1,
            triangle_count: 0,
        }
    }

    pub fn reset(&mut self) {
        self.samples = 1;
        self.triangle_count = 0;
    }

    /// Track the triangle count, growing the sample size s until
    /// 11 s^3 >= count. Assumes the count never shrinks enough to matter.
    pub fn update(&mut self, count: u32) {
        if self.triangle_count != count {
            self.triangle_count = count;
            while SAMPLE_FACTOR * (self.samples as u64).pow(3) < count as u64 {
                self.samples += 1;
            }
        }
    }

    /// Draw one raw slot index per sample, stratified across `0..slots`.
    /// Raw draws may name vacant slots; callers map each to a live one.
    pub fn draw(&mut self, slots: u32) -> Vec<u32> {
        let mut picks = Vec::with_capacity(self.samples as usize);
        if slots == 0 {
            return picks;
        }
        let stride = (slots / self.samples).max(1);
        for i in 0..self.samples {
            let lo = i * stride;
            if lo >= slots {
                break;
            }
            let hi = if i + 1 == self.samples {
                slots
            } else {
                (lo + stride).min(slots)
            };
            picks.push(self.rng.random_range(lo..hi));
        }
        picks
    }
}

// ──────────────────────────────── Tests ────────────────────────────────
