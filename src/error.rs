// Copyright 2025 Lars Brubaker
// License: MIT
//
// Errors reported while building a mesh from user input. Structural problems
// found in an already-built mesh are never returned as errors; the validator
// logs and counts them instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// Fewer than three input points.
    #[error("triangulation needs at least 3 points, got {0}")]
    TooFewPoints(usize),

    /// Every input point lies on a single line.
    #[error("input points are all collinear")]
    AllCollinear,

    /// A segment endpoint index does not refer to an input point.
    #[error("segment {segment} references point {index}, but only {count} points were given")]
    SegmentOutOfRange {
        segment: usize,
        index: usize,
        count: usize,
    },

    /// A segment could not be recovered as a mesh edge. Segments may share
    /// endpoints but must not cross each other.
    #[error("segment from point {0} to point {1} cannot be recovered as an edge")]
    InvalidSegment(usize, usize),
}

pub type Result<T> = std::result::Result<T, MeshError>;
