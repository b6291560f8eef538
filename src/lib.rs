// trigon: planar Delaunay mesh kernel
// Copyright 2025 Lars Brubaker
// License: MIT
//
// Constrained Delaunay triangulation over pooled, index-based topology,
// with hole/region carving, Voronoi duals, structural validators, and mesh
// quality reporting. Geometry decisions go through adaptive predicates
// that fall back to exact arithmetic only when floating point cannot
// certify a sign.

pub mod adjacency;
pub mod carver;
pub mod error;
pub mod geom;
pub mod mesh;
pub mod pool;
pub mod predicates;
pub mod quality;
pub mod sample;
pub mod sort;
pub mod validator;
pub mod voronoi;

pub use adjacency::AdjacencyMatrix;
pub use carver::Carver;
pub use error::{MeshError, Result};
pub use geom::{Point, Real, Rect};
pub use mesh::build::{triangulate, Pslg, Segment};
pub use mesh::locate::LocateResult;
pub use mesh::{Behavior, Mesh, Osub, Otri, Region, VertexKind};
pub use predicates::{PredicateCounters, Predicates};
pub use quality::{QualityMeasure, Statistic};
pub use sample::Sampler;
pub use sort::VertexSorter;
pub use validator::{check_delaunay, check_mesh};
pub use voronoi::bounded::{BoundedCell, BoundedVoronoi};
pub use voronoi::{Voronoi, VoronoiRegion};
