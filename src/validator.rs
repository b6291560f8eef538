// Copyright 2025 Lars Brubaker
// License: MIT
//
// Structural checks for a built mesh. These never panic and never return
// structured errors: a corrupt mesh is interrogated through the pools'
// checked accessors, every problem found is logged as a warning, and the
// caller gets a single bool. Both checks always run with exact arithmetic,
// whatever the mesh was built with.

use log::{info, warn};

use crate::mesh::{Mesh, Otri, VertexKind, DUMMY};
use crate::predicates::Predicates;

/// Verify the topological consistency of the mesh: every triangle is
/// positively oriented, neighbor links are reciprocal, both sides of every
/// shared edge agree on its endpoints, and every living vertex points at a
/// triangle that owns it.
pub fn check_mesh(mesh: &Mesh) -> bool {
    let exact = Predicates::new(true);
    let mut horrors = 0u32;

    for tri in mesh.triangles.indices() {
        for orient in 0..3u8 {
            let t = Otri::new(tri, orient);
            let org = mesh.org(t);
            let dest = mesh.dest(t);

            if orient == 0 {
                let apex = mesh.apex(t);
                match (
                    mesh.vertices.get(org),
                    mesh.vertices.get(dest),
                    mesh.vertices.get(apex),
                ) {
                    (Some(po), Some(pd), Some(pa)) => {
                        if exact.counterclockwise(po.point(), pd.point(), pa.point()) <= 0.0 {
                            warn!(target: "check", "triangle {} is flat or inverted", tri);
                            horrors += 1;
                        }
                    }
                    _ => {
                        warn!(target: "check", "triangle {} has a dead corner", tri);
                        horrors += 1;
                    }
                }
            }

            let neighbor = mesh.sym(t);
            if neighbor.tri == DUMMY {
                continue;
            }
            match mesh.triangles.get(neighbor.tri) {
                None => {
                    warn!(
                        target: "check",
                        "triangle {} edge {} abuts a dead triangle", tri, orient
                    );
                    horrors += 1;
                }
                Some(data) => {
                    let back = data.neighbors[neighbor.orient as usize];
                    if back != t {
                        warn!(
                            target: "check",
                            "asymmetric neighbor link between triangles {} and {}",
                            tri, neighbor.tri
                        );
                        horrors += 1;
                    }
                    if mesh.org(neighbor) != dest || mesh.dest(neighbor) != org {
                        warn!(
                            target: "check",
                            "mismatched edge endpoints between triangles {} and {}",
                            tri, neighbor.tri
                        );
                        horrors += 1;
                    }
                }
            }
        }
    }

    for (v, data) in mesh.vertices.iter() {
        if data.kind == VertexKind::Undead {
            continue;
        }
        let home = data.tri;
        let owned = home.tri != DUMMY
            && mesh.triangles.is_live(home.tri)
            && mesh.org(home) == v;
        if !owned {
            warn!(target: "check", "vertex {} is not connected to a live triangle", v);
            horrors += 1;
        }
    }

    if horrors == 0 {
        info!(
            target: "check",
            "consistency check: {} triangles look fine",
            mesh.triangles.count()
        );
    } else {
        warn!(target: "check", "consistency check: {} problems", horrors);
    }
    horrors == 0
}

/// Verify that every unconstrained internal edge is locally Delaunay. Each
/// shared edge is tested from the lower-numbered triangle only.
pub fn check_delaunay(mesh: &Mesh) -> bool {
    let exact = Predicates::new(true);
    let mut horrors = 0u32;

    for tri in mesh.triangles.indices() {
        for orient in 0..3u8 {
            let t = Otri::new(tri, orient);
            let neighbor = mesh.sym(t);
            if neighbor.tri == DUMMY
                || !mesh.triangles.is_live(neighbor.tri)
                || t.tri >= neighbor.tri
            {
                continue;
            }

            let org = mesh.org(t);
            let dest = mesh.dest(t);
            let apex = mesh.apex(t);
            let far = mesh.apex(neighbor);
            if [org, dest, apex, far].iter().any(|&v| mesh.is_inf(v)) {
                continue;
            }
            // Constrained edges are exempt.
            if mesh.checksegments && mesh.tspivot(t).seg != DUMMY {
                continue;
            }

            let incircle = exact.incircle(
                mesh.vertex_point(org),
                mesh.vertex_point(dest),
                mesh.vertex_point(apex),
                mesh.vertex_point(far),
            );
            if incircle > 0.0 {
                warn!(
                    target: "check",
                    "edge between triangles {} and {} is not locally Delaunay",
                    tri, neighbor.tri
                );
                horrors += 1;
            }
        }
    }

    if horrors == 0 {
        info!(target: "check", "the mesh is (constrained) Delaunay");
    } else {
        warn!(target: "check", "Delaunay check: {} non-regular edges", horrors);
    }
    horrors == 0
}

// ──────────────────────────────── Tests ────────────────────────────────
