// Copyright 2025 Lars Brubaker
// License: MIT
//
// Voronoi diagram clipped to a constrained mesh. Instead of running cells
// out to a box, every cell is cut back to the subsegments, so the diagram
// covers exactly the meshed domain. A triangle whose circumcenter cannot
// see all three of its corners without crossing a subsegment is "blinded"
// by that subsegment; blinded circumcenters are dropped from the cells
// around them and replaced by clip points on the blinding subsegment.
//
// Design:
//   - Blindness is tagged by flooding outward from each subsegment's two
//     incident triangles, never crossing another subsegment. The tag
//     remembers which subsegment blinded the triangle.
//   - Interior generators walk their full fan; hull generators open with
//     the generator itself and close with edge midpoints, so every cell
//     is a closed polygon.
//   - Cells carry raw points rather than shared dual vertex ids: clip
//     points are particular to the cell that produced them.
//
// Expects a mesh whose boundary is fully covered by subsegments, the
// normal state after segment insertion and hole carving. Subsegments with
// meshed triangles on both sides still clip, but a generator lying on one
// will see its cell pinched onto the subsegment.

use log::warn;

use crate::geom::{segments_intersect, Point};
use crate::mesh::{Mesh, Osub, Otri, SubIdx, TriIdx, VertIdx, VertexKind, DUMMY};

/// One clipped cell: the generator and its closed polygon, counterclockwise.
#[derive(Clone, Debug)]
pub struct BoundedCell {
    pub generator: VertIdx,
    pub polygon: Vec<Point>,
}

/// Voronoi diagram clipped to the mesh boundary.
#[derive(Clone, Debug)]
pub struct BoundedVoronoi {
    /// Circumcenters of all triangles, in triangle pool order.
    pub vertices: Vec<Point>,
    /// One cell per living generator, in vertex pool order.
    pub regions: Vec<BoundedCell>,
}

impl BoundedVoronoi {
    pub fn new(mesh: &Mesh) -> Self {
        let mut tri_ids = vec![u32::MAX; mesh.triangles.slots() as usize];
        let mut vertices: Vec<Point> = Vec::with_capacity(mesh.triangles.count() as usize);
        for tri in mesh.triangles.indices() {
            let [a, b, c] = mesh.triangles[tri].vertices;
            let (cc, _, _) = mesh.predicates.find_circumcenter(
                mesh.vertex_point(a),
                mesh.vertex_point(b),
                mesh.vertex_point(c),
                0.0,
            );
            tri_ids[tri as usize] = vertices.len() as u32;
            vertices.push(cc);
        }

        let blind = tag_blind_triangles(mesh, &tri_ids, &vertices);

        let mut regions = Vec::with_capacity(mesh.vertex_count() as usize);
        for (v, data) in mesh.vertices.iter() {
            if data.kind == VertexKind::Undead {
                continue;
            }
            let start = data.tri;
            if !mesh.triangles.is_live(start.tri) || mesh.org(start) != v {
                warn!(target: "voronoi", "vertex {} has a stale triangle link; skipped", v);
                continue;
            }

            // Rewind clockwise to the hull, or all the way around.
            let mut f0 = start;
            let mut interior = true;
            loop {
                let prev = mesh.oprev(f0);
                if prev.tri == DUMMY {
                    interior = false;
                    break;
                }
                if prev == start {
                    break;
                }
                f0 = prev;
            }

            let polygon = if interior {
                interior_cell(mesh, &blind, &tri_ids, &vertices, f0)
            } else {
                boundary_cell(mesh, &blind, &tri_ids, &vertices, v, f0)
            };
            regions.push(BoundedCell {
                generator: v,
                polygon,
            });
        }

        BoundedVoronoi { vertices, regions }
    }
}

/// For each triangle, the subsegment that blinds it, or DUMMY. Flooding
/// starts at each subsegment's incident triangles and spreads across
/// unconstrained edges only, so blindness cannot leak through another
/// subsegment.
fn tag_blind_triangles(mesh: &Mesh, tri_ids: &[u32], circumcenters: &[Point]) -> Vec<SubIdx> {
    let mut blind = vec![DUMMY; mesh.triangles.slots() as usize];
    let mut stack: Vec<Otri> = Vec::new();

    for (s, _) in mesh.subsegs.iter() {
        for side in [Osub::new(s, 0), Osub::new(s, 1)] {
            let f = mesh.stpivot(side);
            if f.tri != DUMMY && blind[f.tri as usize] == DUMMY {
                stack.push(f);
            }
        }

        while let Some(f) = stack.pop() {
            if blind[f.tri as usize] != DUMMY {
                continue;
            }
            let cc = circumcenters[tri_ids[f.tri as usize] as usize];
            if !triangle_is_blinded(mesh, f.tri, s, cc) {
                continue;
            }
            blind[f.tri as usize] = s;
            for orient in 0..3 {
                let edge = Otri::new(f.tri, orient);
                let n = mesh.sym(edge);
                if n.tri == DUMMY || blind[n.tri as usize] != DUMMY {
                    continue;
                }
                if mesh.tspivot(edge).seg != DUMMY {
                    continue;
                }
                stack.push(n);
            }
        }
    }

    blind
}

/// A triangle is blinded when the sight line from its circumcenter to one
/// of its corners crosses the subsegment.
fn triangle_is_blinded(mesh: &Mesh, tri: TriIdx, s: SubIdx, cc: Point) -> bool {
    let so = mesh.vertex_point(mesh.sorg(Osub::new(s, 0)));
    let sd = mesh.vertex_point(mesh.sdest(Osub::new(s, 0)));
    mesh.triangles[tri].vertices.iter().any(|&corner| {
        let p = mesh.vertex_point(corner);
        segments_intersect(&cc, &p, &so, &sd).is_some()
    })
}

/// Where the dual edge between two circumcenters crosses the subsegment,
/// if it does.
fn clip(mesh: &Mesh, s: SubIdx, a: Point, b: Point) -> Option<Point> {
    let so = mesh.vertex_point(mesh.sorg(Osub::new(s, 0)));
    let sd = mesh.vertex_point(mesh.sdest(Osub::new(s, 0)));
    segments_intersect(&a, &b, &so, &sd)
}

/// Emit the cell points contributed by the dual edge from `f` to `f_next`,
/// consecutive triangles of one generator's fan.
fn emit_step(
    mesh: &Mesh,
    blind: &[SubIdx],
    tri_ids: &[u32],
    circumcenters: &[Point],
    f: Otri,
    f_next: Otri,
    polygon: &mut Vec<Point>,
) {
    let cc_f = circumcenters[tri_ids[f.tri as usize] as usize];
    let cc_n = circumcenters[tri_ids[f_next.tri as usize] as usize];
    let bf = blind[f.tri as usize];
    let bn = blind[f_next.tri as usize];

    if bf == DUMMY {
        polygon.push(cc_f);
        if bn != DUMMY {
            if let Some(p) = clip(mesh, bn, cc_f, cc_n) {
                polygon.push(p);
            }
        }
    } else if bn == DUMMY {
        if let Some(p) = clip(mesh, bf, cc_f, cc_n) {
            polygon.push(p);
        }
    } else if bf != bn {
        // The dual edge passes from behind one subsegment to behind
        // another; both crossings bound the cell.
        if let Some(p) = clip(mesh, bf, cc_f, cc_n) {
            polygon.push(p);
        }
        if let Some(p) = clip(mesh, bn, cc_f, cc_n) {
            polygon.push(p);
        }
    }
}

fn interior_cell(
    mesh: &Mesh,
    blind: &[SubIdx],
    tri_ids: &[u32],
    circumcenters: &[Point],
    f0: Otri,
) -> Vec<Point> {
    let mut polygon = Vec::new();
    let mut f = f0;
    loop {
        let f_next = mesh.onext(f);
        emit_step(mesh, blind, tri_ids, circumcenters, f, f_next, &mut polygon);
        f = f_next;
        if f == f0 {
            break;
        }
    }
    polygon
}

/// A hull generator's cell: opened by the generator itself and the
/// midpoint of the hull edge leaving it, closed by the midpoint of the
/// hull edge arriving at it. `f0` views the leaving hull edge.
fn boundary_cell(
    mesh: &Mesh,
    blind: &[SubIdx],
    tri_ids: &[u32],
    circumcenters: &[Point],
    v: VertIdx,
    f0: Otri,
) -> Vec<Point> {
    let gen = mesh.vertex_point(v);
    let mut polygon = vec![gen, gen.midpoint(&mesh.vertex_point(mesh.dest(f0)))];

    let mut f = f0;
    loop {
        let f_next = mesh.onext(f);
        if f_next.tri == DUMMY {
            let cc = circumcenters[tri_ids[f.tri as usize] as usize];
            let m = gen.midpoint(&mesh.vertex_point(mesh.apex(f)));
            match blind[f.tri as usize] {
                DUMMY => polygon.push(cc),
                s => {
                    if let Some(p) = clip(mesh, s, cc, m) {
                        polygon.push(p);
                    }
                }
            }
            polygon.push(m);
            break;
        }
        emit_step(mesh, blind, tri_ids, circumcenters, f, f_next, &mut polygon);
        f = f_next;
    }
    polygon
}

// ──────────────────────────────── Tests ────────────────────────────────
