// Copyright 2025 Lars Brubaker
// License: MIT
//
// Voronoi dual of a Delaunay mesh. Every triangle contributes one dual
// vertex, its circumcenter; every hull edge contributes one more where its
// outward dual ray meets the clip box. Cells are read straight off the
// mesh by walking each generator's triangle fan, so the dual costs one
// circumcenter per triangle plus one walk per vertex.
//
// Design:
//   - Dual vertex ids are dense: circumcenters first, in triangle pool
//     order, then ray endpoints in the order their hull edges are met.
//   - A hull edge is seen from both of its endpoint cells; a cache keyed
//     by the edge's otri hands both cells the same ray endpoint id.
//   - Cells come out counterclockwise. Unbounded cells start and end with
//     a ray endpoint and are not closed.

pub mod bounded;

use std::collections::HashMap;

use log::warn;

use crate::geom::{box_ray_intersection, Point, Rect};
use crate::mesh::{Mesh, Otri, TriIdx, VertIdx, VertexKind, DUMMY};

/// One Voronoi cell.
#[derive(Clone, Debug)]
pub struct VoronoiRegion {
    /// The mesh vertex this cell belongs to.
    pub generator: VertIdx,
    /// Dual vertex ids, counterclockwise around the generator.
    pub polygon: Vec<u32>,
    /// False when the cell runs off the hull and is clipped by two rays.
    pub bounded: bool,
    /// For the polygon edge leaving a given dual vertex, the generator of
    /// the cell on the other side.
    pub neighbors: HashMap<u32, VertIdx>,
}

/// Voronoi diagram dual to a mesh. The mesh's vertex map must be current.
#[derive(Clone, Debug)]
pub struct Voronoi {
    /// Circumcenters of all triangles, then clipped ray endpoints; the
    /// total is triangle count plus hull size.
    pub vertices: Vec<Point>,
    /// One cell per living generator, in vertex pool order.
    pub regions: Vec<VoronoiRegion>,
    /// Box the boundary rays were clipped against.
    pub bounds: Rect,
}

impl Voronoi {
    pub fn new(mesh: &Mesh) -> Self {
        // Dense dual ids for the triangles, in pool order.
        let mut tri_ids = vec![u32::MAX; mesh.triangles.slots() as usize];
        let mut vertices: Vec<Point> = Vec::with_capacity(
            (mesh.triangles.count() + mesh.hullsize) as usize,
        );
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

        // Clip box: the input and every circumcenter, squared up with a
        // little margin so no ray endpoint lands on a dual vertex.
        let mut bounds = Rect::from_points(&vertices);
        bounds.expand(&Point::new(mesh.bounds.xmin, mesh.bounds.ymin));
        bounds.expand(&Point::new(mesh.bounds.xmax, mesh.bounds.ymax));
        bounds.square();
        let margin = 0.1 * bounds.width().max(1.0);
        bounds.xmin -= margin;
        bounds.ymin -= margin;
        bounds.xmax += margin;
        bounds.ymax += margin;

        let mut rays: HashMap<(TriIdx, u8), u32> = HashMap::new();
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
            let mut bounded = true;
            loop {
                let prev = mesh.oprev(f0);
                if prev.tri == DUMMY {
                    bounded = false;
                    break;
                }
                if prev == start {
                    break;
                }
                f0 = prev;
            }

            let mut polygon = Vec::new();
            let mut neighbors = HashMap::new();
            if bounded {
                let mut f = f0;
                loop {
                    let c = tri_ids[f.tri as usize];
                    polygon.push(c);
                    neighbors.insert(c, mesh.apex(f));
                    f = mesh.onext(f);
                    if f == f0 {
                        break;
                    }
                }
            } else {
                // The rewound handle views the hull edge leaving the
                // generator; its ray opens the cell.
                let r0 = ray_endpoint(mesh, f0, &tri_ids, &bounds, &mut vertices, &mut rays);
                polygon.push(r0);
                neighbors.insert(r0, mesh.dest(f0));

                let mut f = f0;
                loop {
                    let c = tri_ids[f.tri as usize];
                    polygon.push(c);
                    neighbors.insert(c, mesh.apex(f));
                    let next = mesh.onext(f);
                    if next.tri == DUMMY {
                        // The hull edge arriving at the generator closes it.
                        let r1 = ray_endpoint(
                            mesh,
                            f.lprev(),
                            &tri_ids,
                            &bounds,
                            &mut vertices,
                            &mut rays,
                        );
                        polygon.push(r1);
                        break;
                    }
                    f = next;
                }
            }

            regions.push(VoronoiRegion {
                generator: v,
                polygon,
                bounded,
                neighbors,
            });
        }

        Voronoi {
            vertices,
            regions,
            bounds,
        }
    }
}

/// Dual vertex id of the hull edge's clipped outward ray, creating it on
/// first sight. `hull` must view a hull edge from its triangle.
fn ray_endpoint(
    mesh: &Mesh,
    hull: Otri,
    tri_ids: &[u32],
    bounds: &Rect,
    vertices: &mut Vec<Point>,
    rays: &mut HashMap<(TriIdx, u8), u32>,
) -> u32 {
    debug_assert_eq!(mesh.sym(hull).tri, DUMMY);
    if let Some(&id) = rays.get(&(hull.tri, hull.orient)) {
        return id;
    }

    let org = mesh.vertex_point(mesh.org(hull));
    let dest = mesh.vertex_point(mesh.dest(hull));
    let cc = vertices[tri_ids[hull.tri as usize] as usize];
    // Outward is to the right of the hull edge.
    let px = dest.y - org.y;
    let py = org.x - dest.x;
    let end = box_ray_intersection(bounds, &cc, px, py)
        .unwrap_or_else(|| Point::new(cc.x + px, cc.y + py));

    let id = vertices.len() as u32;
    vertices.push(end);
    rays.insert((hull.tri, hull.orient), id);
    id
}

// ──────────────────────────────── Tests ────────────────────────────────
