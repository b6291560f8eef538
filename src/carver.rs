// Copyright 2025 Lars Brubaker
// License: MIT
//
// Hole and concavity removal by virus infection. Triangles outside the
// domain are marked infected and the infection spreads across every edge
// not protected by a subsegment: seeded at hull edges it eats concavities,
// seeded at hole points it eats holes. A second pass deletes the infected
// triangles, demotes vertices stranded by the deletion, and mends the
// boundary bookkeeping. Region seeds reuse the same flood to stamp
// attributes and area constraints without deleting anything.
//
// Design:
//   - Infection state lives in a side table indexed by triangle slot, not
//     in the triangle records; the mesh never sees half-carved state.
//   - The worklist doubles as the deletion list: plague() walks it once to
//     spread and once to delete.

use log::info;

use crate::geom::Real;
use crate::mesh::locate::LocateResult;
use crate::mesh::{Mesh, Otri, VertexKind, DUMMY, INVALID};

/// One carving pass over a mesh. Borrows the mesh for its lifetime; the
/// infection side table dies with it.
pub struct Carver<'a> {
    mesh: &'a mut Mesh,
    infected: Vec<bool>,
}

impl<'a> Carver<'a> {
    pub fn new(mesh: &'a mut Mesh) -> Self {
        let slots = mesh.triangles.slots() as usize;
        Carver {
            mesh,
            infected: vec![false; slots],
        }
    }

    /// Carve concavities, holes, and regions: remove every triangle
    /// reachable from outside the segment-bounded domain, then stamp
    /// region attributes and area constraints.
    pub fn carve_holes(&mut self) {
        let before = self.mesh.triangles.count();

        if !self.mesh.behavior.convex {
            self.infect_hull();
        }

        // Hole seeds infect the triangle they fall in. The mesh is still
        // whole here, so plain point location works.
        let holes = self.mesh.holes.clone();
        let hull = self.mesh.hull_otri();
        for hole in holes {
            if !self.mesh.bounds.contains(&hole) {
                continue;
            }
            // A point right of any hull edge is outside the mesh.
            let inside_hull = match hull {
                Some(h) => {
                    let org = self.mesh.vertex_point(self.mesh.org(h));
                    let dest = self.mesh.vertex_point(self.mesh.dest(h));
                    self.mesh.predicates.counterclockwise(org, dest, hole) > 0.0
                }
                None => false,
            };
            if !inside_hull {
                continue;
            }
            let (loc, t) = self.mesh.locate(hole);
            if loc != LocateResult::Outside && !self.infected[t.tri as usize] {
                self.infect(t);
            }
        }

        // Region seeds must be located before carving: point location
        // cannot be trusted once the triangulation has holes in it.
        let regions = self.mesh.regions.clone();
        let mut regiontris: Vec<Otri> = Vec::with_capacity(regions.len());
        for region in &regions {
            let mut found = Otri::default();
            if self.mesh.bounds.contains(&region.point) {
                let inside_hull = match hull {
                    Some(h) => {
                        let org = self.mesh.vertex_point(self.mesh.org(h));
                        let dest = self.mesh.vertex_point(self.mesh.dest(h));
                        self.mesh
                            .predicates
                            .counterclockwise(org, dest, region.point)
                            > 0.0
                    }
                    None => false,
                };
                if inside_hull {
                    let (loc, t) = self.mesh.locate(region.point);
                    if loc != LocateResult::Outside && !self.infected[t.tri as usize] {
                        found = t;
                    }
                }
            }
            regiontris.push(found);
        }

        if !self.mesh.viruses.is_empty() {
            self.plague();
        }

        if !regions.is_empty() {
            if self.mesh.behavior.regionattrib {
                // Every triangle gains one attribute, zero outside any region.
                for (_, tri) in self.mesh.triangles.iter_mut() {
                    tri.attributes.push(0.0);
                }
                self.mesh.eextras += 1;
            }
            for (region, &seed) in regions.iter().zip(&regiontris) {
                // The seed triangle may have been eaten by the virus.
                if seed.tri != DUMMY && self.mesh.triangles.is_live(seed.tri) {
                    self.infect(seed);
                    self.region_plague(region.attribute, region.area);
                }
            }
        }

        self.mesh.make_vertex_map();
        // The plague already kept hullsize current edge by edge.
        debug_assert_eq!(self.mesh.hullsize, self.mesh.count_hull_edges());
        self.mesh.edges = (3 * self.mesh.triangles.count() + self.mesh.hullsize) / 2;
        self.mesh.recenttri = Otri::default();

        info!(
            target: "carve",
            "carved {} of {} triangles; {} boundary edges remain",
            before - self.mesh.triangles.count(),
            before,
            self.mesh.hullsize
        );
    }

    fn infect(&mut self, t: Otri) {
        self.infected[t.tri as usize] = true;
        self.mesh.viruses.push(t);
    }

    /// Walk once counterclockwise around the convex hull, infecting every
    /// unprotected triangle met on the way. Protected hull edges become
    /// boundary: their subsegment and endpoints get marked.
    pub(crate) fn infect_hull(&mut self) {
        let start = match self.mesh.hull_otri() {
            Some(t) => t,
            None => return,
        };
        let mut hulltri = start;
        loop {
            if !self.infected[hulltri.tri as usize] {
                let subseg = self.mesh.tspivot(hulltri);
                if subseg.seg == DUMMY {
                    self.infect(hulltri);
                } else {
                    if self.mesh.subsegs[subseg.seg].marker == 0 {
                        self.mesh.subsegs[subseg.seg].marker = 1;
                    }
                    let org = self.mesh.org(hulltri);
                    let dest = self.mesh.dest(hulltri);
                    if self.mesh.vertices[org].mark == 0 {
                        self.mesh.vertices[org].mark = 1;
                    }
                    if self.mesh.vertices[dest].mark == 0 {
                        self.mesh.vertices[dest].mark = 1;
                    }
                }
            }
            // Next hull edge: clockwise around the destination vertex.
            hulltri = hulltri.lnext();
            let mut next = self.mesh.oprev(hulltri);
            while next.tri != DUMMY {
                hulltri = next;
                next = self.mesh.oprev(hulltri);
            }
            if hulltri == start {
                break;
            }
        }
    }

    /// Spread the infection across every unprotected edge, then delete the
    /// infected triangles. Subsegments between two dying triangles die
    /// too; subsegments shielding a survivor become boundary. Vertices
    /// left without a live triangle are demoted to undead.
    pub(crate) fn plague(&mut self) {
        // Spread. The worklist grows as it is walked.
        let mut i = 0;
        while i < self.mesh.viruses.len() {
            let tri = self.mesh.viruses[i].tri;
            i += 1;
            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                let neighbor = self.mesh.sym(t);
                let subseg = self.mesh.tspivot(t);
                if neighbor.tri == DUMMY || self.infected[neighbor.tri as usize] {
                    if subseg.seg != DUMMY {
                        // Both sides of the subsegment are dying.
                        self.mesh.tsdissolve(t);
                        if neighbor.tri != DUMMY {
                            self.mesh.tsdissolve(neighbor);
                        }
                        self.mesh.subseg_dealloc(subseg.seg);
                    }
                } else if subseg.seg == DUMMY {
                    self.infect(neighbor);
                } else {
                    // The subsegment shields a survivor; it becomes
                    // boundary and drops its link to the dying side.
                    self.mesh.stdissolve(subseg);
                    if self.mesh.subsegs[subseg.seg].marker == 0 {
                        self.mesh.subsegs[subseg.seg].marker = 1;
                    }
                    let norg = self.mesh.org(neighbor);
                    let ndest = self.mesh.dest(neighbor);
                    if self.mesh.vertices[norg].mark == 0 {
                        self.mesh.vertices[norg].mark = 1;
                    }
                    if self.mesh.vertices[ndest].mark == 0 {
                        self.mesh.vertices[ndest].mark = 1;
                    }
                }
            }
        }

        // Delete. Corners are nulled as their vertices are tested so each
        // vertex is judged once, on the first dying triangle that owns it.
        let mut stranded = 0u32;
        for i in 0..self.mesh.viruses.len() {
            let tri = self.mesh.viruses[i].tri;

            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                let v = self.mesh.org(t);
                if v == INVALID {
                    continue;
                }
                let mut killorg = true;
                self.mesh.set_org(t, INVALID);
                // Counterclockwise around the vertex.
                let mut neighbor = self.mesh.onext(t);
                while neighbor.tri != DUMMY && neighbor != t {
                    if self.infected[neighbor.tri as usize] {
                        self.mesh.set_org(neighbor, INVALID);
                    } else {
                        killorg = false;
                    }
                    neighbor = self.mesh.onext(neighbor);
                }
                // Hit the boundary: cover the other side too.
                if neighbor.tri == DUMMY {
                    let mut neighbor = self.mesh.oprev(t);
                    while neighbor.tri != DUMMY {
                        if self.infected[neighbor.tri as usize] {
                            self.mesh.set_org(neighbor, INVALID);
                        } else {
                            killorg = false;
                        }
                        neighbor = self.mesh.oprev(neighbor);
                    }
                }
                if killorg {
                    self.mesh.vertices[v].kind = VertexKind::Undead;
                    self.mesh.undeads += 1;
                    stranded += 1;
                }
            }

            // Unhook and delete the triangle. Every dissolved edge turns
            // into boundary for the survivor.
            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                let neighbor = self.mesh.sym(t);
                if neighbor.tri == DUMMY {
                    self.mesh.hullsize -= 1;
                } else {
                    self.mesh.dissolve(neighbor);
                    self.mesh.hullsize += 1;
                }
            }
            self.mesh.triangle_dealloc(tri);
        }

        self.mesh.viruses.clear();
        for flag in self.infected.iter_mut() {
            *flag = false;
        }
        if stranded > 0 {
            info!(target: "carve", "{} vertices stranded by carving", stranded);
        }
    }

    /// Flood one region from its seed, stamping the attribute and area
    /// constraint, without deleting anything. The infection stops at
    /// subsegments exactly like the plague does.
    pub(crate) fn region_plague(&mut self, attribute: Real, area: Real) {
        let mut i = 0;
        while i < self.mesh.viruses.len() {
            let tri = self.mesh.viruses[i].tri;
            i += 1;
            if self.mesh.behavior.regionattrib {
                let last = self.mesh.eextras - 1;
                self.mesh.triangles[tri].attributes[last] = attribute;
            }
            if self.mesh.behavior.vararea {
                self.mesh.triangles[tri].area = area;
            }
            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                let neighbor = self.mesh.sym(t);
                let subseg = self.mesh.tspivot(t);
                if neighbor.tri != DUMMY
                    && !self.infected[neighbor.tri as usize]
                    && subseg.seg == DUMMY
                {
                    self.infect(neighbor);
                }
            }
        }

        for t in self.mesh.viruses.drain(..) {
            self.infected[t.tri as usize] = false;
        }
    }
}

impl Mesh {
    /// Apply the stored hole and region seeds. See [`Carver`].
    pub fn carve_holes(&mut self) {
        Carver::new(self).carve_holes();
    }
}

// ──────────────────────────────── Tests ────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::mesh::build::{triangulate, Pslg, Segment};
    use crate::mesh::Behavior;

    fn ring(pslg: &mut Pslg, from: usize, count: usize) {
        for i in 0..count {
            pslg.segments
                .push(Segment::new(from + i, from + (i + 1) % count));
        }
    }

    // Outer square with a square hole punched out of the middle.
    fn donut() -> Pslg {
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

    #[test]
    fn hole_is_carved_out() {
        let mut mesh = triangulate(&donut(), Behavior::default()).unwrap();
        mesh.carve_holes();

        assert_eq!(mesh.triangles.count(), 8);
        assert_eq!(mesh.vertex_count(), 8);
        // Inner and outer boundaries both count.
        assert_eq!(mesh.hullsize, 8);
        assert_eq!(mesh.edges, 16);
        assert_eq!(mesh.subsegs.count(), 8);

        // No surviving triangle contains the hole point.
        let hole = Point::new(1.5, 1.5);
        for (_, tri) in mesh.triangles.iter() {
            let [a, b, c] = tri.vertices;
            let pa = mesh.vertex_point(a);
            let pb = mesh.vertex_point(b);
            let pc = mesh.vertex_point(c);
            let inside = mesh.predicates.counterclockwise(pa, pb, hole) > 0.0
                && mesh.predicates.counterclockwise(pb, pc, hole) > 0.0
                && mesh.predicates.counterclockwise(pc, pa, hole) > 0.0;
            assert!(!inside, "hole point survives in a triangle");
        }
    }

    #[test]
    fn concavity_is_carved() {
        // L-shaped outline; the convex hull covers the notch, carving
        // removes it.
        let mut pslg = Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 2.0),
            Point::new(0.0, 2.0),
        ]);
        ring(&mut pslg, 0, 6);
        let mut mesh = triangulate(&pslg, Behavior::default()).unwrap();
        mesh.carve_holes();

        assert_eq!(mesh.triangles.count(), 4);
        assert_eq!(mesh.hullsize, 6);

        // The notch interior is gone.
        let notch = Point::new(1.4, 1.4);
        for (_, tri) in mesh.triangles.iter() {
            let [a, b, c] = tri.vertices;
            let pa = mesh.vertex_point(a);
            let pb = mesh.vertex_point(b);
            let pc = mesh.vertex_point(c);
            let inside = mesh.predicates.counterclockwise(pa, pb, notch) >= 0.0
                && mesh.predicates.counterclockwise(pb, pc, notch) >= 0.0
                && mesh.predicates.counterclockwise(pc, pa, notch) >= 0.0;
            assert!(!inside);
        }
    }

    #[test]
    fn convex_behavior_keeps_the_hull() {
        let mut pslg = Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 2.0),
            Point::new(0.0, 2.0),
        ]);
        ring(&mut pslg, 0, 6);
        let mut behavior = Behavior::default();
        behavior.convex = true;
        let mut mesh = triangulate(&pslg, behavior).unwrap();
        let before = mesh.triangles.count();
        mesh.carve_holes();
        // Nothing to remove: no holes, and the hull is kept.
        assert_eq!(mesh.triangles.count(), before);
    }

    #[test]
    fn stranded_vertex_goes_undead() {
        let mut pslg = donut();
        // A vertex inside the hole; carving strands it.
        pslg.points.push(Point::new(1.5, 1.5));
        pslg.holes.clear();
        pslg.holes.push(Point::new(1.2, 1.2));
        let mut mesh = triangulate(&pslg, Behavior::default()).unwrap();
        mesh.carve_holes();

        assert_eq!(mesh.undeads, 1);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangles.count(), 8);
    }

    #[test]
    fn regions_stamp_attributes_and_areas() {
        // Unit square split in two by a forced diagonal; one region seed
        // per half.
        let mut pslg = Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        ring(&mut pslg, 0, 4);
        pslg.segments.push(Segment::new(0, 2));
        pslg.regions.push(crate::mesh::Region {
            point: Point::new(0.7, 0.3),
            attribute: 10.0,
            area: 0.25,
        });
        pslg.regions.push(crate::mesh::Region {
            point: Point::new(0.3, 0.7),
            attribute: 20.0,
            area: -1.0,
        });

        let mut behavior = Behavior::default();
        behavior.regionattrib = true;
        behavior.vararea = true;
        let mut mesh = triangulate(&pslg, behavior).unwrap();
        mesh.carve_holes();

        assert_eq!(mesh.triangles.count(), 2);
        assert_eq!(mesh.eextras, 1);

        let mut attrs: Vec<f64> = mesh
            .triangles
            .iter()
            .map(|(_, tri)| tri.attributes[0])
            .collect();
        attrs.sort_by(|l, r| l.partial_cmp(r).unwrap());
        assert_eq!(attrs, vec![10.0, 20.0]);

        // The area constraint followed the first region only.
        let areas: Vec<f64> = mesh.triangles.iter().map(|(_, tri)| tri.area).collect();
        assert!(areas.contains(&0.25));
        assert!(areas.contains(&-1.0));
    }

    #[test]
    fn virus_worklist_is_drained() {
        let mut mesh = triangulate(&donut(), Behavior::default()).unwrap();
        mesh.carve_holes();
        assert!(mesh.viruses.is_empty());
    }
}
