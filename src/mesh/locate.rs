// Copyright 2025 Lars Brubaker
// License: MIT
//
// Point location by jump-and-walk. A handful of pool slots are sampled at
// random, the walk starts from whichever candidate origin lies closest to
// the query (the most recently visited triangle included), then marches
// across edges toward the point. Expected cost is O(n^1/3) per query when
// the sample size tracks the triangle count.

use crate::geom::{Point, Real};
use crate::mesh::{Mesh, Otri, DUMMY};

/// Where a query point landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LocateResult {
    /// Strictly inside the returned triangle.
    InTriangle,
    /// On the viewed edge of the returned triangle.
    OnEdge,
    /// Coincides with the origin of the returned edge.
    OnVertex,
    /// Beyond the hull; the returned edge is the hull edge the walk hit.
    Outside,
}

impl Mesh {
    /// Find the triangle containing `p`.
    pub fn locate(&mut self, p: Point) -> (LocateResult, Otri) {
        let mut searchtri = Otri::default();
        let mut searchdist = Real::MAX;

        // Warm start from the most recently visited triangle, if it is
        // still alive.
        if self.recenttri.tri != DUMMY && self.triangles.is_live(self.recenttri.tri) {
            searchtri = self.recenttri;
            let torg = self.vertex_point(self.org(searchtri));
            if torg == p {
                return (LocateResult::OnVertex, searchtri);
            }
            searchdist = p.distance_sq(&torg);
        }

        // Sample a few live triangles and keep the one whose origin lies
        // nearest the query.
        self.sampler.update(self.triangles.count());
        for raw in self.sampler.draw(self.triangles.slots()) {
            if let Some(tri) = self.triangles.live_at_or_after(raw) {
                let t = Otri::new(tri, 0);
                let dist = p.distance_sq(&self.vertex_point(self.org(t)));
                if dist < searchdist {
                    searchtri = t;
                    searchdist = dist;
                }
            }
        }
        if searchtri.tri == DUMMY {
            match self.triangles.live_at_or_after(0) {
                Some(tri) => searchtri = Otri::new(tri, 0),
                None => return (LocateResult::Outside, Otri::default()),
            }
        }

        let torg = self.vertex_point(self.org(searchtri));
        let tdest = self.vertex_point(self.dest(searchtri));
        if torg == p {
            self.recenttri = searchtri;
            return (LocateResult::OnVertex, searchtri);
        }
        if tdest == p {
            let found = searchtri.lnext();
            self.recenttri = found;
            return (LocateResult::OnVertex, found);
        }

        // Orient the start so the query lies to the left of the viewed edge.
        let ahead = self.predicates.counterclockwise(torg, tdest, p);
        if ahead < 0.0 {
            let flipped = self.sym(searchtri);
            if flipped.tri == DUMMY {
                // The query is beyond a hull edge of the start triangle.
                return (LocateResult::Outside, searchtri);
            }
            searchtri = flipped;
        } else if ahead == 0.0
            && (torg.x < p.x) == (p.x < tdest.x)
            && (torg.y < p.y) == (p.y < tdest.y)
        {
            self.recenttri = searchtri;
            return (LocateResult::OnEdge, searchtri);
        }
        self.precise_locate(p, searchtri)
    }

    /// March from `searchtri` toward `p`, which must lie to the left of the
    /// viewed edge. Each step crosses the edge separating the walk from the
    /// query; reaching the dummy triangle means the query is outside.
    pub(crate) fn precise_locate(&mut self, p: Point, mut searchtri: Otri) -> (LocateResult, Otri) {
        if searchtri.tri == DUMMY {
            return (LocateResult::Outside, searchtri);
        }

        let mut forg = self.vertex_point(self.org(searchtri));
        let mut fdest = self.vertex_point(self.dest(searchtri));
        let mut fapex = self.vertex_point(self.apex(searchtri));

        loop {
            if fapex == p {
                let found = searchtri.lprev();
                self.recenttri = found;
                return (LocateResult::OnVertex, found);
            }

            // Which side of the org->apex and apex->dest edges is the
            // query on?
            let destorient = self.predicates.counterclockwise(forg, fapex, p);
            let orgorient = self.predicates.counterclockwise(fapex, fdest, p);

            let moveleft;
            if destorient > 0.0 {
                if orgorient > 0.0 {
                    // Both edges separate the query from the triangle. Cross
                    // whichever one the perpendicular through the apex says
                    // the query is beyond.
                    moveleft = (fapex.x - p.x) * (fdest.x - forg.x)
                        + (fapex.y - p.y) * (fdest.y - forg.y)
                        > 0.0;
                } else {
                    moveleft = true;
                }
            } else if orgorient > 0.0 {
                moveleft = false;
            } else {
                // Neither edge separates: the query is in this triangle,
                // possibly on one of the two far edges.
                self.recenttri = searchtri;
                if destorient == 0.0 {
                    return (LocateResult::OnEdge, searchtri.lprev());
                }
                if orgorient == 0.0 {
                    return (LocateResult::OnEdge, searchtri.lnext());
                }
                return (LocateResult::InTriangle, searchtri);
            }

            // Cross an edge, remembering where we came from in case the
            // step walks off the hull.
            let backtrack = if moveleft {
                fdest = fapex;
                searchtri.lprev()
            } else {
                forg = fapex;
                searchtri.lnext()
            };
            searchtri = self.sym(backtrack);

            if searchtri.tri == DUMMY {
                return (LocateResult::Outside, backtrack);
            }

            fapex = self.vertex_point(self.apex(searchtri));
        }
    }
}

// ──────────────────────────────── Tests ────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::mesh::{Behavior, VertexKind};

    fn one_triangle() -> (Mesh, Otri) {
        let mut mesh = Mesh::new(Behavior::default());
        let a = mesh.make_vertex(Point::new(0.0, 0.0), 0, VertexKind::Input);
        let b = mesh.make_vertex(Point::new(4.0, 0.0), 0, VertexKind::Input);
        let c = mesh.make_vertex(Point::new(0.0, 4.0), 0, VertexKind::Input);
        let t = mesh.make_triangle();
        mesh.triangles[t.tri].vertices = [a, b, c];
        mesh.make_vertex_map();
        (mesh, t)
    }

    #[test]
    fn inside_single_triangle() {
        let (mut mesh, t) = one_triangle();
        let (res, found) = mesh.locate(Point::new(1.0, 1.0));
        assert_eq!(res, LocateResult::InTriangle);
        assert_eq!(found.tri, t.tri);
    }

    #[test]
    fn on_vertex_returns_that_origin() {
        let (mut mesh, _) = one_triangle();
        let (res, found) = mesh.locate(Point::new(0.0, 0.0));
        assert_eq!(res, LocateResult::OnVertex);
        assert_eq!(mesh.vertex_point(mesh.org(found)), Point::new(0.0, 0.0));
    }

    #[test]
    fn on_edge_returns_the_containing_edge() {
        let (mut mesh, _) = one_triangle();
        let (res, found) = mesh.locate(Point::new(2.0, 0.0));
        assert_eq!(res, LocateResult::OnEdge);
        let o = mesh.vertex_point(mesh.org(found));
        let d = mesh.vertex_point(mesh.dest(found));
        // The bottom edge holds the query point.
        assert_eq!(o.y, 0.0);
        assert_eq!(d.y, 0.0);
    }

    #[test]
    fn far_point_walks_outside() {
        let (mut mesh, _) = one_triangle();
        let (res, _) = mesh.locate(Point::new(10.0, 10.0));
        assert_eq!(res, LocateResult::Outside);
    }

    #[test]
    fn empty_mesh_is_outside() {
        let mut mesh = Mesh::new(Behavior::default());
        let (res, _) = mesh.locate(Point::new(0.0, 0.0));
        assert_eq!(res, LocateResult::Outside);
    }
}
