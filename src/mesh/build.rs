// Copyright 2025 Lars Brubaker
// License: MIT
//
// Incremental Delaunay construction with constraining segments. The input
// points are wrapped in a triangular box so large that every insertion
// lands inside some triangle; each point goes in by a 1:3 or 2:4 split
// followed by recursive edge flipping; the box is then torn off, segments
// are forced into the edge set by flipping the edges that cross them, and
// hole and region seeds are stored for the carver.

use log::{error, info, warn};

use super::locate::LocateResult;
use super::{Behavior, Mesh, Otri, Region, TriIdx, VertIdx, VertexKind, DUMMY, INVALID};
use crate::error::{MeshError, Result};
use crate::geom::{Point, Rect};
use crate::predicates::Predicates;

/// A constraining segment between two input point indices.
#[derive(Clone, Copy, Debug)]
pub struct Segment {
    pub p0: usize,
    pub p1: usize,
    /// Boundary marker copied onto the subsegments and their endpoints.
    pub marker: i32,
}

impl Segment {
    pub fn new(p0: usize, p1: usize) -> Self {
        Segment { p0, p1, marker: 1 }
    }
}

/// Planar straight line graph: the input to [`triangulate`].
#[derive(Clone, Debug, Default)]
pub struct Pslg {
    pub points: Vec<Point>,
    /// Optional per-point boundary markers; empty means all zero.
    pub point_markers: Vec<i32>,
    pub segments: Vec<Segment>,
    /// One seed per hole; triangles reachable from a seed without crossing
    /// a segment are carved away.
    pub holes: Vec<Point>,
    /// Region seeds with attributes and area constraints.
    pub regions: Vec<Region>,
}

impl Pslg {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Pslg {
            points,
            ..Default::default()
        }
    }
}

pub(crate) enum InsertResult {
    Success,
    /// The point coincides with this existing vertex.
    Duplicate(VertIdx),
    Outside,
}

enum SegScan {
    /// This handle already views the wanted edge.
    Direct(Otri),
    /// Another vertex lies exactly on the open segment.
    Through(VertIdx),
    /// First edge crossing the segment, origin right of it, dest left.
    Cross(Otri),
}

enum March {
    Flipped,
    Through(VertIdx),
    End,
}

/// Build a constrained Delaunay triangulation of the input.
///
/// Points go in first; exact duplicates are tolerated, logged, and kept as
/// undead vertices so input indices stay meaningful. Segments are forced
/// into the edge set afterwards. Hole and region seeds are stored on the
/// mesh untouched; apply them with the carver.
pub fn triangulate(pslg: &Pslg, behavior: Behavior) -> Result<Mesh> {
    let n = pslg.points.len();
    if n < 3 {
        return Err(MeshError::TooFewPoints(n));
    }
    for (i, seg) in pslg.segments.iter().enumerate() {
        for index in [seg.p0, seg.p1] {
            if index >= n {
                return Err(MeshError::SegmentOutOfRange {
                    segment: i,
                    index,
                    count: n,
                });
            }
        }
    }

    // A triangulation needs three non-collinear points. This scan always
    // runs with exact arithmetic, whatever the behavior asks for.
    {
        let exact = Predicates::new(true);
        let p0 = pslg.points[0];
        let spanning = pslg.points.iter().find(|q| **q != p0).map_or(false, |pj| {
            pslg.points
                .iter()
                .any(|q| exact.counterclockwise(p0, *pj, *q) != 0.0)
        });
        if !spanning {
            return Err(MeshError::AllCollinear);
        }
    }

    let mut mesh = Mesh::new(behavior);
    mesh.bounds = Rect::from_points(&pslg.points);
    mesh.create_box();

    // Insert the points. idmap sends each input index to the vertex that
    // represents it, which for a duplicate is the earlier survivor.
    let mut idmap: Vec<VertIdx> = Vec::with_capacity(n);
    for (i, &p) in pslg.points.iter().enumerate() {
        let mark = pslg.point_markers.get(i).copied().unwrap_or(0);
        let v = mesh.make_vertex(p, mark, VertexKind::Input);
        match mesh.insert_site(v) {
            InsertResult::Success => idmap.push(v),
            InsertResult::Duplicate(survivor) => {
                warn!(target: "build", "point {} duplicates an earlier point; skipped", i);
                mesh.vertices[v].kind = VertexKind::Undead;
                mesh.undeads += 1;
                idmap.push(survivor);
            }
            InsertResult::Outside => {
                error!(target: "build", "point {} fell outside the enclosing box", i);
                mesh.vertices[v].kind = VertexKind::Undead;
                mesh.undeads += 1;
                idmap.push(v);
            }
        }
    }

    mesh.remove_box();

    for (i, seg) in pslg.segments.iter().enumerate() {
        let v0 = idmap[seg.p0];
        let v1 = idmap[seg.p1];
        if seg.p0 == seg.p1 || v0 == v1 {
            warn!(target: "build", "segment {} is degenerate; skipped", i);
            continue;
        }
        mesh.insert_segment(v0, v1, seg.marker)?;
    }

    mesh.holes = pslg.holes.clone();
    mesh.regions = pslg.regions.clone();
    mesh.make_vertex_map();

    info!(
        target: "build",
        "triangulated {} points: {} triangles, {} edges ({} on hull), {} subsegments",
        n,
        mesh.triangles.count(),
        mesh.edges,
        mesh.hullsize,
        mesh.subsegs.count()
    );
    Ok(mesh)
}

impl Mesh {
    /// Wrap the input in a triangle so large that every point lands inside
    /// it. The corners are ordinary vertices while they live, but the flip
    /// tests treat them as lying at infinity; remove_box tears them out.
    fn create_box(&mut self) {
        let span = self.bounds.width().max(self.bounds.height());
        let span = if span == 0.0 { 1.0 } else { span };

        let v0 = self.make_vertex(
            Point::new(self.bounds.xmin - 50.0 * span, self.bounds.ymin - 40.0 * span),
            0,
            VertexKind::Free,
        );
        let v1 = self.make_vertex(
            Point::new(self.bounds.xmax + 50.0 * span, self.bounds.ymin - 40.0 * span),
            0,
            VertexKind::Free,
        );
        let v2 = self.make_vertex(
            Point::new(
                0.5 * (self.bounds.xmin + self.bounds.xmax),
                self.bounds.ymax + 60.0 * span,
            ),
            0,
            VertexKind::Free,
        );

        let inftri = self.make_triangle();
        self.set_org(inftri, v0);
        self.set_dest(inftri, v1);
        self.set_apex(inftri, v2);

        self.infvertices = [v0, v1, v2];
        self.recenttri = inftri;
    }

    /// Insert vertex `v` by splitting the triangle or edge it lands on,
    /// then flipping until every edge facing it is locally Delaunay.
    pub(crate) fn insert_site(&mut self, v: VertIdx) -> InsertResult {
        let p = self.vertex_point(v);
        let (loc, t) = self.locate(p);
        match loc {
            LocateResult::OnVertex => InsertResult::Duplicate(self.org(t)),
            LocateResult::Outside => InsertResult::Outside,
            LocateResult::InTriangle => {
                let link = self.split_triangle(t, v);
                self.legalize(v, link);
                InsertResult::Success
            }
            LocateResult::OnEdge => {
                let link = self.split_edge(t, v);
                self.legalize(v, link);
                InsertResult::Success
            }
        }
    }

    /// 1:3 split: `v` lies strictly inside `t`. Returns the three link
    /// edges, each viewed with `v` as its apex.
    fn split_triangle(&mut self, t: Otri, v: VertIdx) -> Vec<Otri> {
        let botleft = t.lnext();
        let botright = t.lprev();
        let botlcasing = self.sym(botleft);
        let botrcasing = self.sym(botright);
        let botlsubseg = self.tspivot(botleft);
        let botrsubseg = self.tspivot(botright);

        let o = self.org(t);
        let d = self.dest(t);
        let a = self.apex(t);

        // nbl takes the outer edge d->a, nbr the outer edge a->o, and t
        // shrinks onto its viewed edge o->d.
        let nbl = self.make_triangle();
        let nbr = self.make_triangle();
        self.set_org(nbl, d);
        self.set_dest(nbl, a);
        self.set_apex(nbl, v);
        self.set_org(nbr, a);
        self.set_dest(nbr, o);
        self.set_apex(nbr, v);
        self.set_apex(t, v);

        let attrs = self.triangles[t.tri].attributes.clone();
        self.triangles[nbl.tri].attributes = attrs.clone();
        self.triangles[nbr.tri].attributes = attrs;
        if self.behavior.vararea {
            let area = self.triangles[t.tri].area;
            self.triangles[nbl.tri].area = area;
            self.triangles[nbr.tri].area = area;
        }

        if self.checksegments {
            if botlsubseg.seg != DUMMY {
                self.tsdissolve(botleft);
                self.tsbond(nbl, botlsubseg);
            }
            if botrsubseg.seg != DUMMY {
                self.tsdissolve(botright);
                self.tsbond(nbr, botrsubseg);
            }
        }

        self.bond(nbl, botlcasing);
        self.bond(nbr, botrcasing);
        // The three spokes out of v.
        self.bond(nbl.lnext(), nbr.lprev());
        self.bond(t.lnext(), nbl.lprev());
        self.bond(t.lprev(), nbr.lnext());

        self.vertices[v].tri = t.lprev();
        self.vertices[a].tri = nbl.lnext();

        vec![t, nbl, nbr]
    }

    /// 2:4 split: `v` lies on the viewed edge of `t`, which must not carry
    /// a subsegment. Splits `t` and its mirror (when the edge is interior)
    /// and returns the link edges, each viewed with `v` as its apex.
    fn split_edge(&mut self, t: Otri, v: VertIdx) -> Vec<Otri> {
        debug_assert_eq!(self.tspivot(t).seg, DUMMY);

        let o = self.org(t);
        let d = self.dest(t);
        let a = self.apex(t);

        let n_da = self.sym(t.lnext());
        let s_da = self.tspivot(t.lnext());
        let mirror = self.sym(t);

        // Top side: t keeps o->v, u takes v->d and the outer edge d->a.
        let u = self.make_triangle();
        self.set_org(u, v);
        self.set_dest(u, d);
        self.set_apex(u, a);
        self.set_dest(t, v);

        let attrs = self.triangles[t.tri].attributes.clone();
        self.triangles[u.tri].attributes = attrs;
        if self.behavior.vararea {
            self.triangles[u.tri].area = self.triangles[t.tri].area;
        }

        self.bond(u.lnext(), n_da);
        if s_da.seg != DUMMY {
            self.tsdissolve(t.lnext());
            self.tsbond(u.lnext(), s_da);
        }
        self.bond(t.lnext(), u.lprev());

        let mut link = vec![t.lprev(), u.lnext()];

        if mirror.tri != DUMMY {
            // Bottom side: the mirror keeps d->v, w takes v->o and the
            // outer edge o->b.
            let s = mirror;
            let b = self.apex(s);
            let n_ob = self.sym(s.lnext());
            let s_ob = self.tspivot(s.lnext());

            let w = self.make_triangle();
            self.set_org(w, v);
            self.set_dest(w, o);
            self.set_apex(w, b);
            self.set_dest(s, v);

            let attrs = self.triangles[s.tri].attributes.clone();
            self.triangles[w.tri].attributes = attrs;
            if self.behavior.vararea {
                self.triangles[w.tri].area = self.triangles[s.tri].area;
            }

            self.bond(w.lnext(), n_ob);
            if s_ob.seg != DUMMY {
                self.tsdissolve(s.lnext());
                self.tsbond(w.lnext(), s_ob);
            }
            self.bond(s.lnext(), w.lprev());

            // Across the split: t pairs with w, u with s.
            self.bond(t, w);
            self.bond(u, s);

            self.vertices[o].tri = w.lnext();
            link.push(s.lprev());
            link.push(w.lnext());
        } else {
            // Splitting a hull edge adds one hull edge.
            self.hullsize += 1;
        }

        self.vertices[v].tri = t.lnext();
        self.vertices[d].tri = u.lnext();

        link
    }

    /// Rotate the quadrilateral around the viewed edge a quarter turn
    /// counterclockwise, replacing the diagonal. The handle then views the
    /// new diagonal; the caller re-derives any other handles it held.
    pub(crate) fn flip(&mut self, t: Otri) {
        let top = self.sym(t);
        debug_assert_ne!(top.tri, DUMMY, "cannot flip a hull edge");

        let rightvertex = self.org(t);
        let leftvertex = self.dest(t);
        let botvertex = self.apex(t);
        let farvertex = self.apex(top);

        let topleft = top.lprev();
        let topright = top.lnext();
        let botleft = t.lnext();
        let botright = t.lprev();
        let toplcasing = self.sym(topleft);
        let toprcasing = self.sym(topright);
        let botlcasing = self.sym(botleft);
        let botrcasing = self.sym(botright);

        // Rotate the outer bonds one notch; the diagonal bond stays put.
        self.bond(topleft, botlcasing);
        self.bond(botleft, botrcasing);
        self.bond(botright, toprcasing);
        self.bond(topright, toplcasing);

        if self.checksegments {
            let toplsubseg = self.tspivot(topleft);
            let botlsubseg = self.tspivot(botleft);
            let botrsubseg = self.tspivot(botright);
            let toprsubseg = self.tspivot(topright);

            if toplsubseg.seg == DUMMY {
                self.tsdissolve(topright);
            } else {
                self.tsbond(topright, toplsubseg);
            }
            if botlsubseg.seg == DUMMY {
                self.tsdissolve(topleft);
            } else {
                self.tsbond(topleft, botlsubseg);
            }
            if botrsubseg.seg == DUMMY {
                self.tsdissolve(botleft);
            } else {
                self.tsbond(botleft, botrsubseg);
            }
            if toprsubseg.seg == DUMMY {
                self.tsdissolve(botright);
            } else {
                self.tsbond(botright, toprsubseg);
            }
        }

        self.set_org(t, farvertex);
        self.set_dest(t, botvertex);
        self.set_apex(t, rightvertex);
        self.set_org(top, botvertex);
        self.set_dest(top, farvertex);
        self.set_apex(top, leftvertex);

        // Keep the vertex-to-triangle map valid for the four corners.
        for h in [t, top] {
            for orient in 0..3u8 {
                let e = Otri::new(h.tri, orient);
                let v = self.org(e);
                if v != INVALID {
                    self.vertices[v].tri = e;
                }
            }
        }
    }

    /// Lawson flip pass around the freshly inserted vertex `v`. Every
    /// worklist entry views a link edge with `v` as its apex; each flip
    /// exposes two new link edges, which go back on the list.
    fn legalize(&mut self, v: VertIdx, mut worklist: Vec<Otri>) {
        let vp = self.vertex_point(v);
        while let Some(t) = worklist.pop() {
            // A flip may have rewritten this triangle since the push.
            if self.apex(t) != v {
                continue;
            }
            if self.checksegments && self.tspivot(t).seg != DUMMY {
                continue;
            }
            let top = self.sym(t);
            if top.tri == DUMMY {
                continue;
            }

            let o = self.org(t);
            let d = self.dest(t);
            let f = self.apex(top);

            // Box corners act as points at infinity: against them the
            // empty-circle test degenerates to a hull convexity test.
            let doflip = if self.is_inf(d) {
                self.predicates
                    .counterclockwise(vp, self.vertex_point(o), self.vertex_point(f))
                    > 0.0
            } else if self.is_inf(o) {
                self.predicates
                    .counterclockwise(self.vertex_point(f), self.vertex_point(d), vp)
                    > 0.0
            } else if self.is_inf(f) {
                false
            } else {
                self.predicates.incircle(
                    self.vertex_point(d),
                    vp,
                    self.vertex_point(o),
                    self.vertex_point(f),
                ) > 0.0
            };

            if doflip {
                self.flip(t);
                worklist.push(t.lprev());
                worklist.push(self.sym(t).lnext());
            }
        }
    }

    /// Flip every unconstrained internal edge that violates the local
    /// Delaunay property. Used to settle the mesh after a segment has been
    /// forced in.
    pub(crate) fn legalize_all(&mut self) {
        let mut stack: Vec<Otri> = Vec::new();
        for tri in self.triangles.indices() {
            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                let n = self.sym(t);
                // Each internal edge goes on once.
                if n.tri != DUMMY && t.tri < n.tri {
                    stack.push(t);
                }
            }
        }

        let max_iter = stack.len() * stack.len() + 1;
        let mut iter = 0;
        while let Some(t) = stack.pop() {
            if iter >= max_iter {
                warn!(target: "build", "flip pass hit its iteration cap");
                break;
            }
            iter += 1;

            let top = self.sym(t);
            if top.tri == DUMMY || self.tspivot(t).seg != DUMMY {
                continue;
            }
            let o = self.vertex_point(self.org(t));
            let d = self.vertex_point(self.dest(t));
            let a = self.vertex_point(self.apex(t));
            let f = self.vertex_point(self.apex(top));
            if self.predicates.incircle(o, d, a, f) > 0.0 {
                self.flip(t);
                stack.push(t.lnext());
                stack.push(t.lprev());
                let s = self.sym(t);
                stack.push(s.lnext());
                stack.push(s.lprev());
            }
        }
    }

    /// Tear off the enclosing box: delete every triangle with a box corner,
    /// dissolve the survivors' links to them, drop the three box vertices,
    /// and take a fresh census of the hull.
    fn remove_box(&mut self) {
        let mut doomed = vec![false; self.triangles.slots() as usize];
        let mut dead: Vec<TriIdx> = Vec::new();
        for tri in self.triangles.indices() {
            if self.triangles[tri].vertices.iter().any(|&v| self.is_inf(v)) {
                doomed[tri as usize] = true;
                dead.push(tri);
            }
        }

        for &tri in &dead {
            for orient in 0..3u8 {
                let n = self.sym(Otri::new(tri, orient));
                if n.tri != DUMMY && !doomed[n.tri as usize] {
                    self.dissolve(n);
                }
            }
        }
        for &tri in &dead {
            self.triangle_dealloc(tri);
        }
        for v in self.infvertices {
            self.vertex_dealloc(v);
        }
        self.infvertices = [INVALID; 3];
        self.recenttri = Otri::default();

        self.hullsize = self.count_hull_edges();
        self.edges = (3 * self.triangles.count() + self.hullsize) / 2;
        self.make_vertex_map();
    }

    /// Force the edge v1-v2 into the triangulation by flipping the edges
    /// that cross it, then lay a subsegment under it and settle the mesh.
    /// Vertices sitting exactly on the segment split it.
    pub(crate) fn insert_segment(&mut self, v1: VertIdx, v2: VertIdx, marker: i32) -> Result<()> {
        debug_assert_ne!(v1, v2);
        // Each round flips at most one edge, and a flip can trade one
        // crossing for another before the count comes down, so the flip
        // budget has to be quadratic in the mesh size. A segment that
        // crosses another constraint errors out of flip_one_crossing long
        // before the budget runs dry.
        let rounds = self.triangles.count() as usize + 2;
        let cap = 3 * rounds * rounds;
        for _ in 0..cap {
            match self.scan_segment(v1, v2) {
                Some(SegScan::Direct(t)) => {
                    self.insert_subseg(t, marker);
                    self.legalize_all();
                    return Ok(());
                }
                Some(SegScan::Through(w)) => {
                    self.insert_segment(v1, w, marker)?;
                    return self.insert_segment(w, v2, marker);
                }
                Some(SegScan::Cross(e)) => match self.flip_one_crossing(e, v1, v2)? {
                    March::Through(w) => {
                        self.insert_segment(v1, w, marker)?;
                        return self.insert_segment(w, v2, marker);
                    }
                    March::Flipped | March::End => {}
                },
                None => break,
            }
        }
        Err(MeshError::InvalidSegment(v1 as usize, v2 as usize))
    }

    /// Classify the segment v1-v2 seen from v1's fan: an existing edge, a
    /// vertex lying on the segment, or the first crossing edge. None means
    /// the fan is inconsistent.
    fn scan_segment(&self, v1: VertIdx, v2: VertIdx) -> Option<SegScan> {
        let p1 = self.vertex_point(v1);
        let p2 = self.vertex_point(v2);

        // Collect the fan of edges out of v1, rewound to the hull when v1
        // lies on it.
        let start = self.vertices[v1].tri;
        if start.tri == DUMMY || !self.triangles.is_live(start.tri) || self.org(start) != v1 {
            return None;
        }
        let mut first = start;
        loop {
            let prev = self.oprev(first);
            if prev.tri == DUMMY || prev == start {
                break;
            }
            first = prev;
        }
        let mut fan = Vec::new();
        let mut t = first;
        loop {
            fan.push(t);
            let next = self.onext(t);
            if next.tri == DUMMY || next == first {
                break;
            }
            t = next;
        }

        // An existing edge to v2?
        for &t in &fan {
            if self.dest(t) == v2 {
                return Some(SegScan::Direct(t));
            }
        }
        // On the hull the far side of the last wedge is an edge too.
        if let Some(&last) = fan.last() {
            if self.onext(last).tri == DUMMY && self.apex(last) == v2 {
                return Some(SegScan::Direct(last.lprev()));
            }
        }

        // Find the wedge containing the direction to v2.
        for &t in &fan {
            let dv = self.dest(t);
            let av = self.apex(t);
            let pd = self.vertex_point(dv);
            let pa = self.vertex_point(av);
            let side_d = self.predicates.counterclockwise(p1, pd, p2);
            let side_a = self.predicates.counterclockwise(p1, pa, p2);
            let ahead_d = (pd.x - p1.x) * (p2.x - p1.x) + (pd.y - p1.y) * (p2.y - p1.y) > 0.0;
            let ahead_a = (pa.x - p1.x) * (p2.x - p1.x) + (pa.y - p1.y) * (p2.y - p1.y) > 0.0;
            if side_d == 0.0 && ahead_d {
                return Some(SegScan::Through(dv));
            }
            if side_a == 0.0 && ahead_a {
                return Some(SegScan::Through(av));
            }
            if side_d > 0.0 && side_a < 0.0 {
                // The edge opposite v1 is the first crossing.
                return Some(SegScan::Cross(t.lnext()));
            }
        }
        None
    }

    /// March along the edges crossing the open segment v1-v2 and flip the
    /// first one whose quadrilateral is strictly convex; one always exists
    /// while any crossing remains. Meeting a constrained edge is an input
    /// error: segments may share endpoints but never cross.
    fn flip_one_crossing(&mut self, first: Otri, v1: VertIdx, v2: VertIdx) -> Result<March> {
        let p1 = self.vertex_point(v1);
        let p2 = self.vertex_point(v2);
        let mut e = first;
        let cap = self.triangles.count() as usize + 2;
        for _ in 0..cap {
            if self.tspivot(e).seg != DUMMY {
                return Err(MeshError::InvalidSegment(v1 as usize, v2 as usize));
            }
            let top = self.sym(e);
            if top.tri == DUMMY {
                return Err(MeshError::InvalidSegment(v1 as usize, v2 as usize));
            }

            let po = self.vertex_point(self.org(e));
            let pd = self.vertex_point(self.dest(e));
            let pn = self.vertex_point(self.apex(e));
            let f = self.apex(top);
            let pf = self.vertex_point(f);

            // Strictly convex quadrilateral: the crossing edge's endpoints
            // straddle the line through the two apexes.
            let s1 = self.predicates.counterclockwise(pn, pf, po);
            let s2 = self.predicates.counterclockwise(pn, pf, pd);
            if (s1 > 0.0 && s2 < 0.0) || (s1 < 0.0 && s2 > 0.0) {
                self.flip(e);
                return Ok(March::Flipped);
            }

            if f == v2 {
                return Ok(March::End);
            }
            let side = self.predicates.counterclockwise(p1, p2, pf);
            if side == 0.0 {
                return Ok(March::Through(f));
            }
            // Keep the invariant: origin right of the segment, dest left.
            e = if side > 0.0 { top.lnext() } else { top.lprev() };
        }
        Err(MeshError::InvalidSegment(v1 as usize, v2 as usize))
    }

    /// Lay a subsegment under the viewed edge, or promote the marker of
    /// the one already there. The endpoints become segment vertices and
    /// pick up the marker if they had none.
    pub(crate) fn insert_subseg(&mut self, t: Otri, marker: i32) {
        let o = self.org(t);
        let d = self.dest(t);

        for v in [o, d] {
            if self.vertices[v].mark == 0 {
                self.vertices[v].mark = marker;
            }
            if self.vertices[v].kind == VertexKind::Input {
                self.vertices[v].kind = VertexKind::Segment;
            }
        }

        let existing = self.tspivot(t);
        if existing.seg == DUMMY {
            let s = self.make_subseg();
            self.set_sorg(s, d);
            self.set_sdest(s, o);
            self.subsegs[s.seg].marker = marker;
            self.tsbond(t, s);
            let opp = self.sym(t);
            if opp.tri != DUMMY {
                self.tsbond(opp, s.ssym());
            }
            self.checksegments = true;
        } else if self.subsegs[existing.seg].marker == 0 {
            self.subsegs[existing.seg].marker = marker;
        }
    }
}

// ──────────────────────────────── Tests ────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::DUMMY;

    fn square() -> Pslg {
        Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ])
    }

    #[test]
    fn square_counts() {
        let mesh = triangulate(&square(), Behavior::default()).unwrap();
        assert_eq!(mesh.triangles.count(), 2);
        assert_eq!(mesh.hullsize, 4);
        assert_eq!(mesh.edges, 5);
        assert_eq!(mesh.vertex_count(), 4);
    }

    #[test]
    fn too_few_points() {
        let pslg = Pslg::from_points(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(matches!(
            triangulate(&pslg, Behavior::default()),
            Err(MeshError::TooFewPoints(2))
        ));
    }

    #[test]
    fn collinear_points_rejected() {
        let pslg = Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
            Point::new(3.0, 3.0),
        ]);
        assert!(matches!(
            triangulate(&pslg, Behavior::default()),
            Err(MeshError::AllCollinear)
        ));
    }

    #[test]
    fn segment_index_out_of_range() {
        let mut pslg = square();
        pslg.segments.push(Segment::new(0, 9));
        assert!(matches!(
            triangulate(&pslg, Behavior::default()),
            Err(MeshError::SegmentOutOfRange { segment: 0, index: 9, count: 4 })
        ));
    }

    #[test]
    fn duplicate_points_become_undead() {
        let mut pslg = square();
        pslg.points.push(Point::new(0.0, 0.0));
        pslg.points.push(Point::new(1.0, 1.0));
        let mesh = triangulate(&pslg, Behavior::default()).unwrap();
        assert_eq!(mesh.undeads, 2);
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.triangles.count(), 2);
    }

    #[test]
    fn forced_diagonal_has_a_subsegment() {
        let mut pslg = square();
        pslg.segments.push(Segment { p0: 0, p1: 2, marker: 7 });
        let mesh = triangulate(&pslg, Behavior::default()).unwrap();
        assert_eq!(mesh.subsegs.count(), 1);

        let (seg, data) = mesh.subsegs.iter().next().unwrap();
        assert_ne!(seg, DUMMY);
        let mut ends = [
            mesh.vertex_point(data.vertices[0]),
            mesh.vertex_point(data.vertices[1]),
        ];
        ends.sort_by(|l, r| l.x.partial_cmp(&r.x).unwrap());
        assert_eq!(ends[0], Point::new(0.0, 0.0));
        assert_eq!(ends[1], Point::new(1.0, 1.0));
        assert_eq!(data.marker, 7);

        // Both sides of the subsegment point back at live triangles.
        for orient in 0..2u8 {
            let t = mesh.stpivot(crate::mesh::Osub::new(seg, orient));
            assert_ne!(t.tri, DUMMY);
            assert!(mesh.triangles.is_live(t.tri));
        }
    }

    #[test]
    fn segment_through_a_vertex_splits() {
        // Three collinear points on the bottom edge; the forced segment
        // from corner to corner must pass through the middle one.
        let mut pslg = Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 1.5),
        ]);
        pslg.segments.push(Segment::new(0, 2));
        let mesh = triangulate(&pslg, Behavior::default()).unwrap();
        // The constraint splits into two subsegments at the middle vertex.
        assert_eq!(mesh.subsegs.count(), 2);
    }

    #[test]
    fn flat_input_spread_over_a_line_plus_one() {
        // Lots of collinear points plus a single off-line vertex still
        // triangulates: a fan out of the lone apex.
        let mut points: Vec<Point> = (0..6).map(|i| Point::new(i as f64, 0.0)).collect();
        points.push(Point::new(2.5, 3.0));
        let mesh = triangulate(&Pslg::from_points(points), Behavior::default()).unwrap();
        assert_eq!(mesh.triangles.count(), 5);
        assert_eq!(mesh.hullsize, 7);
    }
}
