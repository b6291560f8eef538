// Copyright 2025 Lars Brubaker
// License: MIT
//
// Triangle-based mesh core in the style of Shewchuk's triangle data
// structure. Each triangle stores its three corner vertices, the three
// abutting triangles, and the three subsegments under its edges; all
// references are u32 indices into pooled arenas.
//
// Design:
//   - INVALID: u32::MAX  (null index)
//   - Otri = (triangle, orient 0..3): a triangle seen from one of its three
//     directed edges. Edge i lies opposite corner i, so from orient i the
//     origin is corner i+1, the destination corner i+2, the apex corner i.
//     Corners wind counterclockwise.
//   - Osub = (subsegment, orient 0..2): a subsegment seen from one of its
//     two directions.
//   - Slot 0 of the triangle and subsegment pools holds a dummy object and
//     DUMMY names it. Walking across a hull edge lands on the dummy; its
//     own links are scratch and never trusted.

pub mod build;
pub mod locate;

use crate::geom::{Point, Real, Rect};
use crate::pool::Pool;
use crate::predicates::Predicates;
use crate::sample::Sampler;

pub const INVALID: u32 = u32::MAX;

/// Pool slot of the dummy triangle and the dummy subsegment.
pub const DUMMY: u32 = 0;

/// Index into Mesh::vertices
pub type VertIdx = u32;
/// Index into Mesh::triangles
pub type TriIdx = u32;
/// Index into Mesh::subsegs
pub type SubIdx = u32;

// Corner rotation tables; indexed by orient.
pub(crate) const PLUS1: [usize; 3] = [1, 2, 0];
pub(crate) const MINUS1: [usize; 3] = [2, 0, 1];

/// Oriented triangle: a triangle plus the directed edge it is viewed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Otri {
    pub tri: TriIdx,
    pub orient: u8,
}

impl Default for Otri {
    fn default() -> Self {
        Otri { tri: DUMMY, orient: 0 }
    }
}

impl Otri {
    #[inline]
    pub fn new(tri: TriIdx, orient: u8) -> Self {
        Otri { tri, orient }
    }

    /// Next edge counterclockwise around the same triangle.
    #[inline]
    pub fn lnext(self) -> Otri {
        Otri::new(self.tri, PLUS1[self.orient as usize] as u8)
    }

    /// Previous edge counterclockwise around the same triangle.
    #[inline]
    pub fn lprev(self) -> Otri {
        Otri::new(self.tri, MINUS1[self.orient as usize] as u8)
    }
}

/// Oriented subsegment: a subsegment plus the direction it is viewed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Osub {
    pub seg: SubIdx,
    pub orient: u8,
}

impl Default for Osub {
    fn default() -> Self {
        Osub { seg: DUMMY, orient: 0 }
    }
}

impl Osub {
    #[inline]
    pub fn new(seg: SubIdx, orient: u8) -> Self {
        Osub { seg, orient }
    }

    /// Same subsegment, opposite direction.
    #[inline]
    pub fn ssym(self) -> Osub {
        Osub::new(self.seg, 1 - self.orient)
    }
}

// ──────────────────────────────── Pooled records ────────────────────────────

#[derive(Clone, Debug)]
pub struct TriangleData {
    /// Corner vertices, counterclockwise.
    pub vertices: [VertIdx; 3],
    /// neighbors[i] abuts the edge opposite corner i.
    pub neighbors: [Otri; 3],
    /// subsegs[i] lies under the edge opposite corner i.
    pub subsegs: [Osub; 3],
    /// Regional attributes stamped onto this triangle.
    pub attributes: Vec<Real>,
    /// Maximum-area constraint; negative when unconstrained.
    pub area: Real,
}

impl Default for TriangleData {
    fn default() -> Self {
        TriangleData {
            vertices: [INVALID; 3],
            neighbors: [Otri::default(); 3],
            subsegs: [Osub::default(); 3],
            attributes: Vec::new(),
            area: -1.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SubsegData {
    /// Endpoints; vertices[0] is the origin seen from orient 0.
    pub vertices: [VertIdx; 2],
    /// triangles[i] abuts the side seen from orient i.
    pub triangles: [Otri; 2],
    /// Boundary marker, copied from the input segment.
    pub marker: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexKind {
    /// Supplied in the input point set.
    Input,
    /// Lies on a constraining segment.
    Segment,
    /// Inserted by the mesher rather than listed in the input.
    Free,
    /// Input vertex that is not a corner of any triangle (a duplicate, or
    /// stranded by carving). It keeps its slot but gets no output id.
    Undead,
}

#[derive(Clone, Debug)]
pub struct VertexData {
    pub x: Real,
    pub y: Real,
    /// Boundary marker. Zero for interior vertices.
    pub mark: i32,
    pub kind: VertexKind,
    /// Some triangle with this vertex as the origin of the viewed edge.
    /// Refreshed by make_vertex_map.
    pub tri: Otri,
    /// Output index assigned by renumber; INVALID until then.
    pub id: u32,
}

impl VertexData {
    #[inline]
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

// ──────────────────────────────── Configuration ──────────────────────────────

/// Knobs for mesh construction.
#[derive(Clone, Copy, Debug)]
pub struct Behavior {
    /// Use adaptive exact arithmetic for orientation and incircle tests.
    pub exact: bool,
    /// Keep the convex hull intact instead of carving concavities.
    pub convex: bool,
    /// Stamp every triangle with the attribute of its enclosing region.
    pub regionattrib: bool,
    /// Honor per-region maximum-area constraints.
    pub vararea: bool,
    /// Off-center constant for circumcenter placement; zero disables it.
    pub offconstant: Real,
    /// Seed for the point-location sampler and randomized sorting.
    pub seed: u64,
}

impl Default for Behavior {
    fn default() -> Self {
        Behavior {
            exact: true,
            convex: false,
            regionattrib: false,
            vararea: false,
            offconstant: 0.0,
            seed: 0,
        }
    }
}

/// A region seed: a point inside the region, the attribute to stamp, and an
/// optional maximum triangle area (negative when absent).
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub point: Point,
    pub attribute: Real,
    pub area: Real,
}

// ──────────────────────────────── The mesh ──────────────────────────────────

pub struct Mesh {
    pub triangles: Pool<TriangleData>,
    pub subsegs: Pool<SubsegData>,
    pub vertices: Pool<VertexData>,

    /// Hole seeds carried over from the input description.
    pub holes: Vec<Point>,
    /// Region seeds carried over from the input description.
    pub regions: Vec<Region>,

    pub behavior: Behavior,
    pub predicates: Predicates,
    pub(crate) sampler: Sampler,

    /// Most recently visited triangle, the point-location warm start.
    pub(crate) recenttri: Otri,

    /// Edges on the convex hull.
    pub hullsize: u32,
    /// Edges in the mesh.
    pub edges: u32,
    /// Vertices that are not a corner of any triangle.
    pub undeads: u32,
    /// Attributes carried per triangle.
    pub eextras: usize,
    /// True once any subsegment exists; edge flips then maintain the
    /// triangle-subsegment cross links.
    pub checksegments: bool,

    /// Worklist of triangles marked for removal by the carver.
    pub(crate) viruses: Vec<Otri>,
    /// Corners of the enclosing box while it is present; INVALID otherwise.
    pub(crate) infvertices: [VertIdx; 3],
    /// Bounding box of the input points.
    pub bounds: Rect,
}

impl Mesh {
    pub fn new(behavior: Behavior) -> Self {
        Mesh {
            triangles: Pool::with_sentinel(TriangleData::default()),
            subsegs: Pool::with_sentinel(SubsegData::default()),
            vertices: Pool::new(),
            holes: Vec::new(),
            regions: Vec::new(),
            behavior,
            predicates: Predicates::new(behavior.exact),
            sampler: Sampler::new(behavior.seed),
            recenttri: Otri::default(),
            hullsize: 0,
            edges: 0,
            undeads: 0,
            eextras: 0,
            checksegments: false,
            viruses: Vec::new(),
            infvertices: [INVALID; 3],
            bounds: Rect::new(),
        }
    }

    /// Number of vertices that are part of the triangulation.
    pub fn vertex_count(&self) -> u32 {
        self.vertices.count() - self.undeads
    }

    #[inline]
    pub fn vertex_point(&self, v: VertIdx) -> Point {
        self.vertices[v].point()
    }

    #[inline]
    pub(crate) fn is_inf(&self, v: VertIdx) -> bool {
        v != INVALID
            && (v == self.infvertices[0] || v == self.infvertices[1] || v == self.infvertices[2])
    }

    // ──────────────────────────── Edge navigation ────────────────────────────

    /// Origin vertex of the directed edge.
    #[inline]
    pub fn org(&self, t: Otri) -> VertIdx {
        self.triangles[t.tri].vertices[PLUS1[t.orient as usize]]
    }

    /// Destination vertex of the directed edge.
    #[inline]
    pub fn dest(&self, t: Otri) -> VertIdx {
        self.triangles[t.tri].vertices[MINUS1[t.orient as usize]]
    }

    /// Corner opposite the directed edge.
    #[inline]
    pub fn apex(&self, t: Otri) -> VertIdx {
        self.triangles[t.tri].vertices[t.orient as usize]
    }

    #[inline]
    pub fn set_org(&mut self, t: Otri, v: VertIdx) {
        self.triangles[t.tri].vertices[PLUS1[t.orient as usize]] = v;
    }

    #[inline]
    pub fn set_dest(&mut self, t: Otri, v: VertIdx) {
        self.triangles[t.tri].vertices[MINUS1[t.orient as usize]] = v;
    }

    #[inline]
    pub fn set_apex(&mut self, t: Otri, v: VertIdx) {
        self.triangles[t.tri].vertices[t.orient as usize] = v;
    }

    /// The abutting triangle across the edge, viewed from its own side, so
    /// the returned edge runs the opposite direction. DUMMY on the hull.
    #[inline]
    pub fn sym(&self, t: Otri) -> Otri {
        self.triangles[t.tri].neighbors[t.orient as usize]
    }

    /// Next edge counterclockwise around the origin.
    #[inline]
    pub fn onext(&self, t: Otri) -> Otri {
        self.sym(t.lprev())
    }

    /// Previous edge counterclockwise around the origin.
    #[inline]
    pub fn oprev(&self, t: Otri) -> Otri {
        self.sym(t).lnext()
    }

    /// Next edge counterclockwise around the destination.
    #[inline]
    pub fn dnext(&self, t: Otri) -> Otri {
        self.sym(t).lprev()
    }

    /// Previous edge counterclockwise around the destination.
    #[inline]
    pub fn dprev(&self, t: Otri) -> Otri {
        self.sym(t.lnext())
    }

    /// Bond two triangle edges to each other.
    #[inline]
    pub fn bond(&mut self, t: Otri, u: Otri) {
        self.triangles[t.tri].neighbors[t.orient as usize] = u;
        self.triangles[u.tri].neighbors[u.orient as usize] = t;
    }

    /// Detach the edge from its neighbor. One-sided: the neighbor keeps its
    /// link, which the caller either rebonds or dissolves in turn.
    #[inline]
    pub fn dissolve(&mut self, t: Otri) {
        self.triangles[t.tri].neighbors[t.orient as usize] = Otri::default();
    }

    // ──────────────────────────── Subsegment links ───────────────────────────

    /// Origin of the directed subsegment.
    #[inline]
    pub fn sorg(&self, s: Osub) -> VertIdx {
        self.subsegs[s.seg].vertices[s.orient as usize]
    }

    /// Destination of the directed subsegment.
    #[inline]
    pub fn sdest(&self, s: Osub) -> VertIdx {
        self.subsegs[s.seg].vertices[1 - s.orient as usize]
    }

    #[inline]
    pub fn set_sorg(&mut self, s: Osub, v: VertIdx) {
        self.subsegs[s.seg].vertices[s.orient as usize] = v;
    }

    #[inline]
    pub fn set_sdest(&mut self, s: Osub, v: VertIdx) {
        self.subsegs[s.seg].vertices[1 - s.orient as usize] = v;
    }

    /// Subsegment under a triangle edge. DUMMY when the edge is
    /// unconstrained.
    #[inline]
    pub fn tspivot(&self, t: Otri) -> Osub {
        self.triangles[t.tri].subsegs[t.orient as usize]
    }

    /// Triangle abutting the viewed side of a subsegment.
    #[inline]
    pub fn stpivot(&self, s: Osub) -> Otri {
        self.subsegs[s.seg].triangles[s.orient as usize]
    }

    /// Bond a triangle edge and a subsegment together.
    #[inline]
    pub fn tsbond(&mut self, t: Otri, s: Osub) {
        self.triangles[t.tri].subsegs[t.orient as usize] = s;
        self.subsegs[s.seg].triangles[s.orient as usize] = t;
    }

    /// Clear the triangle's side of a triangle-subsegment link.
    #[inline]
    pub fn tsdissolve(&mut self, t: Otri) {
        self.triangles[t.tri].subsegs[t.orient as usize] = Osub::default();
    }

    /// Clear the subsegment's side of a triangle-subsegment link.
    #[inline]
    pub fn stdissolve(&mut self, s: Osub) {
        self.subsegs[s.seg].triangles[s.orient as usize] = Otri::default();
    }

    // ──────────────────────────── Allocation ─────────────────────────────────

    /// Allocate a blank triangle. Its neighbors point at DUMMY and its
    /// attribute vector is sized to the mesh's per-triangle count.
    pub fn make_triangle(&mut self) -> Otri {
        let tri = self.triangles.alloc(TriangleData {
            vertices: [INVALID; 3],
            neighbors: [Otri::default(); 3],
            subsegs: [Osub::default(); 3],
            attributes: vec![0.0; self.eextras],
            area: -1.0,
        });
        Otri::new(tri, 0)
    }

    pub fn triangle_dealloc(&mut self, tri: TriIdx) {
        self.triangles.free(tri);
    }

    pub fn make_subseg(&mut self) -> Osub {
        let seg = self.subsegs.alloc(SubsegData {
            vertices: [INVALID; 2],
            triangles: [Otri::default(); 2],
            marker: 0,
        });
        Osub::new(seg, 0)
    }

    pub fn subseg_dealloc(&mut self, seg: SubIdx) {
        self.subsegs.free(seg);
    }

    pub fn make_vertex(&mut self, p: Point, mark: i32, kind: VertexKind) -> VertIdx {
        self.vertices.alloc(VertexData {
            x: p.x,
            y: p.y,
            mark,
            kind,
            tri: Otri::default(),
            id: INVALID,
        })
    }

    pub fn vertex_dealloc(&mut self, v: VertIdx) {
        self.vertices.free(v);
    }

    // ──────────────────────────── Maintenance ────────────────────────────────

    /// Point every vertex at a triangle that has it as the origin of the
    /// viewed edge. Must run after any pass that deletes triangles.
    pub fn make_vertex_map(&mut self) {
        for tri in 0..self.triangles.slots() {
            if !self.triangles.is_live(tri) {
                continue;
            }
            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                let v = self.org(t);
                if v != INVALID {
                    self.vertices[v].tri = t;
                }
            }
        }
    }

    /// Count the unpaired edges by scanning the pool.
    pub(crate) fn count_hull_edges(&self) -> u32 {
        let mut census = 0;
        for tri in self.triangles.indices() {
            for orient in 0..3u8 {
                if self.sym(Otri::new(tri, orient)).tri == DUMMY {
                    census += 1;
                }
            }
        }
        census
    }

    /// Find an edge on the hull by scanning the pool. None on an empty mesh.
    pub(crate) fn hull_otri(&self) -> Option<Otri> {
        for tri in self.triangles.indices() {
            for orient in 0..3u8 {
                let t = Otri::new(tri, orient);
                if self.sym(t).tri == DUMMY {
                    return Some(t);
                }
            }
        }
        None
    }

    /// Assign contiguous output ids to live vertices; undead vertices get
    /// INVALID. Returns the number of ids handed out.
    pub fn renumber(&mut self) -> u32 {
        let mut id = 0;
        for (_, v) in self.vertices.iter_mut() {
            if v.kind == VertexKind::Undead {
                v.id = INVALID;
            } else {
                v.id = id;
                id += 1;
            }
        }
        id
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new(Behavior::default())
    }
}

// ──────────────────────────────── Tests ────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // Two triangles sharing the diagonal b-d of the unit square:
    //   t1 = (a, b, d), t2 = (c, d, b), with a=(0,0) b=(1,0) c=(1,1) d=(0,1).
    fn two_triangle_fixture() -> (Mesh, Otri, Otri, [VertIdx; 4]) {
        let mut mesh = Mesh::new(Behavior::default());
        let a = mesh.make_vertex(Point::new(0.0, 0.0), 0, VertexKind::Input);
        let b = mesh.make_vertex(Point::new(1.0, 0.0), 0, VertexKind::Input);
        let c = mesh.make_vertex(Point::new(1.0, 1.0), 0, VertexKind::Input);
        let d = mesh.make_vertex(Point::new(0.0, 1.0), 0, VertexKind::Input);

        let t1 = mesh.make_triangle();
        mesh.triangles[t1.tri].vertices = [a, b, d];
        let t2 = mesh.make_triangle();
        mesh.triangles[t2.tri].vertices = [c, d, b];

        // Shared edge: t1 orient 0 is b->d, t2 orient 0 is d->b.
        mesh.bond(t1, t2);
        mesh.make_vertex_map();
        (mesh, t1, t2, [a, b, c, d])
    }

    #[test]
    fn corner_conventions() {
        let (mesh, t1, _, [a, b, _, d]) = two_triangle_fixture();
        assert_eq!(mesh.org(t1), b);
        assert_eq!(mesh.dest(t1), d);
        assert_eq!(mesh.apex(t1), a);
        // lnext advances to the edge d->a, lprev to a->b.
        assert_eq!(mesh.org(t1.lnext()), d);
        assert_eq!(mesh.dest(t1.lnext()), a);
        assert_eq!(mesh.org(t1.lprev()), a);
        assert_eq!(mesh.dest(t1.lprev()), b);
        // Three lnexts come back around.
        assert_eq!(t1.lnext().lnext().lnext(), t1);
    }

    #[test]
    fn symmetric_edge_runs_backwards() {
        let (mesh, t1, t2, [_, b, _, d]) = two_triangle_fixture();
        let s = mesh.sym(t1);
        assert_eq!(s, t2);
        assert_eq!(mesh.org(s), d);
        assert_eq!(mesh.dest(s), b);
        // Hull edges have no neighbor.
        assert_eq!(mesh.sym(t1.lnext()).tri, DUMMY);
    }

    #[test]
    fn vertex_ring_navigation() {
        let (mesh, t1, t2, [_, b, c, _]) = two_triangle_fixture();
        // Clockwise around origin b: from b->d to b->c.
        let o = mesh.oprev(t1);
        assert_eq!(mesh.org(o), b);
        assert_eq!(mesh.dest(o), c);
        assert_eq!(o.tri, t2.tri);
        // Counterclockwise from b->d crosses the hull.
        assert_eq!(mesh.onext(t1).tri, DUMMY);
        // Around destination d: the next edge counterclockwise into d is c->d.
        let dn = mesh.dnext(t1);
        assert_eq!(mesh.org(dn), c);
        assert_eq!(mesh.dest(dn), mesh.dest(t1));
    }

    #[test]
    fn subsegment_bond_round_trip() {
        let (mut mesh, t1, t2, [_, b, _, d]) = two_triangle_fixture();
        let s = mesh.make_subseg();
        mesh.set_sorg(s, d);
        mesh.set_sdest(s, b);
        mesh.tsbond(t1, s);
        mesh.tsbond(t2, s.ssym());

        let back = mesh.tspivot(t1);
        assert_eq!(back.seg, s.seg);
        assert_eq!(mesh.stpivot(back), t1);
        assert_eq!(mesh.stpivot(mesh.tspivot(t2)), t2);
        // The two views disagree on direction.
        assert_eq!(mesh.sorg(mesh.tspivot(t1)), mesh.sdest(mesh.tspivot(t2)));

        mesh.tsdissolve(t1);
        assert_eq!(mesh.tspivot(t1).seg, DUMMY);
    }

    #[test]
    fn vertex_map_points_home() {
        let (mesh, _, _, verts) = two_triangle_fixture();
        for &v in &verts {
            let t = mesh.vertices[v].tri;
            assert_ne!(t.tri, DUMMY);
            assert_eq!(mesh.org(t), v);
        }
    }

    #[test]
    fn renumber_skips_undead() {
        let (mut mesh, _, _, verts) = two_triangle_fixture();
        mesh.vertices[verts[1]].kind = VertexKind::Undead;
        mesh.undeads += 1;
        let handed_out = mesh.renumber();
        assert_eq!(handed_out, 3);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices[verts[1]].id, INVALID);
        let mut ids: Vec<u32> = verts
            .iter()
            .filter(|&&v| v != verts[1])
            .map(|&v| mesh.vertices[v].id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn attributes_sized_by_eextras() {
        let mut mesh = Mesh::new(Behavior::default());
        mesh.eextras = 2;
        let t = mesh.make_triangle();
        assert_eq!(mesh.triangles[t.tri].attributes.len(), 2);
    }
}
