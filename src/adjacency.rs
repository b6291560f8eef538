// Copyright 2025 Lars Brubaker
// License: MIT
//
// Vertex adjacency of a mesh in compressed sparse column form, the layout
// finite-element assemblers and bandwidth reducers want. Built in two
// passes over the triangles: count entries per vertex, prefix-sum into
// column pointers, then fill. Every vertex is adjacent to itself, and each
// undirected edge contributes an entry in both directions.
//
// Uses the renumbered output ids, not pool slots, so the matrix rows are
// dense even on a carved mesh with undead vertices.

use crate::mesh::{Mesh, DUMMY};

pub struct AdjacencyMatrix {
    node_count: usize,
    /// Entries for node k live in irow[pcol[k]..pcol[k + 1]].
    pcol: Vec<usize>,
    /// Adjacent node ids, ascending within each node's range.
    irow: Vec<u32>,
}

impl AdjacencyMatrix {
    /// Renumber the mesh and build its adjacency structure.
    pub fn new(mesh: &mut Mesh) -> Self {
        mesh.renumber();
        Self::from_renumbered(mesh)
    }

    /// Build from a mesh whose vertex ids are already contiguous.
    pub fn from_renumbered(mesh: &Mesh) -> Self {
        let n = mesh.vertex_count() as usize;
        let pcol = Self::count(mesh, n);
        let irow = Self::fill(mesh, n, &pcol);
        let mut matrix = AdjacencyMatrix {
            node_count: n,
            pcol,
            irow,
        };
        matrix.sort_columns();
        matrix
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of stored adjacency entries, self-loops included.
    pub fn nnz(&self) -> usize {
        self.irow.len()
    }

    pub fn column_pointers(&self) -> &[usize] {
        &self.pcol
    }

    pub fn row_indices(&self) -> &[u32] {
        &self.irow
    }

    /// First pass: count one self entry per node plus two entries per owned
    /// edge, then convert counts to pointers.
    fn count(mesh: &Mesh, n: usize) -> Vec<usize> {
        let mut pcol = vec![0usize; n + 1];
        for entry in pcol.iter_mut().take(n) {
            *entry = 1;
        }

        for (tid, tri) in mesh.triangles.iter() {
            let ids = [
                mesh.vertices[tri.vertices[0]].id as usize,
                mesh.vertices[tri.vertices[1]].id as usize,
                mesh.vertices[tri.vertices[2]].id as usize,
            ];
            // Edge i sits opposite corner i and joins the other two
            // corners; the triangle with the smaller pool id owns it.
            for (edge, (a, b)) in [(2, (0, 1)), (0, (1, 2)), (1, (2, 0))] {
                let nid = tri.neighbors[edge].tri;
                if nid == DUMMY || tid < nid {
                    pcol[ids[a]] += 1;
                    pcol[ids[b]] += 1;
                }
            }
        }

        // Shift down and prefix-sum into pointers.
        for i in (1..=n).rev() {
            pcol[i] = pcol[i - 1];
        }
        pcol[0] = 0;
        for i in 1..=n {
            pcol[i] += pcol[i - 1];
        }
        pcol
    }

    /// Second pass: write the entries using a moving cursor per node.
    fn fill(mesh: &Mesh, n: usize, pcol: &[usize]) -> Vec<u32> {
        let mut cursor: Vec<usize> = pcol[..n].to_vec();
        let mut irow = vec![0u32; pcol[n]];

        for (i, cur) in cursor.iter_mut().enumerate() {
            irow[*cur] = i as u32;
            *cur += 1;
        }

        for (tid, tri) in mesh.triangles.iter() {
            let ids = [
                mesh.vertices[tri.vertices[0]].id,
                mesh.vertices[tri.vertices[1]].id,
                mesh.vertices[tri.vertices[2]].id,
            ];
            for (edge, (a, b)) in [(2, (0, 1)), (0, (1, 2)), (1, (2, 0))] {
                let nid = tri.neighbors[edge].tri;
                if nid == DUMMY || tid < nid {
                    irow[cursor[ids[a] as usize]] = ids[b];
                    cursor[ids[a] as usize] += 1;
                    irow[cursor[ids[b] as usize]] = ids[a];
                    cursor[ids[b] as usize] += 1;
                }
            }
        }
        irow
    }

    fn sort_columns(&mut self) {
        for k in 0..self.node_count {
            self.irow[self.pcol[k]..self.pcol[k + 1]].sort_unstable();
        }
    }
}

// ──────────────────────────────── Tests ────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point;
    use crate::mesh::build::{triangulate, Pslg};
    use crate::mesh::Behavior;

    fn square_mesh() -> Mesh {
        let pslg = Pslg::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ]);
        triangulate(&pslg, Behavior::default()).unwrap()
    }

    #[test]
    fn square_adjacency_counts() {
        let mut mesh = square_mesh();
        let matrix = AdjacencyMatrix::new(&mut mesh);

        assert_eq!(matrix.node_count(), 4);
        // 4 self-loops plus 5 undirected edges in both directions.
        assert_eq!(matrix.nnz(), 4 + 2 * 5);
        assert_eq!(matrix.column_pointers().len(), 5);
        assert_eq!(matrix.column_pointers()[4], matrix.nnz());

        // The two diagonal vertices have degree 3 (plus self), the two
        // others degree 2 (plus self).
        let mut degrees: Vec<usize> = (0..4)
            .map(|k| matrix.column_pointers()[k + 1] - matrix.column_pointers()[k])
            .collect();
        degrees.sort_unstable();
        assert_eq!(degrees, vec![3, 3, 4, 4]);
    }

    #[test]
    fn columns_are_sorted_and_symmetric() {
        let mut mesh = square_mesh();
        let matrix = AdjacencyMatrix::new(&mut mesh);
        let pcol = matrix.column_pointers();
        let irow = matrix.row_indices();

        for k in 0..matrix.node_count() {
            let column = &irow[pcol[k]..pcol[k + 1]];
            assert!(column.windows(2).all(|w| w[0] < w[1]));
            // Self entry present.
            assert!(column.contains(&(k as u32)));
            // Every neighbor lists k back.
            for &other in column {
                let back = &irow[pcol[other as usize]..pcol[other as usize + 1]];
                assert!(back.contains(&(k as u32)));
            }
        }
    }
}
