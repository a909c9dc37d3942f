//! Closed surface-mesh generation (cube and sphere topologies)
//!
//! Grounded on `original_source/lib/src/Mesh/Mesh.cpp`: a face is walked as
//! an `(n+1) x (n+1)` integer lattice (`n = subdiv`), vertices are
//! deduplicated through a hash map keyed on packed integer coordinates, and
//! two triangles are emitted per grid cell with winding flipped on three of
//! the six faces to keep the mesh outward-oriented.

use std::collections::HashMap;

use crate::error::{FemError, FemResult};
use crate::vecmath::Vec3;

/// The two canonical closed-surface topologies this crate generates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshTopology {
    Cube,
    Sphere,
}

/// One of the six faces of the parameterizing cube
struct Face {
    axis: usize,
    dir: i64,
    first_axis: usize,
    last_axis: usize,
}

const FACES: [Face; 6] = [
    Face { axis: 0, dir: 1, first_axis: 1, last_axis: 2 },
    Face { axis: 1, dir: 1, first_axis: 0, last_axis: 2 },
    Face { axis: 0, dir: 0, first_axis: 1, last_axis: 2 },
    Face { axis: 1, dir: 0, first_axis: 0, last_axis: 2 },
    Face { axis: 2, dir: 1, first_axis: 1, last_axis: 0 },
    Face { axis: 2, dir: 0, first_axis: 1, last_axis: 0 },
];

/// Faces whose winding must be swapped to keep the triangulation outward-facing
const SWAPPED_FACES: [usize; 3] = [1, 2, 4];

/// A triangulated closed surface embedded in three-space
pub struct Mesh {
    /// Deduplicated vertex positions, length V
    pub vertices: Vec<Vec3>,
    /// Triangle indices grouped in triples, length 3T
    pub indices: Vec<u32>,
    pub topology: MeshTopology,
    pub subdiv: usize,
    /// Duplicated-to-unique index map, present only if requested at construction
    pub dup_to_unique: Option<Vec<u32>>,
}

fn pack_key(coords: [i64; 3]) -> i64 {
    coords[0] | (coords[1] << 20) | (coords[2] << 40)
}

impl Mesh {
    /// Generate a mesh of the given topology and subdivision.
    ///
    /// `save_dup_map` retains the duplicated-to-unique index array required
    /// by [`crate::multigrid`] transfer operators.
    pub fn generate(subdiv: usize, topology: MeshTopology, save_dup_map: bool) -> FemResult<Mesh> {
        if subdiv == 0 || subdiv >= (1 << 20) {
            return Err(FemError::InvalidSubdivision(subdiv));
        }

        let n = subdiv + 1;
        let total_vertices = 6 * n * n;
        let unique_vertices = 6 * subdiv * subdiv + 2;
        let inv_subdiv = 1.0 / subdiv as f64;

        let mut vertex_index_map: HashMap<i64, u32> = HashMap::with_capacity(unique_vertices);
        let mut vertices = Vec::with_capacity(unique_vertices);
        let mut dup_to_unique = vec![0u32; total_vertices];

        let mut t = 0usize;
        for face in &FACES {
            for i in 0..n {
                for j in 0..n {
                    let mut coords = [0i64; 3];
                    coords[face.axis] = face.dir * subdiv as i64;
                    coords[face.first_axis] = j as i64;
                    coords[face.last_axis] = i as i64;

                    let key = pack_key(coords);
                    let unique_idx = *vertex_index_map.entry(key).or_insert_with(|| {
                        let p = vertices.len() as u32;
                        let fx = coords[0] as f64 * inv_subdiv * 2.0 - 1.0;
                        let fy = coords[1] as f64 * inv_subdiv * 2.0 - 1.0;
                        let fz = coords[2] as f64 * inv_subdiv * 2.0 - 1.0;
                        vertices.push(Vec3::new(fx, fy, fz));
                        p
                    });
                    dup_to_unique[t] = unique_idx;
                    t += 1;
                }
            }
        }

        let mut indices = Vec::with_capacity(36 * subdiv * subdiv);
        let mut face_vertex_offset = 0usize;
        for (face_idx, _) in FACES.iter().enumerate() {
            for i in 0..subdiv {
                for j in 0..subdiv {
                    let idx0 = face_vertex_offset + i * n + j;
                    let idx1 = face_vertex_offset + i * n + j + 1;
                    let idx2 = face_vertex_offset + (i + 1) * n + j;
                    let idx3 = face_vertex_offset + (i + 1) * n + j + 1;

                    let v0 = dup_to_unique[idx0];
                    let v1 = dup_to_unique[idx1];
                    let v2 = dup_to_unique[idx2];
                    let v3 = dup_to_unique[idx3];

                    if SWAPPED_FACES.contains(&face_idx) {
                        indices.extend_from_slice(&[v1, v0, v3, v0, v2, v3]);
                    } else {
                        indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
                    }
                }
            }
            face_vertex_offset += n * n;
        }

        if topology == MeshTopology::Sphere {
            for v in vertices.iter_mut() {
                *v = crate::vecmath::normalized(v);
            }
        }

        Ok(Mesh {
            vertices,
            indices,
            topology,
            subdiv,
            dup_to_unique: if save_dup_map { Some(dup_to_unique) } else { None },
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle `t`'s three vertex indices
    pub fn triangle(&self, t: usize) -> (u32, u32, u32) {
        (
            self.indices[3 * t],
            self.indices[3 * t + 1],
            self.indices[3 * t + 2],
        )
    }

    /// The contiguous vertex buffer, as consumed by a visualization collaborator
    pub fn vertex_buffer(&self) -> &[Vec3] {
        &self.vertices
    }

    /// The contiguous index buffer, as consumed by a visualization collaborator
    pub fn index_buffer(&self) -> &[u32] {
        &self.indices
    }
}
