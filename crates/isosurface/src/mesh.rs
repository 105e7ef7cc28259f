//! Renderer-ready buffers from marching cubes output

// external crates
use itertools::Itertools;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

/// Raw output of an external marching cubes implementation
///
/// Faces are index lists into `vertices` of any length. Normals are
/// optional and only used when there is exactly one per vertex.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarchingCubesOutput {
    /// Vertex positions
    pub vertices: Vec<[f64; 3]>,
    /// Polygons as indices into `vertices`
    pub faces: Vec<Vec<usize>>,
    /// Per-vertex normals, if computed
    pub normals: Option<Vec<[f64; 3]>>,
}

/// Flat vertex, normal, and index buffers for a single surface
///
/// Every three consecutive values in `positions` (and `normals`) are one
/// vertex, and every three consecutive `indices` are one triangle. Without
/// normals the renderer is expected to compute them from the triangles.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MeshBuffers {
    /// Flat `[x, y, z, x, y, z, ...]` positions
    pub positions: Vec<f32>,
    /// Flat per-vertex normals, same layout as `positions`
    pub normals: Option<Vec<f32>>,
    /// Triangle list
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True if there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Build mesh buffers from marching cubes output
///
/// Faces are fan triangulated around their first vertex. Faces with fewer
/// than three vertices or any out of range index are skipped.
///
/// Returns `None` when there is nothing to draw: no vertices, no faces, or
/// no face that survives the checks above.
///
/// ```rust
/// # use voltools_isosurface::{build_mesh, MarchingCubesOutput};
/// let output = MarchingCubesOutput {
///     vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
///     faces: vec![vec![0, 1, 2, 3]],
///     normals: None,
/// };
///
/// let mesh = build_mesh(&output).unwrap();
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
/// ```
pub fn build_mesh(output: &MarchingCubesOutput) -> Option<MeshBuffers> {
    let n_vertices = output.vertices.len();
    if n_vertices == 0 || output.faces.is_empty() {
        trace!("Empty marching cubes output, no mesh");
        return None;
    }
    if u32::try_from(n_vertices).is_err() {
        warn!("{n_vertices} vertices cannot be indexed by u32, no mesh");
        return None;
    }

    let indices = triangulate(&output.faces, n_vertices);
    if indices.is_empty() {
        warn!("No valid faces in marching cubes output, no mesh");
        return None;
    }

    Some(MeshBuffers {
        positions: flatten(&output.vertices),
        normals: output.normals.as_ref().and_then(|normals| {
            if normals.len() == n_vertices {
                Some(flatten(normals))
            } else {
                warn!(
                    "Ignoring {} normals for {} vertices",
                    normals.len(),
                    n_vertices
                );
                None
            }
        }),
        indices,
    })
}

/// Flatten vectors into a single f32 buffer
fn flatten(vectors: &[[f64; 3]]) -> Vec<f32> {
    let mut flat = Vec::with_capacity(vectors.len() * 3);
    for v in vectors {
        flat.extend(v.iter().map(|x| *x as f32));
    }
    flat
}

/// Fan triangulation of every valid face
fn triangulate(faces: &[Vec<usize>], n_vertices: usize) -> Vec<u32> {
    let capacity = faces
        .iter()
        .map(|f| f.len().saturating_sub(2) * 3)
        .sum();
    let mut indices = Vec::with_capacity(capacity);

    let mut skipped = 0;
    for face in faces {
        if face.len() < 3 || face.iter().any(|&i| i >= n_vertices) {
            skipped += 1;
            continue;
        }

        // checked against n_vertices, which fits in u32
        let first = face[0] as u32;
        for (b, c) in face[1..].iter().tuple_windows() {
            indices.extend([first, *b as u32, *c as u32]);
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} of {} faces", faces.len());
    }
    indices
}
