use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use thiserror::Error;

/// GPU ready mesh buffers produced from an STL file.
///
/// Vertices are laid out as `position.xyz` followed by `normal.xyz`,
/// deduplicated across facets so the buffers are indexable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl TriMesh {
    /// Vertex positions only, for collider construction.
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices
            .chunks_exact(6)
            .map(|chunk| Vec3::new(chunk[0], chunk[1], chunk[2]))
            .collect()
    }

    /// Triangle index triples, for collider construction.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
            .collect()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Parse failures for the STL front-end.
#[derive(Debug, Error)]
pub enum StlError {
    #[error("file is too short to be a binary STL")]
    Truncated,
    #[error("binary STL declares {declared} triangles but holds {actual}")]
    CountMismatch { declared: u32, actual: u32 },
    #[error("invalid ASCII STL on line {line}: {message}")]
    Ascii { line: usize, message: String },
    #[error("STL file does not define any triangles")]
    Empty,
}

const BINARY_HEADER: usize = 80;
const BINARY_TRIANGLE: usize = 4 * 12 + 2;

/// Reads an STL file from disk, accepting both the ASCII and binary layout.
pub fn load_stl_file<P: AsRef<Path>>(path: P) -> Result<TriMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
    let mesh = load_stl_from_bytes(&bytes)
        .with_context(|| format!("failed to parse STL mesh {}", path.display()))?;
    Ok(mesh)
}

/// Parses an STL file already resident in memory.
pub fn load_stl_from_bytes(bytes: &[u8]) -> Result<TriMesh, StlError> {
    if looks_ascii(bytes) {
        parse_ascii(bytes)
    } else {
        parse_binary(bytes)
    }
}

/// A binary STL may legally begin with "solid", so require facet keywords in
/// the text before committing to the ASCII path.
fn looks_ascii(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    text.trim_start().starts_with("solid") && text.contains("facet")
}

fn parse_ascii(bytes: &[u8]) -> Result<TriMesh, StlError> {
    let text = std::str::from_utf8(bytes).map_err(|err| StlError::Ascii {
        line: 0,
        message: err.to_string(),
    })?;

    let mut builder = MeshBuilder::default();
    let mut facet_normal = Vec3::ZERO;
    let mut triangle: Vec<Vec3> = Vec::with_capacity(3);

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("facet") => {
                // "facet normal nx ny nz"
                let _ = parts.next();
                facet_normal = parse_vec3(&mut parts, line_no)?;
                triangle.clear();
            }
            Some("vertex") => {
                triangle.push(parse_vec3(&mut parts, line_no)?);
                if triangle.len() > 3 {
                    return Err(StlError::Ascii {
                        line: line_no,
                        message: "facet holds more than 3 vertices".into(),
                    });
                }
            }
            Some("endfacet") => {
                if triangle.len() != 3 {
                    return Err(StlError::Ascii {
                        line: line_no,
                        message: format!("facet holds {} vertices", triangle.len()),
                    });
                }
                builder.push_triangle([triangle[0], triangle[1], triangle[2]], facet_normal);
            }
            _ => {}
        }
    }

    builder.finish()
}

fn parse_binary(bytes: &[u8]) -> Result<TriMesh, StlError> {
    if bytes.len() < BINARY_HEADER + 4 {
        return Err(StlError::Truncated);
    }
    let declared = u32::from_le_bytes([
        bytes[BINARY_HEADER],
        bytes[BINARY_HEADER + 1],
        bytes[BINARY_HEADER + 2],
        bytes[BINARY_HEADER + 3],
    ]);
    let body = &bytes[BINARY_HEADER + 4..];
    let actual = (body.len() / BINARY_TRIANGLE) as u32;
    if actual < declared {
        return Err(StlError::CountMismatch { declared, actual });
    }

    let mut builder = MeshBuilder::default();
    for record in body.chunks_exact(BINARY_TRIANGLE).take(declared as usize) {
        let mut floats = [0.0f32; 12];
        for (i, value) in floats.iter_mut().enumerate() {
            let offset = i * 4;
            *value = f32::from_le_bytes([
                record[offset],
                record[offset + 1],
                record[offset + 2],
                record[offset + 3],
            ]);
        }
        let normal = Vec3::new(floats[0], floats[1], floats[2]);
        let a = Vec3::new(floats[3], floats[4], floats[5]);
        let b = Vec3::new(floats[6], floats[7], floats[8]);
        let c = Vec3::new(floats[9], floats[10], floats[11]);
        builder.push_triangle([a, b, c], normal);
    }

    builder.finish()
}

fn parse_vec3<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<Vec3, StlError> {
    let mut components = [0.0f32; 3];
    for component in &mut components {
        let token = parts.next().ok_or_else(|| StlError::Ascii {
            line: line_no,
            message: "missing vector component".into(),
        })?;
        *component = token.parse::<f32>().map_err(|err| StlError::Ascii {
            line: line_no,
            message: format!("bad float {token:?}: {err}"),
        })?;
    }
    Ok(Vec3::from_array(components))
}

/// Accumulates facets into deduplicated vertex/index buffers. Facet normals
/// that are degenerate are replaced by the computed face normal.
#[derive(Default)]
struct MeshBuilder {
    lookup: HashMap<VertexKey, u32>,
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

#[derive(PartialEq, Eq, Hash)]
struct VertexKey {
    position: [u32; 3],
    normal: [u32; 3],
}

impl VertexKey {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array().map(f32::to_bits),
            normal: normal.to_array().map(f32::to_bits),
        }
    }
}

impl MeshBuilder {
    fn push_triangle(&mut self, corners: [Vec3; 3], facet_normal: Vec3) {
        let normal = if facet_normal.length_squared() > f32::EPSILON {
            facet_normal.normalize()
        } else {
            face_normal(corners)
        };
        for corner in corners {
            let key = VertexKey::new(corner, normal);
            let next_index = (self.vertices.len() / 6) as u32;
            let entry = self.lookup.entry(key).or_insert_with(|| {
                self.vertices
                    .extend_from_slice(&[corner.x, corner.y, corner.z]);
                self.vertices
                    .extend_from_slice(&[normal.x, normal.y, normal.z]);
                next_index
            });
            self.indices.push(*entry);
        }
    }

    fn finish(self) -> Result<TriMesh, StlError> {
        if self.indices.is_empty() {
            return Err(StlError::Empty);
        }
        Ok(TriMesh {
            vertices: self.vertices,
            indices: self.indices,
        })
    }
}

fn face_normal(corners: [Vec3; 3]) -> Vec3 {
    let normal = (corners[1] - corners[0]).cross(corners[2] - corners[0]);
    if normal.length_squared() > f32::EPSILON {
        normal.normalize()
    } else {
        Vec3::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_TRIANGLE: &str = "\
solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test
";

    fn binary_triangle() -> Vec<u8> {
        let mut bytes = vec![0u8; BINARY_HEADER];
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let floats: [f32; 12] = [
            0.0, 0.0, 0.0, // degenerate normal, forces recomputation
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0,
        ];
        for value in floats {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes
    }

    #[test]
    fn parses_ascii_triangle() {
        let mesh = load_stl_from_bytes(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 18);
    }

    #[test]
    fn parses_binary_triangle_and_computes_normal() {
        let mesh = load_stl_from_bytes(&binary_triangle()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        for chunk in mesh.vertices.chunks_exact(6) {
            let normal = Vec3::new(chunk[3], chunk[4], chunk[5]);
            assert!((normal - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn shared_vertices_are_deduplicated() {
        let two_facets = "\
solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 0 0
      vertex 1 1 0
      vertex 0 1 0
    endloop
  endfacet
endsolid test
";
        let mesh = load_stl_from_bytes(two_facets.as_bytes()).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertices.len() / 6, 4);
    }

    #[test]
    fn truncated_binary_is_an_error() {
        let err = load_stl_from_bytes(&[0u8; 40]).unwrap_err();
        assert!(matches!(err, StlError::Truncated));
    }

    #[test]
    fn short_facet_is_an_error() {
        let bad = "solid t\nfacet normal 0 0 1\nvertex 0 0 0\nendfacet\nendsolid";
        let err = load_stl_from_bytes(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, StlError::Ascii { .. }));
    }

    #[test]
    fn collider_buffers_match_mesh() {
        let mesh = load_stl_from_bytes(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(mesh.positions().len(), 3);
        assert_eq!(mesh.triangles(), vec![[0, 1, 2]]);
    }
}
