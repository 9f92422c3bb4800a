//! Wavefront OBJ loading
//!
//! Only positions (`v`) and faces (`f`) are read. Everything else in the
//! file is skipped.

use std::fs;
use std::path::Path;
use crate::rasterizer::{Mesh, Triangle, Vec3};

/// Error type for mesh loading
#[derive(Debug)]
pub enum ObjError {
    IoError(std::io::Error),
    /// Malformed `v` or `f` line (1-based line number)
    ParseError { line: usize, message: String },
    /// Face index outside `1..=count`
    IndexOutOfRange { line: usize, index: i64, count: usize },
}

impl From<std::io::Error> for ObjError {
    fn from(e: std::io::Error) -> Self {
        ObjError::IoError(e)
    }
}

impl std::fmt::Display for ObjError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjError::IoError(e) => write!(f, "IO error: {}", e),
            ObjError::ParseError { line, message } => write!(f, "Line {}: {}", line, message),
            ObjError::IndexOutOfRange { line, index, count } => {
                write!(f, "Line {}: vertex {} out of range (file has {})", line, index, count)
            }
        }
    }
}

impl std::error::Error for ObjError {}

/// Load a mesh from an OBJ file
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ObjError> {
    let contents = fs::read_to_string(path.as_ref())?;
    let mesh = parse_obj(&contents)?;
    log::info!("Loaded {} ({} triangles)", path.as_ref().display(), mesh.len());
    Ok(mesh)
}

/// Parse OBJ text into a mesh.
///
/// All vertices are collected before any face is resolved, so a face may
/// refer to a vertex declared further down. Quads become `(v1, v2, v3)`
/// and `(v3, v4, v1)`.
pub fn parse_obj(text: &str) -> Result<Mesh, ObjError> {
    let lines = || text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let mut vertices = Vec::new();
    for (line_no, line) in lines().filter(|(_, l)| l.starts_with("v ")) {
        vertices.push(parse_vertex(line_no, line)?);
    }

    let mut tris = Vec::new();
    for (line_no, line) in lines().filter(|(_, l)| l.starts_with("f ")) {
        let idx = parse_face(line_no, line, vertices.len())?;
        let v = |i: usize| vertices[idx[i]];
        match idx.len() {
            3 => tris.push(Triangle::new(v(0), v(1), v(2))),
            _ => {
                tris.push(Triangle::new(v(0), v(1), v(2)));
                tris.push(Triangle::new(v(2), v(3), v(0)));
            }
        }
    }

    log::debug!("OBJ: {} vertices, {} triangles", vertices.len(), tris.len());
    Ok(Mesh::new(tris))
}

fn parse_vertex(line_no: usize, line: &str) -> Result<Vec3, ObjError> {
    let coords: Vec<&str> = line.split_whitespace().skip(1).collect();
    if coords.len() < 3 {
        return Err(ObjError::ParseError {
            line: line_no,
            message: format!("expected 3 coordinates, found {}", coords.len()),
        });
    }

    let mut xyz = [0.0f32; 3];
    for (slot, text) in xyz.iter_mut().zip(&coords) {
        *slot = text.parse().map_err(|_| ObjError::ParseError {
            line: line_no,
            message: format!("bad coordinate '{}'", text),
        })?;
    }
    Ok(Vec3::new(xyz[0], xyz[1], xyz[2]))
}

/// Zero-based vertex indices of a 3- or 4-corner face
fn parse_face(line_no: usize, line: &str, count: usize) -> Result<Vec<usize>, ObjError> {
    let groups: Vec<&str> = line.split_whitespace().skip(1).collect();
    if groups.len() != 3 && groups.len() != 4 {
        return Err(ObjError::ParseError {
            line: line_no,
            message: format!("expected 3 or 4 vertices per face, found {}", groups.len()),
        });
    }

    groups
        .iter()
        .map(|group| {
            // v/vt/vn - only the position index matters
            let first = group.split('/').next().unwrap_or_default();
            let index: i64 = first.parse().map_err(|_| ObjError::ParseError {
                line: line_no,
                message: format!("bad face index '{}'", group),
            })?;
            if index < 1 || index as usize > count {
                return Err(ObjError::IndexOutOfRange { line: line_no, index, count });
            }
            Ok(index as usize - 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "\
# unit quad
o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn test_triangle_face() {
        let mesh = parse_obj("v 0 0 5\nv 0 1 5\nv 1 0 5\nf 1 2 3\n").unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.tris[0].p[1], Vec3::new(0.0, 1.0, 5.0));
    }

    #[test]
    fn test_quad_is_split() {
        let mesh = parse_obj(QUAD).unwrap();
        assert_eq!(mesh.len(), 2);
        let v = |x, y| Vec3::new(x, y, 0.0);
        assert_eq!(mesh.tris[0].p, [v(0.0, 0.0), v(1.0, 0.0), v(1.0, 1.0)]);
        assert_eq!(mesh.tris[1].p, [v(1.0, 1.0), v(0.0, 1.0), v(0.0, 0.0)]);
    }

    #[test]
    fn test_face_before_vertices() {
        let mesh = parse_obj("f 1 2 3\nv 0 0 0\nv 1 0 0\nv 0 1 0\n").unwrap();
        assert_eq!(mesh.len(), 1);
    }

    #[test]
    fn test_slash_forms() {
        let mesh = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1//4 2//4 3//4\n").unwrap();
        assert_eq!(mesh.len(), 1);
    }

    #[test]
    fn test_no_faces_is_empty_mesh() {
        assert!(parse_obj("v 0 0 0\n# nothing else\n").unwrap().is_empty());
        assert!(parse_obj("").unwrap().is_empty());
    }

    #[test]
    fn test_index_out_of_range() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { line: 3, index: 3, count: 2 }));
        let err = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").unwrap_err();
        assert!(matches!(err, ObjError::IndexOutOfRange { index: 0, .. }));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(parse_obj("v 1 two 3\n"), Err(ObjError::ParseError { line: 1, .. })));
        assert!(matches!(parse_obj("v 1 2\n"), Err(ObjError::ParseError { line: 1, .. })));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n"),
            Err(ObjError::ParseError { line: 3, .. })
        ));
        assert!(matches!(
            parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 x 3\n"),
            Err(ObjError::ParseError { line: 4, .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("trirast_quad_{}.obj", std::process::id()));
        fs::write(&path, QUAD).unwrap();
        assert_eq!(load_obj(&path).unwrap().len(), 2);
        let _ = fs::remove_file(path);
        assert!(matches!(load_obj("/definitely/not/here.obj"), Err(ObjError::IoError(_))));
    }
}
