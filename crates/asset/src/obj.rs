//! Minimal OBJ parser: triangles with `v/vt/vn` corners expanded into a flat
//! vertex list. Texture V is flipped (`v' = 1 - v`) for a top-left UV origin.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use corelib::{AttributeKind, ModelError, ModelResult, Vec2, Vec3, vec2, vec3};

use crate::mesh::{ModelRecord, VertexAttributes};

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> ModelResult<ModelRecord> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record = parse_obj(BufReader::new(file))?;
    log::info!(
        "Loaded OBJ {:?}: {} vertices, {} faces",
        path,
        record.vertex_count(),
        record.face_count()
    );
    Ok(record)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> ModelResult<ModelRecord> {
    parse_obj(reader)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> ModelResult<ModelRecord> {
    parse_obj(io::Cursor::new(contents))
}

/// One face corner, indices already 0-based but not yet bounds-checked.
#[derive(Clone, Copy, Debug)]
struct Corner {
    line: usize,
    position: i64,
    texcoord: i64,
    normal: i64,
}

fn parse_obj<R: BufRead>(reader: R) -> ModelResult<ModelRecord> {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut texcoords: Vec<Vec2> = Vec::new();
    let mut normals: Vec<Vec3> = Vec::new();
    let mut corners: Vec<Corner> = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line_no = line_idx + 1;
        let line = line.map_err(|source| ModelError::Read {
            line: line_no,
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                positions.push(vec3(x, y, z));
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                texcoords.push(vec2(u, 1.0 - v));
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                normals.push(vec3(nx, ny, nz));
            }
            "f" => {
                let elements: Vec<&str> = parts.collect();
                if elements.len() != 3 {
                    return Err(ModelError::UnsupportedFace {
                        line: line_no,
                        corners: elements.len(),
                    });
                }
                for element in elements {
                    corners.push(parse_face_corner(
                        element,
                        [positions.len(), texcoords.len(), normals.len()],
                        line_no,
                    )?);
                }
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/etc.)
            }
        }
    }

    if corners.is_empty() {
        return Err(ModelError::format(0, "OBJ contained no triangles"));
    }

    let vertices = corners
        .iter()
        .map(|corner| {
            let position = lookup(&positions, corner.position, AttributeKind::Position, corner.line)?;
            let texcoord = lookup(&texcoords, corner.texcoord, AttributeKind::TexCoord, corner.line)?;
            let normal = lookup(&normals, corner.normal, AttributeKind::Normal, corner.line)?;
            Ok(VertexAttributes::new(position, texcoord, normal))
        })
        .collect::<ModelResult<Vec<_>>>()?;

    log::debug!(
        "OBJ lists: {} positions, {} texcoords, {} normals -> {} vertices",
        positions.len(),
        texcoords.len(),
        normals.len(),
        vertices.len()
    );

    Ok(ModelRecord::new(vertices))
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> ModelResult<f32> {
    let token = value.ok_or_else(|| ModelError::format(line_no, format!("missing {}", what)))?;
    token
        .parse::<f32>()
        .map_err(|_| ModelError::format(line_no, format!("invalid {} '{}'", what, token)))
}

/// Parse `a/b/c`. `lens` are the list lengths at this line, used for
/// negative (relative) indices.
fn parse_face_corner(token: &str, lens: [usize; 3], line_no: usize) -> ModelResult<Corner> {
    let slots: Vec<&str> = token.split('/').collect();
    if slots.len() != 3 || slots.iter().any(|s| s.is_empty()) {
        return Err(ModelError::format(
            line_no,
            format!("face element '{}' must have the form v/vt/vn", token),
        ));
    }

    Ok(Corner {
        line: line_no,
        position: resolve_index(slots[0], lens[0], AttributeKind::Position, line_no)?,
        texcoord: resolve_index(slots[1], lens[1], AttributeKind::TexCoord, line_no)?,
        normal: resolve_index(slots[2], lens[2], AttributeKind::Normal, line_no)?,
    })
}

fn resolve_index(token: &str, len: usize, kind: AttributeKind, line_no: usize) -> ModelResult<i64> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| ModelError::format(line_no, format!("invalid index '{}'", token)))?;
    match raw {
        0 => Err(ModelError::Index {
            line: line_no,
            kind,
            index: 0,
            len,
        }),
        r if r > 0 => Ok(r - 1),
        r => Ok(len as i64 + r),
    }
}

fn lookup<T: Copy>(list: &[T], index: i64, kind: AttributeKind, line: usize) -> ModelResult<T> {
    usize::try_from(index)
        .ok()
        .and_then(|i| list.get(i).copied())
        .ok_or(ModelError::Index {
            line,
            kind,
            index: index + 1,
            len: list.len(),
        })
}
