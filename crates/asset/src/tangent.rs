//! Per-face tangent/binormal computation for normal mapping.
//!
//! Each face gets one frame derived from its position edges and texture-space
//! deltas; all three corners receive the same frame (no smoothing, matching
//! the flat vertex list).

use corelib::{ModelError, ModelResult, Vec3};

use crate::mesh::{ModelRecord, VertexAttributes};

/// Tangent and binormal of one face, both unit length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TangentFrame {
    pub tangent: Vec3,
    pub binormal: Vec3,
}

/// Compute the frame of face `face` from its three corners.
pub fn tangent_frame(corners: &[VertexAttributes; 3], face: usize) -> ModelResult<TangentFrame> {
    let [v1, v2, v3] = corners;

    let e1 = v2.position - v1.position;
    let e2 = v3.position - v1.position;
    let d1 = v2.texcoord - v1.texcoord;
    let d2 = v3.texcoord - v1.texcoord;

    let det = d1.x * d2.y - d2.x * d1.y;
    let inv = 1.0 / det;
    if det == 0.0 || !inv.is_finite() {
        return Err(ModelError::DegenerateUv { face });
    }

    let tangent = (e1 * d2.y - e2 * d1.y) * inv;
    let binormal = (e2 * d1.x - e1 * d2.x) * inv;

    Ok(TangentFrame {
        tangent: tangent
            .try_normalize()
            .ok_or(ModelError::DegenerateGeometry {
                face,
                vector: "tangent",
            })?,
        binormal: binormal
            .try_normalize()
            .ok_or(ModelError::DegenerateGeometry {
                face,
                vector: "binormal",
            })?,
    })
}

/// Fill tangent/binormal of every vertex in place.
///
/// All frames are computed before any vertex is written, so on error the
/// record is left as it was. Re-running overwrites with identical values.
pub fn compute_tangent_space(record: &mut ModelRecord) -> ModelResult<()> {
    let vertex_count = record.vertex_count();
    if vertex_count % 3 != 0 {
        return Err(ModelError::format(
            0,
            format!("vertex count {} is not a multiple of 3", vertex_count),
        ));
    }

    let frames = record
        .vertices()
        .chunks_exact(3)
        .enumerate()
        .map(|(face, corners)| {
            let corners: &[VertexAttributes; 3] = corners
                .try_into()
                .map_err(|_| ModelError::format(0, "incomplete face"))?;
            tangent_frame(corners, face)
        })
        .collect::<ModelResult<Vec<_>>>()?;

    for (corners, frame) in record.vertices_mut().chunks_exact_mut(3).zip(&frames) {
        for v in corners {
            v.tangent = frame.tangent;
            v.binormal = frame.binormal;
        }
    }
    record.mark_tangents_computed();

    log::debug!("Computed tangent space for {} faces", frames.len());
    Ok(())
}
