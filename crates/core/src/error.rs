//! Error taxonomy shared by the loaders and the render backend.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Which OBJ attribute list a face index points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    TexCoord,
    Normal,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeKind::Position => "position",
            AttributeKind::TexCoord => "texcoord",
            AttributeKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Failures while reading a model or building its tangent space.
///
/// Line numbers are 1-based; face numbers are 0-based positions in the
/// flat vertex list divided by three.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stream failed mid-read; readers carry no path, only the position.
    #[error("failed to read line {line}: {source}")]
    Read {
        line: usize,
        #[source]
        source: io::Error,
    },

    #[error("malformed model data on line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("{kind} index {index} out of range (len={len}) on line {line}")]
    Index {
        line: usize,
        kind: AttributeKind,
        index: i64,
        len: usize,
    },

    #[error("face with {corners} corners on line {line}; only triangles are supported")]
    UnsupportedFace { line: usize, corners: usize },

    #[error("face {face} has degenerate texture coordinates")]
    DegenerateUv { face: usize },

    #[error("face {face} produced a zero-length {vector}")]
    DegenerateGeometry { face: usize, vector: &'static str },

    #[error("tangent space has not been computed for this model")]
    MissingTangents,
}

impl ModelError {
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        ModelError::Format {
            line,
            message: message.into(),
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

/// Failures acquiring GPU-side resources (buffers, textures, devices).
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("failed to allocate {label}: {message}")]
    Allocation { label: String, message: String },

    #[error("failed to load texture {}: {message}", path.display())]
    Texture { path: PathBuf, message: String },

    #[error("no usable GPU adapter: {0}")]
    NoAdapter(String),
}

/// Anything that can abort a full model initialisation.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Resource(#[from] ResourceError),
}
