//! Asset loading: model parsers (text format, OBJ), tangent-space
//! computation and texture decoding.

pub mod custom;
pub mod format;
pub mod mesh;
pub mod obj;
pub mod tangent;
pub mod texture;

pub use custom::{load_custom_from_path, load_custom_from_str, save_custom_to_path, write_custom};
pub use format::{ModelFormat, load_model, load_models_parallel};
pub use mesh::{ModelRecord, VertexAttributes};
pub use obj::{load_obj_from_path, load_obj_from_reader, load_obj_from_str};
pub use tangent::{TangentFrame, compute_tangent_space, tangent_frame};
pub use texture::TextureData;
