//! Model format selection and multi-file loading.

use std::{path::Path, str::FromStr, thread};

use corelib::ModelResult;

use crate::{custom::load_custom_from_path, mesh::ModelRecord, obj::load_obj_from_path};

/// Source format of a model file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelFormat {
    /// `.obj` extension selects OBJ, everything else the text format.
    #[default]
    Auto,
    Custom,
    Obj,
}

impl ModelFormat {
    /// Resolve `Auto` against a path. Explicit formats are returned as-is.
    pub fn resolve(self, path: &Path) -> ModelFormat {
        match self {
            ModelFormat::Auto => {
                let is_obj = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
                if is_obj {
                    ModelFormat::Obj
                } else {
                    ModelFormat::Custom
                }
            }
            explicit => explicit,
        }
    }
}

impl FromStr for ModelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ModelFormat::Auto),
            "custom" | "txt" | "text" => Ok(ModelFormat::Custom),
            "obj" => Ok(ModelFormat::Obj),
            other => Err(format!("unknown model format '{}'", other)),
        }
    }
}

/// Parse one model file with the given (or detected) format.
pub fn load_model(path: impl AsRef<Path>, format: ModelFormat) -> ModelResult<ModelRecord> {
    let path = path.as_ref();
    match format.resolve(path) {
        ModelFormat::Obj => load_obj_from_path(path),
        _ => load_custom_from_path(path),
    }
}

/// Load several models on scoped threads, at most one per available core.
/// Results come back in input order; each load is independent.
pub fn load_models_parallel<P>(paths: &[P], format: ModelFormat) -> Vec<ModelResult<ModelRecord>>
where
    P: AsRef<Path> + Sync,
{
    let workers = thread::available_parallelism().map_or(4, |n| n.get());
    load_in_batches(paths, format, workers)
}

fn load_in_batches<P>(
    paths: &[P],
    format: ModelFormat,
    workers: usize,
) -> Vec<ModelResult<ModelRecord>>
where
    P: AsRef<Path> + Sync,
{
    let mut results = Vec::with_capacity(paths.len());
    for batch in paths.chunks(workers.max(1)) {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|path| scope.spawn(move || load_model(path, format)))
                .collect();
            for handle in handles {
                match handle.join() {
                    Ok(result) => results.push(result),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
        });
    }
    results
}
