//! Command-line driver: load models, build their tangent space, optionally
//! export them in the text format and upload them to a headless GPU device.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asset::{ModelFormat, ModelRecord, compute_tangent_space, save_custom_to_path};
use clap::Parser;
use renderer::{Mesh, TextureSlot, WgpuBackend};

#[derive(Parser, Debug)]
#[command(version, about = "Load meshes and compute tangent space for normal mapping")]
struct Args {
    /// Model files (.obj or the text format).
    #[arg(required = true)]
    models: Vec<PathBuf>,

    /// auto | custom | obj
    #[arg(long, default_value = "auto")]
    format: ModelFormat,

    /// Write the first model to this path in the text format.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Upload every model to a headless GPU device.
    #[arg(long, requires_all = ["color_map", "normal_map"])]
    upload: bool,

    #[arg(long)]
    color_map: Option<PathBuf>,

    #[arg(long)]
    normal_map: Option<PathBuf>,

    /// auto | vulkan | dx12 | metal | gl
    #[arg(long, default_value = "auto", value_parser = parse_backend)]
    gpu_backend: wgpu::Backends,

    /// Keep the CPU copy of each model after upload.
    #[arg(long)]
    retain_cpu: bool,
}

fn parse_backend(val: &str) -> Result<wgpu::Backends, String> {
    match val.to_ascii_lowercase().as_str() {
        "auto" => Ok(wgpu::Backends::all()),
        "vulkan" | "vk" => Ok(wgpu::Backends::VULKAN),
        "dx12" | "d3d12" => Ok(wgpu::Backends::DX12),
        "metal" | "mtl" => Ok(wgpu::Backends::METAL),
        "gl" | "opengl" | "gles" => Ok(wgpu::Backends::GL),
        other => Err(format!("unknown backend '{}'", other)),
    }
}

fn print_summary(path: &Path, record: &ModelRecord) {
    println!(
        "{}: {} vertices, {} indices, {} faces",
        path.display(),
        record.vertex_count(),
        record.index_count(),
        record.face_count()
    );
    if let Some(first) = record.vertices().first() {
        println!(
            "  face 0: tangent {:?}, binormal {:?}",
            first.tangent.to_array(),
            first.binormal.to_array()
        );
    }
}

fn upload_all(args: &Args, models: Vec<(&PathBuf, ModelRecord)>) -> Result<()> {
    let (Some(color_map), Some(normal_map)) = (&args.color_map, &args.normal_map) else {
        anyhow::bail!("--upload needs both --color-map and --normal-map");
    };

    let backend = WgpuBackend::headless(args.gpu_backend).context("Failed to create GPU device")?;
    for (path, record) in models {
        let mesh = Mesh::upload(
            &backend,
            &backend,
            record,
            color_map,
            normal_map,
            args.retain_cpu,
        )
        .with_context(|| format!("Failed to upload {}", path.display()))?;

        let (w, h) = mesh.textures().slot(TextureSlot::Normal).size();
        log::info!(
            "{}: {} indices on GPU, normal map {}x{}, cpu copy kept: {}",
            path.display(),
            mesh.index_count(),
            w,
            h,
            mesh.cpu_copy().is_some()
        );
        mesh.shutdown();
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!(
        "Loading {} model(s), format={:?}, upload={}",
        args.models.len(),
        args.format,
        args.upload
    );

    let results = asset::load_models_parallel(args.models.as_slice(), args.format);
    let mut finished = Vec::with_capacity(results.len());
    for (path, result) in args.models.iter().zip(results) {
        let mut record = result.with_context(|| format!("Failed to load {}", path.display()))?;
        compute_tangent_space(&mut record)
            .with_context(|| format!("Failed to compute tangent space for {}", path.display()))?;
        print_summary(path, &record);
        finished.push((path, record));
    }

    if let (Some(out), Some((_, first))) = (&args.export, finished.first()) {
        save_custom_to_path(first, out)
            .with_context(|| format!("Failed to export to {}", out.display()))?;
    }

    if args.upload {
        upload_all(&args, finished)?;
    }

    log::info!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "app",
            "cube.obj",
            "--format=obj",
            "--gpu-backend=vk",
            "--upload",
            "--color-map",
            "c.png",
            "--normal-map",
            "n.png",
        ])
        .expect("parse");
        assert_eq!(args.format, ModelFormat::Obj);
        assert_eq!(args.gpu_backend, wgpu::Backends::VULKAN);
        assert!(args.upload);
    }

    #[test]
    fn upload_requires_texture_paths() {
        assert!(Args::try_parse_from(["app", "cube.obj", "--upload"]).is_err());
        assert!(parse_backend("directx9").is_err());
    }
}
