use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use filmgrade_core::decode::{load_image, load_image_scaled, save_image};
use filmgrade_core::lut::read_cube_file;
use filmgrade_core::{Pipeline, PixelBuffer};
use filmgrade_presets::PresetCatalog;
use filmgrade_render::GradingSession;

use crate::cli::{Command, ExportArgs, GradeArgs, PreviewArgs};
use crate::config::Config;

pub async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Presets { dir } => {
            list_presets(dir.as_deref().unwrap_or(config.presets_dir.as_path()))
        }
        Command::InspectLut { file } => inspect_lut(&file),
        Command::Preview(args) => preview(args, config).await,
        Command::Export(args) => export(args, config).await,
    }
}

fn list_presets(dir: &Path) -> Result<()> {
    let catalog = PresetCatalog::open(dir)?;
    for preset in catalog.presets() {
        match &preset.description {
            Some(desc) => println!("{:<20} {} - {}", preset.name, preset.label, desc),
            None => println!("{:<20} {}", preset.name, preset.label),
        }
    }
    Ok(())
}

fn inspect_lut(path: &Path) -> Result<()> {
    let load = read_cube_file(path);
    match &load.error {
        None => println!(
            "{}: {}³ LUT ({} entries)",
            path.display(),
            load.lut.size(),
            load.lut.entry_count()
        ),
        Some(err) => println!(
            "{}: unusable ({err}), falls back to {}³ identity",
            path.display(),
            load.lut.size()
        ),
    }
    Ok(())
}

async fn preview(args: PreviewArgs, config: &Config) -> Result<()> {
    let max_edge = args.max_edge.unwrap_or(config.preview_max_edge);
    let input = args.input.clone();
    let source = tokio::task::spawn_blocking(move || load_image_scaled(&input, Some(max_edge)))
        .await
        .context("image load task failed")??;

    let session = build_session(source, max_edge, &args.grade, config)?;
    let frame = session
        .preview()
        .await?
        .context("preview was superseded")?;

    let output = args.output;
    tokio::task::spawn_blocking(move || save_image(&frame.buffer, &output))
        .await
        .context("image save task failed")??;
    Ok(())
}

async fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let input = args.input.clone();
    let source = tokio::task::spawn_blocking(move || load_image(&input))
        .await
        .context("image load task failed")??;

    let session = build_session(source, config.preview_max_edge, &args.grade, config)?;
    let summary = session.export(args.output).await?;
    println!(
        "{} ({}x{}) in {} ms",
        summary.path.display(),
        summary.width,
        summary.height,
        summary.elapsed.as_millis()
    );
    Ok(())
}

fn build_session(
    source: PixelBuffer,
    preview_max_edge: u32,
    grade: &GradeArgs,
    config: &Config,
) -> Result<GradingSession> {
    let pipeline = match grade.seed {
        Some(seed) => Pipeline::with_seed(seed),
        None => Pipeline::new(),
    };
    let mut session = GradingSession::with_pipeline(source, preview_max_edge, pipeline);

    if let Some(path) = &grade.lut {
        let load = read_cube_file(path);
        session.set_lut(&lut_label(path), Arc::new(load.into_lut()));
    } else if let Some(name) = &grade.preset {
        let dir = grade.presets_dir.as_deref().unwrap_or(config.presets_dir.as_path());
        let catalog = PresetCatalog::open(dir)?;
        session.select_preset(&catalog, name)?;
    }

    let params = grade.resolve_params()?;
    session.set_params(params);
    info!(preset = session.preset(), params = ?session.params(), "grade configured");
    Ok(session)
}

fn lut_label(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}
