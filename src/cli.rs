use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use filmgrade_core::AdjustmentParams;

#[derive(Debug, Parser)]
#[command(name = "filmgrade")]
#[command(version, about = "Film-style color grading with .cube LUTs")]
#[command(long_about = "
Preview and export photos with a film-style grade: exposure, white balance,
highlights, shadows and grain, followed by a 3D LUT preset.

Examples:
  filmgrade presets
  filmgrade inspect-lut portra400.cube
  filmgrade preview photo.jpg -o preview.png --preset portra --exposure 10
  filmgrade export photo.jpg -o graded.jpg --lut look.cube --shadows -20 --grain 15
  filmgrade export photo.jpg -o graded.png --params edits.json --seed 7
")]
pub struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available presets
    Presets {
        /// Preset directory (overrides config)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Parse a .cube file and report its size or why it falls back
    #[command(name = "inspect-lut")]
    InspectLut {
        file: PathBuf,
    },

    /// Write a downsampled graded preview
    Preview(PreviewArgs),

    /// Write the full-resolution graded image
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Longest preview edge in pixels (overrides config)
    #[arg(long)]
    pub max_edge: Option<u32>,

    #[command(flatten)]
    pub grade: GradeArgs,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    pub input: PathBuf,

    #[arg(short, long)]
    pub output: PathBuf,

    #[command(flatten)]
    pub grade: GradeArgs,
}

#[derive(Debug, Default, Args)]
pub struct GradeArgs {
    /// Preset name from the preset directory
    #[arg(long, conflicts_with = "lut")]
    pub preset: Option<String>,

    /// Standalone .cube file
    #[arg(long)]
    pub lut: Option<PathBuf>,

    /// Preset directory (overrides config)
    #[arg(long)]
    pub presets_dir: Option<PathBuf>,

    /// JSON file with adjustment params; flags below override it
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Exposure, -100..100
    #[arg(long, allow_negative_numbers = true)]
    pub exposure: Option<f32>,

    /// White balance (red/blue shift), -100..100
    #[arg(long, allow_negative_numbers = true)]
    pub white_balance: Option<f32>,

    /// Highlights, -100..100
    #[arg(long, allow_negative_numbers = true)]
    pub highlights: Option<f32>,

    /// Shadows, -100..100
    #[arg(long, allow_negative_numbers = true)]
    pub shadows: Option<f32>,

    /// Grain, 0..100
    #[arg(long)]
    pub grain: Option<f32>,

    /// Fixed grain seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,
}

impl GradeArgs {
    /// Params from `--params`, if any, with individual flags applied on top.
    pub fn resolve_params(&self) -> Result<AdjustmentParams> {
        let mut params = match &self.params {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("read params: {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parse params: {}", path.display()))?
            }
            None => AdjustmentParams::default(),
        };

        let overrides = [
            (self.exposure, &mut params.exposure),
            (self.white_balance, &mut params.white_balance),
            (self.highlights, &mut params.highlights),
            (self.shadows, &mut params.shadows),
            (self.grain, &mut params.grain),
        ];
        for (flag, slot) in overrides {
            if let Some(v) = flag {
                *slot = v;
            }
        }
        Ok(params)
    }
}
