use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use filmgrade_core::{AdjustmentParams, Lut, Pipeline, PixelBuffer};
use filmgrade_presets::models::IDENTITY_PRESET;
use filmgrade_presets::{PresetCatalog, PresetError};

use crate::export::{ExportError, ExportSummary, Exporter};
use crate::preview::{PreviewFrame, PreviewRenderer};

/// One photo being graded: the full-resolution source, the selected
/// preset's LUT, the current sliders, and both render paths.
pub struct GradingSession {
    source: Arc<PixelBuffer>,
    preview: PreviewRenderer,
    exporter: Exporter,
    preset: String,
    lut: Arc<Lut>,
    params: AdjustmentParams,
}

impl GradingSession {
    pub fn new(source: PixelBuffer, preview_max_edge: u32) -> Self {
        Self::with_pipeline(source, preview_max_edge, Pipeline::new())
    }

    pub fn with_pipeline(source: PixelBuffer, preview_max_edge: u32, pipeline: Pipeline) -> Self {
        let preview = PreviewRenderer::new(&source, preview_max_edge).with_pipeline(pipeline);
        Self {
            source: Arc::new(source),
            preview,
            exporter: Exporter::new().with_pipeline(pipeline),
            preset: IDENTITY_PRESET.to_string(),
            lut: Arc::new(Lut::fallback()),
            params: AdjustmentParams::default(),
        }
    }

    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    pub fn preview_source(&self) -> &PixelBuffer {
        self.preview.source()
    }

    pub fn preset(&self) -> &str {
        &self.preset
    }

    pub fn lut(&self) -> &Arc<Lut> {
        &self.lut
    }

    pub fn params(&self) -> AdjustmentParams {
        self.params
    }

    /// Switch to the preset `name`, loading its LUT through `catalog`.
    /// Any preview still in flight is discarded.
    pub fn select_preset(
        &mut self,
        catalog: &PresetCatalog,
        name: &str,
    ) -> Result<(), PresetError> {
        let lut = catalog.load_lut(name)?;
        info!(name, size = lut.size(), "preset selected");
        self.set_lut(name, lut);
        Ok(())
    }

    /// Use `lut` directly, e.g. one read from a standalone `.cube` file.
    pub fn set_lut(&mut self, label: &str, lut: Arc<Lut>) {
        self.preset = label.to_string();
        self.lut = lut;
        self.preview.invalidate();
    }

    /// Store new slider values, clamped to their ranges.
    pub fn set_params(&mut self, params: AdjustmentParams) {
        self.params = params.clamped();
    }

    /// Render a preview with the current preset and sliders.
    pub fn preview(&self) -> impl Future<Output = Result<Option<PreviewFrame>>> + Send + 'static {
        self.preview.render(Arc::clone(&self.lut), self.params)
    }

    /// Export the full-resolution image with the current preset and sliders.
    pub async fn export(&self, path: PathBuf) -> Result<ExportSummary, ExportError> {
        self.exporter
            .export(Arc::clone(&self.source), Arc::clone(&self.lut), self.params, path)
            .await
    }

    /// Full-resolution render kept in memory.
    pub async fn render_full(&self) -> Result<PixelBuffer, ExportError> {
        self.exporter
            .render(Arc::clone(&self.source), Arc::clone(&self.lut), self.params)
            .await
    }
}
