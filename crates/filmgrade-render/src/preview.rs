use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use tracing::debug;

use filmgrade_core::{AdjustmentParams, Lut, Pipeline, PixelBuffer};

/// A finished preview render.
#[derive(Clone, Debug)]
pub struct PreviewFrame {
    pub generation: u64,
    pub buffer: PixelBuffer,
}

/// Interactive preview on a downsampled copy of the source.
///
/// Every [`render`](Self::render) call bumps a generation counter before it
/// starts. A render that finishes after a newer one was requested still
/// runs to completion, but its result is dropped: latest parameters win.
pub struct PreviewRenderer {
    source: Arc<PixelBuffer>,
    generation: Arc<AtomicU64>,
    pipeline: Pipeline,
}

impl PreviewRenderer {
    pub fn new(source: &PixelBuffer, max_edge: u32) -> Self {
        let preview = source.downsample(max_edge);
        debug!(
            src_w = source.width,
            src_h = source.height,
            w = preview.width,
            h = preview.height,
            "preview source prepared"
        );
        Self {
            source: Arc::new(preview),
            generation: Arc::new(AtomicU64::new(0)),
            pipeline: Pipeline::new(),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// The downsampled buffer previews are rendered from.
    pub fn source(&self) -> &PixelBuffer {
        &self.source
    }

    /// Generation of the most recent request.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Mark every in-flight render as stale without starting a new one.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Request a preview with `lut` and `params`.
    ///
    /// The generation is claimed when this is called, not when the future is
    /// first polled, so call order decides which request is latest. Resolves
    /// to `None` if a newer request was made before this one finished.
    pub fn render(
        &self,
        lut: Arc<Lut>,
        params: AdjustmentParams,
    ) -> impl Future<Output = Result<Option<PreviewFrame>>> + Send + 'static {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let latest = Arc::clone(&self.generation);
        let source = Arc::clone(&self.source);
        let pipeline = self.pipeline;

        async move {
            let t0 = std::time::Instant::now();
            let buffer = tokio::task::spawn_blocking(move || {
                pipeline.process_cpu(PixelBuffer::clone(&source), &lut, &params)
            })
            .await
            .context("preview render task failed")?;

            if latest.load(Ordering::SeqCst) != generation {
                debug!(generation, "preview superseded, dropping result");
                return Ok(None);
            }
            debug!(generation, elapsed_ms = t0.elapsed().as_millis(), "preview rendered");
            Ok(Some(PreviewFrame { generation, buffer }))
        }
    }
}
