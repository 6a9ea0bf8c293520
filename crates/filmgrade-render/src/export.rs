use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, warn};

use filmgrade_core::decode::save_image;
use filmgrade_core::{AdjustmentParams, Lut, Pipeline, PixelBuffer};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

#[derive(Clone, Debug)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub elapsed: Duration,
}

/// Full-resolution export, one at a time.
///
/// A request made while another export is running fails with
/// [`ExportError::Busy`] instead of queueing.
pub struct Exporter {
    pipeline: Pipeline,
    in_flight: Arc<Mutex<()>>,
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::new(),
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    /// Take the single export slot. The guard travels with the blocking
    /// work, so a dropped caller future doesn't free the slot early.
    fn claim(&self) -> Result<OwnedMutexGuard<()>, ExportError> {
        Arc::clone(&self.in_flight).try_lock_owned().map_err(|_| {
            warn!("export requested while another is running");
            ExportError::Busy
        })
    }

    /// Grade the full-resolution `source` and keep the result in memory.
    pub async fn render(
        &self,
        source: Arc<PixelBuffer>,
        lut: Arc<Lut>,
        params: AdjustmentParams,
    ) -> Result<PixelBuffer, ExportError> {
        let guard = self.claim()?;
        let pipeline = self.pipeline;
        let graded = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            pipeline.process_parallel(PixelBuffer::clone(&source), &lut, &params)
        })
        .await
        .context("export task failed")?;
        Ok(graded)
    }

    /// Grade the full-resolution `source` and encode it to `path`.
    pub async fn export(
        &self,
        source: Arc<PixelBuffer>,
        lut: Arc<Lut>,
        params: AdjustmentParams,
        path: PathBuf,
    ) -> Result<ExportSummary, ExportError> {
        let guard = self.claim()?;
        info!(?path, w = source.width, h = source.height, "export started");

        let pipeline = self.pipeline;
        let summary = tokio::task::spawn_blocking(move || -> anyhow::Result<ExportSummary> {
            let _guard = guard;
            let t0 = Instant::now();
            let graded = pipeline.process_parallel(PixelBuffer::clone(&source), &lut, &params);
            save_image(&graded, &path)?;
            Ok(ExportSummary {
                path,
                width: graded.width,
                height: graded.height,
                elapsed: t0.elapsed(),
            })
        })
        .await
        .context("export task failed")??;

        info!(
            path = ?summary.path,
            elapsed_ms = summary.elapsed.as_millis(),
            "export finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Arc<PixelBuffer> {
        let mut data = Vec::new();
        for i in 0..(40 * 30) {
            data.extend([(i % 256) as u8, 50, 200, 255]);
        }
        Arc::new(PixelBuffer::from_data(40, 30, data).unwrap())
    }

    #[tokio::test]
    async fn export_writes_full_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graded.png");
        let exporter = Exporter::new();
        let summary = exporter
            .export(
                source(),
                Arc::new(Lut::fallback()),
                AdjustmentParams::default(),
                path.clone(),
            )
            .await
            .unwrap();
        assert_eq!((summary.width, summary.height), (40, 30));
        assert_eq!(summary.path, path);
        let written = filmgrade_core::decode::load_image(&path).unwrap();
        assert_eq!(written.dimensions(), (40, 30));
        assert!(!exporter.is_busy());
    }

    #[tokio::test]
    async fn concurrent_export_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new();
        let held = exporter.in_flight.try_lock().unwrap();
        assert!(exporter.is_busy());

        let err = exporter
            .export(
                source(),
                Arc::new(Lut::fallback()),
                AdjustmentParams::default(),
                dir.path().join("second.png"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));
        assert!(!dir.path().join("second.png").exists());

        drop(held);
        assert!(!exporter.is_busy());
    }

    async fn wait_until_idle(exporter: &Exporter) {
        while exporter.is_busy() {
            tokio::task::yield_now().await;
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    fn large_source() -> Arc<PixelBuffer> {
        Arc::new(PixelBuffer::from_data(3000, 3000, vec![90; 3000 * 3000 * 4]).unwrap())
    }

    #[tokio::test]
    async fn dropped_render_keeps_slot_until_work_finishes() {
        let exporter = Exporter::new();
        let lut = Arc::new(Lut::fallback());
        let params = AdjustmentParams {
            grain: 30.0,
            ..Default::default()
        };

        let mut pending = Box::pin(exporter.render(large_source(), Arc::clone(&lut), params));
        tokio::select! {
            biased;
            _ = &mut pending => {}
            _ = async {} => {}
        }
        drop(pending);

        assert!(exporter.is_busy());
        let err = exporter
            .render(source(), Arc::clone(&lut), params)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));

        wait_until_idle(&exporter).await;
        assert!(exporter.render(source(), lut, params).await.is_ok());
    }

    #[tokio::test]
    async fn dropped_export_still_writes_and_blocks_second_export() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.png");
        let second = dir.path().join("second.png");
        let exporter = Exporter::new();
        let lut = Arc::new(Lut::fallback());

        let mut pending = Box::pin(exporter.export(
            large_source(),
            Arc::clone(&lut),
            AdjustmentParams::default(),
            first.clone(),
        ));
        tokio::select! {
            biased;
            _ = &mut pending => {}
            _ = async {} => {}
        }
        drop(pending);

        assert!(exporter.is_busy());
        let err = exporter
            .export(source(), Arc::clone(&lut), AdjustmentParams::default(), second.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Busy));
        assert!(!second.exists());

        wait_until_idle(&exporter).await;
        assert!(first.exists());
    }

    #[tokio::test]
    async fn sequential_exports_both_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new();
        for name in ["one.png", "two.jpg"] {
            exporter
                .export(
                    source(),
                    Arc::new(Lut::fallback()),
                    AdjustmentParams::default(),
                    dir.path().join(name),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn encode_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Exporter::new()
            .export(
                source(),
                Arc::new(Lut::fallback()),
                AdjustmentParams::default(),
                dir.path().join("graded.bmp"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Failed(_)));
    }

    #[tokio::test]
    async fn render_matches_sequential_pipeline() {
        let params = AdjustmentParams {
            exposure: 20.0,
            highlights: -30.0,
            shadows: 40.0,
            ..Default::default()
        };
        let lut = Arc::new(Lut::fallback());
        let exported = Exporter::new()
            .render(source(), Arc::clone(&lut), params)
            .await
            .unwrap();
        let expected = Pipeline::new().process_cpu(PixelBuffer::clone(&source()), &lut, &params);
        assert_eq!(exported, expected);
    }
}
