//! Pipeline orchestration: decode → deskew → detect (with the rotated
//! retry) → merge → field extraction → record assembly.

use std::sync::Arc;
use std::time::Duration;

use image::GrayImage;
use thiserror::Error;
use tokio::task;
use tokio::time;
use tracing::{debug, info, warn};
use uuid::Uuid;

use yeongsu_core::{PipelineConfig, ReceiptRecord};

use crate::recognizer::{mean_confidence, OcrBackend, OcrError};
use crate::types::{Detection, TextLine};
use crate::{address, datetime, hash, items, merge, preprocess, store, total};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR call exceeded {0:?} and was abandoned")]
    OcrTimeout(Duration),
    #[error("OCR worker terminated unexpectedly")]
    WorkerGone,
}

/// The result of a single receipt processing run.
#[derive(Debug)]
pub struct OcrOutcome {
    /// SHA-256 hex digest of the submitted bytes — callers use it to
    /// deduplicate re-uploads of the same photo.
    pub source_hash: String,
    /// Merged logical lines, top to bottom (kept for proofreading UIs).
    pub lines: Vec<TextLine>,
    /// The structured record.
    pub record: ReceiptRecord,
}

/// Drives one image through the whole extraction pipeline.
///
/// The pipeline itself is synchronous and stateless per call, so separate
/// receipts may be processed concurrently by independent calls with no
/// locking. The only async seam is the backend invocation, which runs on a
/// blocking worker under a hard timeout.
pub struct ReceiptPipeline<R: OcrBackend> {
    recognizer: Arc<R>,
    config: PipelineConfig,
}

impl<R: OcrBackend> ReceiptPipeline<R> {
    pub fn new(recognizer: R, config: PipelineConfig) -> Self {
        Self { recognizer: Arc::new(recognizer), config }
    }

    /// Process raw image bytes into a structured record.
    ///
    /// `receipt_id` is the caller-assigned identifier; `None` generates one.
    /// Undecodable bytes produce an empty record rather than an error; only
    /// a backend failure or timeout is surfaced as `Err` (callers typically
    /// answer those with [`ReceiptRecord::failure_fallback`]).
    pub async fn process_bytes(
        &self,
        data: &[u8],
        receipt_id: Option<&str>,
    ) -> Result<OcrOutcome, PipelineError> {
        let source_hash = hash::to_hex(&hash::sha256_bytes(data));
        let receipt_id = receipt_id
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let image = match preprocess::deskew_from_bytes(data, self.config.skew_threshold_deg) {
            Ok(img) => img,
            Err(err) => {
                warn!(%err, "undecodable image, producing empty record");
                return Ok(OcrOutcome {
                    source_hash,
                    lines: Vec::new(),
                    record: ReceiptRecord::empty(receipt_id),
                });
            }
        };

        let detections = self.detect_with_retry(image).await?;
        let detections: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.confidence >= self.config.min_confidence)
            .collect();

        let lines = merge::merge_lines(detections, None);
        let record = assemble(&lines, receipt_id);
        info!(
            lines = lines.len(),
            items = record.items.len(),
            total = record.total_price,
            "receipt assembled"
        );

        Ok(OcrOutcome { source_hash, lines, record })
    }

    /// One detection pass, retried once on the image rotated 180° when mean
    /// confidence is low. The pass with the higher mean confidence wins.
    async fn detect_with_retry(&self, image: GrayImage) -> Result<Vec<Detection>, PipelineError> {
        let first = self.detect_isolated(image.clone()).await?;
        let first_mean = mean_confidence(&first);
        if first_mean >= self.config.retry_confidence {
            return Ok(first);
        }

        debug!(mean = first_mean, "low OCR confidence, retrying rotated 180°");
        let rotated = image::imageops::rotate180(&image);
        let second = self.detect_isolated(rotated).await?;
        if mean_confidence(&second) > first_mean {
            Ok(second)
        } else {
            Ok(first)
        }
    }

    /// Run the backend on a blocking worker under the configured timeout.
    /// On timeout the worker is abandoned (its thread cannot be forced to
    /// stop) and the call fails; there is no automatic retry.
    async fn detect_isolated(&self, image: GrayImage) -> Result<Vec<Detection>, PipelineError> {
        let recognizer = Arc::clone(&self.recognizer);
        let timeout = self.config.ocr_timeout();
        let handle = task::spawn_blocking(move || recognizer.detect(&image));
        match time::timeout(timeout, handle).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(_)) => Err(PipelineError::WorkerGone),
            Err(_) => Err(PipelineError::OcrTimeout(timeout)),
        }
    }
}

/// Run every field extractor over the merged lines and build the record.
///
/// Extractors are independent, read-only passes over the same ordered line
/// list. A missing total falls back to the sum of item prices.
pub fn assemble(lines: &[TextLine], receipt_id: impl Into<String>) -> ReceiptRecord {
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();

    let store_name = store::extract_store_name(&texts).unwrap_or_default();
    let store_address = address::extract_address(&texts).unwrap_or_default();
    let date = datetime::extract_date(&texts).unwrap_or_default();
    let items = items::extract_items(&texts);
    let total_price =
        total::extract_total(&texts).unwrap_or_else(|| items.iter().map(|i| i.price).sum());

    ReceiptRecord {
        receipt_id: receipt_id.into(),
        store_name,
        store_address,
        date,
        items,
        total_price,
    }
}
