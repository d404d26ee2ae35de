// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch driver — runs the document transformer once per input document.
//
// Documents run concurrently, one task each, bounded by a semaphore sized from
// `ResizeConfig::max_concurrent_documents`. Every input yields exactly one
// outcome, returned in input order. A panicking or timed-out document becomes
// an `Error` outcome for that document alone.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};

use bildwerk_core::config::ResizeConfig;
use bildwerk_core::error::{BildwerkError, Result, ValidationError};
use bildwerk_core::types::{BatchId, DocumentStatus, InputDocument, ProcessingOutcome, TargetSize};
use bildwerk_document::{DocumentTransformer, ImageCodec, RasterCodec, Transcoder};

/// Progress notifications sent while a batch runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BatchEvent {
    /// A document acquired a slot and entered `Processing`.
    Started { index: usize, file_name: String },
    /// A document reached a terminal state.
    Finished {
        index: usize,
        file_name: String,
        status: DocumentStatus,
        message: String,
    },
}

/// Everything one submission produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub id: BatchId,
    pub target: TargetSize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// One outcome per input, in input order.
    pub outcomes: Vec<ProcessingOutcome>,
}

impl BatchReport {
    pub fn completed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.len() - self.completed_count()
    }
}

/// Reject a submission before any document is touched.
pub fn validate_submission(documents: &[InputDocument], config: &ResizeConfig) -> Result<()> {
    if documents.is_empty() {
        return Err(ValidationError::NoFiles.into());
    }
    if documents.len() > config.max_batch_size {
        return Err(ValidationError::TooManyFiles {
            count: documents.len(),
            max: config.max_batch_size,
        }
        .into());
    }
    config.validate()
}

/// Drives a batch of documents through the [`DocumentTransformer`].
pub struct BatchDriver {
    config: ResizeConfig,
    codec: Arc<dyn RasterCodec>,
    events: Option<mpsc::UnboundedSender<BatchEvent>>,
    timeout: Option<Duration>,
}

impl BatchDriver {
    /// Create a driver using the `image`-backed codec. The per-document time
    /// limit starts from `config.document_timeout_secs`.
    pub fn new(config: ResizeConfig) -> Self {
        let timeout = config.document_timeout_secs.map(Duration::from_secs);
        Self {
            config,
            codec: Arc::new(ImageCodec),
            events: None,
            timeout,
        }
    }

    /// Replace the raster codec used for every document.
    pub fn with_codec(mut self, codec: Arc<dyn RasterCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Send [`BatchEvent`]s to `events` while processing.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<BatchEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Bound the time any single document may take.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Process a submission. Fails only when the submission itself is
    /// invalid; per-document failures are reported in the outcomes.
    #[instrument(skip_all, fields(documents = documents.len(), target = %target))]
    pub async fn process(&self, documents: Vec<InputDocument>, target: TargetSize) -> Result<BatchReport> {
        validate_submission(&documents, &self.config)?;

        let id = BatchId::new();
        let started_at = Utc::now();
        info!(batch = %id, "Batch started");

        let transcoder = Transcoder::new(Arc::clone(&self.codec), self.config.effective_jpeg_quality());
        let transformer = DocumentTransformer::new(target, transcoder)
            .with_image_concurrency(self.config.max_concurrent_images);
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_documents));

        let mut pending: Vec<(String, JoinHandle<ProcessingOutcome>)> = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            let file_name = document.file_name.clone();
            let span = info_span!("document", batch = %id, index, file = %file_name);
            let handle = tokio::spawn(
                run_document(
                    index,
                    document,
                    transformer.clone(),
                    Arc::clone(&semaphore),
                    self.timeout,
                    self.events.clone(),
                )
                .instrument(span),
            );
            pending.push((file_name, handle));
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for (index, (file_name, handle)) in pending.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    error!(index, file = %file_name, error = %join_err, "Document task aborted");
                    let outcome = failed_outcome(
                        &file_name,
                        &BildwerkError::Task(join_err.to_string()),
                    );
                    emit(&self.events, finished_event(index, &outcome));
                    outcome
                }
            };
            outcomes.push(outcome);
        }

        let report = BatchReport {
            id,
            target,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            batch = %id,
            completed = report.completed_count(),
            errors = report.error_count(),
            "Batch finished"
        );
        Ok(report)
    }
}

async fn run_document(
    index: usize,
    document: InputDocument,
    transformer: DocumentTransformer,
    semaphore: Arc<Semaphore>,
    timeout: Option<Duration>,
    events: Option<mpsc::UnboundedSender<BatchEvent>>,
) -> ProcessingOutcome {
    let InputDocument { file_name, bytes } = document;

    let _permit = match semaphore.acquire_owned().await {
        Ok(permit) => permit,
        Err(err) => {
            let outcome = failed_outcome(&file_name, &BildwerkError::Task(err.to_string()));
            emit(&events, finished_event(index, &outcome));
            return outcome;
        }
    };

    emit(
        &events,
        BatchEvent::Started {
            index,
            file_name: file_name.clone(),
        },
    );

    let work = transformer.transform(&file_name, bytes);
    let outcome = match timeout {
        Some(limit) => match tokio::time::timeout(limit, work).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(limit_secs = limit.as_secs_f64(), "Document timed out");
                failed_outcome(&file_name, &BildwerkError::TimedOut(limit))
            }
        },
        None => work.await,
    };

    emit(&events, finished_event(index, &outcome));
    outcome
}

/// An `Error` outcome for a document whose transform never settled.
fn failed_outcome(file_name: &str, err: &BildwerkError) -> ProcessingOutcome {
    let mut outcome = ProcessingOutcome::new(file_name);
    if let Err(transition) = outcome.fail_with(err) {
        error!(error = %transition, "Fresh outcome rejected failure");
    }
    outcome
}

fn finished_event(index: usize, outcome: &ProcessingOutcome) -> BatchEvent {
    BatchEvent::Finished {
        index,
        file_name: outcome.file_name.clone(),
        status: outcome.status,
        message: outcome.message.clone(),
    }
}

fn emit(events: &Option<mpsc::UnboundedSender<BatchEvent>>, event: BatchEvent) {
    if let Some(tx) = events {
        if tx.send(event).is_err() {
            debug!("Event receiver dropped");
        }
    }
}
