// Pipeline - validation, segmentation and metrics in one call

use serde::Serialize;

use crate::capture::RawTable;
use crate::config::AppConfig;
use crate::error::{log_pipeline_error, PipelineError};
use crate::metrics::{MetricsEngine, MetricsReport};
use crate::segmentation::phases::PhaseTable;
use crate::segmentation::{Segmentation, SegmentationSummary, Segmenter};

/// Results of one capture
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub segmentation: Segmentation,
    pub metrics: MetricsReport,
}

impl PipelineOutput {
    /// Serializable report labelled with where the capture came from
    pub fn report(&self, source: &str) -> AnalysisReport {
        AnalysisReport {
            source: source.to_string(),
            summary: self.segmentation.summary(),
            phases: self.segmentation.phases.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

/// JSON view of a processed capture
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: String,
    pub summary: SegmentationSummary,
    pub phases: PhaseTable,
    pub metrics: MetricsReport,
}

/// Process a raw capture end to end
///
/// Errors abort the whole capture; no partial metrics are returned.
pub fn process(raw: &RawTable, config: &AppConfig) -> Result<PipelineOutput, PipelineError> {
    run(raw, config).map_err(|err| {
        log_pipeline_error(&err, "pipeline::process");
        err
    })
}

fn run(raw: &RawTable, config: &AppConfig) -> Result<PipelineOutput, PipelineError> {
    log::debug!(
        "[Pipeline] Processing capture with {} rows x {} columns",
        raw.row_count(),
        raw.column_count()
    );
    let segmentation = Segmenter::new(config)?.segment(raw)?;
    let metrics = MetricsEngine::new(&config.metrics).compute(&segmentation)?;
    Ok(PipelineOutput {
        segmentation,
        metrics,
    })
}
