//! Axum route handler for the compare API.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::client::Analysis;
use crate::analysis::extract::{extract_blocking, UploadedDocument};
use crate::analysis::feedback::{format_feedback, FeedbackReport};
use crate::errors::AppError;
use crate::state::AppState;

/// Keyword lists in the response are capped for display; totals are not.
const KEYWORD_DISPLAY_LIMIT: usize = 30;

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub score: Number,
    pub missing_keywords: Vec<String>,
    pub matched_keywords: Vec<String>,
    pub technical_skills_missing: Vec<String>,
    pub soft_skills_missing: Vec<String>,
    pub feedback: String,
    pub total_matched: usize,
    pub total_missing: usize,
    pub raw_analysis: Value,
}

impl CompareResponse {
    pub fn new(analysis: Analysis, report: &FeedbackReport) -> Self {
        let Analysis { result, raw } = analysis;
        Self {
            score: result.score(),
            total_matched: result.matched_keywords.len(),
            total_missing: result.missing_keywords.len(),
            missing_keywords: capped(result.missing_keywords),
            matched_keywords: capped(result.matched_keywords),
            technical_skills_missing: result.technical_skills_missing,
            soft_skills_missing: result.soft_skills_missing,
            feedback: report.text(),
            raw_analysis: raw,
        }
    }
}

fn capped(mut items: Vec<String>) -> Vec<String> {
    items.truncate(KEYWORD_DISPLAY_LIMIT);
    items
}

/// POST /compare
///
/// Multipart form with `resume` and `job` file parts (PDF or TXT).
/// Extract → analyze → format, all within one request; nothing is kept afterwards.
pub async fn handle_compare(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CompareResponse>, AppError> {
    let request_id = Uuid::new_v4();
    compare(state, multipart?)
        .instrument(info_span!("compare", %request_id))
        .await
        .map(Json)
}

async fn compare(state: AppState, mut multipart: Multipart) -> Result<CompareResponse, AppError> {
    let (resume, job) = match read_uploads(&mut multipart).await? {
        (Some(resume), Some(job)) => (resume, job),
        _ => return Err(AppError::MissingUpload),
    };
    info!("Resume file: {}, job file: {}", resume.filename, job.filename);

    let resume_text = extract_blocking(resume).await?;
    let job_text = extract_blocking(job).await?;
    info!(
        "Resume text length: {}, job text length: {}",
        resume_text.len(),
        job_text.len()
    );

    if resume_text.trim().is_empty() {
        return Err(AppError::EmptyInput(
            "Resume file is empty or could not be read".to_string(),
        ));
    }
    if job_text.trim().is_empty() {
        return Err(AppError::EmptyInput(
            "Job description is empty or could not be read".to_string(),
        ));
    }

    let analysis = state.analyzer.analyze(&resume_text, &job_text).await?;
    let report = format_feedback(&analysis.result);
    let response = CompareResponse::new(analysis, &report);

    info!("Returning analysis with score: {}", response.score);
    Ok(response)
}

/// Collects the `resume` and `job` parts. Other parts are skipped; for a
/// repeated name the first part wins.
async fn read_uploads(
    multipart: &mut Multipart,
) -> Result<(Option<UploadedDocument>, Option<UploadedDocument>), AppError> {
    let mut resume = None;
    let mut job = None;

    while let Some(field) = multipart.next_field().await? {
        let slot = match field.name() {
            Some("resume") => &mut resume,
            Some("job") => &mut job,
            _ => continue,
        };
        if slot.is_some() {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        *slot = Some(UploadedDocument { filename, bytes });
    }

    Ok((resume, job))
}
