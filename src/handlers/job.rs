use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use bio::io::fasta;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{
    JobId, JobRequest, JobResult, JobStatus, MultipartJobRequest, Sequence, SequenceId,
};
use crate::services::MasterServices;

pub async fn submit_json_job(
    State((services, _)): State<(MasterServices, Config)>,
    Json(request): Json<JobRequest>,
) -> AppResult<Json<JobId>> {
    let mut jobs = services.jobs.write().await;
    let job = jobs.add(request)?;
    Ok(Json(JobId { id: job.id }))
}

/// Accepts a FASTA file in the `sequences` part and the remaining job
/// request as JSON in the `request` part.
pub async fn submit_multipart_job(
    State((services, _)): State<(MasterServices, Config)>,
    mut multipart: Multipart,
) -> AppResult<Json<JobId>> {
    let mut sequences = None;
    let mut request = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!("Failed to get next field from multipart form: {}", e);
        AppError::Upload(format!("Failed to process form field: {}", e))
    })? {
        match field.name().unwrap_or("") {
            "sequences" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(format!("Failed to read FASTA file: {}", e)))?;
                let parsed = parse_fasta(&bytes)?;
                tracing::debug!("Parsed {} sequences from upload", parsed.len());
                sequences = Some(parsed);
            }
            "request" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Upload(format!("Failed to read request: {}", e)))?;
                let parsed: MultipartJobRequest = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::InvalidRequest(format!("Malformed job request: {}", e)))?;
                request = Some(parsed);
            }
            field_name => {
                tracing::warn!("Unexpected form field: {}", field_name);
            }
        }
    }

    let sequences = sequences.ok_or_else(|| AppError::Upload("No FASTA file uploaded".into()))?;
    let request = request.ok_or_else(|| AppError::Upload("No job request in upload".into()))?;

    let mut jobs = services.jobs.write().await;
    let job = jobs.add(JobRequest::from_multipart(request, sequences))?;
    Ok(Json(JobId { id: job.id }))
}

/// Record ids become sequence ids. Ids must be unique within one file.
fn parse_fasta(bytes: &[u8]) -> AppResult<HashMap<SequenceId, Sequence>> {
    let mut sequences = HashMap::new();
    for record in fasta::Reader::new(bytes).records() {
        let record = record.map_err(|e| AppError::Upload(format!("Invalid FASTA: {}", e)))?;
        record
            .check()
            .map_err(|e| AppError::Upload(format!("Invalid FASTA record {}: {}", record.id(), e)))?;

        let sequence = String::from_utf8(record.seq().to_vec())
            .map_err(|e| AppError::Upload(format!("Invalid FASTA record {}: {}", record.id(), e)))?;
        if sequences.insert(record.id().to_string(), sequence).is_some() {
            return Err(AppError::InvalidRequest(format!(
                "Duplicate sequence id {}",
                record.id()
            )));
        }
    }
    Ok(sequences)
}

pub async fn get_job_status(
    Path(job_id): Path<Uuid>,
    State((services, _)): State<(MasterServices, Config)>,
) -> AppResult<Json<JobStatus>> {
    let jobs = services.jobs.read().await;
    Ok(Json(jobs.get(&job_id)?.status()))
}

pub async fn get_job_result(
    Path(job_id): Path<Uuid>,
    State((services, _)): State<(MasterServices, Config)>,
) -> AppResult<Json<JobResult>> {
    let jobs = services.jobs.read().await;
    Ok(Json(jobs.get(&job_id)?.result()?))
}

pub async fn delete_job(
    Path(job_id): Path<Uuid>,
    State((services, config)): State<(MasterServices, Config)>,
) -> AppResult<StatusCode> {
    if !config.job.enable_deletion {
        tracing::warn!(job_id = %job_id, "Rejected job deletion, deletion is disabled");
        return Err(AppError::Forbidden("Job deletion is disabled".into()));
    }
    services.work_packages.delete_job(job_id).await?;
    Ok(StatusCode::OK)
}
