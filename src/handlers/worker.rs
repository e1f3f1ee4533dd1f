use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{
    RawWorkPackage, Sequence, WorkPackage, WorkResult, WorkStatus, WorkerId, WorkerResources,
};
use crate::services::MasterServices;

pub async fn register_worker(
    State((services, _)): State<(MasterServices, Config)>,
    Json(resources): Json<WorkerResources>,
) -> Json<WorkerId> {
    let id = services.workers.register(resources).await;
    Json(WorkerId { id })
}

pub async fn pulse(
    State((services, _)): State<(MasterServices, Config)>,
    Json(worker): Json<WorkerId>,
) -> AppResult<StatusCode> {
    services.workers.heartbeat(worker.id).await?;
    Ok(StatusCode::OK)
}

// Asking for work counts as a sign of life
pub async fn get_work(
    State((services, _)): State<(MasterServices, Config)>,
    Json(worker): Json<WorkerId>,
) -> AppResult<Json<Option<WorkPackage>>> {
    services.workers.heartbeat(worker.id).await?;
    let package = services.work_packages.dispatch(worker.id).await?;
    Ok(Json(package))
}

pub async fn get_raw_work(
    State((services, _)): State<(MasterServices, Config)>,
    Json(worker): Json<WorkerId>,
) -> AppResult<Json<Option<RawWorkPackage>>> {
    services.workers.heartbeat(worker.id).await?;
    let package = services.work_packages.dispatch_raw(worker.id).await?;
    Ok(Json(package))
}

pub async fn get_sequence(
    Path((work_id, sequence_id, worker_id)): Path<(Uuid, String, Uuid)>,
    State((services, _)): State<(MasterServices, Config)>,
) -> AppResult<Json<Sequence>> {
    services.workers.heartbeat(worker_id).await?;
    let sequence = services
        .work_packages
        .sequence_for(work_id, &sequence_id)
        .await?;
    Ok(Json(sequence))
}

pub async fn get_work_status(
    Path(work_id): Path<Uuid>,
    State((services, _)): State<(MasterServices, Config)>,
) -> AppResult<Json<WorkStatus>> {
    Ok(Json(services.work_packages.package_status(work_id).await?))
}

pub async fn submit_result(
    Path(work_id): Path<Uuid>,
    State((services, _)): State<(MasterServices, Config)>,
    Json(result): Json<WorkResult>,
) -> AppResult<StatusCode> {
    tracing::debug!(
        work_id = %work_id,
        alignments = result.alignments.len(),
        "Result received"
    );
    services.work_packages.submit_result(work_id, result).await?;
    Ok(StatusCode::OK)
}
