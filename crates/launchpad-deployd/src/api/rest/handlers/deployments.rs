//! Deployment handlers

use crate::api::rest::state::AppState;
use crate::error::ApiResult;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use launchpad_types::{Deployment, DeploymentStatus, ObjectId, Page, PageQuery, PageRequest};
use serde::Serialize;

/// Create deployment response
#[derive(Debug, Serialize)]
pub struct CreateDeploymentResponse {
    pub id: ObjectId,
    pub service_id: ObjectId,
    pub status: DeploymentStatus,
}

/// Start a deployment. Answers once the `Pending` record is stored.
pub async fn create_deployment(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
) -> ApiResult<(StatusCode, Json<CreateDeploymentResponse>)> {
    let deployment = state.orchestrator.create(&service_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateDeploymentResponse {
            id: deployment.id,
            service_id: deployment.service_id,
            status: deployment.status,
        }),
    ))
}

/// List a service's deployments
pub async fn list_deployments(
    State(state): State<AppState>,
    Path(service_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<Deployment>>> {
    let page = state
        .orchestrator
        .list(&service_id, PageRequest::from(query))
        .await?;
    Ok(Json(page))
}
