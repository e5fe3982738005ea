//! Service catalog handlers

use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use launchpad_types::{NewService, ObjectId, Page, PageQuery, PageRequest, ServiceRecord};
use serde::Deserialize;

/// Create service request
#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Register a service under a project
pub async fn create_service(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    payload: Result<Json<CreateServiceRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ServiceRecord>)> {
    let project_id = ObjectId::parse(&project_id).map_err(ApiError::invalid_id("project"))?;
    let Json(request) = payload.map_err(|e| ApiError::InvalidPayload(e.body_text()))?;

    let name = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidPayload("name is required".to_string()));
    }

    let record = state
        .storage
        .insert_service(NewService {
            project_id,
            name: name.to_string(),
            description: request.description,
        })
        .await
        .map_err(ApiError::storage("failed to create service"))?;

    tracing::info!(service_id = %record.id, project_id = %project_id, "Created service");

    Ok((StatusCode::CREATED, Json(record)))
}

/// List a project's services, newest first
pub async fn list_services(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<ServiceRecord>>> {
    let project_id = ObjectId::parse(&project_id).map_err(ApiError::invalid_id("project"))?;
    let request = PageRequest::from(query);

    let (data, total) = state
        .storage
        .list_services_for_project(&project_id, request)
        .await
        .map_err(ApiError::storage("failed to fetch services"))?;

    Ok(Json(Page::new(data, request, total)))
}

/// Look up one service. Mounted behind the service-token middleware.
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ServiceRecord>> {
    let id = ObjectId::parse(&id).map_err(ApiError::invalid_id("service"))?;

    let service = state
        .storage
        .get_service(&id)
        .await
        .map_err(ApiError::storage("failed to fetch service"))?
        .ok_or(ApiError::NotFound("service"))?;

    Ok(Json(service))
}
