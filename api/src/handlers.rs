use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Redirect,
    Json,
};
use common::services::activities::ActivityCatalogView;
use serde::Deserialize;
use std::sync::Arc;

use crate::models::{ApiError, MessageResponse};
use crate::AppState;

pub const LANDING_PAGE: &str = "/static/index.html";

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    email: Option<String>,
}

impl EmailParams {
    fn require(self) -> Result<String, ApiError> {
        self.email.ok_or_else(|| {
            ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "email query parameter is required",
            )
        })
    }
}

pub async fn root() -> Redirect {
    Redirect::temporary(LANDING_PAGE)
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_activities(State(state): State<Arc<AppState>>) -> Json<ActivityCatalogView> {
    Json(state.services.activity_service.list_activities().await)
}

pub async fn signup(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(activity_name) = path?;
    let email = query?.0.require()?;
    let receipt = state
        .services
        .activity_service
        .signup(&activity_name, &email)
        .await?;
    Ok(Json(MessageResponse::new(receipt.message())))
}

pub async fn unregister(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<EmailParams>, QueryRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(activity_name) = path?;
    let email = query?.0.require()?;
    let receipt = state
        .services
        .activity_service
        .unregister(&activity_name, &email)
        .await?;
    Ok(Json(MessageResponse::new(receipt.message())))
}
