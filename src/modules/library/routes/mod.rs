use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use quill_http::error::AppError;
use serde_json::json;

use super::dto::{CreateEbookRequest, EbookResponse};
use super::models::NewEbook;
use super::service::{CreateEbookError, EbookService};
use super::validation::{FieldValidator, ValidationErrors};

/// Shared handler state for the library routes.
#[derive(Clone)]
pub struct LibraryState {
    pub service: Arc<EbookService>,
    /// Payload constraints, checked before the service is invoked
    pub validator: Arc<FieldValidator>,
}

pub fn router(state: LibraryState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ebooks", post(create_ebook))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "library module is healthy"
}

/// `POST /ebooks`
async fn create_ebook(
    State(state): State<LibraryState>,
    payload: Result<Json<CreateEbookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<EbookResponse>), AppError> {
    let Json(request) = payload?;
    let input = NewEbook::from(request);

    state
        .validator
        .validate(&input)
        .map_err(validation_error)?;

    let ebook = state.service.create_ebook(input).await?;
    Ok((StatusCode::CREATED, Json(ebook.into())))
}

fn validation_error(errors: ValidationErrors) -> AppError {
    let details = errors
        .iter()
        .map(|(field, message)| json!({ "field": field, "message": message }))
        .collect();
    AppError::validation(details, "one or more fields are invalid")
}

impl From<CreateEbookError> for AppError {
    fn from(error: CreateEbookError) -> Self {
        match error {
            CreateEbookError::Validation(errors) => validation_error(errors),
            CreateEbookError::Duplicate { title, producer_id } => {
                let message = format!(
                    "an ebook titled '{title}' already exists for producer '{producer_id}'"
                );
                AppError::conflict(
                    vec![json!({ "title": title, "producerId": producer_id })],
                    message,
                )
                .with_code("duplicate_entity")
            }
            error @ (CreateEbookError::Persistence(_) | CreateEbookError::Generation(_)) => {
                AppError::Internal(anyhow::Error::new(error))
            }
        }
    }
}
