use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::domain::{DomainError, Source};

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub sources: Vec<Source>,
}

pub async fn ask_handler(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AnswerResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| DomainError::validation(e.body_text()))?;
    let answer = state.rag_service.answer(&request.question).await?;

    Ok(Json(AnswerResponse {
        answer: answer.answer,
        sources: answer.sources,
    }))
}
