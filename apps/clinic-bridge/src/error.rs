//! Erros da API HTTP
//!
//! Converte falhas de leitura, validação e análise em respostas JSON.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use clinic_analytics::AnalyticsError;
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use validator::ValidationErrors;

/// Erros retornados pelos handlers
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Corpo da requisição inválido: {0}")]
    BadRequest(#[from] JsonRejection),

    #[error("Requisição inválida: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    Analytics(#[from] AnalyticsError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) | ApiError::Analytics(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Validation(_) => "validation",
            ApiError::Analytics(AnalyticsError::InvalidArmData(_)) => "invalid_arm_data",
            ApiError::Analytics(AnalyticsError::InvalidConfidenceLevel(_)) => {
                "invalid_confidence_level"
            }
            ApiError::Analytics(AnalyticsError::InvalidPowerLevel(_)) => "invalid_power_level",
            ApiError::Analytics(AnalyticsError::InvalidEffectSize(_)) => "invalid_effect_size",
            ApiError::Analytics(AnalyticsError::InvalidPeriod { .. }) => "invalid_period",
            ApiError::Analytics(AnalyticsError::UnknownStatus(_)) => "unknown_status",
            ApiError::Analytics(AnalyticsError::InvalidConfiguration(_)) => "invalid_configuration",
            ApiError::Analytics(AnalyticsError::EmptyInputSet(_)) => "empty_input_set",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        warn!("Requisição recusada ({}): {}", status, self);

        let body = Json(json!({
            "error": self.kind(),
            "details": self.to_string(),
        }));
        (status, body).into_response()
    }
}
