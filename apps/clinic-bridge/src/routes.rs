//! Rotas HTTP do clinic-bridge
//!
//! Cada rota recebe os registros já buscados pela camada de dados, valida a
//! requisição, chama o analisador correspondente e devolve o relatório em JSON.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use clinic_analytics::{
    analyze_ab_test, analyze_day, analyze_load_balancing, analyze_month, conversion_funnel,
    optimize_chair_allocation, sample_size_needed, suggest_optimal_times, ABTestResult,
    AppointmentRecord, ChairAllocationOptimization, DayLoadAnalysis, ExperimentArm,
    FunnelAnalysis, LoadBalancingResult, MonthAnalysis, SchedulingSuggestion,
};
use serde::{Deserialize, Serialize};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use validator::Validate;

use crate::built_info;
use crate::config::BridgeConfig;
use crate::error::ApiError;

type SharedConfig = Arc<BridgeConfig>;

/// Monta o roteador com todas as rotas e camadas
pub fn router(config: SharedConfig) -> Router {
    let limit = GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests);
    routes(config, limit)
}

/// O limite de concorrência é um único semáforo para todas as rotas
fn routes(config: SharedConfig, limit: GlobalConcurrencyLimitLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/analyze/ab-test", post(ab_test))
        .route("/analyze/sample-size", post(sample_size))
        .route("/analyze/funnel", post(funnel))
        .route("/analyze/day", post(day))
        .route("/analyze/month", post(month))
        .route("/optimize/suggestions", post(suggestions))
        .route("/optimize/load-balancing", post(load_balancing))
        .route("/optimize/chair-allocation", post(chair_allocation))
        .with_state(config)
        .layer(limit)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Lê o corpo JSON e aplica as regras de validação da requisição
fn validated<T: Validate>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(body) = payload?;
    body.validate()?;
    Ok(body)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    version: &'static str,
    status: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: built_info::PKG_NAME,
        version: built_info::PKG_VERSION,
        status: "ok",
    })
}

#[derive(Debug, Deserialize, Validate)]
pub struct AbTestRequest {
    pub template_a: ExperimentArm,
    pub template_b: ExperimentArm,
    pub confidence_level: Option<f64>,
}

async fn ab_test(
    State(config): State<SharedConfig>,
    payload: Result<Json<AbTestRequest>, JsonRejection>,
) -> Result<Json<ABTestResult>, ApiError> {
    let request = validated(payload)?;
    let confidence_level = request
        .confidence_level
        .unwrap_or(config.analytics.confidence_level);

    let result = analyze_ab_test(&request.template_a, &request.template_b, confidence_level)?;
    info!(
        "Teste A/B analisado: vencedor {}, p = {:.4}",
        result.winner, result.p_value
    );
    Ok(Json(result))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SampleSizeRequest {
    #[validate(range(min = 0.0, max = 100.0))]
    pub baseline_rate: f64,
    #[validate(range(min = 0.0))]
    pub minimum_detectable_effect: f64,
    pub confidence_level: Option<f64>,
    pub power: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SampleSizeResponse {
    pub sample_size_per_template: u64,
    pub total_sample_size: u64,
}

async fn sample_size(
    State(config): State<SharedConfig>,
    payload: Result<Json<SampleSizeRequest>, JsonRejection>,
) -> Result<Json<SampleSizeResponse>, ApiError> {
    let request = validated(payload)?;
    let per_template = sample_size_needed(
        request.baseline_rate,
        request.minimum_detectable_effect,
        request
            .confidence_level
            .unwrap_or(config.analytics.confidence_level),
        request.power.unwrap_or(config.analytics.statistical_power),
    )?;

    Ok(Json(SampleSizeResponse {
        sample_size_per_template: per_template,
        total_sample_size: per_template.saturating_mul(2),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct FunnelRequest {
    pub template: ExperimentArm,
}

async fn funnel(
    payload: Result<Json<FunnelRequest>, JsonRejection>,
) -> Result<Json<FunnelAnalysis>, ApiError> {
    let request = validated(payload)?;
    Ok(Json(conversion_funnel(&request.template)?))
}

#[derive(Debug, Deserialize, Validate)]
pub struct DayRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[validate(range(min = 1))]
    pub capacity: Option<u32>,
}

async fn day(
    State(config): State<SharedConfig>,
    payload: Result<Json<DayRequest>, JsonRejection>,
) -> Result<Json<DayLoadAnalysis>, ApiError> {
    let request = validated(payload)?;
    let capacity = request.capacity.unwrap_or(config.analytics.day_capacity);
    Ok(Json(analyze_day(request.date, &request.appointments, capacity)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct MonthRequest {
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    #[validate(range(min = 1900, max = 2200))]
    pub year: i32,
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[validate(range(min = 1))]
    pub capacity: Option<u32>,
}

async fn month(
    State(config): State<SharedConfig>,
    payload: Result<Json<MonthRequest>, JsonRejection>,
) -> Result<Json<MonthAnalysis>, ApiError> {
    let request = validated(payload)?;
    let capacity = request.capacity.unwrap_or(config.analytics.day_capacity);
    let analysis = analyze_month(request.month, request.year, &request.appointments, capacity)?;
    Ok(Json(analysis))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[validate(length(min = 1))]
    pub specialty: String,
    #[validate(length(min = 1))]
    pub chair: String,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

async fn suggestions(
    State(config): State<SharedConfig>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<Vec<SchedulingSuggestion>>, ApiError> {
    let request = validated(payload)?;
    let limit = request.limit.unwrap_or(config.analytics.suggestion_limit);
    Ok(Json(suggest_optimal_times(
        &request.appointments,
        &request.specialty,
        &request.chair,
        limit,
    )))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoadBalancingRequest {
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
}

async fn load_balancing(
    payload: Result<Json<LoadBalancingRequest>, JsonRejection>,
) -> Result<Json<LoadBalancingResult>, ApiError> {
    let request = validated(payload)?;
    Ok(Json(analyze_load_balancing(&request.appointments)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChairAllocationRequest {
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    /// Cadeiras reservadas por especialidade
    #[serde(default)]
    pub chairs_per_specialty: BTreeMap<String, usize>,
}

async fn chair_allocation(
    payload: Result<Json<ChairAllocationRequest>, JsonRejection>,
) -> Result<Json<Vec<ChairAllocationOptimization>>, ApiError> {
    let request = validated(payload)?;
    Ok(Json(optimize_chair_allocation(
        &request.appointments,
        &request.chairs_per_specialty,
    )))
}
