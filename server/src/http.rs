use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::get,
};
use directory::{EmployeeDirectory, ServiceError};
use entity::employees;
use platform_api::{ApiError, ApiResult};
use platform_db::DbPool;
use sea_orm::{ConnectionTrait, Statement};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub directory: Arc<dyn EmployeeDirectory>,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "staff server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/employees",
            get(list_employees_handler).post(create_employee_handler),
        )
        .route(
            "/api/employees/{id}",
            get(get_employee_handler)
                .put(update_employee_handler)
                .delete(delete_employee_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Deserialize)]
struct EmployeeRequest {
    first_name: String,
    last_name: String,
    email: String,
}

impl EmployeeRequest {
    fn into_model(self, id: i64) -> employees::Model {
        employees::Model {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

fn service_error(err: ServiceError) -> ApiError {
    match err {
        ServiceError::DuplicateEmail { .. } => ApiError::Conflict(err.to_string()),
        ServiceError::Store(db) => ApiError::internal(db.into()),
    }
}

async fn create_employee_handler(
    State(state): State<AppState>,
    Json(body): Json<EmployeeRequest>,
) -> ApiResult<(StatusCode, Json<employees::Model>)> {
    let created = state
        .directory
        .create_employee(body.into_model(0))
        .await
        .map_err(service_error)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_employees_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<employees::Model>>> {
    let employees = state
        .directory
        .list_employees()
        .await
        .map_err(service_error)?;
    Ok(Json(employees))
}

async fn get_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<employees::Model>> {
    state
        .directory
        .employee_by_id(id)
        .await
        .map_err(service_error)?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

async fn update_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<EmployeeRequest>,
) -> ApiResult<Json<employees::Model>> {
    let updated = state
        .directory
        .update_employee(body.into_model(id))
        .await
        .map_err(service_error)?;
    Ok(Json(updated))
}

async fn delete_employee_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state
        .directory
        .delete_employee(id)
        .await
        .map_err(service_error)?;
    Ok(StatusCode::OK)
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let backend = state.pool.get_database_backend();
    let db_ok = state
        .pool
        .execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}
