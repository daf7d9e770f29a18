//! Stand-in for the remote `/posts` collection the client synchronizes with.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use shared::{
    error::{ApiError, ApiException, ErrorCode},
    protocol::{PostPayload, RemotePost},
};
use tokio::net::TcpListener;
use tracing::{debug, info};

pub mod api;
pub mod app_state;
pub mod config;

pub use api::PostsCatalog;
pub use app_state::AppState;
pub use config::{load_settings, Settings};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", put(update_post).delete(delete_post))
        .with_state(state)
}

pub fn state_from_settings(settings: &Settings) -> AppState {
    AppState {
        catalog: PostsCatalog::seeded(settings.seed_count),
        fail_reads: settings.fail_reads,
        fail_writes: settings.fail_writes,
    }
}

/// Serves `state` on an OS-assigned local port and returns the base url.
pub async fn spawn_ephemeral(state: AppState) -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let app = build_router(Arc::new(state));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    debug!(%addr, "mock server spawned");
    Ok(format!("http://{addr}"))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_posts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<RemotePost>>> {
    if state.fail_reads {
        return Err(unavailable());
    }
    Ok(Json(state.catalog.list().to_vec()))
}

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PostPayload>,
) -> ApiResult<(StatusCode, Json<RemotePost>)> {
    if state.fail_writes {
        return Err(unavailable());
    }
    let post = state.catalog.create(payload).map_err(api_error)?;
    info!(post_id = ?post.id, "acknowledged create");
    Ok((StatusCode::CREATED, Json(post)))
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<PostPayload>,
) -> ApiResult<Json<RemotePost>> {
    if state.fail_writes {
        return Err(unavailable());
    }
    let post = state.catalog.update(id, payload).map_err(api_error)?;
    info!(post_id = id, "acknowledged update");
    Ok(Json(post))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.fail_writes {
        return Err(unavailable());
    }
    info!(post_id = id, "acknowledged delete");
    Ok(Json(serde_json::json!({})))
}

fn unavailable() -> (StatusCode, Json<ApiError>) {
    api_error(ApiException::new(
        ErrorCode::Unavailable,
        "mock backend is configured to fail",
    ))
}

fn api_error(e: ApiException) -> (StatusCode, Json<ApiError>) {
    let status = match e.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiError::from(e)))
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
