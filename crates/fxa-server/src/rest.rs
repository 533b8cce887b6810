use crate::error::AppError;
use crate::types::*;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use fxa_agent::{AgentRuntime, Invocation};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Response header carrying the invocation id
pub const INVOCATION_ID_HEADER: &str = "x-invocation-id";

/// Longest accepted prompt, in characters
pub const MAX_PROMPT_CHARS: usize = 2048;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
}

pub fn create_router(runtime: Arc<AgentRuntime>) -> Router {
    let state = AppState { runtime };

    Router::new()
        .route("/", get(landing))
        .route("/healthz", get(health_check))
        .route("/invoke", post(invoke))
        // Middleware layers (applied in reverse order)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests
pub async fn serve(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

async fn landing() -> Json<LandingResponse> {
    Json(LandingResponse {
        message: "Post a prompt to /invoke as {\"prompt\": \"...\"} to ask about exchange rates."
            .to_string(),
    })
}

/// Liveness only; says nothing about model credentials
async fn health_check() -> Json<HealthResponse> {
    tracing::debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn invoke(
    State(state): State<AppState>,
    payload: Result<Json<PromptRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload?;
    let prompt = validate_prompt(&request.prompt)?;

    let invocation = Invocation::new(prompt);
    tracing::info!(
        invocation_id = %invocation.id,
        prompt_chars = invocation.prompt.chars().count(),
        degraded = state.runtime.is_degraded(),
        "Invocation received"
    );

    match state.runtime.invoke(&invocation).await {
        Ok(result) => Ok((
            StatusCode::OK,
            [(INVOCATION_ID_HEADER, invocation.id)],
            Json(InvokeResponse { result }),
        )),
        Err(error) => Err(AppError::Invocation {
            invocation_id: invocation.id,
            error,
        }),
    }
}

fn validate_prompt(prompt: &str) -> Result<&str, AppError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }
    if prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(AppError::BadRequest(format!(
            "prompt must be at most {} characters",
            MAX_PROMPT_CHARS
        )));
    }
    Ok(prompt)
}
