/// HTTP server setup and routing
use crate::{
    context::AppContext,
    error::{ErrorResponse, ProfileError, ProfileResult},
};
use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    let uploads = ServeDir::new(&ctx.config.storage.upload_directory);
    let body_limit = ctx.config.service.upload_limit;

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        // Stored profile images
        .nest_service("/uploads", uploads)
        // Provide state - converts Router<AppContext> to Router<()>
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Page not found".to_string(),
            kind: "danger".to_string(),
        }),
    )
}

/// Resolves on Ctrl-C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> ProfileResult<()> {
    let addr = ctx.config.bind_address();

    info!("Profile System listening on http://{}", addr);
    info!("   Uploads: {:?}", ctx.config.storage.upload_directory);

    let app = build_router(ctx.clone());

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ProfileError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ProfileError::Internal(format!("Server error: {}", e)));

    ctx.close().await;
    served
}
