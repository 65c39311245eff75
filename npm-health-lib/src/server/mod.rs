//! HTTP surface of the aggregation service.
//!
//! A single route, `GET /api/npm?name=<package>`, answers with the aggregated
//! result as JSON or with a plain-text error message.

use crate::Result;
use crate::service::Aggregator;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use ohno::IntoAppError;
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

const LOG_TARGET: &str = "    server";

pub const NPM_ROUTE: &str = "/api/npm";

static RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
static RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

#[derive(Debug, Clone)]
struct AppState {
    aggregator: Arc<Aggregator>,
    cache_control: HeaderValue,
}

#[derive(Debug, Deserialize)]
struct NpmQuery {
    name: Option<String>,
}

/// Build the router serving the aggregation service.
pub fn router(aggregator: Aggregator, cache_control: &str) -> Result<Router> {
    let cache_control =
        HeaderValue::from_str(cache_control).into_app_err_with(|| format!("invalid Cache-Control value '{cache_control}'"))?;

    let state = AppState {
        aggregator: Arc::new(aggregator),
        cache_control,
    };

    Ok(Router::new().route(NPM_ROUTE, get(npm_health)).with_state(state))
}

/// Serve `app` on `listener` until `shutdown` completes.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        log::info!(target: LOG_TARGET, "Listening on http://{addr}{NPM_ROUTE}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .into_app_err("serving HTTP requests")?;

    log::info!(target: LOG_TARGET, "Server stopped");
    Ok(())
}

async fn npm_health(State(state): State<AppState>, Query(query): Query<NpmQuery>, headers: HeaderMap) -> Response {
    let name = query.name.as_deref();
    let outcome = state.aggregator.handle(name, &headers).await;

    let mut response = match outcome.result {
        Ok(result) => {
            let mut response = Json(result).into_response();
            let _ = response.headers_mut().insert(CACHE_CONTROL, state.cache_control.clone());
            response
        }
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, e.client_message()).into_response()
        }
    };

    if let Some(quota) = outcome.quota {
        let headers = response.headers_mut();
        let _ = headers.insert(RATE_LIMIT_LIMIT.clone(), HeaderValue::from(quota.limit));
        let _ = headers.insert(RATE_LIMIT_REMAINING.clone(), HeaderValue::from(quota.remaining));
    }

    log::debug!(
        target: LOG_TARGET,
        "GET {NPM_ROUTE}?name={} -> {}",
        name.unwrap_or_default(),
        response.status()
    );

    response
}
