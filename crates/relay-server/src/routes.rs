//! Route table
//!
//! Every route forwards to one upstream endpoint. With a fixed upstream the
//! routes live under `/api/:id`; with a path-supplied host they live under
//! `/api/:base_url/:id`.

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use relay_core::{Endpoint, ForwardRequest, Forwarder, RelayError};

/// Path parameter naming the stored token
const ID_PARAM: &str = "id";
/// Path parameter carrying the upstream host
const BASE_URL_PARAM: &str = "base_url";

/// Shared state for HTTP handlers
#[derive(Clone)]
struct AppState {
    forwarder: Arc<Forwarder>,
}

/// Path parameters; extraction failures are reported through `ApiError`
type Params = Result<Path<HashMap<String, String>>, PathRejection>;

type QueryParams<T> = Result<Query<T>, QueryRejection>;

#[derive(Debug, Deserialize)]
struct TopicQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubjectTopicQuery {
    subject_id: Option<String>,
    topic_id: Option<String>,
}

/// Build the router for a forwarder
pub fn router(forwarder: Arc<Forwarder>, max_concurrent_requests: usize) -> Router {
    let prefix = if forwarder.target().host_from_path() {
        format!("/api/:{}/:{}", BASE_URL_PARAM, ID_PARAM)
    } else {
        format!("/api/:{}", ID_PARAM)
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
        tracing::info_span!(
            "request",
            id = %Uuid::new_v4(),
            method = %request.method(),
            path = %request.uri().path()
        )
    });

    Router::new()
        .route(&format!("{}/my-batch", prefix), get(my_batch))
        .route(
            &format!("{}/batch-subject/:batch_id", prefix),
            get(batch_subject),
        )
        .route(
            &format!("{}/batch-topic/:subject_id", prefix),
            get(batch_topic),
        )
        .route(&format!("{}/batch-notes/:batch_id", prefix), get(batch_notes))
        .route(
            &format!("{}/batch-detail/:batch_id", prefix),
            get(batch_detail),
        )
        .route(
            &format!("{}/livestreamToken/:vid_id", prefix),
            get(livestream_token),
        )
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent_requests))
        .route("/health", get(health))
        .layer(trace)
        .layer(cors)
        .with_state(AppState { forwarder })
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

async fn my_batch(
    State(state): State<AppState>,
    params: Params,
) -> Result<Response, ApiError> {
    let Path(params) = params?;
    forward(&state, &params, Endpoint::MyBatch).await
}

async fn batch_subject(
    State(state): State<AppState>,
    params: Params,
) -> Result<Response, ApiError> {
    let Path(params) = params?;
    let endpoint = Endpoint::BatchSubject {
        batch_id: param(&params, "batch_id")?,
    };
    forward(&state, &params, endpoint).await
}

async fn batch_topic(
    State(state): State<AppState>,
    params: Params,
    query: QueryParams<TopicQuery>,
) -> Result<Response, ApiError> {
    let Path(params) = params?;
    let Query(query) = query?;
    let endpoint = Endpoint::BatchTopic {
        subject_id: param(&params, "subject_id")?,
        kind: query.kind,
    };
    forward(&state, &params, endpoint).await
}

async fn batch_notes(
    State(state): State<AppState>,
    params: Params,
    query: QueryParams<SubjectTopicQuery>,
) -> Result<Response, ApiError> {
    let Path(params) = params?;
    let Query(query) = query?;
    let endpoint = Endpoint::BatchNotes {
        batch_id: param(&params, "batch_id")?,
        subject_id: query.subject_id,
        topic_id: query.topic_id,
    };
    forward(&state, &params, endpoint).await
}

async fn batch_detail(
    State(state): State<AppState>,
    params: Params,
    query: QueryParams<SubjectTopicQuery>,
) -> Result<Response, ApiError> {
    let Path(params) = params?;
    let Query(query) = query?;
    let endpoint = Endpoint::BatchDetail {
        batch_id: param(&params, "batch_id")?,
        subject_id: query.subject_id,
        topic_id: query.topic_id,
    };
    forward(&state, &params, endpoint).await
}

async fn livestream_token(
    State(state): State<AppState>,
    params: Params,
) -> Result<Response, ApiError> {
    let Path(params) = params?;
    let endpoint = Endpoint::LivestreamToken {
        vid_id: param(&params, "vid_id")?,
    };
    forward(&state, &params, endpoint).await
}

/// Get a required path parameter
fn param(params: &HashMap<String, String>, name: &str) -> Result<String, ApiError> {
    params.get(name).cloned().ok_or_else(|| {
        RelayError::InvalidUpstreamUrl(format!("missing path parameter {}", name)).into()
    })
}

/// Forward one request and write the upstream JSON back
async fn forward(
    state: &AppState,
    params: &HashMap<String, String>,
    endpoint: Endpoint,
) -> Result<Response, ApiError> {
    let request = ForwardRequest {
        identifier: param(params, ID_PARAM)?,
        endpoint,
        upstream_host: params.get(BASE_URL_PARAM).cloned(),
    };

    let body = state.forwarder.forward_request(&request).await?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
