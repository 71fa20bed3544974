use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use broker_api::KeywordFrom;
use replay_engine::{partition_or_zero, GatewayError};

use super::AppState;

/// Parameter errors are the client's fault; everything else reached
/// the broker and failed there.
fn error_response(err: &GatewayError) -> Response {
    let status = if err.is_parameter() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };
    (status, format!("error: {err}")).into_response()
}

fn missing(what: &str) -> Response {
    (StatusCode::BAD_REQUEST, format!("{what} must not be empty")).into_response()
}

/// Opaque JSON payload passed through untouched.
fn json_payload(payload: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /msg — query by keyword
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct QueryMsgBody {
    #[serde(rename = "kafkaTopic")]
    topic: String,
    #[serde(default)]
    partition: String,
    keyword: String,
    #[serde(rename = "keywordFrom")]
    keyword_from: String,
}

pub(crate) async fn handle_query_msg(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<QueryMsgBody>,
) -> impl IntoResponse {
    if body.topic.is_empty() || body.keyword.is_empty() || body.keyword_from.is_empty() {
        return missing("topic, keyword or keywordFrom");
    }

    let result = state
        .coordinator
        .broker()
        .query_by_keyword(
            &body.topic,
            partition_or_zero(&body.partition),
            &body.keyword,
            KeywordFrom::from_wire(&body.keyword_from),
        )
        .await;

    match result {
        Ok(payload) => json_payload(payload),
        Err(e) => {
            tracing::warn!(topic = %body.topic, error = %e, "keyword query failed");
            (StatusCode::BAD_GATEWAY, format!("error: {e}")).into_response()
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /produce_msg — produce an explicit payload
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct ProduceMsgBody {
    #[serde(rename = "kafkaTopic")]
    topic: String,
    #[serde(default)]
    partition: String,
    #[serde(default)]
    key: String,
    #[serde(rename = "msgJson")]
    payload: String,
}

pub(crate) async fn handle_produce_msg(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<ProduceMsgBody>,
) -> impl IntoResponse {
    match state
        .coordinator
        .produce(&body.topic, &body.partition, &body.payload, &body.key)
        .await
    {
        Ok(ok) => axum::Json(ok).into_response(),
        Err(e) => error_response(&e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /produce_query_msg — query by keyword, republish
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct ProduceQueryBody {
    #[serde(rename = "kafkaTopic")]
    topic: String,
    #[serde(default)]
    partition: String,
    #[serde(default)]
    key: String,
    keyword: String,
    #[serde(rename = "keywordFrom")]
    keyword_from: String,
}

pub(crate) async fn handle_produce_query_msg(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<ProduceQueryBody>,
) -> impl IntoResponse {
    let payload = match state
        .coordinator
        .broker()
        .query_by_keyword(
            &body.topic,
            partition_or_zero(&body.partition),
            &body.keyword,
            KeywordFrom::from_wire(&body.keyword_from),
        )
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            return (StatusCode::BAD_GATEWAY, format!("error: query: {e}")).into_response();
        }
    };

    match state
        .coordinator
        .produce(&body.topic, &body.partition, &payload, &body.key)
        .await
    {
        Ok(ok) => axum::Json(ok).into_response(),
        Err(e) => error_response(&e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET|POST /msg/replay
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct ReplayParams {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    partition: String,
    #[serde(default)]
    offset: String,
    #[serde(default)]
    key: String,
}

async fn replay(state: &AppState, params: &ReplayParams) -> Response {
    if params.topic.is_empty()
        || params.partition.is_empty()
        || params.offset.is_empty()
        || params.key.is_empty()
    {
        return missing("topic, partition, offset or key");
    }

    match state
        .coordinator
        .replay(&params.topic, &params.partition, &params.offset, &params.key)
        .await
    {
        Ok(ok) => axum::Json(ok).into_response(),
        Err(e) => {
            tracing::warn!(topic = %params.topic, error = %e, "replay failed");
            error_response(&e)
        }
    }
}

pub(crate) async fn handle_replay_get(
    State(state): State<AppState>,
    Query(params): Query<ReplayParams>,
) -> impl IntoResponse {
    replay(&state, &params).await
}

pub(crate) async fn handle_replay_post(
    State(state): State<AppState>,
    axum::Json(params): axum::Json<ReplayParams>,
) -> impl IntoResponse {
    replay(&state, &params).await
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /msg/offset?topic=&partition=&offset=
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct OffsetParams {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    partition: String,
    #[serde(default)]
    offset: String,
}

pub(crate) async fn handle_query_by_offset(
    State(state): State<AppState>,
    Query(params): Query<OffsetParams>,
) -> impl IntoResponse {
    if params.topic.is_empty() || params.partition.is_empty() || params.offset.is_empty() {
        return missing("topic, partition or offset");
    }

    match state
        .coordinator
        .query_by_offset(&params.topic, &params.partition, &params.offset)
        .await
    {
        Ok(payload) => json_payload(payload),
        Err(e) => error_response(&e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  REST: POST /msg/produce?topic=&key= with raw JSON body
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct ProduceFromJsonParams {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    key: String,
}

pub(crate) async fn handle_produce_from_json(
    State(state): State<AppState>,
    Query(params): Query<ProduceFromJsonParams>,
    body: String,
) -> impl IntoResponse {
    if params.topic.is_empty() || params.key.is_empty() {
        return missing("topic or key");
    }

    // No partition hint on this route: broker-chosen routing (0).
    match state
        .coordinator
        .produce(&params.topic, "", &body, &params.key)
        .await
    {
        Ok(ok) => axum::Json(ok).into_response(),
        Err(e) => error_response(&e),
    }
}

// ═══════════════════════════════════════════════════════════════
//  REST: GET /msg/partition?key=&partition=
// ═══════════════════════════════════════════════════════════════

#[derive(Deserialize)]
pub(crate) struct PartitionParams {
    #[serde(default)]
    key: String,
    /// Partition count of the topic, not an index.
    partition: Option<String>,
}

pub(crate) async fn handle_partition_for_key(
    State(_state): State<AppState>,
    Query(params): Query<PartitionParams>,
) -> impl IntoResponse {
    if params.key.is_empty() {
        return missing("key");
    }

    let count = match params.partition.as_deref() {
        None | Some("") => partitioner::DEFAULT_PARTITION_COUNT,
        Some(s) => match s.parse::<i32>() {
            Ok(n) => n,
            Err(_) => {
                return (StatusCode::BAD_REQUEST, "partition parse error".to_string())
                    .into_response();
            }
        },
    };

    match partitioner::partition_for(params.key.as_bytes(), count) {
        Ok(idx) => (
            StatusCode::OK,
            format!("key '{}' maps to partition {idx} of {count}", params.key),
        )
            .into_response(),
        Err(e) => (StatusCode::BAD_REQUEST, format!("error: {e}")).into_response(),
    }
}
