use axum::{
    extract::{Query, State},
    Extension, Json,
};
use munch_feeds::{FeedError, ParsedFeed};
use serde::Deserialize;

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct FeedQuery {
    url: Option<String>,
}

/// `GET /api/v1/feed?url=`: the normalized feed, unwrapped.
pub(super) async fn get_feed(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<ParsedFeed>, ApiError> {
    let Some(url) = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
    else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "You must specify a feed url",
        ));
    };

    state
        .feeds
        .fetch(url)
        .await
        .map(Json)
        .map_err(|e| map_feed_error(&req_id.0, url, &e))
}

fn map_feed_error(request_id: &str, url: &str, error: &FeedError) -> ApiError {
    tracing::warn!(url, error = %error, "feed request failed");
    match error {
        FeedError::InvalidUrl { .. } | FeedError::InvalidFeed { .. } => {
            ApiError::new(request_id, "invalid_feed", "invalid url")
        }
        FeedError::Http(_)
        | FeedError::RateLimited { .. }
        | FeedError::UnexpectedStatus { .. }
        | FeedError::BodyTooLarge { .. } => {
            ApiError::new(request_id, "upstream_error", "failed to fetch feed")
        }
    }
}
