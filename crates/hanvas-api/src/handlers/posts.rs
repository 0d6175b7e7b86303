//! Community feed handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use hanvas_models::{CreatePostResponse, PostsResponse};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Error returned when the body carries no usable image.
pub const MISSING_IMAGE_MESSAGE: &str = "imageDataUrl is required";

/// List the feed, newest first.
pub async fn list_posts(State(state): State<AppState>) -> Json<PostsResponse> {
    Json(PostsResponse {
        posts: state.posts.read_posts().await,
    })
}

/// Share a drawing.
///
/// The body is inspected loosely: anything that is not a JSON object with a
/// non-empty string `imageDataUrl` is rejected with the same message.
pub async fn create_post(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatePostResponse>)> {
    let image_data_url = extract_image(&body).ok_or_else(|| ApiError::bad_request(MISSING_IMAGE_MESSAGE))?;

    let (post, posts) = state.posts.create(&image_data_url).await?;

    metrics::record_post_created(image_data_url.len());
    info!(
        shared_at = %post.shared_at,
        feed_size = posts.len(),
        "Community post created"
    );

    Ok((StatusCode::CREATED, Json(CreatePostResponse { post, posts })))
}

fn extract_image(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("imageDataUrl")? {
        Value::String(url) if !url.is_empty() => Some(url.clone()),
        _ => None,
    }
}
