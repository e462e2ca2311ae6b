use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::{error, info, warn};

use outreach_common::{ScrapeRequest, ScrapeResponse};
use outreach_scraper::fetch_news_feed;

use crate::AppState;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

pub async fn api_scrape(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "scrape: rejected request body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let max = state.scraper.config().max_batch_size;
    if request.urls.len() > max {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Too many inputs: {} (max {max})", request.urls.len()),
        );
    }

    info!(
        inputs = request.urls.len(),
        search_mode = request.is_search_mode,
        "scrape: batch received"
    );

    // Run the batch on its own task so a panic in one input's parsing
    // turns into a 500 rather than a dropped connection.
    let task_state = state.clone();
    let batch = tokio::spawn(async move {
        task_state
            .scraper
            .scrape_batch(&request.urls, request.is_search_mode)
            .await
    });

    match batch.await {
        Ok(results) => Json(ScrapeResponse { results }).into_response(),
        Err(e) => {
            error!(error = %e, "scrape: batch task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

pub async fn api_news(State(state): State<Arc<AppState>>) -> Response {
    let Some(feed_url) = state.news_feed_url.as_deref() else {
        return error_response(StatusCode::NOT_FOUND, "No news feed configured");
    };

    match fetch_news_feed(
        state.scraper.fetcher(),
        feed_url,
        state.scraper.config().page_timeout,
        state.news_max_items,
    )
    .await
    {
        Ok(feed) => Json(feed).into_response(),
        Err(e) => {
            warn!(feed_url, error = %e, "news: feed unavailable");
            error_response(StatusCode::BAD_GATEWAY, e.public_message())
        }
    }
}
