use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outreach_common::Config;
use outreach_scraper::{HttpFetcher, Scraper};

mod rest;

pub struct AppState {
    pub scraper: Scraper,
    pub news_feed_url: Option<String>,
    pub news_max_items: usize,
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // REST API
        .route("/api/scrape", post(rest::api_scrape))
        .route("/api/news", get(rest::api_news))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Scrape results are per-request; never cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path only, request bodies stay out of logs
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("outreach=info".parse()?))
        .init();

    let config = Config::from_env()?;

    let fetcher = Arc::new(HttpFetcher::new(
        &config.scraper.user_agent,
        config.scraper.allow_private_hosts,
    )?);
    let state = Arc::new(AppState {
        scraper: Scraper::new(fetcher, config.scraper.clone()),
        news_feed_url: config.news_feed_url.clone(),
        news_max_items: config.news_max_items,
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Outreach API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
