// RSS/Atom news feed reader for the community news page.

use chrono::{DateTime, Utc};
use outreach_common::{NewsFeed, NewsItem};
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::fetcher::PageFetcher;

/// Fetch and parse a feed, newest entries first.
pub async fn fetch_news_feed(
    fetcher: &dyn PageFetcher,
    feed_url: &str,
    timeout: std::time::Duration,
    max_items: usize,
) -> Result<NewsFeed> {
    let page = fetcher.get(feed_url, timeout).await?.into_success()?;
    let feed = parse_news_feed(page.body.as_bytes(), max_items)?;
    info!(feed_url, items = feed.items.len(), "feed: parsed successfully");
    Ok(feed)
}

pub fn parse_news_feed(bytes: &[u8], max_items: usize) -> Result<NewsFeed> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| ScrapeError::Feed(e.to_string()))?;

    let mut items: Vec<(Option<DateTime<Utc>>, NewsItem)> = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let url = entry
                .links
                .first()
                .map(|l| l.href.clone())
                .or_else(|| entry.id.starts_with("http").then(|| entry.id.clone()))?;

            let published = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Utc));

            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            Some((
                published,
                NewsItem {
                    title: entry.title.map(|t| t.content.trim().to_string()),
                    url,
                    published: published.map(|d| d.to_rfc3339()),
                    summary,
                },
            ))
        })
        .collect();

    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.truncate(max_items);

    Ok(NewsFeed {
        title: feed.title.map(|t| t.content),
        items: items.into_iter().map(|(_, item)| item).collect(),
    })
}
