// Name → website resolution via a search engine's HTML results page.

use std::sync::LazyLock;

use outreach_common::ScraperConfig;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::fetcher::PageFetcher;
use crate::links::is_absolute_http;

static RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.result__a[href]").expect("valid selector"));
static ANY_RESULT_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".result a[href]").expect("valid selector"));

/// Resolve a free-text organization name to its most likely homepage.
/// Returns `None` when the search fails or yields nothing usable.
pub async fn resolve_url(
    fetcher: &dyn PageFetcher,
    config: &ScraperConfig,
    name: &str,
) -> Option<String> {
    let query = format!("{name} official website");
    let search_url = match Url::parse_with_params(&config.search_url, &[("q", query.as_str())]) {
        Ok(u) => u,
        Err(e) => {
            warn!(search_url = %config.search_url, error = %e, "resolve: bad search URL");
            return None;
        }
    };

    let page = match fetcher.get(search_url.as_str(), config.search_timeout).await {
        Ok(p) if p.is_success() => p,
        Ok(p) => {
            warn!(name, status = p.status, "resolve: search returned non-success");
            return None;
        }
        Err(e) => {
            warn!(name, error = %e, "resolve: search request failed");
            return None;
        }
    };

    let resolved = first_result_url(&page.body);
    match &resolved {
        Some(url) => info!(name, url = %url, "resolve: found website"),
        None => debug!(name, "resolve: no parseable result"),
    }
    resolved
}

/// Pull the first organic result out of a search results page.
pub fn first_result_url(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let href = document
        .select(&RESULT_LINK)
        .next()
        .or_else(|| document.select(&ANY_RESULT_LINK).next())?
        .value()
        .attr("href")?
        .trim()
        .to_string();

    if href.contains("uddg=") {
        return redirect_target(&href);
    }
    is_absolute_http(&href).then_some(href)
}

/// Decode the `uddg` parameter of a search engine redirect link.
fn redirect_target(href: &str) -> Option<String> {
    // Redirect hrefs are usually protocol-relative (`//duckduckgo.com/l/?uddg=...`).
    let base = Url::parse("https://duckduckgo.com/").ok()?;
    let url = base.join(href).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == "uddg")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::fetcher::MockFetcher;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <div class="result results_links">
            <h2 class="result__title">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.lincolnhigh.org%2F&amp;rut=abc">Lincoln High School</a>
            </h2>
          </div>
          <div class="result">
            <a class="result__a" href="https://second.example.com/">Second</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn decodes_redirect_parameter() {
        assert_eq!(
            first_result_url(SEARCH_PAGE).as_deref(),
            Some("https://www.lincolnhigh.org/")
        );
    }

    #[test]
    fn accepts_direct_absolute_href() {
        let html = r#"<div class="result"><a class="result__a" href="https://club.example.org/">Club</a></div>"#;
        assert_eq!(first_result_url(html).as_deref(), Some("https://club.example.org/"));
    }

    #[test]
    fn rejects_relative_href_without_redirect() {
        let html = r#"<div class="result"><a class="result__a" href="/y.js?ad=1">Ad</a></div>"#;
        assert_eq!(first_result_url(html), None);
    }

    #[test]
    fn no_results_yields_none() {
        assert_eq!(first_result_url("<html><body>No results.</body></html>"), None);
    }

    fn config() -> ScraperConfig {
        ScraperConfig {
            search_url: "https://search.test/html/".to_string(),
            search_timeout: Duration::from_secs(5),
            ..ScraperConfig::default()
        }
    }

    #[tokio::test]
    async fn resolve_queries_official_website() {
        let mock = MockFetcher::new().prefix("https://search.test/html/", SEARCH_PAGE);
        let url = resolve_url(&mock, &config(), "Lincoln High School").await;
        assert_eq!(url.as_deref(), Some("https://www.lincolnhigh.org/"));

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains("official+website"));
        assert!(calls[0].contains("Lincoln+High+School"));
    }

    #[tokio::test]
    async fn unreachable_search_returns_none() {
        let mock = MockFetcher::new();
        assert_eq!(resolve_url(&mock, &config(), "Nowhere Academy").await, None);
    }

    #[tokio::test]
    async fn search_error_status_returns_none() {
        let mock = MockFetcher::new();
        let mock = mock.status(
            "https://search.test/html/?q=Nowhere+Academy+official+website",
            503,
            SEARCH_PAGE,
        );
        assert_eq!(resolve_url(&mock, &config(), "Nowhere Academy").await, None);
    }
}
