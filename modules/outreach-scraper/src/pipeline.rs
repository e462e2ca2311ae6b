// Per-input scrape pipeline: classify → resolve → validate → dispatch.
//
// Every failure is downgraded to a `ScrapeResult::Failed` for that input;
// nothing here aborts a batch.

use std::sync::Arc;
use std::time::Instant;

use outreach_common::{check_scrape_target, ScrapeResult, ScraperConfig};
use tracing::{info, warn};
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::fetcher::{FetchedPage, PageFetcher};
use crate::resolver::resolve_url;
use crate::site::scrape_standard_site;
use crate::wikipedia::{
    article_url, find_official_website, is_wikipedia_article, is_wikipedia_list,
    scrape_wikipedia_list,
};

/// How a raw input will be turned into a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Free-text name to look up via search.
    Search(String),
    /// Something URL-shaped, with a scheme added if it was missing.
    Url(String),
}

/// Classify a raw input. Blank inputs produce no target.
pub fn classify_input(raw: &str, search_mode: bool) -> Option<Target> {
    let input = raw.trim();
    if input.is_empty() {
        return None;
    }
    let has_scheme = input.starts_with("http");
    if search_mode || (!has_scheme && input.contains(' ')) {
        Some(Target::Search(input.to_string()))
    } else if has_scheme {
        Some(Target::Url(input.to_string()))
    } else {
        Some(Target::Url(format!("https://{input}")))
    }
}

pub struct Scraper {
    fetcher: Arc<dyn PageFetcher>,
    config: ScraperConfig,
}

impl Scraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ScraperConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &dyn PageFetcher {
        self.fetcher.as_ref()
    }

    /// Scrape each input in order, one at a time.
    pub async fn scrape_batch(&self, inputs: &[String], search_mode: bool) -> Vec<ScrapeResult> {
        let started = Instant::now();
        let mut results = Vec::with_capacity(inputs.len());

        for raw in inputs {
            let input = raw.trim();
            if input.is_empty() {
                continue;
            }

            if let Some(deadline) = self.config.batch_deadline {
                if started.elapsed() >= deadline {
                    warn!(input, "scrape: batch deadline exceeded, skipping");
                    results.push(ScrapeResult::failed(
                        input,
                        ScrapeError::DeadlineExceeded.to_string(),
                    ));
                    continue;
                }
            }

            results.extend(self.scrape_input(input, search_mode).await);
        }

        info!(
            inputs = inputs.len(),
            results = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scrape: batch complete"
        );
        results
    }

    /// Run the pipeline for one input. Returns nothing for blank input,
    /// several results for an expanded Wikipedia list, otherwise exactly one.
    pub async fn scrape_input(&self, raw: &str, search_mode: bool) -> Vec<ScrapeResult> {
        let Some(target) = classify_input(raw, search_mode) else {
            return Vec::new();
        };
        let input = raw.trim();

        match self.run(target).await {
            Ok(results) => results,
            Err(e) => {
                if e.is_transport() {
                    warn!(input, error = %e, "scrape: execution failed");
                } else {
                    info!(input, error = %e, "scrape: input failed");
                }
                vec![ScrapeResult::failed(input, e.public_message())]
            }
        }
    }

    async fn run(&self, target: Target) -> Result<Vec<ScrapeResult>> {
        let resolved = match target {
            Target::Url(url) => url,
            Target::Search(name) => {
                resolve_url(self.fetcher(), &self.config, &name)
                    .await
                    .ok_or(ScrapeError::Unresolved(name))?
            }
        };

        let url = self.validate(&resolved)?;

        if is_wikipedia_list(&url) {
            let entities = scrape_wikipedia_list(self.fetcher(), &self.config, &url).await;
            if !entities.is_empty() {
                return Ok(entities
                    .into_iter()
                    .map(|entity| {
                        let wiki_url = article_url(&url, &entity.wiki_path);
                        ScrapeResult::discovered(entity, wiki_url)
                    })
                    .collect());
            }
        }

        let mut article: Option<FetchedPage> = None;
        if is_wikipedia_article(&url) {
            match self.scrape_official_website(&url).await {
                Ok(result) => return Ok(vec![result]),
                Err(page) => article = page,
            }
        }

        let page = match article {
            Some(page) => page,
            None => {
                self.fetcher
                    .get(url.as_str(), self.config.page_timeout)
                    .await?
            }
        }
        .into_success()?;

        let result = scrape_standard_site(self.fetcher(), &self.config, &url, &page.body).await;
        Ok(vec![result])
    }

    fn validate(&self, resolved: &str) -> Result<Url> {
        let url = Url::parse(resolved).map_err(|_| ScrapeError::InvalidUrl {
            url: resolved.to_string(),
        })?;
        check_scrape_target(&url, self.config.allow_private_hosts)
            .map_err(|reason| ScrapeError::BlockedUrl { reason })?;
        Ok(url)
    }

    /// Follow a Wikipedia article's infobox website and scrape that instead.
    /// On any miss, hands back the article page (if it was fetched) so the
    /// caller can fall back to scraping the article itself.
    async fn scrape_official_website(
        &self,
        article_url: &Url,
    ) -> std::result::Result<ScrapeResult, Option<FetchedPage>> {
        let article = match self.fetcher.get(article_url.as_str(), self.config.page_timeout).await {
            Ok(page) if page.is_success() => page,
            Ok(_) | Err(_) => return Err(None),
        };

        let Some(website) = find_official_website(&article.body) else {
            return Err(Some(article));
        };
        let Ok(website_url) = self.validate(&website) else {
            return Err(Some(article));
        };

        match self.fetcher.get(website_url.as_str(), self.config.page_timeout).await {
            Ok(page) if page.is_success() => {
                info!(article = %article_url, website = %website_url, "scrape: following infobox website");
                Ok(scrape_standard_site(self.fetcher(), &self.config, &website_url, &page.body).await)
            }
            Ok(page) => {
                info!(website = %website_url, status = page.status, "scrape: infobox website unavailable");
                Err(Some(article))
            }
            Err(e) => {
                info!(website = %website_url, error = %e, "scrape: infobox website unavailable");
                Err(Some(article))
            }
        }
    }
}
