use std::sync::LazyLock;

use outreach_common::{check_scrape_target, ScrapeResult, ScraperConfig};
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::contacts::extract_site_contacts;
use crate::fetcher::PageFetcher;
use crate::links::resolve_against_origin;

/// Href fragments that suggest a page listing staff contacts.
pub const DIRECTORY_KEYWORDS: &[&str] = &["staff", "directory", "athletics", "contact"];

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Extract contacts from a site's page, enriched with its staff directory when linked.
/// Never fails; a missing or broken directory page just means less to extract from.
pub async fn scrape_standard_site(
    fetcher: &dyn PageFetcher,
    config: &ScraperConfig,
    url: &Url,
    html: &str,
) -> ScrapeResult {
    let mut combined = html.to_string();

    let directory = find_directory_link(html, url).filter(|directory_url| {
        match check_scrape_target(directory_url, config.allow_private_hosts) {
            Ok(()) => true,
            Err(reason) => {
                debug!(directory = %directory_url, reason = %reason, "site: directory link not allowed");
                false
            }
        }
    });

    if let Some(directory_url) = directory {
        match fetcher.get(directory_url.as_str(), config.search_timeout).await {
            Ok(page) if page.is_success() => {
                debug!(url = %url, directory = %directory_url, "site: merged staff directory");
                combined.push('\n');
                combined.push_str(&page.body);
            }
            Ok(page) => {
                debug!(directory = %directory_url, status = page.status, "site: directory fetch non-success");
            }
            Err(e) => {
                debug!(directory = %directory_url, error = %e, "site: directory fetch failed");
            }
        }
    }

    let contacts = extract_site_contacts(url.as_str(), html, &combined);
    info!(
        url = %url,
        emails = contacts.emails.len(),
        phones = contacts.phones.len(),
        best = contacts.best_contact.is_some(),
        "site: extracted contacts"
    );
    ScrapeResult::Contacts(contacts)
}

/// First link whose href mentions a staff/contact page, resolved against the page origin.
pub fn find_directory_link(html: &str, page_url: &Url) -> Option<Url> {
    let document = Html::parse_document(html);
    document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| {
            let lower = href.to_lowercase();
            !lower.starts_with("mailto:") && DIRECTORY_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .find_map(|href| resolve_against_origin(page_url, href))
}
