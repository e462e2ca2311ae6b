// Wikipedia list expansion and infobox website lookup.

use std::collections::HashMap;
use std::sync::LazyLock;

use outreach_common::{ResolvedEntity, ScraperConfig};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::fetcher::PageFetcher;
use crate::links::{is_external_link, is_wikipedia_url};

static ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid selector"));
static TABLES: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.wikitable").expect("valid selector"));
static LIST_ITEMS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(
        ".mw-parser-output > ul > li, .mw-parser-output > div.div-col > ul > li",
    )
    .expect("valid selector")
});
static LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));
static INFOBOX_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.infobox tr").expect("valid selector"));
static ROW_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("valid selector"));
static OFFICIAL_WEBSITE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".official-website a[href], .url a.external[href]").expect("valid selector")
});

/// A "List of ..." page on Wikipedia.
pub fn is_wikipedia_list(url: &Url) -> bool {
    is_wikipedia_url(url) && (url.path().contains("List_of_") || url.path().contains("Lists_of_"))
}

/// A single Wikipedia article (not a list page).
pub fn is_wikipedia_article(url: &Url) -> bool {
    is_wikipedia_url(url) && url.path().starts_with("/wiki/") && !is_wikipedia_list(url)
}

/// Fetch a list page and enumerate its member entities.
/// Any fetch failure yields an empty list.
pub async fn scrape_wikipedia_list(
    fetcher: &dyn PageFetcher,
    config: &ScraperConfig,
    url: &Url,
) -> Vec<ResolvedEntity> {
    let page = match fetcher.get(url.as_str(), config.page_timeout).await {
        Ok(p) if p.is_success() => p,
        Ok(p) => {
            warn!(url = %url, status = p.status, "wikipedia: list fetch returned non-success");
            return Vec::new();
        }
        Err(e) => {
            warn!(url = %url, error = %e, "wikipedia: list fetch failed");
            return Vec::new();
        }
    };

    let entities = parse_wikipedia_list(&page.body);
    info!(url = %url, count = entities.len(), "wikipedia: expanded list");
    entities
}

/// Extract entities from wikitables first, then top-level bullets.
/// Duplicate `wiki_path`s keep their first position but take the last value seen.
pub fn parse_wikipedia_list(html: &str) -> Vec<ResolvedEntity> {
    let document = Html::parse_document(html);
    let mut order: Vec<ResolvedEntity> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut upsert = |entity: ResolvedEntity| match index.get(&entity.wiki_path).copied() {
        Some(i) => order[i] = entity,
        None => {
            index.insert(entity.wiki_path.clone(), order.len());
            order.push(entity);
        }
    };

    for table in document.select(&TABLES) {
        // First row of each table is the header.
        for row in table.select(&ROWS).skip(1) {
            if let Some(entity) = entity_from_block(row) {
                upsert(entity);
            }
        }
    }

    for item in document.select(&LIST_ITEMS) {
        if let Some(entity) = entity_from_block(item) {
            upsert(entity);
        }
    }

    order
}

fn entity_from_block(block: ElementRef) -> Option<ResolvedEntity> {
    let mut wiki: Option<(String, String)> = None;
    let mut website: Option<String> = None;

    for link in block.select(&LINKS) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if wiki.is_none() {
            if let Some(path) = wiki_path(href) {
                let text = link.text().collect::<String>().trim().to_string();
                let title = if text.is_empty() {
                    link.value().attr("title").unwrap_or_default().trim().to_string()
                } else {
                    text
                };
                if !title.is_empty() {
                    wiki = Some((title, path));
                }
                continue;
            }
        }
        if website.is_none() && is_external_link(href) {
            website = Some(href.trim().to_string());
        }
        if wiki.is_some() && website.is_some() {
            break;
        }
    }

    let (title, wiki_path) = wiki?;
    Some(ResolvedEntity {
        title,
        website,
        wiki_path,
    })
}

/// `/wiki/Some_Page` for article links; `None` for namespace pages, the main page,
/// red links and anything off-wiki.
fn wiki_path(href: &str) -> Option<String> {
    let path = href.trim().split('#').next()?;
    let page = path.strip_prefix("/wiki/")?;
    if page.is_empty() || page.contains(':') || page == "Main_Page" {
        return None;
    }
    Some(path.to_string())
}

/// Absolute article URL for a `wiki_path`, on the same host as the list page.
pub fn article_url(list_url: &Url, wiki_path: &str) -> String {
    list_url
        .join(wiki_path)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| format!("https://en.wikipedia.org{wiki_path}"))
}

/// The "Website" link from an article's infobox, if any.
pub fn find_official_website(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for row in document.select(&INFOBOX_ROWS) {
        let is_website_row = row
            .select(&ROW_HEADER)
            .next()
            .map(|th| th.text().collect::<String>().to_lowercase().contains("website"))
            .unwrap_or(false);
        if !is_website_row {
            continue;
        }
        if let Some(href) = row
            .select(&LINKS)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| is_external_link(href))
        {
            return Some(href.trim().to_string());
        }
    }

    let fallback = document
        .select(&OFFICIAL_WEBSITE)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| is_external_link(href))
        .map(|href| href.trim().to_string());
    if fallback.is_none() {
        debug!("wikipedia: no official website in infobox");
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MockFetcher;

    const LIST_PAGE: &str = r#"
        <html><body>
        <div id="mw-content-text"><div class="mw-parser-output">
          <table class="wikitable">
            <tr><th>School</th><th>City</th><th>Website</th></tr>
            <tr>
              <td><a href="/wiki/Lincoln_High_School_(Portland)" title="Lincoln High School (Portland)">Lincoln High School</a></td>
              <td><a href="/wiki/Portland,_Oregon">Portland</a></td>
              <td><a class="external" href="https://www.pps.net/lincoln">pps.net</a></td>
            </tr>
            <tr>
              <td><a href="/wiki/File:Crest.png"><img src="crest.png"></a> No article</td>
            </tr>
            <tr>
              <td><a href="/wiki/Grant_High_School">Grant High School</a></td>
            </tr>
          </table>
          <ul>
            <li><a href="/wiki/Grant_High_School">Grant HS</a> &ndash; <a class="external" href="https://grant.pps.net/">site</a>
              <ul><li><a href="/wiki/Nested_Entry">Nested</a></li></ul>
            </li>
            <li><a href="/wiki/Main_Page">Main page</a></li>
            <li><a href="/wiki/Category:Schools">Schools</a></li>
            <li>Plain text, no link</li>
          </ul>
          <div class="div-col"><ul>
            <li><a href="/wiki/Roosevelt_High_School#History">Roosevelt High School</a></li>
          </ul></div>
        </div></div>
        </body></html>
    "#;

    #[test]
    fn parses_tables_and_bullets() {
        let entities = parse_wikipedia_list(LIST_PAGE);
        let paths: Vec<&str> = entities.iter().map(|e| e.wiki_path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "/wiki/Lincoln_High_School_(Portland)",
                "/wiki/Grant_High_School",
                "/wiki/Roosevelt_High_School",
            ]
        );
        assert_eq!(entities[0].title, "Lincoln High School");
        assert_eq!(entities[0].website.as_deref(), Some("https://www.pps.net/lincoln"));
    }

    #[test]
    fn bulleted_entry_wins_on_collision() {
        let entities = parse_wikipedia_list(LIST_PAGE);
        let grant: Vec<_> = entities
            .iter()
            .filter(|e| e.wiki_path == "/wiki/Grant_High_School")
            .collect();
        assert_eq!(grant.len(), 1);
        assert_eq!(grant[0].title, "Grant HS");
        assert_eq!(grant[0].website.as_deref(), Some("https://grant.pps.net/"));
    }

    #[test]
    fn nested_bullets_and_namespace_links_skipped() {
        let entities = parse_wikipedia_list(LIST_PAGE);
        assert!(entities.iter().all(|e| e.wiki_path != "/wiki/Nested_Entry"));
        assert!(entities.iter().all(|e| !e.wiki_path.contains(':')));
        assert!(entities.iter().all(|e| e.wiki_path != "/wiki/Main_Page"));
    }

    #[test]
    fn list_detection() {
        let list = Url::parse("https://en.wikipedia.org/wiki/List_of_high_schools_in_Oregon").unwrap();
        let lists = Url::parse("https://en.wikipedia.org/wiki/Lists_of_schools").unwrap();
        let article = Url::parse("https://en.wikipedia.org/wiki/Lincoln_High_School").unwrap();
        let other = Url::parse("https://example.com/List_of_things").unwrap();
        assert!(is_wikipedia_list(&list));
        assert!(is_wikipedia_list(&lists));
        assert!(!is_wikipedia_list(&article));
        assert!(!is_wikipedia_list(&other));
        assert!(is_wikipedia_article(&article));
        assert!(!is_wikipedia_article(&list));
    }

    #[test]
    fn article_url_joins_list_host() {
        let list = Url::parse("https://de.wikipedia.org/wiki/Liste_der_Schulen").unwrap();
        assert_eq!(
            article_url(&list, "/wiki/Gymnasium_Nord"),
            "https://de.wikipedia.org/wiki/Gymnasium_Nord"
        );
    }

    #[test]
    fn infobox_website_row() {
        let html = r#"
            <table class="infobox vcard">
              <tr><th>Type</th><td>Public</td></tr>
              <tr><th scope="row">Website</th>
                  <td><span class="url"><a class="external text" href="https://www.lincolnhigh.org/">lincolnhigh.org</a></span></td></tr>
            </table>
        "#;
        assert_eq!(
            find_official_website(html).as_deref(),
            Some("https://www.lincolnhigh.org/")
        );
    }

    #[test]
    fn infobox_without_website() {
        let html = r#"<table class="infobox"><tr><th>Type</th><td>Public</td></tr></table>"#;
        assert_eq!(find_official_website(html), None);
    }

    #[tokio::test]
    async fn failed_list_fetch_is_empty() {
        let mock = MockFetcher::new();
        let url = Url::parse("https://en.wikipedia.org/wiki/List_of_esports_teams").unwrap();
        let entities = scrape_wikipedia_list(&mock, &ScraperConfig::default(), &url).await;
        assert!(entities.is_empty());
    }
}
