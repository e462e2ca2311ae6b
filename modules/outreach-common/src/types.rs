use serde::{Deserialize, Serialize};

// --- Wikipedia Types ---

/// An organization listed on a Wikipedia "List of ..." page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedEntity {
    pub title: String,
    pub website: Option<String>,
    /// Path of the entity's own article, e.g. `/wiki/Lincoln_High_School`.
    pub wiki_path: String,
}

// --- Contact Types ---

/// Social profile links found on a site. First match per platform wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
}

/// The single highest-ranked, role-labelled email on a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestContact {
    pub email: String,
    /// The role keyword that matched, as written in the role table (e.g. "head coach").
    pub role: String,
}

/// An email candidate with the role score of the block it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredContact {
    pub email: String,
    pub score: u32,
    pub role: Option<&'static str>,
}

// --- Scrape Results ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContacts {
    pub url: String,
    pub title: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub socials: Socials,
    pub best_contact: Option<BestContact>,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredEntity {
    pub url: String,
    pub title: String,
    pub wiki_path: String,
    pub is_discovery: bool,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeFailure {
    pub url: String,
    pub error: String,
    pub success: bool,
}

/// One entry of a scrape batch response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeResult {
    Contacts(SiteContacts),
    Discovery(DiscoveredEntity),
    Failed(ScrapeFailure),
}

impl ScrapeResult {
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        ScrapeResult::Failed(ScrapeFailure {
            url: url.into(),
            error: error.into(),
            success: false,
        })
    }

    /// Wraps a Wikipedia list entity. `wiki_url` is used when the entity has no website.
    pub fn discovered(entity: ResolvedEntity, wiki_url: String) -> Self {
        ScrapeResult::Discovery(DiscoveredEntity {
            url: entity.website.unwrap_or(wiki_url),
            title: entity.title,
            wiki_path: entity.wiki_path,
            is_discovery: true,
            success: true,
        })
    }

    pub fn url(&self) -> &str {
        match self {
            ScrapeResult::Contacts(c) => &c.url,
            ScrapeResult::Discovery(d) => &d.url,
            ScrapeResult::Failed(f) => &f.url,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ScrapeResult::Failed(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ScrapeResult::Failed(f) => Some(&f.error),
            _ => None,
        }
    }

    pub fn as_contacts(&self) -> Option<&SiteContacts> {
        match self {
            ScrapeResult::Contacts(c) => Some(c),
            _ => None,
        }
    }
}

// --- API Types ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub urls: Vec<String>,
    #[serde(default)]
    pub is_search_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResponse {
    pub results: Vec<ScrapeResult>,
}

// --- News Types ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub url: String,
    /// RFC 3339 timestamp.
    pub published: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsFeed {
    pub title: Option<String>,
    pub items: Vec<NewsItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_serializes_with_success_false() {
        let r = ScrapeResult::failed("https://example.com/", "Failed to fetch: HTTP 404");
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "url": "https://example.com/",
                "error": "Failed to fetch: HTTP 404",
                "success": false,
            })
        );
    }

    #[test]
    fn contacts_use_camel_case_and_null_best_contact() {
        let r = ScrapeResult::Contacts(SiteContacts {
            url: "https://example.com/".into(),
            title: "Example".into(),
            emails: vec!["a@example.com".into()],
            phones: vec![],
            socials: Socials::default(),
            best_contact: None,
            success: true,
        });
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["bestContact"], serde_json::Value::Null);
        assert_eq!(json["socials"], serde_json::json!({}));
        assert_eq!(json["success"], true);
    }

    #[test]
    fn discovery_falls_back_to_wiki_url() {
        let entity = ResolvedEntity {
            title: "Lincoln High School".into(),
            website: None,
            wiki_path: "/wiki/Lincoln_High_School".into(),
        };
        let r = ScrapeResult::discovered(
            entity,
            "https://en.wikipedia.org/wiki/Lincoln_High_School".into(),
        );
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["url"], "https://en.wikipedia.org/wiki/Lincoln_High_School");
        assert_eq!(json["isDiscovery"], true);
        assert_eq!(json["wikiPath"], "/wiki/Lincoln_High_School");
        assert!(r.is_success());
    }

    #[test]
    fn request_defaults_search_mode_off() {
        let req: ScrapeRequest = serde_json::from_str(r#"{"urls":["example.com"]}"#).unwrap();
        assert!(!req.is_search_mode);
        let req: ScrapeRequest =
            serde_json::from_str(r#"{"urls":[],"isSearchMode":true}"#).unwrap();
        assert!(req.is_search_mode);
    }
}
