// Contact extraction from organization pages.
//
// Emails are scored by the staff role mentioned in the block that contains
// them; phones and social links are collected in document order.

use std::collections::HashMap;
use std::sync::LazyLock;

use outreach_common::{BestContact, ScoredContact, SiteContacts, Socials};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::links::SocialPlatform;

/// Role keywords and their scores, highest priority first.
pub const ROLE_PATTERNS: &[(&str, u32)] = &[
    ("athletic director", 100),
    ("esports", 90),
    ("head coach", 80),
    ("coach", 60),
    ("principal", 50),
    ("assistant", 30),
];

/// Score for an email found in a block that names no role.
pub const UNLABELLED_SCORE: u32 = 10;
/// Minimum score for an email to be reported as the best contact.
pub const BEST_CONTACT_MIN_SCORE: u32 = 30;

const MAX_EMAILS: usize = 5;
const MAX_PHONES: usize = 3;

/// Elements that bound the text searched for role keywords.
const CONTAINERS: &[&str] = &[
    "tr", "li", "div", "section", "article", "address", "dl", "aside", "header", "footer",
    "body",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").expect("valid regex")
});
static GENERIC_MAILBOX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)webmaster|support|info|privacy|noreply|admin|office").expect("valid regex")
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?1[-.\s]?)?\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b").expect("valid regex")
});

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));
static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Build the contact summary for a site.
///
/// `page_html` is the fetched page; `combined_html` is that page plus any
/// staff directory appended to it. Emails, phones and socials come from the
/// combined HTML, the title from the page alone.
pub fn extract_site_contacts(url: &str, page_html: &str, combined_html: &str) -> SiteContacts {
    let title = page_title(page_html).unwrap_or_else(|| url.to_string());

    let document = Html::parse_document(combined_html);
    let contacts = extract_emails(&document);
    let socials = extract_socials(&document);
    let phones = extract_phones(combined_html);

    let best_contact = best_contact(&contacts);
    let emails = contacts
        .into_iter()
        .take(MAX_EMAILS)
        .map(|c| c.email)
        .collect();

    SiteContacts {
        url: url.to_string(),
        title,
        emails,
        phones,
        socials,
        best_contact,
        success: true,
    }
}

pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Score a block of text by the highest-priority role keyword it mentions.
pub fn role_score(block_text: &str) -> (u32, Option<&'static str>) {
    let lower = block_text.to_lowercase();
    let mut best = (UNLABELLED_SCORE, None);
    for &(pattern, score) in ROLE_PATTERNS {
        if score > best.0 && lower.contains(pattern) {
            best = (score, Some(pattern));
        }
    }
    best
}

/// Shared inboxes (info@, webmaster@, ...) that never reach a person.
pub fn is_generic_mailbox(email: &str) -> bool {
    GENERIC_MAILBOX_RE.is_match(email)
}

/// All non-generic emails in the document, lowercased and deduplicated
/// (keeping each address's best score), sorted by score descending.
pub fn extract_emails(document: &Html) -> Vec<ScoredContact> {
    let mut contacts: Vec<ScoredContact> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut record = |raw: &str, holder: ElementRef| {
        let email = raw.to_lowercase();
        if is_generic_mailbox(&email) {
            return;
        }
        let (score, role) = role_score(&block_text(holder));
        match index.get(&email).copied() {
            Some(i) if contacts[i].score >= score => {}
            Some(i) => {
                contacts[i].score = score;
                contacts[i].role = role;
            }
            None => {
                index.insert(email.clone(), contacts.len());
                contacts.push(ScoredContact { email, score, role });
            }
        }
    };

    for node in document.tree.nodes() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let Some(parent) = node.parent().and_then(ElementRef::wrap) else {
            continue;
        };
        if matches!(parent.value().name(), "script" | "style" | "noscript") {
            continue;
        }
        for m in EMAIL_RE.find_iter(text) {
            record(m.as_str(), parent);
        }
    }

    for anchor in document.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();
        let address = match href.get(..7) {
            Some(scheme) if scheme.eq_ignore_ascii_case("mailto:") => &href[7..],
            _ => continue,
        };
        let address = address.split('?').next().unwrap_or_default();
        if let Some(m) = EMAIL_RE.find(address) {
            record(m.as_str(), anchor);
        }
    }

    contacts.sort_by(|a, b| b.score.cmp(&a.score));
    contacts
}

/// Text of the nearest container enclosing `element`, used for role matching.
fn block_text(element: ElementRef) -> String {
    let container = std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .find(|el| CONTAINERS.contains(&el.value().name()))
        .unwrap_or(element);
    container.text().collect::<Vec<_>>().join(" ")
}

/// Top contact, only if it carries a role label.
pub fn best_contact(contacts: &[ScoredContact]) -> Option<BestContact> {
    let top = contacts.first()?;
    if top.score < BEST_CONTACT_MIN_SCORE {
        return None;
    }
    Some(BestContact {
        email: top.email.clone(),
        role: top.role?.to_string(),
    })
}

/// North-American phone numbers anywhere in the raw HTML, first three distinct.
pub fn extract_phones(html: &str) -> Vec<String> {
    let mut phones: Vec<String> = Vec::new();
    for m in PHONE_RE.find_iter(html) {
        let phone = m.as_str().trim().to_string();
        if !phones.contains(&phone) {
            phones.push(phone);
            if phones.len() >= MAX_PHONES {
                break;
            }
        }
    }
    phones
}

/// First profile link per platform, in document order.
pub fn extract_socials(document: &Html) -> Socials {
    let mut socials = Socials::default();
    for href in document
        .select(&ANCHORS)
        .filter_map(|a| a.value().attr("href"))
    {
        let slot = match SocialPlatform::from_href(href) {
            Some(SocialPlatform::Twitter) => &mut socials.twitter,
            Some(SocialPlatform::Facebook) => &mut socials.facebook,
            Some(SocialPlatform::Instagram) => &mut socials.instagram,
            Some(SocialPlatform::LinkedIn) => &mut socials.linkedin,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(href.trim().to_string());
        }
    }
    socials
}
