use url::Url;

/// Resolve `href` against the origin of `page` (not its path).
/// Relative hrefs like `staff.html` become `https://host/staff.html`.
pub fn resolve_against_origin(page: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return Url::parse(href).ok();
    }
    let origin = page.origin();
    if !origin.is_tuple() {
        return None;
    }
    let base = Url::parse(&origin.ascii_serialization()).ok()?;
    base.join(href).ok()
}

/// True for hrefs that are already absolute http(s) URLs.
pub fn is_absolute_http(href: &str) -> bool {
    let lower = href.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Wikipedia and its sister hosts, which never count as an organization's website.
pub fn is_wiki_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    ["wikipedia.org", "wikimedia.org", "wikidata.org", "mediawiki.org"]
        .iter()
        .any(|d| host == *d || host.ends_with(&format!(".{d}")))
}

pub fn is_wikipedia_url(url: &Url) -> bool {
    url.host_str()
        .map(|h| {
            let h = h.to_ascii_lowercase();
            h == "wikipedia.org" || h.ends_with(".wikipedia.org")
        })
        .unwrap_or(false)
}

/// External (non-wiki) absolute link, as used for an entity's declared website.
pub fn is_external_link(href: &str) -> bool {
    if !is_absolute_http(href) {
        return false;
    }
    match Url::parse(href.trim()) {
        Ok(u) => u.host_str().map(|h| !is_wiki_host(h)).unwrap_or(false),
        Err(_) => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocialPlatform {
    Twitter,
    Facebook,
    Instagram,
    LinkedIn,
}

impl SocialPlatform {
    /// Classify an absolute href by host. `x.com` counts as Twitter.
    pub fn from_href(href: &str) -> Option<Self> {
        let url = Url::parse(href.trim()).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();
        let on = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));
        if on("twitter.com") || on("x.com") {
            Some(SocialPlatform::Twitter)
        } else if on("facebook.com") {
            Some(SocialPlatform::Facebook)
        } else if on("instagram.com") {
            Some(SocialPlatform::Instagram)
        } else if on("linkedin.com") {
            Some(SocialPlatform::LinkedIn)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn relative_href_resolves_against_origin() {
        let p = page("https://lincolnhigh.org/about/us/");
        assert_eq!(
            resolve_against_origin(&p, "staff-directory").unwrap().as_str(),
            "https://lincolnhigh.org/staff-directory"
        );
        assert_eq!(
            resolve_against_origin(&p, "/athletics/contact").unwrap().as_str(),
            "https://lincolnhigh.org/athletics/contact"
        );
    }

    #[test]
    fn absolute_href_is_kept() {
        let p = page("https://lincolnhigh.org/");
        assert_eq!(
            resolve_against_origin(&p, "https://district.k12.us/staff").unwrap().as_str(),
            "https://district.k12.us/staff"
        );
    }

    #[test]
    fn wiki_hosts() {
        assert!(is_wiki_host("en.wikipedia.org"));
        assert!(is_wiki_host("upload.wikimedia.org"));
        assert!(!is_wiki_host("notwikipedia.org"));
        assert!(is_wikipedia_url(&page("https://en.wikipedia.org/wiki/Foo")));
        assert!(!is_wikipedia_url(&page("https://example.com/wiki/Foo")));
    }

    #[test]
    fn external_link_excludes_wiki_and_relative() {
        assert!(is_external_link("https://lincolnhigh.org/"));
        assert!(!is_external_link("/wiki/Foo"));
        assert!(!is_external_link("https://en.wikipedia.org/wiki/Foo"));
        assert!(!is_external_link("//example.com"));
    }

    #[test]
    fn social_platforms_match_by_host() {
        assert_eq!(SocialPlatform::from_href("https://x.com/team"), Some(SocialPlatform::Twitter));
        assert_eq!(
            SocialPlatform::from_href("https://www.twitter.com/team"),
            Some(SocialPlatform::Twitter)
        );
        assert_eq!(
            SocialPlatform::from_href("https://m.facebook.com/team"),
            Some(SocialPlatform::Facebook)
        );
        assert_eq!(
            SocialPlatform::from_href("https://www.linkedin.com/company/team"),
            Some(SocialPlatform::LinkedIn)
        );
        assert_eq!(SocialPlatform::from_href("https://www.fedex.com/"), None);
        assert_eq!(SocialPlatform::from_href("/relative"), None);
    }
}
