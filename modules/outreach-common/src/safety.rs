use std::net::IpAddr;

use url::{Host, Url};

/// Max URL length accepted for scraping.
pub const MAX_URL_LEN: usize = 2048;

/// Check that a scrape target is a public http(s) URL.
/// Returns a human-readable reason on rejection.
pub fn check_scrape_target(url: &Url, allow_private_hosts: bool) -> Result<(), String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(format!("URL must use http or https scheme, got {}", url.scheme()));
    }
    if url.as_str().len() > MAX_URL_LEN {
        return Err(format!("URL too long (max {MAX_URL_LEN} characters)"));
    }
    if allow_private_hosts {
        return Ok(());
    }

    match url.host() {
        None => Err("URL has no host".to_string()),
        Some(Host::Ipv4(v4)) if is_private_ip(IpAddr::V4(v4)) => {
            Err("URLs pointing to private/loopback addresses are not allowed".to_string())
        }
        Some(Host::Ipv6(v6)) if is_private_ip(IpAddr::V6(v6)) => {
            Err("URLs pointing to private/loopback addresses are not allowed".to_string())
        }
        Some(Host::Domain(domain)) => {
            let lower = domain.to_lowercase();
            if lower == "localhost" || lower.ends_with(".local") || lower.ends_with(".internal") {
                Err("URLs pointing to internal hosts are not allowed".to_string())
            } else {
                Ok(())
            }
        }
        Some(_) => Ok(()),
    }
}

pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.octets()[0] == 10
                || (v4.octets()[0] == 172 && (16..=31).contains(&v4.octets()[1]))
                || (v4.octets()[0] == 192 && v4.octets()[1] == 168)
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_ip(IpAddr::V4(v4)),
            None => {
                v6.is_loopback()
                    || v6.is_unspecified()
                    || (v6.segments()[0] & 0xfe00) == 0xfc00
                    || (v6.segments()[0] & 0xffc0) == 0xfe80
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(raw: &str) -> Result<(), String> {
        check_scrape_target(&Url::parse(raw).unwrap(), false)
    }

    #[test]
    fn public_https_is_allowed() {
        assert!(check("https://lincolnhigh.org/athletics").is_ok());
    }

    #[test]
    fn non_http_scheme_rejected() {
        assert!(check("ftp://files.example.com/").is_err());
        assert!(check("file:///etc/passwd").is_err());
    }

    #[test]
    fn loopback_and_private_ranges_rejected() {
        assert!(check("http://127.0.0.1:8080/").is_err());
        assert!(check("http://10.1.2.3/").is_err());
        assert!(check("http://172.20.0.1/").is_err());
        assert!(check("http://192.168.1.1/").is_err());
        assert!(check("http://169.254.169.254/latest/meta-data").is_err());
        assert!(check("http://[::1]/").is_err());
    }

    #[test]
    fn ipv4_mapped_ipv6_rejected() {
        assert!(check("http://[::ffff:127.0.0.1]/").is_err());
        assert!(check("http://[::ffff:10.0.0.5]:8080/").is_err());
        assert!(check("http://[fe80::1]/").is_err());
        assert!(check("http://[::ffff:8.8.8.8]/").is_ok());
    }

    #[test]
    fn internal_hostnames_rejected() {
        assert!(check("http://localhost:3000/").is_err());
        assert!(check("http://printer.local/").is_err());
        assert!(check("http://db.internal/").is_err());
    }

    #[test]
    fn private_hosts_allowed_when_configured() {
        let url = Url::parse("http://127.0.0.1:8080/").unwrap();
        assert!(check_scrape_target(&url, true).is_ok());
    }

    #[test]
    fn public_ip_allowed() {
        assert!(check("http://8.8.8.8/").is_ok());
        assert!(check("http://172.32.0.1/").is_ok());
    }
}
