// Page fetching boundary.
//
// Every stage fetches through `PageFetcher`. Production wires in
// `HttpFetcher` (reqwest); tests use `MockFetcher`.

use std::time::Duration;

use async_trait::async_trait;
use outreach_common::check_scrape_target;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Bodies beyond this are truncated before parsing.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;
const MAX_REDIRECTS: usize = 5;

/// A fetched response. Non-2xx statuses are returned, not raised,
/// so callers can decide whether a status is fatal.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The page body if the status was 2xx, otherwise an `Http` error.
    pub fn into_success(self) -> Result<FetchedPage> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScrapeError::Http {
                url: self.url,
                status: self.status,
            })
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url`, giving up after `timeout`.
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher that presents `user_agent` on every request.
    /// Redirects are followed only to targets that pass `check_scrape_target`.
    pub fn new(user_agent: &str, allow_private_hosts: bool) -> anyhow::Result<Self> {
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if redirect_allowed(attempt.url(), attempt.previous().len(), allow_private_hosts) {
                attempt.follow()
            } else {
                debug!(location = %attempt.url(), "fetch: redirect not followed");
                attempt.stop()
            }
        });
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(policy)
            .build()?;
        Ok(Self { client })
    }
}

/// Whether a redirect to `target` may be followed after `hops` earlier redirects.
fn redirect_allowed(target: &Url, hops: usize, allow_private_hosts: bool) -> bool {
    hops < MAX_REDIRECTS && check_scrape_target(target, allow_private_hosts).is_ok()
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedPage> {
        debug!(url, timeout_secs = timeout.as_secs(), "fetch: GET");

        let resp = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let bytes = resp.bytes().await.map_err(|e| transport_error(url, e))?;

        let body = if bytes.len() > MAX_BODY_BYTES {
            &bytes[..MAX_BODY_BYTES]
        } else {
            &bytes[..]
        };

        Ok(FetchedPage {
            url: final_url,
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        })
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ScrapeError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// MockFetcher (for tests)
// ---------------------------------------------------------------------------

#[cfg(any(test, feature = "test-support"))]
pub use mock::MockFetcher;

#[cfg(any(test, feature = "test-support"))]
mod mock {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::{FetchedPage, PageFetcher};
    use crate::error::{Result, ScrapeError};

    #[derive(Clone)]
    enum Canned {
        Page { status: u16, body: String },
        Timeout,
        Network,
    }

    /// Serves canned responses by exact URL, then by longest matching prefix.
    /// Unknown URLs fail with a network error. Records every requested URL.
    #[derive(Default)]
    pub struct MockFetcher {
        exact: Mutex<Vec<(String, Canned)>>,
        prefixes: Mutex<Vec<(String, Canned)>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(self, url: &str, body: &str) -> Self {
            self.status(url, 200, body)
        }

        pub fn status(self, url: &str, status: u16, body: &str) -> Self {
            self.push_exact(
                url,
                Canned::Page {
                    status,
                    body: body.to_string(),
                },
            )
        }

        pub fn timeout(self, url: &str) -> Self {
            self.push_exact(url, Canned::Timeout)
        }

        pub fn network_error(self, url: &str) -> Self {
            self.push_exact(url, Canned::Network)
        }

        /// Respond to any URL starting with `prefix`.
        pub fn prefix(self, prefix: &str, body: &str) -> Self {
            self.prefixes.lock().unwrap().push((
                prefix.to_string(),
                Canned::Page {
                    status: 200,
                    body: body.to_string(),
                },
            ));
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn was_called_with_prefix(&self, prefix: &str) -> bool {
            self.calls().iter().any(|c| c.starts_with(prefix))
        }

        fn push_exact(self, url: &str, canned: Canned) -> Self {
            self.exact.lock().unwrap().push((url.to_string(), canned));
            self
        }

        fn lookup(&self, url: &str) -> Option<Canned> {
            if let Some((_, c)) = self.exact.lock().unwrap().iter().find(|(u, _)| u == url) {
                return Some(c.clone());
            }
            self.prefixes
                .lock()
                .unwrap()
                .iter()
                .filter(|(p, _)| url.starts_with(p.as_str()))
                .max_by_key(|(p, _)| p.len())
                .map(|(_, c)| c.clone())
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn get(&self, url: &str, _timeout: Duration) -> Result<FetchedPage> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.lookup(url) {
                Some(Canned::Page { status, body }) => Ok(FetchedPage {
                    url: url.to_string(),
                    status,
                    body,
                }),
                Some(Canned::Timeout) => Err(ScrapeError::Timeout {
                    url: url.to_string(),
                }),
                Some(Canned::Network) | None => Err(ScrapeError::Network {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                }),
            }
        }
    }
}
