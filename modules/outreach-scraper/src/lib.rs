pub mod contacts;
pub mod error;
pub mod feed;
pub mod fetcher;
pub mod links;
pub mod pipeline;
pub mod resolver;
pub mod site;
pub mod wikipedia;

pub use error::{Result, ScrapeError};
pub use feed::fetch_news_feed;
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher};
pub use pipeline::Scraper;
pub use resolver::resolve_url;
pub use site::scrape_standard_site;
pub use wikipedia::scrape_wikipedia_list;

#[cfg(any(test, feature = "test-support"))]
pub use fetcher::MockFetcher;
