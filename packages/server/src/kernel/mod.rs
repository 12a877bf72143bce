//! Kernel module - server infrastructure and dependencies.

pub mod content_filter;
pub mod deps;
pub mod preview_scraper;
pub mod recaptcha_client;
pub mod scan;
pub mod test_dependencies;
pub mod traits;
pub mod urlscan_client;

pub use content_filter::BlocklistContentFilter;
pub use deps::ServerDeps;
pub use preview_scraper::PreviewScraper;
pub use recaptcha_client::RecaptchaVerifier;
pub use scan::{dispatch_scan, NoopScanner};
pub use test_dependencies::TestDependencies;
pub use traits::*;
pub use urlscan_client::UrlscanScanner;
