//! Configuration module

mod site;

pub use site::BlogConfig;
pub use site::HighlightConfig;
pub use site::{BASE_PATH_ENV, SITE_URL_ENV};
