pub mod js;
pub mod errors;
pub mod config;

pub use config::TimeoutConfig;
pub use errors::{script_exception_to_scrape_error, to_scrape_error};
