//! Chromium backend for the scrape engine, driven over CDP by `chromiumoxide`.

pub mod shared;
pub mod worker;

pub use shared::TimeoutConfig;
pub use worker::chromium::{ChromiumDriver, ChromiumElement, ChromiumLauncher, LAUNCH_ARGS};
