pub mod chromium {
    mod driver;
    mod launcher;
    pub mod wait;

    pub use driver::{ChromiumDriver, ChromiumElement};
    pub use launcher::{ChromiumLauncher, LAUNCH_ARGS};
}
