use async_trait::async_trait;
use careerscout_core::{BrowserLauncher, ScrapeError};
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig, HeadlessMode};
use futures::StreamExt;
use std::path::PathBuf;

use super::driver::ChromiumDriver;
use super::wait::WaitStrategy;
use crate::shared::TimeoutConfig;

/// Fixed launch policy: headless, no images, automation switches hidden.
pub const LAUNCH_ARGS: &[&str] = &[
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-software-rasterizer",
    "--disable-extensions",
    "--disable-infobars",
    "--disable-blink-features=AutomationControlled",
    "--blink-settings=imagesEnabled=false",
    "--disk-cache-size=4096",
    "--enable-features=NetworkService,NetworkServiceInProcess",
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-popup-blocking",
    "--no-first-run",
    "--password-store=basic",
    "--use-mock-keychain",
];

pub struct ChromiumLauncher {
    timeout_config: TimeoutConfig,
    executable: Option<PathBuf>,
}

impl ChromiumLauncher {
    pub fn new() -> Self {
        Self::with_config(TimeoutConfig::default())
    }

    pub fn with_config(timeout_config: TimeoutConfig) -> Self {
        Self { timeout_config, executable: None }
    }

    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    fn chrome_config(&self, profile_dir: PathBuf) -> Result<ChromeConfig, ScrapeError> {
        // Default args include --enable-automation; LAUNCH_ARGS replaces them.
        let mut builder = ChromeConfig::builder()
            .headless_mode(HeadlessMode::True)
            .disable_default_args()
            .no_sandbox()
            .args(LAUNCH_ARGS.iter().copied())
            .window_size(1920, 1080)
            .request_timeout(self.timeout_config.navigation)
            .user_data_dir(profile_dir);

        if let Some(path) = &self.executable {
            builder = builder.chrome_executable(path);
        }

        builder.build()
            .map_err(|e| ScrapeError::resource_acquisition(format!("Browser config failed: {}", e)))
    }
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    type Driver = ChromiumDriver;

    async fn launch(&self) -> Result<ChromiumDriver, ScrapeError> {
        // Unique profile per instance avoids SingletonLock conflicts
        let profile_dir = std::env::temp_dir().join(format!("careerscout-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&profile_dir).await
            .map_err(|e| ScrapeError::resource_acquisition(format!("Failed to create profile dir: {}", e)))?;

        let chrome_cfg = self.chrome_config(profile_dir.clone())?;

        let (browser, mut handler) = match Browser::launch(chrome_cfg).await {
            Ok(launched) => launched,
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(ScrapeError::resource_acquisition(format!("Browser launch failed: {}", e)));
            }
        };

        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                handler.abort();
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(ScrapeError::resource_acquisition(format!("New page failed: {}", e)));
            }
        };

        tracing::info!(profile_dir = %profile_dir.display(), "chromium launched");

        Ok(ChromiumDriver {
            browser,
            page,
            handler,
            profile_dir,
            wait_strategy: WaitStrategy::new(self.timeout_config.clone()),
        })
    }
}
