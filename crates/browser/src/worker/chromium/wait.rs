use chromiumoxide::page::Page;
use careerscout_core::ScrapeError;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use crate::shared::{js, to_scrape_error, TimeoutConfig};

#[derive(Debug, Clone)]
pub struct WaitStrategy {
    config: TimeoutConfig,
}

fn is_context_loss(e: &impl std::fmt::Display) -> bool {
    let s = e.to_string();
    s.contains("Cannot find context") || s.contains("Execution context was destroyed")
}

impl WaitStrategy {
    pub fn new(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Polls until `selector` is present and visible.
    pub async fn wait_for_element(&self, page: &Page, selector: &str) -> Result<(), ScrapeError> {
        let timeout = self.config.element_wait;
        let start = Instant::now();
        let mut last_state = String::new();

        loop {
            let js = js::build_js_call(js::element::CHECK_ELEMENT_STATE, &[json!(selector)]);

            let result = match page.evaluate(js).await {
                Ok(r) => r,
                Err(e) if is_context_loss(&e) => {
                    // Page is navigating
                    sleep(Duration::from_millis(500)).await;
                    continue;
                }
                Err(e) => return Err(to_scrape_error(e, "WaitFor")),
            };

            if let Some(obj) = result.value().and_then(|v| v.as_object()) {
                let exists = obj.get("exists").and_then(|v| v.as_bool()).unwrap_or(false);
                let visible = obj.get("visible").and_then(|v| v.as_bool()).unwrap_or(false);

                let current_state = format!("exists:{} visible:{}", exists, visible);
                if current_state != last_state {
                    tracing::debug!(selector, state = %current_state, "element state");
                    last_state = current_state;
                }

                if exists && visible {
                    return Ok(());
                }
            }

            if start.elapsed() > timeout {
                return Err(ScrapeError::element_not_found(selector).with_context(json!({
                    "selector": selector,
                    "timeout_ms": timeout.as_millis() as u64,
                    "last_state": last_state,
                })));
            }

            sleep(self.config.check_interval).await;
        }
    }

    /// Waits for `document.readyState == complete` with no in-flight
    /// resources. Gives up quietly after `page_stable`.
    pub async fn wait_for_stable(&self, page: &Page) -> Result<(), ScrapeError> {
        let timeout = self.config.page_stable;
        let start = Instant::now();
        let mut stable_checks = 0;
        let required_stable_checks = 3;

        loop {
            let js = js::build_js_call(js::wait::CHECK_LOADING, &[]);

            let result = match page.evaluate(js).await {
                Ok(r) => r,
                Err(e) if is_context_loss(&e) => {
                    tracing::debug!("page context changed, waiting");
                    stable_checks = 0;
                    sleep(Duration::from_millis(1000)).await;
                    continue;
                }
                Err(e) => return Err(to_scrape_error(e, "WaitForStable")),
            };

            if let Some(obj) = result.value().and_then(|v| v.as_object()) {
                let ready = obj.get("readyState").and_then(|v| v.as_str()) == Some("complete");
                let active = obj.get("activeRequests").and_then(|v| v.as_u64()).unwrap_or(0);

                if ready && active == 0 {
                    stable_checks += 1;
                    if stable_checks >= required_stable_checks {
                        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "page stabilized");
                        return Ok(());
                    }
                } else {
                    stable_checks = 0;
                }
            }

            if start.elapsed() > timeout {
                tracing::warn!("page stabilization timeout, continuing anyway");
                return Ok(());
            }

            sleep(self.config.check_interval).await;
        }
    }

    pub async fn wait_for_navigation(&self, page: &Page) -> Result<(), ScrapeError> {
        // Let the navigation actually start
        sleep(self.config.settle_delay).await;
        self.wait_for_stable(page).await
    }
}
