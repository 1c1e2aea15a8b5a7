use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    pub element_wait: Duration,
    pub navigation: Duration,
    pub page_stable: Duration,
    pub check_interval: Duration,
    pub settle_delay: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_millis(15000),
            navigation: Duration::from_millis(30000),
            page_stable: Duration::from_millis(30000),
            check_interval: Duration::from_millis(300),
            settle_delay: Duration::from_millis(1000),
        }
    }
}

impl TimeoutConfig {
    pub fn with_element_wait(mut self, ms: u64) -> Self {
        self.element_wait = Duration::from_millis(ms);
        self
    }

    pub fn fast() -> Self {
        Self {
            element_wait: Duration::from_millis(8000),
            navigation: Duration::from_millis(20000),
            page_stable: Duration::from_millis(20000),
            check_interval: Duration::from_millis(200),
            settle_delay: Duration::from_millis(500),
        }
    }

    pub fn patient() -> Self {
        Self {
            element_wait: Duration::from_millis(30000),
            navigation: Duration::from_millis(60000),
            page_stable: Duration::from_millis(60000),
            check_interval: Duration::from_millis(500),
            settle_delay: Duration::from_millis(2000),
        }
    }

    /// Preset by name, as read from configuration.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "fast" => Some(Self::fast()),
            "patient" => Some(Self::patient()),
            _ => None,
        }
    }
}
