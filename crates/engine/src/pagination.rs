use careerscout_core::{Pacing, PageDriver, ScrapeError, SiteProfile};
use tokio::time::sleep;

/// Click attempts per page before the result set is treated as exhausted.
pub const MAX_CLICK_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// No next control on the page: the last page was reached
    NoNextControl,
    /// The control disappeared while re-locating it for a retry
    ControlVanished,
    /// Interaction failed for a reason other than staleness
    ClickBlocked,
    /// Every click attempt hit a stale reference
    RetriesExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationState {
    Locate { attempt: u32 },
    Scroll,
    ClickAttempt { attempt: u32 },
    Success { attempts: u32 },
    Exhausted(ExhaustReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationEvent {
    Found,
    Missing,
    Scrolled,
    Clicked,
    Stale,
    Blocked,
}

impl PaginationEvent {
    fn from_error(e: &ScrapeError) -> Self {
        if e.is_stale() { Self::Stale } else { Self::Blocked }
    }
}

impl PaginationState {
    pub fn start() -> Self {
        Self::Locate { attempt: 1 }
    }

    pub fn next(self, event: PaginationEvent) -> Self {
        use PaginationEvent::*;

        match self {
            Self::Success { .. } | Self::Exhausted(_) => self,
            Self::Locate { attempt } => match event {
                Found if attempt == 1 => Self::Scroll,
                // Retries re-locate and click without scrolling again
                Found => Self::ClickAttempt { attempt },
                Missing if attempt == 1 => Self::Exhausted(ExhaustReason::NoNextControl),
                Missing => Self::Exhausted(ExhaustReason::ControlVanished),
                _ => Self::Exhausted(ExhaustReason::ClickBlocked),
            },
            Self::Scroll => match event {
                Scrolled => Self::ClickAttempt { attempt: 1 },
                Stale => Self::Locate { attempt: 2 },
                _ => Self::Exhausted(ExhaustReason::ClickBlocked),
            },
            Self::ClickAttempt { attempt } => match event {
                Clicked => Self::Success { attempts: attempt },
                Stale if attempt < MAX_CLICK_ATTEMPTS => Self::Locate { attempt: attempt + 1 },
                Stale => Self::Exhausted(ExhaustReason::RetriesExhausted),
                _ => Self::Exhausted(ExhaustReason::ClickBlocked),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    /// Navigation was triggered; `attempts` clicks were needed.
    Advanced { attempts: u32 },
    Exhausted(ExhaustReason),
}

/// Moves to the next results page, or reports that there is none.
///
/// Never fails: anything that keeps the next page from being reached ends
/// pagination.
pub async fn advance<D: PageDriver>(driver: &D, profile: &SiteProfile, pacing: &Pacing) -> PageTurn {
    let mut state = PaginationState::start();
    let mut control: Option<D::Element> = None;

    loop {
        let event = match state {
            PaginationState::Locate { attempt } => {
                match driver.find_first(&profile.next_page).await {
                    Ok(Some(found)) => {
                        control = Some(found);
                        if attempt > 1 {
                            sleep(pacing.retry_settle).await;
                        }
                        PaginationEvent::Found
                    }
                    Ok(None) => PaginationEvent::Missing,
                    Err(e) => {
                        tracing::warn!(error = %e, "next control lookup failed");
                        PaginationEvent::Blocked
                    }
                }
            }
            PaginationState::Scroll => match control.as_ref() {
                Some(el) => match driver.scroll_into_view(el).await {
                    Ok(()) => {
                        sleep(pacing.scroll_settle).await;
                        PaginationEvent::Scrolled
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "scroll to next control failed");
                        PaginationEvent::from_error(&e)
                    }
                },
                None => PaginationEvent::Missing,
            },
            PaginationState::ClickAttempt { attempt } => match control.as_ref() {
                Some(el) => match driver.click(el).await {
                    Ok(()) => PaginationEvent::Clicked,
                    Err(e) => {
                        tracing::debug!(attempt, error = %e, "next control click failed");
                        PaginationEvent::from_error(&e)
                    }
                },
                None => PaginationEvent::Missing,
            },
            PaginationState::Success { attempts } => {
                sleep(pacing.page_settle).await;
                return PageTurn::Advanced { attempts };
            }
            PaginationState::Exhausted(reason) => return PageTurn::Exhausted(reason),
        };

        state = state.next(event);
    }
}
