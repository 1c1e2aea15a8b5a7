//! Scripted in-memory site for exercising the engine without a browser.

use async_trait::async_trait;
use careerscout_core::{
    BrowserLauncher, ElementHandle, Field, PageDriver, ScrapeError, SiteProfile,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickScript {
    Ok,
    Stale,
    Blocked,
}

/// One listing card, its field values keyed by field.
#[derive(Debug, Clone)]
pub struct FakeCard {
    values: HashMap<Field, String>,
}

impl FakeCard {
    pub fn listing(n: u32) -> Self {
        let values = HashMap::from([
            (Field::Company, format!("Company {}", n)),
            (Field::Title, format!("Vacancy {}", n)),
            (Field::Location, format!("Location {}", n)),
            (Field::Salary, format!("Salary {}", n)),
            (Field::Skills, format!("Skills {}", n)),
            (Field::Link, format!("https://career.example/vacancies/{}", n)),
        ]);
        Self { values }
    }

    pub fn with(mut self, field: Field, value: &str) -> Self {
        self.values.insert(field, value.to_string());
        self
    }

    pub fn without(mut self, field: Field) -> Self {
        self.values.remove(&field);
        self
    }

    /// Standalone element using the default profile's selectors.
    pub fn into_element(self) -> FakeElement {
        FakeElement::Card { card: self, selectors: Arc::new(selector_map(&SiteProfile::habr_career())) }
    }
}

fn selector_map(profile: &SiteProfile) -> HashMap<String, Field> {
    profile.fields.iter().map(|s| (s.selector.clone(), s.field)).collect()
}

#[derive(Debug, Clone)]
pub enum FakeElement {
    Card { card: FakeCard, selectors: Arc<HashMap<String, Field>> },
    Value(String),
    Next,
}

#[async_trait]
impl ElementHandle for FakeElement {
    async fn find(&self, selector: &str) -> Result<Option<Self>, ScrapeError> {
        Ok(match self {
            FakeElement::Card { card, selectors } => selectors
                .get(selector)
                .and_then(|field| card.values.get(field))
                .map(|v| FakeElement::Value(v.clone())),
            _ => None,
        })
    }

    async fn text(&self) -> Result<String, ScrapeError> {
        Ok(match self {
            FakeElement::Value(v) => v.clone(),
            _ => String::new(),
        })
    }

    async fn link(&self) -> Result<Option<String>, ScrapeError> {
        Ok(match self {
            FakeElement::Value(v) => Some(v.clone()),
            _ => None,
        })
    }
}

#[derive(Debug, Default)]
struct SiteState {
    page: Option<usize>,
    script: VecDeque<ClickScript>,
    scroll_script: VecDeque<ClickScript>,
    click_attempts: usize,
    visits: Vec<usize>,
    launches: usize,
    closed: usize,
    fail_launch: bool,
}

struct SiteInner {
    pages: Vec<Vec<FakeCard>>,
    card_selector: String,
    next_selector: String,
    selectors: Arc<HashMap<String, Field>>,
    state: Mutex<SiteState>,
}

/// A paginated result set. Clones share state, so a test keeps one handle
/// while the session owns the driver.
#[derive(Clone)]
pub struct FakeSite {
    inner: Arc<SiteInner>,
}

impl FakeSite {
    pub fn new(profile: &SiteProfile, pages: Vec<Vec<FakeCard>>) -> Self {
        Self {
            inner: Arc::new(SiteInner {
                pages,
                card_selector: profile.card.clone(),
                next_selector: profile.next_page.clone(),
                selectors: Arc::new(selector_map(profile)),
                state: Mutex::new(SiteState::default()),
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SiteState> {
        self.inner.state.lock().unwrap()
    }

    pub fn driver(&self) -> FakeDriver {
        FakeDriver { site: self.clone() }
    }

    pub fn launcher(&self) -> FakeLauncher {
        FakeLauncher { site: self.clone() }
    }

    pub fn script_clicks(&self, script: impl IntoIterator<Item = ClickScript>) {
        self.state().script.extend(script);
    }

    /// Outcomes for the next `scroll_into_view` calls; `Blocked` means the
    /// scroll itself failed outright.
    pub fn script_scrolls(&self, script: impl IntoIterator<Item = ClickScript>) {
        self.state().scroll_script.extend(script);
    }

    pub fn fail_launch(&self) {
        self.state().fail_launch = true;
    }

    pub fn click_attempts(&self) -> usize {
        self.state().click_attempts
    }

    /// Page indexes shown, in order.
    pub fn visits(&self) -> Vec<usize> {
        self.state().visits.clone()
    }

    pub fn launches(&self) -> usize {
        self.state().launches
    }

    pub fn closed(&self) -> usize {
        self.state().closed
    }
}

pub struct FakeDriver {
    site: FakeSite,
}

#[async_trait]
impl PageDriver for FakeDriver {
    type Element = FakeElement;

    async fn open(&self, _url: &str) -> Result<(), ScrapeError> {
        Ok(())
    }

    async fn submit_search(&self, _profile: &SiteProfile, _query: &str) -> Result<(), ScrapeError> {
        let mut state = self.site.state();
        state.page = Some(0);
        state.visits.push(0);
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, ScrapeError> {
        let inner = &self.site.inner;
        let Some(page) = self.site.state().page else {
            return Ok(Vec::new());
        };
        if selector == inner.card_selector {
            Ok(inner.pages.get(page).into_iter().flatten()
                .map(|card| FakeElement::Card { card: card.clone(), selectors: inner.selectors.clone() })
                .collect())
        } else if selector == inner.next_selector && page + 1 < inner.pages.len() {
            Ok(vec![FakeElement::Next])
        } else {
            Ok(Vec::new())
        }
    }

    async fn scroll_into_view(&self, _element: &FakeElement) -> Result<(), ScrapeError> {
        match self.site.state().scroll_script.pop_front().unwrap_or(ClickScript::Ok) {
            ClickScript::Ok => Ok(()),
            ClickScript::Stale => Err(ScrapeError::stale_element("Node is detached")),
            ClickScript::Blocked => Err(ScrapeError::browser_error("Scroll failed: websocket closed")),
        }
    }

    async fn click(&self, _element: &FakeElement) -> Result<(), ScrapeError> {
        let mut state = self.site.state();
        state.click_attempts += 1;
        match state.script.pop_front().unwrap_or(ClickScript::Ok) {
            ClickScript::Ok => {
                let next = state.page.map_or(0, |p| p + 1);
                state.page = Some(next);
                state.visits.push(next);
                Ok(())
            }
            ClickScript::Stale => Err(ScrapeError::stale_element("Could not find node with given id")),
            ClickScript::Blocked => Err(ScrapeError::click_intercepted("click intercepted by .overlay")),
        }
    }

    async fn current_url(&self) -> Result<Option<String>, ScrapeError> {
        Ok(self.site.state().page.map(|p| format!("https://career.example/vacancies?page={}", p + 1)))
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.site.state().closed += 1;
        Ok(())
    }
}

pub struct FakeLauncher {
    site: FakeSite,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    type Driver = FakeDriver;

    async fn launch(&self) -> Result<FakeDriver, ScrapeError> {
        let mut state = self.site.state();
        if state.fail_launch {
            return Err(ScrapeError::resource_acquisition("chromium not found"));
        }
        state.launches += 1;
        Ok(self.site.driver())
    }
}
