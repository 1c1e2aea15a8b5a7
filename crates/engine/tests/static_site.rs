use careerscout_core::{
    COMPANY_NOT_SPECIFIED, Pacing, SALARY_NOT_SPECIFIED, ScrapeConfig, ScrapeJob, SiteProfile,
};
use careerscout_engine::ScrapeSession;
use careerscout_parser::{FixtureSource, StaticLauncher};
use careerscout_storage::{MemoryStore, VacancyQuery};
use std::collections::HashSet;

const BASE: &str = "https://career.example";

struct Card {
    n: u32,
    company: bool,
    title: bool,
    salary: bool,
}

impl Card {
    fn full(n: u32) -> Self {
        Self { n, company: true, title: true, salary: true }
    }

    fn html(&self) -> String {
        let mut out = String::from(r#"<div class="vacancy-card__info">"#);
        if self.company {
            out += &format!(
                r#"<div class="vacancy-card__company"><span class="vacancy-card__company-title">Company {}</span></div>"#,
                self.n
            );
        }
        if self.title {
            out += &format!(
                r#"<div class="vacancy-card__title"><a href="/vacancies/{n}">Backend developer {n}</a></div>"#,
                n = self.n
            );
        }
        out += r#"<div class="vacancy-card__meta">Москва • Полный рабочий день</div>"#;
        if self.salary {
            out += r#"<div class="vacancy-card__salary">от 300 000 ₽</div>"#;
        }
        out += r#"<div class="vacancy-card__skills">Rust • PostgreSQL</div></div>"#;
        out
    }
}

fn results_page(cards: &[Card], next: Option<&str>) -> String {
    let cards: String = cards.iter().map(Card::html).collect();
    let next = next
        .map(|href| {
            format!(r#"<a class="button-comp--appearance-pagination-button" rel="next" href="{}">Дальше</a>"#, href)
        })
        .unwrap_or_default();
    format!("<html><body><div class=\"section-group\">{}</div>{}</body></html>", cards, next)
}

fn search_url(query: &str) -> String {
    format!("{}/vacancies?q={}&type=all", BASE, query)
}

fn config() -> ScrapeConfig {
    ScrapeConfig { profile: SiteProfile::habr_career_at(BASE), pacing: Pacing::immediate() }
}

fn fixture(pages: Vec<(String, String)>) -> FixtureSource {
    let home = (format!("{}/", BASE), "<html><body>home</body></html>".to_string());
    FixtureSource::new(std::iter::once(home).chain(pages))
}

fn two_backend_pages() -> FixtureSource {
    let page2_url = format!("{}/vacancies?page=2&q=backend&type=all", BASE);
    let page1: Vec<Card> = (1..=5).map(Card::full).collect();
    let page2: Vec<Card> = (6..=10).map(Card::full).collect();
    fixture(vec![
        (search_url("backend"), results_page(&page1, Some("/vacancies?page=2&q=backend&type=all"))),
        (page2_url, results_page(&page2, None)),
    ])
}

#[tokio::test]
async fn backend_search_collects_both_pages() {
    let source = two_backend_pages();
    let store = MemoryStore::new();
    let config = config();

    let report = ScrapeSession::new(&StaticLauncher::new(source.clone()), &store.connector(), &config)
        .run(&ScrapeJob::new("backend"))
        .await
        .unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.records_sunk, 10);
    assert_eq!(report.cards_skipped, 0);

    let rows = store.rows().await;
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0].title, "Backend developer 1");
    assert_eq!(rows[0].link, "https://career.example/vacancies/1");
    assert_eq!(rows[9].company, "Company 10");
    assert_eq!(rows[9].skills, "Rust • PostgreSQL");
    assert_eq!((store.opened(), store.closed()), (1, 1));

    // home, page 1, page 2: nothing fetched twice
    let visits = source.visits();
    assert_eq!(visits.len(), 3);
    let unique: HashSet<&String> = visits.iter().collect();
    assert_eq!(unique.len(), 3);
}

#[tokio::test]
async fn search_with_no_results_completes_empty() {
    let source = fixture(vec![(search_url("rare-role-xyz"), results_page(&[], None))]);
    let store = MemoryStore::new();
    let config = config();

    let report = ScrapeSession::new(&StaticLauncher::new(source), &store.connector(), &config)
        .run(&ScrapeJob::new("rare-role-xyz"))
        .await
        .unwrap();

    assert_eq!((report.pages, report.records_sunk), (1, 0));
    assert_eq!(store.count().await.unwrap(), 0);
    assert_eq!(store.closed(), 1);
}

#[tokio::test]
async fn missing_company_and_salary_are_stored_with_placeholders() {
    let card = Card { n: 7, company: false, title: true, salary: false };
    let source = fixture(vec![(search_url("backend"), results_page(&[card], None))]);
    let store = MemoryStore::new();
    let config = config();

    ScrapeSession::new(&StaticLauncher::new(source), &store.connector(), &config)
        .run(&ScrapeJob::new("backend"))
        .await
        .unwrap();

    let rows = store.rows().await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].company, COMPANY_NOT_SPECIFIED);
    assert_eq!(rows[0].salary, SALARY_NOT_SPECIFIED);
    assert_eq!(rows[0].location, "Москва • Полный рабочий день");
}

#[tokio::test]
async fn card_without_title_is_skipped() {
    let cards = [Card::full(1), Card { n: 2, company: true, title: false, salary: true }, Card::full(3)];
    let source = fixture(vec![(search_url("backend"), results_page(&cards, None))]);
    let store = MemoryStore::new();
    let config = config();

    let report = ScrapeSession::new(&StaticLauncher::new(source), &store.connector(), &config)
        .run(&ScrapeJob::new("backend"))
        .await
        .unwrap();

    assert_eq!((report.records_sunk, report.cards_skipped), (2, 1));
    let titles: Vec<_> = store.rows().await.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, ["Backend developer 1", "Backend developer 3"]);
}

#[tokio::test]
async fn repeating_a_search_stores_duplicates() {
    let source = two_backend_pages();
    let store = MemoryStore::new();
    let config = config();
    let launcher = StaticLauncher::new(source);

    for _ in 0..2 {
        ScrapeSession::new(&launcher, &store.connector(), &config)
            .run(&ScrapeJob::new("backend"))
            .await
            .unwrap();
    }

    assert_eq!(store.count().await.unwrap(), 20);
    assert_eq!(store.by_title("Backend developer 4", 10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unreachable_results_page_fails_the_session() {
    let source = fixture(vec![]);
    let store = MemoryStore::new();
    let config = config();

    let err = ScrapeSession::new(&StaticLauncher::new(source), &store.connector(), &config)
        .run(&ScrapeJob::new("backend"))
        .await
        .unwrap_err();

    assert_eq!(err.category, careerscout_core::ErrorCategory::Navigation);
    assert_eq!((store.opened(), store.closed()), (1, 1));
}
