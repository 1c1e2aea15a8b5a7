//! The scraping engine: field extraction, per-page harvesting, pagination
//! and the session that ties them to a browser and a record sink.

pub mod extractor;
pub mod harvester;
pub mod pagination;
pub mod session;

#[cfg(test)]
mod testing;

pub use extractor::{extract_card, extract_field};
pub use harvester::CardHarvester;
pub use pagination::{ExhaustReason, MAX_CLICK_ATTEMPTS, PageTurn, PaginationEvent, PaginationState, advance};
pub use session::{ScrapeSession, SessionWorker};
