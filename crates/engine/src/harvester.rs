use careerscout_core::{ElementHandle, FieldSpec, ListingRecord, PageDriver, ScrapeError, SiteProfile};
use std::iter::Enumerate;
use std::vec::IntoIter;

use crate::extractor::extract_card;

/// The listing cards of one page, turned into records one at a time.
///
/// Consumes its cards as it goes, so a harvester covers a single pass over a
/// single page. It knows nothing about pagination.
pub struct CardHarvester<'a, E> {
    cards: Enumerate<IntoIter<E>>,
    fields: &'a [FieldSpec],
}

impl<'a, E: ElementHandle> CardHarvester<'a, E> {
    /// Snapshots the cards currently on the page, in document order.
    pub async fn scan<D>(driver: &D, profile: &'a SiteProfile) -> Result<Self, ScrapeError>
    where
        D: PageDriver<Element = E>,
    {
        let cards = driver.find_all(&profile.card).await?;
        Ok(Self { cards: cards.into_iter().enumerate(), fields: &profile.fields })
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    /// Next card's record, tagged with the card's position on the page.
    pub async fn next_record(&mut self) -> Option<(usize, Result<ListingRecord, ScrapeError>)> {
        let (index, card) = self.cards.next()?;
        Some((index, extract_card(&card, self.fields, index).await))
    }
}
