use careerscout_core::{ElementHandle, FieldRead, FieldSpec, ListingRecord, RecordBuilder, ScrapeError};

/// Reads one field from a card. `Ok(None)` when the selector matches nothing.
pub async fn extract_field<E: ElementHandle>(card: &E, spec: &FieldSpec) -> Result<Option<String>, ScrapeError> {
    let Some(element) = card.find(&spec.selector).await? else {
        return Ok(None);
    };
    match spec.read {
        FieldRead::Text => element.text().await.map(Some),
        FieldRead::Link => element.link().await,
    }
}

/// Reads every field of a card into a record. Absent optional fields get
/// their sentinel; an absent `title` or `link` fails this card only.
pub async fn extract_card<E: ElementHandle>(
    card: &E,
    fields: &[FieldSpec],
    card_index: usize,
) -> Result<ListingRecord, ScrapeError> {
    let mut builder = RecordBuilder::new();
    for spec in fields {
        match extract_field(card, spec).await? {
            Some(value) => {
                builder.set(spec.field, value);
            }
            None if spec.field.is_required() => {
                return Err(ScrapeError::required_field_missing(spec.field.name(), card_index));
            }
            None => tracing::trace!(field = spec.field.name(), card_index, "field absent"),
        }
    }
    builder.build(card_index)
}
