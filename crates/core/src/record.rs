use serde::{Deserialize, Serialize};
use url::Url;

use crate::ScrapeError;

pub const COMPANY_NOT_SPECIFIED: &str = "Компания не указана";
pub const LOCATION_NOT_SPECIFIED: &str = "Местоположение не указано";
pub const SALARY_NOT_SPECIFIED: &str = "ЗП не указана";
pub const SKILLS_NOT_SPECIFIED: &str = "Скиллы не указаны";

/// Sub-fields read from a single listing card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Field {
    Company,
    Title,
    Location,
    Salary,
    Skills,
    Link,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Company,
        Field::Title,
        Field::Location,
        Field::Salary,
        Field::Skills,
        Field::Link,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Company => "company",
            Field::Title => "title",
            Field::Location => "location",
            Field::Salary => "salary",
            Field::Skills => "skills",
            Field::Link => "link",
        }
    }

    /// Value stored when the field is absent. `None` marks a required field.
    pub fn sentinel(self) -> Option<&'static str> {
        match self {
            Field::Company => Some(COMPANY_NOT_SPECIFIED),
            Field::Location => Some(LOCATION_NOT_SPECIFIED),
            Field::Salary => Some(SALARY_NOT_SPECIFIED),
            Field::Skills => Some(SKILLS_NOT_SPECIFIED),
            Field::Title | Field::Link => None,
        }
    }

    pub fn is_required(self) -> bool {
        self.sentinel().is_none()
    }
}

/// A normalized job listing, ready for the record sink.
///
/// Only [`ListingRecord::new`] and [`RecordBuilder::build`] construct one, and
/// both reject an empty title or a link that is not an absolute URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingRecord {
    pub company: String,
    pub title: String,
    pub location: String,
    pub salary: String,
    pub skills: String,
    pub link: String,
}

impl ListingRecord {
    pub fn new(
        company: impl Into<String>,
        title: impl Into<String>,
        location: impl Into<String>,
        salary: impl Into<String>,
        skills: impl Into<String>,
        link: impl Into<String>,
    ) -> Result<Self, ScrapeError> {
        let title = title.into();
        let link = link.into();

        if title.trim().is_empty() {
            return Err(ScrapeError::parsing_error("Listing title is empty"));
        }
        Url::parse(&link).map_err(|e| {
            ScrapeError::parsing_error(format!("Listing link '{}' is not absolute: {}", link, e))
        })?;

        Ok(Self {
            company: company.into(),
            title,
            location: location.into(),
            salary: salary.into(),
            skills: skills.into(),
            link,
        })
    }
}

/// Collects extracted values for one card.
#[derive(Debug, Default)]
pub struct RecordBuilder {
    values: [Option<String>; 6],
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(field: Field) -> usize {
        Field::ALL.iter().position(|f| *f == field).unwrap_or_default()
    }

    pub fn set(&mut self, field: Field, value: String) -> &mut Self {
        self.values[Self::slot(field)] = Some(value);
        self
    }

    /// Fills absent optional fields with their sentinel and reports the first
    /// absent required field. A link that does not resolve to an absolute URL
    /// counts as absent.
    pub fn build(mut self, card_index: usize) -> Result<ListingRecord, ScrapeError> {
        let mut take = |field: Field| -> Result<String, ScrapeError> {
            match self.values[Self::slot(field)].take() {
                Some(value) if !value.trim().is_empty() || !field.is_required() => Ok(value),
                _ => field
                    .sentinel()
                    .map(str::to_string)
                    .ok_or_else(|| ScrapeError::required_field_missing(field.name(), card_index)),
            }
        };

        let company = take(Field::Company)?;
        let title = take(Field::Title)?;
        let location = take(Field::Location)?;
        let salary = take(Field::Salary)?;
        let skills = take(Field::Skills)?;
        let link = take(Field::Link)?;
        if Url::parse(&link).is_err() {
            return Err(ScrapeError::required_field_missing(Field::Link.name(), card_index));
        }

        ListingRecord::new(company, title, location, salary, skills, link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    fn full_builder() -> RecordBuilder {
        let mut b = RecordBuilder::new();
        b.set(Field::Company, "Acme".into())
            .set(Field::Title, "Backend developer".into())
            .set(Field::Location, "Москва".into())
            .set(Field::Salary, "от 300 000 ₽".into())
            .set(Field::Skills, "Rust, PostgreSQL".into())
            .set(Field::Link, "https://career.habr.com/vacancies/1".into());
        b
    }

    #[test]
    fn builds_record_with_all_fields() {
        let record = full_builder().build(0).unwrap();
        assert_eq!(record.company, "Acme");
        assert_eq!(record.link, "https://career.habr.com/vacancies/1");
    }

    #[test]
    fn absent_optional_fields_take_sentinels() {
        let mut b = RecordBuilder::new();
        b.set(Field::Title, "QA".into())
            .set(Field::Link, "https://career.habr.com/vacancies/2".into());
        let record = b.build(0).unwrap();
        assert_eq!(record.company, COMPANY_NOT_SPECIFIED);
        assert_eq!(record.location, LOCATION_NOT_SPECIFIED);
        assert_eq!(record.salary, SALARY_NOT_SPECIFIED);
        assert_eq!(record.skills, SKILLS_NOT_SPECIFIED);
    }

    #[test]
    fn missing_title_is_reported_with_card_index() {
        let mut b = RecordBuilder::new();
        b.set(Field::Link, "https://career.habr.com/vacancies/3".into());
        let err = b.build(7).unwrap_err();
        assert_eq!(err.category, ErrorCategory::RequiredFieldMissing);
        assert_eq!(err.context["field"], "title");
        assert_eq!(err.context["card_index"], 7);
    }

    #[test]
    fn blank_title_counts_as_missing() {
        let mut b = full_builder();
        b.set(Field::Title, "   ".into());
        let err = b.build(1).unwrap_err();
        assert_eq!(err.category, ErrorCategory::RequiredFieldMissing);
    }

    #[test]
    fn relative_link_counts_as_missing() {
        let mut b = full_builder();
        b.set(Field::Link, "/vacancies/4".into());
        let err = b.build(4).unwrap_err();
        assert_eq!(err.category, ErrorCategory::RequiredFieldMissing);
        assert_eq!(err.context["field"], "link");
        assert_eq!(err.context["card_index"], 4);
    }

    #[test]
    fn direct_construction_still_rejects_relative_links() {
        let err = ListingRecord::new("Acme", "QA", "-", "-", "-", "/vacancies/5").unwrap_err();
        assert_eq!(err.category, ErrorCategory::Parsing);
    }

    #[test]
    fn only_title_and_link_are_required() {
        let required: Vec<_> = Field::ALL.iter().filter(|f| f.is_required()).collect();
        assert_eq!(required, vec![&Field::Title, &Field::Link]);
    }
}
