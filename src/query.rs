//! Turns caller criteria into a validated [`QueryDescriptor`].
//!
//! Every supplied predicate is combined with AND. Pagination is 1-indexed;
//! a page size above the configured ceiling is clamped, not rejected.

use crate::error::{AppError, Result};
use crate::models::QuoteCriteria;

///A single filter the store must apply
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Predicate {
    ///Case-insensitive exact match on the speaker's name
    Character(String),
    Season(i64),
    Episode(i64),
    ///Case-insensitive substring match on the quote text
    Keyword(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: i64,
    pub max_size: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub predicates: Vec<Predicate>,
    pub page: i64,
    pub page_size: i64,
}

impl QueryDescriptor {
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

///Collects the filter predicates only, ignoring pagination
pub fn resolve_predicates(criteria: &QuoteCriteria) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(character) = non_blank(criteria.character.as_deref()) {
        predicates.push(Predicate::Character(character));
    }
    if let Some(season) = criteria.season {
        predicates.push(Predicate::Season(season));
    }
    if let Some(episode) = criteria.episode {
        predicates.push(Predicate::Episode(episode));
    }
    if let Some(keyword) = non_blank(criteria.keyword.as_deref()) {
        predicates.push(Predicate::Keyword(keyword));
    }
    predicates
}

///Validates pagination and combines it with the filter predicates
pub fn resolve(criteria: &QuoteCriteria, limits: PageLimits) -> Result<QueryDescriptor> {
    let page = criteria.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::invalid_parameter("page", "must be at least 1"));
    }

    let page_size = criteria.page_size.unwrap_or(limits.default_size);
    if page_size < 1 {
        return Err(AppError::invalid_parameter("pageSize", "must be at least 1"));
    }

    Ok(QueryDescriptor {
        predicates: resolve_predicates(criteria),
        page,
        page_size: page_size.min(limits.max_size),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> QuoteCriteria {
        QuoteCriteria::default()
    }

    #[test]
    fn defaults_to_first_page_with_default_size() {
        let descriptor = resolve(&criteria(), PageLimits::default()).unwrap();
        assert_eq!(descriptor.page, 1);
        assert_eq!(descriptor.limit(), 20);
        assert_eq!(descriptor.offset(), 0);
        assert!(descriptor.predicates.is_empty());
    }

    #[test]
    fn offset_follows_page_and_size() {
        let descriptor = resolve(
            &QuoteCriteria {
                page: Some(3),
                page_size: Some(2),
                ..criteria()
            },
            PageLimits::default(),
        )
        .unwrap();
        assert_eq!(descriptor.offset(), 4);
        assert_eq!(descriptor.limit(), 2);
    }

    #[test]
    fn rejects_page_below_one() {
        let err = resolve(
            &QuoteCriteria {
                page: Some(0),
                ..criteria()
            },
            PageLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { ref name, .. } if name == "page"));
    }

    #[test]
    fn rejects_non_positive_page_size() {
        let err = resolve(
            &QuoteCriteria {
                page_size: Some(-5),
                ..criteria()
            },
            PageLimits::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidParameter { ref name, .. } if name == "pageSize"));
    }

    #[test]
    fn clamps_page_size_to_ceiling() {
        let limits = PageLimits {
            default_size: 10,
            max_size: 50,
        };
        let descriptor = resolve(
            &QuoteCriteria {
                page_size: Some(5000),
                ..criteria()
            },
            limits,
        )
        .unwrap();
        assert_eq!(descriptor.page_size, 50);
    }

    #[test]
    fn collects_every_supplied_predicate_in_order() {
        let predicates = resolve_predicates(&QuoteCriteria {
            character: Some("  George ".into()),
            season: Some(4),
            episode: Some(9),
            keyword: Some("yada".into()),
            ..criteria()
        });
        assert_eq!(
            predicates,
            vec![
                Predicate::Character("George".into()),
                Predicate::Season(4),
                Predicate::Episode(9),
                Predicate::Keyword("yada".into()),
            ]
        );
    }

    #[test]
    fn blank_text_filters_are_ignored() {
        let predicates = resolve_predicates(&QuoteCriteria {
            character: Some("   ".into()),
            keyword: Some(String::new()),
            ..criteria()
        });
        assert!(predicates.is_empty());
    }

    #[test]
    fn criteria_accepts_both_page_size_spellings_and_ignores_unknown_keys() {
        let camel: QuoteCriteria =
            serde_json::from_str(r#"{"pageSize": 7, "flavor": "festivus"}"#).unwrap();
        assert_eq!(camel.page_size, Some(7));
        let snake: QuoteCriteria = serde_json::from_str(r#"{"page_size": 8}"#).unwrap();
        assert_eq!(snake.page_size, Some(8));
    }
}
