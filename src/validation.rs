//! Checks mutation payloads before anything reaches the store.
//!
//! Every field is checked and all failures are reported together, so a
//! rejected request never results in a partial write.

use crate::error::{AppError, FieldError, Result};
use crate::models::{NewCharacterPayload, NewQuotePayload, QuoteUpdatePayload};

pub const MAX_QUOTE_LENGTH: usize = 1000;
pub const MAX_CHARACTER_NAME_LENGTH: usize = 100;
pub const MAX_IMAGE_URL_LENGTH: usize = 2048;

//Validated inputs; the fields are crate-private so these can only come out of the validators

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewQuote {
    pub(crate) character: String,
    pub(crate) quote: String,
    pub(crate) season: Option<i64>,
    pub(crate) episode: Option<i64>,
}

impl NewQuote {
    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    pub fn season(&self) -> Option<i64> {
        self.season
    }

    pub fn episode(&self) -> Option<i64> {
        self.episode
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuoteUpdate {
    pub(crate) quote: Option<String>,
    pub(crate) season: Option<i64>,
    pub(crate) episode: Option<i64>,
}

impl QuoteUpdate {
    pub fn quote(&self) -> Option<&str> {
        self.quote.as_deref()
    }

    pub fn season(&self) -> Option<i64> {
        self.season
    }

    pub fn episode(&self) -> Option<i64> {
        self.episode
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCharacter {
    pub(crate) name: String,
    pub(crate) image_url: Option<String>,
}

impl NewCharacter {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }
}

pub fn validate_new_quote(payload: &NewQuotePayload) -> Result<NewQuote> {
    let mut errors = Vec::new();

    let quote = required_text(&mut errors, "quote", payload.quote.as_deref(), MAX_QUOTE_LENGTH);
    let character = required_text(
        &mut errors,
        "character",
        payload.character.as_deref(),
        MAX_CHARACTER_NAME_LENGTH,
    );
    non_negative(&mut errors, "season", payload.season);
    non_negative(&mut errors, "episode", payload.episode);

    match (quote, character) {
        (Some(quote), Some(character)) if errors.is_empty() => Ok(NewQuote {
            character,
            quote,
            season: payload.season,
            episode: payload.episode,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

pub fn validate_quote_update(payload: &QuoteUpdatePayload) -> Result<QuoteUpdate> {
    let mut errors = Vec::new();

    let quote = match payload.quote.as_deref() {
        Some(text) => required_text(&mut errors, "quote", Some(text), MAX_QUOTE_LENGTH),
        None => None,
    };
    non_negative(&mut errors, "season", payload.season);
    non_negative(&mut errors, "episode", payload.episode);

    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }
    Ok(QuoteUpdate {
        quote,
        season: payload.season,
        episode: payload.episode,
    })
}

pub fn validate_new_character(payload: &NewCharacterPayload) -> Result<NewCharacter> {
    let mut errors = Vec::new();

    let name = required_text(
        &mut errors,
        "name",
        payload.name.as_deref(),
        MAX_CHARACTER_NAME_LENGTH,
    );

    let image_url = payload
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty());
    if let Some(url) = image_url {
        if url.chars().count() > MAX_IMAGE_URL_LENGTH {
            errors.push(FieldError::new(
                "image_url",
                format!("must be at most {MAX_IMAGE_URL_LENGTH} characters"),
            ));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(FieldError::new("image_url", "must be an http(s) URL"));
        }
    }

    match name {
        Some(name) if errors.is_empty() => Ok(NewCharacter {
            name,
            image_url: image_url.map(str::to_string),
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

fn required_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Option<String> {
    let Some(value) = value else {
        errors.push(FieldError::new(field, "is required"));
        return None;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
        return None;
    }
    if trimmed.chars().count() > max_len {
        errors.push(FieldError::new(
            field,
            format!("must be at most {max_len} characters"),
        ));
        return None;
    }
    Some(trimmed.to_string())
}

fn non_negative(errors: &mut Vec<FieldError>, field: &str, value: Option<i64>) {
    if matches!(value, Some(v) if v < 0) {
        errors.push(FieldError::new(field, "must be a non-negative integer"));
    }
}
