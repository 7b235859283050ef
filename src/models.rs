use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

//Represents a single speaker
#[derive(Clone, FromRow, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub image_url: Option<String>,
}

//Represents a single quote joined with its speaker's name
#[derive(Clone, FromRow, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Quote {
    pub id: i64,
    pub character_id: i64,
    pub character: String,
    pub quote: String,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub created_at: DateTime<Utc>,
}

//Criteria for listing quotes or picking a random one; unknown keys are ignored
#[derive(Clone, Debug, Default, Deserialize)]
pub struct QuoteCriteria {
    pub character: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
    pub keyword: Option<String>,
    pub page: Option<i64>,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: Option<i64>,
}

//Body of a create request, every field optional so missing ones can be reported per field
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewQuotePayload {
    pub character: Option<String>,
    pub quote: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
}

//Body of a partial update
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuoteUpdatePayload {
    pub quote: Option<String>,
    pub season: Option<i64>,
    pub episode: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCharacterPayload {
    pub name: Option<String>,
    pub image_url: Option<String>,
}

//One window of list results
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Clone, FromRow, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct CharacterQuoteCount {
    pub name: String,
    pub quote_count: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct QuoteStats {
    pub total: i64,
    pub characters: Vec<CharacterQuoteCount>,
}
