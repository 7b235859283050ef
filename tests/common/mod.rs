#![allow(dead_code)]

use std::time::Duration;

use seinfeld_quotes::db::setup_database;
use seinfeld_quotes::models::NewQuotePayload;
use seinfeld_quotes::store::QuoteStore;
use seinfeld_quotes::validation::{validate_new_quote, NewQuote};
use sqlx::SqlitePool;

pub async fn memory_pool() -> SqlitePool {
    setup_database("sqlite::memory:", 1, Duration::from_secs(5))
        .await
        .expect("in-memory database")
}

pub async fn memory_store() -> QuoteStore {
    QuoteStore::new(memory_pool().await)
}

pub fn new_quote(character: &str, quote: &str, season: i64, episode: i64) -> NewQuote {
    validate_new_quote(&NewQuotePayload {
        character: Some(character.to_string()),
        quote: Some(quote.to_string()),
        season: Some(season),
        episode: Some(episode),
    })
    .expect("valid quote")
}

///Five George quotes in season 4 plus a handful of others
pub async fn seeded_store() -> QuoteStore {
    let store = memory_store().await;
    let quotes = vec![
        new_quote("George", "I was in the pool!", 4, 1),
        new_quote("Jerry", "Who's gonna turn down a Junior Mint?", 4, 20),
        new_quote("George", "It's not a lie if you believe it.", 4, 2),
        new_quote("George", "I'm much more comfortable criticizing people behind their backs.", 4, 3),
        new_quote("Elaine", "Get out!", 5, 4),
        new_quote("george", "The sea was angry that day, my friends.", 4, 4),
        new_quote("Kramer", "I'm out there, Jerry, and I'm loving every minute of it!", 6, 1),
        new_quote("George", "Worlds are colliding!", 4, 5),
    ];
    store.insert_batch(&quotes).await.expect("seed quotes");
    store
}
