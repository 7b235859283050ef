//! Data access for quotes and characters.
//!
//! Every method borrows a connection from the pool (or opens a transaction)
//! for the duration of one call; it goes back to the pool on every exit path.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::error::{AppError, Result};
use crate::models::{Character, CharacterQuoteCount, Quote, QuoteStats};
use crate::query::{Predicate, QueryDescriptor};
use crate::random;
use crate::validation::{NewCharacter, NewQuote, QuoteUpdate};

const QUOTE_SELECT: &str = r#"
    SELECT
        q.id,
        q.character_id,
        c.name AS "character",
        q.quote,
        q.season,
        q.episode,
        q.created_at
    FROM quotes q
    JOIN characters c ON c.id = q.character_id
"#;

const QUOTE_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM quotes q
    JOIN characters c ON c.id = q.character_id
"#;

#[derive(Clone, Debug)]
pub struct QuoteStore {
    pool: SqlitePool,
}

impl QuoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    ///Returns one page of matching quotes ordered by id, plus the total match count
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, descriptor: &QueryDescriptor) -> Result<(Vec<Quote>, i64)> {
        let mut tx = self.pool.begin().await?;

        let total = count_matching(&mut tx, &descriptor.predicates).await?;

        let mut builder = QueryBuilder::<Sqlite>::new(QUOTE_SELECT);
        push_filters(&mut builder, &descriptor.predicates);
        builder
            .push(" ORDER BY q.id ASC LIMIT ")
            .push_bind(descriptor.limit())
            .push(" OFFSET ")
            .push_bind(descriptor.offset());

        let items = builder
            .build_query_as::<Quote>()
            .fetch_all(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when listing quotes"))?;

        tx.commit().await?;
        Ok((items, total))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Quote> {
        let mut conn = self.pool.acquire().await?;
        fetch_quote(&mut conn, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("quote {id}")))
    }

    ///Picks one quote uniformly at random among every quote matching `predicates`
    #[tracing::instrument(skip(self))]
    pub async fn pick_random(&self, predicates: &[Predicate]) -> Result<Quote> {
        //count and fetch share one read transaction so the offset stays in range
        let mut tx = self.pool.begin().await?;

        let total = count_matching(&mut tx, predicates).await?;
        let offset = random::uniform_offset(&mut rand::thread_rng(), total);
        let Some(offset) = offset else {
            return Err(AppError::NotFound("matching quote".to_string()));
        };

        let mut builder = QueryBuilder::<Sqlite>::new(QUOTE_SELECT);
        push_filters(&mut builder, predicates);
        builder
            .push(" ORDER BY q.id ASC LIMIT 1 OFFSET ")
            .push_bind(offset);

        let quote = builder
            .build_query_as::<Quote>()
            .fetch_optional(&mut *tx)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when picking a random quote"))?;

        tx.commit().await?;
        quote.ok_or_else(|| AppError::NotFound("matching quote".to_string()))
    }

    ///Inserts a validated quote, creating its character on first use
    #[tracing::instrument(skip(self))]
    pub async fn create(&self, new_quote: &NewQuote) -> Result<Quote> {
        let mut tx = self.pool.begin().await?;
        let id = insert_quote(&mut tx, new_quote).await?;
        let quote = fetch_quote(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("quote {id}")))?;
        tx.commit().await?;

        tracing::info!(id, character = %quote.character, "created quote");
        Ok(quote)
    }

    ///Applies the supplied fields and leaves the rest untouched
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: i64, update: &QuoteUpdate) -> Result<Quote> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET
                quote = COALESCE(?, quote),
                season = COALESCE(?, season),
                episode = COALESCE(?, episode)
            WHERE id = ?
            "#,
        )
        .bind(update.quote.as_deref())
        .bind(update.season)
        .bind(update.episode)
        .bind(id)
        .execute(&mut *tx)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when updating quote"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("quote {id}")));
        }

        let quote = fetch_quote(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("quote {id}")))?;
        tx.commit().await?;
        Ok(quote)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when deleting quote"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("quote {id}")));
        }
        tracing::info!(id, "deleted quote");
        Ok(())
    }

    ///Inserts a batch of quotes in a single transaction; nothing is written if any row fails
    #[tracing::instrument(skip_all, fields(rows = quotes.len()))]
    pub async fn insert_batch(&self, quotes: &[NewQuote]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for quote in quotes {
            insert_quote(&mut tx, quote).await?;
        }
        tx.commit().await?;
        Ok(quotes.len())
    }

    ///Removes every quote; characters are kept
    pub async fn clear_quotes(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM quotes")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_characters(&self) -> Result<Vec<Character>> {
        let characters = sqlx::query_as::<_, Character>(
            "SELECT id, name, image_url FROM characters ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching characters"))?;
        Ok(characters)
    }

    pub async fn get_character(&self, id: i64) -> Result<Character> {
        sqlx::query_as::<_, Character>("SELECT id, name, image_url FROM characters WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("character {id}")))
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_character(&self, new_character: &NewCharacter) -> Result<Character> {
        sqlx::query_as::<_, Character>(
            "INSERT INTO characters (name, image_url) VALUES (?, ?) RETURNING id, name, image_url",
        )
        .bind(&new_character.name)
        .bind(new_character.image_url.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("character `{}` already exists", new_character.name))
            }
            other => other,
        })
    }

    ///Total quote count and per-character counts, busiest speaker first
    pub async fn stats(&self) -> Result<QuoteStats> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&mut *tx)
            .await?;
        let characters = sqlx::query_as::<_, CharacterQuoteCount>(
            r#"
            SELECT c.name, COUNT(q.id) AS quote_count
            FROM characters c
            LEFT JOIN quotes q ON q.character_id = c.id
            GROUP BY c.id, c.name
            ORDER BY quote_count DESC, c.name ASC
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(QuoteStats { total, characters })
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

async fn fetch_quote(conn: &mut SqliteConnection, id: i64) -> Result<Option<Quote>> {
    let quote = sqlx::query_as::<_, Quote>(&format!("{QUOTE_SELECT} WHERE q.id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, id, "an error occurred when fetching quote"))?;
    Ok(quote)
}

async fn count_matching(conn: &mut SqliteConnection, predicates: &[Predicate]) -> Result<i64> {
    let mut builder = QueryBuilder::<Sqlite>::new(QUOTE_COUNT);
    push_filters(&mut builder, predicates);
    let total = builder
        .build_query_scalar::<i64>()
        .fetch_one(&mut *conn)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when counting quotes"))?;
    Ok(total)
}

async fn upsert_character(conn: &mut SqliteConnection, name: &str) -> Result<i64> {
    //names are unique case-insensitively; the first spelling stored wins
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO characters (name) VALUES (?) ON CONFLICT(name) DO UPDATE SET name = characters.name RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;
    Ok(id)
}

async fn insert_quote(conn: &mut SqliteConnection, quote: &NewQuote) -> Result<i64> {
    let character_id = upsert_character(conn, &quote.character).await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO quotes (character_id, quote, season, episode, created_at) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(character_id)
    .bind(&quote.quote)
    .bind(quote.season)
    .bind(quote.episode)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when inserting quote"))?;
    Ok(id)
}

///Appends the WHERE clause for `predicates`, all joined with AND
fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Character(name) => {
                builder
                    .push("c.name = ")
                    .push_bind(name.clone())
                    .push(" COLLATE NOCASE");
            }
            Predicate::Season(season) => {
                builder.push("q.season = ").push_bind(*season);
            }
            Predicate::Episode(episode) => {
                builder.push("q.episode = ").push_bind(*episode);
            }
            Predicate::Keyword(keyword) => {
                builder
                    .push("q.quote LIKE ")
                    .push_bind(like_pattern(keyword))
                    .push(" ESCAPE '\\'");
            }
        }
    }
}

//LIKE is case-insensitive for ASCII in SQLite; wildcards in the keyword are matched literally
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for ch in keyword.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("yada"), "%yada%");
        assert_eq!(like_pattern("100%_\\"), "%100\\%\\_\\\\%");
    }

    #[test]
    fn filters_join_with_and() {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT 1 FROM quotes q");
        push_filters(
            &mut builder,
            &[
                Predicate::Character("Jerry".into()),
                Predicate::Season(3),
                Predicate::Keyword("soup".into()),
            ],
        );
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM quotes q WHERE c.name = ? COLLATE NOCASE AND q.season = ? AND q.quote LIKE ? ESCAPE '\\'"
        );
    }

    #[test]
    fn no_predicates_means_no_where_clause() {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT 1");
        push_filters(&mut builder, &[]);
        assert_eq!(builder.sql(), "SELECT 1");
    }
}
