//! CSV seeding: `quote, character, season, episode` rows, header skipped.
//!
//! Bad rows are skipped and reported by line number; the rest are loaded in
//! batches, each batch in its own transaction.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::NewQuotePayload;
use crate::store::QuoteStore;
use crate::validation::{validate_new_quote, NewQuote};

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ParsedCsv {
    pub quotes: Vec<NewQuote>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: Vec<SkippedRow>,
}

///Reads every row, keeping the valid ones. Only I/O failures abort the parse.
pub fn parse_csv<R: Read>(reader: R) -> Result<ParsedCsv> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut parsed = ParsedCsv::default();
    for record in csv_reader.records() {
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(AppError::Csv(err)),
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or(0);
                tracing::warn!(line, err = %err, "skipping unreadable row");
                parsed.skipped.push(SkippedRow {
                    line,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match row_to_quote(&record) {
            Ok(quote) => parsed.quotes.push(quote),
            Err(reason) => {
                tracing::warn!(line, reason = %reason, "skipping row");
                parsed.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    tracing::info!(
        rows = parsed.quotes.len(),
        skipped = parsed.skipped.len(),
        "read quotes from csv"
    );
    Ok(parsed)
}

fn row_to_quote(record: &StringRecord) -> std::result::Result<NewQuote, String> {
    if record.len() < 4 {
        return Err(format!("expected 4 columns, found {}", record.len()));
    }

    let payload = NewQuotePayload {
        quote: record.get(0).map(str::to_string),
        character: record.get(1).map(str::to_string),
        season: optional_number("season", record.get(2))?,
        episode: optional_number("episode", record.get(3))?,
    };

    validate_new_quote(&payload).map_err(|err| match err {
        AppError::Validation(fields) => fields
            .iter()
            .map(|f| format!("{} {}", f.field, f.reason))
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    })
}

fn optional_number(field: &str, value: Option<&str>) -> std::result::Result<Option<i64>, String> {
    match value.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("invalid {field} `{raw}`")),
    }
}

///Writes parsed quotes through the store, `batch_size` rows per transaction
pub async fn load(store: &QuoteStore, parsed: ParsedCsv, batch_size: usize) -> Result<ImportReport> {
    let total = parsed.quotes.len();
    let mut inserted = 0;

    for batch in parsed.quotes.chunks(batch_size.max(1)) {
        let count = store
            .insert_batch(batch)
            .await
            .inspect_err(|e| tracing::error!(err = ?e, inserted, "an error occurred when inserting batch"))?;
        inserted += count;
        tracing::info!("inserted batch: {inserted}/{total} records");
    }

    Ok(ImportReport {
        inserted,
        skipped: parsed.skipped,
    })
}

pub async fn import_csv<R: Read>(
    store: &QuoteStore,
    reader: R,
    batch_size: usize,
) -> Result<ImportReport> {
    let parsed = parse_csv(reader)?;
    load(store, parsed, batch_size).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
quote,character,season,episode
\"Yada yada yada.\",George,8,19
\"No soup for you, come back one year!\",Soup Nazi,7,6
\"He said \"\"serenity now\"\"\",Frank,9,3
Short row,Kramer
Bad season,Elaine,four,2
,Jerry,1,1
Undated line,Newman,,
";

    #[test]
    fn parses_valid_rows_and_reports_the_rest() {
        let parsed = parse_csv(SAMPLE.as_bytes()).unwrap();

        assert_eq!(parsed.quotes.len(), 4);
        assert_eq!(
            parsed.quotes[0],
            NewQuote {
                character: "George".into(),
                quote: "Yada yada yada.".into(),
                season: Some(8),
                episode: Some(19),
            }
        );
        assert_eq!(parsed.quotes[1].quote, "No soup for you, come back one year!");
        assert_eq!(parsed.quotes[2].quote, "He said \"serenity now\"");
        assert_eq!(parsed.quotes[3].season, None);
        assert_eq!(parsed.quotes[3].episode, None);

        let lines: Vec<u64> = parsed.skipped.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![5, 6, 7]);
        assert!(parsed.skipped[0].reason.contains("4 columns"));
        assert!(parsed.skipped[1].reason.contains("invalid season"));
        assert!(parsed.skipped[2].reason.contains("quote"));
    }

    #[test]
    fn header_only_file_yields_nothing() {
        let parsed = parse_csv("quote,character,season,episode\n".as_bytes()).unwrap();
        assert!(parsed.quotes.is_empty());
        assert!(parsed.skipped.is_empty());
    }
}
