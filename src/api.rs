use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};
use futures_util::stream::TryStreamExt;
use serde_json::json;

use crate::auth::Authorized;
use crate::error::{AppError, FieldError};
use crate::importer::{self, DEFAULT_BATCH_SIZE};
use crate::models::{NewCharacterPayload, NewQuotePayload, Page, QuoteCriteria, QuoteUpdatePayload};
use crate::query;
use crate::state::AppState;
use crate::validation::{validate_new_character, validate_new_quote, validate_quote_update};

type ApiResult = Result<HttpResponse, AppError>;

///Endpoint to check that the service can reach its database
#[get("/health")]
async fn health(state: web::Data<AppState>) -> ApiResult {
    state.store.ping().await?;
    Ok(HttpResponse::Ok().json(json!({"status": "ok"})))
}

///Endpoint to get a list of characters
#[get("/characters")]
async fn get_characters(state: web::Data<AppState>) -> ApiResult {
    let characters = state.store.list_characters().await?;
    Ok(HttpResponse::Ok().json(characters))
}

#[get("/characters/{id}")]
async fn get_character(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult {
    let character = state.store.get_character(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(character))
}

#[post("/characters")]
async fn create_character(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Json<NewCharacterPayload>,
) -> ApiResult {
    let new_character = validate_new_character(&body)?;
    let character = state.store.create_character(&new_character).await?;
    Ok(HttpResponse::Created().json(character))
}

///Endpoint to list quotes a page at a time, optionally filtered by character, season, episode, and keyword
#[get("/quotes")]
async fn list_quotes(state: web::Data<AppState>, criteria: web::Query<QuoteCriteria>) -> ApiResult {
    let descriptor = query::resolve(&criteria, state.page_limits)?;
    let (items, total) = state.store.list(&descriptor).await?;
    Ok(HttpResponse::Ok().json(Page {
        items,
        total,
        page: descriptor.page,
        page_size: descriptor.page_size,
    }))
}

#[get("/quotes/{id}")]
async fn get_quote(state: web::Data<AppState>, id: web::Path<i64>) -> ApiResult {
    let quote = state.store.get(id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(quote))
}

#[post("/quotes")]
async fn create_quote(
    _auth: Authorized,
    state: web::Data<AppState>,
    body: web::Json<NewQuotePayload>,
) -> ApiResult {
    let new_quote = validate_new_quote(&body)?;
    let quote = state.store.create(&new_quote).await?;
    Ok(HttpResponse::Created().json(quote))
}

#[put("/quotes/{id}")]
async fn update_quote(
    _auth: Authorized,
    state: web::Data<AppState>,
    id: web::Path<i64>,
    body: web::Json<QuoteUpdatePayload>,
) -> ApiResult {
    let update = validate_quote_update(&body)?;
    let quote = state.store.update(id.into_inner(), &update).await?;
    Ok(HttpResponse::Ok().json(quote))
}

#[delete("/quotes/{id}")]
async fn delete_quote(
    _auth: Authorized,
    state: web::Data<AppState>,
    id: web::Path<i64>,
) -> ApiResult {
    state.store.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

///Endpoint to get a random quote, using the same filters as listing
#[get("/random")]
async fn get_random_quote(
    state: web::Data<AppState>,
    criteria: web::Query<QuoteCriteria>,
) -> ApiResult {
    let predicates = query::resolve_predicates(&criteria);
    let quote = state.store.pick_random(&predicates).await?;
    Ok(HttpResponse::Ok().json(quote))
}

///Endpoint to get quote totals per character
#[get("/stats")]
async fn get_stats(state: web::Data<AppState>) -> ApiResult {
    let stats = state.store.stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

///Endpoint to seed quotes from an uploaded CSV in the `file` field
#[post("/import")]
async fn import_quotes(
    _auth: Authorized,
    state: web::Data<AppState>,
    mut payload: Multipart,
) -> ApiResult {
    let mut contents: Option<Vec<u8>> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::invalid_parameter("file", e.to_string()))?
    {
        if field.content_disposition().and_then(|cd| cd.get_name()) != Some("file") {
            continue;
        }

        let buffer = contents.get_or_insert_with(Vec::new);
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::invalid_parameter("file", e.to_string()))?
        {
            if buffer.len() + chunk.len() > state.max_upload_bytes {
                return Err(AppError::invalid_parameter(
                    "file",
                    format!("upload exceeds {} bytes", state.max_upload_bytes),
                ));
            }
            buffer.extend_from_slice(&chunk);
        }
    }

    let Some(contents) = contents else {
        return Err(AppError::invalid_parameter("file", "no file uploaded"));
    };

    let report = importer::import_csv(&state.store, contents.as_slice(), DEFAULT_BATCH_SIZE).await?;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped.len(),
        "imported uploaded csv"
    );
    Ok(HttpResponse::Ok().json(report))
}

///Defines /api scope, routes extractor failures through `AppError`, and registers endpoints
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::invalid_parameter("query", err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::invalid_parameter("path", err.to_string()).into()
            }))
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                AppError::Validation(vec![FieldError::new("body", err.to_string())]).into()
            }))
            .service(health)
            .service(get_characters)
            .service(get_character)
            .service(create_character)
            .service(list_quotes)
            .service(get_quote)
            .service(create_quote)
            .service(update_quote)
            .service(delete_quote)
            .service(get_random_quote)
            .service(get_stats)
            .service(import_quotes),
    );
}
