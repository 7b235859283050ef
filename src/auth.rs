use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web, FromRequest, HttpRequest};

use crate::error::AppError;
use crate::state::AppState;

///Proof that the request carried the configured bearer token.
///Taking it as a handler argument guards the route; it is extracted before the body.
#[derive(Debug)]
pub struct Authorized;

impl FromRequest for Authorized {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let expected = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| state.api_token.as_deref());
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        ready(authorize(expected, header))
    }
}

fn authorize(expected: Option<&str>, header: Option<&str>) -> Result<Authorized, AppError> {
    let token = header.and_then(bearer_token).ok_or(AppError::Unauthorized)?;

    match expected {
        Some(expected) if expected == token => Ok(Authorized),
        Some(_) => {
            tracing::warn!("rejected mutation with an unknown token");
            Err(AppError::Forbidden)
        }
        //no token configured: mutations are switched off
        None => Err(AppError::Forbidden),
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}
