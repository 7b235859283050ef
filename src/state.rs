use crate::config::Config;
use crate::query::PageLimits;
use crate::store::QuoteStore;

//Shared by every handler through `web::Data`
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: QuoteStore,
    pub page_limits: PageLimits,
    pub api_token: Option<String>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(store: QuoteStore, config: &Config) -> Self {
        Self {
            store,
            page_limits: config.page_limits,
            api_token: config.api_token.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}
