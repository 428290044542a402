//! # Redirect Handler
//!
//! اصلی‌ترین مسیر برنامه: `GET /:code`

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    api::extractors::Referrer,
    error::{AppError, Result},
    models::ResolveOutcome,
    services::AppState,
};

/// پارامترهای query
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    /// `?ref=` روی header `Referer` اولویت داره
    #[serde(rename = "ref")]
    pub referrer: Option<String>,
}

/// Redirect به URL اصلی
///
/// # Endpoint
/// `GET /:code`
///
/// # Response
/// - 307 Temporary Redirect به URL اصلی
/// - 404 اگه پیدا نشه
/// - 410 اگه منقضی شده باشه
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Query(params): Query<RedirectParams>,
    Referrer(header_referrer): Referrer,
) -> Result<Response> {
    let referrer = params.referrer.or(header_referrer);

    match state
        .service
        .resolve_short_link(&code, referrer.as_deref())
        .await?
    {
        ResolveOutcome::Found(record) => {
            debug!(code = %code, target = %record.long_url, "Redirecting");
            Ok(Redirect::temporary(&record.long_url).into_response())
        }
        ResolveOutcome::Expired => Err(AppError::link_expired(&code)),
        ResolveOutcome::NotFound => Err(AppError::link_not_found(&code)),
    }
}
