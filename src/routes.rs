use rocket::http::Status;
use rocket::serde::json::{json, Json, Value};
use rocket::{catch, catchers, get, post, routes, Catcher, Request, Route, State};

use crate::config::AppConfig;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::format::format_credits;
use crate::models::*;
use crate::visibility::{build_segments, summarize, BrandRoster};

/// Run blocking database work off the async workers
async fn blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Task(e.to_string()))?
}

// =====================
// Service Routes
// =====================

#[get("/health")]
pub fn health() -> Json<Health> {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =====================
// Report Routes
// =====================

#[get("/reports?<group_id>")]
pub async fn api_reports(group_id: Option<i64>, config: &State<AppConfig>) -> AppResult<Json<Vec<Report>>> {
    let config = config.inner().clone();
    let reports = blocking(move || {
        let conn = db::open(&config)?;
        db::list_reports(&conn, group_id)
    })
    .await?;
    Ok(Json(reports))
}

#[get("/reports/<id>")]
pub async fn api_report(id: i64, config: &State<AppConfig>) -> AppResult<Json<ReportDetail>> {
    let config = config.inner().clone();
    let detail = blocking(move || {
        let conn = db::open(&config)?;
        let report = db::get_report(&conn, id)?;
        let items = db::get_report_items(&conn, id)?;
        Ok(ReportDetail {
            cost_display: format_credits(report.cost_credits, &config.credit_format),
            report,
            items,
        })
    })
    .await?;
    Ok(Json(detail))
}

#[get("/reports/<id>/summary")]
pub async fn api_report_summary(id: i64, config: &State<AppConfig>) -> AppResult<Json<ReportSummary>> {
    let config = config.inner().clone();
    let summary = blocking(move || {
        let conn = db::open(&config)?;
        let report = db::get_report(&conn, id)?;
        let items = db::get_report_items(&conn, id)?;
        let statistics = db::get_report_statistics(&conn, id)?;

        let roster = BrandRoster::new(report.target_brand, report.competitors);
        Ok(summarize(&items, &roster, statistics.as_ref()))
    })
    .await?;

    tracing::info!(
        report_id = id,
        source = ?summary.source,
        answered = summary.answered_items,
        "report summary served"
    );
    Ok(Json(summary))
}

#[get("/reports/<id>/items/<prompt_id>/segments")]
pub async fn api_item_segments(
    id: i64,
    prompt_id: i64,
    config: &State<AppConfig>,
) -> AppResult<Json<Vec<TextSegment>>> {
    let config = config.inner().clone();
    let item = blocking(move || {
        let conn = db::open(&config)?;
        db::get_report_item(&conn, id, prompt_id)
    })
    .await?;

    let Some(answer) = item.answer else {
        return Err(AppError::NotFound(format!(
            "answer for prompt {} in report {}",
            prompt_id, id
        )));
    };
    Ok(Json(build_segments(
        &answer.response,
        item.brand_mentions.as_deref(),
        item.domain_mentions.as_deref(),
    )))
}

// =====================
// Stateless Routes
// =====================

#[post("/highlight", format = "json", data = "<request>")]
pub fn api_highlight(request: Json<HighlightRequest>) -> Json<Vec<TextSegment>> {
    let request = request.into_inner();
    Json(build_segments(
        &request.response,
        request.brand_mentions.as_deref(),
        request.domain_mentions.as_deref(),
    ))
}

#[post("/summary", format = "json", data = "<request>")]
pub fn api_summary(request: Json<SummaryRequest>) -> AppResult<Json<ReportSummary>> {
    let request = request.into_inner();
    if request.target_brand.trim().is_empty() {
        return Err(AppError::InvalidInput("target_brand must not be blank".to_string()));
    }

    let roster = BrandRoster::new(request.target_brand, request.competitors);
    Ok(Json(summarize(&request.items, &roster, request.statistics.as_ref())))
}

// =====================
// User Routes
// =====================

#[get("/users/<id>/balance")]
pub async fn api_user_balance(id: i64, config: &State<AppConfig>) -> AppResult<Json<UserBalance>> {
    let config = config.inner().clone();
    let balance = blocking(move || {
        let conn = db::open(&config)?;
        let (email, credits) = db::get_user_balance(&conn, id)?;
        Ok(UserBalance {
            user_id: id,
            email,
            credits,
            display: format_credits(credits, &config.credit_format),
        })
    })
    .await?;
    Ok(Json(balance))
}

// =====================
// Catchers
// =====================

#[catch(default)]
pub fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<Value>) {
    tracing::debug!(uri = %req.uri(), status = status.code, "unhandled request");
    (status, Json(json!({ "error": status.reason_lossy() })))
}

// =====================
// Route Collections
// =====================

pub fn index_routes() -> Vec<Route> {
    routes![health]
}

pub fn api_routes() -> Vec<Route> {
    routes![
        api_reports,
        api_report,
        api_report_summary,
        api_item_segments,
        api_highlight,
        api_summary,
        api_user_balance,
    ]
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}
