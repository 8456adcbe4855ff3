use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::notes::{CalendarCell, build_month_cells};
use crate::model::attendance::{AttendanceRecord, AttendanceRow};
use crate::model::daily_log::DailyLog;
use crate::model::leave_request::{LeaveRequest, LeaveRow};

#[derive(Deserialize, IntoParams)]
pub struct LogFilter {
    /// Single day (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2024-05-10")]
    pub date: Option<NaiveDate>,
    /// Whole month; requires `year`
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams)]
pub struct MonthQuery {
    pub month: u32,
    pub year: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLog {
    #[schema(example = "2024-05-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "[결근] 홍길동")]
    pub content: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLog {
    #[schema(example = 11)]
    pub id: u64,
    #[schema(example = "[지각] 홍길동")]
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct LogListResponse {
    pub logs: Vec<DailyLog>,
}

#[derive(Serialize, ToSchema)]
pub struct CalendarResponse {
    pub cells: Vec<CalendarCell>,
}

const LOG_COLUMNS: &str = "id, date, content, author, created_at";

/// Notes for a day or a month
#[utoipa::path(
    get,
    path = "/api/logs",
    params(LogFilter),
    responses(
        (status = 200, description = "Matching notes", body = LogListResponse),
        (status = 400, description = "Missing filters"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn list_logs(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LogFilter>,
) -> actix_web::Result<impl Responder> {
    let logs = if let Some(date) = query.date {
        sqlx::query_as::<_, DailyLog>(&format!(
            "SELECT {} FROM daily_logs WHERE date = ? ORDER BY created_at",
            LOG_COLUMNS
        ))
        .bind(date)
        .fetch_all(pool.get_ref())
        .await
    } else if let (Some(month), Some(year)) = (query.month, query.year) {
        sqlx::query_as::<_, DailyLog>(&format!(
            "SELECT {} FROM daily_logs WHERE MONTH(date) = ? AND YEAR(date) = ? ORDER BY date, created_at",
            LOG_COLUMNS
        ))
        .bind(month)
        .bind(year)
        .fetch_all(pool.get_ref())
        .await
    } else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Provide date or month/year"
        })));
    };

    let logs = logs.map_err(|e| {
        error!(error = %e, "Failed to fetch logs");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(LogListResponse { logs }))
}

/// Month calendar: grouped badges, leaves and overtime per day
#[utoipa::path(
    get,
    path = "/api/logs/calendar",
    params(MonthQuery),
    responses(
        (status = 200, description = "One cell per day of the month", body = CalendarResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn month_calendar(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let (month, year) = (query.month, query.year);

    // Each source degrades to empty on a read failure; the calendar still
    // renders with whatever arrived.
    let logs = sqlx::query_as::<_, DailyLog>(&format!(
        "SELECT {} FROM daily_logs WHERE MONTH(date) = ? AND YEAR(date) = ?",
        LOG_COLUMNS
    ))
    .bind(month)
    .bind(year)
    .fetch_all(pool.get_ref())
    .await
    .unwrap_or_else(|e| {
        warn!(error = %e, month, year, "Log fetch failed; calendar renders without notes");
        Vec::new()
    });

    let (month_start, month_end) = match crate::api::attendance::month_bounds(year, month) {
        Some(bounds) => bounds,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid month/year"
            })));
        }
    };

    let leaves: Vec<LeaveRequest> = sqlx::query_as::<_, LeaveRow>(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, status, reason, created_at
        FROM leave_requests
        WHERE start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(month_end)
    .bind(month_start)
    .fetch_all(pool.get_ref())
    .await
    .unwrap_or_else(|e| {
        warn!(error = %e, month, year, "Leave fetch failed; calendar renders without leaves");
        Vec::new()
    })
    .into_iter()
    .filter_map(LeaveRow::into_request)
    .collect();

    let attendance: Vec<AttendanceRecord> = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT user_id, date, status, work_hours, overtime_hours
        FROM attendance
        WHERE MONTH(date) = ? AND YEAR(date) = ?
        "#,
    )
    .bind(month)
    .bind(year)
    .fetch_all(pool.get_ref())
    .await
    .unwrap_or_else(|e| {
        warn!(error = %e, month, year, "Attendance fetch failed; calendar renders without overtime");
        Vec::new()
    })
    .into_iter()
    .map(AttendanceRow::into_record)
    .collect();

    let cells = build_month_cells(year, month, &logs, &leaves, &attendance);

    Ok(HttpResponse::Ok().json(CalendarResponse { cells }))
}

/// Create a note
#[utoipa::path(
    post,
    path = "/api/logs",
    request_body = CreateLog,
    responses(
        (status = 200, description = "Note created"),
        (status = 400, description = "Empty content"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn create_log(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLog>,
) -> actix_web::Result<impl Responder> {
    let content = payload.content.trim();
    if content.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Content must not be empty"
        })));
    }

    sqlx::query("INSERT INTO daily_logs (date, content, author) VALUES (?, ?, ?)")
        .bind(payload.date)
        .bind(content)
        .bind(&auth.username)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, date = %payload.date, "Failed to create log");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Log created" })))
}

/// Edit a note's content
#[utoipa::path(
    put,
    path = "/api/logs",
    request_body = UpdateLog,
    responses(
        (status = 200, description = "Note updated"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn update_log(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateLog>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query("UPDATE daily_logs SET content = ? WHERE id = ?")
        .bind(payload.content.trim())
        .bind(payload.id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, log_id = payload.id, "Failed to update log");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Log not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Log updated" })))
}

/// Delete a note
#[utoipa::path(
    delete,
    path = "/api/logs/{id}",
    params(("id" = u64, Path, description = "Log id")),
    responses(
        (status = 200, description = "Note deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn delete_log(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let log_id = path.into_inner();

    let result = sqlx::query("DELETE FROM daily_logs WHERE id = ?")
        .bind(log_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, log_id, "Failed to delete log");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Log not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Log deleted" })))
}
