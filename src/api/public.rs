use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::IntoParams;

use crate::api::daily_log::LogListResponse;
use crate::model::daily_log::DailyLog;
use crate::model::roster::{Roster, RosterAssignmentRow};
use crate::utils::user_cache;

#[derive(Deserialize, IntoParams)]
pub struct PublicRosterQuery {
    #[param(value_type = String, example = "2024-05-10")]
    pub date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct PublicLogQuery {
    pub month: u32,
    pub year: i32,
}

/// Read-only roster mirror for the unauthenticated view page. Only approved
/// users' assignments appear; special crews are omitted.
#[utoipa::path(
    get,
    path = "/public/roster",
    params(PublicRosterQuery),
    responses((status = 200, description = "The day's assignments, approved users only")),
    tag = "Public"
)]
pub async fn public_roster(
    pool: web::Data<MySqlPool>,
    query: web::Query<PublicRosterQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date;

    let rows = sqlx::query_as::<_, RosterAssignmentRow>(
        r#"
        SELECT ra.user_id, ra.team, ra.position
        FROM roster_assignments ra
        JOIN users u ON u.id = ra.user_id
        WHERE ra.date = ? AND u.is_approved = TRUE
        "#,
    )
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch public roster");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut assignments: Vec<_> = rows
        .into_iter()
        .filter_map(|r| r.into_assignment())
        .collect();
    for a in &mut assignments {
        a.user_name = user_cache::name_of(pool.get_ref(), a.user_id).await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "roster": Roster {
            date,
            assignments,
            palette_team: None,
            cleaning_team: None,
        }
    })))
}

/// Read-only month notes mirror
#[utoipa::path(
    get,
    path = "/public/logs",
    params(PublicLogQuery),
    responses((status = 200, description = "The month's notes", body = LogListResponse)),
    tag = "Public"
)]
pub async fn public_logs(
    pool: web::Data<MySqlPool>,
    query: web::Query<PublicLogQuery>,
) -> actix_web::Result<impl Responder> {
    let logs = sqlx::query_as::<_, DailyLog>(
        r#"
        SELECT id, date, content, author, created_at
        FROM daily_logs
        WHERE MONTH(date) = ? AND YEAR(date) = ?
        ORDER BY date, created_at
        "#,
    )
    .bind(query.month)
    .bind(query.year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch public logs");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(LogListResponse { logs }))
}
