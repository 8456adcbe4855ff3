use std::collections::HashSet;

use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::editor::RosterEditor;
use crate::core::notes::{COVERAGE_NOTE_MARKER, coverage_note_content, understaffed_teams};
use crate::core::position::Position;
use crate::model::role::Role;
use crate::model::roster::{Roster, RosterAssignment, RosterAssignmentRow};
use crate::model::team::Team;
use crate::utils::user_cache;

#[derive(Deserialize, IntoParams)]
pub struct RosterQuery {
    /// Roster date (YYYY-MM-DD)
    #[param(value_type = String, example = "2024-05-10")]
    pub date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveAssignment {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "1조")]
    pub team: String,
    /// Canonical position name or a legacy alias (지게차, 상하차)
    #[schema(example = "포크")]
    pub position: String,
}

#[derive(Deserialize, ToSchema)]
pub struct SaveRosterReq {
    #[schema(example = "2024-05-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub assignments: Vec<SaveAssignment>,
    #[schema(example = 3, nullable = true)]
    pub palette_team_id: Option<u64>,
    #[schema(example = 5, nullable = true)]
    pub cleaning_team_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct SpecialRangeReq {
    #[schema(example = "2024-05-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-05-17", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = 3, nullable = true)]
    pub palette_team_id: Option<u64>,
    #[schema(example = 5, nullable = true)]
    pub cleaning_team_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct RosterResponse {
    pub roster: Roster,
}

async fn team_by_id(pool: &MySqlPool, id: Option<u64>) -> Option<Team> {
    let id = id?;
    sqlx::query_as::<_, Team>("SELECT id, name FROM teams WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()
}

pub async fn fetch_assignments(
    pool: &MySqlPool,
    date: NaiveDate,
) -> Result<Vec<RosterAssignment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RosterAssignmentRow>(
        r#"
        SELECT user_id, team, position
        FROM roster_assignments
        WHERE date = ?
        "#,
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    // rows with unrecognized positions are dropped, not surfaced
    Ok(rows.into_iter().filter_map(|r| r.into_assignment()).collect())
}

/// Approved leaves covering a date, as a membership set for the editor.
pub async fn on_leave_user_ids(
    pool: &MySqlPool,
    date: NaiveDate,
) -> Result<HashSet<u64>, sqlx::Error> {
    let ids = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT user_id
        FROM leave_requests
        WHERE status = 'APPROVED'
          AND start_date <= ?
          AND end_date >= ?
        "#,
    )
    .bind(date)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(ids.into_iter().collect())
}

/// Auto-create the day's coverage note if any full-size team is missing a
/// required position. Checked for existence first so a re-fetch never
/// duplicates the note.
async fn ensure_coverage_note(
    pool: &MySqlPool,
    date: NaiveDate,
    assignments: &[RosterAssignment],
    author: &str,
) {
    let teams = understaffed_teams(assignments);
    if teams.is_empty() {
        return;
    }

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM daily_logs WHERE date = ? AND content LIKE ?)",
    )
    .bind(date)
    .bind(format!("%{}%", COVERAGE_NOTE_MARKER))
    .fetch_one(pool)
    .await
    .unwrap_or(true); // on error assume present rather than duplicating

    if exists {
        return;
    }

    let content = coverage_note_content(&teams);
    if let Err(e) = sqlx::query("INSERT INTO daily_logs (date, content, author) VALUES (?, ?, ?)")
        .bind(date)
        .bind(&content)
        .bind(author)
        .execute(pool)
        .await
    {
        warn!(error = %e, %date, "Failed to create coverage note");
    }
}

/// One day's roster
#[utoipa::path(
    get,
    path = "/api/roster",
    params(RosterQuery),
    responses(
        (status = 200, description = "The day's assignments and special crews", body = RosterResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Roster"
)]
pub async fn get_roster(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RosterQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date;

    let mut assignments = fetch_assignments(pool.get_ref(), date).await.map_err(|e| {
        error!(error = %e, %date, "Failed to fetch roster");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    for a in &mut assignments {
        a.user_name = user_cache::name_of(pool.get_ref(), a.user_id).await;
    }

    let meta = sqlx::query_as::<_, (Option<u64>, Option<u64>)>(
        "SELECT palette_team_id, cleaning_team_id FROM rosters WHERE date = ?",
    )
    .bind(date)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, %date, "Failed to fetch roster meta");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    .unwrap_or((None, None));

    let palette_team = team_by_id(pool.get_ref(), meta.0).await;
    let cleaning_team = team_by_id(pool.get_ref(), meta.1).await;

    if auth.is_manager() {
        ensure_coverage_note(pool.get_ref(), date, &assignments, &auth.username).await;
    }

    Ok(HttpResponse::Ok().json(RosterResponse {
        roster: Roster {
            date,
            assignments,
            palette_team,
            cleaning_team,
        },
    }))
}

/// Replace a day's assignment set
#[utoipa::path(
    post,
    path = "/api/roster",
    request_body = SaveRosterReq,
    responses(
        (status = 200, description = "Roster replaced", body = Object, example = json!({
            "message": "Roster saved", "count": 12
        })),
        (status = 400, description = "Invalid assignment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Roster"
)]
pub async fn save_roster(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SaveRosterReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let req = payload.into_inner();
    let date = req.date;

    let on_leave = on_leave_user_ids(pool.get_ref(), date).await.map_err(|e| {
        error!(error = %e, %date, "Failed to fetch approved leaves");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Incoming slots replay through the editor so the roster invariants
    // (one slot per user, leave block, manager-only 관리) hold server-side.
    let mut editor = RosterEditor::new(date, Vec::new(), on_leave);
    for slot in &req.assignments {
        let position = match Position::canonicalize(&slot.position) {
            Some(p) => p,
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": format!("Unknown position: {}", slot.position)
                })));
            }
        };

        let role_id = sqlx::query_scalar::<_, u8>("SELECT role_id FROM users WHERE id = ?")
            .bind(slot.user_id)
            .fetch_optional(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = slot.user_id, "Failed to fetch user role");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

        let role = match role_id.and_then(Role::from_id) {
            Some(r) => r,
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": format!("Unknown user: {}", slot.user_id)
                })));
            }
        };

        if let Err(e) = editor.add(slot.user_id, None, role, &slot.team, position) {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": e.to_string(),
                "user_id": slot.user_id
            })));
        }
    }

    editor.set_special_teams(req.palette_team_id, req.cleaning_team_id);
    let save = editor.into_save();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let result: Result<u64, sqlx::Error> = async {
        sqlx::query("DELETE FROM roster_assignments WHERE date = ?")
            .bind(date)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO rosters (date, palette_team_id, cleaning_team_id)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                palette_team_id = VALUES(palette_team_id),
                cleaning_team_id = VALUES(cleaning_team_id)
            "#,
        )
        .bind(date)
        .bind(save.palette_team_id)
        .bind(save.cleaning_team_id)
        .execute(&mut *tx)
        .await?;

        let mut count = 0u64;
        for a in &save.assignments {
            sqlx::query(
                "INSERT INTO roster_assignments (date, user_id, team, position) VALUES (?, ?, ?, ?)",
            )
            .bind(date)
            .bind(a.user_id)
            .bind(&a.team)
            .bind(a.position.to_string())
            .execute(&mut *tx)
            .await?;
            count += 1;
        }
        Ok(count)
    }
    .await;

    let count = match result {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, %date, "Roster save failed");
            let _ = tx.rollback().await;
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    tx.commit().await.map_err(|e| {
        error!(error = %e, %date, "Roster commit failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Roster saved",
        "count": count
    })))
}

/// Apply palette/cleaning crews across a date range
///
/// Sequential per-date writes; on a mid-range failure the earlier dates stay
/// applied and the response names the date that failed.
#[utoipa::path(
    post,
    path = "/api/roster/special",
    request_body = SpecialRangeReq,
    responses(
        (status = 200, description = "Range applied (possibly partially)", body = Object, example = json!({
            "applied": 7, "failed_date": null
        })),
        (status = 400, description = "Bad range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Roster"
)]
pub async fn save_special_range(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<SpecialRangeReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let req = payload.into_inner();
    if req.start_date > req.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let mut applied = 0u32;
    let mut failed_date: Option<NaiveDate> = None;
    let mut day = req.start_date;
    while day <= req.end_date {
        let write = sqlx::query(
            r#"
            INSERT INTO rosters (date, palette_team_id, cleaning_team_id)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE
                palette_team_id = VALUES(palette_team_id),
                cleaning_team_id = VALUES(cleaning_team_id)
            "#,
        )
        .bind(day)
        .bind(req.palette_team_id)
        .bind(req.cleaning_team_id)
        .execute(pool.get_ref())
        .await;

        if let Err(e) = write {
            error!(error = %e, date = %day, "Special-team range save stopped");
            failed_date = Some(day);
            break;
        }
        applied += 1;
        day += Duration::days(1);
    }

    Ok(HttpResponse::Ok().json(json!({
        "applied": applied,
        "failed_date": failed_date
    })))
}
