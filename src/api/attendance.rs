use std::collections::{BTreeSet, HashMap, HashSet};

use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::core::reconcile::{self, DayStats, EffectiveAttendance};
use crate::model::attendance::{AttendanceRecord, AttendanceRow, AttendanceStatus};

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceFilter {
    /// Single-day view (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2024-05-10")]
    pub date: Option<NaiveDate>,
    /// Range view, inclusive
    #[param(value_type = Option<String>)]
    pub start_date: Option<NaiveDate>,
    #[param(value_type = Option<String>)]
    pub end_date: Option<NaiveDate>,
    /// Month view; requires `year`
    pub month: Option<u32>,
    pub year: Option<i32>,
    /// Restrict to one user
    pub user_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpsertAttendance {
    #[schema(example = 42)]
    pub user_id: u64,
    #[schema(example = "2024-05-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "PRESENT", value_type = String)]
    pub status: AttendanceStatus,
    #[schema(example = 8.0)]
    pub work_hours: f64,
    #[schema(example = 0.0)]
    pub overtime_hours: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct BatchUpsert {
    pub records: Vec<UpsertAttendance>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceResponse {
    pub attendance: Vec<EffectiveAttendance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<DayStats>,
}

async fn fetch_records(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
    user_id: Option<u64>,
) -> Vec<AttendanceRecord> {
    let mut sql = String::from(
        "SELECT user_id, date, status, work_hours, overtime_hours
         FROM attendance WHERE date BETWEEN ? AND ?",
    );
    if user_id.is_some() {
        sql.push_str(" AND user_id = ?");
    }

    let mut query = sqlx::query_as::<_, AttendanceRow>(&sql).bind(start).bind(end);
    if let Some(uid) = user_id {
        query = query.bind(uid);
    }

    // Read failures degrade to "no data" rather than erroring the view.
    match query.fetch_all(pool).await {
        Ok(rows) => rows.into_iter().map(AttendanceRow::into_record).collect(),
        Err(e) => {
            warn!(error = %e, %start, %end, "Attendance fetch failed; zero-filling");
            Vec::new()
        }
    }
}

/// Roster membership per date over a range, one query per date, joined before
/// reconciliation proceeds. A failed date degrades to an empty roster.
async fn fetch_membership(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
) -> HashMap<NaiveDate, HashSet<u64>> {
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day);
        day += Duration::days(1);
    }

    let fetches = dates.iter().map(|&d| {
        let pool = pool.clone();
        async move {
            let ids = sqlx::query_scalar::<_, u64>(
                "SELECT user_id FROM roster_assignments WHERE date = ?",
            )
            .bind(d)
            .fetch_all(&pool)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, date = %d, "Roster fetch failed; treating as empty");
                Vec::new()
            });
            (d, ids.into_iter().collect::<HashSet<u64>>())
        }
    });

    futures::future::join_all(fetches).await.into_iter().collect()
}

fn reconcile_range(
    start: NaiveDate,
    end: NaiveDate,
    records: &[AttendanceRecord],
    membership: &HashMap<NaiveDate, HashSet<u64>>,
    user_filter: Option<u64>,
    now: chrono::NaiveDateTime,
) -> Vec<EffectiveAttendance> {
    let mut by_key: HashMap<(u64, NaiveDate), &AttendanceRecord> = HashMap::new();
    for rec in records {
        by_key.insert((rec.user_id, rec.date), rec);
    }

    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        let members = membership.get(&day);

        // union of explicit records and roster members for the day
        let mut user_ids: BTreeSet<u64> = records
            .iter()
            .filter(|r| r.date == day)
            .map(|r| r.user_id)
            .collect();
        if let Some(members) = members {
            user_ids.extend(members.iter().copied());
        }

        for uid in user_ids {
            if user_filter.is_some_and(|f| f != uid) {
                continue;
            }
            let record = by_key.get(&(uid, day)).copied();
            let on_roster = members.is_some_and(|m| m.contains(&uid));
            out.push(reconcile::resolve(uid, day, record, on_roster, now));
        }
        day += Duration::days(1);
    }
    out
}

pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    }
    .pred_opt()?;
    Some((start, end))
}

/// Effective attendance for a day, range or month
///
/// Explicit rows are merged with roster-derived rows; users with neither stay
/// absent from the result.
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Resolved attendance", body = AttendanceResponse),
        (status = 400, description = "Missing or inconsistent filters"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
) -> actix_web::Result<impl Responder> {
    let now = chrono::Local::now().naive_local();

    let (start, end, single_day) = if let Some(date) = query.date {
        (date, date, true)
    } else if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "start_date cannot be after end_date"
            })));
        }
        (start, end, false)
    } else if let (Some(month), Some(year)) = (query.month, query.year) {
        match month_bounds(year, month) {
            Some((start, end)) => (start, end, false),
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "Invalid month/year"
                })));
            }
        }
    } else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Provide date, start_date/end_date, or month/year"
        })));
    };

    let records = fetch_records(pool.get_ref(), start, end, query.user_id).await;
    let membership = fetch_membership(pool.get_ref(), start, end).await;
    let attendance = reconcile_range(start, end, &records, &membership, query.user_id, now);

    let stats = single_day.then(|| reconcile::day_stats(&attendance));

    Ok(HttpResponse::Ok().json(AttendanceResponse { attendance, stats }))
}

fn normalized_hours(status: AttendanceStatus, work: f64, overtime: f64) -> (f64, f64) {
    if status.zeroes_hours() { (0.0, 0.0) } else { (work, overtime) }
}

/// Upsert one attendance record
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = UpsertAttendance,
    responses(
        (status = 200, description = "Record stored", body = Object, example = json!({
            "message": "Attendance saved"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn upsert_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpsertAttendance>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let rec = payload.into_inner();
    let (work, overtime) = normalized_hours(rec.status, rec.work_hours, rec.overtime_hours);

    sqlx::query(
        r#"
        INSERT INTO attendance (user_id, date, status, work_hours, overtime_hours)
        VALUES (?, ?, ?, ?, ?)
        ON DUPLICATE KEY UPDATE
            status = VALUES(status),
            work_hours = VALUES(work_hours),
            overtime_hours = VALUES(overtime_hours)
        "#,
    )
    .bind(rec.user_id)
    .bind(rec.date)
    .bind(rec.status.to_string())
    .bind(work)
    .bind(overtime)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = rec.user_id, date = %rec.date, "Attendance upsert failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance saved" })))
}

/// Bulk upsert, one transaction
#[utoipa::path(
    post,
    path = "/api/attendance/batch",
    request_body = BatchUpsert,
    responses(
        (status = 200, description = "Records stored", body = Object, example = json!({
            "count": 24
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn batch_upsert(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<BatchUpsert>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let records = payload.into_inner().records;

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut count = 0u64;
    for rec in &records {
        let (work, overtime) = normalized_hours(rec.status, rec.work_hours, rec.overtime_hours);
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, date, status, work_hours, overtime_hours)
            VALUES (?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                status = VALUES(status),
                work_hours = VALUES(work_hours),
                overtime_hours = VALUES(overtime_hours)
            "#,
        )
        .bind(rec.user_id)
        .bind(rec.date)
        .bind(rec.status.to_string())
        .bind(work)
        .bind(overtime)
        .execute(&mut *tx)
        .await;

        if let Err(e) = result {
            error!(error = %e, user_id = rec.user_id, date = %rec.date, "Batch upsert failed");
            let _ = tx.rollback().await;
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
        count += 1;
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Batch commit failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn record(uid: u64, d: u32, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            user_id: uid,
            date: date(d),
            status,
            work_hours: 8.0,
            overtime_hours: 0.0,
        }
    }

    #[test]
    fn range_unions_records_and_roster() {
        // user 1 has a record, users 2-3 are only on the roster
        let records = vec![record(1, 10, AttendanceStatus::Absent)];
        let membership: HashMap<NaiveDate, HashSet<u64>> =
            HashMap::from([(date(10), HashSet::from([2, 3]))]);
        let now = date(11).and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap());

        let mut out = reconcile_range(date(10), date(10), &records, &membership, None, now);
        out.sort_by_key(|e| e.user_id);

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].status, AttendanceStatus::Absent);
        assert_eq!(out[1].status, AttendanceStatus::Present);
        assert_eq!(out[2].status, AttendanceStatus::Present);
    }

    #[test]
    fn user_filter_applies_to_derived_rows() {
        let membership: HashMap<NaiveDate, HashSet<u64>> =
            HashMap::from([(date(10), HashSet::from([2, 3]))]);
        let now = date(11).and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        let out = reconcile_range(date(10), date(10), &[], &membership, Some(2), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].user_id, 2);
    }

    #[test]
    fn month_bounds_handle_december() {
        assert_eq!(
            month_bounds(2024, 12),
            Some((
                NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
            ))
        );
    }

    #[test]
    fn hours_zeroed_for_absence_statuses() {
        assert_eq!(normalized_hours(AttendanceStatus::OffDay, 8.0, 2.0), (0.0, 0.0));
        assert_eq!(normalized_hours(AttendanceStatus::Absent, 8.0, 2.0), (0.0, 0.0));
        assert_eq!(normalized_hours(AttendanceStatus::Late, 6.0, 1.0), (6.0, 1.0));
    }
}
