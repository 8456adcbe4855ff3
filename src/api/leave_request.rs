use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::leave_request::{LeaveRequest, LeaveRow, LeaveStatus, LeaveType};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2024-05-08", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2024-05-10", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "SICK")]
    pub leave_type: LeaveType,
    #[schema(example = "병원 진료")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "APPROVED")]
    pub status: LeaveStatus,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelLeave {
    #[schema(example = 7)]
    pub id: u64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by user (managers only; workers always see their own)
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    /// Filter by status
    #[schema(example = "PENDING")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 20)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub leaves: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

/// List leave requests
#[utoipa::path(
    get,
    path = "/api/leaves",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // Workers only ever see their own requests.
    let user_filter = if auth.is_manager() {
        query.user_id
    } else {
        Some(auth.user_id)
    };

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(uid) = user_filter {
        where_sql.push_str(" AND user_id = ?");
        args.push(FilterValue::U64(uid));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, user_id, start_date, end_date, leave_type, status, reason, created_at
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRow>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let rows = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = LeaveListResponse {
        leaves: rows.into_iter().filter_map(LeaveRow::into_request).collect(),
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request submitted", body = Object, example = json!({
            "message": "Leave request submitted", "status": "PENDING"
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (user_id, start_date, end_date, leave_type, status, reason)
        VALUES (?, ?, ?, ?, 'PENDING', ?)
        "#,
    )
    .bind(auth.user_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.to_string())
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request submitted",
        "status": LeaveStatus::Pending
    })))
}

async fn current_status(pool: &MySqlPool, id: u64) -> actix_web::Result<Option<LeaveStatus>> {
    let status = sqlx::query_scalar::<_, String>("SELECT status FROM leave_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            error!(error = %e, leave_id = id, "Failed to fetch leave status");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    Ok(status.and_then(|s| s.parse().ok()))
}

/// Transition a leave request (manager)
#[utoipa::path(
    put,
    path = "/api/leaves",
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Status updated", body = Object, example = json!({
            "message": "Leave updated"
        })),
        (status = 400, description = "Illegal transition"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<UpdateLeaveStatus>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let current = match current_status(pool.get_ref(), payload.id).await? {
        Some(s) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Leave request not found"
            })));
        }
    };

    if !current.can_transition(payload.status) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("Cannot move {} to {}", current, payload.status)
        })));
    }

    sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ? AND status = ?")
        .bind(payload.status.to_string())
        .bind(payload.id)
        .bind(current.to_string())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, leave_id = payload.id, "Leave status update failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Leave updated" })))
}

/// Withdraw an unprocessed request (owner)
#[utoipa::path(
    delete,
    path = "/api/leaves/{id}",
    params(("id" = u64, Path, description = "Leave request id")),
    responses(
        (status = 200, description = "Request deleted"),
        (status = 400, description = "Already processed"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn delete_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let result = sqlx::query(
        "DELETE FROM leave_requests WHERE id = ? AND user_id = ? AND status = 'PENDING'",
    )
    .bind(leave_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Leave delete failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Leave request deleted" })))
}

/// Request cancellation of an approved leave (owner)
#[utoipa::path(
    patch,
    path = "/api/leaves/cancel",
    request_body = CancelLeave,
    responses(
        (status = 200, description = "Cancellation requested", body = Object, example = json!({
            "message": "Cancellation requested"
        })),
        (status = 400, description = "Leave is not approved"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CancelLeave>,
) -> actix_web::Result<impl Responder> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'CANCELLATION_PENDING'
        WHERE id = ?
          AND user_id = ?
          AND status = 'APPROVED'
        "#,
    )
    .bind(payload.id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id = payload.id, "Cancellation request failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or not approved"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Cancellation requested" })))
}
