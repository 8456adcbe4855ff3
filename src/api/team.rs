use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::team::Team;

#[derive(Deserialize, ToSchema)]
pub struct TeamReq {
    #[schema(example = "1조")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct TeamListResponse {
    pub teams: Vec<Team>,
}

/// List teams
#[utoipa::path(
    get,
    path = "/api/teams",
    responses((status = 200, body = TeamListResponse), (status = 401, description = "Unauthorized")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn list_teams(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let teams = sqlx::query_as::<_, Team>("SELECT id, name FROM teams ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch teams");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TeamListResponse { teams }))
}

/// Create a team
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = TeamReq,
    responses((status = 200, description = "Team created"), (status = 403, description = "Forbidden")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn create_team(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<TeamReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    sqlx::query("INSERT INTO teams (name) VALUES (?)")
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Team created" })))
}

/// Rename a team
#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    params(("id" = u64, Path, description = "Team id")),
    request_body = TeamReq,
    responses((status = 200, description = "Team updated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn update_team(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<TeamReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("UPDATE teams SET name = ? WHERE id = ?")
        .bind(payload.name.trim())
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Team not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Team updated" })))
}

/// Delete a team
#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(("id" = u64, Path, description = "Team id")),
    responses((status = 200, description = "Team deleted"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn delete_team(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete team");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Team not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Team deleted" })))
}
