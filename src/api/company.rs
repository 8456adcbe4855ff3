use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::company::Company;

#[derive(Deserialize, ToSchema)]
pub struct CompanyReq {
    #[schema(example = "대한물류")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct CompanyListResponse {
    pub companies: Vec<Company>,
}

/// List companies
#[utoipa::path(
    get,
    path = "/api/companies",
    responses((status = 200, body = CompanyListResponse), (status = 401, description = "Unauthorized")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn list_companies(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let companies = sqlx::query_as::<_, Company>("SELECT id, name FROM companies ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch companies");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(CompanyListResponse { companies }))
}

/// Create a company
#[utoipa::path(
    post,
    path = "/api/companies",
    request_body = CompanyReq,
    responses((status = 200, description = "Company created"), (status = 403, description = "Forbidden")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn create_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CompanyReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    sqlx::query("INSERT INTO companies (name) VALUES (?)")
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create company");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Company created" })))
}

/// Rename a company
#[utoipa::path(
    put,
    path = "/api/companies/{id}",
    params(("id" = u64, Path, description = "Company id")),
    request_body = CompanyReq,
    responses((status = 200, description = "Company updated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn update_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CompanyReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("UPDATE companies SET name = ? WHERE id = ?")
        .bind(payload.name.trim())
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update company");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Company not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Company updated" })))
}

/// Delete a company
#[utoipa::path(
    delete,
    path = "/api/companies/{id}",
    params(("id" = u64, Path, description = "Company id")),
    responses((status = 200, description = "Company deleted"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Reference"
)]
pub async fn delete_company(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("DELETE FROM companies WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete company");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Company not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Company deleted" })))
}
