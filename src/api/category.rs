use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::category::Category;

#[derive(Deserialize, ToSchema)]
pub struct CategoryReq {
    #[schema(example = "파레트")]
    pub name: String,
}

#[derive(Serialize, ToSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/categories",
    responses((status = 200, body = CategoryListResponse), (status = 401, description = "Unauthorized")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_categories(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch categories");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(CategoryListResponse { categories }))
}

/// Create a category
#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryReq,
    responses((status = 200, description = "Category created"), (status = 403, description = "Forbidden")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CategoryReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    sqlx::query("INSERT INTO categories (name) VALUES (?)")
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create category");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Category created" })))
}

/// Rename a category
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = u64, Path, description = "Category id")),
    request_body = CategoryReq,
    responses((status = 200, description = "Category updated"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_category(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CategoryReq>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
        .bind(payload.name.trim())
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to update category");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Category not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Category updated" })))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = u64, Path, description = "Category id")),
    responses((status = 200, description = "Category deleted"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_category(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete category");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Category not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Category deleted" })))
}
