use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::product::Product;
use crate::utils::db_utils::{build_update_sql, execute_update};

const PRODUCT_COLUMNS: &str = "id, name, category_id, sku, unit";

const UPDATABLE: &[&str] = &["name", "category_id", "sku", "unit"];

#[derive(Deserialize, ToSchema)]
pub struct CreateProduct {
    #[schema(example = "파레트 11형")]
    pub name: String,
    #[schema(example = 2, nullable = true)]
    pub category_id: Option<u64>,
    #[schema(example = "PLT-11", nullable = true)]
    pub sku: Option<String>,
    #[schema(example = "EA", nullable = true)]
    pub unit: Option<String>,
}

#[derive(Deserialize, IntoParams)]
pub struct ProductFilter {
    /// Restrict to one category
    pub category_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductFilter),
    responses((status = 200, body = ProductListResponse), (status = 401, description = "Unauthorized")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_products(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ProductFilter>,
) -> actix_web::Result<impl Responder> {
    let products = if let Some(category_id) = query.category_id {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products WHERE category_id = ? ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .bind(category_id)
        .fetch_all(pool.get_ref())
        .await
    } else {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {} FROM products ORDER BY name",
            PRODUCT_COLUMNS
        ))
        .fetch_all(pool.get_ref())
        .await
    }
    .map_err(|e| {
        error!(error = %e, "Failed to fetch products");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(ProductListResponse { products }))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProduct,
    responses((status = 200, description = "Product created"), (status = 403, description = "Forbidden")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateProduct>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Name must not be empty"
        })));
    }

    sqlx::query("INSERT INTO products (name, category_id, sku, unit) VALUES (?, ?, ?, ?)")
        .bind(name)
        .bind(payload.category_id)
        .bind(&payload.sku)
        .bind(&payload.unit)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create product");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Product created" })))
}

/// Partial product update
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    request_body(content = Object, example = json!({"name": "파레트 12형", "unit": "EA"})),
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Bad payload"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let product_id = path.into_inner();
    let update = build_update_sql("products", &payload, UPDATABLE, "id", product_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, product_id, "Product update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Product not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Product updated" })))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = u64, Path, description = "Product id")),
    responses((status = 200, description = "Product deleted"), (status = 404, description = "Not found")),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_product(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(path.into_inner())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to delete product");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({ "message": "Product not found" })));
    }

    Ok(HttpResponse::Ok().json(json!({ "message": "Product deleted" })))
}
