use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Json;
use itemcmp_catalog::CatalogService;
use itemcmp_types::{ProductDraft, ProductId, SellerId};

use crate::dto::{CompareRequest, HealthResponse, ProductResponse};
use crate::error::ApiError;

/// Header carrying the caller's seller id on mutating requests.
pub const SELLER_HEADER: &str = "x-seller-id";

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self { catalog }
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = blocking(move || state.catalog.list_all())
        .await?
        .map_err(|e| ApiError::catalog("Failed to load products", e))?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

pub async fn create_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Vec<ProductDraft>>, JsonRejection>,
) -> ApiResult<(StatusCode, &'static str)> {
    let seller = seller_from(&headers)?;
    let drafts = json_body(body)?;
    blocking(move || state.catalog.create_many(drafts, &seller))
        .await?
        .map_err(|e| ApiError::catalog("Failed to save products", e))?;
    Ok((StatusCode::CREATED, "Products saved successfully"))
}

pub async fn update_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Vec<ProductDraft>>, JsonRejection>,
) -> ApiResult<&'static str> {
    let seller = seller_from(&headers)?;
    let drafts = json_body(body)?;
    blocking(move || state.catalog.update_many(drafts, &seller))
        .await?
        .map_err(|e| ApiError::catalog("Failed to update products", e))?;
    Ok("Products updated successfully")
}

pub async fn compare_products(
    State(state): State<AppState>,
    body: Result<Json<CompareRequest>, JsonRejection>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let request = json_body(body)?;
    if request.ids.is_empty() {
        return Err(ApiError::bad_request("No product IDs provided"));
    }
    let products = blocking(move || state.catalog.compare_by_ids(&request.ids))
        .await?
        .map_err(|e| ApiError::catalog("Failed to compare products", e))?;
    Ok(Json(products.into_iter().map(ProductResponse::from).collect()))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let id = product_id(&raw_id)?;
    let product = blocking(move || state.catalog.get_by_id(id))
        .await?
        .map_err(|e| ApiError::catalog("Failed to get product", e))?;
    Ok(Json(product.into()))
}

pub async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(raw_id): Path<String>,
) -> ApiResult<&'static str> {
    let seller = seller_from(&headers)?;
    let id = product_id(&raw_id)?;
    blocking(move || state.catalog.delete_by_id(id, &seller))
        .await?
        .map_err(|e| ApiError::catalog("Failed to delete product", e))?;
    Ok("Product deleted successfully")
}

// Catalog calls touch the filesystem; keep them off the async workers.
async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(format!("request task failed: {e}")))
}

fn seller_from(headers: &HeaderMap) -> ApiResult<SellerId> {
    headers
        .get(SELLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| SellerId::new(v).ok())
        .ok_or_else(|| ApiError::bad_request("Missing x-seller-id header"))
}

fn product_id(raw: &str) -> ApiResult<ProductId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("Invalid product ID"))
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => {
            tracing::debug!(%rejection, "rejected request body");
            Err(ApiError::bad_request("Invalid request body"))
        }
    }
}
