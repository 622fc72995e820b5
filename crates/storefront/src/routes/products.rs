//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use orchard_core::{NewProduct, Product, ProductId, ProductPatch, SortOption};

use crate::error::Result;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    /// Case-insensitive substring filter on the product name.
    pub search: Option<String>,
    /// One of `name_asc`, `name_desc`, `price_asc`, `price_desc`, `newest`.
    /// Unknown or absent values fall back to newest-first.
    pub sort: Option<String>,
}

/// `GET /` - the product listing.
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<Vec<Product>>> {
    let sort = SortOption::parse(query.sort.as_deref());
    let products = state
        .products()
        .fetch_products(query.search.as_deref(), sort)
        .await?;
    Ok(Json(products))
}

/// `GET /details/{id}` - a single product.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = state.products().fetch_product_by_id(&id).await?;
    Ok(Json(product))
}

/// `POST /products` - create a product. The backend assigns the id.
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = state.products().add_product(new).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{id}` - partial update; absent fields keep prior values.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    let product = state.products().update_product(&id, &patch).await?;
    Ok(Json(product))
}

/// `DELETE /products/{id}` - delete; missing products are a `404`, never a
/// silent success.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    state.products().delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
