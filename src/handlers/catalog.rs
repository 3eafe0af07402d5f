//! Catalog handlers
//!
//! The catalog is read-only from this service: products are written by an
//! external importer and only listed or fetched here.

use axum::{
    extract::{Path, State},
    Json,
};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::models::Product;

/// List all products.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ApiError> {
    let cursor = state.products.find(None, None).await?;
    let products: Vec<Product> = cursor.try_collect().await?;
    Ok(Json(products))
}

/// Fetch one product by id.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    let oid = ObjectId::parse_str(&id).map_err(|_| ApiError::InvalidId(id))?;

    let product = state
        .products
        .find_one(doc! { "_id": oid }, None)
        .await?
        .ok_or(ApiError::NotFound("product"))?;

    Ok(Json(product))
}
