//! Cart handlers
//!
//! Cart documents are keyed by `productId` and associated to the caller by
//! email, so adding the same product twice overwrites the entry rather than
//! incrementing anything.

use axum::{
    extract::{Path, State},
    Json,
};
use futures_util::stream::TryStreamExt;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::UpdateOptions;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::auth::MemberUser;
use crate::models::{AddToCartRequest, CartEntry, UpsertOutcome};

/// List the caller's cart: `GET /user_cart`.
pub async fn user_cart(
    State(state): State<AppState>,
    MemberUser(claims): MemberUser,
) -> Result<Json<Vec<CartEntry>>, ApiError> {
    // Cart entries are keyed by email; a phone-only identity has no cart.
    let email = claims.email.ok_or(ApiError::Forbidden)?;

    let cursor = state.cart.find(doc! { "email": email }, None).await?;
    let entries: Vec<CartEntry> = cursor.try_collect().await?;
    Ok(Json(entries))
}

/// Upsert a cart entry for a product: `PUT /addToCart/:id`.
///
/// The entry's email always comes from the verified claim, never the body.
pub async fn add_to_cart(
    State(state): State<AppState>,
    MemberUser(claims): MemberUser,
    Path(product_id): Path<String>,
    body: Option<Json<AddToCartRequest>>,
) -> Result<Json<UpsertOutcome>, ApiError> {
    let email = claims.email.ok_or(ApiError::Forbidden)?;
    let snapshot = body.map(|Json(snapshot)| snapshot).unwrap_or_default();
    snapshot.validate()?;

    let options = UpdateOptions::builder().upsert(true).build();
    let result = state
        .cart
        .update_one(
            cart_filter(&product_id),
            cart_update(&product_id, &email, snapshot),
            options,
        )
        .await?;

    tracing::info!(product_id = %product_id, "cart upsert");

    Ok(Json(result.into()))
}

/// Cart documents are matched by product id alone, so a repeat add hits the
/// existing entry instead of inserting a second one.
fn cart_filter(product_id: &str) -> Document {
    doc! { "productId": product_id }
}

fn cart_update(product_id: &str, email: &str, snapshot: AddToCartRequest) -> Document {
    let mut set = snapshot.into_set_document();
    set.insert("productId", product_id);
    set.insert("email", email);
    set.insert("updatedAt", DateTime::now());

    doc! {
        "$set": set,
        "$setOnInsert": { "createdAt": DateTime::now() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeat_adds_match_the_same_document() {
        // The filter carries the product id only; a second add for the same
        // product selects the first entry and overwrites it.
        let filter = cart_filter("abc123");
        assert_eq!(filter, doc! { "productId": "abc123" });
        assert!(!filter.contains_key("email"));
    }

    #[test]
    fn second_add_overwrites_the_snapshot_fields() {
        let first = AddToCartRequest {
            quantity: Some(1),
            ..AddToCartRequest::default()
        };
        let second = AddToCartRequest {
            quantity: Some(3),
            ..AddToCartRequest::default()
        };

        let update = cart_update("abc123", "a@x.com", first);
        assert_eq!(update.get_document("$set").unwrap().get_i64("quantity").unwrap(), 1);

        let update = cart_update("abc123", "a@x.com", second);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_i64("quantity").unwrap(), 3);
        assert_eq!(set.get_str("productId").unwrap(), "abc123");
        assert!(update.get_document("$setOnInsert").unwrap().contains_key("createdAt"));
    }

    #[test]
    fn entry_email_comes_from_the_claim_not_the_body() {
        // A body that tries to smuggle an email is deserialized into the
        // closed snapshot struct, which has no email field.
        let body: AddToCartRequest = serde_json::from_value(serde_json::json!({
            "name": "Vase",
            "email": "evil@x.com",
        }))
        .unwrap();

        let update = cart_update("abc123", "a@x.com", body);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("email").unwrap(), "a@x.com");
        assert_eq!(set.get_str("name").unwrap(), "Vase");
    }
}
