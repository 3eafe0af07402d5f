//! Login-or-register handlers
//!
//! Both routes are identity upserts: look up the record by the identity key
//! taken from the URL, set `role: "member"` on the first write, merge the
//! allow-listed body fields on later ones, and always issue a fresh token
//! bound to the identity. There is no password; possession of the mailbox or
//! number is checked upstream of this service.
//!
//! The existence check and the upsert are two independent database calls, so
//! two concurrent logins for the same identity can race; the upsert keyed on
//! the identity filter keeps that benign (one document either way).

use axum::{
    extract::{Path, State},
    Json,
};
use mongodb::bson::{doc, DateTime, Document};
use mongodb::options::UpdateOptions;
use validator::Validate;

use crate::app_state::AppState;
use crate::auth::Claims;
use crate::error::ApiError;
use crate::models::{LoginResponse, ProfileFields, UserRole};

/// Login or register by email: `PUT /user/:email`.
pub async fn login_with_email(
    State(state): State<AppState>,
    Path(email): Path<String>,
    body: Option<Json<ProfileFields>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let claims = Claims::for_email(email.as_str());
    upsert_identity(&state, "email", &email, body, claims).await
}

/// Login or register by phone number: `PUT /phone_user/:number`.
pub async fn login_with_phone(
    State(state): State<AppState>,
    Path(number): Path<String>,
    body: Option<Json<ProfileFields>>,
) -> Result<Json<LoginResponse>, ApiError> {
    let claims = Claims::for_phone(number.as_str());
    upsert_identity(&state, "phoneNumber", &number, body, claims).await
}

async fn upsert_identity(
    state: &AppState,
    identity_field: &str,
    identity: &str,
    body: Option<Json<ProfileFields>>,
    claims: Claims,
) -> Result<Json<LoginResponse>, ApiError> {
    let fields = body.map(|Json(fields)| fields).unwrap_or_default();
    fields.validate()?;

    let mut filter = Document::new();
    filter.insert(identity_field, identity);
    let existing = state.users.find_one(filter.clone(), None).await?;
    let has_role = existing.and_then(|user| user.role).is_some();

    let update = if has_role {
        merge_update(fields)
    } else {
        registration_update(identity_field, identity, fields)
    };

    let options = UpdateOptions::builder().upsert(true).build();
    let result = state.users.update_one(filter, update, options).await?;

    tracing::info!(identity = identity, new_user = !has_role, "login upsert");

    let token = state.tokens.sign(&claims)?;
    Ok(Json(LoginResponse {
        result: result.into(),
        token,
    }))
}

/// First write for an identity: pin the identity field and assign the
/// `member` role alongside whatever profile fields were supplied.
fn registration_update(identity_field: &str, identity: &str, fields: ProfileFields) -> Document {
    let mut set = fields.into_set_document();
    set.insert(identity_field, identity);
    set.insert("role", UserRole::Member.as_str());
    set.insert("updatedAt", DateTime::now());

    doc! {
        "$set": set,
        "$setOnInsert": { "createdAt": DateTime::now() },
    }
}

/// Later writes merge the allow-listed fields only; the stored role is never
/// touched again by a login.
fn merge_update(fields: ProfileFields) -> Document {
    let mut set = fields.into_set_document();
    set.insert("updatedAt", DateTime::now());

    doc! { "$set": set }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_login_assigns_the_member_role() {
        let fields = ProfileFields {
            name: Some("A".to_string()),
            ..ProfileFields::default()
        };

        let update = registration_update("email", "a@x.com", fields);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("email").unwrap(), "a@x.com");
        assert_eq!(set.get_str("name").unwrap(), "A");
        assert_eq!(set.get_str("role").unwrap(), "member");
        assert!(update.get_document("$setOnInsert").unwrap().contains_key("createdAt"));
    }

    #[test]
    fn phone_registration_pins_the_phone_number() {
        let update = registration_update("phoneNumber", "+15550001111", ProfileFields::default());
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("phoneNumber").unwrap(), "+15550001111");
        assert_eq!(set.get_str("role").unwrap(), "member");
        assert!(!set.contains_key("email"));
    }

    #[test]
    fn repeat_login_never_writes_role_or_identity() {
        let fields = ProfileFields {
            name: Some("B".to_string()),
            address: Some("1 Main St".to_string()),
            ..ProfileFields::default()
        };

        let update = merge_update(fields);
        let set = update.get_document("$set").unwrap();
        assert!(!set.contains_key("role"));
        assert!(!set.contains_key("email"));
        assert!(!set.contains_key("phoneNumber"));
        assert_eq!(set.get_str("name").unwrap(), "B");
        assert_eq!(set.get_str("address").unwrap(), "1 Main St");
    }
}
