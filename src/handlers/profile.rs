//! Profile handlers, scoped to the caller's own identity claim

use axum::{extract::State, Json};
use mongodb::bson::{doc, DateTime};
use mongodb::options::UpdateOptions;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::auth::MemberUser;
use crate::models::{ProfileFields, UpsertOutcome, User};

/// Fetch the caller's profile: `GET /userInfo`.
pub async fn user_info(
    State(state): State<AppState>,
    MemberUser(claims): MemberUser,
) -> Result<Json<User>, ApiError> {
    let filter = claims.identity_filter().ok_or(ApiError::Forbidden)?;
    let user = state
        .users
        .find_one(filter, None)
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    Ok(Json(user))
}

/// Merge allow-listed fields into the caller's profile: `PUT /updateUserInfo`.
pub async fn update_user_info(
    State(state): State<AppState>,
    MemberUser(claims): MemberUser,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<UpsertOutcome>, ApiError> {
    fields.validate()?;

    let filter = claims.identity_filter().ok_or(ApiError::Forbidden)?;
    let mut set = fields.into_set_document();
    set.insert("updatedAt", DateTime::now());

    let options = UpdateOptions::builder().upsert(true).build();
    let result = state
        .users
        .update_one(filter, doc! { "$set": set }, options)
        .await?;

    Ok(Json(result.into()))
}
