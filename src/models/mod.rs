//! Data models for the Fablya backend
//!
//! Documents live in three collections: `products`, `users` and `cart`. The
//! catalog is read-only from this service; users and cart entries are created
//! implicitly by upsert and never deleted. Field names mirror the stored wire
//! format (camelCase), so the structs rename where Rust style differs.

use mongodb::bson::{oid::ObjectId, DateTime, Document};
use serde::{Deserialize, Serialize, Serializer};
use validator::Validate;

/// Serialize an optional `_id` as a plain hex string instead of extended JSON.
fn serialize_oid_as_hex<S>(id: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match id {
        Some(oid) => serializer.serialize_str(&oid.to_hex()),
        None => serializer.serialize_none(),
    }
}

/// Catalog record. Opaque beyond its id; whatever fields the catalog importer
/// wrote are passed through to the client untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        rename = "_id",
        serialize_with = "mongodb::bson::serde_helpers::serialize_object_id_as_hex_string"
    )]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: Document,
}

/// User roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Admin,
    /// Anything else found in a stored document. Fails every gate.
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Admin => "admin",
            UserRole::Unknown => "unknown",
        }
    }

    /// Admins can reach member routes as well.
    pub fn grants_member_access(self) -> bool {
        matches!(self, UserRole::Member | UserRole::Admin)
    }

    pub fn grants_admin_access(self) -> bool {
        self == UserRole::Admin
    }
}

/// User document, keyed by email or phone number depending on the login path.
///
/// Profile updates merge arbitrary allow-listed fields over time, so anything
/// beyond the known fields is kept in `extra` and round-trips through reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        rename = "_id",
        default,
        serialize_with = "serialize_oid_as_hex",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "phoneNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(rename = "createdAt", default, skip_serializing)]
    pub created_at: Option<DateTime>,
    #[serde(rename = "updatedAt", default, skip_serializing)]
    pub updated_at: Option<DateTime>,
    #[serde(flatten)]
    pub extra: Document,
}

/// Cart document, keyed by `productId`. A second add for the same product
/// overwrites the entry; there is no quantity accumulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(
        rename = "_id",
        default,
        serialize_with = "serialize_oid_as_hex",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ObjectId>,
    #[serde(rename = "productId")]
    pub product_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(rename = "createdAt", default, skip_serializing)]
    pub created_at: Option<DateTime>,
    #[serde(rename = "updatedAt", default, skip_serializing)]
    pub updated_at: Option<DateTime>,
}

/// Allow-listed profile fields a client may set through the login and profile
/// update routes. `role`, `email` and `phoneNumber` are deliberately absent:
/// identity comes from the URL or the token, and the role is assigned by the
/// server only.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileFields {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 240))]
    pub address: Option<String>,
    #[validate(url)]
    pub photo: Option<String>,
}

impl ProfileFields {
    /// Materialize the fields that were actually supplied into a `$set`
    /// document.
    pub fn into_set_document(self) -> Document {
        let mut set = Document::new();
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(address) = self.address {
            set.insert("address", address);
        }
        if let Some(photo) = self.photo {
            set.insert("photo", photo);
        }
        set
    }
}

/// Allow-listed product snapshot fields for a cart add.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(length(min = 1, max = 240))]
    pub name: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(url)]
    pub image: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: Option<i64>,
}

impl AddToCartRequest {
    pub fn into_set_document(self) -> Document {
        let mut set = Document::new();
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(price) = self.price {
            set.insert("price", price);
        }
        if let Some(image) = self.image {
            set.insert("image", image);
        }
        if let Some(quantity) = self.quantity {
            set.insert("quantity", quantity);
        }
        set
    }
}

/// Shape of the `result` field returned by the upsert routes, mirroring the
/// driver's update result as the original API exposed it.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome {
    #[serde(rename = "matchedCount")]
    pub matched_count: u64,
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
    #[serde(rename = "upsertedId", skip_serializing_if = "Option::is_none")]
    pub upserted_id: Option<String>,
}

impl From<mongodb::results::UpdateResult> for UpsertOutcome {
    fn from(result: mongodb::results::UpdateResult) -> Self {
        Self {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result
                .upserted_id
                .as_ref()
                .and_then(|id| id.as_object_id())
                .map(|oid| oid.to_hex()),
        }
    }
}

/// Response body of both login routes.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub result: UpsertOutcome,
    pub token: String,
}
