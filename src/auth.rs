//! Token issuance and verification for the Fablya backend
//!
//! Tokens are HS256 JWTs signed with `ACCESS_TOKEN_SECRET` and bound to a
//! single identity claim: an email for email logins, a phone number for phone
//! logins. No expiry is configured, so verification does not require an `exp`
//! claim. There is no refresh flow and no revocation list.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// Identity claim carried by every token.
///
/// Exactly one of the two fields is set, depending on which login route
/// issued the token. Field names follow the wire format stored in the user
/// documents (`email`, `phoneNumber`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        rename = "phoneNumber",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_number: Option<String>,
}

impl Claims {
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            phone_number: None,
        }
    }

    pub fn for_phone(number: impl Into<String>) -> Self {
        Self {
            email: None,
            phone_number: Some(number.into()),
        }
    }

    /// Filter selecting the user document this claim identifies.
    ///
    /// Returns `None` when the token carries neither identity, which can only
    /// happen with a token we did not issue.
    pub fn identity_filter(&self) -> Option<Document> {
        if let Some(email) = &self.email {
            return Some(doc! { "email": email });
        }
        if let Some(number) = &self.phone_number {
            return Some(doc! { "phoneNumber": number });
        }
        None
    }
}

/// Signs and verifies identity tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // Tokens carry no expiry; do not require or validate `exp`.
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for the given identity claim.
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding)
    }

    /// Verify a token and return its decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}
