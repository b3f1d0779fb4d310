use actix_web::{http::header::AUTHORIZATION, HttpRequest};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use uuid::Uuid;

use crate::error_code::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub(crate) enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header is not a bearer token")]
    NotBearer,

    #[error("Invalid token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub(crate) const fn error_code(&self) -> ErrorCode {
        ErrorCode::UNAUTHENTICATED
    }
}

#[derive(Debug, serde::Deserialize, serde::Serialize)]
struct Claims {
    sub: Uuid,
    iss: String,
    iat: i64,
    exp: i64,
}

/// Verifies HS256 access tokens and yields the caller's user id
#[derive(Clone)]
pub(crate) struct Authenticator {
    key: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    pub(crate) fn new(secret: &str, issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Authenticator {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    #[tracing::instrument(skip_all)]
    pub(crate) fn authenticate(&self, req: &HttpRequest) -> Result<Uuid, AuthError> {
        let header = req
            .headers()
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::NotBearer)?;

        let token = bearer_token(header)?;

        self.verify(token)
    }

    pub(crate) fn verify(&self, token: &str) -> Result<Uuid, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.key, &self.validation)
            .map_err(AuthError::InvalidToken)?;

        Ok(data.claims.sub)
    }
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header.trim().split_once(' ').ok_or(AuthError::NotBearer)?;

    let token = token.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::NotBearer);
    }

    Ok(token)
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("issuer", &self.validation.iss)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn sign_token(secret: &str, issuer: &str, user_id: Uuid, expires_in: i64) -> String {
    use jsonwebtoken::{EncodingKey, Header};

    let now = time::OffsetDateTime::now_utc().unix_timestamp();

    let claims = Claims {
        sub: user_id,
        iss: issuer.to_string(),
        iat: now,
        exp: now + expires_in,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Signed token")
}
