//! One-shot notices that survive the redirect after a form submission.
//!
//! The notice travels in a `flash` cookie as a short-lived HS256 token signed
//! with the session secret, so a client cannot forge or alter it.

use std::{convert::Infallible, time::Duration};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::state::AppState;

pub const COOKIE_NAME: &str = "flash";
const FLASH_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct FlashClaims {
    kind: FlashKind,
    msg: String,
    iat: usize,
    exp: usize,
}

#[derive(Clone)]
pub struct FlashKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for FlashKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_secret(&state.config.secret_key)
    }
}

impl FlashKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: FLASH_TTL,
        }
    }

    pub fn sign(&self, flash: &Flash) -> Result<String, jsonwebtoken::errors::Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = FlashClaims {
            kind: flash.kind,
            msg: flash.message.clone(),
            iat: now,
            exp: now + self.ttl.as_secs() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Flash, jsonwebtoken::errors::Error> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<FlashClaims>(token, &self.decoding, &validation)?;
        Ok(Flash {
            kind: data.claims.kind,
            message: data.claims.msg,
        })
    }

    /// `Set-Cookie` value carrying the signed notice.
    pub fn set_cookie(&self, flash: &Flash) -> Result<String, jsonwebtoken::errors::Error> {
        let token = self.sign(flash)?;
        Ok(format!(
            "{COOKIE_NAME}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
            self.ttl.as_secs()
        ))
    }
}

/// `Set-Cookie` value that drops the notice once shown.
pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

pub(crate) fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Pending notice, if the request carries a valid one.
pub struct IncomingFlash(pub Option<Flash>);

#[async_trait]
impl<S> FromRequestParts<S> for IncomingFlash
where
    S: Send + Sync,
    FlashKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = cookie_value(&parts.headers, COOKIE_NAME) else {
            return Ok(IncomingFlash(None));
        };

        let keys = FlashKeys::from_ref(state);
        match keys.verify(token) {
            Ok(flash) => {
                debug!(kind = ?flash.kind, "flash notice received");
                Ok(IncomingFlash(Some(flash)))
            }
            Err(e) => {
                warn!(error = %e, "ignoring invalid flash cookie");
                Ok(IncomingFlash(None))
            }
        }
    }
}
