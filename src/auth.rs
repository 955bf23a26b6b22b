//! Caller identity extractors.
//!
//! Sessions are owned by the upstream session layer, which forwards the
//! authenticated user's id in a trusted header (see
//! [`AppConfig::auth_user_header`](crate::config::AppConfig)).

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use uuid::Uuid;

use crate::config::{AppConfig, DEFAULT_AUTH_USER_HEADER};
use crate::errors::AppError;

/// Extractor that rejects the request with 401 unless a user is signed in.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    /// Check that a `/users/{user_id}/...` path belongs to this user.
    pub fn owns(&self, path_user_id: Uuid) -> Result<Uuid, AppError> {
        if self.0 == path_user_id {
            Ok(self.0)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

/// Extractor for routes open to guests.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

fn user_from_request(req: &HttpRequest) -> Option<Uuid> {
    let header = req
        .app_data::<web::Data<AppConfig>>()
        .map_or(DEFAULT_AUTH_USER_HEADER, |config| {
            config.auth_user_header.as_str()
        });
    req.headers()
        .get(header)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            user_from_request(req)
                .map(AuthenticatedUser)
                .ok_or(AppError::Unauthorized),
        )
    }
}

impl FromRequest for MaybeUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(user_from_request(req))))
    }
}
