use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::services::identity_service::IdentityService;
use crate::utils::crypto::verify_password;
use crate::utils::token::{decode_token, issue_token, Claims};

#[derive(Clone)]
pub struct AuthService {
    identities: IdentityService,
    jwt_secret: Arc<str>,
    token_ttl_hours: i64,
}

impl AuthService {
    pub fn new(identities: IdentityService, jwt_secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            identities,
            jwt_secret: Arc::from(jwt_secret),
            token_ttl_hours,
        }
    }

    /// Checks staff credentials and issues a bearer token. Customers have no
    /// password and can never log in.
    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User)> {
        let rejected = || Error::Unauthorized("invalid_credentials".into());

        let user = self
            .identities
            .find_staff_by_username(username.trim())
            .await?
            .ok_or_else(rejected)?;
        let hash = user.password_hash.as_deref().ok_or_else(rejected)?;
        if !verify_password(password, hash) {
            tracing::info!(username = %user.username, "failed login attempt");
            return Err(rejected());
        }

        let token = issue_token(&user, &self.jwt_secret, self.token_ttl_hours)?;
        tracing::info!(staff_id = user.id, "staff logged in");
        Ok((token, user))
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode_token(token, &self.jwt_secret)
    }

    /// Resolves the staff identity behind validated claims.
    pub async fn current_staff(&self, claims: &Claims) -> Result<User> {
        let staff_id = claims.staff_id()?;
        self.identities
            .get_staff(staff_id)
            .await
            .map_err(|_| Error::Unauthorized("unknown_staff".into()))
    }
}
