use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::token::Claims;
use crate::AppState;

/// The authenticated staff member, placed in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentStaff(pub User);

pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(state, req, next, false).await
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    authorize(state, req, next, true).await
}

async fn authorize(state: AppState, mut req: Request, next: Next, admin_only: bool) -> Response {
    match authenticate(&state, req.headers()).await {
        Ok((claims, staff)) => {
            if admin_only && !staff.role().can_administer() {
                return Error::Forbidden("forbidden".into()).into_response();
            }
            req.extensions_mut().insert(claims);
            req.extensions_mut().insert(CurrentStaff(staff));
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<(Claims, User)> {
    let token = bearer_token(headers)?;
    let claims = state.auth_service.verify(token)?;
    let staff = state.auth_service.current_staff(&claims).await?;
    Ok((claims, staff))
}

fn bearer_token(headers: &HeaderMap) -> Result<&str> {
    let Some(auth_header) = headers.get(AUTHORIZATION) else {
        return Err(Error::Unauthorized("missing_authorization".into()));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(Error::Unauthorized("bad_authorization".into()));
    };
    auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::Unauthorized("unsupported_scheme".into()))
}
