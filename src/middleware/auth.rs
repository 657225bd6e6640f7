use std::fmt;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims issued by the identity provider. `sub` is the principal's uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.sub.clone())
    }
}

#[derive(Clone)]
pub struct AuthState {
    secret: Arc<str>,
    allowed: &'static [Role],
}

impl AuthState {
    pub fn new(secret: &str, allowed: &'static [Role]) -> Self {
        Self {
            secret: Arc::from(secret),
            allowed,
        }
    }
}

fn reject(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({"success": false, "error": message, "code": code})),
    )
        .into_response()
}

fn bearer_token(req: &Request) -> std::result::Result<&str, Response> {
    let Some(auth_header) = req.headers().get(axum::http::header::AUTHORIZATION) else {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "missing_authorization",
            "Authorization header is required",
        ));
    };
    let Ok(auth_str) = auth_header.to_str() else {
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "bad_authorization",
            "Authorization header is not valid text",
        ));
    };
    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        reject(
            StatusCode::UNAUTHORIZED,
            "unsupported_scheme",
            "Only bearer tokens are accepted",
        )
    })
}

pub fn decode_claims(token: &str, secret: &str) -> Option<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .ok()
    .map(|data| data.claims)
}

/// Validates the bearer token and inserts its `Claims` into the request.
/// An empty `allowed` list accepts every role.
pub async fn require_roles(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&req) {
        Ok(token) => token,
        Err(rejection) => return rejection,
    };
    let Some(claims) = decode_claims(token, &state.secret) else {
        return reject(StatusCode::UNAUTHORIZED, "invalid_token", "Token is invalid or expired");
    };
    if !state.allowed.is_empty() && !state.allowed.contains(&claims.role) {
        return reject(
            StatusCode::FORBIDDEN,
            "forbidden",
            &format!("Role {} cannot access this resource", claims.role),
        );
    }
    req.extensions_mut().insert(claims);
    next.run(req).await
}
