// src/auth.rs

use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::info;
use mongodb::bson::doc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupInfo {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct LoginInfo {
    pub username: String,
    pub password: String,
}

pub fn create_jwt(user_id: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = Utc::now() + Duration::hours(24);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration.timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// The requesting user's id, as attached by the Authentication middleware.
/// Every task operation takes the identity from here and nowhere else.
pub fn current_user(req: &HttpRequest) -> Result<String, ApiError> {
    req.extensions()
        .get::<String>()
        .cloned()
        .ok_or(ApiError::Unauthorized)
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"))
        .is_match(email)
}

/// POST /auth/signup
pub async fn signup(
    data: web::Data<AppState>,
    signup_info: web::Json<SignupInfo>,
) -> Result<HttpResponse, ApiError> {
    if !is_valid_email(&signup_info.email) {
        return Err(ApiError::Validation("A valid email is required".to_string()));
    }

    let users = data.mongodb.db.collection::<User>("users");
    if users
        .find_one(doc! { "username": &signup_info.username })
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let hashed_password = hash(&signup_info.password, DEFAULT_COST)
        .map_err(|_| ApiError::Dependency("Error hashing password".to_string()))?;

    let new_user = User {
        user_id: Uuid::new_v4().to_string(),
        username: signup_info.username.clone(),
        email: signup_info.email.clone(),
        password: hashed_password,
    };
    users.insert_one(&new_user).await?;

    info!("User created: {}", new_user.user_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "User created" })))
}

/// POST /auth/login
pub async fn login(
    data: web::Data<AppState>,
    login_info: web::Json<LoginInfo>,
) -> Result<HttpResponse, ApiError> {
    let users = data.mongodb.db.collection::<User>("users");
    let user = users
        .find_one(doc! { "username": &login_info.username })
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify(&login_info.password, &user.password).unwrap_or(false) {
        return Err(ApiError::Unauthorized);
    }

    let token = create_jwt(&user.user_id, &data.config.jwt_secret)
        .map_err(|_| ApiError::Dependency("Error creating token".to_string()))?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "token": token,
        "user_id": user.user_id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_round_trips_the_subject() {
        let token = create_jwt("user-42", "test-secret").unwrap();
        let claims = validate_jwt(&token, "test-secret").unwrap();
        assert_eq!(claims.sub, "user-42");
    }

    #[test]
    fn jwt_rejects_the_wrong_secret() {
        let token = create_jwt("user-42", "test-secret").unwrap();
        assert!(validate_jwt(&token, "other-secret").is_err());
    }

    #[test]
    fn email_syntax_check() {
        assert!(is_valid_email("c@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("missing@tld"));
    }
}
