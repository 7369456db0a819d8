use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::password;
use crate::domain::AccountPublic;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

use super::bearer_header;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn register(state: web::Data<AppState>, body: web::Json<RegisterRequest>) -> AppResult<HttpResponse> {
    if body.username.trim().is_empty() || body.password.len() < 6 {
        return Err(AppError::Validation("username and a password of at least 6 characters are required".into()));
    }
    let hash = password::hash(&body.password)?;
    // No session yet: the row is created with an empty token, overwritten
    // on the first login.
    state.accounts.create(&body.username, &hash, "").await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "account registered".into(),
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> AppResult<HttpResponse> {
    let account = state
        .accounts
        .find_by_username(&body.username)
        .await?
        .ok_or_else(|| AppError::Validation("invalid username or password".into()))?;
    if !password::verify(&body.password, &account.password_hash)? {
        return Err(AppError::Validation("invalid username or password".into()));
    }
    let token = crate::auth::jwt::issue(
        account.id,
        &account.username,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )?;
    state.accounts.set_current_token(account.id, &token).await?;
    state.auth.warm(account.id, &token).await;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    state.accounts.clear_current_token(account_id).await?;
    state.auth.evict(account_id).await;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "logged out".into(),
    }))
}

#[derive(Deserialize)]
pub struct RenameRequest {
    pub new_username: String,
}

pub async fn rename(state: web::Data<AppState>, req: HttpRequest, body: web::Json<RenameRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    if body.new_username.trim().is_empty() {
        return Err(AppError::Validation("new_username must not be empty".into()));
    }
    state.accounts.rename(account_id, &body.new_username).await?;
    let token = crate::auth::jwt::issue(
        account_id,
        &body.new_username,
        &state.config.auth.jwt_secret,
        state.config.auth.token_ttl_secs,
    )?;
    state.accounts.set_current_token(account_id, &token).await?;
    state.auth.warm(account_id, &token).await;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub username: String,
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(state: web::Data<AppState>, body: web::Json<ChangePasswordRequest>) -> AppResult<HttpResponse> {
    let account = state
        .accounts
        .find_by_username(&body.username)
        .await?
        .ok_or_else(|| AppError::Validation("invalid username or password".into()))?;
    if !password::verify(&body.old_password, &account.password_hash)? {
        return Err(AppError::Validation("invalid username or password".into()));
    }
    if body.new_password.len() < 6 {
        return Err(AppError::Validation("new password must be at least 6 characters".into()));
    }
    let new_hash = password::hash(&body.new_password)?;
    state.accounts.set_password_hash(account.id, &new_hash).await?;
    state.accounts.clear_current_token(account.id).await?;
    state.auth.evict(account.id).await;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "password changed".into(),
    }))
}

#[derive(Deserialize)]
pub struct FindByIdRequest {
    pub id: i64,
}

pub async fn find_by_id(state: web::Data<AppState>, body: web::Json<FindByIdRequest>) -> AppResult<HttpResponse> {
    if body.id <= 0 {
        return Err(AppError::Validation("id must be positive".into()));
    }
    let account = state
        .accounts
        .find_by_id(body.id)
        .await?
        .ok_or_else(|| AppError::Validation("account not found".into()))?;
    Ok(HttpResponse::Ok().json(AccountPublic::from(account)))
}

#[derive(Deserialize)]
pub struct FindByUsernameRequest {
    pub username: String,
}

pub async fn find_by_username(state: web::Data<AppState>, body: web::Json<FindByUsernameRequest>) -> AppResult<HttpResponse> {
    let account = state
        .accounts
        .find_by_username(&body.username)
        .await?
        .ok_or_else(|| AppError::Validation("account not found".into()))?;
    Ok(HttpResponse::Ok().json(AccountPublic::from(account)))
}
