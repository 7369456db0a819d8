use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

use super::account::MessageResponse;
use super::bearer_header;

#[derive(Deserialize)]
pub struct VloggerIdRequest {
    pub vlogger_id: i64,
}

pub async fn follow(state: web::Data<AppState>, req: HttpRequest, body: web::Json<VloggerIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    state.interactions.follow(account_id, body.vlogger_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "followed".into() }))
}

pub async fn unfollow(state: web::Data<AppState>, req: HttpRequest, body: web::Json<VloggerIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    state.interactions.unfollow(account_id, body.vlogger_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "unfollowed".into() }))
}

#[derive(Deserialize, Default)]
pub struct FollowerIdRequest {
    pub follower_id: Option<i64>,
}

pub async fn get_all_followers(state: web::Data<AppState>, req: HttpRequest, body: web::Json<FollowerIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    let vlogger_id = body.follower_id.unwrap_or(account_id);
    let followers = state.follows.list_followers(vlogger_id).await?;
    let public: Vec<_> = followers.into_iter().map(crate::domain::AccountPublic::from).collect();
    Ok(HttpResponse::Ok().json(public))
}

pub async fn get_all_vloggers(state: web::Data<AppState>, req: HttpRequest, body: web::Json<FollowerIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    let follower_id = body.follower_id.unwrap_or(account_id);
    let vloggers = state.follows.list_vloggers(follower_id).await?;
    let public: Vec<_> = vloggers.into_iter().map(crate::domain::AccountPublic::from).collect();
    Ok(HttpResponse::Ok().json(public))
}
