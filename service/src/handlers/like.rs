use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

use super::account::MessageResponse;
use super::bearer_header;

#[derive(Deserialize)]
pub struct VideoIdRequest {
    pub video_id: i64,
}

pub async fn like(state: web::Data<AppState>, req: HttpRequest, body: web::Json<VideoIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    state.interactions.like(body.video_id, account_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "liked".into() }))
}

pub async fn unlike(state: web::Data<AppState>, req: HttpRequest, body: web::Json<VideoIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    state.interactions.unlike(body.video_id, account_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "unliked".into() }))
}

#[derive(Serialize)]
pub struct IsLikedResponse {
    pub is_liked: bool,
}

pub async fn is_liked(state: web::Data<AppState>, req: HttpRequest, body: web::Json<VideoIdRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    let is_liked = state.likes.is_liked(body.video_id, account_id).await?;
    Ok(HttpResponse::Ok().json(IsLikedResponse { is_liked }))
}

pub async fn list_my_liked_videos(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    let ids = state.likes.list_liked_video_ids(account_id).await?;
    let videos = state.videos.get_by_ids(&ids).await?;
    Ok(HttpResponse::Ok().json(videos))
}
