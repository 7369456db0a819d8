use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::error::AppResult;
use crate::state::AppState;

use super::account::MessageResponse;
use super::bearer_header;

#[derive(Deserialize)]
pub struct PublishRequest {
    pub video_id: i64,
    pub content: String,
}

pub async fn publish(state: web::Data<AppState>, req: HttpRequest, body: web::Json<PublishRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    let account = state
        .accounts
        .find_by_id(account_id)
        .await?
        .ok_or_else(|| crate::error::AppError::Internal("authenticated account vanished".into()))?;
    state
        .interactions
        .publish_comment(body.video_id, account_id, &account.username, &body.content)
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "comment published".into() }))
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub comment_id: i64,
}

pub async fn delete(state: web::Data<AppState>, req: HttpRequest, body: web::Json<DeleteRequest>) -> AppResult<HttpResponse> {
    let account_id = state.auth.authenticate(bearer_header(&req)).await?;
    state.interactions.delete_comment(body.comment_id, account_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse { message: "comment deleted".into() }))
}

#[derive(Deserialize)]
pub struct ListAllRequest {
    pub video_id: i64,
}

pub async fn list_all(state: web::Data<AppState>, body: web::Json<ListAllRequest>) -> AppResult<HttpResponse> {
    let comments = state.comments.list_all(body.video_id).await?;
    Ok(HttpResponse::Ok().json(comments))
}
