pub mod account;
pub mod comment;
pub mod feed;
pub mod like;
pub mod social;
pub mod video;

use actix_web::web;
use actix_web::HttpRequest;

pub fn bearer_header(req: &HttpRequest) -> Option<&str> {
    req.headers().get("Authorization").and_then(|v| v.to_str().ok())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/account/register").route(web::post().to(account::register)))
        .service(web::resource("/account/login").route(web::post().to(account::login)))
        .service(web::resource("/account/logout").route(web::post().to(account::logout)))
        .service(web::resource("/account/rename").route(web::post().to(account::rename)))
        .service(web::resource("/account/changePassword").route(web::post().to(account::change_password)))
        .service(web::resource("/account/findByID").route(web::post().to(account::find_by_id)))
        .service(web::resource("/account/findByUsername").route(web::post().to(account::find_by_username)))
        .service(web::resource("/video/publish").route(web::post().to(video::publish)))
        .service(web::resource("/video/getDetail").route(web::post().to(video::get_detail)))
        .service(web::resource("/video/listByAuthorID").route(web::post().to(video::list_by_author_id)))
        .service(web::resource("/like/like").route(web::post().to(like::like)))
        .service(web::resource("/like/unlike").route(web::post().to(like::unlike)))
        .service(web::resource("/like/isLiked").route(web::post().to(like::is_liked)))
        .service(web::resource("/like/listMyLikedVideos").route(web::post().to(like::list_my_liked_videos)))
        .service(web::resource("/comment/publish").route(web::post().to(comment::publish)))
        .service(web::resource("/comment/delete").route(web::post().to(comment::delete)))
        .service(web::resource("/comment/listAll").route(web::post().to(comment::list_all)))
        .service(web::resource("/social/follow").route(web::post().to(social::follow)))
        .service(web::resource("/social/unfollow").route(web::post().to(social::unfollow)))
        .service(web::resource("/social/getAllFollowers").route(web::post().to(social::get_all_followers)))
        .service(web::resource("/social/getAllVloggers").route(web::post().to(social::get_all_vloggers)))
        .service(web::resource("/feed/listLatest").route(web::post().to(feed::list_latest)))
        .service(web::resource("/feed/listLikesCount").route(web::post().to(feed::list_likes_count)))
        .service(web::resource("/feed/listByPopularity").route(web::post().to(feed::list_by_popularity)))
        .service(web::resource("/feed/listByFollowing").route(web::post().to(feed::list_by_following)));
}

async fn health() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
