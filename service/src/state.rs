use crate::auth::AuthGate;
use crate::cache::CacheAccess;
use crate::config::Config;
use crate::events::EventBus;
use crate::repository::accounts::AccountRepository;
use crate::repository::comments::CommentRepository;
use crate::repository::follows::FollowRepository;
use crate::repository::likes::LikeRepository;
use crate::repository::videos::VideoRepository;
use crate::services::feed::FeedService;
use crate::services::interactions::InteractionService;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub accounts: AccountRepository,
    pub videos: VideoRepository,
    pub likes: LikeRepository,
    pub comments: CommentRepository,
    pub follows: FollowRepository,
    pub auth: AuthGate,
    pub interactions: InteractionService,
    pub feed: FeedService,
    pub cache: CacheAccess,
    pub bus: EventBus,
}
