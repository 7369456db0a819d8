use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tokio::task::JoinSet;

use interaction_engine::auth::AuthGate;
use interaction_engine::cache::CacheAccess;
use interaction_engine::events::EventBus;
use interaction_engine::repository::accounts::AccountRepository;
use interaction_engine::repository::comments::CommentRepository;
use interaction_engine::repository::follows::FollowRepository;
use interaction_engine::repository::likes::LikeRepository;
use interaction_engine::repository::videos::VideoRepository;
use interaction_engine::services::feed::FeedService;
use interaction_engine::services::interactions::InteractionService;
use interaction_engine::workers::comment_worker::CommentWorker;
use interaction_engine::workers::like_worker::LikeWorker;
use interaction_engine::workers::popularity_worker::PopularityWorker;
use interaction_engine::workers::social_worker::SocialWorker;
use interaction_engine::workers::{self, Outcome};
use interaction_engine::{handlers, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!(env = %config.app.env, "starting interaction engine");

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let redis = redis_utils::connect(&config.redis.url).await?;
    let cache = CacheAccess::new(redis);

    let accounts = AccountRepository::new(pool.clone());
    let videos = VideoRepository::new(pool.clone());
    let likes = LikeRepository::new(pool.clone());
    let comments = CommentRepository::new(pool.clone());
    let follows = FollowRepository::new(pool.clone());

    let bus = EventBus::new(&config.kafka.brokers)?;
    let auth = AuthGate::new(cache.clone(), accounts.clone(), config.auth.jwt_secret.clone());
    let interactions = InteractionService::new(
        videos.clone(),
        likes.clone(),
        comments.clone(),
        follows.clone(),
        cache.clone(),
        bus.clone(),
    );
    let feed = FeedService::new(videos.clone(), likes.clone(), cache.clone());

    let state = AppState {
        config: config.clone(),
        accounts,
        videos: videos.clone(),
        likes: likes.clone(),
        comments: comments.clone(),
        follows: follows.clone(),
        auth,
        interactions,
        feed,
        cache: cache.clone(),
        bus: bus.clone(),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut tasks = JoinSet::new();

    let http_host = config.app.host.clone();
    let http_port = config.app.http_port;
    let http_state = state.clone();
    tasks.spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(http_state.clone()))
                .configure(handlers::configure)
        })
        .bind((http_host.as_str(), http_port))?
        .run()
        .await
        .map_err(anyhow::Error::from)
    });

    if config.app.run_workers_in_process {
        spawn_workers(&mut tasks, &config, videos, likes, comments, follows, cache, shutdown_rx);
    }

    tokio::spawn(shutdown_signal(shutdown_tx));

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!("task exited with error: {err}"),
            Err(err) => tracing::error!("task panicked: {err}"),
        }
    }

    Ok(())
}

fn spawn_workers(
    tasks: &mut JoinSet<anyhow::Result<()>>,
    config: &Config,
    videos: VideoRepository,
    likes: LikeRepository,
    comments: CommentRepository,
    follows: FollowRepository,
    cache: CacheAccess,
    shutdown_rx: watch::Receiver<bool>,
) {
    let brokers = config.kafka.brokers.clone();
    let group = config.kafka.consumer_group.clone();

    {
        let brokers = brokers.clone();
        let group = group.clone();
        let worker = LikeWorker::new(videos.clone(), likes);
        let shutdown_rx = shutdown_rx.clone();
        tasks.spawn(async move {
            let consumer = workers::build_consumer(&brokers, &group, event_schema::topics::LIKE_EVENTS)?;
            workers::run_loop(consumer, shutdown_rx, move |envelope| {
                let worker = worker.clone();
                async move { worker.apply(&envelope.action, envelope.payload).await }
            })
            .await;
            Ok(())
        });
    }

    {
        let brokers = brokers.clone();
        let group = group.clone();
        let worker = CommentWorker::new(videos.clone(), comments);
        let shutdown_rx = shutdown_rx.clone();
        tasks.spawn(async move {
            let consumer = workers::build_consumer(&brokers, &group, event_schema::topics::COMMENT_EVENTS)?;
            // comment.events carries two distinct payload shapes keyed
            // by `action`; decode as untyped JSON and dispatch.
            workers::run_loop::<serde_json::Value, _, _>(consumer, shutdown_rx, move |envelope| {
                let worker = worker.clone();
                async move {
                    if envelope.action == event_schema::actions::COMMENT_PUBLISH {
                        match serde_json::from_value(envelope.payload) {
                            Ok(payload) => worker.apply_publish(payload).await,
                            Err(_) => Outcome::Done,
                        }
                    } else {
                        match serde_json::from_value(envelope.payload) {
                            Ok(payload) => worker.apply_delete(payload).await,
                            Err(_) => Outcome::Done,
                        }
                    }
                }
            })
            .await;
            Ok(())
        });
    }

    {
        let brokers = brokers.clone();
        let group = group.clone();
        let worker = SocialWorker::new(follows);
        let shutdown_rx = shutdown_rx.clone();
        tasks.spawn(async move {
            let consumer = workers::build_consumer(&brokers, &group, event_schema::topics::SOCIAL_EVENTS)?;
            workers::run_loop(consumer, shutdown_rx, move |envelope| {
                let worker = worker.clone();
                async move {
                    if envelope.action == event_schema::actions::SOCIAL_FOLLOW {
                        worker.apply_follow(envelope.payload).await
                    } else {
                        worker.apply_unfollow(envelope.payload).await
                    }
                }
            })
            .await;
            Ok(())
        });
    }

    {
        let worker = PopularityWorker::new(cache);
        tasks.spawn(async move {
            let consumer = workers::build_consumer(&brokers, &group, event_schema::topics::VIDEO_POPULARITY_EVENTS)?;
            workers::run_loop(consumer, shutdown_rx, move |envelope| {
                let worker = worker.clone();
                async move { worker.apply(envelope.payload).await }
            })
            .await;
            Ok(())
        });
    }
}

#[cfg(unix)]
async fn shutdown_signal(tx: watch::Sender<bool>) {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
    tracing::info!("shutdown signal received");
    let _ = tx.send(true);
}

#[cfg(not(unix))]
async fn shutdown_signal(tx: watch::Sender<bool>) {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
    let _ = tx.send(true);
}
