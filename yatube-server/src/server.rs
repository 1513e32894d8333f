use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::listing_cache::ListingCache;
use crate::data::group_repository::GroupRepository;
use crate::data::post_repository::PostRepository;
use crate::data::repositories::memory::MemoryStore;
use crate::data::repositories::postgres::group_repository::PostgresGroupRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::pagination::Paginator;
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::settings::Settings;
use crate::presentation::middleware::cors::apply_cors;
use crate::presentation::middleware::layers::{apply_limits, apply_trace};
use crate::presentation::openapi::ApiDoc;
use crate::presentation::{AppState, http_handlers};

struct Repositories {
    posts: Arc<dyn PostRepository>,
    groups: Arc<dyn GroupRepository>,
    users: Arc<dyn UserRepository>,
}

pub(crate) async fn build_state(settings: &Settings) -> Result<AppState> {
    let repos = match &settings.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Repositories {
                posts: Arc::new(PostgresPostRepository::new(pool.clone())),
                groups: Arc::new(PostgresGroupRepository::new(pool.clone())),
                users: Arc::new(PostgresUserRepository::new(pool)),
            }
        }
        None => {
            warn!("DATABASE_URL is not set, data lives in memory and is lost on exit");
            let store = MemoryStore::new();
            Repositories {
                posts: Arc::new(store.clone()),
                groups: Arc::new(store.clone()),
                users: Arc::new(store),
            }
        }
    };

    let jwt = Arc::new(JwtService::new(
        &settings.jwt_secret,
        settings.jwt_ttl_seconds,
    ));
    let paginator = Paginator::new(settings.page_size)?;
    info!(
        per_page = paginator.per_page(),
        index_cache_ttl_secs = settings.index_cache_ttl.as_secs(),
        "listing settings"
    );
    let blog_service = Arc::new(BlogService::new(
        repos.posts,
        repos.groups,
        repos.users.clone(),
        paginator,
        ListingCache::new(settings.index_cache_ttl),
    ));
    let auth_service = Arc::new(AuthService::new(repos.users, jwt.clone()));

    Ok(AppState::new(auth_service, blog_service, jwt))
}

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> Result<()> {
    let app = build_router(state);
    let app = apply_limits(app, settings);
    let app = apply_trace(app);
    let app = apply_cors(app, settings)?;

    let listener = TcpListener::bind(&settings.http_addr).await?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) fn build_router(state: AppState) -> Router {
    http_handlers::routes(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
