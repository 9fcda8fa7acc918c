use clap::Parser;
use dotenvy::dotenv;
use tower_sessions::SessionManagerLayer;
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::EnvFilter;

use gatekeep::auth::authenticator;
use gatekeep::config::Config;
use gatekeep::database;
use gatekeep::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    authenticator::dummy_hash(config.bcrypt_cost)
        .await
        .expect("failed to hash at the configured bcrypt cost");

    let pool = database::connect(&config.database_url)
        .await
        .expect("failed to open the database");
    database::migrate(&pool)
        .await
        .expect("failed to create the users table");

    // sessions live next to the users, in the same database
    let session_store = SqliteStore::new(pool.clone());
    session_store
        .migrate()
        .await
        .expect("failed to create the session table");

    let session_key = config.session_key().expect("invalid session secret");
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.secure_cookies)
        .with_signed(session_key);

    let addr = config.site_addr.clone();
    let app = gatekeep::router(AppState::new(pool, config)).layer(session_layer);

    tracing::info!("listening on http://{}", &addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind the tcp address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("failed to serve on the address");
}
