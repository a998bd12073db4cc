use clap::Parser;
use tracing::info;

use crate::{
    auth::{db::AuthDatabase, Auth},
    catalog::CatalogDb,
    config::{Config, StartArgs},
    engagement::EngagementDb,
    state::Portal,
    storage::BlobStore,
};

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod engagement;
pub mod error;
pub mod identity;
pub mod router;
pub mod search;
pub mod state;
pub mod storage;
pub mod upload;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let StartArgs {
        config_path,
        address: host,
        port,
        log_level: level,
    } = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(level).init();

    let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db_pool = db::create_pool(&db_url)
        .await
        .expect("error while connecting to db");

    db::migrate(&db_pool).await.expect("error in migrations");

    let addr = format!("{host}:{port}");

    let Config { storage, admin } = Config::read(config_path).expect("invalid config file");

    let blobs = BlobStore::new(storage.root.clone(), storage.max_upload_bytes)
        .await
        .expect("error while initializing object store");

    let catalog = CatalogDb::new(db_pool.clone());
    let engagement = EngagementDb::new(db_pool.clone());
    let auth_db = AuthDatabase::new(db_pool);

    let state = Portal::new(catalog, engagement, blobs, storage.public_url);

    info!("Now listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("error while starting TCP listener");

    let router = router::router(
        state,
        admin.map(|config| Auth::new(auth_db, config)),
        storage.max_upload_bytes,
    );

    axum::serve(listener, router)
        .await
        .expect("error while starting server");
}
