use elect::db::Database;
use elect::tasks;
use log::{error, info};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Initialize logging
    dotenvy::dotenv().ok();
    env_logger::init();

    // Initialize database
    let database = match Database::new().await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return;
        }
    };

    // Background task closing elections past their end date
    let db_clone = Arc::clone(&database);
    tokio::spawn(async move {
        tasks::election_closer::check_expired_elections_task(db_clone).await;
    });

    info!("elect backend ready");
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down.");
}
