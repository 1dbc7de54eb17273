use crate::db::Database;
use chrono::Utc;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::time::interval;

const CHECK_INTERVAL_SECONDS: u64 = 60;

/// Periodically close elections whose end date has passed. Closing cascades
/// to the election's races, which stops vote casting and makes them
/// tallyable.
pub async fn check_expired_elections_task(database: Arc<Database>) {
    info!("Starting background task to close expired elections...");
    let mut interval = interval(StdDuration::from_secs(CHECK_INTERVAL_SECONDS));

    loop {
        interval.tick().await;
        let now = Utc::now();

        match database.get_expired_elections(now).await {
            Ok(expired) => {
                if !expired.is_empty() {
                    info!("Found {} expired election(s).", expired.len());
                }
                for election in expired {
                    info!("Closing expired election: {} ({})", election.title, election.id);
                    if let Err(e) = database.close_election(&election.id).await {
                        error!("Failed to close election {}: {}", election.id, e);
                    }
                }
            }
            Err(e) => {
                error!("Failed to query for expired elections: {}", e);
            }
        }
    }
}
