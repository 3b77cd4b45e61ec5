use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::db::Database;
use crate::services::video::{VideoError, VideoService};

pub async fn run(db: Arc<Database>, video: Arc<VideoService>) -> Result<(), VideoError> {
    let start = Instant::now();
    debug!("Starting video cleanup cycle");

    let summary = video.cleanup_old(db.as_ref()).await?;

    info!(
        deleted = summary.deleted,
        duration_secs = format!("{:.2}", start.elapsed().as_secs_f64()),
        "Video cleanup completed"
    );

    Ok(())
}
