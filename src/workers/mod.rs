mod video_cleanup;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{error, info, warn};

use crate::db::Database;
use crate::services::video::VideoService;

const DEFAULT_CLEANUP_SCHEDULE: &str = "0 0 * * * *";

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}

pub struct WorkerManager {
    scheduler: Mutex<JobScheduler>,
    shutdown_tx: broadcast::Sender<()>,
    db: Arc<Database>,
    video: Arc<VideoService>,
}

impl WorkerManager {
    pub async fn new(db: Arc<Database>, video: Arc<VideoService>) -> Result<Self, WorkerError> {
        let scheduler = JobScheduler::new().await?;
        let (shutdown_tx, _) = broadcast::channel(1);
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            shutdown_tx,
            db,
            video,
        })
    }

    pub async fn start(&self) -> Result<(), WorkerError> {
        let leader = std::env::var("WORKER_LEADER")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        if !leader {
            info!("WORKER_LEADER not set, skipping worker startup");
            return Ok(());
        }

        info!("Starting workers (leader mode)");

        let enable_cleanup = std::env::var("ENABLE_VIDEO_CLEANUP_WORKER")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let scheduler = self.scheduler.lock().await;

        if enable_cleanup {
            let schedule = std::env::var("VIDEO_CLEANUP_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_CLEANUP_SCHEDULE.to_string());
            let db = Arc::clone(&self.db);
            let video = Arc::clone(&self.video);
            let shutdown_rx = self.shutdown_tx.subscribe();
            let job = Job::new_async(schedule.as_str(), move |_uuid, _lock| {
                let db = Arc::clone(&db);
                let video = Arc::clone(&video);
                let mut rx = shutdown_rx.resubscribe();
                Box::pin(async move {
                    tokio::select! {
                        _ = rx.recv() => {},
                        result = video_cleanup::run(db, video) => {
                            if let Err(e) = result {
                                error!(error = %e, "Video cleanup worker error");
                            }
                        }
                    }
                })
            })?;
            scheduler.add(job).await?;
            info!(schedule = %schedule, "Video cleanup worker scheduled");
        }

        scheduler.start().await?;
        Ok(())
    }

    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(());
        let mut scheduler = self.scheduler.lock().await;
        if let Err(e) = scheduler.shutdown().await {
            warn!(error = %e, "scheduler shutdown failed");
        }
    }
}
