use std::sync::Arc;
use std::time::Duration;
use chrono::Utc;
use tokio::time::sleep;
use tracing::{debug, error, info, warn, info_span, Instrument};
use crate::state::AppState;
use crate::domain::models::job::{Job, JobPayload, MAX_ATTEMPTS};
use crate::error::AppError;

const BATCH_SIZE: i32 = 10;

pub async fn start_background_worker(state: Arc<AppState>) {
    info!("Starting background job worker...");

    let poll = Duration::from_secs(state.config.worker_poll_secs.max(1));
    loop {
        process_pending_jobs(&state).await;

        let pruned = state.booking_service.prune_idle_locks() + state.schedule_service.prune_idle_locks();
        if pruned > 0 {
            debug!("Pruned {} idle locks", pruned);
        }

        sleep(poll).await;
    }
}

/// Claims one batch of due jobs and delivers them. Returns how many were claimed.
pub async fn process_pending_jobs(state: &Arc<AppState>) -> usize {
    let jobs = match state.job_repo.find_pending(BATCH_SIZE).await {
        Ok(jobs) => jobs,
        Err(e) => {
            error!("Failed to fetch pending jobs: {:?}", e);
            return 0;
        }
    };

    let claimed = jobs.len();
    for job in jobs {
        let span = info_span!(
            "background_job",
            job_id = %job.id,
            job_type = %job.job_type,
            booking_id = %job.booking_id,
            attempt = job.attempts
        );

        async {
            info!("Processing job: {}", job.job_type);
            match process_job(state, &job).await {
                Ok(_) => {
                    info!("Job completed successfully");
                    if let Err(e) = state.job_repo.mark_completed(&job.id).await {
                        error!("Failed to mark job as completed: {:?}", e);
                    }
                }
                Err(e) => {
                    let err_msg = format!("{}", e);
                    if job.attempts < MAX_ATTEMPTS {
                        let retry_at = job.retry_at(Utc::now());
                        warn!("Job failed ({}), retrying at {}", err_msg, retry_at);
                        if let Err(up_err) = state.job_repo.schedule_retry(&job.id, retry_at, err_msg).await {
                            error!("Failed to reschedule job: {:?}", up_err);
                        }
                    } else {
                        error!("Job failed permanently after {} attempts: {}", job.attempts, err_msg);
                        if let Err(up_err) = state.job_repo.mark_failed(&job.id, err_msg).await {
                            error!("Failed to mark job as failed: {:?}", up_err);
                        }
                    }
                }
            }
        }
            .instrument(span)
            .await;
    }
    claimed
}

async fn process_job(state: &Arc<AppState>, job: &Job) -> Result<(), AppError> {
    match &job.payload.0 {
        JobPayload::Payment(notice) => {
            info!("Sending {:?} for amount {}", notice.status, notice.amount);
            state.payment_service.notify(notice).await
        }
        JobPayload::Notification(notice) => {
            info!("Notifying {} of {}", notice.recipient_id, notice.event_code);
            state.notification_service.notify(notice).await
        }
    }
}
