use applicant_intake::telegram::TelegramClient;
use applicant_intake::workflows::intake::{IntakeService, SessionStore};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Pause after a failed poll before asking the bot API again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

type BotService<S> = IntakeService<S, TelegramClient>;

/// Long-polls the bot API and feeds every update through the intake service in arrival order.
pub(crate) async fn poll_updates<S>(
    client: Arc<TelegramClient>,
    service: Arc<BotService<S>>,
    readiness: Arc<AtomicBool>,
) where
    S: SessionStore + 'static,
{
    let mut offset: Option<i64> = None;
    loop {
        let updates = match client.get_updates(offset).await {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "polling for updates failed");
                tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                continue;
            }
        };
        if !readiness.swap(true, Ordering::AcqRel) {
            info!("bot api reachable, accepting updates");
        }

        for update in updates {
            offset = Some(update.update_id + 1);
            let update_id = update.update_id;
            let Some((chat, event)) = update.into_event() else {
                debug!(update_id, "ignoring unsupported update");
                continue;
            };

            let kind = event.kind();
            metrics::counter!("intake_events_total", "kind" => kind).increment(1);
            match service.handle(chat, event).await {
                Ok(handled) => {
                    if handled.submitted {
                        metrics::counter!("intake_applications_total").increment(1);
                    }
                    if let Some(step) = handled.step.filter(|step| step.is_terminal()) {
                        debug!(%chat, %step, "chat reached the end of the flow");
                    }
                }
                Err(err) => error!(%chat, kind, error = %err, "failed to handle update"),
            }
        }
    }
}

/// Periodically drops sessions idle for longer than the configured TTL.
pub(crate) async fn sweep_sessions<S>(service: Arc<BotService<S>>)
where
    S: SessionStore + 'static,
{
    let mut ticker = tokio::time::interval(service.config().sweep_interval);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        if let Err(err) = service.evict_expired(Utc::now()) {
            warn!(error = %err, "session sweep failed");
        }
    }
}
