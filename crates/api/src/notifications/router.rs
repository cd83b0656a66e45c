//! Event-to-notification routing.
//!
//! Every recipient listed on a [`PlatformEvent`] gets an in-app
//! notification carrying the event's type and message, deep-linked to the
//! source entity. Write failures are logged and dropped.

use carryshare_core::types::DbId;
use carryshare_db::repositories::NotificationRepo;
use carryshare_db::DbPool;
use carryshare_events::PlatformEvent;
use tokio::sync::broadcast;

/// Turns platform events into notification rows.
pub struct NotificationRouter {
    pool: DbPool,
}

impl NotificationRouter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run the routing loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](carryshare_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.route_event(&event).await;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Notify every recipient of `event`. Returns how many rows were written.
    pub async fn route_event(&self, event: &PlatformEvent) -> usize {
        let mut delivered = 0;
        for &user_id in &event.recipients {
            if self
                .notify(
                    user_id,
                    &event.event_type,
                    &event.message,
                    event.source_entity_id,
                )
                .await
            {
                delivered += 1;
            }
        }
        tracing::debug!(
            event_type = %event.event_type,
            recipients = event.recipients.len(),
            delivered,
            "Event routed"
        );
        delivered
    }

    /// Write a single notification. Failures are logged and reported as
    /// `false`, never propagated.
    pub async fn notify(
        &self,
        user_id: DbId,
        notification_type: &str,
        message: &str,
        related_entity_id: Option<DbId>,
    ) -> bool {
        match NotificationRepo::create(
            &self.pool,
            user_id,
            notification_type,
            message,
            related_entity_id,
        )
        .await
        {
            Ok(id) => {
                tracing::debug!(notification_id = id, user_id, notification_type, "Notification created");
                true
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id,
                    notification_type,
                    related_entity_id = ?related_entity_id,
                    "Failed to create notification"
                );
                false
            }
        }
    }
}
