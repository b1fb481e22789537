use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Queues an event without waiting, logging instead of failing when the
    /// channel is full or closed. Catalog writes have already committed by the
    /// time events go out.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            warn!(error = %e, "Dropping catalog event");
        }
    }
}

/// Catalog events emitted after a write commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    VariantsReconciled {
        product_id: Uuid,
        created: usize,
        deleted: usize,
        unchanged: usize,
        at: DateTime<Utc>,
    },
    ProductAttributesSynced {
        product_id: Uuid,
        attribute_count: usize,
        value_count: usize,
    },
    SiteSettingsUpdated {
        keys: Vec<String>,
    },
    SiteSettingsCacheCleared,
}

impl Event {
    pub fn variants_reconciled(
        product_id: Uuid,
        created: usize,
        deleted: usize,
        unchanged: usize,
    ) -> Self {
        Event::VariantsReconciled {
            product_id,
            created,
            deleted,
            unchanged,
            at: Utc::now(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::VariantsReconciled { .. } => "variants_reconciled",
            Event::ProductAttributesSynced { .. } => "product_attributes_synced",
            Event::SiteSettingsUpdated { .. } => "site_settings_updated",
            Event::SiteSettingsCacheCleared => "site_settings_cache_cleared",
        }
    }
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("storefront_events_total", 1, "event" => event.name());

        match event {
            Event::VariantsReconciled {
                product_id,
                created,
                deleted,
                unchanged,
                ..
            } => {
                info!(
                    %product_id,
                    created, deleted, unchanged, "Variants reconciled"
                );
                counter!("storefront_variants_created_total", created as u64);
                counter!("storefront_variants_deleted_total", deleted as u64);
            }
            Event::ProductAttributesSynced {
                product_id,
                attribute_count,
                value_count,
            } => {
                info!(
                    %product_id,
                    attribute_count, value_count, "Product attributes synced"
                );
            }
            Event::SiteSettingsUpdated { keys } => {
                info!(keys = ?keys, "Site settings updated");
            }
            Event::SiteSettingsCacheCleared => {
                info!("Site settings cache cleared");
            }
        }
    }

    warn!("Event processing loop has ended");
}
