//! # Notification Seam
//!
//! The engine reports order events through an injected [`OrderNotifier`];
//! delivery channels (WhatsApp, email, push) live behind the trait so the
//! engine never depends on one.
//!
//! ## Fire-and-Forget Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Notifications NEVER affect the order outcome.                      │
//! │                                                                     │
//! │  place_order ──── COMMIT ────▶ Ok(aggregate)  (returned to caller)  │
//! │                      │                                              │
//! │                      └──▶ tokio::spawn(notify_new_order)            │
//! │                                │                                    │
//! │                                └─ Err(e) → warn! and drop           │
//! │                                                                     │
//! │  An order that committed but failed to notify is a delivered        │
//! │  order with a logging footnote, not a failure.                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use granja_core::OrderStatus;

/// Failure reported by a notification channel.
#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

/// Context for a new-order notification.
#[derive(Debug, Clone)]
pub struct NewOrderNotice {
    pub order_id: String,
    /// Customer display name, when the user directory knows them.
    pub customer_name: Option<String>,
    pub total: f64,
}

/// Context for an order state transition.
#[derive(Debug, Clone)]
pub struct StatusChangeNotice {
    pub order_id: String,
    pub new_estado: OrderStatus,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

/// Outbound notification channel for order events.
///
/// Implementations must be cheap to call or internally queued; the engine
/// dispatches on a spawned task but does not rate-limit.
#[async_trait]
pub trait OrderNotifier: Send + Sync {
    /// A new order was committed.
    async fn notify_new_order(&self, notice: &NewOrderNotice) -> Result<(), NotifyError>;

    /// An order's estado actually changed (no-op writes are filtered out
    /// before this is called).
    async fn notify_status_change(&self, notice: &StatusChangeNotice) -> Result<(), NotifyError>;
}

/// Default notifier that only writes structured log lines.
///
/// Useful for development and as the fallback when no channel is wired up.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn notify_new_order(&self, notice: &NewOrderNotice) -> Result<(), NotifyError> {
        info!(
            order_id = %notice.order_id,
            customer = notice.customer_name.as_deref().unwrap_or("?"),
            total = notice.total,
            "Nuevo pedido"
        );
        Ok(())
    }

    async fn notify_status_change(&self, notice: &StatusChangeNotice) -> Result<(), NotifyError> {
        info!(
            order_id = %notice.order_id,
            estado = %notice.new_estado,
            customer = notice.customer_name.as_deref().unwrap_or("?"),
            "Cambio de estado"
        );
        Ok(())
    }
}

/// Dispatches a new-order notice on a background task.
pub(crate) fn dispatch_new_order(notifier: Arc<dyn OrderNotifier>, notice: NewOrderNotice) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify_new_order(&notice).await {
            warn!(order_id = %notice.order_id, error = %e, "New-order notification failed");
        }
    });
}

/// Dispatches a status-change notice on a background task.
pub(crate) fn dispatch_status_change(
    notifier: Arc<dyn OrderNotifier>,
    notice: StatusChangeNotice,
) {
    tokio::spawn(async move {
        if let Err(e) = notifier.notify_status_change(&notice).await {
            warn!(order_id = %notice.order_id, error = %e, "Status-change notification failed");
        }
    });
}
