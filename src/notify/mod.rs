//! Best-effort welcome notifications.
//!
//! Registration hands a notification to [`NotificationQueue::enqueue`], which
//! never waits: the message goes onto a bounded channel drained by a single
//! worker task. A full or closed queue drops the message with a warning, and
//! notifier failures are logged and not retried.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Notification collaborator
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_welcome(&self, email: &str, name: &str) -> Result<(), NotifyError>;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome(&self, email: &str, name: &str) -> Result<(), NotifyError> {
        info!(to = %email, "EMAIL LOG - Welcome {}! Thank you for joining our SaaS platform.", name);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeNotification {
    pub email: String,
    pub name: String,
}

/// Producer side of the notification queue
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::Sender<WelcomeNotification>,
}

impl NotificationQueue {
    /// Start the worker on the current tokio runtime
    pub fn spawn(notifier: Arc<dyn Notifier>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<WelcomeNotification>(capacity.max(1));

        let worker = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                if let Err(e) = notifier.send_welcome(&message.email, &message.name).await {
                    warn!(to = %message.email, "Welcome notification failed: {}", e);
                }
            }
        });

        (Self { tx }, worker)
    }

    /// Queue a welcome message without waiting. Returns whether it was accepted.
    pub fn enqueue(&self, message: WelcomeNotification) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(message)) => {
                warn!(to = %message.email, "Notification queue full, dropping welcome message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                warn!(to = %message.email, "Notification queue closed, dropping welcome message");
                false
            }
        }
    }
}
