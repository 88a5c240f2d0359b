use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dojo_common::badges::find_badge;
use dojo_common::challenges::ChallengeType;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    BadgeEarned {
        user_id: String,
        badge_id: String,
        title: String,
        message: String,
        icon: String,
        earned_at: DateTime<Utc>,
    },
    ChallengeCompleted {
        user_id: String,
        challenge_type: ChallengeType,
        streak: u32,
    },
}

impl Notification {
    pub fn badge_earned(user_id: &str, badge_id: &str, earned_at: DateTime<Utc>) -> Self {
        let (title, message, icon) = match find_badge(badge_id) {
            Some(badge) => (badge.name.to_string(), badge.description.to_string(), badge.icon.to_string()),
            None => (badge_id.to_string(), String::new(), String::new()),
        };

        Notification::BadgeEarned {
            user_id: user_id.to_string(),
            badge_id: badge_id.to_string(),
            title: format!("Badge earned: {}", title),
            message,
            icon,
            earned_at,
        }
    }

    pub fn user_id(&self) -> &str {
        match self {
            Notification::BadgeEarned { user_id, .. } => user_id,
            Notification::ChallengeCompleted { user_id, .. } => user_id,
        }
    }
}

/// Where notifications end up (email, chat, in-app feed...).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<()>;
}

/// Writes notifications to the log.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        match notification {
            Notification::BadgeEarned { user_id, title, .. } => {
                info!("In-app notification for {}: {}", user_id, title);
            }
            Notification::ChallengeCompleted { user_id, challenge_type, streak } => {
                info!("{} completed the {} challenge, streak {}", user_id, challenge_type, streak);
            }
        }
        Ok(())
    }
}

/// Queues notifications for a background task so callers never wait on
/// delivery. Delivery failures are logged and dropped.
#[derive(Clone)]
pub struct NotificationManager {
    sender: mpsc::UnboundedSender<Notification>,
}

impl NotificationManager {
    /// Must be called inside a Tokio runtime.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Notification>();

        tokio::spawn(async move {
            while let Some(notification) = receiver.recv().await {
                if let Err(e) = sink.deliver(&notification).await {
                    warn!("Failed to deliver notification to {}: {}", notification.user_id(), e);
                }
            }
        });

        Self { sender }
    }

    pub fn with_log_sink() -> Self {
        Self::new(Arc::new(LogSink))
    }

    /// Queues without waiting. Returns false if the delivery task is gone.
    pub fn send(&self, notification: Notification) -> bool {
        match self.sender.send(notification) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to queue notification: {}", e);
                false
            }
        }
    }
}
