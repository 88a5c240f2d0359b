pub mod config;
pub mod logging;
pub mod notification_manager;
pub mod service;
pub mod store;

pub use config::EngineConfig;
pub use notification_manager::{LogSink, Notification, NotificationManager, NotificationSink};
pub use service::{GamificationService, RankStatus, UserProfile};
pub use store::ActivityStore;
