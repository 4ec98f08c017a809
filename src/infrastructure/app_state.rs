use std::sync::Arc;

use async_broadcast::{broadcast, Receiver, Sender};
use sqlx::SqlitePool;

use crate::infrastructure::auth::JwtService;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::{self, repositories::{SqliteGameRepository, SqliteGroupRepository}};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,

    /// Database connection pool
    pub db: SqlitePool,

    /// JWT service for token management
    pub jwt_service: Arc<JwtService>,

    /// Game and registry repository
    pub game_repo: Arc<SqliteGameRepository>,

    /// Group repository
    pub group_repo: Arc<SqliteGroupRepository>,

    /// Notification broadcaster for SSE
    pub event_sender: Sender<NotificationEvent>,
    pub event_receiver: Receiver<NotificationEvent>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        tracing::info!("Connecting to database: {}", config.database_url);

        let db = database::connect(&config).await?;
        database::init_schema(&db).await?;

        let jwt_service = Arc::new(JwtService::new(&config.jwt_secret));

        // Create repositories
        let game_repo = Arc::new(SqliteGameRepository::new(db.clone()));
        let group_repo = Arc::new(SqliteGroupRepository::new(db.clone()));

        // Create event broadcaster (capacity of 1000 events)
        let (mut event_sender, event_receiver) = broadcast(1000);
        // Slow SSE clients drop the oldest events instead of blocking writers
        event_sender.set_overflow(true);

        Ok(Self {
            config,
            db,
            jwt_service,
            game_repo,
            group_repo,
            event_sender,
            event_receiver,
        })
    }

    /// Broadcast an event to all connected SSE clients
    pub fn broadcast_event(&self, event: NotificationEvent) {
        let receiver_count = self.event_sender.receiver_count();
        tracing::debug!(
            "Broadcasting event '{}' to {} receivers",
            event.kind.as_str(),
            receiver_count
        );
        match self.event_sender.try_broadcast(event) {
            Ok(None) => {}
            Ok(Some(_)) => {
                tracing::debug!("Event broadcast with overflow");
            }
            Err(e) => {
                tracing::warn!("Failed to broadcast event: {:?}", e);
            }
        }
    }

    /// Notify one user; delivery failures are logged, never returned
    pub fn notify(&self, user_id: &str, kind: NotificationKind, game_id: &str, payload: serde_json::Value) {
        let event = NotificationEvent::new(kind, user_id.to_string(), Some(game_id.to_string()))
            .with_data(payload);
        self.broadcast_event(event);
    }
}

/// Kinds of user notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    WaitlistPromoted,
    GameCanceled,
    GameStatusChanged,
    RegistrationChanged,
    RegistrationRemoved,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::WaitlistPromoted => "waitlistPromoted",
            NotificationKind::GameCanceled => "gameCanceled",
            NotificationKind::GameStatusChanged => "gameStatusChanged",
            NotificationKind::RegistrationChanged => "registrationChanged",
            NotificationKind::RegistrationRemoved => "registrationRemoved",
        }
    }
}

/// Notification for SSE delivery, addressed to one user
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub user_id: String,
    pub game_id: Option<String>,
    /// Additional data fields (flattened into root)
    #[serde(flatten)]
    pub data: serde_json::Value,
    pub timestamp: i64,
}

impl NotificationEvent {
    pub fn new(kind: NotificationKind, user_id: String, game_id: Option<String>) -> Self {
        Self {
            kind,
            user_id,
            game_id,
            data: serde_json::Value::Object(serde_json::Map::new()),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_flat() {
        let event = NotificationEvent::new(
            NotificationKind::WaitlistPromoted,
            "u1".into(),
            Some("g1".into()),
        )
        .with_data(serde_json::json!({ "score": 42.0 }));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "waitlistPromoted");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["gameId"], "g1");
        assert_eq!(json["score"], 42.0);
    }
}
