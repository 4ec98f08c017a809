use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::entities::{Game, GameParticipant, GameStatus, ParticipantStatus, StatusChange};
use crate::domain::repositories::{ConfirmOutcome, GameRepository, RepositoryError};
use crate::infrastructure::database::map_db_error;

/// SQLite implementation of GameRepository
pub struct SqliteGameRepository {
    pool: SqlitePool,
}

impl SqliteGameRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_game(row: &sqlx::sqlite::SqliteRow) -> Game {
        use sqlx::Row;

        let status_str: String = row.get("status");

        Game {
            id: row.get("id"),
            group_id: row.get("group_id"),
            title: row.get("title"),
            scheduled_time: row.get("scheduled_time"),
            status: GameStatus::from_str(&status_str).unwrap_or(GameStatus::Upcoming),
            max_participants: row
                .get::<Option<i64>, _>("max_participants")
                .map(|v| v as u32),
            min_participants: row.get::<i64, _>("min_participants") as u32,
            current_participants: row.get::<i64, _>("current_participants") as u32,
            version: row.get("version"),
            created_by: row.get("created_by"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_participant(row: &sqlx::sqlite::SqliteRow) -> GameParticipant {
        use sqlx::Row;

        let status_str: String = row.get("status");

        GameParticipant {
            id: row.get("id"),
            game_id: row.get("game_id"),
            user_id: row.get("user_id"),
            status: ParticipantStatus::from_str(&status_str).unwrap_or(ParticipantStatus::Declined),
            joined_at: row.get("joined_at"),
            registered_at: row.get("registered_at"),
            updated_at: row.get("updated_at"),
        }
    }

    // ========== Transaction steps ==========

    async fn fetch_game(
        conn: &mut SqliteConnection,
        game_id: &str,
    ) -> Result<Game, RepositoryError> {
        let row = sqlx::query("SELECT * FROM games WHERE id = ?")
            .bind(game_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_db_error)?;

        row.as_ref()
            .map(Self::row_to_game)
            .ok_or_else(|| RepositoryError::NotFound(format!("game {}", game_id)))
    }

    async fn fetch_participant(
        conn: &mut SqliteConnection,
        game_id: &str,
        user_id: &str,
    ) -> Result<Option<GameParticipant>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM game_participants WHERE game_id = ? AND user_id = ?")
            .bind(game_id)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(Self::row_to_participant))
    }

    async fn insert_participant(
        conn: &mut SqliteConnection,
        mut participant: GameParticipant,
    ) -> Result<GameParticipant, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO game_participants (game_id, user_id, status, joined_at, registered_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&participant.game_id)
        .bind(&participant.user_id)
        .bind(participant.status.as_str())
        .bind(participant.joined_at)
        .bind(participant.registered_at)
        .bind(participant.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| match map_db_error(e) {
            RepositoryError::AlreadyExists(_) => RepositoryError::AlreadyExists(format!(
                "user {} in game {}",
                participant.user_id, participant.game_id
            )),
            other => other,
        })?;

        participant.id = result.last_insert_rowid();
        Ok(participant)
    }

    /// Move the confirmed counter, compare-and-swap on the version read earlier
    async fn adjust_counter(
        conn: &mut SqliteConnection,
        game: &Game,
        delta: i64,
    ) -> Result<(), RepositoryError> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            r#"
            UPDATE games
            SET current_participants = MAX(current_participants + ?, 0),
                version = version + 1,
                updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(&game.id)
        .bind(game.version)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "game {} changed since version {}",
                game.id, game.version
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl GameRepository for SqliteGameRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Game>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(row.as_ref().map(Self::row_to_game))
    }

    async fn create(&self, game: &Game) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO games (
                id, group_id, title, scheduled_time, status, max_participants, min_participants,
                current_participants, version, created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&game.id)
        .bind(&game.group_id)
        .bind(&game.title)
        .bind(game.scheduled_time)
        .bind(game.status.as_str())
        .bind(game.max_participants.map(i64::from))
        .bind(i64::from(game.min_participants))
        .bind(i64::from(game.current_participants))
        .bind(game.version)
        .bind(&game.created_by)
        .bind(game.created_at)
        .bind(game.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: &str,
        status: GameStatus,
        expected_version: i64,
    ) -> Result<(), RepositoryError> {
        let now = chrono::Utc::now().timestamp_millis();

        let result = sqlx::query(
            "UPDATE games SET status = ?, version = version + 1, updated_at = ? WHERE id = ? AND version = ?",
        )
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .bind(expected_version)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(format!(
                "game {} changed since version {}",
                id, expected_version
            )));
        }

        Ok(())
    }

    async fn find_past_games_by_group(
        &self,
        group_id: &str,
        before: i64,
        limit: u32,
    ) -> Result<Vec<Game>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM games WHERE group_id = ? AND scheduled_time < ? ORDER BY scheduled_time DESC LIMIT ?",
        )
        .bind(group_id)
        .bind(before)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(Self::row_to_game).collect())
    }

    async fn find_participant(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<Option<GameParticipant>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        Self::fetch_participant(&mut conn, game_id, user_id).await
    }

    async fn list_participants(&self, game_id: &str) -> Result<Vec<GameParticipant>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT * FROM game_participants WHERE game_id = ? ORDER BY registered_at ASC, id ASC",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.iter().map(Self::row_to_participant).collect())
    }

    async fn find_user_entries(
        &self,
        user_id: &str,
        game_ids: &[String],
    ) -> Result<Vec<GameParticipant>, RepositoryError> {
        if game_ids.is_empty() {
            return Ok(Vec::new());
        }

        // Build placeholders for IN clause
        let placeholders: Vec<&str> = game_ids.iter().map(|_| "?").collect();
        let query = format!(
            "SELECT * FROM game_participants WHERE user_id = ? AND game_id IN ({})",
            placeholders.join(", ")
        );

        let mut query_builder = sqlx::query(&query).bind(user_id);
        for id in game_ids {
            query_builder = query_builder.bind(id);
        }

        let rows = query_builder
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(rows.iter().map(Self::row_to_participant).collect())
    }

    async fn try_confirm(&self, game_id: &str, user_id: &str) -> Result<ConfirmOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let game = Self::fetch_game(&mut tx, game_id).await?;

        if Self::fetch_participant(&mut tx, game_id, user_id).await?.is_some() {
            return Err(RepositoryError::AlreadyExists(format!(
                "user {} in game {}",
                user_id, game_id
            )));
        }

        let status = if game.is_full() {
            ParticipantStatus::Waitlist
        } else {
            ParticipantStatus::Confirmed
        };

        let participant = Self::insert_participant(
            &mut tx,
            GameParticipant::new(game_id.to_string(), user_id.to_string(), status),
        )
        .await?;

        if status.holds_slot() {
            Self::adjust_counter(&mut tx, &game, 1).await?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(match status {
            ParticipantStatus::Confirmed => ConfirmOutcome::Confirmed(participant),
            _ => ConfirmOutcome::Waitlisted(participant),
        })
    }

    async fn add_participant(
        &self,
        game_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> Result<GameParticipant, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let game = Self::fetch_game(&mut tx, game_id).await?;

        if status.holds_slot() && game.is_full() {
            return Err(RepositoryError::CapacityReached(format!("game {}", game_id)));
        }

        let participant = Self::insert_participant(
            &mut tx,
            GameParticipant::new(game_id.to_string(), user_id.to_string(), status),
        )
        .await?;

        if status.holds_slot() {
            Self::adjust_counter(&mut tx, &game, 1).await?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(participant)
    }

    async fn set_participant_status(
        &self,
        game_id: &str,
        user_id: &str,
        status: ParticipantStatus,
        expected: Option<ParticipantStatus>,
    ) -> Result<StatusChange, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let game = Self::fetch_game(&mut tx, game_id).await?;
        let mut participant = Self::fetch_participant(&mut tx, game_id, user_id)
            .await?
            .filter(|p| expected.map_or(true, |s| p.status == s))
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("participant {} in game {}", user_id, game_id))
            })?;

        let previous = participant.status;
        if previous == status {
            return Ok(StatusChange {
                previous,
                participant,
            });
        }

        let delta = previous.slot_delta(status);
        if delta > 0 && game.is_full() {
            return Err(RepositoryError::CapacityReached(format!("game {}", game_id)));
        }

        let now = chrono::Utc::now().timestamp_millis();
        sqlx::query("UPDATE game_participants SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now)
            .bind(participant.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if delta != 0 {
            Self::adjust_counter(&mut tx, &game, delta).await?;
        }

        tx.commit().await.map_err(map_db_error)?;

        participant.status = status;
        participant.updated_at = now;

        Ok(StatusChange {
            previous,
            participant,
        })
    }

    async fn remove_participant(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<GameParticipant, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let game = Self::fetch_game(&mut tx, game_id).await?;
        let participant = Self::fetch_participant(&mut tx, game_id, user_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("participant {} in game {}", user_id, game_id))
            })?;

        sqlx::query("DELETE FROM game_participants WHERE id = ?")
            .bind(participant.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if participant.status.holds_slot() {
            Self::adjust_counter(&mut tx, &game, -1).await?;
        }

        tx.commit().await.map_err(map_db_error)?;

        Ok(participant)
    }
}
