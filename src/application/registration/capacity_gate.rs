use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::domain::entities::{GameParticipant, ParticipantStatus, StatusChange};
use crate::domain::repositories::{ConfirmOutcome, GameRepository, RepositoryError};

const BASE_BACKOFF_MS: u64 = 10;

/// Single entry point for registry writes that touch a game's confirmed count.
///
/// Each call is one repository transaction; transient conflicts re-run the
/// whole read-check-write up to `max_retries` more times.
pub struct CapacityGate<G: GameRepository> {
    game_repo: Arc<G>,
    max_retries: u32,
}

impl<G: GameRepository> CapacityGate<G> {
    pub fn new(game_repo: Arc<G>, max_retries: u32) -> Self {
        Self {
            game_repo,
            max_retries,
        }
    }

    /// Confirm if a slot is open, otherwise waitlist
    pub async fn try_confirm(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<ConfirmOutcome, RepositoryError> {
        let repo = self.game_repo.as_ref();
        retry_transient(self.max_retries, "try_confirm", move || {
            repo.try_confirm(game_id, user_id)
        })
        .await
    }

    /// Add an entry with an explicit initial status
    pub async fn add_entry(
        &self,
        game_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> Result<GameParticipant, RepositoryError> {
        let repo = self.game_repo.as_ref();
        retry_transient(self.max_retries, "add_entry", move || {
            repo.add_participant(game_id, user_id, status)
        })
        .await
    }

    /// Change an entry's status
    pub async fn set_status(
        &self,
        game_id: &str,
        user_id: &str,
        status: ParticipantStatus,
    ) -> Result<StatusChange, RepositoryError> {
        let repo = self.game_repo.as_ref();
        retry_transient(self.max_retries, "set_status", move || {
            repo.set_participant_status(game_id, user_id, status, None)
        })
        .await
    }

    /// Move a waitlisted entry to confirmed; entries no longer waitlisted are not found
    pub async fn promote(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<StatusChange, RepositoryError> {
        let repo = self.game_repo.as_ref();
        retry_transient(self.max_retries, "promote", move || {
            repo.set_participant_status(
                game_id,
                user_id,
                ParticipantStatus::Confirmed,
                Some(ParticipantStatus::Waitlist),
            )
        })
        .await
    }

    /// Delete an entry
    pub async fn remove_entry(
        &self,
        game_id: &str,
        user_id: &str,
    ) -> Result<GameParticipant, RepositoryError> {
        let repo = self.game_repo.as_ref();
        retry_transient(self.max_retries, "remove_entry", move || {
            repo.remove_participant(game_id, user_id)
        })
        .await
    }
}

/// Re-run `op` while it fails with a transient conflict, with jittered
/// exponential backoff between attempts
async fn retry_transient<T, F, Fut>(
    max_retries: u32,
    operation: &'static str,
    mut op: F,
) -> Result<T, RepositoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RepositoryError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < max_retries => {
                attempt += 1;
                let jitter = rand::thread_rng().gen_range(0..BASE_BACKOFF_MS);
                let delay = BASE_BACKOFF_MS * 2u64.pow(attempt) + jitter;
                tracing::debug!(operation, attempt, delay_ms = delay, error = %e, "Retrying registry write");
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(operation, attempts = attempt + 1, error = %e, "Registry write kept conflicting");
                return Err(e);
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retries_transient_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(3, "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(RepositoryError::Conflict("busy".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(2, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RepositoryError::Conflict("busy".into())) }
        })
        .await;

        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_transient(5, "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RepositoryError::AlreadyExists("dup".into())) }
        })
        .await;

        assert!(matches!(result, Err(RepositoryError::AlreadyExists(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
