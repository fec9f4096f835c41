// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Background maintenance jobs.

use portal_server_db::{DbError, SessionRepository};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::instrument;

/// Deletes expired sessions from the database.
#[derive(Clone)]
pub struct SessionCleanupJob {
	session_repo: SessionRepository,
}

impl SessionCleanupJob {
	pub fn new(session_repo: SessionRepository) -> Self {
		Self { session_repo }
	}

	/// Run a single cleanup pass, returning how many sessions were removed.
	#[instrument(skip(self), fields(job_id = "session-cleanup"))]
	pub async fn run(&self) -> Result<u64, DbError> {
		let sessions_deleted = self.session_repo.cleanup_expired_sessions().await?;
		tracing::info!(sessions_deleted, "session cleanup completed");
		Ok(sessions_deleted)
	}

	/// Run the job every `interval` on a background task.
	///
	/// The first pass runs immediately. Failures are logged and the next tick
	/// retries.
	pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
			loop {
				ticker.tick().await;
				if let Err(e) = self.run().await {
					tracing::warn!(error = %e, "session cleanup failed");
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;
	use portal_server_auth::{Profile, Role, Session, SessionToken, UserId};
	use portal_server_db::{testing::create_migrated_test_pool, ProfileRepository};

	async fn seed_expired(pool: &sqlx::SqlitePool) -> SessionRepository {
		let user_id = UserId::generate();
		ProfileRepository::new(pool.clone())
			.create_profile(&Profile::new(user_id, Role::Client))
			.await
			.unwrap();

		let repo = SessionRepository::new(pool.clone());
		let mut session = Session::new(user_id, chrono::Duration::hours(1));
		session.expires_at = Utc::now() - chrono::Duration::minutes(1);
		repo.create_session(&session, &SessionToken::generate().hash())
			.await
			.unwrap();
		repo
	}

	#[tokio::test]
	async fn run_removes_expired_sessions() {
		let pool = create_migrated_test_pool().await;
		let repo = seed_expired(&pool).await;

		let job = SessionCleanupJob::new(repo);
		assert_eq!(job.run().await.unwrap(), 1);
		assert_eq!(job.run().await.unwrap(), 0);
	}

	#[tokio::test]
	async fn spawned_job_runs_first_pass_immediately() {
		let pool = create_migrated_test_pool().await;
		let repo = seed_expired(&pool).await;

		let handle = SessionCleanupJob::new(repo).spawn(Duration::from_secs(3600));

		let mut remaining = 1;
		for _ in 0..50 {
			remaining = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions")
				.fetch_one(&pool)
				.await
				.unwrap();
			if remaining == 0 {
				break;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		handle.abort();
		assert_eq!(remaining, 0);
	}
}
