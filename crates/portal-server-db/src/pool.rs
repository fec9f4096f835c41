// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::{
	SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::str::FromStr;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	(
		"001_create_profiles",
		include_str!("../migrations/001_create_profiles.sql"),
	),
	(
		"002_create_clients",
		include_str!("../migrations/002_create_clients.sql"),
	),
	(
		"003_create_sessions",
		include_str!("../migrations/003_create_sessions.sql"),
	),
];

/// Create a SqlitePool with WAL mode and common settings.
///
/// # Arguments
/// * `database_url` - SQLite connection string (e.g., "sqlite:./portal.db")
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
/// Returns `DbError::Internal` if the URL is invalid or connection fails.
#[tracing::instrument(skip(database_url))]
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, DbError> {
	let options = SqliteConnectOptions::from_str(database_url)
		.map_err(|e| DbError::Internal(format!("Invalid database URL: {e}")))?
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.create_if_missing(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(max_connections.max(1))
		.connect_with(options)
		.await?;

	tracing::debug!("database pool created");
	Ok(pool)
}

/// Apply the bundled schema. Every statement is idempotent.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		for statement in split_statements(sql) {
			sqlx::query(statement).execute(pool).await?;
		}
		tracing::debug!(migration = name, "migration applied");
	}
	tracing::info!(count = MIGRATIONS.len(), "database migrations complete");
	Ok(())
}

fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
	sql.split(';').map(str::trim).filter(|s| {
		s.lines()
			.map(str::trim)
			.any(|line| !line.is_empty() && !line.starts_with("--"))
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn split_skips_comment_only_chunks() {
		let sql = "-- header\n-- more\n\nCREATE TABLE a (x TEXT);\n\nCREATE INDEX i ON a(x);\n";
		let statements: Vec<_> = split_statements(sql).collect();
		assert_eq!(statements.len(), 2);
		assert!(statements[0].ends_with("CREATE TABLE a (x TEXT)"));
		assert_eq!(statements[1], "CREATE INDEX i ON a(x)");
	}

	#[tokio::test]
	async fn migrations_are_idempotent() {
		let pool = crate::testing::create_test_pool().await;
		run_migrations(&pool).await.unwrap();
		run_migrations(&pool).await.unwrap();
	}

	#[tokio::test]
	async fn file_pool_uses_wal() {
		let dir = tempfile::tempdir().unwrap();
		let url = format!("sqlite:{}", dir.path().join("portal.db").display());
		let pool = create_pool(&url, 2).await.unwrap();

		let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
			.fetch_one(&pool)
			.await
			.unwrap();
		assert_eq!(mode.to_lowercase(), "wal");
	}
}
