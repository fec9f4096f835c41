// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use portal_server_auth::{AccessError, ClientId, ClientRecord, ClientStore, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{format_timestamp, is_unique_violation, parse_timestamp, parse_uuid};

/// Client records. At most one per user.
#[derive(Clone)]
pub struct ClientRepository {
	pool: SqlitePool,
}

impl ClientRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// # Errors
	/// Returns `DbError::Conflict` if the user already has a client record.
	#[tracing::instrument(skip(self, client), fields(client_id = %client.id, user_id = %client.user_id))]
	pub async fn create_client(&self, client: &ClientRecord) -> Result<(), DbError> {
		sqlx::query("INSERT INTO clients (id, user_id, name, created_at) VALUES (?, ?, ?, ?)")
			.bind(client.id.to_string())
			.bind(client.user_id.to_string())
			.bind(&client.name)
			.bind(format_timestamp(client.created_at))
			.execute(&self.pool)
			.await
			.map_err(|e| {
				if is_unique_violation(&e) {
					DbError::Conflict(format!("user {} already has a client record", client.user_id))
				} else {
					DbError::Sqlx(e)
				}
			})?;

		tracing::debug!("client record created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn get_client_for_user(&self, user_id: &UserId) -> Result<Option<ClientRecord>, DbError> {
		let row = sqlx::query("SELECT id, user_id, name, created_at FROM clients WHERE user_id = ?")
			.bind(user_id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_client(&r)).transpose()
	}

	#[tracing::instrument(skip(self), fields(client_id = %id))]
	pub async fn get_client_by_id(&self, id: &ClientId) -> Result<Option<ClientRecord>, DbError> {
		let row = sqlx::query("SELECT id, user_id, name, created_at FROM clients WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.map(|r| row_to_client(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_clients(&self) -> Result<Vec<ClientRecord>, DbError> {
		let rows = sqlx::query("SELECT id, user_id, name, created_at FROM clients ORDER BY name ASC")
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(row_to_client).collect()
	}
}

fn row_to_client(row: &sqlx::sqlite::SqliteRow) -> Result<ClientRecord, DbError> {
	let id: String = row.get("id");
	let user_id: String = row.get("user_id");
	let created_at: String = row.get("created_at");

	Ok(ClientRecord {
		id: ClientId::new(parse_uuid(&id, "client id")?),
		user_id: UserId::new(parse_uuid(&user_id, "user_id")?),
		name: row.get("name"),
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}

#[async_trait]
impl ClientStore for ClientRepository {
	async fn get_client_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Option<ClientRecord>, AccessError> {
		Ok(self.get_client_for_user(user_id).await?)
	}
}
