// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory stores for tests.

use async_trait::async_trait;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::AccessError;
use crate::policy::AccessResolver;
use crate::profile::{ClientRecord, Profile};
use crate::session::{Session, SessionToken};
use crate::store::{AuthBackend, ClientStore, ProfileStore};
use crate::types::UserId;

#[derive(Debug, thiserror::Error)]
#[error("simulated backend outage")]
pub struct SimulatedOutage;

#[derive(Default)]
struct Inner {
	sessions: Mutex<HashMap<String, Session>>,
	profiles: Mutex<HashMap<UserId, Profile>>,
	clients: Mutex<HashMap<UserId, ClientRecord>>,
	failing: AtomicBool,
}

/// Sessions, profiles and client records held in memory.
#[derive(Clone, Default)]
pub struct InMemoryAccessStore {
	inner: Arc<Inner>,
}

impl InMemoryAccessStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A resolver backed by this store.
	pub fn resolver(&self) -> AccessResolver {
		AccessResolver::new(
			Arc::new(self.clone()),
			Arc::new(self.clone()),
			Arc::new(self.clone()),
		)
	}

	/// Issue a one-hour session for `user_id` and return its token.
	pub fn issue_session(&self, user_id: UserId) -> SessionToken {
		self.issue_session_with_ttl(user_id, Duration::hours(1))
	}

	pub fn issue_session_with_ttl(&self, user_id: UserId, ttl: Duration) -> SessionToken {
		let token = SessionToken::generate();
		let session = Session::new(user_id, ttl);
		lock(&self.inner.sessions).insert(token.hash(), session);
		token
	}

	pub fn insert_profile(&self, profile: Profile) {
		lock(&self.inner.profiles).insert(profile.user_id, profile);
	}

	pub fn insert_client(&self, client: ClientRecord) {
		lock(&self.inner.clients).insert(client.user_id, client);
	}

	/// Make every subsequent lookup fail.
	pub fn fail_lookups(&self, failing: bool) {
		self.inner.failing.store(failing, Ordering::SeqCst);
	}

	fn check_outage(&self) -> Result<(), AccessError> {
		if self.inner.failing.load(Ordering::SeqCst) {
			Err(AccessError::backend(SimulatedOutage))
		} else {
			Ok(())
		}
	}
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl AuthBackend for InMemoryAccessStore {
	async fn find_session(&self, token: &SessionToken) -> Result<Option<Session>, AccessError> {
		self.check_outage()?;
		Ok(
			lock(&self.inner.sessions)
				.get(&token.hash())
				.filter(|s| !s.is_expired())
				.cloned(),
		)
	}

	async fn sign_out(&self, token: &SessionToken) -> Result<bool, AccessError> {
		self.check_outage()?;
		Ok(lock(&self.inner.sessions).remove(&token.hash()).is_some())
	}
}

#[async_trait]
impl ProfileStore for InMemoryAccessStore {
	async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, AccessError> {
		self.check_outage()?;
		Ok(lock(&self.inner.profiles).get(user_id).cloned())
	}
}

#[async_trait]
impl ClientStore for InMemoryAccessStore {
	async fn get_client_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Option<ClientRecord>, AccessError> {
		self.check_outage()?;
		Ok(lock(&self.inner.clients).get(user_id).cloned())
	}
}
