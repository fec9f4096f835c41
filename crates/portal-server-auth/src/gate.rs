// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client-side role gate.
//!
//! A gate wraps a client-rendered subtree. When mounted it re-resolves the
//! session from the backend in one round trip and moves through:
//!
//! ```text
//!                 ┌──▶ Allowed { role }
//! Checking ───────┼──▶ Redirecting { target, denial }
//!                 └──▶ Failed { reason }          (redirect to `/`)
//! ```
//!
//! `Checking` is the only non-terminal state. Backend errors and an optional
//! timeout end in `Failed`, so a broken backend never leaves the gate stuck.
//!
//! Unmounting does not abort the backend call. The result is dropped and no
//! state update is published.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::AccessError;
use crate::policy::{
	authorize, home_route, AccessContext, AccessRequirement, AccessResolution, AccessResolver, Denial,
	ResolvedUser, CLIENT_HOME_ROUTE, LANDING_ROUTE,
};
use crate::types::{ClientId, Role, UserId};

/// What the backend reports about the current session.
///
/// `role` is the raw stored value; the gate normalizes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
	pub user_id: Option<UserId>,
	pub role: Option<String>,
	pub client_id: Option<ClientId>,
}

impl SessionSnapshot {
	/// Snapshot of a server-side resolution.
	pub fn from_resolution(resolution: &AccessResolution) -> Self {
		match &resolution.user {
			Some(user) => Self {
				user_id: Some(user.user_id),
				role: Some(user.role.to_string()),
				client_id: user.client_id,
			},
			None => Self::default(),
		}
	}

	/// Rebuild a resolution, normalizing the role.
	pub fn into_resolution(self) -> AccessResolution {
		match self.user_id {
			Some(user_id) => {
				let role = Role::normalize(self.role.as_deref());
				AccessResolution::authenticated(ResolvedUser {
					user_id,
					role,
					client_id: self.client_id.filter(|_| role == Role::Client),
					profile: None,
				})
			}
			None => AccessResolution::anonymous(),
		}
	}
}

/// Where the gate fetches the current session from.
#[async_trait]
pub trait GateBackend: Send + Sync {
	async fn fetch_session(&self) -> Result<SessionSnapshot, AccessError>;
}

/// Gate backend that resolves in-process through an [`AccessResolver`].
#[derive(Debug, Clone)]
pub struct ResolverGateBackend {
	resolver: AccessResolver,
	ctx: AccessContext,
}

impl ResolverGateBackend {
	pub fn new(resolver: AccessResolver, ctx: AccessContext) -> Self {
		Self { resolver, ctx }
	}
}

#[async_trait]
impl GateBackend for ResolverGateBackend {
	async fn fetch_session(&self) -> Result<SessionSnapshot, AccessError> {
		let resolution = self.resolver.resolve_access(&self.ctx).await?;
		Ok(SessionSnapshot::from_resolution(&resolution))
	}
}

/// State of a mounted gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
	/// The check is in flight; show the "checking access" interstitial.
	Checking,
	/// Reveal the wrapped subtree.
	Allowed { role: Role },
	/// Navigate away.
	Redirecting {
		target: &'static str,
		denial: Denial,
	},
	/// The check failed; navigate to the landing route.
	Failed { reason: String },
}

impl GateState {
	pub fn is_settled(&self) -> bool {
		!matches!(self, GateState::Checking)
	}

	pub fn is_allowed(&self) -> bool {
		matches!(self, GateState::Allowed { .. })
	}

	/// The route to navigate to, if any.
	pub fn redirect_target(&self) -> Option<&'static str> {
		match self {
			GateState::Redirecting { target, .. } => Some(*target),
			GateState::Failed { .. } => Some(LANDING_ROUTE),
			GateState::Checking | GateState::Allowed { .. } => None,
		}
	}
}

/// Where the gate sends a denied viewer.
///
/// Unlike the server guard, a role mismatch goes straight to the role's home.
pub fn gate_redirect(denial: Denial) -> &'static str {
	match denial {
		Denial::Unauthenticated => LANDING_ROUTE,
		Denial::RoleMismatch { role } => home_route(role),
		Denial::MissingClient => CLIENT_HOME_ROUTE,
	}
}

/// Decide the settled state for a snapshot.
pub fn evaluate(snapshot: SessionSnapshot, requirement: &AccessRequirement) -> GateState {
	let resolution = snapshot.into_resolution();
	match authorize(&resolution, requirement) {
		Ok(()) => GateState::Allowed {
			role: resolution.role().unwrap_or(Role::DEFAULT),
		},
		Err(denial) => GateState::Redirecting {
			target: gate_redirect(denial),
			denial,
		},
	}
}

/// A role gate configured with an allow-list.
pub struct RoleGate<B: ?Sized> {
	backend: Arc<B>,
	requirement: AccessRequirement,
	timeout: Option<Duration>,
}

impl<B: ?Sized> Clone for RoleGate<B> {
	fn clone(&self) -> Self {
		Self {
			backend: Arc::clone(&self.backend),
			requirement: self.requirement.clone(),
			timeout: self.timeout,
		}
	}
}

impl<B> RoleGate<B>
where
	B: GateBackend + ?Sized + 'static,
{
	pub fn new(backend: Arc<B>, requirement: AccessRequirement) -> Self {
		Self {
			backend,
			requirement,
			timeout: None,
		}
	}

	/// Give up on the backend after `timeout` and settle in `Failed`.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn requirement(&self) -> &AccessRequirement {
		&self.requirement
	}

	/// Run one check to completion without mounting.
	pub async fn check(&self) -> GateState {
		run_check(&*self.backend, &self.requirement, self.timeout).await
	}

	/// Mount the gate: start the check on a tokio task.
	///
	/// Must be called from within a tokio runtime.
	pub fn mount(&self) -> GateHandle {
		let (tx, rx) = watch::channel(GateState::Checking);
		let mounted = Arc::new(Mutex::new(true));

		let backend = Arc::clone(&self.backend);
		let requirement = self.requirement.clone();
		let timeout = self.timeout;
		let task_mounted = Arc::clone(&mounted);

		let task = tokio::spawn(async move {
			let state = run_check(&*backend, &requirement, timeout).await;

			let mounted = lock(&task_mounted);
			if !*mounted {
				tracing::debug!(?state, "role gate unmounted before check completed, discarding");
				return;
			}
			// Receiver gone means nobody is watching; nothing to do.
			let _ = tx.send(state);
		});

		GateHandle {
			state: rx,
			mounted,
			task: Some(task),
		}
	}
}

async fn run_check<B>(
	backend: &B,
	requirement: &AccessRequirement,
	timeout: Option<Duration>,
) -> GateState
where
	B: GateBackend + ?Sized,
{
	let fetched = match timeout {
		Some(limit) => tokio::time::timeout(limit, backend.fetch_session())
			.await
			.unwrap_or(Err(AccessError::Timeout(limit))),
		None => backend.fetch_session().await,
	};

	let state = match fetched {
		Ok(snapshot) => evaluate(snapshot, requirement),
		Err(e) => {
			tracing::warn!(error = %e, "role gate check failed");
			GateState::Failed {
				reason: e.to_string(),
			}
		}
	};

	match &state {
		GateState::Redirecting { target, denial } => {
			tracing::info!(redirect_to = *target, reason = %denial, "role gate redirect");
		}
		GateState::Allowed { role } => tracing::debug!(role = %role, "role gate allowed"),
		_ => {}
	}

	state
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// A mounted gate. Dropping the handle unmounts it.
pub struct GateHandle {
	state: watch::Receiver<GateState>,
	mounted: Arc<Mutex<bool>>,
	task: Option<JoinHandle<()>>,
}

impl GateHandle {
	/// Current state.
	pub fn state(&self) -> GateState {
		self.state.borrow().clone()
	}

	/// Wait until the gate leaves `Checking`.
	///
	/// If the gate was unmounted first this returns the last published state,
	/// which is `Checking`.
	pub async fn settled(&mut self) -> GateState {
		let settled = self
			.state
			.wait_for(GateState::is_settled)
			.await
			.map(|state| state.clone());
		match settled {
			Ok(state) => state,
			Err(_) => self.state(),
		}
	}

	/// Stop publishing state updates. Idempotent.
	pub fn unmount(&self) {
		*lock(&self.mounted) = false;
	}

	pub fn is_mounted(&self) -> bool {
		*lock(&self.mounted)
	}

	/// Wait for the background check to finish and return the final state.
	pub async fn join(mut self) -> GateState {
		if let Some(task) = self.task.take() {
			if let Err(e) = task.await {
				tracing::warn!(error = %e, "role gate task did not complete");
			}
		}
		self.state()
	}
}

impl Drop for GateHandle {
	fn drop(&mut self) {
		self.unmount();
	}
}
