// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The access policy shared by the server guard and the client role gate.
//!
//! # Flow
//!
//! ```text
//! AccessContext ──resolve_access──▶ AccessResolution ──authorize(requirement)──▶ Ok | Denial
//!  (session token)                  {user, role, client_id}
//! ```
//!
//! [`AccessResolver::resolve_access`] is the only place that talks to the
//! session, profile and client stores. [`authorize`] is pure, so both guards
//! reach the same decision for the same resolution; they differ only in where
//! a [`Denial`] sends the user.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

use crate::error::AccessError;
use crate::profile::Profile;
use crate::session::SessionToken;
use crate::store::{AuthBackend, ClientStore, ProfileStore};
use crate::types::{ClientId, ProfileStatus, Role, UserId};

/// Public landing route. Unauthenticated users always end up here.
pub const LANDING_ROUTE: &str = "/";
/// Home of CLIENT profiles, also the fallback for missing client records.
pub const CLIENT_HOME_ROUTE: &str = "/app";
/// Home of ADMIN and TEAM profiles.
pub const STAFF_HOME_ROUTE: &str = "/admin";

/// The route a role lands on after login or after being bounced.
pub fn home_route(role: Role) -> &'static str {
	match role {
		Role::Admin | Role::Team => STAFF_HOME_ROUTE,
		Role::Client => CLIENT_HOME_ROUTE,
	}
}

/// Request-scoped input to access resolution.
///
/// Built per request (or per gate mount) from the session cookie; nothing
/// about the current session is kept in global state.
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
	session_token: Option<SessionToken>,
}

impl AccessContext {
	/// A context with no credentials.
	pub fn anonymous() -> Self {
		Self { session_token: None }
	}

	pub fn with_session_token(token: SessionToken) -> Self {
		Self {
			session_token: Some(token),
		}
	}

	/// Builds a context from an optional raw cookie value. Empty values count as absent.
	pub fn from_cookie_value(value: Option<String>) -> Self {
		Self {
			session_token: value.filter(|v| !v.is_empty()).map(SessionToken::new),
		}
	}

	pub fn session_token(&self) -> Option<&SessionToken> {
		self.session_token.as_ref()
	}
}

/// The authenticated side of an [`AccessResolution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUser {
	pub user_id: UserId,
	/// Normalized role; CLIENT when no profile exists.
	pub role: Role,
	/// Linked client record, only ever set for CLIENT.
	pub client_id: Option<ClientId>,
	/// The profile, if one exists.
	pub profile: Option<Profile>,
}

/// Outcome of resolving `{user, role, client_id}` for a context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessResolution {
	pub user: Option<ResolvedUser>,
}

impl AccessResolution {
	pub fn anonymous() -> Self {
		Self { user: None }
	}

	pub fn authenticated(user: ResolvedUser) -> Self {
		Self { user: Some(user) }
	}

	pub fn is_authenticated(&self) -> bool {
		self.user.is_some()
	}

	pub fn role(&self) -> Option<Role> {
		self.user.as_ref().map(|u| u.role)
	}

	pub fn user_id(&self) -> Option<UserId> {
		self.user.as_ref().map(|u| u.user_id)
	}

	pub fn client_id(&self) -> Option<ClientId> {
		self.user.as_ref().and_then(|u| u.client_id)
	}
}

/// What a page demands of the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequirement {
	roles: Cow<'static, [Role]>,
	requires_client: bool,
}

impl AccessRequirement {
	/// ADMIN only.
	pub const ADMIN: AccessRequirement = AccessRequirement::roles(&[Role::Admin]);
	/// ADMIN or TEAM.
	pub const STAFF: AccessRequirement = AccessRequirement::roles(&[Role::Admin, Role::Team]);
	/// CLIENT, with or without a linked client record.
	pub const CLIENT: AccessRequirement = AccessRequirement::roles(&[Role::Client]);
	/// CLIENT with a linked client record.
	pub const CLIENT_WITH_RECORD: AccessRequirement = AccessRequirement::roles(&[Role::Client]).with_client();

	/// Requires one of a static set of roles.
	pub const fn roles(roles: &'static [Role]) -> Self {
		Self {
			roles: Cow::Borrowed(roles),
			requires_client: false,
		}
	}

	/// Requires one of the given roles.
	pub fn any_of(roles: impl IntoIterator<Item = Role>) -> Self {
		Self {
			roles: Cow::Owned(roles.into_iter().collect()),
			requires_client: false,
		}
	}

	/// Additionally require a linked client record.
	pub const fn with_client(mut self) -> Self {
		self.requires_client = true;
		self
	}

	pub fn allowed_roles(&self) -> &[Role] {
		&self.roles
	}

	pub fn allows(&self, role: Role) -> bool {
		self.roles.contains(&role)
	}

	pub fn requires_client(&self) -> bool {
		self.requires_client
	}
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
	/// No live session.
	Unauthenticated,
	/// The role is not in the page's allow-list.
	RoleMismatch { role: Role },
	/// A CLIENT page needs a client record and none is linked.
	MissingClient,
}

impl fmt::Display for Denial {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Denial::Unauthenticated => write!(f, "unauthenticated"),
			Denial::RoleMismatch { role } => write!(f, "role_mismatch:{role}"),
			Denial::MissingClient => write!(f, "missing_client"),
		}
	}
}

/// Decide whether `resolution` satisfies `requirement`.
///
/// Grants access iff there is a user, their role is in the allow-list and,
/// when the page needs one, a client record is linked.
pub fn authorize(
	resolution: &AccessResolution,
	requirement: &AccessRequirement,
) -> Result<(), Denial> {
	let Some(user) = resolution.user.as_ref() else {
		return Err(Denial::Unauthenticated);
	};

	if !requirement.allows(user.role) {
		return Err(Denial::RoleMismatch { role: user.role });
	}

	if requirement.requires_client() && user.client_id.is_none() {
		return Err(Denial::MissingClient);
	}

	Ok(())
}

/// Resolves sessions into `{user, role, client_id}`.
///
/// Cheap to clone; holds shared handles to the stores.
#[derive(Clone)]
pub struct AccessResolver {
	auth: Arc<dyn AuthBackend>,
	profiles: Arc<dyn ProfileStore>,
	clients: Arc<dyn ClientStore>,
}

impl fmt::Debug for AccessResolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AccessResolver").finish_non_exhaustive()
	}
}

impl AccessResolver {
	pub fn new(
		auth: Arc<dyn AuthBackend>,
		profiles: Arc<dyn ProfileStore>,
		clients: Arc<dyn ClientStore>,
	) -> Self {
		Self {
			auth,
			profiles,
			clients,
		}
	}

	pub fn auth(&self) -> &Arc<dyn AuthBackend> {
		&self.auth
	}

	pub fn profiles(&self) -> &Arc<dyn ProfileStore> {
		&self.profiles
	}

	pub fn clients(&self) -> &Arc<dyn ClientStore> {
		&self.clients
	}

	/// Resolve the session in `ctx`.
	///
	/// - no token, unknown or expired session: anonymous
	/// - disabled profile: anonymous
	/// - session without profile: role CLIENT, no client id
	/// - CLIENT: client id from the linked client record, if any
	///
	/// Store failures are returned; callers must deny access on error.
	#[instrument(skip_all, fields(has_session = ctx.session_token().is_some()))]
	pub async fn resolve_access(&self, ctx: &AccessContext) -> Result<AccessResolution, AccessError> {
		let Some(token) = ctx.session_token() else {
			return Ok(AccessResolution::anonymous());
		};

		let Some(session) = self.auth.find_session(token).await? else {
			tracing::debug!("session not found or expired");
			return Ok(AccessResolution::anonymous());
		};

		let profile = self.profiles.get_profile(&session.user_id).await?;
		if profile
			.as_ref()
			.is_some_and(|p| p.status == ProfileStatus::Disabled)
		{
			tracing::info!(user_id = %session.user_id, "profile disabled, resolving as anonymous");
			return Ok(AccessResolution::anonymous());
		}

		let role = match &profile {
			Some(profile) => profile.role,
			None => {
				tracing::debug!(user_id = %session.user_id, "no profile, using default role");
				Role::DEFAULT
			}
		};

		let client_id = if role == Role::Client {
			self
				.clients
				.get_client_for_user(&session.user_id)
				.await?
				.map(|client| client.id)
		} else {
			None
		};

		tracing::debug!(
			user_id = %session.user_id,
			role = %role,
			has_client = client_id.is_some(),
			"access resolved"
		);

		Ok(AccessResolution::authenticated(ResolvedUser {
			user_id: session.user_id,
			role,
			client_id,
			profile,
		}))
	}
}
