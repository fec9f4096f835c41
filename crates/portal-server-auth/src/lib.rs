// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role-based access control for the portal.
//!
//! Every route is protected twice by the same policy:
//!
//! - the **server guard** ([`guard::guard_page`]) runs before a page handler
//!   fetches data and redirects on denial;
//! - the **role gate** ([`gate::RoleGate`]) re-validates on the client side
//!   and drives a `Checking → Allowed | Redirecting | Failed` state machine.
//!
//! Both consume [`policy::AccessResolver::resolve_access`] and
//! [`policy::authorize`].

pub mod error;
pub mod gate;
pub mod guard;
pub mod middleware;
pub mod policy;
pub mod profile;
pub mod session;
pub mod store;
pub mod testing;
pub mod types;

pub use error::AccessError;
pub use gate::{GateBackend, GateHandle, GateState, RoleGate, SessionSnapshot};
pub use guard::{guard_page, GuardOutcome};
pub use middleware::{AuthConfig, SESSION_COOKIE_NAME};
pub use policy::{
	authorize, home_route, AccessContext, AccessRequirement, AccessResolution, AccessResolver,
	Denial, ResolvedUser, CLIENT_HOME_ROUTE, LANDING_ROUTE, STAFF_HOME_ROUTE,
};
pub use profile::{ClientRecord, Profile};
pub use session::{Session, SessionToken};
pub use store::{AuthBackend, ClientStore, ProfileStore};
pub use types::{ClientId, ProfileStatus, Role, SessionId, UserId};
