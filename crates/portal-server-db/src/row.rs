// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::DbError;

/// Fixed-width RFC 3339 so stored timestamps compare correctly as text.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
	ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn parse_uuid(raw: &str, column: &str) -> Result<Uuid, DbError> {
	Uuid::parse_str(raw).map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
	match err {
		sqlx::Error::Database(db) => db.is_unique_violation(),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	proptest! {
		#[test]
		fn formatted_timestamps_sort_like_instants(a in 0i64..4_000_000_000_000_000, b in 0i64..4_000_000_000_000_000) {
			let ta = DateTime::from_timestamp_micros(a).unwrap();
			let tb = DateTime::from_timestamp_micros(b).unwrap();
			prop_assert_eq!(format_timestamp(ta).cmp(&format_timestamp(tb)), ta.cmp(&tb));
		}
	}

	#[test]
	fn parse_round_trips_formatted() {
		let now = DateTime::from_timestamp_micros(1_700_000_000_123_456).unwrap();
		assert_eq!(parse_timestamp(&format_timestamp(now), "ts").unwrap(), now);
	}

	#[test]
	fn bad_uuid_names_column() {
		let err = parse_uuid("nope", "user_id").unwrap_err();
		assert!(err.to_string().contains("user_id"));
	}
}
