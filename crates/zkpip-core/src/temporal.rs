//! # Seal Timestamps
//!
//! `Timestamp` is a UTC instant truncated to whole seconds and always
//! rendered as `YYYY-MM-DDTHH:MM:SSZ`. Seals and key records carry it so
//! that every producer writes the same textual form for the same instant.
//!
//! Parsing only accepts the `Z` suffix. `+00:00` names the same instant
//! but is a different string, and is rejected.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ZkpipError;

/// A UTC-only timestamp with seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_utc(Utc::now())
    }

    /// From a `DateTime<Utc>`, discarding sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse an RFC 3339 string ending in `Z`. Sub-seconds are truncated.
    ///
    /// # Errors
    ///
    /// Returns [`ZkpipError::InvalidTimestamp`] for malformed input or any
    /// explicit offset, including `+00:00`.
    pub fn parse(s: &str) -> Result<Self, ZkpipError> {
        if !s.ends_with('Z') {
            return Err(ZkpipError::InvalidTimestamp(format!(
                "timestamp must use the Z suffix, got {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| ZkpipError::InvalidTimestamp(format!("{s:?}: {e}")))?;
        Ok(Self::from_utc(dt.with_timezone(&Utc)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl std::str::FromStr for Timestamp {
    type Err = ZkpipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
