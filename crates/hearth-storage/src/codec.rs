//! Row/column codec helpers shared by the repositories.
//!
//! Timestamps persist as epoch seconds, dates as ISO-8601 text, and list
//! or struct columns as JSON text.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use hearth_core::error::HearthError;

pub(crate) fn to_epoch(dt: DateTime<Utc>) -> i64 {
    dt.timestamp()
}

pub(crate) fn from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or_default()
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<String, HearthError> {
    serde_json::to_string(value).map_err(|e| HearthError::Serialization(e.to_string()))
}

pub(crate) fn from_json<T: DeserializeOwned>(text: &str) -> Result<T, HearthError> {
    serde_json::from_str(text).map_err(|e| HearthError::Serialization(e.to_string()))
}

pub(crate) fn parse_uuid(text: &str) -> Result<Uuid, HearthError> {
    Uuid::parse_str(text).map_err(|e| HearthError::Storage(format!("Bad uuid {}: {}", text, e)))
}

pub(crate) fn opt_uuid(text: Option<String>) -> Result<Option<Uuid>, HearthError> {
    text.map(|s| parse_uuid(&s)).transpose()
}

pub(crate) fn opt_date(text: Option<String>) -> Option<NaiveDate> {
    text.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
}

pub(crate) fn opt_time(text: Option<String>) -> Option<NaiveTime> {
    text.and_then(|s| NaiveTime::parse_from_str(&s, "%H:%M").ok())
}
