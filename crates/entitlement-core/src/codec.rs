//! Persisted document layout for one entitlement record.
//!
//! One JSON object per user id, camelCase keys, epoch-millisecond timestamps:
//! `{"trialWindow":{"start":..,"end":..},"hasSubscription":true,
//!   "subscribedPeriodId":"sem-1","forcedExpiry":true,"trialExpiredAt":..}`.
//! An absent field means "never set". Sticky booleans are only written when true.
//!
//! Decoding is lenient per field. Only a document that is not a JSON object
//! is `StoreError::Corrupt` (caller falls back to no record, i.e. a fresh
//! trial). An unreadable trial window is dropped on its own, so readable
//! subscription and forced-expiry flags survive it. An unreadable
//! subscription flag decodes as `false`: paid access fails closed while
//! trial access fails open.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::StoreError;
use crate::types::{EntitlementRecord, EpochMillis, TrialWindow, UserId};

const TRIAL_WINDOW: &str = "trialWindow";
const HAS_SUBSCRIPTION: &str = "hasSubscription";
const SUBSCRIBED_PERIOD_ID: &str = "subscribedPeriodId";
const FORCED_EXPIRY: &str = "forcedExpiry";
const TRIAL_EXPIRED_AT: &str = "trialExpiredAt";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    trial_window: Option<TrialWindow>,
    #[serde(skip_serializing_if = "is_false")]
    has_subscription: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscribed_period_id: Option<&'a str>,
    #[serde(skip_serializing_if = "is_false")]
    forced_expiry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    trial_expired_at: Option<EpochMillis>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Encode a record as its persisted JSON document. The user id is the key,
/// not part of the document.
pub fn encode_record(record: &EntitlementRecord) -> Result<String, StoreError> {
    let doc = PersistedDocument {
        trial_window: record.trial_window,
        has_subscription: record.has_subscription,
        subscribed_period_id: record.subscribed_period_id.as_deref(),
        forced_expiry: record.forced_expiry,
        trial_expired_at: record.trial_expired_at,
    };
    Ok(serde_json::to_string(&doc)?)
}

/// Decode a persisted document stored under `user_id`.
pub fn decode_record(user_id: &UserId, raw: &str) -> Result<EntitlementRecord, StoreError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| corrupt(user_id, e.to_string()))?;
    let Value::Object(fields) = value else {
        return Err(corrupt(user_id, "document is not an object"));
    };

    let mut record = EntitlementRecord::empty(user_id.clone());
    record.trial_window = decode_trial_window(user_id, &fields);
    record.has_subscription = lenient_flag(user_id, &fields, HAS_SUBSCRIPTION);
    record.forced_expiry = lenient_flag(user_id, &fields, FORCED_EXPIRY);

    record.subscribed_period_id = match fields.get(SUBSCRIBED_PERIOD_ID) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            warn!(user_id = %user_id, field = SUBSCRIBED_PERIOD_ID, value = %other, "Unreadable field dropped");
            None
        }
    };

    record.trial_expired_at = match fields.get(TRIAL_EXPIRED_AT) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_i64() {
            Some(at) => Some(at),
            None => {
                warn!(user_id = %user_id, field = TRIAL_EXPIRED_AT, value = %v, "Unreadable field dropped");
                None
            }
        },
    };

    if record.forced_expiry && record.trial_window.is_some() {
        warn!(user_id = %user_id, "Record carries a trial window despite forced expiry; dropping window");
        record.trial_window = None;
    }

    Ok(record)
}

fn decode_trial_window(user_id: &UserId, fields: &Map<String, Value>) -> Option<TrialWindow> {
    let raw = fields.get(TRIAL_WINDOW)?;
    if raw.is_null() {
        return None;
    }
    match parse_trial_window(raw) {
        Ok(window) => Some(window),
        Err(details) => {
            warn!(user_id = %user_id, field = TRIAL_WINDOW, value = %raw, details = %details, "Unreadable trial window dropped");
            None
        }
    }
}

fn parse_trial_window(raw: &Value) -> Result<TrialWindow, String> {
    let window = raw.as_object().ok_or("not an object")?;
    let bound = |name: &str| {
        window
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| format!("{} is not an integer", name))
    };
    let start = bound("start")?;
    let end = bound("end")?;
    if end < start {
        return Err(format!("ends before it starts ({} < {})", end, start));
    }
    Ok(TrialWindow { start, end })
}

/// Absent → false. Non-boolean → false, with a warning.
fn lenient_flag(user_id: &UserId, fields: &Map<String, Value>, name: &'static str) -> bool {
    match fields.get(name) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            warn!(user_id = %user_id, field = name, value = %other, "Unreadable flag treated as false");
            false
        }
    }
}

fn corrupt(user_id: &UserId, details: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        user_id: user_id.to_string(),
        details: details.into(),
    }
}
