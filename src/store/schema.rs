//! Versioned blob codec.
//!
//! Blobs are written as `{"version": N, "data": ...}`. Anything without that
//! envelope predates versioning and is read as version 1, then migrated once
//! here at load so the domain types never see missing fields.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use crate::{common::error::StoreError, store::KeyValueStore};

pub const SCHEMA_VERSION: u64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Session,
    Accounts,
    Payments,
}

#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("malformed blob: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported schema version {0} (newest known is {SCHEMA_VERSION})")]
    UnsupportedVersion(u64),
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u64,
    data: &'a T,
}

pub fn encode<T: Serialize>(key: &str, data: &T) -> Result<String, StoreError> {
    serde_json::to_string(&Envelope {
        version: SCHEMA_VERSION,
        data,
    })
    .map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })
}

pub fn decode<T: DeserializeOwned>(kind: BlobKind, raw: &str) -> Result<T, SchemaError> {
    let (version, mut data) = split_envelope(serde_json::from_str(raw)?);
    if version > SCHEMA_VERSION {
        return Err(SchemaError::UnsupportedVersion(version));
    }
    if version < 2 {
        upgrade_v1(kind, &mut data);
    }
    Ok(serde_json::from_value(data)?)
}

/// Read and decode a blob, falling back to `T::default()` when it is absent
/// or unreadable. Corruption is logged, never returned.
pub fn load<T: DeserializeOwned + Default>(store: &dyn KeyValueStore, key: &str, kind: BlobKind) -> T {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read blob; starting empty");
            return T::default();
        }
    };

    match decode(kind, &raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "discarding unreadable blob; starting empty");
            T::default()
        }
    }
}

pub fn save<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, data: &T) -> Result<(), StoreError> {
    let raw = encode(key, data)?;
    store.set(key, &raw)
}

fn split_envelope(value: Value) -> (u64, Value) {
    match value {
        Value::Object(mut map) if map.len() == 2 && map.contains_key("data") => {
            match map.get("version").and_then(Value::as_u64) {
                Some(version) => (version, map.remove("data").unwrap_or(Value::Null)),
                None => (1, Value::Object(map)),
            }
        }
        other => (1, other),
    }
}

fn upgrade_v1(kind: BlobKind, data: &mut Value) {
    match kind {
        BlobKind::Session => upgrade_account_v1(data),
        BlobKind::Accounts => {
            if let Value::Object(accounts) = data {
                accounts.values_mut().for_each(upgrade_account_v1);
            }
        }
        BlobKind::Payments => {}
    }
}

/// v1 accounts may lack `tier`/`role` and may carry a negative or fractional
/// balance written by an unchecked admin edit.
fn upgrade_account_v1(account: &mut Value) {
    let Value::Object(fields) = account else {
        return;
    };

    for (field, default) in [("tier", "Free"), ("role", "user")] {
        if fields.get(field).is_none_or(Value::is_null) {
            fields.insert(field.to_string(), Value::from(default));
        }
    }

    if let Some(credits) = fields.get("credits").and_then(Value::as_f64) {
        if credits.fract() != 0.0 || credits < 0.0 {
            let clamped = credits.max(0.0).floor() as u64;
            fields.insert("credits".to_string(), Value::from(clamped));
        }
    }
}
