//! Shallow merge of record fields.

use cineforge_error::{CineforgeResult, StorageError, StorageErrorKind};
use serde_json::Value as JsonValue;

/// Overwrite the top-level fields of `existing` with those of `update`.
///
/// Fields absent from `update` are left untouched.
///
/// # Errors
///
/// Returns [`StorageErrorKind::InvalidRecord`] if either value is not a
/// JSON object.
///
/// # Examples
///
/// ```
/// use cineforge_storage::merge_fields;
/// use serde_json::json;
///
/// let mut record = json!({"title": "Tides", "isValidated": false});
/// merge_fields(&mut record, json!({"isValidated": true})).unwrap();
/// assert_eq!(record, json!({"title": "Tides", "isValidated": true}));
/// ```
pub fn merge_fields(existing: &mut JsonValue, update: JsonValue) -> CineforgeResult<()> {
    let JsonValue::Object(fields) = update else {
        return Err(StorageError::new(StorageErrorKind::InvalidRecord(
            "update payload must be an object".to_string(),
        ))
        .into());
    };
    let Some(target) = existing.as_object_mut() else {
        return Err(StorageError::new(StorageErrorKind::InvalidRecord(
            "stored record is not an object".to_string(),
        ))
        .into());
    };
    for (name, value) in fields {
        target.insert(name, value);
    }
    Ok(())
}

/// Reject anything but a JSON object as record data.
pub(crate) fn require_object(data: &JsonValue) -> CineforgeResult<()> {
    if data.is_object() {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidRecord(
            "record data must be an object".to_string(),
        ))
        .into())
    }
}
