//! Row structs and insert DTOs.
//!
//! Insert DTOs are built from the engine's [`MappedAttributes`] so the
//! attribute-name contract lives in one place.

pub mod admin_user;
pub mod bio;
pub mod blog_category;
pub mod blog_entry;
pub mod tag;

use wxr_core::types::{MappedAttributes, RecordType};
use wxr_core::StoreError;

fn missing(record_type: RecordType, attribute: &str) -> StoreError {
    StoreError::MissingAttribute {
        record_type,
        attribute: attribute.to_string(),
    }
}

pub(crate) fn required_str(
    attributes: &MappedAttributes,
    record_type: RecordType,
    attribute: &str,
) -> Result<String, StoreError> {
    attributes
        .get_str(attribute)
        .map(str::to_string)
        .ok_or_else(|| missing(record_type, attribute))
}

pub(crate) fn required_i64(
    attributes: &MappedAttributes,
    record_type: RecordType,
    attribute: &str,
) -> Result<i64, StoreError> {
    attributes
        .get_i64(attribute)
        .ok_or_else(|| missing(record_type, attribute))
}

/// Integer attributes stored in `INTEGER` columns.
pub(crate) fn required_i32(
    attributes: &MappedAttributes,
    record_type: RecordType,
    attribute: &str,
) -> Result<i32, StoreError> {
    let value = required_i64(attributes, record_type, attribute)?;
    i32::try_from(value).map_err(|_| StoreError::Rejected {
        record_type,
        reason: format!("{attribute} out of range: {value}"),
    })
}
