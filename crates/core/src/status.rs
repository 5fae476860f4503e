//! Source status label to target status code.

use crate::error::MappingError;

/// Status code for published (and inherited-published) entries.
pub const STATUS_PUBLISHED: i32 = 5;

/// Status code for drafts.
pub const STATUS_DRAFT: i32 = 0;

/// The only status label whose nodes are imported.
pub const IMPORTABLE_STATUS: &str = "publish";

/// Map a source status label to the target status code.
///
/// The mapping is closed; unknown labels are an error rather than a default.
pub fn normalize_status(label: &str) -> Result<i32, MappingError> {
    match label {
        "publish" | "inherit" => Ok(STATUS_PUBLISHED),
        "draft" => Ok(STATUS_DRAFT),
        other => Err(MappingError::UnknownStatus(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn known_labels() {
        assert_eq!(normalize_status("publish"), Ok(5));
        assert_eq!(normalize_status("inherit"), Ok(5));
        assert_eq!(normalize_status("draft"), Ok(0));
    }

    #[test]
    fn unknown_label_is_error() {
        assert_matches!(
            normalize_status("pending"),
            Err(MappingError::UnknownStatus(label)) if label == "pending"
        );
    }

    #[test]
    fn labels_are_case_sensitive() {
        assert!(normalize_status("Publish").is_err());
    }
}
