//! Listing entries returned by the archive's paged image endpoint.

use serde::{Deserialize, Serialize};

/// One entry of a listing page.
///
/// The archive serves `{"_id": ..., "name": ..., "updated": ...}`; only the
/// identifier is needed to fetch the item, the rest is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Remote identifier, used for the per-item endpoints and local filenames.
    #[serde(rename = "_id", alias = "identifier")]
    pub id: String,
    /// Human-readable item name (e.g. `ISIC_0000050`).
    #[serde(default)]
    pub name: Option<String>,
    /// Last-modified timestamp as reported by the archive.
    #[serde(default)]
    pub updated: Option<String>,
}

impl ItemRef {
    /// Creates a reference carrying only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            updated: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ref_deserializes_archive_shape() {
        let json = r#"{"_id":"5436e3b1bae478396759f133","name":"ISIC_0000050","updated":"2015-02-23T02:58:29.441000+00:00"}"#;
        let item: ItemRef = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "5436e3b1bae478396759f133");
        assert_eq!(item.name.as_deref(), Some("ISIC_0000050"));
        assert_eq!(
            item.updated.as_deref(),
            Some("2015-02-23T02:58:29.441000+00:00")
        );
    }

    #[test]
    fn test_item_ref_accepts_identifier_alias() {
        let item: ItemRef = serde_json::from_str(r#"{"identifier":"abc123"}"#).unwrap();
        assert_eq!(item, ItemRef::new("abc123"));
    }

    #[test]
    fn test_item_ref_ignores_unknown_fields() {
        let item: ItemRef =
            serde_json::from_str(r#"{"_id":"abc","_modelType":"image","extra":{"a":1}}"#).unwrap();
        assert_eq!(item.id, "abc");
        assert!(item.name.is_none());
    }

    #[test]
    fn test_item_ref_missing_id_is_rejected() {
        let result: Result<ItemRef, _> = serde_json::from_str(r#"{"name":"ISIC_0000050"}"#);
        assert!(result.is_err());
    }
}
