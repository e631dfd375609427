//! Discovery records and item identity

use serde::{Deserialize, Serialize};

/// An item as presented by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Option<String>,
    pub name: String,
    pub fact: String,
    pub image: Option<String>,
}

/// Ledger key for an item: the id when present, otherwise the name.
///
/// An empty id counts as absent. The same item can therefore land under two
/// different keys depending on whether the scan carried an id.
pub fn key_of(item: &Item) -> Option<String> {
    item.id
        .as_deref()
        .filter(|id| !id.is_empty())
        .or_else(|| Some(item.name.as_str()).filter(|name| !name.is_empty()))
        .map(str::to_string)
}

/// A persisted discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    pub key: String,
    pub name: String,
    pub fact: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// First discovery (ms since epoch)
    pub first_found: i64,
    /// Last counted scan (ms since epoch)
    pub last_scanned: i64,
    pub scans: u32,
}

impl DiscoveryRecord {
    /// A fresh record for a first discovery at `now`
    pub fn first(key: &str, item: &Item, now: i64) -> Self {
        Self {
            key: key.to_string(),
            name: item.name.clone(),
            fact: item.fact.clone(),
            image: item.image.clone(),
            first_found: now,
            last_scanned: now,
            scans: 1,
        }
    }

    /// The item this record was created from
    pub fn item(&self) -> Item {
        Item {
            id: None,
            name: self.name.clone(),
            fact: self.fact.clone(),
            image: self.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: Option<&str>, name: &str) -> Item {
        Item {
            id: id.map(str::to_string),
            name: name.to_string(),
            fact: "Ducks have waterproof feathers.".to_string(),
            image: None,
        }
    }

    #[test]
    fn key_prefers_id() {
        assert_eq!(key_of(&item(Some("42"), "Sir Quacks")).as_deref(), Some("42"));
    }

    #[test]
    fn key_falls_back_to_name() {
        assert_eq!(key_of(&item(None, "Sir Quacks")).as_deref(), Some("Sir Quacks"));
    }

    #[test]
    fn empty_id_falls_back_to_name() {
        assert_eq!(key_of(&item(Some(""), "Sir Quacks")).as_deref(), Some("Sir Quacks"));
    }

    #[test]
    fn no_identity_is_none() {
        assert!(key_of(&item(None, "")).is_none());
        assert!(key_of(&item(Some(""), "")).is_none());
    }

    #[test]
    fn record_serializes_camel_case() {
        let record = DiscoveryRecord::first("42", &item(Some("42"), "Sir Quacks"), 1_000);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"firstFound\":1000"));
        assert!(json.contains("\"lastScanned\":1000"));
        assert!(!json.contains("image"));
    }
}
