use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Collection, Patch, Record};

text_enum! {
    NetworkType default Person {
        Person => "person",
        Community => "community",
        Event => "event",
    }
}

text_enum! {
    NetworkStatus default Interested {
        Interested => "interested",
        Contacted => "contacted",
        Connected => "connected",
        Attending => "attending",
        Attended => "attended",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioNetwork {
    pub id: String,
    #[serde(rename = "type", default)]
    pub network_type: NetworkType,
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: NetworkStatus,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_contact: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewNetwork {
    #[serde(rename = "type")]
    pub network_type: NetworkType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: NetworkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl NewNetwork {
    /// Parse a comma separated tag field, dropping blanks.
    pub fn parse_tags(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NetworkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Patch for NetworkPatch {}

impl Record for StudioNetwork {
    const COLLECTION: Collection = Collection::Networks;

    type Draft = NewNetwork;
    type Patch = NetworkPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            NewNetwork::parse_tags("design, ,founders,  london "),
            vec!["design", "founders", "london"]
        );
        assert!(NewNetwork::parse_tags("").is_empty());
    }
}
