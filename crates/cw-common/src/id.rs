//! Series identity.
//!
//! A series key names one tracked quantity: either a colony-wide domain
//! (`"food"`) or a domain scoped to one entity (`"mood:<colonist-id>"`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

const ENTITY_SEPARATOR: char = ':';

/// Opaque identifier for one tracked series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SeriesKey(pub String);

impl SeriesKey {
    /// Key for a colony-wide quantity.
    pub fn domain(domain: &str) -> Self {
        SeriesKey(domain.to_string())
    }

    /// Key for a quantity owned by a single entity.
    pub fn entity(domain: &str, entity_id: &str) -> Self {
        SeriesKey(format!("{}{}{}", domain, ENTITY_SEPARATOR, entity_id))
    }

    /// Domain part of the key.
    pub fn domain_name(&self) -> &str {
        match self.0.split_once(ENTITY_SEPARATOR) {
            Some((domain, _)) => domain,
            None => &self.0,
        }
    }

    /// Entity part of the key, if the series is entity-scoped.
    pub fn entity_id(&self) -> Option<&str> {
        self.0
            .split_once(ENTITY_SEPARATOR)
            .map(|(_, id)| id)
            .filter(|id| !id.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SeriesKey {
    fn from(s: &str) -> Self {
        SeriesKey(s.to_string())
    }
}
