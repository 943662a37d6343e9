use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(CohortId);

/// Unique display name of a cohort. Used as the delete key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CohortName(pub String);

impl CohortName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CohortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CohortName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CohortName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CohortId>,
    pub name: CohortName,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub cohort_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Cohort {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: CohortName::new(name),
            description: None,
            cohort_type: None,
            created_at: None,
        }
    }
}
