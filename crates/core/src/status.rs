//! Publication status shared by products and categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stored as lowercase text in the `status` column of both tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    #[default]
    Active,
    Inactive,
}

impl EntityStatus {
    pub const ALL: [EntityStatus; 2] = [EntityStatus::Active, EntityStatus::Inactive];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityStatus::Active => "active",
            EntityStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for EntityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(EntityStatus::Active),
            "inactive" => Ok(EntityStatus::Inactive),
            other => Err(format!("unknown status '{other}'")),
        }
    }
}
