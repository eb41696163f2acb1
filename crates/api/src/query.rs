//! Shared query parameter types for page handlers.

use serde::{Deserialize, Deserializer};

/// Query parameters for listing pages (`?page=&include_inactive=&success=`).
///
/// `success` carries the notice set by the redirect after a mutation.
/// `page` and `include_inactive` never reject: an unreadable page is the
/// first page and any flag value other than a truthy one is off.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default, deserialize_with = "lenient_page")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub include_inactive: bool,
    pub success: Option<String>,
}

fn lenient_page<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.is_some_and(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        )
    }))
}
