use std::time::Duration;

use quire_types::version::UNKNOWN_AUTHOR;
use serde::{Deserialize, Serialize};

/// Tunables for the core stores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Attempts `put_page` makes before giving up on a slug or path
    /// collision. Each retry appends one random digit.
    pub max_slug_retries: u32,
    /// Upper bound on a single item loader, in whole seconds. `0` disables
    /// the bound.
    #[serde(with = "timeout_secs")]
    pub loader_timeout: Option<Duration>,
    /// Author stamped on versions when the caller has no identity.
    pub unknown_author: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            max_slug_retries: 10,
            loader_timeout: Some(Duration::from_secs(30)),
            unknown_author: UNKNOWN_AUTHOR.to_string(),
        }
    }
}

mod timeout_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        value.map_or(0, |d| d.as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let secs = u64::deserialize(deserializer)?;
        Ok((secs > 0).then(|| Duration::from_secs(secs)))
    }
}
