use serde_json::{Map, Value};

/// Request-scoped information handed to every store operation.
///
/// The core never interprets `attributes`; permission checkers and item
/// loaders may use them for their own decisions and caching.
#[derive(Clone, Debug, Default)]
pub struct Context {
    /// Username of the caller, if authenticated.
    pub user: Option<String>,
    pub attributes: Map<String, Value>,
}

impl Context {
    /// An anonymous context.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A context for the named user.
    pub fn user(name: impl Into<String>) -> Self {
        Self {
            user: Some(name.into()),
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}
