use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An opaque identity token, e.g. an address or a user name.
///
/// Spending an output only requires presenting the same token the output is locked to;
/// there is no signature behind it.
#[derive(Debug, Clone, Hash, Ord, PartialOrd, Serialize, Deserialize, Eq, PartialEq)]
pub struct Owner(String);

impl Owner {
    pub fn new(owner: impl Into<String>) -> Self {
        Self(owner.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Owner {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Display for Owner {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
