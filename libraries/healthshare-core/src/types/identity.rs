/// Identity domain type
use crate::types::UserId;
use serde::{Deserialize, Serialize};

/// A verified identity as returned by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
    pub display_name: String,
}

/// Normalize an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
