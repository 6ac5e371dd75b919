//! Contact details collected before finalizing

use serde::{Deserialize, Serialize};

use crate::domain::error::ContactError;

/// Contact details for the final report handoff.
///
/// The name is required; email and phone are optional and empty inputs
/// collapse to absent rather than empty strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ContactInfo {
    /// Validate and normalize contact details
    pub fn new(name: &str, email: Option<&str>, phone: Option<&str>) -> Result<Self, ContactError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactError::EmptyName);
        }
        Ok(Self {
            name: name.to_string(),
            email: normalize(email),
            phone: normalize(phone),
        })
    }
}

fn normalize(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
