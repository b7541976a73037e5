//! Shadow-column resolution.
//!
//! Review rows keep the generated text and a reviewer's `saved_` override side
//! by side. Every read path goes through [`resolve`]; nothing else compares the
//! two columns.

use crate::models::description::DescriptionField;
use crate::models::profile::ReviewProfile;

/// Effective value of a field: the override when it has any non-whitespace
/// character, otherwise the generated text.
pub fn resolve(generated: Option<&str>, saved: Option<&str>) -> Option<String> {
    match saved {
        Some(s) if !s.trim().is_empty() => Some(s.to_string()),
        _ => generated.map(str::to_string),
    }
}

impl ReviewProfile {
    pub fn generated_value(&self, field: DescriptionField) -> Option<&str> {
        self.generated.get(&field).and_then(|v| v.as_deref())
    }

    pub fn saved_value(&self, field: DescriptionField) -> Option<&str> {
        self.saved.get(&field).and_then(|v| v.as_deref())
    }

    pub fn effective(&self, field: DescriptionField) -> Option<String> {
        resolve(self.generated_value(field), self.saved_value(field))
    }
}
