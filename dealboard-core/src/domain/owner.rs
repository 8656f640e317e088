//! Owner — the person responsible for a deal.

use serde::{Deserialize, Serialize};

/// A deal owner from the Users sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub owner_id: i64,
    pub full_name: String,
}

impl Owner {
    /// Build the display name from first/last parts. A missing part
    /// contributes an empty segment rather than failing, so
    /// ("Jane", "") yields "Jane " and ("", "") yields "".
    pub fn full_name_of(first: &str, last: &str) -> String {
        format!("{} {}", first.trim(), last.trim())
            .trim_start()
            .to_string()
    }
}
