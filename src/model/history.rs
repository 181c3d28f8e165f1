//! History event records
//!
//! A history item records one event of the lore timeline. `timestamp` is the
//! caller-supplied creation stamp (from the timestamp service, microseconds
//! since the epoch) and orders items by creation; `(year, day)` are in-story
//! calendar coordinates independent of that ordering. `properties` carries
//! opaque serialized metadata the store never parses.

use super::reject_embedded_nul;
use crate::errors::LoreResult;

/// One event on the lore timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    /// Creation stamp, supplied by the caller at write time
    pub timestamp: i64,
    /// In-story calendar year
    pub year: i32,
    /// In-story day of year
    pub day: i32,
    /// Event text
    pub content: String,
    /// Opaque serialized metadata, stored verbatim
    pub properties: String,
}

impl HistoryItem {
    /// Create a new history item.
    pub fn new(
        timestamp: i64,
        year: i32,
        day: i32,
        content: impl Into<String>,
        properties: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            year,
            day,
            content: content.into(),
            properties: properties.into(),
        }
    }

    /// Checks that every text field can cross the boundary.
    pub fn validate(&self) -> LoreResult<()> {
        reject_embedded_nul("content", &self.content)?;
        reject_embedded_nul("properties", &self.properties)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_item_passes() {
        let item = HistoryItem::new(1, 2021, 29, "testcontent", "{\"is_secret\":true}");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_negative_calendar_coordinates_are_valid() {
        // Lore calendars reach before their epoch.
        let item = HistoryItem::new(1, -13, 0, "ancient", "");
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_nul_in_text_fails() {
        assert!(HistoryItem::new(1, 2021, 1, "a\0b", "").validate().is_err());
        assert!(HistoryItem::new(1, 2021, 1, "ok", "{\0}").validate().is_err());
    }
}
