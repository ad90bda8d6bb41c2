//! Identity and ordering types for queued writes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unique identifier for a queued write.
///
/// Composed of the enqueue wall-clock time in milliseconds and a sequence
/// number that disambiguates writes issued within the same millisecond
/// (or after a clock step backwards). Displayed as `"<millis>-<seq>"`.
///
/// Ids produced by [`ItemId::next_after`] are strictly increasing, so
/// ordering by id is ordering by enqueue.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId {
    millis: u64,
    seq: u32,
}

impl ItemId {
    /// Create an ItemId from its parts.
    pub fn new(millis: u64, seq: u32) -> Self {
        Self { millis, seq }
    }

    /// Allocate the id following `last` at wall-clock time `now_millis`.
    ///
    /// Never returns an id less than or equal to `last`, even when the
    /// clock has moved backwards.
    pub fn next_after(last: Option<ItemId>, now_millis: u64) -> Self {
        match last {
            Some(last) if now_millis <= last.millis => match last.seq.checked_add(1) {
                Some(seq) => Self::new(last.millis, seq),
                None => Self::new(last.millis.saturating_add(1), 0),
            },
            _ => Self::new(now_millis, 0),
        }
    }

    /// Enqueue time component in milliseconds since the Unix epoch.
    pub fn millis(&self) -> u64 {
        self.millis
    }

    /// Sequence component.
    pub fn seq(&self) -> u32 {
        self.seq
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.millis, self.seq)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self)
    }
}

/// Error returned when parsing a malformed [`ItemId`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid item id: {0:?}")]
pub struct InvalidItemId(pub String);

impl FromStr for ItemId {
    type Err = InvalidItemId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (millis, seq) = s
            .split_once('-')
            .ok_or_else(|| InvalidItemId(s.to_string()))?;
        let millis = millis.parse().map_err(|_| InvalidItemId(s.to_string()))?;
        let seq = seq.parse().map_err(|_| InvalidItemId(s.to_string()))?;
        Ok(Self::new(millis, seq))
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidItemId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_id_uses_clock() {
        let id = ItemId::next_after(None, 1_700_000_000_000);
        assert_eq!(id, ItemId::new(1_700_000_000_000, 0));
    }

    #[test]
    fn same_millisecond_bumps_sequence() {
        let first = ItemId::next_after(None, 500);
        let second = ItemId::next_after(Some(first), 500);
        let third = ItemId::next_after(Some(second), 500);

        assert_eq!(second, ItemId::new(500, 1));
        assert_eq!(third, ItemId::new(500, 2));
        assert!(first < second && second < third);
    }

    #[test]
    fn clock_going_backwards_still_increases() {
        let last = ItemId::new(1000, 4);
        let next = ItemId::next_after(Some(last), 900);
        assert_eq!(next, ItemId::new(1000, 5));
        assert!(next > last);
    }

    #[test]
    fn later_clock_resets_sequence() {
        let last = ItemId::new(1000, 7);
        assert_eq!(ItemId::next_after(Some(last), 1001), ItemId::new(1001, 0));
    }

    #[test]
    fn sequence_overflow_rolls_into_next_millisecond() {
        let last = ItemId::new(1000, u32::MAX);
        assert_eq!(ItemId::next_after(Some(last), 1000), ItemId::new(1001, 0));
    }

    #[test]
    fn display_and_parse_agree() {
        let id = ItemId::new(1_712_345_678_901, 3);
        assert_eq!(id.to_string(), "1712345678901-3");
        assert_eq!("1712345678901-3".parse::<ItemId>().unwrap(), id);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<ItemId>().is_err());
        assert!("abc".parse::<ItemId>().is_err());
        assert!("12-x".parse::<ItemId>().is_err());
        assert!("-1".parse::<ItemId>().is_err());
    }

    #[test]
    fn serializes_as_string() {
        let id = ItemId::new(42, 1);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42-1\"");
        let back: ItemId = serde_json::from_str("\"42-1\"").unwrap();
        assert_eq!(back, id);
    }
}
