//! Single-key sort with locale-style string collation.

use std::cmp::Ordering;

use fluxradar_core::{Field, Resource};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<Field>,
    pub direction: Direction,
}

impl Default for SortConfig {
    fn default() -> Self { Self { key: Some(Field::Name), direction: Direction::Ascending } }
}

impl SortConfig {
    /// Clicking the active key flips its direction; a new key starts ascending.
    pub fn request(&mut self, key: Field) {
        self.direction = if self.key == Some(key) && self.direction == Direction::Ascending {
            Direction::Descending
        } else {
            Direction::Ascending
        };
        self.key = Some(key);
    }

    /// Stable sort of `rows` in place. No key leaves the order untouched.
    pub fn apply(&self, rows: &mut [&Resource]) {
        let Some(key) = self.key else { return };
        rows.sort_by(|a, b| {
            let ord = locale_cmp(&a.field_text(key), &b.field_text(key));
            match self.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });
    }
}

/// Collation approximating a default locale comparison. Punctuation and
/// whitespace sort before digits, digits before letters; letters compare
/// case-insensitively first, then lowercase before uppercase, then by code point.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary(a)
        .cmp(primary(b))
        .then_with(|| a.chars().map(char::is_uppercase).cmp(b.chars().map(char::is_uppercase)))
        .then_with(|| a.cmp(b))
}

fn primary(s: &str) -> impl Iterator<Item = (u8, char)> + '_ {
    s.chars().flat_map(char::to_lowercase).map(|c| {
        let class = if c.is_alphabetic() {
            2
        } else if c.is_numeric() {
            1
        } else {
            0
        };
        (class, c)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collation_orders_case_insensitively() {
        let mut v = vec!["beta", "Alpha", "alpha", "Gamma", "", "delta"];
        v.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(v, ["", "alpha", "Alpha", "beta", "delta", "Gamma"]);
    }

    #[test]
    fn punctuation_and_digits_sort_before_letters() {
        let mut v = vec!["b", "{x", "app1", "7", "app-1", "~a", "a"];
        v.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(v, ["{x", "~a", "7", "a", "app-1", "app1", "b"]);
    }

    #[test]
    fn toggle_semantics() {
        let mut s = SortConfig::default();
        s.request(Field::Name);
        assert_eq!(s.direction, Direction::Descending);
        s.request(Field::Name);
        assert_eq!(s.direction, Direction::Ascending);
        s.request(Field::Name);
        s.request(Field::Status);
        assert_eq!((s.key, s.direction), (Some(Field::Status), Direction::Ascending));
    }
}
