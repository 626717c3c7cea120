use serde::{Deserialize, Serialize};

const ID_PREFIX: &str = "item_";

/// Sequential ID generator for schema nodes within a document.
///
/// The counter only moves forward; restoring an older snapshot never
/// rewinds it, so identities stay unique for the life of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        let id = format!("{}{}", ID_PREFIX, self.next);
        self.next += 1;
        id
    }

    /// Counter value the next call to `new_id` will use
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// Move the counter forward to at least `floor`
    pub fn advance_to(&mut self, floor: u64) {
        self.next = self.next.max(floor);
    }

    /// Make sure future IDs cannot collide with `id`
    pub fn reserve(&mut self, id: &str) {
        if let Some(n) = id_number(id) {
            self.advance_to(n + 1);
        }
    }
}

/// Numeric part of a generated ID
pub fn id_number(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::new();

        assert_eq!(gen.new_id(), "item_0");
        assert_eq!(gen.new_id(), "item_1");
        assert_eq!(gen.new_id(), "item_2");
        assert_eq!(gen.peek(), 3);
    }

    #[test]
    fn test_counter_never_rewinds() {
        let mut gen = IdGenerator::starting_at(10);
        gen.advance_to(4);
        assert_eq!(gen.peek(), 10);

        gen.reserve("item_41");
        assert_eq!(gen.new_id(), "item_42");

        gen.reserve("custom");
        assert_eq!(gen.peek(), 43);
    }

    #[test]
    fn test_id_number() {
        assert_eq!(id_number("item_7"), Some(7));
        assert_eq!(id_number("item_"), None);
        assert_eq!(id_number("node-7"), None);
    }
}
