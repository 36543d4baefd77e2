//! Sequential default identities.
//!
//! Critters created without a name receive `Critter_<n>`. The counter is
//! owned by whoever constructs the population (the world), never by a
//! global, so two runs in one process hand out the same names.
//!
//! The generator also tracks which names are in use. The world releases a
//! name when its critter leaves the population, so the set stays bounded
//! by the live population.

use std::collections::BTreeSet;

/// Prefix of generated critter names.
pub const DEFAULT_NAME_PREFIX: &str = "Critter";

/// Hands out unique `Critter_<n>` names, skipping reserved ones.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    /// Number of names issued so far.
    issued: u64,
    /// Names currently held by living critters.
    reserved: BTreeSet<String>,
}

impl NameGenerator {
    /// Create a generator whose first name is `Critter_1`.
    pub const fn new() -> Self {
        Self {
            issued: 0,
            reserved: BTreeSet::new(),
        }
    }

    /// Mark a name as taken so it is never generated.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    /// Whether a name is currently taken.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    /// Give a name back once its critter has left the population.
    ///
    /// Generated names are never issued twice regardless, since the counter
    /// only moves forward.
    pub fn release(&mut self, name: &str) -> bool {
        self.reserved.remove(name)
    }

    /// Number of names currently taken.
    pub fn in_use(&self) -> usize {
        self.reserved.len()
    }

    /// Produce the next free name.
    pub fn next_name(&mut self) -> String {
        loop {
            self.issued = self.issued.saturating_add(1);
            let candidate = format!("{DEFAULT_NAME_PREFIX}_{}", self.issued);
            if !self.reserved.contains(&candidate) {
                self.reserved.insert(candidate.clone());
                return candidate;
            }
        }
    }

    /// Number of counter values consumed so far.
    pub const fn issued(&self) -> u64 {
        self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_sequential() {
        let mut names = NameGenerator::new();
        assert_eq!(names.next_name(), "Critter_1");
        assert_eq!(names.next_name(), "Critter_2");
        assert_eq!(names.issued(), 2);
    }

    #[test]
    fn reserved_names_are_skipped() {
        let mut names = NameGenerator::new();
        names.reserve("Critter_2");
        assert_eq!(names.next_name(), "Critter_1");
        assert_eq!(names.next_name(), "Critter_3");
    }

    #[test]
    fn released_names_free_their_slot() {
        let mut names = NameGenerator::new();
        names.reserve("a.1");
        let generated = names.next_name();
        assert!(names.is_reserved("a.1"));
        assert!(names.is_reserved(&generated));
        assert_eq!(names.in_use(), 2);

        assert!(names.release("a.1"));
        assert!(names.release(&generated));
        assert!(!names.release("a.1"));
        assert_eq!(names.in_use(), 0);
        // The counter never rewinds.
        assert_eq!(names.next_name(), "Critter_2");
    }

    #[test]
    fn generators_are_independent() {
        let mut first = NameGenerator::new();
        let mut second = NameGenerator::new();
        let _ = first.next_name();
        assert_eq!(second.next_name(), "Critter_1");
    }
}
