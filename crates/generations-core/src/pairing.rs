//! Interaction scheduling for one iteration.
//!
//! Every critter makes up to `max_per_critter` attempts to find a partner.
//! Each attempt samples uniformly from the critter's remaining candidates
//! (everyone but itself and partners it already sampled) and is accepted
//! only if the unordered pair has not been scheduled yet this iteration.
//! The result is a random interaction graph, not a complete one.

use std::collections::BTreeSet;

use rand::Rng;

/// Canonical form of an unordered pair: the two names sorted.
pub fn canonical_pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_owned(), b.to_owned())
    } else {
        (b.to_owned(), a.to_owned())
    }
}

/// Compute the pairs that interact this iteration.
///
/// Pairs are returned in scheduling order, each as `(initiator, partner)`.
/// No unordered pair appears twice and no critter is paired with itself.
pub fn schedule_interactions<R: Rng + ?Sized>(
    names: &[String],
    max_per_critter: usize,
    rng: &mut R,
) -> Vec<(String, String)> {
    let mut scheduled: BTreeSet<(String, String)> = BTreeSet::new();
    let mut pairs = Vec::new();

    for name in names {
        let mut candidates: Vec<&String> = names.iter().filter(|c| *c != name).collect();
        for _ in 0..max_per_critter {
            if candidates.is_empty() {
                break;
            }
            let index = rng.random_range(0..candidates.len());
            let partner = candidates.swap_remove(index);
            if scheduled.insert(canonical_pair(name, partner)) {
                pairs.push((name.clone(), partner.clone()));
            }
        }
    }

    pairs
}
