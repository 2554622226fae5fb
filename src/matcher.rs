//! Member matching: pair two shapes by member name.
use std::collections::BTreeMap;
use crate::ir::{MatchedPair, Shape, TypeRef};

/// Pair the members of `source` and `target` by name.
///
/// The result covers the union of both name sets in ascending lexicographic
/// order; that order is the order statements are emitted in. Names present on
/// one side only are kept with the other side absent, so the "nothing to copy"
/// decision stays with the synthesizer.
pub fn match_members<T: TypeRef>(source: &Shape<T>, target: &Shape<T>) -> Vec<MatchedPair<T>> {
    let mut pairs: BTreeMap<&str, MatchedPair<T>> = BTreeMap::new();

    // keys from source
    for (name, member) in &source.members {
        pairs.insert(name.as_str(), MatchedPair {
            name: name.clone(),
            source: Some(member.clone()),
            target: None,
        });
    }
    // then target, filling in or adding
    for (name, member) in &target.members {
        pairs
            .entry(name.as_str())
            .or_insert_with(|| MatchedPair { name: name.clone(), source: None, target: None })
            .target = Some(member.clone());
    }

    pairs.into_values().collect()
}
