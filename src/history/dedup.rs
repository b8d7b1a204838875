use std::collections::HashMap;
use std::hash::Hash;

/// Outcome of collapsing records that claim the same key.
#[derive(Debug)]
pub(crate) struct Resolved<K, T> {
    /// One winner per key, in first-seen key order.
    pub winners: Vec<(K, T)>,
    /// Records that lost to another record with the same key.
    pub displaced: Vec<T>,
    /// Records with no key; never compared.
    pub unkeyed: Vec<T>,
}

/// Collapse `items` so that each key keeps exactly one record.
///
/// `prefer(candidate, incumbent)` returns true when the candidate should
/// replace the current winner. The outcome depends only on `prefer`, never
/// on input order, as long as `prefer` is a strict total preference.
pub(crate) fn resolve_duplicates<K, T, F, P>(
    items: impl IntoIterator<Item = T>,
    key: F,
    prefer: P,
) -> Resolved<K, T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> Option<K>,
    P: Fn(&T, &T) -> bool,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut winners: Vec<(K, T)> = Vec::new();
    let mut displaced = Vec::new();
    let mut unkeyed = Vec::new();

    for item in items {
        let Some(k) = key(&item) else {
            unkeyed.push(item);
            continue;
        };
        match slots.get(&k) {
            Some(&slot) => {
                if prefer(&item, &winners[slot].1) {
                    let loser = std::mem::replace(&mut winners[slot].1, item);
                    displaced.push(loser);
                } else {
                    displaced.push(item);
                }
            }
            None => {
                slots.insert(k.clone(), winners.len());
                winners.push((k, item));
            }
        }
    }

    Resolved {
        winners,
        displaced,
        unkeyed,
    }
}
