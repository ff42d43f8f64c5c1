use std::collections::HashSet;
use std::hash::Hash;

/// Distinct values in order of first appearance.
pub fn unique_in_encounter_order<'a, K, I>(keys: I) -> Vec<&'a K>
where
    K: Eq + Hash + ?Sized + 'a,
    I: IntoIterator<Item = &'a K>,
{
    let mut seen = HashSet::new();
    keys.into_iter().filter(|key| seen.insert(*key)).collect()
}

/// Indices of the items whose key equals `target`
pub fn get_group_indices<K, T>(items: &[T], target: &K, key: impl Fn(&T) -> &K) -> Vec<usize>
where
    K: PartialEq + ?Sized,
{
    items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| if key(item) == target { Some(i) } else { None })
        .collect()
}
