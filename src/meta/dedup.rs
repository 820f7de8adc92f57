//! Name-keyed, order-preserving deduplication of provenance records.
use super::types::{License, Origin, Source};
use std::collections::HashSet;

/// The identity used when two provenance records are merged.
pub trait DedupKey {
    fn dedup_key(&self) -> String;
}

impl DedupKey for Source {
    fn dedup_key(&self) -> String { self.name.clone() }
}

impl DedupKey for License {
    fn dedup_key(&self) -> String { self.name.clone() }
}

impl DedupKey for Origin {
    fn dedup_key(&self) -> String {
        format!("{}|{}", self.producer, self.title.as_deref().unwrap_or_default())
    }
}

/// Concatenates the given lists, keeping only the first record for each key.
pub fn merge_unique<'a, T, I>(lists: I) -> Vec<T>
where
    T: DedupKey + Clone + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for item in list {
            if seen.insert(item.dedup_key()) {
                merged.push(item.clone());
            }
        }
    }
    merged
}

/// Appends `item` unless a record with the same key is already present.
pub fn push_unique<T: DedupKey>(list: &mut Vec<T>, item: T) -> bool {
    let key = item.dedup_key();
    if list.iter().any(|existing| existing.dedup_key() == key) {
        return false;
    }
    list.push(item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, url: &str) -> Source {
        Source { name: name.into(), url: Some(url.into()), ..Default::default() }
    }

    #[test]
    fn test_first_occurrence_wins() {
        let a = vec![source("WDI", "first"), source("UN", "un")];
        let b = vec![source("WDI", "second"), source("IMF", "imf")];

        let merged = merge_unique([a.as_slice(), b.as_slice()]);

        let names: Vec<_> = merged.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["WDI", "UN", "IMF"]);
        assert_eq!(merged[0].url.as_deref(), Some("first"));
        assert!(merged.len() <= a.len() + b.len());
    }

    #[test]
    fn test_origin_identity_includes_title() {
        let pop = Origin::new("UN", "Population");
        let fert = Origin::new("UN", "Fertility");
        let merged = merge_unique([vec![pop.clone(), fert, pop].as_slice()]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_push_unique() {
        let mut licenses = vec![License::new("CC BY 4.0")];
        assert!(!push_unique(&mut licenses, License::new("CC BY 4.0")));
        assert!(push_unique(&mut licenses, License::new("CC0")));
        assert_eq!(licenses.len(), 2);
    }
}
