//! Deduplicating template collection keyed by canonical hash.

use crate::template::{CanonicalHasher, WaveletTemplate};
use crate::util::HaarResult;
use std::collections::HashMap;

/// Templates with at most one representative per geometry.
///
/// Lookups go through the canonical hash first and then compare the
/// rectangle sets, so distinct geometries that share a hash are both kept.
/// Iteration follows insertion order until `sort_by_dimension` is called.
#[derive(Clone, Debug)]
pub struct TemplateSet {
    hasher: CanonicalHasher,
    templates: Vec<WaveletTemplate>,
    index: HashMap<u128, Vec<usize>>,
    duplicates: usize,
    collisions: usize,
}

impl TemplateSet {
    /// Creates an empty set for templates inside a `sample_size` window.
    pub fn new(sample_size: usize) -> HaarResult<Self> {
        Ok(Self::with_hasher(CanonicalHasher::new(sample_size)?))
    }

    pub(crate) fn with_hasher(hasher: CanonicalHasher) -> Self {
        Self {
            hasher,
            templates: Vec::new(),
            index: HashMap::new(),
            duplicates: 0,
            collisions: 0,
        }
    }

    /// Inserts `tpl` unless an equivalent geometry is already present.
    ///
    /// Returns `Ok(true)` when the template was added.
    pub fn insert(&mut self, tpl: WaveletTemplate) -> HaarResult<bool> {
        let key = self.hasher.hash(&tpl)?;
        let bucket = self.index.entry(key).or_default();
        if bucket
            .iter()
            .any(|&idx| self.templates[idx].same_geometry(&tpl))
        {
            self.duplicates += 1;
            return Ok(false);
        }
        if !bucket.is_empty() {
            self.collisions += 1;
        }
        bucket.push(self.templates.len());
        self.templates.push(tpl);
        Ok(true)
    }

    /// Returns true if a template with the same geometry is present.
    pub fn contains(&self, tpl: &WaveletTemplate) -> bool {
        let Ok(key) = self.hasher.hash(tpl) else {
            return false;
        };
        self.index.get(&key).is_some_and(|bucket| {
            bucket
                .iter()
                .any(|&idx| self.templates[idx].same_geometry(tpl))
        })
    }

    /// Moves every template of `other` into `self`, keeping `other`'s order.
    ///
    /// Returns how many templates were added.
    pub fn merge(&mut self, other: TemplateSet) -> HaarResult<usize> {
        self.duplicates += other.duplicates;
        self.collisions += other.collisions;
        let mut added = 0usize;
        for tpl in other.templates {
            if self.insert(tpl)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Stably sorts templates by rectangle count.
    pub fn sort_by_dimension(&mut self) {
        self.templates.sort_by(WaveletTemplate::cmp_dimension);
        self.rebuild_index();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (idx, tpl) in self.templates.iter().enumerate() {
            if let Ok(key) = self.hasher.hash(tpl) {
                self.index.entry(key).or_default().push(idx);
            }
        }
    }

    /// Returns the number of distinct templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Returns true if the set holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterates over templates in their current order.
    pub fn iter(&self) -> std::slice::Iter<'_, WaveletTemplate> {
        self.templates.iter()
    }

    /// Returns the templates as a slice.
    pub fn as_slice(&self) -> &[WaveletTemplate] {
        &self.templates
    }

    /// Returns the templates, consuming the set.
    pub fn into_vec(self) -> Vec<WaveletTemplate> {
        self.templates
    }

    /// Returns how many templates have each rectangle count.
    pub fn count_by_dimension(&self, dimensions: usize) -> usize {
        self.templates
            .iter()
            .filter(|tpl| tpl.dimensions() == dimensions)
            .count()
    }

    /// Returns how many inserts were rejected as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Returns how many distinct geometries landed on an occupied hash.
    pub fn collisions(&self) -> usize {
        self.collisions
    }
}

impl<'a> IntoIterator for &'a TemplateSet {
    type Item = &'a WaveletTemplate;
    type IntoIter = std::slice::Iter<'a, WaveletTemplate>;

    fn into_iter(self) -> Self::IntoIter {
        self.templates.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::TemplateSet;
    use crate::template::{Rect, WaveletTemplate};

    fn pair(a: (usize, usize), b: (usize, usize), wa: f32) -> WaveletTemplate {
        WaveletTemplate::new(
            vec![Rect::new(a.0, a.1, 3, 3), Rect::new(b.0, b.1, 3, 3)],
            vec![wa, -wa],
        )
        .unwrap()
    }

    #[test]
    fn rejects_reordered_duplicates() {
        let mut set = TemplateSet::new(6).unwrap();
        assert!(set.insert(pair((0, 0), (3, 0), 1.0)).unwrap());
        assert!(!set.insert(pair((3, 0), (0, 0), 1.0)).unwrap());
        assert!(!set.insert(pair((0, 0), (3, 0), -1.0)).unwrap());
        assert_eq!(set.len(), 1);
        assert_eq!(set.duplicates(), 2);
        assert_eq!(set.as_slice()[0].weights(), &[1.0, -1.0]);
    }

    #[test]
    fn keeps_distinct_geometries_on_hash_collision() {
        let mut set = TemplateSet::new(6).unwrap();
        assert!(set.insert(pair((0, 0), (3, 3), 1.0)).unwrap());
        assert!(set.insert(pair((3, 0), (0, 3), 1.0)).unwrap());
        assert_eq!(set.len(), 2);
        assert_eq!(set.collisions(), 1);
        assert!(set.contains(&pair((3, 3), (0, 0), 1.0)));
        assert!(set.contains(&pair((0, 3), (3, 0), 1.0)));
        assert!(!set.contains(&pair((0, 0), (0, 3), 1.0)));
    }

    #[test]
    fn sort_is_stable_within_dimension() {
        let mut set = TemplateSet::new(6).unwrap();
        let triple = WaveletTemplate::new(
            vec![
                Rect::new(0, 0, 2, 2),
                Rect::new(2, 0, 2, 2),
                Rect::new(4, 0, 2, 2),
            ],
            vec![1.0, -1.0, 1.0],
        )
        .unwrap();
        set.insert(triple.clone()).unwrap();
        set.insert(pair((0, 0), (3, 0), 1.0)).unwrap();
        set.insert(pair((0, 0), (0, 3), 1.0)).unwrap();
        set.sort_by_dimension();

        let dims: Vec<_> = set.iter().map(|t| t.dimensions()).collect();
        assert_eq!(dims, vec![2, 2, 3]);
        assert_eq!(set.as_slice()[0], pair((0, 0), (3, 0), 1.0));
        assert_eq!(set.as_slice()[1], pair((0, 0), (0, 3), 1.0));
        assert!(set.contains(&triple));
        assert_eq!(set.count_by_dimension(2), 2);
    }

    #[test]
    fn merge_preserves_order_and_skips_known_geometry() {
        let mut a = TemplateSet::new(6).unwrap();
        a.insert(pair((0, 0), (3, 0), 1.0)).unwrap();
        let mut b = TemplateSet::new(6).unwrap();
        b.insert(pair((3, 0), (0, 0), 1.0)).unwrap();
        b.insert(pair((0, 0), (0, 3), 1.0)).unwrap();
        assert_eq!(a.merge(b).unwrap(), 1);
        assert_eq!(a.len(), 2);
        assert_eq!(a.as_slice()[1], pair((0, 0), (0, 3), 1.0));
    }
}
