use std::collections::HashMap;
use std::rc::Rc;

use crate::analysis::ClassificationResult;
use crate::normalize::hash_content;

/// Content fingerprint: SHA-256 of the normalized text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(normalized_text: &str) -> Self {
        Self(hash_content(normalized_text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Memo of classification results keyed by content fingerprint.
///
/// Lives as long as the page context; entries are never evicted.
#[derive(Debug, Default)]
pub struct ClassificationCache {
    entries: HashMap<Fingerprint, Rc<ClassificationResult>>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Rc<ClassificationResult>> {
        self.entries.get(fingerprint).cloned()
    }

    pub fn put(&mut self, fingerprint: Fingerprint, result: Rc<ClassificationResult>) {
        self.entries.insert(fingerprint, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn test_same_text_same_fingerprint() {
        assert_eq!(Fingerprint::of("remote role"), Fingerprint::of("remote role"));
        assert_ne!(Fingerprint::of("remote role"), Fingerprint::of("hybrid role"));
        assert_eq!(Fingerprint::of("x").as_str().len(), 64);
    }

    #[test]
    fn test_hit_returns_same_object() {
        let mut cache = ClassificationCache::new();
        let text = "hybrid role with relocation support";
        let fp = Fingerprint::of(text);
        assert!(cache.get(&fp).is_none());

        let result = Rc::new(classify(text));
        cache.put(fp.clone(), Rc::clone(&result));

        let hit = cache.get(&fp).unwrap();
        assert!(Rc::ptr_eq(&hit, &result));
        assert_eq!(cache.len(), 1);
    }
}
