use indexmap::IndexMap;

/// A named group of key/value pairs, iterated in the order keys were first assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: IndexMap<String, String>,
}

impl Section {
    #[must_use]
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            entries: IndexMap::with_capacity(32),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Like [`Section::get`], but also borrows the stored key.
    #[must_use]
    pub fn get_key_value(&self, key: &str) -> Option<(&str, &str)> {
        self.entries
            .get_key_value(key)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Key/value pairs in first-assignment order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrites the value of an existing key in place; a new key goes to the end.
    pub(crate) fn insert(&mut self, key: String, value: String) {
        self.entries.insert(key, value);
    }
}
