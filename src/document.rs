//! The ordered document container.
//!
//! BSON documents are ordered on the wire, while hash maps are not, so the
//! codec carries both: [`Document`] preserves element order exactly (and is
//! the only form for which byte-for-byte round trips are guaranteed), and
//! `HashMap<String, Bson>` is the free-form unordered view with explicit
//! conversions in both directions.

use crate::Bson;
use hashbrown::HashMap;
use std::{iter::FromIterator, slice::Iter, vec::IntoIter};

/// An insertion-ordered map of element names to [`Bson`] values, implemented
/// as a `Vec` of pairs.
///
/// Lookups scan linearly; documents are element lists first and maps second,
/// and the lists stay short in practice.
///
/// # Example
///
/// ```
/// use bson::{doc, Bson};
///
/// let d = doc! { "a" => 1i32, "b" => "two" };
/// assert_eq!(d.get("b"), Some(&Bson::String("two".to_string())));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document(Vec<(String, Bson)>);

impl Document {
    /// Creates an empty `Document`.
    pub fn new() -> Document { Document(Vec::new()) }

    /// Creates an empty `Document` with preallocated capacity.
    pub fn with_capacity(cap: usize) -> Document { Document(Vec::with_capacity(cap)) }

    /// Returns the number of elements.
    pub fn len(&self) -> usize { self.0.len() }

    /// Indicates whether the document has no elements.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns an iterator over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<(String, Bson)> { self.0.iter() }

    /// Returns the first value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Bson> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Indicates whether any element is stored under `key`.
    pub fn contains_key(&self, key: &str) -> bool { self.0.iter().any(|(k, _)| k == key) }

    /// Inserts a value under `key`, returning the previous value if the key
    /// was already present. Replacement keeps the element's position.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Bson>
    where
        K: Into<String>,
        V: Into<Bson>,
    {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.0.push((key, value));
                None
            }
        }
    }

    /// Appends an element unconditionally.
    ///
    /// The wire format permits repeated names, and the decoder must preserve
    /// whatever it read, so this bypasses the replace-on-insert behavior.
    pub fn push(&mut self, key: String, value: Bson) { self.0.push((key, value)) }

    /// Removes the first element stored under `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Bson> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// Consumes the document, producing the unordered map view.
    ///
    /// Repeated names collapse to the last value, mirroring what a map-based
    /// reader of the same bytes would observe.
    pub fn into_hashmap(self) -> HashMap<String, Bson> { self.0.into_iter().collect() }
}

impl From<Vec<(String, Bson)>> for Document {
    fn from(v: Vec<(String, Bson)>) -> Document { Document(v) }
}

impl From<HashMap<String, Bson>> for Document {
    fn from(m: HashMap<String, Bson>) -> Document {
        Document(m.into_iter().collect())
    }
}

impl IntoIterator for Document {
    type IntoIter = IntoIter<(String, Bson)>;
    type Item = (String, Bson);

    fn into_iter(self) -> IntoIter<(String, Bson)> { self.0.into_iter() }
}

impl<'a> IntoIterator for &'a Document {
    type IntoIter = Iter<'a, (String, Bson)>;
    type Item = &'a (String, Bson);

    fn into_iter(self) -> Iter<'a, (String, Bson)> { self.0.iter() }
}

impl<K: Into<String>, V: Into<Bson>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Document {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}

impl<K: Into<String>, V: Into<Bson>> Extend<(K, V)> for Document {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}
