//! Byte-keyed radix tree for wildcard domain lookup.
//!
//! Suffix wildcards (`*.example.com`) are stored under their reversed suffix
//! and prefix wildcards (`api.*`) under their prefix, so both reduce to
//! "every stored key that is a prefix of the lookup key". Callers then choose
//! the longest candidate that satisfies their own length rule.

use std::collections::HashMap;

/// A radix tree (compressed trie) over byte strings.
///
/// - Insert: O(k) where k is key length
/// - Lookup: O(k), one hash probe per edge
#[derive(Debug, Clone)]
pub struct RadixTree<V> {
    root: Node<V>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<V> {
    edge: Vec<u8>,
    value: Option<V>,
    children: HashMap<u8, Node<V>>,
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RadixTree<V> {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new(Vec::new(), None),
            len: 0,
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a key, returning the previous value if the key existed.
    pub fn insert(&mut self, key: &[u8], value: V) -> Option<V> {
        let previous = self.root.insert(key, value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Exact-key lookup.
    #[must_use]
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let mut node = &self.root;
        let mut rest = key;
        while let Some(first) = rest.first() {
            let child = node.children.get(first)?;
            rest = rest.strip_prefix(child.edge.as_slice())?;
            node = child;
        }
        node.value.as_ref()
    }

    /// Every stored key that is a prefix of `key`, as `(key_len, value)`,
    /// shortest first.
    ///
    /// ```
    /// use routa::RadixTree;
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert(b"moc.", "com");
    /// tree.insert(b"moc.elpmaxe.", "example");
    ///
    /// let hits: Vec<_> = tree.prefixes_of(b"moc.elpmaxe.www").collect();
    /// assert_eq!(hits, vec![(4, &"com"), (12, &"example")]);
    /// ```
    pub fn prefixes_of<'k>(&self, key: &'k [u8]) -> PrefixesOf<'_, 'k, V> {
        PrefixesOf {
            node: Some(&self.root),
            key,
            depth: 0,
        }
    }

    /// The longest stored key that is a prefix of `key` and strictly shorter
    /// than `limit` bytes.
    #[must_use]
    pub fn longest_prefix_below(&self, key: &[u8], limit: usize) -> Option<(usize, &V)> {
        self.prefixes_of(key)
            .take_while(|(len, _)| *len < limit)
            .last()
    }
}

/// Iterator returned by [`RadixTree::prefixes_of`].
#[derive(Debug)]
pub struct PrefixesOf<'t, 'k, V> {
    node: Option<&'t Node<V>>,
    key: &'k [u8],
    depth: usize,
}

impl<'t, V> Iterator for PrefixesOf<'t, '_, V> {
    type Item = (usize, &'t V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.node {
            let here = self.depth;
            let key = self.key;
            // Advance before yielding so the next call resumes below this node.
            self.node = key
                .get(here)
                .and_then(|b| node.children.get(b))
                .filter(|child| key[here..].starts_with(&child.edge));
            if let Some(child) = self.node {
                self.depth += child.edge.len();
            }
            if let Some(value) = node.value.as_ref() {
                return Some((here, value));
            }
        }
        None
    }
}

impl<V> Node<V> {
    fn new(edge: Vec<u8>, value: Option<V>) -> Self {
        Self {
            edge,
            value,
            children: HashMap::new(),
        }
    }

    fn insert(&mut self, key: &[u8], value: V) -> Option<V> {
        let Some(&first) = key.first() else {
            return self.value.replace(value);
        };

        let Some(child) = self.children.get_mut(&first) else {
            self.children
                .insert(first, Node::new(key.to_vec(), Some(value)));
            return None;
        };

        let common = common_prefix_len(key, &child.edge);
        if common == child.edge.len() {
            return child.insert(&key[common..], value);
        }

        // Split the child in place: it keeps the shared part of its edge and
        // its old contents move one level down.
        let tail = child.edge.split_off(common);
        let lower = Node {
            value: child.value.take(),
            children: std::mem::take(&mut child.children),
            edge: tail,
        };
        child.children.insert(lower.edge[0], lower);

        if common == key.len() {
            child.value = Some(value);
        } else {
            let rest = &key[common..];
            child
                .children
                .insert(rest[0], Node::new(rest.to_vec(), Some(value)));
        }
        None
    }
}

#[inline]
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut tree = RadixTree::new();
        tree.insert(b"hello", 1);
        tree.insert(b"world", 2);
        tree.insert(b"help", 3);

        assert_eq!(tree.get(b"hello"), Some(&1));
        assert_eq!(tree.get(b"world"), Some(&2));
        assert_eq!(tree.get(b"help"), Some(&3));
        assert_eq!(tree.get(b"hel"), None);
        assert_eq!(tree.get(b"helper"), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn split_keeps_existing_values() {
        let mut tree = RadixTree::new();
        tree.insert(b"testing", 1);
        tree.insert(b"test", 2);
        tree.insert(b"team", 3);

        assert_eq!(tree.get(b"testing"), Some(&1));
        assert_eq!(tree.get(b"test"), Some(&2));
        assert_eq!(tree.get(b"team"), Some(&3));
        assert_eq!(tree.get(b"te"), None);
    }

    #[test]
    fn overwrite_returns_previous() {
        let mut tree = RadixTree::new();
        assert_eq!(tree.insert(b"key", 1), None);
        assert_eq!(tree.insert(b"key", 2), Some(1));
        assert_eq!(tree.get(b"key"), Some(&2));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn prefixes_shortest_first() {
        let mut tree = RadixTree::new();
        tree.insert(b"/", "root");
        tree.insert(b"/api", "api");
        tree.insert(b"/api/v2", "v2");

        let hits: Vec<_> = tree.prefixes_of(b"/api/v2/users").collect();
        assert_eq!(hits, vec![(1, &"root"), (4, &"api"), (7, &"v2")]);

        let hits: Vec<_> = tree.prefixes_of(b"/api/v1").collect();
        assert_eq!(hits, vec![(1, &"root"), (4, &"api")]);

        assert_eq!(tree.prefixes_of(b"nope").count(), 0);
    }

    #[test]
    fn longest_prefix_below_limit() {
        let mut tree = RadixTree::new();
        tree.insert(b"moc.", "com");
        tree.insert(b"moc.elpmaxe.", "example");

        assert_eq!(
            tree.longest_prefix_below(b"moc.elpmaxe.www", 15),
            Some((12, &"example"))
        );
        // A key equal to the stored key is excluded by the limit.
        assert_eq!(
            tree.longest_prefix_below(b"moc.elpmaxe.", 12),
            Some((4, &"com"))
        );
        assert_eq!(tree.longest_prefix_below(b"gro.", 4), None);
    }

    #[test]
    fn hits_outlive_the_lookup_key() {
        let mut tree = RadixTree::new();
        tree.insert(b"moc.", "com");

        let hit = {
            let key: Vec<u8> = "www.example.com".bytes().rev().collect();
            tree.longest_prefix_below(&key, key.len())
        };
        assert_eq!(hit, Some((4, &"com")));

        let hits: Vec<&&str> = {
            let key = b"moc.x".to_vec();
            tree.prefixes_of(&key).map(|(_, v)| v).collect()
        };
        assert_eq!(hits, vec![&"com"]);
    }

    #[test]
    fn empty_key_is_root() {
        let mut tree = RadixTree::new();
        tree.insert(b"", "root");
        assert_eq!(tree.get(b""), Some(&"root"));
        assert_eq!(tree.prefixes_of(b"x").collect::<Vec<_>>(), vec![(0, &"root")]);
    }
}
