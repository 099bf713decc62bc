//! Virtual-host selection by authority.
//!
//! Lookup precedence, strictly:
//!
//! 1. exact domain (hash map)
//! 2. suffix wildcard `*.example.com` / `*-bar.example.com`, longest suffix
//! 3. prefix wildcard `api.*`, longest prefix
//! 4. the `*` catch-all
//!
//! A wildcard needs at least one character of the host to stand in for `*`,
//! so `*.example.com` does not match `.example.com`.

use crate::RadixTree;
use std::collections::HashMap;

/// Index from domain patterns to virtual-host positions.
#[derive(Debug, Clone, Default)]
pub struct DomainIndex {
    exact: HashMap<String, usize>,
    suffixes: RadixTree<usize>,
    prefixes: RadixTree<usize>,
    default: Option<usize>,
}

impl DomainIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `domain` for virtual host `index`.
    ///
    /// The domain is lowercased. On a duplicate pattern the index is left
    /// unchanged and the position that already owns it is returned.
    pub fn insert(&mut self, domain: &str, index: usize) -> Result<(), usize> {
        let domain = domain.to_ascii_lowercase();

        if domain == "*" {
            return match self.default {
                Some(existing) => Err(existing),
                None => {
                    self.default = Some(index);
                    Ok(())
                }
            };
        }

        let (tree, key) = if let Some(suffix) = domain.strip_prefix('*') {
            (&mut self.suffixes, reversed(suffix))
        } else if let Some(prefix) = domain.strip_suffix('*') {
            (&mut self.prefixes, prefix.as_bytes().to_vec())
        } else {
            return match self.exact.get(&domain) {
                Some(&existing) => Err(existing),
                None => {
                    self.exact.insert(domain, index);
                    Ok(())
                }
            };
        };

        if let Some(&existing) = tree.get(&key) {
            return Err(existing);
        }
        tree.insert(&key, index);
        Ok(())
    }

    /// Find the virtual host for `authority` (case-insensitive).
    #[must_use]
    pub fn find(&self, authority: &str) -> Option<usize> {
        let host = authority.to_ascii_lowercase();

        if let Some(&index) = self.exact.get(&host) {
            return Some(index);
        }
        if let Some((_, &index)) = self
            .suffixes
            .longest_prefix_below(&reversed(&host), host.len())
        {
            return Some(index);
        }
        if let Some((_, &index)) = self
            .prefixes
            .longest_prefix_below(host.as_bytes(), host.len())
        {
            return Some(index);
        }
        self.default
    }
}

fn reversed(s: &str) -> Vec<u8> {
    s.bytes().rev().collect()
}
