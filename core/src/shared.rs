//! Lock-free handle to the current route table.
//!
//! Readers take a snapshot with [`SharedRouteTable::current`] and route
//! against it for as long as they like; a reload builds a complete new table
//! first and swaps it in atomically. A failed build leaves the old table live.

use crate::config::RouteConfiguration;
use crate::{ConfigError, RouteTable};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Shared, swappable route table.
#[derive(Debug)]
pub struct SharedRouteTable {
    table: ArcSwap<RouteTable>,
}

impl SharedRouteTable {
    /// Wrap an already-built table.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Snapshot of the current table.
    #[must_use]
    pub fn current(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Swap in a new table, returning the previous one.
    pub fn replace(&self, table: RouteTable) -> Arc<RouteTable> {
        self.table.swap(Arc::new(table))
    }

    /// Build a table from `config` and swap it in.
    ///
    /// # Errors
    ///
    /// Returns the build error; the current table stays in place.
    pub fn reload(&self, config: &RouteConfiguration) -> Result<(), ConfigError> {
        let table = RouteTable::build(config).inspect_err(|err| {
            tracing::warn!(error = %err, "route table reload rejected");
        })?;
        self.replace(table);
        tracing::debug!("route table reloaded");
        Ok(())
    }
}
