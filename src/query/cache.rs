//! Memoized query results keyed by (query, parameters, store version)

use std::collections::HashMap;
use std::rc::Rc;

use crate::store::{ActivityFilter, ActivityRow, StoreVersion, StreamRow, StreamedActivityRow};

/// A read query and its parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    ListActivities(ActivityFilter),
    ActivitiesWithStreams,
    ActivityStream(i64),
}

#[derive(Debug, Clone)]
pub enum CachedRows {
    Activities(Rc<Vec<ActivityRow>>),
    Streamed(Rc<Vec<StreamedActivityRow>>),
    Stream(Rc<Vec<StreamRow>>),
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<(QueryKey, StoreVersion), CachedRows>,
    hits: u64,
    misses: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, key: &QueryKey, version: StoreVersion) -> Option<CachedRows> {
        match self.entries.get(&(key.clone(), version)) {
            Some(rows) => {
                self.hits += 1;
                Some(rows.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: QueryKey, version: StoreVersion, rows: CachedRows) {
        // entries for older versions can never be hit again
        self.entries.retain(|(_, v), _| *v == version);
        self.entries.insert((key, version), rows);
    }

    /// Drop everything; called after each successful import
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
