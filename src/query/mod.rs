//! Read side used by every presentation command
//!
//! All reads go through `QueryLayer`, which runs the store's fixed
//! parameterized statements and memoizes their results.

mod cache;

pub use cache::{CachedRows, QueryCache, QueryKey};

use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

use crate::store::{
    ActivityFilter, ActivityRow, ActivityStore, DatabaseStats, StreamRow, StreamedActivityRow,
};

pub struct QueryLayer<'a> {
    store: &'a ActivityStore,
    cache: RefCell<QueryCache>,
}

impl<'a> QueryLayer<'a> {
    pub fn new(store: &'a ActivityStore) -> Self {
        Self {
            store,
            cache: RefCell::new(QueryCache::new()),
        }
    }

    pub fn store(&self) -> &ActivityStore {
        self.store
    }

    /// Activities newest first, distance in km
    pub fn list_activities(&self, filter: &ActivityFilter) -> Result<Rc<Vec<ActivityRow>>> {
        let key = QueryKey::ListActivities(filter.clone());
        if let Some(CachedRows::Activities(rows)) = self.cached(&key) {
            return Ok(rows);
        }
        let rows = Rc::new(self.store.list_activities(filter)?);
        self.remember(key, CachedRows::Activities(rows.clone()));
        Ok(rows)
    }

    pub fn activities_with_streams(&self) -> Result<Rc<Vec<StreamedActivityRow>>> {
        let key = QueryKey::ActivitiesWithStreams;
        if let Some(CachedRows::Streamed(rows)) = self.cached(&key) {
            return Ok(rows);
        }
        let rows = Rc::new(self.store.list_activities_with_streams()?);
        self.remember(key, CachedRows::Streamed(rows.clone()));
        Ok(rows)
    }

    /// Stream of one activity in timestamp order
    pub fn activity_stream(&self, activity_id: i64) -> Result<Rc<Vec<StreamRow>>> {
        let key = QueryKey::ActivityStream(activity_id);
        if let Some(CachedRows::Stream(rows)) = self.cached(&key) {
            return Ok(rows);
        }
        let rows = Rc::new(self.store.get_activity_stream(activity_id)?);
        self.remember(key, CachedRows::Stream(rows.clone()));
        Ok(rows)
    }

    /// Database statistics; not cached, the file size changes under us
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.store.stats()
    }

    pub fn invalidate(&self) {
        self.cache.borrow_mut().invalidate();
        tracing::debug!("Query cache invalidated");
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache.borrow().hits()
    }

    fn cached(&self, key: &QueryKey) -> Option<CachedRows> {
        self.cache.borrow_mut().get(key, self.store.version())
    }

    fn remember(&self, key: QueryKey, rows: CachedRows) {
        self.cache
            .borrow_mut()
            .insert(key, self.store.version(), rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Activity;
    use chrono::{TimeZone, Utc};

    fn activity(id: i64) -> Activity {
        let mut a = Activity::new(id, Utc.with_ymd_and_hms(2024, 1, id as u32, 9, 0, 0).unwrap());
        a.distance = Some(5000.0);
        a
    }

    #[test]
    fn test_repeated_query_hits_cache() {
        let store = ActivityStore::open_in_memory().unwrap();
        store.upsert_activity(&activity(1)).unwrap();
        let queries = QueryLayer::new(&store);

        let first = queries.list_activities(&ActivityFilter::default()).unwrap();
        let second = queries.list_activities(&ActivityFilter::default()).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(queries.cache_hits(), 1);
        assert_eq!(first[0].distance_km, Some(5.0));
    }

    #[test]
    fn test_write_makes_results_fresh() {
        let store = ActivityStore::open_in_memory().unwrap();
        store.upsert_activity(&activity(1)).unwrap();
        let queries = QueryLayer::new(&store);
        assert_eq!(queries.list_activities(&ActivityFilter::default()).unwrap().len(), 1);

        store.upsert_activity(&activity(2)).unwrap();
        assert_eq!(queries.list_activities(&ActivityFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn test_filters_are_cached_separately() {
        let store = ActivityStore::open_in_memory().unwrap();
        store.upsert_activity(&activity(1)).unwrap();
        store.upsert_activity(&activity(5)).unwrap();
        let queries = QueryLayer::new(&store);

        let recent = ActivityFilter {
            since: chrono::NaiveDate::from_ymd_opt(2024, 1, 3),
            ..ActivityFilter::default()
        };
        assert_eq!(queries.list_activities(&recent).unwrap().len(), 1);
        assert_eq!(queries.list_activities(&ActivityFilter::default()).unwrap().len(), 2);
        assert_eq!(queries.list_activities(&recent).unwrap().len(), 1);
        assert_eq!(queries.cache_hits(), 1);
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let store = ActivityStore::open_in_memory().unwrap();
        let queries = QueryLayer::new(&store);
        let first = queries.activity_stream(1).unwrap();
        queries.invalidate();
        let second = queries.activity_stream(1).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));
        assert!(second.is_empty());
    }
}
