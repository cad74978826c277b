/*
 * Lazily loads a datasource's structure into the shared cache. `ensure_loaded`
 * is meant to be called on the "node was just opened" event only; combined with
 * the cache's absent->pending check-and-set this keeps at most one fetch per id
 * in flight or cached, no matter how often the node is toggled.
 *
 * Failed fetches are not retried here. An `Error` entry stays until something
 * outside the node invalidates it back to `Absent`.
 */
use crate::core::{DatasourceId, StructureCache, StructureFetchOperations};
use std::sync::Arc;

pub struct StructureLoader {
    fetcher: Arc<dyn StructureFetchOperations>,
}

impl StructureLoader {
    pub fn new(fetcher: Arc<dyn StructureFetchOperations>) -> Self {
        StructureLoader { fetcher }
    }

    // Returns true if a fetch request was issued.
    pub fn ensure_loaded(&self, cache: &mut StructureCache, datasource_id: &DatasourceId) -> bool {
        match cache.begin_fetch(datasource_id) {
            Some(ticket) => {
                log::debug!("StructureLoader: Fetching structure for {datasource_id} ({ticket:?})");
                self.fetcher.request_structure(datasource_id, ticket);
                true
            }
            None => {
                log::trace!(
                    "StructureLoader: {datasource_id} already {:?}, no fetch issued",
                    cache.entry(datasource_id)
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::StructureCacheEntry;
    use crate::core::models::DatasourceStructure;
    use crate::core::structure_cache::FetchTicket;
    use crate::core::structure_fetch::StructureFetchError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingFetcher {
        requests: Mutex<Vec<(DatasourceId, FetchTicket)>>,
    }

    impl RecordingFetcher {
        fn requests(&self) -> Vec<(DatasourceId, FetchTicket)> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl StructureFetchOperations for RecordingFetcher {
        fn request_structure(&self, datasource_id: &DatasourceId, ticket: FetchTicket) {
            self.requests
                .lock()
                .unwrap()
                .push((datasource_id.clone(), ticket));
        }
    }

    fn setup() -> (Arc<RecordingFetcher>, StructureLoader, StructureCache) {
        let fetcher = Arc::new(RecordingFetcher::default());
        let loader = StructureLoader::new(fetcher.clone());
        (fetcher, loader, StructureCache::new())
    }

    #[test]
    fn test_absent_entry_issues_one_fetch() {
        // Arrange
        let (fetcher, loader, mut cache) = setup();
        let id = DatasourceId::from("ds-42");

        // Act
        let first = loader.ensure_loaded(&mut cache, &id);
        let second = loader.ensure_loaded(&mut cache, &id);

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(fetcher.requests().len(), 1);
        assert_eq!(fetcher.requests()[0].0, id);
        assert!(cache.entry(&id).is_pending());
    }

    #[test]
    fn test_present_entry_issues_nothing() {
        let (fetcher, loader, mut cache) = setup();
        let id = DatasourceId::from("ds-42");
        loader.ensure_loaded(&mut cache, &id);
        let ticket = fetcher.requests()[0].1;
        cache.settle(&id, ticket, Ok(DatasourceStructure::default()));

        assert!(!loader.ensure_loaded(&mut cache, &id));
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn test_error_entry_is_terminal_until_invalidated() {
        let (fetcher, loader, mut cache) = setup();
        let id = DatasourceId::from("ds-42");
        loader.ensure_loaded(&mut cache, &id);
        let ticket = fetcher.requests()[0].1;
        cache.settle(
            &id,
            ticket,
            Err(StructureFetchError::Unavailable("boom".to_string())),
        );

        assert!(!loader.ensure_loaded(&mut cache, &id));
        assert!(matches!(cache.entry(&id), StructureCacheEntry::Error(_)));

        cache.invalidate(&id);
        assert!(loader.ensure_loaded(&mut cache, &id));
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn test_ids_are_loaded_independently() {
        let (fetcher, loader, mut cache) = setup();
        assert!(loader.ensure_loaded(&mut cache, &DatasourceId::from("ds-1")));
        assert!(loader.ensure_loaded(&mut cache, &DatasourceId::from("ds-2")));
        let tickets: Vec<FetchTicket> = fetcher.requests().iter().map(|(_, t)| *t).collect();
        assert_eq!(tickets.len(), 2);
        assert_ne!(tickets[0], tickets[1]);
    }
}
