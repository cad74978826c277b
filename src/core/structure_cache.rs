/*
 * The shared structure cache of the explorer store. Every datasource node
 * instance reads its substructure from here, keyed by datasource id, and the
 * cache outlives the node controllers (a node may be mounted and unmounted many
 * times while its entry persists).
 *
 * Per id the entry moves through:
 *   Absent --begin_fetch--> Pending --settle(Ok)--> Present
 *   Pending --settle(Err)--> Error
 *   Present/Error --invalidate--> Absent
 *
 * Invalidating a pending entry keeps it pending, so no second fetch can start
 * while one is in flight; the entry is marked stale and its settlement lands as
 * Absent instead of storing the outdated payload.
 *
 * `begin_fetch` is the absent->pending check-and-set. It runs on the explorer's
 * event loop, so sequential execution makes it atomic with respect to other nodes.
 */
use super::models::{DatasourceId, DatasourceStructure};
use super::structure_fetch::StructureFetchError;
use std::collections::HashMap;
use std::sync::Arc;

/*
 * Identifies one issued fetch. A settlement is only accepted when it carries the
 * ticket of the entry's current pending fetch.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

#[derive(Debug, Clone, PartialEq, Default)]
pub enum StructureCacheEntry {
    #[default]
    Absent,
    Pending,
    Present(Arc<DatasourceStructure>),
    Error(StructureFetchError),
}

#[cfg(test)]
impl StructureCacheEntry {
    pub fn is_absent(&self) -> bool {
        matches!(self, StructureCacheEntry::Absent)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, StructureCacheEntry::Pending)
    }
}

#[derive(Debug)]
enum CacheSlot {
    Pending { ticket: FetchTicket, stale: bool },
    Present(Arc<DatasourceStructure>),
    Error(StructureFetchError),
}

#[derive(Debug)]
pub struct StructureCache {
    slots: HashMap<DatasourceId, CacheSlot>,
    next_ticket: u64,
}

impl StructureCache {
    pub fn new() -> Self {
        StructureCache {
            slots: HashMap::new(),
            next_ticket: 1,
        }
    }

    // The entry as handed to the view. Ids never seen are `Absent`.
    pub fn entry(&self, id: &DatasourceId) -> StructureCacheEntry {
        match self.slots.get(id) {
            None => StructureCacheEntry::Absent,
            Some(CacheSlot::Pending { .. }) => StructureCacheEntry::Pending,
            Some(CacheSlot::Present(structure)) => StructureCacheEntry::Present(structure.clone()),
            Some(CacheSlot::Error(e)) => StructureCacheEntry::Error(e.clone()),
        }
    }

    /*
     * Transitions an absent entry to pending and returns the ticket the caller
     * must attach to its single fetch request. Returns `None` for pending,
     * present and error entries, in which case no fetch may be issued.
     */
    pub fn begin_fetch(&mut self, id: &DatasourceId) -> Option<FetchTicket> {
        if self.slots.contains_key(id) {
            return None;
        }
        let ticket = FetchTicket(self.next_ticket);
        self.next_ticket += 1;
        self.slots.insert(
            id.clone(),
            CacheSlot::Pending {
                ticket,
                stale: false,
            },
        );
        log::trace!("StructureCache: {id} -> Pending ({ticket:?})");
        Some(ticket)
    }

    /*
     * Records the outcome of a fetch. Returns true if the entry changed; a
     * settlement for an entry that is no longer pending under `ticket` is ignored.
     */
    pub fn settle(
        &mut self,
        id: &DatasourceId,
        ticket: FetchTicket,
        result: Result<DatasourceStructure, StructureFetchError>,
    ) -> bool {
        let invalidated = match self.slots.get(id) {
            Some(CacheSlot::Pending {
                ticket: current,
                stale,
            }) if *current == ticket => *stale,
            other => {
                log::debug!(
                    "StructureCache: Dropping settlement for {id} ({ticket:?}); slot is {other:?}"
                );
                return false;
            }
        };
        if invalidated {
            log::debug!("StructureCache: {id} settled after invalidation -> Absent");
            self.slots.remove(id);
            return true;
        }
        let slot = match result {
            Ok(structure) => {
                log::trace!(
                    "StructureCache: {id} -> Present ({} tables)",
                    structure.tables.len()
                );
                CacheSlot::Present(Arc::new(structure))
            }
            Err(e) => {
                log::trace!("StructureCache: {id} -> Error ({e})");
                CacheSlot::Error(e)
            }
        };
        self.slots.insert(id.clone(), slot);
        true
    }

    /*
     * External invalidation. Present and error entries become absent at once; a
     * pending entry stays pending until its fetch settles, then becomes absent.
     */
    pub fn invalidate(&mut self, id: &DatasourceId) -> bool {
        match self.slots.get_mut(id) {
            None => false,
            Some(CacheSlot::Pending { stale, .. }) => {
                log::debug!("StructureCache: Invalidated {id} while its fetch is in flight");
                *stale = true;
                true
            }
            Some(_) => {
                self.slots.remove(id);
                log::debug!("StructureCache: Invalidated entry for {id}");
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for StructureCache {
    fn default() -> Self {
        Self::new()
    }
}
