/*
 * The controller behind one datasource node of the explorer tree. It combines
 * the active-selection and expansion resolvers, the lazy structure loader and
 * the rename delegate, and hands the host view an `EntityDescriptor` with
 * `active`, `expanded` and the current structure cache entry.
 *
 * Everything the controller shows is re-derived on each render pass from the
 * ambient state passed in `RenderContext`. The only thing it keeps between
 * passes is the expansion edge detector, which decides when the structure
 * fetch is triggered.
 */
use super::expansion::{ExpansionEdge, ExpansionSignals, resolve_expanded};
use super::rename_delegate::RenameDelegate;
use super::selection::resolve_active;
use super::structure_loader::StructureLoader;
use crate::core::{
    Datasource, DatasourceId, LocationResolverOperations, PluginDescriptor, QueryLookupOperations,
    StructureCache,
};
use crate::platform_layer::EntityDescriptor;

// Ambient state for a single render pass.
pub struct RenderContext<'a> {
    pub datasource: &'a Datasource,
    pub explicit_default: bool,
    pub force_expand_id: Option<&'a DatasourceId>,
    pub location: &'a dyn LocationResolverOperations,
    pub queries: &'a dyn QueryLookupOperations,
    pub search_keyword: Option<&'a str>,
    pub cache: &'a mut StructureCache,
}

pub struct DatasourceEntityController {
    datasource_id: DatasourceId,
    plugin: PluginDescriptor,
    step: usize,
    expansion_edge: ExpansionEdge,
    loader: StructureLoader,
    rename_delegate: RenameDelegate,
}

impl DatasourceEntityController {
    pub fn new(
        datasource_id: DatasourceId,
        plugin: PluginDescriptor,
        step: usize,
        loader: StructureLoader,
        rename_delegate: RenameDelegate,
    ) -> Self {
        log::trace!("DatasourceEntityController: Mounting node for {datasource_id}");
        DatasourceEntityController {
            datasource_id,
            plugin,
            step,
            expansion_edge: ExpansionEdge::new(),
            loader,
            rename_delegate,
        }
    }

    /*
     * One render pass. Resolves `active` and `expanded`, triggers the structure
     * load if the node has just become expanded, and reads the cache entry that
     * the substructure view should display.
     */
    pub fn render(&mut self, ctx: RenderContext<'_>) -> EntityDescriptor {
        debug_assert_eq!(ctx.datasource.id, self.datasource_id);

        let active = resolve_active(ctx.location.datasource_id().as_ref(), &self.datasource_id);
        let signals = ExpansionSignals::gather(
            ctx.explicit_default,
            ctx.force_expand_id,
            ctx.location,
            ctx.queries,
        );
        let expanded = resolve_expanded(&signals, &self.datasource_id);

        if self.expansion_edge.observe(expanded) {
            log::debug!(
                "DatasourceEntityController: {} expanded by {signals:?}",
                self.datasource_id
            );
            self.loader.ensure_loaded(ctx.cache, &self.datasource_id);
        }

        EntityDescriptor {
            datasource_id: self.datasource_id.clone(),
            name: ctx.datasource.name.clone(),
            icon_label: self.plugin.icon_label(),
            step: self.step,
            search_keyword: ctx.search_keyword.map(str::to_string),
            active,
            expanded,
            structure: ctx.cache.entry(&self.datasource_id),
        }
    }

    /*
     * The shell's expand/collapse callback. Opening the node counts as a rising
     * edge of the resolved expansion, so the render that confirms it does not
     * load again. Closing is left to the next render: the node may still be
     * expanded by another signal, and the edge detector must only follow the
     * resolved value.
     */
    pub fn on_toggle_expand(&mut self, open: bool, cache: &mut StructureCache) {
        if open && self.expansion_edge.observe(true) {
            self.loader.ensure_loaded(cache, &self.datasource_id);
        }
    }

    pub fn on_rename(&self, id: &DatasourceId, new_name: &str) {
        self.rename_delegate.rename(id, new_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{DatasourceStructure, PluginId, Query};
    use crate::core::structure_cache::FetchTicket;
    use crate::core::{
        QueryId, QueryRegistry, RenameIntent, RenamePersistenceOperations, RouteLocationResolver,
        StructureCacheEntry, StructureFetchOperations,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingFetcher {
        requests: Mutex<Vec<(DatasourceId, FetchTicket)>>,
    }

    impl StructureFetchOperations for RecordingFetcher {
        fn request_structure(&self, datasource_id: &DatasourceId, ticket: FetchTicket) {
            self.requests
                .lock()
                .unwrap()
                .push((datasource_id.clone(), ticket));
        }
    }

    #[derive(Default)]
    struct RecordingPersistence {
        intents: Mutex<Vec<RenameIntent>>,
    }

    impl RenamePersistenceOperations for RecordingPersistence {
        fn save_datasource_name(&self, intent: RenameIntent) {
            self.intents.lock().unwrap().push(intent);
        }
    }

    struct Fixture {
        fetcher: Arc<RecordingFetcher>,
        persistence: Arc<RecordingPersistence>,
        datasource: Datasource,
        queries: QueryRegistry,
        cache: StructureCache,
        controller: DatasourceEntityController,
    }

    impl Fixture {
        fn new() -> Self {
            let fetcher = Arc::new(RecordingFetcher::default());
            let persistence = Arc::new(RecordingPersistence::default());
            let datasource = Datasource::new("ds-42", "Users DB", "pg");
            let plugin = PluginDescriptor {
                id: PluginId::from("pg"),
                name: "PostgreSQL".to_string(),
                package_name: "postgres-plugin".to_string(),
            };
            let controller = DatasourceEntityController::new(
                datasource.id.clone(),
                plugin,
                1,
                StructureLoader::new(fetcher.clone()),
                RenameDelegate::new(datasource.id.clone(), persistence.clone()),
            );
            let queries = QueryRegistry::new(vec![Query {
                id: QueryId::from("q-1"),
                name: "ListUsers".to_string(),
                datasource_id: DatasourceId::from("ds-42"),
            }]);
            Fixture {
                fetcher,
                persistence,
                datasource,
                queries,
                cache: StructureCache::new(),
                controller,
            }
        }

        fn render(
            &mut self,
            explicit_default: bool,
            force: Option<&str>,
            location: &str,
        ) -> EntityDescriptor {
            let force_id = force.map(DatasourceId::from);
            let resolver = RouteLocationResolver::new(location);
            self.controller.render(RenderContext {
                datasource: &self.datasource,
                explicit_default,
                force_expand_id: force_id.as_ref(),
                location: &resolver,
                queries: &self.queries,
                search_keyword: None,
                cache: &mut self.cache,
            })
        }

        fn fetch_count(&self) -> usize {
            self.fetcher.requests.lock().unwrap().len()
        }

        fn settle_last(&mut self) {
            let (id, ticket) = self.fetcher.requests.lock().unwrap().last().cloned().unwrap();
            self.cache
                .settle(&id, ticket, Ok(DatasourceStructure::default()));
        }
    }

    const NOWHERE: &str = "/applications/a/pages/p/edit";
    const ON_DS_42: &str = "/applications/a/pages/p/edit/datasource/ds-42";
    const ON_DS_7: &str = "/applications/a/pages/p/edit/datasource/ds-7";
    const ON_QUERY_1: &str = "/applications/a/pages/p/edit/queries/q-1";

    #[test]
    fn test_collapsed_render_does_not_fetch() {
        let mut fx = Fixture::new();
        let view = fx.render(false, None, NOWHERE);
        assert!(!view.expanded);
        assert!(!view.active);
        assert!(view.structure.is_absent());
        assert_eq!(fx.fetch_count(), 0);
    }

    #[test]
    fn test_active_follows_location() {
        let mut fx = Fixture::new();
        assert!(fx.render(false, None, ON_DS_42).active);
        assert!(!fx.render(false, None, ON_DS_7).active);
    }

    #[test]
    fn test_force_expand_triggers_single_fetch_across_renders() {
        // Arrange
        let mut fx = Fixture::new();

        // Act
        let first = fx.render(false, Some("ds-42"), NOWHERE);
        let second = fx.render(false, Some("ds-42"), NOWHERE);

        // Assert
        assert!(first.expanded);
        assert_eq!(first.structure, StructureCacheEntry::Pending);
        assert!(second.expanded);
        assert_eq!(fx.fetch_count(), 1);
    }

    #[test]
    fn test_open_query_expands_parent_datasource() {
        let mut fx = Fixture::new();
        let view = fx.render(false, None, ON_QUERY_1);
        assert!(view.expanded);
        assert!(!view.active);
        assert_eq!(fx.fetch_count(), 1);
    }

    #[test]
    fn test_rapid_toggle_before_settlement_fetches_once() {
        let mut fx = Fixture::new();
        fx.controller.on_toggle_expand(true, &mut fx.cache);
        fx.controller.on_toggle_expand(false, &mut fx.cache);
        fx.controller.on_toggle_expand(true, &mut fx.cache);
        assert_eq!(fx.fetch_count(), 1);
        assert!(fx.cache.entry(&fx.datasource.id).is_pending());
    }

    #[test]
    fn test_collapse_and_reexpand_with_present_entry_does_not_fetch() {
        let mut fx = Fixture::new();
        fx.render(true, None, NOWHERE);
        fx.settle_last();

        let collapsed = fx.render(false, None, NOWHERE);
        let reopened = fx.render(true, None, NOWHERE);

        assert!(!collapsed.expanded);
        assert!(matches!(collapsed.structure, StructureCacheEntry::Present(_)));
        assert!(reopened.expanded);
        assert_eq!(fx.fetch_count(), 1);
    }

    #[test]
    fn test_toggle_then_confirming_render_does_not_refetch_after_invalidation() {
        let mut fx = Fixture::new();
        fx.controller.on_toggle_expand(true, &mut fx.cache);
        fx.settle_last();
        fx.cache.invalidate(&fx.datasource.id);

        // The node is still open; no new transition, so no fetch.
        fx.render(true, None, NOWHERE);
        assert_eq!(fx.fetch_count(), 1);

        // Closing and opening again is a new transition.
        fx.render(false, None, NOWHERE);
        fx.render(true, None, NOWHERE);
        assert_eq!(fx.fetch_count(), 2);
    }

    #[test]
    fn test_rename_forwards_intent_and_keeps_name() {
        let mut fx = Fixture::new();
        fx.controller
            .on_rename(&DatasourceId::from("ds-42"), "Prod DB");

        let view = fx.render(false, None, NOWHERE);

        assert_eq!(
            *fx.persistence.intents.lock().unwrap(),
            vec![RenameIntent {
                id: DatasourceId::from("ds-42"),
                new_name: "Prod DB".to_string(),
            }]
        );
        assert_eq!(view.name, "Users DB");
    }

    #[test]
    fn test_descriptor_carries_presentation_fields() {
        let mut fx = Fixture::new();
        let view = fx.render(false, None, NOWHERE);
        assert_eq!(view.icon_label, "POS");
        assert_eq!(view.step, 1);
        assert_eq!(view.datasource_id, DatasourceId::from("ds-42"));
    }
}
