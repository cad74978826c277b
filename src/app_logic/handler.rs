use super::datasource_entity::{DatasourceEntityController, RenderContext};
use super::explorer_pane_state::ExplorerPaneState;
use super::rename_delegate::RenameDelegate;
use super::structure_loader::StructureLoader;
use super::ui_constants::DATASOURCE_ENTITY_STEP;
use crate::core::{
    DatasourceId, ExplorerRouteParams, QueryId, QueryRegistry, RenamePersistenceOperations,
    RouteLocationResolver, StructureCache, StructureFetchOperations, StructureFetchOutcome,
    Workspace,
    routes::{datasource_editor_url, query_editor_url},
};
use crate::platform_layer::{AppEvent, EntityDescriptor, PlatformCommand, PlatformEventHandler};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

// A node controller that is currently mounted, with what the host last received for it.
struct MountedEntity {
    controller: DatasourceEntityController,
    last_sent: Option<EntityDescriptor>,
}

/*
 * The explorer store and presenter. It owns the datasource list, the query
 * registry, the pane state and the shared structure cache, mounts one
 * `DatasourceEntityController` per visible datasource, and turns host events
 * into `PlatformCommand`s that the host drains from a queue.
 *
 * The structure cache lives here rather than in the node controllers, so a
 * node can be unmounted and mounted again without losing or refetching its
 * structure. Every event triggers a render pass over the mounted nodes; only
 * descriptors that changed are sent to the host.
 */
pub struct ExplorerLogic {
    workspace: Workspace,
    queries: QueryRegistry,
    pane: ExplorerPaneState,
    structure_cache: StructureCache,
    mounted: HashMap<DatasourceId, MountedEntity>,
    default_expanded: bool,
    structure_fetcher: Arc<dyn StructureFetchOperations>,
    rename_persistence: Arc<dyn RenamePersistenceOperations>,
    command_queue: VecDeque<PlatformCommand>,
}

impl ExplorerLogic {
    pub fn new(
        workspace: Workspace,
        initial_location: &str,
        default_expanded: bool,
        structure_fetcher: Arc<dyn StructureFetchOperations>,
        rename_persistence: Arc<dyn RenamePersistenceOperations>,
    ) -> Self {
        let queries = QueryRegistry::new(workspace.queries.iter().cloned());
        ExplorerLogic {
            workspace,
            queries,
            pane: ExplorerPaneState::new(initial_location),
            structure_cache: StructureCache::new(),
            mounted: HashMap::new(),
            default_expanded,
            structure_fetcher,
            rename_persistence,
            command_queue: VecDeque::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn structure_entry(
        &self,
        datasource_id: &DatasourceId,
    ) -> crate::core::StructureCacheEntry {
        self.structure_cache.entry(datasource_id)
    }

    pub(crate) fn is_mounted(&self, datasource_id: &DatasourceId) -> bool {
        self.mounted.contains_key(datasource_id)
    }

    #[cfg(test)]
    pub(crate) fn datasource_name(&self, datasource_id: &DatasourceId) -> Option<&str> {
        self.workspace
            .datasources
            .iter()
            .find(|d| &d.id == datasource_id)
            .map(|d| d.name.as_str())
    }

    fn mount(&mut self, datasource_id: &DatasourceId) {
        if self.mounted.contains_key(datasource_id) {
            log::trace!("ExplorerLogic: {datasource_id} is already mounted.");
            return;
        }
        let Some(datasource) = self
            .workspace
            .datasources
            .iter()
            .find(|d| &d.id == datasource_id)
        else {
            log::warn!("ExplorerLogic: Cannot mount unknown datasource {datasource_id}.");
            return;
        };
        let Some(plugin) = self.workspace.plugin(&datasource.plugin_id).cloned() else {
            log::warn!(
                "ExplorerLogic: Datasource {datasource_id} uses unknown plugin {}; not mounted.",
                datasource.plugin_id
            );
            return;
        };
        let controller = DatasourceEntityController::new(
            datasource_id.clone(),
            plugin,
            DATASOURCE_ENTITY_STEP,
            StructureLoader::new(Arc::clone(&self.structure_fetcher)),
            RenameDelegate::new(datasource_id.clone(), Arc::clone(&self.rename_persistence)),
        );
        self.mounted.insert(
            datasource_id.clone(),
            MountedEntity {
                controller,
                last_sent: None,
            },
        );
    }

    fn unmount(&mut self, datasource_id: &DatasourceId) {
        match self.mounted.remove(datasource_id) {
            Some(entity) => {
                log::debug!("ExplorerLogic: Unmounted {datasource_id}.");
                if entity.last_sent.is_some() {
                    self.command_queue.push_back(PlatformCommand::RemoveEntity {
                        datasource_id: datasource_id.clone(),
                    });
                }
            }
            None => log::trace!("ExplorerLogic: {datasource_id} was not mounted."),
        }
    }

    /*
     * Renders every mounted node that passes the search filter, in workspace
     * order. Nodes filtered out are skipped entirely, like nodes the host does
     * not display. Returns the descriptors paired with their previous version.
     */
    fn render_pass(&mut self) -> Vec<(EntityDescriptor, Option<EntityDescriptor>)> {
        let mut rendered = Vec::new();
        let mut hidden = Vec::new();
        for datasource in &self.workspace.datasources {
            let Some(entity) = self.mounted.get_mut(&datasource.id) else {
                continue;
            };
            if !self.pane.matches_search(&datasource.name) {
                if entity.last_sent.take().is_some() {
                    hidden.push(datasource.id.clone());
                }
                continue;
            }
            let descriptor = entity.controller.render(RenderContext {
                datasource,
                explicit_default: self.default_expanded || self.pane.is_user_opened(&datasource.id),
                force_expand_id: self.pane.expand_datasource_id.as_ref(),
                location: &self.pane.location,
                queries: &self.queries,
                search_keyword: self.pane.search_keyword(),
                cache: &mut self.structure_cache,
            });
            let previous = entity.last_sent.replace(descriptor.clone());
            rendered.push((descriptor, previous));
        }
        for datasource_id in hidden {
            self.command_queue
                .push_back(PlatformCommand::RemoveEntity { datasource_id });
        }
        rendered
    }

    // Render pass that only sends descriptors the host has not seen yet.
    fn render_changes(&mut self) {
        for (descriptor, previous) in self.render_pass() {
            if previous.as_ref() != Some(&descriptor) {
                self.command_queue
                    .push_back(PlatformCommand::RenderEntity { entity: descriptor });
            }
        }
    }

    // Render pass that replaces the host's whole list.
    fn populate(&mut self) {
        let entities: Vec<EntityDescriptor> = self
            .render_pass()
            .into_iter()
            .map(|(descriptor, _)| descriptor)
            .collect();
        self.command_queue
            .push_back(PlatformCommand::PopulateExplorer { entities });
    }

    // Application and page of the current location, else those of the workspace.
    fn route_params(&self) -> Option<ExplorerRouteParams> {
        ExplorerRouteParams::from_path(self.pane.location.location()).or_else(|| {
            (!self.workspace.application_id.is_empty() && !self.workspace.page_id.is_empty())
                .then(|| ExplorerRouteParams {
                    application_id: self.workspace.application_id.clone(),
                    page_id: self.workspace.page_id.clone(),
                })
        })
    }

    fn on_entity_clicked(&mut self, datasource_id: &DatasourceId) {
        match self.route_params() {
            Some(params) => {
                let path =
                    datasource_editor_url(&params.application_id, &params.page_id, datasource_id);
                log::info!("ExplorerLogic: Switching to datasource editor {path}");
                self.command_queue
                    .push_back(PlatformCommand::NavigateTo { path });
            }
            None => log::warn!(
                "ExplorerLogic: No application/page in location {:?}; cannot open {datasource_id}.",
                self.pane.location.location()
            ),
        }
    }

    fn on_query_opened(&mut self, query_id: &QueryId) {
        let Some(query) = self.queries.get(query_id) else {
            log::warn!("ExplorerLogic: Cannot open unknown query {query_id}.");
            return;
        };
        match self.route_params() {
            Some(params) => {
                let path = query_editor_url(&params.application_id, &params.page_id, query_id);
                log::info!(
                    "ExplorerLogic: Opening query {:?} of {} at {path}",
                    query.name,
                    query.datasource_id
                );
                self.command_queue
                    .push_back(PlatformCommand::NavigateTo { path });
            }
            None => log::warn!(
                "ExplorerLogic: No application/page in location {:?}; cannot open {query_id}.",
                self.pane.location.location()
            ),
        }
    }

    fn on_structure_fetch_settled(&mut self, outcome: StructureFetchOutcome) {
        let StructureFetchOutcome {
            datasource_id,
            ticket,
            result,
        } = outcome;
        if !self.structure_cache.settle(&datasource_id, ticket, result) {
            return;
        }
        if self.is_mounted(&datasource_id) {
            self.render_changes();
        } else {
            log::debug!(
                "ExplorerLogic: Structure for unmounted {datasource_id} cached without redraw."
            );
        }
    }
}

impl PlatformEventHandler for ExplorerLogic {
    fn handle_event(&mut self, event: AppEvent) {
        log::trace!("ExplorerLogic: Handling {event:?}");
        match event {
            AppEvent::ExplorerReady => {
                let ids: Vec<DatasourceId> = self
                    .workspace
                    .datasources
                    .iter()
                    .map(|d| d.id.clone())
                    .collect();
                for id in &ids {
                    self.mount(id);
                }
                log::info!("ExplorerLogic: Explorer ready with {} nodes.", self.mounted.len());
                self.populate();
            }
            AppEvent::LocationChanged { path } => {
                log::debug!("ExplorerLogic: Location is now {path:?}");
                self.pane.location = RouteLocationResolver::new(path);
                self.render_changes();
            }
            AppEvent::ForceExpandDatasource { datasource_id } => {
                self.pane.expand_datasource_id = datasource_id;
                self.render_changes();
            }
            AppEvent::EntityToggled {
                datasource_id,
                open,
            } => {
                self.pane.set_user_opened(&datasource_id, open);
                match self.mounted.get_mut(&datasource_id) {
                    Some(entity) => entity
                        .controller
                        .on_toggle_expand(open, &mut self.structure_cache),
                    None => log::warn!("ExplorerLogic: Toggle for unmounted {datasource_id}."),
                }
                self.render_changes();
            }
            AppEvent::EntityClicked { datasource_id } => {
                self.on_entity_clicked(&datasource_id);
            }
            AppEvent::QueryOpened { query_id } => self.on_query_opened(&query_id),
            AppEvent::RenameRequested {
                datasource_id,
                new_name,
            } => match self.mounted.get(&datasource_id) {
                Some(entity) => entity.controller.on_rename(&datasource_id, &new_name),
                None => log::warn!("ExplorerLogic: Rename for unmounted {datasource_id} ignored."),
            },
            AppEvent::DatasourceRenamed {
                datasource_id,
                new_name,
            } => {
                match self
                    .workspace
                    .datasources
                    .iter_mut()
                    .find(|d| d.id == datasource_id)
                {
                    Some(datasource) => {
                        log::info!(
                            "ExplorerLogic: {datasource_id} renamed from {:?} to {new_name:?}",
                            datasource.name
                        );
                        datasource.name = new_name;
                    }
                    None => log::warn!("ExplorerLogic: Rename of unknown {datasource_id}."),
                }
                self.render_changes();
            }
            AppEvent::StructureFetchSettled(outcome) => self.on_structure_fetch_settled(outcome),
            AppEvent::DatasourceStructureChanged { datasource_id } => {
                self.structure_cache.invalidate(&datasource_id);
                self.render_changes();
            }
            AppEvent::EntityMounted { datasource_id } => {
                self.mount(&datasource_id);
                self.render_changes();
            }
            AppEvent::EntityUnmounted { datasource_id } => {
                self.unmount(&datasource_id);
            }
            AppEvent::SearchKeywordChanged { keyword } => {
                self.pane.set_search_keyword(keyword);
                self.populate();
            }
            AppEvent::RefreshRequested => self.populate(),
            AppEvent::QuitRequested => {
                self.command_queue.push_back(PlatformCommand::QuitApplication);
            }
        }
    }

    fn on_quit(&mut self) {
        log::info!(
            "ExplorerLogic: Quitting with {} cached structures.",
            self.structure_cache.len()
        );
    }

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand> {
        self.command_queue.pop_front()
    }
}
