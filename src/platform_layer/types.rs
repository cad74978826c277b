/*
 * This module defines the types exchanged between the explorer logic and the
 * host view: the platform-agnostic events the host reports (`AppEvent`), the
 * commands the logic enqueues for the host (`PlatformCommand`), the per-node
 * `EntityDescriptor` that the host renders, and the `PlatformEventHandler` trait
 * the logic implements.
 *
 * The host owns icons, labels, active styling, the context menu and the
 * substructure view. It receives only derived values from the logic and calls
 * back through events.
 */
use crate::core::{DatasourceId, QueryId, StructureCacheEntry, StructureFetchOutcome};

/*
 * Everything the host needs to draw one datasource node. `active`, `expanded`
 * and `structure` are derived by the node controller on each render pass; the
 * rest is presentation data passed through.
 */
#[derive(Debug, Clone, PartialEq)]
pub struct EntityDescriptor {
    pub datasource_id: DatasourceId,
    pub name: String,
    pub icon_label: String,
    pub step: usize,
    pub search_keyword: Option<String>,
    pub active: bool,
    pub expanded: bool,
    pub structure: StructureCacheEntry,
}

// --- Events from the host (and background services) to the explorer logic ---

#[derive(Debug)]
pub enum AppEvent {
    // The host is ready to show the explorer; every datasource node is mounted.
    ExplorerReady,
    // The navigation location changed (route path, possibly with a query string).
    LocationChanged {
        path: String,
    },
    // Sets or clears the pane-wide "force expand this datasource" preference.
    ForceExpandDatasource {
        datasource_id: Option<DatasourceId>,
    },
    // The user opened or closed a node in the shell.
    EntityToggled {
        datasource_id: DatasourceId,
        open: bool,
    },
    // The user clicked a node's label (switch to its editor).
    EntityClicked {
        datasource_id: DatasourceId,
    },
    // The user asked to open a query in the editor.
    QueryOpened {
        query_id: QueryId,
    },
    // The user committed a new name in the shell's inline editor.
    RenameRequested {
        datasource_id: DatasourceId,
        new_name: String,
    },
    // The store accepted a rename persisted by the rename collaborator.
    DatasourceRenamed {
        datasource_id: DatasourceId,
        new_name: String,
    },
    // A structure fetch finished, successfully or not.
    StructureFetchSettled(StructureFetchOutcome),
    // External notification that a datasource's structure changed; its cache entry is stale.
    DatasourceStructureChanged {
        datasource_id: DatasourceId,
    },
    EntityMounted {
        datasource_id: DatasourceId,
    },
    EntityUnmounted {
        datasource_id: DatasourceId,
    },
    SearchKeywordChanged {
        keyword: Option<String>,
    },
    // The host wants the full list of visible nodes again.
    RefreshRequested,
    QuitRequested,
}

// --- Commands from the explorer logic to the host ---

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCommand {
    // Replaces the host's list of visible datasource nodes.
    PopulateExplorer {
        entities: Vec<EntityDescriptor>,
    },
    // One node's derived values changed since it was last sent.
    RenderEntity {
        entity: EntityDescriptor,
    },
    // A node left the visible list (unmounted or filtered out).
    RemoveEntity {
        datasource_id: DatasourceId,
    },
    NavigateTo {
        path: String,
    },
    QuitApplication,
}

/*
 * Implemented by the explorer logic. The host calls `handle_event` for each
 * event and then drains `try_dequeue_command` until it returns `None`.
 */
pub trait PlatformEventHandler: Send + Sync + 'static {
    fn handle_event(&mut self, event: AppEvent);

    // Called once when the host's loop ends.
    fn on_quit(&mut self) {}

    fn try_dequeue_command(&mut self) -> Option<PlatformCommand>;
}
