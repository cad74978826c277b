/*
 * This module consolidates the core, host-agnostic parts of the explorer: the
 * datasource/query/structure models, the shared structure cache, and the
 * collaborator abstractions the tree-node controller depends on
 * (`LocationResolverOperations`, `QueryLookupOperations`,
 * `StructureFetchOperations`, `RenamePersistenceOperations`,
 * `ConfigManagerOperations`) together with their concrete implementations.
 */
pub mod config;
pub mod models;
pub mod path_utils;
pub mod query_lookup;
pub mod rename;
pub mod routes;
pub mod structure_cache;
pub mod structure_fetch;
pub mod workspace;

pub use models::{Datasource, DatasourceId, PluginDescriptor, QueryId, RenameIntent};

pub use structure_cache::{StructureCache, StructureCacheEntry};

pub use structure_fetch::{
    JsonDirStructureSource, StructureFetchOperations, StructureFetchOutcome,
    ThreadedStructureFetcher,
};

pub use routes::{ExplorerRouteParams, LocationResolverOperations, RouteLocationResolver};

pub use query_lookup::{QueryLookupOperations, QueryRegistry};

pub use rename::{ChannelRenamePersistence, RenamePersistenceOperations};

pub use config::{ConfigManagerOperations, CoreConfigManager, ExplorerConfig};

pub use workspace::{Workspace, load_workspace};
