/*
 * The workspace document the explorer is opened on: the application and page
 * being edited, the connector plugins, the datasources shown as tree nodes, and
 * the queries that reference them. It is a plain JSON file.
 */
use super::models::{Datasource, PluginDescriptor, PluginId, Query};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

#[derive(Debug)]
pub enum WorkspaceError {
    Io(io::Error),
    Serde(serde_json::Error),
    UnknownPlugin { datasource: String, plugin: PluginId },
    DuplicateDatasource(String),
}

impl From<io::Error> for WorkspaceError {
    fn from(err: io::Error) -> Self {
        WorkspaceError::Io(err)
    }
}

impl From<serde_json::Error> for WorkspaceError {
    fn from(err: serde_json::Error) -> Self {
        WorkspaceError::Serde(err)
    }
}

impl std::fmt::Display for WorkspaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkspaceError::Io(e) => write!(f, "Workspace I/O error: {e}"),
            WorkspaceError::Serde(e) => write!(f, "Workspace format error: {e}"),
            WorkspaceError::UnknownPlugin { datasource, plugin } => {
                write!(f, "Datasource {datasource} references unknown plugin {plugin}")
            }
            WorkspaceError::DuplicateDatasource(id) => {
                write!(f, "Datasource id {id} appears more than once")
            }
        }
    }
}

impl std::error::Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WorkspaceError::Io(e) => Some(e),
            WorkspaceError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkspaceError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Workspace {
    pub application_id: String,
    pub page_id: String,
    pub plugins: Vec<PluginDescriptor>,
    pub datasources: Vec<Datasource>,
    pub queries: Vec<Query>,
}

impl Workspace {
    pub fn plugin(&self, plugin_id: &PluginId) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|p| &p.id == plugin_id)
    }

    /*
     * Every datasource must reference a known plugin and ids must be unique,
     * since node controllers and the structure cache are keyed by id.
     */
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for datasource in &self.datasources {
            if !seen.insert(&datasource.id) {
                return Err(WorkspaceError::DuplicateDatasource(
                    datasource.id.to_string(),
                ));
            }
            if self.plugin(&datasource.plugin_id).is_none() {
                return Err(WorkspaceError::UnknownPlugin {
                    datasource: datasource.id.to_string(),
                    plugin: datasource.plugin_id.clone(),
                });
            }
        }
        Ok(())
    }
}

pub fn load_workspace(path: &Path) -> Result<Workspace> {
    log::debug!("Workspace: Loading {path:?}");
    let reader = BufReader::new(File::open(path)?);
    let workspace: Workspace = serde_json::from_reader(reader)?;
    workspace.validate()?;
    log::info!(
        "Workspace: Loaded {} datasources, {} queries, {} plugins from {path:?}",
        workspace.datasources.len(),
        workspace.queries.len(),
        workspace.plugins.len()
    );
    Ok(workspace)
}
