/*
 * Core data structures of the datasource explorer: identifiers for the resources
 * that appear in the entity tree, the datasource entity itself, the connector
 * (plugin) descriptor it references, the secondary query resource, and the
 * lazily fetched datasource structure payload.
 *
 * Identifiers are opaque strings wrapped in newtypes so that a query id can never
 * be compared against a datasource id by accident.
 */
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            // Not every id type reads its raw string outside tests.
            #[allow(dead_code)]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name(value.to_string())
            }
        }
    };
}

opaque_id!(
    /// Identity of a configured data connection.
    DatasourceId
);
opaque_id!(
    /// Identity of a query (action) that may run against a datasource.
    QueryId
);
opaque_id!(
    /// Identity of a connector plugin (e.g. the Postgres plugin).
    PluginId
);

/*
 * Describes the connector a datasource is configured with. The explorer only
 * needs enough of it to pick an icon label; the descriptor never changes while
 * a node controller exists.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: PluginId,
    pub name: String,
    #[serde(default)]
    pub package_name: String,
}

impl PluginDescriptor {
    // Short label shown in front of the node name by text hosts.
    pub fn icon_label(&self) -> String {
        let source = if self.package_name.is_empty() {
            &self.name
        } else {
            &self.package_name
        };
        let label: String = source
            .trim_end_matches("-plugin")
            .chars()
            .filter(|c| c.is_alphanumeric())
            .take(3)
            .collect();
        if label.is_empty() {
            "DS".to_string()
        } else {
            label.to_uppercase()
        }
    }
}

/*
 * The addressable resource a tree node represents. `id` is the identity,
 * `name` only changes when the external rename collaborator updates the store,
 * and `plugin_id` references the connector descriptor.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datasource {
    pub id: DatasourceId,
    pub name: String,
    pub plugin_id: PluginId,
}

#[cfg(test)]
impl Datasource {
    pub fn new(id: impl Into<String>, name: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        Datasource {
            id: DatasourceId(id.into()),
            name: name.into(),
            plugin_id: PluginId(plugin_id.into()),
        }
    }
}

/*
 * A query that is configured against a datasource. When a query is open in the
 * editor, its parent datasource is expanded in the explorer.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub id: QueryId,
    pub name: String,
    pub datasource_id: DatasourceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DatasourceKey {
    #[serde(rename = "primary key")]
    Primary { name: String, columns: Vec<String> },
    #[serde(rename = "foreign key")]
    Foreign {
        name: String,
        #[serde(rename = "fromColumns")]
        from_columns: Vec<String>,
        #[serde(rename = "toColumns")]
        to_columns: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTemplate {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<DatasourceColumn>,
    #[serde(default)]
    pub keys: Vec<DatasourceKey>,
    #[serde(default)]
    pub templates: Vec<QueryTemplate>,
}

// The substructure revealed when a datasource node is expanded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatasourceStructure {
    #[serde(default)]
    pub tables: Vec<DatasourceTable>,
}

/*
 * A one-way request to rename a datasource. It is handed to the rename
 * persistence collaborator, which owns validation, conflicts and the store update.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameIntent {
    pub id: DatasourceId,
    pub new_name: String,
}
