/*
 * UI state of the datasource pane that surrounds the tree nodes: the current
 * navigation location, the pane-wide "force expand" preference, the search
 * keyword, and the shell's memory of which nodes the user opened. Node
 * controllers read all of it and never write it; the explorer logic updates it
 * in response to events.
 */
use crate::core::{DatasourceId, RouteLocationResolver};
use std::collections::HashSet;

#[derive(Debug)]
pub struct ExplorerPaneState {
    /* The route currently shown by the editor. */
    pub location: RouteLocationResolver,
    /* Datasource that other parts of the application asked to reveal. */
    pub expand_datasource_id: Option<DatasourceId>,
    /* Lower-cased search text; `None` shows every node. */
    search_keyword: Option<String>,
    /* Nodes the user opened in the shell. Survives unmount/remount of a node. */
    user_opened: HashSet<DatasourceId>,
}

impl ExplorerPaneState {
    pub fn new(location: &str) -> Self {
        log::debug!("ExplorerPaneState::new at location {location:?}");
        ExplorerPaneState {
            location: RouteLocationResolver::new(location),
            expand_datasource_id: None,
            search_keyword: None,
            user_opened: HashSet::new(),
        }
    }

    pub fn search_keyword(&self) -> Option<&str> {
        self.search_keyword.as_deref()
    }

    // Blank keywords clear the search.
    pub fn set_search_keyword(&mut self, keyword: Option<String>) {
        self.search_keyword = keyword
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty());
    }

    pub fn matches_search(&self, name: &str) -> bool {
        match &self.search_keyword {
            Some(keyword) => name.to_lowercase().contains(keyword.as_str()),
            None => true,
        }
    }

    pub fn set_user_opened(&mut self, datasource_id: &DatasourceId, open: bool) {
        if open {
            self.user_opened.insert(datasource_id.clone());
        } else {
            self.user_opened.remove(datasource_id);
        }
    }

    pub fn is_user_opened(&self, datasource_id: &DatasourceId) -> bool {
        self.user_opened.contains(datasource_id)
    }
}
