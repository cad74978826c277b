/*
 * Expansion of a datasource node is explained by independent triggers that do
 * not coordinate with each other:
 *   1. the caller-supplied default (configuration, or the shell's remembered
 *      "user opened it" state),
 *   2. the pane-wide "force expand this datasource" preference,
 *   3. the datasource that owns the query currently open in the editor.
 * The node is expanded if any of them says so. The signals are re-gathered from
 * ambient state on every render pass and never stored by the node.
 */
use crate::core::{DatasourceId, LocationResolverOperations, QueryLookupOperations};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionSignals {
    pub explicit_default: bool,
    pub force_expand_id: Option<DatasourceId>,
    pub secondary_parent_id: Option<DatasourceId>,
}

impl ExpansionSignals {
    // Reads the cross-reference signal from the query open in the current location.
    pub fn gather(
        explicit_default: bool,
        force_expand_id: Option<&DatasourceId>,
        location: &dyn LocationResolverOperations,
        queries: &dyn QueryLookupOperations,
    ) -> Self {
        let secondary_parent_id = location
            .query_id()
            .and_then(|query_id| queries.parent_datasource_id(&query_id));
        ExpansionSignals {
            explicit_default,
            force_expand_id: force_expand_id.cloned(),
            secondary_parent_id,
        }
    }
}

pub fn resolve_expanded(signals: &ExpansionSignals, node_id: &DatasourceId) -> bool {
    signals.explicit_default
        || signals.force_expand_id.as_ref() == Some(node_id)
        || signals.secondary_parent_id.as_ref() == Some(node_id)
}

/*
 * Detects the "node was just opened" event. Only the previously observed value
 * is kept, and only to find false->true transitions; it is not a source of
 * expansion state.
 */
#[derive(Debug, Default)]
pub struct ExpansionEdge {
    last_expanded: bool,
}

impl ExpansionEdge {
    pub fn new() -> Self {
        ExpansionEdge::default()
    }

    // Returns true exactly when `expanded` rises from false to true.
    pub fn observe(&mut self, expanded: bool) -> bool {
        let rising = expanded && !self.last_expanded;
        self.last_expanded = expanded;
        rising
    }
}
