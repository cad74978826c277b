use crate::core::DatasourceId;

/*
 * A datasource node is active when the datasource editor currently open in the
 * navigation location is this node's datasource. A location without a
 * parseable datasource id makes no node active.
 */
pub fn resolve_active(location_datasource_id: Option<&DatasourceId>, node_id: &DatasourceId) -> bool {
    location_datasource_id == Some(node_id)
}
