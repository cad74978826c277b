// Indentation step of datasource nodes (they sit directly under the pane root).
pub const DATASOURCE_ENTITY_STEP: usize = 1;

// Indentation step of the substructure rows below a datasource node.
pub const STRUCTURE_ROW_STEP: usize = DATASOURCE_ENTITY_STEP + 1;
