/*
 * This module provides the explorer's presentation logic. `ExplorerLogic` (in
 * `handler`) is the store and presenter for the datasource pane; each mounted
 * datasource node is driven by a `DatasourceEntityController`, which composes
 * the active-selection resolver, the expansion resolver, the lazy structure
 * loader and the rename delegate. Unit tests for `ExplorerLogic` are in
 * `handler_tests.rs`.
 */
pub mod datasource_entity;
pub mod expansion;
pub mod explorer_pane_state;
pub mod handler;
pub mod rename_delegate;
pub mod selection;
pub mod structure_loader;
pub mod ui_constants;


pub use handler::ExplorerLogic;
