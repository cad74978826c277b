use crate::core::{DatasourceId, RenameIntent, RenamePersistenceOperations};
use std::sync::Arc;

/*
 * Forwards a node's rename intent to the persistence collaborator and returns
 * immediately. The node's displayed name is never touched here; it changes only
 * when the store reports the persisted rename.
 */
pub struct RenameDelegate {
    node_id: DatasourceId,
    persistence: Arc<dyn RenamePersistenceOperations>,
}

impl RenameDelegate {
    pub fn new(node_id: DatasourceId, persistence: Arc<dyn RenamePersistenceOperations>) -> Self {
        RenameDelegate {
            node_id,
            persistence,
        }
    }

    // `id` must be the node's own id; anything else is dropped.
    pub fn rename(&self, id: &DatasourceId, new_name: &str) {
        if *id != self.node_id {
            log::warn!(
                "RenameDelegate: Node {} asked to rename foreign datasource {id}; ignored.",
                self.node_id
            );
            return;
        }
        self.persistence.save_datasource_name(RenameIntent {
            id: id.clone(),
            new_name: new_name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPersistence {
        intents: Mutex<Vec<RenameIntent>>,
    }

    impl RenamePersistenceOperations for RecordingPersistence {
        fn save_datasource_name(&self, intent: RenameIntent) {
            self.intents.lock().unwrap().push(intent);
        }
    }

    #[test]
    fn test_rename_forwards_exact_pair() {
        // Arrange
        let persistence = Arc::new(RecordingPersistence::default());
        let delegate = RenameDelegate::new(DatasourceId::from("ds-42"), persistence.clone());

        // Act
        delegate.rename(&DatasourceId::from("ds-42"), "Prod DB");

        // Assert
        assert_eq!(
            *persistence.intents.lock().unwrap(),
            vec![RenameIntent {
                id: DatasourceId::from("ds-42"),
                new_name: "Prod DB".to_string(),
            }]
        );
    }

    #[test]
    fn test_rename_of_other_id_is_dropped() {
        let persistence = Arc::new(RecordingPersistence::default());
        let delegate = RenameDelegate::new(DatasourceId::from("ds-42"), persistence.clone());

        delegate.rename(&DatasourceId::from("ds-7"), "Other");

        assert!(persistence.intents.lock().unwrap().is_empty());
    }
}
