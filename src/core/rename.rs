/*
 * Rename persistence collaborator. The explorer hands it a `RenameIntent` and
 * moves on: validation, conflict handling and the store update all happen on
 * the other side, and nothing flows back through this interface.
 */
use super::models::RenameIntent;
use std::sync::mpsc::Sender;

pub trait RenamePersistenceOperations: Send + Sync {
    fn save_datasource_name(&self, intent: RenameIntent);
}

/*
 * Forwards intents over a channel to whoever persists them. A closed channel
 * only produces a warning; the sender never learns the outcome either way.
 */
pub struct ChannelRenamePersistence {
    sender: Sender<RenameIntent>,
}

impl ChannelRenamePersistence {
    pub fn new(sender: Sender<RenameIntent>) -> Self {
        ChannelRenamePersistence { sender }
    }
}

impl RenamePersistenceOperations for ChannelRenamePersistence {
    fn save_datasource_name(&self, intent: RenameIntent) {
        log::debug!(
            "ChannelRenamePersistence: Forwarding rename of {} to {:?}",
            intent.id,
            intent.new_name
        );
        if let Err(e) = self.sender.send(intent) {
            log::warn!(
                "ChannelRenamePersistence: Rename of {} dropped, receiver is gone.",
                e.0.id
            );
        }
    }
}
