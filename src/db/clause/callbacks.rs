use super::{ClauseStore, StoredClause};

/// The type of a callback made with a stored clause.
///
/// As stores are shared between threads by [sessions](crate::session), callbacks must be [Send] and [Sync].
pub type CallbackOnClause = dyn FnMut(&StoredClause) + Send + Sync;

impl ClauseStore {
    /// Set a callback to be made when a learned (or imported) clause is added to the store.
    pub fn set_callback_learned(&mut self, callback: Box<CallbackOnClause>) {
        self.callback_learned = Some(callback);
    }

    /// Make the callback set to be made when a learned clause is added to the store.
    pub(super) fn make_callback_learned(&mut self, stored: &StoredClause) {
        if let Some(callback) = &mut self.callback_learned {
            callback(stored);
        }
    }
}
