use tracing::warn;

use crate::db;
use crate::ipc::types::AppState;

/// Best-effort write-through after a successful in-memory mutation. A failed
/// save must not fail the user's action: the in-memory state stays
/// authoritative and the next mutation writes the full sequence again.
pub fn persist_roster(state: &AppState) {
    let Some(conn) = state.db.as_ref() else {
        return;
    };
    if let Err(e) = db::roster_save(conn, state.roster.snapshot()) {
        warn!(error = %e, "roster save failed; keeping in-memory state");
    }
}
