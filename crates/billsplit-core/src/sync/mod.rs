//! Session reference synchronization.
//!
//! Keeps an external shareable reference (conceptually a URL query
//! parameter holding a session id) and the active in-memory session id
//! consistent in both directions, without the two directions feeding back
//! into each other.

use serde::{Deserialize, Serialize};

/// A directive for updating the external reference.
///
/// Applying a `Set` must not force a navigation-history entry; that is the
/// presentation layer's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceUpdate {
    /// Point the external reference at this session id
    Set(String),
    /// Remove the reference entirely
    Clear,
}

/// Directional reconciliation protocol between the external reference and
/// the active session id.
///
/// The struct caches the previously observed active id. That cache is what
/// breaks the sync loop: when the application itself clears the active
/// session while the external reference still names the old id, the
/// reference-to-session direction is suppressed for exactly that one
/// cycle, so a reset does not immediately reload the session it just
/// cleared.
#[derive(Debug, Default)]
pub struct ReferenceSync {
    last_active_id: Option<String>,
}

impl ReferenceSync {
    /// Creates a sync protocol seeded with the current active id.
    pub fn new(active_id: Option<String>) -> Self {
        Self {
            last_active_id: active_id,
        }
    }

    /// Reference-to-session direction.
    ///
    /// Called when the external reference may have changed (navigation,
    /// deep link). Returns the session id the caller should look up and
    /// load, or `None` when nothing should happen. The caller silently
    /// ignores ids missing from the store (stale references).
    ///
    /// Always refreshes the last-known active id afterwards, ending the
    /// one-cycle suppression that follows a reset.
    pub fn observe_reference(
        &mut self,
        reference: Option<&str>,
        active_id: Option<&str>,
    ) -> Option<String> {
        let was_cleared = self.last_active_id.is_some() && active_id.is_none();
        self.last_active_id = active_id.map(str::to_string);

        match reference {
            Some(id) if Some(id) != active_id && !was_cleared => Some(id.to_string()),
            _ => None,
        }
    }

    /// Session-to-reference direction.
    ///
    /// Called when the active session id may have changed (new receipt,
    /// loaded session, reset). Returns the reference update to apply, or
    /// `None` when reference and session already agree.
    pub fn reconcile_reference(
        active_id: Option<&str>,
        reference: Option<&str>,
    ) -> Option<ReferenceUpdate> {
        match (active_id, reference) {
            (Some(active), current) if current != Some(active) => {
                Some(ReferenceUpdate::Set(active.to_string()))
            }
            (None, Some(_)) => Some(ReferenceUpdate::Clear),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_differs_triggers_load() {
        let mut sync = ReferenceSync::new(None);
        let load = sync.observe_reference(Some("abc"), None);
        assert_eq!(load.as_deref(), Some("abc"));
    }

    #[test]
    fn test_reference_matching_active_is_noop() {
        let mut sync = ReferenceSync::new(Some("abc".to_string()));
        assert_eq!(sync.observe_reference(Some("abc"), Some("abc")), None);
    }

    #[test]
    fn test_reset_suppresses_reload_for_one_cycle() {
        let mut sync = ReferenceSync::new(Some("abc".to_string()));

        // Active session was just cleared while the reference still names
        // the old session: must not reload it.
        assert_eq!(sync.observe_reference(Some("abc"), None), None);

        // Next cycle the suppression is over and the reference wins again.
        assert_eq!(
            sync.observe_reference(Some("abc"), None).as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_active_id_updates_reference() {
        let update = ReferenceSync::reconcile_reference(Some("abc"), None);
        assert_eq!(update, Some(ReferenceUpdate::Set("abc".to_string())));

        let update = ReferenceSync::reconcile_reference(Some("abc"), Some("old"));
        assert_eq!(update, Some(ReferenceUpdate::Set("abc".to_string())));
    }

    #[test]
    fn test_absent_active_id_clears_reference() {
        let update = ReferenceSync::reconcile_reference(None, Some("abc"));
        assert_eq!(update, Some(ReferenceUpdate::Clear));
    }

    #[test]
    fn test_agreement_needs_no_update() {
        assert_eq!(ReferenceSync::reconcile_reference(Some("abc"), Some("abc")), None);
        assert_eq!(ReferenceSync::reconcile_reference(None, None), None);
    }
}
