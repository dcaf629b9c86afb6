//! Attendance decisions: when a check-in counts, and which records a new
//! mark replaces.

use std::sync::Arc;

use chrono_tz::Tz;
use tracing::warn;

use crate::store::AttendanceStore;

pub mod check_in;
pub mod groups;
pub mod mark;
pub mod registration;
pub mod window;

pub use check_in::CheckInOutcome;
pub use groups::{SessionGroup, SessionGroups};
pub use mark::MarkOutcome;
pub use window::{AttendanceWindow, WindowSchedule};

/// Per-deployment tuning handed to the engine at construction.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub timezone: Tz,
    pub windows: WindowSchedule,
    pub groups: SessionGroups,
}

#[derive(Clone)]
pub struct AttendanceEngine {
    store: Arc<dyn AttendanceStore>,
    settings: EngineSettings,
}

impl AttendanceEngine {
    pub fn new(store: Arc<dyn AttendanceStore>, settings: EngineSettings) -> Self {
        for (session, groups) in settings.groups.overlaps() {
            warn!(
                session = %session,
                groups = ?groups,
                "Session listed in several groups, the first one decides overrides"
            );
        }

        Self { store, settings }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn AttendanceStore> {
        &self.store
    }
}
