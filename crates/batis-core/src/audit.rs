//! # Auditing
//!
//! Optional capability for entities that record who changed them and when.
//!
//! ## Stamping Rules
//! ```text
//! save(entity)
//!     │
//!     ├── entity.as_auditable() == None ─► no stamps
//!     │
//!     ├── new      ─► set_created_date(now)
//!     │               set_created_by(auditor)        (only with AuditorAware)
//!     │
//!     └── existing ─► set_last_modified_date(now)
//!                     set_last_modified_by(auditor)  (only with AuditorAware)
//! ```

use chrono::{DateTime, Utc};

/// Identifier of the acting user.
pub type AuditorId = i64;

/// Receives creation and modification stamps.
pub trait Auditable {
    fn set_created_date(&mut self, at: DateTime<Utc>);

    fn set_created_by(&mut self, auditor: Option<AuditorId>);

    fn set_last_modified_date(&mut self, at: DateTime<Utc>);

    fn set_last_modified_by(&mut self, auditor: Option<AuditorId>);
}

/// Supplies the current auditor.
pub trait AuditorAware: Send + Sync {
    fn current_auditor(&self) -> Option<AuditorId>;
}

/// An auditor source that always reports the same user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAuditor(pub AuditorId);

impl AuditorAware for FixedAuditor {
    fn current_auditor(&self) -> Option<AuditorId> {
        Some(self.0)
    }
}
