//! Historical immutability of the institutional record.
//!
//! A project dated before the current calendar year is permanent record:
//! deletes are refused outright, while updates are applied and audited.
//! The current year is always read at call time.

use chrono::Datelike;

use crate::entity::EntityKind;
use crate::error::CoreError;
use crate::types::EntityId;

/// Calendar year of the current local date.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Whether a record dated `year` is part of the protected history.
pub fn is_historical(year: i32, current_year: i32) -> bool {
    year < current_year
}

/// Refuse deletion of a historical record.
pub fn ensure_deletable(
    kind: EntityKind,
    id: EntityId,
    year: i32,
    current_year: i32,
) -> Result<(), CoreError> {
    if is_historical(year, current_year) {
        return Err(CoreError::ImmutableRecord {
            entity: kind.label(),
            id,
            year,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previous_year_is_historical() {
        assert!(is_historical(2024, 2025));
        assert!(!is_historical(2025, 2025));
        assert!(!is_historical(2026, 2025));
    }

    #[test]
    fn ensure_deletable_reports_year_and_kind() {
        let id = crate::types::new_id();
        let err = ensure_deletable(EntityKind::Project, id, 2020, 2025).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Project"));
        assert!(msg.contains("2020"));
    }

    #[test]
    fn current_year_follows_local_calendar() {
        let before = chrono::Local::now().year();
        let year = current_year();
        let after = chrono::Local::now().year();
        assert!(year == before || year == after);
        assert!(year >= 2024);
    }
}
