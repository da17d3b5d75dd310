//! Progress View: planned versus completed hours of one agreement.

use serde::Serialize;

use super::ledger::{round2, total_hours};
use super::EntryStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressView {
    pub ita_master_id: i32,
    pub planned_hours: f64,
    pub completed_hours: f64,
    pub total_sessions: u64,
    pub completed_sessions: u64,
    /// `None` when no hours were planned.
    pub completion_percentage: Option<f64>,
}

impl ProgressView {
    /// Builds the view from `(hours_completed, status)` of every live entry.
    pub fn compute<I>(ita_master_id: i32, planned_hours: f64, entries: I) -> Self
    where
        I: IntoIterator<Item = (f64, EntryStatus)>,
    {
        let mut hours = Vec::new();
        let mut completed_sessions = 0;
        for (entry_hours, status) in entries {
            hours.push(entry_hours);
            if status == EntryStatus::Completed {
                completed_sessions += 1;
            }
        }
        let total_sessions = hours.len() as u64;
        let completed_hours = total_hours(hours);

        Self {
            ita_master_id,
            planned_hours,
            completed_hours,
            total_sessions,
            completed_sessions,
            completion_percentage: completion_percentage(completed_hours, planned_hours),
        }
    }
}

pub fn completion_percentage(completed_hours: f64, planned_hours: f64) -> Option<f64> {
    if planned_hours <= 0.0 || !planned_hours.is_finite() {
        return None;
    }
    Some(round2(completed_hours / planned_hours * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_for_three_sessions() {
        let view = ProgressView::compute(
            7,
            120.0,
            vec![
                (2.0, EntryStatus::Completed),
                (3.0, EntryStatus::SignedByStudent),
                (2.0, EntryStatus::Pending),
            ],
        );
        assert_eq!(view.completed_hours, 7.0);
        assert_eq!(view.total_sessions, 3);
        assert_eq!(view.completed_sessions, 1);
        assert_eq!(view.completion_percentage, Some(5.83));
    }

    #[test]
    fn test_zero_planned_hours_has_no_percentage() {
        let view = ProgressView::compute(1, 0.0, vec![(4.0, EntryStatus::Completed)]);
        assert_eq!(view.completion_percentage, None);
    }

    #[test]
    fn test_empty_agreement() {
        let view = ProgressView::compute(1, 40.0, Vec::new());
        assert_eq!(view.completed_hours, 0.0);
        assert_eq!(view.completion_percentage, Some(0.0));
    }
}
