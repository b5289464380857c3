use chrono::{DateTime, Utc};

use super::normalize::TaskView;

/// Stamps `is_overdue` on every view against one shared reference instant,
/// so classification and the window filter cannot drift apart within a
/// single derivation pass.
pub fn classify(views: &mut [TaskView], now: DateTime<Utc>) {
    for view in views.iter_mut() {
        view.is_overdue = view.task.is_overdue_at(now);
    }
}
