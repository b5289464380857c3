use std::cmp::Ordering;

use crate::domain::task::Priority;

use super::normalize::TaskView;

/// Rank used for ordering: high before medium before low, with an unknown
/// priority sorting after everything.
pub fn priority_rank(priority: Option<Priority>) -> u8 {
    match priority {
        Some(Priority::High) => 1,
        Some(Priority::Medium) => 2,
        Some(Priority::Low) => 3,
        None => 4,
    }
}

/// Orders tasks for display: overdue-and-incomplete first, then priority
/// rank ascending, then due date ascending with absent dates last. The sort
/// is stable, so full ties keep the store-returned order.
pub fn sort_views(views: &mut [TaskView]) {
    views.sort_by(compare);
}

fn compare(a: &TaskView, b: &TaskView) -> Ordering {
    b.is_overdue
        .cmp(&a.is_overdue)
        .then_with(|| priority_rank(a.task.priority).cmp(&priority_rank(b.task.priority)))
        .then_with(|| compare_due_dates(a, b))
}

fn compare_due_dates(a: &TaskView, b: &TaskView) -> Ordering {
    match (a.task.due_date, b.task.due_date) {
        (Some(da), Some(db)) => da.cmp(&db),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
