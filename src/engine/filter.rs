use std::collections::HashSet;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::task::TaskStatus;

use super::normalize::TaskView;

/// A named calendar-relative filter, the dashboard's tab semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Today,
    Tomorrow,
    Week,
    Month,
    Completed,
}

/// Inclusive due-date bounds, each side optional. A bound that is set
/// excludes tasks without a due date.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Case-insensitive substring match against the title. An empty query
/// passes everything.
pub fn matches_text(view: &TaskView, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    view.task
        .title
        .to_lowercase()
        .contains(&query.to_lowercase())
}

pub fn in_due_range(view: &TaskView, range: &DateRange) -> bool {
    if let Some(start) = range.start {
        match view.task.due_date {
            Some(due) if due >= start => {}
            _ => return false,
        }
    }
    if let Some(end) = range.end {
        match view.task.due_date {
            Some(due) if due <= end => {}
            _ => return false,
        }
    }
    true
}

/// Non-empty intersection with the selected tag ids. An empty selection
/// filters nothing out.
pub fn has_selected_tag(view: &TaskView, selected: &[Uuid]) -> bool {
    if selected.is_empty() {
        return true;
    }
    view.tags.iter().any(|tag| selected.contains(&tag.id))
}

/// Narrows to a named window. Overdue-and-incomplete tasks pass every
/// non-completed window and are listed first, so overdue work stays visible
/// on whichever tab is selected. A task matched by both the overdue clause
/// and the in-window clause appears once; de-duplication is applied to all
/// windows, not just the wide ones.
pub fn apply_window(
    views: Vec<TaskView>,
    window: Window,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Vec<TaskView> {
    if window == Window::Completed {
        return views
            .into_iter()
            .filter(|v| v.task.status == TaskStatus::Completed)
            .collect();
    }

    let (start, end) = window_bounds(window, now, tz);
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut result: Vec<TaskView> = Vec::new();

    for view in &views {
        if view.is_overdue && seen.insert(view.task.id) {
            result.push(view.clone());
        }
    }
    for view in views {
        if seen.contains(&view.task.id) {
            continue;
        }
        // Completed tasks are placed by when they were finished, open tasks
        // by when they are due.
        let relevant = if view.task.status == TaskStatus::Completed {
            view.task.completed_at
        } else {
            view.task.due_date
        };
        let in_window = relevant
            .map(|ts| {
                let local = ts.with_timezone(&tz).date_naive();
                start <= local && local <= end
            })
            .unwrap_or(false);
        if in_window && seen.insert(view.task.id) {
            result.push(view);
        }
    }

    result
}

/// Local calendar bounds (inclusive dates) for a window, evaluated in the
/// viewer's offset. Weeks start on Sunday.
fn window_bounds(window: Window, now: DateTime<Utc>, tz: FixedOffset) -> (NaiveDate, NaiveDate) {
    let today = now.with_timezone(&tz).date_naive();
    match window {
        Window::Today => (today, today),
        Window::Tomorrow => {
            let tomorrow = today + Duration::days(1);
            (tomorrow, tomorrow)
        }
        Window::Week => {
            let start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
            (start, start + Duration::days(6))
        }
        Window::Month => {
            let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
            let next_month = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)
            };
            let end = next_month
                .map(|d| d - Duration::days(1))
                .unwrap_or(today);
            (start, end)
        }
        Window::Completed => (today, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tag::Tag;
    use crate::domain::task::{Task, TaskStatus};
    use crate::engine::classify::classify;
    use chrono::{Offset, TimeZone};
    use rstest::rstest;

    fn utc() -> FixedOffset {
        Utc.fix()
    }

    fn view(task: Task) -> TaskView {
        TaskView {
            task,
            subtasks: Vec::new(),
            tags: Vec::new(),
            is_overdue: false,
        }
    }

    fn titled(title: &str) -> TaskView {
        view(Task::new(Uuid::new_v4(), 1, title.to_string()))
    }

    #[rstest]
    #[case("groceries", "Buy Groceries", true)]
    #[case("GROCERIES", "buy groceries", true)]
    #[case("", "anything", true)]
    #[case("laundry", "Buy Groceries", false)]
    fn test_matches_text(#[case] query: &str, #[case] title: &str, #[case] expected: bool) {
        assert_eq!(matches_text(&titled(title), query), expected);
    }

    #[test]
    fn test_due_range_bounds_inclusive() {
        let now = Utc::now();
        let mut v = titled("t");
        v.task.due_date = Some(now);

        let exact = DateRange {
            start: Some(now),
            end: Some(now),
        };
        assert!(in_due_range(&v, &exact));

        let past = DateRange {
            start: None,
            end: Some(now - Duration::seconds(1)),
        };
        assert!(!in_due_range(&v, &past));

        // No bounds passes everything, including undated tasks.
        let undated = titled("u");
        assert!(in_due_range(&undated, &DateRange::default()));

        // A set bound excludes undated tasks.
        assert!(!in_due_range(&undated, &exact));
    }

    #[test]
    fn test_empty_tag_selection_passes_all() {
        let v = titled("t");
        assert!(has_selected_tag(&v, &[]));
    }

    #[test]
    fn test_tag_intersection() {
        let user = Uuid::new_v4();
        let home = Tag::new(user, "home".to_string(), None);
        let work = Tag::new(user, "work".to_string(), None);
        let mut v = titled("t");
        v.tags = vec![home.clone()];

        assert!(has_selected_tag(&v, &[home.id, work.id]));
        assert!(!has_selected_tag(&v, &[work.id]));
    }

    fn dated_task(task_id: i64, due_days: i64, status: TaskStatus, now: DateTime<Utc>) -> TaskView {
        let mut task = Task::new(Uuid::new_v4(), task_id, format!("task {task_id}"));
        task.due_date = Some(now + Duration::days(due_days));
        if status == TaskStatus::Completed {
            task.update_status(status);
        } else {
            task.status = status;
        }
        view(task)
    }

    #[rstest]
    #[case(Window::Today)]
    #[case(Window::Tomorrow)]
    #[case(Window::Week)]
    #[case(Window::Month)]
    fn test_overdue_included_in_every_window(#[case] window: Window) {
        // Noon UTC keeps day arithmetic away from midnight boundaries.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut views = vec![dated_task(1, -40, TaskStatus::Todo, now)];
        classify(&mut views, now);

        let result = apply_window(views, window, now, utc());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].task.task_id, 1);
    }

    #[test]
    fn test_today_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut views = vec![
            dated_task(1, 0, TaskStatus::Todo, now),
            dated_task(2, 1, TaskStatus::Todo, now),
            dated_task(3, -1, TaskStatus::Todo, now),
        ];
        classify(&mut views, now);

        let result = apply_window(views, Window::Today, now, utc());
        let ids: Vec<i64> = result.iter().map(|v| v.task.task_id).collect();
        // Overdue first, then due-today; tomorrow's task excluded.
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_tomorrow_window_excludes_today() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut views = vec![
            dated_task(1, 0, TaskStatus::Todo, now),
            dated_task(2, 1, TaskStatus::InProgress, now),
        ];
        classify(&mut views, now);

        let result = apply_window(views, Window::Tomorrow, now, utc());
        let ids: Vec<i64> = result.iter().map(|v| v.task.task_id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_week_window_sunday_start() {
        // 2025-06-18 is a Wednesday; the week runs Sun 15th .. Sat 21st.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut views = vec![
            dated_task(1, 3, TaskStatus::Todo, now),  // Sat 21st, in
            dated_task(2, 4, TaskStatus::Todo, now),  // Sun 22nd, out
        ];
        classify(&mut views, now);

        let result = apply_window(views, Window::Week, now, utc());
        let ids: Vec<i64> = result.iter().map(|v| v.task.task_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_month_window_deduplicates_overdue_in_month() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut views = vec![
            // Overdue earlier this month: matches both the overdue clause
            // and the in-window clause.
            dated_task(1, -10, TaskStatus::Todo, now),
            // Overdue from last month: overdue clause only.
            dated_task(2, -40, TaskStatus::Todo, now),
            // Due later this month.
            dated_task(3, 5, TaskStatus::Todo, now),
        ];
        classify(&mut views, now);

        let result = apply_window(views, Window::Month, now, utc());
        let ids: Vec<i64> = result.iter().map(|v| v.task.task_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_completed_window_ignores_dates() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();
        let mut views = vec![
            dated_task(1, -40, TaskStatus::Completed, now),
            dated_task(2, 0, TaskStatus::Todo, now),
        ];
        classify(&mut views, now);

        let result = apply_window(views, Window::Completed, now, utc());
        let ids: Vec<i64> = result.iter().map(|v| v.task.task_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_completed_task_placed_by_completion_date() {
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 12, 0, 0).unwrap();

        // Completed just now: completed_at falls in today's window.
        let mut finished_today = dated_task(1, -3, TaskStatus::Completed, now);
        finished_today.task.completed_at = Some(now - Duration::hours(1));

        // Completed yesterday: out of today's window.
        let mut finished_earlier = dated_task(2, -3, TaskStatus::Completed, now);
        finished_earlier.task.completed_at = Some(now - Duration::days(1));

        let mut views = vec![finished_today, finished_earlier];
        classify(&mut views, now);

        let result = apply_window(views, Window::Today, now, utc());
        let ids: Vec<i64> = result.iter().map(|v| v.task.task_id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_viewer_offset_shifts_day_boundary() {
        // 23:30 UTC on the 18th is already the 19th at UTC+5:30.
        let now = Utc.with_ymd_and_hms(2025, 6, 18, 23, 30, 0).unwrap();
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();

        let mut task = Task::new(Uuid::new_v4(), 1, "late".to_string());
        task.due_date = Some(Utc.with_ymd_and_hms(2025, 6, 19, 2, 0, 0).unwrap());
        let mut views = vec![view(task)];
        classify(&mut views, now);

        assert_eq!(apply_window(views.clone(), Window::Today, now, utc()).len(), 0);
        assert_eq!(apply_window(views, Window::Today, now, ist).len(), 1);
    }
}
