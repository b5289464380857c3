//! The derivation pipeline: one pure, synchronous pass from a raw snapshot
//! to a paginated view. Card and list presentations both consume this;
//! neither re-implements any filtering or ordering of its own.

pub mod classify;
pub mod filter;
pub mod normalize;
pub mod paginate;
pub mod sort;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use filter::{DateRange, Window};
pub use normalize::{Snapshot, TaskView};
pub use paginate::{CARDS_PER_PAGE, ROWS_PER_PAGE, ROWS_PER_PAGE_DENSE, rows_per_page};

/// Everything one derivation depends on. `now` is explicit so a single pass
/// classifies and filters against the same instant, and so tests are
/// deterministic.
#[derive(Debug, Clone)]
pub struct ViewParams {
    pub now: DateTime<Utc>,
    /// Viewer's UTC offset, used only for calendar-window boundaries.
    pub tz: FixedOffset,
    pub sort_enabled: bool,
    pub text_query: Option<String>,
    pub date_range: DateRange,
    pub tag_filter: Vec<Uuid>,
    pub window: Option<Window>,
    pub page_size: usize,
    pub page: usize,
}

impl ViewParams {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            tz: Utc.fix(),
            sort_enabled: true,
            text_query: None,
            date_range: DateRange::default(),
            tag_filter: Vec::new(),
            window: None,
            page_size: CARDS_PER_PAGE,
            page: 1,
        }
    }
}

/// One page of derived task views plus the totals the pagination control
/// needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedView {
    pub page_items: Vec<TaskView>,
    pub total_pages: usize,
    pub total_count: usize,
}

impl DerivedView {
    /// The fail-closed result: what callers get when the snapshot fetch
    /// failed. Never a stale or partial view.
    pub fn empty() -> Self {
        Self {
            page_items: Vec::new(),
            total_pages: 0,
            total_count: 0,
        }
    }
}

/// Sole entry point of the engine. Runs
/// normalize → classify → sort → filter → window → paginate over the
/// snapshot. Pure: same snapshot and params, same output.
pub fn derive_view(snapshot: &Snapshot, params: &ViewParams) -> DerivedView {
    let mut views = normalize::normalize(snapshot);
    classify::classify(&mut views, params.now);

    if params.sort_enabled {
        sort::sort_views(&mut views);
    }

    if let Some(query) = &params.text_query {
        views.retain(|v| filter::matches_text(v, query));
    }
    views.retain(|v| filter::in_due_range(v, &params.date_range));
    views.retain(|v| filter::has_selected_tag(v, &params.tag_filter));

    if let Some(window) = params.window {
        views = filter::apply_window(views, window, params.now, params.tz);
    }

    let page = paginate::paginate(&views, params.page_size, params.page);
    DerivedView {
        page_items: page.items,
        total_pages: page.total_pages,
        total_count: page.total_count,
    }
}
