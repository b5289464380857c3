/// Card grid page size.
pub const CARDS_PER_PAGE: usize = 9;
/// List rows per page, normal density.
pub const ROWS_PER_PAGE: usize = 10;
/// List rows per page with the dense toggle on.
pub const ROWS_PER_PAGE_DENSE: usize = 15;

pub fn rows_per_page(dense: bool) -> usize {
    if dense { ROWS_PER_PAGE_DENSE } else { ROWS_PER_PAGE }
}

/// One page of a filtered, sorted list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
    pub total_count: usize,
}

/// Slices `[(page-1)*size, page*size)` out of `items` for a 1-based page
/// number. A page past the end (or page 0) yields an empty slice, never an
/// error; an empty input has zero pages, which the UI reads as "hide the
/// pagination control".
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page: usize) -> Page<T> {
    let total_count = items.len();
    if page_size == 0 {
        return Page {
            items: Vec::new(),
            total_pages: 0,
            total_count,
        };
    }
    let total_pages = total_count.div_ceil(page_size);
    if page == 0 {
        return Page {
            items: Vec::new(),
            total_pages,
            total_count,
        };
    }
    let start = (page - 1).saturating_mul(page_size);
    let end = start.saturating_add(page_size).min(total_count);
    let items = if start >= total_count {
        Vec::new()
    } else {
        items[start..end].to_vec()
    };
    Page {
        items,
        total_pages,
        total_count,
    }
}
