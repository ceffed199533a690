#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: usize,
    pub page_size: usize,
    pub total_rows: usize,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size,
            total_rows: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        page_count(self.total_rows, self.page_size)
    }

    pub fn set_total(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.page = clamp_page(self.page, self.page_count());
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = clamp_page(page, self.page_count());
    }

    /// Changing the page size keeps the first visible row on screen.
    pub fn set_page_size(&mut self, page_size: usize) {
        let first_row = (self.page.saturating_sub(1)) * self.page_size;
        self.page_size = page_size.max(1);
        self.page = clamp_page(first_row / self.page_size + 1, self.page_count());
    }

    pub fn start_index(&self) -> usize {
        start_index(self.total_rows, self.page, self.page_size)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}

pub fn page_count(total_rows: usize, page_size: usize) -> usize {
    total_rows.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

fn start_index(total_rows: usize, page: usize, page_size: usize) -> usize {
    if total_rows == 0 {
        0
    } else {
        (page.max(1) - 1) * page_size.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub visible_rows: Vec<T>,
    pub start_index: usize,
    pub end_index: usize,
    pub page: usize,
    pub page_count: usize,
    pub total_rows: usize,
}

impl<T> PageSlice<T> {
    /// "Showing 21–40 of 600", 1-based; `(0, 0, 0)` when nothing matches.
    pub fn display_bounds(&self) -> (usize, usize, usize) {
        if self.total_rows == 0 {
            (0, 0, 0)
        } else {
            (self.start_index + 1, self.end_index, self.total_rows)
        }
    }
}

/// Slices an in-memory row set. Out-of-range pages are clamped.
pub fn paginate<T: Clone>(rows: &[T], page: usize, page_size: usize) -> PageSlice<T> {
    let total_rows = rows.len();
    let page_size = page_size.max(1);
    let page_count = page_count(total_rows, page_size);
    let page = clamp_page(page, page_count);
    let start_index = start_index(total_rows, page, page_size);
    let end_index = (start_index + page_size).min(total_rows);

    PageSlice {
        visible_rows: rows[start_index..end_index].to_vec(),
        start_index,
        end_index,
        page,
        page_count,
        total_rows,
    }
}

/// Wraps a page that the backend already sliced, using the backend total
/// for the bounds.
pub fn server_page<T>(page_rows: Vec<T>, total_rows: usize, page: usize, page_size: usize) -> PageSlice<T> {
    let page_size = page_size.max(1);
    let page_count = page_count(total_rows, page_size);
    let page = clamp_page(page, page_count);
    let start_index = start_index(total_rows, page, page_size);
    let end_index = (start_index + page_rows.len()).min(total_rows);

    PageSlice {
        visible_rows: page_rows,
        start_index,
        end_index,
        page,
        page_count,
        total_rows,
    }
}
