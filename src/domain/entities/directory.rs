use crate::domain::entities::worker::{WorkerField, WorkerRow};
use crate::domain::filter::DirectoryCriteria;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: WorkerField,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: usize,
    pub page_size: usize,
    pub criteria: DirectoryCriteria,
    pub sort: Option<SortState>,
}

impl PageQuery {
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.page_size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub rows: Vec<WorkerRow>,
    pub total_count: usize,
}
