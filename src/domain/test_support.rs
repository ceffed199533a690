use chrono::NaiveDate;

use crate::domain::entities::worker::{EngagementModel, WorkerId, WorkerRow, WorkerStatus};

pub fn worker(id: &str, full_name: &str, status: WorkerStatus) -> WorkerRow {
    let email = format!("{}@example.com", full_name.to_lowercase().replace(' ', "."));
    WorkerRow {
        id: WorkerId::from(id),
        hr_id: format!("HR{:0>3}", id),
        full_name: full_name.to_string(),
        status,
        engagement_model: EngagementModel::Core,
        email: Some(email),
        email_pph: None,
        country: "US".to_string(),
        locale: "en-US".to_string(),
        role: None,
        hire_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        rtw_at: None,
        termination_date: None,
        bgc_expiration: None,
        access: None,
    }
}

/// `count` workers named "Worker 1".."Worker N"; the first `active` are
/// active, the rest pending.
pub fn synthetic_workers(count: usize, active: usize) -> Vec<WorkerRow> {
    (1..=count)
        .map(|idx| {
            let status = if idx <= active {
                WorkerStatus::Active
            } else {
                WorkerStatus::Pending
            };
            worker(&idx.to_string(), &format!("Worker {idx}"), status)
        })
        .collect()
}
