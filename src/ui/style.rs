use crate::domain::entities::worker::{BgcStatus, WorkerStatus};

pub fn root_container_style() -> &'static str {
    "height: 100vh; display: flex; flex-direction: column; overflow: hidden; padding: 12px; box-sizing: border-box; font-family: sans-serif; gap: 8px;"
}

pub fn table_container_style() -> &'static str {
    "flex: 1; min-height: 0; overflow: auto; border: 1px solid #ddd; border-radius: 6px;"
}

pub fn table_header_cell_style() -> &'static str {
    "position: sticky; top: 0; z-index: 2; background: #f4f5f7; border: 1px solid #bbb; padding: 6px; text-align: left; white-space: nowrap;"
}

pub fn table_cell_style() -> &'static str {
    "border: 1px solid #ddd; padding: 4px 6px; white-space: nowrap;"
}

pub fn button_style(active: bool) -> &'static str {
    if active {
        "padding: 4px 10px; border: 1px solid #4c6ef5; background: #eef4ff; border-radius: 6px; cursor: pointer;"
    } else {
        "padding: 4px 10px; border: 1px solid #bbb; background: #fff; border-radius: 6px; cursor: pointer;"
    }
}

pub fn status_badge_style(status: WorkerStatus) -> &'static str {
    match status {
        WorkerStatus::Active => "padding: 2px 8px; border-radius: 10px; background: #d3f9d8; color: #2b8a3e;",
        WorkerStatus::Pending => "padding: 2px 8px; border-radius: 10px; background: #fff3bf; color: #8f6b00;",
        WorkerStatus::Inactive => "padding: 2px 8px; border-radius: 10px; background: #e9ecef; color: #495057;",
        WorkerStatus::Terminated => "padding: 2px 8px; border-radius: 10px; background: #ffe3e3; color: #c92a2a;",
    }
}

pub fn bgc_text_color(status: BgcStatus) -> &'static str {
    match status {
        BgcStatus::NotSet => "#868e96",
        BgcStatus::Expired { .. } => "#c92a2a",
        BgcStatus::Expiring { .. } => "#e67700",
        BgcStatus::Valid { .. } => "#2b8a3e",
    }
}

pub fn banner_style() -> &'static str {
    "display: flex; align-items: center; gap: 8px; padding: 8px 12px; border: 1px solid #ffa8a8; background: #fff5f5; color: #c92a2a; border-radius: 6px;"
}

pub fn overlay_style() -> &'static str {
    "position: fixed; inset: 0; background: rgba(0,0,0,0.35); display: flex; align-items: center; justify-content: center; z-index: 1100;"
}

pub fn dialog_style() -> &'static str {
    "background: #fff; padding: 16px; border: 1px solid #999; border-radius: 8px; min-width: 420px; max-width: 80vw; max-height: 80vh; overflow: auto;"
}
