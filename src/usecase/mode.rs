use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// Full row set held in memory; filter, sort and paging happen locally.
    Client,
    /// One page per backend query.
    Server,
}

pub fn choose_mode(total_row_estimate: usize, threshold: usize) -> TableMode {
    if total_row_estimate <= threshold {
        TableMode::Client
    } else {
        TableMode::Server
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModePolicy {
    pub threshold: usize,
    pub criteria_force_server: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSwitch {
    policy: ModePolicy,
    mode: Option<TableMode>,
}

impl ModeSwitch {
    pub fn new(policy: ModePolicy) -> Self {
        Self { policy, mode: None }
    }

    pub fn mode(&self) -> Option<TableMode> {
        self.mode
    }

    pub fn policy(&self) -> ModePolicy {
        self.policy
    }

    /// Returns `true` when the mode changed. Evaluating twice with the same
    /// inputs is a no-op.
    pub fn evaluate(&mut self, total_row_estimate: usize, criteria_active: bool) -> bool {
        let next = if criteria_active && self.policy.criteria_force_server {
            TableMode::Server
        } else {
            choose_mode(total_row_estimate, self.policy.threshold)
        };
        let changed = self.mode.is_some_and(|current| current != next);
        if changed {
            info!(
                from = ?self.mode,
                to = ?next,
                total_row_estimate,
                threshold = self.policy.threshold,
                "directory mode switch"
            );
        }
        self.mode = Some(next);
        changed
    }
}
