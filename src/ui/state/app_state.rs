use dioxus::prelude::{use_signal, Signal};

use crate::config::DirectoryConfig;
use crate::domain::entities::worker::WorkerStatus;
use crate::usecase::directory::WorkerDirectory;
use crate::usecase::ports::repo::BulkProvisionReport;
use crate::usecase::services::import_service::{ImportPreview, ImportReport};

pub struct AppState {
    pub directory: Signal<WorkerDirectory>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
    pub search_input: Signal<String>,
    pub bulk_status: Signal<WorkerStatus>,
    pub country_options: Signal<Vec<String>>,
    pub active_preset: Signal<Option<String>>,
    pub import_preview: Signal<Option<ImportPreview>>,
    pub import_report: Signal<Option<ImportReport>>,
    pub provision_report: Signal<Option<BulkProvisionReport>>,
}

impl AppState {
    pub fn new(config: &DirectoryConfig) -> Self {
        let config = config.clone();
        Self {
            directory: use_signal(move || WorkerDirectory::new(&config)),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
            search_input: use_signal(String::new),
            bulk_status: use_signal(|| WorkerStatus::Active),
            country_options: use_signal(Vec::<String>::new),
            active_preset: use_signal(|| None::<String>),
            import_preview: use_signal(|| None::<ImportPreview>),
            import_report: use_signal(|| None::<ImportReport>),
            provision_report: use_signal(|| None::<BulkProvisionReport>),
        }
    }
}
