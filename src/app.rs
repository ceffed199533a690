use std::sync::Arc;

use chrono::NaiveDate;
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::warn;

use crate::config::load_app_config;
use crate::domain::entities::directory::{SortDirection, SortState};
use crate::domain::entities::worker::{BgcStatus, WorkerField, WorkerId, WorkerRow, WorkerStatus};
use crate::domain::filter::default_presets;
use crate::infra::export::csv::{export_file_name, export_row_errors_to_path, export_workers_to_path};
use crate::infra::sqlite::repo::SqliteRepo;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::AppState;
use crate::ui::style::{
    banner_style, bgc_text_color, button_style, dialog_style, overlay_style,
    root_container_style, status_badge_style, table_cell_style, table_container_style,
    table_header_cell_style,
};
use crate::usecase::directory::{ApplyOutcome, DirectoryAction, WorkerDirectory};
use crate::usecase::mode::TableMode;
use crate::usecase::ports::repo::{BulkProvisionReport, WorkerRepository};
use crate::usecase::services::directory_service::DirectoryService;
use crate::usecase::services::edit_service::EditService;
use crate::usecase::services::import_service::{ImportPreview, ImportReport, ImportService};

fn outcome_message(outcome: ApplyOutcome, directory: &WorkerDirectory) -> String {
    match outcome {
        ApplyOutcome::Applied => {
            let mode = match directory.mode() {
                Some(TableMode::Server) => "server",
                _ => "client",
            };
            format!(
                "Loaded {} workers ({mode} mode)",
                directory.pagination().total_rows
            )
        }
        ApplyOutcome::Stale => "Ignored an outdated response".to_string(),
        ApplyOutcome::Failed => match directory.error() {
            Some(err) => format!("Failed to load workers: {err}"),
            None => "Failed to load workers".to_string(),
        },
    }
}

fn reload_country_options(
    service: &DirectoryService,
    directory: Signal<WorkerDirectory>,
    mut country_options: Signal<Vec<String>>,
) {
    let result = run_blocking("country options", || {
        service.filter_options(&directory.peek(), WorkerField::Country)
    });
    match result {
        Ok(options) => country_options.set(options),
        Err(err) => warn!(error = %err, "failed to load country options"),
    }
}

fn refresh_directory(
    service: &DirectoryService,
    mut directory: Signal<WorkerDirectory>,
    mut status: Signal<String>,
    country_options: Signal<Vec<String>>,
) {
    let outcome = run_blocking("directory refresh", || service.refresh(&mut directory.write()));
    *status.write() = outcome_message(outcome, &directory.peek());
    reload_country_options(service, directory, country_options);
}

fn run_directory_action(
    service: &DirectoryService,
    mut directory: Signal<WorkerDirectory>,
    mut status: Signal<String>,
    country_options: Signal<Vec<String>>,
    action: DirectoryAction,
) {
    let recount = action == DirectoryAction::Recount;
    match action {
        DirectoryAction::Local => {}
        action => {
            let outcome = run_blocking("directory fetch", || {
                service.dispatch(&mut directory.write(), action)
            });
            *status.write() = outcome_message(outcome, &directory.peek());
        }
    }
    if recount {
        reload_country_options(service, directory, country_options);
    }
}

fn export_rows(rows: &[WorkerRow], today: NaiveDate, mut status: Signal<String>) {
    if rows.is_empty() {
        *status.write() = "No workers to export".to_string();
        return;
    }
    let Some(path) = FileDialog::new()
        .add_filter("CSV", &["csv"])
        .set_file_name(export_file_name(today))
        .save_file()
    else {
        return;
    };
    *status.write() = match export_workers_to_path(&path, rows) {
        Ok(count) => format!("Exported {count} workers to {}", path.display()),
        Err(err) => format!("Export failed: {err:#}"),
    };
}

fn confirm_bulk_status(count: usize, status: WorkerStatus) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Warning)
        .set_title("Update worker status")
        .set_description(format!("Set {count} selected worker(s) to {status}?"))
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

fn sort_indicator(sort: Option<SortState>, field: WorkerField) -> &'static str {
    match sort {
        Some(state) if state.column == field => match state.direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        },
        _ => "",
    }
}

#[component]
fn WorkerTable(
    rows: Vec<WorkerRow>,
    selected: Vec<WorkerId>,
    all_selected: bool,
    sort: Option<SortState>,
    today: NaiveDate,
    bgc_warning_days: i64,
    on_sort: EventHandler<WorkerField>,
    on_toggle_row: EventHandler<WorkerId>,
    on_toggle_all: EventHandler<bool>,
) -> Element {
    let column_count = WorkerField::ALL.len() + 2;
    rsx! {
        div {
            style: table_container_style(),
            table {
                style: "border-collapse: collapse; width: 100%;",
                thead {
                    tr {
                        th {
                            style: table_header_cell_style(),
                            input {
                                r#type: "checkbox",
                                checked: all_selected,
                                disabled: rows.is_empty(),
                                onclick: move |_| on_toggle_all.call(!all_selected),
                            }
                        }
                        for field in WorkerField::ALL {
                            th {
                                style: "{table_header_cell_style()} cursor: pointer;",
                                onclick: move |_| on_sort.call(field),
                                "{field.label()}{sort_indicator(sort, field)}"
                            }
                        }
                        th { style: table_header_cell_style(), "Access" }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td {
                                style: table_cell_style(),
                                colspan: "{column_count}",
                                "No workers match the current filters"
                            }
                        }
                    }
                    {rows.iter().map(|row| {
                        let id = row.id.clone();
                        let checked = selected.contains(&row.id);
                        let bgc = BgcStatus::classify(row.bgc_expiration, today, bgc_warning_days);
                        let access = match &row.access {
                            Some(gate) if gate.allowed => "Allowed".to_string(),
                            Some(gate) => format!("Blocked: {}", gate.reasons.join(", ")),
                            None => String::new(),
                        };
                        rsx!(
                            tr {
                                key: "{row.id}",
                                td {
                                    style: table_cell_style(),
                                    input {
                                        r#type: "checkbox",
                                        checked: checked,
                                        onclick: move |_| on_toggle_row.call(id.clone()),
                                    }
                                }
                                for field in WorkerField::ALL {
                                    td {
                                        style: table_cell_style(),
                                        {match field {
                                            WorkerField::Status => rsx!(
                                                span { style: status_badge_style(row.status), "{row.status}" }
                                            ),
                                            WorkerField::BgcExpiration => rsx!(
                                                span {
                                                    style: "color: {bgc_text_color(bgc)};",
                                                    title: "{row.field_value(field)}",
                                                    "{bgc.text()}"
                                                }
                                            ),
                                            _ => rsx!("{row.field_value(field)}"),
                                        }}
                                    }
                                }
                                td { style: table_cell_style(), "{access}" }
                            }
                        )
                    })}
                }
            }
        }
    }
}

#[component]
fn PaginationBar(
    page: usize,
    page_count: usize,
    bounds: (usize, usize, usize),
    page_size: usize,
    page_sizes: Vec<usize>,
    has_previous: bool,
    has_next: bool,
    disabled: bool,
    on_page: EventHandler<usize>,
    on_previous: EventHandler<()>,
    on_next: EventHandler<()>,
    on_page_size: EventHandler<usize>,
) -> Element {
    let (start, end, total) = bounds;
    rsx! {
        div {
            style: "display: flex; gap: 8px; align-items: center;",
            button {
                style: button_style(false),
                disabled: disabled || !has_previous,
                onclick: move |_| on_page.call(1),
                "First"
            }
            button {
                style: button_style(false),
                disabled: disabled || !has_previous,
                onclick: move |_| on_previous.call(()),
                "Previous"
            }
            span { "Page {page} of {page_count}" }
            button {
                style: button_style(false),
                disabled: disabled || !has_next,
                onclick: move |_| on_next.call(()),
                "Next"
            }
            button {
                style: button_style(false),
                disabled: disabled || !has_next,
                onclick: move |_| on_page.call(page_count),
                "Last"
            }
            span { "Showing {start}-{end} of {total}" }
            label { "Rows per page" }
            select {
                disabled: disabled,
                value: "{page_size}",
                onchange: move |event| {
                    if let Ok(size) = event.value().parse::<usize>() {
                        on_page_size.call(size);
                    }
                },
                for size in page_sizes.iter().copied() {
                    option { value: "{size}", selected: size == page_size, "{size}" }
                }
            }
        }
    }
}

#[component]
fn ErrorBanner(message: String, on_dismiss: EventHandler<()>, on_retry: EventHandler<()>) -> Element {
    rsx! {
        div {
            style: banner_style(),
            span { style: "flex: 1;", "{message}" }
            button { style: button_style(false), onclick: move |_| on_retry.call(()), "Retry" }
            button { style: button_style(false), onclick: move |_| on_dismiss.call(()), "Dismiss" }
        }
    }
}

#[component]
fn ImportDialog(
    preview: ImportPreview,
    report: Option<ImportReport>,
    busy: bool,
    on_import: EventHandler<()>,
    on_download_errors: EventHandler<()>,
    on_close: EventHandler<()>,
) -> Element {
    let valid = preview.valid.len();
    let invalid_rows = preview.invalid_row_count();
    rsx! {
        div {
            style: overlay_style(),
            div {
                style: dialog_style(),
                h3 { "Import workers" }
                p { "{valid} valid row(s), {invalid_rows} row(s) with errors" }
                if !preview.errors.is_empty() {
                    table {
                        style: "border-collapse: collapse; width: 100%; margin-bottom: 8px;",
                        thead {
                            tr {
                                th { style: table_header_cell_style(), "Row" }
                                th { style: table_header_cell_style(), "Field" }
                                th { style: table_header_cell_style(), "Error" }
                                th { style: table_header_cell_style(), "Value" }
                            }
                        }
                        tbody {
                            for err in preview.errors.iter() {
                                tr {
                                    td { style: table_cell_style(), "{err.row}" }
                                    td { style: table_cell_style(), "{err.field}" }
                                    td { style: table_cell_style(), "{err.message}" }
                                    td { style: table_cell_style(), "{err.value.clone().unwrap_or_default()}" }
                                }
                            }
                        }
                    }
                }
                if let Some(report) = report.as_ref() {
                    p { "Imported {report.successful}, failed {report.failed}" }
                    for failure in report.errors.iter() {
                        p { style: "color: #c92a2a;", "Row {failure.row}: {failure.error}" }
                    }
                }
                div {
                    style: "display: flex; gap: 8px; justify-content: flex-end;",
                    if !preview.errors.is_empty() {
                        button {
                            style: button_style(false),
                            onclick: move |_| on_download_errors.call(()),
                            "Download error report"
                        }
                    }
                    if report.is_none() {
                        button {
                            style: button_style(true),
                            disabled: busy || !preview.can_import(),
                            onclick: move |_| on_import.call(()),
                            "Import {valid} worker(s)"
                        }
                    }
                    button { style: button_style(false), onclick: move |_| on_close.call(()), "Close" }
                }
            }
        }
    }
}

#[component]
fn ProvisionDialog(report: BulkProvisionReport, on_close: EventHandler<()>) -> Element {
    rsx! {
        div {
            style: overlay_style(),
            div {
                style: dialog_style(),
                h3 { "Bulk provisioning" }
                p { "{report.total} email(s): {report.summary()}" }
                table {
                    style: "border-collapse: collapse; width: 100%; margin-bottom: 8px;",
                    thead {
                        tr {
                            th { style: table_header_cell_style(), "Email" }
                            th { style: table_header_cell_style(), "Result" }
                            th { style: table_header_cell_style(), "Reason" }
                        }
                    }
                    tbody {
                        for result in report.results.iter() {
                            tr {
                                td { style: table_cell_style(), "{result.email}" }
                                td { style: table_cell_style(), "{result.status.as_str()}" }
                                td { style: table_cell_style(), "{result.reason.clone().unwrap_or_default()}" }
                            }
                        }
                    }
                }
                div {
                    style: "display: flex; justify-content: flex-end;",
                    button { style: button_style(false), onclick: move |_| on_close.call(()), "Close" }
                }
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    // Loaded once per mount; the result is stable across renders.
    let setup = use_hook(|| {
        load_app_config()
            .map(|(config, db_path)| (config, Arc::new(SqliteRepo::new(db_path))))
            .map_err(|err| format!("{err:#}"))
    });
    let (config, repo) = match setup {
        Ok(loaded) => loaded,
        Err(err) => {
            return rsx! {
                div {
                    p { "Failed to load configuration: {err}" }
                }
            };
        }
    };

    let AppState {
        mut directory,
        mut busy,
        mut status,
        mut search_input,
        mut bulk_status,
        country_options,
        mut active_preset,
        mut import_preview,
        mut import_report,
        mut provision_report,
    } = AppState::new(&config);

    let (directory_service, edit_service, import_service) = use_hook(|| {
        (
            DirectoryService::new(repo.clone()),
            Arc::new(EditService::new(repo.clone())),
            Arc::new(ImportService::new(repo.clone(), repo.clone())),
        )
    });

    let repo_for_init = repo.clone();
    let directory_service_for_init = directory_service.clone();
    use_effect(move || {
        *busy.write() = true;
        match run_blocking("schema init", || repo_for_init.init()) {
            Ok(()) => refresh_directory(
                &directory_service_for_init,
                directory,
                status,
                country_options,
            ),
            Err(err) => *status.write() = format!("Failed to initialise the database: {err}"),
        }
        *busy.write() = false;
    });

    let view = directory.read().view();
    let today = directory.read().today();
    let bgc_warning_days = directory.read().bgc_warning_days();
    let page_sizes = directory.read().page_sizes().to_vec();
    let selected = directory.read().selected_ids();
    let status_filter: Vec<(WorkerStatus, bool)> = {
        let dir = directory.read();
        let allowed = dir.criteria().filters.allowed(WorkerField::Status);
        let checked: Vec<(WorkerStatus, bool)> = WorkerStatus::ALL
            .into_iter()
            .map(|s| (s, allowed.is_some_and(|values| values.contains(s.as_str()))))
            .collect();
        checked
    };
    let breakdown = directory
        .read()
        .model()
        .status_breakdown()
        .into_iter()
        .map(|(worker_status, count)| format!("{worker_status}: {count}"))
        .collect::<Vec<_>>()
        .join(" | ");
    let country_filter = directory
        .read()
        .criteria()
        .filters
        .allowed(WorkerField::Country)
        .and_then(|values| values.iter().next().cloned())
        .unwrap_or_default();
    let presets = default_presets(bgc_warning_days);
    let countries = country_options();
    let mode_label = match view.mode {
        Some(TableMode::Client) => "Client mode (in memory)",
        Some(TableMode::Server) => "Server mode (paged)",
        None => "Loading",
    };
    let bounds = view.slice.display_bounds();
    let controls_disabled = busy() || view.loading;

    rsx! {
        div {
            style: root_container_style(),
            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap;",
                h2 { style: "margin: 0 12px 0 0;", "Workers" }
                input {
                    placeholder: "Search name, email or HR ID",
                    value: "{search_input()}",
                    oninput: {
                        let directory_service = directory_service.clone();
                        move |event: FormEvent| {
                            let value = event.value();
                            search_input.set(value.clone());
                            let action = directory.write().set_search(value);
                            run_directory_action(&directory_service, directory, status, country_options, action);
                        }
                    },
                }
                for (worker_status, checked) in status_filter.iter().copied() {
                    label {
                        style: "display: flex; align-items: center; gap: 4px;",
                        input {
                            r#type: "checkbox",
                            checked: checked,
                            disabled: controls_disabled,
                            onclick: {
                                let directory_service = directory_service.clone();
                                move |_| {
                                    let action = directory
                                        .write()
                                        .toggle_filter_value(WorkerField::Status, worker_status.as_str());
                                    active_preset.set(None);
                                    run_directory_action(&directory_service, directory, status, country_options, action);
                                }
                            },
                        }
                        span { style: status_badge_style(worker_status), "{worker_status}" }
                    }
                }
                select {
                    disabled: controls_disabled,
                    value: "{country_filter}",
                    onchange: {
                        let directory_service = directory_service.clone();
                        move |event: FormEvent| {
                            let value = event.value();
                            let values = if value.is_empty() { Vec::new() } else { vec![value] };
                            let action = directory.write().set_filter_values(WorkerField::Country, values);
                            run_directory_action(&directory_service, directory, status, country_options, action);
                        }
                    },
                    option { value: "", "All countries" }
                    for country in countries.iter() {
                        option { value: "{country}", selected: *country == country_filter, "{country}" }
                    }
                }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap;",
                span { "Presets:" }
                {presets.into_iter().map(|preset| {
                    let active = active_preset.read().as_deref() == Some(preset.name.as_str());
                    let name = preset.name.clone();
                    let directory_service = directory_service.clone();
                    rsx!(
                        button {
                            style: button_style(active),
                            disabled: controls_disabled,
                            onclick: move |_| {
                                let action = directory.write().apply_preset(&preset);
                                active_preset.set(Some(preset.name.clone()));
                                run_directory_action(&directory_service, directory, status, country_options, action);
                            },
                            "{name}"
                        }
                    )
                })}
                button {
                    style: button_style(false),
                    disabled: controls_disabled,
                    onclick: {
                        let directory_service = directory_service.clone();
                        move |_| {
                            let action = directory.write().clear_criteria();
                            search_input.set(String::new());
                            active_preset.set(None);
                            run_directory_action(&directory_service, directory, status, country_options, action);
                        }
                    },
                    "Clear filters"
                }
                button {
                    style: button_style(false),
                    disabled: controls_disabled,
                    onclick: {
                        let directory_service = directory_service.clone();
                        move |_| refresh_directory(&directory_service, directory, status, country_options)
                    },
                    "Refresh"
                }
                span { style: "margin-left: auto; color: #666;", "{mode_label}" }
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap;",
                span { "{view.selected_count} selected" }
                span { style: "color: #666;", "Loaded rows: {breakdown}" }
                select {
                    value: "{bulk_status()}",
                    onchange: move |event: FormEvent| {
                        if let Ok(next) = event.value().parse::<WorkerStatus>() {
                            bulk_status.set(next);
                        }
                    },
                    for option_status in WorkerStatus::ALL {
                        option {
                            value: "{option_status}",
                            selected: option_status == bulk_status(),
                            "{option_status}"
                        }
                    }
                }
                button {
                    style: button_style(false),
                    disabled: controls_disabled || view.selected_count == 0,
                    onclick: {
                        let edit_service = edit_service.clone();
                        let directory_service = directory_service.clone();
                        move |_| {
                            let target = bulk_status();
                            let count = directory.peek().selected_ids().len();
                            if !confirm_bulk_status(count, target) {
                                return;
                            }
                            *busy.write() = true;
                            let result = run_blocking("bulk status", || {
                                edit_service.bulk_update_status(&mut directory.write(), target)
                            });
                            match result {
                                Ok(updated) => {
                                    refresh_directory(&directory_service, directory, status, country_options);
                                    *status.write() = format!("Updated {updated} worker(s) to {target}");
                                }
                                Err(err) => *status.write() = format!("Bulk update failed: {err}"),
                            }
                            *busy.write() = false;
                        }
                    },
                    "Apply status"
                }
                button {
                    style: button_style(false),
                    disabled: controls_disabled,
                    onclick: {
                        let directory_service = directory_service.clone();
                        move |_| {
                            let rows = run_blocking("export rows", || {
                                directory_service.matching_rows(&directory.peek())
                            });
                            match rows {
                                Ok(rows) => export_rows(&rows, today, status),
                                Err(err) => *status.write() = format!("Export failed: {err}"),
                            }
                        }
                    },
                    "Export filtered"
                }
                button {
                    style: button_style(false),
                    disabled: view.selected_count == 0,
                    onclick: move |_| {
                        let rows = directory.peek().selected_rows();
                        export_rows(&rows, today, status);
                    },
                    "Export selected"
                }
                button {
                    style: button_style(false),
                    disabled: controls_disabled,
                    onclick: {
                        let import_service = import_service.clone();
                        move |_| {
                            let Some(path) = FileDialog::new().add_filter("CSV", &["csv"]).pick_file() else {
                                return;
                            };
                            *busy.write() = true;
                            match run_blocking("import preview", || import_service.preview_csv(&path)) {
                                Ok(preview) => {
                                    import_report.set(None);
                                    import_preview.set(Some(preview));
                                }
                                Err(err) => *status.write() = format!("Failed to read import file: {err:#}"),
                            }
                            *busy.write() = false;
                        }
                    },
                    "Import CSV"
                }
                button {
                    style: button_style(false),
                    disabled: controls_disabled,
                    onclick: {
                        let import_service = import_service.clone();
                        move |_| {
                            let Some(path) = FileDialog::new().add_filter("CSV", &["csv"]).pick_file() else {
                                return;
                            };
                            *busy.write() = true;
                            match run_blocking("bulk provisioning", || import_service.provision_csv(&path)) {
                                Ok(report) => {
                                    *status.write() = format!("Provisioning finished: {}", report.summary());
                                    provision_report.set(Some(report));
                                }
                                Err(err) => *status.write() = format!("Provisioning failed: {err:#}"),
                            }
                            *busy.write() = false;
                        }
                    },
                    "Provision users"
                }
            }

            if let Some(message) = view.error.clone() {
                ErrorBanner {
                    message,
                    on_dismiss: move |_| directory.write().dismiss_error(),
                    on_retry: {
                        let directory_service = directory_service.clone();
                        move |_| {
                            let outcome = run_blocking("directory retry", || {
                                directory_service.retry(&mut directory.write())
                            });
                            *status.write() = outcome_message(outcome, &directory.peek());
                        }
                    },
                }
            }

            WorkerTable {
                rows: view.slice.visible_rows.clone(),
                selected,
                all_selected: view.all_visible_selected,
                sort: view.sort,
                today,
                bgc_warning_days,
                on_sort: {
                    let directory_service = directory_service.clone();
                    move |field: WorkerField| {
                        let action = directory.write().toggle_sort(field);
                        run_directory_action(&directory_service, directory, status, country_options, action);
                    }
                },
                on_toggle_row: move |id: WorkerId| directory.write().toggle_row_selected(&id),
                on_toggle_all: move |checked: bool| directory.write().toggle_all_selected(checked),
            }

            PaginationBar {
                page: view.slice.page,
                page_count: view.slice.page_count,
                bounds,
                page_size: view.page_size,
                page_sizes,
                has_previous: view.has_previous,
                has_next: view.has_next,
                disabled: controls_disabled,
                on_page: {
                    let directory_service = directory_service.clone();
                    move |page: usize| {
                        let action = directory.write().set_page(page);
                        run_directory_action(&directory_service, directory, status, country_options, action);
                    }
                },
                on_previous: {
                    let directory_service = directory_service.clone();
                    move |_| {
                        let action = directory.write().previous_page();
                        run_directory_action(&directory_service, directory, status, country_options, action);
                    }
                },
                on_next: {
                    let directory_service = directory_service.clone();
                    move |_| {
                        let action = directory.write().next_page();
                        run_directory_action(&directory_service, directory, status, country_options, action);
                    }
                },
                on_page_size: {
                    let directory_service = directory_service.clone();
                    move |size: usize| {
                        let result = directory.write().set_page_size(size);
                        match result {
                            Ok(action) => run_directory_action(&directory_service, directory, status, country_options, action),
                            Err(err) => *status.write() = err.to_string(),
                        }
                    }
                },
            }

            div { style: "color: #666;", "{status()}" }

            if let Some(preview) = import_preview() {
                ImportDialog {
                    preview,
                    report: import_report(),
                    busy: busy(),
                    on_import: {
                        let import_service = import_service.clone();
                        let directory_service = directory_service.clone();
                        move |_| {
                            let Some(preview) = import_preview() else {
                                return;
                            };
                            *busy.write() = true;
                            match run_blocking("worker import", || import_service.import(&preview)) {
                                Ok(report) => {
                                    *status.write() = format!(
                                        "Imported {} worker(s), {} failed",
                                        report.successful, report.failed
                                    );
                                    import_report.set(Some(report));
                                    refresh_directory(&directory_service, directory, status, country_options);
                                }
                                Err(err) => *status.write() = format!("Import failed: {err:#}"),
                            }
                            *busy.write() = false;
                        }
                    },
                    on_download_errors: move |_| {
                        let Some(preview) = import_preview() else {
                            return;
                        };
                        let Some(path) = FileDialog::new()
                            .add_filter("CSV", &["csv"])
                            .set_file_name("import-errors.csv")
                            .save_file()
                        else {
                            return;
                        };
                        if let Err(err) = export_row_errors_to_path(&path, &preview.errors) {
                            *status.write() = format!("Failed to write error report: {err:#}");
                        }
                    },
                    on_close: move |_| {
                        import_preview.set(None);
                        import_report.set(None);
                    },
                }
            }

            if let Some(report) = provision_report() {
                ProvisionDialog {
                    report,
                    on_close: move |_| provision_report.set(None),
                }
            }
        }
    }
}
