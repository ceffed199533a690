use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rusqlite::Connection;

use crate::config::DirectoryConfig;
use crate::domain::entities::directory::{PageQuery, PageResult, SortDirection, SortState};
use crate::domain::entities::worker::{
    EngagementModel, WorkerField, WorkerId, WorkerRow, WorkerStatus,
};
use crate::domain::filter::{AdvancedFilter, DirectoryCriteria, FilterOperator, FilterSet};
use crate::domain::table_model::sort_rows;
use crate::domain::test_support::synthetic_workers;
use crate::infra::sqlite::queries::{insert_workers, list_workers, query_page};
use crate::infra::sqlite::repo::SqliteRepo;
use crate::infra::sqlite::schema::init_db;
use crate::ui::style::{root_container_style, table_container_style, table_header_cell_style};
use crate::usecase::directory::{ApplyOutcome, DirectoryAction, WorkerDirectory};
use crate::usecase::mode::TableMode;
use crate::usecase::ports::repo::{
    ExistingIdentities, NewWorker, ProvisionStatus, RepoError, WorkerPatch, WorkerRepository,
};
use crate::usecase::services::directory_service::DirectoryService;
use crate::usecase::services::edit_service::{EditError, EditService};
use crate::usecase::services::import_service::ImportService;
use crate::usecase::validation::{validate_row, WorkerDraft};

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("workbench-{prefix}-{nanos}"))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

fn new_worker(idx: usize, status: WorkerStatus) -> NewWorker {
    let country = ["US", "CA", "MX"][idx % 3];
    NewWorker {
        hr_id: format!("HR{idx:04}"),
        full_name: format!("Worker {idx:03}"),
        engagement_model: EngagementModel::Core,
        email: format!("worker.{idx:03}@example.com"),
        email_pph: None,
        country: country.to_string(),
        locale: "en-US".to_string(),
        locale_all: vec!["en-US".to_string()],
        role: (idx % 4 == 0).then(|| "Reviewer".to_string()),
        hire_date: today() - Duration::days(idx as i64),
        status,
        rtw_at: (status != WorkerStatus::Pending)
            .then(|| Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).single())
            .flatten(),
        termination_date: None,
        bgc_expiration: (idx % 2 == 0).then(|| today() + Duration::days((idx % 5) as i64 * 10)),
    }
}

/// `count` workers; the first `active` are active, the rest pending.
fn seed_workers(count: usize, active: usize) -> Vec<NewWorker> {
    (1..=count)
        .map(|idx| {
            let status = if idx <= active {
                WorkerStatus::Active
            } else {
                WorkerStatus::Pending
            };
            new_worker(idx, status)
        })
        .collect()
}

struct Fixture {
    temp_dir: PathBuf,
    repo: Arc<SqliteRepo>,
}

impl Fixture {
    fn new(prefix: &str, workers: &[NewWorker]) -> Self {
        let temp_dir = unique_test_dir(prefix);
        fs::create_dir_all(&temp_dir).expect("should create temp dir");
        let db_path = temp_dir.join("workbench.sqlite");
        init_db(&db_path).expect("init_db should succeed");
        insert_workers(&db_path, workers).expect("seed workers should be inserted");
        let repo = Arc::new(SqliteRepo {
            db_path,
            today: Some(today()),
        });
        Self { temp_dir, repo }
    }

    fn directory(&self) -> WorkerDirectory {
        WorkerDirectory::new(&DirectoryConfig::default()).with_today(today())
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.temp_dir);
    }
}

fn hr_ids(rows: &[WorkerRow]) -> Vec<String> {
    rows.iter().map(|row| row.hr_id.clone()).collect()
}

#[test]
fn init_db_creates_required_tables() {
    let fixture = Fixture::new("init-db", &[]);
    let conn = Connection::open(&fixture.repo.db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('workers','app_users')",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");
    assert_eq!(table_count, 2, "required tables should exist");
}

#[test]
fn six_hundred_workers_are_paged_by_the_backend() {
    let fixture = Fixture::new("server-mode", &seed_workers(600, 150));
    let service = DirectoryService::new(fixture.repo.clone());
    let mut directory = fixture.directory();

    assert_eq!(service.refresh(&mut directory), ApplyOutcome::Applied);
    assert_eq!(directory.mode(), Some(TableMode::Server));
    assert_eq!(directory.model().rows().len(), 20, "only one page is held in memory");

    let action = directory.set_page(2);
    assert!(matches!(action, DirectoryAction::Fetch(_)));
    assert_eq!(service.dispatch(&mut directory, action), ApplyOutcome::Applied);

    let view = directory.view();
    assert_eq!(view.slice.page, 2);
    assert_eq!(view.slice.page_count, 30);
    assert_eq!(view.slice.display_bounds(), (21, 40, 600));
    let expected: Vec<String> = (21..=40).map(|idx| format!("HR{idx:04}")).collect();
    assert_eq!(hr_ids(&view.slice.visible_rows), expected);
}

#[test]
fn fifty_workers_filter_in_memory() {
    let fixture = Fixture::new("client-mode", &seed_workers(50, 12));
    let service = DirectoryService::new(fixture.repo.clone());
    let mut directory = fixture.directory();

    assert_eq!(service.refresh(&mut directory), ApplyOutcome::Applied);
    assert_eq!(directory.mode(), Some(TableMode::Client));
    assert_eq!(directory.model().rows().len(), 50);

    let action = directory.toggle_filter_value(WorkerField::Status, "active");
    assert_eq!(action, DirectoryAction::Local);
    let action = directory.set_page_size(10).expect("10 is an allowed page size");
    assert_eq!(action, DirectoryAction::Local);

    let view = directory.view();
    assert_eq!(directory.filtered_rows().len(), 12);
    assert_eq!(view.slice.page_count, 2);
    assert_eq!(view.slice.visible_rows.len(), 10);
    assert!(view
        .slice
        .visible_rows
        .iter()
        .all(|row| row.status == WorkerStatus::Active));
}

#[test]
fn server_query_matches_in_memory_filtering_and_sorting() {
    let workers: Vec<NewWorker> = (1..=40)
        .map(|idx| {
            let status = WorkerStatus::ALL[idx % WorkerStatus::ALL.len()];
            let mut worker = new_worker(idx, status);
            if status == WorkerStatus::Terminated {
                worker.termination_date = Some(today() - Duration::days(3));
            }
            // Non-ASCII names whose order depends on Unicode case folding.
            match idx {
                7 => worker.full_name = "Émile Zola".to_string(),
                8 => worker.full_name = "élodie Marsh".to_string(),
                _ => {}
            }
            worker
        })
        .collect();
    let fixture = Fixture::new("parity", &workers);
    let all_rows = list_workers(&fixture.repo.db_path).expect("rows should load");

    let criteria_cases = vec![
        DirectoryCriteria::default(),
        DirectoryCriteria {
            search: "worker 01".to_string(),
            ..DirectoryCriteria::default()
        },
        DirectoryCriteria {
            search: "émile".to_string(),
            ..DirectoryCriteria::default()
        },
        DirectoryCriteria {
            search: "ÉLODIE".to_string(),
            ..DirectoryCriteria::default()
        },
        DirectoryCriteria {
            filters: FilterSet::new()
                .with_values(WorkerField::Status, ["active", "pending"])
                .with_values(WorkerField::Country, ["CA"]),
            ..DirectoryCriteria::default()
        },
        DirectoryCriteria {
            advanced: vec![
                AdvancedFilter::new(WorkerField::BgcExpiration, FilterOperator::WithinNextDays(30)),
                AdvancedFilter::new(WorkerField::Role, FilterOperator::IsEmpty),
            ],
            ..DirectoryCriteria::default()
        },
        DirectoryCriteria {
            advanced: vec![AdvancedFilter::new(
                WorkerField::Status,
                FilterOperator::NotIn(BTreeSet::from(["terminated".to_string()])),
            )],
            ..DirectoryCriteria::default()
        },
    ];
    let sort_cases = [
        None,
        Some(SortState {
            column: WorkerField::BgcExpiration,
            direction: SortDirection::Asc,
        }),
        Some(SortState {
            column: WorkerField::BgcExpiration,
            direction: SortDirection::Desc,
        }),
        Some(SortState {
            column: WorkerField::FullName,
            direction: SortDirection::Asc,
        }),
        Some(SortState {
            column: WorkerField::FullName,
            direction: SortDirection::Desc,
        }),
    ];

    for criteria in &criteria_cases {
        for sort in sort_cases {
            let expected: Vec<String> = sort_rows(criteria.apply(&all_rows, today()), sort)
                .into_iter()
                .map(|row| row.hr_id.clone())
                .collect();
            let query = PageQuery {
                page: 1,
                page_size: 100,
                criteria: criteria.clone(),
                sort,
            };
            let (rows, total) =
                query_page(&fixture.repo.db_path, &query, today()).expect("query should succeed");
            assert_eq!(total, expected.len(), "count for {criteria:?}");
            assert_eq!(hr_ids(&rows), expected, "rows for {criteria:?} sorted by {sort:?}");
        }
    }

    let accented = PageQuery {
        page: 1,
        page_size: 100,
        criteria: DirectoryCriteria {
            search: "émile".to_string(),
            ..DirectoryCriteria::default()
        },
        sort: None,
    };
    let (rows, total) =
        query_page(&fixture.repo.db_path, &accented, today()).expect("query should succeed");
    assert_eq!((hr_ids(&rows), total), (vec!["HR0007".to_string()], 1));

    let by_name = PageQuery {
        page: 1,
        page_size: 100,
        criteria: DirectoryCriteria::default(),
        sort: Some(SortState {
            column: WorkerField::FullName,
            direction: SortDirection::Asc,
        }),
    };
    let (rows, _) =
        query_page(&fixture.repo.db_path, &by_name, today()).expect("query should succeed");
    let tail: Vec<&str> = rows.iter().rev().take(2).map(|row| row.full_name.as_str()).collect();
    assert_eq!(tail, ["Émile Zola", "élodie Marsh"]);
}

#[test]
fn filter_options_come_from_the_active_source() {
    let fixture = Fixture::new("filter-options", &seed_workers(9, 3));
    let service = DirectoryService::new(fixture.repo.clone());
    let mut directory = fixture.directory();
    service.refresh(&mut directory);

    let options = service
        .filter_options(&directory, WorkerField::Country)
        .expect("options should load");
    assert_eq!(options, vec!["CA", "MX", "US"]);

    let backend = fixture
        .repo
        .filter_options(WorkerField::Status)
        .expect("backend options should load");
    assert_eq!(backend, vec!["active", "pending"]);
}

#[test]
fn matching_rows_export_every_server_page() {
    let fixture = Fixture::new("export-matching", &seed_workers(600, 150));
    let service = DirectoryService::new(fixture.repo.clone());
    let mut directory = fixture.directory();
    service.refresh(&mut directory);

    let action = directory.toggle_filter_value(WorkerField::Status, "active");
    service.dispatch(&mut directory, action);
    assert_eq!(directory.model().rows().len(), 20);

    let rows = service
        .matching_rows(&directory)
        .expect("matching rows should load");
    assert_eq!(rows.len(), 150);
    assert!(rows.iter().all(|row| row.status == WorkerStatus::Active));
}

#[test]
fn provisioning_reports_each_email() {
    let fixture = Fixture::new("provision", &[]);
    let service = ImportService::new(fixture.repo.clone(), fixture.repo.clone());
    let emails: Vec<String> = [
        "ana@example.com",
        "ben@example.com",
        "bad-email",
        "cleo@example.com",
        "dev@example.com",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();

    let report = service.provision(emails.clone()).expect("provisioning should run");
    assert_eq!(
        (report.total, report.created, report.skipped, report.errors),
        (5, 4, 0, 1)
    );
    let failed: Vec<_> = report
        .results
        .iter()
        .filter(|result| result.status == ProvisionStatus::Error)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].email, "bad-email");
    assert_eq!(failed[0].reason.as_deref(), Some("Invalid email format"));

    let again = service.provision(emails).expect("second run should succeed");
    assert_eq!((again.created, again.skipped, again.errors), (0, 4, 1));
    assert!(again
        .results
        .iter()
        .filter(|result| result.status == ProvisionStatus::Skipped)
        .all(|result| result.reason.as_deref() == Some("User already exists")));
}

#[test]
fn provisioning_csv_without_emails_is_rejected() {
    let fixture = Fixture::new("provision-empty", &[]);
    let csv_path = fixture.temp_dir.join("emails.csv");
    fs::write(&csv_path, "email\n\n  \n").expect("should write csv");
    let service = ImportService::new(fixture.repo.clone(), fixture.repo.clone());

    let err = service
        .provision_csv(&csv_path)
        .expect_err("empty list should fail");
    assert_eq!(err.to_string(), "No emails found in CSV");
}

#[test]
fn import_csv_is_refused_until_errors_are_fixed() {
    let fixture = Fixture::new("import", &seed_workers(3, 0));
    let service = ImportService::new(fixture.repo.clone(), fixture.repo.clone());
    let header = "hr_id,full_name,engagement_model,email_personal,country_residence,locale_primary,hire_date,status,rtw_datetime\n";

    let bad_path = fixture.temp_dir.join("bad.csv");
    fs::write(
        &bad_path,
        format!(
            "{header}HR9001,Ana Lima,core,ana@example.com,BR,pt-BR,2025-01-10,pending,\n\
             HR0001,Ben Ode,core,ben@example.com,NG,en-NG,2025-01-11,pending,\n"
        ),
    )
    .expect("should write csv");
    let preview = service.preview_csv(&bad_path).expect("preview should run");
    assert_eq!(preview.valid.len(), 1);
    assert_eq!(preview.errors.len(), 1);
    assert_eq!(preview.errors[0].row, 3);
    assert_eq!(preview.errors[0].message, "HR ID already exists: HR0001");
    assert!(service.import(&preview).is_err());

    let good_path = fixture.temp_dir.join("good.csv");
    fs::write(
        &good_path,
        format!(
            "{header}HR9001,Ana Lima,core,ana@example.com,BR,pt-BR,2025-01-10,pending,\n\
             HR9002,Ben Ode,upwork,ben@example.com,NG,en-NG,2025-01-11,active,2025-01-12T09:00:00Z\n"
        ),
    )
    .expect("should write csv");
    let preview = service.preview_csv(&good_path).expect("preview should run");
    assert!(preview.can_import(), "unexpected errors: {:?}", preview.errors);
    let report = service.import(&preview).expect("import should succeed");
    assert_eq!((report.successful, report.failed), (2, 0));

    let rows = list_workers(&fixture.repo.db_path).expect("rows should load");
    assert_eq!(rows.len(), 5);
    let ben = rows
        .iter()
        .find(|row| row.hr_id == "HR9002")
        .expect("imported worker should exist");
    assert_eq!(ben.status, WorkerStatus::Active);
    assert_eq!(ben.engagement_model, EngagementModel::Upwork);
    assert!(ben.rtw_at.is_some());
}

#[test]
fn worker_updates_are_validated_before_writing() {
    let fixture = Fixture::new("update", &[]);
    let service = EditService::new(fixture.repo.clone());
    let draft = WorkerDraft::from_pairs([
        ("hr_id", "HR5001"),
        ("full_name", "Rin Sato"),
        ("engagement_model", "external"),
        ("email_personal", "rin@example.com"),
        ("country_residence", "jp"),
        ("locale_primary", "ja-JP"),
        ("hire_date", "2025-02-01"),
        ("status", "pending"),
    ]);
    let id = service.create_worker(&draft).expect("worker should be created");

    let duplicate = service.create_worker(&draft);
    assert!(matches!(duplicate, Err(EditError::Validation(_))));

    let invalid = service.update_worker(
        &id,
        WorkerPatch {
            country: Some("JPN".to_string()),
            ..WorkerPatch::default()
        },
    );
    assert!(matches!(invalid, Err(EditError::Validation(_))));

    let activate_without_rtw = service.update_worker(
        &id,
        WorkerPatch {
            status: Some(WorkerStatus::Active),
            ..WorkerPatch::default()
        },
    );
    assert!(matches!(activate_without_rtw, Err(EditError::Validation(_))));

    let updated = service
        .update_worker(
            &id,
            WorkerPatch {
                role: Some(Some("Linguist".to_string())),
                ..WorkerPatch::default()
            },
        )
        .expect("valid patch should apply");
    assert_eq!(updated.role.as_deref(), Some("Linguist"));

    let stored = fixture
        .repo
        .fetch_worker_by_id(&id)
        .expect("worker should exist");
    assert_eq!(stored.country, "JP");
    assert_eq!(stored.status, WorkerStatus::Pending);
    assert_eq!(stored.role.as_deref(), Some("Linguist"));

    let missing = service.update_worker(&WorkerId::from("999"), WorkerPatch::default());
    assert!(matches!(missing, Err(EditError::Repo(RepoError::NotFound(_)))));
}

#[test]
fn bulk_status_update_persists_and_clears_selection() {
    let fixture = Fixture::new("bulk-status", &seed_workers(6, 0));
    let directory_service = DirectoryService::new(fixture.repo.clone());
    let edit_service = EditService::new(fixture.repo.clone());
    let mut directory = fixture.directory();
    directory_service.refresh(&mut directory);

    let targets: Vec<WorkerId> = directory.visible_rows()[..2]
        .iter()
        .map(|row| row.id.clone())
        .collect();
    for id in &targets {
        directory.toggle_row_selected(id);
    }

    let updated = edit_service
        .bulk_update_status(&mut directory, WorkerStatus::Inactive)
        .expect("bulk update should succeed");
    assert_eq!(updated, 2);
    assert!(directory.selected_ids().is_empty());

    let stored = list_workers(&fixture.repo.db_path).expect("rows should load");
    let inactive: Vec<WorkerId> = stored
        .iter()
        .filter(|row| row.status == WorkerStatus::Inactive)
        .map(|row| row.id.clone())
        .collect();
    assert_eq!(inactive, targets);
    assert!(stored
        .iter()
        .filter(|row| targets.contains(&row.id))
        .all(|row| row.rtw_at.is_some() && row.termination_date.is_none()));
}

#[test]
fn bulk_status_updates_keep_rows_valid_for_every_status() {
    let mut workers = seed_workers(4, 2);
    workers[1].status = WorkerStatus::Terminated;
    workers[1].termination_date = Some(today() - Duration::days(10));
    let fixture = Fixture::new("bulk-status-rules", &workers);
    let directory_service = DirectoryService::new(fixture.repo.clone());
    let edit_service = EditService::new(fixture.repo.clone());

    let sequence = [
        WorkerStatus::Terminated,
        WorkerStatus::Active,
        WorkerStatus::Pending,
        WorkerStatus::Inactive,
        WorkerStatus::Terminated,
        WorkerStatus::Pending,
    ];
    for status in sequence {
        let mut directory = fixture.directory();
        directory_service.refresh(&mut directory);
        directory.toggle_all_selected(true);
        let updated = edit_service
            .bulk_update_status(&mut directory, status)
            .expect("bulk update should succeed");
        assert_eq!(updated, 4);

        let local = directory.model().rows().to_vec();
        let stored = list_workers(&fixture.repo.db_path).expect("rows should load");
        for row in local.iter().chain(stored.iter()) {
            assert_eq!(row.status, status);
            assert!(
                validate_row(row).is_ok(),
                "{} invalid after update to {status}: {:?}",
                row.hr_id,
                validate_row(row)
            );
        }
        assert_eq!(
            stored.iter().map(|row| row.rtw_at.is_some()).collect::<Vec<_>>(),
            local.iter().map(|row| row.rtw_at.is_some()).collect::<Vec<_>>()
        );
    }
}

#[test]
fn terminated_workers_stay_editable() {
    let fixture = Fixture::new("bulk-terminate-edit", &seed_workers(2, 0));
    let directory_service = DirectoryService::new(fixture.repo.clone());
    let edit_service = EditService::new(fixture.repo.clone());
    let mut directory = fixture.directory();
    directory_service.refresh(&mut directory);
    directory.toggle_all_selected(true);
    edit_service
        .bulk_update_status(&mut directory, WorkerStatus::Terminated)
        .expect("bulk update should succeed");

    let updated = edit_service
        .update_worker(
            &WorkerId::from("1"),
            WorkerPatch {
                role: Some(Some("Linguist".to_string())),
                ..WorkerPatch::default()
            },
        )
        .expect("terminated worker should accept unrelated edits");
    assert_eq!(updated.status, WorkerStatus::Terminated);
    assert!(updated.termination_date.is_some());
    assert!(updated.rtw_at.is_some());
}

struct RejectingRepo {
    rows: Vec<WorkerRow>,
}

impl WorkerRepository for RejectingRepo {
    fn init(&self) -> Result<(), RepoError> {
        Ok(())
    }

    fn count_workers(&self, _criteria: Option<&DirectoryCriteria>) -> Result<usize, RepoError> {
        Ok(self.rows.len())
    }

    fn fetch_workers(&self, _query: &PageQuery) -> Result<PageResult, RepoError> {
        Err(RepoError::Message("paging is not supported".to_string()))
    }

    fn fetch_all_workers(&self) -> Result<Vec<WorkerRow>, RepoError> {
        Ok(self.rows.clone())
    }

    fn fetch_worker_by_id(&self, id: &WorkerId) -> Result<WorkerRow, RepoError> {
        Err(RepoError::NotFound(id.clone()))
    }

    fn filter_options(&self, _field: WorkerField) -> Result<Vec<String>, RepoError> {
        Ok(Vec::new())
    }

    fn existing_identities(&self) -> Result<ExistingIdentities, RepoError> {
        Ok(ExistingIdentities::default())
    }

    fn create_worker(&self, _worker: NewWorker) -> Result<WorkerId, RepoError> {
        Err(RepoError::Message("read only".to_string()))
    }

    fn update_worker(&self, _id: &WorkerId, _patch: WorkerPatch) -> Result<(), RepoError> {
        Err(RepoError::Message("read only".to_string()))
    }

    fn bulk_insert_workers(&self, _workers: Vec<NewWorker>) -> Result<usize, RepoError> {
        Err(RepoError::Message("read only".to_string()))
    }

    fn bulk_update_status(
        &self,
        _ids: &[WorkerId],
        _status: WorkerStatus,
        _at: DateTime<Utc>,
    ) -> Result<usize, RepoError> {
        Err(RepoError::Message("database is locked".to_string()))
    }
}

#[test]
fn failed_bulk_status_update_rolls_back() {
    let repo = Arc::new(RejectingRepo {
        rows: synthetic_workers(5, 0),
    });
    let directory_service = DirectoryService::new(repo.clone());
    let edit_service = EditService::new(repo);
    let mut directory = WorkerDirectory::new(&DirectoryConfig::default()).with_today(today());
    assert_eq!(directory_service.refresh(&mut directory), ApplyOutcome::Applied);

    directory.toggle_all_selected(true);
    let err = edit_service
        .bulk_update_status(&mut directory, WorkerStatus::Terminated)
        .expect_err("backend rejects the update");
    assert_eq!(err.to_string(), "database is locked");

    assert_eq!(directory.model().rows(), synthetic_workers(5, 0).as_slice());
    assert_eq!(directory.selected_ids().len(), 5, "selection is kept for a retry");
}

#[test]
fn sticky_header_styles_include_positioning() {
    let style = table_header_cell_style();
    assert!(style.contains("position: sticky"));
    assert!(style.contains("top: 0"));
}

#[test]
fn table_container_style_allows_scroll() {
    let style = table_container_style();
    assert!(style.contains("overflow: auto"));
    assert!(style.contains("min-height: 0"));
}

#[test]
fn root_container_style_uses_viewport_height_and_flex() {
    let style = root_container_style();
    assert!(style.contains("height: 100vh"));
    assert!(style.contains("display: flex"));
    assert!(style.contains("flex-direction: column"));
}
