use chrono::NaiveDate;
use review_monitor::report::{
    render_dataframe, render_lines, render_no_reviewer_listing, rows_to_dataframe,
};
use review_monitor::{
    Category, ReviewConfig, RunMode, Submission, TaskType, process_submissions,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn config() -> ReviewConfig {
    let mut config = ReviewConfig::default();
    config.add_diploma_module("diplom-da");
    config.add_self_assignment_module("fonecmid");
    config.set_coordinator(101, "Smirnova");
    config.set_coordinator(102, "Kuznetsov");
    config
}

fn work(module: &str, tag: &str, submitted: NaiveDate) -> Submission {
    let mut record = Submission::new(module, TaskType::from_tag(tag)).with_submitted_on(submitted);
    record.task_title = format!("{module} task");
    record.admin_link = format!("https://admin.example/{module}");
    record.student_id = format!("s-{module}");
    record
}

/// Thursday 2026-01-22 export covering every report branch.
fn sample_records() -> Vec<Submission> {
    let mut malformed = work("sql-9", "homework", d(2026, 1, 20));
    malformed.submitted_at = "soon".into();
    vec![
        work("diplom-da-1", "diploma", d(2026, 1, 5))
            .with_reviewer("Orlov")
            .with_coordinator(101),
        work("sql-2", "homework", d(2026, 1, 19)).with_reviewer("Belova"),
        work("sql-3", "homework", d(2026, 1, 21)).with_reviewer("Belova"),
        work("fcpp-12", "diploma", d(2026, 1, 12)).with_coordinator(102),
        work("fcpp-7", "diploma", d(2026, 1, 20)).with_coordinator(999),
        work("fonecmid-1", "diploma", d(2026, 1, 8)).with_coordinator(101),
        work("python-1", "diploma", d(2026, 1, 21)),
        work("sql-5", "quiz", d(2026, 1, 5)),
        malformed,
    ]
}

#[test]
fn auto_mode_resolves_to_coursework_on_thursday() {
    assert_eq!(RunMode::Auto.resolve(d(2026, 1, 22)), RunMode::Coursework);
    assert_eq!(RunMode::Auto.resolve(d(2026, 1, 19)), RunMode::Regular);
    assert_eq!(RunMode::All.resolve(d(2026, 1, 19)), RunMode::All);
    assert_eq!(RunMode::Regular.resolve(d(2026, 1, 22)), RunMode::Regular);
    assert!(RunMode::All.includes_regular() && RunMode::All.includes_coursework());
    assert_eq!("ALL".parse::<RunMode>(), Ok(RunMode::All));
    assert!("weekly".parse::<RunMode>().is_err());
}

#[test]
fn pipeline_groups_records_into_reports() {
    let records = sample_records();
    let outcome = process_submissions(&config(), &records, d(2026, 1, 22), RunMode::Auto).unwrap();
    assert_eq!(outcome.mode, RunMode::Coursework);

    let report = &outcome.report;
    assert_eq!(report.diploma_works.len(), 1);
    assert_eq!(report.diploma_works[0].module, "diplom-da-1");
    assert_eq!(report.diploma_works[0].business_days_on_review, 12);
    assert!(report.diploma_works[0].overdue);

    assert_eq!(report.overdue_homework.len(), 1);
    assert_eq!(report.overdue_homework[0].module, "sql-2");
    assert_eq!(report.overdue_homework[0].business_days_on_review, 2);

    assert_eq!(report.coursework_works.len(), 4);
    let overdue: Vec<&str> = report
        .overdue_coursework
        .iter()
        .map(|row| row.module.as_str())
        .collect();
    assert_eq!(overdue, vec!["fcpp-12", "fonecmid-1"]);
    assert_eq!(report.overdue_coursework[0].business_days_on_review, 7);
    assert_eq!(report.overdue_coursework[0].reviewer, None);
    assert_eq!(
        report.overdue_coursework_coordinators,
        vec!["Kuznetsov".to_string(), "Smirnova".to_string()]
    );
}

#[test]
fn coursework_without_reviewer_grouped_by_known_coordinator() {
    let records = sample_records();
    let outcome = process_submissions(&config(), &records, d(2026, 1, 22), RunMode::Coursework).unwrap();
    let report = &outcome.report;

    assert_eq!(report.coursework_without_reviewer.len(), 1);
    let group = &report.coursework_without_reviewer[0];
    assert_eq!(group.coordinator, "Kuznetsov");
    assert_eq!(group.works.len(), 1);
    assert_eq!(group.works[0].module, "fcpp-12");

    // fonecmid is self-assigned; python-1 has no coordinator at all
    assert_eq!(report.unknown_coordinators, vec!["-".to_string(), "999".to_string()]);

    let listing = render_no_reviewer_listing(&report.coursework_without_reviewer);
    assert_eq!(
        listing,
        "@Kuznetsov\n fcpp-12  fcpp-12 task  https://admin.example/fcpp-12  s-fcpp-12  2026-01-12\n\n"
    );
}

#[test]
fn summary_counts_categories_and_skips() {
    let records = sample_records();
    let outcome = process_submissions(&config(), &records, d(2026, 1, 22), RunMode::All).unwrap();
    let summary = &outcome.report.summary;

    assert_eq!(summary.total, 9);
    assert_eq!(summary.category_count(Category::Diploma), 1);
    assert_eq!(summary.category_count(Category::Coursework), 4);
    assert_eq!(summary.category_count(Category::Homework), 2);
    assert_eq!(summary.unclassified, 1);
    assert_eq!(summary.overdue, 4);
    assert_eq!(summary.needs_reviewer, 3);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].position, 9);
    assert_eq!(summary.skipped[0].reason, "malformed submission date 'soon'");
    assert_eq!(
        summary.to_cli_summary(),
        "records=9, diploma=1, coursework=4, homework=2, unclassified=1, overdue=4, no_reviewer=3, skipped=9"
    );
}

#[test]
fn negative_deadline_fails_before_processing() {
    let mut config = config();
    config.deadlines.insert(Category::Homework, -1);
    let err = process_submissions(&config, &sample_records(), d(2026, 1, 22), RunMode::All)
        .unwrap_err();
    assert!(err.to_string().contains("must not be negative"));
}

#[test]
fn report_rows_render_as_table() {
    let records = sample_records();
    let outcome = process_submissions(&config(), &records, d(2026, 1, 22), RunMode::All).unwrap();
    let df = rows_to_dataframe(&outcome.report.overdue_coursework).unwrap();
    assert_eq!(df.height(), 2);
    assert_eq!(df.width(), 10);

    let table = render_dataframe(&df);
    assert!(table.contains("business_days_on_review"));
    assert!(table.contains("fonecmid-1"));
    assert!(table.contains("2026-01-08"));
    assert!(table.starts_with('+'));

    let empty = rows_to_dataframe(&[]).unwrap();
    assert_eq!(empty.height(), 0);
    assert_eq!(render_dataframe(&empty).lines().count(), 4);
}

#[test]
fn line_listing_falls_back_to_message() {
    let names = vec!["Kuznetsov".to_string(), "Smirnova".to_string()];
    assert_eq!(render_lines(&names, "none"), "Kuznetsov\nSmirnova\n");
    assert_eq!(render_lines(&[], "No coordinators with overdue works"), "No coordinators with overdue works\n");
}
