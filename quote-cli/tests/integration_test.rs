//! Replays scripted sessions against the shipped test configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use quote_cli::app::{self, RunOptions, ScriptRunner, SharedStore};
use quote_cli::script::{Script, ScriptAction};
use quote_core::session::SESSION_KEY;
use quote_core::{MemorySessionStore, Transition};
use quote_data::QuoteConfig;
use rust_decimal_macros::dec;

fn config_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../quote-data/test-data")
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn options(
    script: &str,
    session_dir: Option<&Path>,
    outbox: &Path,
) -> RunOptions {
    RunOptions {
        config_dir: config_dir(),
        script: fixture(script),
        session_dir: session_dir.map(Path::to_path_buf),
        outbox: outbox.to_path_buf(),
        today: today(),
    }
}

fn runner(outbox: &Path) -> ScriptRunner {
    let config = QuoteConfig::load(&config_dir()).expect("Failed to load test data");
    let store: SharedStore = Arc::new(MemorySessionStore::new());
    ScriptRunner::new(config, store, outbox, today())
}

fn outbox_files(dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|entry| entry.expect("Failed to read outbox entry").path())
            .collect(),
        Err(_) => Vec::new(),
    }
}

// =============================================================================
// Full walks
// =============================================================================

#[tokio::test]
async fn test_walk_to_review_prices_the_move() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let report = app::run(&options("walk_to_review.toml", None, outbox.path()))
        .await
        .expect("Run failed");

    assert!(!report.resume_offered);
    assert_eq!(report.final_step, "review-details");
    assert_eq!(report.final_position, 15);
    assert_eq!(report.step_count, 17);
    // 16 of 17
    assert_eq!(report.progress, 94);

    let range = report.price_range.clone().expect("range once a size is chosen");
    assert_eq!(range.min, dec!(340));
    assert_eq!(range.max, dec!(580));
    assert!(report.to_string().contains("Price range: $340 to $580 (4 hours)"));

    let estimate = report.estimate.expect("estimate at review");
    assert_eq!(estimate.total, "$513");
    assert_eq!(estimate.estimated_hours, "4 hours");
    assert!(report.receipts.is_empty());
    assert!(report.outcomes.iter().all(|outcome| outcome.errors.is_empty()));
}

// =============================================================================
// Footer
// =============================================================================

#[tokio::test]
async fn test_footer_presses_follow_the_active_step() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let report = app::run(&options("walk_to_review.toml", None, outbox.path()))
        .await
        .expect("Run failed");
    let note_of = |number: usize| report.outcomes[number - 1].note.as_deref();

    // move-type has no footer
    assert_eq!(
        note_of(3),
        Some("no footer on move-type, the step advances itself")
    );
    // destination-challenges
    assert_eq!(report.outcomes[15].action, "skip");
    assert_eq!(note_of(16), Some("skipped"));
    // route-distance
    assert_eq!(note_of(17), Some("pressed \"Looks good\""));
}

#[tokio::test]
async fn test_skip_without_footer_is_ignored() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");
    let script = Script::parse(
        r#"
        [[actions]]
        action = "select"
        value = "full-service"

        [[actions]]
        action = "skip"
        "#,
    )
    .expect("Failed to parse script");

    let mut runner = runner(outbox.path());
    runner.run(&script).await.expect("Run failed");
    let report = runner.into_report();

    let skip = &report.outcomes[1];
    assert_eq!(skip.transition, Some(Transition::Stayed { at: 2 }));
    assert_eq!(
        skip.note.as_deref(),
        Some("no footer on move-type, skip ignored")
    );
    assert!(skip.errors.is_empty());
}

// =============================================================================
// Addresses
// =============================================================================

#[tokio::test]
async fn test_address_lookup_fills_and_locates() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");
    let script = Script::parse(
        r#"
        [[addresses]]
        address = "12 Elm St, Atlanta, GA"
        latitude = 33.75
        longitude = -84.39

        [[actions]]
        action = "address"
        location = "pickup"
        query = "elm"

        [[actions]]
        action = "address"
        location = "destination"
        query = "1 Nowhere Rd"
        "#,
    )
    .expect("Failed to parse script");

    let mut runner = runner(outbox.path());
    runner.run(&script).await.expect("Run failed");

    let addresses = &runner.wizard().form().addresses;
    assert_eq!(addresses.pickup.address, "12 Elm St, Atlanta, GA");
    assert_eq!(addresses.pickup.map_url, "geo:33.750000,-84.390000");
    assert_eq!(addresses.destination.address, "1 Nowhere Rd");
    assert_eq!(addresses.destination.map_url, "");

    let report = runner.into_report();
    assert_eq!(
        report.outcomes[0].note.as_deref(),
        Some("1 suggestion(s), using \"12 Elm St, Atlanta, GA\", geo:33.750000,-84.390000")
    );
    assert_eq!(
        report.outcomes[1].note.as_deref(),
        Some("0 suggestion(s), using \"1 Nowhere Rd\", not located")
    );
}

#[tokio::test]
async fn test_submit_writes_lead_and_restarts() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");
    let mut script = Script::load(&fixture("walk_to_review.toml")).expect("Failed to load script");
    script.actions.push(ScriptAction::Submit);

    let mut runner = runner(outbox.path());
    runner.run(&script).await.expect("Run failed");
    let report = runner.into_report();

    assert_eq!(report.receipts.len(), 1);
    assert_eq!(report.final_step, "welcome");
    assert_eq!(report.estimate, None);

    let files = outbox_files(outbox.path());
    assert_eq!(files.len(), 1);
    let lead: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files[0]).expect("Failed to read lead"))
            .expect("Lead is not JSON");
    assert_eq!(lead["source"], "moovinleads-widget");
    assert_eq!(lead["moveSize"], "2-bedroom");
    assert_eq!(lead["contact"]["email"], "dana@example.com");
    assert!(lead.get("submittedAt").is_some());
}

#[tokio::test]
async fn test_submit_without_email_keeps_form() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");
    let script = Script {
        actions: vec![ScriptAction::Submit],
        ..Script::default()
    };

    let mut runner = runner(outbox.path());
    runner.run(&script).await.expect("Run failed");
    let report = runner.into_report();

    let outcome = &report.outcomes[0];
    assert_eq!(
        outcome.note.as_deref(),
        Some("submission failed: A contact email is required to submit a lead")
    );
    assert_eq!(
        outcome.errors,
        vec![(
            "submit".to_string(),
            "A contact email is required to submit a lead".to_string()
        )]
    );
    assert!(report.receipts.is_empty());
    assert!(outbox_files(outbox.path()).is_empty());
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_missing_move_type_blocks() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let report = app::run(&options("blocked.toml", None, outbox.path()))
        .await
        .expect("Run failed");

    let blocked = &report.outcomes[1];
    assert_eq!(blocked.transition, Some(Transition::Blocked { at: 2 }));
    assert_eq!(blocked.step, "move-type");
    assert_eq!(
        blocked.errors,
        vec![(
            "locationType".to_string(),
            "Please select a location type".to_string()
        )]
    );
    assert_eq!(report.final_step, "move-type");
}

#[tokio::test]
async fn test_unknown_option_stops_the_run() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");
    let script = Script::parse(
        r#"
        [[actions]]
        action = "select"
        value = "teleport"
        "#,
    )
    .expect("Failed to parse script");

    let mut runner = runner(outbox.path());
    let err = runner.run(&script).await.expect_err("Should reject option");

    assert!(err.to_string().starts_with("action 1: select teleport"));
}

// =============================================================================
// Routing
// =============================================================================

#[tokio::test]
async fn test_route_needs_both_addresses() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let report = app::run(&options("route.toml", None, outbox.path()))
        .await
        .expect("Run failed");

    let notes: Vec<Option<&str>> = report
        .outcomes
        .iter()
        .map(|outcome| outcome.note.as_deref())
        .collect();
    assert_eq!(
        notes,
        vec![
            None,
            Some("skipped, both addresses are needed"),
            None,
            Some("12 mi, 25 min"),
            Some("10 mi, 20 min"),
        ]
    );
}

#[tokio::test]
async fn test_impossible_route_uses_default_distance() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");
    let script = Script::parse(
        r#"
        [[actions]]
        action = "set"
        field = "addresses.pickup.address"
        value = "12 Elm St, Atlanta, GA"

        [[actions]]
        action = "set"
        field = "addresses.destination.address"
        value = "99 Oak Ave, Decatur, GA"

        [[actions]]
        action = "route"
        miles = "79,000,000,000,000,000,000,000,000"
        "#,
    )
    .expect("Failed to parse script");

    let mut runner = runner(outbox.path());
    runner.run(&script).await.expect("Run failed");
    assert_eq!(runner.wizard().form().route_distance, Some(dec!(10)));

    let report = runner.into_report();
    assert_eq!(report.outcomes[2].note.as_deref(), Some("10 mi, 20 min"));
    assert!(report.estimate.is_some());
}

// =============================================================================
// Resume
// =============================================================================

#[tokio::test]
async fn test_saved_session_resumes_on_next_run() {
    let sessions = tempfile::tempdir().expect("Failed to create temp dir");
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let first = app::run(&options(
        "walk_to_review.toml",
        Some(sessions.path()),
        outbox.path(),
    ))
    .await
    .expect("First run failed");
    assert!(
        sessions
            .path()
            .join(format!("{SESSION_KEY}.json"))
            .exists()
    );

    let second = app::run(&options("resume.toml", Some(sessions.path()), outbox.path()))
        .await
        .expect("Second run failed");

    assert!(second.resume_offered);
    assert_eq!(second.final_step, "review-details");
    assert_eq!(second.estimate, first.estimate);
}

#[tokio::test]
async fn test_resume_without_session_fails() {
    let sessions = tempfile::tempdir().expect("Failed to create temp dir");
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let err = app::run(&options("resume.toml", Some(sessions.path()), outbox.path()))
        .await
        .expect_err("Nothing to resume");

    assert!(err.to_string().contains("resume"));
}

// =============================================================================
// Report
// =============================================================================

#[tokio::test]
async fn test_report_display() {
    let outbox = tempfile::tempdir().expect("Failed to create temp dir");

    let report = app::run(&options("blocked.toml", None, outbox.path()))
        .await
        .expect("Run failed");
    let text = report.to_string();

    assert!(text.starts_with("Resumable session offered: no\n"));
    assert!(text.contains("  1. select full-service -> moved 0 to 2 (move-type)"));
    assert!(text.contains("  2. continue -> blocked at 2 (move-type)"));
    assert!(text.contains("       locationType: Please select a location type"));
    assert!(text.contains("Final step: move-type (3 of 17, 18%)"));
}
