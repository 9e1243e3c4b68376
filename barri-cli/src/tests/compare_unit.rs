//! Unit tests covering compare CLI configuration and output.

use super::helpers::{StubConnector, Workspace, summary_rows, tourism_records};
use super::*;
use crate::compare::{CompareArgs, CompareConfig, config_from_layers_for_test, run_compare_with};
use rstest::rstest;
use serde_json::Value;

fn file_args(workspace: &Workspace, ids: &[&str]) -> CompareArgs {
    CompareArgs {
        ids: ids.iter().map(|id| (*id).to_owned()).collect(),
        tourism: Some(workspace.write_json("turisme.json", &tourism_records())),
        summary: Some(workspace.write_json("resum.json", &summary_rows())),
        ..CompareArgs::default()
    }
}

#[rstest]
fn compare_without_ids_errors() {
    let args = CompareArgs {
        backend_url: Some("http://backend.test".to_owned()),
        ..CompareArgs::default()
    };
    let err = CompareConfig::try_from(args).expect_err("empty selection should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_COMPARE_IDS);
            assert_eq!(env, ENV_COMPARE_IDS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn duplicate_ids_collapse_in_selection_order() {
    let args = CompareArgs {
        ids: vec!["02".to_owned(), "01".to_owned(), "02".to_owned()],
        backend_url: Some("http://backend.test".to_owned()),
        ..CompareArgs::default()
    };
    let config = CompareConfig::try_from(args).expect("config should build");
    assert_eq!(config.selection.ids(), ["02", "01"]);
}

#[rstest]
fn tourism_file_without_summary_errors() {
    let args = CompareArgs {
        ids: vec!["01".to_owned()],
        tourism: Some(Utf8PathBuf::from("turisme.json")),
        ..CompareArgs::default()
    };
    let err = CompareConfig::try_from(args).expect_err("missing summary should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_COMPARE_SUMMARY);
            assert_eq!(env, ENV_COMPARE_SUMMARY);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn summary_file_and_backend_are_mutually_exclusive() {
    let args = CompareArgs {
        ids: vec!["01".to_owned()],
        summary: Some(Utf8PathBuf::from("resum.json")),
        backend_url: Some("http://backend.test".to_owned()),
        ..CompareArgs::default()
    };
    let err = CompareConfig::try_from(args).expect_err("conflicting sources should error");
    assert!(matches!(
        err,
        CliError::ConflictingArguments {
            first: ARG_COMPARE_SUMMARY,
            second: ARG_BACKEND_URL
        }
    ));
}

#[rstest]
fn compare_joins_files_in_selection_order() {
    let workspace = Workspace::new();
    let mut stdout = Vec::new();

    run_compare_with(
        file_args(&workspace, &["02", "99", "01"]),
        &DefaultConnector,
        &mut stdout,
    )
    .expect("compare should succeed");

    let rows: Value = serde_json::from_slice(&stdout).expect("rows JSON");
    let rows = rows.as_array().expect("rows array");
    let ids: Vec<&str> = rows
        .iter()
        .map(|row| row["id"].as_str().expect("row id"))
        .collect();
    assert_eq!(ids, ["02", "01"]);
    assert_eq!(rows.first().and_then(|row| row["hotels"].as_f64()), Some(48.0));
}

#[rstest]
fn compare_reports_missing_summary_files() {
    let workspace = Workspace::new();
    let args = CompareArgs {
        summary: Some(workspace.path("absent.json")),
        ..file_args(&workspace, &["01"])
    };
    let err = run_compare_with(args, &StubConnector::default(), &mut Vec::new())
        .expect_err("missing summary should error");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_COMPARE_SUMMARY),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn compare_rejects_non_array_summaries() {
    use barri_core::test_support::StubNeighbourhoodSource;
    use serde_json::json;

    let connector = StubConnector::serving(
        StubNeighbourhoodSource::with_tourism(tourism_records()).and_summary(json!({ "rows": [] })),
    );
    let args = CompareArgs {
        ids: vec!["01".to_owned()],
        backend_url: Some("http://backend.test".to_owned()),
        ..CompareArgs::default()
    };
    let err = run_compare_with(args, &connector, &mut Vec::new())
        .expect_err("object summary should error");
    assert!(matches!(err, CliError::Batch { dataset: "summary", .. }));
}

#[rstest]
fn merge_layers_read_ids_from_the_environment() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_environment(json!({ "ids": ["07"], "backend_url": "http://from-env" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.selection.ids(), ["07"]);
}
