//! Unit tests for the dispatch CLI helpers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use env_lock::lock_env;
use ortho_config::OrthoConfig;
use rstest::{fixture, rstest};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::domain::ports::{RawResponse, ServiceCallFailure, TulipClientError};
use crate::domain::{FlatParameters, QueueError};

const SUCCESS: &str =
    r#"<response code="1000"><result><object><id>9</id></object></result></response>"#;

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).expect("write workspace file");
        path
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("objects.json")
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace {
        dir: tempfile::tempdir().expect("temp dir"),
    }
}

fn settings(url: &str, batch: Option<&Path>, output: &Path) -> TulipSettings {
    TulipSettings {
        url: Some(url.to_owned()),
        file_upload_path: None,
        objects_map: None,
        timeout_seconds: 5,
        user_agent: None,
        batch: batch.map(Path::to_path_buf),
        output: Some(output.to_path_buf()),
    }
}

#[rstest]
#[tokio::test]
async fn run_dispatches_batch_and_writes_committed_objects(workspace: Workspace) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/crm_contact/create"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SUCCESS))
        .expect(1)
        .mount(&server)
        .await;

    let batch = workspace.write(
        "batch.json",
        r#"[{ "type": "Contact", "parameters": { "name": "Ada" } }]"#,
    );
    let objects_map = workspace.write(
        "objects.map.json",
        r#"{ "Contact": { "service": "crm_contact", "action": "create" } }"#,
    );
    let mut settings = settings(&server.uri(), Some(&batch), &workspace.output());
    settings.objects_map = Some(objects_map);

    let report = run(&settings).await.expect("run should succeed");

    assert!(report.is_success());
    assert_eq!(report.summary.staged, 1);
    let written: Value = serde_json::from_str(
        &std::fs::read_to_string(workspace.output()).expect("output written"),
    )
    .expect("valid JSON");
    assert_eq!(written[0]["tulip_id"], "9");
    assert_eq!(written[0]["type"], "Contact");
}

#[rstest]
#[tokio::test]
async fn run_reports_captured_failures(workspace: Workspace) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/contact/save"))
        .respond_with(ResponseTemplate::new(403).set_body_string(
            r#"<response code="1001"><error>Host not allowed</error></response>"#,
        ))
        .mount(&server)
        .await;

    let batch = workspace.write("batch.json", r#"[{ "type": "Contact" }]"#);
    let settings = settings(&server.uri(), Some(&batch), &workspace.output());

    let report = run(&settings).await.expect("cycle completes");

    assert!(!report.is_success());
    assert_eq!(report.summary.failed, 1);
    let line = format_failure(&report.failures[0]);
    assert!(line.starts_with(&format!("{}/api/contact/save\t403\t", server.uri())));
    assert!(line.contains("Host not allowed"));
    assert!(!workspace.output().exists(), "nothing staged, nothing written");
}

#[rstest]
#[tokio::test]
async fn run_requires_a_batch_file(workspace: Workspace) {
    let settings = settings("https://tulip.example.com", None, &workspace.output());
    assert_eq!(run(&settings).await, Err(CliError::MissingBatch));
}

#[tokio::test]
async fn unconfigured_run_reports_the_missing_batch() {
    let loaded = {
        let _guard = lock_env(
            [
                "TULIP_URL",
                "TULIP_FILE_UPLOAD_PATH",
                "TULIP_OBJECTS_MAP",
                "TULIP_TIMEOUT_SECONDS",
                "TULIP_USER_AGENT",
                "TULIP_BATCH",
                "TULIP_OUTPUT",
            ]
            .map(|name| (name, None::<String>)),
        );
        TulipSettings::load_from_iter([OsString::from("tulip-queue")])
    };
    let settings = loaded.expect("settings load without any configuration");

    assert_eq!(run(&settings).await, Err(CliError::MissingBatch));
}

#[rstest]
fn debug_output_summarises_the_manager(workspace: Workspace) {
    let settings = settings("https://tulip.example.com", None, &workspace.output());
    let manager = build_manager(&settings).expect("manager builds");
    let rendered = format!("{manager:?}");
    assert!(rendered.starts_with("QueueManager"));
    assert!(rendered.contains("queued: 0"));
}

#[rstest]
#[tokio::test]
async fn run_surfaces_invalid_endpoints(workspace: Workspace) {
    let batch = workspace.write("batch.json", r#"[{ "type": "Contact" }]"#);
    let settings = settings("", Some(&batch), &workspace.output());

    let err = run(&settings).await.expect_err("endpoint is unset");
    assert!(matches!(
        err,
        CliError::Dispatch {
            source: QueueError::InvalidEndpoint { .. }
        }
    ));
}

#[rstest]
#[tokio::test]
async fn run_surfaces_malformed_batches(workspace: Workspace) {
    let batch = workspace.write("batch.json", "{ not json");
    let settings = settings("https://tulip.example.com", Some(&batch), &workspace.output());

    let err = run(&settings).await.expect_err("batch is malformed");
    assert!(matches!(err, CliError::Batch { .. }));
}

#[rstest]
fn build_manager_applies_settings(workspace: Workspace) {
    let objects_map = workspace.write(
        "objects.map.json",
        r#"{ "Contact": { "service": "crm_contact", "action": "create" } }"#,
    );
    let mut settings = settings("https://tulip.example.com", None, &workspace.output());
    settings.objects_map = Some(objects_map);
    settings.file_upload_path = Some("/srv/uploads".to_owned());

    let manager = build_manager(&settings).expect("manager builds");
    assert_eq!(manager.objects_map().resolve("Contact").service, "crm_contact");
    assert_eq!(manager.file_upload_path(), Some("/srv/uploads"));
}

#[rstest]
fn build_manager_surfaces_missing_objects_map(workspace: Workspace) {
    let mut settings = settings("https://tulip.example.com", None, &workspace.output());
    settings.objects_map = Some(workspace.dir.path().join("missing.json"));

    let err = build_manager(&settings).expect_err("map is missing");
    assert!(matches!(err, CliError::ObjectsMap { .. }));
}

#[test]
fn format_failure_marks_missing_responses() {
    let result = DispatchResult {
        url: "https://tulip.example.com/api/contact/save".to_owned(),
        parameters: FlatParameters::new(),
        response: None,
        response_body: String::new(),
        failure: ServiceCallFailure::without_response(TulipClientError::transport("refused")),
    };
    assert_eq!(
        format_failure(&result),
        "https://tulip.example.com/api/contact/save\t-\tTulip API transport failed: refused"
    );

    let with_status = DispatchResult {
        response: Some(RawResponse::new(502, "")),
        ..result
    };
    assert!(format_failure(&with_status).contains("\t502\t"));
}
