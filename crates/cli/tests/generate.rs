//! End-to-end tests for `discogen generate` against a mock directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use discogen_cli::Fetcher;
use discogen_cli::generate::{GenerateArgs, generate};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture(name: &str) -> PathBuf {
    workspace_root().join("crates/core/tests/fixtures").join(name)
}

fn tasks_fixture() -> String {
    std::fs::read_to_string(fixture("tasks.json")).unwrap()
}

fn args(server: &MockServer, gendir: PathBuf) -> GenerateArgs {
    GenerateArgs {
        api: "*".into(),
        gendir,
        no_cache: true,
        files: vec![],
        build: false,
        runtime_path: None,
        directory_url: format!("{}/discovery/v1/apis", server.uri()),
    }
}

async fn mount_directory(server: &MockServer) {
    let directory = serde_json::json!({
        "kind": "discovery#directoryList",
        "items": [
            {
                "id": "tasks:v1",
                "name": "tasks",
                "version": "v1",
                "discoveryRestUrl": format!("{}/apis/tasks/v1/rest", server.uri())
            },
            {
                "id": "broken:v1",
                "name": "broken",
                "version": "v1",
                "discoveryRestUrl": format!("{}/apis/broken/v1/rest", server.uri())
            }
        ]
    });
    Mock::given(method("GET"))
        .and(path("/discovery/v1/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(directory))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/tasks/v1/rest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(tasks_fixture()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/apis/broken/v1/rest"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"id":"broken:v1","name":"broken","version":"v1",
                "auth":{"oauth2":{"scopes":{"http://example.com/auth/foo":{}}}}}"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_generates_each_api_and_collects_failures() {
    let server = MockServer::start().await;
    mount_directory(&server).await;
    let out = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let fetcher = Fetcher::new(reqwest::Client::new(), cache.path().to_path_buf(), false);

    let report = generate(&args(&server, out.path().to_path_buf()), &fetcher)
        .await
        .unwrap();

    assert_eq!(report.generated.len(), 1);
    let api = &report.generated[0];
    assert_eq!(api.id, "tasks:v1");
    assert!(api.changed);

    let dir = out.path().join("tasks").join("v1");
    assert_eq!(api.dir, dir);
    let lib = std::fs::read_to_string(dir.join("src/lib.rs")).unwrap();
    assert!(lib.contains("pub struct TasksService {"));
    let manifest = std::fs::read_to_string(dir.join("Cargo.toml")).unwrap();
    assert!(manifest.contains("name = \"tasks-v1\""));
    assert_eq!(
        std::fs::read_to_string(dir.join("tasks-api.json")).unwrap(),
        tasks_fixture()
    );

    assert_eq!(report.failures.len(), 1);
    assert!(
        report.failures[0].starts_with("API broken:v1 failed to generate code:"),
        "{}",
        report.failures[0]
    );
    assert!(report.failures[0].contains("http://example.com/auth/foo"));
    assert!(!out.path().join("broken").exists());
}

#[tokio::test]
async fn test_second_run_leaves_files_unchanged() {
    let server = MockServer::start().await;
    mount_directory(&server).await;
    let out = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let fetcher = Fetcher::new(reqwest::Client::new(), cache.path().to_path_buf(), true);
    let mut args = args(&server, out.path().to_path_buf());
    args.api = "tasks:v1".into();

    let first = generate(&args, &fetcher).await.unwrap();
    assert!(first.generated[0].changed);
    let second = generate(&args, &fetcher).await.unwrap();
    assert!(!second.generated[0].changed);
    assert!(second.failures.is_empty());
}

#[tokio::test]
async fn test_unknown_api_lists_available_ids() {
    let server = MockServer::start().await;
    mount_directory(&server).await;
    let out = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let fetcher = Fetcher::new(reqwest::Client::new(), cache.path().to_path_buf(), false);
    let mut args = args(&server, out.path().to_path_buf());
    args.api = "gmail:v1".into();

    let err = generate(&args, &fetcher).await.unwrap_err();
    assert!(err.contains("tasks:v1, broken:v1"), "{err}");
}

#[test]
fn test_run_from_local_file() {
    let out = tempfile::tempdir().unwrap();
    let fixture = fixture("tasks.json");
    let code = discogen_cli::run(vec![
        "discogen".into(),
        "generate".into(),
        "--file".into(),
        fixture.display().to_string(),
        "--gendir".into(),
        out.path().display().to_string(),
        "--no-cache".into(),
    ]);
    assert_eq!(code, 0);
    assert!(out.path().join("tasks/v1/src/lib.rs").exists());
}

#[test]
fn test_run_reports_missing_file() {
    let out = tempfile::tempdir().unwrap();
    let code = discogen_cli::run(vec![
        "discogen".into(),
        "generate".into(),
        "--file".into(),
        out.path().join("missing.json").display().to_string(),
        "--gendir".into(),
        out.path().display().to_string(),
    ]);
    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_generated_crates_build_against_local_runtime() {
    let out = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    let fetcher = Fetcher::new(reqwest::Client::new(), cache.path().to_path_buf(), false);
    let root = workspace_root();
    let mut args = GenerateArgs {
        api: "*".into(),
        gendir: out.path().to_path_buf(),
        no_cache: true,
        files: vec![fixture("tasks.json"), fixture("counters.json")],
        build: false,
        runtime_path: Some(root.join("crates/runtime")),
        directory_url: String::new(),
    };

    let report = generate(&args, &fetcher).await.unwrap();
    assert!(report.failures.is_empty(), "{}", report.failures.join("\n"));
    assert_eq!(report.generated.len(), 2);

    // Pin the generated crates to the versions this workspace already resolved.
    let lock = root.join("Cargo.lock");
    if lock.exists() {
        for api in &report.generated {
            std::fs::copy(&lock, api.dir.join("Cargo.lock")).unwrap();
        }
    }
    let manifest = std::fs::read_to_string(out.path().join("counters/v1/Cargo.toml")).unwrap();
    let parsed: toml::Table = manifest.parse().unwrap();
    let runtime = parsed["dependencies"]["discogen-runtime"]["path"].as_str().unwrap();
    assert!(runtime.ends_with("crates/runtime"), "{runtime}");

    args.build = true;
    let report = generate(&args, &fetcher).await.unwrap();
    assert!(report.failures.is_empty(), "{}", report.failures.join("\n"));
    assert!(report.generated.iter().all(|api| !api.changed));
}
