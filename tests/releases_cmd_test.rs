use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::cargo::cargo_bin_cmd;
use mockito::{Mock, Server, ServerGuard};
use predicates::prelude::*;
use tempfile::tempdir;

fn write_config(dir: &Path, base_url: &str, extra: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        format!("[api]\nbase_url = \"{base_url}\"\n\n[fetch]\ntimeout_seconds = 5\n{extra}"),
    )
    .unwrap();
    path
}

fn write_watchlist(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join("watchlist.json");
    let items = entries
        .iter()
        .map(|(owner, name)| format!(r#"{{"userName":"{owner}","repoName":"{name}"}}"#))
        .collect::<Vec<_>>()
        .join(",");
    fs::write(&path, format!("[{items}]")).unwrap();
    path
}

fn release_json(name: &str, created_at: &str, tarball: &str) -> String {
    format!(
        r#"[{{"name":"{name}","tag_name":"{name}","created_at":"{created_at}","tarball_url":"{tarball}","html_url":"https://github.com/x"}}]"#
    )
}

fn mock_releases(server: &mut ServerGuard, owner: &str, name: &str, body: &str) -> Mock {
    server
        .mock("GET", format!("/repos/{owner}/{name}/releases").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create()
}

fn any_request(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", mockito::Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .expect(0)
        .create()
}

#[test]
fn prints_newest_release_first_and_reports_missing_releases_outside_the_table() {
    let mut server = Server::new();
    let older = mock_releases(
        &mut server,
        "A",
        "x",
        &release_json("v1", "2024-03-01T10:00:00Z", "https://example.com/x/v1.tar.gz"),
    );
    let newer = mock_releases(
        &mut server,
        "B",
        "y",
        &release_json("v2", "2024-03-05T18:00:00Z", "https://example.com/y/v2.tar.gz"),
    );
    let empty = mock_releases(&mut server, "C", "z", "[]");

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = write_watchlist(dir.path(), &[("A", "x"), ("B", "y"), ("C", "z")]);

    let output = cargo_bin_cmd!("release-watch")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .env("CLIENT_ID", "test-id")
        .env("CLIENT_SECRET", "test-secret")
        .assert()
        .success()
        .code(0)
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8(output).unwrap();
    let lines = stdout.lines().collect::<Vec<_>>();

    assert_eq!(lines[0], "No releases found for C/z");
    assert!(lines[1].starts_with('+'));
    assert!(lines[2].contains("APP") && lines[2].contains("DOWNLOAD"));

    let row_y = lines.iter().position(|line| line.starts_with("| y ")).unwrap();
    let row_x = lines.iter().position(|line| line.starts_with("| x ")).unwrap();
    assert!(row_y < row_x);
    assert!(lines[row_y].contains("| v2 "));
    assert!(lines[row_y].contains("05 Mar 24 18:00 UTC"));
    assert!(lines[row_y].contains("https://example.com/y/v2.tar.gz"));
    assert!(lines[row_x].contains("01 Mar 24 10:00 UTC"));
    assert!(!lines.iter().any(|line| line.starts_with("| z ")));

    older.assert();
    newer.assert();
    empty.assert();
}

#[test]
fn releases_subcommand_emits_json_report() {
    let mut server = Server::new();
    mock_releases(
        &mut server,
        "golang",
        "go",
        &release_json("go1.22.1", "2024-03-05T18:00:00Z", "https://example.com/go.tar.gz"),
    );
    mock_releases(&mut server, "acme", "empty", "[]");

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = write_watchlist(dir.path(), &[("golang", "go"), ("acme", "empty")]);

    let output = cargo_bin_cmd!("release-watch")
        .arg("releases")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .arg("--json")
        .env("CLIENT_ID", "test-id")
        .env("CLIENT_SECRET", "test-secret")
        .assert()
        .success()
        .stderr(predicate::str::contains("No releases found for acme/empty"))
        .get_output()
        .stdout
        .clone();

    let doc: serde_json::Value = serde_json::from_slice(&output).expect("stdout is JSON");
    assert_eq!(doc["releases"][0]["owner"], "golang");
    assert_eq!(doc["releases"][0]["version"], "go1.22.1");
    assert_eq!(
        doc["releases"][0]["download_url"],
        "https://example.com/go.tar.gz"
    );
    assert_eq!(doc["failures"][0]["repo"], "acme/empty");
    assert_eq!(doc["failures"][0]["kind"], "not_found");
}

#[test]
fn inline_repositories_are_used_without_a_watchlist_file() {
    let mut server = Server::new();
    let mock = mock_releases(
        &mut server,
        "tokio-rs",
        "tokio",
        &release_json("tokio-1.36.0", "2024-02-02T00:00:00Z", "https://example.com/t.tar.gz"),
    );

    let dir = tempdir().unwrap();
    let config = write_config(
        dir.path(),
        &server.url(),
        "\n[[repositories]]\nowner = \"tokio-rs\"\nname = \"tokio\"\n",
    );

    cargo_bin_cmd!("release-watch")
        .arg("--config")
        .arg(&config)
        .env("CLIENT_ID", "test-id")
        .env("CLIENT_SECRET", "test-secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("| tokio "))
        .stdout(predicate::str::contains("tokio-1.36.0"));

    mock.assert();
}

#[test]
fn malformed_watchlist_aborts_before_any_request() {
    let mut server = Server::new();
    let guard = any_request(&mut server);

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = dir.path().join("watchlist.json");
    fs::write(&watchlist, r#"[{"userName": "golang", "repoName": "#).unwrap();

    cargo_bin_cmd!("release-watch")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .env("CLIENT_ID", "test-id")
        .env("CLIENT_SECRET", "test-secret")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("failed to parse watchlist"));

    guard.assert();
}

#[test]
fn missing_credentials_abort_before_any_request() {
    let mut server = Server::new();
    let guard = any_request(&mut server);

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = write_watchlist(dir.path(), &[("golang", "go")]);

    cargo_bin_cmd!("release-watch")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .env_remove("CLIENT_ID")
        .env_remove("CLIENT_SECRET")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("CLIENT_ID"))
        .stderr(predicate::str::contains("CLIENT_SECRET"));

    guard.assert();
}

#[test]
fn rejected_credentials_abort_the_run() {
    let mut server = Server::new();
    server
        .mock("GET", "/repos/golang/go/releases")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Bad credentials"}"#)
        .create();

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = write_watchlist(dir.path(), &[("golang", "go")]);

    cargo_bin_cmd!("release-watch")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .env("CLIENT_ID", "wrong")
        .env("CLIENT_SECRET", "wrong")
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Bad credentials"))
        .stdout(predicate::str::contains("APP").not());
}

#[test]
fn server_error_for_one_repository_does_not_fail_the_run() {
    let mut server = Server::new();
    mock_releases(
        &mut server,
        "golang",
        "go",
        &release_json("go1.22.1", "2024-03-05T18:00:00Z", "https://example.com/go.tar.gz"),
    );
    server
        .mock("GET", "/repos/acme/flaky/releases")
        .with_status(500)
        .with_body("internal error")
        .create();

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = write_watchlist(dir.path(), &[("golang", "go"), ("acme", "flaky")]);

    cargo_bin_cmd!("release-watch")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .env("CLIENT_ID", "test-id")
        .env("CLIENT_SECRET", "test-secret")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "failed to fetch releases for acme/flaky",
        ))
        .stdout(predicate::str::contains("| go "));
}

#[test]
fn check_validates_everything_without_requests() {
    let mut server = Server::new();
    let guard = any_request(&mut server);

    let dir = tempdir().unwrap();
    let config = write_config(dir.path(), &server.url(), "");
    let watchlist = write_watchlist(dir.path(), &[("golang", "go"), ("rust-lang", "rust")]);

    cargo_bin_cmd!("release-watch")
        .arg("check")
        .arg("--config")
        .arg(&config)
        .arg("--watchlist")
        .arg(&watchlist)
        .env("CLIENT_ID", "test-id")
        .env("CLIENT_SECRET", "test-secret")
        .assert()
        .success()
        .stdout(predicate::str::contains("repositories: 2"))
        .stdout(predicate::str::contains("credentials: ok (client id: test-id)"));

    guard.assert();
}

#[test]
fn config_path_reports_explicit_source() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("missing.toml");

    cargo_bin_cmd!("release-watch")
        .arg("config")
        .arg("path")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("(source: --config)"))
        .stdout(predicate::str::contains("missing, defaults apply"));
}
