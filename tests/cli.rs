//! CLI integration tests for schema and domain commands.
//!
//! Each test uses an isolated temp directory for the database, ensuring tests
//! can run in parallel safely.

#![allow(deprecated)] // Command::cargo_bin deprecation only affects custom build dirs

use std::path::Path;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;

use orangeforum::store::{LATEST_VERSION, SqliteStore, Store};

struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("orangeforum").expect("failed to find binary");
        cmd.env("NO_COLOR", "1")
            .env("RUST_LOG", "off")
            .arg("--data-dir")
            .arg(self.data_dir())
            .arg("--non-interactive");
        cmd
    }

    fn migrate(&self) -> assert_cmd::assert::Assert {
        self.cmd().arg("migrate-schema").assert()
    }

    fn create_domain(&self, domain: &str) -> assert_cmd::assert::Assert {
        self.cmd()
            .args(["create-domain", "--domain", domain, "--forum-name", "Forum"])
            .assert()
    }

    fn info_json(&self) -> Value {
        let output = self
            .cmd()
            .args(["info", "--json"])
            .output()
            .expect("failed to run command");

        serde_json::from_slice(&output.stdout).expect("failed to parse JSON")
    }
}

#[test]
fn test_migrate_fresh_store() {
    let ctx = TestContext::new();

    ctx.migrate()
        .success()
        .stdout(predicate::str::contains("Applied schema version 0"))
        .stdout(predicate::str::contains(format!(
            "Applied schema version {LATEST_VERSION}"
        )));

    ctx.temp_dir
        .child("orangeforum.db")
        .assert(predicate::path::exists());
}

#[test]
fn test_migrate_twice_fails_loudly() {
    let ctx = TestContext::new();
    ctx.migrate().success();

    let db = ctx.data_dir().join("orangeforum.db");
    let before = schema_dump(&db);

    ctx.migrate()
        .failure()
        .stderr(predicate::str::contains("already up-to-date"));

    assert_eq!(schema_dump(&db), before);
}

fn schema_dump(db: &Path) -> Vec<String> {
    let store = SqliteStore::new(db).expect("open store");
    let conn = store.connection();
    let mut stmt = conn
        .prepare("SELECT sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY name")
        .expect("prepare");
    let sql = stmt
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("collect");
    sql
}

#[test]
fn test_commands_require_migrated_store() {
    let ctx = TestContext::new();

    ctx.create_domain("a.example")
        .failure()
        .stderr(predicate::str::contains("migrate-schema"));
}

#[test]
fn test_create_domain_twice() {
    let ctx = TestContext::new();
    ctx.migrate().success();

    ctx.create_domain("a.example")
        .success()
        .stdout(predicate::str::contains("Created domain \"a.example\""));
    ctx.create_domain("a.example")
        .failure()
        .stderr(predicate::str::contains("domain already exists"));

    let info = ctx.info_json();
    assert_eq!(info["domains"].as_array().unwrap().len(), 1);
}

#[test]
fn test_invalid_domain_name() {
    let ctx = TestContext::new();
    ctx.migrate().success();

    ctx.create_domain("bad host").failure();
}

#[test]
fn test_non_interactive_requires_flags() {
    let ctx = TestContext::new();
    ctx.migrate().success();

    ctx.cmd()
        .args(["create-domain", "--forum-name", "Forum"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--domain is required"));
}

#[test]
fn test_rename_and_list_domains() {
    let ctx = TestContext::new();
    ctx.migrate().success();
    ctx.create_domain("a.example").success();

    ctx.cmd()
        .args(["rename-domain", "--domain", "a.example", "--new-name", "b.example"])
        .assert()
        .success();

    let output = ctx
        .cmd()
        .args(["list-domains", "--json"])
        .output()
        .unwrap();
    let domains: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(domains[0]["domain_name"], "b.example");

    ctx.cmd()
        .args(["rename-domain", "--domain", "a.example", "--new-name", "c.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_flags_show_in_info() {
    let ctx = TestContext::new();
    ctx.migrate().success();
    ctx.create_domain("a.example").success();

    ctx.cmd()
        .args(["enable-readonly", "--domain", "a.example"])
        .assert()
        .success();
    ctx.cmd()
        .args(["disable-signup", "--domain", "a.example"])
        .assert()
        .success();
    ctx.cmd()
        .args(["set-forum-name", "--domain", "a.example", "--forum-name", "Alpha"])
        .assert()
        .success();

    let info = ctx.info_json();
    assert_eq!(info["schema_version"], LATEST_VERSION);
    let domain = &info["domains"][0]["domain"];
    assert_eq!(domain["read_only"], true);
    assert_eq!(domain["signup_disabled"], true);
    assert_eq!(domain["forum_name"], "Alpha");

    ctx.cmd()
        .args(["disable-readonly", "--domain", "a.example"])
        .assert()
        .success();
    assert_eq!(ctx.info_json()["domains"][0]["domain"]["read_only"], false);
}

#[test]
fn test_set_config_and_redaction() {
    let ctx = TestContext::new();
    ctx.migrate().success();
    ctx.create_domain("a.example").success();

    ctx.cmd()
        .args(["set-config", "--domain", "a.example", "--key", "smtp_pass", "--value", "hunter2"])
        .assert()
        .success();
    ctx.cmd()
        .args(["set-config", "--domain", "a.example", "--key", "version", "--value", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));

    ctx.cmd()
        .args(["info"])
        .assert()
        .success()
        .stdout(predicate::str::contains("smtp_pass"))
        .stdout(predicate::str::contains("hunter2").not());

    let info = ctx.info_json();
    let entry = &info["domains"][0]["config"][0];
    assert_eq!(entry["key"], "smtp_pass");
    assert_eq!(entry["value"], "********");
}

#[test]
fn test_delete_domain_requires_confirmation() {
    let ctx = TestContext::new();
    ctx.migrate().success();
    ctx.create_domain("a.example").success();

    ctx.cmd()
        .args(["delete-domain", "--domain", "a.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));

    ctx.cmd()
        .args(["delete-domain", "--domain", "a.example", "--yes"])
        .assert()
        .success();

    let store = SqliteStore::new(ctx.data_dir().join("orangeforum.db")).unwrap();
    assert!(store.list_domains().unwrap().is_empty());
}

#[test]
fn test_config_file_moves_database() {
    let ctx = TestContext::new();
    let config = ctx.temp_dir.child("forum.toml");
    let db = ctx.data_dir().join("custom.db");
    config
        .write_str(&format!("[store]\npath = {:?}\n", db.to_string_lossy()))
        .unwrap();

    ctx.cmd()
        .arg("--config")
        .arg(config.path())
        .arg("migrate-schema")
        .assert()
        .success();

    assert!(db.exists());
    ctx.temp_dir
        .child("orangeforum.db")
        .assert(predicate::path::missing());
}
