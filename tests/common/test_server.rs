use std::path::Path;
use std::process::{Child, Command, Stdio};

use tempfile::TempDir;

use super::{TEST_DOMAIN, run_admin};

pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    server_process: Option<Child>,
}

impl TestServer {
    /// Starts a server over a fresh store holding the domain `127.0.0.1`
    /// with the user `alice` / `pw1`.
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let data_dir = temp_dir.path();

        run_admin(data_dir, &["migrate-schema"], None);
        run_admin(
            data_dir,
            &["create-domain", "--domain", TEST_DOMAIN, "--forum-name", "Test Forum"],
            None,
        );
        run_admin(
            data_dir,
            &["create-user", "--domain", TEST_DOMAIN, "--username", "alice", "--password-stdin"],
            Some("pw1\n"),
        );

        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        drop(listener);

        let base_url = format!("http://127.0.0.1:{}", port);

        let server_process = Command::new(env!("CARGO_BIN_EXE_orangeforum"))
            .arg("--data-dir")
            .arg(data_dir)
            .args(["serve", "--host", "127.0.0.1", "--port"])
            .arg(port.to_string())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        Self::wait_for_ready(&base_url).await;

        Self {
            temp_dir,
            base_url,
            server_process: Some(server_process),
        }
    }

    async fn wait_for_ready(base_url: &str) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/health", base_url))
                .send()
                .await
                .is_ok()
            {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready");
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Runs an admin subcommand against the live server's store.
    pub fn admin(&self, args: &[&str]) {
        run_admin(self.data_dir(), args, None);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.server_process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
