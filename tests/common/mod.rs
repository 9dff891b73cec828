#![allow(dead_code)]

mod test_server;

pub use test_server::TestServer;

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

pub const TEST_DOMAIN: &str = "127.0.0.1";

/// Runs the binary against `data_dir` in non-interactive mode, feeding `stdin`.
pub fn run_admin(data_dir: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_orangeforum"))
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--non-interactive")
        .args(args)
        .env("RUST_LOG", "off")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn orangeforum");

    if let Some(input) = stdin {
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(input.as_bytes())
            .expect("write stdin");
    }

    let output = child.wait_with_output().expect("wait for orangeforum");
    assert!(
        output.status.success(),
        "orangeforum {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    output
}
