use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const BIN: &str = env!("CARGO_BIN_EXE_termdemo");

#[test]
fn test_example_run() {
    let output = Command::new(BIN)
        .args(["--auto", "--auto-timeout=0ms", "--immediate", "--example"])
        .output()
        .expect("Failed to execute termdemo");

    assert!(
        output.status.success(),
        "termdemo failed with stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Title"), "got: {stdout}");
    assert!(stdout.contains("hello world"));
    assert!(stdout.contains("without description"));
    assert!(stdout.contains("Just a description without a command [3/3]"));
}

#[test]
fn test_select_by_index_and_no_color() {
    let output = Command::new(BIN)
        .args(["-ai", "-t", "0ms", "--no-color", "--0"])
        .output()
        .expect("Failed to execute termdemo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Title\n=====\n"), "got: {stdout}");
    assert!(!stdout.contains('\x1b'));
}

#[test]
fn test_nothing_selected() {
    let output = Command::new(BIN)
        .args(["--auto"])
        .output()
        .expect("Failed to execute termdemo");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_flag() {
    let output = Command::new(BIN)
        .arg("--unknown-flag")
        .output()
        .expect("Failed to execute termdemo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown-flag"), "got: {stderr}");
}

#[test]
fn test_help_lists_runs() {
    let output = Command::new(BIN)
        .arg("--help")
        .output()
        .expect("Failed to execute termdemo");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--example"));
    assert!(stdout.contains("--continuously"));
}

#[test]
fn test_failing_shell_exits_non_zero() {
    let output = Command::new(BIN)
        .args([
            "-ai",
            "-t",
            "0ms",
            "--example",
            "--shell",
            "shell-that-does-not-exist-12345",
        ])
        .output()
        .expect("Failed to execute termdemo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("run failed"), "got: {stderr}");
}

#[cfg(unix)]
#[test]
fn test_interrupt_exits_cleanly() {
    // Manual mode with an open stdin blocks on the first step. The binary
    // returns from main normally, so a pending stdin read must not keep it alive.
    let mut child = Command::new(BIN)
        .args(["--immediate", "--no-color", "--example"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn termdemo");

    let mut stdout = child.stdout.take().unwrap();
    let (tx, rx) = mpsc::channel();
    let reader = thread::spawn(move || {
        let mut buf = [0u8; 256];
        while let Ok(n) = stdout.read(&mut buf) {
            if n == 0 || tx.send(buf[..n].to_vec()).is_err() {
                break;
            }
        }
    });

    // The title is printed after the interrupt handler is installed.
    let mut seen = Vec::new();
    while !String::from_utf8_lossy(&seen).contains("Title") {
        let chunk = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("termdemo printed no title");
        seen.extend_from_slice(&chunk);
    }

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("Failed to run kill");
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        assert!(Instant::now() < deadline, "termdemo did not exit");
        thread::sleep(Duration::from_millis(20));
    };
    drop(child.stdin.take());

    assert!(exit.success(), "exit status: {exit}");
    reader.join().unwrap();
    seen.extend(rx.try_iter().flatten());
    let stdout = String::from_utf8_lossy(&seen);
    assert!(!stdout.contains("hello world"), "got: {stdout}");
}
