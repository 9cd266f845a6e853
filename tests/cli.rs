use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn get_serpent_binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_serpent"))
}

/// A script file in the temp directory, removed on drop.
struct TempScript {
    path: PathBuf,
}

impl TempScript {
    fn new(name: &str, contents: &str) -> Self {
        let path = std::env::temp_dir().join(format!("serpent-cli-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).expect("Failed to write temp script");
        TempScript { path }
    }
}

impl Drop for TempScript {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = get_serpent_binary()
        .args(args)
        .arg("--color=never")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn serpent");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for serpent")
}

#[test]
fn test_version_flag() {
    let output = get_serpent_binary().arg("--version").output().expect("Failed to execute serpent");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("serpent"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_eval_prints() {
    let output = get_serpent_binary()
        .args(["-e", "let x = 6; print(\"x*7 =\", x * 7);"])
        .output()
        .expect("Failed to execute serpent");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "x*7 = 42\n");
}

#[test]
fn test_runs_script_file() {
    let script = TempScript::new(
        "fact.sp",
        "func fact(n) { if n <= 1 { return 1; } return n * fact(n - 1); }\nprint(fact(10));\n",
    );
    let output = get_serpent_binary().arg(&script.path).output().expect("Failed to execute serpent");

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "3628800\n");
}

#[test]
fn test_missing_script_fails() {
    let output = get_serpent_binary()
        .args(["--color", "never", "/definitely/not/here.sp"])
        .output()
        .expect("Failed to execute serpent");

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("Failed to read"));
}

#[test]
fn test_parse_error_exit_code() {
    let output = get_serpent_binary()
        .args(["--color", "never", "-e", "let = 5;"])
        .output()
        .expect("Failed to execute serpent");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error[E0101]"), "{}", stderr);
    assert!(stderr.contains("<eval>:1:5"), "{}", stderr);
}

#[test]
fn test_runtime_error_keeps_earlier_output() {
    let output = get_serpent_binary()
        .args(["--color", "never", "-e", "print(\"before\"); print(missing);"])
        .output()
        .expect("Failed to execute serpent");

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "before\n");
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("error[E0201]: Undefined variable: missing"), "{}", stderr);
}

#[test]
fn test_max_depth_flag() {
    let output = get_serpent_binary()
        .args(["--color", "never", "--max-depth", "10", "-e", "func f(n) { return f(n + 1); } f(0);"])
        .output()
        .expect("Failed to execute serpent");

    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("E0205"));
}

#[test]
fn test_dump_ast_then_run_ast() {
    let output = get_serpent_binary()
        .args(["--dump-ast", "-e", "let greeting = \"hi\"; print(greeting + \"!\");"])
        .output()
        .expect("Failed to execute serpent");
    assert!(output.status.success());
    let dumped = String::from_utf8(output.stdout).unwrap();
    assert!(dumped.contains("\"VariableDeclaration\""));
    serde_json::from_str::<serde_json::Value>(&dumped).expect("dump should be valid JSON");

    let ast = TempScript::new("greeting.json", &dumped);
    let output = get_serpent_binary()
        .arg("--ast")
        .arg(&ast.path)
        .output()
        .expect("Failed to execute serpent");
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "hi!\n");
}

#[test]
fn test_ast_with_unknown_node() {
    let ast = TempScript::new("unknown.json", r#"[{"type": "YieldStatement"}]"#);
    let output = get_serpent_binary()
        .args(["--color", "never", "--ast"])
        .arg(&ast.path)
        .output()
        .expect("Failed to execute serpent");

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("YieldStatement"), "{}", stderr);
}

#[test]
fn test_eval_conflicts_with_script() {
    let output = get_serpent_binary()
        .args(["-e", "1;", "script.sp"])
        .output()
        .expect("Failed to execute serpent");
    assert!(!output.status.success());
}

#[test]
fn test_completions() {
    let output = get_serpent_binary()
        .args(["complete", "bash"])
        .output()
        .expect("Failed to execute serpent");

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("serpent"));
}

#[test]
fn test_repl_session() {
    let output = run_with_stdin(&[], "let total = 2;\ntotal * 21;\nprint(\"done\");\nexit\n");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("interactive mode"));
    assert!(stdout.contains("42\n"));
    assert!(stdout.contains("done\n"));
}

#[test]
fn test_repl_reports_errors_and_continues() {
    let output = run_with_stdin(&[], "oops;\nprint(\"still here\");\n");

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout).unwrap().contains("still here"));
    assert!(String::from_utf8(output.stderr).unwrap().contains("Undefined variable: oops"));
}
