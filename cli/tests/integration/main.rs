use std::{
    io::Write,
    process::{Command, Output, Stdio},
};

fn rrbseq(args: &[&str], stdin: &str) -> Output {
    let bin = env!("CARGO_BIN_EXE_rrbseq");
    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("rrbseq should be runnable");
    let mut input = child
        .stdin
        .take()
        .expect("couldn't retrieve stdin handle to rrbseq");
    input
        .write_all(stdin.as_bytes())
        .expect("writing into rrbseq stdin should work");
    drop(input);

    child.wait_with_output().expect("rrbseq should terminate")
}

#[test]
fn run_script_from_stdin() {
    let output = rrbseq(
        &["run", "--check"],
        r#"[
            { "op": "range", "start": 0, "end": 100 },
            { "op": "take", "count": 2 },
            { "op": "report" }
        ]"#,
    );
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("step 3: [0, 1]\n"));
}

#[test]
fn failed_expectation_exits_with_an_error() {
    let output = rrbseq(&["run"], r#"[{ "op": "expect_len", "len": 1 }]"#);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("step 1: expected 1, got 0"));
}

#[test]
fn shape_as_json() {
    let output = rrbseq(&["shape", "--len", "2000", "--format", "json"], "");
    assert!(output.status.success());
    let shape: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shape["length"], 2000);
    assert_eq!(shape["relaxed_nodes"], 0);
}
