use assert_cmd::Command;

fn bookshelf() -> Command {
    Command::cargo_bin("bookshelf").unwrap()
}

#[test]
fn process_url_prints_normalized_url() {
    bookshelf()
        .args([
            "process-url",
            "--url",
            "https://BYFOOD.com/food-EXPeriences?query=abc/",
            "--operation",
            "all",
        ])
        .assert()
        .success()
        .stdout("https://www.byfood.com/food-experiences\n");
}

#[test]
fn process_url_rejects_unknown_operation() {
    let output = bookshelf()
        .args(["process-url", "--url", "https://byfood.com/x", "--operation", "nope"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("`operation` must be one of: canonical, redirection, all"),
        "stderr: {}",
        stderr
    );
}
