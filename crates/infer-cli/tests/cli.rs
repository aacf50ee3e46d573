use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

fn infer() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("infer"))
}

#[test]
fn help_mentions_both_commands() {
    infer().arg("--help").assert().success().stdout(
        predicate::str::contains("classpath").and(predicate::str::contains("docpath")),
    );
}

#[test]
fn empty_workspace_prints_an_empty_json_array() {
    let temp = TempDir::new().unwrap();

    let output = infer()
        .arg("classpath")
        .arg(temp.path())
        .arg("--json")
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let v: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(v.as_array().unwrap().is_empty());
}

#[test]
fn external_dependencies_from_workspace_config() {
    let temp = TempDir::new().unwrap();
    let repo = TempDir::new().unwrap();
    repo.child("repository/junit/junit/4.13.2")
        .create_dir_all()
        .unwrap();
    let jar = repo.child("repository/junit/junit/4.13.2/junit-4.13.2.jar");
    jar.touch().unwrap();
    let sources = repo.child("repository/junit/junit/4.13.2/junit-4.13.2-sources.jar");
    sources.touch().unwrap();
    temp.child(".infer.toml")
        .write_str(&format!(
            "external_dependencies = [\"junit:junit:4.13.2\"]\nmaven_home = {:?}\n",
            repo.path().display().to_string()
        ))
        .unwrap();

    infer()
        .arg("classpath")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(format!("{}\n", jar.path().display()));

    infer()
        .arg("docpath")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(format!("{}\n", sources.path().display()));
}

#[test]
fn malformed_config_exits_with_code_two() {
    let temp = TempDir::new().unwrap();
    let config = temp.child("custom.toml");
    config.write_str("external_dependencies = 3\n").unwrap();

    infer()
        .arg("classpath")
        .arg(temp.path())
        .arg("--config")
        .arg(config.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("custom.toml"));
}
