// CLI integration tests for the add/list/tags/seed/info flows.
use std::process::Command;

use serde_json::Value;

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_swatchbook");
    Command::new(exe)
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

#[test]
fn add_list_tags_flow() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("book");

    let add = cmd()
        .args([
            "--dir",
            dir.to_str().unwrap(),
            "add",
            "#1FA2FF",
            "#12d8fa",
            "#a6ffcb",
            "--tag",
            "sea",
            "--tag",
            "calm",
            "--json",
        ])
        .output()
        .expect("add");
    assert!(add.status.success());
    let added = parse_json(std::str::from_utf8(&add.stdout).expect("utf8"));
    let id = added["id"].as_str().expect("id");
    assert_eq!(id.len(), 24);
    assert_eq!(added["colors"][0], "#1fa2ff");
    assert_eq!(added["tags"][1], "calm");
    assert!(added["createdAt"].as_str().expect("createdAt").contains('T'));

    let list = cmd()
        .args(["--dir", dir.to_str().unwrap(), "list", "--json"])
        .output()
        .expect("list");
    assert!(list.status.success());
    let listed = parse_json(std::str::from_utf8(&list.stdout).expect("utf8"));
    assert_eq!(listed["pagination"]["total"], 1);
    assert_eq!(listed["pagination"]["pages"], 1);
    assert_eq!(listed["pagination"]["hasMore"], false);
    assert_eq!(listed["results"][0]["id"], id);

    let tags = cmd()
        .args(["--dir", dir.to_str().unwrap(), "tags", "--json"])
        .output()
        .expect("tags");
    assert!(tags.status.success());
    let tags_json = parse_json(std::str::from_utf8(&tags.stdout).expect("utf8"));
    assert_eq!(tags_json, serde_json::json!(["calm", "sea"]));
}

#[test]
fn list_filters_combine() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("book");
    let dir_arg = dir.to_str().unwrap();

    for (color, tag) in [("#101010", "dark"), ("#a0c4ff", "pastel"), ("#b0e0a8", "pastel")] {
        let add = cmd()
            .args([
                "--dir", dir_arg, "add", color, "#222222", "#333333", "--tag", tag,
            ])
            .output()
            .expect("add");
        assert!(add.status.success());
    }

    let filtered = cmd()
        .args([
            "--dir", dir_arg, "list", "--tag", "pastel", "--search", "PAST", "--json",
        ])
        .output()
        .expect("list");
    assert!(filtered.status.success());
    let listed = parse_json(std::str::from_utf8(&filtered.stdout).expect("utf8"));
    assert_eq!(listed["pagination"]["total"], 2);

    let none = cmd()
        .args([
            "--dir", dir_arg, "list", "--tag", "dark", "--search", "past", "--json",
        ])
        .output()
        .expect("list");
    assert!(none.status.success());
    let listed = parse_json(std::str::from_utf8(&none.stdout).expect("utf8"));
    assert_eq!(listed["pagination"]["total"], 0);
}

#[test]
fn validation_exit_code_and_json_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("book");

    let add = cmd()
        .args([
            "--dir",
            dir.to_str().unwrap(),
            "add",
            "#111111",
            "#222222",
        ])
        .output()
        .expect("add");
    assert_eq!(add.status.code().unwrap(), 3);
    // stderr is not a terminal here, so the error is machine-readable JSON
    let err = parse_json(std::str::from_utf8(&add.stderr).expect("utf8"));
    assert_eq!(err["error"]["kind"], "Validation");
    assert!(err["error"]["message"].is_string());

    // A rejected palette leaves no store behind.
    let list = cmd()
        .args(["--dir", dir.to_str().unwrap(), "list", "--json"])
        .output()
        .expect("list");
    assert!(list.status.success());
    let listed = parse_json(std::str::from_utf8(&list.stdout).expect("utf8"));
    assert_eq!(listed["pagination"]["total"], 0);
}

#[test]
fn usage_exit_code() {
    let unknown = cmd().args(["definitely-not-a-command"]).output().expect("run");
    assert_eq!(unknown.status.code().unwrap(), 2);

    let bad_flag = cmd()
        .args(["list", "--page", "not-a-number"])
        .output()
        .expect("run");
    assert_eq!(bad_flag.status.code().unwrap(), 2);
}

#[test]
fn corrupt_store_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("book");
    std::fs::create_dir_all(&dir).expect("mkdir");
    std::fs::write(dir.join("palettes.jsonl"), "{ not a palette\n").expect("write");

    let list = cmd()
        .args(["--dir", dir.to_str().unwrap(), "list", "--json"])
        .output()
        .expect("list");
    assert_eq!(list.status.code().unwrap(), 7);
    let err = parse_json(std::str::from_utf8(&list.stderr).expect("utf8"));
    assert_eq!(err["error"]["kind"], "Corrupt");
    assert_eq!(err["error"]["line"], 1);
}

#[test]
fn seed_generates_valid_palettes() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("book");

    let seed = cmd()
        .args([
            "--dir",
            dir.to_str().unwrap(),
            "seed",
            "--count",
            "7",
            "--scheme",
            "triadic",
            "--json",
        ])
        .output()
        .expect("seed");
    assert!(seed.status.success());
    let created = parse_json(std::str::from_utf8(&seed.stdout).expect("utf8"));
    let created = created.as_array().expect("array");
    assert_eq!(created.len(), 7);
    for palette in created {
        let colors = palette["colors"].as_array().expect("colors");
        assert!((3..=5).contains(&colors.len()));
        let tags: Vec<&str> = palette["tags"]
            .as_array()
            .expect("tags")
            .iter()
            .map(|t| t.as_str().expect("tag"))
            .collect();
        assert!(tags.contains(&"triadic"));
    }

    let info = cmd()
        .args(["--dir", dir.to_str().unwrap(), "info", "--json"])
        .output()
        .expect("info");
    assert!(info.status.success());
    let info_json = parse_json(std::str::from_utf8(&info.stdout).expect("utf8"));
    assert_eq!(info_json["palettes"], 7);
    assert!(
        info_json["path"]
            .as_str()
            .expect("path")
            .ends_with("palettes.jsonl")
    );
}

#[test]
fn env_var_selects_data_dir() {
    let temp = tempfile::tempdir().expect("tempdir");
    let dir = temp.path().join("from-env");

    let add = cmd()
        .env("SWATCHBOOK_DIR", &dir)
        .args(["add", "#111111", "#222222", "#333333"])
        .output()
        .expect("add");
    assert!(add.status.success());
    assert!(dir.join("palettes.jsonl").exists());

    // --dir wins over the environment
    let other = temp.path().join("from-flag");
    let add = cmd()
        .env("SWATCHBOOK_DIR", &dir)
        .args([
            "--dir",
            other.to_str().unwrap(),
            "add",
            "#444444",
            "#555555",
            "#666666",
        ])
        .output()
        .expect("add");
    assert!(add.status.success());
    assert!(other.join("palettes.jsonl").exists());
}

#[test]
fn version_json_on_pipe() {
    let version = cmd().args(["version"]).output().expect("version");
    assert!(version.status.success());
    let value = parse_json(std::str::from_utf8(&version.stdout).expect("utf8"));
    assert_eq!(value["name"], "swatchbook");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn completion_emits_script() {
    let completion = cmd().args(["completion", "bash"]).output().expect("completion");
    assert!(completion.status.success());
    let script = String::from_utf8_lossy(&completion.stdout);
    assert!(script.contains("swatchbook"));
}
