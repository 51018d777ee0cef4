use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    serde_json::from_str(line.trim()).expect("parse response json")
}

fn select_workspace(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &PathBuf,
) {
    let resp = request(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    assert_eq!(resp["ok"], json!(true));
}

#[test]
fn upsert_same_identity_twice_keeps_one_record_at_original_position() {
    let workspace = temp_dir("gradebook-edit-upsert");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    for (id, name, math) in [("1", "Ivanov", "3"), ("2", "Petrov", "4")] {
        let resp = request(
            &mut stdin,
            &mut reader,
            id,
            "roster.upsert",
            json!({ "name": name, "className": "10A", "grades": { "math": math } }),
        );
        assert_eq!(resp["ok"], json!(true));
    }

    // Re-entering Ivanov replaces the record in place; the grades are the
    // latest ones and the position does not change.
    let resp = request(
        &mut stdin,
        &mut reader,
        "3",
        "roster.upsert",
        json!({ "name": "Ivanov", "className": "10A", "grades": { "math": "5" } }),
    );
    assert_eq!(resp["result"]["count"], json!(2));

    let listed = request(&mut stdin, &mut reader, "4", "roster.list", json!({}));
    let records = listed["result"]["records"].as_array().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["name"], json!("Ivanov"));
    assert_eq!(records[0]["grades"]["math"], json!(5));
    assert_eq!(records[1]["name"], json!("Petrov"));

    let _ = child.kill();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn upsert_rejects_missing_fields_and_bad_grades_per_field() {
    let workspace = temp_dir("gradebook-edit-validation");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    let no_name = request(
        &mut stdin,
        &mut reader,
        "1",
        "roster.upsert",
        json!({ "name": "   ", "className": "10A" }),
    );
    assert_eq!(no_name["ok"], json!(false));
    assert_eq!(no_name["error"]["code"], json!("bad_params"));
    assert_eq!(no_name["error"]["details"]["field"], json!("name"));

    let no_class = request(
        &mut stdin,
        &mut reader,
        "2",
        "roster.upsert",
        json!({ "name": "Ivanov" }),
    );
    assert_eq!(no_class["error"]["details"]["field"], json!("className"));

    let bad_grade = request(
        &mut stdin,
        &mut reader,
        "3",
        "roster.upsert",
        json!({
            "name": "Ivanov",
            "className": "10A",
            "grades": { "physics": "7" }
        }),
    );
    assert_eq!(bad_grade["ok"], json!(false));
    assert_eq!(bad_grade["error"]["details"]["field"], json!("physics"));

    // Nothing was committed by the rejected calls.
    let listed = request(&mut stdin, &mut reader, "4", "roster.list", json!({}));
    assert_eq!(listed["result"]["count"], json!(0));

    // Blank grade strings are valid and mean absent.
    let blank_ok = request(
        &mut stdin,
        &mut reader,
        "5",
        "roster.upsert",
        json!({
            "name": "Ivanov",
            "className": "10A",
            "grades": { "physics": "", "math": "4" }
        }),
    );
    assert_eq!(blank_ok["ok"], json!(true));
    let got = request(
        &mut stdin,
        &mut reader,
        "6",
        "roster.get",
        json!({ "index": 0 }),
    );
    assert_eq!(got["result"]["record"]["grades"]["physics"], json!(null));
    assert_eq!(got["result"]["record"]["grades"]["math"], json!(4));

    let _ = child.kill();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn delete_removes_by_position_and_rejects_stale_indices() {
    let workspace = temp_dir("gradebook-edit-delete");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    for (id, name) in [("1", "Ivanov"), ("2", "Petrov"), ("3", "Sidorov")] {
        let resp = request(
            &mut stdin,
            &mut reader,
            id,
            "roster.upsert",
            json!({ "name": name, "className": "10A", "grades": {} }),
        );
        assert_eq!(resp["ok"], json!(true));
    }

    let deleted = request(
        &mut stdin,
        &mut reader,
        "4",
        "roster.delete",
        json!({ "index": 1 }),
    );
    assert_eq!(deleted["result"]["removed"]["name"], json!("Petrov"));
    assert_eq!(deleted["result"]["count"], json!(2));

    let stale = request(
        &mut stdin,
        &mut reader,
        "5",
        "roster.delete",
        json!({ "index": 7 }),
    );
    assert_eq!(stale["ok"], json!(false));
    assert_eq!(stale["error"]["code"], json!("not_found"));

    let bad = request(&mut stdin, &mut reader, "6", "roster.delete", json!({}));
    assert_eq!(bad["error"]["code"], json!("bad_params"));

    let listed = request(&mut stdin, &mut reader, "7", "roster.list", json!({}));
    let names: Vec<&str> = listed["result"]["records"]
        .as_array()
        .expect("records")
        .iter()
        .map(|r| r["name"].as_str().expect("name"))
        .collect();
    assert_eq!(names, ["Ivanov", "Sidorov"]);

    let _ = child.kill();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn deleting_the_last_record_of_a_class_drops_the_class_from_stats() {
    let workspace = temp_dir("gradebook-edit-class-drop");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    for (id, name, class_name) in [("1", "Ivanov", "10A"), ("2", "Petrov", "11B")] {
        let resp = request(
            &mut stdin,
            &mut reader,
            id,
            "roster.upsert",
            json!({ "name": name, "className": class_name, "grades": { "math": "4" } }),
        );
        assert_eq!(resp["ok"], json!(true));
    }

    let deleted = request(
        &mut stdin,
        &mut reader,
        "3",
        "roster.delete",
        json!({ "index": 1 }),
    );
    assert_eq!(deleted["ok"], json!(true));

    let by_class = request(&mut stdin, &mut reader, "4", "stats.byClass", json!({}));
    let classes = by_class["result"]["classes"].as_array().expect("classes");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0]["className"], json!("10A"));

    let preview = request(&mut stdin, &mut reader, "5", "roster.preview", json!({}));
    let groups = preview["result"]["classes"].as_array().expect("classes");
    assert!(groups.iter().all(|g| g["className"] != json!("11B")));

    let _ = child.kill();
    let _ = std::fs::remove_dir_all(workspace);
}
