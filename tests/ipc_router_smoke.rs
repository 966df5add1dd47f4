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
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[test]
fn requests_before_workspace_select_are_refused() {
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("version").and_then(|v| v.as_str()).is_some());
    assert!(health.get("workspacePath").map(|v| v.is_null()).unwrap_or(false));

    let resp = request(&mut stdin, &mut reader, "2", "students.add", json!({ "name": "Asha" }));
    assert_eq!(error_code(&resp), Some("no_workspace"));

    let resp = request(&mut stdin, &mut reader, "3", "nope.method", json!({}));
    assert_eq!(error_code(&resp), Some("not_implemented"));

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn full_gradebook_flow_over_ipc() {
    let workspace = temp_dir("gradebook-ipc-flow");
    let csv_out = workspace.join("out").join("results.csv");
    let bundle_out = workspace.join("out").join("backup.zip");

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let added = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "students.add",
        json!({ "name": " Asha " }),
    );
    assert_eq!(added.get("applied"), Some(&json!(true)));
    assert_eq!(added.get("index"), Some(&json!(0)));
    let _ = request_ok(&mut stdin, &mut reader, "3", "students.add", json!({ "name": "Ben" }));

    let blank = request_ok(&mut stdin, &mut reader, "4", "students.add", json!({ "name": "  " }));
    assert_eq!(blank.get("applied"), Some(&json!(false)));
    assert_eq!(blank.get("reason"), Some(&json!("blank_name")));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "subjects.add",
        json!({ "name": "Math", "total": 50 }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "6",
        "subjects.add",
        json!({ "name": "Science", "total": "100" }),
    );
    let bad_total = request_ok(
        &mut stdin,
        &mut reader,
        "7",
        "subjects.add",
        json!({ "name": "Art", "total": 0 }),
    );
    assert_eq!(bad_total.get("reason"), Some(&json!("invalid_total")));

    let early = request_ok(&mut stdin, &mut reader, "8", "results.compute", json!({}));
    assert_eq!(early.get("reason"), Some(&json!("no_marks")));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "marks.set",
        json!({ "studentIndex": 0, "subject": "Math", "value": "40" }),
    );
    let set = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "marks.set",
        json!({ "studentIndex": 0, "subject": "Science", "value": 80 }),
    );
    assert_eq!(set.get("canCompute"), Some(&json!(true)));
    let rejected = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "marks.set",
        json!({ "studentIndex": 1, "subject": "Science", "value": "150" }),
    );
    assert_eq!(rejected.get("reason"), Some(&json!("out_of_range")));

    let missing = request(
        &mut stdin,
        &mut reader,
        "12",
        "students.rename",
        json!({ "index": 9, "name": "Ghost" }),
    );
    assert_eq!(error_code(&missing), Some("not_found"));

    let missing_blank = request(
        &mut stdin,
        &mut reader,
        "12b",
        "students.rename",
        json!({ "index": 99, "name": " " }),
    );
    assert_eq!(error_code(&missing_blank), Some("not_found"));

    let missing_subject = request(
        &mut stdin,
        &mut reader,
        "12c",
        "subjects.edit",
        json!({ "index": 99, "name": "Art", "total": "abc" }),
    );
    assert_eq!(error_code(&missing_subject), Some("not_found"));

    let computed = request_ok(&mut stdin, &mut reader, "13", "results.compute", json!({}));
    let results = computed
        .get("results")
        .and_then(|v| v.as_array())
        .expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].get("student"), Some(&json!("Asha")));
    assert_eq!(results[0].get("rank"), Some(&json!(1)));
    assert_eq!(results[0].get("average").and_then(|v| v.as_f64()), Some(16.0));
    assert_eq!(results[0].get("totalMarks").and_then(|v| v.as_f64()), Some(120.0));
    assert_eq!(computed.get("classAverage").and_then(|v| v.as_f64()), Some(8.0));
    assert_eq!(computed.get("passPercentage").and_then(|v| v.as_f64()), Some(50.0));

    let model = request_ok(&mut stdin, &mut reader, "14", "report.model", json!({}));
    assert_eq!(
        model.pointer("/model/classAverage"),
        Some(&json!("8.00"))
    );
    let exported = request_ok(
        &mut stdin,
        &mut reader,
        "15",
        "report.export",
        json!({ "outPath": csv_out.to_string_lossy(), "format": "csv" }),
    );
    assert_eq!(exported.get("rowCount"), Some(&json!(2)));
    let csv = std::fs::read_to_string(&csv_out).expect("read csv");
    assert!(csv.starts_with("Rank,Student,Total Marks,Average (/20)\n1,Asha,120.00,16.00\n"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "16",
        "backup.export",
        json!({ "outPath": bundle_out.to_string_lossy() }),
    );

    let removed = request_ok(
        &mut stdin,
        &mut reader,
        "17",
        "subjects.remove",
        json!({ "index": 0 }),
    );
    assert_eq!(removed.pointer("/removed/name"), Some(&json!("Math")));
    let book = request_ok(&mut stdin, &mut reader, "18", "gradebook.get", json!({}));
    assert_eq!(
        book.pointer("/students/0/marks"),
        Some(&json!({ "Science": 80.0 }))
    );

    let _ = request_ok(&mut stdin, &mut reader, "19", "gradebook.reset", json!({}));
    let empty = request_ok(&mut stdin, &mut reader, "20", "students.list", json!({}));
    assert_eq!(empty.get("students"), Some(&json!([])));
    let results = request_ok(&mut stdin, &mut reader, "21", "results.get", json!({}));
    assert!(results.get("results").map(|v| v.is_null()).unwrap_or(false));

    let imported = request_ok(
        &mut stdin,
        &mut reader,
        "22",
        "backup.import",
        json!({ "inPath": bundle_out.to_string_lossy() }),
    );
    assert_eq!(imported.get("studentCount"), Some(&json!(2)));
    assert_eq!(imported.get("subjectCount"), Some(&json!(2)));

    drop(stdin);
    let _ = child.wait();

    // A fresh process sees the imported state through the workspace store.
    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let book = request_ok(&mut stdin, &mut reader, "2", "gradebook.get", json!({}));
    assert_eq!(book.pointer("/students/0/name"), Some(&json!("Asha")));
    assert_eq!(
        book.pointer("/students/0/marks"),
        Some(&json!({ "Math": 40.0, "Science": 80.0 }))
    );
    assert_eq!(book.get("canCompute"), Some(&json!(true)));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
