mod test_support;

use serde_json::json;
use test_support::{request, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("tutorcontent-router-smoke");
    let bundle_out = workspace.join("out").join("smoke.zip");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let calls = [
        ("1", "health", json!({})),
        ("2", "workspace.select", json!({ "path": workspace.join("oatutor").to_string_lossy() })),
        ("3", "courses.create", json!({ "courseName": "Smoke Course" })),
        ("4", "courses.list", json!({})),
        ("5", "skills.upsert", json!({ "skillId": "smoke_skill" })),
        ("6", "skills.list", json!({})),
        ("7", "skills.search", json!({ "query": "smoke" })),
        ("8", "objectives.add", json!({ "skillId": "smoke_skill" })),
        ("9", "objectives.list", json!({})),
        ("10", "lessons.preview", json!({ "id": "l1", "name": "Lesson 1" })),
        ("11", "lessons.create", json!({ "courseName": "Smoke Course", "id": "l1", "name": "Lesson 1" })),
        ("12", "lessons.list", json!({})),
        ("13", "objectives.clear", json!({})),
        ("14", "problems.preview", json!({ "title": "Smoke Problem" })),
        ("15", "problems.create", json!({ "title": "Smoke Problem", "hints": ["h"] })),
        ("16", "problems.list", json!({})),
        ("17", "problems.open", json!({ "problemId": "smoke_problem" })),
        ("18", "backup.exportContentBundle", json!({ "outPath": bundle_out.to_string_lossy() })),
        ("19", "backup.importContentBundle", json!({ "inPath": bundle_out.to_string_lossy() })),
    ];
    for (id, method, params) in calls {
        let value = request(&mut stdin, &mut reader, id, method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            value
        );
    }

    let unknown = request(&mut stdin, &mut reader, "20", "classes.list", json!({}));
    assert_eq!(
        unknown
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn garbage_line_gets_bad_json_and_session_continues() {
    use std::io::{BufRead, Write};

    let (mut child, mut stdin, mut reader) = spawn_sidecar();
    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read reply");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("reply is json");
    assert_eq!(value["error"]["code"], "bad_json");

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["ok"], true);
    assert!(health["result"]["workspacePath"].is_null());

    drop(stdin);
    let _ = child.wait();
}
