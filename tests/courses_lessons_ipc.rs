mod test_support;

use serde_json::json;
use test_support::{read_json, request_err, request_ok, select_workspace, spawn_sidecar, temp_dir};

#[test]
fn courses_require_workspace_and_name() {
    let workspace = temp_dir("tutorcontent-courses");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "courses.create",
        json!({ "courseName": "Algebra" }),
    );
    assert_eq!(code, "no_workspace");

    select_workspace(&mut stdin, &mut reader, &workspace);
    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "courses.create",
        json!({ "courseName": "  " }),
    );
    assert_eq!(code, "missing_field");
    assert!(!workspace.join("coursePlans.json").exists());

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "courses.create",
        json!({
            "courseName": "Algebra",
            "courseOER": "https://openstax.org/algebra",
            "courseLicense": "CC BY 4.0"
        }),
    );
    assert_eq!(created["course"]["lessons"], json!([]));

    let listed = request_ok(&mut stdin, &mut reader, "4", "courses.list", json!({}));
    assert_eq!(listed["courses"][0]["courseName"], "Algebra");
    assert_eq!(listed["courses"][0]["lessonCount"], 0);

    let stored = read_json(&workspace.join("coursePlans.json"));
    assert_eq!(stored[0]["courseLicense"], "CC BY 4.0");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "5",
        "courses.create",
        json!({ "courseName": "Algebra", "collisionPolicy": "reject" }),
    );
    assert_eq!(code, "collision");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn lesson_commit_uses_and_resets_objective_draft() {
    let workspace = temp_dir("tutorcontent-lessons");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "courses.create",
        json!({ "courseName": "Algebra" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "skills.upsert",
        json!({ "skillId": "lcm" }),
    );
    let before = std::fs::read(workspace.join("coursePlans.json")).expect("read plans");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "3",
        "lessons.create",
        json!({ "courseName": "Algebra", "id": "lesson1", "name": "Lesson 1.1" }),
    );
    assert_eq!(code, "missing_field");
    assert_eq!(
        std::fs::read(workspace.join("coursePlans.json")).expect("read plans"),
        before
    );

    let draft = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "objectives.add",
        json!({ "skillId": "lcm" }),
    );
    assert_eq!(draft["learningObjectives"]["lcm"], 0.85);
    assert_eq!(draft["knownSkills"], json!(["lcm"]));
    let draft = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "objectives.add",
        json!({ "skillId": "gcf", "weight": 0.4 }),
    );
    assert_eq!(draft["count"], 2);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "6",
        "objectives.add",
        json!({ "skillId": "gcf", "weight": 1.5 }),
    );
    assert_eq!(code, "invalid_field");

    let code = request_err(
        &mut stdin,
        &mut reader,
        "7",
        "lessons.create",
        json!({ "courseName": "Missing", "id": "lesson1", "name": "Lesson 1.1" }),
    );
    assert_eq!(code, "not_found");
    let kept = request_ok(&mut stdin, &mut reader, "8", "objectives.list", json!({}));
    assert_eq!(kept["count"], 2, "failed commit must keep the draft");

    let preview = request_ok(
        &mut stdin,
        &mut reader,
        "9",
        "lessons.preview",
        json!({ "id": "lesson1", "name": "Lesson 1.1", "topics": "Intro" }),
    );
    assert_eq!(preview["lesson"]["allowRecycle"], true);

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "lessons.create",
        json!({
            "courseName": "Algebra",
            "id": "lesson1",
            "name": "Lesson 1.1",
            "topics": "Intro",
            "allowRecycle": false
        }),
    );
    assert_eq!(created["unknownObjectives"], json!(["gcf"]));
    assert_eq!(created["lesson"]["learningObjectives"]["gcf"], 0.4);

    let after = request_ok(&mut stdin, &mut reader, "11", "objectives.list", json!({}));
    assert_eq!(after["count"], 0);

    let stored = read_json(&workspace.join("coursePlans.json"));
    let lesson = &stored[0]["lessons"][0];
    assert_eq!(lesson["id"], "lesson1");
    assert_eq!(lesson["allowRecycle"], false);
    assert_eq!(lesson["learningObjectives"], json!({ "gcf": 0.4, "lcm": 0.85 }));

    let listed = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "lessons.list",
        json!({ "courseName": "Algebra" }),
    );
    assert_eq!(listed["lessons"][0]["courseName"], "Algebra");

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn clearing_or_switching_root_empties_the_draft() {
    let workspace = temp_dir("tutorcontent-draft");
    let other = temp_dir("tutorcontent-draft-other");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "objectives.add",
        json!({ "skillId": "lcm" }),
    );
    let cleared = request_ok(&mut stdin, &mut reader, "2", "objectives.clear", json!({}));
    assert_eq!(cleared["count"], 0);

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "objectives.add",
        json!({ "skillId": "lcm" }),
    );
    select_workspace(&mut stdin, &mut reader, &other);
    let listed = request_ok(&mut stdin, &mut reader, "4", "objectives.list", json!({}));
    assert_eq!(listed["count"], 0);

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(other);
}

#[test]
fn malformed_course_plans_abort_without_rewrite() {
    let workspace = temp_dir("tutorcontent-malformed");
    std::fs::write(workspace.join("coursePlans.json"), "[{\"courseName\": ").expect("seed");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "courses.create",
        json!({ "courseName": "Algebra" }),
    );
    assert_eq!(code, "store_malformed");
    let code = request_err(&mut stdin, &mut reader, "2", "courses.list", json!({}));
    assert_eq!(code, "store_malformed");
    assert_eq!(
        std::fs::read_to_string(workspace.join("coursePlans.json")).expect("read"),
        "[{\"courseName\": "
    );

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn malformed_bkt_params_surface_from_objective_calls() {
    let workspace = temp_dir("tutorcontent-bad-bkt");
    std::fs::create_dir_all(workspace.join("bkt-params")).expect("seed dir");
    std::fs::write(workspace.join("bkt-params").join("defaultBKTParams.json"), "{ broken")
        .expect("seed");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    select_workspace(&mut stdin, &mut reader, &workspace);

    let code = request_err(
        &mut stdin,
        &mut reader,
        "1",
        "objectives.add",
        json!({ "skillId": "lcm" }),
    );
    assert_eq!(code, "store_malformed");
    let code = request_err(&mut stdin, &mut reader, "2", "objectives.list", json!({}));
    assert_eq!(code, "store_malformed");
    assert_eq!(
        std::fs::read_to_string(workspace.join("bkt-params").join("defaultBKTParams.json"))
            .expect("read"),
        "{ broken"
    );

    let _ = std::fs::remove_dir_all(workspace);
}
