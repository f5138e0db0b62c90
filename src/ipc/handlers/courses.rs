use crate::assemble::CourseInput;
use crate::ipc::error::{content_err, ok};
use crate::ipc::helpers::{collision_policy, content, opt_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_courses_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.content.as_ref() else {
        return ok(&req.id, json!({ "courses": [] }));
    };
    match store.courses() {
        Ok(courses) => {
            let rows: Vec<_> = courses
                .iter()
                .map(|c| {
                    json!({
                        "courseName": c.course_name,
                        "courseOER": c.course_oer,
                        "courseLicense": c.course_license,
                        "lessonCount": c.lessons.len(),
                    })
                })
                .collect();
            ok(&req.id, json!({ "courses": rows }))
        }
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_courses_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match content(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let policy = match collision_policy(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let mut input = CourseInput::default();
    for (key, slot) in [
        ("courseName", &mut input.course_name),
        ("courseOER", &mut input.course_oer),
        ("courseLicense", &mut input.course_license),
    ] {
        *slot = match opt_str(&req.params, key, req) {
            Ok(v) => v,
            Err(e) => return e,
        };
    }

    match store.add_course(&input, policy) {
        Ok(course) => ok(&req.id, json!({ "course": course })),
        Err(e) => content_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_courses_list(state, req)),
        "courses.create" => Some(handle_courses_create(state, req)),
        _ => None,
    }
}
