use crate::assemble::{self, LessonInput};
use crate::content::ContentError;
use crate::draft::DEFAULT_OBJECTIVE_WEIGHT;
use crate::ipc::error::{content_err, err, ok};
use crate::ipc::helpers::{content, opt_bool, opt_f64, opt_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

/// The skill table is re-read on every call so a broken BKT file surfaces here too.
fn objectives_view(state: &AppState) -> Result<serde_json::Value, ContentError> {
    let known: Vec<String> = match state.content.as_ref() {
        Some(c) => c.skills()?.into_keys().collect(),
        None => Vec::new(),
    };
    Ok(json!({
        "learningObjectives": state.objectives.objectives(),
        "count": state.objectives.len(),
        "knownSkills": known,
    }))
}

fn objectives_reply(state: &AppState, req: &Request) -> serde_json::Value {
    match objectives_view(state) {
        Ok(view) => ok(&req.id, view),
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_objectives_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let skill_id = match opt_str(&req.params, "skillId", req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let weight = match opt_f64(&req.params, "weight", DEFAULT_OBJECTIVE_WEIGHT, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    if let Err(e) = state.objectives.add(&skill_id, weight) {
        return content_err(&req.id, &ContentError::from(e));
    }
    objectives_reply(state, req)
}

fn handle_objectives_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    objectives_reply(state, req)
}

fn handle_objectives_clear(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.objectives.clear();
    objectives_reply(state, req)
}

fn lesson_input(req: &Request) -> Result<LessonInput, serde_json::Value> {
    Ok(LessonInput {
        id: opt_str(&req.params, "id", req)?,
        name: opt_str(&req.params, "name", req)?,
        topics: opt_str(&req.params, "topics", req)?,
        allow_recycle: opt_bool(&req.params, "allowRecycle", true, req)?,
    })
}

fn handle_lessons_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.content.as_ref() else {
        return ok(&req.id, json!({ "lessons": [] }));
    };
    let filter = match opt_str(&req.params, "courseName", req) {
        Ok(v) if v.is_empty() => None,
        Ok(v) => Some(v),
        Err(e) => return e,
    };
    match store.lessons(filter.as_deref()) {
        Ok(entries) => {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| json!({ "courseName": e.course_name, "lesson": e.lesson }))
                .collect();
            ok(&req.id, json!({ "lessons": rows }))
        }
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_lessons_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let input = match lesson_input(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match assemble::assemble_lesson(&input, &state.objectives) {
        Ok(lesson) => ok(&req.id, json!({ "lesson": lesson })),
        Err(e) => content_err(&req.id, &ContentError::from(e)),
    }
}

fn handle_lessons_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_name = match opt_str(&req.params, "courseName", req) {
        Ok(v) => v.trim().to_string(),
        Err(e) => return e,
    };
    if course_name.is_empty() {
        return err(
            &req.id,
            "missing_field",
            "courseName is required",
            Some(json!({ "field": "courseName" })),
        );
    }
    let input = match lesson_input(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let result = {
        let store = match content(state, req) {
            Ok(s) => s,
            Err(e) => return e,
        };
        store.add_lesson(&course_name, &input, &state.objectives)
    };

    match result {
        Ok(commit) => {
            let draft = std::mem::take(&mut state.objectives);
            state.objectives = draft.reset_after_commit();
            ok(
                &req.id,
                json!({
                    "courseName": course_name,
                    "lesson": commit.lesson,
                    "unknownObjectives": commit.unknown_objectives,
                }),
            )
        }
        Err(e) => content_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "objectives.add" => Some(handle_objectives_add(state, req)),
        "objectives.list" => Some(handle_objectives_list(state, req)),
        "objectives.clear" => Some(handle_objectives_clear(state, req)),
        "lessons.list" => Some(handle_lessons_list(state, req)),
        "lessons.preview" => Some(handle_lessons_preview(state, req)),
        "lessons.create" => Some(handle_lessons_create(state, req)),
        _ => None,
    }
}
