use crate::assemble::{HintInput, ProblemBundle, ProblemInput, ScaffoldInput};
use crate::ipc::error::{content_err, err, ok};
use crate::ipc::helpers::{collision_policy, content, opt_parsed, opt_str, required_str, string_list};
use crate::ipc::types::{AppState, Request};
use crate::model::ProblemType;
use serde_json::{json, Value as JsonValue};

fn parse_hint(v: &JsonValue, index: usize, req: &Request) -> Result<HintInput, JsonValue> {
    if let Some(text) = v.as_str() {
        return Ok(HintInput {
            text: text.to_string(),
            ..HintInput::default()
        });
    }
    if !v.is_object() {
        return Err(err(
            &req.id,
            "bad_params",
            format!("hints[{}] must be string or object", index),
            None,
        ));
    }
    let kind = opt_str(v, "type", req)?;
    let scaffold = match kind.as_str() {
        "" | "hint" | "solution" => None,
        "scaffold" => {
            let mut answers = string_list(v, "hintAnswer", req)?;
            if answers.is_empty() {
                answers = string_list(v, "answers", req)?;
            }
            Some(ScaffoldInput {
                problem_type: opt_parsed(v, "problemType", req)?,
                answer_type: opt_parsed(v, "answerType", req)?,
                answers,
            })
        }
        other => {
            return Err(err(
                &req.id,
                "bad_params",
                format!("hints[{}].type: unknown hint type {}", index, other),
                None,
            ))
        }
    };
    let title = opt_str(v, "title", req)?;
    Ok(HintInput {
        text: opt_str(v, "text", req)?,
        title: (!title.trim().is_empty()).then_some(title),
        scaffold,
    })
}

fn problem_input(req: &Request) -> Result<ProblemInput, JsonValue> {
    let p = &req.params;
    let problem_type = opt_parsed::<ProblemType>(p, "problemType", req)?.unwrap_or(ProblemType::TextBox);

    let hints = match p.get("hints") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(arr)) => {
            let mut out = Vec::with_capacity(arr.len());
            for (i, h) in arr.iter().enumerate() {
                out.push(parse_hint(h, i, req)?);
            }
            out
        }
        Some(_) => return Err(err(&req.id, "bad_params", "hints must be array", None)),
    };

    Ok(ProblemInput {
        title: opt_str(p, "title", req)?,
        body: opt_str(p, "body", req)?,
        problem_type,
        course_name: opt_str(p, "courseName", req)?,
        lesson: opt_str(p, "lesson", req)?,
        step_title: opt_str(p, "stepTitle", req)?,
        choices: string_list(p, "choices", req)?,
        correct_answers: string_list(p, "correctAnswers", req)?,
        answer: opt_str(p, "answer", req)?,
        answer_type: opt_parsed(p, "answerType", req)?,
        hints,
        skills: string_list(p, "skills", req)?,
        oer: opt_str(p, "oer", req)?,
        license: opt_str(p, "license", req)?,
    })
}

fn bundle_json(bundle: &ProblemBundle) -> JsonValue {
    json!({
        "problemId": bundle.id(),
        "problem": bundle.problem,
        "step": bundle.step,
        "hints": bundle.hints,
        "skills": bundle.skills,
        "suggestedAnswerType": bundle.suggested_answer_type,
    })
}

fn handle_problems_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.content.as_ref() else {
        return ok(&req.id, json!({ "problemIds": [] }));
    };
    match store.problem_ids() {
        Ok(ids) => ok(&req.id, json!({ "problemIds": ids })),
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_problems_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match content(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let problem_id = match required_str(req, "problemId") {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.open_problem(&problem_id) {
        Ok(opened) => ok(
            &req.id,
            json!({
                "problem": opened.problem,
                "step": opened.step,
                "hints": opened.hints,
                "skills": opened.skills,
            }),
        ),
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_problems_preview(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match content(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let policy = match collision_policy(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let input = match problem_input(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.preview_problem(&input, policy) {
        Ok(bundle) => {
            let mut out = bundle_json(&bundle);
            out["exists"] = json!(store.layout().problem_dir(bundle.id()).exists());
            ok(&req.id, out)
        }
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_problems_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match content(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let policy = match collision_policy(state, req) {
        Ok(p) => p,
        Err(e) => return e,
    };
    let input = match problem_input(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.create_problem(&input, policy) {
        Ok(commit) => {
            let mut out = bundle_json(&commit.bundle);
            out["replaced"] = json!(commit.replaced);
            ok(&req.id, out)
        }
        Err(e) => content_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "problems.list" => Some(handle_problems_list(state, req)),
        "problems.open" => Some(handle_problems_open(state, req)),
        "problems.preview" => Some(handle_problems_preview(state, req)),
        "problems.create" => Some(handle_problems_create(state, req)),
        _ => None,
    }
}
