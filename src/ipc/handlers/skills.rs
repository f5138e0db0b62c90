use crate::assemble::SkillInput;
use crate::ipc::error::{content_err, ok};
use crate::ipc::helpers::{content, opt_f64, opt_str};
use crate::ipc::types::{AppState, Request};
use crate::model::BktParams;
use serde_json::json;

fn handle_skills_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(store) = state.content.as_ref() else {
        return ok(&req.id, json!({ "skills": {} }));
    };
    match store.skills() {
        Ok(table) => ok(&req.id, json!({ "skills": table })),
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_skills_search(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match content(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let query = match opt_str(&req.params, "query", req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    match store.search_skills(&query) {
        Ok(ids) => ok(&req.id, json!({ "skillIds": ids })),
        Err(e) => content_err(&req.id, &e),
    }
}

fn handle_skills_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let store = match content(state, req) {
        Ok(s) => s,
        Err(e) => return e,
    };
    let skill_id = match opt_str(&req.params, "skillId", req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let defaults = BktParams::default();
    let mut params = defaults;
    for (key, slot, default) in [
        ("probMastery", &mut params.prob_mastery, defaults.prob_mastery),
        ("probTransit", &mut params.prob_transit, defaults.prob_transit),
        ("probSlip", &mut params.prob_slip, defaults.prob_slip),
        ("probGuess", &mut params.prob_guess, defaults.prob_guess),
    ] {
        *slot = match opt_f64(&req.params, key, default, req) {
            Ok(v) => v,
            Err(e) => return e,
        };
    }

    match store.upsert_skill(&SkillInput { skill_id, params }) {
        Ok((id, params, replaced)) => ok(
            &req.id,
            json!({ "skillId": id, "params": params, "replaced": replaced }),
        ),
        Err(e) => content_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "skills.list" => Some(handle_skills_list(state, req)),
        "skills.search" => Some(handle_skills_search(state, req)),
        "skills.upsert" => Some(handle_skills_upsert(state, req)),
        _ => None,
    }
}
