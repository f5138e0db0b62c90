use crate::content::{CollisionPolicy, ContentStore};
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use serde_json::Value as JsonValue;

pub fn content<'a>(state: &'a AppState, req: &Request) -> Result<&'a ContentStore, JsonValue> {
    state
        .content
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a content root first", None))
}

pub fn required_str(req: &Request, key: &str) -> Result<String, JsonValue> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Optional string field; absent or null reads as "". Emptiness is left to the assemblers.
pub fn opt_str(params: &JsonValue, key: &str, req: &Request) -> Result<String, JsonValue> {
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(String::new()),
        Some(v) => v
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be string", key), None)),
    }
}

pub fn opt_bool(
    params: &JsonValue,
    key: &str,
    default: bool,
    req: &Request,
) -> Result<bool, JsonValue> {
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(default),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be boolean", key), None)),
    }
}

pub fn opt_f64(
    params: &JsonValue,
    key: &str,
    default: f64,
    req: &Request,
) -> Result<f64, JsonValue> {
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(default),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be number", key), None)),
    }
}

/// Array of strings, or one string holding one item per line (how the form's text areas send
/// choices).
pub fn string_list(params: &JsonValue, key: &str, req: &Request) -> Result<Vec<String>, JsonValue> {
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::String(s)) => Ok(s.lines().map(str::to_string).collect()),
        Some(JsonValue::Array(arr)) => {
            let mut out = Vec::with_capacity(arr.len());
            for item in arr {
                let Some(s) = item.as_str() else {
                    return Err(err(
                        &req.id,
                        "bad_params",
                        format!("{} must be array of strings", key),
                        None,
                    ));
                };
                out.push(s.to_string());
            }
            Ok(out)
        }
        Some(_) => Err(err(
            &req.id,
            "bad_params",
            format!("{} must be array of strings", key),
            None,
        )),
    }
}

pub fn opt_parsed<T>(params: &JsonValue, key: &str, req: &Request) -> Result<Option<T>, JsonValue>
where
    T: std::str::FromStr<Err = String>,
{
    match params.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|m| err(&req.id, "bad_params", format!("{}: {}", key, m), None)),
        Some(_) => Err(err(&req.id, "bad_params", format!("{} must be string", key), None)),
    }
}

/// Per-request `collisionPolicy`, falling back to the daemon default.
pub fn collision_policy(state: &AppState, req: &Request) -> Result<CollisionPolicy, JsonValue> {
    Ok(opt_parsed(&req.params, "collisionPolicy", req)?.unwrap_or(state.collision_policy))
}
