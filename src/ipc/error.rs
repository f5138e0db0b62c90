use crate::content::ContentError;
use serde_json::json;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

/// Map a content failure onto the wire, naming the offending field or file when there is one.
pub fn content_err(id: &str, e: &ContentError) -> serde_json::Value {
    use crate::assemble::AssembleError;
    use crate::store::StoreError;

    let details = match e {
        ContentError::Assemble(AssembleError::MissingField(f))
        | ContentError::Assemble(AssembleError::Invalid { field: f, .. }) => {
            Some(json!({ "field": f }))
        }
        ContentError::Store(StoreError::Io { path, .. })
        | ContentError::Store(StoreError::Malformed { path, .. })
        | ContentError::Store(StoreError::Serialize { path, .. }) => {
            Some(json!({ "path": path.to_string_lossy() }))
        }
        ContentError::Collision { kind, id } => Some(json!({ "kind": kind, "id": id })),
        ContentError::CourseNotFound(_) | ContentError::ProblemNotFound(_) => None,
    };
    match e {
        ContentError::Store(_) => tracing::error!(error = %e, "store failure"),
        _ => tracing::debug!(error = %e, "request rejected"),
    }
    err(id, e.code(), e.to_string(), details)
}
