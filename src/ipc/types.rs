use crate::content::{CollisionPolicy, ContentStore};
use crate::draft::ObjectiveDraft;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub content: Option<ContentStore>,
    /// Learning objectives for the lesson being authored in this session.
    pub objectives: ObjectiveDraft,
    pub collision_policy: CollisionPolicy,
}

impl AppState {
    pub fn new(collision_policy: CollisionPolicy) -> Self {
        Self {
            content: None,
            objectives: ObjectiveDraft::new(),
            collision_policy,
        }
    }
}
