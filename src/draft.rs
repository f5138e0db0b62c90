use crate::assemble::AssembleError;
use crate::model::ObjectiveWeights;

/// Weight offered for a new learning objective when the author does not pick one.
pub const DEFAULT_OBJECTIVE_WEIGHT: f64 = 0.85;

/// Learning objectives collected for the lesson currently being authored.
///
/// This is the only state that spans several requests. It belongs to the session, is read by
/// lesson assembly, and is replaced with [`ObjectiveDraft::reset_after_commit`] once a lesson
/// lands in the course plans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectiveDraft {
    objectives: ObjectiveWeights,
}

impl ObjectiveDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one objective weight.
    pub fn add(&mut self, skill_id: &str, weight: f64) -> Result<(), AssembleError> {
        let skill_id = skill_id.trim();
        if skill_id.is_empty() {
            return Err(AssembleError::MissingField("skillId"));
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(AssembleError::Invalid {
                field: "weight",
                reason: format!("{weight} is outside [0, 1]"),
            });
        }
        self.objectives.insert(skill_id.to_string(), weight);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.objectives.clear();
    }

    pub fn reset_after_commit(self) -> Self {
        Self::default()
    }

    pub fn objectives(&self) -> &ObjectiveWeights {
        &self.objectives
    }

    pub fn is_empty(&self) -> bool {
        self.objectives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objectives.len()
    }
}
