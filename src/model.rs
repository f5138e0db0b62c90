//! Typed shapes of the JSON documents the tutoring runtime reads.
//!
//! Field names are fixed by the runtime, hence the explicit renames. Maps are `BTreeMap`s so a
//! rewritten file always lists keys in the same order.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub type ObjectiveWeights = BTreeMap<String, f64>;
pub type BktParamTable = BTreeMap<String, BktParams>;
pub type SkillModel = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "courseName")]
    pub course_name: String,
    #[serde(rename = "courseOER", default)]
    pub course_oer: String,
    #[serde(rename = "courseLicense", default)]
    pub course_license: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    /// Fields written by other tools; carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub topics: String,
    #[serde(default = "default_allow_recycle")]
    pub allow_recycle: bool,
    #[serde(default)]
    pub learning_objectives: ObjectiveWeights,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_allow_recycle() -> bool {
    true
}

/// Bayesian Knowledge Tracing parameters for one skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BktParams {
    pub prob_mastery: f64,
    pub prob_transit: f64,
    pub prob_slip: f64,
    pub prob_guess: f64,
}

impl Default for BktParams {
    fn default() -> Self {
        Self {
            prob_mastery: 0.1,
            prob_transit: 0.1,
            prob_slip: 0.1,
            prob_guess: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub variabilization: Map<String, Value>,
    #[serde(default)]
    pub oer: String,
    #[serde(default)]
    pub license: String,
    pub lesson: String,
    pub course_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProblemType {
    TextBox,
    MultipleChoice,
}

impl ProblemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProblemType::TextBox => "TextBox",
            ProblemType::MultipleChoice => "MultipleChoice",
        }
    }
}

impl FromStr for ProblemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TextBox" => Ok(ProblemType::TextBox),
            "MultipleChoice" => Ok(ProblemType::MultipleChoice),
            other => Err(format!("unknown problem type: {other}")),
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerType {
    #[serde(rename = "algebraic")]
    Algebraic,
    #[serde(rename = "string")]
    String,
    #[serde(rename = "numeric")]
    Numeric,
    MultipleSelect,
    MultipleChoice,
}

impl AnswerType {
    pub fn as_str(self) -> &'static str {
        match self {
            AnswerType::Algebraic => "algebraic",
            AnswerType::String => "string",
            AnswerType::Numeric => "numeric",
            AnswerType::MultipleSelect => "MultipleSelect",
            AnswerType::MultipleChoice => "MultipleChoice",
        }
    }
}

impl FromStr for AnswerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "algebraic" => Ok(AnswerType::Algebraic),
            "string" => Ok(AnswerType::String),
            "numeric" => Ok(AnswerType::Numeric),
            "MultipleSelect" => Ok(AnswerType::MultipleSelect),
            "MultipleChoice" => Ok(AnswerType::MultipleChoice),
            other => Err(format!("unknown answer type: {other}")),
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single step of a problem. Its `id` repeats the problem id; only the directory and file
/// names carry the `a` suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub problem_type: ProblemType,
    pub step_title: String,
    pub step_body: String,
    pub step_answer: Vec<String>,
    pub answer_type: AnswerType,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub variabilization: Map<String, Value>,
    #[serde(default)]
    pub oer: String,
    #[serde(default)]
    pub license: String,
    pub lesson: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub id: String,
    pub dependencies: Vec<String>,
    pub title: String,
    pub text: String,
    #[serde(flatten)]
    pub kind: HintKind,
    #[serde(default)]
    pub variabilization: Map<String, Value>,
    #[serde(default)]
    pub oer: String,
    #[serde(default)]
    pub license: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HintKind {
    Hint,
    Solution,
    Scaffold(Scaffold),
}

/// A hint that asks its own sub-question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scaffold {
    pub problem_type: ProblemType,
    pub answer_type: AnswerType,
    pub hint_answer: Vec<String>,
}
