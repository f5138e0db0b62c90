//! Pure mapping from captured form values to documents. Nothing here touches the disk.

use crate::draft::ObjectiveDraft;
use crate::model::{
    AnswerType, BktParams, Course, Hint, HintKind, Lesson, Problem, ProblemType, Scaffold, Step,
};
use crate::slug::slugify;
use serde_json::Map;
use std::path::{Component, Path};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum AssembleError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct CourseInput {
    pub course_name: String,
    pub course_oer: String,
    pub course_license: String,
}

#[derive(Debug, Clone)]
pub struct LessonInput {
    pub id: String,
    pub name: String,
    pub topics: String,
    pub allow_recycle: bool,
}

#[derive(Debug, Clone)]
pub struct SkillInput {
    pub skill_id: String,
    pub params: BktParams,
}

#[derive(Debug, Clone, Default)]
pub struct HintInput {
    pub text: String,
    pub title: Option<String>,
    pub scaffold: Option<ScaffoldInput>,
}

#[derive(Debug, Clone, Default)]
pub struct ScaffoldInput {
    pub problem_type: Option<ProblemType>,
    pub answer_type: Option<AnswerType>,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProblemInput {
    pub title: String,
    pub body: String,
    pub problem_type: ProblemType,
    pub course_name: String,
    pub lesson: String,
    pub step_title: String,
    /// MultipleChoice only.
    pub choices: Vec<String>,
    /// MultipleChoice only; each must be one of `choices`.
    pub correct_answers: Vec<String>,
    /// TextBox only.
    pub answer: String,
    /// Author override of the inferred answer type.
    pub answer_type: Option<AnswerType>,
    pub hints: Vec<HintInput>,
    pub skills: Vec<String>,
    pub oer: String,
    pub license: String,
}

#[cfg(test)]
impl ProblemInput {
    pub fn new(title: impl Into<String>, problem_type: ProblemType) -> Self {
        Self {
            title: title.into(),
            body: String::new(),
            problem_type,
            course_name: String::new(),
            lesson: String::new(),
            step_title: String::new(),
            choices: Vec::new(),
            correct_answers: Vec::new(),
            answer: String::new(),
            answer_type: None,
            hints: Vec::new(),
            skills: Vec::new(),
            oer: String::new(),
            license: String::new(),
        }
    }
}

/// Everything one problem submission writes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemBundle {
    pub problem: Problem,
    pub step: Step,
    pub hints: Vec<Hint>,
    pub skills: Vec<String>,
    pub suggested_answer_type: AnswerType,
}

impl ProblemBundle {
    pub fn id(&self) -> &str {
        &self.problem.id
    }
}

pub fn assemble_course(input: &CourseInput) -> Result<Course, AssembleError> {
    let name = input.course_name.trim();
    if name.is_empty() {
        return Err(AssembleError::MissingField("courseName"));
    }
    Ok(Course {
        course_name: name.to_string(),
        course_oer: input.course_oer.trim().to_string(),
        course_license: input.course_license.trim().to_string(),
        lessons: Vec::new(),
        extra: Map::new(),
    })
}

/// The draft is checked before the lesson fields, matching the order the form reports them.
pub fn assemble_lesson(input: &LessonInput, draft: &ObjectiveDraft) -> Result<Lesson, AssembleError> {
    if draft.is_empty() {
        return Err(AssembleError::MissingField("learningObjectives"));
    }
    let id = input.id.trim();
    let name = input.name.trim();
    if id.is_empty() {
        return Err(AssembleError::MissingField("id"));
    }
    if name.is_empty() {
        return Err(AssembleError::MissingField("name"));
    }
    Ok(Lesson {
        id: id.to_string(),
        name: name.to_string(),
        topics: input.topics.trim().to_string(),
        allow_recycle: input.allow_recycle,
        learning_objectives: draft.objectives().clone(),
        extra: Map::new(),
    })
}

pub fn assemble_skill(input: &SkillInput) -> Result<(String, BktParams), AssembleError> {
    let id = input.skill_id.trim();
    if id.is_empty() {
        return Err(AssembleError::MissingField("skillId"));
    }
    let p = input.params;
    for (field, v) in [
        ("probMastery", p.prob_mastery),
        ("probTransit", p.prob_transit),
        ("probSlip", p.prob_slip),
        ("probGuess", p.prob_guess),
    ] {
        check_probability(field, v)?;
    }
    Ok((id.to_string(), p))
}

fn check_probability(field: &'static str, v: f64) -> Result<(), AssembleError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(AssembleError::Invalid {
            field,
            reason: format!("{v} is outside [0, 1]"),
        })
    }
}

/// Answer type the form proposes before any override.
pub fn suggest_answer_type(problem_type: ProblemType, correct_count: usize) -> AnswerType {
    match problem_type {
        ProblemType::MultipleChoice if correct_count > 1 => AnswerType::MultipleSelect,
        ProblemType::MultipleChoice => AnswerType::String,
        ProblemType::TextBox => AnswerType::Algebraic,
    }
}

/// Slug of the title exactly as entered, so padding shows up as `_` at the edges. The id must stay
/// a relative path below the content pool.
pub fn problem_id_for(input: &ProblemInput) -> Result<String, AssembleError> {
    if input.title.trim().is_empty() {
        return Err(AssembleError::MissingField("title"));
    }
    let id = slugify(&input.title);
    if id.is_empty() {
        return Err(AssembleError::Invalid {
            field: "title",
            reason: "title yields an empty problem id".into(),
        });
    }
    if !Path::new(&id).components().all(|c| matches!(c, Component::Normal(_))) {
        return Err(AssembleError::Invalid {
            field: "title",
            reason: format!("problem id {id} is not a relative path"),
        });
    }
    Ok(id)
}

/// Assemble under an explicit id. Collision handling can pick an id other than the title slug.
pub fn assemble_problem_as(input: &ProblemInput, id: &str) -> Result<ProblemBundle, AssembleError> {
    problem_id_for(input)?;

    let (choices, step_answer) = match input.problem_type {
        ProblemType::MultipleChoice => {
            let choices = clean_list(&input.choices);
            if choices.len() < 2 {
                return Err(AssembleError::Invalid {
                    field: "choices",
                    reason: "MultipleChoice requires at least 2 choices".into(),
                });
            }
            let correct = clean_list(&input.correct_answers);
            if correct.is_empty() {
                return Err(AssembleError::Invalid {
                    field: "correctAnswers",
                    reason: "select at least one correct answer".into(),
                });
            }
            if let Some(stray) = correct.iter().find(|a| !choices.contains(*a)) {
                return Err(AssembleError::Invalid {
                    field: "correctAnswers",
                    reason: format!("{stray:?} is not one of the choices"),
                });
            }
            (choices, correct)
        }
        ProblemType::TextBox => {
            let answer = input.answer.trim();
            let answers = if answer.is_empty() {
                Vec::new()
            } else {
                vec![answer.to_string()]
            };
            (Vec::new(), answers)
        }
    };

    let suggested = suggest_answer_type(input.problem_type, step_answer.len());
    let answer_type = input.answer_type.unwrap_or(suggested);
    let hints = chain_hints(id, &input.hints, &input.oer, &input.license)?;

    let problem = Problem {
        id: id.to_string(),
        title: input.title.clone(),
        body: input.body.clone(),
        variabilization: Map::new(),
        oer: input.oer.clone(),
        license: input.license.clone(),
        lesson: input.lesson.clone(),
        course_name: input.course_name.clone(),
    };
    let step = Step {
        id: id.to_string(),
        problem_type: input.problem_type,
        step_title: input.step_title.clone(),
        step_body: input.body.clone(),
        step_answer,
        answer_type,
        choices,
        variabilization: Map::new(),
        oer: input.oer.clone(),
        license: input.license.clone(),
        lesson: input.lesson.clone(),
    };

    Ok(ProblemBundle {
        problem,
        step,
        hints,
        skills: clean_list(&input.skills),
        suggested_answer_type: suggested,
    })
}

/// Build the default pathway. Blank entries are dropped and do not take a link slot: each hint
/// depends on the last one actually emitted. Ids and default titles keep the entry's 1-based
/// position.
pub fn chain_hints(
    problem_id: &str,
    entries: &[HintInput],
    oer: &str,
    license: &str,
) -> Result<Vec<Hint>, AssembleError> {
    let mut hints: Vec<Hint> = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let text = entry.text.trim();
        if text.is_empty() {
            continue;
        }
        let n = i + 1;
        let kind = match &entry.scaffold {
            Some(s) => {
                let answers = clean_list(&s.answers);
                if answers.is_empty() {
                    return Err(AssembleError::Invalid {
                        field: "hints",
                        reason: format!("scaffold hint {n} needs an answer"),
                    });
                }
                HintKind::Scaffold(Scaffold {
                    problem_type: s.problem_type.unwrap_or(ProblemType::TextBox),
                    answer_type: s.answer_type.unwrap_or(AnswerType::String),
                    hint_answer: answers,
                })
            }
            None => HintKind::Hint,
        };
        let dependencies = hints.last().map(|h| vec![h.id.clone()]).unwrap_or_default();
        let title = entry
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Hint {n}"));
        hints.push(Hint {
            id: format!("{problem_id}-h{n}"),
            dependencies,
            title,
            text: text.to_string(),
            kind,
            variabilization: Map::new(),
            oer: oer.to_string(),
            license: license.to_string(),
        });
    }
    if let Some(last) = hints.last_mut() {
        if last.kind == HintKind::Hint {
            last.kind = HintKind::Solution;
        }
    }
    Ok(hints)
}

/// Trim, drop blanks and duplicates, keep first-seen order.
fn clean_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let s = item.trim();
        if !s.is_empty() && !out.iter().any(|o| o == s) {
            out.push(s.to_string());
        }
    }
    out
}
