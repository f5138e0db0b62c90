//! Operations over one content root. Every call re-reads the files it needs; nothing is cached.

use crate::assemble::{
    self, AssembleError, CourseInput, LessonInput, ProblemBundle, ProblemInput, SkillInput,
};
use crate::draft::ObjectiveDraft;
use crate::layout::{ContentLayout, ProblemPaths, STAGING_PREFIX, TRASH_PREFIX};
use crate::model::{BktParamTable, BktParams, Course, Hint, Lesson, Problem, SkillModel, Step};
use crate::store::{self, StoreError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("course not found: {0}")]
    CourseNotFound(String),

    #[error("problem not found: {0}")]
    ProblemNotFound(String),

    #[error("{kind} already exists: {id}")]
    Collision { kind: &'static str, id: String },
}

impl ContentError {
    pub fn code(&self) -> &'static str {
        match self {
            ContentError::Store(StoreError::Malformed { .. }) => "store_malformed",
            ContentError::Store(_) => "store_io",
            ContentError::Assemble(AssembleError::MissingField(_)) => "missing_field",
            ContentError::Assemble(AssembleError::Invalid { .. }) => "invalid_field",
            ContentError::CourseNotFound(_) | ContentError::ProblemNotFound(_) => "not_found",
            ContentError::Collision { .. } => "collision",
        }
    }
}

/// What to do when a new artifact derives an identity that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Problems replace the existing directory; courses are appended again.
    #[default]
    Allow,
    Reject,
    /// Pick the first free `<id>_N` (problems) or `<name> (N)` (courses), N starting at 2.
    Suffix,
}

impl CollisionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            CollisionPolicy::Allow => "allow",
            CollisionPolicy::Reject => "reject",
            CollisionPolicy::Suffix => "suffix",
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" => Ok(CollisionPolicy::Allow),
            "reject" => Ok(CollisionPolicy::Reject),
            "suffix" => Ok(CollisionPolicy::Suffix),
            other => Err(format!("unknown collision policy: {other}")),
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct LessonEntry {
    pub course_name: String,
    pub lesson: Lesson,
}

#[derive(Debug, Clone)]
pub struct LessonCommit {
    pub lesson: Lesson,
    /// Objectives that have no BKT parameters yet. Reported, not rejected.
    pub unknown_objectives: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ProblemCommit {
    pub bundle: ProblemBundle,
    pub replaced: bool,
}

#[derive(Debug, Clone)]
pub struct OpenedProblem {
    pub problem: Problem,
    pub step: Option<Step>,
    pub hints: Vec<Hint>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ContentStore {
    layout: ContentLayout,
}

impl ContentStore {
    /// Bind to `root`, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let layout = ContentLayout::new(root);
        store::ensure_dir(layout.root())?;
        Ok(Self { layout })
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn courses(&self) -> Result<Vec<Course>, ContentError> {
        Ok(store::load(&self.layout.course_plans(), Vec::new())?)
    }

    pub fn add_course(
        &self,
        input: &CourseInput,
        policy: CollisionPolicy,
    ) -> Result<Course, ContentError> {
        let mut course = assemble::assemble_course(input)?;
        let mut plans = self.courses()?;
        let taken = |name: &str| plans.iter().any(|c| c.course_name == name);
        if taken(&course.course_name) {
            match policy {
                CollisionPolicy::Allow => {
                    tracing::warn!(course = %course.course_name, "appending duplicate course name");
                }
                CollisionPolicy::Reject => {
                    return Err(ContentError::Collision {
                        kind: "course",
                        id: course.course_name,
                    });
                }
                CollisionPolicy::Suffix => {
                    let base = course.course_name.clone();
                    let mut n = 2;
                    while taken(&format!("{base} ({n})")) {
                        n += 1;
                    }
                    course.course_name = format!("{base} ({n})");
                }
            }
        }
        plans.push(course.clone());
        store::save(&self.layout.course_plans(), &plans)?;
        tracing::info!(course = %course.course_name, "course added");
        Ok(course)
    }

    pub fn lessons(&self, course_name: Option<&str>) -> Result<Vec<LessonEntry>, ContentError> {
        let plans = self.courses()?;
        Ok(plans
            .into_iter()
            .filter(|c| course_name.map(|n| n == c.course_name).unwrap_or(true))
            .flat_map(|c| {
                let name = c.course_name;
                c.lessons.into_iter().map(move |lesson| LessonEntry {
                    course_name: name.clone(),
                    lesson,
                })
            })
            .collect())
    }

    /// Append a lesson built from `draft` to the first course named `course_name`. The caller
    /// resets the draft once this returns `Ok`.
    pub fn add_lesson(
        &self,
        course_name: &str,
        input: &LessonInput,
        draft: &ObjectiveDraft,
    ) -> Result<LessonCommit, ContentError> {
        let lesson = assemble::assemble_lesson(input, draft)?;
        let mut plans = self.courses()?;
        let Some(course) = plans.iter_mut().find(|c| c.course_name == course_name) else {
            return Err(ContentError::CourseNotFound(course_name.to_string()));
        };
        course.lessons.push(lesson.clone());

        let skills = self.skills()?;
        let unknown_objectives = lesson
            .learning_objectives
            .keys()
            .filter(|k| !skills.contains_key(*k))
            .cloned()
            .collect();

        store::save(&self.layout.course_plans(), &plans)?;
        tracing::info!(course = course_name, lesson = %lesson.id, "lesson added");
        Ok(LessonCommit {
            lesson,
            unknown_objectives,
        })
    }

    pub fn skills(&self) -> Result<BktParamTable, ContentError> {
        Ok(store::load(&self.layout.bkt_params(), BktParamTable::new())?)
    }

    /// Case-insensitive substring match over skill ids; an empty query matches all.
    pub fn search_skills(&self, query: &str) -> Result<Vec<String>, ContentError> {
        let q = query.trim().to_lowercase();
        Ok(self
            .skills()?
            .into_keys()
            .filter(|id| q.is_empty() || id.to_lowercase().contains(&q))
            .collect())
    }

    /// Insert or silently overwrite one skill's parameters. Returns whether an entry was replaced.
    pub fn upsert_skill(&self, input: &SkillInput) -> Result<(String, BktParams, bool), ContentError> {
        let (id, params) = assemble::assemble_skill(input)?;
        let mut table = self.skills()?;
        let replaced = table.insert(id.clone(), params).is_some();
        store::ensure_dir(&self.layout.bkt_params_dir())?;
        store::save(&self.layout.bkt_params(), &table)?;
        tracing::info!(skill = %id, replaced, "skill parameters saved");
        Ok((id, params, replaced))
    }

    pub fn skill_model(&self) -> Result<SkillModel, ContentError> {
        Ok(store::load(&self.layout.skill_model(), SkillModel::new())?)
    }

    pub fn problem_ids(&self) -> Result<Vec<String>, ContentError> {
        Ok(self.layout.problem_ids()?)
    }

    /// Assemble without writing, under the id `policy` would give it.
    pub fn preview_problem(
        &self,
        input: &ProblemInput,
        policy: CollisionPolicy,
    ) -> Result<ProblemBundle, ContentError> {
        let id = self.resolve_problem_id(input, policy)?;
        Ok(assemble::assemble_problem_as(input, &id)?)
    }

    pub fn open_problem(&self, problem_id: &str) -> Result<OpenedProblem, ContentError> {
        let paths = self.layout.problem_paths(problem_id);
        let problem: Option<Problem> = store::load(&paths.problem_file, None)?;
        let Some(problem) = problem else {
            return Err(ContentError::ProblemNotFound(problem_id.to_string()));
        };
        let step: Option<Step> = store::load(&paths.step_file, None)?;
        let hints: Vec<Hint> = store::load(&paths.pathway_file, Vec::new())?;
        let skills = self
            .skill_model()?
            .remove(problem_id)
            .unwrap_or_default();
        Ok(OpenedProblem {
            problem,
            step,
            hints,
            skills,
        })
    }

    /// Write problem, step, pathway and skill-model entry as one unit. Everything is staged
    /// first; the live tree changes only through renames, and any failure puts it back.
    pub fn create_problem(
        &self,
        input: &ProblemInput,
        policy: CollisionPolicy,
    ) -> Result<ProblemCommit, ContentError> {
        let id = self.resolve_problem_id(input, policy)?;
        let bundle = assemble::assemble_problem_as(input, &id)?;
        let replaced = self.commit_problem(&bundle)?;
        tracing::info!(problem = %id, replaced, hints = bundle.hints.len(), "problem committed");
        Ok(ProblemCommit { bundle, replaced })
    }

    fn resolve_problem_id(
        &self,
        input: &ProblemInput,
        policy: CollisionPolicy,
    ) -> Result<String, ContentError> {
        let base = assemble::problem_id_for(input)?;
        let exists = |id: &str| self.layout.problem_dir(id).exists();
        if !exists(&base) {
            return Ok(base);
        }
        match policy {
            CollisionPolicy::Allow => Ok(base),
            CollisionPolicy::Reject => Err(ContentError::Collision {
                kind: "problem",
                id: base,
            }),
            CollisionPolicy::Suffix => {
                let mut n = 2;
                while exists(&format!("{base}_{n}")) {
                    n += 1;
                }
                Ok(format!("{base}_{n}"))
            }
        }
    }

    fn commit_problem(&self, bundle: &ProblemBundle) -> Result<bool, ContentError> {
        let id = bundle.id();
        let pool = self.layout.content_pool();
        store::ensure_dir(&pool)?;

        let txn = Uuid::new_v4().simple().to_string();
        let staging = pool.join(format!("{STAGING_PREFIX}{txn}"));
        let staged = ProblemPaths::under(&staging.join(id), id);

        let staged_model = match self.stage_problem(&staged, bundle) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(problem = id, error = %e, "staging failed; discarding");
                let _ = std::fs::remove_dir_all(&staging);
                return Err(e);
            }
        };

        let live = self.layout.problem_dir(id);
        let trash = pool.join(format!("{TRASH_PREFIX}{txn}"));
        let replaced = live.exists();

        let discard = |model: &Option<PathBuf>| {
            let _ = std::fs::remove_dir_all(&staging);
            if let Some(tmp) = model {
                let _ = std::fs::remove_file(tmp);
            }
        };

        if replaced {
            if let Err(e) = std::fs::rename(&live, &trash) {
                discard(&staged_model);
                return Err(io_error(&live, e));
            }
        }

        let restore = || {
            if replaced {
                if let Err(e) = std::fs::rename(&trash, &live) {
                    tracing::error!(problem = id, error = %e, "failed to restore previous problem");
                }
            }
        };

        if let Err(e) = std::fs::rename(&staged.dir, &live) {
            discard(&staged_model);
            restore();
            tracing::warn!(problem = id, error = %e, "commit failed; rolled back");
            return Err(io_error(&live, e));
        }

        if let Some(tmp) = &staged_model {
            let target = self.layout.skill_model();
            if let Err(e) = std::fs::rename(tmp, &target) {
                let _ = std::fs::remove_dir_all(&live);
                discard(&staged_model);
                restore();
                tracing::warn!(problem = id, error = %e, "skill model commit failed; rolled back");
                return Err(io_error(&target, e));
            }
        }

        let _ = std::fs::remove_dir_all(&staging);
        if replaced {
            if let Err(e) = std::fs::remove_dir_all(&trash) {
                tracing::warn!(path = %trash.display(), error = %e, "could not remove replaced problem");
            }
        }
        Ok(replaced)
    }

    /// Write the problem tree under `staged` and, when the problem carries skills, a temp copy of
    /// the updated skill model beside the live one.
    fn stage_problem(
        &self,
        staged: &ProblemPaths,
        bundle: &ProblemBundle,
    ) -> Result<Option<PathBuf>, ContentError> {
        store::ensure_dir(&staged.tutoring_dir)?;
        store::save(&staged.problem_file, &bundle.problem)?;
        store::save(&staged.step_file, &bundle.step)?;
        store::save(&staged.pathway_file, &bundle.hints)?;

        if bundle.skills.is_empty() {
            return Ok(None);
        }
        let mut model = self.skill_model()?;
        model.insert(bundle.id().to_string(), bundle.skills.clone());
        Ok(Some(store::stage(&self.layout.skill_model(), &model)?))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ContentError {
    ContentError::Store(StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
