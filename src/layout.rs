use crate::store::StoreError;
use std::path::{Path, PathBuf};

pub const COURSE_PLANS_FILE: &str = "coursePlans.json";
pub const SKILL_MODEL_FILE: &str = "skillModel.json";
pub const BKT_PARAMS_DIR: &str = "bkt-params";
pub const BKT_PARAMS_FILE: &str = "defaultBKTParams.json";
pub const CONTENT_POOL_DIR: &str = "content-pool";

pub const STAGING_PREFIX: &str = ".staging-";
pub const TRASH_PREFIX: &str = ".trash-";

/// Paths of every artifact under one content root.
#[derive(Debug, Clone)]
pub struct ContentLayout {
    root: PathBuf,
}

impl ContentLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn course_plans(&self) -> PathBuf {
        self.root.join(COURSE_PLANS_FILE)
    }

    pub fn skill_model(&self) -> PathBuf {
        self.root.join(SKILL_MODEL_FILE)
    }

    pub fn bkt_params_dir(&self) -> PathBuf {
        self.root.join(BKT_PARAMS_DIR)
    }

    pub fn bkt_params(&self) -> PathBuf {
        self.bkt_params_dir().join(BKT_PARAMS_FILE)
    }

    pub fn content_pool(&self) -> PathBuf {
        self.root.join(CONTENT_POOL_DIR)
    }

    pub fn problem_dir(&self, problem_id: &str) -> PathBuf {
        self.content_pool().join(problem_id)
    }

    pub fn problem_paths(&self, problem_id: &str) -> ProblemPaths {
        ProblemPaths::under(&self.problem_dir(problem_id), problem_id)
    }

    /// Problem ids present in the content pool, sorted. Dot-prefixed entries are in-flight
    /// staging or trash directories and are skipped.
    pub fn problem_ids(&self) -> Result<Vec<String>, StoreError> {
        let pool = self.content_pool();
        let entries = match std::fs::read_dir(&pool) {
            Ok(it) => it,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::Io { path: pool, source }),
        };
        let mut ids = Vec::new();
        for ent in entries {
            let ent = ent.map_err(|source| StoreError::Io {
                path: pool.clone(),
                source,
            })?;
            if !ent.path().is_dir() {
                continue;
            }
            let name = ent.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            ids.push(name);
        }
        ids.sort();
        Ok(ids)
    }
}

pub fn step_id(problem_id: &str) -> String {
    format!("{problem_id}a")
}

/// The three files of one problem, relative to whichever directory holds it. Staging and the
/// live pool share this shape.
#[derive(Debug, Clone)]
pub struct ProblemPaths {
    pub dir: PathBuf,
    pub problem_file: PathBuf,
    pub step_file: PathBuf,
    pub tutoring_dir: PathBuf,
    pub pathway_file: PathBuf,
}

impl ProblemPaths {
    pub fn under(dir: &Path, problem_id: &str) -> Self {
        let step = step_id(problem_id);
        let step_dir = dir.join("steps").join(&step);
        let tutoring_dir = step_dir.join("tutoring");
        Self {
            dir: dir.to_path_buf(),
            problem_file: dir.join(format!("{problem_id}.json")),
            step_file: step_dir.join(format!("{step}.json")),
            pathway_file: tutoring_dir.join(format!("{step}DefaultPathway.json")),
            tutoring_dir,
        }
    }
}
