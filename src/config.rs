//! Command line and environment configuration for the sidecar.

use crate::content::CollisionPolicy;
use clap::Parser;
use std::path::PathBuf;

/// JSON-line sidecar that assembles and stores tutoring content for the authoring UI.
#[derive(Parser, Debug, Clone)]
#[command(name = "tutorcontentd", version)]
pub struct Args {
    /// Content root to open at startup (the directory holding coursePlans.json)
    #[arg(long, env = "TUTORCONTENT_ROOT")]
    pub root: Option<PathBuf>,

    /// Default handling of identifier collisions: allow, reject or suffix
    #[arg(long, env = "TUTORCONTENT_COLLISION_POLICY", default_value = "allow")]
    pub collision_policy: CollisionPolicy,

    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "TUTORCONTENT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_root_unset() {
        let args = Args::try_parse_from(["tutorcontentd"]).unwrap();
        assert_eq!(args.collision_policy, CollisionPolicy::Allow);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn parses_policy_and_root() {
        let args = Args::try_parse_from([
            "tutorcontentd",
            "--root",
            "/srv/oatutor",
            "--collision-policy",
            "suffix",
        ])
        .unwrap();
        assert_eq!(args.root, Some(PathBuf::from("/srv/oatutor")));
        assert_eq!(args.collision_policy, CollisionPolicy::Suffix);
        assert!(Args::try_parse_from(["tutorcontentd", "--collision-policy", "maybe"]).is_err());
    }
}
