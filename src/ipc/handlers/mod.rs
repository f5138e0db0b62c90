pub mod backup;
pub mod core;
pub mod courses;
pub mod lessons;
pub mod problems;
pub mod skills;
