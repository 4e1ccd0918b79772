pub mod analytics;
pub mod interview;
pub mod job;
pub mod resume;

pub use analytics::*;
pub use interview::*;
pub use job::*;
pub use resume::*;
