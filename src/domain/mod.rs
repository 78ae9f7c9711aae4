pub mod credential;
pub mod fragment;
pub mod job_posting;

pub use credential::*;
pub use fragment::*;
pub use job_posting::*;
