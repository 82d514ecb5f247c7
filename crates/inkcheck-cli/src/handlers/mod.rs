//! Command handlers - kept out of main.rs for testability

pub mod approve;
pub mod diff;
pub mod summary;

pub use approve::{execute_approve, select_approvals, Approval};
pub use diff::{compute_diff, execute_diff, DiffReport};
pub use summary::{execute_summary, load_report, problem_lines};
