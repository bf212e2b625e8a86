//! Pull request data model.

mod pull_request;

pub use pull_request::{
    count_approvals, CheckRunResult, PullRequestRecord, ReviewState, APPROVED_STATE,
};
