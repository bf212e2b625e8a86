//! Compliance thresholds.

/// Check run conclusion required for a passing status check.
pub const REQUIRED_CHECK_CONCLUSION: &str = "success";

/// Thresholds a pull request must meet to count as compliant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceRules {
    /// Approving reviews needed for the code review to pass.
    pub min_approvals: u32,

    /// Conclusion every check run must report.
    pub required_conclusion: String,
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            min_approvals: 1,
            required_conclusion: REQUIRED_CHECK_CONCLUSION.to_string(),
        }
    }
}
