/// Prefix of every passing check message
pub const SUCCESS_MARKER: &str = "✓";

/// Prefix of soft failures that are reported but do not block
pub const WARNING_MARKER: &str = "!";

/// Outcome of a single pre-installation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Passed,
    /// Reported to the user but does not fail the aggregate
    Warning,
    Failed,
}

/// A check verdict paired with the message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
}

impl CheckResult {
    pub fn pass<S: AsRef<str>>(name: &'static str, message: S) -> Self {
        Self {
            name,
            status: CheckStatus::Passed,
            message: format!("{} {}", SUCCESS_MARKER, message.as_ref()),
        }
    }

    pub fn warn<S: AsRef<str>>(name: &'static str, message: S) -> Self {
        Self {
            name,
            status: CheckStatus::Warning,
            message: format!("{} {}", WARNING_MARKER, message.as_ref()),
        }
    }

    pub fn fail<S: Into<String>>(name: &'static str, message: S) -> Self {
        Self {
            name,
            status: CheckStatus::Failed,
            message: message.into(),
        }
    }

    /// Whether this result lets the aggregate succeed
    pub fn ok(&self) -> bool {
        self.status != CheckStatus::Failed
    }
}

/// Ordered collection of check results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    results: Vec<CheckResult>,
}

impl CheckReport {
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self { results }
    }

    /// Logical AND of every individual result
    pub fn success(&self) -> bool {
        self.results.iter().all(CheckResult::ok)
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn messages(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.message.as_str()).collect()
    }

    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.ok()).count()
    }

    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }
}
