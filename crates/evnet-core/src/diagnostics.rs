//! Diagnostics for allocation feasibility and instance validation.
//!
//! The planner's feasibility predicate and the instance validator both
//! report through [`Diagnostics`], so every violated constraint is listed
//! instead of stopping at the first one.
//!
//! # Example
//!
//! ```
//! use evnet_core::diagnostics::{Diagnostics, IssueCategory};
//!
//! let mut diag = Diagnostics::new();
//! diag.error(IssueCategory::Budget, "12 stations allocated, budget is 10");
//! diag.warning_at(IssueCategory::Coverage, "Reference 3", "no sites within radius");
//!
//! assert_eq!(diag.error_count(), 1);
//! assert_eq!(diag.warning_count(), 1);
//! assert!(diag.has_errors());
//! ```

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// What an issue is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    /// Total stations against the budget
    Budget,
    /// A site outside its capacity bounds
    Capacity,
    /// A reference neighborhood below its minimum supply
    Coverage,
    /// Allocation shape and other structural mismatches
    Allocation,
    Site,
    Reference,
    Network,
    Config,
    /// Spatial caps that make the relaxation infeasible
    Relaxation,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Budget => "budget",
            IssueCategory::Capacity => "capacity",
            IssueCategory::Coverage => "coverage",
            IssueCategory::Allocation => "allocation",
            IssueCategory::Site => "site",
            IssueCategory::Reference => "reference",
            IssueCategory::Network => "network",
            IssueCategory::Config => "config",
            IssueCategory::Relaxation => "relaxation",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    /// Offending entity, e.g. "Site 4" or "Reference 2"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        match &self.entity {
            Some(entity) => write!(f, "{level} [{}] {entity}: {}", self.category, self.message),
            None => write!(f, "{level} [{}] {}", self.category, self.message),
        }
    }
}

/// Ordered list of issues found by one check
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: IssueCategory,
        entity: Option<String>,
        message: String,
    ) {
        self.issues.push(DiagnosticIssue {
            severity,
            category,
            message,
            entity,
        });
    }

    pub fn error(&mut self, category: IssueCategory, message: impl Into<String>) {
        self.push(Severity::Error, category, None, message.into());
    }

    pub fn error_at(
        &mut self,
        category: IssueCategory,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Error, category, Some(entity.into()), message.into());
    }

    pub fn warning(&mut self, category: IssueCategory, message: impl Into<String>) {
        self.push(Severity::Warning, category, None, message.into());
    }

    pub fn warning_at(
        &mut self,
        category: IssueCategory,
        entity: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Severity::Warning, category, Some(entity.into()), message.into());
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn in_category(&self, category: IssueCategory) -> impl Iterator<Item = &DiagnosticIssue> {
        self.issues.iter().filter(move |i| i.category == category)
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.issues.extend(other.issues);
    }

    /// e.g. "2 errors, 1 warning"
    pub fn summary(&self) -> String {
        fn plural(n: usize, noun: &str) -> String {
            if n == 1 {
                format!("1 {noun}")
            } else {
                format!("{n} {noun}s")
            }
        }
        if self.is_clean() {
            return "no issues".to_string();
        }
        let mut parts = Vec::new();
        if self.error_count() > 0 {
            parts.push(plural(self.error_count(), "error"));
        }
        if self.warning_count() > 0 {
            parts.push(plural(self.warning_count(), "warning"));
        }
        parts.join(", ")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "no issues");

        diag.warning(IssueCategory::Coverage, "empty neighborhood");
        assert_eq!(diag.summary(), "1 warning");
        assert!(!diag.has_errors());

        diag.error(IssueCategory::Capacity, "below minimum");
        diag.error(IssueCategory::Capacity, "above maximum");
        assert_eq!(diag.summary(), "2 errors, 1 warning");
    }

    #[test]
    fn test_in_category() {
        let mut diag = Diagnostics::new();
        diag.error(IssueCategory::Budget, "over budget");
        diag.error_at(IssueCategory::Capacity, "Site 2", "above maximum");
        diag.error_at(IssueCategory::Capacity, "Site 5", "below minimum");

        assert_eq!(diag.in_category(IssueCategory::Capacity).count(), 2);
        assert_eq!(diag.in_category(IssueCategory::Coverage).count(), 0);
    }

    #[test]
    fn test_issue_display() {
        let mut diag = Diagnostics::new();
        diag.error_at(IssueCategory::Coverage, "Reference 1", "supply 3 < 4");
        diag.warning(IssueCategory::Site, "instance has no sites");
        assert_eq!(
            diag.issues[0].to_string(),
            "error [coverage] Reference 1: supply 3 < 4"
        );
        assert_eq!(
            diag.to_string(),
            "1 error, 1 warning\n  error [coverage] Reference 1: supply 3 < 4\n  warning [site] instance has no sites"
        );
    }

    #[test]
    fn test_extend_and_serialize() {
        let mut a = Diagnostics::new();
        a.warning(IssueCategory::Site, "unnamed site");
        let mut b = Diagnostics::new();
        b.error(IssueCategory::Budget, "over budget");
        a.extend(b);
        assert_eq!(a.issues.len(), 2);
        assert!(a.has_errors());

        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["issues"][1]["category"], "budget");
        assert_eq!(json["issues"][1]["severity"], "error");
        assert!(json["issues"][0].get("entity").is_none());
    }
}
