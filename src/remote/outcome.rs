//! FHIR `OperationOutcome` diagnostics.
//!
//! The mapping server reports every failure as an OperationOutcome. Its
//! issues are passed through to the user untouched; only transport failures
//! and non-FHIR error bodies get an outcome synthesized locally.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Issue severity as defined by the FHIR `IssueSeverity` value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Information => "information",
        }
    }
}

/// A single diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub severity: Severity,
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expression: Vec<String>,
}

impl Issue {
    pub fn new(severity: Severity, code: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            diagnostics: Some(diagnostics.into()),
            expression: Vec::new(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.severity.label(), self.code)?;
        if let Some(diagnostics) = &self.diagnostics {
            write!(f, ": {diagnostics}")?;
        }
        if !self.expression.is_empty() {
            write!(f, " (at {})", self.expression.join(", "))?;
        }
        Ok(())
    }
}

/// Structured diagnostic outcome returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcome {
    pub resource_type: String,
    #[serde(default)]
    pub issue: Vec<Issue>,
}

impl OperationOutcome {
    pub const RESOURCE_TYPE: &'static str = "OperationOutcome";

    pub fn new(issue: Vec<Issue>) -> Self {
        Self {
            resource_type: Self::RESOURCE_TYPE.to_string(),
            issue,
        }
    }

    /// Single-issue outcome for failures the server never saw.
    pub fn synthesized(code: &str, diagnostics: impl Into<String>) -> Self {
        Self::new(vec![Issue::new(Severity::Error, code, diagnostics)])
    }

    /// Parse a response body, accepting only genuine OperationOutcomes.
    pub fn from_body(body: &str) -> Option<Self> {
        let outcome: Self = serde_json::from_str(body).ok()?;
        (outcome.resource_type == Self::RESOURCE_TYPE).then_some(outcome)
    }

    /// One line per issue.
    pub fn summary(&self) -> String {
        if self.issue.is_empty() {
            return "no diagnostics provided".to_string();
        }
        self.issue
            .iter()
            .map(Issue::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_body_server_response() {
        let body = r#"{"resourceType":"OperationOutcome","issue":[{"severity":"error","code":"processing","diagnostics":"Error @1, 1: Found \"asdfasdf\" expecting \"map\""}]}"#;
        let outcome = OperationOutcome::from_body(body).unwrap();
        assert_eq!(outcome.issue.len(), 1);
        assert_eq!(outcome.issue[0].severity, Severity::Error);
        assert_eq!(outcome.issue[0].code, "processing");
        assert_eq!(
            outcome.summary(),
            "error [processing]: Error @1, 1: Found \"asdfasdf\" expecting \"map\""
        );
    }

    #[test]
    fn test_from_body_rejects_other_resources() {
        assert!(OperationOutcome::from_body(r#"{"resourceType":"Patient"}"#).is_none());
        assert!(OperationOutcome::from_body("<html>502 Bad Gateway</html>").is_none());
    }

    #[test]
    fn test_issue_display_with_expression() {
        let mut issue = Issue::new(Severity::Warning, "invalid", "unknown element");
        issue.expression = vec!["Bundle.entry[0]".to_string()];
        assert_eq!(
            issue.to_string(),
            "warning [invalid]: unknown element (at Bundle.entry[0])"
        );
    }

    #[test]
    fn test_empty_outcome_summary() {
        assert_eq!(OperationOutcome::new(vec![]).summary(), "no diagnostics provided");
    }
}
