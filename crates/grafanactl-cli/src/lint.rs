//! Seam for a Rego-based linter. No rule-evaluation engine ships in this
//! workspace: the Rego linter is an external collaborator the core only
//! needs to be able to hand resource documents to, not one this crate
//! implements. No command in the CLI surface exercises it yet.
#![allow(dead_code)]

use grafanactl_resource::Resource;

/// A finding a lint source reports against one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub resource: String,
    pub rule: String,
    pub message: String,
}

/// Something that can evaluate policy against a batch of resources.
/// A Rego-bundle-backed implementation is expected to live outside this
/// workspace and be plugged in here.
pub trait LintSource {
    fn evaluate(&self, resources: &[Resource]) -> Vec<LintFinding>;
}

/// A `LintSource` that reports nothing, used where a source is required
/// but no policy bundle has been loaded.
pub struct NoOpLintSource;

impl LintSource for NoOpLintSource {
    fn evaluate(&self, _resources: &[Resource]) -> Vec<LintFinding> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_source_reports_nothing() {
        let source = NoOpLintSource;
        assert!(source.evaluate(&[]).is_empty());
    }
}
