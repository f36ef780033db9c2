//! Selector parsing: `kind[.version].group]][/uid[,uid...]]`.

use std::fmt;

use crate::error::{InvalidSelector, Result};

/// What a selector targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// Every instance of a kind.
    All,
    /// Two or more named instances.
    Multiple,
    /// Exactly one named instance.
    Single,
}

/// The kind-spec portion of a selector, before resolution against discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialGvk {
    /// As written: may be singular or plural.
    pub kind: String,
    pub version: Option<String>,
    pub group: Option<String>,
}

impl fmt::Display for PartialGvk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.version, &self.group) {
            (Some(version), Some(group)) => write!(f, "{}.{}.{}", self.kind, version, group),
            (None, Some(group)) => write!(f, "{}.{}", self.kind, group),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// A user-supplied selection expression, not yet resolved against discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub kind: SelectorKind,
    pub partial_gvk: PartialGvk,
    pub uids: Vec<String>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.partial_gvk)?;
        if !self.uids.is_empty() {
            write!(f, "/{}", self.uids.join(","))?;
        }
        Ok(())
    }
}

/// Parse a single selector command string.
pub fn parse(command: &str) -> Result<Selector> {
    let slash_parts: Vec<&str> = command.split('/').collect();
    let (kind_spec, uids) = match slash_parts.as_slice() {
        [kind_spec] => (*kind_spec, Vec::new()),
        [kind_spec, uid_list] => {
            if uid_list.is_empty() {
                return Err(InvalidSelector::new(command, "missing resource UID").into());
            }
            let uids: Vec<String> = uid_list.split(',').map(str::to_string).collect();
            if uids.iter().any(|uid| uid.is_empty()) {
                return Err(InvalidSelector::new(command, "missing resource UID").into());
            }
            (*kind_spec, uids)
        }
        _ => return Err(InvalidSelector::new(command, "invalid command").into()),
    };

    let partial_gvk = parse_kind_spec(command, kind_spec)?;

    let kind = if uids.is_empty() {
        SelectorKind::All
    } else if uids.len() == 1 {
        SelectorKind::Single
    } else {
        SelectorKind::Multiple
    };

    Ok(Selector { kind, partial_gvk, uids })
}

/// Parse every selector in `commands`, failing on the first invalid one.
pub fn parse_all(commands: &[String]) -> Result<Vec<Selector>> {
    commands.iter().map(|c| parse(c)).collect()
}

fn parse_kind_spec(command: &str, kind_spec: &str) -> Result<PartialGvk> {
    let parts: Vec<&str> = kind_spec.splitn(3, '.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(InvalidSelector::new(command, "invalid command").into());
    }
    match parts.as_slice() {
        [kind] => Ok(PartialGvk {
            kind: kind.to_string(),
            version: None,
            group: None,
        }),
        [kind, group] => Ok(PartialGvk {
            kind: kind.to_string(),
            version: None,
            group: Some(group.to_string()),
        }),
        [kind, version, group] => Ok(PartialGvk {
            kind: kind.to_string(),
            version: Some(version.to_string()),
            group: Some(group.to_string()),
        }),
        _ => unreachable!("splitn(3, ..) never yields more than 3 parts"),
    }
}

/// Convenience wrapper over a parsed list of selectors.
#[derive(Debug, Clone, Default)]
pub struct Selectors(pub Vec<Selector>);

impl Selectors {
    pub fn parse(commands: &[String]) -> Result<Self> {
        Ok(Self(parse_all(commands)?))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when exactly one selector is present and it targets a single UID.
    pub fn is_single_target(&self) -> bool {
        matches!(self.0.as_slice(), [selector] if selector.kind == SelectorKind::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_selector_has_no_slash() {
        let s = parse("dashboards").unwrap();
        assert_eq!(s.kind, SelectorKind::All);
        assert!(s.uids.is_empty());
    }

    #[test]
    fn single_uid_selector() {
        let s = parse("dashboards/foo").unwrap();
        assert_eq!(s.kind, SelectorKind::Single);
        assert_eq!(s.uids, vec!["foo"]);
    }

    #[test]
    fn multiple_uid_selector() {
        let s = parse("dashboards.v1alpha1.dashboard.grafana.app/foo,bar").unwrap();
        assert_eq!(s.kind, SelectorKind::Multiple);
        assert_eq!(s.partial_gvk.kind, "dashboards");
        assert_eq!(s.partial_gvk.version.as_deref(), Some("v1alpha1"));
        assert_eq!(s.partial_gvk.group.as_deref(), Some("dashboard.grafana.app"));
        assert_eq!(s.uids, vec!["foo", "bar"]);
    }

    #[test]
    fn empty_uid_fails() {
        assert!(parse("dashboards/foo,,bar").is_err());
        assert!(parse("dashboards/").is_err());
    }

    #[test]
    fn too_many_slashes_fail() {
        assert!(parse("dashboards/foo/bar").is_err());
    }

    #[test]
    fn empty_kind_segment_fails() {
        assert!(parse("dashboards..group").is_err());
        assert!(parse(".group").is_err());
    }

    #[test]
    fn kind_dot_group_form() {
        let s = parse("dashboards.dashboard").unwrap();
        assert_eq!(s.partial_gvk.kind, "dashboards");
        assert_eq!(s.partial_gvk.group.as_deref(), Some("dashboard"));
        assert_eq!(s.partial_gvk.version, None);
    }

    #[test]
    fn selector_round_trips_canonical_form() {
        let input = "dashboards.v1alpha1.dashboard.grafana.app/foo,bar";
        let s = parse(input).unwrap();
        assert_eq!(s.to_string(), input);
    }

    #[test]
    fn is_single_target() {
        let selectors = Selectors::parse(&["dashboards/foo".to_string()]).unwrap();
        assert!(selectors.is_single_target());

        let selectors = Selectors::parse(&["dashboards/foo,bar".to_string()]).unwrap();
        assert!(!selectors.is_single_target());

        let selectors = Selectors::parse(&["dashboards/foo".to_string(), "folders/x".to_string()]).unwrap();
        assert!(!selectors.is_single_target());
    }
}
