//! Post-read/pre-write transforms applied to resources during pull.

use grafanactl_resource::{Resource, MANAGED_BY_ANNOTATION};

const SERVER_ANNOTATION_KEYS: &[&str] = &["createdBy", "updatedBy", "updatedTimestamp", "deprecated-internal-id"];

/// A pull-pipeline transform. Returning `false` drops the resource from
/// the result set; `true` keeps it (after any in-place edits).
pub trait Processor: Send + Sync {
    fn process(&self, resource: &mut Resource) -> bool;
}

/// Strips fields the server assigns, so pulled-then-pushed resources don't
/// spuriously conflict on `resourceVersion`.
pub struct StripServerFields;

impl Processor for StripServerFields {
    fn process(&self, resource: &mut Resource) -> bool {
        resource.metadata.uid = None;
        resource.metadata.generation = None;
        resource.metadata.resource_version = None;
        resource.metadata.creation_timestamp = None;
        for key in SERVER_ANNOTATION_KEYS {
            resource.metadata.annotations.remove(*key);
            resource.metadata.labels.remove(*key);
        }
        true
    }
}

/// Drops resources managed by a tool other than this one, unless
/// `include_managed` is set.
pub struct ExcludeManaged {
    pub include_managed: bool,
}

impl Processor for ExcludeManaged {
    fn process(&self, resource: &mut Resource) -> bool {
        self.include_managed || !resource.is_managed_by_other()
    }
}

/// An ordered chain of processors, applied to a batch of pulled resources.
#[derive(Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, processor: impl Processor + 'static) -> Self {
        self.processors.push(Box::new(processor));
        self
    }

    /// Run every processor over every resource, in order, dropping any
    /// resource a processor rejects.
    pub fn apply(&self, resources: Vec<Resource>) -> Vec<Resource> {
        resources
            .into_iter()
            .filter_map(|mut resource| {
                for processor in &self.processors {
                    if !processor.process(&mut resource) {
                        return None;
                    }
                }
                Some(resource)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn managed_resource(owner: &str) -> Resource {
        let mut r = Resource::new("dashboard.grafana.app", "v1alpha1", "Dashboard");
        r.metadata.name = Some("foo".into());
        r.metadata.annotations.insert(MANAGED_BY_ANNOTATION.to_string(), owner.to_string());
        r
    }

    #[test]
    fn strip_server_fields_clears_server_metadata() {
        let mut r = managed_resource("grafanactl");
        r.metadata.uid = Some("abc".into());
        r.metadata.resource_version = Some("7".into());
        StripServerFields.process(&mut r);
        assert!(r.metadata.uid.is_none());
        assert!(r.metadata.resource_version.is_none());
    }

    #[test]
    fn strip_server_fields_clears_server_labels() {
        let mut r = managed_resource("grafanactl");
        r.metadata.labels.insert("deprecated-internal-id".to_string(), "123".to_string());
        r.metadata.labels.insert("updatedBy".to_string(), "someone".to_string());
        StripServerFields.process(&mut r);
        assert!(!r.metadata.labels.contains_key("deprecated-internal-id"));
        assert!(!r.metadata.labels.contains_key("updatedBy"));
    }

    #[test]
    fn strip_is_idempotent() {
        let mut r = managed_resource("grafanactl");
        r.metadata.generation = Some(3);
        StripServerFields.process(&mut r);
        let once = r.clone();
        StripServerFields.process(&mut r);
        assert_eq!(once.metadata, r.metadata);
    }

    #[test]
    fn exclude_managed_drops_other_owners_by_default() {
        let processor = ExcludeManaged { include_managed: false };
        assert!(!processor.process(&mut managed_resource("terraform")));
        assert!(processor.process(&mut managed_resource("grafanactl")));
    }

    #[test]
    fn exclude_managed_keeps_everything_when_included() {
        let processor = ExcludeManaged { include_managed: true };
        assert!(processor.process(&mut managed_resource("terraform")));
    }

    #[test]
    fn chain_applies_in_order_and_drops() {
        let chain = ProcessorChain::new().push(ExcludeManaged { include_managed: false }).push(StripServerFields);
        let resources = vec![managed_resource("terraform"), managed_resource("grafanactl")];
        let kept = chain.apply(resources);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].managed_by(), Some("grafanactl"));
    }
}
