//! A `Selector` resolved against the discovery registry.

use grafanactl_resource::Descriptor;

use crate::selector::SelectorKind;

/// A selector, fully resolved to a concrete resource descriptor.
#[derive(Debug, Clone)]
pub struct Filter {
    pub kind: SelectorKind,
    pub descriptor: Descriptor,
    pub uids: Vec<String>,
}

/// A resolved set of filters driving a pull/push/delete operation.
#[derive(Debug, Clone, Default)]
pub struct Filters(pub Vec<Filter>);

impl Filters {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self(filters)
    }

    /// An empty `Filters` means "operate over the universe of preferred resources".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.0.iter()
    }
}

impl IntoIterator for Filters {
    type Item = Filter;
    type IntoIter = std::vec::IntoIter<Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
