//! On-the-wire shapes of the server's discovery document.
//!
//! Mirrors the standard Kubernetes-style discovery API: `GET /apis` returns
//! the group list (with each group's supported versions and its preferred
//! one), `GET /apis/{group}/{version}` returns that group-version's resource
//! list.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ApiGroupList {
    pub groups: Vec<ApiGroup>,
}

#[derive(Debug, Deserialize)]
pub struct ApiGroup {
    pub name: String,
    pub versions: Vec<GroupVersion>,
    #[serde(rename = "preferredVersion")]
    pub preferred_version: GroupVersion,
}

#[derive(Debug, Deserialize)]
pub struct GroupVersion {
    #[serde(rename = "groupVersion")]
    pub group_version: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResourceList {
    #[serde(rename = "groupVersion")]
    pub group_version: String,
    pub resources: Vec<ApiResource>,
}

#[derive(Debug, Deserialize)]
pub struct ApiResource {
    pub name: String,
    #[serde(rename = "singularName")]
    pub singular_name: String,
    pub namespaced: bool,
    pub kind: String,
}
