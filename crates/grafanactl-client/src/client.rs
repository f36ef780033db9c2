//! A typed, Kubernetes-style dynamic client over a single Grafana
//! instance's resource API.

use base64::Engine;
use grafanactl_config::{AuthMethod, GrafanaConnection};
use grafanactl_resource::{Descriptor, Resource};
use reqwest::{Certificate, Identity, StatusCode};

use crate::error::{ClientError, Result};
use crate::options::{DeleteOptions, GetOptions, ListOptions, WriteOptions};

/// A client bound to one namespace (tenant), talking to one Grafana server.
///
/// Cheap to clone: the underlying `reqwest::Client` is itself a cheap,
/// `Arc`-backed handle.
#[derive(Clone)]
pub struct DynamicClient {
    http: reqwest::Client,
    base_url: String,
    namespace: String,
    auth: AuthMethod,
}

/// Build a bare `reqwest::Client` wired up with a connection's TLS
/// material. Shared by [`DynamicClient::new`] and by callers (the
/// discovery registry, `/bootdata` namespace resolution) that need a
/// plain HTTP client talking to the same server under the same TLS
/// policy but without the dynamic-client path conventions.
pub fn build_http_client(connection: &GrafanaConnection) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if connection.tls.insecure {
        builder = builder.danger_accept_invalid_certs(true);
    }
    if let Some(ca_cert) = &connection.tls.ca_cert {
        let pem = base64::engine::general_purpose::STANDARD
            .decode(ca_cert)
            .map_err(|e| ClientError::InvalidTlsMaterial { material: "ca-cert", reason: e.to_string() })?;
        let cert = Certificate::from_pem(&pem).map_err(ClientError::TlsConfig)?;
        builder = builder.add_root_certificate(cert);
    }
    if let (Some(client_cert), Some(client_key)) = (&connection.tls.client_cert, &connection.tls.client_key) {
        let mut pem = base64::engine::general_purpose::STANDARD
            .decode(client_cert)
            .map_err(|e| ClientError::InvalidTlsMaterial { material: "client-cert", reason: e.to_string() })?;
        let mut key_pem = base64::engine::general_purpose::STANDARD
            .decode(client_key)
            .map_err(|e| ClientError::InvalidTlsMaterial { material: "client-key", reason: e.to_string() })?;
        pem.append(&mut key_pem);
        let identity = Identity::from_pem(&pem).map_err(ClientError::TlsConfig)?;
        builder = builder.identity(identity);
    }

    builder.build().map_err(ClientError::TlsConfig)
}

impl DynamicClient {
    /// Build a client from a resolved connection and namespace.
    pub fn new(connection: &GrafanaConnection, namespace: impl Into<String>) -> Result<Self> {
        let http = build_http_client(connection)?;

        Ok(Self {
            http,
            base_url: connection.server.trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            auth: connection.auth_method(),
        })
    }

    /// Build a client reusing an already-constructed `reqwest::Client`
    /// (e.g. one shared with the discovery registry).
    pub fn with_http_client(http: reqwest::Client, connection: &GrafanaConnection, namespace: impl Into<String>) -> Self {
        Self {
            http,
            base_url: connection.server.trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            auth: connection.auth_method(),
        }
    }

    fn collection_url(&self, desc: &Descriptor) -> String {
        if desc.group.is_empty() {
            format!("{}/api/{}/namespaces/{}/{}", self.base_url, desc.version, self.namespace, desc.plural)
        } else {
            format!(
                "{}/apis/{}/{}/namespaces/{}/{}",
                self.base_url, desc.group, desc.version, self.namespace, desc.plural
            )
        }
    }

    fn item_url(&self, desc: &Descriptor, name: &str) -> String {
        format!("{}/{}", self.collection_url(desc), name)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            AuthMethod::Basic { user, password } => builder.basic_auth(user, Some(password)),
            AuthMethod::Bearer { token } => builder.bearer_auth(token),
            AuthMethod::Anonymous => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.to_string(), source })?;
        classify_status(&response, url, None)?;
        Ok(response)
    }

    /// List every resource of a kind in this namespace.
    pub async fn list(&self, desc: &Descriptor, _opts: &ListOptions) -> Result<Vec<Resource>> {
        let url = self.collection_url(desc);
        let response = self.send(self.http.get(&url), &url).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|source| ClientError::Decode { url: url.clone(), source })?;
        Ok(items_from_list(body))
    }

    /// Client-side filter over `list`, since the server has no set-based
    /// field selector.
    pub async fn get_multiple(&self, desc: &Descriptor, names: &[String], opts: &GetOptions) -> Result<Vec<Resource>> {
        let all = self.list(desc, &ListOptions::default()).await?;
        let _ = opts;
        let wanted: std::collections::HashSet<&str> = names.iter().map(String::as_str).collect();
        Ok(all.into_iter().filter(|r| r.name().map(|n| wanted.contains(n)).unwrap_or(false)).collect())
    }

    /// Fetch a single named resource.
    pub async fn get(&self, desc: &Descriptor, name: &str, _opts: &GetOptions) -> Result<Resource> {
        let url = self.item_url(desc, name);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        classify_status(&response, &url, Some((&desc.kind, name)))?;
        response.json().await.map_err(|source| ClientError::Decode { url, source })
    }

    /// Create a new resource.
    pub async fn create(&self, desc: &Descriptor, resource: &Resource, opts: &WriteOptions) -> Result<Resource> {
        let url = self.collection_url(desc);
        let mut request = self.http.post(&url).json(resource);
        if opts.dry_run {
            request = request.query(&[("dryRun", "All")]);
        }
        let response = self.send(request, &url).await?;
        response.json().await.map_err(|source| ClientError::Decode { url, source })
    }

    /// Update an existing resource. Callers are expected to have set the
    /// local `resourceVersion` to the value the server should expect.
    pub async fn update(&self, desc: &Descriptor, resource: &Resource, opts: &WriteOptions) -> Result<Resource> {
        let name = resource.name().ok_or_else(|| ClientError::NotFound { kind: desc.kind.clone(), name: String::new() })?;
        let url = self.item_url(desc, name);
        let mut request = self.http.put(&url).json(resource);
        if opts.dry_run {
            request = request.query(&[("dryRun", "All")]);
        }
        let response = self.send(request, &url).await?;
        response.json().await.map_err(|source| ClientError::Decode { url, source })
    }

    /// Create-or-update. Callers that already know whether the resource
    /// exists should prefer `create`/`update` directly; `apply` is a
    /// convenience for push-like flows.
    pub async fn apply(&self, desc: &Descriptor, resource: &Resource, opts: &WriteOptions) -> Result<Resource> {
        let name = resource.name().ok_or_else(|| ClientError::NotFound { kind: desc.kind.clone(), name: String::new() })?;
        match self.get(desc, name, &GetOptions::default()).await {
            Ok(_) => self.update(desc, resource, opts).await,
            Err(ClientError::NotFound { .. }) => self.create(desc, resource, opts).await,
            Err(other) => Err(other),
        }
    }

    /// Delete a resource. `dry_run` is honored entirely client-side: no
    /// request is sent and `Ok(())` is returned immediately.
    pub async fn delete(&self, desc: &Descriptor, name: &str, opts: &DeleteOptions) -> Result<()> {
        if opts.dry_run {
            return Ok(());
        }
        let url = self.item_url(desc, name);
        let response = self
            .authorize(self.http.delete(&url))
            .send()
            .await
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        classify_status(&response, &url, Some((&desc.kind, name)))?;
        Ok(())
    }
}

fn items_from_list(body: serde_json::Value) -> Vec<Resource> {
    let Some(items) = body.get("items").and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value::<Resource>(item.clone()).ok())
        .collect()
}

fn classify_status(response: &reqwest::Response, url: &str, not_found_ident: Option<(&str, &str)>) -> Result<()> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized(url.to_string())),
        StatusCode::FORBIDDEN => Err(ClientError::Forbidden(url.to_string())),
        StatusCode::NOT_FOUND => {
            let (kind, name) = not_found_ident.unwrap_or(("resource", url));
            Err(ClientError::NotFound { kind: kind.to_string(), name: name.to_string() })
        }
        status if status.is_success() => Ok(()),
        status => Err(ClientError::Status { url: url.to_string(), status: status.as_u16(), body: String::new() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grafanactl_resource::Descriptor;

    fn descriptor() -> Descriptor {
        Descriptor {
            group: "dashboard.grafana.app".into(),
            version: "v1alpha1".into(),
            kind: "Dashboard".into(),
            singular: "dashboard".into(),
            plural: "dashboards".into(),
        }
    }

    #[test]
    fn collection_url_includes_group_and_namespace() {
        let connection = GrafanaConnection { server: "https://grafana.example.com".into(), ..Default::default() };
        let client = DynamicClient::new(&connection, "org-1").unwrap();
        assert_eq!(
            client.collection_url(&descriptor()),
            "https://grafana.example.com/apis/dashboard.grafana.app/v1alpha1/namespaces/org-1/dashboards"
        );
    }

    #[test]
    fn core_group_omits_apis_prefix() {
        let connection = GrafanaConnection { server: "https://grafana.example.com".into(), ..Default::default() };
        let client = DynamicClient::new(&connection, "org-1").unwrap();
        let desc = Descriptor { group: String::new(), version: "v1".into(), kind: "Folder".into(), singular: "folder".into(), plural: "folders".into() };
        assert_eq!(client.collection_url(&desc), "https://grafana.example.com/api/v1/namespaces/org-1/folders");
    }

    #[test]
    fn item_url_appends_name() {
        let connection = GrafanaConnection { server: "https://grafana.example.com".into(), ..Default::default() };
        let client = DynamicClient::new(&connection, "org-1").unwrap();
        assert_eq!(
            client.item_url(&descriptor(), "foo"),
            "https://grafana.example.com/apis/dashboard.grafana.app/v1alpha1/namespaces/org-1/dashboards/foo"
        );
    }
}
