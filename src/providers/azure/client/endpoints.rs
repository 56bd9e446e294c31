use url::Url;

use crate::error::{Result, SnapshotError};

pub(super) const PROJECTS_API_VERSION: &str = "6.0";
pub(super) const PIPELINES_API_VERSION: &str = "6.0-preview.1";
pub(super) const BUILD_LIST_API_VERSION: &str = "6.0";
pub(super) const BUILD_DEFINITION_API_VERSION: &str = "6.0-preview.7";
pub(super) const RELEASE_API_VERSION: &str = "6.0";
pub(super) const VARIABLE_GROUPS_API_VERSION: &str = "6.0-preview.2";

/// Maps an organization URL onto its release management host.
///
/// `https://dev.azure.com/org` -> `https://vsrm.dev.azure.com/org`,
/// `https://org.visualstudio.com` -> `https://org.vsrm.visualstudio.com`.
/// Any other host is returned unchanged.
pub fn derive_release_url(org_url: &Url) -> Url {
    let mut url = org_url.clone();

    let release_host = match org_url.host_str() {
        Some("dev.azure.com") => Some("vsrm.dev.azure.com".to_string()),
        Some(host) if host.ends_with(".visualstudio.com") && !host.contains(".vsrm.") => {
            let org = host.trim_end_matches(".visualstudio.com");
            Some(format!("{org}.vsrm.visualstudio.com"))
        }
        _ => None,
    };

    if let Some(host) = release_host {
        if url.set_host(Some(&host)).is_err() {
            return org_url.clone();
        }
    }

    url
}

/// Builds `<base>[/<project>]/_apis/<segments...>?api-version=<version>`.
///
/// Project names are percent-encoded as a single path segment.
pub(super) fn api_url(
    base: &Url,
    project: Option<&str>,
    segments: &[&str],
    api_version: &str,
) -> Result<Url> {
    let mut url = base.clone();

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| SnapshotError::Config(format!("URL cannot be used as a base: {base}")))?;
        path.pop_if_empty();
        if let Some(project) = project {
            path.push(project);
        }
        path.push("_apis");
        path.extend(segments);
    }

    url.set_query(None);
    url.set_fragment(None);
    url.query_pairs_mut().append_pair("api-version", api_version);

    Ok(url)
}
