//! Artifact host redirection.
//!
//! Lets a local mirror (or a port-forwarded source server) stand in for the
//! host published in the artifact URL.

use reqwest::Url;
use tfdump_common::error::{Result, TfdumpError};

/// Replaces the host of `url` with `host`, keeping scheme, path, and query.
///
/// `host` may carry a port (`localhost:9090`). Without one, any port in the
/// original URL is dropped, since the override names a whole authority.
///
/// # Errors
///
/// Returns `TfdumpError::InvalidUrl` if either the URL or the host is malformed.
pub fn override_host(url: &str, host: &str) -> Result<String> {
    let invalid = |message: String| TfdumpError::InvalidUrl {
        url: url.to_string(),
        message,
    };

    let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    let (name, port) = split_host_port(host)
        .ok_or_else(|| invalid(format!("bad host override {host:?}")))?;

    parsed
        .set_host(Some(name))
        .map_err(|e| invalid(format!("bad host override {host:?}: {e}")))?;
    parsed
        .set_port(port)
        .map_err(|()| invalid(format!("cannot set port on {url}")))?;

    tracing::debug!(from = url, to = %parsed, "artifact host overridden");
    Ok(parsed.to_string())
}

fn split_host_port(host: &str) -> Option<(&str, Option<u16>)> {
    if host.is_empty() {
        return None;
    }
    match host.rsplit_once(':') {
        // A bare IPv6 address without brackets has no port.
        Some((name, _)) if name.contains(':') && !name.ends_with(']') => Some((host, None)),
        Some((name, port)) => Some((name, Some(port.parse().ok()?))),
        None => Some((host, None)),
    }
}
