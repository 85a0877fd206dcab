//! Upstream base URL selection

use url::Url;

use crate::error::{RelayError, Result};

/// Where the upstream base URL comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamTarget {
    /// One base URL from configuration; routes are `/api/:id/...`
    Fixed(Url),
    /// Host taken from the request path; routes are `/api/:base_url/:id/...`.
    /// Only hosts in the allow-list are reachable.
    PathSupplied {
        scheme: String,
        allowed_hosts: Vec<String>,
    },
}

impl UpstreamTarget {
    /// Create a fixed target from a configured base URL
    pub fn fixed(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| RelayError::InvalidUpstreamUrl(format!("{}: {}", base_url, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(RelayError::InvalidUpstreamUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        if url.host_str().is_none() || url.cannot_be_a_base() {
            return Err(RelayError::InvalidUpstreamUrl(format!(
                "{}: missing host",
                base_url
            )));
        }

        if url.query().is_some() {
            return Err(RelayError::InvalidUpstreamUrl(format!(
                "{}: base URL must not carry a query",
                base_url
            )));
        }

        Ok(Self::Fixed(url))
    }

    /// Create a path-supplied target limited to the given hosts
    pub fn path_supplied(scheme: &str, allowed_hosts: Vec<String>) -> Result<Self> {
        if !matches!(scheme, "http" | "https") {
            return Err(RelayError::Config(format!(
                "unsupported upstream scheme: {}",
                scheme
            )));
        }

        let allowed_hosts: Vec<String> = allowed_hosts
            .into_iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();

        if allowed_hosts.is_empty() {
            return Err(RelayError::Config(
                "host-from-path mode requires at least one allowed host".to_string(),
            ));
        }

        Ok(Self::PathSupplied {
            scheme: scheme.to_string(),
            allowed_hosts,
        })
    }

    /// Whether routes carry the upstream host as a path parameter
    pub fn host_from_path(&self) -> bool {
        matches!(self, Self::PathSupplied { .. })
    }

    /// Resolve the base URL for one request
    pub fn base_url(&self, supplied_host: Option<&str>) -> Result<Url> {
        match self {
            Self::Fixed(url) => Ok(url.clone()),
            Self::PathSupplied {
                scheme,
                allowed_hosts,
            } => {
                let host = supplied_host.ok_or_else(|| {
                    RelayError::InvalidUpstreamUrl("upstream host missing from path".to_string())
                })?;

                let normalized = host.to_ascii_lowercase();
                if !allowed_hosts.iter().any(|h| *h == normalized) {
                    return Err(RelayError::HostNotAllowed(host.to_string()));
                }

                let url = Url::parse(&format!("{}://{}", scheme, normalized))
                    .map_err(|e| RelayError::InvalidUpstreamUrl(format!("{}: {}", host, e)))?;

                // An allow-listed entry must name exactly a host (and port)
                if url.path() != "/" || url.query().is_some() || !url.username().is_empty() {
                    return Err(RelayError::HostNotAllowed(host.to_string()));
                }

                Ok(url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_target() {
        let target = UpstreamTarget::fixed("https://api.example.com").unwrap();
        assert!(!target.host_from_path());

        let url = target.base_url(Some("ignored.example.org")).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/");
    }

    #[test]
    fn test_fixed_target_rejects_bad_urls() {
        assert!(UpstreamTarget::fixed("not a url").is_err());
        assert!(UpstreamTarget::fixed("ftp://api.example.com").is_err());
        assert!(UpstreamTarget::fixed("https://api.example.com/?x=1").is_err());
        assert!(UpstreamTarget::fixed("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_path_supplied_allow_list() {
        let target = UpstreamTarget::path_supplied(
            "https",
            vec!["API.Example.com".to_string(), "127.0.0.1:8080".to_string()],
        )
        .unwrap();
        assert!(target.host_from_path());

        let url = target.base_url(Some("api.example.com")).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/");

        let url = target.base_url(Some("127.0.0.1:8080")).unwrap();
        assert_eq!(url.as_str(), "https://127.0.0.1:8080/");

        assert!(matches!(
            target.base_url(Some("evil.example.net")),
            Err(RelayError::HostNotAllowed(_))
        ));
        assert!(target.base_url(None).is_err());
    }

    #[test]
    fn test_path_supplied_requires_hosts() {
        assert!(matches!(
            UpstreamTarget::path_supplied("https", vec![]),
            Err(RelayError::Config(_))
        ));
        assert!(UpstreamTarget::path_supplied("gopher", vec!["a.example.com".into()]).is_err());
    }
}
