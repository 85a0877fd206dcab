//! Upstream endpoints and URL construction

use url::Url;

use crate::error::{RelayError, Result};

/// Path prefix shared by every upstream endpoint
const API_PREFIX: [&str; 2] = ["api", "v2"];

/// The upstream endpoints a client can reach.
///
/// Query values that the client omitted are sent empty so the upstream URL
/// always has the same shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    MyBatch,
    BatchSubject {
        batch_id: String,
    },
    BatchTopic {
        subject_id: String,
        /// `class` or `notes`
        kind: Option<String>,
    },
    BatchNotes {
        batch_id: String,
        subject_id: Option<String>,
        topic_id: Option<String>,
    },
    BatchDetail {
        batch_id: String,
        subject_id: Option<String>,
        topic_id: Option<String>,
    },
    LivestreamToken {
        vid_id: String,
    },
}

impl Endpoint {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::MyBatch => "my-batch",
            Self::BatchSubject { .. } => "batch-subject",
            Self::BatchTopic { .. } => "batch-topic",
            Self::BatchNotes { .. } => "batch-notes",
            Self::BatchDetail { .. } => "batch-detail",
            Self::LivestreamToken { .. } => "livestreamToken",
        }
    }

    /// Path segments after `/api/v2`
    fn path_segments(&self) -> Vec<&str> {
        match self {
            Self::MyBatch => vec!["my-batch"],
            Self::BatchSubject { batch_id } => vec!["batch-subject", batch_id.as_str()],
            Self::BatchTopic { subject_id, .. } => vec!["batch-topic", subject_id.as_str()],
            Self::BatchNotes { batch_id, .. } => vec!["batch-notes", batch_id.as_str()],
            Self::BatchDetail { batch_id, .. } => vec!["batch-detail", batch_id.as_str()],
            Self::LivestreamToken { .. } => vec!["livestreamToken"],
        }
    }

    /// Query pairs in the order the upstream expects them
    fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::MyBatch | Self::BatchSubject { .. } => Vec::new(),
            Self::BatchTopic { kind, .. } => vec![("type", kind.as_deref().unwrap_or_default())],
            Self::BatchNotes {
                subject_id,
                topic_id,
                ..
            }
            | Self::BatchDetail {
                subject_id,
                topic_id,
                ..
            } => vec![
                ("subjectId", subject_id.as_deref().unwrap_or_default()),
                ("topicId", topic_id.as_deref().unwrap_or_default()),
            ],
            Self::LivestreamToken { vid_id } => vec![
                ("base", "web"),
                ("module", "batch"),
                ("type", "brightcove"),
                ("vid", vid_id.as_str()),
            ],
        }
    }

    /// Build the full upstream URL on top of a base URL.
    ///
    /// Any path on the base is kept as a prefix. Path parameters are encoded
    /// as single segments, so a `/` inside one cannot change the route.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let path_segments = self.path_segments();
        if let Some(bad) = path_segments
            .iter()
            .find(|s| matches!(**s, "" | "." | ".."))
        {
            return Err(RelayError::InvalidUpstreamUrl(format!(
                "{} path parameter {:?} is not a valid segment",
                self.name(),
                bad
            )));
        }

        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| RelayError::InvalidUpstreamUrl(base.to_string()))?;
            segments.pop_if_empty();
            segments.extend(API_PREFIX);
            segments.extend(path_segments);
        }

        let pairs = self.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://api.example.com").unwrap()
    }

    fn path_and_query(endpoint: Endpoint) -> String {
        let url = endpoint.url(&base()).unwrap();
        match url.query() {
            Some(q) => format!("{}?{}", url.path(), q),
            None => url.path().to_string(),
        }
    }

    #[test]
    fn test_route_table_urls() {
        assert_eq!(path_and_query(Endpoint::MyBatch), "/api/v2/my-batch");

        assert_eq!(
            path_and_query(Endpoint::BatchSubject {
                batch_id: "b-1".into()
            }),
            "/api/v2/batch-subject/b-1"
        );

        assert_eq!(
            path_and_query(Endpoint::BatchTopic {
                subject_id: "42".into(),
                kind: Some("class".into()),
            }),
            "/api/v2/batch-topic/42?type=class"
        );

        assert_eq!(
            path_and_query(Endpoint::BatchNotes {
                batch_id: "b-1".into(),
                subject_id: Some("s-2".into()),
                topic_id: Some("t-3".into()),
            }),
            "/api/v2/batch-notes/b-1?subjectId=s-2&topicId=t-3"
        );

        assert_eq!(
            path_and_query(Endpoint::BatchDetail {
                batch_id: "b-1".into(),
                subject_id: Some("s-2".into()),
                topic_id: Some("t-3".into()),
            }),
            "/api/v2/batch-detail/b-1?subjectId=s-2&topicId=t-3"
        );

        assert_eq!(
            path_and_query(Endpoint::LivestreamToken {
                vid_id: "v-9".into()
            }),
            "/api/v2/livestreamToken?base=web&module=batch&type=brightcove&vid=v-9"
        );
    }

    #[test]
    fn test_missing_query_values_are_empty() {
        assert_eq!(
            path_and_query(Endpoint::BatchTopic {
                subject_id: "42".into(),
                kind: None,
            }),
            "/api/v2/batch-topic/42?type="
        );

        assert_eq!(
            path_and_query(Endpoint::BatchNotes {
                batch_id: "b".into(),
                subject_id: None,
                topic_id: Some("t".into()),
            }),
            "/api/v2/batch-notes/b?subjectId=&topicId=t"
        );
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let base = Url::parse("http://localhost:9000/proxy/").unwrap();
        let url = Endpoint::MyBatch.url(&base).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/proxy/api/v2/my-batch");
    }

    #[test]
    fn test_parameters_are_encoded() {
        let url = Endpoint::BatchSubject {
            batch_id: "a/../b".into(),
        }
        .url(&base())
        .unwrap();
        assert_eq!(url.path(), "/api/v2/batch-subject/a%2F..%2Fb");

        let url = Endpoint::BatchTopic {
            subject_id: "1".into(),
            kind: Some("class&x=1".into()),
        }
        .url(&base())
        .unwrap();
        assert_eq!(url.query(), Some("type=class%26x%3D1"));
    }

    #[test]
    fn test_dot_segments_are_rejected() {
        for id in ["", ".", ".."] {
            let result = Endpoint::BatchDetail {
                batch_id: id.into(),
                subject_id: None,
                topic_id: None,
            }
            .url(&base());
            assert!(matches!(result, Err(RelayError::InvalidUpstreamUrl(_))));
        }
    }
}
