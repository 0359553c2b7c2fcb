// Student resource HTTP client
//
// Wraps `reqwest::Client` with URL construction for a single REST resource
// (`{base}{resource}` and `{base}{resource}/{id}`), status checking, and
// JSON decoding. One attempt per call: no retries, no backoff.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{ResourceId, Student, StudentBody};
use crate::transport::TransportConfig;

/// Resource path used when a profile does not override it.
pub const DEFAULT_RESOURCE_PATH: &str = "/api/students";

/// How much of an error body is kept in messages.
const BODY_PREVIEW_CHARS: usize = 200;

/// Raw HTTP client for the student collection resource.
///
/// All methods return decoded wire types from [`crate::models`]; status
/// codes outside 2xx surface as [`Error::Status`].
#[derive(Debug, Clone)]
pub struct StudentsClient {
    http: reqwest::Client,
    collection_url: Url,
    timeout: Option<Duration>,
}

impl StudentsClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the server root (e.g. `http://localhost:8080`),
    /// `resource_path` the collection path (e.g. `/api/students`).
    pub fn new(
        base_url: &Url,
        resource_path: &str,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, resource_path)?.with_timeout(transport.timeout))
    }

    /// Create a client with a pre-built `reqwest::Client`. Its timeout is
    /// unknown here; use [`with_timeout`](Self::with_timeout) to record it.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &Url,
        resource_path: &str,
    ) -> Result<Self, Error> {
        let base = base_url.as_str().trim_end_matches('/');
        let path = resource_path.trim_matches('/');
        let collection_url = Url::parse(&format!("{base}/{path}"))?;
        Ok(Self {
            http,
            collection_url,
            timeout: None,
        })
    }

    /// Record the per-request timeout the underlying client enforces.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Per-request timeout, when known.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The collection endpoint (`GET` / `POST`).
    pub fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    /// The item endpoint for `id` (`PUT` / `DELETE`). The id is
    /// percent-encoded as a single path segment.
    pub fn item_url(&self, id: &ResourceId) -> Result<Url, Error> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    // ── Resource operations ──────────────────────────────────────────

    /// `GET {resource}`: every record, in server order.
    pub async fn list_students(&self) -> Result<Vec<Student>, Error> {
        let url = self.collection_url.clone();
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await?;
        let body = read_body(resp).await?;
        parse_json(&body)
    }

    /// `POST {resource}`: the server assigns and returns the id.
    pub async fn create_student(&self, student: &StudentBody) -> Result<Student, Error> {
        let url = self.collection_url.clone();
        debug!("POST {}", url);

        let body = self.send_json(self.http.post(url), student).await?;
        parse_json(&body)
    }

    /// `PUT {resource}/{id}`: replaces the record's mutable fields.
    ///
    /// The response body is optional: an empty body, or one that is not a
    /// student record, yields `Ok(None)`.
    pub async fn update_student(
        &self,
        id: &ResourceId,
        student: &StudentBody,
    ) -> Result<Option<Student>, Error> {
        let url = self.item_url(id)?;
        debug!("PUT {}", url);

        let body = self.send_json(self.http.put(url), student).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Student>(&body) {
            Ok(student) => Ok(Some(student)),
            Err(e) => {
                trace!(error = %e, "update response is not a student record, ignoring body");
                Ok(None)
            }
        }
    }

    /// `DELETE {resource}/{id}`.
    pub async fn delete_student(&self, id: &ResourceId) -> Result<(), Error> {
        let url = self.item_url(id)?;
        debug!("DELETE {}", url);

        let resp = self.http.delete(url).send().await?;
        read_body(resp).await?;
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn send_json(
        &self,
        builder: reqwest::RequestBuilder,
        body: &(impl Serialize + Sync),
    ) -> Result<String, Error> {
        let resp = builder.json(body).send().await?;
        read_body(resp).await
    }
}

/// Check the status and return the body text.
async fn read_body(resp: reqwest::Response) -> Result<String, Error> {
    let status = resp.status();

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Status {
            status: status.as_u16(),
            message: preview(&body),
        });
    }

    Ok(resp.text().await?)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    })
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str, resource: &str) -> StudentsClient {
        StudentsClient::with_client(reqwest::Client::new(), &Url::parse(base).unwrap(), resource)
            .unwrap()
    }

    #[test]
    fn collection_url_joins_base_and_resource() {
        let c = client("http://localhost:8080", "/api/students");
        assert_eq!(c.collection_url().as_str(), "http://localhost:8080/api/students");
    }

    #[test]
    fn collection_url_keeps_base_prefix() {
        let c = client("https://school.example/app/", "api/students/");
        assert_eq!(
            c.collection_url().as_str(),
            "https://school.example/app/api/students"
        );
    }

    #[test]
    fn item_url_appends_id_segment() {
        let c = client("http://localhost:8080", "/api/students");
        let url = c.item_url(&ResourceId::Number(7)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/students/7");
    }

    #[test]
    fn item_url_encodes_text_ids() {
        let c = client("http://localhost:8080", "/api/students");
        let url = c.item_url(&ResourceId::Text("a/b c".into())).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/students/a%2Fb%20c");
    }

    #[test]
    fn timeout_is_only_known_when_recorded() {
        let c = client("http://localhost:8080", "/api/students");
        assert_eq!(c.timeout(), None);

        let transport = TransportConfig {
            timeout: Duration::from_secs(7),
            ..TransportConfig::default()
        };
        let c = StudentsClient::new(
            &Url::parse("http://localhost:8080").unwrap(),
            "/api/students",
            &transport,
        )
        .unwrap();
        assert_eq!(c.timeout(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let long = "é".repeat(500);
        assert_eq!(preview(&long).chars().count(), BODY_PREVIEW_CHARS);
    }
}
