use std::fmt;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::docx::RenderedDocument;
use crate::submission::{AuthenticationError, SubmissionTarget, UploadError, UploadOutcome};

pub const AUTHORITY: &str = "https://login.microsoftonline.com";
pub const GRAPH_API: &str = "https://graph.microsoft.com/v1.0";
pub const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// The app registration used for the client credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    tenant_id: String,
    drive_id: String,
}

impl Credentials {
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
        drive_id: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
            drive_id: drive_id.into(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn drive_id(&self) -> &str {
        &self.drive_id
    }
}

// the secret must not end up in the logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("tenant_id", &self.tenant_id)
            .field("drive_id", &self.drive_id)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl TokenResponse {
    fn into_token(self) -> Result<String, AuthenticationError> {
        match self.access_token {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(AuthenticationError::Rejected {
                code: self.error.unwrap_or_else(|| "unknown_error".to_string()),
                description: self.error_description.unwrap_or_default(),
            }),
        }
    }
}

/// Uploads to a drive through the Microsoft Graph API.
///
/// The access token is requested once and then reused for every upload.
#[derive(Debug, Clone)]
pub struct GraphClient {
    credentials: Credentials,
    authority: String,
    api: String,
    timeout: u64,
    token: Option<String>,
}

impl GraphClient {
    pub const DEFAULT_TIMEOUT: u64 = 60;

    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            authority: AUTHORITY.to_string(),
            api: GRAPH_API.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            token: None,
        }
    }

    /// Points the client at different hosts, for example a local mock.
    pub fn endpoints(&mut self, authority: impl Into<String>, api: impl Into<String>) -> &mut Self {
        self.authority = authority.into();
        self.api = api.into();
        self
    }

    /// Timeout of each request in seconds.
    pub fn timeout(&mut self, seconds: u64) -> &mut Self {
        self.timeout = seconds;
        self
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            urlencoding::encode(self.credentials.tenant_id())
        )
    }

    fn token_request_body(&self) -> String {
        [
            ("grant_type", "client_credentials"),
            ("client_id", self.credentials.client_id()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("scope", GRAPH_SCOPE),
        ]
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
    }

    /// The address of the file `file_name` in the folder `destination`,
    /// every segment of the path is percent-encoded.
    #[must_use]
    pub fn upload_url(&self, destination: &str, file_name: &str) -> String {
        let path = destination
            .split('/')
            .filter(|segment| !segment.is_empty())
            .chain(std::iter::once(file_name))
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        format!(
            "{}/drives/{}/root:/{}:/content",
            self.api.trim_end_matches('/'),
            urlencoding::encode(self.credentials.drive_id()),
            path
        )
    }
}

impl SubmissionTarget for GraphClient {
    fn authenticate(&mut self) -> Result<(), AuthenticationError> {
        if self.is_authenticated() {
            debug!("reusing the access token");
            return Ok(());
        }

        info!(
            "requesting an access token for tenant {}",
            self.credentials.tenant_id()
        );

        let response = minreq::post(self.token_url())
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body(self.token_request_body())
            .with_timeout(self.timeout)
            .send()?;
        debug!("token endpoint answered with {}", response.status_code);

        let token = serde_json::from_slice::<TokenResponse>(response.as_bytes())?.into_token()?;
        self.token = Some(token);

        Ok(())
    }

    fn upload(
        &self,
        document: &RenderedDocument,
        destination: &str,
    ) -> Result<UploadOutcome, UploadError> {
        let token = self.token.as_deref().ok_or(UploadError::NotAuthenticated)?;
        let url = self.upload_url(destination, document.file_name());

        info!("uploading `{}` to `{}`", document.file_name(), destination);
        debug!("PUT {}", url);

        let response = minreq::put(url)
            .with_header("Authorization", format!("Bearer {}", token))
            .with_header("Content-Type", DOCX_CONTENT_TYPE)
            .with_body(document.bytes().to_vec())
            .with_timeout(self.timeout)
            .send()?;

        let outcome = UploadOutcome::from_status(response.status_code);
        if !outcome.is_stored() {
            warn!(
                "upload answered with {} {}: {}",
                response.status_code,
                response.reason_phrase,
                response.as_str().unwrap_or_default()
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn client() -> GraphClient {
        GraphClient::new(Credentials::new(
            "client",
            "s3cr&t=",
            "tenant-id",
            "drive!1",
        ))
    }

    #[test]
    fn test_token_url() {
        assert_eq!(
            client().token_url(),
            "https://login.microsoftonline.com/tenant-id/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_token_request_body() {
        assert_eq!(
            client().token_request_body(),
            "grant_type=client_credentials&client_id=client&client_secret=s3cr%26t%3D\
             &scope=https%3A%2F%2Fgraph.microsoft.com%2F.default"
        );
    }

    #[test]
    fn test_upload_url() {
        assert_eq!(
            client().upload_url("/Boot Camp/Week 3/", "Timesheet_w3_Jane_Doe.docx"),
            "https://graph.microsoft.com/v1.0/drives/drive%211/root:/Boot%20Camp/Week%203/Timesheet_w3_Jane_Doe.docx:/content"
        );
        assert_eq!(
            client().upload_url("", "a.docx"),
            "https://graph.microsoft.com/v1.0/drives/drive%211/root:/a.docx:/content"
        );
    }

    #[test]
    fn test_custom_endpoints() {
        let mut client = client();
        client.endpoints("http://127.0.0.1:8080/", "http://127.0.0.1:8081");

        assert_eq!(
            client.token_url(),
            "http://127.0.0.1:8080/tenant-id/oauth2/v2.0/token"
        );
        assert_eq!(
            client.upload_url("folder", "a.docx"),
            "http://127.0.0.1:8081/drives/drive%211/root:/folder/a.docx:/content"
        );
    }

    #[test]
    fn test_token_response() {
        let response: TokenResponse =
            serde_json::from_str(r#"{"token_type":"Bearer","expires_in":3599,"access_token":"abc"}"#)
                .unwrap();
        assert_eq!(response.into_token().unwrap(), "abc");

        let response: TokenResponse = serde_json::from_str(
            r#"{"error":"invalid_client","error_description":"AADSTS7000215: Invalid client secret provided."}"#,
        )
        .unwrap();

        match response.into_token() {
            Err(AuthenticationError::Rejected { code, description }) => {
                assert_eq!(code, "invalid_client");
                assert_eq!(description, "AADSTS7000215: Invalid client secret provided.");
            }
            other => panic!("expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_upload_needs_token() {
        let document = RenderedDocument::new("a.docx", vec![1, 2, 3]);
        assert!(!client().is_authenticated());
        assert!(matches!(
            client().upload(&document, "folder"),
            Err(UploadError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_timeout() {
        let mut client = client();
        assert_eq!(client.timeout, GraphClient::DEFAULT_TIMEOUT);

        client.timeout(5);
        assert_eq!(client.timeout, 5);
    }

    #[test]
    fn test_debug_hides_secret() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("s3cr&t="));
    }
}
