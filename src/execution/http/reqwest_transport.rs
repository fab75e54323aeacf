//! `reqwest`-backed transport.

use super::transport::HttpTransport;
use crate::error::TransportError;
use crate::types::{Header, Request, WireResponse};
use async_trait::async_trait;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tokio_util::io::StreamReader;

/// Transport that performs the exchange with a [`reqwest::Client`].
///
/// The per-attempt timeout comes from the request's retry policy. Redirects
/// are followed by the client. The body is handed to the pipeline as a stream
/// together with the declared content length.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

fn build_headers(caller: &[Header], additional: &[Header]) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::new();
    for header in caller {
        headers.append(
            HeaderName::from_bytes(header.name.as_bytes())?,
            HeaderValue::from_str(&header.value)?,
        );
    }
    // conditional headers replace caller-supplied ones of the same name
    for header in additional {
        headers.insert(
            HeaderName::from_bytes(header.name.as_bytes())?,
            HeaderValue::from_str(&header.value)?,
        );
    }
    Ok(headers)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute_request(
        &self,
        request: &Arc<Request>,
        additional_headers: &[Header],
    ) -> Result<WireResponse, TransportError> {
        let url = reqwest::Url::parse(request.url())
            .map_err(|e| TransportError::MalformedUrl(format!("{}: {e}", request.url())))?;
        let headers = build_headers(request.headers(), additional_headers)?;

        let mut rb = self
            .client
            .request(request.method().clone(), url)
            .headers(headers)
            .timeout(request.timeout());
        if let Some(body) = request.body() {
            rb = rb.body(body.clone());
        }

        let resp = rb.send().await?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                Header::new(name.as_str(), String::from_utf8_lossy(value.as_bytes()))
            })
            .collect();
        let content_length = resp.content_length();
        let stream = resp.bytes_stream().map_err(std::io::Error::other);

        Ok(WireResponse::with_stream(
            status,
            headers,
            StreamReader::new(stream),
            content_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditional_headers_replace_caller_headers() {
        let caller = vec![
            Header::new("Accept", "text/html"),
            Header::new("If-None-Match", "stale"),
        ];
        let additional = vec![Header::new("If-None-Match", "fresh")];
        let map = build_headers(&caller, &additional).unwrap();
        assert_eq!(map.get("if-none-match").unwrap(), "fresh");
        assert_eq!(map.get("accept").unwrap(), "text/html");
    }

    #[test]
    fn invalid_header_name_is_reported() {
        let err = build_headers(&[Header::new("bad name", "v")], &[]).unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }

    #[tokio::test]
    async fn malformed_url_is_reported() {
        let transport = ReqwestTransport::default();
        let request = Arc::new(Request::new("not a url"));
        let err = transport.execute_request(&request, &[]).await.unwrap_err();
        assert!(matches!(err, TransportError::MalformedUrl(_)));
    }
}
