//! Authenticated request/response pipeline for the workflow-engine REST API.
//!
//! # Design
//! A call goes through three steps:
//! - `new_request` builds an `HttpRequest` from a path and an optional JSON
//!   payload. It performs no I/O, so encoding failures abort before the
//!   network is touched.
//! - `send_with_basic_auth` attaches the configured credential pair. Every
//!   endpoint operation goes through it.
//! - `send` applies the default headers, executes the transport, writes the
//!   diagnostic record, classifies the status and materializes the body
//!   into the caller's `ResponseSink`.
//!
//! The transport and the diagnostic sink sit behind locks, so they can be
//! swapped while other threads issue calls. A call holds its own handle to
//! the transport it started with.

use std::io::{self, Cursor, Read, Write};
use std::sync::Arc;

use base64::Engine;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, Result, TransportError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};

pub const ACCEPT_LANGUAGE: &str = "zh-CN,en_US";
const JSON: &str = "application/json";
const FORM: &str = "application/x-www-form-urlencoded";

/// A value that can be overwritten by decoding a JSON stream.
///
/// Implemented for every `DeserializeOwned` type. The target is assigned only
/// after the whole document decoded successfully.
pub trait JsonTarget {
    fn decode_from(&mut self, reader: &mut dyn Read) -> serde_json::Result<()>;
}

impl<T: DeserializeOwned> JsonTarget for T {
    fn decode_from(&mut self, reader: &mut dyn Read) -> serde_json::Result<()> {
        *self = serde_json::from_reader(reader)?;
        Ok(())
    }
}

/// Where a success body goes.
pub enum ResponseSink<'a> {
    /// Drop the body unread; for fire-and-forget actions.
    Discard,
    /// Copy the body bytes unprocessed.
    Raw(&'a mut dyn Write),
    /// Stream-decode the body as JSON into the target.
    Json(&'a mut dyn JsonTarget),
}

/// Client for the workflow engine's REST API.
///
/// Cheap to share behind an `Arc`; every call allocates its own request and
/// response.
pub struct Client {
    config: ClientConfig,
    transport: RwLock<Arc<dyn Transport>>,
    log: Mutex<Option<Box<dyn Write + Send>>>,
}

impl Client {
    /// Client using the default `ureq` transport.
    ///
    /// `base_url` is the REST root, for example `http://localhost:8080/activiti-rest/service`.
    pub fn new(username: &str, password: &str, base_url: &str) -> Result<Self> {
        Self::from_config(ClientConfig::new(username, password, base_url))
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(mut config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            config,
            transport: RwLock::new(Arc::new(transport)),
            log: Mutex::new(None),
        })
    }

    /// Attach a diagnostic sink at construction time.
    pub fn with_log(self, log: impl Write + Send + 'static) -> Self {
        self.set_log(Some(Box::new(log)));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Replace the transport used by subsequent calls.
    pub fn set_transport(&self, transport: impl Transport + 'static) {
        *self.transport.write() = Arc::new(transport);
    }

    /// Set or clear the diagnostic sink. Every request and its raw response
    /// are written there while it is set.
    pub fn set_log(&self, log: Option<Box<dyn Write + Send>>) {
        *self.log.lock() = log;
    }

    /// Resolve `target` against the base URL unless it is already absolute.
    pub fn url(&self, target: &str) -> String {
        if target.starts_with("http://") || target.starts_with("https://") {
            return target.to_string();
        }
        format!("{}/{}", self.config.base_url, target.trim_start_matches('/'))
    }

    /// Build a request, encoding `payload` as the JSON body when present.
    pub fn new_request<P>(&self, method: HttpMethod, target: &str, payload: Option<&P>) -> Result<HttpRequest>
    where
        P: Serialize + ?Sized,
    {
        let mut request = HttpRequest::new(method, self.url(target));
        if let Some(payload) = payload {
            request.body = Some(serde_json::to_vec(payload).map_err(ClientError::Encoding)?);
        }
        Ok(request)
    }

    /// Attach the configured username/password as basic auth, then `send`.
    pub fn send_with_basic_auth(&self, mut request: HttpRequest, sink: ResponseSink<'_>) -> Result<()> {
        let credentials = format!("{}:{}", self.config.username, self.config.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        request.set_header("Authorization", format!("Basic {encoded}"));
        tracing::trace!(user = %self.config.username, "attached basic auth");

        self.send(request, sink)
    }

    /// Execute `request` and materialize a success body into `sink`.
    ///
    /// Non-2xx responses become `ClientError::Api` and leave the sink
    /// untouched.
    pub fn send(&self, mut request: HttpRequest, sink: ResponseSink<'_>) -> Result<()> {
        request.set_header("Accept", JSON);
        request.set_header("Accept-Language", ACCEPT_LANGUAGE);
        if request.header("Content-Type").is_none() {
            request.set_header("Content-Type", JSON);
        }

        let transport = Arc::clone(&*self.transport.read());
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let result = self.log(&request, transport.execute(&request));
        let response = result.map_err(|e| {
            tracing::warn!(method = %request.method, url = %request.url, error = %e, "transport failed");
            ClientError::from(e)
        })?;
        let success = response.is_success();
        let HttpResponse { status, headers, mut body } = response;
        tracing::debug!(method = %request.method, url = %request.url, status, "received response");

        if !success {
            let mut raw = Vec::new();
            // A truncated error body still yields an error, just a less detailed one.
            if let Err(e) = body.read_to_end(&mut raw) {
                tracing::debug!(status, error = %e, "error response body truncated");
            }
            let err = ApiError::from_response(request.method, request.url, status, headers, raw);
            tracing::warn!(status, message = %err.error_message, "api error");
            return Err(err.into());
        }

        match sink {
            ResponseSink::Discard => Ok(()),
            ResponseSink::Raw(writer) => {
                io::copy(&mut body, writer).map_err(ClientError::Body)?;
                Ok(())
            }
            ResponseSink::Json(target) => target.decode_from(&mut body).map_err(|e| {
                if e.is_io() {
                    ClientError::Body(e.into())
                } else {
                    ClientError::Decoding(e)
                }
            }),
        }
    }

    /// Authenticated GET whose body is copied unprocessed into `writer`.
    pub fn get_raw(&self, target: &str, writer: &mut dyn Write) -> Result<()> {
        let request = self.new_request(HttpMethod::Get, target, None::<&()>)?;
        self.send_with_basic_auth(request, ResponseSink::Raw(writer))
    }

    /// Authenticated call decoding the success body into a fresh `T`.
    pub(crate) fn fetch<T, P>(&self, method: HttpMethod, target: &str, payload: Option<&P>) -> Result<T>
    where
        T: DeserializeOwned + Default,
        P: Serialize + ?Sized,
    {
        let request = self.new_request(method, target, payload)?;
        let mut value = T::default();
        self.send_with_basic_auth(request, ResponseSink::Json(&mut value))?;
        Ok(value)
    }

    /// Authenticated call whose success body is discarded.
    pub(crate) fn perform<P>(&self, method: HttpMethod, target: &str, payload: Option<&P>) -> Result<()>
    where
        P: Serialize + ?Sized,
    {
        let request = self.new_request(method, target, payload)?;
        self.send_with_basic_auth(request, ResponseSink::Discard)
    }

    /// Write one diagnostic record for the attempt. Without a sink the
    /// result passes through untouched; with one, the response body is
    /// buffered for the dump and handed back as an in-memory stream that
    /// replays any read failure after the buffered bytes.
    fn log(
        &self,
        request: &HttpRequest,
        result: std::result::Result<HttpResponse, TransportError>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        if self.log.lock().is_none() {
            return result;
        }

        let form = match (request.header("Content-Type"), &request.body) {
            (Some(ct), Some(body)) if ct.starts_with(FORM) => String::from_utf8_lossy(body).into_owned(),
            _ => String::new(),
        };
        let request_dump = format!("{} {}. Data: {}", request.method, request.url, form);

        // The body is read before the sink lock so slow responses do not
        // serialize concurrent calls.
        let (result, response_dump) = match result {
            Ok(mut response) => {
                let mut raw = Vec::new();
                let failure = response.body.read_to_end(&mut raw).err();
                if let Some(e) = &failure {
                    tracing::debug!(error = %e, "response body truncated while logging");
                }
                let dump = dump_response(&response, &raw);
                response.body = Box::new(Cursor::new(raw).chain(Replay(failure)));
                (Ok(response), dump)
            }
            Err(e) => (Err(e), String::new()),
        };

        let record = format!("Request: {request_dump}\nResponse: {response_dump}\n");
        if let Some(sink) = self.log.lock().as_mut() {
            if let Err(e) = sink.write_all(record.as_bytes()).and_then(|_| sink.flush()) {
                tracing::debug!(error = %e, "diagnostic log write failed");
            }
        }

        result
    }
}

/// Yields a deferred read error once, then end of stream.
struct Replay(Option<io::Error>);

impl Read for Replay {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        match self.0.take() {
            Some(e) => Err(e),
            None => Ok(0),
        }
    }
}

/// Fail fast on an empty required argument.
pub(crate) fn require(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ClientError::Validation(format!("{what} is required")));
    }
    Ok(())
}

/// Render a response as status line, headers and body.
fn dump_response(response: &HttpResponse, body: &[u8]) -> String {
    let reason = ureq::http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    let mut dump = format!("HTTP/1.1 {} {}\r\n", response.status, reason);
    for (name, value) in &response.headers {
        dump.push_str(&format!("{name}: {value}\r\n"));
    }
    dump.push_str("\r\n");
    dump.push_str(&String::from_utf8_lossy(body));
    dump
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .field("log", &self.log.lock().is_some())
            .finish_non_exhaustive()
    }
}
