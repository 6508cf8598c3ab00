//! Blocking client for the Activiti workflow engine's REST API.
//!
//! # Overview
//! Issues authenticated HTTP calls for process-definition lookup,
//! process-instance lifecycle, task actions and user management, and decodes
//! the JSON responses into typed records.
//!
//! # Design
//! - `Client::new_request` builds plain-data `HttpRequest` values; no I/O.
//! - `Client::send_with_basic_auth` / `Client::send` run the shared pipeline:
//!   default headers, one transport call, an optional diagnostic record,
//!   status classification, then the caller's `ResponseSink`.
//! - The network sits behind the `Transport` trait. `UreqTransport` is the
//!   default; tests plug in scripted transports.
//! - Resource operations (`get_task`, `start_process_instance_by_key`, ...)
//!   are thin `impl Client` blocks over that pipeline.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

mod process_definitions;
mod process_instances;
mod tasks;
mod users;

pub use client::{Client, JsonTarget, ResponseSink, ACCEPT_LANGUAGE};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, Result, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody, Transport, UreqTransport};
pub use types::{
    Page, ProcessDefinition, ProcessDefinitions, ProcessInstance, ProcessInstances, StartProcessInstance, Task,
    TaskAction, TaskActionRequest, Tasks, User, Users, Variable,
};
