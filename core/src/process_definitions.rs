//! Process definition lookups (`repository/process-definitions`).

use crate::client::{require, Client};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{ProcessDefinition, ProcessDefinitions};

impl Client {
    /// `GET repository/process-definitions/{id}`
    pub fn get_process_definition(&self, id: &str) -> Result<ProcessDefinition> {
        require(id, "process definition id")?;
        self.fetch(HttpMethod::Get, &format!("repository/process-definitions/{id}"), None::<&()>)
    }

    /// `GET repository/process-definitions`
    pub fn get_process_definitions(&self) -> Result<ProcessDefinitions> {
        self.fetch(HttpMethod::Get, "repository/process-definitions", None::<&()>)
    }
}
