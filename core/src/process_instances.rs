//! Process instance lookups and start (`runtime/process-instances`).

use crate::client::{require, Client};
use crate::error::{ClientError, Result};
use crate::http::HttpMethod;
use crate::types::{ProcessInstance, ProcessInstances, StartProcessInstance};

impl Client {
    /// `GET runtime/process-instances/{id}`
    pub fn get_process_instance(&self, id: &str) -> Result<ProcessInstance> {
        require(id, "process instance id")?;
        self.fetch(HttpMethod::Get, &format!("runtime/process-instances/{id}"), None::<&()>)
    }

    /// `GET runtime/process-instances`
    pub fn get_process_instances(&self) -> Result<ProcessInstances> {
        self.fetch(HttpMethod::Get, "runtime/process-instances", None::<&()>)
    }

    /// `POST runtime/process-instances`
    ///
    /// The payload must name a definition id, a definition key or a start
    /// message; business key, tenant and variables are passed through.
    pub fn start_process_instance(&self, start: &StartProcessInstance) -> Result<ProcessInstance> {
        if start.process_definition_id.is_empty()
            && start.process_definition_key.is_empty()
            && start.message.is_empty()
        {
            return Err(ClientError::Validation(
                "process definition id, key or message is required to start a process instance".to_string(),
            ));
        }
        self.fetch(HttpMethod::Post, "runtime/process-instances", Some(start))
    }

    pub fn start_process_instance_by_id(&self, process_definition_id: &str) -> Result<ProcessInstance> {
        require(process_definition_id, "process definition id")?;
        self.start_process_instance(&StartProcessInstance {
            process_definition_id: process_definition_id.to_string(),
            ..StartProcessInstance::default()
        })
    }

    pub fn start_process_instance_by_key(&self, process_definition_key: &str) -> Result<ProcessInstance> {
        require(process_definition_key, "process definition key")?;
        self.start_process_instance(&StartProcessInstance {
            process_definition_key: process_definition_key.to_string(),
            ..StartProcessInstance::default()
        })
    }

    pub fn start_process_instance_by_message(&self, message: &str) -> Result<ProcessInstance> {
        require(message, "message")?;
        self.start_process_instance(&StartProcessInstance {
            message: message.to_string(),
            ..StartProcessInstance::default()
        })
    }
}
