//! Task lookups and actions (`runtime/tasks`).

use crate::client::{require, Client};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{Task, TaskAction, TaskActionRequest, Tasks};

impl Client {
    /// `GET runtime/tasks/{id}`
    pub fn get_task(&self, id: &str) -> Result<Task> {
        require(id, "task id")?;
        self.fetch(HttpMethod::Get, &format!("runtime/tasks/{id}"), None::<&()>)
    }

    /// `GET runtime/tasks`
    pub fn get_tasks(&self) -> Result<Tasks> {
        self.fetch(HttpMethod::Get, "runtime/tasks", None::<&()>)
    }

    /// `POST runtime/tasks/{id}`: complete, claim, delegate or resolve a task.
    ///
    /// `assignee` is sent only for claim and delegate.
    pub fn task_action(&self, id: &str, action: TaskAction, assignee: &str) -> Result<()> {
        require(id, "task id")?;
        let body = TaskActionRequest::new(action, assignee);
        self.perform(HttpMethod::Post, &format!("runtime/tasks/{id}"), Some(&body))
    }
}
