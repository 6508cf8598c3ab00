//! Typed records exchanged with the workflow engine's REST API.
//!
//! # Design
//! Every field defaults when absent from a response and is omitted from an
//! outgoing body when empty, zero or false, so partially populated payloads
//! never send explicit nulls or zero values the server would act on.
//! List endpoints share one generic `Page<T>` envelope.

use serde::{Deserialize, Deserializer, Serialize};

/// The engine sends `null` for unset fields; treat it like an absent one.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn is_zero(n: &i64) -> bool {
    *n == 0
}

/// A deployed process definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessDefinition {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub version: i64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub suspended: bool,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub deployment_url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub graphical_notation_defined: bool,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub diagram_resource: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub start_form_defined: bool,
}

/// A running (or suspended) process instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessInstance {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub business_key: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub suspended: bool,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub process_definition_url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub activity_id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
}

/// A process variable passed when starting an instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variable {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "serde_json::Value::is_null")]
    pub value: serde_json::Value,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub operation: String,
    #[serde(rename = "type", deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Payload for `POST runtime/process-instances`.
///
/// Exactly one of `process_definition_id`, `process_definition_key` or
/// `message` selects what to start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StartProcessInstance {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub process_definition_id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub process_definition_key: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub business_key: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<Variable>,
}

/// A user task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub assignee: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub create_time: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub delegation_state: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub due_date: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub execution: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub parent_task: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub priority: i64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub process_definition: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub process_instance: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_false")]
    pub suspended: bool,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub task_definition_key: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub tenant_id: String,
}

/// Actions accepted by `POST runtime/tasks/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Complete,
    Claim,
    Delegate,
    Resolve,
}

impl TaskAction {
    /// Whether the action names a user the task moves to.
    pub fn takes_assignee(&self) -> bool {
        match self {
            TaskAction::Claim | TaskAction::Delegate => true,
            TaskAction::Complete | TaskAction::Resolve => false,
        }
    }
}

/// Body of a task action request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskActionRequest {
    pub action: TaskAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl TaskActionRequest {
    /// The assignee is carried only by claim and delegate.
    pub fn new(action: TaskAction, assignee: &str) -> Self {
        Self {
            action,
            assignee: action.takes_assignee().then(|| assignee.to_string()),
        }
    }
}

/// An identity user. Also used as the create/update payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub picture_url: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// Envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<T>,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub total: i64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub start: i64,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub sort: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub order: String,
    #[serde(deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub size: i64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            total: 0,
            start: 0,
            sort: String::new(),
            order: String::new(),
            size: 0,
        }
    }
}

pub type ProcessDefinitions = Page<ProcessDefinition>;
pub type ProcessInstances = Page<ProcessInstance>;
pub type Tasks = Page<Task>;
pub type Users = Page<User>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_decodes_id_and_name() {
        let task: Task = serde_json::from_str(r#"{"id":"42","name":"Review"}"#).unwrap();
        assert_eq!(task.id, "42");
        assert_eq!(task.name, "Review");
        assert_eq!(task.priority, 0);
    }

    #[test]
    fn null_fields_decode_as_empty() {
        let task: Task = serde_json::from_str(
            r#"{"id":"8","assignee":null,"dueDate":null,"priority":null,"suspended":null}"#,
        )
        .unwrap();
        assert_eq!(task.id, "8");
        assert!(task.assignee.is_empty());
        assert!(task.due_date.is_empty());
        assert_eq!(task.priority, 0);
        assert!(!task.suspended);
    }

    #[test]
    fn empty_fields_are_omitted() {
        let user = User {
            id: "kermit".to_string(),
            email: "kermit@example.com".to_string(),
            ..User::default()
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({"id":"kermit","email":"kermit@example.com"}));
    }

    #[test]
    fn start_payload_omits_unset_selectors() {
        let start = StartProcessInstance {
            process_definition_key: "vacationRequest".to_string(),
            ..StartProcessInstance::default()
        };
        let json = serde_json::to_value(&start).unwrap();
        assert_eq!(json, serde_json::json!({"processDefinitionKey":"vacationRequest"}));
    }

    #[test]
    fn variable_type_field_is_renamed() {
        let var = Variable {
            name: "days".to_string(),
            value: serde_json::json!(3),
            kind: "integer".to_string(),
            ..Variable::default()
        };
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json, serde_json::json!({"name":"days","value":3,"type":"integer"}));
    }

    #[test]
    fn claim_carries_assignee() {
        let body = serde_json::to_value(TaskActionRequest::new(TaskAction::Claim, "gonzo")).unwrap();
        assert_eq!(body, serde_json::json!({"action":"claim","assignee":"gonzo"}));
    }

    #[test]
    fn complete_drops_assignee() {
        let body = serde_json::to_value(TaskActionRequest::new(TaskAction::Complete, "gonzo")).unwrap();
        assert_eq!(body, serde_json::json!({"action":"complete"}));
    }

    #[test]
    fn page_decodes_list_envelope() {
        let page: Tasks = serde_json::from_str(
            r#"{"data":[{"id":"1"},{"id":"2"}],"total":2,"start":0,"sort":"id","order":"asc","size":2}"#,
        )
        .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.total, 2);
        assert_eq!(page.sort, "id");
    }

    #[test]
    fn page_tolerates_missing_fields() {
        let page: Users = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page, Users::default());
    }
}
