use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_USERNAME: &str = "kermit";
pub const DEFAULT_PASSWORD: &str = "kermit";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessDefinition {
    pub id: String,
    pub key: String,
    pub name: String,
    pub version: i64,
    pub suspended: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessInstance {
    pub id: String,
    pub business_key: String,
    pub suspended: bool,
    pub process_definition_url: String,
    pub activity_id: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegation_state: Option<String>,
    pub process_instance: String,
    pub priority: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub start: usize,
    pub sort: String,
    pub order: String,
    pub size: usize,
}

impl<T> Page<T> {
    fn of(data: Vec<T>) -> Self {
        let n = data.len();
        Self {
            data,
            total: n,
            start: 0,
            sort: "id".to_string(),
            order: "asc".to_string(),
            size: n,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInstance {
    #[serde(default)]
    pub process_definition_id: Option<String>,
    #[serde(default)]
    pub process_definition_key: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub business_key: Option<String>,
}

#[derive(Deserialize)]
pub struct TaskAction {
    pub action: String,
    #[serde(default)]
    pub assignee: Option<String>,
}

/// Error body in the engine's wire format.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error_message: String,
}

pub struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.0.as_u16(),
            error_message: self.1,
        };
        (self.0, Json(body)).into_response()
    }
}

fn not_found(what: &str, id: &str) -> ApiError {
    ApiError(StatusCode::NOT_FOUND, format!("Could not find a {what} with id '{id}'."))
}

#[derive(Default)]
pub struct Engine {
    pub definitions: BTreeMap<String, ProcessDefinition>,
    pub instances: BTreeMap<String, ProcessInstance>,
    pub tasks: BTreeMap<String, Task>,
    pub users: BTreeMap<String, User>,
}

impl Engine {
    /// One deployed definition (`vacationRequest`) and one user.
    pub fn seeded() -> Self {
        let mut engine = Engine::default();
        let def = ProcessDefinition {
            id: "vacationRequest:1:3".to_string(),
            key: "vacationRequest".to_string(),
            name: "Vacation request".to_string(),
            version: 1,
            suspended: false,
        };
        engine.definitions.insert(def.id.clone(), def);
        let user = User {
            id: DEFAULT_USERNAME.to_string(),
            first_name: "Kermit".to_string(),
            last_name: "the Frog".to_string(),
            email: "kermit@example.com".to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        };
        engine.users.insert(user.id.clone(), user);
        engine
    }
}

pub type Db = Arc<RwLock<Engine>>;

#[derive(Clone)]
struct Credentials(Arc<String>);

pub fn app() -> Router {
    app_with_credentials(DEFAULT_USERNAME, DEFAULT_PASSWORD)
}

/// Router that only accepts `Authorization: Basic base64(username:password)`.
pub fn app_with_credentials(username: &str, password: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(Engine::seeded()));
    let encoded = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    let expected = Credentials(Arc::new(format!("Basic {encoded}")));

    Router::new()
        .route("/repository/process-definitions", get(list_definitions))
        .route("/repository/process-definitions/{id}", get(get_definition))
        .route("/runtime/process-instances", get(list_instances).post(start_instance))
        .route("/runtime/process-instances/{id}", get(get_instance))
        .route("/runtime/tasks", get(list_tasks))
        .route("/runtime/tasks/{id}", get(get_task).post(task_action))
        .route("/identity/users", get(list_users).post(create_user))
        .route("/identity/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .layer(middleware::from_fn_with_state(expected, require_basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_basic_auth(State(expected): State<Credentials>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected.0.as_str());
    if !authorized {
        return ApiError(StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response();
    }
    next.run(request).await
}

async fn list_definitions(State(db): State<Db>) -> Json<Page<ProcessDefinition>> {
    let engine = db.read().await;
    Json(Page::of(engine.definitions.values().cloned().collect()))
}

async fn get_definition(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<ProcessDefinition>, ApiError> {
    let engine = db.read().await;
    engine
        .definitions
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("process definition", &id))
}

async fn list_instances(State(db): State<Db>) -> Json<Page<ProcessInstance>> {
    let engine = db.read().await;
    Json(Page::of(engine.instances.values().cloned().collect()))
}

async fn get_instance(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<ProcessInstance>, ApiError> {
    let engine = db.read().await;
    engine
        .instances
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found("process instance", &id))
}

async fn start_instance(
    State(db): State<Db>,
    Json(input): Json<StartInstance>,
) -> Result<(StatusCode, Json<ProcessInstance>), ApiError> {
    let mut engine = db.write().await;
    let definition = if let Some(id) = input.process_definition_id {
        engine.definitions.get(&id).cloned().ok_or_else(|| not_found("process definition", &id))?
    } else if let Some(key) = input.process_definition_key {
        engine
            .definitions
            .values()
            .find(|d| d.key == key)
            .cloned()
            .ok_or_else(|| ApiError(StatusCode::NOT_FOUND, format!("no processes deployed with key '{key}'")))?
    } else if let Some(message) = input.message {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            format!("Cannot start process instance by message: no subscription to message with name '{message}'"),
        ));
    } else {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            "Either processDefinitionId, processDefinitionKey or message is required.".to_string(),
        ));
    };

    let instance = ProcessInstance {
        id: Uuid::new_v4().to_string(),
        business_key: input.business_key.unwrap_or_default(),
        suspended: false,
        process_definition_url: format!("repository/process-definitions/{}", definition.id),
        activity_id: "handleRequest".to_string(),
    };
    let task = Task {
        id: Uuid::new_v4().to_string(),
        name: format!("Handle {}", definition.name.to_lowercase()),
        assignee: None,
        delegation_state: None,
        process_instance: instance.id.clone(),
        priority: 50,
    };
    engine.tasks.insert(task.id.clone(), task);
    engine.instances.insert(instance.id.clone(), instance.clone());
    Ok((StatusCode::CREATED, Json(instance)))
}

async fn list_tasks(State(db): State<Db>) -> Json<Page<Task>> {
    let engine = db.read().await;
    Json(Page::of(engine.tasks.values().cloned().collect()))
}

async fn get_task(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Task>, ApiError> {
    let engine = db.read().await;
    engine.tasks.get(&id).cloned().map(Json).ok_or_else(|| not_found("task", &id))
}

async fn task_action(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<TaskAction>,
) -> Result<StatusCode, ApiError> {
    let mut engine = db.write().await;
    let task = engine.tasks.get_mut(&id).ok_or_else(|| not_found("task", &id))?;
    match input.action.as_str() {
        "claim" => {
            if let (Some(current), Some(next)) = (&task.assignee, &input.assignee) {
                if current != next {
                    return Err(ApiError(StatusCode::CONFLICT, format!("Task '{id}' is already claimed by someone else.")));
                }
            }
            task.assignee = input.assignee;
        }
        "delegate" => {
            task.assignee = input.assignee;
            task.delegation_state = Some("pending".to_string());
        }
        "resolve" => {
            task.delegation_state = Some("resolved".to_string());
        }
        "complete" => {
            let instance = task.process_instance.clone();
            engine.tasks.remove(&id);
            engine.instances.remove(&instance);
        }
        other => {
            return Err(ApiError(StatusCode::BAD_REQUEST, format!("Invalid action: '{other}'.")));
        }
    }
    Ok(StatusCode::OK)
}

async fn list_users(State(db): State<Db>) -> Json<Page<User>> {
    let engine = db.read().await;
    Json(Page::of(engine.users.values().cloned().collect()))
}

async fn get_user(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<User>, ApiError> {
    let engine = db.read().await;
    engine.users.get(&id).cloned().map(Json).ok_or_else(|| not_found("user", &id))
}

async fn create_user(State(db): State<Db>, Json(input): Json<User>) -> Result<(StatusCode, Json<User>), ApiError> {
    if input.id.is_empty() {
        return Err(ApiError(StatusCode::BAD_REQUEST, "Id cannot be null.".to_string()));
    }
    let mut engine = db.write().await;
    if engine.users.contains_key(&input.id) {
        return Err(ApiError(StatusCode::CONFLICT, format!("A user with id '{}' already exists.", input.id)));
    }
    engine.users.insert(input.id.clone(), input.clone());
    Ok((StatusCode::CREATED, Json(input)))
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<User>,
) -> Result<Json<User>, ApiError> {
    let mut engine = db.write().await;
    let user = engine.users.get_mut(&id).ok_or_else(|| not_found("user", &id))?;
    if !input.first_name.is_empty() {
        user.first_name = input.first_name;
    }
    if !input.last_name.is_empty() {
        user.last_name = input.last_name;
    }
    if !input.email.is_empty() {
        user.email = input.email;
    }
    if !input.password.is_empty() {
        user.password = input.password;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut engine = db.write().await;
    engine
        .users
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("user", &id))
}
