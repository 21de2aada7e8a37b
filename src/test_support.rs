//! In-process stand-in for the REST backend, served by axum on a loopback port.
//!
//! It speaks the envelope contract, enforces the achievement lifecycle with the same
//! rules the client uses, and records every request so tests can assert on what was
//! (or was never) sent.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::Role;
use crate::core::config::Settings;
use crate::core::context::AppContext;
use crate::session::MemoryStorage;
use crate::workflow::{transition, AchievementStatus, Action, Actor, Relation, WorkflowError};

pub(crate) const PASSWORD: &str = "secret";
const API_PREFIX: &str = "/api/v1";
const TOKEN_PREFIX: &str = "token-";
const REFRESH_PREFIX: &str = "refresh-";

type Reply = (StatusCode, Value);

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) query: String,
    pub(crate) body: Value,
    pub(crate) request_id: Option<String>,
    pub(crate) bearer: Option<String>,
}

#[derive(Debug, Clone)]
struct StubUser {
    id: String,
    username: String,
    full_name: String,
    role: Role,
    deleted: bool,
    advisor: Option<String>,
    student_number: String,
}

impl StubUser {
    fn new(id: &str, username: &str, full_name: &str, role: Role) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            role,
            deleted: false,
            advisor: None,
            student_number: String::new(),
        }
    }

    fn email(&self) -> String {
        format!("{}@kampus.ac.id", self.username)
    }

    fn profile_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email(),
            "full_name": self.full_name,
            "role": self.role,
        })
    }

    fn user_json(&self) -> Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email(),
            "full_name": self.full_name,
            "is_active": !self.deleted,
            "role_id": role_id(self.role),
            "role": self.role,
            "created_at": "2024-01-01T00:00:00Z",
            "deleted_at": if self.deleted { json!("2024-06-01T00:00:00Z") } else { Value::Null },
        })
    }

    fn student_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.id,
            "user": {"id": self.id, "username": self.username, "email": self.email(), "full_name": self.full_name},
            "student_id": self.student_number,
            "program_study": "Informatika",
            "academic_year": "2021",
            "advisor_id": self.advisor,
        })
    }

    fn lecturer_json(&self) -> Value {
        json!({
            "id": self.id,
            "user_id": self.id,
            "user": {"id": self.id, "username": self.username, "email": self.email(), "full_name": self.full_name},
            "lecturer_id": format!("NIP-{}", self.id),
            "department": "Informatika",
        })
    }
}

#[derive(Debug, Clone)]
struct StubAchievement {
    id: String,
    owner: String,
    title: String,
    achievement_type: String,
    data: Value,
    status: AchievementStatus,
    rejection_note: Option<String>,
    verified_by: Option<String>,
    created_at: String,
    attachments: Vec<Value>,
    history: Vec<Value>,
}

#[derive(Debug, Clone)]
struct StubNotification {
    id: String,
    recipient: String,
    kind: &'static str,
    title: String,
    read: bool,
}

#[derive(Default)]
struct StubData {
    users: Vec<StubUser>,
    achievements: Vec<StubAchievement>,
    notifications: Vec<StubNotification>,
    uploads: Vec<String>,
    next_id: u64,
    refreshes: u64,
    tokens_revoked: bool,
}

struct StubState {
    data: Mutex<StubData>,
    log: Mutex<Vec<RecordedRequest>>,
    delays: Mutex<Vec<(String, Duration)>>,
}

/// A running stub backend. The server task stops with the test runtime.
pub(crate) struct StubBackend {
    base_url: String,
    state: Arc<StubState>,
    session_dir: TempDir,
}

impl StubBackend {
    pub(crate) async fn spawn() -> Self {
        let state = Arc::new(StubState {
            data: Mutex::new(StubData::seeded()),
            log: Mutex::new(Vec::new()),
            delays: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind stub backend");
        let addr = listener.local_addr().expect("stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self {
            base_url: format!("http://{addr}{API_PREFIX}"),
            state,
            session_dir: TempDir::new().expect("session dir"),
        }
    }

    pub(crate) fn settings(&self) -> Settings {
        Settings::for_tests(&self.base_url, self.session_dir.path().to_path_buf())
    }

    /// A fresh, logged-out client against this backend.
    pub(crate) async fn context(&self) -> AppContext {
        AppContext::with_storage(self.settings(), Arc::new(MemoryStorage::new()))
            .await
            .expect("app context")
    }

    pub(crate) async fn login_as(&self, username: &str) -> AppContext {
        let ctx = self.context().await;
        ctx.login(username, PASSWORD).await.expect("login");
        ctx
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.state.log.lock().clone()
    }

    pub(crate) fn count(&self, method: &str, path: &str) -> usize {
        self.state.log.lock().iter().filter(|req| req.method == method && req.path == path).count()
    }

    /// Holds back responses whose `path?query` contains `needle`.
    pub(crate) fn delay(&self, needle: &str, duration: Duration) {
        self.state.delays.lock().push((needle.to_string(), duration));
    }

    /// Every token issued so far stops being accepted.
    pub(crate) fn revoke_tokens(&self) {
        self.state.data.lock().tokens_revoked = true;
    }

    pub(crate) fn seed_achievement(&self, owner: &str, title: &str, status: AchievementStatus) -> String {
        let mut data = self.state.data.lock();
        let id = data.allocate_id();
        let created_at = data.timestamp();
        data.achievements.push(StubAchievement {
            id: id.clone(),
            owner: owner.to_string(),
            title: title.to_string(),
            achievement_type: "competition".to_string(),
            data: json!({"competition_name": title}),
            status,
            rejection_note: None,
            verified_by: None,
            created_at,
            attachments: Vec::new(),
            history: Vec::new(),
        });
        id
    }

    pub(crate) fn status_of(&self, id: &str) -> Option<AchievementStatus> {
        self.state.data.lock().achievements.iter().find(|item| item.id == id).map(|item| item.status)
    }

    pub(crate) fn advisor_of(&self, student_id: &str) -> Option<String> {
        self.state.data.lock().users.iter().find(|user| user.id == student_id).and_then(|user| user.advisor.clone())
    }
}

async fn handle(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().strip_prefix(API_PREFIX).unwrap_or(uri.path()).to_string();
    let query = uri.query().unwrap_or_default().to_string();
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let request_id = headers.get("x-request-id").and_then(|value| value.to_str().ok()).map(str::to_string);

    state.log.lock().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        query: query.clone(),
        body: payload.clone(),
        request_id,
        bearer: token.clone(),
    });

    let target = format!("{path}?{query}");
    let delay = state.delays.lock().iter().find(|(needle, _)| target.contains(needle.as_str())).map(|(_, d)| *d);
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let (status, reply) = state.data.lock().route(&method, &path, &query_map(&query), token.as_deref(), &payload);
    (status, Json(reply)).into_response()
}

fn query_map(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

fn ok(body: Value) -> Result<Value, Reply> {
    Ok(body)
}

fn success(message: &str, data: Value) -> Result<Value, Reply> {
    ok(json!({"status": "success", "message": message, "data": data}))
}

fn failure(status: StatusCode, message: &str) -> Reply {
    (status, json!({"status": "error", "message": message}))
}

fn role_id(role: Role) -> &'static str {
    match role {
        Role::Admin => "role-admin",
        Role::Student => "role-student",
        Role::Lecturer => "role-lecturer",
    }
}

fn page_params(query: &HashMap<String, String>) -> (usize, usize) {
    let read = |key: &str, default: usize| {
        query.get(key).and_then(|value| value.parse::<usize>().ok()).filter(|value| *value > 0).unwrap_or(default)
    };
    (read("page", 1), read("limit", 10))
}

fn paginate(rows: Vec<Value>, query: &HashMap<String, String>) -> (Vec<Value>, Value) {
    let (page, limit) = page_params(query);
    let total = rows.len();
    let items = rows.into_iter().skip((page - 1) * limit).take(limit).collect();
    (items, json!({"page": page, "limit": limit, "total": total}))
}

fn workflow_failure(err: WorkflowError) -> Reply {
    match err {
        WorkflowError::Forbidden(message) => failure(StatusCode::FORBIDDEN, message),
        other => failure(StatusCode::BAD_REQUEST, &other.to_string()),
    }
}

impl StubData {
    fn seeded() -> Self {
        let mut andi = StubUser::new("stud-1", "andi", "Andi Pratama", Role::Student);
        andi.advisor = Some("lect-1".to_string());
        andi.student_number = "2021001".to_string();
        let mut citra = StubUser::new("stud-2", "citra", "Citra Lestari", Role::Student);
        citra.student_number = "2021002".to_string();
        let mut dewi = StubUser::new("42", "dewi", "Dewi Anggraini", Role::Student);
        dewi.student_number = "2021042".to_string();
        dewi.deleted = true;

        Self {
            users: vec![
                StubUser::new("admin-1", "admin", "Administrator", Role::Admin),
                StubUser::new("lect-1", "budi", "Dr. Budi Santoso", Role::Lecturer),
                StubUser::new("lect-2", "sari", "Dr. Sari Wulandari", Role::Lecturer),
                andi,
                citra,
                dewi,
            ],
            ..Self::default()
        }
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("ach-{}", self.next_id)
    }

    /// Creation order doubles as time.
    fn timestamp(&self) -> String {
        format!("2024-03-01T10:00:{:02}Z", self.next_id % 60)
    }

    fn user(&self, id: &str) -> Option<&StubUser> {
        self.users.iter().find(|user| user.id == id)
    }

    fn caller(&self, token: Option<&str>) -> Option<StubUser> {
        if self.tokens_revoked {
            return None;
        }
        let issued = token?.strip_prefix(TOKEN_PREFIX)?;
        let id = issued.split_once('~').map_or(issued, |(id, _)| id);
        self.user(id).filter(|user| !user.deleted).cloned()
    }

    fn route(
        &mut self,
        method: &Method,
        path: &str,
        query: &HashMap<String, String>,
        token: Option<&str>,
        body: &Value,
    ) -> Reply {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let public = match (method.as_str(), segments.as_slice()) {
            ("POST", ["auth", "login"]) => Some(self.login(body)),
            ("POST", ["auth", "refresh"]) => Some(self.refresh(body)),
            ("POST", ["auth", "register"]) => Some(self.register(body)),
            _ => None,
        };
        if let Some(result) = public {
            return result.map_or_else(|err| err, |reply| (StatusCode::OK, reply));
        }

        let Some(caller) = self.caller(token) else {
            return failure(StatusCode::UNAUTHORIZED, "Invalid or expired token");
        };

        let result = match (method.as_str(), segments.as_slice()) {
            ("POST", ["auth", "logout"]) => success("Logged out", Value::Null),
            ("GET", ["auth", "profile"]) => success("Profile", caller.profile_json()),

            ("GET", ["achievements"]) => self.list_achievements(&caller, query),
            ("POST", ["achievements"]) => self.create_achievement(&caller, body),
            ("GET", ["achievements", id]) => self.achievement(&caller, id),
            ("PUT", ["achievements", id]) => self.change(&caller, id, Action::Edit, body),
            ("DELETE", ["achievements", id]) => self.change(&caller, id, Action::Delete, body),
            ("POST", ["achievements", id, "submit"]) => self.change(&caller, id, Action::Submit, body),
            ("POST", ["achievements", id, "verify"]) => self.change(&caller, id, Action::Verify, body),
            ("POST", ["achievements", id, "reject"]) => self.change(&caller, id, Action::Reject, body),
            ("GET", ["achievements", id, "history"]) => self.history(&caller, id),
            ("POST", ["achievements", id, "attachments"]) => self.attach(&caller, id),

            ("GET", ["lecturers", "advisees", "achievements"]) => self.advisee_achievements(&caller, query),
            ("GET", ["lecturers", "me", "advisees"]) => self.my_advisees(&caller),
            ("GET", ["lecturers"]) => self.lecturers(&caller, query),
            ("GET", ["lecturers", id, "advisees"]) => self.advisees_of(&caller, id),
            ("GET", ["students"]) => self.students(&caller, query),
            ("GET", ["students", id]) => self.student(id),
            ("GET", ["students", id, "achievements"]) => self.student_achievements(&caller, id),
            ("PUT", ["students", id, "advisor"]) => self.assign_advisor(&caller, id, body),

            ("GET", ["users"]) => self.users(&caller, query, false),
            ("GET", ["users", "deleted"]) => self.users(&caller, query, true),
            ("GET", ["users", id]) => self.user_record(&caller, id),
            ("POST", ["users"]) => self.create_user(&caller, body),
            ("PUT", ["users", id]) => self.update_user(&caller, id, body),
            ("DELETE", ["users", id]) => self.set_deleted(&caller, id, true),
            ("POST", ["users", id, "restore"]) => self.set_deleted(&caller, id, false),
            ("DELETE", ["users", id, "hard-delete"]) => self.hard_delete(&caller, id),
            ("PUT", ["users", id, "role"]) => self.assign_role(&caller, id, body),
            ("GET", ["roles"]) => self.roles(),

            ("GET", ["notifications"]) => self.notifications(&caller, query),
            ("GET", ["notifications", "unread", "count"]) => self.unread_count(&caller),
            ("PUT", ["notifications", "read-all"]) => self.mark_read(&caller, None),
            ("PUT", ["notifications", id, "read"]) => self.mark_read(&caller, Some(*id)),

            ("POST", ["files", "upload"]) => self.upload(),
            ("DELETE", ["files", name]) => self.delete_upload(name),

            ("GET", ["reports", "statistics"]) => self.statistics(&caller),
            ("GET", ["reports", "top-students"]) => self.top_students(&caller),
            ("GET", ["reports", "students", id]) => self.student_report(&caller, id),

            _ => Err(failure(StatusCode::NOT_FOUND, "Route not found")),
        };

        result.map_or_else(|err| err, |reply| (StatusCode::OK, reply))
    }

    fn login(&self, body: &Value) -> Result<Value, Reply> {
        let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
        let password = body.get("password").and_then(Value::as_str).unwrap_or_default();
        let user = self
            .users
            .iter()
            .find(|user| user.username == username && !user.deleted)
            .filter(|_| password == PASSWORD)
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid username or password"))?;

        success(
            "Login successful",
            json!({
                "token": format!("{TOKEN_PREFIX}{}", user.id),
                "refresh_token": format!("{REFRESH_PREFIX}{}", user.id),
                "user": user.profile_json(),
                "permissions": [],
            }),
        )
    }

    fn register(&mut self, body: &Value) -> Result<Value, Reply> {
        let field = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default().trim().to_string();
        let username = field("username");
        if self.users.iter().any(|user| user.username == username) {
            return Err(failure(StatusCode::CONFLICT, "Username already exists"));
        }
        let role = field("role_name")
            .parse::<Role>()
            .map_err(|_| failure(StatusCode::BAD_REQUEST, "Invalid role"))?;
        let user = StubUser::new(&format!("user-{}", self.users.len() + 1), &username, &field("full_name"), role);
        self.users.push(user);
        success("User registered successfully", Value::Null)
    }

    /// Refreshed access tokens carry a generation suffix so tests can tell them apart.
    fn refresh(&mut self, body: &Value) -> Result<Value, Reply> {
        let presented = body.get("refresh_token").and_then(Value::as_str).unwrap_or_default();
        let user_id = presented
            .strip_prefix(REFRESH_PREFIX)
            .and_then(|rest| rest.split('~').next())
            .filter(|id| self.user(id).is_some_and(|user| !user.deleted))
            .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Invalid refresh token"))?
            .to_string();

        self.refreshes += 1;
        let generation = self.refreshes;
        success(
            "Token refreshed",
            json!({
                "token": format!("{TOKEN_PREFIX}{user_id}~{generation}"),
                "refresh_token": format!("{REFRESH_PREFIX}{user_id}~{generation}"),
            }),
        )
    }

    fn require(caller: &StubUser, role: Role) -> Result<(), Reply> {
        if caller.role == role {
            Ok(())
        } else {
            Err(failure(StatusCode::FORBIDDEN, "Forbidden"))
        }
    }

    fn relation(&self, caller: &StubUser, owner: &str) -> Relation {
        if caller.id == owner {
            Relation::Owner
        } else if self.user(owner).and_then(|student| student.advisor.as_deref()) == Some(caller.id.as_str()) {
            Relation::Advisor
        } else {
            Relation::Unrelated
        }
    }

    fn visible(&self, caller: &StubUser, item: &StubAchievement) -> bool {
        match caller.role {
            Role::Admin => true,
            Role::Student => item.owner == caller.id,
            Role::Lecturer => self.relation(caller, &item.owner) == Relation::Advisor,
        }
    }

    fn achievement_json(&self, item: &StubAchievement) -> Value {
        let owner = self.user(&item.owner);
        json!({
            "id": item.id,
            "student_id": item.owner,
            "student": {
                "id": item.owner,
                "student_id": owner.map(|user| user.student_number.clone()),
                "name": owner.map(|user| user.full_name.clone()),
                "program": "Informatika",
                "email": owner.map(StubUser::email),
            },
            "status": item.status,
            "title": item.title,
            "description": "",
            "achievement_type": item.achievement_type,
            "achieved_date": "2024-03-01",
            "data": item.data,
            "attachments": item.attachments,
            "tags": [],
            "points": if item.status == AchievementStatus::Verified { 10 } else { 0 },
            "verified_by": item.verified_by,
            "rejection_note": item.rejection_note,
            "created_at": item.created_at,
        })
    }

    fn achievement_listing(&self, caller: &StubUser, query: &HashMap<String, String>) -> Value {
        let status = query.get("status").map(String::as_str);
        let rows: Vec<Value> = self
            .achievements
            .iter()
            .filter(|item| self.visible(caller, item))
            .filter(|item| status.map_or(true, |status| item.status.as_str() == status))
            .map(|item| self.achievement_json(item))
            .collect();

        let (items, meta) = paginate(rows, query);
        let (page, limit) = page_params(query);
        let total = meta["total"].as_u64().unwrap_or_default() as usize;
        json!({
            "status": "success",
            "pagination": {
                "page": page,
                "limit": limit,
                "total": total,
                "total_pages": total.div_ceil(limit),
                "data": {"achievements": items},
            },
        })
    }

    fn list_achievements(&self, caller: &StubUser, query: &HashMap<String, String>) -> Result<Value, Reply> {
        ok(self.achievement_listing(caller, query))
    }

    fn advisee_achievements(&self, caller: &StubUser, query: &HashMap<String, String>) -> Result<Value, Reply> {
        Self::require(caller, Role::Lecturer)?;
        ok(self.achievement_listing(caller, query))
    }

    fn create_achievement(&mut self, caller: &StubUser, body: &Value) -> Result<Value, Reply> {
        let status = transition(Actor::new(caller.role, Relation::Owner), Action::Create, None)
            .map_err(workflow_failure)?;
        let title = body.get("title").and_then(Value::as_str).unwrap_or_default().trim().to_string();
        if title.is_empty() {
            return Err(failure(StatusCode::BAD_REQUEST, "Title is required"));
        }

        let id = self.allocate_id();
        let created_at = self.timestamp();
        let item = StubAchievement {
            id,
            owner: caller.id.clone(),
            title,
            achievement_type: body.get("achievement_type").and_then(Value::as_str).unwrap_or("other").to_string(),
            data: body.get("data").cloned().unwrap_or_else(|| json!({})),
            status,
            rejection_note: None,
            verified_by: None,
            created_at,
            attachments: Vec::new(),
            history: Vec::new(),
        };
        let reply = self.achievement_json(&item);
        self.achievements.push(item);
        success("Achievement created successfully", reply)
    }

    fn find_visible(&self, caller: &StubUser, id: &str) -> Result<usize, Reply> {
        self.achievements
            .iter()
            .position(|item| item.id == id && self.visible(caller, item))
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Achievement not found"))
    }

    fn achievement(&self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        let index = self.find_visible(caller, id)?;
        success("Achievement", self.achievement_json(&self.achievements[index]))
    }

    fn change(&mut self, caller: &StubUser, id: &str, action: Action, body: &Value) -> Result<Value, Reply> {
        let index = self.find_visible(caller, id)?;
        let (owner, from) = (self.achievements[index].owner.clone(), self.achievements[index].status);
        let actor = Actor::new(caller.role, self.relation(caller, &owner));
        let next = transition(actor, action, Some(from)).map_err(workflow_failure)?;

        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::trim).unwrap_or_default().to_string();
        let note = match action {
            Action::Reject => {
                let reason = text("reason");
                if reason.is_empty() {
                    return Err(failure(StatusCode::BAD_REQUEST, "Rejection note is required"));
                }
                Some(reason)
            }
            Action::Verify => Some(text("comments")).filter(|comments| !comments.is_empty()),
            _ => None,
        };

        if action == Action::Delete {
            self.achievements.remove(index);
            return success("Achievement deleted successfully", Value::Null);
        }

        let entry = json!({
            "id": format!("h-{}-{}", id, self.achievements[index].history.len() + 1),
            "old_status": from,
            "new_status": next,
            "changed_by": {"id": caller.id, "name": caller.full_name, "email": caller.email()},
            "notes": note,
            "created_at": self.timestamp(),
        });

        let item = &mut self.achievements[index];
        match action {
            Action::Edit => {
                if let Some(title) = body.get("title").and_then(Value::as_str) {
                    item.title = title.to_string();
                }
                if let Some(data) = body.get("data") {
                    item.data = data.clone();
                }
            }
            Action::Verify => item.verified_by = Some(caller.id.clone()),
            Action::Reject => item.rejection_note = note,
            _ => {}
        }
        item.status = next;
        item.history.push(entry);
        let title = item.title.clone();

        match action {
            Action::Submit => {
                let advisor = self.user(&owner).and_then(|student| student.advisor.clone());
                if let Some(advisor) = advisor {
                    self.notify(&advisor, "achievement_submitted", format!("{title} awaits verification"));
                }
            }
            Action::Verify => self.notify(&owner, "achievement_verified", format!("{title} was verified")),
            Action::Reject => self.notify(&owner, "achievement_rejected", format!("{title} was rejected")),
            _ => {}
        }

        let message = match action {
            Action::Submit => "Achievement submitted for verification",
            Action::Verify => "Achievement verified",
            Action::Reject => "Achievement rejected",
            _ => "Achievement updated successfully",
        };
        let reply = self.achievement_json(&self.achievements[index]);
        success(message, reply)
    }

    fn history(&self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        let item = &self.achievements[self.find_visible(caller, id)?];
        success(
            "History",
            json!({"achievement_id": item.id, "current_status": item.status, "history": item.history}),
        )
    }

    fn attach(&mut self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        let index = self.find_visible(caller, id)?;
        if self.relation(caller, &self.achievements[index].owner) != Relation::Owner {
            return Err(failure(StatusCode::FORBIDDEN, "Forbidden"));
        }
        let item = &mut self.achievements[index];
        let file_name = format!("upload-{}.pdf", item.attachments.len() + 1);
        item.attachments.push(json!({
            "fileName": file_name,
            "fileUrl": format!("/uploads/{file_name}"),
            "fileType": "application/pdf",
        }));
        success("Attachment uploaded", Value::Null)
    }

    fn my_advisees(&self, caller: &StubUser) -> Result<Value, Reply> {
        Self::require(caller, Role::Lecturer)?;
        let rows: Vec<Value> = self
            .users
            .iter()
            .filter(|user| !user.deleted && user.advisor.as_deref() == Some(caller.id.as_str()))
            .map(StubUser::student_json)
            .collect();
        success("Advisees", Value::Array(rows))
    }

    fn advisees_of(&self, caller: &StubUser, lecturer_id: &str) -> Result<Value, Reply> {
        if caller.role == Role::Student {
            return Err(failure(StatusCode::FORBIDDEN, "Forbidden"));
        }
        let rows: Vec<Value> = self
            .users
            .iter()
            .filter(|user| !user.deleted && user.advisor.as_deref() == Some(lecturer_id))
            .map(StubUser::student_json)
            .collect();
        success("Advisees retrieved successfully", Value::Array(rows))
    }

    fn student(&self, id: &str) -> Result<Value, Reply> {
        self.users
            .iter()
            .find(|user| user.id == id && user.role == Role::Student && !user.deleted)
            .map(StubUser::student_json)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Student not found"))
            .and_then(|student| success("Student retrieved successfully", student))
    }

    fn student_achievements(&self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        self.student(id)?;
        let rows: Vec<Value> = self
            .achievements
            .iter()
            .filter(|item| item.owner == id && self.visible(caller, item))
            .map(|item| self.achievement_json(item))
            .collect();
        ok(json!({"status": "success", "data": rows}))
    }

    fn people(&self, role: Role, render: fn(&StubUser) -> Value) -> Vec<Value> {
        self.users.iter().filter(|user| user.role == role && !user.deleted).map(render).collect()
    }

    fn lecturers(&self, caller: &StubUser, query: &HashMap<String, String>) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let (items, pagination) = paginate(self.people(Role::Lecturer, StubUser::lecturer_json), query);
        success("Lecturers", json!({"lecturers": items, "pagination": pagination}))
    }

    fn students(&self, caller: &StubUser, query: &HashMap<String, String>) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let (items, pagination) = paginate(self.people(Role::Student, StubUser::student_json), query);
        success("Students", json!({"students": items, "pagination": pagination}))
    }

    fn assign_advisor(&mut self, caller: &StubUser, id: &str, body: &Value) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let advisor = body.get("advisor_id").and_then(Value::as_str).unwrap_or_default().to_string();
        if !self.users.iter().any(|user| user.id == advisor && user.role == Role::Lecturer) {
            return Err(failure(StatusCode::NOT_FOUND, "Lecturer not found"));
        }
        let student = self
            .users
            .iter_mut()
            .find(|user| user.id == id && user.role == Role::Student)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Student not found"))?;
        student.advisor = Some(advisor);
        self.notify(id, "advisor_assigned", "An advisor was assigned to you".to_string());
        success("Advisor assigned successfully", Value::Null)
    }

    fn notify(&mut self, recipient: &str, kind: &'static str, title: String) {
        let id = format!("n-{}", self.notifications.len() + 1);
        self.notifications.push(StubNotification { id, recipient: recipient.to_string(), kind, title, read: false });
    }

    fn notifications(&self, caller: &StubUser, query: &HashMap<String, String>) -> Result<Value, Reply> {
        let rows = self
            .notifications
            .iter()
            .rev()
            .filter(|note| note.recipient == caller.id)
            .map(|note| {
                json!({
                    "id": note.id,
                    "type": note.kind,
                    "title": note.title,
                    "message": note.title,
                    "is_read": note.read,
                    "created_at": "2024-03-01T10:00:00Z",
                })
            })
            .collect();
        let (items, pagination) = paginate(rows, query);
        success("Notifications", json!({"notifications": items, "pagination": pagination}))
    }

    fn unread_count(&self, caller: &StubUser) -> Result<Value, Reply> {
        let count = self.notifications.iter().filter(|note| note.recipient == caller.id && !note.read).count();
        success("Unread count", json!({"count": count}))
    }

    fn mark_read(&mut self, caller: &StubUser, id: Option<&str>) -> Result<Value, Reply> {
        let mut matched = false;
        for note in self.notifications.iter_mut().filter(|note| note.recipient == caller.id) {
            if id.map_or(true, |id| note.id == id) {
                note.read = true;
                matched = true;
            }
        }
        if id.is_some() && !matched {
            return Err(failure(StatusCode::NOT_FOUND, "Notification not found"));
        }
        success("Marked as read", Value::Null)
    }

    fn upload(&mut self) -> Result<Value, Reply> {
        let filename = format!("upload-{}.pdf", self.uploads.len() + 1);
        self.uploads.push(filename.clone());
        let url = format!("/uploads/{filename}");
        success("File uploaded successfully", json!({"filename": filename, "url": url}))
    }

    fn delete_upload(&mut self, name: &str) -> Result<Value, Reply> {
        let index = self
            .uploads
            .iter()
            .position(|upload| upload == name)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "File not found"))?;
        self.uploads.remove(index);
        success("File deleted successfully", Value::Null)
    }

    fn users(&self, caller: &StubUser, query: &HashMap<String, String>, deleted: bool) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let rows = self.users.iter().filter(|user| user.deleted == deleted).map(StubUser::user_json).collect();
        let (items, pagination) = paginate(rows, query);
        success("Users", json!({"users": items, "pagination": pagination}))
    }

    fn user_record(&self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let user = self.user(id).ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
        success("User retrieved successfully", user.user_json())
    }

    fn create_user(&mut self, caller: &StubUser, body: &Value) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let field = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
        let username = field("username");
        if self.users.iter().any(|user| user.username == username) {
            return Err(failure(StatusCode::CONFLICT, "Username already exists"));
        }
        let role = [Role::Admin, Role::Student, Role::Lecturer]
            .into_iter()
            .find(|role| role_id(*role) == field("role_id"))
            .unwrap_or(Role::Student);
        let mut user = StubUser::new(&format!("user-{}", self.users.len() + 1), &username, &field("full_name"), role);
        user.student_number = field("student_id");
        let reply = user.user_json();
        self.users.push(user);
        success("User created successfully", reply)
    }

    fn update_user(&mut self, caller: &StubUser, id: &str, body: &Value) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let user = self.active_user_mut(id)?;
        if let Some(name) = body.get("full_name").and_then(Value::as_str) {
            user.full_name = name.to_string();
        }
        success("User updated successfully", user.user_json())
    }

    fn active_user_mut(&mut self, id: &str) -> Result<&mut StubUser, Reply> {
        self.users
            .iter_mut()
            .find(|user| user.id == id && !user.deleted)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))
    }

    fn set_deleted(&mut self, caller: &StubUser, id: &str, deleted: bool) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let user = self
            .users
            .iter_mut()
            .find(|user| user.id == id && user.deleted != deleted)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
        user.deleted = deleted;
        success(if deleted { "User deleted successfully" } else { "User restored successfully" }, Value::Null)
    }

    fn hard_delete(&mut self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let index = self
            .users
            .iter()
            .position(|user| user.id == id)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "User not found"))?;
        self.users.remove(index);
        success("User permanently deleted", Value::Null)
    }

    fn assign_role(&mut self, caller: &StubUser, id: &str, body: &Value) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let wanted = body.get("role_id").and_then(Value::as_str).unwrap_or_default();
        let role = [Role::Admin, Role::Student, Role::Lecturer]
            .into_iter()
            .find(|role| role_id(*role) == wanted)
            .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "Unknown role"))?;
        self.active_user_mut(id)?.role = role;
        success("Role assigned successfully", Value::Null)
    }

    fn roles(&self) -> Result<Value, Reply> {
        let rows: Vec<Value> = [Role::Admin, Role::Student, Role::Lecturer]
            .into_iter()
            .map(|role| json!({"id": role_id(role), "name": role, "description": role.as_str()}))
            .collect();
        success("Roles", Value::Array(rows))
    }

    fn counts_for(&self, owner: Option<&str>) -> BTreeMap<String, u64> {
        let mut counts = BTreeMap::new();
        for item in self.achievements.iter().filter(|item| owner.map_or(true, |owner| item.owner == owner)) {
            *counts.entry(item.status.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }

    fn statistics(&self, caller: &StubUser) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let mut types: BTreeMap<String, u64> = BTreeMap::new();
        for item in &self.achievements {
            *types.entry(item.achievement_type.clone()).or_insert(0) += 1;
        }
        success(
            "Statistics",
            json!({
                "achievements": self.counts_for(None),
                "achievement_types": types,
                "students": self.people(Role::Student, StubUser::student_json).len(),
                "lecturers": self.people(Role::Lecturer, StubUser::lecturer_json).len(),
            }),
        )
    }

    fn top_students(&self, caller: &StubUser) -> Result<Value, Reply> {
        Self::require(caller, Role::Admin)?;
        let mut ranked: Vec<(&StubUser, u64)> = self
            .users
            .iter()
            .filter(|user| user.role == Role::Student && !user.deleted)
            .map(|user| {
                let verified = self
                    .achievements
                    .iter()
                    .filter(|item| item.owner == user.id && item.status == AchievementStatus::Verified)
                    .count() as u64;
                (user, verified)
            })
            .filter(|(_, verified)| *verified > 0)
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.id.cmp(&b.0.id)));

        let rows: Vec<Value> = ranked
            .iter()
            .enumerate()
            .map(|(index, (user, count))| {
                json!({
                    "rank": index + 1,
                    "student_id": user.id,
                    "student_number": user.student_number,
                    "full_name": user.full_name,
                    "program_study": "Informatika",
                    "achievement_count": count,
                })
            })
            .collect();
        success("Top students", json!({"top_students": rows, "total": rows.len()}))
    }

    fn student_report(&self, caller: &StubUser, id: &str) -> Result<Value, Reply> {
        let student = self
            .user(id)
            .filter(|user| user.role == Role::Student)
            .ok_or_else(|| failure(StatusCode::NOT_FOUND, "Student not found"))?;
        let allowed = caller.role == Role::Admin
            || caller.id == student.id
            || student.advisor.as_deref() == Some(caller.id.as_str());
        if !allowed {
            return Err(failure(StatusCode::FORBIDDEN, "Forbidden"));
        }

        let counts = self.counts_for(Some(&student.id));
        let count = |status: &str| counts.get(status).copied().unwrap_or(0);
        success(
            "Student report",
            json!({
                "student": {
                    "id": student.id,
                    "user_id": student.id,
                    "student_id": student.student_number,
                    "program_study": "Informatika",
                    "full_name": student.full_name,
                    "email": student.email(),
                },
                "summary": {
                    "total_achievements": counts.values().sum::<u64>(),
                    "verified_achievements": count("verified"),
                    "pending_achievements": count("submitted"),
                    "rejected_achievements": count("rejected"),
                    "draft_achievements": count("draft"),
                },
                "achievements_by_type": {},
                "achievements_by_level": {},
            }),
        )
    }
}
