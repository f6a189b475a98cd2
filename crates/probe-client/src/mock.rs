//! In-memory stand-in for the kanban API.
//!
//! Mirrors the status codes of the real server closely enough for every
//! scenario to run offline: 201 on creation, 204 on board deletion, 400 for
//! malformed list, card and comment payloads, 401 without a valid bearer
//! token, 403 on foreign boards and 404 for unknown ids. [`Fault`]s let tests
//! force a route to fail.

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use probe_core::{ProbeError, ProbeResult};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

type Reply = (StatusCode, Value);
type SharedState = Arc<Mutex<MockState>>;

#[derive(Debug, Clone)]
struct MockUser {
    id: i64,
    email: String,
    password: String,
    name: String,
}

impl MockUser {
    fn summary(&self) -> Value {
        json!({"id": self.id, "email": self.email, "name": self.name})
    }
}

#[derive(Debug, Clone)]
struct MockBoard {
    id: i64,
    title: String,
    description: Option<String>,
    user_id: i64,
    created_at: u64,
    updated_at: u64,
}

#[derive(Debug, Clone)]
struct MockList {
    id: i64,
    title: String,
    board_id: i64,
    created_at: u64,
}

#[derive(Debug, Clone)]
struct MockCard {
    id: i64,
    title: String,
    description: Option<String>,
    list_id: i64,
    created_at: u64,
}

#[derive(Debug, Clone)]
struct MockComment {
    id: i64,
    text: String,
    card_id: i64,
    user_id: i64,
    created_at: u64,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: i64,
    users: Vec<MockUser>,
    tokens: HashMap<String, i64>,
    boards: BTreeMap<i64, MockBoard>,
    lists: BTreeMap<i64, MockList>,
    cards: BTreeMap<i64, MockCard>,
    comments: BTreeMap<i64, MockComment>,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn message(status: StatusCode, text: &str) -> Reply {
    (status, json!({"message": text}))
}

fn unauthorized() -> Reply {
    message(
        StatusCode::UNAUTHORIZED,
        "Your request was made with invalid credentials.",
    )
}

fn text_field<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key).and_then(Value::as_str)
}

/// First present key among `keys`. `Some(None)` means present but not an id.
fn id_field(body: &Value, keys: &[&str]) -> Option<Option<i64>> {
    keys.iter()
        .find_map(|key| body.get(*key).filter(|v| !v.is_null()))
        .map(parse_id)
}

fn parse_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl MockState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<i64, Reply> {
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .and_then(|token| self.tokens.get(token.trim()).copied())
            .ok_or_else(unauthorized)
    }

    fn user(&self, id: i64) -> Option<&MockUser> {
        self.users.iter().find(|u| u.id == id)
    }

    fn issue_token(&mut self, user_id: i64) -> String {
        let token = format!(
            "mock.{}.{}",
            user_id,
            uuid::Uuid::new_v4().simple()
        );
        self.tokens.insert(token.clone(), user_id);
        token
    }

    fn session(&mut self, user: &MockUser) -> Value {
        let token = self.issue_token(user.id);
        json!({"user": user.summary(), "token": token})
    }

    fn register(&mut self, body: &Value) -> Reply {
        let mut errors = serde_json::Map::new();
        let email = text_field(body, "email").unwrap_or_default().trim();
        let password = text_field(body, "password").unwrap_or_default();
        let name = text_field(body, "name").unwrap_or_default().trim();
        if email.is_empty() || !email.contains('@') {
            errors.insert("email".into(), json!(["Email is not a valid email address."]));
        } else if self.users.iter().any(|u| u.email == email) {
            errors.insert("email".into(), json!(["This email address has already been taken."]));
        }
        if password.len() < 6 {
            errors.insert("password".into(), json!(["Password should contain at least 6 characters."]));
        }
        if name.is_empty() {
            errors.insert("name".into(), json!(["Name cannot be blank."]));
        }
        if !errors.is_empty() {
            return (StatusCode::UNPROCESSABLE_ENTITY, Value::Object(errors));
        }

        let user = MockUser {
            id: self.allocate_id(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.users.push(user.clone());
        (StatusCode::CREATED, self.session(&user))
    }

    fn login(&mut self, body: &Value) -> Reply {
        let email = text_field(body, "email").unwrap_or_default();
        let password = text_field(body, "password").unwrap_or_default();
        match self
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned()
        {
            Some(user) => (StatusCode::OK, self.session(&user)),
            None => message(StatusCode::UNAUTHORIZED, "Invalid credentials"),
        }
    }

    fn board_json(&self, board: &MockBoard, access_id: Option<i64>) -> Value {
        let owner = self.user(board.user_id).map(MockUser::summary);
        json!({
            "id": board.id,
            "title": board.title,
            "description": board.description,
            "userId": board.user_id,
            "createdAt": board.created_at,
            "updatedAt": board.updated_at,
            "owner": owner,
            "userRole": "admin",
            "accessId": access_id,
        })
    }

    fn owned_board(&self, board_id: i64, user_id: i64) -> Result<&MockBoard, Reply> {
        let board = self
            .boards
            .get(&board_id)
            .ok_or_else(|| message(StatusCode::NOT_FOUND, "Board not found"))?;
        if board.user_id != user_id {
            return Err(message(StatusCode::FORBIDDEN, "Access denied."));
        }
        Ok(board)
    }

    fn list_boards(&self, user_id: i64) -> Reply {
        let boards: Vec<Value> = self
            .boards
            .values()
            .filter(|b| b.user_id == user_id)
            .map(|b| self.board_json(b, None))
            .collect();
        (StatusCode::OK, Value::Array(boards))
    }

    fn create_board(&mut self, user_id: i64, body: &Value) -> Reply {
        let title = text_field(body, "title").unwrap_or_default().trim();
        if title.is_empty() {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!([{"field": "title", "message": "Title cannot be blank."}]),
            );
        }
        let id = self.allocate_id();
        let created_at = now();
        let board = MockBoard {
            id,
            title: title.to_string(),
            description: text_field(body, "description").map(str::to_string),
            user_id,
            created_at,
            updated_at: created_at,
        };
        let access_id = self.allocate_id();
        let reply = self.board_json(&board, Some(access_id));
        self.boards.insert(id, board);
        (StatusCode::CREATED, reply)
    }

    fn get_board(&self, user_id: i64, id: i64) -> Reply {
        match self.owned_board(id, user_id) {
            Ok(board) => (StatusCode::OK, self.board_json(board, None)),
            Err(reply) => reply,
        }
    }

    fn update_board(&mut self, user_id: i64, id: i64, body: &Value) -> Reply {
        if let Err(reply) = self.owned_board(id, user_id) {
            return reply;
        }
        if let Some(title) = text_field(body, "title") {
            if title.trim().is_empty() {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!([{"field": "title", "message": "Title cannot be blank."}]),
                );
            }
        }
        let Some(board) = self.boards.get_mut(&id) else {
            return message(StatusCode::NOT_FOUND, "Board not found");
        };
        if let Some(title) = text_field(body, "title") {
            board.title = title.trim().to_string();
        }
        if let Some(description) = text_field(body, "description") {
            board.description = Some(description.to_string());
        }
        board.updated_at = now();
        let board = board.clone();
        (StatusCode::OK, self.board_json(&board, None))
    }

    fn delete_board(&mut self, user_id: i64, id: i64) -> Reply {
        if let Err(reply) = self.owned_board(id, user_id) {
            return reply;
        }
        self.boards.remove(&id);
        let list_ids: Vec<i64> = self
            .lists
            .values()
            .filter(|l| l.board_id == id)
            .map(|l| l.id)
            .collect();
        for list_id in list_ids {
            self.remove_list(list_id);
        }
        (StatusCode::NO_CONTENT, Value::Null)
    }

    fn board_members(&self, user_id: i64, id: i64) -> Reply {
        match self.owned_board(id, user_id) {
            Ok(board) => {
                let members: Vec<Value> = self
                    .user(board.user_id)
                    .map(|owner| {
                        let mut member = owner.summary();
                        member["role"] = json!("admin");
                        member
                    })
                    .into_iter()
                    .collect();
                (StatusCode::OK, Value::Array(members))
            }
            Err(reply) => reply,
        }
    }

    fn list_json(list: &MockList) -> Value {
        json!({
            "id": list.id,
            "title": list.title,
            "createdAt": list.created_at,
            "BoardId": list.board_id,
        })
    }

    fn owned_list(&self, list_id: i64, user_id: i64) -> Result<&MockList, Reply> {
        let list = self
            .lists
            .get(&list_id)
            .ok_or_else(|| message(StatusCode::NOT_FOUND, "List not found"))?;
        self.owned_board(list.board_id, user_id)?;
        Ok(list)
    }

    fn remove_list(&mut self, list_id: i64) {
        self.lists.remove(&list_id);
        let card_ids: Vec<i64> = self
            .cards
            .values()
            .filter(|c| c.list_id == list_id)
            .map(|c| c.id)
            .collect();
        for card_id in card_ids {
            self.cards.remove(&card_id);
            self.comments.retain(|_, c| c.card_id != card_id);
        }
    }

    fn list_lists(&self, user_id: i64, board_id: Option<&str>) -> Reply {
        let board_filter = match board_id {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => match self.owned_board(id, user_id) {
                    Ok(_) => Some(id),
                    Err(reply) => return reply,
                },
                Err(_) => return message(StatusCode::BAD_REQUEST, "Invalid board_id"),
            },
            None => None,
        };
        let lists: Vec<Value> = self
            .lists
            .values()
            .filter(|l| match board_filter {
                Some(id) => l.board_id == id,
                None => self
                    .boards
                    .get(&l.board_id)
                    .is_some_and(|b| b.user_id == user_id),
            })
            .map(Self::list_json)
            .collect();
        (StatusCode::OK, Value::Array(lists))
    }

    fn create_list(&mut self, user_id: i64, body: &Value) -> Reply {
        let board_id = match id_field(body, &["board", "board_id"]) {
            None => {
                return message(
                    StatusCode::BAD_REQUEST,
                    &format!("board or board_id is required. Data: {}", body),
                )
            }
            Some(None) => return message(StatusCode::NOT_FOUND, "Board not found"),
            Some(Some(id)) => id,
        };
        if let Err(reply) = self.owned_board(board_id, user_id) {
            return reply;
        }
        let title = text_field(body, "title").unwrap_or_default().trim();
        if title.is_empty() {
            return message(StatusCode::BAD_REQUEST, "Validation error");
        }
        let list = MockList {
            id: self.allocate_id(),
            title: title.to_string(),
            board_id,
            created_at: now(),
        };
        let reply = Self::list_json(&list);
        self.lists.insert(list.id, list);
        (StatusCode::CREATED, reply)
    }

    fn get_list(&self, user_id: i64, id: i64) -> Reply {
        match self.owned_list(id, user_id) {
            Ok(list) => (StatusCode::OK, Self::list_json(list)),
            Err(reply) => reply,
        }
    }

    fn update_list(&mut self, user_id: i64, id: i64, body: &Value) -> Reply {
        let current_board = match self.owned_list(id, user_id) {
            Ok(list) => list.board_id,
            Err(reply) => return reply,
        };
        let target_board = match id_field(body, &["board", "board_id"]) {
            Some(Some(board_id)) if board_id != current_board => {
                if self.owned_board(board_id, user_id).is_err() {
                    return message(StatusCode::FORBIDDEN, "Access denied to target board.");
                }
                board_id
            }
            Some(None) => return message(StatusCode::FORBIDDEN, "Access denied to target board."),
            _ => current_board,
        };
        if let Some(title) = text_field(body, "title") {
            if title.trim().is_empty() {
                return message(
                    StatusCode::BAD_REQUEST,
                    "Validation error: Title cannot be blank.",
                );
            }
        }
        let Some(list) = self.lists.get_mut(&id) else {
            return message(StatusCode::NOT_FOUND, "List not found");
        };
        list.board_id = target_board;
        if let Some(title) = text_field(body, "title") {
            list.title = title.trim().to_string();
        }
        (StatusCode::OK, Self::list_json(list))
    }

    fn delete_list(&mut self, user_id: i64, id: i64) -> Reply {
        if let Err(reply) = self.owned_list(id, user_id) {
            return reply;
        }
        self.remove_list(id);
        message(StatusCode::OK, "List deleted")
    }

    fn card_json(card: &MockCard) -> Value {
        json!({
            "id": card.id,
            "title": card.title,
            "description": card.description,
            "listId": card.list_id,
            "createdAt": card.created_at,
        })
    }

    fn owned_card(&self, card_id: i64, user_id: i64) -> Result<&MockCard, Reply> {
        let card = self
            .cards
            .get(&card_id)
            .ok_or_else(|| message(StatusCode::NOT_FOUND, "Card not found"))?;
        self.owned_list(card.list_id, user_id)?;
        Ok(card)
    }

    fn list_cards(&self, user_id: i64, list_id: Option<&str>) -> Reply {
        let list_filter = match list_id {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => match self.owned_list(id, user_id) {
                    Ok(_) => Some(id),
                    Err(reply) => return reply,
                },
                Err(_) => return message(StatusCode::BAD_REQUEST, "Invalid list"),
            },
            None => None,
        };
        let cards: Vec<Value> = self
            .cards
            .values()
            .filter(|c| match list_filter {
                Some(id) => c.list_id == id,
                None => self.owned_list(c.list_id, user_id).is_ok(),
            })
            .map(Self::card_json)
            .collect();
        (StatusCode::OK, Value::Array(cards))
    }

    fn create_card(&mut self, user_id: i64, body: &Value) -> Reply {
        let list_id = match id_field(body, &["list"]) {
            None => return message(StatusCode::BAD_REQUEST, "list is required."),
            Some(None) => return message(StatusCode::NOT_FOUND, "List not found"),
            Some(Some(id)) => id,
        };
        if let Err(reply) = self.owned_list(list_id, user_id) {
            return reply;
        }
        let title = text_field(body, "title").unwrap_or_default().trim();
        if title.is_empty() {
            return message(StatusCode::BAD_REQUEST, "Validation error");
        }
        let card = MockCard {
            id: self.allocate_id(),
            title: title.to_string(),
            description: text_field(body, "description").map(str::to_string),
            list_id,
            created_at: now(),
        };
        let reply = Self::card_json(&card);
        self.cards.insert(card.id, card);
        (StatusCode::CREATED, reply)
    }

    fn get_card(&self, user_id: i64, id: i64) -> Reply {
        match self.owned_card(id, user_id) {
            Ok(card) => (StatusCode::OK, Self::card_json(card)),
            Err(reply) => reply,
        }
    }

    fn update_card(&mut self, user_id: i64, id: i64, body: &Value) -> Reply {
        if let Err(reply) = self.owned_card(id, user_id) {
            return reply;
        }
        let target_list = match id_field(body, &["list"]) {
            Some(Some(list_id)) => match self.owned_list(list_id, user_id) {
                Ok(_) => Some(list_id),
                Err(reply) => return reply,
            },
            Some(None) => return message(StatusCode::NOT_FOUND, "List not found"),
            None => None,
        };
        let Some(card) = self.cards.get_mut(&id) else {
            return message(StatusCode::NOT_FOUND, "Card not found");
        };
        if let Some(title) = text_field(body, "title") {
            card.title = title.trim().to_string();
        }
        if let Some(description) = text_field(body, "description") {
            card.description = Some(description.to_string());
        }
        if let Some(list_id) = target_list {
            card.list_id = list_id;
        }
        (StatusCode::OK, Self::card_json(card))
    }

    fn delete_card(&mut self, user_id: i64, id: i64) -> Reply {
        if let Err(reply) = self.owned_card(id, user_id) {
            return reply;
        }
        self.cards.remove(&id);
        self.comments.retain(|_, c| c.card_id != id);
        message(StatusCode::OK, "Card deleted")
    }

    fn comment_json(&self, comment: &MockComment) -> Value {
        json!({
            "id": comment.id,
            "text": comment.text,
            "cardId": comment.card_id,
            "userId": comment.user_id,
            "author": self.user(comment.user_id).map(MockUser::summary),
            "createdAt": comment.created_at,
        })
    }

    fn card_comments(&self, user_id: i64, card_id: i64) -> Reply {
        if let Err(reply) = self.owned_card(card_id, user_id) {
            return reply;
        }
        let comments: Vec<Value> = self
            .comments
            .values()
            .filter(|c| c.card_id == card_id)
            .map(|c| self.comment_json(c))
            .collect();
        (StatusCode::OK, Value::Array(comments))
    }

    fn create_comment(&mut self, user_id: i64, body: &Value) -> Reply {
        let card_id = match id_field(body, &["cardId"]) {
            None => return message(StatusCode::BAD_REQUEST, "cardId is required"),
            Some(None) => return message(StatusCode::NOT_FOUND, "Card not found"),
            Some(Some(id)) => id,
        };
        let text = text_field(body, "text").unwrap_or_default().trim();
        if text.is_empty() {
            return message(StatusCode::BAD_REQUEST, "Validation error");
        }
        if let Err(reply) = self.owned_card(card_id, user_id) {
            return reply;
        }
        let comment = MockComment {
            id: self.allocate_id(),
            text: text.to_string(),
            card_id,
            user_id,
            created_at: now(),
        };
        let reply = self.comment_json(&comment);
        self.comments.insert(comment.id, comment);
        (StatusCode::CREATED, reply)
    }

    fn owned_comment(&self, id: i64, user_id: i64) -> Result<&MockComment, Reply> {
        let comment = self
            .comments
            .get(&id)
            .ok_or_else(|| message(StatusCode::NOT_FOUND, "Comment not found"))?;
        if comment.user_id != user_id {
            return Err(message(StatusCode::FORBIDDEN, "Access denied."));
        }
        Ok(comment)
    }

    fn update_comment(&mut self, user_id: i64, id: i64, body: &Value) -> Reply {
        if let Err(reply) = self.owned_comment(id, user_id) {
            return reply;
        }
        let text = text_field(body, "text").unwrap_or_default().trim();
        if text.is_empty() {
            return message(StatusCode::BAD_REQUEST, "text is required");
        }
        let Some(comment) = self.comments.get_mut(&id) else {
            return message(StatusCode::NOT_FOUND, "Comment not found");
        };
        comment.text = text.to_string();
        let comment = comment.clone();
        (StatusCode::OK, self.comment_json(&comment))
    }

    fn delete_comment(&mut self, user_id: i64, id: i64) -> Reply {
        if let Err(reply) = self.owned_comment(id, user_id) {
            return reply;
        }
        self.comments.remove(&id);
        message(StatusCode::OK, "Comment deleted")
    }
}

fn respond((status, body): Reply) -> Response {
    if status == StatusCode::NO_CONTENT {
        status.into_response()
    } else {
        (status, Json(body)).into_response()
    }
}

fn path_id(raw: &str) -> Result<i64, Reply> {
    raw.trim()
        .parse()
        .map_err(|_| message(StatusCode::NOT_FOUND, "Not found"))
}

/// Runs `op` for an authenticated caller, answering 401 otherwise.
fn with_user<F>(state: &SharedState, headers: &HeaderMap, op: F) -> Response
where
    F: FnOnce(&mut MockState, i64) -> Reply,
{
    let mut state = state.lock();
    let reply = match state.authenticate(headers) {
        Ok(user_id) => op(&mut *state, user_id),
        Err(reply) => reply,
    };
    respond(reply)
}

/// Like [`with_user`] for routes addressing one item by path id.
fn with_item<F>(state: &SharedState, headers: &HeaderMap, raw_id: &str, op: F) -> Response
where
    F: FnOnce(&mut MockState, i64, i64) -> Reply,
{
    with_user(state, headers, |state, user_id| match path_id(raw_id) {
        Ok(id) => op(state, user_id, id),
        Err(reply) => reply,
    })
}

async fn register(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    respond(state.lock().register(&body))
}

async fn login(State(state): State<SharedState>, Json(body): Json<Value>) -> Response {
    respond(state.lock().login(&body))
}

async fn list_boards(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    with_user(&state, &headers, |s, user| s.list_boards(user))
}

async fn create_board(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    with_user(&state, &headers, |s, user| s.create_board(user, &body))
}

async fn get_board(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.get_board(user, id))
}

async fn update_board(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| {
        s.update_board(user, id, &body)
    })
}

async fn delete_board(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.delete_board(user, id))
}

async fn board_members(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.board_members(user, id))
}

async fn list_lists(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let board = params.get("board_id").or_else(|| params.get("board"));
    with_user(&state, &headers, |s, user| {
        s.list_lists(user, board.map(String::as_str))
    })
}

async fn create_list(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    with_user(&state, &headers, |s, user| s.create_list(user, &body))
}

async fn get_list(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.get_list(user, id))
}

async fn update_list(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| {
        s.update_list(user, id, &body)
    })
}

async fn delete_list(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.delete_list(user, id))
}

async fn list_cards(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let list = params.get("list");
    with_user(&state, &headers, |s, user| {
        s.list_cards(user, list.map(String::as_str))
    })
}

async fn create_card(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    with_user(&state, &headers, |s, user| s.create_card(user, &body))
}

async fn get_card(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.get_card(user, id))
}

async fn update_card(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| {
        s.update_card(user, id, &body)
    })
}

async fn delete_card(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.delete_card(user, id))
}

async fn card_comments(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(card_id): Path<String>,
) -> Response {
    with_item(&state, &headers, &card_id, |s, user, id| {
        s.card_comments(user, id)
    })
}

async fn create_comment(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    with_user(&state, &headers, |s, user| s.create_comment(user, &body))
}

async fn update_comment(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| {
        s.update_comment(user, id, &body)
    })
}

async fn delete_comment(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    with_item(&state, &headers, &id, |s, user, id| s.delete_comment(user, id))
}

/// A canned failure: requests whose method matches and whose path ends with
/// `path_suffix` get `status` instead of reaching the handler.
#[derive(Debug, Clone)]
pub struct Fault {
    method: String,
    path_suffix: String,
    status: u16,
}

impl Fault {
    pub fn new(method: &str, path_suffix: &str, status: u16) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            path_suffix: path_suffix.to_string(),
            status,
        }
    }

    fn matches(&self, method: &Method, path: &str) -> bool {
        method.as_str() == self.method && path.ends_with(&self.path_suffix)
    }
}

async fn inject_faults(
    State(faults): State<Arc<Vec<Fault>>>,
    request: Request,
    next: Next,
) -> Response {
    let hit = faults
        .iter()
        .find(|f| f.matches(request.method(), request.uri().path()));
    match hit {
        Some(fault) => {
            let status =
                StatusCode::from_u16(fault.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            tracing::debug!(path = %request.uri().path(), %status, "injected fault");
            let (status, body) = message(status, "Injected failure");
            (status, Json(body)).into_response()
        }
        None => next.run(request).await,
    }
}

/// Router serving the API under `/api`, backed by fresh in-memory state.
pub fn router() -> Router {
    router_with_faults(Vec::new())
}

/// Like [`router`], with `faults` answered before any handler runs.
pub fn router_with_faults(faults: Vec<Fault>) -> Router {
    let state: SharedState = Arc::new(Mutex::new(MockState::default()));
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/boards", get(list_boards).post(create_board))
        .route(
            "/api/boards/:id",
            get(get_board).put(update_board).delete(delete_board),
        )
        .route("/api/boards/:id/members", get(board_members))
        .route("/api/lists", get(list_lists).post(create_list))
        .route(
            "/api/lists/:id",
            get(get_list).put(update_list).delete(delete_list),
        )
        .route("/api/cards", get(list_cards).post(create_card))
        .route(
            "/api/cards/:id",
            get(get_card).put(update_card).delete(delete_card),
        )
        .route("/api/comments", post(create_comment))
        .route(
            "/api/comments/:id",
            get(card_comments).put(update_comment).delete(delete_comment),
        )
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            Arc::new(faults),
            inject_faults,
        ))
}

/// Serves the mock on `addr` until `shutdown` resolves.
pub async fn serve<F>(addr: &str, shutdown: F) -> ProbeResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "mock kanban API listening");
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// A mock bound to an ephemeral localhost port on the current runtime.
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl MockServer {
    pub async fn start() -> ProbeResult<Self> {
        Self::start_with_faults(Vec::new()).await
    }

    pub async fn start_with_faults(faults: Vec<Fault>) -> ProbeResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let result = axum::serve(listener, router_with_faults(faults))
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::warn!("mock server stopped: {}", e);
            }
        });
        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A mock running on its own thread and runtime, for callers that are not
/// async themselves (binary tests driving the CLI).
pub struct BackgroundMockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl BackgroundMockServer {
    pub fn start() -> ProbeResult<Self> {
        Self::start_with_faults(Vec::new())
    }

    pub fn start_with_faults(faults: Vec<Fault>) -> ProbeResult<Self> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<SocketAddr, String>>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                    return;
                }
            };
            runtime.block_on(async move {
                let listener = match TcpListener::bind("127.0.0.1:0").await {
                    Ok(listener) => listener,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                };
                match listener.local_addr() {
                    Ok(addr) => {
                        let _ = ready_tx.send(Ok(addr));
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e.to_string()));
                        return;
                    }
                }
                let _ = axum::serve(listener, router_with_faults(faults))
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });

        let addr = ready_rx
            .recv()
            .map_err(|e| ProbeError::Internal(format!("mock server thread exited: {}", e)))?
            .map_err(ProbeError::Internal)?;

        Ok(Self {
            addr,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }
}

impl Drop for BackgroundMockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(state: &mut MockState, email: &str) -> (i64, String) {
        let (status, body) = state.register(&json!({
            "email": email,
            "password": "password123",
            "name": "Mock User"
        }));
        assert_eq!(status, StatusCode::CREATED);
        (
            body["user"]["id"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_string(),
        )
    }

    #[test]
    fn test_register_rejects_duplicate_email() {
        let mut state = MockState::default();
        registered(&mut state, "dup@example.com");
        let (status, body) = state.register(&json!({
            "email": "dup@example.com",
            "password": "password123",
            "name": "Again"
        }));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["email"].is_array());
    }

    #[test]
    fn test_login_wrong_password_is_unauthorized() {
        let mut state = MockState::default();
        registered(&mut state, "login@example.com");
        let (status, body) = state.login(&json!({
            "email": "login@example.com",
            "password": "nope"
        }));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");
    }

    #[test]
    fn test_bearer_token_resolves_user() {
        let mut state = MockState::default();
        let (user_id, token) = registered(&mut state, "bearer@example.com");
        let mut headers = HeaderMap::new();
        assert!(state.authenticate(&headers).is_err());

        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        assert_eq!(state.authenticate(&headers).unwrap(), user_id);
    }

    #[test]
    fn test_list_creation_validation_codes() {
        let mut state = MockState::default();
        let (user, _) = registered(&mut state, "lists@example.com");
        let (_, board) = state.create_board(user, &json!({"title": "B", "description": "d"}));
        let board_id = board["id"].as_i64().unwrap();

        let (missing, _) = state.create_list(user, &json!({"title": "Test List"}));
        let (unknown, _) = state.create_list(user, &json!({"title": "Test List", "board": 99999}));
        let (empty, _) = state.create_list(user, &json!({"title": "", "board": board_id}));
        let (valid, body) = state.create_list(user, &json!({"title": "Valid", "board_id": board_id}));

        assert_eq!(missing, StatusCode::BAD_REQUEST);
        assert_eq!(unknown, StatusCode::NOT_FOUND);
        assert_eq!(empty, StatusCode::BAD_REQUEST);
        assert_eq!(valid, StatusCode::CREATED);
        assert_eq!(body["BoardId"], board_id);
    }

    #[test]
    fn test_foreign_board_is_forbidden() {
        let mut state = MockState::default();
        let (owner, _) = registered(&mut state, "owner@example.com");
        let (other, _) = registered(&mut state, "other@example.com");
        let (_, board) = state.create_board(owner, &json!({"title": "Private"}));
        let board_id = board["id"].as_i64().unwrap();

        assert_eq!(state.get_board(other, board_id).0, StatusCode::FORBIDDEN);
        assert_eq!(state.get_board(owner, board_id).0, StatusCode::OK);
    }

    #[test]
    fn test_board_delete_cascades() {
        let mut state = MockState::default();
        let (user, _) = registered(&mut state, "cascade@example.com");
        let (_, board) = state.create_board(user, &json!({"title": "B"}));
        let board_id = board["id"].as_i64().unwrap();
        let (_, list) = state.create_list(user, &json!({"title": "L", "board_id": board_id}));
        let (_, card) = state.create_card(
            user,
            &json!({"title": "C", "list": list["id"]}),
        );
        state.create_comment(user, &json!({"text": "hi", "cardId": card["id"]}));

        assert_eq!(state.delete_board(user, board_id).0, StatusCode::NO_CONTENT);
        assert!(state.lists.is_empty());
        assert!(state.cards.is_empty());
        assert!(state.comments.is_empty());
        assert_eq!(state.get_board(user, board_id).0, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_card_and_comment_require_server_keys() {
        let mut state = MockState::default();
        let (user, _) = registered(&mut state, "keys@example.com");
        let (_, board) = state.create_board(user, &json!({"title": "B"}));
        let (_, list) = state.create_list(user, &json!({"title": "L", "board": board["id"]}));

        let (status, body) = state.create_card(user, &json!({"title": "c", "list_id": list["id"]}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "list is required.");

        let (status, card) = state.create_card(user, &json!({"title": "c", "list": list["id"]}));
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = state.create_comment(user, &json!({"text": "t", "card_id": card["id"]}));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "cardId is required");

        let (status, _) = state.create_comment(user, &json!({"text": "t", "cardId": card["id"]}));
        assert_eq!(status, StatusCode::CREATED);
    }

    #[test]
    fn test_card_update_ignores_list_id_key() {
        let mut state = MockState::default();
        let (user, _) = registered(&mut state, "move@example.com");
        let (_, board) = state.create_board(user, &json!({"title": "B"}));
        let (_, first) = state.create_list(user, &json!({"title": "A", "board": board["id"]}));
        let (_, second) = state.create_list(user, &json!({"title": "Z", "board": board["id"]}));
        let (_, card) = state.create_card(user, &json!({"title": "c", "list": first["id"]}));
        let card_id = card["id"].as_i64().unwrap();

        let (_, kept) = state.update_card(user, card_id, &json!({"list_id": second["id"]}));
        assert_eq!(kept["listId"], first["id"]);

        let (_, moved) = state.update_card(user, card_id, &json!({"list": second["id"]}));
        assert_eq!(moved["listId"], second["id"]);
    }

    #[test]
    fn test_fault_matches_method_and_path_suffix() {
        let fault = Fault::new("GET", "/members", 500);
        assert!(fault.matches(&Method::GET, "/api/boards/3/members"));
        assert!(!fault.matches(&Method::POST, "/api/boards/3/members"));
        assert!(!fault.matches(&Method::GET, "/api/boards/3"));
    }
}
