use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a remote entity. The server sends numeric ids, but nothing
/// in the probe depends on that, so string ids are carried through as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

impl FromStr for EntityId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<i64>() {
            Ok(n) => EntityId::Number(n),
            Err(_) => EntityId::Text(trimmed.to_string()),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: EntityId,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: UserSummary,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardInput {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BoardPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `POST /lists` and `PUT /lists/:id`. Both fields are optional so the
/// validation scenario can send incomplete payloads.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board_id: Option<EntityId>,
}

/// Body of `POST /cards` and `PUT /cards/:id`. The server reads the owning
/// list from `list`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CardInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "list", skip_serializing_if = "Option::is_none")]
    pub list_id: Option<EntityId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentInput {
    pub text: String,
    #[serde(rename = "cardId")]
    pub card_id: EntityId,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPatch {
    pub text: String,
}

/// A throwaway user identity for one scenario run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Credentials {
    /// Builds `<prefix><suffix>@<domain>` with a random eight character suffix
    /// so repeated runs against the same server never collide.
    pub fn generate(prefix: &str, display: &str, domain: &str, password: &str) -> Self {
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_string();
        let name = if display.is_empty() {
            format!("Test User {suffix}")
        } else {
            format!("{display} Test User {suffix}")
        };
        Self {
            email: format!("{prefix}{suffix}@{domain}"),
            password: password.to_string(),
            name,
        }
    }

    pub fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            email: self.email.clone(),
            password: self.password.clone(),
            name: self.name.clone(),
        }
    }

    pub fn login_request(&self) -> LoginRequest {
        LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}
