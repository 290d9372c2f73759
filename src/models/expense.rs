use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Expense entity as held by the store
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub note: String,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Public JSON representation of the record
    pub fn to_response(&self) -> ExpenseResponse {
        ExpenseResponse {
            description: self.description.clone(),
            note: self.note.clone(),
            amount: self.amount,
            created_at: self.created_at,
            id: self.id,
        }
    }
}

/// Serialized expense returned by every expense endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "description": "Travel",
    "note": "Plane ticket to Los Angeles",
    "amount": 400.99,
    "createdAt": "2024-01-15T12:00:00Z",
    "id": "550e8400-e29b-41d4-a716-446655440000"
}))]
pub struct ExpenseResponse {
    pub description: String,
    pub note: String,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl From<Expense> for ExpenseResponse {
    fn from(expense: Expense) -> Self {
        expense.to_response()
    }
}

/// Client-supplied creation time: epoch milliseconds or an RFC 3339 string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CreatedAt {
    Millis(i64),
    Timestamp(DateTime<Utc>),
}

impl CreatedAt {
    /// Returns `None` when the milliseconds fall outside the representable range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            CreatedAt::Millis(millis) => DateTime::from_timestamp_millis(*millis),
            CreatedAt::Timestamp(timestamp) => Some(*timestamp),
        }
    }
}

pub const REQUIRED_FIELDS: [&str; 3] = ["description", "note", "amount"];

/// Request payload for creating an expense
///
/// Documents the body shape only. Bodies are read as untyped JSON so that
/// presence is checked before types and the first missing field can be
/// reported by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "description": "Groceries",
    "note": "Weekly shop",
    "amount": 42.50
}))]
pub struct CreateExpenseRequest {
    pub description: Option<String>,
    pub note: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
    pub created_at: Option<CreatedAt>,
}

/// Request payload for replacing an expense's description, note and amount
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": "550e8400-e29b-41d4-a716-446655440000",
    "description": "Travel",
    "note": "Plane ticket to Los Angeles",
    "amount": 400.99
}))]
pub struct UpdateExpenseRequest {
    pub id: Option<String>,
    pub description: Option<String>,
    pub note: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Decimal>,
}

/// Why a body field could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Missing `{0}` in request body")]
    Missing(&'static str),

    #[error("Invalid `{field}` in request body: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

fn present<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get(field).filter(|value| !value.is_null())
}

/// First of description, note, amount absent from the body; `null` counts as absent
pub fn first_missing_field(body: &Value) -> Option<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .find(|field| present(body, field).is_none())
}

fn string_field(body: &Value, field: &'static str) -> Result<String, FieldError> {
    match present(body, field) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(FieldError::Invalid {
            field,
            message: "Must be a string".to_string(),
        }),
        None => Err(FieldError::Missing(field)),
    }
}

fn amount_field(body: &Value) -> Result<Decimal, FieldError> {
    let invalid = || FieldError::Invalid {
        field: "amount",
        message: "Must be a number".to_string(),
    };
    match present(body, "amount") {
        Some(Value::Number(number)) => {
            let raw = number.to_string();
            Decimal::from_str(&raw)
                .or_else(|_| Decimal::from_scientific(&raw))
                .map_err(|_| invalid())
        }
        Some(_) => Err(invalid()),
        None => Err(FieldError::Missing("amount")),
    }
}

fn created_at_field(body: &Value) -> Result<Option<DateTime<Utc>>, FieldError> {
    let Some(raw) = present(body, "createdAt") else {
        return Ok(None);
    };
    serde_json::from_value::<CreatedAt>(raw.clone())
        .ok()
        .and_then(|created_at| created_at.to_datetime())
        .map(Some)
        .ok_or_else(|| FieldError::Invalid {
            field: "createdAt",
            message: "Invalid date".to_string(),
        })
}

/// The `id` member of an update body exactly as sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyId {
    Absent,
    Text(String),
    /// Any non-string JSON value, kept in its JSON rendering
    Other(String),
}

impl BodyId {
    pub fn from_json(body: &Value) -> Self {
        match body.get("id") {
            None => BodyId::Absent,
            Some(Value::String(id)) => BodyId::Text(id.clone()),
            Some(other) => BodyId::Other(other.to_string()),
        }
    }

    /// Only a string equal to the path id matches
    pub fn matches(&self, path_id: &str) -> bool {
        matches!(self, BodyId::Text(id) if id == path_id)
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyId::Absent => f.write_str("undefined"),
            BodyId::Text(id) | BodyId::Other(id) => f.write_str(id),
        }
    }
}

/// Expense data accepted by the store; all required fields are present by construction
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub description: String,
    pub note: String,
    pub amount: Decimal,
    /// `None` lets the store stamp the creation time
    pub created_at: Option<DateTime<Utc>>,
}

impl NewExpense {
    /// Reads a creation body: required fields are checked for presence in
    /// order before any of them is type-checked, then `createdAt`.
    pub fn from_json(body: &Value) -> Result<Self, FieldError> {
        if let Some(field) = first_missing_field(body) {
            return Err(FieldError::Missing(field));
        }
        Ok(Self {
            description: string_field(body, "description")?,
            note: string_field(body, "note")?,
            amount: amount_field(body)?,
            created_at: created_at_field(body)?,
        })
    }
}

/// Replacement values applied in place by an update
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseChanges {
    pub description: String,
    pub note: String,
    pub amount: Decimal,
}

impl ExpenseChanges {
    /// Reads the replacement values; other members such as `id` are ignored
    pub fn from_json(body: &Value) -> Result<Self, FieldError> {
        if let Some(field) = first_missing_field(body) {
            return Err(FieldError::Missing(field));
        }
        Ok(Self {
            description: string_field(body, "description")?,
            note: string_field(body, "note")?,
            amount: amount_field(body)?,
        })
    }
}
