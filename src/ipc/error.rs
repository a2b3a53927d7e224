use serde_json::json;

use crate::forms::{FormError, SubmitError};

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn store_write(e: anyhow::Error) -> Self {
        Self::new("store_write_failed", format!("{e:#}"))
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<SubmitError> for HandlerErr {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Invalid(f @ FormError::InvalidCredentials) => {
                Self::new("invalid_credentials", f.to_string())
            }
            SubmitError::Invalid(f) => Self::new("validation_failed", f.to_string()),
            SubmitError::Store(e) => Self::store_write(e),
        }
    }
}

/// Fold a handler body's result into a response line.
pub fn respond(id: &str, res: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match res {
        Ok(v) => ok(id, v),
        Err(e) => e.response(id),
    }
}
