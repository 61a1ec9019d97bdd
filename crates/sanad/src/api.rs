//! JSON request/response layer over the dependency manager.
//!
//! Each handler takes the acting user and a JSON payload and returns an
//! [`ApiResponse`] carrying an HTTP status code and a JSON body, ready to
//! be mounted behind whatever HTTP framework hosts the platform.
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | edge created | 201 | the edge |
//! | edge updated | 200 | `{ "message", "dependency" }` |
//! | edge deleted | 200 | `{ "message" }` |
//! | read | 200 | the view |
//! | validation, duplicate, cycle, bad payload | 400 | `{ "error" }` |
//! | access denied | 403 | `{ "error" }` |
//! | not found | 404 | `{ "error" }` |
//! | storage failure | 500 | `{ "error" }` |

use crate::domain::{DependencyId, DependencyUpdate, MilestoneId, NewDependency, ProjectId, UserId};
use crate::error::{Error, ErrorKind, Result};
use crate::manager::DependencyManager;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Status code and JSON body of a handled request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// JSON body
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn created(body: Value) -> Self {
        Self { status: 201, body }
    }

    /// Error envelope for `error`
    pub fn from_error(error: &Error) -> Self {
        if error.kind() == ErrorKind::Internal {
            tracing::error!(error = %error, "Request failed");
        } else {
            tracing::debug!(error = %error, "Request rejected");
        }
        Self {
            status: error.status_code(),
            body: json!({ "error": error.to_string() }),
        }
    }

    /// True for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl From<Result<ApiResponse>> for ApiResponse {
    fn from(result: Result<ApiResponse>) -> Self {
        result.unwrap_or_else(|e| Self::from_error(&e))
    }
}

fn parse<T: DeserializeOwned>(payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| Error::Validation(format!("Invalid request payload: {e}")))
}

/// `POST /dependencies`
///
/// Payload: `{ predecessorMilestoneId, successorMilestoneId, type?, lagDays?,
/// description?, isHardConstraint?, criticalityLevel? }`.
pub async fn create_dependency(
    manager: &DependencyManager,
    user: &UserId,
    payload: Value,
) -> ApiResponse {
    let result = async {
        let request: NewDependency = parse(payload)?;
        let dependency = manager.create_dependency(user, request).await?;
        Ok::<_, Error>(ApiResponse::created(serde_json::to_value(dependency)?))
    };
    result.await.into()
}

/// `PATCH /dependencies/{id}`
///
/// Payload: any subset of `{ type, lagDays, description, status,
/// isHardConstraint, criticalityLevel }`.
pub async fn update_dependency(
    manager: &DependencyManager,
    user: &UserId,
    id: &str,
    payload: Value,
) -> ApiResponse {
    let result = async {
        let update: DependencyUpdate = parse(payload)?;
        let dependency = manager
            .update_dependency(user, &DependencyId::new(id), update)
            .await?;
        Ok::<_, Error>(ApiResponse::ok(json!({
            "message": "Dependency updated successfully",
            "dependency": dependency,
        })))
    };
    result.await.into()
}

/// `DELETE /dependencies/{id}`
pub async fn delete_dependency(manager: &DependencyManager, user: &UserId, id: &str) -> ApiResponse {
    let result = async {
        manager
            .delete_dependency(user, &DependencyId::new(id))
            .await?;
        Ok::<_, Error>(ApiResponse::ok(json!({
            "message": "Dependency deleted successfully",
        })))
    };
    result.await.into()
}

/// `GET /milestones/{id}/dependencies`
pub async fn milestone_dependencies(
    manager: &DependencyManager,
    user: &UserId,
    milestone: &str,
) -> ApiResponse {
    let result = async {
        let view = manager
            .milestone_dependencies(user, &MilestoneId::new(milestone))
            .await?;
        Ok::<_, Error>(ApiResponse::ok(serde_json::to_value(view)?))
    };
    result.await.into()
}

/// `GET /projects/{id}/dependencies`
pub async fn project_dependencies(
    manager: &DependencyManager,
    user: &UserId,
    project: &str,
) -> ApiResponse {
    let result = async {
        let view = manager
            .project_dependencies(user, &ProjectId::new(project))
            .await?;
        Ok::<_, Error>(ApiResponse::ok(serde_json::to_value(view)?))
    };
    result.await.into()
}
