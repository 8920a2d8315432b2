//! Result interpretation for page loaders.
//!
//! Turns an envelope into one of: the data, a not-found signal for the
//! routing layer, or a load failure. Neither function logs or mutates.

use thiserror::Error;

use crate::api::envelope::ApiResponse;

/// Why a resource could not be handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Upstream reported 404. The router should serve its not-found page.
    #[error("resource not found")]
    NotFound,

    /// No envelope was produced at all.
    #[error("Failed to load {resource}: no response")]
    Absent { resource: String },

    /// An envelope arrived but was unsuccessful or carried no data.
    #[error("{message}")]
    Failed { resource: String, message: String },
}

impl LoadError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound)
    }

    fn failed(resource: &str, message: Option<&str>) -> Self {
        let message = match message {
            Some(message) if !message.is_empty() => message.to_string(),
            _ => format!("Failed to load {}", resource),
        };
        LoadError::Failed {
            resource: resource.to_string(),
            message,
        }
    }
}

/// Check that `response` is a success carrying data.
///
/// Returns `Err(LoadError::NotFound)` when the upstream error status is 404,
/// so the caller can hand control to its not-found route.
pub fn assert_valid<T>(response: Option<&ApiResponse<T>>, resource: &str) -> Result<(), LoadError> {
    let response = response.ok_or_else(|| LoadError::Absent {
        resource: resource.to_string(),
    })?;

    match response {
        ApiResponse::Failure { error, .. } if error.status() == 404 => Err(LoadError::NotFound),
        ApiResponse::Failure { error, .. } => {
            Err(LoadError::failed(resource, Some(error.message())))
        }
        ApiResponse::Success { data: None, .. } => Err(LoadError::failed(resource, None)),
        ApiResponse::Success { data: Some(_), .. } => Ok(()),
    }
}

/// [`assert_valid`], then hand over the data.
pub fn extract<T>(response: Option<ApiResponse<T>>, resource: &str) -> Result<T, LoadError> {
    assert_valid(response.as_ref(), resource)?;

    response
        .and_then(ApiResponse::into_data)
        .ok_or_else(|| LoadError::failed(resource, None))
}
