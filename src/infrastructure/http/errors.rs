//! Classification of reqwest errors into fetch errors.

use reqwest::StatusCode;

use crate::domain::errors::FetchError;

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<StatusCode> for FetchError {
    fn from(status: StatusCode) -> Self {
        FetchError::Status(status.as_u16())
    }
}
