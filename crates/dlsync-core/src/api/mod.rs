//! Client side of the download service REST API.
//!
//! `DownloadApi` is the seam the session talks through; [`HttpClient`] is the
//! real implementation, tests substitute in-memory fakes.

mod error;
mod http;

use std::future::Future;

use crate::job::{JobRecord, StartRequest};

pub use error::ApiError;
pub use http::HttpClient;

/// Request/response operations on the job collection.
pub trait DownloadApi {
    /// `GET /api/downloads`
    fn list(&self) -> impl Future<Output = Result<Vec<JobRecord>, ApiError>> + Send;

    /// `POST /api/downloads`; the service answers with the created record.
    fn create(
        &self,
        request: &StartRequest,
    ) -> impl Future<Output = Result<JobRecord, ApiError>> + Send;

    /// `DELETE /api/downloads/{id}`
    fn remove(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /api/downloads/{id}/pause`
    fn pause(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /api/downloads/{id}/resume`
    fn resume(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl<A: DownloadApi + Send + Sync> DownloadApi for std::sync::Arc<A> {
    fn list(&self) -> impl Future<Output = Result<Vec<JobRecord>, ApiError>> + Send {
        (**self).list()
    }

    fn create(
        &self,
        request: &StartRequest,
    ) -> impl Future<Output = Result<JobRecord, ApiError>> + Send {
        (**self).create(request)
    }

    fn remove(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).remove(id)
    }

    fn pause(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).pause(id)
    }

    fn resume(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send {
        (**self).resume(id)
    }
}
