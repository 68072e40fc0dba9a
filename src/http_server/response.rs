//! Success envelope: `{ "code": 0, "message": ..., "data": ..., "meta"? }`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::content::Page;

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

/// Body of a successful delete
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: bool,
}

/// Successful response with its HTTP status
pub struct ApiResponse<T> {
    status: StatusCode,
    envelope: Envelope<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                code: 0,
                message: "success",
                data,
                meta: None,
            },
        }
    }

    pub fn created(data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            envelope: Envelope {
                code: 0,
                message: "created",
                data,
                meta: None,
            },
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// Page items as `data`, counts as `meta`
    pub fn page(page: Page<T>) -> Self {
        let meta = PageMeta {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.has_more(),
        };
        let mut response = Self::ok(page.items);
        response.envelope.meta = Some(meta);
        response
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}
