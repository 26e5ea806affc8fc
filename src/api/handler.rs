//! Request routing and the item endpoints.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::api::error::{ApiError, ApiResult};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::model::{CreateItemRequest, HealthStatus, ItemList, ItemPatch, UpdateItemRequest};
use crate::store::ItemStore;

const ITEMS_PATH: &str = "/items";
const ITEM_PREFIX: &str = "/items/";

/// A request target resolved to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Items,
    /// `/items/{id}`; `None` when the segment is empty or nested
    Item(Option<String>),
    Unknown,
}

impl Route {
    pub fn parse(path: &str) -> Self {
        if path == "/health" {
            return Route::Health;
        }
        if path == ITEMS_PATH {
            return Route::Items;
        }

        match path.strip_prefix(ITEM_PREFIX) {
            Some(id) if !id.is_empty() && !id.contains('/') => Route::Item(Some(id.to_string())),
            Some(_) => Route::Item(None),
            None => Route::Unknown,
        }
    }
}

/// Translates HTTP requests into store calls.
#[derive(Clone)]
pub struct ApiHandler {
    store: Arc<dyn ItemStore>,
}

impl ApiHandler {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn handle(&self, req: &Request) -> Response {
        let route = req
            .target_path()
            .map(|path| Route::parse(&path))
            .unwrap_or(Route::Unknown);

        let response = match route {
            Route::Health => Response::json(StatusCode::Ok, &HealthStatus::ok()),
            Route::Items => self.handle_items(req),
            Route::Item(Some(id)) => self.handle_item(req, &id),
            Route::Item(None) | Route::Unknown => ApiError::NotFound.into_response(),
        };

        tracing::debug!(
            method = req.method.as_str(),
            path = %req.path,
            status = response.status.as_u16(),
            "Request handled"
        );

        response
    }

    fn handle_items(&self, req: &Request) -> Response {
        let result = match req.method {
            Method::GET => self.list_items(),
            Method::POST => self.create_item(&req.body),
            _ => return Response::empty(StatusCode::MethodNotAllowed),
        };

        result.unwrap_or_else(ApiError::into_response)
    }

    fn handle_item(&self, req: &Request, id: &str) -> Response {
        let result = match req.method {
            Method::GET => self.get_item(id),
            Method::PUT => self.update_item(id, &req.body),
            Method::DELETE => self.delete_item(id),
            _ => return Response::empty(StatusCode::MethodNotAllowed),
        };

        result.unwrap_or_else(ApiError::into_response)
    }

    fn list_items(&self) -> ApiResult<Response> {
        let items = self.store.list()?;
        Ok(Response::json(StatusCode::Ok, &ItemList::from(items)))
    }

    fn create_item(&self, body: &[u8]) -> ApiResult<Response> {
        let req: CreateItemRequest = decode_body(body)?;
        let name = non_empty_trimmed(&req.name).ok_or(ApiError::InvalidName)?;

        let item = self.store.create(name)?;
        tracing::info!(id = %item.id, "Item created");
        Ok(Response::json(StatusCode::Created, &item))
    }

    fn get_item(&self, id: &str) -> ApiResult<Response> {
        let item = self.store.get(id)?;
        Ok(Response::json(StatusCode::Ok, &item))
    }

    fn update_item(&self, id: &str, body: &[u8]) -> ApiResult<Response> {
        let req: UpdateItemRequest = decode_body(body)?;

        let name = match req.name.as_deref() {
            Some(raw) => Some(non_empty_trimmed(raw).ok_or(ApiError::InvalidName)?),
            None => None,
        };
        let patch = ItemPatch {
            name,
            done: req.done,
        };

        let item = self.store.update(id, patch)?;
        Ok(Response::json(StatusCode::Ok, &item))
    }

    fn delete_item(&self, id: &str) -> ApiResult<Response> {
        self.store.delete(id)?;
        tracing::info!(id, "Item deleted");
        Ok(Response::empty(StatusCode::NoContent))
    }
}

/// Decodes a JSON body. A literal `null` yields the default payload.
fn decode_body<T>(body: &[u8]) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    let decoded: Option<T> = serde_json::from_slice(body)?;
    Ok(decoded.unwrap_or_default())
}

/// Trims surrounding whitespace; `None` if nothing is left.
pub fn non_empty_trimmed(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
