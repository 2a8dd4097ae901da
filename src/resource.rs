//! Ergonomic per-method front: rewrite a [`Resource`] description into a
//! [`RequestRecord`] and forward it to a [`Dispatcher`].
//!
//! `get`/`post`/`put`/`patch`/`delete`/`head` are each a thin wrapper
//! that attaches a method before driving the batch; the mixed
//! `request()` entry point instead requires the caller to have attached
//! one already, per-resource.

use std::sync::Arc;

use serde_json::Value;

use crate::cache::Cache;
use crate::config::DriverConfig;
use crate::dispatcher::{Dispatcher, ResponseDriver};
use crate::error::{Error, UsageError};
use crate::request::{Body, Method, OrderedPairs, RequestRecord};

/// A caller-facing request description, builder-style. Unlike
/// [`RequestRecord`], `method` is optional here: the per-method
/// constructors (`get`, `post`, ...) fill it in; the mixed [`request`]
/// entry point requires it to already be set.
#[derive(Debug, Clone, Default)]
pub struct Resource {
    method: Option<Method>,
    url: Option<String>,
    headers: OrderedPairs,
    params: OrderedPairs,
    body: Body,
    timeout_seconds: Option<u64>,
}

impl Resource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn headers(mut self, headers: OrderedPairs) -> Self {
        self.headers = headers;
        self
    }

    pub fn params(mut self, params: OrderedPairs) -> Self {
        self.params = params;
        self
    }

    pub fn raw_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Raw(body.into());
        self
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    fn into_request(self, method: Method) -> Result<RequestRecord, UsageError> {
        let url = self.url.ok_or(UsageError::MissingUrl)?;
        Ok(RequestRecord {
            method,
            url,
            headers: self.headers,
            params: self.params,
            body: self.body,
            timeout_seconds: self.timeout_seconds,
        })
    }

    /// Resolve into a [`RequestRecord`], requiring the method to already
    /// be set (the mixed [`request`] entry point).
    fn into_request_mixed(self) -> Result<RequestRecord, UsageError> {
        let method = self.method.ok_or(UsageError::MissingMethod)?;
        self.into_request(method)
    }
}

/// Build a one-shot [`Dispatcher`] and drive `resources` through it,
/// converting them to [`RequestRecord`]s with `method` first (§4.4
/// Inputs).
fn drive_with_method(
    method: Method,
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    let requests = resources
        .into_iter()
        .map(|resource| resource.into_request(method))
        .collect::<Result<Vec<_>, _>>()?;
    let dispatcher = Dispatcher::new(DriverConfig::with_batch_size(batch_size), cache)?;
    Ok(dispatcher.drive(requests))
}

/// GET every resource.
pub fn get(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    drive_with_method(Method::Get, resources, batch_size, cache)
}

/// POST every resource.
pub fn post(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    drive_with_method(Method::Post, resources, batch_size, cache)
}

/// PUT every resource.
pub fn put(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    drive_with_method(Method::Put, resources, batch_size, cache)
}

/// PATCH every resource.
pub fn patch(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    drive_with_method(Method::Patch, resources, batch_size, cache)
}

/// DELETE every resource.
pub fn delete(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    drive_with_method(Method::Delete, resources, batch_size, cache)
}

/// HEAD every resource.
pub fn head(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    drive_with_method(Method::Head, resources, batch_size, cache)
}

/// Mixed entry point: every resource must already carry its own method
/// (via [`Resource::method`]), checked immediately at the construction
/// boundary, before any worker starts (§7 `UsageError` policy).
pub fn request(
    resources: Vec<Resource>,
    batch_size: usize,
    cache: Arc<dyn Cache>,
) -> Result<ResponseDriver, Error> {
    let requests = resources
        .into_iter()
        .map(Resource::into_request_mixed)
        .collect::<Result<Vec<_>, _>>()?;
    let dispatcher = Dispatcher::new(DriverConfig::with_batch_size(batch_size), cache)?;
    Ok(dispatcher.drive(requests))
}
