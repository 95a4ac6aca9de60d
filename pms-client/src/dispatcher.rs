use http::Request;
use pms_model::{
    ApiError, ApiResult, CallParameters, EndpointDescriptor, HeaderSet, parse_body,
};
use url::Url;

use crate::request::build_request;
use crate::transport::{ReqwestTransport, Transport};

/// Generic dispatch for every endpoint of a table. Holds no per-call state;
/// the caller passes the header snapshot of each call.
///
/// Calls are never retried, timed out or cached. A failed call surfaces
/// exactly once as [ApiError::RequestFailed].
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    base_url: Url,
    transport: T,
}

impl Dispatcher<ReqwestTransport> {
    pub fn with_reqwest(base_url: Url) -> Self {
        Self::new(base_url, ReqwestTransport::new())
    }
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(base_url: Url, transport: T) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_request(
        &self,
        endpoint: &EndpointDescriptor,
        params: &CallParameters,
        headers: &HeaderSet,
    ) -> Result<Request<Vec<u8>>, ApiError> {
        build_request(self.base_url.as_str(), endpoint, params, headers)
    }

    pub async fn call(
        &self,
        endpoint: &EndpointDescriptor,
        params: &CallParameters,
        headers: &HeaderSet,
    ) -> Result<ApiResult, ApiError> {
        let request = self.build_request(endpoint, params, headers)?;
        log::debug!("{} {} ({})", request.method(), request.uri(), endpoint.name);

        let response = self.transport.send(request).await.map_err(|e| {
            log::warn!("'{}' got no response: {e}", endpoint.name);
            ApiError::transport(e)
        })?;

        let status = response.status();
        let body = parse_body(response.body());
        if status.is_success() {
            Ok(ApiResult::new(
                body,
                HeaderSet::from(response.headers()),
                status.as_u16(),
            ))
        } else {
            log::debug!("'{}' failed with status {status}", endpoint.name);
            Err(ApiError::status(status.as_u16(), body))
        }
    }
}
