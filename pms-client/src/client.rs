use pms_model::{ApiError, ApiResult, CallParameters, EndpointTable};

use crate::dispatcher::Dispatcher;
use crate::session::HeaderSession;
use crate::transport::Transport;

/// Calls endpoints of a table by operation name, with the headers of a
/// session.
pub struct ApiClient<T> {
    dispatcher: Dispatcher<T>,
    session: HeaderSession,
    table: EndpointTable,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(dispatcher: Dispatcher<T>, session: HeaderSession, table: EndpointTable) -> Self {
        Self {
            dispatcher,
            session,
            table,
        }
    }

    pub async fn call(&self, name: &str, params: &CallParameters) -> Result<ApiResult, ApiError> {
        let endpoint = self
            .table
            .get(name)
            .ok_or_else(|| ApiError::UnknownEndpoint(name.to_string()))?;
        let headers = self.session.snapshot();
        self.dispatcher.call(endpoint, params, &headers).await
    }

    pub fn table(&self) -> &EndpointTable {
        &self.table
    }

    pub fn session(&self) -> &HeaderSession {
        &self.session
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }
}
