//! Runtime side of the PMS client: composes requests from endpoint
//! descriptors, sends them through a [Transport] and keeps the client-side
//! session state (headers, token, message templates).

mod client;
mod config;
mod dispatcher;
mod request;
mod session;
mod storage;
mod templates;
mod token;
mod transport;

pub use pms_model as model;

pub use client::ApiClient;
pub use config::{ClientConfig, ConfigError, DEV_FALLBACK_HOST};
pub use dispatcher::Dispatcher;
pub use request::build_request;
pub use session::HeaderSession;
pub use storage::{FileStorage, MemoryStorage, Storage, TEMPLATE_LIST_KEY, TOKEN_KEY};
pub use templates::TemplateStore;
pub use token::TokenStore;
pub use transport::{ReqwestTransport, Transport};
