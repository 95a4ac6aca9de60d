//! Data model shared by the PMS endpoint generator and the runtime client.

pub mod descriptor;
pub mod error;
pub mod headers;
pub mod naming;
pub mod params;
pub mod result;
pub mod template;

pub use descriptor::{
    DescriptorError, EndpointDescriptor, EndpointTable, HttpVerb, ParamMapping, TableLoadError,
};
pub use error::{ApiError, BoxError, StoreError};
pub use headers::{HeaderError, HeaderSet};
pub use params::{BODY_PARAM, CallParameters, value_to_param_string};
pub use result::{ApiResult, parse_body};
pub use template::{AuthToken, Template};
