use anyhow::{Context, anyhow};
use pms_model::naming::camel_case;
use pms_model::{EndpointDescriptor, EndpointTable, HttpVerb, ParamMapping};

use crate::translate;
use crate::types::{BodyKind, OperationDef, ParameterLocation, Spec};

/// Builds the endpoint table for all operations of `spec`. Every descriptor
/// is validated on insertion, so an inconsistent document (a required path
/// parameter without placeholder, an operation id used twice, ...) fails
/// here rather than at call time.
pub fn build_table<S: Spec>(spec: &S) -> anyhow::Result<EndpointTable> {
    let mut table = EndpointTable::new();
    for op in spec.operations()? {
        let endpoint = endpoint_from_operation(&op)
            .with_context(|| format!("translating {} {}", op.method, op.path))?;
        log::debug!(
            "endpoint '{}': {} {}",
            endpoint.name,
            endpoint.method,
            endpoint.path
        );
        table
            .insert(endpoint)
            .with_context(|| format!("adding {} {}", op.method, op.path))?;
    }
    Ok(table)
}

fn mapping(name: &str, required: bool) -> ParamMapping {
    let mut m = ParamMapping::new(camel_case(name), name);
    m.required = required;
    m
}

pub(crate) fn endpoint_from_operation(op: &OperationDef) -> anyhow::Result<EndpointDescriptor> {
    let verb = HttpVerb::try_from(&op.method)
        .map_err(|m| anyhow!("unsupported HTTP method {m}"))?;
    let name = op
        .operation_id
        .clone()
        .unwrap_or_else(|| translate::path_method_to_operation_name(&op.method, &op.path));

    let mut endpoint = EndpointDescriptor::new(name, verb, &op.path);
    if let Some(summary) = &op.summary {
        endpoint = endpoint.summary(summary.trim());
    }

    for p in op.merged_parameters() {
        match p.location {
            ParameterLocation::Path => {
                match endpoint
                    .path_params
                    .iter_mut()
                    .find(|m| m.internal == p.name)
                {
                    Some(existing) => existing.required = p.required,
                    None => endpoint.path_params.push(mapping(&p.name, p.required)),
                }
            }
            ParameterLocation::Query => endpoint.query_params.push(mapping(&p.name, p.required)),
            ParameterLocation::Header => {
                endpoint.header_params.push(mapping(&p.name, p.required))
            }
            ParameterLocation::FormData => endpoint.form_params.push(mapping(&p.name, p.required)),
            // the body travels as the `data` parameter, see below
            ParameterLocation::Body => (),
            ParameterLocation::Cookie => {
                log::warn!(
                    "ignoring cookie parameter '{}' of {} {}",
                    p.name,
                    op.method,
                    op.path
                );
            }
        }
    }

    if let Some(body) = &op.request_body {
        match body.kind {
            BodyKind::Json => endpoint = endpoint.body(body.required),
            // form fields were mapped above
            BodyKind::Form => (),
        }
    }

    Ok(endpoint)
}
