use std::borrow::Borrow;
use std::io::BufReader;
use std::str::FromStr;

use anyhow::anyhow;
use http::Method;
use openapiv3::{OpenAPI, ReferenceOr};

use crate::adapters::is_form_content_type;
use crate::types::{
    BodyKind, OperationDef, ParameterDef, ParameterLocation, RequestBodyDef, Spec,
};

pub struct OAS30Spec {
    openapi: OpenAPI,
}

trait OAS3Resolver<T> {
    fn resolve<'a, S>(&'a self, ro: &'a ReferenceOr<S>) -> anyhow::Result<&'a T>
    where
        S: Borrow<T>,
    {
        match ro {
            ReferenceOr::Reference { reference } => {
                let prefix = self.prefix();
                let name = reference.strip_prefix(prefix).ok_or_else(|| {
                    anyhow!("Only references to '{prefix}*' are supported, '{reference}' does not match")
                })?;
                self.resolve_reference(name).ok_or_else(|| {
                    anyhow!("expected reference {reference} not found in OpenAPI object")
                })
            }
            ReferenceOr::Item(s) => Ok(s.borrow()),
        }
    }

    fn prefix(&self) -> &str;
    fn resolve_reference(&self, reference: &str) -> Option<&T>;
}

impl OAS3Resolver<openapiv3::Parameter> for OpenAPI {
    fn prefix(&self) -> &str {
        "#/components/parameters/"
    }

    fn resolve_reference(&self, reference: &str) -> Option<&openapiv3::Parameter> {
        let ro = self.components.as_ref()?.parameters.get(reference)?;
        self.resolve(ro).ok()
    }
}

impl OAS3Resolver<openapiv3::RequestBody> for OpenAPI {
    fn prefix(&self) -> &str {
        "#/components/requestBodies/"
    }

    fn resolve_reference(&self, reference: &str) -> Option<&openapiv3::RequestBody> {
        let ro = self.components.as_ref()?.request_bodies.get(reference)?;
        self.resolve(ro).ok()
    }
}

impl OAS3Resolver<openapiv3::Schema> for OpenAPI {
    fn prefix(&self) -> &str {
        "#/components/schemas/"
    }

    fn resolve_reference(&self, reference: &str) -> Option<&openapiv3::Schema> {
        let ro = self.components.as_ref()?.schemas.get(reference)?;
        self.resolve(ro).ok()
    }
}

impl OAS3Resolver<openapiv3::PathItem> for OpenAPI {
    fn prefix(&self) -> &str {
        "#/paths/"
    }

    fn resolve_reference(&self, reference: &str) -> Option<&openapiv3::PathItem> {
        let ro = self.paths.paths.get(reference)?;
        self.resolve(ro).ok()
    }
}

fn extract_location(param: &openapiv3::Parameter) -> ParameterLocation {
    match param {
        openapiv3::Parameter::Query { .. } => ParameterLocation::Query,
        openapiv3::Parameter::Header { .. } => ParameterLocation::Header,
        openapiv3::Parameter::Path { .. } => ParameterLocation::Path,
        openapiv3::Parameter::Cookie { .. } => ParameterLocation::Cookie,
    }
}

impl FromStr for OAS30Spec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, anyhow::Error> {
        let openapi: OpenAPI = serde_yaml::from_str(s)?;
        Ok(openapi.into())
    }
}

impl From<OpenAPI> for OAS30Spec {
    fn from(openapi: OpenAPI) -> Self {
        OAS30Spec { openapi }
    }
}

impl OAS30Spec {
    fn parameter_defs(
        &self,
        params: &[ReferenceOr<openapiv3::Parameter>],
    ) -> anyhow::Result<Vec<ParameterDef>> {
        params
            .iter()
            .map(|ro| {
                let p: &openapiv3::Parameter = self.openapi.resolve(ro)?;
                let data = p.parameter_data_ref();
                let location = extract_location(p);
                let required = data.required || location == ParameterLocation::Path;
                Ok(ParameterDef::new(&data.name, location, required))
            })
            .collect()
    }

    /// Field names of a form body, taken from the properties of its
    /// (object) schema.
    fn form_fields(&self, media: &openapiv3::MediaType) -> anyhow::Result<Vec<ParameterDef>> {
        let Some(schema_ref) = &media.schema else {
            return Ok(Vec::new());
        };
        let schema: &openapiv3::Schema = self.openapi.resolve(schema_ref)?;
        let fields = match &schema.schema_kind {
            openapiv3::SchemaKind::Type(openapiv3::Type::Object(o)) => o
                .properties
                .keys()
                .map(|name| {
                    ParameterDef::new(
                        name,
                        ParameterLocation::FormData,
                        o.required.contains(name),
                    )
                })
                .collect(),
            _ => Vec::new(),
        };
        Ok(fields)
    }

    fn request_body(
        &self,
        op: &openapiv3::Operation,
    ) -> anyhow::Result<(Option<RequestBodyDef>, Vec<ParameterDef>)> {
        let Some(ro) = &op.request_body else {
            return Ok((None, Vec::new()));
        };
        let body: &openapiv3::RequestBody = self.openapi.resolve(ro)?;

        let form_media = if body.content.keys().all(|ct| is_form_content_type(ct)) {
            body.content.values().next()
        } else {
            None
        };
        match form_media {
            Some(media) => Ok((
                Some(RequestBodyDef {
                    kind: BodyKind::Form,
                    required: body.required,
                }),
                self.form_fields(media)?,
            )),
            None => Ok((
                Some(RequestBodyDef {
                    kind: BodyKind::Json,
                    required: body.required,
                }),
                Vec::new(),
            )),
        }
    }
}

impl Spec for OAS30Spec {
    fn from_reader(r: impl std::io::Read) -> anyhow::Result<Self> {
        let r = BufReader::new(r);
        let openapi: OpenAPI = serde_yaml::from_reader(r)?;
        Ok(OAS30Spec::from(openapi))
    }

    fn title(&self) -> &str {
        &self.openapi.info.title
    }

    fn operations(&self) -> anyhow::Result<Vec<OperationDef>> {
        let mut operations = Vec::new();
        for (path, ro) in &self.openapi.paths.paths {
            let path_item: &openapiv3::PathItem = match self.openapi.resolve(ro) {
                Ok(item) => item,
                Err(e) => {
                    log::warn!("skipping path '{path}': {e}");
                    continue;
                }
            };
            let path_item_parameters = self.parameter_defs(&path_item.parameters)?;

            let ops = [
                (Method::GET, &path_item.get),
                (Method::PUT, &path_item.put),
                (Method::POST, &path_item.post),
                (Method::DELETE, &path_item.delete),
                (Method::OPTIONS, &path_item.options),
                (Method::HEAD, &path_item.head),
                (Method::PATCH, &path_item.patch),
                (Method::TRACE, &path_item.trace),
            ];
            for (method, op) in ops {
                let Some(op) = op else { continue };
                let mut parameters = self.parameter_defs(&op.parameters)?;
                let (request_body, form_fields) = self.request_body(op)?;
                parameters.extend(form_fields);

                operations.push(OperationDef {
                    path: path.clone(),
                    method,
                    operation_id: op.operation_id.clone(),
                    summary: op.summary.clone().or_else(|| op.description.clone()),
                    path_item_parameters: path_item_parameters.clone(),
                    parameters,
                    request_body,
                });
            }
        }
        Ok(operations)
    }
}
