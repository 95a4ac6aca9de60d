use std::collections::HashSet;

use anyhow::anyhow;
use pms_model::{EndpointDescriptor, EndpointTable, HttpVerb, ParamMapping};
use proc_macro2::{Ident, Span, TokenStream};
use quote::{format_ident, quote};

use crate::config::ApiConfig;
use crate::translate::operation_to_rust_fn_name;

// useful read on working with proc_macro2, quote and syn:
// https://petanode.com/posts/rust-proc-macro/

/// Writes the module for `table`: an `endpoints()` function rebuilding the
/// table at runtime and, if enabled, the `Api<T>` wrapper with one method
/// per endpoint.
pub(crate) fn write_to_token_stream(
    table: &EndpointTable,
    config: &ApiConfig,
) -> anyhow::Result<TokenStream> {
    let module_ident = syn::parse_str::<Ident>(config.module_name())
        .map_err(|_| anyhow!("'{}' is not a valid module name", config.module_name()))?;

    let descriptors = table.iter().map(write_descriptor);
    let wrappers = if config.wrappers {
        write_wrappers(table)?
    } else {
        TokenStream::new()
    };

    Ok(quote! {
        pub mod #module_ident {
            #![allow(dead_code)]

            /// All endpoints of the API description this module was generated from.
            pub fn endpoints() -> ::pms_client::model::EndpointTable {
                let descriptors: ::std::vec::Vec<::pms_client::model::EndpointDescriptor> =
                    vec![#(#descriptors),*];
                descriptors.into_iter().collect()
            }

            #wrappers
        }
    })
}

fn write_verb(verb: HttpVerb) -> TokenStream {
    let variant = format_ident!("{}", format!("{verb:?}"));
    quote!(::pms_client::model::HttpVerb::#variant)
}

fn write_mappings(mappings: &[ParamMapping]) -> TokenStream {
    let items = mappings.iter().map(|m| {
        let external = &m.external;
        let internal = &m.internal;
        let required = m.required;
        quote! {
            ::pms_client::model::ParamMapping {
                external: #external.to_string(),
                internal: #internal.to_string(),
                required: #required,
            }
        }
    });
    quote!(vec![#(#items),*])
}

fn write_descriptor(e: &EndpointDescriptor) -> TokenStream {
    let name = &e.name;
    let method = write_verb(e.method);
    let path = &e.path;
    let path_params = write_mappings(&e.path_params);
    let query_params = write_mappings(&e.query_params);
    let header_params = write_mappings(&e.header_params);
    let form_params = write_mappings(&e.form_params);
    let has_body = e.has_body;
    let body_required = e.body_required;
    let summary = match &e.summary {
        Some(s) => quote!(::std::option::Option::Some(#s.to_string())),
        None => quote!(::std::option::Option::None),
    };
    quote! {
        ::pms_client::model::EndpointDescriptor {
            name: #name.to_string(),
            method: #method,
            path: #path.to_string(),
            path_params: #path_params,
            query_params: #query_params,
            header_params: #header_params,
            form_params: #form_params,
            has_body: #has_body,
            body_required: #body_required,
            summary: #summary,
        }
    }
}

fn write_wrappers(table: &EndpointTable) -> anyhow::Result<TokenStream> {
    let mut seen = HashSet::new();
    let mut methods = Vec::new();
    for e in table.iter() {
        let fn_name = operation_to_rust_fn_name(&e.name);
        if !seen.insert(fn_name.clone()) {
            return Err(anyhow!(
                "operation '{}' maps to function name '{fn_name}' which is already taken",
                e.name
            ));
        }
        let fn_ident = Ident::new(&fn_name, Span::call_site());
        let name = &e.name;
        let mut doc = format!(" `{} {}`", e.method, e.path);
        if let Some(summary) = &e.summary {
            doc = format!(" {summary}\n\n{doc}");
        }
        methods.push(quote! {
            #[doc = #doc]
            pub async fn #fn_ident(
                &self,
                params: &::pms_client::model::CallParameters,
            ) -> ::std::result::Result<::pms_client::model::ApiResult, ::pms_client::model::ApiError> {
                self.client.call(#name, params).await
            }
        });
    }

    Ok(quote! {
        /// Typed entry points, one per endpoint.
        pub struct Api<T: ::pms_client::Transport> {
            client: ::pms_client::ApiClient<T>,
        }

        impl<T: ::pms_client::Transport> Api<T> {
            pub fn new(
                dispatcher: ::pms_client::Dispatcher<T>,
                session: ::pms_client::HeaderSession,
            ) -> Self {
                Self {
                    client: ::pms_client::ApiClient::new(dispatcher, session, endpoints()),
                }
            }

            pub fn client(&self) -> &::pms_client::ApiClient<T> {
                &self.client
            }

            #(#methods)*
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_tokenstreams_eq::assert_tokenstreams_eq;

    #[test]
    fn test_write_descriptor() {
        let e = EndpointDescriptor::new(
            "category_read",
            HttpVerb::Get,
            "/api/project/category/{id}/",
        )
        .query("categoryType", "category_type");

        let ts = write_descriptor(&e);
        let ts_reference = quote!(
            ::pms_client::model::EndpointDescriptor {
                name: "category_read".to_string(),
                method: ::pms_client::model::HttpVerb::Get,
                path: "/api/project/category/{id}/".to_string(),
                path_params: vec![::pms_client::model::ParamMapping {
                    external: "id".to_string(),
                    internal: "id".to_string(),
                    required: true,
                }],
                query_params: vec![::pms_client::model::ParamMapping {
                    external: "categoryType".to_string(),
                    internal: "category_type".to_string(),
                    required: false,
                }],
                header_params: vec![],
                form_params: vec![],
                has_body: false,
                body_required: false,
                summary: ::std::option::Option::None,
            }
        );
        assert_tokenstreams_eq!(&ts, &ts_reference);
    }

    #[test]
    fn test_module_is_valid_rust() -> anyhow::Result<()> {
        let mut table = EndpointTable::new();
        table.insert(
            EndpointDescriptor::new("message_create", HttpVerb::Post, "/api/message/message/")
                .body(true)
                .summary("Create a message"),
        )?;
        table.insert(EndpointDescriptor::new(
            "message_delete",
            HttpVerb::Delete,
            "/api/message/message/{id}/",
        ))?;

        let ts = write_to_token_stream(&table, &ApiConfig::default())?;
        let file = syn::parse2::<syn::File>(ts.clone())?;
        assert_eq!(file.items.len(), 1);
        let code = ts.to_string();
        assert!(code.contains("pub mod generated_api"));
        assert!(code.contains("pub async fn message_create"));
        assert!(code.contains("pub async fn message_delete"));

        let without = ApiConfig {
            wrappers: false,
            ..ApiConfig::default()
        };
        let code = write_to_token_stream(&table, &without)?.to_string();
        assert!(!code.contains("pub struct Api"));
        Ok(())
    }

    #[test]
    fn test_function_name_clash() -> anyhow::Result<()> {
        let mut table = EndpointTable::new();
        table.insert(EndpointDescriptor::new("userList", HttpVerb::Get, "/a/"))?;
        table.insert(EndpointDescriptor::new("user_list", HttpVerb::Get, "/b/"))?;
        assert!(write_to_token_stream(&table, &ApiConfig::default()).is_err());
        Ok(())
    }
}
