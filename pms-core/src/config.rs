use quote::ToTokens;
use syn::{
    Expr, ExprLit, LitStr, MetaNameValue,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    spanned::Spanned,
    token::Comma,
};

pub const DEFAULT_MODULE_NAME: &str = "generated_api";

/// Options of one generation run, either from `generate_api!` arguments or
/// from a build script.
#[derive(Debug, PartialEq)]
pub struct ApiConfig {
    pub path: Option<String>,
    pub module_name: Option<String>,
    /// emit the `Api<T>` wrapper struct next to `endpoints()`
    pub wrappers: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            path: None,
            module_name: None,
            wrappers: true,
        }
    }
}

trait ExprInto<T> {
    fn expr_into(&self) -> Option<T>;
}

impl ExprInto<String> for Expr {
    fn expr_into(&self) -> Option<String> {
        if let Expr::Lit(ExprLit {
            attrs: _,
            lit: syn::Lit::Str(lit_str),
        }) = self
        {
            Some(lit_str.value())
        } else {
            None
        }
    }
}

impl ExprInto<bool> for Expr {
    fn expr_into(&self) -> Option<bool> {
        if let Expr::Lit(ExprLit {
            attrs: _,
            lit: syn::Lit::Bool(lit_bool),
        }) = self
        {
            Some(lit_bool.value())
        } else {
            None
        }
    }
}

impl Parse for ApiConfig {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        // a single string literal is the document path
        if input.peek(LitStr) {
            let path: LitStr = input.parse()?;
            return Ok(ApiConfig::new_from_path(path.value()));
        }

        let mut config = Self::default();
        let kv_pairs = Punctuated::<MetaNameValue, Comma>::parse_terminated(input)?;

        for name_value in kv_pairs {
            let name = name_value.path.to_token_stream().to_string();

            match name.as_str() {
                "path" => {
                    config.path = Some(name_value.value.expr_into().ok_or(syn::Error::new(
                        name_value.span(),
                        "'path' expects a string literal as argument",
                    ))?);
                }
                "module_name" => {
                    config.module_name =
                        Some(name_value.value.expr_into().ok_or(syn::Error::new(
                            name_value.span(),
                            "'module_name' expects a string literal as argument",
                        ))?);
                }
                "wrappers" => {
                    config.wrappers = name_value.value.expr_into().ok_or(syn::Error::new(
                        name_value.span(),
                        "'wrappers' expects a bool as argument",
                    ))?;
                }
                _ => {
                    return Err(syn::Error::new(
                        name_value.span(),
                        format!("unknown parameter: {}", name),
                    ));
                }
            }
        }

        Ok(config)
    }
}

impl ApiConfig {
    pub fn new_from_path(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn module_name(&self) -> &str {
        self.module_name.as_deref().unwrap_or(DEFAULT_MODULE_NAME)
    }
}

pub fn parse_config(input: proc_macro2::TokenStream) -> syn::Result<ApiConfig> {
    syn::parse2(input)
}

#[test]
pub fn test_parse_config() {
    let macro_args = quote::quote!("/path/to/openapi.yaml");
    let config = parse_config(macro_args).unwrap();
    assert_eq!(ApiConfig::new_from_path("/path/to/openapi.yaml"), config);

    let macro_args = quote::quote!(path = "/path/to/openapi.yaml", wrappers = false);
    let config = parse_config(macro_args).unwrap();
    assert_eq!(
        ApiConfig {
            path: Some("/path/to/openapi.yaml".to_string()),
            wrappers: false,
            ..Default::default()
        },
        config
    );

    let macro_args = quote::quote!(path = "pms.yaml", module_name = "pms_api");
    let config = parse_config(macro_args).unwrap();
    assert_eq!(config.module_name(), "pms_api");

    // error on unknown params
    let macro_args = quote::quote!(xxx = "/path/to/openapi.yaml");
    parse_config(macro_args).unwrap_err();

    // error on wrongly typed values
    let macro_args = quote::quote!(wrappers = "yes");
    parse_config(macro_args).unwrap_err();
}
