use std::path::{Path, PathBuf};

use proc_macro::TokenStream;
use proc_macro2::Span;

/// Generates the endpoint table and typed wrappers for an API description.
///
/// ```ignore
/// pms_macro::generate_api!("test-data/pms-swagger.json");
/// pms_macro::generate_api!(path = "pms.yaml", module_name = "pms_api", wrappers = false);
/// ```
///
/// Relative paths are resolved against the manifest directory of the crate
/// invoking the macro.
#[proc_macro]
pub fn generate_api(input: TokenStream) -> TokenStream {
    match expand(input.into()) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn resolve(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::var_os("CARGO_MANIFEST_DIR") {
        Some(dir) => Path::new(&dir).join(path),
        None => path.to_path_buf(),
    }
}

fn expand(input: proc_macro2::TokenStream) -> syn::Result<proc_macro2::TokenStream> {
    let config = pms_core::parse_config(input)?;
    let Some(path) = config.path.as_deref() else {
        return Err(syn::Error::new(
            Span::call_site(),
            "missing 'path' to the API description",
        ));
    };
    let path = resolve(path);
    pms_core::generate_from_path(&path, &config)
        .map_err(|e| syn::Error::new(Span::call_site(), format!("{e:#}")))
}
