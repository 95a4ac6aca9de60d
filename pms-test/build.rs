use std::{env, path::Path};

use anyhow::Context;
use pms_core::ApiConfig;

fn main() -> anyhow::Result<()> {
    let input_path = Path::new("..").join("test-data").join("pms-swagger.json");
    println!("cargo::rerun-if-changed={}", input_path.display());

    let out_dir = env::var_os("OUT_DIR").context("OUT_DIR not set")?;
    let output_path = Path::new(&out_dir).join("pms_api.rs");

    let config = ApiConfig {
        module_name: Some("pms_api".to_string()),
        ..ApiConfig::new_from_path(input_path.to_string_lossy())
    };
    pms_core::generate_file(&config, &output_path)
}
