//! `maplive run`: one compile and one transform, no debouncing.

use std::fs;

use anyhow::{Context, Result, bail};

use super::InputArgs;
use crate::actor::display::write_json;
use crate::config::AppConfig;
use crate::remote::{FhirMappingClient, RemoteCompiler, RemoteTransformer};
use crate::resource::SourceResource;

pub fn run(config: &AppConfig, inputs: &InputArgs) -> Result<()> {
    let mapping = fs::read_to_string(&inputs.map)
        .with_context(|| format!("failed to read {}", inputs.map.display()))?;
    let source = fs::read_to_string(&inputs.source)
        .with_context(|| format!("failed to read {}", inputs.source.display()))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;
    rt.block_on(run_once(config, &mapping, &source))
}

async fn run_once(config: &AppConfig, mapping: &str, source: &str) -> Result<()> {
    let client = FhirMappingClient::from_config(&config.server)?;

    // Decode first: a bad source should not cost a compile round trip
    let source = match SourceResource::decode(source) {
        Ok(source) => source,
        Err(e) => {
            crate::logger::status_error("invalid source", &e.to_string());
            bail!("{}", e);
        }
    };

    let artifact = match client.compile(mapping).await {
        Ok(artifact) => artifact,
        Err(e) => {
            crate::logger::status_error("compile failed", &e.outcome().summary());
            bail!("compile failed");
        }
    };
    crate::log!("compile"; "{}", artifact.url);
    if let Some(path) = &config.output.structure_map {
        write_json(path, &artifact.resource, config.output.pretty)?;
    }

    let result = match client.transform(&artifact, &source).await {
        Ok(result) => result,
        Err(e) => {
            crate::logger::status_error("transform failed", &e.outcome().summary());
            bail!("transform failed");
        }
    };

    match &config.output.result {
        Some(path) => {
            write_json(path, &result.0, config.output.pretty)?;
            crate::log!("transform"; "wrote {}", path.display());
        }
        None => {
            let rendered = if config.output.pretty {
                serde_json::to_string_pretty(&result.0)?
            } else {
                serde_json::to_string(&result.0)?
            };
            println!("{rendered}");
        }
    }
    Ok(())
}
