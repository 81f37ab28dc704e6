use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use authreq_api::{Client, Credentials, Method, RequestOptions};
use clap::Args;

use crate::output::{print_response, RecordingNavigator};

#[derive(Args)]
pub struct SendArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE, ...)
    pub method: String,

    /// Absolute URL, or a path resolved against --base-url
    pub url: String,

    /// Extra header as NAME:VALUE (repeatable)
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Query parameter as KEY=VALUE (repeatable)
    #[arg(long = "query", short = 'q')]
    pub params: Vec<String>,

    /// JSON request body
    #[arg(long)]
    pub json: Option<String>,

    /// Never send stored cookies
    #[arg(long)]
    pub omit_credentials: bool,
}

pub async fn run(
    args: &SendArgs,
    client: &Client,
    navigator: &Arc<RecordingNavigator>,
) -> Result<()> {
    let opts = build_options(args)?;
    let resp = client.request(&args.url, opts).await?;
    print_response(&resp);

    if let Some(target) = navigator.target() {
        eprintln!("Session expired; log in again (redirect to {}).", target);
    }
    if !resp.is_success() {
        bail!("request failed with status {}", resp.status.as_u16());
    }
    Ok(())
}

pub fn build_options(args: &SendArgs) -> Result<RequestOptions> {
    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid HTTP method: {}", args.method))?;
    let mut opts = RequestOptions::new(method);

    for header in &args.headers {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| anyhow!("header must be NAME:VALUE, got {}", header))?;
        opts.set_header(name.trim(), value.trim());
    }
    for param in &args.params {
        let (key, value) = param
            .split_once('=')
            .ok_or_else(|| anyhow!("query parameter must be KEY=VALUE, got {}", param))?;
        opts = opts.with_param(key, value);
    }
    if let Some(json) = &args.json {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| anyhow!("--json is not valid JSON: {}", e))?;
        opts = opts.with_json(&value)?;
    }
    if args.omit_credentials {
        opts = opts.with_credentials(Credentials::Omit);
    }
    Ok(opts)
}
