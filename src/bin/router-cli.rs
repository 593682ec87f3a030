use std::path::PathBuf;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use resource_router::config::{load_config, RouterConfig};
use resource_router::media::{ClientPreferences, MediaType, PreferenceList};
use resource_router::negotiation::{negotiate_response_type, StaticSerializers};
use resource_router::resources::build_dispatcher;
use resource_router::routing::{RequestContext, Resolution};
use resource_router::template::{compile, RemainingPath};

#[derive(Parser)]
#[command(name = "router-cli")]
#[command(about = "Inspect routing and negotiation for a resource-router config", long_about = None)]
struct Cli {
    /// Router configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List root templates and the routes of every resource
    Routes,
    /// Resolve and dispatch a request offline
    Resolve {
        method: String,
        path: String,
        #[arg(long)]
        accept: Option<String>,
        #[arg(long)]
        accept_language: Option<String>,
        #[arg(long)]
        accept_charset: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        /// Request entity
        #[arg(long, default_value = "")]
        body: String,
    },
    /// Pick a response media type for a list of producible types
    Negotiate {
        /// Comma-separated producible media types
        #[arg(long, value_delimiter = ',')]
        produces: Vec<String>,
        #[arg(long)]
        accept: Option<String>,
    },
    /// Compile a template and optionally match a path against it
    Template { template: String, path: Option<String> },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    let output = match cli.command {
        Commands::Routes => routes(&config),
        Commands::Resolve {
            method,
            path,
            accept,
            accept_language,
            accept_charset,
            content_type,
            body,
        } => {
            let preferences =
                ClientPreferences::from_headers(accept.as_deref(), accept_language.as_deref(), accept_charset.as_deref());
            let mut request = RequestContext::new(Method::from_bytes(method.to_ascii_uppercase().as_bytes())?, path)
                .with_preferences(preferences);
            if !body.is_empty() {
                let entity_type = match content_type {
                    Some(value) => value.parse()?,
                    None => MediaType::octet_stream(),
                };
                request = request.with_entity_type(entity_type);
            }
            resolve(&config, &request, body.as_bytes())?
        }
        Commands::Negotiate { produces, accept } => {
            let produces = produces.iter().map(|p| p.parse()).collect::<Result<Vec<MediaType>, _>>()?;
            let accepted: PreferenceList<MediaType> =
                accept.as_deref().map(PreferenceList::parse_header).unwrap_or_default();
            match negotiate_response_type(&produces, "", &accepted, &StaticSerializers::new()) {
                Ok(media_type) => json!({ "media_type": media_type.to_string() }),
                Err(e) => json!({ "error": e.to_string() }),
            }
        }
        Commands::Template { template, path } => {
            let compiled = compile(&template)?;
            let matched = path.map(|p| match compiled.match_path(&RemainingPath::new(&p)) {
                Some(m) => json!({
                    "matched": m.matched(),
                    "remaining": m.remaining().as_str(),
                    "variables": m.variables().iter().map(|(n, v)| json!([n, v])).collect::<Vec<_>>(),
                }),
                None => Value::Null,
            });
            json!({
                "template": compiled.as_str(),
                "pattern": compiled.pattern(),
                "variables": compiled.variables(),
                "literal_characters": compiled.literal_character_count(),
                "capturing_groups": compiled.capturing_group_count(),
                "match": matched,
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn routes(config: &RouterConfig) -> Value {
    let resources: Vec<Value> = config
        .resources
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "path": r.path,
                "methods": r.methods.iter().map(|m| json!({
                    "name": m.name,
                    "verb": m.verb.to_ascii_uppercase(),
                    "path": m.path,
                    "consumes": m.consumes,
                    "produces": m.produces,
                })).collect::<Vec<_>>(),
                "locators": r.locators.iter().map(|l| json!({
                    "name": l.name,
                    "path": l.path,
                    "target": l.target,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();

    let roots = match build_dispatcher(config) {
        Ok(dispatcher) => json!(dispatcher.resolver().registry().root_templates()),
        Err(errors) => json!({ "errors": errors.iter().map(ToString::to_string).collect::<Vec<_>>() }),
    };
    json!({ "roots": roots, "resources": resources })
}

fn resolve(config: &RouterConfig, request: &RequestContext, entity: &[u8]) -> Result<Value, Box<dyn std::error::Error>> {
    let dispatcher = build_dispatcher(config).map_err(|errors| {
        errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    })?;

    let resolution = match dispatcher.resolver().resolve(request) {
        Ok(Resolution::Method(resolved)) => json!({
            "resource": resolved.resource.resource_type.name(),
            "method": resolved.method.name,
            "verb": resolved.method.http_method.as_str(),
            "template": resolved.template.as_str(),
            "parameters": resolved.parameters.iter().map(|(n, v)| json!([n, v])).collect::<Vec<_>>(),
            "matched_paths": resolved.matched_paths,
        }),
        Ok(Resolution::Options { allowed }) => json!({
            "options": allowed.iter().map(Method::as_str).collect::<Vec<_>>(),
        }),
        Err(e) => json!({ "status": e.status().as_u16(), "error": e.to_string() }),
    };

    let response = match dispatcher.dispatch(request, entity) {
        Ok(response) => json!({
            "status": response.status.as_u16(),
            "media_type": response.media_type.map(|m| m.to_string()),
            "language": response.language.map(|l| l.to_string()),
            "charset": response.character_set.map(|c| c.to_string()),
            "allow": response.allow.iter().map(Method::as_str).collect::<Vec<_>>(),
            "body": String::from_utf8_lossy(&response.body),
        }),
        Err(e) => json!({
            "status": e.status().as_u16(),
            "error": e.to_string(),
            "allow": e.allowed_methods().iter().map(Method::as_str).collect::<Vec<_>>(),
        }),
    };

    Ok(json!({ "resolution": resolution, "response": response }))
}
