//! mcpdemo CLI - drives the demo host one call per invocation.
//!
//! Commands:
//! - `latin`, `latin-resource` - Latin mangler as a tool or a resource
//! - `gods`, `greeting` - table and template resources
//! - `add` - integer addition tool
//! - `chat`, `review`, `commit` - prompts answered by Ollama
//! - `inspect` - everything the host advertises

#![forbid(unsafe_code)]

mod config;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use console::style;

use mcpdemo::{CapabilityReport, DemoClient, OllamaClient};
use mcpdemo_core::logging::{LoggingConfig, debug, targets};
use mcpdemo_core::{McpError, McpResult};

use crate::config::{FileConfig, Overrides, Settings};

/// mcpdemo - talk to the MCP demo host.
#[derive(Parser)]
#[command(name = "mcpdemo")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Ollama API URL [default: http://localhost:11434].
    #[arg(long, global = true, env = "MCPDEMO_OLLAMA_URL")]
    ollama_url: Option<String>,

    /// Path to the mcpdemo-server binary [default: next to this executable].
    #[arg(long, global = true, env = "MCPDEMO_SERVER_PATH")]
    server_path: Option<PathBuf>,

    /// Ollama model to use [default: llama3].
    #[arg(long, global = true, env = "MCPDEMO_MODEL")]
    model: Option<String>,

    /// Config file [default: <config dir>/mcpdemo/config.toml].
    #[arg(long, global = true, env = "MCPDEMO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform text to ancient Latin using the tool.
    Latin {
        /// Text to transform.
        text: String,
    },

    /// Transform text to ancient Latin using the resource.
    LatinResource {
        /// Text to transform.
        text: String,
    },

    /// Get Greek gods data.
    Gods {
        /// Maximum number of records to return.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Get a personalized greeting.
    Greeting {
        /// Name to greet.
        name: String,
    },

    /// Add two integers using the tool.
    Add {
        /// First number.
        #[arg(allow_negative_numbers = true)]
        a: i64,
        /// Second number.
        #[arg(allow_negative_numbers = true)]
        b: i64,
    },

    /// Chat about MCP.
    Chat {
        /// Message or question about MCP.
        message: String,
    },

    /// Get a code review.
    Review {
        /// Code to review.
        code: String,

        /// Programming language.
        #[arg(long, default_value = mcpdemo::prompts::DEFAULT_LANGUAGE)]
        language: String,
    },

    /// Get a commit message suggestion.
    Commit {
        /// Git diff or description of changes.
        changes: String,
    },

    /// Inspect the host's tools, resources and prompts.
    Inspect {
        /// Output format (text, json, yaml).
        #[arg(long, short = 'f', default_value = "text")]
        format: InspectFormat,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InspectFormat {
    Text,
    Json,
    Yaml,
}

impl std::str::FromStr for InspectFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            _ => Err(format!("Unknown format: {s}. Expected: text, json, yaml")),
        }
    }
}

fn main() -> ExitCode {
    LoggingConfig::from_env().init();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        let _ = Cli::command().print_help();
        return ExitCode::FAILURE;
    };

    let overrides = Overrides {
        ollama_url: cli.ollama_url,
        model: cli.model,
        server_path: cli.server_path,
    };

    let result = FileConfig::discover(cli.config.as_deref())
        .map(|file| Settings::resolve(overrides, file))
        .and_then(|settings| run(&settings, command));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Connects, runs one command, and disconnects.
fn run(settings: &Settings, command: Commands) -> McpResult<()> {
    debug!(
        target: targets::MCPDEMO,
        "Using server {} and Ollama {} ({})",
        settings.server_path.display(),
        settings.ollama_url,
        settings.model
    );
    let ollama = OllamaClient::new(&settings.ollama_url, &settings.model);
    let mut demo = DemoClient::connect(&settings.server_path, ollama)?;

    let output = match command {
        Commands::Latin { text } => demo.transform_to_ancient_latin(&text),
        Commands::LatinResource { text } => demo.ancient_latin_resource(&text),
        Commands::Gods { limit } => demo.greek_gods(limit).and_then(|gods| to_json(&gods)),
        Commands::Greeting { name } => demo.greeting(&name),
        Commands::Add { a, b } => demo.add(a, b).map(|sum| sum.to_string()),
        Commands::Chat { message } => demo.chat_about_mcp(&message),
        Commands::Review { code, language } => demo.code_review(&code, &language),
        Commands::Commit { changes } => demo.commit_message(&changes),
        Commands::Inspect { format } => demo.inspect().and_then(|report| match format {
            InspectFormat::Text => Ok(format_inspect_text(&report)),
            InspectFormat::Json => to_json(&report),
            InspectFormat::Yaml => serde_yaml::to_string(&report)
                .map(|yaml| yaml.trim_end().to_string())
                .map_err(|e| McpError::internal_error(format!("YAML serialization error: {e}"))),
        }),
    };
    demo.close();

    let output = output?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{output}")?;
    stdout.flush()?;
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> McpResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("JSON serialization error: {e}")))
}

fn format_inspect_text(report: &CapabilityReport) -> String {
    let mut lines = vec![
        format!(
            "{} {} v{}",
            style("Server:").bold(),
            report.server.name,
            report.server.version
        ),
        format!("{} {}", style("Protocol:").bold(), report.protocol_version),
    ];
    if let Some(instructions) = &report.instructions {
        lines.push(format!("{} {}", style("Instructions:").bold(), instructions));
    }

    let mut section = |title: &str, entries: Vec<(String, Option<&str>)>| {
        if entries.is_empty() {
            return;
        }
        lines.push(String::new());
        lines.push(format!("{} ({}):", style(title).cyan().bold(), entries.len()));
        for (name, detail) in entries {
            match detail {
                Some(detail) => lines.push(format!("  - {name}: {}", style(detail).dim())),
                None => lines.push(format!("  - {name}")),
            }
        }
    };

    section(
        "Tools",
        report
            .tools
            .iter()
            .map(|t| (t.name.clone(), t.description.as_deref()))
            .collect(),
    );
    section(
        "Resources",
        report
            .resources
            .iter()
            .map(|r| (format!("{} ({})", r.uri, r.name), r.description.as_deref()))
            .collect(),
    );
    section(
        "Resource Templates",
        report
            .resource_templates
            .iter()
            .map(|t| (format!("{} ({})", t.uri_template, t.name), t.description.as_deref()))
            .collect(),
    );
    section(
        "Prompts",
        report
            .prompts
            .iter()
            .map(|p| (p.name.clone(), p.description.as_deref()))
            .collect(),
    );

    lines.join("\n")
}
