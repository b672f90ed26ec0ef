//! Component Codegen CLI
//!
//! Builds the native library, compiles protobuf messages and generates the
//! component builder modules.

use anyhow::Context;
use clap::{Parser, Subcommand};
use component_codegen::codegen::generate_from_dir;
use component_codegen::native::NativeBuild;
use component_codegen::protos::{rewrite_package, MessageCompiler};
use component_codegen::publish::{check, publish};
use component_codegen::CodegenConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "component-codegen")]
#[command(about = "Generate component builders from JSON schemas")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to codegen.toml if present)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate components.py and variant_message_map.py
    Components {
        /// Only verify the published files are up to date
        #[arg(long)]
        check: bool,
    },

    /// Compile protobuf messages and make their imports package-relative
    Protos {
        /// Skip protoc, only rewrite existing message modules
        #[arg(long)]
        skip_compile: bool,
    },

    /// Build the native library and copy it into the package
    Native,

    /// Run native, protos and components in order
    All,

    /// Print the effective configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when a check found stale output
fn run(cli: Cli) -> anyhow::Result<bool> {
    let config = CodegenConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Components { check: true } => check_components(&config),
        Commands::Components { check: false } => {
            build_components(&config)?;
            Ok(true)
        }
        Commands::Protos { skip_compile } => {
            build_protos(&config, skip_compile)?;
            Ok(true)
        }
        Commands::Native => {
            build_native(&config)?;
            Ok(true)
        }
        Commands::All => {
            build_native(&config)?;
            build_protos(&config, false)?;
            build_components(&config)?;
            Ok(true)
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(true)
        }
    }
}

fn build_native(config: &CodegenConfig) -> anyhow::Result<()> {
    println!("🔨 Building native library");
    let build = NativeBuild::from_config(config);
    println!("  Profile: {}", build.profile());

    let installed = build.run()?;
    for path in &installed {
        println!("    - file copied: {}", path.display());
    }
    println!("✅ {} native artifact(s) installed", installed.len());
    Ok(())
}

fn build_protos(config: &CodegenConfig, skip_compile: bool) -> anyhow::Result<()> {
    println!("📦 Building protobuf message modules");
    let report = if skip_compile {
        rewrite_package(&config.package_dir())?
    } else {
        MessageCompiler::new(config.prototypes_dir(), config.package_dir()).run()?
    };
    println!(
        "✅ {} module(s) scanned, {} import(s) rewritten",
        report.files_scanned, report.lines_rewritten
    );
    Ok(())
}

fn build_components(config: &CodegenConfig) -> anyhow::Result<()> {
    println!("🧩 Generating component builders");
    println!("  Schemas: {}", config.components_dir().display());

    let generated = generate_from_dir(&config.components_dir(), config)?;
    let artifacts = generated.artifacts(config)?;
    publish(&artifacts)?;

    for artifact in &artifacts {
        println!("    - file written: {}", artifact.path.display());
    }
    println!(
        "✅ {} builder(s) generated (fingerprint {})",
        generated.function_count,
        generated.fingerprint.short()
    );
    Ok(())
}

fn check_components(config: &CodegenConfig) -> anyhow::Result<bool> {
    let generated = generate_from_dir(&config.components_dir(), config)?;
    let stale = check(&generated.artifacts(config)?)?;

    if stale.is_empty() {
        println!("✅ Generated components are up to date");
        return Ok(true);
    }

    for artifact in &stale {
        println!("❌ {} is stale", artifact.path.display());
        print!("{}", artifact.diff);
    }
    Ok(false)
}
