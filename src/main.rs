//! droidpack CLI
//!
//! Entry point for the `droidpack` command-line tool.

use clap::{Parser, Subcommand};
use droidpack::descriptor::DEFAULT_DESCRIPTOR_PATH;
use droidpack::{
    resolve, FrameworkContext, RawDescriptor, Resolution, ResolutionSource, SigningRegistry,
    SourceOrigin,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "droidpack")]
#[command(about = "Android packaging descriptor resolver", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the packaging descriptor and print the result
    Resolve {
        /// Path to the descriptor file (default: pack.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Framework context file overlaying the built-in pins
        #[arg(long)]
        framework: Option<PathBuf>,

        /// Path to the signing registry (default: ~/.config/droidpack/signing.toml)
        #[arg(long)]
        signing: Option<PathBuf>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// Also write the resolution to a file
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Verify the descriptor file without resolving
    Verify {
        /// Path to the descriptor file (default: pack.toml)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// Signing registry commands
    Signing {
        #[command(subcommand)]
        action: SigningCommands,
    },
}

#[derive(Subcommand)]
enum SigningCommands {
    /// List registered signing configurations
    List {
        /// Path to the signing registry (default: ~/.config/droidpack/signing.toml)
        #[arg(long)]
        signing: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            config,
            framework,
            signing,
            human,
            out,
        } => {
            run_resolve(config, framework, signing, human, out);
        }
        Commands::Verify { config } => {
            run_verify(config);
        }
        Commands::Signing { action } => match action {
            SigningCommands::List { signing, json } => {
                run_signing_list(signing, json);
            }
        },
    }
}

fn run_resolve(
    config_path: Option<PathBuf>,
    framework_path: Option<PathBuf>,
    signing_path: Option<PathBuf>,
    human: bool,
    out: Option<PathBuf>,
) {
    let descriptor_path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR_PATH));

    let (raw, descriptor_digest) = match RawDescriptor::from_file(&descriptor_path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading descriptor: {}", e);
            process::exit(1);
        }
    };

    let mut sources = vec![
        ResolutionSource::file(
            SourceOrigin::Descriptor,
            &descriptor_path,
            descriptor_digest,
        ),
        ResolutionSource::builtin(),
    ];

    // The framework context is the scaffolding pins, overlaid by the
    // context file when one is given.
    let mut framework = FrameworkContext::scaffold();
    if let Some(ref path) = framework_path {
        match FrameworkContext::from_file(path) {
            Ok((file_ctx, digest)) => {
                framework = framework.overlay(file_ctx);
                sources.push(ResolutionSource::file(SourceOrigin::Framework, path, digest));
            }
            Err(e) => {
                eprintln!("Error loading framework context: {}", e);
                process::exit(1);
            }
        }
    }

    let registry = match load_registry(signing_path) {
        Ok((registry, source)) => {
            if let Some(source) = source {
                sources.push(source);
            }
            registry
        }
        Err(e) => {
            eprintln!("Error loading signing registry: {}", e);
            process::exit(1);
        }
    };

    let resolved = match resolve(&raw, &framework, &registry) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Resolution failed: {}", e);
            process::exit(1);
        }
    };

    let resolution = match Resolution::from_resolved(resolved) {
        Ok(r) => r.with_sources(sources),
        Err(e) => {
            eprintln!("Error computing build key: {}", e);
            process::exit(1);
        }
    };

    if let Some(ref out_path) = out {
        if let Err(e) = resolution.write_to_file(out_path) {
            eprintln!("Error writing resolution to {}: {}", out_path.display(), e);
            process::exit(1);
        }
    }

    if human {
        print_human(&resolution);
    } else {
        match resolution.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Load the signing registry from an explicit path or the default
/// location, returning the provenance source for file-backed registries.
fn load_registry(
    path: Option<PathBuf>,
) -> Result<(SigningRegistry, Option<ResolutionSource>), droidpack::RegistryError> {
    match path {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            let digest = {
                use sha2::{Digest, Sha256};
                let mut hasher = Sha256::new();
                hasher.update(&bytes);
                hex::encode(hasher.finalize())
            };
            let registry = SigningRegistry::load(&path)?.with_debug_default();
            let source = ResolutionSource::file(SourceOrigin::SigningRegistry, &path, digest);
            Ok((registry, Some(source)))
        }
        None => Ok((SigningRegistry::load_default()?, None)),
    }
}

fn print_human(resolution: &Resolution) {
    let d = &resolution.descriptor;

    println!("Resolved build for {}", d.application_id);
    println!();
    println!("  Build key: {}", resolution.build_key);
    println!("  Namespace: {}", d.namespace);
    println!(
        "  SDK: min {} / target {} / compile {}",
        d.min_sdk, d.target_sdk, d.compile_sdk
    );
    if let Some(ref ndk) = d.ndk_version {
        println!("  NDK: {}", ndk);
    }
    println!("  Version: {} ({})", d.version_name, d.version_code);
    println!(
        "  Java: source {}, target {}, Kotlin JVM {}",
        d.source_compatibility, d.target_compatibility, d.kotlin_jvm_target
    );
    println!(
        "  Desugaring: {}",
        if d.desugaring { "enabled" } else { "disabled" }
    );
    println!("  Release signing: {}", d.release_signing);
    println!("  Plugins: {}", d.plugins.join(", "));
    if !d.dependencies.is_empty() {
        println!("  Dependencies:");
        for dep in &d.dependencies {
            println!("    {}", dep);
        }
    }
    println!("  Source root: {}", d.source_root.display());

    if !resolution.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &resolution.warnings {
            println!("  - {}", warning);
        }
    }
}

fn run_verify(config_path: Option<PathBuf>) {
    let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_DESCRIPTOR_PATH));

    match RawDescriptor::from_file(&path) {
        Ok((descriptor, _)) => {
            println!("Descriptor valid: {}", path.display());
            println!();
            if let Some(ref id) = descriptor.application_id {
                println!("  Application id: {}", id);
            }
            println!("  Plugins: {}", descriptor.plugins.join(", "));
            if !descriptor.dependencies.is_empty() {
                println!("  Dependencies: {}", descriptor.dependencies.len());
            }

            let deferred: Vec<&str> = [
                ("application_id", descriptor.application_id.is_none()),
                ("min_sdk", descriptor.min_sdk.is_none()),
                ("target_sdk", descriptor.target_sdk.is_none()),
                ("compile_sdk", descriptor.compile_sdk.is_none()),
                ("version_code", descriptor.version_code.is_none()),
                ("version_name", descriptor.version_name.is_none()),
                ("release_signing", descriptor.release_signing.is_none()),
                ("source_root", descriptor.source_root.is_none()),
            ]
            .iter()
            .filter(|(_, unset)| *unset)
            .map(|(name, _)| *name)
            .collect();

            if !deferred.is_empty() {
                println!("  Deferred to framework: {}", deferred.join(", "));
            }
        }
        Err(e) => {
            eprintln!("Descriptor error: {}", e);
            process::exit(1);
        }
    }
}

fn run_signing_list(signing_path: Option<PathBuf>, json_output: bool) {
    let registry = match signing_path {
        Some(ref path) => SigningRegistry::load(path).map(SigningRegistry::with_debug_default),
        None => SigningRegistry::load_default(),
    };

    let registry = match registry {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error loading signing registry: {}", e);
            process::exit(1);
        }
    };

    let redacted: Vec<_> = registry.configs.iter().map(|c| c.redacted()).collect();

    if json_output {
        match serde_json::to_string_pretty(&redacted) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    } else {
        if redacted.is_empty() {
            println!("No signing configurations registered.");
            return;
        }

        println!(
            "Registered signing configurations ({} total):\n",
            redacted.len()
        );

        for config in &redacted {
            println!("  {}", config.name);
            if let Some(ref store) = config.store_file {
                println!("    Keystore: {}", store.display());
            }
            if let Some(ref alias) = config.key_alias {
                println!("    Key alias: {}", alias);
            }
            println!();
        }
    }
}
