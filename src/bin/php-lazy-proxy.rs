use anyhow::Context;
use clap::{Parser, Subcommand};
use php_lazy_proxy::export::export_method_signature;
use php_lazy_proxy::reflection::hierarchy::find_method;
use php_lazy_proxy::tracing_config::init_tracing;
use php_lazy_proxy::{ClassRegistry, GeneratedClass, GeneratorConfig, LazyProxyGenerator, ReflectionProvider};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "php-lazy-proxy")]
#[command(about = "Generate lazy ghost and lazy proxy classes from PHP reflection dumps", long_about = None)]
struct Cli {
    /// JSON class descriptor file, or directory of them (repeatable)
    #[arg(short = 'r', long = "registry", required = true)]
    registries: Vec<PathBuf>,

    /// Namespace of the runtime support library
    #[arg(long)]
    namespace: Option<String>,

    /// Never declare generated classes readonly
    #[arg(long)]
    no_readonly: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a lazy ghost for a class
    Ghost {
        /// Fully-qualified class name
        class: String,

        /// Emit a complete declaration with this class name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },
    /// Generate a lazy virtual proxy for a class and/or interfaces
    Proxy {
        /// Class to extend
        #[arg(short = 'c', long)]
        class: Option<String>,

        /// Interface to implement (repeatable)
        #[arg(short = 'i', long = "interface")]
        interfaces: Vec<String>,

        /// Emit a complete declaration with this class name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },
    /// Print the exported signature of a method
    Signature {
        class: String,
        method: String,

        /// Leave parameter types out
        #[arg(long)]
        no_types: bool,
    },
}

fn emit(generated: &GeneratedClass, name: Option<&str>) {
    match name {
        Some(name) => print!("{}", generated.declare(name)),
        None => print!("{}", generated.body),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut registry = ClassRegistry::new();
    for path in &cli.registries {
        registry
            .load_path(path)
            .with_context(|| format!("loading {}", path.display()))?;
    }

    let mut config = GeneratorConfig::default();
    if let Some(ns) = cli.namespace {
        config.support_namespace = ns;
    }
    if cli.no_readonly {
        config.readonly_classes = false;
    }
    let generator = LazyProxyGenerator::new(&registry).with_config(config);

    match cli.command {
        Command::Ghost { class, name } => {
            let ghost = generator.generate_lazy_ghost_for(&class)?;
            emit(&ghost, name.as_deref());
        }
        Command::Proxy {
            class,
            interfaces,
            name,
        } => {
            let interfaces: Vec<&str> = interfaces.iter().map(String::as_str).collect();
            let proxy = generator.generate_lazy_proxy_for(class.as_deref(), &interfaces)?;
            emit(&proxy, name.as_deref());
        }
        Command::Signature {
            class,
            method,
            no_types,
        } => {
            let descriptor = registry
                .get_class(&class)
                .with_context(|| format!("class \"{}\" does not exist", class))?;
            let found = find_method(&registry, descriptor, &method)
                .with_context(|| format!("method \"{}::{}()\" does not exist", class, method))?;
            let exported = export_method_signature(&registry, found, !no_types);
            println!("{}", exported.signature);
            println!("{}", exported.args);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_registry_precedes_subcommand() {
        let cli = Cli::try_parse_from([
            "php-lazy-proxy",
            "-r",
            "classes.json",
            "proxy",
            "--class",
            "App\\Mailer",
        ])
        .unwrap();
        assert_eq!(cli.registries, [PathBuf::from("classes.json")]);
        assert!(matches!(cli.command, Command::Proxy { class: Some(ref c), .. } if c == "App\\Mailer"));
    }
}
