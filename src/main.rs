use clap::{Parser, Subcommand};
use gravatar_gen::store::FsStore;
use gravatar_gen::{config, identity, output, publish};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "gravatar-gen")]
#[command(about = "Publish avatars under Gravatar-compatible hash filenames")]
#[command(long_about = "\
Publish avatars under Gravatar-compatible hash filenames

Each file in the source directory is an avatar named after its user. It is
cropped to a centered square, scaled (256x256 by default) and written as PNG
under:

  <user>.png
  sha256(<user><suffix>)   for every configured suffix
  md5(<user><suffix>)      for every configured suffix

  avatar/                  gravatar/
  ├── carol.jpg      →     carol.png, 15ab…, 6d2c…, …
  ├── 404.html       →     404.html (copied as-is)
  └── archive/             (skipped)

Files that cannot be decoded are published unchanged.

Run 'gravatar-gen gen-config' to generate a documented gravatar.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./gravatar.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source avatar directory [config: source_dir]
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Output directory [config: output_dir]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Maximum parallel workers [config: processing.max_processes]
    #[arg(long, short = 'j', global = true)]
    jobs: Option<usize>,

    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Publish the source directory (default)
    Build,
    /// Show what would be written, without writing
    Check,
    /// Print every identifier for a user name
    Targets {
        /// User name, without suffix or extension
        user: String,
    },
    /// Print a stock gravatar.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command.as_ref().unwrap_or(&Command::Build) {
        Command::Build => {
            let config = resolve_config(&cli)?;
            init_thread_pool(&config.processing);
            println!(
                "==> Publishing {} → {}",
                config.source_dir.display(),
                config.output_dir.display()
            );
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_publish_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = publish::publish(&config, Some(tx));
            printer
                .join()
                .map_err(|_| "output printer thread panicked")?;
            let summary = result?;
            println!("{}", output::format_summary(&summary));
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", config.source_dir.display());
            let plan = publish::plan(&FsStore, &config)?;
            output::print_plan(&plan);
        }
        Command::Targets { user } => {
            let config = resolve_config(&cli)?;
            if config.canonical_name {
                println!("{}", identity::canonical_filename(user));
            }
            let identities = identity::derive_identities(user, &config.suffixes, &config.schemes);
            output::print_identities(&identities);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file, then apply command-line overrides and revalidate.
fn resolve_config(cli: &Cli) -> Result<config::PublishConfig, config::ConfigError> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(source) = &cli.source {
        config.source_dir = source.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(jobs) = cli.jobs {
        config.processing.max_processes = Some(jobs);
    }
    config.validate()?;
    Ok(config)
}

/// Install the tracing subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
