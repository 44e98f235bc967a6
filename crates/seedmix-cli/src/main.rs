//! CLI for seedmix — turn pointer samples and typed text into seeds and key files.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "seedmix")]
#[command(about = "seedmix — fold pointer samples and typed text into a SHA-256 seed")]
#[command(version = seedmix_core::VERSION)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash recorded pointer samples (one "timestamp x y" per line) into a digest
    Collect {
        /// Sample file; reads stdin when omitted or "-"
        #[arg(long)]
        input: Option<String>,

        /// Free-form text mixed in at finalization
        #[arg(long)]
        text: Option<String>,

        /// Fixed 16-byte mix-in as 32 hex characters (reproducible digests)
        #[arg(long)]
        seed: Option<String>,

        /// Stop after this many samples
        #[arg(long)]
        max_samples: Option<usize>,

        /// Output format
        #[arg(long, default_value = "hex", value_parser = ["hex", "base64", "json"])]
        format: String,

        /// Also write a new key file seeded by the digest
        #[arg(long)]
        keyfile: Option<String>,

        /// JSON config file; flags override its values
        #[arg(long)]
        config: Option<String>,

        /// Do not mix the digest into the process random pool
        #[arg(long)]
        no_pool: bool,
    },

    /// Create or inspect key files
    Keyfile {
        #[command(subcommand)]
        action: KeyfileAction,
    },

    /// Print random bytes from the process random pool
    Random {
        /// Number of bytes
        #[arg(long, default_value = "32")]
        bytes: usize,

        /// Output format
        #[arg(long, default_value = "hex", value_parser = ["hex", "base64", "raw"])]
        format: String,

        /// File whose contents are added to the pool before generating
        #[arg(long)]
        mix: Option<String>,

        /// Print pool usage counters as JSON on stderr
        #[arg(long)]
        stats: bool,
    },
}

#[derive(Subcommand)]
enum KeyfileAction {
    /// Write a new XML key file (overwrites an existing file)
    Create {
        /// Output path
        path: String,

        /// Additional entropy as hex, e.g. a digest from `seedmix collect`
        #[arg(long)]
        entropy: Option<String>,
    },

    /// Show a key file's format and fingerprint (never the key)
    Show {
        /// Key file path
        path: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Collect {
            input,
            text,
            seed,
            max_samples,
            format,
            keyfile,
            config,
            no_pool,
        } => commands::collect::run(commands::collect::CollectCommandConfig {
            input: input.as_deref(),
            text: text.as_deref(),
            seed: seed.as_deref(),
            max_samples,
            format: &format,
            keyfile: keyfile.as_deref(),
            config_path: config.as_deref(),
            no_pool,
        }),
        Commands::Keyfile { action } => match action {
            KeyfileAction::Create { path, entropy } => {
                commands::keyfile::create(&path, entropy.as_deref())
            }
            KeyfileAction::Show { path, json } => commands::keyfile::show(&path, json),
        },
        Commands::Random {
            bytes,
            format,
            mix,
            stats,
        } => commands::random::run(bytes, &format, mix.as_deref(), stats),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
