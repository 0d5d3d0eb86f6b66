use anyhow::Result;
use clap::{Parser, Subcommand};
use cryptfooter::{CryptFooter, DecodeLimits, FooterLocation, FooterSource, footer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Args)]
struct LocateArgs {
    /// Where the footer starts: `end` (last 16 KiB), `start`, or a byte offset
    #[arg(long = "at", value_name = "LOCATION")]
    location: Option<FooterLocation>,

    /// Separate metadata file to read when the device has no footer at its end
    #[arg(long, value_name = "PATH", conflicts_with = "location")]
    metadata: Option<PathBuf>,
}

impl LocateArgs {
    fn read(&self, device: &FooterSource, limits: &DecodeLimits) -> Result<CryptFooter> {
        match self.location {
            Some(location) => device.read_footer(location, limits),
            None => {
                let metadata = self.metadata.clone().map(FooterSource::new);
                cryptfooter::locate(device, metadata.as_ref(), limits)
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cryptfooter")]
#[command(
    version,
    about = "Inspect the crypto footer of an Android full-disk-encrypted partition."
)]
struct Cli {
    /// Path to the block device or disk image
    #[arg(long, global = true, value_name = "PATH", env = "CRYPTFOOTER_DEVICE")]
    device: Option<PathBuf>,

    /// Largest encrypted master key accepted, in bytes
    #[arg(
        long,
        global = true,
        value_name = "BYTES",
        env = "CRYPTFOOTER_MAX_KEY_SIZE",
        default_value_t = footer::MAX_KEY_SIZE
    )]
    max_key_size: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints every footer field
    Show {
        #[command(flatten)]
        locate: LocateArgs,

        /// Print as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Prints the key derivation inputs
    Kdf {
        #[command(flatten)]
        locate: LocateArgs,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args = Cli::parse();
    let limits = DecodeLimits::new(args.max_key_size)?;
    let device = match args.device {
        Some(path) => FooterSource::new(path),
        None => anyhow::bail!("no device given; pass --device or set CRYPTFOOTER_DEVICE"),
    };

    match args.command {
        Commands::Show { locate, json } => {
            let footer = locate.read(&device, &limits)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&footer)?);
            } else {
                println!("{footer}");
            }
        }
        Commands::Kdf { locate } => {
            let footer = locate.read(&device, &limits)?;
            println!("crypt_type_name: {}", footer.crypt_type_name());
            println!("keysize:         {}", footer.keysize());
            println!("salt:            {}", hex::encode(footer.salt()));
            println!("scrypt:          {}", footer.scrypt());
        }
    }

    Ok(())
}
