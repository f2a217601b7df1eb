// srpd - Secure Remote Password authentication server.
//
// Binds a TCP socket and runs one SRP handshake per connection against the
// configured identity and password.

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use std::sync::Arc;

use srpd::{accept_loop, Credential, GroupParameters};

#[derive(Parser, Debug)]
#[command(name = "srpd")]
#[command(about = "Run a Secure Remote Password protocol server")]
#[command(version)]
struct Args {
    /// Server hostname
    #[arg(short = 'H', long)]
    hostname: String,

    /// Server port
    #[arg(short, long)]
    port: u16,

    /// Client identifier
    #[arg(short = 'I', long)]
    id: String,

    /// Expected client password
    #[arg(short = 'P', long)]
    password: String,

    /// Hex-encoded group modulus; defaults to the built-in 1536-bit MODP
    /// prime
    #[arg(long)]
    modulus: Option<String>,

    /// Group generator, used only with --modulus
    #[arg(long, default_value_t = 2)]
    generator: u64,

    /// Group multiplier constant, used only with --modulus
    #[arg(long, default_value_t = 3)]
    multiplier: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let group = match &args.modulus {
        Some(modulus_hex) => {
            let mut rng = StdRng::from_entropy();
            GroupParameters::from_hex(modulus_hex, args.generator, args.multiplier, &mut rng)
                .context("invalid group parameters")?
        }
        None => GroupParameters::modp_1536(),
    };
    let group = Arc::new(group);
    let credential = Arc::new(Credential::new(args.id, args.password.into_bytes()));

    let listener = TcpListener::bind((args.hostname.as_str(), args.port))
        .await
        .with_context(|| format!("could not bind {}:{}", args.hostname, args.port))?;
    tracing::info!("listening on {}:{}", args.hostname, args.port);
    tracing::info!("<Ctrl-C> to stop");

    accept_loop(listener, group, credential).await;
    Ok(())
}
