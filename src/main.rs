use std::io::Write;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use hoststream::config::{Config, load_config, load_config_from_path};
use hoststream::logging;
use hoststream::server::{Server, TICK};
use hoststream::system::Sampler;
use hoststream::system::platform::NativeProbe;
use hoststream::wire;

#[derive(Parser)]
#[command(
    name = "hoststream",
    about = "Stream host metrics as line-delimited JSON to one TCP client"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// IPv4 address to listen on
    #[arg(long)]
    bind: Option<Ipv4Addr>,

    /// TCP port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Volume whose free space is reported (mount point or drive root)
    #[arg(long)]
    volume: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: text, json
    #[arg(long)]
    log_format: Option<String>,

    /// Print a single record to stdout and exit instead of serving.
    #[arg(long, default_value_t = false)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init_tracing(&config.logging)?;

    let mut sampler = Sampler::new(NativeProbe::new(), config.sampler.disk_volume.clone());
    sampler.warm_up();

    if cli.once {
        return print_once(&mut sampler).await;
    }

    let server = Server::bind(&config.server)?;
    tracing::info!(
        addr = %server.local_addr()?,
        backlog = config.server.backlog,
        volume = sampler.volume(),
        "waiting for incoming connections"
    );
    server.run(&mut sampler).await;
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(ref volume) = cli.volume {
        config.sampler.disk_volume = volume.clone();
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.logging.format = format.clone();
    }

    config
}

async fn print_once(sampler: &mut Sampler<NativeProbe>) -> Result<()> {
    tokio::time::sleep(TICK).await;
    let snapshot = sampler.sample();
    let mut stdout = std::io::stdout().lock();
    wire::write_record(&mut stdout, &snapshot).wrap_err("failed to write record")?;
    stdout.flush()?;
    Ok(())
}
