use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use xml_analyst::{config::Config, server, summarize};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /api/analyze
    Serve {
        #[clap(long)]
        host: Option<String>,

        #[clap(short, long)]
        port: Option<u16>,
    },
    /// Print the structural summary of a local XML file
    Summarize {
        file: PathBuf,

        #[clap(long)]
        max_samples: Option<usize>,

        #[clap(long)]
        top_n: Option<usize>,

        #[clap(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    let config = Arc::new(Config::load(&args.config)?);

    match args.command {
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.get_host().to_string());
            let port = port.unwrap_or_else(|| config.get_port());
            server::serve(config, &host, port).await?;
        }
        Command::Summarize {
            file,
            max_samples,
            top_n,
            json,
        } => {
            let mut options = config.get_summary_options();
            if let Some(max_samples) = max_samples {
                options.max_sample_nodes = max_samples;
            }
            if let Some(top_n) = top_n {
                options.top_n = top_n;
            }

            info!("Summarizing {}", file.display());
            let bytes = fs::read(&file)?;
            let summary = summarize(&bytes, options)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", summary);
            }
        }
    }

    Ok(())
}
