// admin/main.rs - checks a mongo client configuration file and pings the deployment

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use mongo_config::{MongoClientFactory, Standalone};
use mongodb::bson::doc;
use std::path::PathBuf;
use tracing::{info, subscriber::set_global_default};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

#[derive(Parser, Debug)]
#[clap(name = "mongo-admin")]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommands,
    /// Configuration file holding the mongo client block (.yml, .yaml or .json)
    #[arg(short, long, env = "MONGO_CONFIG", default_value = "./mongo.yml")]
    config: PathBuf,
    /// Replaces the configured server and servers with a single node
    #[arg(long, env = "MONGO_SERVER")]
    server: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    #[clap(name = "check")]
    Check,
    #[clap(name = "ping")]
    Ping {
        #[arg(short, long, default_value = "admin")]
        database: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Load environment variables from .env file
    dotenv().ok();

    // Parse CLI args, using ENV vars if not provided
    let args = Args::parse();

    // Forward log records from the driver's dependencies, then set up tracing
    LogTracer::init().map_err(|e| e.to_string())?;
    let env_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| e.to_string())?;
    let fmt_layer = fmt::layer().with_target(true);
    let subscriber = Registry::default().with(env_layer).with(fmt_layer);
    set_global_default(subscriber).map_err(|e| e.to_string())?;

    // Load and validate the configuration file
    let mut factory = MongoClientFactory::from_path(&args.config).map_err(|e| e.to_string())?;

    // Apply the server override, if any
    if let Some(server) = args.server {
        factory.override_server(&server).map_err(|e| e.to_string())?;
        info!("Overriding configured servers with {}", server);
    }

    match args.subcommand {
        Subcommands::Check => {
            let applied = factory.client_options().map_err(|e| e.to_string())?;
            let options = &applied.client_options;

            let hosts: Vec<String> = options.hosts.iter().map(ToString::to_string).collect();
            info!("Hosts: {}", hosts.join(", "));
            match factory.credentials.first() {
                Some(credential) => info!("Credential: {}", credential),
                None => info!("Credential: none"),
            }
            if let Some(name) = &options.repl_set_name {
                info!("Replica set: {}", name);
            }
            if let Some(criteria) = &options.selection_criteria {
                info!("Selection criteria: {:?}", criteria);
            }
            if let Some(concern) = &options.write_concern {
                info!("Write concern: {:?}", concern);
            }
            info!("Decoder factory: {}", applied.decoder_factory);
            info!("Configuration {} is valid.", args.config.display());
        }
        Subcommands::Ping { database } => {
            // 1. Build the client, nothing is sent until the first operation
            let client = factory.build(&Standalone).map_err(|e| e.to_string())?;

            // 2. Round trip a ping command through server selection
            client
                .database(&database)
                .run_command(doc! { "ping": 1 }, None)
                .await
                .map_err(|e| format!("Ping failed: {}", e))?;

            info!("Ping to {} succeeded.", database);
        }
    }

    Ok(())
}
