use clap::{Parser, Subcommand};

/// modelcat: resolve usable AI models per provider
#[derive(Parser)]
#[command(name = "modelcat", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to bind (defaults to MODELCAT_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve the model list for a provider and print it as JSON
    Resolve {
        #[arg(long)]
        provider: String,
        /// Provider API key; omit to list from the catalog only
        #[arg(long, env = "MODELCAT_CREDENTIAL", hide_env_values = true, default_value = "")]
        credential: String,
        /// Azure resource endpoint
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        api_version: Option<String>,
        #[arg(long)]
        force_refresh: bool,
    },

    /// Validate a model id and print the id to use
    Sanitize {
        #[arg(long)]
        provider: String,
        /// extractionModel, solutionModel or debuggingModel
        #[arg(long)]
        category: String,
        #[arg(long)]
        model: String,
        /// Extra allowed ids, comma separated
        #[arg(long, value_delimiter = ',')]
        allow: Option<Vec<String>>,
    },

    /// Load the universal catalog and print eligible model counts
    Catalog,
}
