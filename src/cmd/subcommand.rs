use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use k8s_openapi::api::networking::v1::Ingress;

use crate::{
    backend::load_backend_services,
    config::Config,
    logger,
    namer::LoadBalancerNamer,
    urlmap::{list_load_balancer_statuses, FileUrlMapStore, UrlMapSyncer},
};

use super::OutputFormat;

#[derive(Args, Debug, Clone)]
pub struct EnsureArgs {
    /// Load balancer name
    #[arg(long)]
    pub lb_name: String,

    /// IP address of the load balancer
    #[arg(long = "ip")]
    pub ip_address: String,

    /// Clusters behind the load balancer (e.g. --clusters a,b | --clusters a --clusters b)
    #[arg(long, value_delimiter = ',')]
    pub clusters: Vec<String>,

    /// networking.k8s.io/v1 Ingress manifest
    #[arg(long)]
    pub ingress: PathBuf,

    /// YAML map of kubernetes service name to backend service
    #[arg(long)]
    pub backends: PathBuf,

    /// Overwrite an existing url map that differs from the desired one
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// Create the url map of a load balancer, or check that it is up to date
    Ensure(EnsureArgs),

    /// Delete the url map of a load balancer
    Delete {
        #[arg(long)]
        lb_name: String,
    },

    /// Print the status recorded on the url map of a load balancer
    Status {
        #[arg(long)]
        lb_name: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Print the status of every multicluster load balancer
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
        output: OutputFormat,
    },

    /// Remove clusters from the status recorded on the url map of a load balancer
    RemoveClusters {
        #[arg(long)]
        lb_name: String,

        #[arg(long, value_delimiter = ',', required = true)]
        clusters: Vec<String>,
    },
}

impl SubCommand {
    pub async fn run(self, config: &Config) -> Result<()> {
        let store = FileUrlMapStore::new(&config.state_file, &config.project);

        logger!(info, "Using url map store {}", store.path().display());

        match self {
            SubCommand::Ensure(args) => {
                let ingress = load_ingress(&args.ingress)?;
                let backends = load_backend_services(&args.backends)?;

                let namer = LoadBalancerNamer::new(&args.lb_name)?;
                // Lower-cased, as in the url map name.
                let lb_name = namer.lb_name().to_string();

                let syncer = UrlMapSyncer::new(namer, store);

                println!("Ensuring url map");

                let self_link = syncer
                    .ensure_url_map(
                        &lb_name,
                        &args.ip_address,
                        &args.clusters,
                        &ingress,
                        &backends,
                        args.force,
                    )
                    .await?;

                println!("{}", self_link);
            }
            SubCommand::Delete { lb_name } => {
                let syncer = UrlMapSyncer::new(LoadBalancerNamer::new(&lb_name)?, store);

                syncer.delete_url_map().await?;

                println!("Deleted url map of load balancer {}", lb_name);
            }
            SubCommand::Status { lb_name, output } => {
                let syncer = UrlMapSyncer::new(LoadBalancerNamer::new(&lb_name)?, store);

                let status = syncer.get_load_balancer_status().await?;

                print!("{}", output.render(&status)?);
            }
            SubCommand::List { output } => {
                let statuses = list_load_balancer_statuses(&store).await?;

                print!("{}", output.render(&statuses)?);
            }
            SubCommand::RemoveClusters { lb_name, clusters } => {
                let syncer = UrlMapSyncer::new(LoadBalancerNamer::new(&lb_name)?, store);

                syncer.remove_clusters_from_status(&clusters).await?;

                println!("Removed clusters {:?} from load balancer {}", clusters, lb_name);
            }
        }

        Ok(())
    }
}

fn load_ingress(path: &Path) -> Result<Ingress> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ingress file {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse ingress file {}", path.display()))
}
