mod detail;
mod list;
mod watch;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, CommandFactory, Parser, Subcommand};
use pharma9_core::{Coordinates, DutyFilter, NeighborhoodFilter, PharmacyId, SortMode};
use pharma9_session::LocatorSession;
use pharma9_store::{JsonFileStore, RatingPersistence};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pharma9-cli")]
#[command(about = "Find, rate, and share pharmacies in Dakar")]
struct Cli {
    /// Catalog YAML file; overrides `PHARMA9_CATALOG_PATH`.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Rating store file; overrides `PHARMA9_RATINGS_PATH`.
    #[arg(long, global = true)]
    ratings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Filter, sort, and origin flags shared by the list-style commands.
#[derive(Debug, Args)]
struct FilterArgs {
    /// Matches name, neighborhood, owner, or phone.
    #[arg(long, short = 'q', default_value = "")]
    search: String,

    #[arg(long, default_value_t = DutyFilter::All)]
    duty: DutyFilter,

    #[arg(long)]
    neighborhood: Option<String>,

    #[arg(long, default_value_t = SortMode::Distance)]
    sort: SortMode,

    /// Origin as `lat,lng`; defaults to `PHARMA9_DEFAULT_ORIGIN`.
    #[arg(long, conflicts_with = "no_origin")]
    origin: Option<Coordinates>,

    /// Ignore any origin; distance sort then keeps catalog order.
    #[arg(long)]
    no_origin: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List pharmacies after filtering and sorting.
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one pharmacy with its reviews.
    Show { id: PharmacyId },
    /// Submit a 1-5 star rating.
    Rate { id: PharmacyId, stars: u8 },
    /// List the neighborhood picker options.
    Neighborhoods,
    /// Print map markers and clusters for the current filters.
    Markers {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long)]
        selected: Option<PharmacyId>,

        #[arg(long)]
        highlighted: Option<PharmacyId>,

        /// Cluster cell size; defaults to `PHARMA9_CLUSTER_GRID_SIZE`.
        #[arg(long)]
        grid: Option<f64>,

        #[arg(long)]
        json: bool,
    },
    /// Share a pharmacy, or copy its details when sharing is unavailable.
    Share {
        id: PharmacyId,

        /// Skip the share step and go straight to the copy fallback.
        #[arg(long)]
        copy: bool,
    },
    /// Re-rank the list on every `lat,lng` line read from stdin.
    Watch {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

impl FilterArgs {
    fn apply<S: RatingPersistence>(
        &self,
        session: &mut LocatorSession<S>,
        default_origin: Coordinates,
    ) {
        session.set_search(self.search.clone());
        session.set_duty(self.duty);
        session.set_neighborhood(
            self.neighborhood
                .as_deref()
                .map(NeighborhoodFilter::from_label)
                .unwrap_or_default(),
        );
        session.set_sort(self.sort);
        let origin = if self.no_origin {
            None
        } else {
            Some(self.origin.unwrap_or(default_origin))
        };
        session.set_origin(origin);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pharma9_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let catalog_path = cli.catalog.unwrap_or_else(|| config.catalog_path.clone());
    let catalog = Arc::new(pharma9_core::load_catalog(&catalog_path)?);
    let store = JsonFileStore::new(cli.ratings.unwrap_or_else(|| config.ratings_path.clone()));
    let mut session = LocatorSession::open(catalog, store);

    match command {
        Commands::List { filters } => {
            filters.apply(&mut session, config.default_origin);
            list::run_list(&session);
        }
        Commands::Show { id } => detail::run_show(&mut session, id)?,
        Commands::Rate { id, stars } => detail::run_rate(&mut session, id, stars)?,
        Commands::Neighborhoods => list::run_neighborhoods(&session),
        Commands::Markers {
            filters,
            selected,
            highlighted,
            grid,
            json,
        } => {
            filters.apply(&mut session, config.default_origin);
            if let Some(id) = selected {
                session.select(id)?;
            }
            session.highlight(highlighted);
            list::run_markers(&session, grid.unwrap_or(config.cluster_grid_size), json)?;
        }
        Commands::Share { id, copy } => detail::run_share(&session, id, &config.public_url, copy)?,
        Commands::Watch { filters, limit } => {
            filters.apply(&mut session, config.default_origin);
            watch::run_watch(&mut session, &config, limit).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
