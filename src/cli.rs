use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use reconcile::ErrandTarget;
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "omen")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Supplemental operator tool for the platform manager", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

// ============================================================================
// Connection
// ============================================================================

#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// URL of the platform manager
    #[arg(short = 't', long, env = "OPSMAN_HOSTNAME", global = true)]
    pub target: Option<String>,

    /// Platform manager user name
    #[arg(short = 'u', long, env = "OPSMAN_USER", global = true)]
    pub username: Option<String>,

    /// Platform manager password
    #[arg(short = 'p', long, env = "OPSMAN_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// UAA client id, instead of a user login
    #[arg(short = 'c', long, env = "OPSMAN_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// UAA client secret
    #[arg(
        short = 's',
        long,
        env = "OPSMAN_CLIENT_SECRET",
        hide_env_values = true,
        global = true
    )]
    pub client_secret: Option<String>,

    /// Accept self-signed certificates
    #[arg(short = 'k', long, env = "OPSMAN_SKIP_SSL_VALIDATION", global = true)]
    pub skip_ssl_validation: bool,

    /// Log all other users out before running the command
    #[arg(short = 'f', long, global = true)]
    pub force_logout: bool,

    /// Config file (default: ~/.config/omen/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Subcommand)]
pub enum Command {
    /// Diff staged against deployed manifests, then apply the staged changes
    ApplyChanges(ApplyChangesArgs),

    /// Show the staged versus deployed manifest diff without applying
    Diff(ProductsArgs),

    /// Set the post-deploy errand policy of products
    ToggleErrands(ToggleErrandsArgs),

    /// List the errands of deployed products and their policies
    Errands(ProductsArgs),

    /// Print the manifests of all deployments and the cloud config
    Manifests {
        /// Show staged manifests instead of deployed ones
        #[arg(long)]
        staged: bool,
    },

    /// List stemcell versions that can be updated and the affected products
    ///
    /// The platform manager must have a product-network token installed.
    StemcellUpdates,

    /// Print the platform's diagnostic report
    Diagnostics,

    /// List all deployed tiles
    ListTiles,

    /// Print the GUID of a deployed product
    TileGuid {
        /// Product slug, e.g. "cf"
        slug: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ProductsArgs {
    /// Products to act on, comma-separated (default: all)
    #[arg(short = 'P', long, value_delimiter = ',')]
    pub products: Vec<String>,
}

impl ProductsArgs {
    /// Slugs with surrounding whitespace and empty entries removed
    pub fn slugs(&self) -> Vec<String> {
        self.products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Args, Debug, Clone)]
pub struct ApplyChangesArgs {
    #[command(flatten)]
    pub products: ProductsArgs,

    /// Skip the confirmation prompt
    #[arg(short = 'n', long)]
    pub non_interactive: bool,

    /// Show the diff and stop
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ToggleErrandsArgs {
    /// Policy to set
    #[arg(short = 'a', long, value_enum)]
    pub action: ErrandAction,

    /// Errand phase to update
    #[arg(long, value_enum, default_value_t = ErrandType::PostDeploy)]
    pub errand_type: ErrandType,

    #[command(flatten)]
    pub products: ProductsArgs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ErrandAction {
    Enable,
    Disable,
    Default,
}

impl From<ErrandAction> for ErrandTarget {
    fn from(action: ErrandAction) -> Self {
        match action {
            ErrandAction::Enable => ErrandTarget::Enable,
            ErrandAction::Disable => ErrandTarget::Disable,
            ErrandAction::Default => ErrandTarget::Default,
        }
    }
}

impl fmt::Display for ErrandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enable => "enable",
            Self::Disable => "disable",
            Self::Default => "default",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ErrandType {
    PostDeploy,
}

impl fmt::Display for ErrandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("post-deploy")
    }
}
