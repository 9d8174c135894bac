use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bpos")]
#[command(about = "Boba-shop POS CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Seed the demo catalog (ingredients, menu items, recipes). Idempotent.
    Seed,

    /// Order commands
    Order {
        #[command(subcommand)]
        cmd: OrderCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base first, overlays after)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations.
    Migrate,
}

#[derive(Subcommand)]
enum OrderCmd {
    /// Place an order through the transactional core.
    Place {
        /// Employee id processing the order
        #[arg(long)]
        employee: i64,

        /// Customer id (omit for walk-in customers)
        #[arg(long)]
        customer: Option<i64>,

        /// Caller-computed total cost
        #[arg(long)]
        total: f64,

        /// Business week number
        #[arg(long)]
        week: i32,

        /// Line items as <menu_item_id>:<quantity>; repeatable
        #[arg(long = "item", required = true)]
        items: Vec<String>,
    },

    /// List recent orders
    List {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Dev-time .env.local bootstrap; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Commands::Db { cmd } => match cmd {
            DbCmd::Status => commands::db_status().await,
            DbCmd::Migrate => commands::db_migrate().await,
        },
        Commands::Seed => commands::seed::seed_demo_catalog().await,
        Commands::Order { cmd } => match cmd {
            OrderCmd::Place {
                employee,
                customer,
                total,
                week,
                items,
            } => commands::order::order_place(employee, customer, total, week, items).await,
            OrderCmd::List { limit } => commands::order::order_list(limit).await,
        },
        Commands::ConfigHash { paths } => commands::config_hash(paths),
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();
}
