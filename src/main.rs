use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use pushkind_catalog::config::CatalogConfig;
use pushkind_catalog::db::{establish_pool_from_config, run_pending_migrations};
use pushkind_catalog::domain::category::CategoryTreeNode;
use pushkind_catalog::repository::{CategoryReader, CategoryWriter, DieselRepository};
use pushkind_catalog::services::categories::load_category_tree;

#[derive(Debug, Parser)]
#[command(name = "pushkind-catalog")]
#[command(about = "Maintenance tool for the catalog database")]
struct Cli {
    /// Database to open; overrides `DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending migrations and exit
    Migrate,

    /// Print the category tree
    Tree {
        /// Leave out inactive categories and everything below them
        #[arg(long)]
        public: bool,

        /// Print the tree as JSON instead of an indented outline
        #[arg(long)]
        json: bool,
    },

    /// Report category tree inconsistencies
    Check,

    /// Recompute category depth and child counts from paths
    Fix,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let mut config = CatalogConfig::from_env();
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    let pool = match establish_pool_from_config(&config) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_pending_migrations(&pool) {
        Ok(0) => log::debug!("Database schema is up to date"),
        Ok(count) => log::info!("Applied {count} migrations to {}", config.database_url),
        Err(e) => {
            log::error!("Failed to migrate {}: {e}", config.database_url);
            return ExitCode::FAILURE;
        }
    }

    let repo = DieselRepository::new(pool);

    let result = match &cli.command {
        Command::Migrate => Ok(()),
        Command::Tree { public, json } => print_tree(&repo, *public, *json),
        Command::Check => check_tree(&repo),
        Command::Fix => repo
            .fix_tree()
            .map(|repaired| println!("repaired {repaired} categories"))
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:?} failed: {e}", cli.command);
            ExitCode::FAILURE
        }
    }
}

fn print_tree(repo: &DieselRepository, public_only: bool, json: bool) -> Result<(), String> {
    let tree = load_category_tree(repo, public_only).map_err(|e| e.to_string())?;

    if json {
        let rendered = serde_json::to_string_pretty(&tree).map_err(|e| e.to_string())?;
        println!("{rendered}");
    } else {
        let mut lines = Vec::new();
        render_outline(&tree, &mut lines);
        for line in lines {
            println!("{line}");
        }
    }

    Ok(())
}

fn render_outline(nodes: &[CategoryTreeNode], lines: &mut Vec<String>) {
    for node in nodes {
        let category = &node.category;
        let indent = "  ".repeat((category.depth - 1).max(0) as usize);
        let hidden = if category.is_active { "" } else { " (hidden)" };
        lines.push(format!(
            "{indent}{} [{}] #{}{hidden}",
            category.title, category.slug, category.id
        ));
        render_outline(&node.children, lines);
    }
}

/// Print every tree inconsistency; fails when any is found.
fn check_tree(repo: &DieselRepository) -> Result<(), String> {
    let problems = repo.find_tree_problems().map_err(|e| e.to_string())?;

    if problems.is_empty() {
        println!("category tree is consistent");
        return Ok(());
    }

    for problem in &problems {
        println!("{problem}");
    }

    Err(format!(
        "{} problems found, run `fix` to repair bookkeeping",
        problems.len()
    ))
}
