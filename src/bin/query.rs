use anyhow::Result;
use clap::{Parser, Subcommand};
use owner_collector::config::Config;
use owner_collector::query::commands::{ListQuery, cmd_current, cmd_list, cmd_stats};
use owner_collector::query::formatters::OutputFormat;
use owner_collector::repository::{Database, OwnerRepository};

#[derive(Parser)]
#[command(name = "query")]
#[command(about = "Query collected owner changes", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Every recorded owner change, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,

        #[arg(long, default_value = "false")]
        oldest_first: bool,
    },
    /// The latest recorded owner
    Current,
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format.as_str());

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url)?;
    let repo = OwnerRepository::new(&db.conn);

    match cli.command {
        Commands::List {
            limit,
            oldest_first,
        } => {
            cmd_list(
                &repo,
                ListQuery {
                    limit,
                    oldest_first,
                },
                &format,
            )?;
        }
        Commands::Current => {
            cmd_current(&repo, &format)?;
        }
        Commands::Stats => {
            cmd_stats(&repo, &format)?;
        }
    }

    Ok(())
}
