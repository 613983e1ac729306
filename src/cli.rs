use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

#[derive(Debug, Parser)]
#[command(
    name = "dynsearch",
    about = "Field-declarative search across document models"
)]
pub struct Cli {
    /// Path to the JSON dataset (models, records, grants)
    #[arg(long, global = true, default_value = "dataset.json")]
    pub dataset: PathBuf,

    /// Principal performing the search
    #[arg(long, global = true, default_value = "anonymous")]
    pub user: String,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List searchable models and their fields
    Fields(FieldsArgs),
    /// Free-text search across all of a model's fields
    Search(SearchArgs),
    /// Per-field search where every constraint must be satisfied
    Advanced(AdvancedArgs),
    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsArgs),
}

#[derive(Debug, Parser)]
pub struct FieldsArgs {
    /// Limit the listing to one entity type
    pub entity: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct SearchArgs {
    /// Entity type to search (e.g. document)
    pub entity: String,

    /// The query string; double-quoted phrases stay together
    pub query: String,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct AdvancedArgs {
    /// Entity type to search (e.g. document)
    pub entity: String,

    /// Field constraint as FIELD=VALUE (repeatable)
    #[arg(short = 'f', long = "field", value_name = "FIELD=VALUE")]
    pub constraints: Vec<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

pub fn print_completions(shell: Shell) {
    let mut command = Cli::command();
    clap_complete::generate(
        shell,
        &mut command,
        "dynsearch",
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_search() {
        let cli = Cli::try_parse_from([
            "dynsearch", "search", "document", "annual report",
        ])
        .unwrap();
        match cli.command {
            Command::Search(args) => {
                assert_eq!(args.entity, "document");
                assert_eq!(args.query, "annual report");
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_repeated_constraints() {
        let cli = Cli::try_parse_from([
            "dynsearch",
            "advanced",
            "document",
            "-f",
            "title=report",
            "-f",
            "tag.name=annual",
        ])
        .unwrap();
        match cli.command {
            Command::Advanced(args) => {
                assert_eq!(
                    args.constraints,
                    vec!["title=report", "tag.name=annual"]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_apply_to_subcommands() {
        let cli = Cli::try_parse_from([
            "dynsearch",
            "search",
            "document",
            "report",
            "--user",
            "alice",
            "--dataset",
            "/tmp/data.json",
        ])
        .unwrap();
        assert_eq!(cli.user, "alice");
        assert_eq!(cli.dataset, PathBuf::from("/tmp/data.json"));
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
