use std::collections::BTreeMap;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use dynsearch::{
    Dataset, Error, Record, Result, SearchRegistry, SearchResults,
    Searcher,
    cli::{Cli, Command, FieldsArgs, print_completions},
};

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if let Ok(env) = std::env::var("DYNSEARCH_LOG") {
        EnvFilter::new(env)
    } else if quiet {
        EnvFilter::new("warn")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Completions(args) = &cli.command {
        print_completions(args.shell);
        return Ok(());
    }

    init_tracing(cli.verbose, cli.quiet);

    let (registry, source, access) = Dataset::load(&cli.dataset)?.build()?;
    let searcher = Searcher::new(&registry, &source, &access);

    match cli.command {
        Command::Fields(args) => cmd_fields(&registry, &args)?,
        Command::Search(args) => {
            let results = searcher.simple_search(
                &args.entity,
                &args.query,
                &cli.user,
            )?;
            print_results(&results, args.json);
        }
        Command::Advanced(args) => {
            let constraints = parse_constraints(&args.constraints)?;
            let results = searcher.advanced_search(
                &args.entity,
                &constraints,
                &cli.user,
            )?;
            print_results(&results, args.json);
        }
        Command::Completions(_) => unreachable!("handled above"),
    }

    Ok(())
}

fn cmd_fields(registry: &SearchRegistry, args: &FieldsArgs) -> Result<()> {
    let models: Vec<_> = match &args.entity {
        Some(entity) => vec![registry.get(entity)?],
        None => registry.iter().collect(),
    };

    if args.json {
        let listing: Vec<_> = models
            .iter()
            .map(|model| {
                json!({
                    "entity": model.entity(),
                    "label": model.label(),
                    "fields": model
                        .field_listing()
                        .into_iter()
                        .map(|(name, label)| {
                            json!({"name": name, "label": label})
                        })
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string(&listing)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No search models registered.");
        return Ok(());
    }
    for model in models {
        println!("{} ({})", model.entity(), model.label());
        for (name, label) in model.field_listing() {
            println!("  {name}\t{label}");
        }
    }
    Ok(())
}

fn parse_constraints(
    raw: &[String],
) -> Result<BTreeMap<String, String>> {
    let mut constraints = BTreeMap::new();
    for entry in raw {
        let (field, value) = entry.split_once('=').ok_or_else(|| {
            Error::Config(format!(
                "invalid constraint '{entry}': expected FIELD=VALUE"
            ))
        })?;
        constraints.insert(field.to_string(), value.to_string());
    }
    Ok(constraints)
}

fn print_results(results: &SearchResults, as_json: bool) {
    if as_json {
        let payload = json!({
            "result_count": results.records.len(),
            "elapsed_ms": results.elapsed.as_millis() as u64,
            "results": results.records,
        });
        println!("{payload}");
        return;
    }

    if results.records.is_empty() {
        println!("No results found.");
    } else {
        for record in &results.records {
            println!("{}", summarize(record));
        }
    }
    println!(
        "\n{} result(s) in {:.1?}",
        results.records.len(),
        results.elapsed
    );
}

fn summarize(record: &Record) -> String {
    let id = record.id().unwrap_or("?");
    let rest: Vec<String> = record
        .attributes()
        .filter(|(attribute, _)| *attribute != dynsearch::ID_ATTRIBUTE)
        .map(|(attribute, value)| format!("{attribute}={value}"))
        .collect();
    format!("{id}\t{}", rest.join("  "))
}
