use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use breachsim::game;
use breachsim::store::{export_catalog, load_catalog, write_record, Record};

#[derive(Parser)]
#[command(
    name = "breachsim",
    about = "Branching phishing and breach-response drills",
    version
)]
struct Cli {
    /// Scenario to start from (unknown ids fall back to the default)
    #[arg(short, long)]
    scenario: Option<String>,

    /// JSON catalog to use instead of the built-in scenarios
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// List scenario start ids and exit
    #[arg(long)]
    list: bool,

    /// Validate the catalog, print a summary and exit
    #[arg(long)]
    validate: bool,

    /// Write the catalog as JSON to this path and exit
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,

    /// Save the session (totals and history) as JSON after every round
    #[arg(short, long, value_name = "PATH")]
    record: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info   breachsim   # sessions + transitions
    //   RUST_LOG=debug  breachsim   # + input resolution, catalog loading
    //   RUST_LOG=trace  breachsim   # + every engine call
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let catalog = load_catalog(cli.catalog.as_deref())?;

    if cli.list {
        for id in catalog.list_scenario_start_ids() {
            let title = catalog.get_state(id).map_or("", |s| s.title.as_str());
            let marker = if id == catalog.default_start_id() { "*" } else { " " };
            println!("{marker} {id:<24} {title}");
        }
        return Ok(());
    }

    if cli.validate {
        let terminals = catalog.states().filter(|s| s.is_terminal).count();
        println!("Catalog OK");
        println!("  States    : {} ({} terminal)", catalog.len(), terminals);
        for id in catalog.list_scenario_start_ids() {
            println!("  Scenario  : {id} (up to {} steps)", catalog.max_steps(id));
        }
        return Ok(());
    }

    if let Some(path) = &cli.export {
        export_catalog(&catalog, path)?;
        println!("Catalog written to {}", path.display());
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    game::run(
        &catalog,
        cli.scenario.as_deref(),
        &mut input,
        &mut out,
        |session, debrief| {
            if let Some(path) = &cli.record {
                let record = Record {
                    session: session.clone(),
                    debrief: debrief.clone(),
                };
                write_record(path, &record)?;
            }
            Ok(())
        },
    )
}
