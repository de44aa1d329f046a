// Entry point and high-level CLI flow.
//
// Interactive mode is a menu loop:
// - [1] loads the yearly feeds once into a session,
// - [2] walks the filter chain Year -> Category -> Sub-Category -> Ward,
// - [3] renders and exports the dashboard for the current selection,
// - [4] looks up one ward among the last rendered summaries.
// `--batch` runs load/select/render/export once and exits.
mod cli;
mod config;
mod error;
mod filters;
mod loader;
mod output;
mod reports;
mod session;
mod types;
mod util;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use filters::FilterStage;
use output::ExportPaths;
use reports::{Dashboard, DashboardData};
use session::Session;
use std::io::{self, Write};
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use types::WardSummary;

/// Per-run state. Nothing here outlives the process.
struct App {
    config: Config,
    session: Option<Session>,
    last_summaries: Vec<WardSummary>,
}

fn prompt(label: &str) -> String {
    print!("{label}");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    // EOF on stdin ends the session.
    if let Ok(0) = io::stdin().read_line(&mut buf) {
        println!();
        std::process::exit(0);
    }
    buf.trim().to_string()
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    prompt("Enter choice: ")
}

/// `RUST_LOG` wins when set; otherwise `-v`/`-q` pick the level.
fn init_logging(args: &Args) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(args.log_level()).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging was already initialised");
    }
}

/// Handle option [1]: load the feeds into a fresh session.
///
/// A failed source leaves any previous session untouched.
fn handle_load(app: &mut App) -> Result<()> {
    let sources = app.config.resolved_sources();
    let (records, load_report) =
        loader::ingest(&sources).context("Failed to load grievance data")?;
    for s in &load_report.sources {
        println!(
            "Loaded {} complaints for {} from {}",
            util::format_int(s.rows),
            s.year,
            s.location
        );
    }
    println!(
        "Processing dataset... ({} complaints across {} sources)",
        util::format_int(load_report.total_rows),
        load_report.sources.len()
    );
    if load_report.missing_ward > 0 {
        println!(
            "Note: {} complaints have no ward and appear in no ward summary.",
            util::format_int(load_report.missing_ward)
        );
    }
    if load_report.missing_category + load_report.missing_sub_category > 0 {
        println!(
            "Note: {} complaints lack a category and {} lack a sub-category.",
            util::format_int(load_report.missing_category),
            util::format_int(load_report.missing_sub_category)
        );
    }
    if load_report.missing_complaint_id > 0 {
        println!(
            "Note: {} complaints have no Complaint ID and are not counted.",
            util::format_int(load_report.missing_complaint_id)
        );
    }
    debug!(?load_report, "load finished");
    println!();
    app.session = Some(Session::new(records, app.config.display.year_order));
    app.last_summaries.clear();
    Ok(())
}

fn print_selection(session: &Session) {
    println!("Current selection:");
    for stage in FilterStage::ALL {
        let value = session
            .selection()
            .get(stage)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(none available)".to_string());
        println!("  {:<13} {}", stage.label(), value);
    }
    if !session.selection().is_complete() {
        println!("  (stages without a value are not filtered)");
    }
    println!();
}

/// Handle option [2]: pick a value at each stage in turn.
///
/// Blank input keeps the current value; any change re-defaults the stages
/// after it before they are offered.
fn handle_select(session: &mut Session) {
    for stage in FilterStage::ALL {
        let options = session.options(stage);
        if options.is_empty() {
            println!("No {} options for the current selection.\n", stage.label());
            continue;
        }
        let current = session.selection().get(stage);
        println!("Select {}:", stage.label());
        for (i, opt) in options.iter().enumerate() {
            let marker = if Some(opt) == current.as_ref() { "*" } else { " " };
            println!("{marker}[{}] {opt}", i + 1);
        }
        loop {
            let input = prompt("Enter number (blank keeps current): ");
            if input.is_empty() {
                break;
            }
            match input.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| options.get(i)) {
                Some(opt) => {
                    if let Err(e) = session.select(stage, &opt.to_string()) {
                        println!("{e}");
                    }
                    break;
                }
                None => println!("Invalid choice. Please enter 1-{}.", options.len()),
            }
        }
        println!();
    }
    print_selection(session);
}

/// Handle option [3]: print the dashboard for the current selection.
/// Returns `None` when the selection matches nothing.
fn render_dashboard(config: &Config, session: &Session) -> Option<DashboardData> {
    match reports::build_dashboard(session.records(), session.selection()) {
        Dashboard::Empty { selection } => {
            debug!(?selection, "filter result empty");
            println!("No data found for the selected filters.\n");
            None
        }
        Dashboard::Populated(data) => {
            println!(
                "{} complaints match the selection.\n",
                util::format_int(data.filtered.len())
            );
            output::print_dashboard(&data, config.output.preview_rows);
            Some(data)
        }
    }
}

fn export(config: &Config, data: &DashboardData) -> Result<ExportPaths> {
    let paths = output::export_dashboard(&config.output.dir, data)
        .context("Failed to export dashboard")?;
    println!(
        "(Tables exported to {}, {}, {} and {})\n",
        paths.summary.display(),
        paths.heatmap.display(),
        paths.choropleth.display(),
        paths.json.display()
    );
    Ok(paths)
}

/// Handle option [4]: show the metrics for one ward.
fn handle_lookup(summaries: &[WardSummary]) {
    if summaries.is_empty() {
        println!("No ward summaries yet. Show the dashboard first (option 3).\n");
        return;
    }
    println!("Wards in the current summary:");
    for s in summaries {
        println!("  {}", s.ward_name);
    }
    let ward = prompt("Choose a Ward: ");
    print_ward(summaries, &ward);
}

/// Returns whether the ward had a summary row.
fn print_ward(summaries: &[WardSummary], ward: &str) -> bool {
    match reports::lookup_ward(summaries, ward) {
        Ok(s) => {
            println!("Ward: {}", s.ward_name);
            println!("  Categories/Sub-Categories: {}", s.distinct_category_subcategory_count);
            println!("  Total Complaints: {}\n", util::format_int(s.complaint_count));
            true
        }
        Err(_) => {
            println!("No data found for the selected ward.\n");
            false
        }
    }
}

fn run_interactive(mut app: App) {
    loop {
        println!("BBMP Grievances");
        println!("[1] Load the data");
        println!("[2] Select filters");
        println!("[3] Show dashboard");
        println!("[4] Look up a ward");
        println!("[5] Exit\n");
        match read_choice().as_str() {
            "1" => {
                if let Err(e) = handle_load(&mut app) {
                    error!("{e:#}");
                    eprintln!("Failed to load data: {e:#}\n");
                }
            }
            "2" => match app.session.as_mut() {
                Some(session) => handle_select(session),
                None => println!("Error: No data loaded. Please load the data first (option 1).\n"),
            },
            "3" => match &app.session {
                Some(session) => {
                    app.last_summaries = match render_dashboard(&app.config, session) {
                        Some(data) => {
                            if let Err(e) = export(&app.config, &data) {
                                eprintln!("Write error: {e:#}\n");
                            }
                            data.summary.summaries
                        }
                        None => Vec::new(),
                    };
                }
                None => println!("Error: No data loaded. Please load the data first (option 1).\n"),
            },
            "4" => handle_lookup(&app.last_summaries),
            "5" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 1-5.\n"),
        }
    }
}

/// What a batch pass produced.
#[derive(Debug)]
enum BatchOutcome {
    NoData,
    Exported { paths: ExportPaths, ward_found: bool },
}

/// Apply the selection flags, render, export and look up the selected ward.
/// A failed export is an error.
fn batch_pass(config: &Config, mut session: Session, args: &Args) -> Result<BatchOutcome> {
    let chosen = [
        (FilterStage::Year, args.year.map(|y| y.to_string())),
        (FilterStage::Category, args.category.clone()),
        (FilterStage::SubCategory, args.sub_category.clone()),
        (FilterStage::Ward, args.ward.clone()),
    ];
    for (stage, value) in chosen {
        if let Some(v) = value {
            session.override_stage(stage, &v);
        }
    }
    print_selection(&session);
    let Some(data) = render_dashboard(config, &session) else {
        return Ok(BatchOutcome::NoData);
    };
    let paths = export(config, &data)?;
    let ward_found = match session.selection().ward_name.as_deref() {
        Some(ward) => print_ward(&data.summary.summaries, ward),
        None => false,
    };
    Ok(BatchOutcome::Exported { paths, ward_found })
}

fn run_batch(mut app: App, args: &Args) -> Result<()> {
    handle_load(&mut app)?;
    let Some(session) = app.session.take() else {
        return Ok(());
    };
    match batch_pass(&app.config, session, args)? {
        BatchOutcome::NoData => info!("batch finished without data"),
        BatchOutcome::Exported { paths, ward_found } => {
            info!(json = %paths.json.display(), ward_found, "batch finished")
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse_args();
    init_logging(&args);
    info!("grievance-dash v{}", env!("CARGO_PKG_VERSION"));

    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };
    let app = App {
        config,
        session: None,
        last_summaries: Vec::new(),
    };

    if args.batch {
        if let Err(e) = run_batch(app, &args) {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    } else {
        run_interactive(app);
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.merge_with_args(args)?;
    Ok(config)
}
