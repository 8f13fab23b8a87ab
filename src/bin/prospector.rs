//! CLI entry point: wire a headless Chrome to the directory program and
//! stream CSV to stdout.

use std::io;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio_util::sync::CancellationToken;

use prospector::{
    build_program, ChromeBrowser, CsvSink, Flow, FlowConfig, LogWriter, ScrapeConfig,
};

#[derive(Parser)]
#[command(name = "prospector")]
#[command(about = "Scrape business-directory listings into CSV", long_about = None)]
struct Cli {
    /// Department code to search; repeat the flag for several
    #[arg(short = 'd', long = "department")]
    departments: Vec<u32>,

    /// Search term; repeat the flag for several
    #[arg(short = 't', long = "term")]
    terms: Vec<String>,

    /// Directory portal URL
    #[arg(long)]
    portal_url: Option<String>,

    /// User agent presented to the directory
    #[arg(long)]
    user_agent: Option<String>,

    /// Print the step program and exit without running
    #[arg(long)]
    dump: bool,

    /// Suppress event logging
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = ScrapeConfig::default();
    if !cli.departments.is_empty() {
        cfg.departments = cli.departments;
    }
    if !cli.terms.is_empty() {
        cfg.terms = cli.terms;
    }
    if let Some(url) = cli.portal_url {
        cfg.portal_url = url;
    }
    if let Some(agent) = cli.user_agent {
        cfg.user_agent = agent;
    }

    let cancel = CancellationToken::new();
    let mut builder = Flow::builder(FlowConfig::default()).with_cancellation(cancel.clone());
    if !cli.quiet {
        builder = builder.with_subscriber(Arc::new(LogWriter));
    }
    let flow = builder.build();
    flow.start()?;

    let browser = Arc::new(ChromeBrowser::launch(&cfg.user_agent)?);
    let sink: CsvSink = Arc::new(Mutex::new(Box::new(io::stdout())));
    build_program(&flow, browser, &cfg, sink)?;

    if cli.dump {
        print!("{}", flow.dump_steps(true));
        return Ok(());
    }

    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    flow.run().await?;
    Ok(())
}
