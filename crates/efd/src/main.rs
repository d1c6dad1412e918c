mod cli;
mod spider;

// remote imports
use clap::Parser;
use cli::{Cli, TraceLevel};
use tracing::{error, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

////////////////////////////////////////////////////////////////////////////

// preproccess the trace level
fn preprocess(trace_level: Level) {
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .finish();
    subscriber::set_global_default(my_subscriber).expect("Set subscriber");
}

////////////////////////////////////////////////////////////////////////////

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // set the trace level
    if let Some(trace_level) = cli.trace {
        preprocess(match trace_level {
            TraceLevel::DEBUG => Level::DEBUG,
            TraceLevel::ERROR => Level::ERROR,
            TraceLevel::INFO => Level::INFO,
            TraceLevel::TRACE => Level::TRACE,
            TraceLevel::WARN => Level::WARN,
        });
    }
    trace!("command line input recorded: {cli:?}");

    // if no trace level provided, use tui
    let tui = cli.trace.is_none();

    // read cli inputs
    use cli::Commands::*;
    match cli.command {
        // `efd scrape [--variant] [--output] ...`: scrape all reports to a file
        Scrape {
            variant,
            output,
            rate_limit,
            first_name,
            last_name,
            headful,
        } => {
            let settings = spider::Settings::from_env(rate_limit)?;
            let query = efd_spider::senate::IndexQuery {
                first_name,
                last_name,
                ..Default::default()
            };

            let txs = spider::run(variant, &settings, &query, headful, tui).await?;

            info!("dumping {} transactions to {}", txs.len(), output.display());
            efd_spider::fs::write_json(&output, &txs)
                .await
                .map_err(|err| {
                    error!("failed to write {}, error({err})", output.display());
                    err
                })?;

            if tui {
                println!("{} transactions written to {}", txs.len(), output.display());
            }
        }
    }

    Ok(())
}
