use anyhow::{anyhow, bail, Result};
use clap::Parser;
use cli::{Cli, Commands::*, MessageKind, ScenarioArg, TraceLevel, TransportArg};
use dotenv::dotenv;
use peg_harness::{HarnessConfig, Scenario};
use peg_scanner::view::{PingStatus, SingleStockPage};
use peg_scanner::wire::{self, PingResponse, SingleStockPageResponse};
use peg_scanner::{ClientConfig, Scanner, Transport};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, subscriber, trace, Level};
use tracing_subscriber::FmtSubscriber;

mod cli;
mod render;

fn preprocess(trace_level: Level) -> Result<()> {
    dotenv().ok();
    let my_subscriber = FmtSubscriber::builder()
        .with_max_level(trace_level)
        .with_writer(std::io::stderr)
        .finish();
    subscriber::set_global_default(my_subscriber)?;
    Ok(())
}

fn client_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env()?;
    if let Some(transport) = cli.transport {
        config.transport = match transport {
            TransportArg::Rest => Transport::Rest,
            TransportArg::Graphql => Transport::Graphql,
        };
    }
    debug!("client config: {config:?}");
    Ok(config)
}

fn scanner(cli: &Cli) -> Result<Scanner> {
    let backend = peg_scanner::connect(&client_config(cli)?)?;
    Ok(Scanner::new(backend))
}

/// Print the heartbeat every `period` until `stop` resolves. A ping still in
/// flight when `stop` fires is dropped.
async fn watch(scanner: &mut Scanner, period: Duration, stop: impl Future<Output = ()>) {
    let mut ticker = tokio::time::interval(period);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = async {
                ticker.tick().await;
                scanner.refresh_ping().await;
                println!("{}", render::ping(&scanner.ping_indicator()));
            } => {}
            _ = &mut stop => {
                debug!("interrupted");
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.trace {
        TraceLevel::DEBUG => Level::DEBUG,
        TraceLevel::INFO => Level::INFO,
        TraceLevel::WARN => Level::WARN,
        TraceLevel::ERROR => Level::ERROR,
    };

    preprocess(log_level)?;
    trace!("Command line input recorded: {cli:#?}");

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    // cli framework:
    // "> peg <COMMAND>"
    match &cli.command {
        // "> peg ping"
        Ping => {
            let mut scanner = scanner(&cli)?;
            scanner.refresh_ping().await;
            println!("{}", render::ping(&scanner.ping_indicator()));
            if let Some(error) = &scanner.snapshot().ping_error {
                bail!("backend unreachable: {error}");
            }
        }

        // "> peg watchlist"
        Watchlist => {
            let mut scanner = scanner(&cli)?;
            scanner.refresh_watchlist().await;
            print!("{}", render::watchlist(scanner.snapshot()));
            if let Some(error) = &scanner.snapshot().error {
                bail!("watchlist unavailable: {error}");
            }
        }

        // "> peg stock <SYMBOL>"
        Stock { symbol } => {
            let mut scanner = scanner(&cli)?;
            if !scanner.select_symbol(symbol) {
                bail!("symbol must not be empty");
            }
            scanner.load_single_stock().await;
            print!("{}", render::single_stock(scanner.snapshot()));
            if let Some(error) = &scanner.snapshot().single_stock_error {
                bail!("{error}");
            }
        }

        // "> peg scan [--symbol SYM] [--json]"
        // everything the app shows on start-up
        Scan { symbol, json } => {
            let mut scanner = scanner(&cli)?;
            if let Some(symbol) = symbol {
                scanner.select_symbol(symbol);
            }
            scanner.refresh().await;
            scanner.load_single_stock().await;

            if *json {
                println!("{}", serde_json::to_string_pretty(scanner.snapshot())?);
            } else {
                println!("{}", render::ping(&scanner.ping_indicator()));
                println!();
                print!("{}", render::single_stock(scanner.snapshot()));
                println!();
                print!("{}", render::watchlist(scanner.snapshot()));
            }
        }

        // "> peg watch [--interval SECS]"
        // keep the heartbeat indicator fresh until ctrl-c
        Watch { interval } => {
            let mut scanner = scanner(&cli)?;
            let period = Duration::from_secs((*interval).max(1));
            info!("polling the heartbeat every {period:?}; ctrl-c to stop");
            watch(&mut scanner, period, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await;
        }

        // "> peg decode <ping|single-stock-page> <FILE>"
        // inspect a binary payload captured off the wire
        Decode { message, file } => {
            let bytes = peg_util::read_bytes(file).await?;
            let json = match message {
                MessageKind::Ping => {
                    let ping: PingResponse = wire::decode(&bytes)?;
                    serde_json::to_string_pretty(&PingStatus::from(&ping))?
                }
                MessageKind::SingleStockPage => {
                    let page: SingleStockPageResponse = wire::decode(&bytes)?;
                    serde_json::to_string_pretty(&SingleStockPage::from(&page))?
                }
            };
            println!("{json}");
        }

        ////////////////////////////////////////////////////////////////////////////////////////////////////

        // "> peg regress <infra|web-e2e>"
        Regress { scenario } => {
            let scenario = match scenario {
                ScenarioArg::Infra => Scenario::Infra,
                ScenarioArg::WebE2e => Scenario::WebE2e,
            };
            let config = HarnessConfig::from_env();
            info!("running regression case: {}", scenario.name());
            scenario
                .run(&config)
                .await
                .map_err(|e| anyhow!("{} regression failed: {e}", scenario.name()))?;
        }
    }

    Ok(())
}
