use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Sets the level of tracing
    #[arg(long, default_value = "INFO", ignore_case = true, global = true)]
    pub trace: TraceLevel,

    /// Backend revision to talk to; overrides PEGSCANNER_TRANSPORT
    #[arg(long, global = true)]
    pub transport: Option<TransportArg>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check the backend heartbeat.
    Ping,

    /// List the PEG watchlist.
    Watchlist,

    /// Show the detail page of a single stock.
    Stock { symbol: String },

    /// Heartbeat, watchlist and the detail page of the selected stock in one go.
    Scan {
        /// Stock to show; defaults to the first watchlist entry
        #[arg(long)]
        symbol: Option<String>,

        /// Print the whole state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep polling the heartbeat.
    Watch {
        /// Seconds between polls
        #[arg(long, default_value_t = 5)]
        interval: u64,
    },

    /// Decode a binary payload saved to a file and print it as JSON.
    Decode { message: MessageKind, file: String },

    /// Run a regression scenario.
    Regress { scenario: ScenarioArg },
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TransportArg {
    Rest,
    Graphql,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MessageKind {
    /// pegscanner.ping.PingResponse
    Ping,
    /// pegscanner.single_stock_page.SingleStockPageResponse
    SingleStockPage,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScenarioArg {
    /// Neo4j, backend and web dev server come up and stay reachable.
    Infra,
    /// Browser end-to-end run against a production web build.
    WebE2e,
}

#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraceLevel {
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_commands() {
        let cli = Cli::parse_from(["peg", "--transport", "graphql", "stock", "aapl"]);
        assert_eq!(cli.transport, Some(TransportArg::Graphql));
        assert!(matches!(cli.command, Commands::Stock { ref symbol } if symbol == "aapl"));

        let cli = Cli::parse_from(["peg", "watch"]);
        assert!(matches!(cli.command, Commands::Watch { interval: 5 }));
        assert_eq!(cli.trace, TraceLevel::INFO);

        let cli = Cli::parse_from(["peg", "decode", "single-stock-page", "page.bin"]);
        assert!(matches!(
            cli.command,
            Commands::Decode { message: MessageKind::SingleStockPage, .. }
        ));

        let cli = Cli::parse_from(["peg", "regress", "web-e2e", "--trace", "DEBUG"]);
        assert!(matches!(cli.command, Commands::Regress { scenario: ScenarioArg::WebE2e }));
        assert_eq!(cli.trace, TraceLevel::DEBUG);
    }
}
