use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use steam_trader::{ClientConfig, SteamTraderClient};

#[derive(Parser, Debug)]
#[clap(version = env!("STEAM_TRADER_VERSION"), author = env!("CARGO_PKG_AUTHORS"))]
pub struct Opts {
    /// API key, overrides the one from the config file
    #[clap(long, short = 'k', env = "STEAM_TRADER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TOML config file with api_key, base_url and timeout_secs
    #[clap(long, short = 'c')]
    config: Option<PathBuf>,

    /// API base address
    #[clap(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[clap(long)]
    timeout: Option<u64>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Account balance
    Balance,
    /// Minimum and maximum prices of an item
    MinPrices { gid: u64 },
    /// Order book of an item
    OrderBook { gid: u64 },
    /// Inventory of a game filtered by status
    Inventory { game_id: u64, status: i64 },
    /// WebSocket token
    WsToken,
    /// Trade ready to be accepted
    Trades,
    /// Fee discount and turnover
    Discounts,
    /// Place a buy order
    BuyOrder {
        gid: u64,
        price: f64,
        #[clap(long, default_value_t = 1)]
        count: u32,
    },
    /// Instantly buy the cheapest offer
    Buy { gid: u64, price: f64 },
    /// List an inventory item for sale
    Sale { asset_id: u64, item_id: u64, price: f64 },
    /// Change the price of an order
    EditPrice { order_id: u64, price: f64 },
    /// Set the Steam trade link
    TradeLink { link: String },
}

fn load_config(opts: &Opts) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &opts.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };

    if let Some(api_key) = &opts.api_key {
        config.api_key = api_key.clone();
    }
    if let Some(base_url) = &opts.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout) = opts.timeout {
        config.timeout_secs = timeout;
    }

    Ok(config)
}

async fn run(client: &SteamTraderClient, command: &Command) -> Option<steam_trader::ApiResponse> {
    match command {
        Command::Balance => client.get_balance().await,
        Command::MinPrices { gid } => client.get_min_prices(*gid).await,
        Command::OrderBook { gid } => client.get_order_book(*gid).await,
        Command::Inventory { game_id, status } => client.get_inventory(*game_id, *status).await,
        Command::WsToken => client.get_ws_token().await,
        Command::Trades => client.check_and_accept_trades().await,
        Command::Discounts => client.get_discounts().await,
        Command::BuyOrder { gid, price, count } => client.create_buy_order_with_count(*gid, *price, *count).await,
        Command::Buy { gid, price } => client.buy_item(*gid, *price).await,
        Command::Sale {
            asset_id,
            item_id,
            price,
        } => client.list_item_for_sale(*asset_id, *item_id, *price).await,
        Command::EditPrice { order_id, price } => client.edit_price(*order_id, *price).await,
        Command::TradeLink { link } => client.set_trade_link(link).await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let opts: Opts = Opts::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let client = SteamTraderClient::from_config(load_config(&opts)?)?;
    let response = run(&client, &opts.command).await;
    client.close().await;

    match response {
        Some(response) => {
            println!("{}", serde_json::to_string_pretty(&response.to_value())?);
            if response.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        None => {
            error!("No response from the API");
            Ok(ExitCode::FAILURE)
        }
    }
}
