use std::io;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::{eyre, Result};
use log::info;
use serde_json::{Map, Value};

use order_sender::configure;
use order_sender::logger::setup_logger;
use order_sender::message_codec::{encode_message, parse_order_message};
use order_sender::models::{AddOrder, CancelOrder, ModifyOrder, OrderMessage, OrderType};
use order_sender::sender::{MessageSender, ReadMode, SenderConfig};

const LOG_TARGET: &str = "send_messages";

#[derive(Parser, Debug)]
#[command(author, version, about = "Send one order message to the matching server", long_about = None)]
struct Args {
    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Server port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Maximum response bytes to keep
    #[arg(long)]
    buffer_size: Option<usize>,

    /// single | until_eof
    #[arg(long)]
    read_mode: Option<ReadMode>,

    /// Print the payload without connecting
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Check the payload against the server's message rules first
    #[arg(long, default_value_t = false)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// ADD_ORDER
    Add {
        #[arg(long, default_value = "AAPL")]
        instrument: String,
        #[arg(long, default_value_t = 150.25)]
        price: f64,
        #[arg(long, default_value_t = 100)]
        quantity: i32,
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        is_buy: bool,
        #[arg(long, default_value = "LIMIT")]
        order_type: OrderType,
    },
    /// MODIFY_ORDER
    Modify {
        #[arg(long, default_value_t = 12345)]
        order_id: u32,
        #[arg(long, default_value = "AAPL")]
        instrument: String,
        #[arg(long, default_value_t = 155.50)]
        new_price: f64,
        #[arg(long, default_value_t = 150)]
        new_quantity: i32,
    },
    /// CANCEL_ORDER
    Cancel {
        #[arg(long, default_value_t = 12345)]
        order_id: u32,
        #[arg(long, default_value = "AAPL")]
        instrument: String,
    },
    /// Any message type with a raw JSON object as its fields
    Raw {
        #[arg(long = "type")]
        message_type: String,
        /// e.g. '{"orderId":1,"instrument":"AAPL"}'
        #[arg(long)]
        data: String,
    },
}

impl Command {
    fn default_scenario() -> Self {
        Command::Add {
            instrument: "AAPL".to_string(),
            price: 150.25,
            quantity: 100,
            is_buy: true,
            order_type: OrderType::Limit,
        }
    }

    fn into_message(self) -> Result<(String, Map<String, Value>)> {
        let order = match self {
            Command::Add {
                instrument,
                price,
                quantity,
                is_buy,
                order_type,
            } => OrderMessage::AddOrder(AddOrder {
                instrument,
                price,
                quantity,
                is_buy,
                order_type,
            }),
            Command::Modify {
                order_id,
                instrument,
                new_price,
                new_quantity,
            } => OrderMessage::ModifyOrder(ModifyOrder {
                order_id,
                instrument,
                new_price,
                new_quantity,
            }),
            Command::Cancel {
                order_id,
                instrument,
            } => OrderMessage::CancelOrder(CancelOrder {
                order_id,
                instrument,
            }),
            Command::Raw { message_type, data } => {
                let fields: Map<String, Value> = serde_json::from_str(&data)
                    .map_err(|e| eyre!("--data must be a JSON object: {}", e))?;
                return Ok((message_type, fields));
            }
        };
        Ok((order.message_type().to_string(), order.fields()))
    }
}

/// Config values first, then whatever was given on the command line.
fn apply_overrides(mut config: SenderConfig, args: &Args) -> Result<SenderConfig> {
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(buffer_size) = args.buffer_size {
        config.buffer_size = buffer_size;
    }
    if let Some(read_mode) = args.read_mode {
        config.read_mode = read_mode;
    }
    config
        .validate()
        .map_err(|e| eyre!("invalid sender config: {}", e))?;
    Ok(config)
}

fn prepare_payload(
    message_type: &str,
    message_data: &Map<String, Value>,
    check: bool,
) -> Result<String> {
    let payload = encode_message(message_type, message_data)?;
    if check {
        parse_order_message(&payload)
            .map_err(|e| eyre!("{} rejected by message check: {}", message_type, e))?;
        info!(target: LOG_TARGET, "{} passed message check", message_type);
    }
    Ok(payload)
}

fn main() -> Result<()> {
    dotenv().ok();

    let args = Args::parse();
    let app_config = configure::load_config()?;
    setup_logger(&app_config).map_err(|e| eyre!("Failed to initialize logger: {}", e))?;

    let sender_config = apply_overrides(SenderConfig::from_app_config(&app_config), &args)?;

    let command = args.command.unwrap_or_else(Command::default_scenario);
    let (message_type, message_data) = command.into_message()?;

    if args.check || args.dry_run {
        let payload = prepare_payload(&message_type, &message_data, args.check)?;
        if args.dry_run {
            println!("Payload: {}", payload);
            return Ok(());
        }
    }

    let sender = MessageSender::new(sender_config);
    let stdout = io::stdout();
    sender.send_and_report(&mut stdout.lock(), &message_type, &message_data);

    Ok(())
}
