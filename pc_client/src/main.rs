//! Command-line client for the product catalog API.
//!
//! Each invocation runs one command. The session persists between
//! invocations in the configured session file.

use anyhow::{Context, Result};
use pc_client::{commands::parse_command, logging, runner};
use pico_args::Arguments;
use product_catalog::{CatalogClient, ClientConfig};
use std::path::PathBuf;

const HELP: &str = "\
Manage a product catalog from the command line

USAGE:
  pc_client [OPTIONS] <COMMAND> [ARGS...]

OPTIONS:
  --server URL          API base URL  [default: CATALOG_API_BASE_URL or http://localhost:5000]
  --session-file PATH   Session file  [default: CATALOG_SESSION_FILE or the user config dir]

FLAGS:
  -h, --help            Print help information

COMMANDS:
  login USER PASS                       Log in and store the session
  register USER EMAIL PASS CONFIRM      Create an account and log in
  logout                                Forget the stored session
  whoami                                Show the current session
  forgot-password EMAIL                 Request password reset instructions
  list [PAGE] [PER_PAGE]                List products
  get ID                                Show one product
  create TITLE [PRICE] [DESCRIPTION]    Create a product
  update ID FIELD=VALUE...              Update title, price, description or category
  delete ID                             Delete a product
  search QUERY...                       Search products

ENVIRONMENT:
  CATALOG_HTTP_TIMEOUT_SECS             Request timeout  [default: 30]
  CATALOG_DEFAULT_PAGE_SIZE             Page size for list  [default: 10]
  RUST_LOG                              Log filter  [default: warn,product_catalog=info]
";

struct Args {
    server_url: Option<String>,
    session_file: Option<PathBuf>,
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine
    dotenvy::dotenv().ok();
    logging::init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        server_url: pargs.opt_value_from_str("--server")?,
        session_file: pargs.opt_value_from_str("--session-file")?,
        command: pargs
            .finish()
            .into_iter()
            .map(|arg| {
                arg.into_string()
                    .map_err(|arg| anyhow::anyhow!("Argument is not valid UTF-8: {arg:?}"))
            })
            .collect::<Result<_>>()?,
    };

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let command = parse_command(&args.command)?;

    let config = ClientConfig::from_env(args.server_url, args.session_file)
        .context("Failed to load configuration")?;
    tracing::debug!(
        base_url = %config.base_url,
        session_file = %config.session_file.display(),
        "Configuration loaded"
    );

    let client = CatalogClient::from_config(&config)
        .map_err(|e| anyhow::anyhow!(e.client_message()))
        .context("Failed to start client")?;

    let text = runner::execute(&client, command, config.default_page_size)
        .await
        .map_err(|e| anyhow::anyhow!(runner::error_text(&e)))?;
    print!("{text}");
    Ok(())
}
