use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use shopcart::config;
use shopcart::controller::{Action, Controller};
use shopcart::store::{StoreClient, StoreError};
use shopcart::view::View;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
    /// Override the backend base URL from the config file
    #[arg(long)]
    base_url: Option<String>,
}

const HELP: &str = "commands:
  inv+ ID / inv- ID   step the pick counter of an inventory row
  add ID              stage the picked quantity of a row into the cart
  edit ID             switch a cart row into edit mode
  cart+ ID / cart- ID step the pending amount of a row in edit mode
  save ID             commit the pending amount
  del ID              delete a cart row
  checkout            clear the whole cart (asks for confirmation)
  refresh             refetch and re-render both lists
  help / quit";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let mut cfg = config::load(Some(&args.config))?;
    if let Some(base_url) = args.base_url {
        cfg.api.base_url = base_url;
    }
    let base_url = reqwest::Url::parse(&cfg.api.base_url).context("invalid api.base_url")?;

    let store = StoreClient::new(base_url);
    let view = View::new(std::io::stdout());
    let mut controller = Controller::new(store, view);
    controller.init().await.context("initial fetch failed")?;

    println!("type `help` for commands");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt("> ")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }
        let Some(action) = Action::parse(line) else {
            controller.notice("unknown command (try `help`)")?;
            continue;
        };
        if action == Action::Checkout && !confirm_checkout(&mut lines).await? {
            controller.notice("checkout cancelled")?;
            continue;
        }
        if let Err(err) = controller.dispatch(action).await {
            error!(?err, "action failed");
            let msg = match err.downcast_ref::<StoreError>() {
                Some(StoreError::Checkout { removed, .. }) => format!(
                    "checkout failed after removing item(s) {removed:?}; the rest are still in the cart"
                ),
                _ => format!("{err:#}"),
            };
            controller.notice(&msg)?;
        }
    }

    Ok(())
}

async fn confirm_checkout<R>(lines: &mut tokio::io::Lines<R>) -> Result<bool>
where
    R: AsyncBufReadExt + Unpin,
{
    prompt("checkout and clear the cart? [y/N] ")?;
    let answer = lines.next_line().await?.unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn prompt(text: &str) -> Result<()> {
    let mut out = std::io::stdout();
    write!(out, "{text}")?;
    out.flush()?;
    Ok(())
}
