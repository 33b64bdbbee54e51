// kings-core/src/bin/kings_board.rs
// Token Kings - live leaderboard: podium plus token list

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tokio::time;
use tracing::info;

use kings_core::api::time_range_label;
use kings_core::config::Settings;
use kings_core::display::{
    format_timestamp_ms, render_podium, render_progress_cards, render_token_list,
};
use kings_core::service::TokenPoller;
use kings_core::state::AppState;

/// Rows shown under the podium
const LIST_LIMIT: usize = 25;

/// Token Kings leaderboard
#[derive(Parser, Debug)]
#[clap(name = "kings_board", version, about, long_about = None)]
struct Cli {
    /// Fetch and print the board once, then exit
    #[clap(long)]
    once: bool,

    /// Show the state progress of one token and exit
    #[clap(long, value_name = "MINT")]
    states: Option<String>,

    /// Filter overrides by query name, e.g. minHolders=50 migrated=all maxDate=
    #[clap(value_name = "FILTER=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

fn parse_filter(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected filter=value, got '{}'", arg))
}

async fn print_states(state: &AppState, mint: &str) -> Result<()> {
    let states = state
        .token_progress(mint)
        .await
        .with_context(|| format!("Could not load states of {}", mint))?;
    println!("\n📈 --- STATE PROGRESS --- {}", mint);
    println!("{}", render_progress_cards(&states));
    Ok(())
}

async fn print_board(state: &AppState) {
    let podium = state.tokens.podium().await;
    let list = state.tokens.ranked_list().await;
    let updated = state
        .tokens
        .updated_at()
        .await
        .map(|t| format_timestamp_ms(t.timestamp_millis()))
        .unwrap_or_else(|| "never".to_string());

    let window = time_range_label(state.filters.applied().await.min_date);
    println!("\n👑 --- TOKEN KINGS --- ({} | updated {})", window, updated);
    println!("{}", render_podium(&podium));
    println!();
    let shown = &list[..list.len().min(LIST_LIMIT)];
    println!("{}", render_token_list(shown));
    if list.len() > LIST_LIMIT {
        println!("... {} more tokens", list.len() - LIST_LIMIT);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    kings_core::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load configuration")?;
    let state = AppState::new(settings)?;

    if let Some(mint) = &cli.states {
        return print_states(&state, mint).await;
    }

    for (key, value) in &cli.filters {
        state.filters.set_draft(key, value).await.map_err(|e| anyhow!(e))?;
    }
    if state.filters.filters_changed().await {
        state.filters.apply().await;
    }

    let poller = Arc::new(TokenPoller::new(state.clone()));

    if cli.once || !state.settings.polling.enabled {
        poller.refresh().await?;
        print_board(&state).await;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let handle = poller.clone().spawn(shutdown_rx);

    let mut ticker = time::interval(Duration::from_millis(
        state.settings.polling.interval_ms.max(1),
    ));
    let mut shown_seq = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let seq = state.tokens.applied_seq().await;
                if seq != shown_seq {
                    shown_seq = seq;
                    print_board(&state).await;
                }
            }
            _ = signal::ctrl_c() => {
                println!("\n🛑 Shutdown signal received");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(());
    handle.await??;
    info!("Leaderboard stopped");
    Ok(())
}
