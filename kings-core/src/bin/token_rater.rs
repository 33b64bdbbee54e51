// kings-core/src/bin/token_rater.rs
// Token Kings - operator training: rate tokens or their state progress
//
// Enter a star rating per item, `q` to quit.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::warn;

use kings_core::api::{EvalMode, KingsApiClient};
use kings_core::config::Settings;
use kings_core::display::render_progress_cards;
use kings_core::service::{RatingService, PROGRESS_RATING_SCALE, TOKEN_RATING_SCALE};

/// What the operator rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Tokens, 1 to 5 stars
    Token,
    /// First evaluation of state progress, 1 to 3 stars
    Progress,
    /// Re-evaluation of state progress, 1 to 3 stars
    Reprogress,
}

/// Token Kings operator training
#[derive(Parser, Debug)]
#[clap(name = "token_rater", version, about, long_about = None)]
struct Cli {
    #[clap(value_enum, default_value = "token")]
    mode: Mode,
}

enum Input {
    Rating(u8),
    Quit,
}

/// Reads until a rating inside `scale` or a quit command arrives
async fn prompt_rating(
    lines: &mut Lines<BufReader<Stdin>>,
    scale: &RangeInclusive<u8>,
) -> Result<Input> {
    loop {
        println!("Rating [{}-{}] or q: ", scale.start(), scale.end());
        let Some(line) = lines.next_line().await? else {
            return Ok(Input::Quit);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(Input::Quit);
        }
        match line.parse::<u8>() {
            Ok(rating) if scale.contains(&rating) => return Ok(Input::Rating(rating)),
            _ => println!("'{}' is not a rating between {} and {}", line, scale.start(), scale.end()),
        }
    }
}

async fn rate_tokens(service: &RatingService, lines: &mut Lines<BufReader<Stdin>>) -> Result<()> {
    loop {
        let Some(token) = service.next_token().await? else {
            println!("✅ Nothing left to rate");
            return Ok(());
        };

        println!("\n⭐ Rate this token: {}", token);
        println!("   📊 https://dexscreener.com/solana/{}", token);

        match prompt_rating(lines, &TOKEN_RATING_SCALE).await? {
            Input::Rating(rating) => {
                if !service.rate_token(&token, rating).await? {
                    warn!("Moving on without a confirmed rating for {}", token);
                }
            }
            Input::Quit => return Ok(()),
        }
    }
}

async fn rate_progress(
    service: &RatingService,
    mode: EvalMode,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    println!("Rate each token by the progress it made through its states.");
    println!("Only rate 1 star for scams or botted tokens, not for tokens that died.");

    loop {
        let evaluation = match service.next_progress(mode).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                println!("✅ No progress left to rate ({})", e);
                return Ok(());
            }
        };

        println!("\n⭐ {} | AI Rating: {}", evaluation.mint, evaluation.rating_overall);
        println!("   📊 https://dexscreener.com/solana/{}", evaluation.mint);
        println!("{}", render_progress_cards(&evaluation.progress));

        match prompt_rating(lines, &PROGRESS_RATING_SCALE).await? {
            Input::Rating(rating) => {
                if !service.rate_progress(mode, &evaluation.mint, rating).await? {
                    warn!("Moving on without a confirmed rating for {}", evaluation.mint);
                }
            }
            Input::Quit => return Ok(()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    kings_core::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load configuration")?;
    let api = Arc::new(KingsApiClient::from_settings(&settings)?);
    let service = RatingService::new(api);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match cli.mode {
        Mode::Token => rate_tokens(&service, &mut lines).await,
        Mode::Progress => rate_progress(&service, EvalMode::Eval, &mut lines).await,
        Mode::Reprogress => rate_progress(&service, EvalMode::Reval, &mut lines).await,
    }
}
