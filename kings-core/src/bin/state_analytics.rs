// kings-core/src/bin/state_analytics.rs
// Token Kings - state analytics: aggregated table, anomalies, distribution

use anyhow::{Context, Result};
use clap::Parser;
use std::str::FromStr;
use std::sync::Arc;

use kings_common::analytics::{
    MetricTypeFilter, SortColumn, SortDirection, SortSpec, StateFilter,
};
use kings_common::data::RatingFilter;
use kings_core::api::KingsApiClient;
use kings_core::config::Settings;
use kings_core::display::{render_anomaly_banner, render_distribution, render_state_table};
use kings_core::service::AnalyticsService;

/// Per-state analytics of rated tokens
#[derive(Parser, Debug)]
#[clap(name = "state_analytics", version, about, long_about = None)]
struct Cli {
    /// Rating filter: all, 1 or 3 (defaults to the configured one)
    #[clap(short, long, value_name = "RATING", value_parser = RatingFilter::from_str)]
    rating: Option<RatingFilter>,

    /// Column to sort by, e.g. txCount or avgHolderPerToken
    #[clap(long, value_name = "COLUMN", value_parser = SortColumn::from_str)]
    sort: Option<SortColumn>,

    /// Sort ascending
    #[clap(long, conflicts_with = "desc")]
    asc: bool,

    /// Sort descending
    #[clap(long)]
    desc: bool,

    /// Distribution states: all or one of 10..80
    #[clap(long, value_name = "STATE", default_value = "all", value_parser = StateFilter::from_str)]
    state: StateFilter,

    /// Distribution metrics: all, basic or derived
    #[clap(short, long, value_name = "TYPE", default_value = "all", value_parser = MetricTypeFilter::from_str)]
    metrics: MetricTypeFilter,
}

impl Cli {
    /// Explicit flags layered over the configured sort
    fn sort_spec(&self, configured: SortSpec) -> SortSpec {
        let mut sort = match self.sort {
            Some(column) => configured.select(column),
            None => configured,
        };
        if self.asc {
            sort.direction = SortDirection::Asc;
        } else if self.desc {
            sort.direction = SortDirection::Desc;
        }
        sort
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    kings_core::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::new().context("Failed to load configuration")?;
    let rating = cli.rating.unwrap_or(settings.analytics.rating_filter);
    let sort = cli.sort_spec(settings.analytics.sort_spec());

    let api = Arc::new(KingsApiClient::from_settings(&settings)?);
    let service = AnalyticsService::new(api);
    service.refresh().await.context("Could not load rated tokens")?;

    let report = service.report(rating, sort).await;

    println!("\n📊 --- TOKEN ANALYTICS BY STATE --- (ratings {})", report.filter.caption());
    println!("{} tokens loaded, {} state rows", report.token_count, report.rows.len());
    println!();

    if let Some(banner) = render_anomaly_banner(&report.anomalies) {
        println!("{}", banner);
        println!();
    }
    println!("{}", render_state_table(&report.rows, report.sort));

    println!("\n📈 --- METRIC DISTRIBUTION (rating 1 vs rating 3) ---");
    let rows = report.distribution.view(cli.state, cli.metrics);
    println!("{}", render_distribution(&rows));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kings_common::data::Rating;

    #[test]
    fn test_cli_flags_parse_through_domain_types() {
        let cli = Cli::try_parse_from([
            "state_analytics", "--rating", "3", "--sort", "txCount", "--asc", "--state", "40",
        ])
        .unwrap();
        assert_eq!(cli.rating, Some(RatingFilter::Only(Rating::Three)));
        assert_eq!(cli.state, StateFilter::Single(40));
        assert_eq!(cli.metrics, MetricTypeFilter::All);

        let sort = cli.sort_spec(SortSpec::default());
        assert_eq!(sort.column, SortColumn::TxCount);
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["state_analytics", "--rating", "2"]).is_err());
        assert!(Cli::try_parse_from(["state_analytics", "--sort", "marketCap"]).is_err());
        assert!(Cli::try_parse_from(["state_analytics", "--asc", "--desc"]).is_err());
    }
}
