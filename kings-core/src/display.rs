// kings-core/src/display.rs
// Terminal rendering of boards, tables and progress cards

use chrono::{TimeZone, Utc};

use kings_common::analytics::{AggregatedRow, Anomaly, DistributionRow, SortDirection, SortSpec};
use kings_common::data::{progress_steps, Rating, StateRecord, TokenSummary};
use kings_common::ranking::{Podium, PodiumSlot};

/// Anomalies listed in full before the banner collapses the rest
pub const BANNER_LIMIT: usize = 3;

// ============================================================================
// FORMATTERS
// ============================================================================

/// Fixed decimals with `,` thousands separators. Non-finite values give "N/A".
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Short form with k/m/b suffixes and up to two decimals: 1234 -> "1.23k"
pub fn format_compact(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }

    let abs = value.abs();
    let (scaled, suffix) = if abs >= 1e9 {
        (value / 1e9, "b")
    } else if abs >= 1e6 {
        (value / 1e6, "m")
    } else if abs >= 1e3 {
        (value / 1e3, "k")
    } else {
        (value, "")
    };

    let text = format!("{:.2}", scaled);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    let text = if text == "-0" { "0" } else { text };
    format!("{}{}", text, suffix)
}

const DURATION_UNITS: [(u64, &str, &str); 4] = [
    (86_400, "d", "day"),
    (3_600, "h", "hour"),
    (60, "m", "minute"),
    (1, "s", "second"),
];

/// Seconds as "1h 2m 5s". Below a minute fractions are kept: "1.5s".
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "N/A".to_string();
    }
    if seconds < 60.0 {
        let text = format!("{:.1}", seconds);
        return format!("{}s", text.trim_end_matches(".0"));
    }

    duration_parts(seconds as u64)
        .into_iter()
        .map(|(amount, (_, short, _))| format!("{}{}", amount, short))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Seconds as "1 hour 2 minutes 5 seconds"
pub fn format_duration_full(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "N/A".to_string();
    }
    let parts = duration_parts(seconds.round() as u64);
    if parts.is_empty() {
        return "0 seconds".to_string();
    }

    parts
        .into_iter()
        .map(|(amount, (_, _, long))| {
            let plural = if amount == 1 { "" } else { "s" };
            format!("{} {}{}", amount, long, plural)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn duration_parts(mut total: u64) -> Vec<(u64, (u64, &'static str, &'static str))> {
    let mut parts = Vec::new();
    for unit in DURATION_UNITS {
        let amount = total / unit.0;
        total %= unit.0;
        if amount > 0 {
            parts.push((amount, unit));
        }
    }
    parts
}

/// A distribution cell value; missing values render as "N/A", never 0
pub fn format_cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => "N/A".to_string(),
    }
}

/// Signed change, e.g. "+12" / "-3.50"
pub fn format_delta(value: f64, decimals: usize) -> String {
    if value > 0.0 {
        format!("+{}", format_number(value, decimals))
    } else {
        format_number(value, decimals)
    }
}

/// Milliseconds since epoch as a UTC date-time
pub fn format_timestamp_ms(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "N/A".to_string(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

// ============================================================================
// ANALYTICS
// ============================================================================

const STATE_TABLE_COLUMNS: [(&str, &str); 11] = [
    ("state", "STATE"),
    ("rating", "RATING"),
    ("tokenCount", "TOKENS"),
    ("txCount", "TX"),
    ("buyCount", "BUYS"),
    ("sellCount", "SELLS"),
    ("totalSolVolume", "SOL VOL"),
    ("txSpeed", "TX SPEED"),
    ("realSolReserves", "RESERVES"),
    ("avgHolderPerToken", "HOLD/TKN"),
    ("avgTimeBeforeStateChange", "AVG TIME"),
];

fn header_cell(key: &str, title: &str, sort: SortSpec) -> String {
    if sort.column.key() == key {
        let arrow = match sort.direction {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        };
        format!("{}{}", title, arrow)
    } else {
        title.to_string()
    }
}

/// The per-state table; the sorted column carries an arrow
pub fn render_state_table(rows: &[AggregatedRow], sort: SortSpec) -> String {
    if rows.is_empty() {
        return "No data available for the selected rating.".to_string();
    }

    let h: Vec<String> = STATE_TABLE_COLUMNS
        .iter()
        .map(|(key, title)| header_cell(key, title, sort))
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<7} | {:<7} | {:>7} | {:>9} | {:>8} | {:>8} | {:>12} | {:>9} | {:>10} | {:>9} | {:>10}",
        h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], h[8], h[9], h[10]
    ));
    lines.push(format!("{:-<130}", ""));

    for row in rows {
        lines.push(format!(
            "{:<7} | {:<7} | {:>7} | {:>9} | {:>8} | {:>8} | {:>12} | {:>9} | {:>10} | {:>9} | {:>10}",
            row.state,
            row.rating.to_string(),
            row.token_count,
            format_number(row.tx_count as f64, 0),
            format_number(row.buy_count as f64, 0),
            format_number(row.sell_count as f64, 0),
            format_number(row.total_sol_volume, 2),
            format_number(row.tx_speed, 2),
            format_number(row.real_sol_reserves, 2),
            format_number(row.avg_holder_per_token, 1),
            format_duration(row.avg_time_before_state_change),
        ));
    }
    lines.join("\n")
}

/// Warning block for the first anomalies; `None` when there is nothing to flag
pub fn render_anomaly_banner(anomalies: &[Anomaly]) -> Option<String> {
    if anomalies.is_empty() {
        return None;
    }

    let mut lines = vec!["⚠️  Anomalies Detected".to_string()];
    for anomaly in anomalies.iter().take(BANNER_LIMIT) {
        lines.push(format!(
            "  State {}: {} ({}) is significantly higher than average ({})",
            anomaly.state,
            anomaly.metric_label(),
            format_number(anomaly.value, 2),
            format_number(anomaly.avg, 2),
        ));
    }
    if anomalies.len() > BANNER_LIMIT {
        lines.push(format!(
            "  + {} more anomalies detected",
            anomalies.len() - BANNER_LIMIT
        ));
    }
    Some(lines.join("\n"))
}

/// Mean/median per rating for the selected distribution rows
pub fn render_distribution(rows: &[&DistributionRow]) -> String {
    if rows.is_empty() {
        return "No distribution rows match the selected filters.".to_string();
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format!(
        "{:<6} | {:<28} | {:>12} | {:>12} | {:>5} | {:>12} | {:>12} | {:>5}",
        "STATE", "METRIC", "R1 AVG", "R1 MEDIAN", "R1 N", "R3 AVG", "R3 MEDIAN", "R3 N"
    ));
    lines.push(format!("{:-<112}", ""));

    for row in rows {
        let one = row.cell(Rating::One);
        let three = row.cell(Rating::Three);
        lines.push(format!(
            "{:<6} | {:<28} | {:>12} | {:>12} | {:>5} | {:>12} | {:>12} | {:>5}",
            row.state,
            truncate(row.metric.label, 28),
            format_cell(one.avg, 2),
            format_cell(one.median, 2),
            one.values.len(),
            format_cell(three.avg, 2),
            format_cell(three.median, 2),
            three.values.len(),
        ));
    }
    lines.join("\n")
}

// ============================================================================
// LEADERBOARD
// ============================================================================

fn podium_line(slot: &PodiumSlot) -> String {
    let medal = match slot.position {
        1 => "🥇",
        2 => "🥈",
        _ => "🥉",
    };
    match &slot.token {
        Some(token) => format!(
            "{} #{} {} ({}) | score {} | reserve {} SOL | {} holders",
            medal,
            slot.position,
            token.display_name(),
            token.display_symbol(),
            slot.score
                .map(|s| format_number(s, 0))
                .unwrap_or_else(|| "N/A".to_string()),
            format_number(token.sol_reserve, 2),
            token.holders_count,
        ),
        None => format!("{} #{} ---", medal, slot.position),
    }
}

/// Podium in display order: 2nd, 1st, 3rd
pub fn render_podium(podium: &Podium) -> String {
    if podium.is_empty() {
        return "👑 No kings yet".to_string();
    }
    podium
        .display_order()
        .iter()
        .map(|slot| podium_line(slot))
        .collect::<Vec<_>>()
        .join("\n")
}

fn optional_rating(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Scrollable token list, in the order given
pub fn render_token_list(tokens: &[TokenSummary]) -> String {
    if tokens.is_empty() {
        return "No tokens match the current filters.".to_string();
    }

    let mut lines = Vec::with_capacity(tokens.len() + 2);
    lines.push(format!(
        "{:>7} | {:>6} | {:<24} | {:<10} | {:>12} | {:>8} | {:>12} | {:>7} | {:<19}",
        "OVERALL", "RATING", "TOKEN", "SYMBOL", "SOL RESERVE", "HOLDERS", "VOLUME", "TRADES", "CREATED"
    ));
    lines.push(format!("{:-<130}", ""));

    for token in tokens {
        lines.push(format!(
            "{:>7} | {:>6} | {:<24} | {:<10} | {:>12} | {:>8} | {:>12} | {:>7} | {:<19}",
            optional_rating(token.overall),
            optional_rating(token.rating),
            truncate(token.display_name(), 24),
            truncate(token.display_symbol(), 10),
            format_number(token.sol_reserve, 2),
            token.holders_count,
            format_number(token.volume, 2),
            token.trade_count,
            format_timestamp_ms(token.created_at),
        ));
    }
    lines.join("\n")
}

// ============================================================================
// PROGRESS
// ============================================================================

fn counter_line(label: &str, value: f64, delta: Option<f64>, decimals: usize) -> String {
    match delta {
        Some(d) => format!(
            "  {:<14} {:>10} ({})",
            label,
            format_compact(value),
            format_delta(d, decimals)
        ),
        None => format!("  {:<14} {:>10}", label, format_compact(value)),
    }
}

/// One card per reached state with changes against the previous state.
/// States whose transaction count did not move are marked.
pub fn render_progress_cards(states: &[StateRecord]) -> String {
    if states.is_empty() {
        return "No states reached until now".to_string();
    }

    let mut cards = Vec::with_capacity(states.len());
    for step in progress_steps(states) {
        let record = step.record;
        let delta = step.delta;
        let mut lines = Vec::new();

        let warning = if step.stalled { "  ⚠️  tx count unchanged" } else { "" };
        lines.push(format!("── STATE {} ──{}", record.state, warning));
        if let Some(at) = record.reached_at() {
            lines.push(format!("  reached {}", at.format("%Y-%m-%d %H:%M:%S")));
        }
        lines.push(counter_line(
            "Transactions",
            record.tx_count as f64,
            delta.map(|d| d.tx_count as f64),
            0,
        ));
        lines.push(counter_line(
            "Buys",
            record.buy_count as f64,
            delta.map(|d| d.buy_count as f64),
            0,
        ));
        lines.push(counter_line(
            "Sells",
            record.sell_count as f64,
            delta.map(|d| d.sell_count as f64),
            0,
        ));
        lines.push(counter_line(
            "SOL Volume",
            record.total_sol_volume,
            delta.map(|d| d.total_sol_volume),
            2,
        ));
        lines.push(counter_line(
            "Buy Volume",
            record.buy_volume,
            delta.map(|d| d.buy_volume),
            2,
        ));
        lines.push(counter_line(
            "Sell Volume",
            record.sell_volume,
            delta.map(|d| d.sell_volume),
            2,
        ));
        lines.push(counter_line(
            "SOL Reserves",
            record.real_sol_reserves,
            delta.map(|d| d.real_sol_reserves),
            2,
        ));
        lines.push(counter_line(
            "Makers",
            record.maker_count as f64,
            delta.map(|d| d.maker_count as f64),
            0,
        ));
        lines.push(counter_line(
            "Holders",
            record.holder_count as f64,
            delta.map(|d| d.holder_count as f64),
            0,
        ));
        lines.push(format!(
            "  {:<14} {:>10}",
            "Time to state",
            format_duration(record.time_before_state)
        ));

        cards.push(lines.join("\n"));
    }
    cards.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kings_common::analytics::{find_anomalies, SortColumn, TrackedMetric};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(-4321.5, 1), "-4,321.5");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(f64::NAN, 2), "N/A");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(1234.0), "1.23k");
        assert_eq!(format_compact(1_500_000.0), "1.5m");
        assert_eq!(format_compact(2_000_000_000.0), "2b");
        assert_eq!(format_compact(12.346), "12.35");
        assert_eq!(format_compact(0.0), "0");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.0), "42s");
        assert_eq!(format_duration(1.5), "1.5s");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
        assert_eq!(format_duration(90_000.0), "1d 1h");
        assert_eq!(format_duration_full(3661.0), "1 hour 1 minute 1 second");
        assert_eq!(format_duration_full(120.0), "2 minutes");
        assert_eq!(format_duration_full(0.0), "0 seconds");
    }

    #[test]
    fn test_format_cell_and_delta() {
        assert_eq!(format_cell(None, 2), "N/A");
        assert_eq!(format_cell(Some(25.0), 2), "25.00");
        assert_eq!(format_delta(5.0, 0), "+5");
        assert_eq!(format_delta(-3.5, 2), "-3.50");
        assert_eq!(format_timestamp_ms(0), "1970-01-01 00:00:00");
    }

    fn anomaly(state: i64) -> Anomaly {
        Anomaly {
            state,
            metric: TrackedMetric::TxCount,
            value: 200.0,
            avg: 48.0,
        }
    }

    #[test]
    fn test_anomaly_banner_collapses_tail() {
        assert!(render_anomaly_banner(&[]).is_none());

        let anomalies: Vec<Anomaly> = (1..=5).map(|i| anomaly(i * 10)).collect();
        let banner = render_anomaly_banner(&anomalies).unwrap();
        assert!(banner.contains(
            "State 10: Transaction Count (200.00) is significantly higher than average (48.00)"
        ));
        assert!(banner.contains("State 30"));
        assert!(!banner.contains("State 40"));
        assert!(banner.ends_with("+ 2 more anomalies detected"));

        let short = render_anomaly_banner(&anomalies[..3]).unwrap();
        assert!(!short.contains("more anomalies"));
        assert!(find_anomalies(&[]).is_empty());
    }

    #[test]
    fn test_state_table_marks_sorted_column() {
        let sort = SortSpec {
            column: SortColumn::TxCount,
            direction: SortDirection::Desc,
        };
        assert_eq!(
            render_state_table(&[], sort),
            "No data available for the selected rating."
        );
        assert_eq!(header_cell("txCount", "TX", sort), "TX↓");
        assert_eq!(header_cell("state", "STATE", sort), "STATE");
    }

    #[test]
    fn test_podium_render_order() {
        let tokens: Vec<TokenSummary> = ["a", "b", "c"]
            .iter()
            .enumerate()
            .map(|(i, name)| TokenSummary {
                name: name.to_string(),
                sol_reserve: (i as f64 + 1.0) * 10.0,
                holders_count: 10,
                ..Default::default()
            })
            .collect();
        let rendered = render_podium(&Podium::select(&tokens));
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("#2 b"));
        assert!(lines[1].contains("#1 a"));
        assert!(lines[2].contains("#3 c"));
        assert_eq!(render_podium(&Podium::select(&[])), "👑 No kings yet");
    }

    #[test]
    fn test_progress_cards() {
        let states = vec![
            StateRecord {
                state: 10,
                tx_count: 10,
                ..Default::default()
            },
            StateRecord {
                state: 20,
                tx_count: 10,
                holder_count: 4,
                ..Default::default()
            },
        ];
        let rendered = render_progress_cards(&states);

        assert!(rendered.contains("── STATE 10 ──  ⚠️  tx count unchanged"));
        assert!(rendered.contains("(+4)"));
        assert_eq!(render_progress_cards(&[]), "No states reached until now");
    }

    #[test]
    fn test_token_list_placeholders() {
        let tokens = vec![TokenSummary::default()];
        let rendered = render_token_list(&tokens);
        assert!(rendered.contains("Unknown Token"));
        assert!(rendered.contains("N/A"));
        assert_eq!(
            render_token_list(&[]),
            "No tokens match the current filters."
        );
    }
}
