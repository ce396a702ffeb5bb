use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::rank::RankedSite;
use crate::scoring::{AdjustmentReason, FactorScore, FeasibilityResult, ScoreType};
use crate::signals::insights::{self, DaySet};
use crate::signals::LocationSignals;

const MAX_BAR_WIDTH: usize = 30;
const MIN_BAR_WIDTH: usize = 10;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn score_type_label(score_type: ScoreType) -> &'static str {
    match score_type {
        ScoreType::General => "general",
        ScoreType::Tailored => "tailored",
    }
}

/// Shorten a source path from the left, keeping the file name visible
fn truncate_source(source: &str, max_width: usize) -> String {
    let chars: Vec<char> = source.chars().collect();
    if chars.len() <= max_width {
        source.to_string()
    } else if max_width > 3 {
        format!("...{}", chars[chars.len() - (max_width - 3)..].iter().collect::<String>())
    } else {
        chars[chars.len() - max_width..].iter().collect()
    }
}

/// Color a 0-100 score: green when favorable, yellow when middling, red otherwise
fn colored_score(text: &str, score: u8) -> String {
    if score >= 65 {
        text.green().bold().to_string()
    } else if score >= 45 {
        text.yellow().bold().to_string()
    } else {
        text.red().bold().to_string()
    }
}

/// Format ranked sites as a table with columns: Index, Score, Mode, Source
/// Index column: 3 chars (fits "99."), score column 3 chars, mode 8 chars
pub fn format_ranked_table(sites: &[RankedSite], use_colors: bool) -> String {
    if sites.is_empty() {
        return "No bundles scored.".to_string();
    }

    let term_width = get_terminal_width();
    // "99." + space + "100" + 2 spaces + "tailored" + 2 spaces
    let fixed_width = 3 + 1 + 3 + 2 + 8 + 2;

    sites
        .iter()
        .enumerate()
        .map(|(idx, site)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>3}", site.result.score);
            let mode_str = format!("{:<8}", score_type_label(site.result.score_type));
            let source = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_source(&site.source, width - fixed_width)
                }
                Some(_) => truncate_source(&site.source, 20),
                None => site.source.clone(),
            };
            let marker = if site.malformed { " (malformed)" } else { "" };

            if use_colors {
                format!(
                    "{} {}  {}  {}{}",
                    index_str.dimmed(),
                    colored_score(&score_str, site.result.score),
                    mode_str.cyan(),
                    source,
                    marker.red()
                )
            } else {
                format!("{} {}  {}  {}{}", index_str, score_str, mode_str, source, marker)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked sites as tab-separated values for scripting
/// Columns: score, scoreType, source (no headers, no colors)
pub fn format_tsv(sites: &[RankedSite]) -> String {
    sites
        .iter()
        .map(|site| {
            let score_type = match site.result.score_type {
                ScoreType::General => "General",
                ScoreType::Tailored => "Tailored",
            };
            format!("{}\t{}\t{}", site.result.score, score_type, site.source)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked sites as a pretty JSON array
pub fn format_json(sites: &[RankedSite]) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(sites)?)
}

fn bar_width() -> usize {
    get_terminal_width()
        .map(|w| w.saturating_sub(40).clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH))
        .unwrap_or(MAX_BAR_WIDTH)
}

/// Render a 0-100 value as a fixed-width bar
pub fn format_bar(value: u8, width: usize) -> String {
    let filled = (usize::from(value.min(100)) * width + 50) / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

fn format_factor_line(factor: &FactorScore, width: usize, use_colors: bool) -> String {
    let bar = format_bar(factor.value, width);
    let bar = if use_colors {
        bar.blue().to_string()
    } else {
        bar
    };
    format!(
        "  {:<18} {:>3}%  {}  {:>3}",
        factor.name, factor.weight, bar, factor.value
    )
}

/// Multi-line view of one result: score, mode, adjustment and factor bars
pub fn format_result_detail(source: &str, result: &FeasibilityResult, use_colors: bool) -> String {
    let width = bar_width();
    let score = format!("{}/100", result.score);
    let score = if use_colors {
        colored_score(&score, result.score)
    } else {
        score
    };

    let mut lines = vec![
        if use_colors {
            source.bold().to_string()
        } else {
            source.to_string()
        },
        format!(
            "  Score: {} ({})",
            score,
            score_type_label(result.score_type)
        ),
        format!("  Base: {:.1}", result.detail.base_score),
    ];

    if result.score_type == ScoreType::Tailored {
        let adjustment = result.detail.adjustment;
        let points = match adjustment {
            AdjustmentReason::None => "+0".to_string(),
            other => format!("{:+}", other.points()),
        };
        lines.push(format!("  Tailoring: {} ({})", points, adjustment.describe()));
    }

    lines.extend(
        result
            .breakdown
            .iter()
            .map(|factor| format_factor_line(factor, width, use_colors)),
    );
    lines.join("\n")
}

/// Descriptive summary of a bundle's signals
pub fn format_insights(signals: &LocationSignals, use_colors: bool) -> String {
    let heading = |text: &str| {
        if use_colors {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    };
    let mut lines = Vec::new();

    lines.push(heading("Foot traffic"));
    match insights::busiest_day(signals) {
        Some((day, value)) => lines.push(format!("  Busiest day: {} ({:.0})", day, value)),
        None => lines.push("  No weekly congestion data.".to_string()),
    }
    for (label, days) in [("weekday", DaySet::Weekdays), ("weekend", DaySet::Weekend)] {
        let profile = insights::hourly_profile(signals, days);
        if let Some(hour) = insights::peak_hour(&profile) {
            lines.push(format!(
                "  Peak {} hour: {:02}:00 ({:.0})",
                label, hour, profile[hour]
            ));
        }
    }

    lines.push(heading("Visitors"));
    let totals = insights::visitor_totals(signals);
    if totals.total() > 0.0 {
        lines.push(format!(
            "  Male {:.0} / Female {:.0} ({:.0}% female)",
            totals.male,
            totals.female,
            totals.female / totals.total() * 100.0
        ));
    } else {
        lines.push("  No visitor data.".to_string());
    }
    if let Some((bucket, count)) = insights::dominant_age_bucket(signals) {
        lines.push(format!("  Largest age group: {} ({:.0})", bucket.label(), count));
    }

    lines.push(heading("Businesses"));
    let businesses = &signals.businesses;
    lines.push(format!("  Total: {}", businesses.total_count));
    let mut categories: Vec<(&String, &u64)> = businesses.category_counts.iter().collect();
    categories.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (name, count) in categories.into_iter().take(5) {
        lines.push(format!("  {:<18} {}", name, count));
    }

    lines.push(heading("Real estate"));
    match insights::price_summary(&signals.real_estate) {
        Some(summary) => {
            lines.push(format!("  Latest yearly median: {:.0}", summary.latest));
            lines.push(format!(
                "  {}-year average: {:.0}",
                summary.yearly.len(),
                summary.average
            ));
            lines.push(format!("  Trend: {:+.1}%", summary.trend_pct));
        }
        None => lines.push("  No price history.".to_string()),
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{FeasibilityEngine, ScoringConfig};
    use crate::signals::{ScoringMode, Weekday};

    fn site(source: &str, signals: &LocationSignals, mode: &ScoringMode) -> RankedSite {
        let engine = FeasibilityEngine::from_config(&ScoringConfig::default()).unwrap();
        RankedSite {
            source: source.to_string(),
            result: engine.score(signals, mode),
            malformed: false,
        }
    }

    #[test]
    fn test_format_ranked_table_empty() {
        assert_eq!(format_ranked_table(&[], false), "No bundles scored.");
    }

    #[test]
    fn test_format_ranked_table_rows() {
        let sites = vec![
            site("gangnam.json", &LocationSignals::default(), &ScoringMode::General),
            site(
                "mapo.json",
                &LocationSignals::default(),
                &ScoringMode::Tailored("cafe".to_string()),
            ),
        ];
        let table = format_ranked_table(&sites, false);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1.  54  general"));
        assert!(lines[0].contains("gangnam.json"));
        assert!(lines[1].contains("tailored"));
    }

    #[test]
    fn test_format_ranked_table_marks_malformed() {
        let mut broken = site("broken.json", &LocationSignals::default(), &ScoringMode::General);
        broken.malformed = true;
        let table = format_ranked_table(&[broken], false);
        assert!(table.contains("broken.json (malformed)"));
    }

    #[test]
    fn test_format_tsv() {
        let sites = vec![site("a.json", &LocationSignals::default(), &ScoringMode::General)];
        assert_eq!(format_tsv(&sites), "54\tGeneral\ta.json");
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_json() {
        let sites = vec![site("a.json", &LocationSignals::default(), &ScoringMode::General)];
        let json = format_json(&sites).unwrap();
        assert!(json.contains("\"scoreType\": \"General\""));
        assert!(json.contains("\"source\": \"a.json\""));
    }

    #[test]
    fn test_truncate_source() {
        assert_eq!(truncate_source("short.json", 20), "short.json");
        assert_eq!(truncate_source("very/long/path/site.json", 12), "...site.json");
        assert_eq!(truncate_source("abcdef", 2), "ef");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(0, 10), "..........");
        assert_eq!(format_bar(50, 10), "#####.....");
        assert_eq!(format_bar(100, 10), "##########");
        assert_eq!(format_bar(200, 4), "####");
    }

    #[test]
    fn test_format_result_detail_general() {
        let sited = site("a.json", &LocationSignals::default(), &ScoringMode::General);
        let detail = format_result_detail(&sited.source, &sited.result, false);
        assert!(detail.contains("Score: 54/100 (general)"));
        assert!(detail.contains("Base: 54.0"));
        assert!(detail.contains("Foot Traffic"));
        assert!(detail.contains("Rent/Real Estate"));
        assert!(!detail.contains("Tailoring"));
    }

    #[test]
    fn test_format_result_detail_tailored() {
        let sited = site(
            "a.json",
            &LocationSignals::default(),
            &ScoringMode::Tailored("cafe".to_string()),
        );
        let detail = format_result_detail(&sited.source, &sited.result, false);
        assert!(detail.contains("Tailoring: +0 (no adjustment)"));
    }

    #[test]
    fn test_format_insights_empty() {
        let text = format_insights(&LocationSignals::default(), false);
        assert!(text.contains("No weekly congestion data."));
        assert!(text.contains("No visitor data."));
        assert!(text.contains("Total: 0"));
        assert!(text.contains("No price history."));
    }

    #[test]
    fn test_format_insights_busiest_day() {
        let mut signals = LocationSignals::default();
        signals.congestion.weekly_rhythm.insert(Weekday::Fri, 88.0);
        signals.businesses.total_count = 12;
        signals.businesses.category_counts.insert("Cafe".to_string(), 4);
        let text = format_insights(&signals, false);
        assert!(text.contains("Busiest day: FRI (88)"));
        assert!(text.contains("Total: 12"));
        assert!(text.contains("Cafe"));
    }
}
