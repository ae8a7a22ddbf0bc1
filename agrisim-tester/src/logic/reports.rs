use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::time::Duration;

use super::simulation::SeasonRecord;
use super::{StrategyAggregate, aggregate_by_strategy};

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

pub fn generate_console_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[SeasonRecord],
    total_duration: Duration,
) -> Result<()> {
    writeln!(writer)?;
    writeln!(writer, "{}", "📊 Season Results Summary".bright_cyan().bold())?;
    writeln!(writer, "{}", "=========================".cyan())?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    writeln!(writer, "Total seasons: {total}")?;
    writeln!(writer, "Passed: {}", passed.to_string().green())?;
    writeln!(writer, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(writer, "Success rate: {:.1}%", percent(passed, total))?;
    writeln!(writer, "Total time: {total_duration:?}")?;
    writeln!(writer)?;

    for record in records {
        let status = if record.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            writer,
            "{} {} {} seed {}",
            status,
            record.strategy.label().bold(),
            record.crop,
            record.seed
        )?;
        writeln!(
            writer,
            "   {} | money ${:.2} | sustainability {:.0} | health {:.1} | score {}",
            record.summary.verdict,
            record.summary.final_profit,
            record.summary.final_sustainability,
            record.summary.final_crop_health,
            record.summary.score
        )?;
        for violation in &record.violations {
            writeln!(writer, "     • {}", violation.red())?;
        }
    }

    let aggregates = aggregate_by_strategy(records);
    if !aggregates.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "{}", "🌾 Strategy Comparison".bright_yellow().bold())?;
        writeln!(writer, "{}", "======================".yellow())?;
        for agg in &aggregates {
            write_aggregate_line(writer, agg)?;
        }
    }
    Ok(())
}

fn write_aggregate_line<W: Write + ?Sized>(writer: &mut W, agg: &StrategyAggregate) -> Result<()> {
    writeln!(
        writer,
        "{:10} runs {:3} | mean money ${:7.2} | mean sustainability {:5.1} \
         | mean score {:7.1} | thriving {:5.1}%",
        agg.strategy.label(),
        agg.runs,
        agg.mean_money,
        agg.mean_sustainability,
        agg.mean_score,
        agg.thriving_pct
    )?;
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[SeasonRecord],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(records)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    writer: &mut W,
    records: &[SeasonRecord],
) -> Result<()> {
    writeln!(writer, "# Agrisim Season Results\n")?;

    let total = records.len();
    let passed = records.iter().filter(|r| r.passed()).count();
    writeln!(writer, "## Summary\n")?;
    writeln!(writer, "- **Total seasons**: {total}")?;
    writeln!(writer, "- **Passed**: {passed}")?;
    writeln!(writer, "- **Failed**: {}", total - passed)?;
    writeln!(writer, "- **Success rate**: {:.1}%\n", percent(passed, total))?;

    writeln!(writer, "## Seasons\n")?;
    writeln!(
        writer,
        "| Status | Strategy | Crop | Seed | Verdict | Money | Sustainability | Health | Score |"
    )?;
    writeln!(writer, "|---|---|---|---|---|---|---|---|---|")?;
    for record in records {
        let status = if record.passed() { "✅" } else { "❌" };
        writeln!(
            writer,
            "| {status} | {} | {} | `{}` | {} | {:.2} | {:.0} | {:.1} | {} |",
            record.strategy.label(),
            record.crop,
            record.seed,
            record.summary.verdict,
            record.summary.final_profit,
            record.summary.final_sustainability,
            record.summary.final_crop_health,
            record.summary.score
        )?;
    }

    let failing: Vec<&SeasonRecord> = records.iter().filter(|r| !r.passed()).collect();
    if !failing.is_empty() {
        writeln!(writer, "\n## Violations\n")?;
        for record in failing {
            writeln!(
                writer,
                "### {} {} seed {}\n",
                record.strategy.label(),
                record.crop,
                record.seed
            )?;
            for violation in &record.violations {
                writeln!(writer, "- {violation}")?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::policy::SeasonStrategy;
    use agrisim_game::{ActionTally, CropKind, SeasonSummary, Verdict};

    fn record(strategy: SeasonStrategy, violations: Vec<String>) -> SeasonRecord {
        SeasonRecord {
            strategy,
            crop: CropKind::Maize,
            seed: 42,
            days: 3,
            actions_applied: 3,
            summary: SeasonSummary {
                days: 3,
                final_profit: 14.0,
                final_sustainability: 96.0,
                final_crop_health: 41.5,
                actions: ActionTally::default(),
                verdict: Verdict::Thriving,
                score: 278,
            },
            digest: 7,
            violations,
        }
    }

    #[test]
    fn markdown_lists_violations() {
        let records = vec![
            record(SeasonStrategy::Steward, Vec::new()),
            record(SeasonStrategy::Random, vec!["day 2: state out of bounds".to_string()]),
        ];
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &records).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("- **Failed**: 1"));
        assert!(text.contains("| maize | `42` |"));
        assert!(text.contains("- day 2: state out of bounds"));
    }

    #[test]
    fn json_report_is_parseable() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &[record(SeasonStrategy::Idle, Vec::new())]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed[0]["strategy"], "idle");
        assert_eq!(parsed[0]["summary"]["verdict"], "thriving");
    }

    #[test]
    fn console_report_handles_empty_input() {
        let mut out = Vec::new();
        generate_console_report(&mut out, &[], Duration::ZERO).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total seasons: 0"));
        assert!(text.contains("Success rate: 0.0%"));
    }
}
