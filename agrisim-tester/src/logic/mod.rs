pub mod policy;
pub mod reports;
pub mod seeds;
pub mod simulation;

pub use policy::SeasonStrategy;
pub use seeds::resolve_seed_inputs;
pub use simulation::{SeasonPlan, SeasonRecord, run_season};

use agrisim_game::Verdict;

/// Per-strategy means across every seed that ran.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAggregate {
    pub strategy: SeasonStrategy,
    pub runs: usize,
    pub mean_money: f64,
    pub mean_sustainability: f64,
    pub mean_score: f64,
    pub thriving_pct: f64,
}

/// Group records by strategy, keeping first-seen order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_by_strategy(records: &[SeasonRecord]) -> Vec<StrategyAggregate> {
    let mut order: Vec<SeasonStrategy> = Vec::new();
    for record in records {
        if !order.contains(&record.strategy) {
            order.push(record.strategy);
        }
    }

    order
        .into_iter()
        .map(|strategy| {
            let runs: Vec<&SeasonRecord> =
                records.iter().filter(|r| r.strategy == strategy).collect();
            let n = runs.len() as f64;
            let mean = |f: fn(&SeasonRecord) -> f64| runs.iter().map(|r| f(r)).sum::<f64>() / n;
            let thriving = runs
                .iter()
                .filter(|r| r.summary.verdict == Verdict::Thriving)
                .count();
            StrategyAggregate {
                strategy,
                runs: runs.len(),
                mean_money: mean(|r| r.summary.final_profit),
                mean_sustainability: mean(|r| r.summary.final_sustainability),
                mean_score: mean(|r| f64::from(r.summary.score)),
                thriving_pct: thriving as f64 / n * 100.0,
            }
        })
        .collect()
}
