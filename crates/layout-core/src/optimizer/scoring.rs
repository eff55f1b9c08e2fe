use super::*;

/// Press setup charged once per order, in minutes.
pub const MAKE_READY_FIRST_MIN: f64 = 30.0;

const PRINT_PENALTY_PER_RUN: f64 = 0.1;
const LABOR_PENALTY_PER_RUN: f64 = 0.15;
/// Largest share of the labor score lost when every run needs rewinding.
const REWIND_LABOR_PENALTY: f64 = 0.4;

/// Efficiency scores of one layout, each in [0, 1] except the weighted total.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutScore {
    pub waste_meters: f64,
    pub material_efficiency: f64,
    pub print_efficiency: f64,
    pub labor_efficiency: f64,
    pub overall: f64,
}

/// Scores annotated runs against the shortest possible print.
pub fn score_layout(
    runs: &[ProposedRun],
    theoretical_min_meters: f64,
    weights: &OptimizationWeights,
) -> LayoutScore {
    let total_meters: f64 = runs.iter().map(|r| r.meters).sum();
    let run_count = runs.len() as f64;

    let waste_meters = (total_meters - theoretical_min_meters).max(0.0);
    let material_efficiency = if total_meters > 0.0 {
        (1.0 - waste_meters / total_meters).max(0.0)
    } else {
        0.0
    };

    let print_efficiency = 1.0 / (1.0 + PRINT_PENALTY_PER_RUN * run_count);

    let rewinding = runs.iter().filter(|r| r.needs_rewinding).count() as f64;
    let rewind_fraction = if runs.is_empty() {
        0.0
    } else {
        rewinding / run_count
    };
    let labor_efficiency = 1.0 / (1.0 + LABOR_PENALTY_PER_RUN * run_count)
        * (1.0 - REWIND_LABOR_PENALTY * rewind_fraction);

    let overall = material_efficiency * weights.material_efficiency
        + print_efficiency * weights.print_efficiency
        + labor_efficiency * weights.labor_efficiency;

    LayoutScore {
        waste_meters: round_to_cm(waste_meters),
        material_efficiency,
        print_efficiency,
        labor_efficiency,
        overall,
    }
}

/// Minutes to print `total_meters` with one make-ready for the whole order.
pub fn calculate_production_time(total_meters: f64, ink_config: InkConfig) -> f64 {
    MAKE_READY_FIRST_MIN + total_meters / ink_config.speed_m_per_min()
}

impl LayoutOptimizer {
    /// Annotates and scores a strategy's runs into a ranked candidate.
    pub(super) fn create_layout_option(
        &self,
        strategy: Strategy,
        runs: Vec<ProposedRun>,
    ) -> LayoutOption {
        let runs = self.annotate_runs_with_roll_info(runs);

        let total_frames: u64 = runs.iter().map(|r| r.frames).sum();
        let total_meters = round_to_cm(runs.iter().map(|r| r.meters).sum());

        let required_labels = self
            .request
            .items
            .iter()
            .fold(0u64, |sum, item| sum.saturating_add(item.quantity));
        let theoretical_min_meters = self
            .config
            .meters_for_frames(required_labels.div_ceil(self.config.labels_per_frame));

        let score = score_layout(&runs, theoretical_min_meters, &self.request.weights);
        let reasoning = describe(strategy, &runs, total_meters, &score);

        LayoutOption {
            id: strategy,
            total_meters,
            total_frames,
            total_waste_meters: score.waste_meters,
            material_efficiency_score: score.material_efficiency,
            print_efficiency_score: score.print_efficiency,
            labor_efficiency_score: score.labor_efficiency,
            overall_score: score.overall,
            estimated_production_minutes: calculate_production_time(
                total_meters,
                self.request.ink_config,
            ),
            reasoning,
            runs,
        }
    }
}

fn describe(
    strategy: Strategy,
    runs: &[ProposedRun],
    total_meters: f64,
    score: &LayoutScore,
) -> String {
    let approach = match strategy {
        Strategy::Ganged => "Gangs every item across the slots of a shared run, splitting off tail runs where quantities diverge",
        Strategy::Individual => "Prints each item on its own run across every slot",
        Strategy::Optimized => "Groups items of similar quantity so slots finish together",
        Strategy::EqualQuantity => "Cuts runs at shared quantity levels so every occupied slot prints the same amount",
        Strategy::RollOptimized => "Folds short runs into longer runs with the same items to avoid rewinding",
    };

    let mut reasoning = format!(
        "{approach}. {} run(s), {total_meters:.2} m total, {:.2} m above the theoretical minimum.",
        runs.len(),
        score.waste_meters
    );

    let rewinding = runs.iter().filter(|r| r.needs_rewinding).count();
    if rewinding > 0 {
        reasoning.push_str(&format!(" {rewinding} run(s) need manual rewinding."));
    }

    let blank_slots = runs
        .iter()
        .flat_map(|r| &r.slot_assignments)
        .filter(|a| a.is_blank())
        .count();
    if blank_slots > 0 {
        reasoning.push_str(&format!(" {blank_slots} blank slot(s) across all runs."));
    }

    reasoning
}
