use crate::types::*;
use geometry::round_to_cm;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::{debug, warn};

mod geometry;
mod roll;
mod scoring;
mod slots;
mod strategies;

pub use geometry::MAX_FRAME_LENGTH_MM;
pub use roll::{annotate_runs_with_roll_info, consolidate_short_runs, ROLL_TOLERANCE};
pub use scoring::{calculate_production_time, score_layout, LayoutScore, MAKE_READY_FIRST_MIN};
pub use slots::{balance_slot_quantities, fill_all_slots, validate_run_overrun, SlotDemand};

use slots::slot_imbalance;

/// Largest quantity accepted for a single item.
pub const MAX_ITEM_QUANTITY: u64 = 1_000_000_000;

/// Proposes and ranks alternative press layouts for one order.
pub struct LayoutOptimizer {
    request: LayoutRequest,
    config: SlotConfig,
}

impl LayoutOptimizer {
    /// Validates the request and resolves the dieline geometry.
    pub fn new(request: LayoutRequest) -> Result<Self> {
        let config = SlotConfig::from_dieline(&request.dieline)?;

        let mut seen = HashSet::new();
        for item in &request.items {
            if item.quantity == 0 {
                return Err(OptimizerError::InvalidItem(format!(
                    "Item '{}' must have a quantity of at least 1",
                    item.id
                )));
            }

            if item.quantity > MAX_ITEM_QUANTITY {
                return Err(OptimizerError::InvalidItem(format!(
                    "Item '{}' quantity {} exceeds the limit of {MAX_ITEM_QUANTITY}",
                    item.id, item.quantity
                )));
            }

            if !seen.insert(item.id.as_str()) {
                return Err(OptimizerError::InvalidItem(format!(
                    "Item '{}' appears more than once",
                    item.id
                )));
            }
        }

        Ok(Self { request, config })
    }

    pub fn slot_config(&self) -> &SlotConfig {
        &self.config
    }

    /// Runs every applicable strategy and returns the options best first.
    pub fn generate_layout_options(&self) -> Vec<LayoutOption> {
        if self.request.items.is_empty() {
            return Vec::new();
        }

        let mut options: Vec<LayoutOption> = Strategy::ALL
            .par_iter()
            .filter_map(|&strategy| {
                let runs = strategy.generate(self)?;
                if runs.is_empty() {
                    return None;
                }
                debug!(?strategy, runs = runs.len(), "strategy proposed runs");
                Some(self.create_layout_option(strategy, runs))
            })
            .collect();

        // Stable, so equal scores keep strategy order
        options.sort_by(|a, b| {
            b.overall_score
                .partial_cmp(&a.overall_score)
                .unwrap_or(Ordering::Equal)
        });

        if options.is_empty() {
            warn!(
                items = self.request.items.len(),
                total_slots = self.config.total_slots,
                "no strategy produced a layout for a validated request"
            );
        }

        options
    }
}

/// Validates `request` and returns its layout options, best first.
pub fn generate_layout_options(request: LayoutRequest) -> Result<Vec<LayoutOption>> {
    Ok(LayoutOptimizer::new(request)?.generate_layout_options())
}
