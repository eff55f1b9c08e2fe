use super::*;
use std::cmp::Reverse;
use std::collections::BTreeSet;

impl Strategy {
    /// Every strategy, in evaluation order.
    pub const ALL: [Strategy; 5] = [
        Strategy::Ganged,
        Strategy::Individual,
        Strategy::Optimized,
        Strategy::EqualQuantity,
        Strategy::RollOptimized,
    ];

    /// Proposes runs for the optimizer's items, or `None` when the strategy
    /// does not apply to this request.
    pub fn generate(self, optimizer: &LayoutOptimizer) -> Option<Vec<ProposedRun>> {
        match self {
            Strategy::Ganged => optimizer.create_ganged_runs(),
            Strategy::Individual => Some(optimizer.create_individual_runs()),
            Strategy::Optimized => Some(optimizer.create_optimized_runs()),
            Strategy::EqualQuantity => Some(optimizer.create_equal_quantity_runs()),
            Strategy::RollOptimized => optimizer.create_roll_optimized_runs(),
        }
    }
}

/// Demand still waiting for a run. Each grouping step consumes the pool and
/// hands back the next one.
#[derive(Debug, Clone, Default)]
struct DemandPool {
    demands: Vec<SlotDemand>,
}

impl DemandPool {
    fn from_items(items: &[LabelItem]) -> Self {
        Self {
            demands: items.iter().map(SlotDemand::from).collect(),
        }
    }

    /// Largest remaining demand; the earliest one wins ties.
    fn anchor(&self) -> Option<&SlotDemand> {
        self.demands.iter().min_by_key(|d| Reverse(d.quantity))
    }

    /// Demands within `max_overrun` of the anchor, largest first.
    fn compatible_with(&self, anchor: &SlotDemand, max_overrun: u64) -> Vec<SlotDemand> {
        let mut compatible: Vec<SlotDemand> = self
            .demands
            .iter()
            .filter(|d| anchor.quantity.abs_diff(d.quantity) <= max_overrun)
            .cloned()
            .collect();
        compatible.sort_by_key(|d| Reverse(d.quantity));
        compatible
    }

    /// Up to `limit` demands that still need at least `level` labels.
    fn at_least(&self, level: u64, limit: usize) -> Vec<SlotDemand> {
        self.demands
            .iter()
            .filter(|d| d.quantity >= level)
            .take(limit)
            .cloned()
            .collect()
    }

    fn without(self, taken: &[SlotDemand]) -> Self {
        Self {
            demands: self
                .demands
                .into_iter()
                .filter(|d| !taken.iter().any(|t| t.item_id == d.item_id))
                .collect(),
        }
    }

    /// Deducts `amount` from each taken demand, dropping the ones that reach zero.
    fn deduct(self, taken: &[SlotDemand], amount: u64) -> Self {
        Self {
            demands: self
                .demands
                .into_iter()
                .map(|d| {
                    if taken.iter().any(|t| t.item_id == d.item_id) {
                        SlotDemand {
                            quantity: d.quantity.saturating_sub(amount),
                            ..d
                        }
                    } else {
                        d
                    }
                })
                .filter(|d| d.quantity > 0)
                .collect(),
        }
    }
}

impl LayoutOptimizer {
    /// Prints every item side by side, splitting the run when quantities
    /// drift too far apart. Only applies when every item gets a slot.
    pub(super) fn create_ganged_runs(&self) -> Option<Vec<ProposedRun>> {
        let total_slots = self.config.total_slots;
        if self.request.items.len() > total_slots as usize {
            return None;
        }

        let demands: Vec<SlotDemand> = self.request.items.iter().map(SlotDemand::from).collect();
        let assignments = fill_all_slots(&demands, total_slots);
        Some(balance_slot_quantities(
            assignments,
            &self.config,
            1,
            self.request.max_overrun,
        ))
    }

    pub(super) fn create_individual_runs(&self) -> Vec<ProposedRun> {
        self.request
            .items
            .iter()
            .zip(1..)
            .map(|(item, run_number)| {
                self.create_single_item_run(&SlotDemand::from(item), run_number)
            })
            .collect()
    }

    /// One item across every slot.
    pub(super) fn create_single_item_run(
        &self,
        demand: &SlotDemand,
        run_number: u32,
    ) -> ProposedRun {
        let assignments = fill_all_slots(std::slice::from_ref(demand), self.config.total_slots);
        ProposedRun::from_assignments(run_number, assignments, &self.config)
    }

    /// Greedy anchor grouping: the largest open demand pulls in every demand
    /// close enough to it, and the widest batch that keeps slot imbalance and
    /// frame overrun within tolerance becomes a run.
    pub(super) fn create_optimized_runs(&self) -> Vec<ProposedRun> {
        let max_overrun = self.request.max_overrun;
        let total_slots = self.config.total_slots;
        let mut pool = DemandPool::from_items(&self.request.items);
        let mut runs = Vec::new();

        while let Some(anchor) = pool.anchor().cloned() {
            let run_number = runs.len() as u32 + 1;
            let compatible = pool.compatible_with(&anchor, max_overrun);
            let widest = compatible.len().min(total_slots as usize);

            let accepted = (1..=widest).rev().find_map(|size| {
                let batch = &compatible[..size];
                let assignments = fill_all_slots(batch, total_slots);
                let fits = slot_imbalance(&assignments) <= max_overrun
                    && validate_run_overrun(&assignments, &self.config, max_overrun);
                fits.then(|| (batch.to_vec(), assignments))
            });

            let (batch, run) = match accepted {
                Some((batch, assignments)) => (
                    batch,
                    ProposedRun::from_assignments(run_number, assignments, &self.config),
                ),
                None => {
                    debug!(item = %anchor.item_id, "no batch within tolerance, printing alone");
                    let run = self.create_single_item_run(&anchor, run_number);
                    (vec![anchor], run)
                }
            };

            pool = pool.without(&batch);
            runs.push(run);
        }

        runs
    }

    /// Cuts runs at shared quantity levels so every occupied slot in a run
    /// prints the same amount.
    pub(super) fn create_equal_quantity_runs(&self) -> Vec<ProposedRun> {
        let total_slots = self.config.total_slots as usize;
        let levels: BTreeSet<u64> = self.request.items.iter().map(|i| i.quantity).collect();
        let mut pool = DemandPool::from_items(&self.request.items);
        let mut runs = Vec::new();

        for level in levels.into_iter().rev() {
            loop {
                let selected = pool.at_least(level, total_slots);
                if selected.is_empty() {
                    break;
                }
                let run_number = runs.len() as u32 + 1;
                runs.push(self.create_level_run(run_number, &selected, level));
                pool = pool.deduct(&selected, level);
            }
        }

        let leftovers = pool.demands;
        for batch in leftovers.chunks(total_slots) {
            let level = batch.iter().map(|d| d.quantity).max().unwrap_or(0);
            let run_number = runs.len() as u32 + 1;
            runs.push(self.create_level_run(run_number, batch, level));
        }

        runs
    }

    /// Each demand in its own slot at `level`; remaining slots stay blank.
    fn create_level_run(&self, run_number: u32, batch: &[SlotDemand], level: u64) -> ProposedRun {
        let assignments = (0..self.config.total_slots)
            .map(|slot| match batch.get(slot as usize) {
                Some(demand) => SlotAssignment {
                    slot,
                    item_id: Some(demand.item_id.clone()),
                    quantity_in_slot: level,
                    needs_rotation: demand.needs_rotation,
                },
                None => SlotAssignment::blank(slot),
            })
            .collect();
        ProposedRun::from_assignments(run_number, assignments, &self.config)
    }
}
