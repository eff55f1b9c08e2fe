use super::*;
use std::cmp::Reverse;

/// Labels a roll may fall short of its target before it needs rewinding.
pub const ROLL_TOLERANCE: u64 = 50;

/// Whether a slot output of `actual_per_slot` labels is too short for the
/// target roll length.
pub(super) fn is_short_run(actual_per_slot: u64, qty_per_roll: u64) -> bool {
    actual_per_slot < qty_per_roll.saturating_sub(ROLL_TOLERANCE)
}

/// Fills in the physical output of each run and flags short rolls and
/// slots that print far beyond their request.
pub fn annotate_runs_with_roll_info(
    runs: Vec<ProposedRun>,
    config: &SlotConfig,
    qty_per_roll: Option<u64>,
    max_overrun: u64,
) -> Vec<ProposedRun> {
    runs.into_iter()
        .map(|mut run| {
            let actual = config.actual_labels_per_slot(run.frames);
            run.actual_labels_per_slot = actual;
            run.needs_rewinding = qty_per_roll.is_some_and(|target| is_short_run(actual, target));

            run.overrun_warnings = run
                .slot_assignments
                .iter()
                .filter_map(|a| {
                    let item_id = a.item_id.as_deref()?;
                    let overrun = actual.saturating_sub(a.quantity_in_slot);
                    (overrun > max_overrun).then(|| {
                        format!(
                            "Slot {} ({}) overruns its {} labels by {}",
                            a.slot + 1,
                            item_id,
                            a.quantity_in_slot,
                            overrun
                        )
                    })
                })
                .collect();

            if run.needs_rewinding && run.consolidation_suggestion.is_none() {
                if let Some(target) = qty_per_roll {
                    run.consolidation_suggestion = Some(format!(
                        "Rolls of {actual} labels fall short of the {target} label target; manual rewinding required"
                    ));
                }
            }

            run
        })
        .collect()
}

/// Folds short runs into longer runs that already print all of their items.
///
/// Returns the surviving runs, renumbered from 1, and how many short runs
/// were absorbed. Short runs with no host stay as they are, marked for
/// manual rewinding.
pub fn consolidate_short_runs(
    runs: Vec<ProposedRun>,
    config: &SlotConfig,
    qty_per_roll: u64,
) -> (Vec<ProposedRun>, usize) {
    let short: Vec<bool> = runs
        .iter()
        .map(|run| is_short_run(config.actual_labels_per_slot(run.frames), qty_per_roll))
        .collect();

    let mut runs = runs;
    let mut absorbed = vec![false; runs.len()];

    for idx in (0..runs.len()).filter(|&i| short[i]) {
        let host = (0..runs.len()).find(|&candidate| {
            !short[candidate] && {
                let host_items = runs[candidate].item_ids();
                runs[idx].item_ids().iter().all(|id| host_items.contains(id))
            }
        });

        match host {
            Some(host) => {
                let source = runs[idx].clone();
                absorb_run(&mut runs[host], &source, config);
                absorbed[idx] = true;
                debug!(
                    run = source.run_number,
                    into = runs[host].run_number,
                    "absorbed short run"
                );
            }
            None => {
                let actual = config.actual_labels_per_slot(runs[idx].frames);
                runs[idx].consolidation_suggestion = Some(format!(
                    "No longer run shares these items; rolls of {actual} labels need manual rewinding to reach {qty_per_roll}"
                ));
            }
        }
    }

    let absorbed_count = absorbed.iter().filter(|&&a| a).count();
    let survivors = runs
        .into_iter()
        .zip(absorbed)
        .filter(|(_, absorbed)| !absorbed)
        .zip(1..)
        .map(|((run, _), run_number)| ProposedRun { run_number, ..run })
        .collect();

    (survivors, absorbed_count)
}

/// Adds each slot of `source` to the host slot printing the same item,
/// preferring the same slot position.
fn absorb_run(host: &mut ProposedRun, source: &ProposedRun, config: &SlotConfig) {
    for assignment in source.slot_assignments.iter().filter(|a| !a.is_blank()) {
        let same_position = host
            .slot_assignments
            .iter()
            .position(|h| h.slot == assignment.slot && h.item_id == assignment.item_id);
        let target = same_position.or_else(|| {
            host.slot_assignments
                .iter()
                .position(|h| h.item_id == assignment.item_id)
        });

        if let Some(target) = target {
            host.slot_assignments[target].quantity_in_slot += assignment.quantity_in_slot;
        }
    }

    host.recompute_length(config);
}

impl LayoutOptimizer {
    /// Balanced runs with short rolls folded into longer ones. Only offered
    /// when a roll target is set and at least one run was absorbed.
    pub(super) fn create_roll_optimized_runs(&self) -> Option<Vec<ProposedRun>> {
        let qty_per_roll = self.request.qty_per_roll?;
        let (runs, absorbed) =
            consolidate_short_runs(self.create_roll_base_runs(), &self.config, qty_per_roll);

        if absorbed == 0 {
            debug!("no short runs could be absorbed");
            return None;
        }

        Some(runs)
    }

    /// Anchor order without the tolerance check: demands largest first, packed
    /// `total_slots` at a time and split by the balancer. Tail runs print a
    /// subset of the items of the run they were split from.
    fn create_roll_base_runs(&self) -> Vec<ProposedRun> {
        let mut demands: Vec<SlotDemand> = self.request.items.iter().map(SlotDemand::from).collect();
        demands.sort_by_key(|d| Reverse(d.quantity));

        let mut runs = Vec::new();
        for batch in demands.chunks(self.config.total_slots as usize) {
            let assignments = fill_all_slots(batch, self.config.total_slots);
            let first_run_number = runs.len() as u32 + 1;
            runs.extend(balance_slot_quantities(
                assignments,
                &self.config,
                first_run_number,
                self.request.max_overrun,
            ));
        }

        runs
    }

    pub(super) fn annotate_runs_with_roll_info(&self, runs: Vec<ProposedRun>) -> Vec<ProposedRun> {
        annotate_runs_with_roll_info(
            runs,
            &self.config,
            self.request.qty_per_roll,
            self.request.max_overrun,
        )
    }
}
