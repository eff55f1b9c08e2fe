use super::*;

/// One item's demand as it enters a slot fill.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotDemand {
    pub item_id: String,
    pub quantity: u64,
    pub needs_rotation: bool,
}

impl From<&LabelItem> for SlotDemand {
    fn from(item: &LabelItem) -> Self {
        Self {
            item_id: item.id.clone(),
            quantity: item.quantity,
            needs_rotation: item.needs_rotation,
        }
    }
}

impl ProposedRun {
    /// Builds a run whose length is driven by its heaviest slot.
    pub fn from_assignments(
        run_number: u32,
        slot_assignments: Vec<SlotAssignment>,
        config: &SlotConfig,
    ) -> Self {
        let mut run = Self {
            run_number,
            slot_assignments,
            meters: 0.0,
            frames: 0,
            actual_labels_per_slot: 0,
            needs_rewinding: false,
            consolidation_suggestion: None,
            overrun_warnings: Vec::new(),
        };
        run.recompute_length(config);
        run
    }

    /// Re-derives frames and meters after slot quantities changed.
    pub fn recompute_length(&mut self, config: &SlotConfig) {
        let heaviest = self
            .slot_assignments
            .iter()
            .map(|a| a.quantity_in_slot)
            .max()
            .unwrap_or(0);
        self.frames = config.frames_for_quantity(heaviest).max(1);
        self.meters = config.meters_for_frames(self.frames);
    }

    /// Distinct item ids printed in this run, in slot order.
    pub fn item_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for id in self.slot_assignments.iter().filter_map(|a| a.item_id.as_deref()) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Places demands round-robin across every slot.
///
/// A demand repeated over `k` slots gets `ceil(quantity / k)` per slot, so its
/// slots together print at least what was requested. Demands past
/// `total_slots` are not placed; callers never pass more than that.
pub fn fill_all_slots(demands: &[SlotDemand], total_slots: u32) -> Vec<SlotAssignment> {
    if demands.is_empty() {
        return Vec::new();
    }

    let total = total_slots as usize;
    if demands.len() > total {
        debug!(
            demands = demands.len(),
            total_slots, "more demands than slots, extra demands left unplaced"
        );
    }

    let mut occupancy = vec![0u64; demands.len()];
    for slot in 0..total {
        occupancy[slot % demands.len()] += 1;
    }

    (0..total)
        .map(|slot| {
            let idx = slot % demands.len();
            let demand = &demands[idx];
            SlotAssignment {
                slot: slot as u32,
                item_id: Some(demand.item_id.clone()),
                quantity_in_slot: demand.quantity.div_ceil(occupancy[idx]),
                needs_rotation: demand.needs_rotation,
            }
        })
        .collect()
}

/// Splits an unbalanced assignment into a capped run plus remainder runs.
///
/// Items are measured by their total across every slot they occupy. When the
/// spread between the largest and smallest item exceeds `max_overrun`, every
/// slot is capped at the smallest total and whatever is left of the larger
/// items is re-filled into the next run.
pub fn balance_slot_quantities(
    assignments: Vec<SlotAssignment>,
    config: &SlotConfig,
    first_run_number: u32,
    max_overrun: u64,
) -> Vec<ProposedRun> {
    let mut runs = Vec::new();
    let mut pending = Some(assignments);

    while let Some(assignments) = pending.take() {
        let totals = item_totals(&assignments);
        let (Some(max), Some(min)) = (
            totals.iter().map(|t| t.quantity).max(),
            totals.iter().map(|t| t.quantity).min(),
        ) else {
            continue;
        };

        let run_number = first_run_number + runs.len() as u32;

        if max - min <= max_overrun {
            runs.push(ProposedRun::from_assignments(run_number, assignments, config));
            continue;
        }

        let capped: Vec<SlotAssignment> = assignments
            .into_iter()
            .map(|a| SlotAssignment {
                quantity_in_slot: a.quantity_in_slot.min(min),
                ..a
            })
            .collect();

        let remainder: Vec<SlotDemand> = totals
            .into_iter()
            .filter_map(|total| {
                let printed = quantity_of(&capped, &total.item_id);
                let left = total.quantity.saturating_sub(printed);
                (left > 0).then_some(SlotDemand {
                    quantity: left,
                    ..total
                })
            })
            .collect();

        debug!(
            run_number,
            cap = min,
            carried_items = remainder.len(),
            "capped unbalanced run"
        );
        runs.push(ProposedRun::from_assignments(run_number, capped, config));

        if !remainder.is_empty() {
            pending = Some(fill_all_slots(&remainder, config.total_slots));
        }
    }

    runs
}

/// True when the frame-quantized output exceeds no slot's request by more
/// than `max_overrun`.
pub fn validate_run_overrun(
    assignments: &[SlotAssignment],
    config: &SlotConfig,
    max_overrun: u64,
) -> bool {
    let heaviest = assignments
        .iter()
        .map(|a| a.quantity_in_slot)
        .max()
        .unwrap_or(0);
    let actual_per_slot = config.actual_labels_per_slot(config.frames_for_quantity(heaviest));

    assignments
        .iter()
        .filter(|a| !a.is_blank())
        .all(|a| actual_per_slot.saturating_sub(a.quantity_in_slot) <= max_overrun)
}

/// Spread between the fullest and emptiest occupied slot.
pub(super) fn slot_imbalance(assignments: &[SlotAssignment]) -> u64 {
    let quantities = assignments
        .iter()
        .filter(|a| !a.is_blank())
        .map(|a| a.quantity_in_slot);
    match (quantities.clone().max(), quantities.min()) {
        (Some(max), Some(min)) => max - min,
        _ => 0,
    }
}

/// Per-item totals in first-seen slot order.
fn item_totals(assignments: &[SlotAssignment]) -> Vec<SlotDemand> {
    let mut totals: Vec<SlotDemand> = Vec::new();
    for assignment in assignments {
        let Some(id) = assignment.item_id.as_deref() else {
            continue;
        };
        match totals.iter_mut().find(|t| t.item_id == id) {
            Some(total) => {
                total.quantity = total.quantity.saturating_add(assignment.quantity_in_slot)
            }
            None => totals.push(SlotDemand {
                item_id: id.to_string(),
                quantity: assignment.quantity_in_slot,
                needs_rotation: assignment.needs_rotation,
            }),
        }
    }
    totals
}

fn quantity_of(assignments: &[SlotAssignment], item_id: &str) -> u64 {
    assignments
        .iter()
        .filter(|a| a.item_id.as_deref() == Some(item_id))
        .map(|a| a.quantity_in_slot)
        .sum()
}
