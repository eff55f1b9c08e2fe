//! Label layout optimization for narrow-web roll presses.
//!
//! Given label items with required quantities and a dieline, the optimizer
//! proposes several alternative layouts (which item prints in which slot,
//! for how many frames) and ranks them by material, print and labor
//! efficiency. It holds no state between calls.
//!
//! ```no_run
//! use layout_core::{generate_layout_options, LayoutRequest};
//!
//! # fn run(request: LayoutRequest) -> layout_core::Result<()> {
//! let options = generate_layout_options(request)?;
//! if let Some(best) = options.first() {
//!     println!("{:?}: {} runs", best.id, best.runs.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod optimizer;
pub mod types;

pub use optimizer::{
    annotate_runs_with_roll_info, balance_slot_quantities, calculate_production_time,
    consolidate_short_runs, fill_all_slots, generate_layout_options, score_layout,
    validate_run_overrun, LayoutOptimizer, LayoutScore, SlotDemand, MAKE_READY_FIRST_MIN,
    MAX_FRAME_LENGTH_MM, MAX_ITEM_QUANTITY, ROLL_TOLERANCE,
};
pub use types::*;
