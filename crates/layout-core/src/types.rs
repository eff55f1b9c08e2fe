use serde::{Deserialize, Serialize};

/// Default tolerance, in labels, for how far one slot may out-print its siblings.
pub const DEFAULT_MAX_OVERRUN: u64 = 250;

/// Label artwork to be printed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    pub id: String,
    pub quantity: u64,
    /// Carried through to slot assignments, never interpreted by the optimizer
    #[serde(default)]
    pub needs_rotation: bool,
}

/// Die-cutting template geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDieline {
    /// Physical slot count across the roll
    pub columns_across: u32,
    /// Labels stacked vertically per template repeat
    pub rows_around: u32,
    pub label_width_mm: f64,
    pub label_height_mm: f64,
    #[serde(default)]
    pub vertical_gap_mm: f64,
    #[serde(default)]
    pub bleed_top_mm: f64,
    #[serde(default)]
    pub bleed_bottom_mm: f64,
    pub roll_width_mm: f64,
}

/// Press geometry derived from a dieline. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub total_slots: u32,
    pub labels_per_slot_per_frame: u64,
    pub labels_per_frame: u64,
    pub templates_per_frame: u32,
    pub template_height_mm: f64,
    pub frame_height_mm: f64,
    pub frames_per_meter: f64,
}

/// What one slot prints for the length of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotAssignment {
    /// 0-based lateral position
    pub slot: u32,
    /// `None` marks a blank station
    pub item_id: Option<String>,
    pub quantity_in_slot: u64,
    #[serde(default)]
    pub needs_rotation: bool,
}

impl SlotAssignment {
    /// A station that carries no artwork in this run.
    pub fn blank(slot: u32) -> Self {
        Self {
            slot,
            item_id: None,
            quantity_in_slot: 0,
            needs_rotation: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.item_id.is_none()
    }
}

/// A single continuous press pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedRun {
    pub run_number: u32,
    pub slot_assignments: Vec<SlotAssignment>,
    pub meters: f64,
    pub frames: u64,
    /// Frame-quantized output of every slot
    #[serde(default)]
    pub actual_labels_per_slot: u64,
    #[serde(default)]
    pub needs_rewinding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidation_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrun_warnings: Vec<String>,
}

/// Layout heuristic that produced an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Every item in its own slot of a shared run
    Ganged,
    /// One run per item
    Individual,
    /// Greedy anchor-based grouping
    Optimized,
    /// Runs cut at shared quantity levels
    EqualQuantity,
    /// Optimized runs with short runs folded into longer ones
    RollOptimized,
}

/// Relative importance of each efficiency score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationWeights {
    pub material_efficiency: f64,
    pub print_efficiency: f64,
    pub labor_efficiency: f64,
}

impl Default for OptimizationWeights {
    fn default() -> Self {
        Self {
            material_efficiency: 1.0 / 3.0,
            print_efficiency: 1.0 / 3.0,
            labor_efficiency: 1.0 / 3.0,
        }
    }
}

/// Ink station setup of the press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InkConfig {
    Cmy,
    #[default]
    Cmyk,
    Cmykw,
    Cmyko,
}

impl InkConfig {
    /// Press speed in meters per minute
    pub fn speed_m_per_min(self) -> f64 {
        match self {
            InkConfig::Cmy => 50.0,
            InkConfig::Cmyk => 40.0,
            InkConfig::Cmykw => 25.0,
            InkConfig::Cmyko => 30.0,
        }
    }
}

/// Input: What the order system provides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub items: Vec<LabelItem>,
    pub dieline: LabelDieline,
    #[serde(default)]
    pub weights: OptimizationWeights,
    #[serde(default)]
    pub ink_config: InkConfig,
    /// Target roll length in labels
    #[serde(default)]
    pub qty_per_roll: Option<u64>,
    #[serde(default = "default_max_overrun")]
    pub max_overrun: u64,
}

fn default_max_overrun() -> u64 {
    DEFAULT_MAX_OVERRUN
}

/// One scored candidate layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOption {
    pub id: Strategy,
    pub runs: Vec<ProposedRun>,
    pub total_meters: f64,
    pub total_frames: u64,
    pub total_waste_meters: f64,
    pub material_efficiency_score: f64,
    pub print_efficiency_score: f64,
    pub labor_efficiency_score: f64,
    pub overall_score: f64,
    /// Make-ready plus press time for the whole option
    pub estimated_production_minutes: f64,
    pub reasoning: String,
}

/// Error type for optimization
#[derive(Debug, thiserror::Error)]
pub enum OptimizerError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid item: {0}")]
    InvalidItem(String),
}

pub type Result<T> = std::result::Result<T, OptimizerError>;
