use super::*;

/// Longest physical frame the press can image, in millimeters.
pub const MAX_FRAME_LENGTH_MM: f64 = 960.0;

impl SlotConfig {
    /// Derives press geometry from a dieline, stacking as many template
    /// repeats as fit in one frame.
    pub fn from_dieline(dieline: &LabelDieline) -> Result<Self> {
        if dieline.columns_across == 0 {
            return Err(OptimizerError::InvalidGeometry(
                "Dieline must have at least one column across".to_string(),
            ));
        }

        if dieline.rows_around == 0 {
            return Err(OptimizerError::InvalidGeometry(
                "Dieline must have at least one row around".to_string(),
            ));
        }

        let rows = dieline.rows_around as f64;
        let template_height_mm = rows * dieline.label_height_mm
            + (rows - 1.0) * dieline.vertical_gap_mm
            + dieline.bleed_top_mm
            + dieline.bleed_bottom_mm;

        if !template_height_mm.is_finite() || template_height_mm <= 0.0 {
            return Err(OptimizerError::InvalidGeometry(format!(
                "Template height must be positive, got {template_height_mm} mm"
            )));
        }

        let across_mm = dieline.columns_across as f64 * dieline.label_width_mm;
        if dieline.roll_width_mm > 0.0 && across_mm > dieline.roll_width_mm {
            warn!(
                across_mm,
                roll_width_mm = dieline.roll_width_mm,
                "labels across exceed the roll width"
            );
        }

        let templates_per_frame =
            ((MAX_FRAME_LENGTH_MM / template_height_mm).floor() as u32).max(1);
        let labels_per_slot_per_frame = dieline.rows_around as u64 * templates_per_frame as u64;
        let frame_height_mm = template_height_mm * templates_per_frame as f64;

        Ok(Self {
            total_slots: dieline.columns_across,
            labels_per_slot_per_frame,
            labels_per_frame: dieline.columns_across as u64 * labels_per_slot_per_frame,
            templates_per_frame,
            template_height_mm,
            frame_height_mm,
            frames_per_meter: 1000.0 / frame_height_mm,
        })
    }

    /// Frames needed for one slot to reach `quantity` labels.
    pub fn frames_for_quantity(&self, quantity: u64) -> u64 {
        quantity.div_ceil(self.labels_per_slot_per_frame)
    }

    /// Linear meters for a frame count, rounded to centimeters.
    pub fn meters_for_frames(&self, frames: u64) -> f64 {
        round_to_cm(frames as f64 / self.frames_per_meter)
    }

    /// Labels every slot actually produces over `frames`.
    pub fn actual_labels_per_slot(&self, frames: u64) -> u64 {
        frames.saturating_mul(self.labels_per_slot_per_frame)
    }
}

pub(super) fn round_to_cm(meters: f64) -> f64 {
    (meters * 100.0).round() / 100.0
}
