//! Integration tests for layout-core.

use layout_core::{
    generate_layout_options, InkConfig, LayoutOptimizer, LayoutRequest, OptimizerError, Strategy,
    DEFAULT_MAX_OVERRUN,
};

fn parse(json: &str) -> LayoutRequest {
    serde_json::from_str(json).expect("request should deserialize")
}

const FOUR_ACROSS: &str = r#"{
    "columns_across": 4,
    "rows_around": 2,
    "label_width_mm": 50.0,
    "label_height_mm": 50.0,
    "vertical_gap_mm": 2.0,
    "roll_width_mm": 330.0
}"#;

mod request_tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let request = parse(&format!(
            r#"{{ "items": [{{ "id": "a", "quantity": 100 }}], "dieline": {FOUR_ACROSS} }}"#
        ));

        assert_eq!(request.max_overrun, DEFAULT_MAX_OVERRUN);
        assert_eq!(request.ink_config, InkConfig::Cmyk);
        assert_eq!(request.qty_per_roll, None);
        assert!(!request.items[0].needs_rotation);
        assert_eq!(request.dieline.bleed_top_mm, 0.0);
        assert!((request.weights.material_efficiency - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_ink_config_names() {
        let request = parse(&format!(
            r#"{{ "items": [], "dieline": {FOUR_ACROSS}, "ink_config": "CMYKW" }}"#
        ));
        assert_eq!(request.ink_config, InkConfig::Cmykw);
    }

    #[test]
    fn test_empty_items_return_empty() {
        let request = parse(&format!(r#"{{ "items": [], "dieline": {FOUR_ACROSS} }}"#));
        assert!(generate_layout_options(request).unwrap().is_empty());
    }

    #[test]
    fn test_zero_columns_rejected() {
        let request = parse(
            r#"{
                "items": [{ "id": "a", "quantity": 100 }],
                "dieline": {
                    "columns_across": 0,
                    "rows_around": 1,
                    "label_width_mm": 50.0,
                    "label_height_mm": 50.0,
                    "roll_width_mm": 330.0
                }
            }"#,
        );
        let err = generate_layout_options(request).unwrap_err();
        assert!(matches!(err, OptimizerError::InvalidGeometry(_)));
        assert!(err.to_string().starts_with("Invalid geometry"));
    }
}

mod pipeline_tests {
    use super::*;

    fn order() -> LayoutRequest {
        parse(&format!(
            r#"{{
                "items": [
                    {{ "id": "lemon", "quantity": 1000 }},
                    {{ "id": "lime", "quantity": 1005, "needs_rotation": true }},
                    {{ "id": "orange", "quantity": 980 }}
                ],
                "dieline": {FOUR_ACROSS},
                "qty_per_roll": 500
            }}"#
        ))
    }

    #[test]
    fn test_every_option_covers_every_item() {
        let options = generate_layout_options(order()).unwrap();
        assert!(!options.is_empty());

        for option in &options {
            for (id, quantity) in [("lemon", 1000), ("lime", 1005), ("orange", 980)] {
                let printed: u64 = option
                    .runs
                    .iter()
                    .flat_map(|r| &r.slot_assignments)
                    .filter(|a| a.item_id.as_deref() == Some(id))
                    .map(|a| a.quantity_in_slot)
                    .sum();
                assert!(printed >= quantity, "{:?} under-prints {id}", option.id);
            }
        }
    }

    #[test]
    fn test_rotation_flag_propagates() {
        let options = generate_layout_options(order()).unwrap();
        let lime_slots = options
            .iter()
            .flat_map(|o| &o.runs)
            .flat_map(|r| &r.slot_assignments)
            .filter(|a| a.item_id.as_deref() == Some("lime"));

        for slot in lime_slots {
            assert!(slot.needs_rotation);
        }
    }

    #[test]
    fn test_ganged_beats_individual_for_close_quantities() {
        let options = generate_layout_options(order()).unwrap();
        let position = |strategy: Strategy| options.iter().position(|o| o.id == strategy).unwrap();

        assert!(position(Strategy::Ganged) < position(Strategy::Individual));

        let ganged = &options[position(Strategy::Ganged)];
        assert_eq!(ganged.runs.len(), 1);
        assert_eq!(ganged.total_frames, 56);
        assert!(!ganged.reasoning.is_empty());
    }

    #[test]
    fn test_options_serialize_with_strategy_tags() {
        let optimizer = LayoutOptimizer::new(order()).unwrap();
        let options = optimizer.generate_layout_options();
        let json = serde_json::to_value(&options).unwrap();

        let ids: Vec<&str> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["id"].as_str().unwrap())
            .collect();
        assert!(ids.contains(&"equal-quantity"));
        assert!(ids.contains(&"individual"));
    }
}
