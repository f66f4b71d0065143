use quickstep::hotkeys::{action_for_key, board_controls_legend, BOARD_BINDINGS};

fn legend_keys(legend: &str) -> Vec<char> {
    legend
        .split_whitespace()
        .filter_map(|token| {
            if token.chars().count() == 1 {
                token.chars().next()
            } else {
                None
            }
        })
        .collect()
}

#[test]
fn linter_hotkeys_advertised_in_ui_must_have_behavior() {
    let advertised = legend_keys(&board_controls_legend());
    for binding in BOARD_BINDINGS {
        assert!(
            advertised.contains(&binding.key),
            "binding `{}` is missing from the legend",
            binding.key
        );
    }
    for key in advertised {
        assert!(
            action_for_key(key).is_some(),
            "advertised hotkey `{key}` has no application behavior"
        );
    }
}

#[test]
fn linter_hotkeys_are_unique() {
    let mut keys = BOARD_BINDINGS
        .iter()
        .map(|binding| binding.key)
        .collect::<Vec<_>>();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), BOARD_BINDINGS.len());
}
