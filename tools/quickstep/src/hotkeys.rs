#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: char,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Quit,
    Shuffle,
    StartStop,
    NextStep,
    ToggleAuto,
    Faster,
    Slower,
    MoreElements,
    FewerElements,
    ClearLog,
}

/// Interval change applied by one `+`/`-` press.
pub const INTERVAL_STEP_MS: i64 = 50;

pub const BOARD_BINDINGS: [HotkeyBinding; 10] = [
    HotkeyBinding {
        key: 's',
        action: "shuffle",
    },
    HotkeyBinding {
        key: 'g',
        action: "start/stop",
    },
    HotkeyBinding {
        key: 'n',
        action: "next step",
    },
    HotkeyBinding {
        key: 'a',
        action: "auto",
    },
    HotkeyBinding {
        key: '+',
        action: "faster",
    },
    HotkeyBinding {
        key: '-',
        action: "slower",
    },
    HotkeyBinding {
        key: ']',
        action: "more",
    },
    HotkeyBinding {
        key: '[',
        action: "fewer",
    },
    HotkeyBinding {
        key: 'c',
        action: "clear log",
    },
    HotkeyBinding {
        key: 'q',
        action: "quit",
    },
];

pub fn board_controls_legend() -> String {
    let parts = BOARD_BINDINGS
        .iter()
        .map(|binding| format!("{} {}", binding.key, binding.action))
        .collect::<Vec<_>>();
    format!("Keys: {}", parts.join("  "))
}

pub fn action_for_key(key: char) -> Option<HotkeyAction> {
    match key {
        'q' => Some(HotkeyAction::Quit),
        's' => Some(HotkeyAction::Shuffle),
        'g' | '\n' | '\r' => Some(HotkeyAction::StartStop),
        'n' | ' ' => Some(HotkeyAction::NextStep),
        'a' => Some(HotkeyAction::ToggleAuto),
        '+' | '=' => Some(HotkeyAction::Faster),
        '-' => Some(HotkeyAction::Slower),
        ']' => Some(HotkeyAction::MoreElements),
        '[' => Some(HotkeyAction::FewerElements),
        'c' => Some(HotkeyAction::ClearLog),
        _ => None,
    }
}
