use macroquad::prelude::{KeyCode, is_key_pressed};

use crate::controls::{Controls, MAX_BAR_COUNT, MIN_BAR_COUNT};

const STEP: f32 = 0.1;
const OPACITY_STEP: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    NextMode,
    PreviousMode,
    NextColorMode,
    SensitivityUp,
    SensitivityDown,
    ScaleUp,
    ScaleDown,
    ThicknessUp,
    ThicknessDown,
    MoreBars,
    FewerBars,
    NextAspect,
    CycleOpacity,
    TogglePause,
    ToggleBackground,
    ToggleRecording,
    ToggleHud,
    Quit,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::NextMode => "next mode",
            Action::PreviousMode => "previous mode",
            Action::NextColorMode => "color mode",
            Action::SensitivityUp => "sensitivity +",
            Action::SensitivityDown => "sensitivity -",
            Action::ScaleUp => "scale +",
            Action::ScaleDown => "scale -",
            Action::ThicknessUp => "thickness +",
            Action::ThicknessDown => "thickness -",
            Action::MoreBars => "more bars",
            Action::FewerBars => "fewer bars",
            Action::NextAspect => "aspect ratio",
            Action::CycleOpacity => "background opacity",
            Action::TogglePause => "play / pause",
            Action::ToggleBackground => "background on/off",
            Action::ToggleRecording => "record",
            Action::ToggleHud => "help",
            Action::Quit => "quit",
        }
    }
}

#[derive(Clone)]
pub struct KeyBinding {
    pub label: &'static str,
    pub keycode: KeyCode,
    pub action: Action,
}

pub struct ShortcutController {
    bindings: Vec<KeyBinding>,
}

impl ShortcutController {
    pub fn new() -> Self {
        let bind = |label, keycode, action| KeyBinding {
            label,
            keycode,
            action,
        };
        let bindings = vec![
            bind("M", KeyCode::M, Action::NextMode),
            bind("N", KeyCode::N, Action::PreviousMode),
            bind("C", KeyCode::C, Action::NextColorMode),
            bind("UP", KeyCode::Up, Action::SensitivityUp),
            bind("DOWN", KeyCode::Down, Action::SensitivityDown),
            bind("=", KeyCode::Equal, Action::ScaleUp),
            bind("-", KeyCode::Minus, Action::ScaleDown),
            bind("]", KeyCode::RightBracket, Action::ThicknessUp),
            bind("[", KeyCode::LeftBracket, Action::ThicknessDown),
            bind(".", KeyCode::Period, Action::MoreBars),
            bind(",", KeyCode::Comma, Action::FewerBars),
            bind("A", KeyCode::A, Action::NextAspect),
            bind("O", KeyCode::O, Action::CycleOpacity),
            bind("SPACE", KeyCode::Space, Action::TogglePause),
            bind("B", KeyCode::B, Action::ToggleBackground),
            bind("R", KeyCode::R, Action::ToggleRecording),
            bind("H", KeyCode::H, Action::ToggleHud),
            bind("ESC", KeyCode::Escape, Action::Quit),
        ];
        Self { bindings }
    }

    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Actions whose key went down this frame.
    pub fn poll(&self) -> Vec<Action> {
        self.bindings
            .iter()
            .filter(|binding| is_key_pressed(binding.keycode))
            .map(|binding| binding.action)
            .collect()
    }
}

/// Returns the controls after `action`, or `None` when the action does not
/// touch controls.
pub fn apply(action: Action, controls: &Controls) -> Option<Controls> {
    let mut next = controls.clone();
    match action {
        Action::NextMode => next.visual_mode = controls.visual_mode.next(),
        Action::PreviousMode => next.visual_mode = controls.visual_mode.previous(),
        Action::NextColorMode => next.color_mode = controls.color_mode.next(),
        Action::SensitivityUp => next.sensitivity = nudge(controls.sensitivity, STEP),
        Action::SensitivityDown => next.sensitivity = nudge(controls.sensitivity, -STEP),
        Action::ScaleUp => next.visualizer_scale = nudge(controls.visualizer_scale, STEP),
        Action::ScaleDown => next.visualizer_scale = nudge(controls.visualizer_scale, -STEP),
        Action::ThicknessUp => next.bar_thickness = nudge(controls.bar_thickness, STEP),
        Action::ThicknessDown => next.bar_thickness = nudge(controls.bar_thickness, -STEP),
        Action::MoreBars => {
            next.bar_count = (controls.bar_count * 2).clamp(MIN_BAR_COUNT, MAX_BAR_COUNT)
        }
        Action::FewerBars => {
            next.bar_count = (controls.bar_count / 2).clamp(MIN_BAR_COUNT, MAX_BAR_COUNT)
        }
        Action::NextAspect => next.aspect = controls.aspect.next(),
        Action::CycleOpacity => {
            let raised = controls.background_opacity + OPACITY_STEP;
            next.background_opacity = if raised > 1.0 + f32::EPSILON {
                0.0
            } else {
                raised.min(1.0)
            };
        }
        Action::TogglePause
        | Action::ToggleBackground
        | Action::ToggleRecording
        | Action::ToggleHud
        | Action::Quit => return None,
    }
    Some(next.sanitized())
}

fn nudge(value: f32, delta: f32) -> f32 {
    (((value + delta) * 10.0).round() / 10.0).max(STEP)
}
