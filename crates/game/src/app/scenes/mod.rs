mod access_denied;
mod countdown;
mod credits;
mod main_menu;
mod quiz;
mod sequence;

use engine::app::{text_width_px, Color, Viewport, DEFAULT_VIEWPORT};
use engine::InputSnapshot;

use super::minigame::Shake;

pub(crate) use access_denied::AccessDeniedScene;
pub(crate) use countdown::CountdownScene;
pub(crate) use credits::CreditsScene;
pub(crate) use main_menu::MainMenuScene;
pub(crate) use quiz::QuizScene;
pub(crate) use sequence::SequenceScene;

pub(crate) const BACKDROP: Color = [18, 16, 28, 255];
pub(crate) const PANEL: Color = [50, 50, 50, 255];
pub(crate) const HIGHLIGHT: Color = [240, 200, 80, 255];
pub(crate) const GOOD: Color = [90, 210, 120, 255];
pub(crate) const BAD: Color = [230, 80, 70, 255];

const SHAKE_MAGNITUDE_PX: f32 = 10.0;

pub(crate) fn minigame_shake() -> Shake {
    Shake::new(SHAKE_MAGNITUDE_PX)
}

/// Window size the input was sampled at. Synthetic snapshots carry no size,
/// so they fall back to the default window.
pub(crate) fn input_viewport(input: &InputSnapshot) -> Viewport {
    match input.window_size() {
        (0, _) | (_, 0) => DEFAULT_VIEWPORT,
        (width, height) => Viewport { width, height },
    }
}

/// Largest scale up to `preferred` at which `text` fits in `max_width`.
pub(crate) fn fit_scale(text: &str, max_width: f32, preferred: u32) -> u32 {
    (1..=preferred)
        .rev()
        .find(|scale| text_width_px(text, *scale) as f32 <= max_width)
        .unwrap_or(1)
}

/// Index chosen by typing `1`..=`count` this tick.
pub(crate) fn typed_choice(input: &InputSnapshot, count: usize) -> Option<usize> {
    input
        .typed_text()
        .chars()
        .filter_map(|ch| ch.to_digit(10))
        .map(|digit| digit as usize)
        .find(|digit| (1..=count).contains(digit))
        .map(|digit| digit - 1)
}
