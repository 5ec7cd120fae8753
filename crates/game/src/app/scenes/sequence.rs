use engine::app::{Space, WHITE};
use engine::{
    DrawList, InputSnapshot, Rect, Scene, SceneCommand, SceneContext, SceneError, SceneOutcome,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::{BACKDROP, BAD, GOOD, HIGHLIGHT, PANEL};
use crate::app::entry::NumericEntry;
use crate::app::minigame::{CountdownTimer, TimerEvent};

const ROUNDS: u32 = 5;
const ROUND_INTRO_SECONDS: f32 = 1.5;
const SHOW_SECONDS: f32 = 1.0;
const ENTRY_SECONDS: f32 = 10.0;
const REVEAL_SECONDS: f32 = 2.0;
const END_SCREEN_SECONDS: f32 = 3.0;
const MAX_DIGITS: usize = 2;
const MUSIC: &str = "sequence_surge";

fn sequence_length(round: u32) -> usize {
    round as usize + 2
}

fn points_per_entry(round: u32) -> u32 {
    match round {
        1 | 2 => 1,
        3 | 4 => 2,
        _ => 3,
    }
}

/// Largest number shown in `round`; single digits until round three.
fn max_number(round: u32) -> u32 {
    if round <= 2 {
        9
    } else {
        99
    }
}

pub(crate) fn max_score() -> u32 {
    (1..=ROUNDS)
        .map(|round| sequence_length(round) as u32 * points_per_entry(round))
        .sum()
}

/// Score for one round: matching positions times the round's weight.
/// Missed entries (`None`) never match.
fn score_round(round: u32, shown: &[u32], entered: &[Option<u32>]) -> u32 {
    let matches = shown
        .iter()
        .zip(entered)
        .filter(|(expected, actual)| Some(**expected) == **actual)
        .count() as u32;
    matches * points_per_entry(round)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    RoundIntro { remaining: f32 },
    Showing { index: usize, remaining: f32 },
    Entry,
    Reveal { remaining: f32 },
    Finished { remaining: f32 },
}

/// Memory game: watch a run of numbers, then type them back one by one.
pub(crate) struct SequenceScene {
    rng: StdRng,
    round: u32,
    score: u32,
    sequence: Vec<u32>,
    entries: Vec<Option<u32>>,
    entry: NumericEntry,
    entry_timer: CountdownTimer,
    phase: Phase,
}

impl SequenceScene {
    pub(crate) fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub(crate) fn with_rng(rng: StdRng) -> Self {
        let mut scene = Self {
            rng,
            round: 1,
            score: 0,
            sequence: Vec::new(),
            entries: Vec::new(),
            entry: NumericEntry::new(MAX_DIGITS),
            entry_timer: CountdownTimer::new(ENTRY_SECONDS),
            phase: Phase::RoundIntro {
                remaining: ROUND_INTRO_SECONDS,
            },
        };
        scene.roll_sequence();
        scene
    }

    #[cfg(test)]
    fn score(&self) -> u32 {
        self.score
    }

    #[cfg(test)]
    fn round(&self) -> u32 {
        self.round
    }

    fn roll_sequence(&mut self) {
        let max = max_number(self.round);
        let length = sequence_length(self.round);
        let rng = &mut self.rng;
        self.sequence = (0..length).map(|_| rng.gen_range(0..=max)).collect();
        self.entries.clear();
        self.entry.clear();
    }

    fn outcome(&self) -> SceneOutcome {
        if self.score * 2 >= max_score() {
            SceneOutcome::Won { score: self.score }
        } else {
            SceneOutcome::Lost { score: self.score }
        }
    }

    fn handle_entry(&mut self, dt_seconds: f32, input: &InputSnapshot) {
        for ch in input.typed_text().chars() {
            if let Err(error) = self.entry.push_char(ch) {
                debug!(%error, "sequence_keystroke_ignored");
            }
        }
        if input.backspace_pressed() {
            self.entry.backspace();
        }

        if input.confirm_pressed() {
            match self.entry.submit() {
                Ok(value) => {
                    self.entries.push(Some(value));
                    self.entry_timer.reset();
                }
                Err(error) => debug!(%error, "sequence_submission_ignored"),
            }
        } else if self.entry_timer.tick(dt_seconds) == TimerEvent::Expired {
            info!(
                round = self.round,
                position = self.entries.len(),
                "sequence_entry_timed_out"
            );
            self.entries.push(None);
            self.entry.clear();
            self.entry_timer.reset();
        }

        if self.entries.len() >= self.sequence.len() {
            let earned = score_round(self.round, &self.sequence, &self.entries);
            self.score += earned;
            info!(round = self.round, earned, total = self.score, "sequence_round_scored");
            self.phase = Phase::Reveal {
                remaining: REVEAL_SECONDS,
            };
        }
    }

    fn finish_round(&mut self) {
        if self.round >= ROUNDS {
            info!(score = self.score, max = max_score(), "sequence_finished");
            self.phase = Phase::Finished {
                remaining: END_SCREEN_SECONDS,
            };
            return;
        }
        self.round += 1;
        self.roll_sequence();
        self.phase = Phase::RoundIntro {
            remaining: ROUND_INTRO_SECONDS,
        };
    }

    fn render_entry(&self, frame: &mut DrawList) {
        let center = frame.viewport().center();
        frame.text_centered(
            format!(
                "ENTER NUMBER {}/{}",
                self.entries.len() + 1,
                self.sequence.len()
            ),
            center.x,
            center.y - 120.0,
            4,
            WHITE,
        );
        let input_box = Rect::new(center.x - 150.0, center.y - 35.0, 300.0, 70.0);
        frame.fill_rect(input_box, WHITE, Space::Screen);
        frame.text_centered(self.entry.text(), center.x, center.y - 15.0, 6, PANEL);
        frame.text_centered(
            format!("TIME: {}", self.entry_timer.display_seconds()),
            center.x,
            center.y + 70.0,
            3,
            HIGHLIGHT,
        );
    }
}

impl Scene for SequenceScene {
    fn name(&self) -> &str {
        "sequence_surge"
    }

    fn on_enter(&mut self, ctx: &mut SceneContext) {
        ctx.audio().play_music(MUSIC, true);
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        _ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        match self.phase {
            Phase::RoundIntro { remaining } => {
                let remaining = remaining - dt_seconds;
                self.phase = if remaining <= 0.0 {
                    Phase::Showing {
                        index: 0,
                        remaining: SHOW_SECONDS,
                    }
                } else {
                    Phase::RoundIntro { remaining }
                };
            }
            Phase::Showing { index, remaining } => {
                let remaining = remaining - dt_seconds;
                self.phase = if remaining > 0.0 {
                    Phase::Showing { index, remaining }
                } else if index + 1 < self.sequence.len() {
                    Phase::Showing {
                        index: index + 1,
                        remaining: SHOW_SECONDS,
                    }
                } else {
                    self.entry_timer.reset();
                    Phase::Entry
                };
            }
            Phase::Entry => self.handle_entry(dt_seconds, input),
            Phase::Reveal { remaining } => {
                let remaining = remaining - dt_seconds;
                if remaining <= 0.0 {
                    self.finish_round();
                } else {
                    self.phase = Phase::Reveal { remaining };
                }
            }
            Phase::Finished { remaining } => {
                let remaining = remaining - dt_seconds;
                if remaining <= 0.0 {
                    return Ok(SceneCommand::Pop(self.outcome()));
                }
                self.phase = Phase::Finished { remaining };
            }
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, frame: &mut DrawList) {
        let viewport = frame.viewport();
        let center = viewport.center();
        frame.clear(BACKDROP);
        frame.text_centered("SEQUENCE SURGE", center.x, 40.0, 6, HIGHLIGHT);
        frame.text(
            format!("SCORE: {}", self.score),
            engine::Vec2::new(40.0, 40.0),
            3,
            WHITE,
        );

        match self.phase {
            Phase::RoundIntro { .. } => {
                let label = format!("ROUND {}", self.round);
                frame.text_centered(label, center.x, center.y - 40.0, 10, WHITE);
            }
            Phase::Showing { index, .. } => {
                if let Some(number) = self.sequence.get(index) {
                    frame.text_centered(number.to_string(), center.x, center.y - 60.0, 24, WHITE);
                }
            }
            Phase::Entry => self.render_entry(frame),
            Phase::Reveal { .. } => {
                frame.text_centered("CORRECT SEQUENCE:", center.x, center.y - 100.0, 4, WHITE);
                let shown = self
                    .sequence
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join("  ");
                frame.text_centered(shown, center.x, center.y - 30.0, 6, HIGHLIGHT);
            }
            Phase::Finished { .. } => {
                let (headline, color) = match self.outcome() {
                    SceneOutcome::Won { .. } => ("YOU PASSED!", GOOD),
                    _ => ("TRY AGAIN!", BAD),
                };
                frame.text_centered(headline, center.x, center.y - 80.0, 10, color);
                frame.text_centered(
                    format!("FINAL SCORE: {}/{}", self.score, max_score()),
                    center.x,
                    center.y + 20.0,
                    4,
                    WHITE,
                );
            }
        }
    }

    fn on_exit(&mut self, ctx: &mut SceneContext) {
        ctx.audio().stop_music();
    }
}

#[cfg(test)]
mod tests {
    use engine::SceneRegistry;

    use super::*;
    use crate::app::testing::{run_until_command, test_context};

    fn scene() -> SequenceScene {
        SequenceScene::with_rng(StdRng::seed_from_u64(11))
    }

    fn idle(scene: &mut SequenceScene, ctx: &mut SceneContext, seconds: f32) {
        scene
            .update(seconds, &InputSnapshot::empty(), ctx)
            .expect("update");
    }

    /// Skips the intro and the shown numbers.
    fn reach_entry(scene: &mut SequenceScene, ctx: &mut SceneContext) {
        idle(scene, ctx, ROUND_INTRO_SECONDS);
        for _ in 0..scene.sequence.len() {
            idle(scene, ctx, SHOW_SECONDS);
        }
        assert_eq!(scene.phase, Phase::Entry);
    }

    fn type_number(scene: &mut SequenceScene, ctx: &mut SceneContext, value: u32) {
        let typed = InputSnapshot::empty().with_typed_text(value.to_string());
        scene.update(0.016, &typed, ctx).expect("type");
        let submit = InputSnapshot::empty().with_confirm_pressed(true);
        scene.update(0.016, &submit, ctx).expect("submit");
    }

    fn play_round(scene: &mut SequenceScene, ctx: &mut SceneContext, correct: bool) {
        reach_entry(scene, ctx);
        for value in scene.sequence.clone() {
            type_number(scene, ctx, if correct { value } else { (value + 1) % 100 });
        }
        idle(scene, ctx, REVEAL_SECONDS);
    }

    #[test]
    fn maximum_score_is_fifty() {
        assert_eq!(max_score(), 3 + 4 + 5 * 2 + 6 * 2 + 7 * 3);
    }

    #[test]
    fn rounds_grow_and_use_wider_numbers_later() {
        assert_eq!(sequence_length(1), 3);
        assert_eq!(sequence_length(5), 7);
        assert_eq!(max_number(2), 9);
        assert_eq!(max_number(3), 99);
    }

    #[test]
    fn round_scoring_weights_matches() {
        let shown = [4, 7, 1];
        assert_eq!(score_round(1, &shown, &[Some(4), None, Some(1)]), 2);
        assert_eq!(score_round(5, &shown, &[Some(4), Some(7), Some(1)]), 9);
        assert_eq!(score_round(3, &shown, &[Some(1), Some(4), Some(7)]), 0);
    }

    #[test]
    fn shows_numbers_one_at_a_time() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        idle(&mut scene, &mut ctx, ROUND_INTRO_SECONDS);

        let mut frame = DrawList::new();
        scene.render(&mut frame);
        let first = scene.sequence[0].to_string();
        assert!(frame.texts().any(|text| text == first));
        assert_eq!(scene.phase, Phase::Showing { index: 0, remaining: SHOW_SECONDS });
    }

    #[test]
    fn perfect_game_wins() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        for _ in 0..ROUNDS {
            play_round(&mut scene, &mut ctx, true);
        }
        assert_eq!(scene.score(), max_score());

        let (_, command) = run_until_command(&mut scene, &mut ctx, 0.5, 20);
        assert!(matches!(
            command,
            SceneCommand::Pop(SceneOutcome::Won { score: 50 })
        ));
    }

    #[test]
    fn wrong_answers_lose() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        for _ in 0..ROUNDS {
            play_round(&mut scene, &mut ctx, false);
        }
        assert_eq!(scene.score(), 0);
        let (_, command) = run_until_command(&mut scene, &mut ctx, 0.5, 20);
        assert!(matches!(
            command,
            SceneCommand::Pop(SceneOutcome::Lost { score: 0 })
        ));
    }

    #[test]
    fn malformed_entries_are_ignored() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        reach_entry(&mut scene, &mut ctx);

        let junk = InputSnapshot::empty().with_typed_text("a.");
        scene.update(0.016, &junk, &mut ctx).expect("junk");
        let submit = InputSnapshot::empty().with_confirm_pressed(true);
        scene.update(0.016, &submit, &mut ctx).expect("empty submit");

        assert!(scene.entries.is_empty());
        assert_eq!(scene.phase, Phase::Entry);
    }

    #[test]
    fn timeout_records_a_miss() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        reach_entry(&mut scene, &mut ctx);

        let typed = InputSnapshot::empty().with_typed_text("5");
        scene.update(0.016, &typed, &mut ctx).expect("type");
        idle(&mut scene, &mut ctx, ENTRY_SECONDS);

        assert_eq!(scene.entries, vec![None]);
        assert_eq!(scene.entry.text(), "");
        assert_eq!(scene.entry_timer.display_seconds(), ENTRY_SECONDS as u32);
    }

    #[test]
    fn backspace_edits_the_pending_entry() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        reach_entry(&mut scene, &mut ctx);

        let typed = InputSnapshot::empty().with_typed_text("12");
        scene.update(0.016, &typed, &mut ctx).expect("type");
        let erase = InputSnapshot::empty().with_backspace_pressed(true);
        scene.update(0.016, &erase, &mut ctx).expect("erase");
        assert_eq!(scene.entry.text(), "1");
    }

    #[test]
    fn advances_to_next_round_after_reveal() {
        let mut ctx = test_context(SceneRegistry::default());
        let mut scene = scene();
        play_round(&mut scene, &mut ctx, true);
        assert_eq!(scene.round(), 2);
        assert_eq!(scene.sequence.len(), 4);
        assert!(matches!(scene.phase, Phase::RoundIntro { .. }));
    }
}
