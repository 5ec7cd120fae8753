use engine::app::{Space, Viewport, WHITE};
use engine::{
    DrawList, InputSnapshot, Rect, Scene, SceneCommand, SceneContext, SceneError, SceneOutcome,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use super::{
    fit_scale, input_viewport, minigame_shake, typed_choice, BACKDROP, BAD, GOOD, HIGHLIGHT, PANEL,
};
use crate::app::catalog::{QuizDeck, QuizQuestion};
use crate::app::minigame::{CountdownTimer, Lives, Shake, TimerEvent};

const STARTING_LIVES: u32 = 3;
const QUESTION_SECONDS: f32 = 20.0;
const FEEDBACK_SECONDS: f32 = 1.0;
const END_SCREEN_SECONDS: f32 = 3.0;
const SHAKE_SECONDS: f32 = 0.3;

const OPTION_WIDTH: f32 = 700.0;
const OPTION_HEIGHT: f32 = 70.0;
const OPTION_GAP: f32 = 16.0;
const OPTIONS_TOP: f32 = 300.0;

const CORRECT_SOUND: &str = "correct";
const WRONG_SOUND: &str = "wrong";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Asking,
    Feedback { correct: bool, timed_out: bool, remaining: f32 },
    Finished { won: bool, remaining: f32 },
}

/// Multiple-choice mini-game: one deck, three lives, a timer per question.
pub(crate) struct QuizScene {
    deck_id: String,
    title: String,
    music: Option<String>,
    questions: Vec<QuizQuestion>,
    index: usize,
    correct: u32,
    lives: Lives,
    timer: CountdownTimer,
    shake: Shake,
    phase: Phase,
}

impl QuizScene {
    pub(crate) fn new(deck: &QuizDeck) -> Self {
        Self::with_rng(deck, StdRng::from_entropy(), minigame_shake())
    }

    /// Draws `questions_per_run` questions from the deck in random order.
    pub(crate) fn with_rng(deck: &QuizDeck, mut rng: StdRng, shake: Shake) -> Self {
        let count = deck
            .questions_per_run
            .unwrap_or(deck.questions.len())
            .min(deck.questions.len());
        let questions: Vec<QuizQuestion> = deck
            .questions
            .choose_multiple(&mut rng, count)
            .cloned()
            .collect();
        Self {
            deck_id: deck.id.clone(),
            title: deck.title.clone(),
            music: deck.music.clone(),
            questions,
            index: 0,
            correct: 0,
            lives: Lives::new(STARTING_LIVES),
            timer: CountdownTimer::new(QUESTION_SECONDS),
            shake,
            phase: Phase::Asking,
        }
    }

    pub(crate) fn current_question(&self) -> Option<&QuizQuestion> {
        match self.phase {
            Phase::Finished { .. } => None,
            _ => self.questions.get(self.index),
        }
    }

    pub(crate) fn lives(&self) -> u32 {
        self.lives.remaining()
    }

    pub(crate) fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished { .. })
    }

    fn outcome(&self, won: bool) -> SceneOutcome {
        if won {
            SceneOutcome::Won {
                score: self.correct,
            }
        } else {
            SceneOutcome::Lost {
                score: self.correct,
            }
        }
    }

    fn answer(&mut self, choice: usize, ctx: &SceneContext) {
        let Some(question) = self.questions.get(self.index) else {
            return;
        };
        let correct = question.answer == choice;
        debug!(deck = %self.deck_id, question = self.index, choice, correct, "quiz_answered");
        if correct {
            self.correct += 1;
            ctx.audio().play_sound(CORRECT_SOUND);
        } else {
            self.penalize(ctx);
        }
        self.phase = Phase::Feedback {
            correct,
            timed_out: false,
            remaining: FEEDBACK_SECONDS,
        };
    }

    fn time_expired(&mut self, ctx: &SceneContext) {
        info!(deck = %self.deck_id, question = self.index, "quiz_time_expired");
        self.penalize(ctx);
        self.phase = Phase::Feedback {
            correct: false,
            timed_out: true,
            remaining: FEEDBACK_SECONDS,
        };
    }

    fn penalize(&mut self, ctx: &SceneContext) {
        self.lives.lose_one();
        self.shake.start(SHAKE_SECONDS);
        ctx.audio().play_sound(WRONG_SOUND);
    }

    fn next_question(&mut self) {
        self.index += 1;
        if self.lives.is_empty() || self.index >= self.questions.len() {
            let won = !self.lives.is_empty() && self.correct as usize == self.questions.len();
            info!(
                deck = %self.deck_id,
                correct = self.correct,
                total = self.questions.len(),
                lives = self.lives.remaining(),
                won,
                "quiz_finished"
            );
            self.phase = Phase::Finished {
                won,
                remaining: END_SCREEN_SECONDS,
            };
        } else {
            self.timer.reset();
            self.phase = Phase::Asking;
        }
    }

    fn clicked_option(&self, input: &InputSnapshot, count: usize) -> Option<usize> {
        let click = input.clicked_at()?;
        let viewport = input_viewport(input);
        (0..count).find(|index| option_rect(*index, viewport).contains_point(click))
    }

    fn render_question(&self, frame: &mut DrawList, question: &QuizQuestion) {
        let viewport = frame.viewport();
        let center_x = viewport.center().x;
        let max_width = viewport.width as f32 - 80.0;
        frame.text_centered(
            format!("QUESTION {}/{}", self.index + 1, self.question_count()),
            center_x,
            120.0,
            3,
            HIGHLIGHT,
        );
        frame.text_centered(
            question.prompt.as_str(),
            center_x,
            190.0,
            fit_scale(&question.prompt, max_width, 4),
            WHITE,
        );

        for (index, option) in question.options.iter().enumerate() {
            let rect = option_rect(index, viewport);
            let fill = match self.phase {
                Phase::Feedback { .. } if index == question.answer => GOOD,
                _ => PANEL,
            };
            frame.fill_rect(rect, fill, Space::Screen);
            let label = format!("{}. {option}", index + 1);
            let scale = fit_scale(&label, rect.width - 30.0, 4);
            frame.text(label, engine::Vec2::new(rect.x + 15.0, rect.y + 22.0), scale, WHITE);
        }
    }
}

/// Screen rect of option row `index`, shared by rendering and click tests.
fn option_rect(index: usize, viewport: Viewport) -> Rect {
    Rect::new(
        viewport.center().x - OPTION_WIDTH * 0.5,
        OPTIONS_TOP + index as f32 * (OPTION_HEIGHT + OPTION_GAP),
        OPTION_WIDTH,
        OPTION_HEIGHT,
    )
}

impl Scene for QuizScene {
    fn name(&self) -> &str {
        &self.deck_id
    }

    fn on_enter(&mut self, ctx: &mut SceneContext) {
        info!(deck = %self.deck_id, questions = self.questions.len(), "quiz_started");
        if let Some(music) = &self.music {
            ctx.audio().play_music(music, true);
        }
    }

    fn update(
        &mut self,
        dt_seconds: f32,
        input: &InputSnapshot,
        ctx: &mut SceneContext,
    ) -> Result<SceneCommand, SceneError> {
        self.shake.tick(dt_seconds);
        match self.phase {
            Phase::Asking => {
                let option_count = self
                    .questions
                    .get(self.index)
                    .map_or(0, |question| question.options.len());
                if option_count == 0 {
                    self.next_question();
                    return Ok(SceneCommand::None);
                }
                let choice = typed_choice(input, option_count)
                    .or_else(|| self.clicked_option(input, option_count));
                if let Some(choice) = choice {
                    self.answer(choice, ctx);
                } else if self.timer.tick(dt_seconds) == TimerEvent::Expired {
                    self.time_expired(ctx);
                }
            }
            Phase::Feedback {
                correct,
                timed_out,
                remaining,
            } => {
                let remaining = remaining - dt_seconds;
                if remaining <= 0.0 {
                    self.next_question();
                } else {
                    self.phase = Phase::Feedback {
                        correct,
                        timed_out,
                        remaining,
                    };
                }
            }
            Phase::Finished { won, remaining } => {
                let remaining = remaining - dt_seconds;
                if remaining <= 0.0 {
                    return Ok(SceneCommand::Pop(self.outcome(won)));
                }
                self.phase = Phase::Finished { won, remaining };
            }
        }
        Ok(SceneCommand::None)
    }

    fn render(&self, frame: &mut DrawList) {
        let viewport = frame.viewport();
        let center_x = viewport.center().x;
        frame.clear(BACKDROP);
        frame.set_screen_offset(self.shake.offset());
        frame.text_centered(self.title.as_str(), center_x, 40.0, 6, HIGHLIGHT);
        frame.text(
            format!("LIVES: {}", self.lives()),
            engine::Vec2::new(40.0, 40.0),
            3,
            WHITE,
        );
        frame.text(
            format!("TIME: {}", self.timer.display_seconds()),
            engine::Vec2::new(viewport.width as f32 - 200.0, 40.0),
            3,
            WHITE,
        );

        match self.phase {
            Phase::Finished { won, .. } => {
                let (headline, color) = if won {
                    ("YOU WIN!", GOOD)
                } else {
                    ("TRY AGAIN!", BAD)
                };
                frame.text_centered(headline, center_x, viewport.center().y - 80.0, 10, color);
                frame.text_centered(
                    format!("SCORE: {}/{}", self.correct, self.questions.len()),
                    center_x,
                    viewport.center().y + 20.0,
                    4,
                    WHITE,
                );
            }
            Phase::Asking | Phase::Feedback { .. } => {
                if let Some(question) = self.current_question() {
                    self.render_question(frame, question);
                }
                if let Phase::Feedback {
                    correct, timed_out, ..
                } = self.phase
                {
                    let (message, color) = match (correct, timed_out) {
                        (true, _) => ("CORRECT!", GOOD),
                        (false, true) => ("TIME'S UP!", BAD),
                        (false, false) => ("WRONG!", BAD),
                    };
                    frame.text_centered(message, center_x, viewport.height as f32 - 90.0, 5, color);
                }
            }
        }
    }

    fn on_exit(&mut self, ctx: &mut SceneContext) {
        if self.music.is_some() {
            ctx.audio().stop_music();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use engine::app::{AudioEvent, RecordingAudio, DEFAULT_VIEWPORT};
    use engine::SceneRegistry;

    use super::*;
    use crate::app::testing::{run_until_command, test_context, test_context_with_audio};

    fn deck(questions: usize) -> QuizDeck {
        QuizDeck {
            id: "math_olympus".to_string(),
            title: "Math Olympus".to_string(),
            music: Some("math".to_string()),
            questions_per_run: None,
            questions: (0..questions)
                .map(|index| QuizQuestion {
                    prompt: format!("{index} + 1 = ?"),
                    options: vec![format!("{}", index + 1), "0".to_string(), "99".to_string()],
                    answer: 0,
                })
                .collect(),
        }
    }

    fn quiz(deck: &QuizDeck) -> QuizScene {
        QuizScene::with_rng(
            deck,
            StdRng::seed_from_u64(3),
            Shake::with_rng(10.0, StdRng::seed_from_u64(4)),
        )
    }

    fn key(ch: char) -> InputSnapshot {
        InputSnapshot::empty().with_typed_text(ch.to_string())
    }

    fn answer_key(scene: &QuizScene, correct: bool) -> InputSnapshot {
        let question = scene.current_question().expect("question");
        let choice = if correct {
            question.answer
        } else {
            (question.answer + 1) % question.options.len()
        };
        key(char::from(b'1' + choice as u8))
    }

    /// Answers, then idles through the feedback pause.
    fn answer(scene: &mut QuizScene, ctx: &mut SceneContext, correct: bool) {
        let input = answer_key(scene, correct);
        scene.update(0.016, &input, ctx).expect("answer");
        scene
            .update(FEEDBACK_SECONDS + 0.01, &InputSnapshot::empty(), ctx)
            .expect("feedback");
    }

    #[test]
    fn draws_requested_number_of_questions() {
        let mut source = deck(8);
        source.questions_per_run = Some(5);
        assert_eq!(quiz(&source).question_count(), 5);
    }

    #[test]
    fn perfect_run_pops_won_after_end_screen() {
        let mut ctx = test_context(SceneRegistry::default());
        let source = deck(3);
        let mut scene = quiz(&source);
        for _ in 0..3 {
            answer(&mut scene, &mut ctx, true);
        }
        assert!(scene.is_finished());

        let (elapsed, command) = run_until_command(&mut scene, &mut ctx, 0.5, 20);
        assert!((elapsed - END_SCREEN_SECONDS).abs() < 0.01);
        assert!(matches!(
            command,
            SceneCommand::Pop(SceneOutcome::Won { score: 3 })
        ));
    }

    #[test]
    fn one_wrong_answer_costs_a_life_and_the_win() {
        let audio = Rc::new(RecordingAudio::default());
        let mut ctx = test_context_with_audio(SceneRegistry::default(), Rc::clone(&audio));
        let source = deck(3);
        let mut scene = quiz(&source);
        answer(&mut scene, &mut ctx, false);
        assert_eq!(scene.lives(), 2);
        answer(&mut scene, &mut ctx, true);
        answer(&mut scene, &mut ctx, true);

        let (_, command) = run_until_command(&mut scene, &mut ctx, 0.5, 20);
        assert!(matches!(
            command,
            SceneCommand::Pop(SceneOutcome::Lost { score: 2 })
        ));
        assert!(audio.events().contains(&AudioEvent::Sound {
            key: WRONG_SOUND.to_string()
        }));
    }

    #[test]
    fn running_out_of_lives_ends_early() {
        let mut ctx = test_context(SceneRegistry::default());
        let source = deck(6);
        let mut scene = quiz(&source);
        for _ in 0..STARTING_LIVES {
            answer(&mut scene, &mut ctx, false);
        }
        assert!(scene.is_finished());
        assert_eq!(scene.lives(), 0);
    }

    #[test]
    fn timeout_costs_a_life_and_moves_on() {
        let mut ctx = test_context(SceneRegistry::default());
        let source = deck(2);
        let mut scene = quiz(&source);
        let first_prompt = scene.current_question().expect("question").prompt.clone();

        scene
            .update(QUESTION_SECONDS + 0.5, &InputSnapshot::empty(), &mut ctx)
            .expect("update");
        assert_eq!(scene.lives(), 2);
        assert!(matches!(scene.phase, Phase::Feedback { timed_out: true, .. }));

        scene
            .update(FEEDBACK_SECONDS + 0.01, &InputSnapshot::empty(), &mut ctx)
            .expect("update");
        let second_prompt = &scene.current_question().expect("question").prompt;
        assert_ne!(&first_prompt, second_prompt);
        assert_eq!(scene.timer.display_seconds(), QUESTION_SECONDS as u32);
    }

    #[test]
    fn clicking_an_option_row_answers() {
        let mut ctx = test_context(SceneRegistry::default());
        let source = deck(1);
        let mut scene = quiz(&source);
        let answer_index = scene.current_question().expect("question").answer;
        let click = InputSnapshot::empty()
            .with_cursor_position_px(Some(option_rect(answer_index, DEFAULT_VIEWPORT).center()))
            .with_left_click_pressed(true);

        scene.update(0.016, &click, &mut ctx).expect("update");
        assert!(matches!(scene.phase, Phase::Feedback { correct: true, .. }));
    }

    #[test]
    fn out_of_range_keys_are_ignored() {
        let mut ctx = test_context(SceneRegistry::default());
        let source = deck(1);
        let mut scene = quiz(&source);
        scene.update(0.016, &key('9'), &mut ctx).expect("update");
        assert_eq!(scene.phase, Phase::Asking);
        assert_eq!(scene.lives(), STARTING_LIVES);
    }

    #[test]
    fn music_plays_for_the_quiz_only() {
        let audio = Rc::new(RecordingAudio::default());
        let mut ctx = test_context_with_audio(SceneRegistry::default(), Rc::clone(&audio));
        let source = deck(1);
        let mut scene = quiz(&source);
        scene.on_enter(&mut ctx);
        scene.on_exit(&mut ctx);
        assert_eq!(
            audio.events(),
            vec![
                AudioEvent::Music {
                    key: "math".to_string(),
                    looped: true
                },
                AudioEvent::StopMusic,
            ]
        );
    }
}
