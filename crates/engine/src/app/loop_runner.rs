use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::AppPaths;

use super::input::ActionStates;
use super::metrics::MetricsAccumulator;
use super::rendering::DrawList;
use super::scene::{SceneContext, SceneError, INITIAL_SCENE};
use super::scene_stack::{SceneStack, StackStatus};
use super::{InputAction, InputSnapshot, Renderer, Vec2};

pub const SLOW_FRAME_ENV_VAR: &str = "BRAINSCAPE_SLOW_FRAME_MS";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub initial_scene: String,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub simulated_slow_frame_ms: u64,
    pub max_render_fps: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "BrainScape".to_string(),
            window_width: 1280,
            window_height: 720,
            initial_scene: INITIAL_SCENE.to_string(),
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(5),
            simulated_slow_frame_ms: 0,
            max_render_fps: Some(120),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] crate::StartupError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("failed to present frame: {0}")]
    Render(#[source] PixelsError),
    #[error("scene failure: {0}")]
    Scene(#[from] SceneError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window, enters `config.initial_scene` and drives the scene stack
/// until it empties or the window closes.
pub fn run_app(
    config: LoopConfig,
    paths: &AppPaths,
    mut ctx: SceneContext,
) -> Result<(), AppError> {
    let mut stack = SceneStack::new();
    let root = ctx.build_scene(&config.initial_scene)?;
    stack.start(root, &mut ctx)?;

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), paths.assets_dir.clone())
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(5));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let slow_frame_delay = resolve_slow_frame_delay(config.simulated_slow_frame_ms);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);
    let size = window.inner_size();
    let mut input_collector = InputCollector::new(size.width, size.height);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        slow_frame_delay_ms = slow_frame_delay.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        initial_scene = %config.initial_scene,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval, Instant::now());
    let mut last_title_scene = String::new();
    let mut draw_list = DrawList::new();
    let mut fatal: Option<AppError> = None;
    let fatal_slot = &mut fatal;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    stack.shutdown(&mut ctx);
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    input_collector.set_window_size(new_size.width, new_size.height);
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        *fatal_slot = Some(AppError::Render(error));
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    input_collector.set_window_size(size.width, size.height);
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        *fatal_slot = Some(AppError::Render(error));
                        window_target.exit();
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    input_collector.set_cursor_position_px(position.x as f32, position.y as f32);
                }
                WindowEvent::CursorLeft { .. } => input_collector.clear_cursor_position(),
                WindowEvent::MouseInput { state, button, .. } => {
                    input_collector.handle_mouse_input(button, state);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if slow_frame_delay > Duration::ZERO {
                        // Debug perturbation only; the FPS cap sleeps further down.
                        thread::sleep(slow_frame_delay);
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    let frame_delta = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(frame_delta);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    accumulator = step_plan.remaining_accumulator;
                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    for _ in 0..step_plan.ticks_to_run {
                        let input = input_collector.snapshot_for_tick();
                        let outcome = if input.quit_requested() {
                            info!(reason = "quit_key", "shutdown_requested");
                            stack.shutdown(&mut ctx);
                            Ok(StackStatus::Finished)
                        } else {
                            stack.update(fixed_dt_seconds, &input, &mut ctx)
                        };
                        metrics_accumulator.record_tick();

                        match outcome {
                            Ok(StackStatus::Unchanged) => {}
                            Ok(StackStatus::Transitioned) => {
                                // The new top scene starts on a fresh frame.
                                metrics_accumulator.record_transition();
                                accumulator = Duration::ZERO;
                                break;
                            }
                            Ok(StackStatus::Finished) => {
                                info!(reason = "scenes_finished", "shutdown_requested");
                                window_target.exit();
                                return;
                            }
                            Err(scene_error) => {
                                error!(
                                    error = %scene_error,
                                    scene = %ctx.scene_state().active(),
                                    "scene_failed"
                                );
                                stack.shutdown(&mut ctx);
                                *fatal_slot = Some(AppError::Scene(scene_error));
                                window_target.exit();
                                return;
                            }
                        }
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    draw_list.begin(renderer.viewport());
                    stack.render(&mut draw_list);
                    if let Err(render_error) = renderer.render(&draw_list) {
                        warn!(error = %render_error, "renderer_draw_failed");
                        *fatal_slot = Some(AppError::Render(render_error));
                        window_target.exit();
                        return;
                    }
                    last_present_instant = Instant::now();

                    let active = ctx.scene_state().active();
                    if active != last_title_scene {
                        window.set_title(&format_window_title(&config.window_title, active));
                        last_title_scene = active.to_string();
                    }

                    metrics_accumulator.record_frame(raw_frame_dt);
                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now, stack.depth()) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            worst_frame_ms = snapshot.worst_frame_ms,
                            transitions = snapshot.scene_transitions,
                            depth = snapshot.scene_depth,
                            scene = %ctx.scene_state().active(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            Event::LoopExiting => {
                if !stack.is_empty() {
                    stack.shutdown(&mut ctx);
                }
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    match fatal {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn format_window_title(base: &str, scene: &str) -> String {
    format!("{base} - {scene}")
}

/// Rising-edge detector for a single key or button.
#[derive(Debug, Default, Clone, Copy)]
struct EdgeKey {
    is_down: bool,
    pressed_edge: bool,
}

impl EdgeKey {
    fn update(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.is_down {
                    self.pressed_edge = true;
                }
                self.is_down = true;
            }
            ElementState::Released => self.is_down = false,
        }
    }

    fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed_edge)
    }
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    cursor_position_px: Option<Vec2>,
    left_mouse: EdgeKey,
    confirm: EdgeKey,
    advance: EdgeKey,
    backspace: EdgeKey,
    typed_text: String,
    window_width: u32,
    window_height: u32,
}

impl InputCollector {
    fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            ..Self::default()
        }
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.handle_physical_key(key_event.physical_key, key_event.state);
        if is_pressed && !key_event.repeat {
            if let Some(text) = key_event.text.as_deref() {
                self.push_typed_text(text);
            }
        }
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let PhysicalKey::Code(code) = key else {
            return;
        };
        match code {
            KeyCode::KeyW | KeyCode::ArrowUp => {
                self.action_states.set(InputAction::MoveUp, is_pressed)
            }
            KeyCode::KeyS | KeyCode::ArrowDown => {
                self.action_states.set(InputAction::MoveDown, is_pressed)
            }
            KeyCode::KeyA | KeyCode::ArrowLeft => {
                self.action_states.set(InputAction::MoveLeft, is_pressed)
            }
            KeyCode::KeyD | KeyCode::ArrowRight => {
                self.action_states.set(InputAction::MoveRight, is_pressed)
            }
            KeyCode::Escape => {
                self.action_states.set(InputAction::Quit, is_pressed);
                if is_pressed {
                    self.quit_requested = true;
                }
            }
            KeyCode::Enter | KeyCode::NumpadEnter => self.confirm.update(state),
            KeyCode::Space => self.advance.update(state),
            KeyCode::Backspace => self.backspace.update(state),
            _ => {}
        }
    }

    /// Keeps printable characters only; Enter, Backspace and Escape arrive
    /// as control characters and are reported as edges instead.
    fn push_typed_text(&mut self, text: &str) {
        self.typed_text
            .extend(text.chars().filter(|ch| !ch.is_control()));
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.cursor_position_px,
            self.left_mouse.take(),
            self.confirm.take(),
            self.advance.take(),
            self.backspace.take(),
            std::mem::take(&mut self.typed_text),
            (self.window_width, self.window_height),
        )
    }

    fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_width = width;
        self.window_height = height;
    }

    fn set_cursor_position_px(&mut self, x: f32, y: f32) {
        self.cursor_position_px = Some(Vec2::new(x, y));
    }

    fn clear_cursor_position(&mut self) {
        self.cursor_position_px = None;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.left_mouse.update(state);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run += 1;
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    cap.map_or_else(|| "off".to_string(), |value| value.to_string())
}

fn resolve_slow_frame_delay(config_slow_frame_ms: u64) -> Duration {
    parse_slow_frame_delay(env::var(SLOW_FRAME_ENV_VAR), config_slow_frame_ms)
}

fn parse_slow_frame_delay(
    value: Result<String, env::VarError>,
    config_slow_frame_ms: u64,
) -> Duration {
    let fallback = Duration::from_millis(config_slow_frame_ms);
    match value {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = SLOW_FRAME_ENV_VAR,
                    value = raw.as_str(),
                    "invalid slow-frame env var value; falling back to config"
                );
                fallback
            }
        },
        Err(env::VarError::NotPresent) => fallback,
        Err(err) => {
            warn!(
                env_var = SLOW_FRAME_ENV_VAR,
                error = %err,
                "unable to read slow-frame env var; falling back to config"
            );
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(600), Duration::from_millis(250)),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn plan_sim_steps_keeps_partial_tick() {
        let result = plan_sim_steps(Duration::from_millis(40), Duration::from_millis(16), 5);
        assert_eq!(result.ticks_to_run, 2);
        assert_eq!(result.remaining_accumulator, Duration::from_millis(8));
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let result = plan_sim_steps(Duration::from_millis(120), Duration::from_millis(16), 3);
        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn movement_keys_are_levels() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyW), ElementState::Pressed);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::ArrowLeft), ElementState::Pressed);

        let first = input.snapshot_for_tick();
        let second = input.snapshot_for_tick();
        assert!(first.is_down(InputAction::MoveUp) && second.is_down(InputAction::MoveUp));
        assert!(second.is_down(InputAction::MoveLeft));

        input.handle_physical_key(PhysicalKey::Code(KeyCode::KeyW), ElementState::Released);
        assert!(!input.snapshot_for_tick().is_down(InputAction::MoveUp));
    }

    #[test]
    fn confirm_advance_and_backspace_are_single_tick_edges() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Enter), ElementState::Pressed);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Backspace), ElementState::Pressed);

        let first = input.snapshot_for_tick();
        assert!(first.confirm_pressed() && first.advance_pressed() && first.backspace_pressed());

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed);
        let held = input.snapshot_for_tick();
        assert!(!held.confirm_pressed() && !held.advance_pressed() && !held.backspace_pressed());

        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), ElementState::Released);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed);
        assert!(input.snapshot_for_tick().advance_pressed());
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputCollector::new(1280, 720);
        input.handle_physical_key(PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed);
        assert!(input.snapshot_for_tick().quit_requested());
    }

    #[test]
    fn typed_text_is_drained_per_tick_without_control_chars() {
        let mut input = InputCollector::new(1280, 720);
        input.push_typed_text("4");
        input.push_typed_text("\r");
        input.push_typed_text("2");

        assert_eq!(input.snapshot_for_tick().typed_text(), "42");
        assert_eq!(input.snapshot_for_tick().typed_text(), "");
    }

    #[test]
    fn left_click_is_edge_triggered_and_right_click_ignored() {
        let mut input = InputCollector::new(1280, 720);
        input.set_cursor_position_px(100.0, 200.0);
        input.handle_mouse_input(MouseButton::Right, ElementState::Pressed);
        assert!(!input.snapshot_for_tick().left_click_pressed());

        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let first = input.snapshot_for_tick();
        input.handle_mouse_input(MouseButton::Left, ElementState::Pressed);
        let second = input.snapshot_for_tick();

        assert_eq!(first.clicked_at(), Some(Vec2::new(100.0, 200.0)));
        assert!(!second.left_click_pressed());
    }

    #[test]
    fn snapshot_carries_window_size_and_cursor_clear() {
        let mut input = InputCollector::new(1280, 720);
        input.set_window_size(800, 600);
        input.set_cursor_position_px(1.0, 2.0);
        input.clear_cursor_position();

        let snapshot = input.snapshot_for_tick();
        assert_eq!(snapshot.window_size(), (800, 600));
        assert!(snapshot.cursor_position_px().is_none());
    }

    #[test]
    fn slow_frame_env_parsing_falls_back_to_config() {
        assert_eq!(
            parse_slow_frame_delay(Ok("25".to_string()), 0),
            Duration::from_millis(25)
        );
        assert_eq!(
            parse_slow_frame_delay(Ok("abc".to_string()), 7),
            Duration::from_millis(7)
        );
        assert_eq!(
            parse_slow_frame_delay(Err(env::VarError::NotPresent), 3),
            Duration::from_millis(3)
        );
    }

    #[test]
    fn render_cap_helpers() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(format_render_cap(None), "off");
        assert_eq!(format_render_cap(Some(120)), "120");
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }

    #[test]
    fn window_title_names_active_scene() {
        assert_eq!(format_window_title("BrainScape", "maze"), "BrainScape - maze");
    }
}
