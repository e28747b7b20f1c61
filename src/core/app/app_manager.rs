//=========================================================================
// Application Manager
//=========================================================================
//
// Owns the game-state stack and drives the frame loop.
//
// Lifecycle:
//   new(audio, video) → allocate(config) → start(initial, host) → deallocate()
//
// Stack mutation happens in exactly one place, `poll_state_request`,
// which runs once per frame before logic. States never touch the stack
// directly; they arm the request slot through their context and the
// manager applies it at the next poll:
//
//   Change  exit + drop top, push target, enter target
//   Push    pause top, push target, enter target
//   Pop     exit + drop top, resume new top (ignored on the floor state)
//
// A target whose `enter` fails is popped and dropped without `exit`, and
// a state paused for it is resumed. The error still ends the frame.
//
// The slot is taken before a request is applied, so requests armed
// from inside `enter`/`resume` wait for the following frame.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::context::{RenderContext, StateContext};
use super::state_request::{RequestKind, StateRequest};
use super::GameState;
use crate::config::EngineConfig;
use crate::core::audio::AudioService;
use crate::core::input::InputState;
use crate::core::platform_bridge::{HostEvents, TickControl};
use crate::core::video::VideoService;
use crate::error::{InitializationError, Result};

//=== Runtime =============================================================

/// Everything a state may reach, kept apart from the stack so a stacked
/// state and its context can be borrowed at the same time.
struct Runtime {
    request: StateRequest,
    quit_requested: bool,
    audio: AudioService,
    video: VideoService,
    input: InputState,
}

impl Runtime {
    fn context(&mut self, delta: Duration) -> StateContext<'_> {
        StateContext {
            request: &mut self.request,
            quit: &mut self.quit_requested,
            audio: &mut self.audio,
            video: &mut self.video,
            input: &self.input,
            delta,
        }
    }
}

//=== AppManager ==========================================================

/// Game-state stack, transition protocol and frame loop.
pub struct AppManager {
    initialized: bool,
    stack: Vec<Box<dyn GameState>>,
    runtime: Runtime,
    target_frame_time: Option<Duration>,
    last_frame_start: Option<Instant>,
}

impl AppManager {
    //--- Construction -----------------------------------------------------

    pub fn new(audio: AudioService, video: VideoService) -> Self {
        Self {
            initialized: false,
            stack: Vec::new(),
            runtime: Runtime {
                request: StateRequest::None,
                quit_requested: false,
                audio,
                video,
                input: InputState::new(),
            },
            target_frame_time: None,
            last_frame_start: None,
        }
    }

    /// Manager over headless audio and video backends.
    pub fn headless() -> Self {
        Self::new(AudioService::headless(), VideoService::headless())
    }

    //=====================================================================
    // Lifecycle
    //=====================================================================

    /// Allocates both services and resets the stack and request slot.
    ///
    /// Fails when called twice without `deallocate`, when `config` does
    /// not validate, or when a service cannot be allocated (nothing stays
    /// allocated in that case).
    pub fn allocate(&mut self, config: &EngineConfig) -> Result<()> {
        if self.initialized {
            return Err(InitializationError::AlreadyAllocated("application manager").into());
        }
        config.validate()?;

        self.runtime.audio.allocate(&config.audio)?;
        if let Err(err) = self.runtime.video.allocate(&config.video) {
            self.runtime.audio.deallocate();
            return Err(err);
        }

        self.stack.clear();
        self.runtime.request = StateRequest::None;
        self.runtime.quit_requested = false;
        self.runtime.input = InputState::new();
        self.target_frame_time = config.frame.target_fps.map(|fps| Duration::from_secs_f64(1.0 / fps));
        self.last_frame_start = None;
        self.initialized = true;

        info!(target: "app", "Application manager allocated");
        Ok(())
    }

    /// Exits and drops every state top to bottom, then releases the
    /// services. Exit failures are logged and teardown continues.
    /// No-op when not allocated.
    pub fn deallocate(&mut self) {
        if !self.initialized {
            return;
        }

        while let Some(mut state) = self.stack.pop() {
            debug!(target: "app", "Exiting state {}", state.name());
            if let Err(err) = state.exit(&mut self.runtime.context(Duration::ZERO)) {
                error!(target: "app", "State {} failed to exit: {}", state.name(), err);
            }
        }

        // A target that was never entered is dropped without hooks.
        self.runtime.request = StateRequest::None;
        self.runtime.video.deallocate();
        self.runtime.audio.deallocate();
        self.initialized = false;

        info!(target: "app", "Application manager deallocated");
    }

    /// Installs `initial` as the floor state, enters it and runs the
    /// frame loop until the host exits, a state requests quit, or a hook
    /// fails.
    ///
    /// No-op when the manager is not allocated. States stay stacked after
    /// the loop ends; `deallocate` tears them down.
    pub fn start(&mut self, initial: impl GameState + 'static, host: &mut dyn HostEvents) -> Result<()> {
        if !self.initialized {
            warn!(target: "app", "start() ignored: application manager not allocated");
            return Ok(());
        }

        self.install(initial)?;

        loop {
            let frame_start = Instant::now();

            if self.step_frame(host)? == TickControl::Exit {
                break;
            }

            self.pace(frame_start);
        }

        info!(target: "app", "Frame loop finished with {} state(s) stacked", self.stack.len());
        Ok(())
    }

    /// First half of [`start`](Self::start): installs and enters the floor
    /// state without running the loop. Hosts that own their loop drive
    /// frames with [`step_frame`](Self::step_frame) afterwards.
    pub fn install(&mut self, initial: impl GameState + 'static) -> Result<()> {
        if !self.initialized {
            warn!(target: "app", "install() ignored: application manager not allocated");
            return Ok(());
        }
        if !self.stack.is_empty() {
            return Err(InitializationError::AlreadyStarted { depth: self.stack.len() }.into());
        }

        self.runtime.quit_requested = false;
        self.last_frame_start = None;

        info!(target: "app", "Starting with state {}", initial.name());
        self.stack.push(Box::new(initial));
        self.enter_pushed()
    }

    //=====================================================================
    // Transition Requests
    //=====================================================================

    /// Arms a change to `target`. Applied at the next poll.
    pub fn change_state(&mut self, target: impl GameState + 'static) {
        if self.initialized {
            self.runtime.request.arm(StateRequest::Change(Box::new(target)));
        }
    }

    /// Arms a push of `target`. Applied at the next poll.
    pub fn push_state(&mut self, target: impl GameState + 'static) {
        if self.initialized {
            self.runtime.request.arm(StateRequest::Push(Box::new(target)));
        }
    }

    /// Arms a pop. Applied at the next poll; ignored on the floor state.
    pub fn pop_state(&mut self) {
        if self.initialized {
            self.runtime.request.arm(StateRequest::Pop);
        }
    }

    //=====================================================================
    // Frame Loop
    //=====================================================================

    /// Runs one frame: host events, request poll, logic, render, service
    /// updates. Returns `Exit` when the loop should stop.
    pub fn step_frame(&mut self, host: &mut dyn HostEvents) -> Result<TickControl> {
        if !self.initialized {
            return Ok(TickControl::Exit);
        }

        let now = Instant::now();
        let delta = self.last_frame_start.map_or(Duration::ZERO, |last| now - last);
        self.last_frame_start = Some(now);

        //--- Step 1: Host events -------------------------------------------
        self.runtime.input.begin_frame();
        if host.poll(&mut self.runtime.input) == TickControl::Exit {
            info!(target: "app", "Host requested exit");
            return Ok(TickControl::Exit);
        }
        if let Some((width, height)) = host.take_resize() {
            self.runtime.video.resize(width, height);
        }

        //--- Step 2: Settle the stack --------------------------------------
        self.poll_state_request()?;

        let Some(top) = self.stack.last_mut() else {
            warn!(target: "app", "State stack is empty; stopping");
            return Ok(TickControl::Exit);
        };

        //--- Step 3: Logic -------------------------------------------------
        top.logic(&mut self.runtime.context(delta))?;

        //--- Step 4: Render ------------------------------------------------
        self.render_pass();

        //--- Step 5: Present and mix ---------------------------------------
        self.runtime.video.update()?;
        self.runtime.audio.update();

        if self.runtime.quit_requested {
            info!(target: "app", "Quit requested by {}", self.active_state_name().unwrap_or("?"));
            return Ok(TickControl::Exit);
        }

        Ok(TickControl::Continue)
    }

    /// Applies the pending request, if any.
    fn poll_state_request(&mut self) -> Result<()> {
        match self.runtime.request.take() {
            StateRequest::None => Ok(()),
            StateRequest::Change(target) => self.apply_change(target),
            StateRequest::Push(target) => self.apply_push(target),
            StateRequest::Pop => self.apply_pop(),
        }
    }

    fn apply_change(&mut self, target: Box<dyn GameState>) -> Result<()> {
        if let Some(mut old) = self.stack.pop() {
            debug!(target: "app", "Changing state {} -> {}", old.name(), target.name());
            old.exit(&mut self.runtime.context(Duration::ZERO))?;
        }

        self.stack.push(target);
        self.enter_pushed()
    }

    fn apply_push(&mut self, target: Box<dyn GameState>) -> Result<()> {
        if let Some(top) = self.stack.last_mut() {
            debug!(target: "app", "Pushing state {} over {}", target.name(), top.name());
            top.pause(&mut self.runtime.context(Duration::ZERO))?;
        }

        self.stack.push(target);
        let entered = self.enter_pushed();
        if entered.is_err() {
            if let Some(top) = self.stack.last_mut() {
                if let Err(e) = top.resume(&mut self.runtime.context(Duration::ZERO)) {
                    warn!(target: "app", "{} failed to resume after a rejected push: {}", top.name(), e);
                }
            }
        }
        entered
    }

    fn apply_pop(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            debug!(target: "app", "Pop ignored on floor state");
            return Ok(());
        }

        if let Some(mut old) = self.stack.pop() {
            debug!(target: "app", "Popping state {}", old.name());
            old.exit(&mut self.runtime.context(Duration::ZERO))?;
        }

        match self.stack.last_mut() {
            Some(top) => top.resume(&mut self.runtime.context(Duration::ZERO)),
            None => Ok(()),
        }
    }

    /// Enters the state just pushed. On failure it is popped and dropped
    /// unexited, so it never reaches logic or teardown.
    fn enter_pushed(&mut self) -> Result<()> {
        let Some(top) = self.stack.last_mut() else {
            return Ok(());
        };
        let result = top.enter(&mut self.runtime.context(Duration::ZERO));
        if let Err(e) = &result {
            if let Some(failed) = self.stack.pop() {
                error!(target: "app", "{} failed to enter and was dropped: {}", failed.name(), e);
            }
        }
        result
    }

    /// Renders the top state, plus everything a run of transparent states
    /// lets through, bottom to top.
    fn render_pass(&mut self) {
        let mut first = self.stack.len().saturating_sub(1);
        while first > 0 && self.stack[first].is_transparent() {
            first -= 1;
        }

        let mut ctx = RenderContext { video: &mut self.runtime.video };
        for state in &self.stack[first..] {
            state.render(&mut ctx);
        }
    }

    fn pace(&self, frame_start: Instant) {
        if let Some(frame_time) = self.target_frame_time {
            let elapsed = frame_start.elapsed();
            if elapsed < frame_time {
                thread::sleep(frame_time - elapsed);
            }
        }
    }

    //=====================================================================
    // Queries
    //=====================================================================

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of stacked states.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn pending_request(&self) -> RequestKind {
        self.runtime.request.kind()
    }

    pub fn active_state_name(&self) -> Option<&str> {
        self.stack.last().map(|state| state.name())
    }

    /// State names, bottom to top.
    pub fn state_names(&self) -> Vec<&str> {
        self.stack.iter().map(|state| state.name()).collect()
    }

    pub fn audio(&self) -> &AudioService {
        &self.runtime.audio
    }

    pub fn audio_mut(&mut self) -> &mut AudioService {
        &mut self.runtime.audio
    }

    pub fn video(&self) -> &VideoService {
        &self.runtime.video
    }

    pub fn video_mut(&mut self) -> &mut VideoService {
        &mut self.runtime.video
    }

    pub fn input(&self) -> &InputState {
        &self.runtime.input
    }
}

impl Drop for AppManager {
    fn drop(&mut self) {
        self.deallocate();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::input::{InputEvent, KeyCode, Modifiers};
    use crate::core::video::{HeadlessVideoBackend, Quad, Viewport, UNTEXTURED};
    use crate::config::ShaderConfig;
    use crate::core::video::ShaderStage;
    use crate::error::{AssetError, ConfigError, Error, RenderError};

    //--- Test Fixtures ----------------------------------------------------

    type Log = Arc<Mutex<Vec<String>>>;

    fn new_log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    fn count(log: &Log, entry: &str) -> usize {
        log.lock().unwrap().iter().filter(|e| *e == entry).count()
    }

    fn position(log: &Log, entry: &str) -> usize {
        log.lock().unwrap().iter().position(|e| e == entry).unwrap()
    }

    /// One scripted action taken by a tracer during a hook.
    enum Step {
        Idle,
        Push(Tracer),
        Change(Tracer),
        Pop,
        Quit,
        Fail,
        Many(Vec<Step>),
    }

    /// Game state that logs every hook and replays a script, one step
    /// per logic call.
    struct Tracer {
        name: &'static str,
        log: Log,
        script: VecDeque<Step>,
        on_enter: Option<Box<Step>>,
        transparent: bool,
    }

    impl Tracer {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: log.clone(),
                script: VecDeque::new(),
                on_enter: None,
                transparent: false,
            }
        }

        fn script(mut self, steps: Vec<Step>) -> Self {
            self.script = steps.into();
            self
        }

        fn on_enter(mut self, step: Step) -> Self {
            self.on_enter = Some(Box::new(step));
            self
        }

        fn transparent(mut self) -> Self {
            self.transparent = true;
            self
        }

        fn record(&self, hook: &str) {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, hook));
        }
    }

    fn run(step: Step, ctx: &mut StateContext<'_>) -> Result<()> {
        match step {
            Step::Idle => {}
            Step::Push(target) => ctx.push_state(target),
            Step::Change(target) => ctx.change_state(target),
            Step::Pop => ctx.pop_state(),
            Step::Quit => ctx.request_quit(),
            Step::Fail => {
                return Err(AssetError::UnknownId { kind: "texture".into(), id: "missing".into() }.into())
            }
            Step::Many(steps) => {
                for step in steps {
                    run(step, ctx)?;
                }
            }
        }
        Ok(())
    }

    impl GameState for Tracer {
        fn name(&self) -> &str {
            self.name
        }

        fn enter(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
            self.record("enter");
            match self.on_enter.take() {
                Some(step) => run(*step, ctx),
                None => Ok(()),
            }
        }

        fn exit(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
            self.record("exit");
            Ok(())
        }

        fn pause(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
            self.record("pause");
            Ok(())
        }

        fn resume(&mut self, _ctx: &mut StateContext<'_>) -> Result<()> {
            self.record("resume");
            Ok(())
        }

        fn logic(&mut self, ctx: &mut StateContext<'_>) -> Result<()> {
            self.record("logic");
            match self.script.pop_front() {
                Some(step) => run(step, ctx),
                None => Ok(()),
            }
        }

        fn render(&self, ctx: &mut RenderContext<'_>) {
            self.record("render");
            ctx.queue_quad(0, UNTEXTURED, Quad::solid(0, 0, 8, 8, 0xFFFFFFFF));
        }

        fn is_transparent(&self) -> bool {
            self.transparent
        }
    }

    /// Host that lets a fixed number of frames through, then exits.
    struct Frames {
        remaining: usize,
        events: Vec<InputEvent>,
        resize: Option<(u32, u32)>,
    }

    impl Frames {
        fn new(remaining: usize) -> Self {
            Self { remaining, events: Vec::new(), resize: None }
        }

        fn endless() -> Self {
            Self::new(usize::MAX)
        }
    }

    impl HostEvents for Frames {
        fn poll(&mut self, input: &mut InputState) -> TickControl {
            if self.remaining == 0 {
                return TickControl::Exit;
            }
            self.remaining -= 1;
            input.apply(&std::mem::take(&mut self.events));
            TickControl::Continue
        }

        fn take_resize(&mut self) -> Option<(u32, u32)> {
            self.resize.take()
        }
    }

    fn allocated() -> AppManager {
        let mut app = AppManager::headless();
        app.allocate(&EngineConfig::default()).unwrap();
        app
    }

    fn step(app: &mut AppManager, frames: usize) {
        let mut host = Frames::endless();
        for _ in 0..frames {
            app.step_frame(&mut host).unwrap();
        }
    }

    //=====================================================================
    // Lifecycle Tests
    //=====================================================================

    #[test]
    fn double_allocate_is_rejected() {
        let mut app = allocated();
        let err = app.allocate(&EngineConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Initialization(InitializationError::AlreadyAllocated(_))));
    }

    #[test]
    fn allocate_brings_up_both_services() {
        let app = allocated();
        assert!(app.is_initialized());
        assert!(app.audio().is_allocated());
        assert!(app.video().is_allocated());
        assert_eq!(app.depth(), 0);
        assert_eq!(app.pending_request(), RequestKind::NoRequest);
    }

    #[test]
    fn failing_subsystem_leaves_nothing_allocated() {
        let mut config = EngineConfig::default();
        config.video.default_shaders = vec![ShaderConfig {
            id: "quad".into(),
            path: "missing/quad.vert".into(),
            stage: ShaderStage::Vertex,
        }];

        let mut app = AppManager::headless();
        let err = app.allocate(&config).unwrap_err();
        assert!(matches!(err, Error::Render(RenderError::ShaderSource { .. })));
        assert!(!app.is_initialized());
        assert!(!app.audio().is_allocated());
        assert!(!app.video().is_allocated());
    }

    #[test]
    fn invalid_config_is_rejected_before_allocating() {
        for fps in [0.0, -30.0] {
            let mut config = EngineConfig::default();
            config.frame.target_fps = Some(fps);

            let mut app = AppManager::headless();
            let err = app.allocate(&config).unwrap_err();
            assert!(matches!(
                err,
                Error::Config(ConfigError::Invalid { field: "frame.target_fps", .. })
            ));
            assert!(!app.is_initialized());
            assert!(!app.audio().is_allocated());
        }

        let mut config = EngineConfig::default();
        config.video.frame_rate_window = -1.0;
        let err = AppManager::headless().allocate(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Invalid { .. })));
    }

    #[test]
    fn uninitialized_manager_ignores_everything() {
        let log = new_log();
        let mut app = AppManager::headless();

        app.start(Tracer::new("A", &log), &mut Frames::new(3)).unwrap();
        app.push_state(Tracer::new("B", &log));
        app.pop_state();

        assert_eq!(app.depth(), 0);
        assert_eq!(app.pending_request(), RequestKind::NoRequest);
        assert!(entries(&log).is_empty());
        assert_eq!(app.step_frame(&mut Frames::endless()).unwrap(), TickControl::Exit);
    }

    #[test]
    fn deallocate_exits_top_to_bottom_and_is_idempotent() {
        let log = new_log();
        let mut app = allocated();
        let c = Tracer::new("C", &log);
        let b = Tracer::new("B", &log).script(vec![Step::Push(c)]);
        app.install(Tracer::new("A", &log).script(vec![Step::Push(b)])).unwrap();
        step(&mut app, 3);
        assert_eq!(app.state_names(), vec!["A", "B", "C"]);

        app.deallocate();
        app.deallocate();

        let tail: Vec<_> = entries(&log).into_iter().rev().take(3).collect();
        assert_eq!(tail, vec!["A:exit", "B:exit", "C:exit"]);
        assert_eq!(app.depth(), 0);
        assert!(!app.is_initialized());
        assert!(!app.video().is_allocated());
    }

    #[test]
    fn drop_exits_stacked_states() {
        let log = new_log();
        {
            let mut app = allocated();
            app.install(Tracer::new("A", &log)).unwrap();
        }
        assert_eq!(count(&log, "A:exit"), 1);
    }

    #[test]
    fn second_start_requires_deallocate() {
        let log = new_log();
        let mut app = allocated();
        app.start(Tracer::new("A", &log), &mut Frames::new(1)).unwrap();

        let err = app.start(Tracer::new("B", &log), &mut Frames::new(1)).unwrap_err();
        assert!(matches!(err, Error::Initialization(InitializationError::AlreadyStarted { depth: 1 })));

        app.deallocate();
        app.allocate(&EngineConfig::default()).unwrap();
        app.start(Tracer::new("B", &log), &mut Frames::new(1)).unwrap();
        assert_eq!(app.state_names(), vec!["B"]);
    }

    //=====================================================================
    // Transition Tests
    //=====================================================================

    #[test]
    fn push_pop_then_pop_on_floor_is_a_no_op() {
        let log = new_log();
        let mut app = allocated();
        let b = Tracer::new("B", &log).script(vec![Step::Pop]);
        app.install(Tracer::new("A", &log).script(vec![Step::Push(b), Step::Pop])).unwrap();

        // Frame 1: A asks for B; nothing applied yet.
        step(&mut app, 1);
        assert_eq!(app.state_names(), vec!["A"]);
        assert_eq!(app.pending_request(), RequestKind::PushRequest);

        // Frame 2: B stacked over a paused A, and B asks to pop.
        step(&mut app, 1);
        assert_eq!(app.state_names(), vec!["A", "B"]);
        assert_eq!(count(&log, "A:pause"), 1);
        assert_eq!(count(&log, "B:enter"), 1);

        // Frame 3: B gone, A resumed, and A asks to pop the floor.
        step(&mut app, 1);
        assert_eq!(app.state_names(), vec!["A"]);
        assert_eq!(count(&log, "B:exit"), 1);
        assert_eq!(count(&log, "A:resume"), 1);

        // Frame 4: pop on the floor does nothing.
        step(&mut app, 1);
        assert_eq!(app.state_names(), vec!["A"]);
        assert_eq!(count(&log, "A:exit"), 0);
        assert_eq!(count(&log, "A:resume"), 1);
        assert_eq!(app.pending_request(), RequestKind::NoRequest);
    }

    #[test]
    fn change_replaces_only_the_top() {
        let log = new_log();
        let mut app = allocated();
        let c = Tracer::new("C", &log);
        let b = Tracer::new("B", &log).script(vec![Step::Change(c)]);
        app.install(Tracer::new("A", &log).script(vec![Step::Push(b)])).unwrap();

        step(&mut app, 3);

        assert_eq!(app.state_names(), vec!["A", "C"]);
        assert_eq!(count(&log, "B:exit"), 1);
        assert_eq!(count(&log, "C:enter"), 1);
        assert!(position(&log, "B:exit") < position(&log, "C:enter"));
        // A stays paused underneath.
        assert_eq!(count(&log, "A:pause"), 1);
        assert_eq!(count(&log, "A:resume"), 0);
        assert_eq!(count(&log, "A:exit"), 0);
    }

    #[test]
    fn change_on_floor_swaps_it() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("Title", &log).script(vec![Step::Change(Tracer::new("Game", &log))]))
            .unwrap();

        step(&mut app, 2);
        assert_eq!(app.state_names(), vec!["Game"]);
        assert!(position(&log, "Title:exit") < position(&log, "Game:enter"));
    }

    #[test]
    fn last_request_in_a_frame_wins() {
        let log = new_log();
        let mut app = allocated();
        let script = vec![Step::Many(vec![Step::Push(Tracer::new("B", &log)), Step::Pop])];
        app.install(Tracer::new("A", &log).script(script)).unwrap();

        step(&mut app, 2);

        // The pop overwrote the push and was then ignored on the floor.
        assert_eq!(app.state_names(), vec!["A"]);
        assert_eq!(count(&log, "B:enter"), 0);
        assert_eq!(count(&log, "A:pause"), 0);
    }

    #[test]
    fn manager_api_requests_share_the_slot() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("A", &log)).unwrap();

        app.push_state(Tracer::new("B", &log));
        app.push_state(Tracer::new("C", &log));
        assert_eq!(app.pending_request(), RequestKind::PushRequest);

        step(&mut app, 1);
        assert_eq!(app.state_names(), vec!["A", "C"]);
        assert_eq!(count(&log, "B:enter"), 0);
    }

    #[test]
    fn requests_never_apply_mid_frame() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("A", &log).script(vec![Step::Push(Tracer::new("B", &log))]))
            .unwrap();

        step(&mut app, 1);
        // A rendered this frame even though it asked to be covered.
        assert_eq!(count(&log, "A:render"), 1);
        assert_eq!(count(&log, "B:enter"), 0);

        step(&mut app, 1);
        assert!(position(&log, "B:enter") < position(&log, "B:logic"));
    }

    #[test]
    fn request_from_enter_waits_for_next_frame() {
        let log = new_log();
        let mut app = allocated();
        let d = Tracer::new("D", &log).on_enter(Step::Push(Tracer::new("E", &log)));
        app.install(Tracer::new("A", &log).script(vec![Step::Push(d)])).unwrap();

        step(&mut app, 2);
        assert_eq!(app.state_names(), vec!["A", "D"]);
        assert_eq!(app.pending_request(), RequestKind::PushRequest);

        step(&mut app, 1);
        assert_eq!(app.state_names(), vec!["A", "D", "E"]);
        assert_eq!(count(&log, "D:pause"), 1);
    }

    #[test]
    fn hooks_bracket_logic() {
        let log = new_log();
        let mut app = allocated();
        let b = Tracer::new("B", &log).script(vec![Step::Idle, Step::Pop]);
        app.install(Tracer::new("A", &log).script(vec![Step::Push(b)])).unwrap();

        step(&mut app, 4);

        let a_logic_while_paused = entries(&log)
            .iter()
            .skip_while(|e| *e != "A:pause")
            .take_while(|e| *e != "A:resume")
            .any(|e| e == "A:logic");
        assert!(!a_logic_while_paused);
        assert_eq!(entries(&log)[0], "A:enter");
    }

    //=====================================================================
    // Frame Loop Tests
    //=====================================================================

    #[test]
    fn start_runs_until_host_exits() {
        let log = new_log();
        let mut app = allocated();
        app.start(Tracer::new("A", &log), &mut Frames::new(5)).unwrap();

        assert_eq!(count(&log, "A:logic"), 5);
        assert_eq!(count(&log, "A:render"), 5);
        let video = app.video().backend_as::<HeadlessVideoBackend>().unwrap();
        assert_eq!(video.present_count(), 5);
    }

    #[test]
    fn host_exit_before_first_frame_skips_logic() {
        let log = new_log();
        let mut app = allocated();
        app.start(Tracer::new("A", &log), &mut Frames::new(0)).unwrap();
        assert_eq!(entries(&log), vec!["A:enter"]);
    }

    #[test]
    fn quit_request_finishes_the_frame_then_stops() {
        let log = new_log();
        let mut app = allocated();
        app.start(Tracer::new("A", &log).script(vec![Step::Quit]), &mut Frames::endless())
            .unwrap();

        assert_eq!(count(&log, "A:logic"), 1);
        assert_eq!(count(&log, "A:render"), 1);
        assert_eq!(app.depth(), 1);
    }

    #[test]
    fn hook_errors_stop_the_loop() {
        let log = new_log();
        let mut app = allocated();
        let err = app
            .start(Tracer::new("A", &log).script(vec![Step::Idle, Step::Fail]), &mut Frames::endless())
            .unwrap_err();

        assert!(matches!(err, Error::Asset(AssetError::UnknownId { .. })));
        assert_eq!(count(&log, "A:logic"), 2);
        assert_eq!(count(&log, "A:render"), 1);
    }

    #[test]
    fn failed_push_is_dropped_and_the_paused_state_resumes() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("A", &log)).unwrap();

        app.push_state(Tracer::new("B", &log).on_enter(Step::Fail));
        let err = app.step_frame(&mut Frames::endless()).unwrap_err();

        assert!(matches!(err, Error::Asset(_)));
        assert_eq!(app.state_names(), vec!["A"]);
        assert_eq!(entries(&log), vec!["A:enter", "A:pause", "B:enter", "A:resume"]);

        app.deallocate();
        assert_eq!(count(&log, "B:exit"), 0);
        assert_eq!(count(&log, "A:exit"), 1);
    }

    #[test]
    fn failed_change_drops_the_target_unexited() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("A", &log)).unwrap();
        app.push_state(Tracer::new("B", &log));
        step(&mut app, 1);

        app.change_state(Tracer::new("C", &log).on_enter(Step::Fail));
        assert!(app.step_frame(&mut Frames::endless()).is_err());
        assert_eq!(app.state_names(), vec!["A"]);

        app.deallocate();
        assert_eq!(count(&log, "B:exit"), 1);
        assert_eq!(count(&log, "C:exit"), 0);
        assert_eq!(count(&log, "A:exit"), 1);
    }

    #[test]
    fn failed_floor_enter_leaves_the_stack_empty() {
        let log = new_log();
        let mut app = allocated();

        let err = app
            .start(Tracer::new("A", &log).on_enter(Step::Fail), &mut Frames::endless())
            .unwrap_err();
        assert!(matches!(err, Error::Asset(_)));
        assert_eq!(app.depth(), 0);

        app.install(Tracer::new("B", &log)).unwrap();
        assert_eq!(app.state_names(), vec!["B"]);

        app.deallocate();
        assert_eq!(count(&log, "A:exit"), 0);
        assert_eq!(count(&log, "B:exit"), 1);
    }

    #[test]
    fn floor_survives_every_push_pop_sequence() {
        for len in 1..=6u32 {
            for mask in 0u32..(1 << len) {
                let log = new_log();
                let mut app = allocated();
                app.install(Tracer::new("floor", &log)).unwrap();

                let mut expected = 1;
                for bit in 0..len {
                    if mask & (1 << bit) != 0 {
                        app.push_state(Tracer::new("top", &log));
                        expected += 1;
                    } else {
                        app.pop_state();
                        expected = (expected - 1).max(1);
                    }
                    step(&mut app, 1);

                    assert!(app.depth() >= 1, "floor lost after {:0w$b}", mask, w = len as usize);
                    assert_eq!(app.depth(), expected, "sequence {:0w$b}", mask, w = len as usize);
                }

                app.deallocate();
                assert_eq!(count(&log, "floor:enter"), 1);
                assert_eq!(count(&log, "floor:exit"), 1);
                assert_eq!(count(&log, "top:enter"), count(&log, "top:exit"));
            }
        }
    }

    #[test]
    fn transparent_top_renders_what_is_beneath() {
        let log = new_log();
        let mut app = allocated();
        let menu = Tracer::new("Menu", &log).transparent();
        app.install(Tracer::new("Game", &log).script(vec![Step::Push(menu)])).unwrap();

        step(&mut app, 2);

        assert_eq!(count(&log, "Game:logic"), 1);
        assert_eq!(count(&log, "Game:render"), 2);
        assert!(position(&log, "Menu:render") > position(&log, "Game:pause"));
        let video = app.video().backend_as::<HeadlessVideoBackend>().unwrap();
        assert_eq!(video.last_frame().len(), 2);
    }

    #[test]
    fn opaque_top_hides_what_is_beneath() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("Game", &log).script(vec![Step::Push(Tracer::new("Shop", &log))]))
            .unwrap();

        step(&mut app, 3);
        assert_eq!(count(&log, "Game:render"), 1);
        assert_eq!(count(&log, "Shop:render"), 2);
    }

    #[test]
    fn host_input_and_resize_reach_the_frame() {
        let log = new_log();
        let mut app = allocated();
        app.install(Tracer::new("A", &log)).unwrap();

        let mut host = Frames::endless();
        host.events.push(InputEvent::KeyDown { key: KeyCode::Escape, modifiers: Modifiers::NONE });
        host.resize = Some((1000, 800));
        app.step_frame(&mut host).unwrap();

        assert!(app.input().is_key_pressed(KeyCode::Escape));
        assert_eq!(app.video().viewport(), Viewport { x: 100, y: 100, width: 800, height: 600 });

        app.step_frame(&mut host).unwrap();
        assert!(!app.input().is_key_pressed(KeyCode::Escape));
        assert!(app.input().is_key_down(KeyCode::Escape));
    }
}
