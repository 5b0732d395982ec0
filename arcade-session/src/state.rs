use arcade_core::{
    AttemptTotals, PlannedPhase, Point, ReactionAttempt, Scene, SessionState, SessionSummary, Size,
};
use arcade_timing::{Scheduler, Timer};
use log::{debug, info, warn};
use rand::Rng;

use crate::config::{ConfigError, SessionConfig};
use crate::fixation::FixationRun;
use crate::reflex::{ReflexSequencer, RowLayout};
use crate::spawner::TargetSpawner;
use crate::stripes::StripeStimulus;

/// Input the app forwards to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Space / enter: start, next slide, close the reflex round, play again.
    Continue,
    /// Pointer press at a viewport position.
    Tap(Point),
    /// Direct tap on a reflex dot by index.
    TapReflex(usize),
    Resize(Size),
}

/// Deferred actions the session schedules for itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    SpawnTarget,
    ReflexTick,
    FixationStep,
    EndOptokinetic,
}

#[derive(Debug, Clone, Copy)]
struct ActiveTarget {
    point: Point,
    appeared_at: u64,
    delta: (f32, f32),
}

#[derive(Debug, Clone)]
struct OptokineticRun {
    stimulus: StripeStimulus,
    started_at: u64,
}

#[derive(Debug, Clone, Copy)]
struct ReflexResult {
    hits: u32,
    misses: u32,
    hit_percentage: f64,
}

/// Drives one play-through: Start, the configured phases in order, Summary.
///
/// Single-threaded. The owner forwards input through
/// [`handle_event`](Self::handle_event) and calls [`update`](Self::update)
/// once per frame to fire deferred actions that have come due. Anything that
/// arrives in the wrong phase (a tap with no target, a stale timer) is
/// ignored.
pub struct SessionController<T, R>
where
    T: Timer,
    R: Rng,
{
    pub config: SessionConfig,
    pub timer: T,
    pub rng: R,
    state: SessionState,
    viewport: Size,
    scheduler: Scheduler<Deferred>,
    plan_index: Option<usize>,

    spawner: TargetSpawner,
    target: Option<ActiveTarget>,
    totals: AttemptTotals,
    last_attempt: Option<ReactionAttempt>,

    reflex: Option<ReflexSequencer>,
    reflex_layout: Option<RowLayout>,
    reflex_result: Option<ReflexResult>,

    optokinetic: Option<OptokineticRun>,
    fixation: Option<FixationRun>,

    summary: Option<SessionSummary>,
}

impl<T, R> SessionController<T, R>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
{
    /// Fails when `config` does not pass [`SessionConfig::validate`].
    pub fn new(
        config: SessionConfig,
        timer: T,
        rng: R,
        viewport: Size,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let spawner = TargetSpawner::new(&config.spawn);
        Ok(Self {
            config,
            timer,
            rng,
            state: SessionState::Start,
            viewport,
            scheduler: Scheduler::new(),
            plan_index: None,
            spawner,
            target: None,
            totals: AttemptTotals::default(),
            last_attempt: None,
            reflex: None,
            reflex_layout: None,
            reflex_result: None,
            optokinetic: None,
            fixation: None,
            summary: None,
        })
    }

    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Continue => self.continue_pressed(),
            SessionEvent::Tap(point) => self.tap(point),
            SessionEvent::TapReflex(index) => self.tap_reflex(index),
            SessionEvent::Resize(size) => {
                self.resize(size);
                true
            }
        }
    }

    /// Fires every deferred action due by now, each at its own due instant.
    pub fn update(&mut self) -> bool {
        let now = self.timer.now();
        let mut fired = false;
        while let Some((at, action)) = self.scheduler.pop_due(now) {
            self.fire(action, at);
            fired = true;
        }
        fired
    }

    /// Resets every counter and enters the first configured phase.
    pub fn start(&mut self) {
        info!("session start");
        self.scheduler.clear();
        self.exit_phase();
        self.plan_index = None;
        self.spawner.reset();
        self.totals = AttemptTotals::default();
        self.last_attempt = None;
        self.reflex_result = None;
        self.summary = None;
        let now = self.timer.now();
        self.advance_phase(now);
    }

    /// Records a finished reaction attempt. Ignored outside the reaction phase
    /// or once the attempt limit is reached.
    pub fn record_attempt(&mut self, reaction_seconds: f64, delta: (f32, f32)) -> bool {
        let max = self.config.reaction.max_attempts;
        if self.state != SessionState::ReactionTime || self.totals.count >= max {
            return false;
        }
        let target = self.target.take();
        let attempt = ReactionAttempt {
            target: target
                .map(|t| t.point)
                .or(self.spawner.last_position())
                .unwrap_or_default(),
            appeared_at_ns: target.map_or(0, |t| t.appeared_at),
            reaction_seconds,
            delta_x: delta.0,
            delta_y: delta.1,
        };
        self.totals.add(&attempt);
        info!(
            "attempt {}/{}: {:.3} s, delta ({:.0}, {:.0})",
            self.totals.count, max, reaction_seconds, delta.0, delta.1
        );
        self.last_attempt = Some(attempt);

        let now = self.timer.now();
        if self.totals.count >= max {
            self.advance_phase(now);
        } else {
            self.scheduler.schedule(
                now,
                self.config.reaction.respond_delay(),
                Deferred::SpawnTarget,
            );
        }
        true
    }

    /// Pointer press. Hits the active reaction target or a reflex dot; any
    /// other press does nothing.
    pub fn tap(&mut self, point: Point) -> bool {
        if !self.state.allows_taps() {
            return false;
        }
        match self.state {
            SessionState::ReactionTime => {
                let Some(target) = self.target else {
                    return false;
                };
                if target.point.distance(point) > self.config.spawn.target_radius {
                    return false;
                }
                let reaction = self.timer.elapsed(target.appeared_at).as_secs_f64();
                self.record_attempt(reaction, target.delta)
            }
            SessionState::ReflexDot => {
                let index = self
                    .reflex_layout
                    .as_ref()
                    .and_then(|row| row.index_at(point));
                match index {
                    Some(index) => self.tap_reflex(index),
                    None => false,
                }
            }
            _ => false,
        }
    }

    pub fn tap_reflex(&mut self, index: usize) -> bool {
        if self.state != SessionState::ReflexDot {
            return false;
        }
        match &mut self.reflex {
            Some(reflex) if index < reflex.length() => {
                let hit = reflex.register_tap(index);
                debug!(
                    "reflex tap {} ({}), {:.0}%",
                    index,
                    if hit { "hit" } else { "miss" },
                    reflex.hit_percentage()
                );
                true
            }
            _ => false,
        }
    }

    pub fn continue_pressed(&mut self) -> bool {
        if !self.state.accepts_continue() {
            return false;
        }
        match self.state {
            SessionState::Start => {
                self.start();
                true
            }
            SessionState::Slide(n) => {
                if n + 1 < self.config.slides.len() {
                    self.set_state(SessionState::Slide(n + 1));
                } else {
                    let now = self.timer.now();
                    self.advance_phase(now);
                }
                true
            }
            SessionState::ReflexDot => {
                let Some(reflex) = &self.reflex else {
                    return false;
                };
                let Some(hit_percentage) = reflex.finish() else {
                    return false;
                };
                self.reflex_result = Some(ReflexResult {
                    hits: reflex.hits(),
                    misses: reflex.misses(),
                    hit_percentage,
                });
                info!("reflex round closed at {:.1}% hits", hit_percentage);
                let now = self.timer.now();
                self.advance_phase(now);
                true
            }
            SessionState::Summary => self.play_again(),
            _ => false,
        }
    }

    /// Ends the play-through and computes the summary.
    pub fn finish(&mut self) -> bool {
        if self.state == SessionState::Summary {
            return false;
        }
        self.exit_phase();
        let mut summary = SessionSummary::from_totals(&self.totals);
        if let Some(r) = self.reflex_result {
            summary = summary.with_reflex(r.hits, r.misses, r.hit_percentage);
        }
        match serde_json::to_string(&summary) {
            Ok(json) => info!("session summary: {json}"),
            Err(e) => warn!("could not serialize summary: {e}"),
        }
        self.summary = Some(summary);
        self.set_state(SessionState::Summary);
        true
    }

    pub fn play_again(&mut self) -> bool {
        if self.state != SessionState::Summary {
            return false;
        }
        self.set_state(SessionState::Start);
        true
    }

    pub fn resize(&mut self, size: Size) {
        self.viewport = size;
        if self.reflex_layout.is_some() {
            self.reflex_layout = Some(RowLayout::new(&self.config.reflex, size));
        }
    }

    fn fire(&mut self, action: Deferred, at: u64) {
        match action {
            Deferred::SpawnTarget => {
                if self.state == SessionState::ReactionTime
                    && self.target.is_none()
                    && self.totals.count < self.config.reaction.max_attempts
                {
                    self.spawn_target();
                }
            }
            Deferred::ReflexTick => {
                if self.state != SessionState::ReflexDot {
                    return;
                }
                let Some(reflex) = &mut self.reflex else {
                    return;
                };
                reflex.advance();
                if reflex.should_continue() {
                    let delay = reflex.current_delay();
                    self.scheduler.schedule(at, delay, Deferred::ReflexTick);
                } else {
                    info!(
                        "reflex round over: {} hits, {} misses",
                        reflex.hits(),
                        reflex.misses()
                    );
                }
            }
            Deferred::FixationStep => {
                if self.state != SessionState::Fixation {
                    return;
                }
                let Some(run) = &mut self.fixation else {
                    return;
                };
                match run.complete_step(at) {
                    Some(next) => {
                        self.scheduler.schedule(at, next, Deferred::FixationStep);
                    }
                    None => self.advance_phase(at),
                }
            }
            Deferred::EndOptokinetic => {
                if self.state == SessionState::Optokinetic {
                    self.advance_phase(at);
                }
            }
        }
    }

    fn advance_phase(&mut self, at: u64) {
        let mut next = self.plan_index.map_or(0, |i| i + 1);
        loop {
            let Some(phase) = self.config.phase_order.get(next).copied() else {
                break;
            };
            self.exit_phase();
            self.plan_index = Some(next);
            if self.enter(phase, at) {
                return;
            }
            debug!("skipping empty {phase:?} phase");
            next += 1;
        }
        self.finish();
    }

    /// Sets up `phase`. Returns false when it has nothing to show.
    fn enter(&mut self, phase: PlannedPhase, at: u64) -> bool {
        match phase {
            PlannedPhase::Slides => {
                if self.config.slides.is_empty() {
                    return false;
                }
            }
            PlannedPhase::Fixation => {
                let run = FixationRun::new(&self.config.fixation, at);
                let Some(first) = run.current_step().map(|s| s.duration) else {
                    return false;
                };
                self.scheduler.schedule(at, first, Deferred::FixationStep);
                self.fixation = Some(run);
            }
            PlannedPhase::ReactionTime => {}
            PlannedPhase::ReflexDot => {
                let reflex = ReflexSequencer::new(&self.config.reflex);
                self.scheduler
                    .schedule(at, reflex.current_delay(), Deferred::ReflexTick);
                self.reflex = Some(reflex);
                self.reflex_layout = Some(RowLayout::new(&self.config.reflex, self.viewport));
            }
            PlannedPhase::Optokinetic => {
                let stimulus =
                    StripeStimulus::new(&mut self.rng, &self.config.stripes, self.viewport.width);
                debug!(
                    "{} stripes covering {:.0} of {:.0} units",
                    stimulus.widths.len(),
                    stimulus.covered_width(),
                    stimulus.span
                );
                self.scheduler.schedule(
                    at,
                    self.config.stripes.duration(),
                    Deferred::EndOptokinetic,
                );
                self.optokinetic = Some(OptokineticRun {
                    stimulus,
                    started_at: at,
                });
            }
        }
        self.set_state(phase.entry_state());
        if phase == PlannedPhase::ReactionTime {
            self.spawn_target();
        }
        true
    }

    fn exit_phase(&mut self) {
        self.target = None;
        self.reflex = None;
        self.reflex_layout = None;
        self.optokinetic = None;
        self.fixation = None;
    }

    fn spawn_target(&mut self) {
        let spawn = self.spawner.spawn(&mut self.rng, self.viewport);
        self.target = Some(ActiveTarget {
            point: spawn.point,
            appeared_at: self.timer.now(),
            delta: spawn.delta,
        });
    }

    fn set_state(&mut self, state: SessionState) {
        if state != self.state {
            info!("phase {} -> {}", self.state.name(), state.name());
        }
        self.state = state;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn totals(&self) -> &AttemptTotals {
        &self.totals
    }

    pub fn last_attempt(&self) -> Option<&ReactionAttempt> {
        self.last_attempt.as_ref()
    }

    pub fn target(&self) -> Option<Point> {
        self.target.map(|t| t.point)
    }

    pub fn reflex(&self) -> Option<&ReflexSequencer> {
        self.reflex.as_ref()
    }

    pub fn reflex_layout(&self) -> Option<&RowLayout> {
        self.reflex_layout.as_ref()
    }

    pub fn stripes(&self) -> Option<&StripeStimulus> {
        self.optokinetic.as_ref().map(|run| &run.stimulus)
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    pub fn pending_actions(&self) -> usize {
        self.scheduler.len()
    }

    /// Render view of the active phase.
    pub fn scene(&self) -> Scene<'_> {
        let center = self.viewport.center();
        match self.state {
            SessionState::Start => Scene::Start,
            SessionState::Slide(index) => Scene::Slide {
                index,
                total: self.config.slides.len(),
                text: self
                    .config
                    .slides
                    .get(index)
                    .map(String::as_str)
                    .unwrap_or_default(),
            },
            SessionState::Fixation => Scene::Fixation {
                dot: self
                    .fixation
                    .as_ref()
                    .map_or(center, |run| run.dot_position(center, self.timer.now())),
                radius: self.config.fixation.dot_radius,
            },
            SessionState::ReactionTime => Scene::Reaction {
                center_dot: center,
                center_radius: self.config.spawn.center_dot_radius,
                target: self.target(),
                target_radius: self.config.spawn.target_radius,
                last: self.last_attempt.as_ref(),
                completed: self.totals.count,
                max_attempts: self.config.reaction.max_attempts,
            },
            SessionState::ReflexDot => match (&self.reflex, &self.reflex_layout) {
                (Some(reflex), Some(row)) => Scene::Reflex {
                    dots: row.centers.clone(),
                    radius: row.radius,
                    highlighted: reflex.highlighted(),
                    hits: reflex.hits(),
                    misses: reflex.misses(),
                    hit_percentage: reflex.hit_percentage(),
                    running: reflex.should_continue(),
                },
                _ => Scene::Start,
            },
            SessionState::Optokinetic => match &self.optokinetic {
                Some(run) => Scene::Optokinetic {
                    stripes: &run.stimulus.widths,
                    gap: run.stimulus.gap,
                    offset: run
                        .stimulus
                        .offset
                        .value_at(self.timer.elapsed(run.started_at)),
                },
                None => Scene::Start,
            },
            SessionState::Summary => match &self.summary {
                Some(summary) => Scene::Summary(summary),
                None => Scene::Start,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_timing::ManualTimer;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::time::Duration;

    type Controller = SessionController<ManualTimer, Pcg32>;

    fn controller(config: SessionConfig) -> (Controller, ManualTimer) {
        let timer = ManualTimer::new();
        let session = SessionController::new(
            config,
            timer.clone(),
            Pcg32::seed_from_u64(42),
            Size::new(800.0, 600.0),
        )
        .unwrap();
        (session, timer)
    }

    fn only(phases: &[PlannedPhase]) -> SessionConfig {
        SessionConfig {
            phase_order: phases.to_vec(),
            ..SessionConfig::default()
        }
    }

    fn run_for(session: &mut Controller, timer: &ManualTimer, d: Duration) {
        timer.advance(d);
        session.update();
    }

    #[test]
    fn test_start_resets_and_enters_first_phase() {
        let (mut session, _timer) = controller(SessionConfig::default());
        assert_eq!(session.state(), SessionState::Start);
        assert!(session.handle_event(SessionEvent::Continue));
        assert_eq!(session.state(), SessionState::ReactionTime);
        assert!(session.target().is_some());
        assert_eq!(session.totals().count, 0);
    }

    #[test]
    fn test_tap_without_target_is_ignored() {
        let (mut session, timer) = controller(only(&[PlannedPhase::ReactionTime]));
        session.start();
        let target = session.target().unwrap();
        timer.advance(Duration::from_millis(300));
        assert!(session.tap(target));
        assert_eq!(session.totals().count, 1);
        assert!(session.target().is_none());

        // respawn pending: nothing to hit
        assert!(!session.tap(target));
        assert_eq!(session.totals().count, 1);

        run_for(&mut session, &timer, Duration::from_millis(250));
        assert!(session.target().is_some());
    }

    #[test]
    fn test_tap_off_target_is_ignored() {
        let (mut session, _timer) = controller(only(&[PlannedPhase::ReactionTime]));
        session.start();
        let target = session.target().unwrap();
        let miss = Point::new(target.x + 26.0, target.y);
        assert!(!session.tap(miss));
        assert_eq!(session.totals().count, 0);
        assert!(session.tap(Point::new(target.x + 24.0, target.y)));
    }

    #[test]
    fn test_reaction_time_is_measured_from_spawn() {
        let (mut session, timer) = controller(only(&[PlannedPhase::ReactionTime]));
        timer.set(5_000_000_000);
        session.start();
        timer.advance(Duration::from_millis(420));
        session.tap(session.target().unwrap());
        let last = session.last_attempt().unwrap();
        assert!((last.reaction_seconds - 0.42).abs() < 1e-9);
        assert_eq!(last.appeared_at_ns, 5_000_000_000);
    }

    #[test]
    fn test_attempt_limit_moves_to_next_phase() {
        let (mut session, timer) = controller(only(&[
            PlannedPhase::ReactionTime,
            PlannedPhase::ReflexDot,
        ]));
        session.start();
        for i in 0..5 {
            assert_eq!(session.state(), SessionState::ReactionTime);
            let target = session.target().unwrap();
            timer.advance(Duration::from_millis(300));
            assert!(session.tap(target));
            if i < 4 {
                run_for(&mut session, &timer, Duration::from_millis(250));
            }
        }
        assert_eq!(session.state(), SessionState::ReflexDot);
        assert!(session.target().is_none());
        assert!(!session.record_attempt(0.1, (0.0, 0.0)));
        assert_eq!(session.totals().count, 5);
    }

    #[test]
    fn test_spawn_after_limit_is_ignored() {
        let config = SessionConfig {
            reaction: crate::config::ReactionConfig {
                max_attempts: 1,
                ..Default::default()
            },
            ..only(&[PlannedPhase::ReactionTime])
        };
        let (mut session, _timer) = controller(config);
        session.start();
        session.record_attempt(0.2, (1.0, 1.0));
        assert_eq!(session.state(), SessionState::Summary);
        session.fire(Deferred::SpawnTarget, 0);
        assert!(session.target().is_none());
        assert_eq!(session.totals().count, 1);
    }

    #[test]
    fn test_reflex_round_runs_itself_and_reports() {
        let config = SessionConfig {
            reflex: crate::config::ReflexConfig {
                delay_policy: crate::config::DelayPolicy::Constant,
                tick_ms: 100,
                ..Default::default()
            },
            ..only(&[PlannedPhase::ReflexDot])
        };
        let (mut session, timer) = controller(config);
        session.start();
        assert_eq!(session.state(), SessionState::ReflexDot);

        run_for(&mut session, &timer, Duration::from_millis(100));
        assert_eq!(session.reflex().unwrap().highlighted(), 1);
        let lit = session.reflex_layout().unwrap().centers[1];
        assert!(session.tap(lit));
        assert!(session.handle_event(SessionEvent::TapReflex(4)));
        assert!(!session.handle_event(SessionEvent::TapReflex(9)));

        // not finished yet: continue does nothing
        assert!(!session.continue_pressed());

        // one late poll replays the remaining eleven ticks
        run_for(&mut session, &timer, Duration::from_secs(5));
        let reflex = session.reflex().unwrap();
        assert!(!reflex.should_continue());
        assert_eq!(reflex.completed_sweeps(), 3);
        assert_eq!(session.pending_actions(), 0);

        assert!(session.continue_pressed());
        assert_eq!(session.state(), SessionState::Summary);
        let summary = session.summary().unwrap();
        assert_eq!(summary.reflex_hits, 1);
        assert_eq!(summary.reflex_misses, 1);
        assert_eq!(summary.reflex_hit_percentage, Some(50.0));
    }

    #[test]
    fn test_optokinetic_ends_on_timer() {
        let (mut session, timer) = controller(only(&[PlannedPhase::Optokinetic]));
        session.start();
        assert_eq!(session.state(), SessionState::Optokinetic);
        assert!(session.stripes().unwrap().covered_width() >= 1600.0);

        timer.advance(Duration::from_millis(3500));
        match session.scene() {
            Scene::Optokinetic { offset, .. } => assert!((offset + 800.0).abs() < 0.5),
            other => panic!("unexpected scene {other:?}"),
        }

        run_for(&mut session, &timer, Duration::from_millis(3499));
        assert_eq!(session.state(), SessionState::Optokinetic);
        run_for(&mut session, &timer, Duration::from_millis(1));
        assert_eq!(session.state(), SessionState::Summary);
        assert!(session.stripes().is_none());
    }

    #[test]
    fn test_fixation_steps_chain_then_advance() {
        let (mut session, timer) = controller(only(&[
            PlannedPhase::Fixation,
            PlannedPhase::ReactionTime,
        ]));
        session.start();
        assert_eq!(session.state(), SessionState::Fixation);

        timer.advance(Duration::from_millis(500));
        assert_eq!(
            session.scene(),
            Scene::Fixation {
                dot: Point::new(460.0, 300.0),
                radius: 10.0
            }
        );

        run_for(&mut session, &timer, Duration::from_millis(1500));
        assert_eq!(session.state(), SessionState::Fixation);
        run_for(&mut session, &timer, Duration::from_millis(1000));
        assert_eq!(session.state(), SessionState::ReactionTime);
    }

    #[test]
    fn test_slides_advance_on_continue_and_empty_slides_skip() {
        let (mut session, _timer) = controller(only(&[
            PlannedPhase::Slides,
            PlannedPhase::ReactionTime,
        ]));
        session.start();
        assert_eq!(session.state(), SessionState::Slide(0));
        session.continue_pressed();
        session.continue_pressed();
        assert_eq!(session.state(), SessionState::Slide(2));
        session.continue_pressed();
        assert_eq!(session.state(), SessionState::ReactionTime);

        let config = SessionConfig {
            slides: Vec::new(),
            ..only(&[PlannedPhase::Slides, PlannedPhase::ReactionTime])
        };
        let (mut session, _timer) = controller(config);
        session.start();
        assert_eq!(session.state(), SessionState::ReactionTime);
    }

    #[test]
    fn test_phase_order_is_configurable() {
        let (mut session, timer) = controller(only(&[
            PlannedPhase::Optokinetic,
            PlannedPhase::ReflexDot,
        ]));
        session.start();
        assert_eq!(session.state(), SessionState::Optokinetic);
        run_for(&mut session, &timer, Duration::from_secs(7));
        assert_eq!(session.state(), SessionState::ReflexDot);
    }

    #[test]
    fn test_play_again_returns_to_start_and_restart_clears() {
        let (mut session, timer) = controller(only(&[PlannedPhase::ReactionTime]));
        session.start();
        for _ in 0..5 {
            timer.advance(Duration::from_millis(200));
            session.tap(session.target().unwrap());
            run_for(&mut session, &timer, Duration::from_millis(250));
        }
        assert_eq!(session.state(), SessionState::Summary);
        assert_eq!(session.summary().unwrap().attempts, 5);
        assert_eq!(session.summary().unwrap().reflex_hit_percentage, None);

        assert!(session.continue_pressed());
        assert_eq!(session.state(), SessionState::Start);
        assert!(!session.play_again());

        session.continue_pressed();
        assert_eq!(session.state(), SessionState::ReactionTime);
        assert_eq!(session.totals().count, 0);
        assert!(session.summary().is_none());
        assert!(session.last_attempt().is_none());
    }

    #[test]
    fn test_stale_actions_are_ignored() {
        let (mut session, _timer) = controller(only(&[PlannedPhase::ReactionTime]));
        session.start();
        let target = session.target();
        session.fire(Deferred::ReflexTick, 0);
        session.fire(Deferred::EndOptokinetic, 0);
        session.fire(Deferred::FixationStep, 0);
        session.fire(Deferred::SpawnTarget, 0);
        assert_eq!(session.state(), SessionState::ReactionTime);
        assert_eq!(session.target(), target);
    }

    #[test]
    fn test_resize_relayouts_reflex_row() {
        let (mut session, _timer) = controller(only(&[PlannedPhase::ReflexDot]));
        session.start();
        session.handle_event(SessionEvent::Resize(Size::new(1000.0, 400.0)));
        assert_eq!(
            session.reflex_layout().unwrap().centers[2],
            Point::new(500.0, 200.0)
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let config = SessionConfig {
            stripes: crate::config::StripeConfig {
                min_width: 90.0,
                max_width: 80.0,
                ..Default::default()
            },
            ..only(&[PlannedPhase::Optokinetic])
        };
        let result = SessionController::new(
            config,
            ManualTimer::new(),
            Pcg32::seed_from_u64(1),
            Size::new(800.0, 600.0),
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        for config in [
            SessionConfig {
                reflex: crate::config::ReflexConfig {
                    cycle_limit: 0,
                    ..Default::default()
                },
                ..SessionConfig::default()
            },
            SessionConfig {
                reflex: crate::config::ReflexConfig {
                    delay_policy: crate::config::DelayPolicy::Geometric { factor: 1.5 },
                    ..Default::default()
                },
                ..SessionConfig::default()
            },
        ] {
            let result = SessionController::new(
                config,
                ManualTimer::new(),
                Pcg32::seed_from_u64(1),
                Size::new(800.0, 600.0),
            );
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_reflex_ticks_speed_up_geometrically() {
        let (mut session, timer) = controller(only(&[PlannedPhase::ReflexDot]));
        session.start();
        let lit = |s: &Controller| s.reflex().unwrap().highlighted();
        assert_eq!(lit(&session), 0);

        run_for(&mut session, &timer, Duration::from_millis(799));
        assert_eq!(lit(&session), 0);
        run_for(&mut session, &timer, Duration::from_millis(1));
        assert_eq!(lit(&session), 1);

        // second interval is 800 ms * 0.95
        run_for(&mut session, &timer, Duration::from_millis(759));
        assert_eq!(lit(&session), 1);
        run_for(&mut session, &timer, Duration::from_millis(2));
        assert_eq!(lit(&session), 2);

        // third is 722 ms, so nothing at 1561 + 720
        run_for(&mut session, &timer, Duration::from_millis(720));
        assert_eq!(lit(&session), 2);
        run_for(&mut session, &timer, Duration::from_millis(2));
        assert_eq!(lit(&session), 3);
    }

    #[test]
    fn test_taps_and_continue_ignored_outside_their_phases() {
        let (mut session, _timer) = controller(only(&[PlannedPhase::Optokinetic]));
        assert!(!session.tap(Point::new(400.0, 300.0)));
        session.start();
        assert!(!session.tap(Point::new(400.0, 300.0)));
        assert!(!session.continue_pressed());
        assert_eq!(session.state(), SessionState::Optokinetic);
    }
}
