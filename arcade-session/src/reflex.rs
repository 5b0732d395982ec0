use std::time::Duration;

use arcade_core::{Point, Size};
use log::debug;

use crate::config::{DelayPolicy, ReflexConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

/// The reflex round: a highlight bouncing along a row of dots.
///
/// Each [`advance`](Self::advance) is one tick. Reaching either end of the row
/// completes a sweep and flips the direction; the round stops by itself once
/// `cycle_limit` sweeps are done and ignores further ticks.
#[derive(Debug, Clone)]
pub struct ReflexSequencer {
    length: usize,
    cycle_limit: u32,
    policy: DelayPolicy,
    highlighted: usize,
    direction: Direction,
    hits: u32,
    misses: u32,
    completed_sweeps: u32,
    current_delay: Duration,
    running: bool,
}

impl ReflexSequencer {
    pub fn new(config: &ReflexConfig) -> Self {
        Self {
            length: config.length.max(1),
            cycle_limit: config.cycle_limit,
            policy: config.delay_policy,
            highlighted: 0,
            direction: Direction::Forward,
            hits: 0,
            misses: 0,
            completed_sweeps: 0,
            current_delay: config.tick(),
            running: true,
        }
    }

    /// One tick. Returns false, changing nothing, once the round has stopped.
    pub fn advance(&mut self) -> bool {
        if !self.running {
            return false;
        }
        let last = self.length - 1;
        match self.direction {
            Direction::Forward => {
                if self.highlighted < last {
                    self.highlighted += 1;
                }
                if self.highlighted == last {
                    self.direction = Direction::Backward;
                    self.completed_sweeps += 1;
                }
            }
            Direction::Backward => {
                if self.highlighted > 0 {
                    self.highlighted -= 1;
                }
                if self.highlighted == 0 {
                    self.direction = Direction::Forward;
                    self.completed_sweeps += 1;
                }
            }
        }
        if self.completed_sweeps >= self.cycle_limit {
            self.running = false;
        }
        self.current_delay = self.policy.next_delay(self.current_delay);
        debug!(
            "reflex tick: index {} {:?}, sweeps {}/{}, next in {:?}",
            self.highlighted, self.direction, self.completed_sweeps, self.cycle_limit, self.current_delay
        );
        true
    }

    pub fn should_continue(&self) -> bool {
        self.running
    }

    /// Counts a tap on `index`: a hit when it is the lit dot, a miss otherwise.
    pub fn register_tap(&mut self, index: usize) -> bool {
        let hit = index == self.highlighted;
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        hit
    }

    pub fn hit_percentage(&self) -> f64 {
        let taps = self.hits + self.misses;
        if taps == 0 {
            0.0
        } else {
            f64::from(self.hits) / f64::from(taps) * 100.0
        }
    }

    /// Final hit percentage, available only after the round has stopped.
    pub fn finish(&self) -> Option<f64> {
        (!self.running).then(|| self.hit_percentage())
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn completed_sweeps(&self) -> u32 {
        self.completed_sweeps
    }

    pub fn current_delay(&self) -> Duration {
        self.current_delay
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// Where the row of reflex dots sits in the viewport: centred, squeezed
/// together when the configured spacing would not fit.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub centers: Vec<Point>,
    pub radius: f32,
}

impl RowLayout {
    pub fn new(config: &ReflexConfig, viewport: Size) -> Self {
        let n = config.length.max(1);
        let radius = config.dot_radius;
        let spacing = if n > 1 {
            let fit = (viewport.width - 2.0 * radius).max(0.0) / (n - 1) as f32;
            config.spacing.min(fit)
        } else {
            0.0
        };
        let center = viewport.center();
        let first_x = center.x - spacing * (n - 1) as f32 / 2.0;
        let centers = (0..n)
            .map(|i| Point::new(first_x + spacing * i as f32, center.y))
            .collect();
        Self { centers, radius }
    }

    /// Index of the dot containing `point`.
    pub fn index_at(&self, point: Point) -> Option<usize> {
        self.centers
            .iter()
            .position(|c| c.distance(point) <= self.radius)
    }
}
