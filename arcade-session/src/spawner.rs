use arcade_core::{Point, Size};
use log::{debug, warn};
use rand::Rng;

use crate::config::SpawnConfig;

/// A freshly placed target and its signed offset from the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub point: Point,
    pub delta: (f32, f32),
}

/// Places reaction targets by rejection sampling: uniform inside the padded
/// viewport, resampled while closer than `clearance` to the viewport centre
/// where the static dot sits.
#[derive(Debug, Clone)]
pub struct TargetSpawner {
    padding: f32,
    clearance: f32,
    max_rounds: usize,
    last_position: Option<Point>,
}

impl TargetSpawner {
    pub fn new(config: &SpawnConfig) -> Self {
        Self {
            padding: config.padding,
            clearance: config.clearance(),
            max_rounds: config.max_rounds.max(1),
            last_position: None,
        }
    }

    pub fn last_position(&self) -> Option<Point> {
        self.last_position
    }

    pub fn reset(&mut self) {
        self.last_position = None;
    }

    pub fn spawn<R: Rng>(&mut self, rng: &mut R, viewport: Size) -> Spawn {
        let center = viewport.center();
        let mut rounds = 0;
        let point = loop {
            let candidate = Point::new(
                self.sample_axis(rng, viewport.width),
                self.sample_axis(rng, viewport.height),
            );
            rounds += 1;
            if candidate.distance(center) >= self.clearance {
                break candidate;
            }
            if rounds >= self.max_rounds {
                warn!(
                    "no spawn point {:.0} away from centre after {} rounds in {:.0}x{:.0}",
                    self.clearance, rounds, viewport.width, viewport.height
                );
                break candidate;
            }
        };

        let delta = point.delta_from(self.last_position.unwrap_or(center));
        self.last_position = Some(point);
        debug!(
            "target at ({:.1}, {:.1}) after {} rounds, delta ({:.1}, {:.1})",
            point.x, point.y, rounds, delta.0, delta.1
        );
        Spawn { point, delta }
    }

    fn sample_axis<R: Rng>(&self, rng: &mut R, extent: f32) -> f32 {
        let low = self.padding;
        let high = extent - self.padding;
        if high <= low {
            // viewport narrower than both paddings: nowhere to move on this axis
            return extent / 2.0;
        }
        rng.random_range(low..=high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawner() -> TargetSpawner {
        TargetSpawner::new(&SpawnConfig::default())
    }

    #[test]
    fn test_points_stay_inside_padding_and_clear_of_center() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut spawner = spawner();
        for viewport in [
            Size::new(800.0, 600.0),
            Size::new(200.0, 200.0),
            Size::new(1920.0, 1080.0),
        ] {
            let center = viewport.center();
            for _ in 0..2000 {
                let p = spawner.spawn(&mut rng, viewport).point;
                assert!(p.x >= 50.0 && p.x <= viewport.width - 50.0, "{p:?}");
                assert!(p.y >= 50.0 && p.y <= viewport.height - 50.0, "{p:?}");
                assert!(p.distance(center) >= 35.0, "{p:?}");
            }
        }
    }

    #[test]
    fn test_delta_is_measured_from_previous_target() {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut spawner = spawner();
        let viewport = Size::new(800.0, 600.0);

        let first = spawner.spawn(&mut rng, viewport);
        assert_eq!(first.delta, first.point.delta_from(viewport.center()));

        let second = spawner.spawn(&mut rng, viewport);
        assert_eq!(second.delta, second.point.delta_from(first.point));
        assert_eq!(spawner.last_position(), Some(second.point));

        spawner.reset();
        assert_eq!(spawner.last_position(), None);
    }

    #[test]
    fn test_impossible_clearance_still_terminates() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut spawner = TargetSpawner::new(&SpawnConfig {
            min_clearance: Some(10_000.0),
            max_rounds: 25,
            ..SpawnConfig::default()
        });
        let p = spawner.spawn(&mut rng, Size::new(400.0, 300.0)).point;
        assert!(p.x >= 50.0 && p.x <= 350.0);
    }

    #[test]
    fn test_tiny_viewport_collapses_to_center() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut spawner = TargetSpawner::new(&SpawnConfig {
            min_clearance: Some(0.0),
            ..SpawnConfig::default()
        });
        let p = spawner.spawn(&mut rng, Size::new(60.0, 500.0)).point;
        assert_eq!(p.x, 30.0);
        assert!(p.y >= 50.0 && p.y <= 450.0);
    }
}
