//! Shrinking storm circle
//!
//! Three phases, each waiting out a delay and then shrinking the safe circle
//! toward a fraction of the map. Entities outside the circle take periodic
//! damage scaled by the phase's multiplier.

/// One shrink phase
#[derive(Debug, Clone, Copy)]
pub struct StormPhase {
    /// Wait before this phase starts shrinking, milliseconds
    pub delay_ms: f64,
    /// Target radius as a fraction of the map size
    pub target_fraction: f32,
    /// Shrink speed, world units per millisecond
    pub speed: f32,
    /// Damage multiplier while this phase's circle is in force
    pub damage_mult: f32,
}

pub const STORM_PHASES: [StormPhase; 3] = [
    StormPhase {
        delay_ms: 60_000.0,
        target_fraction: 0.45,
        speed: 0.08,
        damage_mult: 1.0,
    },
    StormPhase {
        delay_ms: 30_000.0,
        target_fraction: 0.25,
        speed: 0.12,
        damage_mult: 2.0,
    },
    StormPhase {
        delay_ms: 45_000.0,
        target_fraction: 0.13,
        speed: 0.10,
        damage_mult: 3.0,
    },
];

/// Base damage per storm tick, before the phase multiplier
pub const STORM_BASE_DAMAGE: f32 = 1.0;

/// Milliseconds between storm damage ticks
pub const STORM_TICK_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StormMode {
    Waiting,
    Shrinking,
    /// All phases done; the final circle holds
    Finished,
}

/// Storm circle state for one session
#[derive(Debug, Clone)]
pub struct StormState {
    map_size: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
    pub target_radius: f32,
    pub phase: usize,
    pub mode: StormMode,
    pub damage_mult: f32,
    /// Time left in the current wait, milliseconds
    pub timer_ms: f64,
}

impl StormState {
    pub fn new(map_size: f32) -> Self {
        Self {
            map_size,
            center_x: map_size / 2.0,
            center_y: map_size / 2.0,
            radius: map_size * 0.7,
            target_radius: 0.0,
            phase: 0,
            mode: StormMode::Waiting,
            damage_mult: 1.0,
            timer_ms: STORM_PHASES[0].delay_ms,
        }
    }

    /// Advance the phase machine by `dt_ms`
    pub fn advance(&mut self, dt_ms: f64) {
        let Some(phase) = STORM_PHASES.get(self.phase) else {
            self.mode = StormMode::Finished;
            return;
        };

        match self.mode {
            StormMode::Waiting => {
                self.timer_ms -= dt_ms;
                if self.timer_ms <= 0.0 {
                    self.mode = StormMode::Shrinking;
                    self.target_radius = self.map_size * phase.target_fraction;
                    self.damage_mult = phase.damage_mult;
                }
            }
            StormMode::Shrinking => {
                self.radius =
                    (self.radius - phase.speed * dt_ms as f32).max(self.target_radius);
                if self.radius <= self.target_radius {
                    self.phase += 1;
                    match STORM_PHASES.get(self.phase) {
                        Some(next) => {
                            self.mode = StormMode::Waiting;
                            self.timer_ms = next.delay_ms;
                        }
                        None => self.mode = StormMode::Finished,
                    }
                }
            }
            StormMode::Finished => {}
        }
    }

    /// Is a point inside the safe circle
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        dx * dx + dy * dy <= self.radius * self.radius
    }

    /// Damage applied per tick to anyone outside the circle
    pub fn tick_damage(&self) -> f32 {
        STORM_BASE_DAMAGE * 5.0 * self.damage_mult
    }

    /// The storm deals no damage until the first shrink begins
    pub fn started(&self) -> bool {
        !(self.phase == 0 && self.mode == StormMode::Waiting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storm_waits_out_the_first_delay() {
        let mut storm = StormState::new(3000.0);
        assert!(!storm.started());

        storm.advance(59_999.0);
        assert_eq!(storm.mode, StormMode::Waiting);
        assert!(!storm.started());

        storm.advance(2.0);
        assert_eq!(storm.mode, StormMode::Shrinking);
        assert!(storm.started());
        assert_eq!(storm.target_radius, 3000.0 * 0.45);
    }

    #[test]
    fn shrink_stops_at_target_and_queues_next_phase() {
        let mut storm = StormState::new(3000.0);
        storm.advance(60_001.0);

        // Shrink far past the target in one step; radius clamps
        storm.advance(1_000_000.0);
        assert_eq!(storm.radius, 3000.0 * 0.45);
        assert_eq!(storm.phase, 1);
        assert_eq!(storm.mode, StormMode::Waiting);
        assert_eq!(storm.damage_mult, 1.0);
    }

    #[test]
    fn damage_scales_with_phase() {
        let mut storm = StormState::new(3000.0);
        assert_eq!(storm.tick_damage(), 5.0);

        // Run through phase 0 wait + shrink, then phase 1 wait
        storm.advance(60_001.0);
        storm.advance(1_000_000.0);
        storm.advance(30_001.0);
        assert_eq!(storm.mode, StormMode::Shrinking);
        assert_eq!(storm.tick_damage(), 10.0);
    }

    #[test]
    fn final_phase_holds() {
        let mut storm = StormState::new(3000.0);
        for _ in 0..3 {
            storm.advance(100_000.0); // wait
            storm.advance(10_000_000.0); // shrink
        }
        assert_eq!(storm.mode, StormMode::Finished);
        assert_eq!(storm.radius, 3000.0 * 0.13);

        let before = storm.radius;
        storm.advance(100_000.0);
        assert_eq!(storm.radius, before);
    }

    #[test]
    fn contains_checks_the_circle() {
        let storm = StormState::new(3000.0);
        assert!(storm.contains(1500.0, 1500.0));
        assert!(!storm.contains(0.0, 3000.0));
    }
}
