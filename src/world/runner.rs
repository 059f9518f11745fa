use std::time::{SystemTime, UNIX_EPOCH};

use crate::foundation::time::{date_string_from_epoch, midnight_from_epoch};
use crate::world::world::World;

/// Drives the frame loop: maps wall-clock time onto seconds-of-day and
/// supports scrubbing by injecting a time offset. The clock never pauses;
/// after a scrub it keeps running forward from the target.
pub struct WorldRunner {
    /// The driven world.
    pub world: World,
    midnight_seconds: f64,
    offset_seconds: f64,
    observers: Vec<Box<dyn FnMut()>>,
}

impl WorldRunner {
    /// Wrap a world, anchoring the clock at the most recent UTC midnight.
    pub fn new(world: World) -> Self {
        Self {
            world,
            midnight_seconds: midnight_from_epoch(epoch_seconds()),
            offset_seconds: 0.0,
            observers: Vec::new(),
        }
    }

    /// Seconds of wall-clock time since midnight.
    pub fn real_seconds(&self) -> f64 {
        epoch_seconds() - self.midnight_seconds
    }

    /// The simulated seconds-of-day the next frame will see.
    pub fn seconds(&self) -> f64 {
        self.real_seconds() + self.offset_seconds
    }

    /// Scrub: store the offset that makes the next natural tick read as
    /// `seconds`. Observers fire so presenters can refresh immediately.
    pub fn set_seconds(&mut self, seconds: f64) {
        self.offset_seconds = seconds - self.real_seconds();
        for observer in &mut self.observers {
            observer();
        }
    }

    /// Register a scrub observer.
    pub fn on_change(&mut self, observer: impl FnMut() + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// The calendar date string seeding the generated day schedule.
    pub fn date_string(&self) -> String {
        date_string_from_epoch(epoch_seconds())
    }

    /// Run one frame at the current clock reading and return its status
    /// line.
    pub fn tick(&mut self) -> String {
        let now_seconds = self.seconds();
        self.world.frame(now_seconds, epoch_seconds())
    }
}

fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_secs_f64())
}
