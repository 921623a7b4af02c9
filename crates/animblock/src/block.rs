//! Fluent builder for animation blocks
//!
//! ```rust
//! use animblock::{AnimationBlock, AnimationScheduler, Easing, LegResult, ManualClock};
//! use animblock::{Animatable, PropertyBag, Recorder, shared};
//!
//! let clock = ManualClock::new();
//! let mut scheduler = AnimationScheduler::with_clock(clock.clone());
//! let card = shared(PropertyBag::new().with("top", 0.0).with("opacity", 1.0));
//!
//! AnimationBlock::new(300)
//!     .ease(Easing::EaseOutBounce)
//!     .target(card.clone())
//!     .on_complete(|| println!("Animation ended"))
//!     .start(&mut scheduler, |r| {
//!         r.target(0).set("top", 50.0);
//!         LegResult::next(|r: &Recorder<'_>| {
//!             r.target(0).set("opacity", 0.2);
//!         })
//!     })
//!     .unwrap();
//!
//! while !scheduler.is_empty() {
//!     clock.advance(16.0);
//!     scheduler.tick();
//! }
//! assert_eq!(card.lock().get("top"), Some(50.0));
//! assert_eq!(card.lock().get("opacity"), Some(0.2));
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

use crate::easing::{Ease, EasingFunction};
use crate::error::Result;
use crate::record::{Completion, Leg, LegResult};
use crate::recorder::Recorder;
use crate::registry::BlockId;
use crate::scheduler::AnimationScheduler;
use crate::target::{Animatable, SharedTarget};

/// Builder for an animation block
pub struct AnimationBlock {
    duration_ms: u32,
    ease: Ease,
    targets: Vec<SharedTarget>,
    on_complete: Option<Completion>,
}

impl AnimationBlock {
    /// Start building a block whose legs each last `duration_ms`
    pub fn new(duration_ms: u32) -> Self {
        Self {
            duration_ms,
            ease: Ease::default(),
            targets: Vec::new(),
            on_complete: None,
        }
    }

    /// Set the easing function (linear by default)
    pub fn ease<E: EasingFunction + 'static>(mut self, ease: E) -> Self {
        self.ease = Ease::new(ease);
        self
    }

    /// Add a target; its stand-in index is the number of targets added before it
    pub fn target<T: Animatable + Send + 'static>(mut self, target: Arc<Mutex<T>>) -> Self {
        let target: SharedTarget = target;
        self.targets.push(target);
        self
    }

    /// Add an already type-erased target
    pub fn shared_target(mut self, target: SharedTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Add every target from a list, in order
    pub fn targets<T, I>(mut self, targets: I) -> Self
    where
        T: Animatable + Send + 'static,
        I: IntoIterator<Item = Arc<Mutex<T>>>,
    {
        for target in targets {
            self = self.target(target);
        }
        self
    }

    /// Callback fired once the whole chain has finished.
    ///
    /// It runs inside [`AnimationScheduler::tick`] and so cannot start another
    /// block; see [`AnimationScheduler::on_complete`].
    pub fn on_complete<F: FnOnce() + Send + 'static>(mut self, on_complete: F) -> Self {
        self.on_complete = Some(Box::new(on_complete));
        self
    }

    /// Record the first leg with `mutator` and register the block
    pub fn start<F, R>(self, scheduler: &mut AnimationScheduler, mutator: F) -> Result<BlockId>
    where
        F: FnOnce(&Recorder<'_>) -> R + Send + 'static,
        R: Into<LegResult>,
    {
        let leg: Leg = Box::new(move |recorder: &Recorder<'_>| -> LegResult {
            mutator(recorder).into()
        });
        let id = scheduler.spawn(self.duration_ms, self.ease, self.targets, leg)?;
        if let Some(on_complete) = self.on_complete {
            scheduler.on_complete(id, on_complete)?;
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::AnimationError;
    use crate::target::{shared, PropertyBag};
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_builder_targets_keep_order() {
        let clock = ManualClock::new();
        let mut scheduler = AnimationScheduler::with_clock(clock.clone());
        let bags: Vec<_> = (0..3)
            .map(|i| shared(PropertyBag::new().with("left", i as f32)))
            .collect();

        let id = AnimationBlock::new(100)
            .targets(bags.iter().cloned())
            .start(&mut scheduler, |r| {
                for stand_in in r.stand_ins() {
                    stand_in.set("left", 10.0 * (stand_in.index() + 1) as f32);
                }
            })
            .unwrap();

        assert_eq!(scheduler.changes(id).unwrap().len(), 3);
        clock.advance(100.0);
        scheduler.tick();

        let lefts: Vec<Option<f32>> = bags.iter().map(|b| b.lock().get("left")).collect();
        assert_eq!(lefts, vec![Some(10.0), Some(20.0), Some(30.0)]);
    }

    #[test]
    fn test_builder_completion_fires() {
        let clock = ManualClock::new();
        let mut scheduler = AnimationScheduler::with_clock(clock.clone());
        let done = Arc::new(AtomicBool::new(false));
        let flag = done.clone();

        AnimationBlock::new(50)
            .target(shared(PropertyBag::new().with("x", 0.0)))
            .on_complete(move || flag.store(true, Ordering::SeqCst))
            .start(&mut scheduler, |r| {
                r.target(0).set("x", 1.0);
            })
            .unwrap();

        clock.advance(50.0);
        scheduler.tick();
        assert!(done.load(Ordering::SeqCst));
    }

    #[test]
    fn test_builder_without_targets_fails() {
        let mut scheduler = AnimationScheduler::with_clock(ManualClock::new());

        let err = AnimationBlock::new(100)
            .start(&mut scheduler, |_| {})
            .unwrap_err();
        assert_eq!(err, AnimationError::NoTargets);
    }

    #[test]
    fn test_custom_easing_closure() {
        let clock = ManualClock::new();
        let mut scheduler = AnimationScheduler::with_clock(clock.clone());
        let bag = shared(PropertyBag::new().with("x", 0.0));

        AnimationBlock::new(100)
            .ease(|t: f32| t * t)
            .target(bag.clone())
            .start(&mut scheduler, |r| {
                r.target(0).set("x", 100.0);
            })
            .unwrap();

        clock.advance(50.0);
        scheduler.tick();
        assert_eq!(bag.lock().get("x"), Some(25.0));
    }
}
