//! Change recording for animation legs
//!
//! While a leg's mutator runs, it sees the block's targets only through a
//! [`Recorder`]. Reads pass through to the real targets. Writes never touch
//! them: each write becomes a [`PropertyChange`] holding the value the property
//! had at the moment of the write and the value the mutator asked for. The
//! scheduler then plays those changes back over the leg's duration.
//!
//! ```rust
//! use animblock::{Animatable, AnimationBlock, AnimationScheduler, ManualClock, PropertyBag, shared};
//!
//! let clock = ManualClock::new();
//! let mut scheduler = AnimationScheduler::with_clock(clock.clone());
//! let a = shared(PropertyBag::new().with("left", 0.0));
//! let b = shared(PropertyBag::new().with("left", 50.0));
//!
//! AnimationBlock::new(1000)
//!     .target(a.clone())
//!     .target(b.clone())
//!     .start(&mut scheduler, |r| {
//!         let (a, b) = (r.target(0), r.target(1));
//!         a.set("left", 200.0);
//!         // Reads see the real value, not the pending one
//!         b.set("left", a.get("left").unwrap_or_default() + 100.0);
//!     })
//!     .unwrap();
//!
//! assert_eq!(a.lock().get("left"), Some(0.0));
//! clock.advance(1000.0);
//! scheduler.tick();
//! assert_eq!(a.lock().get("left"), Some(200.0));
//! assert_eq!(b.lock().get("left"), Some(100.0));
//! ```

use std::cell::RefCell;

use smallvec::SmallVec;

use crate::config::{InvalidWritePolicy, SchedulerConfig};
use crate::error::AnimationError;
use crate::record::{ChangeSet, PropertyChange};
use crate::target::SharedTarget;

/// Records the writes a leg's mutator makes to its stand-ins.
///
/// Do not hold a lock on any of the block's targets while the mutator runs;
/// reads and writes lock the target briefly.
pub struct Recorder<'a> {
    targets: &'a [SharedTarget],
    unknown_property: InvalidWritePolicy,
    non_finite_value: InvalidWritePolicy,
    changes: RefCell<ChangeSet>,
    errors: RefCell<SmallVec<[AnimationError; 1]>>,
}

impl<'a> Recorder<'a> {
    pub(crate) fn new(targets: &'a [SharedTarget], config: &SchedulerConfig) -> Self {
        Self {
            targets,
            unknown_property: config.unknown_property,
            non_finite_value: config.non_finite_value,
            changes: RefCell::new(ChangeSet::new()),
            errors: RefCell::new(SmallVec::new()),
        }
    }

    /// Number of targets in the block
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Stand-in for the target at `index`, in the order the block was given
    pub fn target(&self, index: usize) -> StandIn<'_> {
        StandIn {
            recorder: self,
            index,
        }
    }

    /// Stand-ins for every target, in order
    pub fn stand_ins(&self) -> impl Iterator<Item = StandIn<'_>> + '_ {
        (0..self.targets.len()).map(move |index| self.target(index))
    }

    /// Pass-through read of the real target's current value
    pub fn get(&self, index: usize, property: &str) -> Option<f32> {
        self.targets
            .get(index)
            .and_then(|target| target.lock().get(property))
    }

    /// Record a change of `property` on target `index` toward `value`
    pub fn set(&self, index: usize, property: &str, value: f32) {
        let Some(target) = self.targets.get(index) else {
            self.errors.borrow_mut().push(AnimationError::TargetOutOfRange {
                index,
                count: self.targets.len(),
            });
            return;
        };

        let Some(from) = target.lock().get(property) else {
            self.reject(
                self.unknown_property,
                AnimationError::UnknownProperty {
                    target: index,
                    property: property.to_string(),
                },
            );
            return;
        };

        if !value.is_finite() {
            self.reject(
                self.non_finite_value,
                AnimationError::NonFiniteValue {
                    target: index,
                    property: property.to_string(),
                    value,
                },
            );
            return;
        }

        self.changes.borrow_mut().push(PropertyChange {
            target: target.clone(),
            target_index: index,
            property: property.to_string(),
            from,
            to: value,
        });
    }

    /// Number of changes recorded so far in this leg
    pub fn recorded(&self) -> usize {
        self.changes.borrow().len()
    }

    fn reject(&self, policy: InvalidWritePolicy, error: AnimationError) {
        match policy {
            InvalidWritePolicy::Ignore => tracing::debug!("Dropped write: {}", error),
            InvalidWritePolicy::Report => self.errors.borrow_mut().push(error),
        }
    }

    /// Consume the recorder, yielding the change set or the first reported error
    pub(crate) fn finish(self) -> Result<ChangeSet, AnimationError> {
        match self.errors.into_inner().into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.changes.into_inner()),
        }
    }
}

/// The stand-in a mutator uses in place of one real target
#[derive(Clone, Copy)]
pub struct StandIn<'r> {
    recorder: &'r Recorder<'r>,
    index: usize,
}

impl<'r> StandIn<'r> {
    /// Position of the target in the block
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current value on the real target
    pub fn get(&self, property: &str) -> Option<f32> {
        self.recorder.get(self.index, property)
    }

    pub fn has(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    /// Animate `property` toward `value` over this leg
    pub fn set(&self, property: &str, value: f32) -> &Self {
        self.recorder.set(self.index, property, value);
        self
    }
}
