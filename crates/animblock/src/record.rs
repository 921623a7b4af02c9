//! Animation records
//!
//! One [`AnimationRecord`] per block. A record plays one leg at a time: a
//! timing window, the changes recorded by that leg's mutator, and the next
//! leg if the mutator asked for one.

use std::fmt;

use smallvec::SmallVec;

use crate::config::SchedulerConfig;
use crate::easing::Ease;
use crate::error::AnimationError;
use crate::recorder::Recorder;
use crate::target::SharedTarget;

/// A leg's mutator, boxed for storage as a continuation
pub type Leg = Box<dyn FnOnce(&Recorder<'_>) -> LegResult + Send>;

/// Callback fired once a block's whole chain has finished
pub type Completion = Box<dyn FnOnce() + Send>;

/// The changes recorded by one leg
pub type ChangeSet = SmallVec<[PropertyChange; 4]>;

/// What a leg's mutator returns
pub enum LegResult {
    /// This was the last leg
    Done,
    /// Play this leg once the current one finishes
    Next(Leg),
}

impl LegResult {
    /// Continue the chain with `mutator`
    pub fn next<F, R>(mutator: F) -> Self
    where
        F: FnOnce(&Recorder<'_>) -> R + Send + 'static,
        R: Into<LegResult>,
    {
        LegResult::Next(Box::new(move |recorder: &Recorder<'_>| -> LegResult {
            mutator(recorder).into()
        }))
    }

    pub fn is_done(&self) -> bool {
        matches!(self, LegResult::Done)
    }
}

impl From<()> for LegResult {
    fn from(_: ()) -> Self {
        LegResult::Done
    }
}

impl<F> From<Option<F>> for LegResult
where
    F: FnOnce(&Recorder<'_>) -> LegResult + Send + 'static,
{
    fn from(next: Option<F>) -> Self {
        match next {
            Some(mutator) => LegResult::Next(Box::new(mutator)),
            None => LegResult::Done,
        }
    }
}

impl fmt::Debug for LegResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegResult::Done => f.write_str("Done"),
            LegResult::Next(_) => f.write_str("Next(..)"),
        }
    }
}

/// One recorded property transition
#[derive(Clone)]
pub struct PropertyChange {
    /// The real target written every tick
    pub target: SharedTarget,
    /// Position of the target in the block
    pub target_index: usize,
    pub property: String,
    /// Value on the target when the write was recorded
    pub from: f32,
    /// Value the mutator asked for
    pub to: f32,
}

impl PropertyChange {
    /// Interpolated value for an eased factor
    pub fn value_at(&self, factor: f32) -> f32 {
        self.from + (self.to - self.from) * factor
    }

    fn write(&self, value: f32) {
        self.target.lock().set(&self.property, value);
    }
}

impl fmt::Debug for PropertyChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyChange")
            .field("target_index", &self.target_index)
            .field("property", &self.property)
            .field("from", &self.from)
            .field("to", &self.to)
            .finish()
    }
}

/// Playback state of a live record
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Running,
    Paused,
}

/// Mutable state for one animation block
pub struct AnimationRecord {
    /// Duration of every leg in milliseconds
    duration_ms: u32,
    ease: Ease,
    /// Targets in block order, shared by every leg of the chain
    targets: Vec<SharedTarget>,
    /// Current leg timing window (milliseconds on the scheduler clock)
    start: f64,
    end: f64,
    changes: ChangeSet,
    continuation: Option<Leg>,
    on_complete: Option<Completion>,
    /// Set while paused; the clock reading when the pause began
    paused_at: Option<f64>,
    /// Legs started so far, including the current one
    legs: u32,
}

impl AnimationRecord {
    pub fn new(duration_ms: u32, ease: Ease, targets: Vec<SharedTarget>) -> Self {
        Self {
            duration_ms,
            ease,
            targets,
            start: 0.0,
            end: 0.0,
            changes: ChangeSet::new(),
            continuation: None,
            on_complete: None,
            paused_at: None,
            legs: 0,
        }
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Current leg window as (start, end)
    pub fn window(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    /// Changes of the active leg
    pub fn changes(&self) -> &[PropertyChange] {
        &self.changes
    }

    pub fn targets(&self) -> &[SharedTarget] {
        &self.targets
    }

    /// Number of legs started, including the current one
    pub fn legs(&self) -> u32 {
        self.legs
    }

    pub fn has_continuation(&self) -> bool {
        self.continuation.is_some()
    }

    pub fn state(&self) -> PlaybackState {
        if self.paused_at.is_some() {
            PlaybackState::Paused
        } else {
            PlaybackState::Running
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Replace the completion callback (last write wins)
    pub fn set_completion(&mut self, on_complete: Completion) {
        self.on_complete = Some(on_complete);
    }

    /// Start a new leg at `now`: reset the window and change set, then run
    /// `leg` against the targets to record its changes.
    ///
    /// On error the record is left with no changes and no continuation.
    pub fn begin_leg(
        &mut self,
        now: f64,
        leg: Leg,
        config: &SchedulerConfig,
    ) -> Result<(), AnimationError> {
        self.start = now;
        self.end = now + self.duration_ms as f64;
        self.changes.clear();
        self.continuation = None;
        self.legs += 1;

        let recorder = Recorder::new(&self.targets, config);
        let result = leg(&recorder);
        self.changes = recorder.finish()?;

        if let LegResult::Next(next) = result {
            self.continuation = Some(next);
        }

        tracing::debug!(
            leg = self.legs,
            changes = self.changes.len(),
            chained = self.continuation.is_some(),
            "Animation leg started"
        );
        Ok(())
    }

    /// Leg progress at `now`, clamped to [0, 1]
    pub fn progress(&self, now: f64) -> f32 {
        let span = self.end - self.start;
        if span <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / span).clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self, now: f64) -> bool {
        now >= self.end
    }

    /// Write this tick's values to the real targets.
    ///
    /// Returns `true` when the leg has finished, in which case every property
    /// now holds exactly its recorded target value. The finishing tick writes
    /// `to` directly without easing, so the easing function only ever sees
    /// progress in [0, 1), however late the tick arrives.
    pub fn advance(&mut self, now: f64) -> bool {
        if self.is_finished(now) {
            for change in &self.changes {
                change.write(change.to);
            }
            return true;
        }

        let factor = self.ease.apply(self.progress(now));
        for change in &self.changes {
            change.write(change.value_at(factor));
        }
        false
    }

    pub fn take_continuation(&mut self) -> Option<Leg> {
        self.continuation.take()
    }

    /// Fire the completion callback, if one was attached
    pub fn complete(mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            on_complete();
        }
    }

    pub fn pause(&mut self, now: f64) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Resume, shifting the window by the time spent paused
    pub fn resume(&mut self, now: f64) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = (now - paused_at).max(0.0);
            self.start += paused_for;
            self.end += paused_for;
        }
    }
}

impl fmt::Debug for AnimationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationRecord")
            .field("duration_ms", &self.duration_ms)
            .field("targets", &self.targets.len())
            .field("start", &self.start)
            .field("end", &self.end)
            .field("changes", &self.changes)
            .field("has_continuation", &self.continuation.is_some())
            .field("has_completion", &self.on_complete.is_some())
            .field("state", &self.state())
            .field("legs", &self.legs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;
    use crate::target::{shared, Animatable, PropertyBag};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn bag_record(duration_ms: u32) -> (AnimationRecord, Arc<parking_lot::Mutex<PropertyBag>>) {
        let bag = shared(PropertyBag::new().with("x", 0.0).with("y", 0.0));
        let target: SharedTarget = bag.clone();
        let record = AnimationRecord::new(duration_ms, Easing::Linear.into(), vec![target]);
        (record, bag)
    }

    fn move_x(to: f32) -> Leg {
        Box::new(move |r: &Recorder<'_>| {
            r.target(0).set("x", to);
            LegResult::Done
        })
    }

    #[test]
    fn test_begin_leg_sets_window() {
        let (mut record, _) = bag_record(1000);

        record
            .begin_leg(250.0, move_x(10.0), &SchedulerConfig::default())
            .unwrap();

        assert_eq!(record.window(), (250.0, 1250.0));
        assert_eq!(record.changes().len(), 1);
        assert_eq!(record.legs(), 1);
        assert!(!record.has_continuation());
    }

    #[test]
    fn test_advance_interpolates_then_lands_exactly() {
        let (mut record, bag) = bag_record(1000);
        record
            .begin_leg(0.0, move_x(10.0), &SchedulerConfig::default())
            .unwrap();

        assert!(!record.advance(0.0));
        assert_eq!(bag.lock().get("x"), Some(0.0));

        assert!(!record.advance(500.0));
        assert_eq!(bag.lock().get("x"), Some(5.0));

        assert!(record.advance(1000.0));
        assert_eq!(bag.lock().get("x"), Some(10.0));
    }

    #[test]
    fn test_continuation_stored() {
        let (mut record, _) = bag_record(100);
        let leg: Leg = Box::new(|r: &Recorder<'_>| {
            r.target(0).set("x", 1.0);
            LegResult::next(|r: &Recorder<'_>| {
                r.target(0).set("y", 2.0);
            })
        });

        record.begin_leg(0.0, leg, &SchedulerConfig::default()).unwrap();
        assert!(record.has_continuation());

        let next = record.take_continuation().unwrap();
        record.begin_leg(100.0, next, &SchedulerConfig::default()).unwrap();
        assert_eq!(record.legs(), 2);
        assert_eq!(record.changes().len(), 1);
        assert_eq!(record.changes()[0].property, "y");
        assert!(!record.has_continuation());
    }

    #[test]
    fn test_failed_leg_leaves_nothing_to_play() {
        let (mut record, _) = bag_record(100);
        let leg: Leg = Box::new(|r: &Recorder<'_>| {
            r.target(0).set("x", 1.0);
            r.target(0).set("z", 1.0);
            LegResult::next(|_: &Recorder<'_>| {})
        });

        let err = record
            .begin_leg(0.0, leg, &SchedulerConfig::strict())
            .unwrap_err();

        assert!(matches!(err, AnimationError::UnknownProperty { .. }));
        assert!(record.changes().is_empty());
        assert!(!record.has_continuation());
    }

    #[test]
    fn test_progress_clamped_to_window() {
        let (mut record, _) = bag_record(100);
        record
            .begin_leg(50.0, move_x(1.0), &SchedulerConfig::default())
            .unwrap();

        assert_eq!(record.progress(0.0), 0.0);
        assert_eq!(record.progress(100.0), 0.5);
        assert_eq!(record.progress(200.0), 1.0);
    }

    #[test]
    fn test_pause_shifts_window_on_resume() {
        let (mut record, _) = bag_record(100);
        record
            .begin_leg(0.0, move_x(1.0), &SchedulerConfig::default())
            .unwrap();

        record.pause(40.0);
        assert_eq!(record.state(), PlaybackState::Paused);
        record.resume(90.0);

        assert_eq!(record.state(), PlaybackState::Running);
        assert_eq!(record.window(), (50.0, 150.0));
    }

    #[test]
    fn test_completion_last_write_wins() {
        let (mut record, _) = bag_record(100);
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let f = first.clone();
        record.set_completion(Box::new(move || {
            f.fetch_add(1, Ordering::SeqCst);
        }));
        let s = second.clone();
        record.set_completion(Box::new(move || {
            s.fetch_add(1, Ordering::SeqCst);
        }));

        record.complete();
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_option_converts_to_leg_result() {
        let none: Option<fn(&Recorder<'_>) -> LegResult> = None;
        assert!(LegResult::from(none).is_done());
        assert!(LegResult::from(()).is_done());
    }
}
