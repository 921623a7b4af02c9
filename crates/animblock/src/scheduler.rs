//! Animation scheduler
//!
//! Owns every live animation block and advances them each frame. The host
//! calls [`AnimationScheduler::tick`] once per frame, at whatever cadence its
//! frame source provides.

use smallvec::SmallVec;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::SchedulerConfig;
use crate::easing::{Ease, EasingFunction};
use crate::error::{AnimationError, Result};
use crate::record::{AnimationRecord, Leg, LegResult, PlaybackState, PropertyChange};
use crate::recorder::Recorder;
use crate::registry::{BlockId, Registry};
use crate::target::SharedTarget;

/// What one tick did
#[derive(Debug, Default)]
pub struct TickSummary {
    /// Records advanced this tick (paused records are skipped)
    pub advanced: usize,
    /// Blocks that moved on to their next leg
    pub chained: SmallVec<[BlockId; 4]>,
    /// Blocks whose chain finished; their completion callbacks have fired
    pub completed: SmallVec<[BlockId; 4]>,
    /// Blocks removed because their next leg failed to record
    pub failed: Vec<(BlockId, AnimationError)>,
}

/// The scheduler that ticks all live animation blocks
pub struct AnimationScheduler {
    registry: Registry,
    clock: Box<dyn Clock>,
    config: SchedulerConfig,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create a scheduler reading time from `clock`
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            registry: Registry::new(),
            clock: Box::new(clock),
            config: SchedulerConfig::default(),
        }
    }

    /// Builder: replace the configuration
    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.config.target_fps = fps.max(1);
    }

    /// Time between frames the host should aim for
    pub fn frame_interval(&self) -> Duration {
        self.config.frame_interval()
    }

    /// Current reading of the scheduler clock, in milliseconds
    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    /// Create an animation block.
    ///
    /// Runs `mutator` immediately against stand-ins for `targets` (in order) to
    /// record the first leg, then registers the block. If the mutator returns
    /// [`LegResult::Next`], that leg plays when this one finishes.
    ///
    /// Attach a completion callback with [`on_complete`](Self::on_complete)
    /// before the next [`tick`](Self::tick); once the block has finished the
    /// id is stale and attaching fails with [`AnimationError::BlockNotFound`].
    pub fn create_block<E, F, R>(
        &mut self,
        duration_ms: u32,
        ease: E,
        targets: Vec<SharedTarget>,
        mutator: F,
    ) -> Result<BlockId>
    where
        E: EasingFunction + 'static,
        F: FnOnce(&Recorder<'_>) -> R + Send + 'static,
        R: Into<LegResult>,
    {
        let leg: Leg = Box::new(move |recorder: &Recorder<'_>| -> LegResult {
            mutator(recorder).into()
        });
        self.spawn(duration_ms, Ease::new(ease), targets, leg)
    }

    pub(crate) fn spawn(
        &mut self,
        duration_ms: u32,
        ease: Ease,
        targets: Vec<SharedTarget>,
        leg: Leg,
    ) -> Result<BlockId> {
        if duration_ms == 0 {
            return Err(AnimationError::ZeroDuration);
        }
        if targets.is_empty() {
            return Err(AnimationError::NoTargets);
        }

        let target_count = targets.len();
        let mut record = AnimationRecord::new(duration_ms, ease, targets);
        let now = self.clock.now_ms();
        if let Err(error) = record.begin_leg(now, leg, &self.config) {
            tracing::warn!("Animation block rejected: {}", error);
            return Err(error);
        }

        let id = self.registry.insert(record);
        tracing::debug!(
            ?id,
            duration_ms,
            targets = target_count,
            "Animation block created"
        );
        Ok(id)
    }

    /// Attach the callback fired once the block's whole chain finishes.
    ///
    /// Calling this again replaces the previous callback.
    ///
    /// The callback runs inside [`tick`](Self::tick) while the scheduler is
    /// mutably borrowed, so it cannot create blocks itself. Queue follow-up
    /// motion as a chained leg with [`LegResult::Next`], or send a message
    /// from the callback and start the next block once `tick` returns:
    ///
    /// ```rust
    /// use animblock::{AnimationScheduler, ManualClock, PropertyBag, SharedTarget, shared};
    /// use std::sync::mpsc;
    ///
    /// let clock = ManualClock::new();
    /// let mut scheduler = AnimationScheduler::with_clock(clock.clone());
    /// let target: SharedTarget = shared(PropertyBag::new().with("x", 0.0));
    /// let (done_tx, done_rx) = mpsc::channel();
    ///
    /// let id = scheduler
    ///     .create_block(100, |t: f32| t, vec![target.clone()], |r| {
    ///         r.target(0).set("x", 1.0);
    ///     })
    ///     .unwrap();
    /// scheduler.on_complete(id, move || done_tx.send(()).unwrap()).unwrap();
    ///
    /// clock.advance(100.0);
    /// scheduler.tick();
    /// for () in done_rx.try_iter() {
    ///     scheduler
    ///         .create_block(100, |t: f32| t, vec![target.clone()], |r| {
    ///             r.target(0).set("x", 0.0);
    ///         })
    ///         .unwrap();
    /// }
    /// assert_eq!(scheduler.len(), 1);
    /// ```
    pub fn on_complete<F>(&mut self, id: BlockId, on_complete: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let record = self
            .registry
            .get_mut(id)
            .ok_or(AnimationError::BlockNotFound)?;
        record.set_completion(Box::new(on_complete));
        Ok(())
    }

    /// Stop a block where it is. Its completion callback does not fire.
    pub fn cancel(&mut self, id: BlockId) -> Result<()> {
        self.registry
            .remove(id)
            .ok_or(AnimationError::BlockNotFound)?;
        tracing::debug!(?id, "Animation block cancelled");
        Ok(())
    }

    /// Freeze a block; ticks skip it until it is resumed
    pub fn pause(&mut self, id: BlockId) -> Result<()> {
        let now = self.clock.now_ms();
        let record = self
            .registry
            .get_mut(id)
            .ok_or(AnimationError::BlockNotFound)?;
        record.pause(now);
        Ok(())
    }

    /// Resume a paused block from the progress it had when paused
    pub fn resume(&mut self, id: BlockId) -> Result<()> {
        let now = self.clock.now_ms();
        let record = self
            .registry
            .get_mut(id)
            .ok_or(AnimationError::BlockNotFound)?;
        record.resume(now);
        Ok(())
    }

    /// Playback state of a live block, `None` once it has finished
    pub fn state(&self, id: BlockId) -> Option<PlaybackState> {
        self.registry.get(id).map(AnimationRecord::state)
    }

    pub fn is_live(&self, id: BlockId) -> bool {
        self.registry.contains(id)
    }

    /// Changes the block's current leg is playing
    pub fn changes(&self, id: BlockId) -> Option<&[PropertyChange]> {
        self.registry.get(id).map(AnimationRecord::changes)
    }

    pub fn record(&self, id: BlockId) -> Option<&AnimationRecord> {
        self.registry.get(id)
    }

    /// Number of live blocks
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Check if any block still needs ticks
    pub fn has_active_animations(&self) -> bool {
        self.registry.iter().any(|(_, record)| !record.is_paused())
    }

    /// Drop every live block without completing it
    pub fn clear(&mut self) -> usize {
        let cleared = self.registry.clear();
        if cleared > 0 {
            tracing::debug!(cleared, "Animation blocks cleared");
        }
        cleared
    }

    /// Advance every live block to the current clock time.
    ///
    /// Each running record writes its interpolated values to the real targets.
    /// A record whose leg has ended lands every property on its target value,
    /// then either starts its next leg or leaves the registry and fires its
    /// completion callback. Records sharing a target property overwrite each
    /// other in iteration order.
    pub fn tick(&mut self) -> TickSummary {
        let now = self.clock.now_ms();
        let mut summary = TickSummary::default();
        let mut finished: SmallVec<[(BlockId, Option<AnimationError>); 4]> = SmallVec::new();

        for (id, record) in self.registry.iter_mut() {
            if record.is_paused() {
                continue;
            }
            summary.advanced += 1;

            if !record.advance(now) {
                continue;
            }

            match record.take_continuation() {
                Some(next) => match record.begin_leg(now, next, &self.config) {
                    Ok(()) => summary.chained.push(id),
                    Err(error) => {
                        tracing::warn!(?id, "Animation chain aborted: {}", error);
                        finished.push((id, Some(error)));
                    }
                },
                None => finished.push((id, None)),
            }
        }

        for (id, error) in finished {
            let Some(record) = self.registry.remove(id) else {
                continue;
            };
            match error {
                Some(error) => summary.failed.push((id, error)),
                None => {
                    tracing::debug!(?id, legs = record.legs(), "Animation block completed");
                    record.complete();
                    summary.completed.push(id);
                }
            }
        }

        tracing::trace!(
            now,
            advanced = summary.advanced,
            live = self.registry.len(),
            "Animation tick"
        );
        summary
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::easing::Easing;
    use crate::target::{shared, Animatable, PropertyBag};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn setup() -> (AnimationScheduler, ManualClock, Arc<Mutex<PropertyBag>>) {
        let clock = ManualClock::new();
        let scheduler = AnimationScheduler::with_clock(clock.clone());
        let bag = shared(PropertyBag::new().with("x", 0.0).with("y", 0.0));
        (scheduler, clock, bag)
    }

    fn targets(bag: &Arc<Mutex<PropertyBag>>) -> Vec<SharedTarget> {
        let target: SharedTarget = bag.clone();
        vec![target]
    }

    #[test]
    fn test_linear_block_end_to_end() {
        let (mut scheduler, clock, bag) = setup();

        let id = scheduler
            .create_block(1000, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 10.0);
            })
            .unwrap();

        scheduler.tick();
        assert_eq!(bag.lock().get("x"), Some(0.0));

        clock.advance(500.0);
        scheduler.tick();
        assert_eq!(bag.lock().get("x"), Some(5.0));

        clock.advance(501.0);
        let summary = scheduler.tick();
        assert_eq!(bag.lock().get("x"), Some(10.0));
        assert_eq!(summary.completed.as_slice(), &[id]);
        assert!(!scheduler.is_live(id));
    }

    #[test]
    fn test_rejects_zero_duration_and_empty_targets() {
        let (mut scheduler, _, bag) = setup();

        let err = scheduler
            .create_block(0, Easing::Linear, targets(&bag), |_| {})
            .unwrap_err();
        assert_eq!(err, AnimationError::ZeroDuration);

        let err = scheduler
            .create_block(100, Easing::Linear, Vec::new(), |_| {})
            .unwrap_err();
        assert_eq!(err, AnimationError::NoTargets);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_rejected_first_leg_registers_nothing() {
        let (scheduler, _, bag) = setup();
        let mut scheduler = scheduler.with_config(SchedulerConfig::strict());

        let err = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("typo", 1.0);
            })
            .unwrap_err();

        assert!(matches!(err, AnimationError::UnknownProperty { .. }));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_completion_fires_once_last_attached() {
        let (mut scheduler, clock, bag) = setup();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 1.0);
            })
            .unwrap();

        let f = first.clone();
        scheduler
            .on_complete(id, move || {
                f.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let s = second.clone();
        scheduler
            .on_complete(id, move || {
                s.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        clock.advance(100.0);
        scheduler.tick();
        clock.advance(100.0);
        scheduler.tick();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_completion_attached_too_late_is_an_error() {
        let (mut scheduler, clock, bag) = setup();

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |_| {})
            .unwrap();
        clock.advance(100.0);
        scheduler.tick();

        assert_eq!(
            scheduler.on_complete(id, || {}),
            Err(AnimationError::BlockNotFound)
        );
    }

    #[test]
    fn test_block_without_changes_still_times_out() {
        let (mut scheduler, clock, bag) = setup();

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |_| {})
            .unwrap();

        clock.advance(99.0);
        assert!(scheduler.tick().completed.is_empty());
        clock.advance(1.0);
        assert_eq!(scheduler.tick().completed.as_slice(), &[id]);
    }

    #[test]
    fn test_chain_runs_legs_in_sequence() {
        let (mut scheduler, clock, bag) = setup();

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 10.0);
                LegResult::next(|r: &Recorder<'_>| {
                    r.target(0).set("y", 20.0);
                })
            })
            .unwrap();

        clock.advance(100.0);
        let summary = scheduler.tick();
        assert_eq!(summary.chained.as_slice(), &[id]);
        assert_eq!(bag.lock().get("x"), Some(10.0));
        assert_eq!(bag.lock().get("y"), Some(0.0));
        assert_eq!(scheduler.changes(id).unwrap().len(), 1);

        clock.advance(50.0);
        scheduler.tick();
        assert_eq!(bag.lock().get("y"), Some(10.0));
        assert_eq!(bag.lock().get("x"), Some(10.0));

        clock.advance(50.0);
        let summary = scheduler.tick();
        assert_eq!(summary.completed.as_slice(), &[id]);
        assert_eq!(bag.lock().get("y"), Some(20.0));
    }

    #[test]
    fn test_failed_continuation_aborts_chain() {
        let (scheduler, clock, bag) = setup();
        let mut scheduler = scheduler.with_config(SchedulerConfig::strict());
        let completed = Arc::new(AtomicUsize::new(0));

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 1.0);
                LegResult::next(|r: &Recorder<'_>| {
                    r.target(0).set("nope", 1.0);
                })
            })
            .unwrap();
        let c = completed.clone();
        scheduler
            .on_complete(id, move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        clock.advance(100.0);
        let summary = scheduler.tick();

        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].0, id);
        assert!(!scheduler.is_live(id));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(bag.lock().get("x"), Some(1.0));
    }

    #[test]
    fn test_cancel_skips_completion() {
        let (mut scheduler, clock, bag) = setup();
        let completed = Arc::new(AtomicUsize::new(0));

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 10.0);
            })
            .unwrap();
        let c = completed.clone();
        scheduler
            .on_complete(id, move || {
                c.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        clock.advance(50.0);
        scheduler.tick();
        scheduler.cancel(id).unwrap();
        clock.advance(100.0);
        scheduler.tick();

        assert_eq!(bag.lock().get("x"), Some(5.0));
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.cancel(id), Err(AnimationError::BlockNotFound));
    }

    #[test]
    fn test_pause_and_resume() {
        let (mut scheduler, clock, bag) = setup();

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 100.0);
            })
            .unwrap();

        clock.advance(25.0);
        scheduler.tick();
        scheduler.pause(id).unwrap();
        assert_eq!(scheduler.state(id), Some(PlaybackState::Paused));
        assert!(!scheduler.has_active_animations());

        clock.advance(1000.0);
        assert_eq!(scheduler.tick().advanced, 0);
        assert_eq!(bag.lock().get("x"), Some(25.0));

        scheduler.resume(id).unwrap();
        clock.advance(25.0);
        scheduler.tick();
        assert_eq!(bag.lock().get("x"), Some(50.0));
        assert_eq!(scheduler.state(id), Some(PlaybackState::Running));
    }

    #[test]
    fn test_later_record_wins_shared_property() {
        let (mut scheduler, clock, bag) = setup();

        let first = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 10.0);
            })
            .unwrap();
        let second = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 20.0);
            })
            .unwrap();

        clock.advance(100.0);
        let summary = scheduler.tick();
        assert_eq!(summary.completed.len(), 2);

        let last = summary.completed[1];
        assert!(last == first || last == second);
        let expected = if last == first { 10.0 } else { 20.0 };
        assert_eq!(bag.lock().get("x"), Some(expected));
    }

    #[test]
    fn test_clear_drops_everything() {
        let (mut scheduler, _, bag) = setup();
        scheduler
            .create_block(100, Easing::Linear, targets(&bag), |_| {})
            .unwrap();
        scheduler
            .create_block(100, Easing::Linear, targets(&bag), |_| {})
            .unwrap();

        assert_eq!(scheduler.clear(), 2);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_late_tick_never_eases_past_one() {
        let (mut scheduler, clock, bag) = setup();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let ease = move |t: f32| {
            log.lock().push(t);
            t
        };

        scheduler
            .create_block(100, ease, targets(&bag), |r| {
                r.target(0).set("x", 10.0);
                LegResult::next(|r: &Recorder<'_>| {
                    r.target(0).set("y", 10.0);
                })
            })
            .unwrap();

        let mut xs = Vec::new();
        for step in [0.0, 30.0, 30.0, 440.0] {
            clock.advance(step);
            scheduler.tick();
            xs.push(bag.lock().get("x").unwrap());
        }
        // Second leg started at 500
        clock.advance(50.0);
        scheduler.tick();

        let seen = seen.lock().clone();
        assert_eq!(seen.len(), 4);
        assert!(seen.iter().all(|t| (0.0..1.0).contains(t)));
        assert!((seen[1] - 0.3).abs() < 1e-6);
        assert!((seen[2] - 0.6).abs() < 1e-6);
        assert!((seen[3] - 0.5).abs() < 1e-6);
        assert_eq!(xs[3], 10.0);
        assert!((bag.lock().get("y").unwrap() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_follow_up_block_started_after_tick() {
        let (mut scheduler, clock, bag) = setup();
        let (done_tx, done_rx) = std::sync::mpsc::channel();

        let id = scheduler
            .create_block(100, Easing::Linear, targets(&bag), |r| {
                r.target(0).set("x", 10.0);
            })
            .unwrap();
        scheduler
            .on_complete(id, move || done_tx.send(id).unwrap())
            .unwrap();

        clock.advance(100.0);
        scheduler.tick();

        let finished: Vec<BlockId> = done_rx.try_iter().collect();
        assert_eq!(finished, vec![id]);
        for _ in finished {
            scheduler
                .create_block(100, Easing::Linear, targets(&bag), |r| {
                    r.target(0).set("x", 0.0);
                })
                .unwrap();
        }

        clock.advance(50.0);
        scheduler.tick();
        assert_eq!(bag.lock().get("x"), Some(5.0));
    }

    #[test]
    fn test_scheduler_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AnimationScheduler>();
    }
}
