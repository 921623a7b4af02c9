//! Animation blocks
//!
//! Declare a timed transition of numeric properties by writing the end state,
//! and let the scheduler play it back frame by frame.
//!
//! # Features
//!
//! - **Recorded writes**: a block's mutator assigns properties on stand-ins;
//!   the writes are recorded as from → to changes instead of being applied
//! - **Eased playback**: every tick interpolates each change through the
//!   block's easing function and writes the result to the real target
//! - **Chains**: a mutator may return the next leg, which plays once the
//!   current one lands
//! - **Control**: completion callbacks, cancel, pause and resume per block
//!
//! # Example
//!
//! ```rust
//! use animblock::{Animatable, AnimationScheduler, Easing, ManualClock, PropertyBag, SharedTarget, shared};
//!
//! let clock = ManualClock::new();
//! let mut scheduler = AnimationScheduler::with_clock(clock.clone());
//! let obj = shared(PropertyBag::new().with("x", 0.0));
//! let target: SharedTarget = obj.clone();
//!
//! let id = scheduler
//!     .create_block(1000, Easing::Linear, vec![target], |r| {
//!         r.target(0).set("x", 10.0);
//!     })
//!     .unwrap();
//! scheduler.on_complete(id, || println!("done")).unwrap();
//!
//! clock.advance(500.0);
//! scheduler.tick();
//! assert_eq!(obj.lock().get("x"), Some(5.0));
//!
//! clock.advance(500.0);
//! scheduler.tick();
//! assert_eq!(obj.lock().get("x"), Some(10.0));
//! assert!(!scheduler.is_live(id));
//! ```

pub mod block;
pub mod clock;
pub mod config;
pub mod easing;
pub mod error;
pub mod record;
pub mod recorder;
pub mod registry;
pub mod scheduler;
pub mod target;

pub use block::AnimationBlock;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{InvalidWritePolicy, SchedulerConfig};
pub use easing::{Ease, Easing, EasingFunction};
pub use error::{AnimationError, ConfigError, Result};
pub use record::{AnimationRecord, LegResult, PlaybackState, PropertyChange};
pub use recorder::{Recorder, StandIn};
pub use registry::BlockId;
pub use scheduler::{AnimationScheduler, TickSummary};
pub use target::{shared, Animatable, PropertyBag, SharedTarget};
