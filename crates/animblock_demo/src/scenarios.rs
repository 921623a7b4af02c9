//! Demo scenarios
//!
//! Each scenario registers its blocks on the scheduler and returns the
//! targets it animates, labelled for printing.

use animblock::{
    shared, AnimationBlock, AnimationScheduler, Easing, LegResult, PropertyBag, Recorder,
};
use anyhow::Result;
use clap::ValueEnum;
use parking_lot::Mutex;
use rand::Rng;
use std::sync::Arc;

/// A target the runner prints every frame
pub struct Watched {
    pub label: String,
    pub target: Arc<Mutex<PropertyBag>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Two objects, bounce curve, one reading the other
    Bounce,
    /// A list of objects sent to random positions
    Scatter,
    /// Slide in, then fade, as one chained block
    Chain,
}

impl Scenario {
    pub fn setup(
        self,
        scheduler: &mut AnimationScheduler,
        duration_ms: u32,
        count: usize,
    ) -> Result<Vec<Watched>> {
        match self {
            Scenario::Bounce => bounce(scheduler, duration_ms),
            Scenario::Scatter => scatter(scheduler, duration_ms, count),
            Scenario::Chain => chain(scheduler, duration_ms),
        }
    }
}

fn element() -> PropertyBag {
    PropertyBag::new()
        .with("left", 0.0)
        .with("top", 0.0)
        .with("opacity", 1.0)
}

fn bounce(scheduler: &mut AnimationScheduler, duration_ms: u32) -> Result<Vec<Watched>> {
    let my_obj = shared(element());
    let my_obj2 = shared(element().with("left", 40.0));

    AnimationBlock::new(duration_ms)
        .ease(Easing::EaseOutBounce)
        .target(my_obj.clone())
        .target(my_obj2.clone())
        .on_complete(|| tracing::info!("Animation ended"))
        .start(scheduler, |r| {
            let (a, b) = (r.target(0), r.target(1));
            a.set("left", 200.0).set("top", 50.0);
            b.set("opacity", 0.2);
            b.set("left", a.get("left").unwrap_or_default());
        })?;

    Ok(vec![
        Watched {
            label: "my_obj".to_string(),
            target: my_obj,
        },
        Watched {
            label: "my_obj2".to_string(),
            target: my_obj2,
        },
    ])
}

fn scatter(
    scheduler: &mut AnimationScheduler,
    duration_ms: u32,
    count: usize,
) -> Result<Vec<Watched>> {
    let list: Vec<_> = (0..count).map(|_| shared(element())).collect();
    let mut rng = rand::thread_rng();
    let positions: Vec<(f32, f32)> = (0..count)
        .map(|_| (rng.gen_range(0.0..600.0), rng.gen_range(0.0..500.0)))
        .collect();

    AnimationBlock::new(duration_ms)
        .ease(Easing::EaseInOutCubic)
        .targets(list.iter().cloned())
        .on_complete(move || tracing::info!(count, "Scatter ended"))
        .start(scheduler, move |r| {
            for (o, (left, top)) in r.stand_ins().zip(positions) {
                o.set("left", left).set("top", top);
            }
        })?;

    Ok(list
        .into_iter()
        .enumerate()
        .map(|(i, target)| Watched {
            label: format!("lst[{i}]"),
            target,
        })
        .collect())
}

fn chain(scheduler: &mut AnimationScheduler, duration_ms: u32) -> Result<Vec<Watched>> {
    let card = shared(element().with("left", -100.0).with("opacity", 0.0));

    AnimationBlock::new(duration_ms)
        .ease(Easing::EaseOutCubic)
        .target(card.clone())
        .on_complete(|| tracing::info!("Chain ended"))
        .start(scheduler, |r| {
            r.target(0).set("left", 0.0).set("opacity", 1.0);
            LegResult::next(|r: &Recorder<'_>| {
                r.target(0).set("top", 80.0);
                LegResult::next(|r: &Recorder<'_>| {
                    r.target(0).set("opacity", 0.0);
                })
            })
        })?;

    Ok(vec![Watched {
        label: "card".to_string(),
        target: card,
    }])
}
