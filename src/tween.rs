//! Eased property tweens.
//!
//! A tween interpolates one or more numeric properties of a stage element
//! from their current values to target values over a duration. Starting a
//! tween on a property that is already animating takes the property over:
//! the older tween stops touching it, so the newest request always wins.
//!
//! ```ignore
//! let mut tweens = TweenScheduler::new();
//! tweens.to(
//!     &stage,
//!     item,
//!     &[(Property::Scale, 1.08), (Property::TranslateY, -10.0)],
//!     0.5,
//!     Ease::ElasticOut { amplitude: 1.0, period: 0.7 },
//!     None,
//! );
//!
//! // Once per frame:
//! for cue in tweens.advance(dt, &mut stage) {
//!     // react to finished tweens
//! }
//! ```

use std::f32::consts::TAU;

use crate::stage::ElementId;

/// Animatable numeric properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Opacity,
    Scale,
    /// Vertical offset in pixels.
    TranslateY,
    ShadowOffsetY,
    ShadowBlur,
    ShadowAlpha,
}

/// Something whose element properties can be read and written by tweens.
pub trait Animatable {
    fn property(&self, target: ElementId, property: Property) -> f32;
    fn set_property(&mut self, target: ElementId, property: Property, value: f32);
}

/// Easing curves. Every curve maps 0 to 0 and 1 to 1 exactly.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Ease {
    Linear,
    /// Quadratic ease-out.
    #[default]
    Power1Out,
    /// Cubic ease-out.
    Power2Out,
    /// Decaying oscillation that overshoots the target before settling.
    ElasticOut { amplitude: f32, period: f32 },
}

impl Ease {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        if t == 0.0 || t == 1.0 {
            return t;
        }
        match *self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t).powi(2),
            Ease::Power2Out => 1.0 - (1.0 - t).powi(3),
            Ease::ElasticOut { amplitude, period } => {
                let a = amplitude.max(1.0);
                let period = if period > 0.0 { period } else { 0.3 };
                let phase = period / TAU * (1.0 / a).asin();
                a * 2f32.powf(-10.0 * t) * ((t - phase) * TAU / period).sin() + 1.0
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Track {
    property: Property,
    from: f32,
    to: f32,
}

#[derive(Debug, Clone)]
struct Tween<C> {
    target: ElementId,
    tracks: Vec<Track>,
    duration: f32,
    elapsed: f32,
    ease: Ease,
    cue: Option<C>,
}

impl<C> Tween<C> {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }
}

/// Runs tweens and reports the completion cues of the ones that finish.
///
/// `C` is the cue type handed back from [`advance`](Self::advance) when a
/// tween completes.
#[derive(Debug, Clone)]
pub struct TweenScheduler<C> {
    active: Vec<Tween<C>>,
}

impl<C> TweenScheduler<C> {
    pub fn new() -> Self {
        Self { active: Vec::new() }
    }

    /// Animate `target`'s properties to `values` over `duration` seconds.
    ///
    /// Start values are read from `doc` now. Any older tween animating one
    /// of these properties on the same target loses it; an older tween left
    /// with nothing to animate is dropped and its cue never fires.
    pub fn to<D: Animatable + ?Sized>(
        &mut self,
        doc: &D,
        target: ElementId,
        values: &[(Property, f32)],
        duration: f32,
        ease: Ease,
        cue: Option<C>,
    ) {
        for tween in self.active.iter_mut().filter(|t| t.target == target) {
            tween
                .tracks
                .retain(|track| !values.iter().any(|(p, _)| *p == track.property));
        }
        self.active.retain(|t| !t.tracks.is_empty());

        let tracks = values
            .iter()
            .map(|&(property, to)| Track {
                property,
                from: doc.property(target, property),
                to,
            })
            .collect();

        self.active.push(Tween {
            target,
            tracks,
            duration,
            elapsed: 0.0,
            ease,
            cue,
        });
    }

    /// Advance every tween by `dt` seconds and write the new values.
    ///
    /// Returns the cues of tweens that completed during this step, in start
    /// order.
    pub fn advance<D: Animatable + ?Sized>(&mut self, dt: f32, doc: &mut D) -> Vec<C> {
        let mut finished = Vec::new();

        for tween in &mut self.active {
            tween.elapsed += dt.max(0.0);
            let eased = tween.ease.apply(tween.progress());
            for track in &tween.tracks {
                let value = if eased == 1.0 {
                    track.to
                } else {
                    track.from + (track.to - track.from) * eased
                };
                doc.set_property(tween.target, track.property, value);
            }
        }

        let mut i = 0;
        while i < self.active.len() {
            if self.active[i].progress() >= 1.0 {
                let tween = self.active.remove(i);
                finished.extend(tween.cue);
            } else {
                i += 1;
            }
        }

        finished
    }

    /// Whether any tween is animating `target`.
    pub fn is_animating(&self, target: ElementId) -> bool {
        self.active.iter().any(|t| t.target == target)
    }

    /// Drop every tween on `target` without completing it.
    pub fn kill(&mut self, target: ElementId) {
        self.active.retain(|t| t.target != target);
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl<C> Default for TweenScheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct Props(HashMap<(ElementId, Property), f32>);

    impl Animatable for Props {
        fn property(&self, target: ElementId, property: Property) -> f32 {
            self.0.get(&(target, property)).copied().unwrap_or(0.0)
        }

        fn set_property(&mut self, target: ElementId, property: Property, value: f32) {
            self.0.insert((target, property), value);
        }
    }

    const A: ElementId = ElementId(0);
    const B: ElementId = ElementId(1);
    const ELASTIC: Ease = Ease::ElasticOut {
        amplitude: 1.0,
        period: 0.7,
    };

    #[test]
    fn test_ease_endpoints() {
        for ease in [Ease::Linear, Ease::Power1Out, Ease::Power2Out, ELASTIC] {
            assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
            assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
        }
    }

    #[test]
    fn test_elastic_starts_continuous() {
        assert!(ELASTIC.apply(1e-4).abs() < 0.01);
    }

    #[test]
    fn test_elastic_overshoots() {
        let peak = (1..100)
            .map(|i| ELASTIC.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0, "peak was {peak}");
    }

    #[test]
    fn test_power_eases_are_monotonic() {
        for ease in [Ease::Power1Out, Ease::Power2Out] {
            let mut last = 0.0;
            for i in 1..=100 {
                let v = ease.apply(i as f32 / 100.0);
                assert!(v >= last);
                last = v;
            }
        }
        // Cubic is ahead of quadratic early on.
        assert!(Ease::Power2Out.apply(0.2) > Ease::Power1Out.apply(0.2));
    }

    #[test]
    fn test_tween_reaches_target_and_fires_cue() {
        let mut props = Props::default();
        let mut tweens = TweenScheduler::new();
        tweens.to(&props, A, &[(Property::Opacity, 1.0)], 2.0, Ease::Linear, Some("done"));

        assert!(tweens.advance(1.0, &mut props).is_empty());
        assert!((props.property(A, Property::Opacity) - 0.5).abs() < 1e-6);

        assert_eq!(tweens.advance(1.0, &mut props), vec!["done"]);
        assert_eq!(props.property(A, Property::Opacity), 1.0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn test_zero_duration_applies_immediately() {
        let mut props = Props::default();
        let mut tweens = TweenScheduler::new();
        tweens.to(&props, A, &[(Property::Scale, 2.0)], 0.0, Ease::Linear, Some(1));
        assert_eq!(tweens.advance(0.0, &mut props), vec![1]);
        assert_eq!(props.property(A, Property::Scale), 2.0);
    }

    #[test]
    fn test_overwrite_takes_property() {
        let mut props = Props::default();
        props.set_property(A, Property::Scale, 1.0);
        let mut tweens = TweenScheduler::new();

        tweens.to(&props, A, &[(Property::Scale, 1.08)], 0.5, ELASTIC, Some("enter"));
        tweens.advance(0.1, &mut props);
        tweens.to(&props, A, &[(Property::Scale, 1.0)], 0.5, Ease::Power2Out, Some("leave"));

        let mut cues = Vec::new();
        for _ in 0..60 {
            cues.extend(tweens.advance(1.0 / 60.0, &mut props));
        }

        assert_eq!(props.property(A, Property::Scale), 1.0);
        assert_eq!(cues, vec!["leave"]);
    }

    #[test]
    fn test_partial_overwrite_keeps_other_tracks() {
        let mut props = Props::default();
        let mut tweens: TweenScheduler<()> = TweenScheduler::new();

        tweens.to(
            &props,
            A,
            &[(Property::Scale, 2.0), (Property::Opacity, 1.0)],
            1.0,
            Ease::Linear,
            None,
        );
        tweens.to(&props, A, &[(Property::Scale, 0.5)], 1.0, Ease::Linear, None);
        assert_eq!(tweens.len(), 2);

        tweens.advance(1.0, &mut props);
        assert_eq!(props.property(A, Property::Scale), 0.5);
        assert_eq!(props.property(A, Property::Opacity), 1.0);
    }

    #[test]
    fn test_targets_are_independent() {
        let mut props = Props::default();
        let mut tweens: TweenScheduler<()> = TweenScheduler::new();
        tweens.to(&props, A, &[(Property::Scale, 2.0)], 1.0, Ease::Linear, None);
        tweens.to(&props, B, &[(Property::Scale, 3.0)], 1.0, Ease::Linear, None);

        tweens.advance(1.0, &mut props);
        assert_eq!(props.property(A, Property::Scale), 2.0);
        assert_eq!(props.property(B, Property::Scale), 3.0);
    }

    #[test]
    fn test_kill() {
        let mut props = Props::default();
        let mut tweens = TweenScheduler::new();
        tweens.to(&props, A, &[(Property::Opacity, 1.0)], 1.0, Ease::Linear, Some(()));
        assert!(tweens.is_animating(A));
        tweens.kill(A);
        assert!(!tweens.is_animating(A));
        assert!(tweens.advance(2.0, &mut props).is_empty());
        assert_eq!(props.property(A, Property::Opacity), 0.0);
    }
}
