use serde_with::DeserializeFromStr;
use std::f64::consts::PI;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString};

pub const DEFAULT_DURATION: Duration = Duration::from_millis(500);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, DeserializeFromStr, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Easing {
    #[strum(to_string = "linear")]
    Linear,
    /// Slow start, slow finish (half a cosine period).
    #[default]
    #[strum(
        to_string = "ease-in-out",
        serialize = "easeinout",
        serialize = "accelerate-decelerate"
    )]
    EaseInOut,
}

impl Easing {
    /// Maps a linear time fraction in `[0, 1]` onto the curve.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    Between(f64),
    Finished(f64),
}

impl Progress {
    pub fn value(&self) -> f64 {
        match self {
            Self::Between(v) | Self::Finished(v) => *v,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Finished(_))
    }
}

/// A timed transition from one value to another.
///
/// The host drives it by reporting the time that passed since the previous
/// frame; the run finishes on the frame that reaches `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolation {
    from: f64,
    to: f64,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Interpolation {
    pub fn new(from: f64, to: f64, duration: Duration, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        }
    }

    pub fn advance(&mut self, dt: Duration) -> Progress {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);

        if self.is_finished() {
            Progress::Finished(self.to)
        } else {
            Progress::Between(self.value())
        }
    }

    pub fn value(&self) -> f64 {
        self.from + (self.to - self.from) * self.easing.apply(self.fraction())
    }

    pub fn fraction(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn start(&self) -> f64 {
        self.from
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::EaseInOut] {
            assert!(easing.apply(0.0).abs() < 1e-12);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-12);
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-12);
        }
        assert!(Easing::EaseInOut.apply(0.25) < Easing::Linear.apply(0.25));
        assert!(Easing::EaseInOut.apply(0.75) > Easing::Linear.apply(0.75));
    }

    #[test]
    fn test_linear_run() {
        let mut run = Interpolation::new(0.2, 0.6, DEFAULT_DURATION, Easing::Linear);

        let step = run.advance(Duration::from_millis(250));
        assert!(!step.is_finished());
        assert!((step.value() - 0.4).abs() < 1e-9);

        let step = run.advance(Duration::from_millis(300));
        assert_eq!(step, Progress::Finished(0.6));
        assert!(run.is_finished());
        assert_eq!(run.fraction(), 1.0);
    }

    #[test]
    fn test_run_can_go_down() {
        let mut run = Interpolation::new(0.8, 0.0, Duration::from_millis(100), Easing::EaseInOut);
        let mut last = run.start();
        loop {
            let step = run.advance(Duration::from_millis(10));
            assert!(step.value() <= last);
            last = step.value();
            if step.is_finished() {
                break;
            }
        }
        assert_eq!(last, 0.0);
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut run = Interpolation::new(0.0, 1.0, Duration::ZERO, Easing::Linear);
        assert_eq!(run.advance(Duration::ZERO), Progress::Finished(1.0));
    }

    #[test]
    fn test_easing_deserialization() {
        let cases = vec![
            ("\"linear\"", Easing::Linear),
            ("\"Linear\"", Easing::Linear),
            ("\"ease-in-out\"", Easing::EaseInOut),
            ("\"EaseInOut\"", Easing::EaseInOut),
            ("\"accelerate-decelerate\"", Easing::EaseInOut),
        ];

        for (json, expected) in cases {
            let deserialized: Easing = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        assert!(serde_json::from_str::<Easing>("\"bounce\"").is_err());
        assert_eq!(Easing::EaseInOut.to_string(), "ease-in-out");
    }
}
