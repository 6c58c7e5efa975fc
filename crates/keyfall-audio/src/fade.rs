/// Linear fade from full level to silence over a fixed window.
///
/// The fade only tracks progress; the caller multiplies [`Fade::level`] by
/// its current base volume, so a volume change mid-fade carries on from the
/// new base.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    duration: f64,
    elapsed: f64,
}

impl Fade {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f64) {
        self.elapsed += dt.max(0.0);
    }

    /// Remaining level in `0.0..=1.0`.
    pub fn level(&self) -> f32 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        (1.0 - self.elapsed / self.duration).clamp(0.0, 1.0) as f32
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}
