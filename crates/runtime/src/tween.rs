use foundation::time::Millis;

/// Cubic ease-in-out on `t` in `[0, 1]`.
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u * 0.5
    }
}

/// A scalar animation sampled on host animation frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub start: Millis,
    pub duration_ms: u64,
}

impl Tween {
    pub fn new(from: f64, to: f64, start: Millis, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            start,
            duration_ms,
        }
    }

    /// Eased value at `now`; exactly `to` once the duration has elapsed.
    pub fn sample(&self, now: Millis) -> f64 {
        if self.is_finished(now) {
            return self.to;
        }
        let t = now.since(self.start) as f64 / self.duration_ms as f64;
        self.from + (self.to - self.from) * ease_in_out_cubic(t)
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        self.duration_ms == 0 || now.since(self.start) >= self.duration_ms
    }
}
