//! Interpolation and easing curves

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`, clamped to 0..1
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Quartic ease-in/ease-out over `t` in 0..1
pub fn ease_in_out_quart(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        8.0 * t * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u * u / 2.0
    }
}

/// Frame-rate independent smoothing factor for exponential damping
///
/// `lerp(current, target, damp_factor(rate, dt))` converges at the same speed
/// regardless of frame time: factor = 1 - e^(-rate * dt).
pub fn damp_factor(rate: f32, dt: f32) -> f32 {
    if rate <= 0.0 || dt <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt).exp()
}

/// Per-second rate equivalent to a fixed per-frame lerp factor at `fps`
///
/// A lerp factor of 0.1 applied every frame at 60 fps corresponds to a rate
/// of about 6.32 per second.
pub fn rate_from_frame_factor(factor: f32, fps: f32) -> f32 {
    let factor = factor.clamp(0.0, 0.999_999);
    -(1.0 - factor).ln() * fps
}
