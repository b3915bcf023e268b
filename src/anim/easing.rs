// ============================================================================
// EASING FUNCTIONS for job progress
// ============================================================================

/// Ease-in-out cubic: slow at start and end, fast in the middle
/// Used for sector dilation so the wedges neither jump nor snap
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Ease-out cubic: fast at start, decelerates at end
/// Good for "arriving" animations like panning to a tile
pub fn ease_out_cubic(t: f32) -> f32 {
    let x = 1.0 - t.clamp(0.0, 1.0);
    1.0 - x * x * x
}

/// Ease-out quadratic: fast at start, decelerates (gentler than cubic)
pub fn ease_out_quad(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}
