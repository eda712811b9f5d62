/// Round to 2 decimal places, ties away from zero.
///
/// Operates on the binary value: `0.125` is exact and rounds to `0.13`, while
/// `1.005` is stored just below the tie and rounds to `1.0`. Never returns
/// `-0.0`; an empty `f64` sum starts from `-0.0` and would print as such.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}
