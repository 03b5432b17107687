use rand::Rng;

/// Generates a random, non-zero correlation id.
///
/// Ids only pair a request with its reply inside one synchronous exchange,
/// so collisions across exchanges do not matter. Zero is reserved for
/// notifications.
#[inline]
pub fn generate_request_id() -> u64 {
    rand::rng().random_range(1..=u64::MAX)
}
