use rand::{Rng, distributions::Alphanumeric};

/// Generates a random alphanumeric string of the specified length.
///
/// Uses the thread-local CSPRNG, so the output is suitable for session identifiers.
///
/// # Examples
///
/// ```ignore
/// let session_id = generate_random_string(64);
/// assert_eq!(session_id.len(), 64);
/// ```
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
