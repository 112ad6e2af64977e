//! Custom assertion utilities for tests.

/// Assert that a result is Ok and return the inner value.
#[allow(dead_code)]
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>, context: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => panic!("{} failed: {:?}", context, e),
    }
}

/// Assert that an error message contains expected text (case-insensitive).
#[allow(dead_code)]
pub fn assert_error_contains<E: std::fmt::Display>(error: E, expected_text: &str, context: &str) {
    let error_str = error.to_string().to_lowercase();
    let expected_lower = expected_text.to_lowercase();

    assert!(
        error_str.contains(&expected_lower),
        "{}: error message should contain '{}', got: {}",
        context,
        expected_text,
        error
    );
}

/// Assert that `value` lies within `[min, max]`.
#[allow(dead_code)]
pub fn assert_in_range(value: usize, min: usize, max: usize, context: &str) {
    assert!(
        (min..=max).contains(&value),
        "{}: {} not in [{}, {}]",
        context,
        value,
        min,
        max
    );
}
