/// Get the current time in milliseconds since the UNIX epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_millis() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}

/// Get the current time in milliseconds (page clock on the web)
#[cfg(target_arch = "wasm32")]
pub fn current_time_millis() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now())
        .unwrap_or(0.0)
}

/// Get a timestamp in milliseconds since the UNIX epoch
pub fn timestamp_millis() -> u64 {
    current_time_millis() as u64
}

/// A timestamp strictly greater than `previous`, even if the clock has not moved
pub fn next_timestamp_after(previous: u64) -> u64 {
    timestamp_millis().max(previous.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_timestamp_is_strictly_increasing() {
        let far_future = timestamp_millis() + 1_000_000;
        assert_eq!(next_timestamp_after(far_future), far_future + 1);
        assert!(next_timestamp_after(0) >= 1);
    }
}
