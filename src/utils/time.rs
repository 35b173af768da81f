use std::fmt::Debug;
use tokio::time::Instant;

/// Source of monotonic time for the rate gate.
///
/// Production code uses [`SystemClock`], which reads the tokio clock so that
/// paused-time tests drive the gate deterministically.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub fn now_instant() -> Instant {
    Instant::now()
}

pub fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::mocks::MockClock;
    use std::time::Duration;

    #[test]
    fn test_mock_clock_advance_and_rewind() {
        let start = Instant::now() + Duration::from_secs(60);
        let clock = MockClock::new(start);
        let shared = clock.clone();

        shared.advance(Duration::from_secs(10));
        assert_eq!(clock.now(), start + Duration::from_secs(10));

        clock.rewind(Duration::from_secs(15));
        assert_eq!(shared.now(), start - Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_clock_follows_tokio_time() {
        let clock = SystemClock;
        let t1 = clock.now();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(clock.now() - t1, Duration::from_millis(250));
        assert_eq!(elapsed_ms(t1), 250);
    }
}
