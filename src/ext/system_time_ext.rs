use std::time::{SystemTime, UNIX_EPOCH};

pub trait SystemTimeExt {
    /// Milliseconds since the Unix epoch, negative before it.
    fn to_millis(&self) -> i64;
}

impl SystemTimeExt for SystemTime {
    fn to_millis(&self) -> i64 {
        match self.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            Err(error) => i64::try_from(error.duration().as_millis())
                .map(|millis| -millis)
                .unwrap_or(i64::MIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn epoch_is_zero() {
        assert_eq!(UNIX_EPOCH.to_millis(), 0);
    }

    #[test]
    fn millis_are_counted_from_epoch() {
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        assert_eq!(time.to_millis(), 1_700_000_000_123);
    }

    #[test]
    fn times_before_epoch_are_negative() {
        let time = UNIX_EPOCH - Duration::from_millis(1500);
        assert_eq!(time.to_millis(), -1500);
    }
}
