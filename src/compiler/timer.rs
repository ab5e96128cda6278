//! Timer A configuration

use crate::error::{Error, Result};

/// Highest tick rate timer A can produce
pub const TMA_MAX_FREQ: f64 = 55560.0;
/// Lowest tick rate timer A can produce
pub const TMA_MIN_FREQ: f64 = 54.25;
/// Largest time base multiplier supported by the driver
pub const MAX_TIME_BASE: u32 = 255;
/// Largest timer A counter value (10 bits)
pub const TMA_MAX_COUNTER: u16 = 0x3FF;

/// Timer A counter and time base of a song
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub counter: u16,
    pub time_base: u8,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            counter: 0,
            time_base: 1,
        }
    }
}

/// Find the timer A setup for a tick frequency
///
/// Frequencies under `TMA_MIN_FREQ` are brought in range with the smallest
/// time base multiplier that works.
pub fn frequency_to_timer(hz: f64) -> Result<TimerConfig> {
    if !(hz <= TMA_MAX_FREQ) {
        return Err(Error::UnsupportedFrequency(hz));
    }

    let mut time_base = 1;
    let mut frequency = hz;

    if hz < TMA_MIN_FREQ {
        for i in 2..=MAX_TIME_BASE {
            let multiplied = hz * i as f64;
            if multiplied > TMA_MAX_FREQ {
                return Err(Error::UnsupportedFrequency(hz));
            } else if multiplied >= TMA_MIN_FREQ {
                time_base = i;
                frequency = multiplied;
                break;
            }
        }
        if frequency < TMA_MIN_FREQ {
            return Err(Error::UnsupportedFrequency(hz));
        }
    }

    Ok(TimerConfig {
        counter: timer_a_counter(frequency)?,
        time_base: time_base as u8,
    })
}

/// Compute the timer A counter for a tick frequency
pub fn timer_a_counter(hz: f64) -> Result<u16> {
    let counter = (1024.0 - (1.0 / hz / 72.0 * 4_000_000.0)).round();
    if !(0.0..=TMA_MAX_COUNTER as f64).contains(&counter) {
        return Err(Error::TimerOverflow(counter));
    }
    Ok(counter as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntsc_frequency() {
        let timer = frequency_to_timer(60.0).unwrap();
        assert_eq!(timer.time_base, 1);
        assert_eq!(timer.counter, 98); // 1024 - 925.93
    }

    #[test]
    fn test_range_limits() {
        assert_eq!(frequency_to_timer(TMA_MAX_FREQ).unwrap().counter, 1023);
        assert_eq!(frequency_to_timer(TMA_MIN_FREQ).unwrap().counter, 0);
        assert_eq!(frequency_to_timer(TMA_MIN_FREQ).unwrap().time_base, 1);
    }

    #[test]
    fn test_low_frequency_uses_time_base() {
        let timer = frequency_to_timer(30.0).unwrap();
        assert_eq!(timer.time_base, 2);
        assert_eq!(timer.counter, 98);

        let timer = frequency_to_timer((TMA_MIN_FREQ + 0.01) / MAX_TIME_BASE as f64).unwrap();
        assert_eq!(timer.time_base, 255);
    }

    #[test]
    fn test_unsupported_frequencies() {
        assert!(matches!(
            frequency_to_timer(TMA_MAX_FREQ + 1.0),
            Err(Error::UnsupportedFrequency(_))
        ));
        assert!(matches!(
            frequency_to_timer(0.1),
            Err(Error::UnsupportedFrequency(_))
        ));
        assert!(matches!(
            frequency_to_timer(0.0),
            Err(Error::UnsupportedFrequency(_))
        ));
        assert!(matches!(
            frequency_to_timer(f64::NAN),
            Err(Error::UnsupportedFrequency(_))
        ));
    }

    #[test]
    fn test_supported_range_is_representable() {
        let mut hz = TMA_MIN_FREQ;
        while hz <= TMA_MAX_FREQ {
            let timer = frequency_to_timer(hz).unwrap();
            assert!(timer.time_base >= 1);
            assert!(timer.counter <= TMA_MAX_COUNTER);
            hz *= 1.01;
        }
    }

    #[test]
    fn test_counter_overflow() {
        assert!(matches!(timer_a_counter(20.0), Err(Error::TimerOverflow(_))));
    }
}
