//! Telemetry statistics over a time-ordered sample slice.

use chrono::{DateTime, Duration, Utc};
use statrs::statistics::Statistics;

use crate::error::{AnalyticsError, Result};
use drone_domain::{TelemetrySample, TelemetryStats};

/// Window used when the caller does not specify one.
pub const DEFAULT_WINDOW_HOURS: u32 = 24;

/// Pure statistics over telemetry samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryAggregator;

impl TelemetryAggregator {
    /// Inclusive lower bound of a window of `hours` ending at `now`.
    pub fn window_start(now: DateTime<Utc>, hours: u32) -> Result<DateTime<Utc>> {
        if hours == 0 {
            return Err(AnalyticsError::InvalidWindow { hours });
        }
        now.checked_sub_signed(Duration::hours(i64::from(hours)))
            .ok_or(AnalyticsError::WindowOutOfRange { hours })
    }

    /// Summarize `samples`, which must be in ascending timestamp order.
    ///
    /// An empty slice yields all zeros. Averages and distance are rounded to
    /// two decimals.
    #[must_use]
    pub fn summarize(samples: &[TelemetrySample]) -> TelemetryStats {
        if samples.is_empty() {
            return TelemetryStats::default();
        }

        TelemetryStats {
            avg_battery: round2(samples.iter().map(|s| s.battery).mean()),
            avg_speed: round2(samples.iter().map(|s| s.speed).mean()),
            avg_altitude: round2(samples.iter().map(|s| s.altitude).mean()),
            total_distance: round2(Self::total_distance_km(samples)),
            data_points: samples.len(),
        }
    }

    /// Sum of haversine distances between consecutive samples, in km.
    #[must_use]
    pub fn total_distance_km(samples: &[TelemetrySample]) -> f64 {
        samples
            .windows(2)
            .map(|pair| pair[0].position().distance_to_km(&pair[1].position()))
            .sum()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use drone_domain::NewTelemetry;
    use uuid::Uuid;

    fn sample(drone_id: Uuid, lat: f64, lon: f64, battery: f64, speed: f64, altitude: f64) -> TelemetrySample {
        let mut input = NewTelemetry::new(drone_id, lat, lon, battery);
        input.speed = Some(speed);
        input.altitude = Some(altitude);
        input.into_sample(Uuid::new_v4(), Utc::now())
    }

    #[test]
    fn test_empty_window_is_all_zero() {
        let stats = TelemetryAggregator::summarize(&[]);
        assert_eq!(stats, TelemetryStats::default());
        assert_eq!(stats.data_points, 0);
    }

    #[test]
    fn test_averages_are_rounded() {
        let drone = Uuid::new_v4();
        let samples = vec![
            sample(drone, 0.0, 0.0, 100.0, 10.0, 50.0),
            sample(drone, 0.0, 0.0, 90.0, 11.0, 50.0),
            sample(drone, 0.0, 0.0, 81.0, 12.0, 51.0),
        ];

        let stats = TelemetryAggregator::summarize(&samples);
        assert_eq!(stats.avg_battery, 90.33);
        assert_eq!(stats.avg_speed, 11.0);
        assert_eq!(stats.avg_altitude, 50.33);
        assert_eq!(stats.total_distance, 0.0);
        assert_eq!(stats.data_points, 3);
    }

    #[test]
    fn test_one_degree_latitude_distance() {
        let drone = Uuid::new_v4();
        let samples = vec![
            sample(drone, 0.0, 0.0, 90.0, 0.0, 0.0),
            sample(drone, 1.0, 0.0, 90.0, 0.0, 0.0),
        ];

        let stats = TelemetryAggregator::summarize(&samples);
        assert!((stats.total_distance - 111.19).abs() < 0.01);
    }

    #[test]
    fn test_distance_accumulates_over_legs() {
        let drone = Uuid::new_v4();
        let samples = vec![
            sample(drone, 0.0, 0.0, 90.0, 0.0, 0.0),
            sample(drone, 1.0, 0.0, 90.0, 0.0, 0.0),
            sample(drone, 0.0, 0.0, 90.0, 0.0, 0.0),
        ];

        let stats = TelemetryAggregator::summarize(&samples);
        assert!((stats.total_distance - 222.39).abs() < 0.01);
    }

    #[test]
    fn test_window_start() {
        let now = Utc::now();
        assert_eq!(
            TelemetryAggregator::window_start(now, DEFAULT_WINDOW_HOURS).unwrap(),
            now - Duration::hours(24)
        );
        assert_eq!(
            TelemetryAggregator::window_start(now, 0),
            Err(AnalyticsError::InvalidWindow { hours: 0 })
        );
        assert_eq!(
            TelemetryAggregator::window_start(now, u32::MAX),
            Err(AnalyticsError::WindowOutOfRange { hours: u32::MAX })
        );
    }
}
