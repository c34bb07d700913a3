use anyhow::Result;
use thiserror::Error;
use tokio::time::{Duration, timeout};

use crate::measurement::{MeasurementState, RoomReading};
use crate::report::{RawReport, decode_report};

/// Something that yields raw 8-byte reports, one per call.
///
/// A successful call must deliver a full report; implementations treat a
/// short read as a transport fault, not a partial result.
#[allow(async_fn_in_trait)]
pub trait ReportSource {
    async fn read_report(&mut self) -> Result<RawReport>;
}

#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("device read failed")]
    Device(#[source] anyhow::Error),
    #[error("timed out waiting for a complete reading")]
    TimedOut,
}

/// Reads reports from `source` until both temperature and CO2 are known,
/// or until `overall_timeout` elapses.
///
/// Reports that fail the checksum or carry an unknown tag are discarded and
/// the loop keeps going. A failed read ends the run immediately; a stalled
/// device cannot be trusted to recover, so there are no retries.
pub async fn run<S: ReportSource>(
    source: &mut S,
    overall_timeout: Duration,
) -> Result<RoomReading, AcquisitionError> {
    match timeout(overall_timeout, collect(source)).await {
        Ok(Ok(reading)) => Ok(reading),
        Ok(Err(e)) => Err(AcquisitionError::Device(e)),
        Err(_) => Err(AcquisitionError::TimedOut),
    }
}

async fn collect<S: ReportSource>(source: &mut S) -> Result<RoomReading> {
    let mut state = MeasurementState::default();

    loop {
        let report = source.read_report().await?;

        if let Some(reading) = decode_report(&report) {
            state.merge(reading);
        }

        if let Some(reading) = state.complete() {
            return Ok(reading);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use anyhow::bail;

    use super::*;

    /// Yields the scripted reports in order, then errors if read again.
    struct ScriptedSource {
        reports: VecDeque<RawReport>,
    }

    impl ScriptedSource {
        fn new(reports: impl IntoIterator<Item = RawReport>) -> Self {
            Self {
                reports: reports.into_iter().collect(),
            }
        }
    }

    impl ReportSource for ScriptedSource {
        async fn read_report(&mut self) -> Result<RawReport> {
            match self.reports.pop_front() {
                Some(report) => Ok(report),
                None => bail!("read past end of script"),
            }
        }
    }

    struct FailingSource {
        calls: usize,
    }

    impl ReportSource for FailingSource {
        async fn read_report(&mut self) -> Result<RawReport> {
            self.calls += 1;
            bail!("transport fault")
        }
    }

    struct StalledSource;

    impl ReportSource for StalledSource {
        async fn read_report(&mut self) -> Result<RawReport> {
            std::future::pending().await
        }
    }

    const TEMPERATURE_REPORT: RawReport = [0x42, 0x11, 0x70, 0xC3, 0, 0, 0, 0];
    const CO2_REPORT: RawReport = [0x50, 0x01, 0x90, 0xE1, 0, 0, 0, 0];
    const CORRUPTED_REPORT: RawReport = [0x50, 0x01, 0x90, 0x00, 0, 0, 0, 0];
    const UNKNOWN_TAG_REPORT: RawReport = [0x41, 0x01, 0x02, 0x44, 0, 0, 0, 0];

    #[tokio::test]
    async fn completes_after_one_reading_of_each_kind() {
        let mut source = ScriptedSource::new([
            CORRUPTED_REPORT,
            TEMPERATURE_REPORT,
            UNKNOWN_TAG_REPORT,
            TEMPERATURE_REPORT,
            CO2_REPORT,
        ]);

        let reading = run(&mut source, Duration::from_secs(60)).await.unwrap();

        assert!((reading.temperature_celsius - 5.85).abs() < 1e-3);
        assert_eq!(reading.co2_ppm, 400);
        // The loop must stop on the report that completed the state, not
        // after it; a further read would hit the end of the script.
        assert!(source.reports.is_empty());
    }

    #[tokio::test]
    async fn co2_alone_does_not_complete() {
        let mut source = ScriptedSource::new([CO2_REPORT]);

        let err = run(&mut source, Duration::from_secs(60)).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::Device(_)));
    }

    #[tokio::test]
    async fn corrupted_reports_leave_state_untouched() {
        let mut state = MeasurementState::default();
        if let Some(reading) = decode_report(&CORRUPTED_REPORT) {
            state.merge(reading);
        }
        assert_eq!(state, MeasurementState::default());
    }

    #[tokio::test]
    async fn device_failure_is_fatal_on_first_read() {
        let mut source = FailingSource { calls: 0 };

        let err = run(&mut source, Duration::from_secs(60)).await.unwrap_err();

        assert!(matches!(err, AcquisitionError::Device(_)));
        assert_eq!(source.calls, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_device_times_out() {
        let mut source = StalledSource;

        let err = run(&mut source, Duration::from_secs(60)).await.unwrap_err();
        assert!(matches!(err, AcquisitionError::TimedOut));
    }

    #[tokio::test(start_paused = true)]
    async fn completes_before_the_deadline_fires() {
        let mut source = ScriptedSource::new([TEMPERATURE_REPORT, CO2_REPORT]);

        let reading = run(&mut source, Duration::from_secs(60)).await.unwrap();
        assert_eq!(reading.co2_ppm, 400);
    }
}
