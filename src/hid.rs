use anyhow::{Context as _, Result, bail};
use hidapi::{HidApi, HidDevice};

use crate::acquisition::ReportSource;
use crate::report::{REPORT_LEN, RawReport};

pub const VENDOR_ID: u16 = 0x04d9;
pub const PRODUCT_ID: u16 = 0xa052;

/// Per-read slice in milliseconds. Reads block at most this long so that an
/// overall deadline wrapping the acquisition is observed promptly even when
/// the device stops producing reports.
const READ_SLICE_MS: i32 = 500;

pub struct Co2MiniDevice {
    device: HidDevice,
}

impl Co2MiniDevice {
    /// Opens the first matching sensor and arms it with the all-zero feature
    /// report that prompts it to start streaming. Without a successful arm
    /// no report will ever arrive, so a failed handshake is fatal.
    pub fn open() -> Result<Self> {
        let api = HidApi::new().context("failed to initialize HID backend")?;

        let device = api
            .open(VENDOR_ID, PRODUCT_ID)
            .with_context(|| format!("failed to open device {VENDOR_ID:04x}:{PRODUCT_ID:04x}"))?;

        device
            .send_feature_report(&[0u8; REPORT_LEN])
            .context("failed to arm device")?;

        Ok(Self { device })
    }
}

impl ReportSource for Co2MiniDevice {
    async fn read_report(&mut self) -> Result<RawReport> {
        loop {
            let mut buf = [0u8; REPORT_LEN];

            let n = tokio::task::block_in_place(|| {
                self.device.read_timeout(&mut buf, READ_SLICE_MS)
            })
            .context("failed to read report")?;

            match n {
                REPORT_LEN => return Ok(buf),
                // The slice elapsed without a report; yield so an outer
                // timeout gets a chance to fire, then keep waiting.
                0 => tokio::task::yield_now().await,
                n => bail!("short read: expected {REPORT_LEN} bytes, got {n}"),
            }
        }
    }
}
