pub const REPORT_LEN: usize = 8;

pub type RawReport = [u8; REPORT_LEN];

// Ref: https://hackaday.io/project/5301-reverse-engineering-a-low-cost-usb-co-monitor
const TAG_TEMPERATURE: u8 = 0x42;
const TAG_CO2: u8 = 0x50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    TemperatureCelsius(f32),
    Co2Ppm(u16),
}

/// Decodes one raw report into a reading.
///
/// Returns `None` for reports with a bad checksum or an unrecognized tag;
/// both are expected noise on this protocol, not errors.
pub fn decode_report(report: &RawReport) -> Option<Reading> {
    let [tag, hi, lo, checksum, ..] = *report;

    // The device's integrity check is a wrapping sum over the first three bytes.
    if checksum != tag.wrapping_add(hi).wrapping_add(lo) {
        return None;
    }

    let word = u16::from_be_bytes([hi, lo]);

    match tag {
        // Temperature is encoded in sixteenths of a Kelvin.
        TAG_TEMPERATURE => Some(Reading::TemperatureCelsius(word as f32 * 0.0625 - 273.15)),
        TAG_CO2 => Some(Reading::Co2Ppm(word)),
        _ => None,
    }
}
