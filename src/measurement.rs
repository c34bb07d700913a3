use crate::report::Reading;

/// Latest known values accumulated over one acquisition run.
///
/// Fields only ever go from unknown to known; a later valid reading of the
/// same kind overwrites, nothing resets them within a run.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeasurementState {
    pub temperature_celsius: Option<f32>,
    pub co2_ppm: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomReading {
    pub temperature_celsius: f32,
    pub co2_ppm: u16,
}

impl MeasurementState {
    pub fn merge(&mut self, reading: Reading) {
        match reading {
            Reading::TemperatureCelsius(t) => self.temperature_celsius = Some(t),
            Reading::Co2Ppm(ppm) => self.co2_ppm = Some(ppm),
        }
    }

    pub fn complete(&self) -> Option<RoomReading> {
        Some(RoomReading {
            temperature_celsius: self.temperature_celsius?,
            co2_ppm: self.co2_ppm?,
        })
    }
}
