//! Raw device units to engineering units.

use airq_core::constants::CO2_MAX_PPM;
use airq_core::{Co2Measurement, DeviceKind, ParticulateMeasurement, WeatherMeasurement};
use airq_hardware::{RawCo2Sample, RawParticulateSample, RawWeatherSample};

use crate::error::{Result, SensorError};

/// centi-°C → °C, Pa → kPa, milli-%RH → %RH.
pub fn weather(raw: &RawWeatherSample) -> WeatherMeasurement {
    WeatherMeasurement {
        temperature_c: f64::from(raw.temperature_centi_c) / 100.0,
        pressure_kpa: f64::from(raw.pressure_pa) / 1_000.0,
        humidity_rh: f64::from(raw.humidity_milli_rh) / 1_000.0,
    }
}

/// m°C → °C, m%RH → %RH.
///
/// # Errors
///
/// A concentration of 0 ppm or above the sensor range is an
/// [`SensorError::InvalidSample`].
pub fn co2(raw: &RawCo2Sample) -> Result<Co2Measurement> {
    if raw.co2_ppm == 0 || raw.co2_ppm > CO2_MAX_PPM {
        return Err(SensorError::InvalidSample {
            device: DeviceKind::Co2,
            reason: format!("{} ppm outside 1..={CO2_MAX_PPM}", raw.co2_ppm),
        });
    }

    Ok(Co2Measurement {
        co2_ppm: raw.co2_ppm,
        temperature_c: f64::from(raw.temperature_milli_c) / 1_000.0,
        humidity_rh: f64::from(raw.humidity_milli_rh) / 1_000.0,
    })
}

/// The particulate sensor already reports engineering units.
pub fn particulate(raw: &RawParticulateSample) -> ParticulateMeasurement {
    ParticulateMeasurement {
        mc_1p0: f64::from(raw.mc_1p0),
        mc_2p5: f64::from(raw.mc_2p5),
        mc_4p0: f64::from(raw.mc_4p0),
        mc_10p0: f64::from(raw.mc_10p0),
        nc_0p5: f64::from(raw.nc_0p5),
        nc_1p0: f64::from(raw.nc_1p0),
        nc_2p5: f64::from(raw.nc_2p5),
        nc_4p0: f64::from(raw.nc_4p0),
        nc_10p0: f64::from(raw.nc_10p0),
        typical_particle_size: f64::from(raw.typical_particle_size),
    }
}
