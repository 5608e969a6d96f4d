//! Mock device implementations for testing and development.
//!
//! These simulate the three sensors without a bus and can be scripted
//! through their handles.

pub mod sensor;

// Re-export commonly used types
pub use sensor::{
    MockCo2, MockOp, MockParticulate, MockSensor, MockSensorHandle, MockWeather,
};
