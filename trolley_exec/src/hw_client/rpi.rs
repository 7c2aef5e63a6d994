//! Raspberry Pi hardware backend
//!
//! Reads the infrared sensors through the BCM GPIO pins and talks to the
//! motor-control peripheral over the Pi's UART. Only compiled for ARM Linux
//! targets, everything else uses [`super::sim::SimHardware`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};
use rppal::gpio::{Gpio, InputPin};
use rppal::uart::{Parity, Uart};
use std::time::Duration;

// Internal
use super::params::Params;
use super::{HardwareIo, HwClientError};
use comms_if::eqpt::line::{LineReading, SensorState};
use comms_if::eqpt::mech::DriveCmd;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Hardware interface of the physical trolley.
pub struct RpiHardware {
    ir_left: InputPin,
    ir_center: InputPin,
    ir_right: InputPin,

    uart: Uart,

    /// Bytes received but not yet terminated by a newline
    line_buf: String,

    invert_polarity: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RpiHardware {
    /// Claim the sensor pins and open the serial link.
    pub fn new(params: &Params) -> Result<Self, HwClientError> {
        let gpio = Gpio::new().map_err(|e| HwClientError::GpioError(e.to_string()))?;

        let ir_left = gpio
            .get(params.ir_pin_left)
            .map_err(|e| HwClientError::GpioError(e.to_string()))?
            .into_input();
        let ir_center = gpio
            .get(params.ir_pin_center)
            .map_err(|e| HwClientError::GpioError(e.to_string()))?
            .into_input();
        let ir_right = gpio
            .get(params.ir_pin_right)
            .map_err(|e| HwClientError::GpioError(e.to_string()))?
            .into_input();

        let mut uart = Uart::with_path(&params.serial_port, params.serial_baud, Parity::None, 8, 1)
            .map_err(|e| HwClientError::SerialError(e.to_string()))?;

        // Fully non-blocking reads
        uart.set_read_mode(0, Duration::from_millis(0))
            .map_err(|e| HwClientError::SerialError(e.to_string()))?;

        info!(
            "Hardware initialised (sensors on BCM {}/{}/{}, peripheral on {})",
            params.ir_pin_left, params.ir_pin_center, params.ir_pin_right, params.serial_port
        );

        Ok(Self {
            ir_left,
            ir_center,
            ir_right,
            uart,
            line_buf: String::new(),
            invert_polarity: params.invert_polarity,
        })
    }
}

impl HardwareIo for RpiHardware {
    fn read_sensors(&mut self) -> LineReading {
        LineReading::new(
            SensorState::from_level(self.ir_left.is_high(), self.invert_polarity),
            SensorState::from_level(self.ir_center.is_high(), self.invert_polarity),
            SensorState::from_level(self.ir_right.is_high(), self.invert_polarity),
        )
    }

    fn send_command(&mut self, cmd: DriveCmd) -> Result<(), HwClientError> {
        self.uart
            .write(&[cmd.as_byte()])
            .map_err(|e| HwClientError::SerialError(e.to_string()))?;

        Ok(())
    }

    fn receive_line(&mut self) -> Option<String> {
        let mut buf = [0u8; 64];

        loop {
            match self.uart.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => self.line_buf.push_str(&String::from_utf8_lossy(&buf[..n])),
                Err(e) => {
                    warn!("Serial read error: {}", e);
                    break;
                }
            }
        }

        let newline = self.line_buf.find('\n')?;
        let line: String = self.line_buf.drain(..=newline).collect();
        let line = line.trim();

        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}

impl Drop for RpiHardware {
    /// The peripheral keeps executing its last command, so never release the
    /// link with the trolley still moving.
    fn drop(&mut self) {
        self.uart.write(&[DriveCmd::Stop.as_byte()]).ok();
    }
}
