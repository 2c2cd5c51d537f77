//! # Unofficial Rust Driver for AMS TCS3472 Colour Sensor
//!
//! Supports the TCS34721/TCS34725 and TCS34723/TCS34727 part variants.
//!
//! ## External Links
//!
//! - [Datasheet]
//! - [Alternate Driver]
//!
//! [Datasheet]: https://ams.com/tcs34725
//! [Alternate Driver]: https://github.com/eldruin/tcs3472-rs

#![no_std]

use core::cmp;
use core::time::Duration;
use embedded_hal::i2c::I2c;
use num_enum::IntoPrimitive;

const ADDRESS: u8 = 0x29;

const CHIP_ID: u8 = 0x44; // TCS34721 and TCS34725
const CHIP_ID_ALT: u8 = 0x4D; // TCS34723 and TCS34727

const REG_CMD: u8 = 0x80;
const CMD_AUTO_INCREMENT: u8 = 0x20;

const REG_ENABLE: u8 = REG_CMD;
const REG_ATIME: u8 = REG_CMD | 0x01;
const REG_CONTROL: u8 = REG_CMD | 0x0F;
const REG_CHIP_ID: u8 = REG_CMD | 0x12;
const REG_STATUS: u8 = REG_CMD | 0x13;

const REG_CLEAR: u8 = REG_CMD | CMD_AUTO_INCREMENT | 0x14;
const REG_RED: u8 = REG_CMD | CMD_AUTO_INCREMENT | 0x16;
const REG_GREEN: u8 = REG_CMD | CMD_AUTO_INCREMENT | 0x18;
const REG_BLUE: u8 = REG_CMD | CMD_AUTO_INCREMENT | 0x1A;

const ENABLE_POWER: u8 = 1;
const ENABLE_RGBC: u8 = 1 << 1;

const STATUS_VALID: u8 = 1;

// The RGBC integration time advances in 2.4 ms steps.
const STEP_NS: u128 = 2_400_000;

const DEFAULT_INTEGRATION_TIME: Duration = Duration::from_millis(511);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error<E> {
    I2cError(E),
    /// The chip identification register held neither known ID.  Carries the
    /// byte that was read instead.
    UnexpectedDevice(u8),
    /// Integration time outside of 2.4 ms ..= 612 ms.
    IntegrationTimeOutOfRange,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::I2cError(error)
    }
}

/// Analog gain applied to the photodiode signal before digitisation.
#[derive(IntoPrimitive, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Gain {
    X1 = 0,
    X4 = 1,
    X16 = 2,
    X60 = 3,
}

/// One set of channel counts, read back-to-back from the data registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawMeasurement {
    pub clear: u16,
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

/// A light measurement with intensity and colour.
///
/// The colour channels are each expressed as a share of the clear channel.
/// No clamping is applied: a reading taken while the clear channel is 0
/// carries non-finite shares.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    /// The light intensity, up to [`Tcs3472::max_count`].
    pub intensity: u16,
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

pub struct Tcs3472<I2C> {
    i2c: I2C,
    max_count: u32,
}

impl<I2C: I2c> Tcs3472<I2C> {
    /// Opens a handle to the sensor on its fixed bus address `0x29`,
    /// verifies the chip identification register, powers the device on with
    /// RGBC sampling enabled and applies the default 511 ms integration
    /// time.
    ///
    /// # Errors
    ///
    /// [`Error::UnexpectedDevice`]: another device answered on the address.
    /// [`Error::I2cError`]: any bus failure during the sequence.
    pub fn new(i2c: I2C) -> Result<Self, Error<I2C::Error>> {
        let mut res = Self { i2c, max_count: 0 };

        let id = res.chip_id()?;
        if id != CHIP_ID && id != CHIP_ID_ALT {
            return Err(Error::UnexpectedDevice(id));
        }

        res.i2c
            .write(ADDRESS, &[REG_ENABLE, ENABLE_POWER | ENABLE_RGBC])?;
        res.set_integration_time(DEFAULT_INTEGRATION_TIME)?;

        Ok(res)
    }

    /// Reads the chip identification register.
    pub fn chip_id(&mut self) -> Result<u8, I2C::Error> {
        let mut data: [u8; 1] = [0];
        self.i2c.write_read(ADDRESS, &[REG_CHIP_ID], &mut data)?;
        Ok(data[0])
    }

    /// Sets the integration time of measurements, between 2.4 and 612 ms.
    /// Longer integration times allow larger channel counts; the reachable
    /// maximum for the chosen time is available from [`Self::max_count`].
    ///
    /// # Errors
    ///
    /// [`Error::IntegrationTimeOutOfRange`]: nothing is written and the
    /// previous configuration stays in effect.
    pub fn set_integration_time(&mut self, time: Duration) -> Result<(), Error<I2C::Error>> {
        if time < Duration::from_micros(2400) || time > Duration::from_millis(612) {
            return Err(Error::IntegrationTimeOutOfRange);
        }
        // The timing register counts down: the period is (256 - ATIME) * 2.4 ms
        // and Max RGBC Count = (256 - ATIME) * 1024, up to 65535.
        let atime = 255 - (time.as_nanos() / STEP_NS) as u8;
        self.max_count = cmp::min(u32::from(atime) * 1024, 65535);
        self.i2c.write(ADDRESS, &[REG_ATIME, atime])?;
        Ok(())
    }

    /// The largest count a channel can reach at the configured integration
    /// time.
    #[must_use]
    pub const fn max_count(&self) -> u32 {
        self.max_count
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[REG_CONTROL, gain.into()])
    }

    /// Whether the RGBC channels have completed an integration cycle since
    /// sampling was enabled.  Polling and retry are left to the caller.
    pub fn valid(&mut self) -> Result<bool, I2C::Error> {
        let mut data: [u8; 1] = [0];
        self.i2c.write_read(ADDRESS, &[REG_STATUS], &mut data)?;
        Ok(data[0] & STATUS_VALID > 0)
    }

    /// Reads the clear, red, green and blue channel counts.  The first bus
    /// failure aborts the sequence; no partial result is returned.
    pub fn measure_raw(&mut self) -> Result<RawMeasurement, I2C::Error> {
        Ok(RawMeasurement {
            clear: self.read_channel(REG_CLEAR)?,
            red: self.read_channel(REG_RED)?,
            green: self.read_channel(REG_GREEN)?,
            blue: self.read_channel(REG_BLUE)?,
        })
    }

    /// Measures the light intensity and colour, normalising each colour
    /// channel to the clear channel.
    pub fn measure(&mut self) -> Result<Light, I2C::Error> {
        let raw = self.measure_raw()?;
        let clear = f32::from(raw.clear);
        Ok(Light {
            intensity: raw.clear,
            red: f32::from(raw.red) / clear,
            green: f32::from(raw.green) / clear,
            blue: f32::from(raw.blue) / clear,
        })
    }

    /// Powers the device down by clearing the enable register.  Safe to call
    /// on an already halted device.
    pub fn halt(&mut self) -> Result<(), I2C::Error> {
        self.i2c.write(ADDRESS, &[REG_ENABLE, 0])
    }

    fn read_channel(&mut self, register: u8) -> Result<u16, I2C::Error> {
        let mut data: [u8; 2] = [0; 2];
        self.i2c.write_read(ADDRESS, &[register], &mut data)?;
        Ok(u16::from_be_bytes(data))
    }
}

impl<I2C> core::fmt::Display for Tcs3472<I2C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "TCS3472@0x{ADDRESS:02x}")
    }
}
