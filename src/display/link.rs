//! Physical display link
//!
//! The scan engine only ever talks to a [`PanelLink`]. On the board that is
//! [`SpiPanel`], a MIPI-DCS style command set over a 3-wire SPI link with
//! no D/C pin; chip select is handled by the `SpiDevice`.
use alloc::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Operation, SpiDevice};

use crate::config::DisplayConfig;
use crate::error::LinkError;

/// Sink for scanned-out pixel rows
pub trait PanelLink {
    /// Bring the panel up for `config`. Called once before streaming.
    fn power_on(&mut self, config: &DisplayConfig) -> Result<(), LinkError>;

    /// Start of a frame: the next pixels land at the top-left corner
    fn begin_frame(&mut self) -> Result<(), LinkError>;

    /// Whole rows, continuing where the previous call stopped
    fn write_pixels(&mut self, pixels: &[u16]) -> Result<(), LinkError>;

    fn power_off(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}

/// DCS command opcodes used by the panel
mod cmd {
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const RAMWR: u8 = 0x2C;
    pub const MADCTL: u8 = 0x36;
    pub const RAMWRC: u8 = 0x3C;
    pub const COLMOD: u8 = 0x3A;
}

/// 16 bits per pixel, RGB565 on both interfaces
const PIXEL_FORMAT_RGB565: u8 = 0x55;

/// SPI-attached panel with a backlight enable pin
pub struct SpiPanel<SPI, BL, D> {
    spi: SPI,
    backlight: BL,
    delay: D,
    powered: bool,
    stage: Vec<u8>,
}

impl<SPI, BL, D> SpiPanel<SPI, BL, D>
where
    SPI: SpiDevice,
    BL: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, backlight: BL, delay: D) -> Self {
        Self {
            spi,
            backlight,
            delay,
            powered: false,
            stage: Vec::new(),
        }
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Give the bus and pins back
    pub fn release(self) -> (SPI, BL, D) {
        (self.spi, self.backlight, self.delay)
    }

    fn command(&mut self, opcode: u8, params: &[u8]) -> Result<(), LinkError> {
        let result = if params.is_empty() {
            self.spi.write(&[opcode])
        } else {
            self.spi
                .transaction(&mut [Operation::Write(&[opcode]), Operation::Write(params)])
        };
        result.map_err(|_| LinkError::Bus)
    }
}

impl<SPI, BL, D> PanelLink for SpiPanel<SPI, BL, D>
where
    SPI: SpiDevice,
    BL: OutputPin,
    D: DelayNs,
{
    fn power_on(&mut self, config: &DisplayConfig) -> Result<(), LinkError> {
        self.command(cmd::SWRESET, &[])?;
        self.delay.delay_ms(120);
        self.command(cmd::SLPOUT, &[])?;
        self.delay.delay_ms(120);
        self.command(cmd::COLMOD, &[PIXEL_FORMAT_RGB565])?;
        self.command(cmd::MADCTL, &[config.rotation.madctl()])?;
        self.command(cmd::DISPON, &[])?;
        self.delay.delay_ms(20);
        self.backlight.set_high().map_err(|_| LinkError::Pin)?;

        self.stage.reserve(config.cache_bytes());
        self.powered = true;
        log::debug!("panel: {}x{} {:?}", config.width, config.height, config.rotation);
        Ok(())
    }

    fn begin_frame(&mut self) -> Result<(), LinkError> {
        if !self.powered {
            return Err(LinkError::NotPowered);
        }
        self.command(cmd::RAMWR, &[])
    }

    fn write_pixels(&mut self, pixels: &[u16]) -> Result<(), LinkError> {
        if !self.powered {
            return Err(LinkError::NotPowered);
        }
        self.stage.clear();
        self.stage.extend(pixels.iter().flat_map(|p| p.to_be_bytes()));
        self.spi
            .transaction(&mut [
                Operation::Write(&[cmd::RAMWRC]),
                Operation::Write(&self.stage),
            ])
            .map_err(|_| LinkError::Bus)
    }

    fn power_off(&mut self) -> Result<(), LinkError> {
        if !self.powered {
            return Ok(());
        }
        self.powered = false;
        self.backlight.set_low().map_err(|_| LinkError::Pin)?;
        self.command(cmd::DISPOFF, &[])?;
        self.command(cmd::SLPIN, &[])?;
        self.delay.delay_ms(5);
        Ok(())
    }
}
