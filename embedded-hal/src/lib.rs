// SPDX-FileCopyrightText: 2024 Kent Gibson <warthog618@gmail.com>
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A library providing [`embedded_hal::digital`] traits for
//! [`gpiosysfs::Pin`] and therefore for any Linux platform supporting the
//! sysfs GPIO interface.
//!
//! The pins must be configured as an input or output.
//!
//! # Example Usage
//!
//! Reading an input pin:
//!
//! ```no_run
//! # fn example() -> Result<(), gpiosysfs_embedded_hal::Error> {
//! use embedded_hal::digital::InputPin;
//!
//! let mut pin = gpiosysfs_embedded_hal::InputPin::new("/sys/class/gpio", 4)?;
//! if pin.is_high()? {
//!     println!("Input is high.");
//! }
//! # Ok(())
//! # }
//! ```
//! Setting an output pin:
//!
//! ```no_run
//! # fn example() -> Result<(), gpiosysfs_embedded_hal::Error> {
//! use embedded_hal::digital::{OutputPin, PinState};
//!
//! // level is set as part of the acquisition
//! let mut led0 = gpiosysfs_embedded_hal::OutputPin::from_number(12, PinState::High)?;
//!
//! // change the level later
//! led0.set_low()?;
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use embedded_hal::digital::PinState;
use gpiosysfs::{Direction, Level, Pin};

/// Provides [`embedded_hal::digital`] traits for a [`gpiosysfs::Pin`]
/// configured as an input.
///
/// Holding the [`InputPin`] grants exclusive access to the pin.
///
/// Do NOT drop the [`InputPin`] until you are completely done with it.
/// Dropping it releases the pin, and re-acquiring the pin is far more
/// expensive than reading the level.
#[derive(Debug)]
pub struct InputPin(Pin);

impl InputPin {
    /// Creates a new input pin for the given `number` on the sysfs GPIO
    /// interface at `root`.
    ///
    /// ```no_run
    /// # fn example() -> Result<(), gpiosysfs_embedded_hal::Error> {
    /// use embedded_hal::digital::InputPin;
    ///
    /// let mut pin = gpiosysfs_embedded_hal::InputPin::new("/sys/class/gpio", 4)?;
    /// if pin.is_high()? {
    ///     println!("Input is high.");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<P>(root: P, number: u32) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let pin = Pin::builder(number)
            .on_root(root.as_ref())
            .as_input()
            .acquire()?;

        Ok(InputPin(pin))
    }

    /// Creates a new input pin for the given `number` on `/sys/class/gpio`.
    pub fn from_number(number: u32) -> Result<Self, Error> {
        Self::new(gpiosysfs::pin::DEFAULT_ROOT, number)
    }

    /// Set this pin to output mode.
    pub fn into_output_pin(mut self, state: PinState) -> Result<OutputPin, Error> {
        let pin = &mut self.0;
        pin.set_direction(Direction::Out)?;
        pin.set_level(state_to_level(state))?;

        Ok(OutputPin(self.0))
    }
}

impl TryFrom<Pin> for InputPin {
    type Error = Error;

    /// Convert an input [`gpiosysfs::Pin`] into an [`InputPin`].
    ///
    /// The direction is read from the pin, not taken from its last
    /// applied configuration.
    fn try_from(pin: Pin) -> Result<Self, Self::Error> {
        if pin.direction()? != Direction::In {
            return Err(Error::RequiresInputMode);
        }
        Ok(InputPin(pin))
    }
}

impl From<InputPin> for Pin {
    /// Convert the [`InputPin`] into the contained [`Pin`].
    fn from(pin: InputPin) -> Self {
        pin.0
    }
}

impl embedded_hal::digital::InputPin for InputPin {
    #[inline]
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.level()? == Level::High)
    }

    #[inline]
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.level()? == Level::Low)
    }
}

impl embedded_hal::digital::ErrorType for InputPin {
    /// Errors returned by [`InputPin`].
    type Error = Error;
}

/// Provides [`embedded_hal::digital`] traits for a [`gpiosysfs::Pin`]
/// configured as an output.
///
/// Holding the [`OutputPin`] grants exclusive access to the pin.
///
/// Do NOT drop the [`OutputPin`] until you are completely done with it.
/// When dropped the pin is released, after which its level may be
/// altered, either by other users or by the kernel itself.
#[derive(Debug)]
pub struct OutputPin(Pin);

impl OutputPin {
    /// Creates a new output pin for the given `number` on the sysfs GPIO
    /// interface at `root`.
    ///
    /// ```no_run
    /// # fn example() -> Result<(), gpiosysfs_embedded_hal::Error> {
    /// use embedded_hal::digital::{OutputPin, PinState};
    ///
    /// let mut pin = gpiosysfs_embedded_hal::OutputPin::new("/sys/class/gpio", 17, PinState::Low)?;
    /// // later...
    /// pin.set_high()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new<P>(root: P, number: u32, state: PinState) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let pin = Pin::builder(number)
            .on_root(root.as_ref())
            .as_output(state_to_level(state))
            .acquire()?;

        Ok(OutputPin(pin))
    }

    /// Creates a new output pin for the given `number` on `/sys/class/gpio`.
    pub fn from_number(number: u32, state: PinState) -> Result<Self, Error> {
        Self::new(gpiosysfs::pin::DEFAULT_ROOT, number, state)
    }

    /// Set this pin to input mode.
    pub fn into_input_pin(mut self) -> Result<InputPin, Error> {
        self.0.set_direction(Direction::In)?;

        Ok(InputPin(self.0))
    }
}

impl TryFrom<Pin> for OutputPin {
    type Error = Error;

    /// Convert an output [`gpiosysfs::Pin`] into an [`OutputPin`].
    ///
    /// This allows for configurations such as forcing a reacquire.
    /// [`OutputPin::new<P>()`] should be used for less complex configurations.
    fn try_from(pin: Pin) -> Result<Self, Self::Error> {
        if pin.direction()? != Direction::Out {
            return Err(Error::RequiresOutputMode);
        }
        Ok(OutputPin(pin))
    }
}

impl From<OutputPin> for Pin {
    /// Convert the [`OutputPin`] into the contained [`Pin`].
    fn from(pin: OutputPin) -> Self {
        pin.0
    }
}

impl embedded_hal::digital::InputPin for OutputPin {
    // Supporting InputPin allows reading back the level of the line,
    // where supported by the hardware.

    #[inline]
    /// Is the line high?
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.level()? == Level::High)
    }

    #[inline]
    /// Is the line low?
    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.level()? == Level::Low)
    }
}

impl embedded_hal::digital::OutputPin for OutputPin {
    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_state(PinState::Low)
    }

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_state(PinState::High)
    }

    fn set_state(&mut self, state: PinState) -> Result<(), Error> {
        self.0.set_level(state_to_level(state))?;
        Ok(())
    }
}

impl embedded_hal::digital::StatefulOutputPin for OutputPin {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.last_level() == Some(Level::High))
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.last_level() == Some(Level::Low))
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.0.toggle()?;
        Ok(())
    }
}

impl embedded_hal::digital::ErrorType for OutputPin {
    /// Errors returned by [`OutputPin`].
    type Error = Error;
}

/// Converts a [`PinState`] to the gpiosysfs [`Level`].
fn state_to_level(state: PinState) -> Level {
    match state {
        PinState::High => Level::High,
        PinState::Low => Level::Low,
    }
}

/// Errors returned by [`gpiosysfs_embedded_hal`](crate) types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// InputPins must be in input mode.
    #[error("Pin must be in input mode")]
    RequiresInputMode,

    /// OutputPins must be in output mode.
    #[error("Pin must be in output mode")]
    RequiresOutputMode,

    /// An error returned from an underlying gpiosysfs call.
    #[error("gpiosysfs returned: {0}")]
    Sysfs(#[source] gpiosysfs::Error),
}

impl From<gpiosysfs::Error> for Error {
    fn from(err: gpiosysfs::Error) -> Self {
        Self::Sysfs(err)
    }
}

impl embedded_hal::digital::Error for Error {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::Error as _;

    #[test]
    fn state_to_level() {
        assert_eq!(super::state_to_level(PinState::High), Level::High);
        assert_eq!(super::state_to_level(PinState::Low), Level::Low);
    }

    #[test]
    fn error_kind() {
        use embedded_hal::digital::ErrorKind;

        assert!(matches!(Error::RequiresInputMode.kind(), ErrorKind::Other));
        assert!(matches!(
            Error::from(gpiosysfs::Error::Busy(3)).kind(),
            ErrorKind::Other
        ));
    }

    #[test]
    fn error_display() {
        assert_eq!(
            Error::from(gpiosysfs::Error::PortUnavailable(3)).to_string(),
            "gpiosysfs returned: gpio3 is unavailable - export did not create its control node"
        );
    }
}
