//! Last known device identity

use heapless::String;

use ld2410s_protocol::ack::{MAX_SERIAL_TEXT_LEN, MAX_VERSION_LEN};

/// Identity answered by the radar, `None` until queried
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    version: Option<String<MAX_VERSION_LEN>>,
    serial_number: Option<String<MAX_SERIAL_TEXT_LEN>>,
}

impl DeviceInfo {
    /// Firmware version, `v{major}.{minor}.{patch}`
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Serial number
    pub fn serial_number(&self) -> Option<&str> {
        self.serial_number.as_deref()
    }

    pub(crate) fn set_version(&mut self, version: String<MAX_VERSION_LEN>) {
        self.version = Some(version);
    }

    pub(crate) fn set_serial_number(&mut self, serial: String<MAX_SERIAL_TEXT_LEN>) {
        self.serial_number = Some(serial);
    }
}
