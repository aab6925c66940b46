// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Platform status codes, meanings, and lookups
//!
//! Every platform operation finishes with one of a small, fixed set of integer codes.
//! Zero is success; every failure is negative.
//! The codes are part of the external platform interface and must never be renumbered.
//!
//! Like the rest of the low level crates, this one is happy to work in `no_std` environments.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::all, clippy::pedantic, clippy::panic)]
#![forbid(unsafe_code, missing_docs)]
#![forbid(clippy::unwrap_used, clippy::expect_used, clippy::missing_errors_doc)]

/// Operation succeeded
pub const OK: i32 = 0;
/// Unspecified failure
pub const E_GENERIC: i32 = -1;
/// The operation is not supported on this object or platform
pub const E_UNSUPPORTED: i32 = -10;
/// The object is not present (e.g. an empty PSU bay or SFP cage)
pub const E_MISSING: i32 = -11;
/// A value read from hardware could not be interpreted
pub const E_INVALID: i32 = -12;
/// Internal failure (I/O error, inconsistent table, ...)
pub const E_INTERNAL: i32 = -13;
/// A caller supplied parameter is out of range
pub const E_PARAM: i32 = -14;
/// A bus transaction failed
pub const E_I2C: i32 = -15;

/// Failure status of a platform operation.
///
/// The discriminants are the integer codes of the external interface.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, thiserror::Error)]
#[repr(i32)]
pub enum StatusError {
    /// Unspecified failure
    #[error("generic failure")]
    Generic = E_GENERIC,
    /// The operation is not supported
    #[error("unsupported")]
    Unsupported = E_UNSUPPORTED,
    /// The object is not present
    #[error("missing")]
    Missing = E_MISSING,
    /// A value read from hardware could not be interpreted
    #[error("invalid")]
    Invalid = E_INVALID,
    /// Internal failure
    #[error("internal error")]
    Internal = E_INTERNAL,
    /// Parameter out of range
    #[error("invalid parameter")]
    Param = E_PARAM,
    /// Bus transaction failed
    #[error("i2c error")]
    I2c = E_I2C,
}

impl StatusError {
    /// Get the integer code of this status.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Parse an integer code into a `StatusError`.
    ///
    /// # Errors
    ///
    /// Returns the original value if it is [`OK`] or not a known failure code.
    pub const fn parse_i32(value: i32) -> Result<StatusError, i32> {
        match value {
            E_GENERIC => Ok(Self::Generic),
            E_UNSUPPORTED => Ok(Self::Unsupported),
            E_MISSING => Ok(Self::Missing),
            E_INVALID => Ok(Self::Invalid),
            E_INTERNAL => Ok(Self::Internal),
            E_PARAM => Ok(Self::Param),
            E_I2C => Ok(Self::I2c),
            other => Err(other),
        }
    }
}

impl From<StatusError> for i32 {
    fn from(value: StatusError) -> i32 {
        value.code()
    }
}

/// Result of a platform operation.
pub type Status<T = ()> = Result<T, StatusError>;

/// Collapse a [`Status`] into the integer code of the external interface.
#[must_use]
pub fn status_code<T>(status: &Status<T>) -> i32 {
    match status {
        Ok(_) => OK,
        Err(e) => e.code(),
    }
}

/// Human readable name of an integer status code.
///
/// Unknown negative codes read as generic failures; any positive value is treated as success
/// (some platform calls return a count on success).
#[must_use]
pub const fn status_str(code: i32) -> &'static str {
    if code >= OK {
        return "ok";
    }
    match StatusError::parse_i32(code) {
        Ok(StatusError::Generic) | Err(_) => "generic failure",
        Ok(StatusError::Unsupported) => "unsupported",
        Ok(StatusError::Missing) => "missing",
        Ok(StatusError::Invalid) => "invalid",
        Ok(StatusError::Internal) => "internal error",
        Ok(StatusError::Param) => "invalid parameter",
        Ok(StatusError::I2c) => "i2c error",
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes_are_fixed() {
        assert_eq!(StatusError::Unsupported.code(), -10);
        assert_eq!(StatusError::Missing.code(), -11);
        assert_eq!(StatusError::Internal.code(), -13);
        assert_eq!(StatusError::I2c.code(), -15);
        assert_eq!(i32::from(StatusError::Param), E_PARAM);
    }

    #[test]
    fn parse_rejects_success_and_unknown() {
        assert_eq!(StatusError::parse_i32(OK), Err(OK));
        assert_eq!(StatusError::parse_i32(-2), Err(-2));
        assert_eq!(StatusError::parse_i32(E_MISSING), Ok(StatusError::Missing));
    }

    #[test]
    fn any_code_has_a_name() {
        bolero::check!().with_type().cloned().for_each(|code: i32| {
            let name = status_str(code);
            assert!(!name.is_empty());
            match StatusError::parse_i32(code) {
                Ok(status) => {
                    assert_eq!(status.code(), code);
                    assert_eq!(name, status.to_string());
                }
                Err(raw) => assert_eq!(raw, code),
            }
        });
    }

    #[test]
    fn status_collapses_to_code() {
        let ok: Status<u32> = Ok(7);
        assert_eq!(status_code(&ok), OK);
        let missing: Status<u32> = Err(StatusError::Missing);
        assert_eq!(status_code(&missing), E_MISSING);
        assert_eq!(status_str(3), "ok");
    }
}
