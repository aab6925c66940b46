// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! ONIE system EEPROM (`TlvInfo` format) decoding.
//!
//! Layout: the 8 byte id `TlvInfo\0`, a version byte (1), a big-endian u16 length of the TLV
//! area, then the TLVs, each a type byte, a length byte and the value. The last TLV is a
//! CRC-32 over everything before its value.

use crc::{CRC_32_ISO_HDLC, Crc};
use thiserror::Error;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// The id string opening every image.
pub const TLV_INFO_ID: &[u8; 8] = b"TlvInfo\0";
/// The only version understood.
pub const TLV_INFO_VERSION: u8 = 1;
/// Size of the id, version and length fields.
pub const HEADER_LEN: usize = 11;
/// Largest image.
pub const MAX_EEPROM_LEN: usize = 2048;

/// TLV type codes.
pub mod code {
    pub const PRODUCT_NAME: u8 = 0x21;
    pub const PART_NUMBER: u8 = 0x22;
    pub const SERIAL_NUMBER: u8 = 0x23;
    pub const MAC_BASE: u8 = 0x24;
    pub const MANUFACTURE_DATE: u8 = 0x25;
    pub const DEVICE_VERSION: u8 = 0x26;
    pub const LABEL_REVISION: u8 = 0x27;
    pub const PLATFORM_NAME: u8 = 0x28;
    pub const ONIE_VERSION: u8 = 0x29;
    pub const MAC_SIZE: u8 = 0x2A;
    pub const MANUFACTURER: u8 = 0x2B;
    pub const COUNTRY_CODE: u8 = 0x2C;
    pub const VENDOR: u8 = 0x2D;
    pub const DIAG_VERSION: u8 = 0x2E;
    pub const SERVICE_TAG: u8 = 0x2F;
    pub const VENDOR_EXT: u8 = 0xFD;
    pub const CRC_32: u8 = 0xFE;
}

/// Why an image was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OnieError {
    #[error("missing TlvInfo id")]
    BadHeader,
    #[error("unsupported TlvInfo version {0}")]
    UnsupportedVersion(u8),
    #[error("image truncated")]
    Truncated,
    #[error("announced length {0} exceeds {MAX_EEPROM_LEN} bytes")]
    TooLong(usize),
    #[error("bad CRC: stored {expected:#010x}, computed {computed:#010x}")]
    BadCrc { expected: u32, computed: u32 },
    #[error("no CRC-32 TLV")]
    MissingCrc,
    #[error("TLV {code:#04x} has invalid length {len}")]
    BadField { code: u8, len: usize },
}

impl From<OnieError> for status::StatusError {
    fn from(_: OnieError) -> status::StatusError {
        status::StatusError::Invalid
    }
}

/// Decoded system EEPROM contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnieInfo {
    pub product_name: Option<String>,
    pub part_number: Option<String>,
    pub serial_number: Option<String>,
    pub mac_base: Option<[u8; 6]>,
    pub manufacture_date: Option<String>,
    pub device_version: Option<u8>,
    pub label_revision: Option<String>,
    pub platform_name: Option<String>,
    pub onie_version: Option<String>,
    pub mac_count: Option<u16>,
    pub manufacturer: Option<String>,
    pub country_code: Option<String>,
    pub vendor: Option<String>,
    pub diag_version: Option<String>,
    pub service_tag: Option<String>,
    /// raw values of the vendor extension TLVs, in order
    pub vendor_ext: Vec<Vec<u8>>,
    pub crc: u32,
}

fn text(value: &[u8]) -> Option<String> {
    Some(String::from_utf8_lossy(value).trim_end_matches('\0').to_string())
}

impl OnieInfo {
    /// Length of the whole image announced by its header, header included.
    ///
    /// # Errors
    ///
    /// [`OnieError::BadHeader`], [`OnieError::UnsupportedVersion`], or
    /// [`OnieError::TooLong`] if the announced length exceeds [`MAX_EEPROM_LEN`].
    pub fn image_len(header: &[u8]) -> Result<usize, OnieError> {
        if header.len() < HEADER_LEN || &header[..8] != TLV_INFO_ID {
            return Err(OnieError::BadHeader);
        }
        if header[8] != TLV_INFO_VERSION {
            return Err(OnieError::UnsupportedVersion(header[8]));
        }
        let end = HEADER_LEN + usize::from(u16::from_be_bytes([header[9], header[10]]));
        if end > MAX_EEPROM_LEN {
            return Err(OnieError::TooLong(end));
        }
        Ok(end)
    }

    /// Decode and verify an image. Bytes after the TLV area are ignored.
    ///
    /// # Errors
    ///
    /// See [`OnieError`]. Unknown TLV codes are skipped, not rejected.
    pub fn decode(image: &[u8]) -> Result<OnieInfo, OnieError> {
        let end = OnieInfo::image_len(image)?;
        if end > image.len() {
            return Err(OnieError::Truncated);
        }

        let mut info = OnieInfo::default();
        let mut crc_seen = false;
        let mut pos = HEADER_LEN;
        while pos < end {
            if pos + 2 > end {
                return Err(OnieError::Truncated);
            }
            let (code, len) = (image[pos], usize::from(image[pos + 1]));
            let value = image
                .get(pos + 2..pos + 2 + len)
                .filter(|_| pos + 2 + len <= end)
                .ok_or(OnieError::Truncated)?;
            if code == code::CRC_32 {
                let stored: [u8; 4] = value
                    .try_into()
                    .map_err(|_| OnieError::BadField { code, len })?;
                let expected = u32::from_be_bytes(stored);
                let computed = CRC32.checksum(&image[..pos + 2]);
                if expected != computed {
                    return Err(OnieError::BadCrc { expected, computed });
                }
                info.crc = expected;
                crc_seen = true;
                break;
            }
            info.set(code, value)?;
            pos += 2 + len;
        }
        if !crc_seen {
            return Err(OnieError::MissingCrc);
        }
        Ok(info)
    }

    fn set(&mut self, code: u8, value: &[u8]) -> Result<(), OnieError> {
        let bad = || OnieError::BadField {
            code,
            len: value.len(),
        };
        match code {
            code::PRODUCT_NAME => self.product_name = text(value),
            code::PART_NUMBER => self.part_number = text(value),
            code::SERIAL_NUMBER => self.serial_number = text(value),
            code::MAC_BASE => self.mac_base = Some(value.try_into().map_err(|_| bad())?),
            code::MANUFACTURE_DATE => self.manufacture_date = text(value),
            code::DEVICE_VERSION => match value {
                [version] => self.device_version = Some(*version),
                _ => return Err(bad()),
            },
            code::LABEL_REVISION => self.label_revision = text(value),
            code::PLATFORM_NAME => self.platform_name = text(value),
            code::ONIE_VERSION => self.onie_version = text(value),
            code::MAC_SIZE => match value {
                [hi, lo] => self.mac_count = Some(u16::from_be_bytes([*hi, *lo])),
                _ => return Err(bad()),
            },
            code::MANUFACTURER => self.manufacturer = text(value),
            code::COUNTRY_CODE => self.country_code = text(value),
            code::VENDOR => self.vendor = text(value),
            code::DIAG_VERSION => self.diag_version = text(value),
            code::SERVICE_TAG => self.service_tag = text(value),
            code::VENDOR_EXT => self.vendor_ext.push(value.to_vec()),
            other => tracing::debug!("skipping unknown ONIE TLV {other:#04x}"),
        }
        Ok(())
    }
}

impl std::fmt::Display for OnieInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let strings = [
            ("Product Name", &self.product_name),
            ("Part Number", &self.part_number),
            ("Serial Number", &self.serial_number),
            ("Manufacture Date", &self.manufacture_date),
            ("Label Revision", &self.label_revision),
            ("Platform Name", &self.platform_name),
            ("ONIE Version", &self.onie_version),
            ("Manufacturer", &self.manufacturer),
            ("Country Code", &self.country_code),
            ("Vendor", &self.vendor),
            ("Diag Version", &self.diag_version),
            ("Service Tag", &self.service_tag),
        ];
        for (name, value) in strings {
            if let Some(value) = value {
                writeln!(f, "{name}: {value}")?;
            }
        }
        if let Some(mac) = self.mac_base {
            writeln!(
                f,
                "MAC: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
            )?;
        }
        if let Some(count) = self.mac_count {
            writeln!(f, "MAC Range: {count}")?;
        }
        if let Some(version) = self.device_version {
            writeln!(f, "Device Version: {version}")?;
        }
        for ext in &self.vendor_ext {
            write!(f, "Vendor Extension:")?;
            for byte in ext {
                write!(f, " {byte:02x}")?;
            }
            writeln!(f)?;
        }
        write!(f, "CRC: {:#010x}", self.crc)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Build a valid image from TLVs, appending the CRC.
    pub(crate) fn image(tlvs: &[(u8, &[u8])]) -> Vec<u8> {
        let mut body: Vec<u8> = Vec::new();
        for (code, value) in tlvs {
            body.push(*code);
            body.push(u8::try_from(value.len()).unwrap());
            body.extend_from_slice(value);
        }
        let mut out = TLV_INFO_ID.to_vec();
        out.push(TLV_INFO_VERSION);
        let total = u16::try_from(body.len() + 6).unwrap();
        out.extend_from_slice(&total.to_be_bytes());
        out.extend_from_slice(&body);
        out.extend_from_slice(&[code::CRC_32, 4]);
        let crc = CRC32.checksum(&out);
        out.extend_from_slice(&crc.to_be_bytes());
        out
    }

    fn sample() -> Vec<u8> {
        image(&[
            (code::PRODUCT_NAME, b"QS32"),
            (code::SERIAL_NUMBER, b"SN0001\0"),
            (code::MAC_BASE, &[0x00, 0x1b, 0x21, 0xaa, 0xbb, 0xcc]),
            (code::MAC_SIZE, &[0x00, 0x80]),
            (code::DEVICE_VERSION, &[2]),
            (0x77, b"ignored"),
            (code::VENDOR_EXT, &[0x00, 0x00, 0x9a, 0x1f, 0x01]),
        ])
    }

    #[test]
    fn decode_fields() {
        let info = OnieInfo::decode(&sample()).unwrap();
        assert_eq!(info.product_name.as_deref(), Some("QS32"));
        assert_eq!(info.serial_number.as_deref(), Some("SN0001"));
        assert_eq!(info.mac_base, Some([0x00, 0x1b, 0x21, 0xaa, 0xbb, 0xcc]));
        assert_eq!(info.mac_count, Some(128));
        assert_eq!(info.device_version, Some(2));
        assert_eq!(info.vendor_ext, vec![vec![0x00, 0x00, 0x9a, 0x1f, 0x01]]);
        assert_eq!(info.part_number, None);
        let shown = info.to_string();
        assert!(shown.contains("MAC: 00:1b:21:aa:bb:cc"), "{shown}");
        assert!(shown.contains("Serial Number: SN0001\n"), "{shown}");
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut padded = sample();
        padded.resize(256, 0xff);
        assert_eq!(
            OnieInfo::decode(&padded).unwrap(),
            OnieInfo::decode(&sample()).unwrap()
        );
    }

    #[test]
    fn crc_is_checked() {
        let mut bad = sample();
        bad[HEADER_LEN + 3] ^= 0x20;
        assert!(matches!(
            OnieInfo::decode(&bad),
            Err(OnieError::BadCrc { .. })
        ));
    }

    #[test]
    fn malformed_images() {
        assert_eq!(OnieInfo::decode(b"TlvInfo"), Err(OnieError::BadHeader));
        assert_eq!(OnieInfo::decode(&[0xff; 64]), Err(OnieError::BadHeader));

        let mut version = sample();
        version[8] = 2;
        assert_eq!(
            OnieInfo::decode(&version),
            Err(OnieError::UnsupportedVersion(2))
        );

        let whole = sample();
        assert_eq!(
            OnieInfo::decode(&whole[..whole.len() - 2]),
            Err(OnieError::Truncated)
        );

        let mut oversized = TLV_INFO_ID.to_vec();
        oversized.extend_from_slice(&[1, 0xff, 0xff]);
        assert_eq!(
            OnieInfo::image_len(&oversized),
            Err(OnieError::TooLong(HEADER_LEN + 0xffff))
        );
        assert_eq!(
            status::StatusError::from(OnieError::TooLong(0)),
            status::StatusError::Invalid
        );

        let mut no_crc = TLV_INFO_ID.to_vec();
        no_crc.extend_from_slice(&[1, 0, 6, code::PRODUCT_NAME, 4]);
        no_crc.extend_from_slice(b"QS32");
        assert_eq!(OnieInfo::decode(&no_crc), Err(OnieError::MissingCrc));

        assert_eq!(
            OnieInfo::decode(&image(&[(code::MAC_BASE, &[1, 2, 3])])),
            Err(OnieError::BadField {
                code: code::MAC_BASE,
                len: 3
            })
        );
    }
}
