//! Binary activity-file encoding.
//!
//! Implements the record-message container format the fitness upload endpoint
//! accepts: a 14-byte file header, definition/data message pairs, and a
//! trailing 16-bit checksum over every preceding byte. The consuming service
//! validates structurally, so field order, byte widths, scale factors and the
//! invalid-value sentinels must match the published profile exactly.
//!
//! Message layout
//!
//! | message        | global | fields (number, width, scale)                         |
//! |----------------|--------|-------------------------------------------------------|
//! | file_id        | 0      | type enum, manufacturer u16, product u16, serial u32z, time_created u32 |
//! | device_info    | 23     | timestamp u32, manufacturer u16, product u16          |
//! | weight_scale   | 30     | timestamp u32; weight, percent_fat, percent_hydration, bone_mass, muscle_mass u16 x100; bmi u16 x10 |
//! | file_creator   | 49     | software_version u16, hardware_version u8             |
//! | blood_pressure | 51     | timestamp u32; systolic u16, diastolic u16; heart_rate u8 |
//!
//! Timestamps are seconds since the format epoch (1989-12-31T00:00:00Z), not
//! the Unix epoch.

use bytes::{BufMut, BytesMut};
use time::OffsetDateTime;

use crate::error::{Error, Result};

/// Seconds between the Unix epoch and the container format epoch.
pub const FORMAT_EPOCH_OFFSET: i64 = 631_065_600;

const HEADER_SIZE: usize = 14;
const PROTOCOL_VERSION: u8 = 0x10;
const PROFILE_VERSION: u16 = 108;
const DATA_MAGIC: &[u8; 4] = b".FIT";

/// File-identification constants written into the file_id message.
const MANUFACTURER: u16 = 255;
const PRODUCT: u16 = 1;
const SERIAL_NUMBER: u32 = 1;
const SOFTWARE_VERSION: u16 = 100;

/// Global message numbers from the format profile.
const MSG_FILE_ID: u16 = 0;
const MSG_DEVICE_INFO: u16 = 23;
const MSG_WEIGHT_SCALE: u16 = 30;
const MSG_FILE_CREATOR: u16 = 49;
const MSG_BLOOD_PRESSURE: u16 = 51;

/// Local message types; also index the writer's defined-set.
const LOCAL_FILE_ID: u8 = 0;
const LOCAL_FILE_CREATOR: u8 = 1;
const LOCAL_DEVICE_INFO: u8 = 2;
const LOCAL_WEIGHT_SCALE: u8 = 3;
const LOCAL_BLOOD_PRESSURE: u8 = 4;

/// Definition-message marker bit in a record header.
const DEFINITION_BIT: u8 = 0x40;

/// Base type codes used in definition messages.
mod base_type {
    pub const ENUM: u8 = 0x00;
    pub const UINT8: u8 = 0x02;
    pub const UINT16: u8 = 0x84;
    pub const UINT32: u8 = 0x86;
    pub const UINT32Z: u8 = 0x8C;
}

/// Sentinels the consuming service reads as "no data", never as zero.
const INVALID_U8: u8 = 0xFF;
const INVALID_U16: u16 = 0xFFFF;

/// Checksum lookup table from the format specification.
const CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401,
    0xA001, 0x6C00, 0x7800, 0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

/// Fold `data` into a running 16-bit checksum.
#[must_use]
pub fn crc16(seed: u16, data: &[u8]) -> u16 {
    let mut crc = seed;
    for &byte in data {
        let mut tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc ^= tmp ^ CRC_TABLE[(byte & 0xF) as usize];

        tmp = CRC_TABLE[(crc & 0xF) as usize];
        crc = (crc >> 4) & 0x0FFF;
        crc ^= tmp ^ CRC_TABLE[((byte >> 4) & 0xF) as usize];
    }
    crc
}

/// Target file kind for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitFileKind {
    /// Weight-scale file (file type 9).
    Weight,
    /// Blood-pressure file (file type 14).
    BloodPressure,
}

impl FitFileKind {
    fn file_type(self) -> u8 {
        match self {
            FitFileKind::Weight => 9,
            FitFileKind::BloodPressure => 14,
        }
    }
}

/// One weight-scale sample; `None` fields encode as the sentinel value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightSample {
    /// Body weight in kilograms.
    pub weight: Option<f64>,
    /// Fat ratio as a percentage.
    pub percent_fat: Option<f64>,
    /// Body water as a percentage of weight.
    pub percent_hydration: Option<f64>,
    /// Bone mass in kilograms.
    pub bone_mass: Option<f64>,
    /// Muscle mass in kilograms.
    pub muscle_mass: Option<f64>,
    /// Body mass index.
    pub bmi: Option<f64>,
}

/// One blood-pressure sample; `None` fields encode as the sentinel value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BloodPressureSample {
    /// Diastolic blood pressure in mmHg.
    pub diastolic: Option<f64>,
    /// Systolic blood pressure in mmHg.
    pub systolic: Option<f64>,
    /// Heart rate in beats per minute.
    pub heart_rate: Option<f64>,
}

/// A finalized, immutable container buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitFile {
    bytes: Vec<u8>,
}

impl FitFile {
    /// The complete file image, header through checksum.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the file and take its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total file length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// A finalized file is never empty; provided for slice-like completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Field descriptor inside a definition message.
struct FieldDef {
    number: u8,
    size: u8,
    base_type: u8,
}

/// Stateful writer accumulating one file's worth of messages.
///
/// The message sequence is header, file_id, file_creator, then per-record
/// device_info and sample messages. [`FitFileWriter::finish`] consumes the
/// writer, patches the header's data-size field and appends the checksum;
/// because `finish` takes ownership, writing after finalization or
/// finalizing twice is rejected at compile time rather than corrupting the
/// buffer at run time.
#[derive(Debug)]
pub struct FitFileWriter {
    kind: FitFileKind,
    buf: BytesMut,
    defined: [bool; 5],
}

impl FitFileWriter {
    /// Create a writer for the given file kind.
    ///
    /// The header bytes are reserved immediately and patched by `finish`.
    #[must_use]
    pub fn new(kind: FitFileKind) -> Self {
        let mut buf = BytesMut::with_capacity(256);
        buf.put_bytes(0, HEADER_SIZE);
        Self {
            kind,
            buf,
            defined: [false; 5],
        }
    }

    /// Append the file-identification message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreEpochTimestamp`] when `created_at` predates the
    /// format epoch.
    pub fn write_file_info(&mut self, created_at: OffsetDateTime) -> Result<()> {
        let ts = format_timestamp(created_at)?;
        self.define(
            LOCAL_FILE_ID,
            MSG_FILE_ID,
            &[
                FieldDef { number: 0, size: 1, base_type: base_type::ENUM },
                FieldDef { number: 1, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 2, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 3, size: 4, base_type: base_type::UINT32Z },
                FieldDef { number: 4, size: 4, base_type: base_type::UINT32 },
            ],
        );
        self.buf.put_u8(LOCAL_FILE_ID);
        self.buf.put_u8(self.kind.file_type());
        self.buf.put_u16_le(MANUFACTURER);
        self.buf.put_u16_le(PRODUCT);
        self.buf.put_u32_le(SERIAL_NUMBER);
        self.buf.put_u32_le(ts);
        Ok(())
    }

    /// Append the software-version descriptor message.
    pub fn write_file_creator(&mut self) {
        self.define(
            LOCAL_FILE_CREATOR,
            MSG_FILE_CREATOR,
            &[
                FieldDef { number: 0, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 1, size: 1, base_type: base_type::UINT8 },
            ],
        );
        self.buf.put_u8(LOCAL_FILE_CREATOR);
        self.buf.put_u16_le(SOFTWARE_VERSION);
        self.buf.put_u8(INVALID_U8);
    }

    /// Append a per-record device-context message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreEpochTimestamp`] when `timestamp` predates the
    /// format epoch.
    pub fn write_device_info(&mut self, timestamp: OffsetDateTime) -> Result<()> {
        let ts = format_timestamp(timestamp)?;
        self.define(
            LOCAL_DEVICE_INFO,
            MSG_DEVICE_INFO,
            &[
                FieldDef { number: 253, size: 4, base_type: base_type::UINT32 },
                FieldDef { number: 2, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 4, size: 2, base_type: base_type::UINT16 },
            ],
        );
        self.buf.put_u8(LOCAL_DEVICE_INFO);
        self.buf.put_u32_le(ts);
        self.buf.put_u16_le(MANUFACTURER);
        self.buf.put_u16_le(PRODUCT);
        Ok(())
    }

    /// Append a weight-scale sample message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreEpochTimestamp`] for a pre-epoch timestamp and
    /// [`Error::FieldRange`] when a scaled value does not fit its field.
    pub fn write_weight_scale(
        &mut self,
        timestamp: OffsetDateTime,
        sample: &WeightSample,
    ) -> Result<()> {
        let ts = format_timestamp(timestamp)?;
        let weight = scale_u16(sample.weight, 100.0, "weight_scale", "weight")?;
        let percent_fat = scale_u16(sample.percent_fat, 100.0, "weight_scale", "percent_fat")?;
        let percent_hydration = scale_u16(
            sample.percent_hydration,
            100.0,
            "weight_scale",
            "percent_hydration",
        )?;
        let bone_mass = scale_u16(sample.bone_mass, 100.0, "weight_scale", "bone_mass")?;
        let muscle_mass = scale_u16(sample.muscle_mass, 100.0, "weight_scale", "muscle_mass")?;
        let bmi = scale_u16(sample.bmi, 10.0, "weight_scale", "bmi")?;

        self.define(
            LOCAL_WEIGHT_SCALE,
            MSG_WEIGHT_SCALE,
            &[
                FieldDef { number: 253, size: 4, base_type: base_type::UINT32 },
                FieldDef { number: 0, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 1, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 2, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 4, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 5, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 13, size: 2, base_type: base_type::UINT16 },
            ],
        );
        self.buf.put_u8(LOCAL_WEIGHT_SCALE);
        self.buf.put_u32_le(ts);
        self.buf.put_u16_le(weight);
        self.buf.put_u16_le(percent_fat);
        self.buf.put_u16_le(percent_hydration);
        self.buf.put_u16_le(bone_mass);
        self.buf.put_u16_le(muscle_mass);
        self.buf.put_u16_le(bmi);
        Ok(())
    }

    /// Append a blood-pressure sample message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PreEpochTimestamp`] for a pre-epoch timestamp and
    /// [`Error::FieldRange`] when a value does not fit its field.
    pub fn write_blood_pressure(
        &mut self,
        timestamp: OffsetDateTime,
        sample: &BloodPressureSample,
    ) -> Result<()> {
        let ts = format_timestamp(timestamp)?;
        let systolic = scale_u16(sample.systolic, 1.0, "blood_pressure", "systolic")?;
        let diastolic = scale_u16(sample.diastolic, 1.0, "blood_pressure", "diastolic")?;
        let heart_rate = scale_u8(sample.heart_rate, "blood_pressure", "heart_rate")?;

        self.define(
            LOCAL_BLOOD_PRESSURE,
            MSG_BLOOD_PRESSURE,
            &[
                FieldDef { number: 253, size: 4, base_type: base_type::UINT32 },
                FieldDef { number: 0, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 1, size: 2, base_type: base_type::UINT16 },
                FieldDef { number: 6, size: 1, base_type: base_type::UINT8 },
            ],
        );
        self.buf.put_u8(LOCAL_BLOOD_PRESSURE);
        self.buf.put_u32_le(ts);
        self.buf.put_u16_le(systolic);
        self.buf.put_u16_le(diastolic);
        self.buf.put_u8(heart_rate);
        Ok(())
    }

    /// Patch the header, append the checksum and return the immutable file.
    ///
    /// The header's data-size field is set to the byte length of everything
    /// between header and checksum; the checksum covers every byte before it,
    /// header included, and lands as the final two bytes little-endian.
    #[must_use]
    pub fn finish(mut self) -> FitFile {
        let data_size = (self.buf.len() - HEADER_SIZE) as u32;
        self.buf[0] = HEADER_SIZE as u8;
        self.buf[1] = PROTOCOL_VERSION;
        self.buf[2..4].copy_from_slice(&PROFILE_VERSION.to_le_bytes());
        self.buf[4..8].copy_from_slice(&data_size.to_le_bytes());
        self.buf[8..12].copy_from_slice(DATA_MAGIC);
        let header_crc = crc16(0, &self.buf[..12]);
        self.buf[12..14].copy_from_slice(&header_crc.to_le_bytes());

        let file_crc = crc16(0, &self.buf);
        self.buf.put_u16_le(file_crc);

        FitFile {
            bytes: self.buf.to_vec(),
        }
    }

    /// Append a definition message once per local message type.
    fn define(&mut self, local: u8, global: u16, fields: &[FieldDef]) {
        if self.defined[local as usize] {
            return;
        }
        self.defined[local as usize] = true;
        self.buf.put_u8(DEFINITION_BIT | local);
        self.buf.put_u8(0); // reserved
        self.buf.put_u8(0); // architecture: little-endian
        self.buf.put_u16_le(global);
        self.buf.put_u8(fields.len() as u8);
        for field in fields {
            self.buf.put_u8(field.number);
            self.buf.put_u8(field.size);
            self.buf.put_u8(field.base_type);
        }
    }
}

/// Seconds since the format epoch.
fn format_timestamp(timestamp: OffsetDateTime) -> Result<u32> {
    let unix = timestamp.unix_timestamp();
    u32::try_from(unix - FORMAT_EPOCH_OFFSET).map_err(|_| Error::PreEpochTimestamp(unix))
}

/// Scale into a u16 field, substituting the sentinel for absent input.
///
/// The sentinel itself is excluded from the encodable range so that real data
/// can never masquerade as "no data".
fn scale_u16(
    value: Option<f64>,
    scale: f64,
    message: &'static str,
    field: &'static str,
) -> Result<u16> {
    let Some(value) = value else {
        return Ok(INVALID_U16);
    };
    let scaled = (value * scale).round();
    if scaled < 0.0 || scaled >= f64::from(INVALID_U16) {
        return Err(Error::FieldRange {
            message,
            field,
            value,
        });
    }
    Ok(scaled as u16)
}

/// Scale into a u8 field, substituting the sentinel for absent input.
fn scale_u8(value: Option<f64>, message: &'static str, field: &'static str) -> Result<u8> {
    let Some(value) = value else {
        return Ok(INVALID_U8);
    };
    let scaled = value.round();
    if scaled < 0.0 || scaled >= f64::from(INVALID_U8) {
        return Err(Error::FieldRange {
            message,
            field,
            value,
        });
    }
    Ok(scaled as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(format_seconds: i64) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(FORMAT_EPOCH_OFFSET + format_seconds).unwrap()
    }

    fn header_data_size(bytes: &[u8]) -> u32 {
        u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]])
    }

    #[test]
    fn test_finished_file_declares_payload_size() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        writer.write_file_info(ts(1000)).unwrap();
        writer.write_file_creator();
        writer.write_device_info(ts(1000)).unwrap();
        writer
            .write_weight_scale(
                ts(1000),
                &WeightSample {
                    weight: Some(80.0),
                    ..WeightSample::default()
                },
            )
            .unwrap();
        let file = writer.finish();
        let bytes = file.as_bytes();

        // Total length = header + declared payload + 2-byte checksum.
        assert_eq!(bytes.len(), 14 + header_data_size(bytes) as usize + 2);
        assert_eq!(&bytes[8..12], b".FIT");
        assert_eq!(bytes[0], 14);
    }

    #[test]
    fn test_trailing_checksum_matches_recomputation() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        writer.write_file_info(ts(5000)).unwrap();
        writer.write_file_creator();
        writer
            .write_weight_scale(
                ts(5000),
                &WeightSample {
                    weight: Some(72.35),
                    percent_fat: Some(21.5),
                    ..WeightSample::default()
                },
            )
            .unwrap();
        let file = writer.finish();
        let bytes = file.as_bytes();

        let stored = u16::from_le_bytes([bytes[bytes.len() - 2], bytes[bytes.len() - 1]]);
        assert_eq!(crc16(0, &bytes[..bytes.len() - 2]), stored);
    }

    #[test]
    fn test_header_checksum_covers_first_twelve_bytes() {
        let mut writer = FitFileWriter::new(FitFileKind::BloodPressure);
        writer.write_file_info(ts(0)).unwrap();
        let file = writer.finish();
        let bytes = file.as_bytes();

        let stored = u16::from_le_bytes([bytes[12], bytes[13]]);
        assert_eq!(crc16(0, &bytes[..12]), stored);
    }

    #[test]
    fn test_absent_fields_encode_as_sentinel_not_zero() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        writer
            .write_weight_scale(
                ts(1000),
                &WeightSample {
                    weight: Some(80.0),
                    ..WeightSample::default()
                },
            )
            .unwrap();
        let file = writer.finish();
        let bytes = file.as_bytes();

        // The data message is the last 17 bytes before the checksum:
        // local header, timestamp u32, then six u16 fields.
        let data_end = bytes.len() - 2;
        let fields = &bytes[data_end - 12..data_end];
        assert_eq!(&fields[0..2], &80_00u16.to_le_bytes()); // weight, scale 100
        for absent in fields[2..].chunks(2) {
            assert_eq!(absent, &[0xFF, 0xFF]);
        }
    }

    #[test]
    fn test_timestamp_uses_format_epoch() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        writer.write_device_info(ts(123_456)).unwrap();
        let file = writer.finish();
        let bytes = file.as_bytes();

        // device_info data message: local header, timestamp, 2 x u16.
        let data_end = bytes.len() - 2;
        let ts_bytes = &bytes[data_end - 8..data_end - 4];
        assert_eq!(u32::from_le_bytes(ts_bytes.try_into().unwrap()), 123_456);
    }

    #[test]
    fn test_pre_epoch_timestamp_is_rejected() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        let before_epoch = OffsetDateTime::from_unix_timestamp(0).unwrap();
        let err = writer.write_device_info(before_epoch).unwrap_err();
        assert!(matches!(err, Error::PreEpochTimestamp(0)));
    }

    #[test]
    fn test_out_of_range_value_is_an_error_not_truncation() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        let err = writer
            .write_weight_scale(
                ts(1000),
                &WeightSample {
                    weight: Some(700.0), // scales to 70000, beyond u16
                    ..WeightSample::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            Error::FieldRange {
                field: "weight",
                ..
            }
        ));
    }

    #[test]
    fn test_definitions_written_once_per_message_kind() {
        let mut writer = FitFileWriter::new(FitFileKind::Weight);
        writer
            .write_weight_scale(ts(1000), &WeightSample::default())
            .unwrap();
        let one = writer.buf.len();
        writer
            .write_weight_scale(ts(2000), &WeightSample::default())
            .unwrap();
        let two = writer.buf.len();

        // Second message appends only the 17-byte data message, no definition.
        assert_eq!(two - one, 17);
    }

    #[test]
    fn test_blood_pressure_heart_rate_sentinel() {
        let mut writer = FitFileWriter::new(FitFileKind::BloodPressure);
        writer
            .write_blood_pressure(
                ts(1000),
                &BloodPressureSample {
                    diastolic: Some(80.0),
                    systolic: Some(120.0),
                    heart_rate: None,
                },
            )
            .unwrap();
        let file = writer.finish();
        let bytes = file.as_bytes();

        // blood_pressure data message tail: systolic u16, diastolic u16, heart_rate u8.
        let data_end = bytes.len() - 2;
        assert_eq!(bytes[data_end - 1], 0xFF);
        assert_eq!(
            &bytes[data_end - 5..data_end - 3],
            &120u16.to_le_bytes()
        );
        assert_eq!(&bytes[data_end - 3..data_end - 1], &80u16.to_le_bytes());
    }
}
