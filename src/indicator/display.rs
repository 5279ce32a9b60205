use std::io::Write;

/// Clear display and home the cursor.
pub const CMD_CLEAR: u8 = 0x76;
/// Decimal point / colon control; followed by a bitmask.
pub const CMD_DECIMAL: u8 = 0x77;
/// Bitmask lighting the second decimal point (`XXX.X`).
pub const DECIMAL_POINT_2: u8 = 0x04;

/// Largest value that fits four digits with one decimal.
const MAX_TENTHS: i32 = 9999;

/// Encode a rate for a 4-digit serial 7-segment display
///
/// The value is rounded to one decimal place and shown as `XXX.X`, with
/// leading zeros blanked. Values above 999.9 show `0F` (overflow).
///
/// # Example
/// ```
/// use qrsbeat::indicator::display::encode_bpm;
///
/// assert_eq!(encode_bpm(72.04), vec![0x76, b' ', b'7', b'2', b'0', 0x77, 0x04]);
/// ```
pub fn encode_bpm(bpm: f32) -> Vec<u8> {
    let tenths = ((bpm * 10.0 + 0.5) as i32).max(0);

    let mut bytes = vec![CMD_CLEAR];
    if tenths > MAX_TENTHS {
        bytes.extend_from_slice(b"0F");
        return bytes;
    }

    let mut leading_zeros = true;
    for power in [1000, 100, 10, 1] {
        let digit = (tenths / power % 10) as u8;
        leading_zeros &= digit == 0;
        bytes.push(if leading_zeros { b' ' } else { b'0' + digit });
    }

    bytes.push(CMD_DECIMAL);
    bytes.push(DECIMAL_POINT_2);
    bytes
}

/// Serial 7-segment display showing the current heart rate.
pub struct SevenSegmentDisplay<W: Write> {
    port: W,
}

impl<W: Write> SevenSegmentDisplay<W> {
    pub fn new(port: W) -> Self {
        Self { port }
    }

    pub fn show_bpm(&mut self, bpm: f32) -> std::io::Result<()> {
        self.port.write_all(&encode_bpm(bpm))?;
        self.port.flush()
    }

    pub fn into_inner(self) -> W {
        self.port
    }
}
