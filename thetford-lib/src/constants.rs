// Protocol constants for the Thetford status frame and the USBlini adapter

/// LIN frame identifier of the refrigerator's control status frame
pub const STATUS_FRAME_ID: u8 = 0x0C;

/// Number of payload bytes in a status frame
pub const STATUS_FRAME_LEN: usize = 8;

/// LIN frame identifier used for the empty wake-up frame
pub const WAKEUP_FRAME_ID: u8 = 0x00;

/// Bit in the mode byte signalling automatic energy source selection
pub const MODE_AUTO_FLAG: u8 = 0x08;

/// Bit in the D+ byte set while the vehicle's alternator is running
pub const DPLUS_ACTIVE_FLAG: u8 = 0x40;

/// Internal supply voltage is reported in tenths of a volt
pub const INT_SUPPLY_SCALE: f64 = 10.0;

/// LIN baud rate used by the refrigerator controller
pub const LIN_BAUDRATE: u16 = 19_200;

/// Spacing between frames of one master sequence run, in milliseconds
pub const SEQUENCE_FRAME_SPACING_MS: u16 = 200;

/// Delay between the wake-up frame and the first scheduled poll
pub const WAKEUP_SETTLE_MS: u64 = 200;

/// Default period of the adapter's master sequence, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Delay between attempts to open the adapter
pub const OPEN_RETRY_DELAY_SECS: u64 = 5;

// --- USBlini adapter ---

pub const USBLINI_VID: u16 = 0x04D8;
pub const USBLINI_PID: u16 = 0xE870;
pub const ENDPOINT_OUT: u8 = 0x01;
pub const ENDPOINT_IN: u8 = 0x81;

/// Size of a single adapter report on the IN endpoint
pub const REPORT_SIZE: usize = 64;

/// Report header: report type, protected identifier, payload length
pub const REPORT_HEADER_SIZE: usize = 3;

/// Maximum payload of a LIN frame
pub const LIN_MAX_DATA_LEN: usize = 8;
