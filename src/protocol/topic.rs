//! Device addressing encoded in topic strings.
//!
//! ```text
//! airmx / 01 / {0|1} / {0|1} / {0|1} / {0|1} / {deviceId}
//! ```
//!
//! The four flags are opaque protocol constants. They are kept verbatim and
//! only ever compared or echoed back, never interpreted.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Subscription filter for every status report the devices publish.
pub const STATUS_FILTER: &str = "airmx/01/+/+/1/1/+";

/// Flags used when addressing a command to a single device.
pub const COMMAND_FLAGS: [bool; 4] = [true, true, false, true];

const VENDOR: &str = "airmx";
const VERSION: &str = "01";
const PART_COUNT: usize = 7;

/// Reasons a topic string is rejected. The first violated rule, read left to
/// right, wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicFormatError {
    #[error("The topic format is expected to be airmx/+/+/+/+/+/+.")]
    PartCount,

    #[error("The 1st part of the topic must be \"airmx\".")]
    Vendor,

    #[error("The 2nd part of the topic must be \"01\".")]
    Version,

    /// `position` is the 1-indexed part number (3 through 6).
    #[error("The {position}{} part of the topic must be either \"1\" or \"0\".", ordinal_suffix(.position))]
    Flag { position: usize },

    #[error("The 7th part of the topic must be a device ID.")]
    DeviceId,
}

fn ordinal_suffix(position: &usize) -> &'static str {
    if *position == 3 {
        "rd"
    } else {
        "th"
    }
}

/// A parsed device topic. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Topic {
    flags: [bool; 4],
    device_id: u64,
}

impl Topic {
    pub fn new(flags: [bool; 4], device_id: u64) -> Self {
        Self { flags, device_id }
    }

    /// The topic a command for `device_id` is published to.
    pub fn command(device_id: u64) -> Self {
        Self::new(COMMAND_FLAGS, device_id)
    }

    pub fn parse(topic: &str) -> Result<Self, TopicFormatError> {
        let parts: Vec<&str> = topic.split('/').collect();

        if parts.len() != PART_COUNT {
            return Err(TopicFormatError::PartCount);
        }

        if parts[0] != VENDOR {
            return Err(TopicFormatError::Vendor);
        }

        if parts[1] != VERSION {
            return Err(TopicFormatError::Version);
        }

        let mut flags = [false; 4];
        for (index, flag) in flags.iter_mut().enumerate() {
            *flag = match parts[index + 2] {
                "1" => true,
                "0" => false,
                _ => {
                    return Err(TopicFormatError::Flag {
                        position: index + 3,
                    })
                }
            };
        }

        let raw_id = parts[6];
        if raw_id.is_empty() || !raw_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TopicFormatError::DeviceId);
        }
        let device_id = raw_id.parse().map_err(|_| TopicFormatError::DeviceId)?;

        Ok(Self { flags, device_id })
    }

    pub fn flags(&self) -> [bool; 4] {
        self.flags
    }

    pub fn device_id(&self) -> u64 {
        self.device_id
    }
}

impl FromStr for Topic {
    type Err = TopicFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", VENDOR, VERSION)?;
        for flag in self.flags {
            write!(f, "/{}", if flag { "1" } else { "0" })?;
        }
        write!(f, "/{}", self.device_id)
    }
}
