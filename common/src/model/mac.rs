use std::fmt;
use std::str::FromStr;

use pnet::util::MacAddr;

use crate::error::MacParseError;

/// A hardware address in canonical form.
///
/// Two addresses are equal when their 12 hex digits are equal, whatever
/// notation they were read from. `Display` uses the dot-grouped notation most
/// switch CLIs print (`001b.2b3c.4d5e`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacAddress(MacAddr);

impl MacAddress {
    /// Builds an address from text in any notation. Every non-hex character is
    /// dropped first; what remains must be exactly 12 hex digits.
    pub fn parse(s: &str) -> Result<Self, MacParseError> {
        let digits: Vec<u8> = s
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();

        if digits.len() != 12 {
            return Err(MacParseError::InvalidLength(s.to_string()));
        }

        let mut octets = [0u8; 6];
        for (octet, pair) in octets.iter_mut().zip(digits.chunks(2)) {
            *octet = (pair[0] << 4) | pair[1];
        }
        Ok(Self::from(octets))
    }

    pub fn octets(&self) -> [u8; 6] {
        let MacAddr(a, b, c, d, e, f) = self.0;
        [a, b, c, d, e, f]
    }

    /// `001b2b3c4d5e`
    pub fn bare(&self) -> String {
        self.octets().iter().map(|b| format!("{b:02x}")).collect()
    }

    /// `00:1b:2b:3c:4d:5e`
    pub fn colon(&self) -> String {
        self.0.to_string()
    }

    /// `001b.2b3c.4d5e`
    pub fn dotted(&self) -> String {
        let bare = self.bare();
        format!("{}.{}.{}", &bare[0..4], &bare[4..8], &bare[8..12])
    }

    /// The three notations a device may print this address in, most specific
    /// first.
    pub fn notations(&self) -> [String; 3] {
        [self.dotted(), self.colon(), self.bare()]
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(o: [u8; 6]) -> Self {
        Self(MacAddr::new(o[0], o[1], o[2], o[3], o[4], o[5]))
    }
}

impl From<MacAddr> for MacAddress {
    fn from(mac: MacAddr) -> Self {
        Self(mac)
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}
