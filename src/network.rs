//! Well-known network magic numbers

use std::fmt;

use crate::MAGIC_SIZE;

/// Networks with a well-known magic number.
///
/// The codec accepts any four bytes; these are conveniences for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Network {
    /// Bitcoin main network
    Mainnet,
    /// Bitcoin test network v3
    Testnet3,
    /// Bitcoin regression test network
    Regtest,
    /// Bitcoin default signet
    Signet,
    /// Namecoin main network (AuxPoW)
    Namecoin,
    /// Dogecoin main network (AuxPoW)
    Dogecoin,
}

impl Network {
    /// Every known network
    pub const ALL: [Self; 6] = [
        Self::Mainnet,
        Self::Testnet3,
        Self::Regtest,
        Self::Signet,
        Self::Namecoin,
        Self::Dogecoin,
    ];

    /// Magic number that starts every message on this network
    #[must_use]
    pub const fn magic(self) -> [u8; MAGIC_SIZE] {
        match self {
            Self::Mainnet => [0xf9, 0xbe, 0xb4, 0xd9],
            Self::Testnet3 => [0x0b, 0x11, 0x09, 0x07],
            Self::Regtest => [0xfa, 0xbf, 0xb5, 0xda],
            Self::Signet => [0x0a, 0x03, 0xcf, 0x40],
            Self::Namecoin => [0xf9, 0xbe, 0xb4, 0xfe],
            Self::Dogecoin => [0xc0, 0xc0, 0xc0, 0xc0],
        }
    }

    /// Network using `magic`, if known
    #[must_use]
    pub fn from_magic(magic: [u8; MAGIC_SIZE]) -> Option<Self> {
        Self::ALL.into_iter().find(|network| network.magic() == magic)
    }

    /// Whether block headers on this network may carry AuxPoW
    #[must_use]
    pub const fn is_merge_mined(self) -> bool {
        matches!(self, Self::Namecoin | Self::Dogecoin)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mainnet => "mainnet",
            Self::Testnet3 => "testnet3",
            Self::Regtest => "regtest",
            Self::Signet => "signet",
            Self::Namecoin => "namecoin",
            Self::Dogecoin => "dogecoin",
        };
        write!(f, "{name}")
    }
}
