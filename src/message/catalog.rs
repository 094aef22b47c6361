//! Standard message catalog
//!
//! Each definition is built on first use and shared read-only afterwards.

use std::sync::LazyLock;

use super::MessageDef;
use crate::format::{
    Compound, Format, block_header, inventory_vector, network_address,
    network_address_without_timestamp, tx_in, tx_out,
};
use crate::{MAX_ADDR_ENTRIES, MAX_INVENTORY_ENTRIES};

pub(crate) const ALERT_COMMAND: &str = "alert";

fn define<const N: usize>(command: &'static str, fields: [(&'static str, Format); N]) -> MessageDef {
    MessageDef::from_parts(command.to_owned(), Compound::new(fields))
}

fn inventory(command: &'static str) -> MessageDef {
    define(
        command,
        [(
            "inventory",
            Format::bounded_list(inventory_vector(), None, Some(MAX_INVENTORY_ENTRIES)),
        )],
    )
}

fn locator(command: &'static str) -> MessageDef {
    define(
        command,
        [
            ("version", Format::U32),
            (
                "block_locator_hash",
                Format::bounded_list(Format::BYTES32, Some(1), None),
            ),
            ("hash_stop", Format::BYTES32),
        ],
    )
}

fn nonce(command: &'static str) -> MessageDef {
    define(command, [("nonce", Format::BYTES8)])
}

/// `addr`: known peer addresses
pub static ADDR: LazyLock<MessageDef> = LazyLock::new(|| {
    define(
        "addr",
        [(
            "addr_list",
            Format::bounded_list(network_address(), None, Some(MAX_ADDR_ENTRIES)),
        )],
    )
});

/// `alert`: signed network alert
pub static ALERT: LazyLock<MessageDef> = LazyLock::new(|| {
    define(
        ALERT_COMMAND,
        [("payload", Format::VarString), ("signature", Format::VarString)],
    )
});

/// `block`: a full block
pub static BLOCK: LazyLock<MessageDef> = LazyLock::new(|| {
    define(
        "block",
        [
            ("version", Format::U32),
            ("prev_block", Format::BYTES32),
            ("merkle_root", Format::BYTES32),
            ("timestamp", Format::U32),
            ("bits", Format::U32),
            ("nonce", Format::U32),
            ("txns", Format::list(crate::format::tx())),
        ],
    )
});

/// `getaddr`: request peer addresses
pub static GETADDR: LazyLock<MessageDef> = LazyLock::new(|| define("getaddr", []));

/// `getblocks`: request an inventory of blocks after a locator
pub static GETBLOCKS: LazyLock<MessageDef> = LazyLock::new(|| locator("getblocks"));

/// `getdata`: request objects by inventory
pub static GETDATA: LazyLock<MessageDef> = LazyLock::new(|| inventory("getdata"));

/// `getheaders`: request headers after a locator
pub static GETHEADERS: LazyLock<MessageDef> = LazyLock::new(|| locator("getheaders"));

/// `headers`: plain block headers
pub static HEADERS: LazyLock<MessageDef> =
    LazyLock::new(|| define("headers", [("headers", Format::list(block_header()))]));

/// `inv`: announce objects
pub static INV: LazyLock<MessageDef> = LazyLock::new(|| inventory("inv"));

/// `mempool`: request the peer's mempool inventory
pub static MEMPOOL: LazyLock<MessageDef> = LazyLock::new(|| define("mempool", []));

/// `notfound`: requested objects are unavailable
pub static NOTFOUND: LazyLock<MessageDef> = LazyLock::new(|| inventory("notfound"));

/// `ping`: liveness probe
pub static PING: LazyLock<MessageDef> = LazyLock::new(|| nonce("ping"));

/// `pong`: liveness reply
pub static PONG: LazyLock<MessageDef> = LazyLock::new(|| nonce("pong"));

/// `reject`: a previous message was rejected
pub static REJECT: LazyLock<MessageDef> = LazyLock::new(|| {
    define(
        "reject",
        [
            ("message", Format::VarString),
            ("ccode", Format::U8),
            ("reason", Format::VarString),
        ],
    )
});

/// `tx`: a transaction
pub static TX: LazyLock<MessageDef> = LazyLock::new(|| {
    define(
        "tx",
        [
            ("version", Format::U32),
            ("tx_in", Format::bounded_list(tx_in(), Some(1), None)),
            ("tx_out", Format::bounded_list(tx_out(), Some(1), None)),
            ("lock_time", Format::U32),
        ],
    )
});

/// `verack`: version acknowledged
pub static VERACK: LazyLock<MessageDef> = LazyLock::new(|| define("verack", []));

/// `version`: handshake opener
pub static VERSION: LazyLock<MessageDef> = LazyLock::new(|| {
    define(
        "version",
        [
            ("version", Format::I32),
            ("services", Format::U64),
            ("timestamp", Format::I64),
            ("addr_recv", network_address_without_timestamp()),
            ("addr_from", network_address_without_timestamp()),
            ("nonce", Format::BYTES8),
            ("user_agent", Format::VarString),
            ("start_height", Format::I32),
        ],
    )
});

/// `headers` on merge-mined chains: each header may carry AuxPoW
pub static AUXPOW_HEADERS: LazyLock<MessageDef> =
    LazyLock::new(|| define("headers", [("headers", Format::list(Format::BlockHeader))]));

/// Every standard definition, `headers` in its plain layout
pub fn standard() -> [&'static MessageDef; 17] {
    [
        &ADDR, &ALERT, &BLOCK, &GETADDR, &GETBLOCKS, &GETDATA, &GETHEADERS, &HEADERS, &INV,
        &MEMPOOL, &NOTFOUND, &PING, &PONG, &REJECT, &TX, &VERACK, &VERSION,
    ]
}
