//! IP address text <-> 16-byte wire form
//!
//! IPv4 addresses travel as IPv4-mapped IPv6 (`::ffff:a.b.c.d`).

use crate::{Error, Result};

/// Length of an address on the wire
pub const IP_ADDRESS_SIZE: usize = 16;

/// Prefix marking an IPv4-mapped address
pub const IPV4_MAPPED_PREFIX: [u8; 12] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff];

/// Render a wire address as text.
///
/// IPv4-mapped addresses become dotted-decimal; everything else becomes
/// eight colon-separated hex groups without `::` compression.
#[must_use]
pub fn ip_to_text(raw: &[u8; IP_ADDRESS_SIZE]) -> String {
    if raw[..12] == IPV4_MAPPED_PREFIX {
        return format!("{}.{}.{}.{}", raw[12], raw[13], raw[14], raw[15]);
    }

    raw.chunks_exact(2)
        .map(|pair| format!("{:x}", u16::from_be_bytes([pair[0], pair[1]])))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parse dotted-quad or colon-hex text into the wire form
pub fn ip_from_text(text: &str) -> Result<[u8; IP_ADDRESS_SIZE]> {
    let invalid = || Error::bad_value("IP address", text);

    let quads: Vec<&str> = text.split('.').collect();
    if quads.len() == 4 {
        let mut raw = [0u8; IP_ADDRESS_SIZE];
        raw[..12].copy_from_slice(&IPV4_MAPPED_PREFIX);
        for (slot, quad) in raw[12..].iter_mut().zip(quads) {
            if !is_digits(quad, 3, 10) {
                return Err(invalid());
            }
            *slot = quad.parse().map_err(|_| invalid())?;
        }
        return Ok(raw);
    }

    let colon_groups = text.split(':').count();
    if !(3..=8).contains(&colon_groups) {
        return Err(invalid());
    }

    let groups = expand_ipv6_groups(text).ok_or_else(|| Error::bad_value("IPv6 address", text))?;
    let mut raw = [0u8; IP_ADDRESS_SIZE];
    for (chunk, group) in raw.chunks_exact_mut(2).zip(groups) {
        if !is_digits(group, 4, 16) {
            return Err(invalid());
        }
        let value = u16::from_str_radix(group, 16).map_err(|_| invalid())?;
        chunk.copy_from_slice(&value.to_be_bytes());
    }
    Ok(raw)
}

/// Expand a single `::` into zero groups so exactly eight remain
fn expand_ipv6_groups(text: &str) -> Option<Vec<&str>> {
    let halves: Vec<&str> = text.split("::").collect();
    let groups: Vec<&str> = match halves.as_slice() {
        [full] => full.split(':').collect(),
        [head, tail] => {
            let head: Vec<&str> = split_side(head);
            let tail: Vec<&str> = split_side(tail);
            let fill = 8usize.checked_sub(head.len() + tail.len())?;
            head.into_iter()
                .chain(std::iter::repeat_n("0", fill))
                .chain(tail)
                .collect()
        }
        _ => return None,
    };
    (groups.len() == 8).then_some(groups)
}

/// Unsigned group of 1..=`max_len` digits in `radix`
fn is_digits(group: &str, max_len: usize, radix: u32) -> bool {
    (1..=max_len).contains(&group.len()) && group.chars().all(|c| c.is_digit(radix))
}

fn split_side(side: &str) -> Vec<&str> {
    if side.is_empty() {
        vec!["0"]
    } else {
        side.split(':').collect()
    }
}
