//! Standard base64 (RFC 4648, padded) for key files and CLI output.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = b'=';

pub fn base64_encode(data: &[u8]) -> String {
    let mut out = Vec::with_capacity(data.len().div_ceil(3) * 4);
    let chunks = data.chunks_exact(3);
    let tail = chunks.remainder();
    for chunk in chunks {
        encode_block([chunk[0], chunk[1], chunk[2]], 4, &mut out);
    }
    if !tail.is_empty() {
        let mut block = [0u8; 3];
        block[..tail.len()].copy_from_slice(tail);
        encode_block(block, tail.len() + 1, &mut out);
    }
    out.into_iter().map(char::from).collect()
}

/// Emit `symbols` alphabet characters for `block`, padding the quad with `=`.
fn encode_block(block: [u8; 3], symbols: usize, out: &mut Vec<u8>) {
    let triple = u32::from_be_bytes([0, block[0], block[1], block[2]]);
    for i in 0..4 {
        let symbol = if i < symbols {
            ALPHABET[((triple >> (18 - 6 * i)) & 0x3F) as usize]
        } else {
            PAD
        };
        out.push(symbol);
    }
}

/// Decode padded base64. ASCII whitespace is ignored; anything else outside
/// the alphabet, or a bad length, returns `None`.
pub fn base64_decode(text: &str) -> Option<Vec<u8>> {
    let symbols: Vec<u8> = text.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if symbols.len() % 4 != 0 {
        return None;
    }
    let quads = symbols.len() / 4;
    let mut out = Vec::with_capacity(quads * 3);
    for (i, quad) in symbols.chunks_exact(4).enumerate() {
        let pad = quad.iter().rev().take_while(|&&b| b == PAD).count();
        if pad > 2 || (pad > 0 && i + 1 != quads) {
            return None;
        }
        let mut triple = 0u32;
        for &b in &quad[..4 - pad] {
            triple = (triple << 6) | decode_symbol(b)?;
        }
        triple <<= 6 * pad as u32;
        let [_, b0, b1, b2] = triple.to_be_bytes();
        out.extend_from_slice(&[b0, b1, b2][..3 - pad]);
    }
    Some(out)
}

fn decode_symbol(b: u8) -> Option<u32> {
    ALPHABET.iter().position(|&c| c == b).map(|v| v as u32)
}
