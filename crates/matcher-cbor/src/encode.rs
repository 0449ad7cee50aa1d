use crate::item::{Item, Map};

const MAJOR_UINT: u8 = 0;
const MAJOR_NINT: u8 = 1;
const MAJOR_BSTR: u8 = 2;
const MAJOR_TSTR: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;

const SIMPLE_FALSE: u8 = 0xF4;
const SIMPLE_TRUE: u8 = 0xF5;
const SIMPLE_NULL: u8 = 0xF6;

impl Item {
    /// Encodes this item as definite-length CBOR with canonical (smallest
    /// possible) integer headers. Map entries are written in their current
    /// order; canonicalize first if canonical map ordering is wanted.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_size());
        self.encode_to(&mut out);
        out
    }

    pub fn encode_to(&self, out: &mut Vec<u8>) {
        match self {
            Item::Uint(value) => encode_header(MAJOR_UINT, *value, out),
            Item::Nint(value) => encode_header(MAJOR_NINT, nint_magnitude(*value), out),
            Item::Bstr(bytes) => {
                encode_header(MAJOR_BSTR, bytes.len() as u64, out);
                out.extend_from_slice(bytes);
            }
            Item::Tstr(text) => {
                encode_header(MAJOR_TSTR, text.len() as u64, out);
                out.extend_from_slice(text.as_bytes());
            }
            Item::Array(entries) => {
                encode_header(MAJOR_ARRAY, entries.len() as u64, out);
                for entry in entries {
                    entry.encode_to(out);
                }
            }
            Item::Map(map) => encode_map(map, out),
            Item::Bool(value) => out.push(if *value { SIMPLE_TRUE } else { SIMPLE_FALSE }),
            Item::Null => out.push(SIMPLE_NULL),
            Item::Tag(tag, inner) => {
                encode_header(MAJOR_TAG, *tag, out);
                inner.encode_to(out);
            }
        }
    }

    /// Size in bytes of [`Item::encode`] output, computed without encoding.
    pub fn encoded_size(&self) -> usize {
        match self {
            Item::Uint(value) => header_size(*value),
            Item::Nint(value) => header_size(nint_magnitude(*value)),
            Item::Bstr(bytes) => header_size(bytes.len() as u64) + bytes.len(),
            Item::Tstr(text) => header_size(text.len() as u64) + text.len(),
            Item::Array(entries) => {
                header_size(entries.len() as u64)
                    + entries.iter().map(Item::encoded_size).sum::<usize>()
            }
            Item::Map(map) => {
                header_size(map.len() as u64)
                    + map
                        .iter()
                        .map(|(key, value)| key.encoded_size() + value.encoded_size())
                        .sum::<usize>()
            }
            Item::Bool(_) | Item::Null => 1,
            Item::Tag(tag, inner) => header_size(*tag) + inner.encoded_size(),
        }
    }
}

fn encode_map(map: &Map, out: &mut Vec<u8>) {
    encode_header(MAJOR_MAP, map.len() as u64, out);
    for (key, value) in map.iter() {
        key.encode_to(out);
        value.encode_to(out);
    }
}

// The magnitude carried in the header of a negative integer: -1 - value,
// which in two's complement is the bitwise complement.
fn nint_magnitude(value: i64) -> u64 {
    !(value as u64)
}

fn encode_header(major: u8, value: u64, out: &mut Vec<u8>) {
    let initial = major << 5;
    if value < 24 {
        out.push(initial | value as u8);
    } else if value <= u8::MAX as u64 {
        out.push(initial | 24);
        out.push(value as u8);
    } else if value <= u16::MAX as u64 {
        out.push(initial | 25);
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= u32::MAX as u64 {
        out.push(initial | 26);
        out.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        out.push(initial | 27);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

fn header_size(value: u64) -> usize {
    if value < 24 {
        1
    } else if value <= u8::MAX as u64 {
        2
    } else if value <= u16::MAX as u64 {
        3
    } else if value <= u32::MAX as u64 {
        5
    } else {
        9
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_headers_use_smallest_length_class() {
        assert_eq!(Item::Uint(0).encode(), vec![0x00]);
        assert_eq!(Item::Uint(23).encode(), vec![0x17]);
        assert_eq!(Item::Uint(24).encode(), vec![0x18, 24]);
        assert_eq!(Item::Uint(255).encode(), vec![0x18, 255]);
        assert_eq!(Item::Uint(256).encode(), vec![0x19, 0x01, 0x00]);
        assert_eq!(Item::Uint(65536).encode(), vec![0x1A, 0, 1, 0, 0]);
        assert_eq!(
            Item::Uint(u64::MAX).encode(),
            vec![0x1B, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn negative_integers_encode_complement_magnitude() {
        assert_eq!(Item::Nint(-1).encode(), vec![0x20]);
        assert_eq!(Item::Nint(-24).encode(), vec![0x37]);
        assert_eq!(Item::Nint(-25).encode(), vec![0x38, 24]);
        assert_eq!(
            Item::Nint(i64::MIN).encode(),
            vec![0x3B, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn booleans_and_null_are_one_byte() {
        assert_eq!(Item::Bool(false).encode(), vec![0xF4]);
        assert_eq!(Item::Bool(true).encode(), vec![0xF5]);
        assert_eq!(Item::Null.encode(), vec![0xF6]);
    }

    #[test]
    fn encoded_size_matches_encoding() {
        let mut map = Map::new();
        map.insert("docType", "org.iso.18013.5.1.mDL");
        map.insert(1u64, vec![Item::Uint(300), Item::Nint(-42)]);
        let item = Item::Tag(24, Box::new(Item::Bstr(Item::Map(map).encode())));
        assert_eq!(item.encoded_size(), item.encode().len());
    }

    #[test]
    fn canonicalized_map_encodes_identically_twice() {
        let mut map = Map::new();
        map.insert("longer-key", 1u64);
        map.insert("a", 2u64);
        map.insert(2u64, 3u64);
        map.canonicalize(true);
        let first = Item::Map(map.clone()).encode();
        let second = Item::Map(map).encode();
        assert_eq!(first, second);
    }
}
