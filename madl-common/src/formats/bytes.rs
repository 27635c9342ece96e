//! Little-endian byte helpers shared by every record type

/// Fixed width of every name field (`string32`)
pub const NAME_LEN: usize = 32;

/// Encode a name as 32 raw bytes: UTF-8, NUL-padded, truncated at a char boundary.
pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut end = name.len().min(NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let mut bytes = [0u8; NAME_LEN];
    bytes[..end].copy_from_slice(&name.as_bytes()[..end]);
    bytes
}

/// Decode a NUL-padded name field.
pub fn decode_name(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

pub(crate) fn put_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Cursor over a byte slice. Every read returns `None` once the input runs out.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Start reading at an absolute offset.
    pub fn at(bytes: &'a [u8], offset: usize) -> Option<Self> {
        (offset <= bytes.len()).then_some(Self { bytes, pos: offset })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let slice = self.bytes.get(self.pos..end)?;
        self.pos = end;
        Some(slice)
    }

    fn array<const N: usize>(&mut self) -> Option<[u8; N]> {
        self.take(N)?.try_into().ok()
    }

    pub fn u8(&mut self) -> Option<u8> {
        self.array::<1>().map(|b| b[0])
    }

    pub fn i8(&mut self) -> Option<i8> {
        self.array().map(i8::from_le_bytes)
    }

    pub fn u16(&mut self) -> Option<u16> {
        self.array().map(u16::from_le_bytes)
    }

    pub fn u32(&mut self) -> Option<u32> {
        self.array().map(u32::from_le_bytes)
    }

    pub fn i32(&mut self) -> Option<i32> {
        self.array().map(i32::from_le_bytes)
    }

    pub fn f32(&mut self) -> Option<f32> {
        self.array().map(f32::from_le_bytes)
    }

    pub fn vec2(&mut self) -> Option<[f32; 2]> {
        Some([self.f32()?, self.f32()?])
    }

    pub fn vec3(&mut self) -> Option<[f32; 3]> {
        Some([self.f32()?, self.f32()?, self.f32()?])
    }

    pub fn name(&mut self) -> Option<String> {
        self.take(NAME_LEN).map(decode_name)
    }

    /// Length-prefixed (u32) byte run, copied out verbatim.
    pub fn byte_run(&mut self) -> Option<Vec<u8>> {
        let len = self.u32()? as usize;
        self.take(len).map(<[u8]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_padding() {
        let bytes = encode_name("root");
        assert_eq!(&bytes[..4], b"root");
        assert!(bytes[4..].iter().all(|&b| b == 0));
        assert_eq!(decode_name(&bytes), "root");
    }

    #[test]
    fn test_name_truncation() {
        let long = "a".repeat(40);
        let bytes = encode_name(&long);
        assert_eq!(decode_name(&bytes), "a".repeat(32));
    }

    #[test]
    fn test_name_truncation_respects_char_boundary() {
        // 31 ASCII bytes followed by a 2-byte character: the character must be dropped whole
        let name = format!("{}é", "b".repeat(31));
        let bytes = encode_name(&name);
        assert_eq!(bytes[31], 0);
        assert_eq!(decode_name(&bytes), "b".repeat(31));
    }

    #[test]
    fn test_reader_runs_out() {
        let data = [1u8, 0, 0];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.u16(), Some(1));
        assert_eq!(reader.u32(), None);
        assert_eq!(reader.u8(), Some(0));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_byte_run_preserves_high_bytes() {
        let payload = [0x89u8, 0x50, 0xFF, 0x80];
        let mut data = (payload.len() as u32).to_le_bytes().to_vec();
        data.extend_from_slice(&payload);
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.byte_run().unwrap(), payload);
    }
}
