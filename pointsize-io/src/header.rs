//! PLY header parsing
//!
//! Reads the ASCII preamble of a `binary_little_endian 1.0` PLY file and
//! produces the ordered vertex property layout, the vertex count, and the
//! exact byte offset where the binary body begins.

use pointsize_core::{format_error, Result};
use std::io::{BufRead, Read};

/// Required first line
pub const MAGIC: &str = "ply";

/// Required second line
pub const FORMAT_LINE: &str = "format binary_little_endian 1.0";

/// Header terminator line
pub const END_HEADER: &str = "end_header";

/// Longest header line accepted, terminator included
pub const MAX_HEADER_LINE: usize = 4096;

/// One field of an on-disk vertex record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyTag {
    PositionX,
    PositionY,
    PositionZ,
    ColorR,
    ColorG,
    ColorB,
    ColorA,
    /// Unrecognized 1-byte property, consumed and discarded
    Skip1,
    /// Unrecognized 2-byte property, consumed and discarded
    Skip2,
    /// Unrecognized 4-byte property, consumed and discarded
    Skip4,
}

impl PropertyTag {
    /// Width of the field in bytes
    pub fn width(self) -> usize {
        match self {
            PropertyTag::PositionX | PropertyTag::PositionY | PropertyTag::PositionZ => 4,
            PropertyTag::ColorR | PropertyTag::ColorG | PropertyTag::ColorB | PropertyTag::ColorA => 1,
            PropertyTag::Skip1 => 1,
            PropertyTag::Skip2 => 2,
            PropertyTag::Skip4 => 4,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "x" => Some(PropertyTag::PositionX),
            "y" => Some(PropertyTag::PositionY),
            "z" => Some(PropertyTag::PositionZ),
            "red" => Some(PropertyTag::ColorR),
            "green" => Some(PropertyTag::ColorG),
            "blue" => Some(PropertyTag::ColorB),
            "alpha" => Some(PropertyTag::ColorA),
            _ => None,
        }
    }

    fn skip(width: usize) -> Self {
        match width {
            1 => PropertyTag::Skip1,
            2 => PropertyTag::Skip2,
            _ => PropertyTag::Skip4,
        }
    }
}

/// Byte width of a PLY scalar type spelling, if supported
fn type_width(ty: &str) -> Option<usize> {
    match ty {
        "char" | "uchar" => Some(1),
        "short" | "ushort" => Some(2),
        "int" | "uint" | "float" => Some(4),
        _ => None,
    }
}

/// Parsed header of a binary PLY point cloud
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlyHeader {
    /// Vertex properties in on-disk order
    pub properties: Vec<PropertyTag>,
    pub vertex_count: usize,
    /// Bytes consumed by the header text, terminators included
    pub body_offset: u64,
}

impl PlyHeader {
    /// Size of one vertex record in bytes
    pub fn record_stride(&self) -> usize {
        self.properties.iter().map(|p| p.width()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// No element declared yet
    Preamble,
    /// Inside `element vertex`
    Recording,
    /// Inside any other element
    Skipping,
}

/// Line reader that counts every byte it hands out
struct LineCounter<'a, R> {
    reader: &'a mut R,
    consumed: u64,
    buf: Vec<u8>,
}

impl<'a, R: BufRead> LineCounter<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            consumed: 0,
            buf: Vec::with_capacity(128),
        }
    }

    /// Next line without its terminator, or `None` at end of stream
    fn next_line(&mut self) -> Result<Option<&str>> {
        self.buf.clear();
        let read = (&mut *self.reader)
            .take(MAX_HEADER_LINE as u64 + 1)
            .read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            return Ok(None);
        }
        if read > MAX_HEADER_LINE {
            return Err(format_error(format!(
                "header line exceeds {} bytes",
                MAX_HEADER_LINE
            )));
        }
        self.consumed += read as u64;

        let mut line = &self.buf[..];
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest;
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
        std::str::from_utf8(line)
            .map(Some)
            .map_err(|_| format_error("header line is not valid ASCII"))
    }
}

/// Read a PLY header from the start of `reader`.
///
/// On success the returned [`PlyHeader::body_offset`] is the number of bytes
/// the header occupies. Callers seek to that offset to decode the body; it
/// is never re-derived by searching for `end_header` in the raw bytes.
pub fn read_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader> {
    let mut lines = LineCounter::new(reader);

    match lines.next_line()? {
        Some(MAGIC) => {}
        Some(other) => {
            return Err(format_error(format!("magic mismatch: expected 'ply', found '{}'", other)))
        }
        None => return Err(format_error("truncated header")),
    }

    match lines.next_line()? {
        Some(FORMAT_LINE) => {}
        Some(other) => {
            return Err(format_error(format!(
                "unsupported encoding '{}', expected '{}'",
                other, FORMAT_LINE
            )))
        }
        None => return Err(format_error("truncated header")),
    }

    let mut properties = Vec::new();
    let mut vertex_count = None;
    let mut section = Section::Preamble;

    loop {
        let Some(line) = lines.next_line()? else {
            return Err(format_error("truncated header: missing 'end_header'"));
        };
        if line == END_HEADER {
            break;
        }

        let cols: Vec<&str> = line.split_whitespace().collect();
        match cols.first().copied() {
            None | Some("comment") | Some("obj_info") => continue,
            Some("element") => {
                let (name, count) = match cols.as_slice() {
                    [_, name, count] => (*name, *count),
                    _ => return Err(format_error(format!("malformed element line '{}'", line))),
                };
                if name == "vertex" {
                    if vertex_count.is_some() {
                        return Err(format_error("duplicate 'element vertex' declaration"));
                    }
                    let count = count.parse::<usize>().map_err(|_| {
                        format_error(format!("invalid vertex count '{}'", count))
                    })?;
                    vertex_count = Some(count);
                    section = Section::Recording;
                } else {
                    section = Section::Skipping;
                }
            }
            Some("property") => match section {
                Section::Skipping => continue,
                Section::Preamble => {
                    return Err(format_error(format!(
                        "property declared before any element: '{}'",
                        line
                    )))
                }
                Section::Recording => properties.push(parse_property(&cols, line)?),
            },
            Some(keyword) => {
                return Err(format_error(format!("unrecognized header keyword '{}'", keyword)))
            }
        }
    }

    let vertex_count =
        vertex_count.ok_or_else(|| format_error("missing 'element vertex' declaration"))?;
    if vertex_count > 0 && properties.is_empty() {
        return Err(format_error("'element vertex' declares no properties"));
    }

    let header = PlyHeader {
        properties,
        vertex_count,
        body_offset: lines.consumed,
    };
    tracing::debug!(
        vertex_count = header.vertex_count,
        properties = header.properties.len(),
        body_offset = header.body_offset,
        "parsed PLY header"
    );
    Ok(header)
}

fn parse_property(cols: &[&str], line: &str) -> Result<PropertyTag> {
    let ty = cols
        .get(1)
        .ok_or_else(|| format_error(format!("malformed property line '{}'", line)))?;
    let width = type_width(ty)
        .ok_or_else(|| format_error(format!("unsupported property type ('{}')", line)))?;
    let name = match cols {
        [_, _, name] => *name,
        _ => return Err(format_error(format!("malformed property line '{}'", line))),
    };

    match PropertyTag::from_name(name) {
        Some(tag) if tag.width() != width => Err(format_error(format!(
            "property width mismatch: '{}' must be {} bytes ('{}')",
            name,
            tag.width(),
            line
        ))),
        Some(tag) => Ok(tag),
        None => Ok(PropertyTag::skip(width)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointsize_core::Error;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<PlyHeader> {
        read_header(&mut Cursor::new(text.as_bytes().to_vec()))
    }

    fn format_message(result: Result<PlyHeader>) -> String {
        match result {
            Err(Error::Format(msg)) => msg,
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_minimal_xyz_header() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let header = parse(text).unwrap();
        assert_eq!(header.vertex_count, 3);
        assert_eq!(
            header.properties,
            vec![PropertyTag::PositionX, PropertyTag::PositionY, PropertyTag::PositionZ]
        );
        assert_eq!(header.body_offset, text.len() as u64);
        assert_eq!(header.record_stride(), 12);
    }

    #[test]
    fn test_colors_and_skipped_properties_keep_order() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 1\n\
                    property float x\nproperty float y\nproperty float z\n\
                    property float nx\nproperty uchar red\nproperty uchar green\n\
                    property uchar blue\nproperty short quality\nproperty uchar alpha\n\
                    property char flag\nend_header\n";
        let header = parse(text).unwrap();
        assert_eq!(
            header.properties,
            vec![
                PropertyTag::PositionX,
                PropertyTag::PositionY,
                PropertyTag::PositionZ,
                PropertyTag::Skip4,
                PropertyTag::ColorR,
                PropertyTag::ColorG,
                PropertyTag::ColorB,
                PropertyTag::Skip2,
                PropertyTag::ColorA,
                PropertyTag::Skip1,
            ]
        );
        assert_eq!(header.record_stride(), 12 + 4 + 3 + 2 + 1 + 1);
    }

    #[test]
    fn test_other_elements_are_skipped() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\n\
                    element face 5\nproperty list uchar int vertex_indices\nproperty double weight\n\
                    end_header\n";
        let header = parse(text).unwrap();
        assert_eq!(header.vertex_count, 2);
        assert_eq!(header.properties, vec![PropertyTag::PositionX]);
    }

    #[test]
    fn test_recording_resumes_after_vertex_element() {
        let text = "ply\nformat binary_little_endian 1.0\nelement camera 1\nproperty float view_px\n\
                    element vertex 4\nproperty float x\nproperty uint label\nend_header\n";
        let header = parse(text).unwrap();
        assert_eq!(header.vertex_count, 4);
        assert_eq!(header.properties, vec![PropertyTag::PositionX, PropertyTag::Skip4]);
    }

    #[test]
    fn test_comments_and_crlf_are_counted() {
        let text = "ply\r\nformat binary_little_endian 1.0\r\ncomment made by a scanner\r\n\
                    element vertex 0\r\nproperty float x\r\nend_header\r\n";
        let header = parse(text).unwrap();
        assert_eq!(header.vertex_count, 0);
        assert_eq!(header.body_offset, text.len() as u64);
    }

    #[test]
    fn test_body_offset_ignores_end_header_bytes_in_body() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty uchar red\nend_header\n".to_vec();
        let offset = bytes.len() as u64;
        bytes.extend_from_slice(b"end_header\n");
        let header = read_header(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(header.body_offset, offset);
    }

    #[test]
    fn test_magic_with_trailing_space_rejected() {
        let msg = format_message(parse("ply \nformat binary_little_endian 1.0\nend_header\n"));
        assert!(msg.contains("magic mismatch"), "{}", msg);
    }

    #[test]
    fn test_ascii_encoding_rejected() {
        let msg = format_message(parse("ply\nformat ascii 1.0\nelement vertex 1\nend_header\n"));
        assert!(msg.contains("unsupported encoding"), "{}", msg);
    }

    #[test]
    fn test_big_endian_rejected() {
        let msg = format_message(parse("ply\nformat binary_big_endian 1.0\nend_header\n"));
        assert!(msg.contains("unsupported encoding"), "{}", msg);
    }

    #[test]
    fn test_unsupported_property_type() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty double x\nend_header\n",
        ));
        assert!(msg.contains("unsupported property type"), "{}", msg);
    }

    #[test]
    fn test_list_property_in_vertex_element_rejected() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty list uchar int idx\nend_header\n",
        ));
        assert!(msg.contains("unsupported property type"), "{}", msg);
    }

    #[test]
    fn test_property_without_name_rejected() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float\nend_header\n",
        ));
        assert!(msg.contains("malformed property line"), "{}", msg);
    }

    #[test]
    fn test_position_width_mismatch() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty short x\nend_header\n",
        ));
        assert!(msg.contains("property width mismatch"), "{}", msg);
    }

    #[test]
    fn test_color_width_mismatch() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float red\nend_header\n",
        ));
        assert!(msg.contains("property width mismatch"), "{}", msg);
    }

    #[test]
    fn test_truncated_header() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nproperty float x\n",
        ));
        assert!(msg.contains("truncated header"), "{}", msg);
        assert!(format_message(parse("")).contains("truncated header"));
        assert!(format_message(parse("ply\n")).contains("truncated header"));
    }

    #[test]
    fn test_overlong_line_rejected_without_newline() {
        let mut bytes = b"ply\nformat binary_little_endian 1.0\n".to_vec();
        bytes.extend(std::iter::repeat(0xAB).take(MAX_HEADER_LINE * 4));
        let msg = format_message(read_header(&mut Cursor::new(bytes)));
        assert!(msg.contains("exceeds"), "{}", msg);
    }

    #[test]
    fn test_line_at_limit_accepted() {
        let comment = format!("comment {}\n", "c".repeat(MAX_HEADER_LINE - 9));
        assert_eq!(comment.len(), MAX_HEADER_LINE);
        let text = format!(
            "ply\nformat binary_little_endian 1.0\n{}element vertex 0\nend_header\n",
            comment
        );
        let header = parse(&text).unwrap();
        assert_eq!(header.body_offset, text.len() as u64);
    }

    #[test]
    fn test_vertex_element_without_properties() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1099511627776\nend_header\n",
        ));
        assert!(msg.contains("no properties"), "{}", msg);
        assert_eq!(
            parse("ply\nformat binary_little_endian 1.0\nelement vertex 0\nend_header\n")
                .unwrap()
                .vertex_count,
            0
        );
    }

    #[test]
    fn test_missing_vertex_element() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement face 1\nend_header\n",
        ));
        assert!(msg.contains("missing 'element vertex'"), "{}", msg);
    }

    #[test]
    fn test_duplicate_vertex_element() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nelement vertex 2\nend_header\n",
        ));
        assert!(msg.contains("duplicate"), "{}", msg);
    }

    #[test]
    fn test_property_before_element() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nproperty float x\nelement vertex 1\nend_header\n",
        ));
        assert!(msg.contains("before any element"), "{}", msg);
    }

    #[test]
    fn test_negative_vertex_count() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex -3\nend_header\n",
        ));
        assert!(msg.contains("invalid vertex count"), "{}", msg);
    }

    #[test]
    fn test_unknown_keyword() {
        let msg = format_message(parse(
            "ply\nformat binary_little_endian 1.0\nelement vertex 1\nbogus line\nend_header\n",
        ));
        assert!(msg.contains("unrecognized header keyword"), "{}", msg);
    }
}
