//! Binary vertex body decoding

use crate::header::{PlyHeader, PropertyTag};
use byteorder::{ByteOrder, LittleEndian};
use pointsize_core::{Error, PointRecord, Result};
use std::io::{ErrorKind, Read};

/// Upper bound on records reserved up front; the vertex count is untrusted
/// until the body bytes actually arrive.
const MAX_PREALLOCATED_RECORDS: usize = 1 << 16;

/// Decode exactly `header.vertex_count` records from `reader`.
///
/// `reader` must be positioned at `header.body_offset`. Fields are read in
/// layout order; skip tags only advance the cursor.
///
/// Every record starts from [`PointRecord::default`]: a field missing from
/// the layout is never decoded and keeps its default (position `0.0`,
/// color opaque white) in every record. No value carries over from the
/// previous record.
///
/// A stream that ends early yields [`Error::TruncatedBody`]; nothing
/// decoded so far is returned.
pub fn read_body<R: Read>(reader: &mut R, header: &PlyHeader) -> Result<Vec<PointRecord>> {
    let stride = header.record_stride();
    let mut record_bytes = vec![0u8; stride];
    let mut points = Vec::with_capacity(header.vertex_count.min(MAX_PREALLOCATED_RECORDS));

    for decoded in 0..header.vertex_count {
        match reader.read_exact(&mut record_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(Error::TruncatedBody {
                    expected: header.vertex_count,
                    decoded,
                });
            }
            Err(e) => return Err(e.into()),
        }
        points.push(decode_record(&header.properties, &record_bytes));
    }

    tracing::debug!(vertices = points.len(), stride, "decoded PLY body");
    Ok(points)
}

/// Decode one record; `bytes` holds exactly one stride of data
fn decode_record(layout: &[PropertyTag], bytes: &[u8]) -> PointRecord {
    let mut record = PointRecord::default();
    let mut cursor = 0;

    for &tag in layout {
        let field = &bytes[cursor..cursor + tag.width()];
        match tag {
            PropertyTag::PositionX => record.position.x = LittleEndian::read_f32(field),
            PropertyTag::PositionY => record.position.y = LittleEndian::read_f32(field),
            PropertyTag::PositionZ => record.position.z = LittleEndian::read_f32(field),
            PropertyTag::ColorR => record.color[0] = field[0],
            PropertyTag::ColorG => record.color[1] = field[0],
            PropertyTag::ColorB => record.color[2] = field[0],
            PropertyTag::ColorA => record.color[3] = field[0],
            PropertyTag::Skip1 | PropertyTag::Skip2 | PropertyTag::Skip4 => {}
        }
        cursor += tag.width();
    }

    record
}
