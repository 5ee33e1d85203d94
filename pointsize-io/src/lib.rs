//! Binary PLY reading for pointsize
//!
//! This crate parses the constrained PLY subset the importer accepts: an
//! ASCII header declaring `format binary_little_endian 1.0`, followed by
//! little-endian vertex records. Only the `vertex` element is decoded.

pub mod header;
pub mod body;

pub use header::{read_header, PlyHeader, PropertyTag};
pub use body::read_body;

use pointsize_core::{PointRecord, Result};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Decoded vertex data of one PLY file
#[derive(Debug, Clone)]
pub struct PlyVertices {
    pub header: PlyHeader,
    pub points: Vec<PointRecord>,
}

/// A stream whose header has been parsed and whose body is still unread
pub struct PlyStream<R> {
    reader: BufReader<R>,
    header: PlyHeader,
}

impl<R: Read + Seek> PlyStream<R> {
    pub fn header(&self) -> &PlyHeader {
        &self.header
    }

    /// Seek to the header's body offset and decode every vertex
    pub fn read_points(mut self) -> Result<Vec<PointRecord>> {
        // Seeking discards whatever the header pass buffered past its last line.
        self.reader.seek(SeekFrom::Start(self.header.body_offset))?;
        read_body(&mut self.reader, &self.header)
    }
}

/// Reader for binary little-endian PLY point clouds
pub struct PlyReader;

impl PlyReader {
    /// Parse the header of a seekable stream positioned at offset 0
    pub fn open<R: Read + Seek>(reader: R) -> Result<PlyStream<R>> {
        let mut reader = BufReader::new(reader);
        let header = read_header(&mut reader)?;
        Ok(PlyStream { reader, header })
    }

    /// Read header and vertices in one pass
    pub fn read_vertices<R: Read + Seek>(reader: R) -> Result<PlyVertices> {
        let stream = Self::open(reader)?;
        let header = stream.header().clone();
        let points = stream.read_points()?;
        Ok(PlyVertices { header, points })
    }

    /// Open `path` and read its vertices; the file is closed on every exit path
    pub fn read_vertices_from_path<P: AsRef<Path>>(path: P) -> Result<PlyVertices> {
        let file = File::open(path.as_ref())?;
        Self::read_vertices(file)
    }
}
