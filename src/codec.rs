//! Serialization of a [`Container`] to and from the gzip-wrapped kmeg stream.
//!
//! The whole stream is a single gzip member holding:
//!
//! ```text
//! +----------------------+----------------------+-------------------------+---------------------------+
//! | width (i64, BE)      | height (i64, BE)     | labels (width * height) | palette (3 bytes each ... |
//! +----------------------+----------------------+-------------------------+---------------------------+
//! ```
//!
//! The number of palette entries is not stored. A decoder reads 3-byte groups until the
//! end of the stream and silently drops a trailing group with fewer than 3 bytes.

use crate::{Container, Error, Result};

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use flate2::{read::MultiGzDecoder, write::GzEncoder, Compression};
use palette::{cast::AsComponents, Srgb};
use tracing::debug;

/// The size of the width + height header in bytes.
const HEADER_LEN: usize = 16;

/// Writes `container` to `writer` as a gzip-compressed kmeg stream.
///
/// The gzip stream is finished before returning, but `writer` itself is not flushed.
///
/// # Errors
/// Returns [`Error::Io`] if writing to `writer` fails.
///
/// # Examples
/// ```
/// # use kmeg::{codec, Container};
/// # use palette::Srgb;
/// # fn main() -> Result<(), kmeg::Error> {
/// let container = Container::new(2, 1, vec![0, 1], vec![Srgb::new(10, 20, 30), Srgb::new(40, 50, 60)])?;
///
/// let mut bytes = Vec::new();
/// codec::encode(&mut bytes, &container)?;
///
/// assert_eq!(codec::decode(bytes.as_slice())?, container);
/// # Ok(())
/// # }
/// ```
pub fn encode<W: Write>(writer: W, container: &Container) -> Result<()> {
    let mut gz = GzEncoder::new(writer, Compression::default());

    let mut header = [0; HEADER_LEN];
    header[..8].copy_from_slice(&i64::from(container.width()).to_be_bytes());
    header[8..].copy_from_slice(&i64::from(container.height()).to_be_bytes());

    gz.write_all(&header)
        .map_err(|e| Error::io(e, "writing the kmeg header"))?;
    gz.write_all(container.labels())
        .map_err(|e| Error::io(e, "writing the kmeg labels"))?;

    let palette: &[u8] = container.palette().as_components();
    gz.write_all(palette)
        .map_err(|e| Error::io(e, "writing the kmeg palette"))?;

    gz.finish()
        .map_err(|e| Error::io(e, "finishing the gzip stream"))?;

    debug!(
        width = container.width(),
        height = container.height(),
        colors = container.palette().len(),
        "encoded kmeg stream"
    );

    Ok(())
}

/// Encodes `container` into a new byte vector.
///
/// # Errors
/// Returns [`Error::Io`] if compression fails.
pub fn to_vec(container: &Container) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    encode(&mut bytes, container)?;
    Ok(bytes)
}

/// Reads a [`Container`] from a gzip-compressed kmeg stream.
///
/// The labels are not checked against the palette; see [`Container::validate`].
///
/// # Errors
/// - [`Error::UnexpectedEof`] if the stream ends inside the header or the labels.
/// - [`Error::CorruptData`] if the header holds a negative or unsupported size.
/// - [`Error::Io`] if reading fails or the stream is not valid gzip.
pub fn decode<R: Read>(reader: R) -> Result<Container> {
    let mut gz = MultiGzDecoder::new(reader);

    let mut header = [0; HEADER_LEN];
    gz.read_exact(&mut header)
        .map_err(|e| Error::read(e, "reading the kmeg header", "header"))?;

    let (width, height) = header.split_at(8);
    let width = dimension(width, "width")?;
    let height = dimension(height, "height")?;

    let count = u64::from(width) * u64::from(height);
    if usize::try_from(count).is_err() {
        return Err(Error::CorruptData(format!(
            "a {width}x{height} image is too large for this platform"
        )));
    }

    let mut labels = Vec::new();
    gz.by_ref()
        .take(count)
        .read_to_end(&mut labels)
        .map_err(|e| Error::read(e, "reading the kmeg labels", "labels"))?;
    if (labels.len() as u64) < count {
        return Err(Error::UnexpectedEof("labels"));
    }

    let mut rest = Vec::new();
    gz.read_to_end(&mut rest)
        .map_err(|e| Error::read(e, "reading the kmeg palette", "palette"))?;

    let groups = rest.chunks_exact(3);
    let discarded = groups.remainder().len();
    if discarded != 0 {
        debug!(discarded, "dropping a partial palette entry at the end of the stream");
    }
    let palette = groups.map(|c| Srgb::new(c[0], c[1], c[2])).collect::<Vec<_>>();

    debug!(width, height, colors = palette.len(), "decoded kmeg stream");

    Container::new(width, height, labels, palette)
}

/// Decodes a [`Container`] from a byte slice.
///
/// # Errors
/// See [`decode`].
pub fn from_slice(bytes: &[u8]) -> Result<Container> {
    decode(bytes)
}

/// Writes `container` to a new kmeg file at `path`, replacing any existing file.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be created or written.
pub fn write_file(path: impl AsRef<Path>, container: &Container) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(e, "creating the kmeg file"))?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer, container)?;
    writer
        .flush()
        .map_err(|e| Error::io(e, "flushing the kmeg file"))
}

/// Reads a [`Container`] from the kmeg file at `path`.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be opened, otherwise see [`decode`].
pub fn read_file(path: impl AsRef<Path>) -> Result<Container> {
    let file = File::open(path).map_err(|e| Error::io(e, "opening the kmeg file"))?;
    decode(BufReader::new(file))
}

/// Parses one big-endian header field.
fn dimension(bytes: &[u8], name: &str) -> Result<u32> {
    let mut buf = [0; 8];
    buf.copy_from_slice(bytes);
    let value = i64::from_be_bytes(buf);
    u32::try_from(value).map_err(|_| Error::CorruptData(format!("the {name} {value} is out of range")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{tests::*, MAX_COLORS};
    use std::io;

    /// Compresses raw (already framed) bytes the same way [`encode`] does.
    fn gzip(raw: &[u8]) -> Vec<u8> {
        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(raw).unwrap();
        gz.finish().unwrap()
    }

    fn header(width: i64, height: i64) -> Vec<u8> {
        let mut raw = width.to_be_bytes().to_vec();
        raw.extend_from_slice(&height.to_be_bytes());
        raw
    }

    #[test]
    fn two_pixel_round_trip() {
        let palette = vec![Srgb::new(10, 20, 30), Srgb::new(40, 50, 60)];
        let container = Container::new(2, 1, vec![0, 1], palette.clone()).unwrap();

        let decoded = from_slice(&to_vec(&container).unwrap()).unwrap();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.labels(), &[0, 1]);
        assert_eq!(decoded.palette(), palette.as_slice());
    }

    #[test]
    fn random_round_trip() {
        let palette = test_data(usize::from(MAX_COLORS), 0);
        let labels = test_labels(64 * 48, MAX_COLORS.into());
        let container = Container::new(64, 48, labels, palette).unwrap();
        let decoded = from_slice(&to_vec(&container).unwrap()).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn empty_container_round_trip() {
        let container = Container::new(0, 5, Vec::new(), Vec::new()).unwrap();
        assert_eq!(from_slice(&to_vec(&container).unwrap()).unwrap(), container);
    }

    #[test]
    fn framing_is_big_endian() {
        let container = Container::new(3, 1, vec![2, 1, 0], vec![Srgb::new(1, 2, 3)]).unwrap();
        let bytes = to_vec(&container).unwrap();

        let mut raw = Vec::new();
        MultiGzDecoder::new(bytes.as_slice()).read_to_end(&mut raw).unwrap();

        let mut expected = header(3, 1);
        expected.extend_from_slice(&[2, 1, 0, 1, 2, 3]);
        assert_eq!(raw, expected);
    }

    #[test]
    fn partial_palette_entry_is_dropped() {
        let mut raw = header(1, 1);
        raw.extend_from_slice(&[0, 9, 8, 7, 6]);

        let decoded = from_slice(&gzip(&raw)).unwrap();
        assert_eq!(decoded.labels(), &[0]);
        assert_eq!(decoded.palette(), &[Srgb::new(9, 8, 7)]);
    }

    #[test]
    fn labels_are_not_checked_against_palette() {
        let mut raw = header(2, 1);
        raw.extend_from_slice(&[0, 5, 1, 1, 1]);

        let decoded = from_slice(&gzip(&raw)).unwrap();
        assert_eq!(decoded.palette().len(), 1);
        assert!(matches!(decoded.expand(), Err(Error::CorruptData(_))));
    }

    #[test]
    fn truncated_header() {
        let raw = header(4, 4);
        assert!(matches!(from_slice(&gzip(&raw[..11])), Err(Error::UnexpectedEof("header"))));
        assert!(matches!(from_slice(&gzip(&[])), Err(Error::UnexpectedEof("header"))));
    }

    #[test]
    fn truncated_labels() {
        let mut raw = header(4, 4);
        raw.extend_from_slice(&[0; 15]);
        assert!(matches!(from_slice(&gzip(&raw)), Err(Error::UnexpectedEof("labels"))));
    }

    #[test]
    fn truncated_palette() {
        let mut raw = header(2, 1);
        raw.extend_from_slice(&[0, 1]);
        raw.extend((0..300).map(|i| (i * 7 % 256) as u8));

        // drop the gzip trailer, so the stream ends after the palette bytes
        let bytes = gzip(&raw);
        let truncated = &bytes[..bytes.len() - 8];
        assert!(matches!(from_slice(truncated), Err(Error::UnexpectedEof("palette"))));
    }

    #[test]
    fn negative_dimensions() {
        let raw = header(-1, 4);
        assert!(matches!(from_slice(&gzip(&raw)), Err(Error::CorruptData(_))));

        let raw = header(2, i64::MAX);
        assert!(matches!(from_slice(&gzip(&raw)), Err(Error::CorruptData(_))));
    }

    #[test]
    fn not_gzip() {
        let bytes = b"this is definitely not a gzip stream";
        assert!(matches!(from_slice(bytes), Err(Error::Io { .. })));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn file_round_trip() {
        let container = Container::new(4, 1, vec![1, 0, 0, 1], vec![Srgb::new(9, 9, 9); 2]).unwrap();
        let path = std::env::temp_dir().join(format!("kmeg-codec-{}.kmeg", std::process::id()));
        write_file(&path, &container).unwrap();
        let read = read_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(read, container);
    }

    #[test]
    fn missing_file() {
        let path = std::env::temp_dir().join("kmeg-codec-this-file-does-not-exist.kmeg");
        assert!(matches!(read_file(path), Err(Error::Io { context: "opening the kmeg file", .. })));
    }

    #[test]
    fn write_failure() {
        let container = Container::new(1, 1, vec![0], vec![Srgb::new(0, 0, 0)]).unwrap();
        assert!(matches!(encode(FailingWriter, &container), Err(Error::Io { .. })));
    }
}
