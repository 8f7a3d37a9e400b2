//! Shared frame region: layout, producer-side publishing, consumer-side reading.
//!
//! # Layout
//!
//! ```text
//! offset 0    width   i32
//! offset 4    height  i32
//! offset 8    scale   f32
//! offset 12   width * height * 4 bytes of RGBA, row-major, no padding
//! ```
//!
//! The region carries no lock and no sequence number. Each publish rewrites
//! it from offset 0; a consumer that is still reading the previous frame
//! can observe a torn frame.

use std::fs::{File, OpenOptions};
use std::path::Path;

use glimpse_common::config::{HeaderByteOrder, HEADER_SIZE};
use glimpse_common::error::{GlimpseError, GlimpseResult};
use glimpse_platform_core::{payload_len, FrameBuffer};
use memmap2::{Mmap, MmapMut, MmapOptions};
use serde::Serialize;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameHeader {
    pub width: u32,
    pub height: u32,
    pub scale: f32,
}

impl FrameHeader {
    pub fn encode(&self, order: HeaderByteOrder) -> GlimpseResult<[u8; HEADER_SIZE]> {
        let width = i32::try_from(self.width)
            .map_err(|_| GlimpseError::frame_layout(format!("width {} overflows i32", self.width)))?;
        let height = i32::try_from(self.height).map_err(|_| {
            GlimpseError::frame_layout(format!("height {} overflows i32", self.height))
        })?;

        let (w, h, s) = match order {
            HeaderByteOrder::Big => (
                width.to_be_bytes(),
                height.to_be_bytes(),
                self.scale.to_be_bytes(),
            ),
            HeaderByteOrder::Little => (
                width.to_le_bytes(),
                height.to_le_bytes(),
                self.scale.to_le_bytes(),
            ),
        };

        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&w);
        out[4..8].copy_from_slice(&h);
        out[8..12].copy_from_slice(&s);
        Ok(out)
    }

    pub fn decode(bytes: &[u8], order: HeaderByteOrder) -> GlimpseResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(GlimpseError::frame_layout(format!(
                "region of {} bytes is shorter than the header",
                bytes.len()
            )));
        }
        let field = |at: usize| -> [u8; 4] {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[at..at + 4]);
            buf
        };
        let (width, height, scale) = match order {
            HeaderByteOrder::Big => (
                i32::from_be_bytes(field(0)),
                i32::from_be_bytes(field(4)),
                f32::from_be_bytes(field(8)),
            ),
            HeaderByteOrder::Little => (
                i32::from_le_bytes(field(0)),
                i32::from_le_bytes(field(4)),
                f32::from_le_bytes(field(8)),
            ),
        };
        if width < 0 || height < 0 {
            return Err(GlimpseError::frame_layout(format!(
                "negative dimensions {width}x{height} in header"
            )));
        }
        Ok(Self {
            width: width as u32,
            height: height as u32,
            scale,
        })
    }

    /// Payload length the header announces.
    pub fn payload_len(&self) -> usize {
        payload_len(self.width, self.height)
    }

    /// Map a point in published-frame pixels to real display pixels.
    pub fn to_real(&self, x: i32, y: i32) -> (i32, i32) {
        (
            (x as f32 * self.scale) as i32,
            (y as f32 * self.scale) as i32,
        )
    }
}

/// A file-backed shared region, mapped read-write for the producer.
pub struct SharedRegion {
    map: MmapMut,
}

impl SharedRegion {
    /// Map an existing region file. The file must already exist; it is
    /// grown to `capacity` if shorter.
    pub fn open(path: &Path, capacity: usize) -> GlimpseResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| GlimpseError::shared_region(path, e.to_string()))?;
        ensure_len(&file, path, capacity)?;

        // SAFETY: the file is shared with a consumer process; all access goes
        // through bounds-checked slices.
        let map = unsafe { MmapOptions::new().len(capacity).map_mut(&file) }
            .map_err(|e| GlimpseError::shared_region(path, format!("mmap failed: {e}")))?;

        tracing::info!(path = %path.display(), capacity, "Shared region mapped");
        Ok(Self { map })
    }

    pub fn capacity(&self) -> usize {
        self.map.len()
    }
}

impl AsRef<[u8]> for SharedRegion {
    fn as_ref(&self) -> &[u8] {
        &self.map
    }
}

impl AsMut<[u8]> for SharedRegion {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.map
    }
}

fn ensure_len(file: &File, path: &Path, capacity: usize) -> GlimpseResult<()> {
    let len = file
        .metadata()
        .map_err(|e| GlimpseError::shared_region(path, e.to_string()))?
        .len();
    if len < capacity as u64 {
        tracing::debug!(current = len, capacity, "Growing region file");
        file.set_len(capacity as u64)
            .map_err(|e| GlimpseError::shared_region(path, format!("resize failed: {e}")))?;
    }
    Ok(())
}

/// Create (or truncate) the region file at exactly `capacity` bytes and make
/// it writable by both the producer and the consumer.
pub fn provision(path: &Path, capacity: usize) -> GlimpseResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map_err(|e| GlimpseError::shared_region(path, e.to_string()))?;
    file.set_len(capacity as u64)
        .map_err(|e| GlimpseError::shared_region(path, format!("resize failed: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o666))?;
    }

    tracing::info!(path = %path.display(), capacity, "Shared region provisioned");
    Ok(())
}

/// Writes frames into a region, always starting at offset 0.
pub struct SharedRegionPublisher<R> {
    region: R,
    order: HeaderByteOrder,
    frames_published: u64,
}

impl<R: AsMut<[u8]>> SharedRegionPublisher<R> {
    pub fn new(region: R, order: HeaderByteOrder) -> Self {
        Self {
            region,
            order,
            frames_published: 0,
        }
    }

    /// Write the header, then the payload directly after it.
    pub fn publish(&mut self, frame: &FrameBuffer, scale: f32) -> GlimpseResult<()> {
        let header = FrameHeader {
            width: frame.width(),
            height: frame.height(),
            scale,
        };
        let pixels = frame.pixels();
        let bytes = self.region.as_mut();
        let needed = HEADER_SIZE + pixels.len();
        if needed > bytes.len() {
            return Err(GlimpseError::RegionOverflow {
                needed,
                capacity: bytes.len(),
            });
        }

        bytes[..HEADER_SIZE].copy_from_slice(&header.encode(self.order)?);
        bytes[HEADER_SIZE..needed].copy_from_slice(pixels);

        self.frames_published += 1;
        tracing::trace!(
            width = header.width,
            height = header.height,
            scale,
            frame = self.frames_published,
            "Frame published"
        );
        Ok(())
    }

    pub fn frames_published(&self) -> u64 {
        self.frames_published
    }

    pub fn region(&self) -> &R {
        &self.region
    }
}

/// Consumer-side view: decode the header and borrow the payload.
pub fn read_frame(bytes: &[u8], order: HeaderByteOrder) -> GlimpseResult<(FrameHeader, &[u8])> {
    let header = FrameHeader::decode(bytes, order)?;
    let end = HEADER_SIZE + header.payload_len();
    if end > bytes.len() {
        return Err(GlimpseError::RegionOverflow {
            needed: end,
            capacity: bytes.len(),
        });
    }
    Ok((header, &bytes[HEADER_SIZE..end]))
}

/// Read-only mapping of a region, for inspection tools.
pub struct RegionSnapshot {
    map: Mmap,
}

impl RegionSnapshot {
    pub fn open(path: &Path) -> GlimpseResult<Self> {
        let file = File::open(path).map_err(|e| GlimpseError::shared_region(path, e.to_string()))?;
        // SAFETY: read-only view; the producer may rewrite it underneath us,
        // which at worst yields a torn frame.
        let map = unsafe { Mmap::map(&file) }
            .map_err(|e| GlimpseError::shared_region(path, format!("mmap failed: {e}")))?;
        Ok(Self { map })
    }

    pub fn capacity(&self) -> usize {
        self.map.len()
    }

    pub fn frame(&self, order: HeaderByteOrder) -> GlimpseResult<(FrameHeader, &[u8])> {
        read_frame(&self.map, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(w: u32, h: u32, fill: u8) -> FrameBuffer {
        FrameBuffer::from_rgba(w, h, vec![fill; payload_len(w, h)]).unwrap()
    }

    #[test]
    fn header_round_trips_in_both_orders() {
        let header = FrameHeader {
            width: 540,
            height: 1200,
            scale: 2.0,
        };
        for order in [HeaderByteOrder::Big, HeaderByteOrder::Little] {
            let bytes = header.encode(order).unwrap();
            assert_eq!(FrameHeader::decode(&bytes, order).unwrap(), header);
        }
    }

    #[test]
    fn big_endian_header_matches_network_order() {
        let bytes = FrameHeader {
            width: 540,
            height: 1200,
            scale: 2.0,
        }
        .encode(HeaderByteOrder::Big)
        .unwrap();
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x02, 0x1C]);
        assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x04, 0xB0]);
        assert_eq!(&bytes[8..12], &[0x40, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn publish_writes_header_then_payload_without_padding() {
        let mut publisher =
            SharedRegionPublisher::new(vec![0u8; 64], HeaderByteOrder::Little);
        publisher.publish(&frame(2, 3, 0x7F), 1.5).unwrap();

        let bytes = publisher.region().as_slice();
        let (header, payload) = read_frame(bytes, HeaderByteOrder::Little).unwrap();
        assert_eq!((header.width, header.height, header.scale), (2, 3, 1.5));
        assert_eq!(payload.len(), 24);
        assert!(payload.iter().all(|&b| b == 0x7F));
        // untouched tail
        assert!(bytes[HEADER_SIZE + 24..].iter().all(|&b| b == 0));
        assert_eq!(publisher.frames_published(), 1);
    }

    #[test]
    fn republish_overwrites_from_offset_zero() {
        let mut publisher = SharedRegionPublisher::new(vec![0u8; 64], HeaderByteOrder::Big);
        publisher.publish(&frame(3, 3, 1), 1.0).unwrap();
        publisher.publish(&frame(1, 1, 9), 4.0).unwrap();

        let bytes = publisher.region().as_slice();
        let (header, payload) = read_frame(bytes, HeaderByteOrder::Big).unwrap();
        assert_eq!((header.width, header.height), (1, 1));
        assert_eq!(payload, &[9, 9, 9, 9]);
        // remains of the larger first frame are left in place
        assert_eq!(bytes[HEADER_SIZE + 4], 1);
    }

    #[test]
    fn oversize_frame_is_rejected_without_writing() {
        let mut publisher = SharedRegionPublisher::new(vec![0u8; 20], HeaderByteOrder::Big);
        let err = publisher.publish(&frame(2, 2, 5), 1.0).unwrap_err();
        assert!(matches!(
            err,
            GlimpseError::RegionOverflow {
                needed: 28,
                capacity: 20
            }
        ));
        assert!(publisher.region().iter().all(|&b| b == 0));
    }

    #[test]
    fn reader_rejects_header_beyond_capacity() {
        let mut bytes = vec![0u8; 32];
        let header = FrameHeader {
            width: 100,
            height: 100,
            scale: 1.0,
        };
        bytes[..HEADER_SIZE].copy_from_slice(&header.encode(HeaderByteOrder::Big).unwrap());
        assert!(read_frame(&bytes, HeaderByteOrder::Big).is_err());
        assert!(FrameHeader::decode(&bytes[..8], HeaderByteOrder::Big).is_err());
    }

    #[test]
    fn to_real_truncates_scaled_coordinates() {
        let header = FrameHeader {
            width: 540,
            height: 1200,
            scale: 2.5,
        };
        assert_eq!(header.to_real(100, 3), (250, 7));
    }

    #[test]
    fn mapped_region_round_trip() {
        let dir = std::env::temp_dir().join("glimpse_test_region_mapped");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("screen_buffer.raw");

        provision(&path, 4096).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 4096);

        {
            let region = SharedRegion::open(&path, 4096).unwrap();
            assert_eq!(region.capacity(), 4096);
            let mut publisher = SharedRegionPublisher::new(region, HeaderByteOrder::Big);
            publisher.publish(&frame(4, 4, 0xAB), 2.0).unwrap();
        }

        let snapshot = RegionSnapshot::open(&path).unwrap();
        let (header, payload) = snapshot.frame(HeaderByteOrder::Big).unwrap();
        assert_eq!((header.width, header.height, header.scale), (4, 4, 2.0));
        assert!(payload.iter().all(|&b| b == 0xAB));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn open_grows_short_file() {
        let dir = std::env::temp_dir().join("glimpse_test_region_grow");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("short.raw");
        std::fs::write(&path, [0u8; 16]).unwrap();

        let region = SharedRegion::open(&path, 1024).unwrap();
        assert_eq!(region.capacity(), 1024);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1024);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn open_missing_file_is_a_region_error() {
        let path = std::env::temp_dir().join("glimpse_test_region_missing/none.raw");
        assert!(matches!(
            SharedRegion::open(&path, 1024),
            Err(GlimpseError::SharedRegion { .. })
        ));
    }
}
