//! Versioned, little-endian wire format for mesh payloads.
//!
//! Every payload travels as one frame: a fixed [`WireFrameHdr`] message
//! followed by a body message of exactly `len` bytes. Bodies are
//! length-prefixed: strings and vectors carry a `u32` count, integers are
//! `i64`/`u64`, coordinates `f64`.

use crate::algs::communicator::CommTag;
use crate::data::cell::CellRecord;
use crate::data::mesh_data::GroupCells;
use crate::mesh_error::MeshGenError;
use crate::topology::cell_type::ElementFamily;
use crate::topology::physical_groups::{GroupInfo, GroupKey};
use bytemuck::{Pod, Zeroable};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use static_assertions::const_assert_eq;
use std::mem::size_of;

/// Bump when the layout or semantics change in incompatible ways.
pub const WIRE_VERSION: u16 = 1;

/// First tag of the mesh payload range.
const TAG_BASE: u16 = 0x4d00;

/// Payload categories. Each owns a pair of tags (header, body).
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadKind {
    Integer = 1,
    Text = 2,
    IntVector = 3,
    Cell = 4,
    GroupMetadata = 5,
    GroupCells = 6,
    BulkCells = 7,
    NodeSetMetadata = 8,
    NodeSet = 9,
    PartitionInfo = 10,
    RankCounts = 11,
    LocalNodeIds = 12,
}

impl PayloadKind {
    pub fn from_u16(v: u16) -> Option<Self> {
        use PayloadKind::*;
        [
            Integer,
            Text,
            IntVector,
            Cell,
            GroupMetadata,
            GroupCells,
            BulkCells,
            NodeSetMetadata,
            NodeSet,
            PartitionInfo,
            RankCounts,
            LocalNodeIds,
        ]
        .into_iter()
        .find(|k| *k as u16 == v)
    }

    /// Header tag of this category; the body uses `tag().offset(1)`.
    pub fn tag(self) -> CommTag {
        CommTag::new(TAG_BASE + 2 * self as u16)
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct WireFrameHdr {
    pub version_le: u16, // = WIRE_VERSION.to_le()
    pub kind_le: u16,
    pub reserved_le: u32, // keep zero
    pub len_le: u64,      // body length in bytes
}

const_assert_eq!(size_of::<WireFrameHdr>(), 16);

impl WireFrameHdr {
    pub fn new(kind: PayloadKind, len: usize) -> Self {
        Self {
            version_le: WIRE_VERSION.to_le(),
            kind_le: (kind as u16).to_le(),
            reserved_le: 0,
            len_le: (len as u64).to_le(),
        }
    }

    pub fn version(&self) -> u16 {
        u16::from_le(self.version_le)
    }

    pub fn kind(&self) -> u16 {
        u16::from_le(self.kind_le)
    }

    pub fn len(&self) -> usize {
        u64::from_le(self.len_le) as usize
    }

    /// Decodes a received header and checks version and kind.
    pub fn parse(bytes: &[u8], expected: PayloadKind) -> Result<Self, MeshGenError> {
        expect_exact_len(bytes.len(), size_of::<Self>())?;
        let hdr: Self = bytemuck::pod_read_unaligned(bytes);
        if hdr.version() != WIRE_VERSION {
            return Err(MeshGenError::wire(format!(
                "wire version {} (expected {WIRE_VERSION})",
                hdr.version()
            )));
        }
        if hdr.kind() != expected as u16 {
            let got = PayloadKind::from_u16(hdr.kind())
                .map(|k| format!("{k:?}"))
                .unwrap_or_else(|| format!("unknown kind {}", hdr.kind()));
            return Err(MeshGenError::wire(format!("expected {expected:?} frame, got {got}")));
        }
        Ok(hdr)
    }
}

pub fn expect_exact_len(actual: usize, expected: usize) -> Result<(), MeshGenError> {
    if actual == expected {
        Ok(())
    } else {
        Err(MeshGenError::wire(format!("expected {expected} bytes, got {actual}")))
    }
}

fn need(buf: &Bytes, n: usize, what: &str) -> Result<(), MeshGenError> {
    if buf.remaining() < n {
        Err(MeshGenError::wire(format!(
            "truncated body: {what} needs {n} bytes, {} left",
            buf.remaining()
        )))
    } else {
        Ok(())
    }
}

/// Appends the little-endian encoding of `self`.
pub trait WireEncode {
    fn encode(&self, buf: &mut BytesMut);

    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }
}

/// Consumes one value from the front of `buf`.
pub trait WireDecode: Sized {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError>;

    /// Decodes a whole body; trailing bytes are an error.
    fn from_bytes(mut bytes: Bytes) -> Result<Self, MeshGenError> {
        let value = Self::decode(&mut bytes)?;
        if bytes.has_remaining() {
            return Err(MeshGenError::wire(format!(
                "{} trailing bytes after payload",
                bytes.remaining()
            )));
        }
        Ok(value)
    }
}

impl WireEncode for u8 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(*self);
    }
}

impl WireDecode for u8 {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        need(buf, 1, "u8")?;
        Ok(buf.get_u8())
    }
}

impl WireEncode for i32 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i32_le(*self);
    }
}

impl WireDecode for i32 {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        need(buf, 4, "i32")?;
        Ok(buf.get_i32_le())
    }
}

impl WireEncode for i64 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64_le(*self);
    }
}

impl WireDecode for i64 {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        need(buf, 8, "i64")?;
        Ok(buf.get_i64_le())
    }
}

impl WireEncode for usize {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(*self as u64);
    }
}

impl WireDecode for usize {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        need(buf, 8, "u64")?;
        usize::try_from(buf.get_u64_le()).map_err(|_| MeshGenError::wire("u64 does not fit usize"))
    }
}

impl WireEncode for [f64; 3] {
    fn encode(&self, buf: &mut BytesMut) {
        for x in self {
            buf.put_f64_le(*x);
        }
    }
}

impl WireDecode for [f64; 3] {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        need(buf, 24, "coordinate row")?;
        Ok([buf.get_f64_le(), buf.get_f64_le(), buf.get_f64_le()])
    }
}

fn encode_count(n: usize, buf: &mut BytesMut) {
    buf.put_u32_le(n as u32);
}

fn decode_count(buf: &mut Bytes) -> Result<usize, MeshGenError> {
    need(buf, 4, "count")?;
    Ok(buf.get_u32_le() as usize)
}

impl WireEncode for str {
    fn encode(&self, buf: &mut BytesMut) {
        encode_count(self.len(), buf);
        buf.put_slice(self.as_bytes());
    }
}

impl WireEncode for String {
    fn encode(&self, buf: &mut BytesMut) {
        self.as_str().encode(buf);
    }
}

impl WireDecode for String {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        let n = decode_count(buf)?;
        need(buf, n, "string")?;
        let raw = buf.split_to(n);
        String::from_utf8(raw.to_vec()).map_err(|e| MeshGenError::wire(format!("invalid UTF-8: {e}")))
    }
}

impl<T: WireEncode> WireEncode for [T] {
    fn encode(&self, buf: &mut BytesMut) {
        encode_count(self.len(), buf);
        for item in self {
            item.encode(buf);
        }
    }
}

impl<T: WireEncode> WireEncode for Vec<T> {
    fn encode(&self, buf: &mut BytesMut) {
        self.as_slice().encode(buf);
    }
}

impl<T: WireDecode> WireDecode for Vec<T> {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        let n = decode_count(buf)?;
        // every item takes at least one byte
        need(buf, n, "vector")?;
        (0..n).map(|_| T::decode(buf)).collect()
    }
}

impl WireEncode for ElementFamily {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.code());
    }
}

impl WireDecode for ElementFamily {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        let code = u8::decode(buf)?;
        ElementFamily::from_code(code).ok_or_else(|| MeshGenError::wire(format!("unknown family code {code}")))
    }
}

/// Field order: dimension, node count, family, connectivity, reference
/// coordinates, VTK code, group ids, group names.
impl WireEncode for CellRecord {
    fn encode(&self, buf: &mut BytesMut) {
        self.dimension.encode(buf);
        self.nodes_per_element().encode(buf);
        self.family.encode(buf);
        self.connectivity.encode(buf);
        self.reference_coords.encode(buf);
        self.vtk_cell_type.encode(buf);
        self.physical_group_ids.encode(buf);
        self.physical_group_names.encode(buf);
    }
}

impl WireDecode for CellRecord {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        let dimension = u8::decode(buf)?;
        let nodes = usize::decode(buf)?;
        let family = ElementFamily::decode(buf)?;
        let connectivity = Vec::<usize>::decode(buf)?;
        if connectivity.len() != nodes {
            return Err(MeshGenError::wire(format!(
                "cell announces {nodes} nodes but carries {}",
                connectivity.len()
            )));
        }
        Ok(CellRecord {
            dimension,
            family,
            connectivity,
            reference_coords: Vec::decode(buf)?,
            vtk_cell_type: i32::decode(buf)?,
            physical_group_ids: Vec::decode(buf)?,
            physical_group_names: Vec::decode(buf)?,
        })
    }
}

impl WireEncode for GroupKey {
    fn encode(&self, buf: &mut BytesMut) {
        match self {
            GroupKey::Id(id) => {
                buf.put_u8(0);
                id.encode(buf);
            }
            GroupKey::Name(name) => {
                buf.put_u8(1);
                name.encode(buf);
            }
        }
    }
}

impl WireDecode for GroupKey {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        match u8::decode(buf)? {
            0 => Ok(GroupKey::Id(i32::decode(buf)?)),
            1 => Ok(GroupKey::Name(String::decode(buf)?)),
            other => Err(MeshGenError::wire(format!("unknown group key tag {other}"))),
        }
    }
}

impl WireEncode for GroupInfo {
    fn encode(&self, buf: &mut BytesMut) {
        self.id.encode(buf);
        self.dim.encode(buf);
        self.size.encode(buf);
        self.name.encode(buf);
    }
}

impl WireDecode for GroupInfo {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        Ok(GroupInfo {
            id: i32::decode(buf)?,
            dim: u8::decode(buf)?,
            size: usize::decode(buf)?,
            name: String::decode(buf)?,
        })
    }
}

/// Element ids first, then the cells.
impl WireEncode for GroupCells {
    fn encode(&self, buf: &mut BytesMut) {
        self.element_ids.encode(buf);
        self.cells.encode(buf);
    }
}

impl WireDecode for GroupCells {
    fn decode(buf: &mut Bytes) -> Result<Self, MeshGenError> {
        let element_ids = Vec::<usize>::decode(buf)?;
        let cells = Vec::<CellRecord>::decode(buf)?;
        if element_ids.len() != cells.len() {
            return Err(MeshGenError::wire(format!(
                "{} element ids for {} cells",
                element_ids.len(),
                cells.len()
            )));
        }
        Ok(GroupCells { element_ids, cells })
    }
}
