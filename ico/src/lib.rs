use anyhow::{ensure, Result};
use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use std::io::{Read, Write};

const ICONDIR_SIZE: u32 = 6;
const ICONDIRENTRY_SIZE: u32 = 16;
const RESOURCE_TYPE_ICON: u16 = 1;
const PLANES: u16 = 1;
const BIT_COUNT: u16 = 32;

/// Largest frame edge an icon directory entry can describe.
pub const MAX_SIZE: u32 = 256;

/// A single frame of an icon file. `data` holds the png encoded image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconEntry {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl IconEntry {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(
            (1..=MAX_SIZE).contains(&width) && (1..=MAX_SIZE).contains(&height),
            "icon frame of {}x{} px is outside 1..={} px",
            width,
            height,
            MAX_SIZE
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Multi-resolution icon container. Frames are stored in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IconDir {
    entries: Vec<IconEntry>,
}

impl IconDir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, entry: IconEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[IconEntry] {
        &self.entries
    }

    pub fn read(r: &mut impl Read) -> Result<Self> {
        ensure!(r.read_u16::<LE>()? == 0, "invalid icon header");
        let ty = r.read_u16::<LE>()?;
        ensure!(ty == RESOURCE_TYPE_ICON, "unsupported resource type {}", ty);
        let count = r.read_u16::<LE>()? as usize;
        let mut headers = Vec::with_capacity(count);
        for _ in 0..count {
            let width = decode_size(r.read_u8()?);
            let height = decode_size(r.read_u8()?);
            let _color_count = r.read_u8()?;
            ensure!(r.read_u8()? == 0);
            let _planes = r.read_u16::<LE>()?;
            let _bit_count = r.read_u16::<LE>()?;
            let size = r.read_u32::<LE>()?;
            let offset = r.read_u32::<LE>()?;
            headers.push((width, height, size, offset));
        }
        let mut pos = ICONDIR_SIZE + ICONDIRENTRY_SIZE * count as u32;
        let mut entries = Vec::with_capacity(count);
        for (width, height, size, offset) in headers {
            ensure!(
                offset == pos,
                "icon frame at offset {} is not contiguous (expected {})",
                offset,
                pos
            );
            let mut data = Vec::new();
            r.by_ref().take(size as u64).read_to_end(&mut data)?;
            ensure!(
                data.len() == size as usize,
                "icon frame truncated at {} of {} bytes",
                data.len(),
                size
            );
            entries.push(IconEntry {
                width,
                height,
                data,
            });
            pos = pos
                .checked_add(size)
                .ok_or_else(|| anyhow::anyhow!("icon file exceeds 4GiB"))?;
        }
        Ok(Self { entries })
    }

    pub fn write(&self, w: &mut impl Write) -> Result<()> {
        ensure!(
            self.entries.len() <= u16::MAX as usize,
            "too many icon frames ({})",
            self.entries.len()
        );
        w.write_u16::<LE>(0)?;
        w.write_u16::<LE>(RESOURCE_TYPE_ICON)?;
        w.write_u16::<LE>(self.entries.len() as u16)?;
        let mut offset = ICONDIR_SIZE + ICONDIRENTRY_SIZE * self.entries.len() as u32;
        for entry in &self.entries {
            let size = u32::try_from(entry.data.len())?;
            w.write_u8(encode_size(entry.width)?)?;
            w.write_u8(encode_size(entry.height)?)?;
            w.write_u8(0)?;
            w.write_u8(0)?;
            w.write_u16::<LE>(PLANES)?;
            w.write_u16::<LE>(BIT_COUNT)?;
            w.write_u32::<LE>(size)?;
            w.write_u32::<LE>(offset)?;
            offset = offset
                .checked_add(size)
                .ok_or_else(|| anyhow::anyhow!("icon file exceeds 4GiB"))?;
        }
        for entry in &self.entries {
            w.write_all(&entry.data)?;
        }
        Ok(())
    }
}

// 256 is stored as 0.
fn encode_size(size: u32) -> Result<u8> {
    ensure!(
        (1..=MAX_SIZE).contains(&size),
        "icon frame size {} is outside 1..={}",
        size,
        MAX_SIZE
    );
    Ok((size % MAX_SIZE) as u8)
}

fn decode_size(size: u8) -> u32 {
    if size == 0 {
        MAX_SIZE
    } else {
        size as u32
    }
}
