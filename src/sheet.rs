use std::path::Path;

use log::info;

use crate::error::MuxError;
use crate::vic::VicII;

const SPD_TAG: [u8; 3] = [0x53, 0x50, 0x44];

/// Size of one sprite image block in graphic memory.
pub const BLOCK_SIZE: usize = 64;

/// The SpritePad header is stored in the last bytes of a full block. The
/// leading bytes are not part of the file.
const SPD_PADDING: usize = 55;
const SPD_HEADER_SIZE: usize = BLOCK_SIZE - SPD_PADDING;

/// Number of image blocks reserved for the sheet in graphic memory.
///
/// Sheets are limited by this area, not by `POOL_CAPACITY`. Images are
/// shared between sprites, so a sheet may hold more images than there are
/// records, but every image needs a block starting at `SHEET_BASE_POINTER`.
pub const GRAPHIC_AREA_CAPACITY: usize = 80;

/// Pointer of the header block. Images follow it.
pub const SHEET_BASE_POINTER: u8 = 0x80;

const META_COLOR: u8 = 0b0000_1111;
const META_MULTICOLOR: u8 = 0b1000_0000;

/// Represents the SpritePad header.
///
/// 0-2     Constant $53 $50 $44 (ASCII "SPD")
/// 3       Format version
/// 4       Number of sprites minus one
/// 5       Number of animations minus one
/// 6       Background colour
/// 7       Sprite multicolour 0
/// 8       Sprite multicolour 1
pub struct Header {
    pub version: u8,

    /// Number of sprites minus one.
    sprite_count: u8,

    /// Number of animations minus one.
    animation_count: u8,

    pub background_color: u8,
    pub multicolor_0: u8,
    pub multicolor_1: u8,
}

impl Header {
    /// Returns the number of sprite images in the sheet.
    pub fn sprite_count(&self) -> usize {
        self.sprite_count as usize + 1
    }

    /// Returns the number of animations in the sheet.
    pub fn animation_count(&self) -> usize {
        self.animation_count as usize + 1
    }

    fn from_bytes(bytes: &[u8]) -> Header {
        Header {
            version: bytes[3],
            sprite_count: bytes[4],
            animation_count: bytes[5],
            background_color: bytes[6],
            multicolor_0: bytes[7],
            multicolor_1: bytes[8],
        }
    }

    fn to_bytes(&self) -> [u8; SPD_HEADER_SIZE] {
        [
            SPD_TAG[0],
            SPD_TAG[1],
            SPD_TAG[2],
            self.version,
            self.sprite_count,
            self.animation_count,
            self.background_color,
            self.multicolor_0,
            self.multicolor_1,
        ]
    }
}

/// Per-image metadata byte.
///
/// 7  bit  0
/// ---- ----
/// M . . . C C C C
/// |       | | | |
/// |       + + + +- Sprite colour
/// +--------------- Multicolour enable
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteMeta {
    pub color: u8,
    pub multicolor: bool,
}

impl SpriteMeta {
    fn from_byte(byte: u8) -> Self {
        SpriteMeta {
            color: byte & META_COLOR,
            multicolor: byte & META_MULTICOLOR != 0,
        }
    }
}

/// A sprite sheet in the SpritePad format.
///
/// See: https://www.spritemate.com/ for the layout of the blocks.
pub struct SpriteSheet {
    pub header: Header,

    /// Image blocks, 63 bytes of pixels and a metadata byte each.
    blocks: Vec<[u8; BLOCK_SIZE]>,
}

impl SpriteSheet {
    pub fn new(raw: &[u8]) -> Result<SpriteSheet, MuxError> {
        if raw.len() < SPD_HEADER_SIZE {
            return Err(MuxError::AssetLoad("file is too short".to_string()));
        }

        if raw[0..3] != SPD_TAG {
            return Err(MuxError::AssetLoad(
                "file is not in SpritePad format".to_string(),
            ));
        }

        let header = Header::from_bytes(raw);
        let count = header.sprite_count();
        if count > GRAPHIC_AREA_CAPACITY {
            return Err(MuxError::AssetLoad(format!(
                "{} sprites do not fit the {} block graphic area",
                count, GRAPHIC_AREA_CAPACITY
            )));
        }

        let data = &raw[SPD_HEADER_SIZE..];
        if data.len() < count * BLOCK_SIZE {
            return Err(MuxError::AssetLoad(format!(
                "expected {} sprite blocks, found {} bytes",
                count,
                data.len()
            )));
        }

        let blocks = data
            .chunks_exact(BLOCK_SIZE)
            .take(count)
            .map(|chunk| {
                let mut block = [0; BLOCK_SIZE];
                block.copy_from_slice(chunk);
                block
            })
            .collect();

        Ok(SpriteSheet { header, blocks })
    }

    /// Reads and parses the sheet at the given path.
    pub fn load(path: &Path) -> Result<SpriteSheet, MuxError> {
        let raw = std::fs::read(path)?;
        let sheet = SpriteSheet::new(&raw)?;
        info!(
            "loaded {}: {} sprites, {} animations",
            path.display(),
            sheet.len(),
            sheet.header.animation_count()
        );
        Ok(sheet)
    }

    /// Returns a generated sheet of filled images, one colour per image.
    pub fn placeholder(count: usize) -> SpriteSheet {
        let count = count.clamp(1, GRAPHIC_AREA_CAPACITY);
        let blocks = (0..count)
            .map(|i| {
                let mut block = [0xFF; BLOCK_SIZE];
                // Hollow out the middle rows so neighbouring sprites stay
                // distinguishable on screen.
                for row in 8..13 {
                    block[row * 3 + 1] = 0x00;
                }
                block[BLOCK_SIZE - 1] = (i as u8 % 15) + 1;
                block
            })
            .collect();

        SpriteSheet {
            header: Header {
                version: 1,
                sprite_count: (count - 1) as u8,
                animation_count: 0,
                background_color: 0,
                multicolor_0: 0,
                multicolor_1: 0,
            },
            blocks,
        }
    }

    /// Returns the number of images in the sheet.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the graphic pointer of the image at `index`.
    pub fn pointer(&self, index: usize) -> Result<u8, MuxError> {
        if index >= self.blocks.len() {
            return Err(MuxError::UnknownGraphic(index));
        }
        Ok(SHEET_BASE_POINTER + 1 + index as u8)
    }

    /// Returns the metadata of the image at `index`.
    pub fn metadata(&self, index: usize) -> Result<SpriteMeta, MuxError> {
        self.blocks
            .get(index)
            .map(|block| SpriteMeta::from_byte(block[BLOCK_SIZE - 1]))
            .ok_or(MuxError::UnknownGraphic(index))
    }

    /// Copies the sheet into the chip's video bank and loads its sprite
    /// multicolour registers.
    pub fn install(&self, vic: &mut VicII) {
        let mut header_block = [0; BLOCK_SIZE];
        header_block[SPD_PADDING..].copy_from_slice(&self.header.to_bytes());
        vic.write_block(SHEET_BASE_POINTER, &header_block);

        for (i, block) in self.blocks.iter().enumerate() {
            vic.write_block(SHEET_BASE_POINTER + 1 + i as u8, block);
        }

        vic.set_sprite_multicolors(self.header.multicolor_0, self.header.multicolor_1);
    }
}
