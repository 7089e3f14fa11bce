use base64::{engine::general_purpose, Engine as _};
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// Sprites are shown at a fixed 200x200 regardless of the source size.
pub const SPRITE_SIZE: u32 = 200;

/// Kitty graphics `f=32`: raw RGBA pixels.
const FORMAT_RGBA: u32 = 32;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteData {
    pub payload: String,
    pub width: u32,
    pub height: u32,
}

pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let resized = image
        .resize_exact(SPRITE_SIZE, SPRITE_SIZE, FilterType::Lanczos3)
        .to_rgba8();
    let (width, height) = resized.dimensions();
    Ok(SpriteData {
        payload: general_purpose::STANDARD.encode(resized.as_raw()),
        width,
        height,
    })
}

pub fn kitty_sequence(sprite: &SpriteData, cols: u16, rows: u16) -> Result<String, String> {
    let mut sequences = String::new();
    let chunk_size = 4096;
    let payload = sprite.payload.as_bytes();
    let total_chunks = payload.len().div_ceil(chunk_size);

    for (index, chunk) in payload.chunks(chunk_size).enumerate() {
        let more = index + 1 < total_chunks;
        let chunk_str = std::str::from_utf8(chunk).map_err(|err| err.to_string())?;
        if index == 0 {
            let mut params = format!(
                "f={FORMAT_RGBA},s={},v={},a=T,t=d",
                sprite.width, sprite.height
            );
            if cols > 0 {
                params.push_str(&format!(",c={cols}"));
            }
            if rows > 0 {
                params.push_str(&format!(",r={rows}"));
            }
            params.push_str(&format!(",m={}", if more { 1 } else { 0 }));
            sequences.push_str(&format!("\x1b_G{params};{chunk_str}\x1b\\"));
        } else {
            sequences.push_str(&format!(
                "\x1b_Gm={};{chunk_str}\x1b\\",
                if more { 1 } else { 0 }
            ));
        }
    }
    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[test]
    fn decoded_sprites_are_scaled_to_fixed_size() {
        let sprite = decode_sprite(&png_bytes(96, 96)).unwrap();
        assert_eq!((sprite.width, sprite.height), (SPRITE_SIZE, SPRITE_SIZE));

        let raw = general_purpose::STANDARD.decode(&sprite.payload).unwrap();
        assert_eq!(raw.len(), (SPRITE_SIZE * SPRITE_SIZE * 4) as usize);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(decode_sprite(b"not an image").is_err());
    }

    #[test]
    fn kitty_sequence_chunks_payload() {
        let sprite = decode_sprite(&png_bytes(8, 8)).unwrap();
        let sequence = kitty_sequence(&sprite, 20, 10).unwrap();

        assert!(sequence.starts_with("\x1b_Gf=32,s=200,v=200,a=T,t=d,c=20,r=10,m=1;"));
        assert!(sequence.contains("\x1b_Gm=0;"));
        assert!(sequence.ends_with("\x1b\\"));
    }
}
