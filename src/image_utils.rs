use std::io::Cursor;
use std::path::Path;
use image::{DynamicImage, ImageFormat};
use crate::constants::{IMAGE_EXTENSIONS, MAX_IMAGE_DIMENSION, MAX_PIXEL_COUNT};
use crate::error::{MediaError, Result};

// 画像サイズ検証（DoS防止）
pub fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(MediaError::Dimensions("幅または高さが0".to_string()));
    }
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(MediaError::Dimensions(format!(
            "画像サイズが大きすぎます: {}x{} (最大: {})",
            width, height, MAX_IMAGE_DIMENSION
        )));
    }
    let pixel_count = (width as u64) * (height as u64);
    if pixel_count > MAX_PIXEL_COUNT {
        return Err(MediaError::Dimensions(format!(
            "ピクセル数が多すぎます: {} (最大: {})",
            pixel_count, MAX_PIXEL_COUNT
        )));
    }
    Ok(())
}

// アーカイブ内のエントリ名が画像かどうか
pub fn is_image_entry(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

// 指定幅に合わせたときの高さ（アスペクト比維持、最低1px）
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    let ratio = width as f64 / target_width as f64;
    ((height as f64 / ratio).round() as u32).max(1)
}

// 画像を指定幅のサムネイルに変換（PNG）
pub fn create_thumbnail(img: DynamicImage, target_width: u32) -> Result<Vec<u8>> {
    use image::imageops::FilterType;

    validate_dimensions(img.width(), img.height())?;
    let target_height = scaled_height(img.width(), img.height(), target_width);
    // 縦長画像を拡大すると出力側が上限を超える
    validate_dimensions(target_width, target_height)?;

    // Triangle: 高速なリサンプリングフィルタ（サムネイル用途では十分な品質）
    let thumbnail = img.resize_exact(target_width, target_height, FilterType::Triangle);

    let mut buffer = Cursor::new(Vec::new());
    thumbnail.write_to(&mut buffer, ImageFormat::Png)?;

    Ok(buffer.into_inner())
}

// メモリ上の画像データを読み込んでサムネイル化
pub fn thumbnail_from_bytes(data: &[u8], target_width: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;
    create_thumbnail(img, target_width)
}
