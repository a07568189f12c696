use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use zip::ZipArchive;
use crate::constants::MAX_ENTRY_BYTES;
use crate::error::{MediaError, Result};
use crate::fs_utils::{check_access, ensure_directory};
use crate::image_utils::{is_image_entry, thumbnail_from_bytes};
use crate::media::MediaRecord;
use crate::state::AppState;
use crate::thumbnail::ThumbnailOptions;

// サムネイル元として読み出したアーカイブ内の画像（読み出し失敗もエントリ単位で保持）
struct EntryImage {
    index: u32,
    name: String,
    data: Result<Vec<u8>>,
}

/// 画像エントリからサムネイル元を選ぶ。
/// 名前に "cover" を含むものを先頭にし、候補を count 個のグループに分けて各先頭を取る。
/// 候補が count 未満なら全候補（count 枚に満たない）
pub fn select_entries(names: &[String], count: u32) -> Vec<String> {
    let mut candidates: Vec<&String> = names.iter().filter(|n| is_image_entry(n)).collect();
    if let Some(pos) = candidates
        .iter()
        .position(|n| n.to_lowercase().contains("cover"))
    {
        let cover = candidates.remove(pos);
        candidates.insert(0, cover);
    }

    let count = count as usize;
    if count == 0 || candidates.is_empty() {
        return Vec::new();
    }
    if candidates.len() < count {
        return candidates.into_iter().cloned().collect();
    }

    let len = candidates.len();
    (0..count)
        .map(|group| candidates[group * len / count].clone())
        .collect()
}

// エントリを1件読み出す。宣言サイズは信用せず limit バイトで打ち切る
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str, limit: u64) -> Result<Vec<u8>> {
    let entry = archive.by_name(name)?;
    let mut data = Vec::new();
    entry.take(limit + 1).read_to_end(&mut data)?;
    if data.len() as u64 > limit {
        return Err(MediaError::EntryTooLarge {
            name: name.to_string(),
            limit,
        });
    }
    Ok(data)
}

// アーカイブを開き、必要な index の画像だけ読み出す
fn read_entry_images(path: &Path, count: u32, wanted: &[bool]) -> Result<Vec<EntryImage>> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let names: Vec<String> = archive.file_names().map(str::to_string).collect();
    let selected = select_entries(&names, count);

    let mut images = Vec::new();
    for (i, name) in selected.into_iter().enumerate() {
        if !wanted.get(i).copied().unwrap_or(false) {
            continue;
        }
        let data = read_entry(&mut archive, &name, MAX_ENTRY_BYTES);
        images.push(EntryImage {
            index: i as u32 + 1,
            name,
            data,
        });
    }
    Ok(images)
}

async fn write_thumbnail(data: Vec<u8>, output: PathBuf, size: u32) -> Result<()> {
    let png = tokio::task::spawn_blocking(move || thumbnail_from_bytes(&data, size)).await??;
    tokio::fs::write(&output, png).await?;
    Ok(())
}

/// zip 内の画像を縮小してサムネイルにする。エントリごとの失敗はログのみ
pub async fn create_thumbnails(
    record: &MediaRecord,
    state: &AppState,
    options: ThumbnailOptions,
    force: bool,
) {
    ensure_directory(&record.thumbnail_dir(&state.cache)).await;
    if !force && record.has_all_thumbnails(&state.cache, options.count).await {
        return;
    }

    info!("サムネイル生成: {}", record.fullpath.display());

    let mut wanted = Vec::with_capacity(options.count as usize);
    for index in 1..=options.count {
        wanted.push(force || !check_access(&record.thumbnail_path(&state.cache, index)).await);
    }

    let path = record.fullpath.clone();
    let count = options.count;
    let images = match tokio::task::spawn_blocking(move || read_entry_images(&path, count, &wanted)).await {
        Ok(Ok(images)) => images,
        Ok(Err(e)) => {
            warn!("アーカイブ読み込み失敗: {} - {}", record.fullpath.display(), e);
            return;
        }
        Err(e) => {
            warn!("アーカイブ読み込み失敗: {} - {}", record.fullpath.display(), e);
            return;
        }
    };

    for image in images {
        let output = record.thumbnail_path(&state.cache, image.index);
        let label = format!("{} [{}] {}", record.fullpath.display(), image.index, image.name);
        let written = match image.data {
            Ok(data) => write_thumbnail(data, output, options.size).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => debug!("サムネイル書き出し: {}", label),
            Err(e) => warn!("{}: {}", label, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};
    use crate::database::Database;
    use crate::test_support::{test_state, CountingThumbnailer, StaticProber};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([200, 10, 10])));
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap();
    }

    fn state(dir: &TempDir) -> AppState {
        test_state(
            dir,
            Arc::new(Database::open_in_memory().unwrap()),
            Arc::new(CountingThumbnailer::default()),
            Arc::new(StaticProber::new(None)),
        )
    }

    #[test]
    fn cover_is_selected_first() {
        let entries = names(&["p1.jpg", "p2.jpg", "Cover.JPG", "p3.jpg", "p4.png", "notes.txt"]);
        let selected = select_entries(&entries, 2);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0], "Cover.JPG");
        assert_eq!(selected[1], "p2.jpg");
    }

    #[test]
    fn selections_are_spread_across_the_archive() {
        let entries = names(&["1.jpg", "2.jpg", "3.jpg", "4.jpg", "5.jpg", "6.jpg"]);
        assert_eq!(select_entries(&entries, 3), names(&["1.jpg", "3.jpg", "5.jpg"]));
        assert_eq!(select_entries(&entries, 6), entries);
    }

    #[test]
    fn fewer_candidates_than_count_selects_all_of_them() {
        assert_eq!(select_entries(&names(&["only.png"]), 3), names(&["only.png"]));
        assert!(select_entries(&names(&["readme.md"]), 3).is_empty());
        assert!(select_entries(&names(&["a.png"]), 0).is_empty());
    }

    #[tokio::test]
    async fn writes_resized_pngs_for_selected_entries() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("book.zip");
        write_zip(
            &zip_path,
            &[
                ("pages/01.png", png_bytes(100, 150)),
                ("pages/02.png", png_bytes(100, 150)),
                ("pages/cover.png", png_bytes(200, 100)),
                ("pages/03.png", png_bytes(100, 150)),
            ],
        );
        let state = state(&dir);
        let record = MediaRecord::build_by_path(&zip_path).await.unwrap();

        record
            .create_thumbnail(&state, ThumbnailOptions { count: 2, size: 50 }, false)
            .await;

        assert!(record.has_all_thumbnails(&state.cache, 2).await);
        let cover = image::open(record.thumbnail_path(&state.cache, 1)).unwrap();
        assert_eq!((cover.width(), cover.height()), (50, 25));
        let page = image::open(record.thumbnail_path(&state.cache, 2)).unwrap();
        assert_eq!((page.width(), page.height()), (50, 75));
    }

    #[tokio::test]
    async fn single_image_yields_single_thumbnail() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("single.zip");
        write_zip(&zip_path, &[("a.png", png_bytes(40, 40)), ("info.txt", b"hi".to_vec())]);
        let state = state(&dir);
        let record = MediaRecord::build_by_path(&zip_path).await.unwrap();

        record
            .create_thumbnail(&state, ThumbnailOptions { count: 3, size: 20 }, false)
            .await;

        assert!(record.thumbnail_path(&state.cache, 1).exists());
        assert!(!record.thumbnail_path(&state.cache, 2).exists());
        assert!(!record.has_all_thumbnails(&state.cache, 3).await);
    }

    #[tokio::test]
    async fn existing_thumbnails_are_kept_unless_forced() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("book.zip");
        write_zip(&zip_path, &[("1.png", png_bytes(10, 10)), ("2.png", png_bytes(10, 10))]);
        let state = state(&dir);
        let record = MediaRecord::build_by_path(&zip_path).await.unwrap();
        let options = ThumbnailOptions { count: 2, size: 8 };

        std::fs::create_dir_all(record.thumbnail_dir(&state.cache)).unwrap();
        let first = record.thumbnail_path(&state.cache, 1);
        std::fs::write(&first, b"placeholder").unwrap();

        record.create_thumbnail(&state, options, false).await;
        assert_eq!(std::fs::read(&first).unwrap(), b"placeholder");
        assert!(image::open(record.thumbnail_path(&state.cache, 2)).is_ok());

        record.create_thumbnail(&state, options, true).await;
        assert!(image::open(&first).is_ok());
    }

    #[tokio::test]
    async fn broken_entries_do_not_stop_the_rest() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("mixed.zip");
        write_zip(
            &zip_path,
            &[("1.jpg", b"not a jpeg".to_vec()), ("2.png", png_bytes(10, 10))],
        );
        let state = state(&dir);
        let record = MediaRecord::build_by_path(&zip_path).await.unwrap();

        record
            .create_thumbnail(&state, ThumbnailOptions { count: 2, size: 8 }, false)
            .await;

        assert!(!record.thumbnail_path(&state.cache, 1).exists());
        assert!(record.thumbnail_path(&state.cache, 2).exists());
    }

    #[tokio::test]
    async fn corrupted_entry_does_not_stop_the_rest() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("corrupt.zip");
        let first = png_bytes(12, 12);
        write_zip(&zip_path, &[("1.png", first.clone()), ("2.png", png_bytes(10, 10))]);

        // 1.png の格納データを1バイト書き換えて CRC を壊す
        let mut bytes = std::fs::read(&zip_path).unwrap();
        let start = bytes
            .windows(first.len())
            .position(|w| w == first.as_slice())
            .unwrap();
        bytes[start + first.len() / 2] ^= 0xff;
        std::fs::write(&zip_path, bytes).unwrap();

        let state = state(&dir);
        let record = MediaRecord::build_by_path(&zip_path).await.unwrap();

        record
            .create_thumbnail(&state, ThumbnailOptions { count: 2, size: 8 }, false)
            .await;

        assert!(!record.thumbnail_path(&state.cache, 1).exists());
        assert!(image::open(record.thumbnail_path(&state.cache, 2)).is_ok());
    }

    #[test]
    fn oversize_entry_is_rejected_without_trusting_the_header() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("big.zip");
        write_zip(&zip_path, &[("big.png", vec![7u8; 100]), ("small.png", vec![1u8; 10])]);
        let mut archive = ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();

        let err = read_entry(&mut archive, "big.png", 50).unwrap_err();
        assert!(matches!(err, MediaError::EntryTooLarge { limit: 50, .. }));
        assert_eq!(read_entry(&mut archive, "small.png", 50).unwrap(), vec![1u8; 10]);
        assert_eq!(read_entry(&mut archive, "big.png", 100).unwrap().len(), 100);
    }

    #[tokio::test]
    async fn unreadable_archive_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let zip_path = dir.path().join("broken.zip");
        std::fs::write(&zip_path, b"garbage").unwrap();
        let state = state(&dir);
        let record = MediaRecord::build_by_path(&zip_path).await.unwrap();

        record
            .create_thumbnail(&state, ThumbnailOptions { count: 2, size: 8 }, false)
            .await;
        assert!(!record.has_all_thumbnails(&state.cache, 2).await);
    }
}
