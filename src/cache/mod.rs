mod disk;

pub use disk::ThumbnailCache;
