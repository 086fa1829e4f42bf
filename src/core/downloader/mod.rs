pub mod client;

pub use client::{md5_hex, AssetSource, Downloader};
