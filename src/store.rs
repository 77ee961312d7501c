// TermPix
// copyright termpix contributors 2024~2025

//! Disk store for cell assets: one plain-text `.tpx` file per asset,
//! addressed by stem name under a root directory. The format is a
//! `width=W,height=H` header followed by one line per cell row, each cell
//! a `codepoint,fr,fg,fb,br,bg,bb` tuple. Being plain text, a stored
//! asset survives `cat` and diffs cleanly.

use crate::asset::{Cell, ImageAsset, Rgb};
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use std::fmt;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// asset file extension, without the dot
pub const ASSET_EXT: &str = "tpx";

lazy_static! {
    static ref HEAD_RE: Regex = Regex::new(r"width=(\d+),height=(\d+)").unwrap();
    static ref CELL_RE: Regex =
        Regex::new(r"(\d+),(\d+),(\d+),(\d+),(\d+),(\d+),(\d+)").unwrap();
}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Format(String),
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> StoreError {
        StoreError::Io(err)
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "io error: {}", e),
            StoreError::Format(msg) => write!(f, "bad asset file: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Serializes an asset into the `.tpx` text form.
pub fn encode_asset(asset: &ImageAsset) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "width={},height={}", asset.width, asset.height);
    for y in 0..asset.height {
        for x in 0..asset.width {
            let cell = asset.get(x, y);
            let cp = cell.symbol.chars().next().unwrap_or(' ') as u32;
            let _ = write!(
                out,
                "{},{},{},{},{},{},{} ",
                cp, cell.fg.r, cell.fg.g, cell.fg.b, cell.bg.r, cell.bg.g, cell.bg.b
            );
        }
        out.push('\n');
    }
    out
}

/// Parses the `.tpx` text form back into an asset.
pub fn decode_asset(text: &str) -> Result<ImageAsset, StoreError> {
    let mut lines = text.lines();
    let head = lines.next().unwrap_or("");
    let caps = HEAD_RE
        .captures(head)
        .ok_or_else(|| StoreError::Format("missing width=,height= header".to_string()))?;
    let width: usize = caps[1]
        .parse()
        .map_err(|e| StoreError::Format(format!("width: {}", e)))?;
    let height: usize = caps[2]
        .parse()
        .map_err(|e| StoreError::Format(format!("height: {}", e)))?;

    let mut cells = Vec::with_capacity(width * height);
    for line in lines {
        for caps in CELL_RE.captures_iter(line) {
            let cp: u32 = caps[1]
                .parse()
                .map_err(|e| StoreError::Format(format!("code point: {}", e)))?;
            let symbol = char::from_u32(cp)
                .ok_or_else(|| StoreError::Format(format!("invalid code point {}", cp)))?
                .to_string();
            let mut ch = [0u8; 6];
            for (i, slot) in ch.iter_mut().enumerate() {
                *slot = caps[i + 2]
                    .parse()
                    .map_err(|e| StoreError::Format(format!("channel: {}", e)))?;
            }
            cells.push(Cell {
                symbol,
                fg: Rgb::new(ch[0], ch[1], ch[2]),
                bg: Rgb::new(ch[3], ch[4], ch[5]),
            });
        }
    }
    if cells.len() != width * height {
        return Err(StoreError::Format(format!(
            "expected {} cells, found {}",
            width * height,
            cells.len()
        )));
    }
    Ok(ImageAsset {
        width,
        height,
        cells,
    })
}

/// Store rooted at one directory, one `.tpx` file per asset.
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    /// Opens the store, creating the root directory when missing.
    pub fn new<P: Into<PathBuf>>(root: P) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.{}", name, ASSET_EXT))
    }

    /// Stem names of every stored asset, sorted.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ASSET_EXT) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn save(&self, asset: &ImageAsset, name: &str) -> Result<(), StoreError> {
        let path = self.path_of(name);
        fs::write(&path, encode_asset(asset))?;
        info!("saved asset {:?} ({}x{})", path, asset.width, asset.height);
        Ok(())
    }

    pub fn load(&self, name: &str) -> Result<ImageAsset, StoreError> {
        decode_asset(&fs::read_to_string(self.path_of(name))?)
    }

    /// Removes the asset; Ok(false) when it was not there.
    pub fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.path_of(name);
        if path.exists() {
            fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Renames an asset. Ok(false) when the source is missing or the
    /// target name is already taken; renaming to itself is a no-op.
    pub fn rename(&self, old: &str, new: &str) -> Result<bool, StoreError> {
        if old.is_empty() || new.is_empty() {
            return Ok(false);
        }
        if old == new {
            return Ok(true);
        }
        let from = self.path_of(old);
        let to = self.path_of(new);
        if !from.exists() || to.exists() {
            return Ok(false);
        }
        fs::rename(from, to)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample_asset() -> ImageAsset {
        let mut asset = ImageAsset::new(2, 2);
        *asset.get_mut(0, 0) = Cell {
            symbol: "█".into(),
            fg: Rgb::new(255, 0, 0),
            bg: Rgb::new(0, 0, 0),
        };
        *asset.get_mut(1, 1) = Cell {
            symbol: "▞".into(),
            fg: Rgb::new(10, 20, 30),
            bg: Rgb::new(40, 50, 60),
        };
        asset
    }

    fn scratch_store() -> AssetStore {
        static SEQ: AtomicUsize = AtomicUsize::new(0);
        let dir = std::env::temp_dir().join(format!(
            "termpix-store-test-{}-{}",
            std::process::id(),
            SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        AssetStore::new(dir).unwrap()
    }

    #[test]
    fn text_round_trip_preserves_the_asset() {
        let asset = sample_asset();
        let text = encode_asset(&asset);
        assert!(text.starts_with("width=2,height=2\n"));
        assert_eq!(decode_asset(&text).unwrap(), asset);
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert!(decode_asset("no header here").is_err());
        assert!(decode_asset("width=2,height=2\n32,0,0,0,0,0,0 \n").is_err());
        // 0xD800 is a surrogate, not a scalar value
        assert!(decode_asset("width=1,height=1\n55296,0,0,0,0,0,0 \n").is_err());
    }

    #[test]
    fn store_saves_lists_renames_and_deletes() {
        let store = scratch_store();
        let asset = sample_asset();
        store.save(&asset, "boat").unwrap();
        assert_eq!(store.list().unwrap(), vec!["boat".to_string()]);
        assert_eq!(store.load("boat").unwrap(), asset);

        assert!(store.rename("boat", "ship").unwrap());
        assert!(!store.rename("boat", "ship").unwrap());
        assert_eq!(store.list().unwrap(), vec!["ship".to_string()]);

        assert!(store.delete("ship").unwrap());
        assert!(!store.delete("ship").unwrap());
        assert!(store.list().unwrap().is_empty());
        fs::remove_dir_all(store.root()).unwrap();
    }
}
