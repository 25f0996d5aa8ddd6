//! File-backed record store. All reads and writes of `parking_data.json`
//! go through here; callers never touch the file directly.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::ParkingRecord;

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Store { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the whole array. A missing or malformed store is fatal; the
    /// tool never creates the file on its own.
    pub fn load(&self) -> Result<Vec<ParkingRecord>> {
        let text = fs::read_to_string(&self.path).with_context(|| {
            format!("データファイルを読み込めません: {}", self.path.display())
        })?;
        serde_json::from_str(&text).with_context(|| {
            format!("データファイルの解析に失敗しました: {}", self.path.display())
        })
    }

    /// Rewrite the whole array: pretty-printed, non-ASCII kept literal.
    /// Writes a sibling temp file and renames it over the store so an
    /// interrupted run cannot leave a truncated file behind.
    pub fn save(&self, records: &[ParkingRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .with_context(|| format!("一時ファイルを書き込めません: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("データファイルを更新できません: {}", self.path.display()))?;
        Ok(())
    }
}

/// Next record id: one past the current maximum, 1 for an empty store.
pub fn next_id(records: &[ParkingRecord]) -> u32 {
    records.iter().map(|r| r.id).max().unwrap_or(0) + 1
}
