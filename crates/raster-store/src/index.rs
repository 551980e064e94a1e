//! Enumeration of the composites available on disk.
//!
//! Two layouts are recognised under the data directory:
//!
//! ```text
//! <data_dir>/<prefix>_<YYYY>_<MM>.tif      flat
//! <data_dir>/<YYYY>_<MM>/processed.tif     nested
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndvi_common::{NdviError, NdviResult, YearMonth};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const NESTED_FILE_NAME: &str = "processed.tif";

/// The set of (year, month) periods backed by a composite file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileIndex {
    entries: BTreeMap<YearMonth, PathBuf>,
}

impl FileIndex {
    /// Walk `dir` and index every composite it holds.
    ///
    /// A missing directory yields an empty index.
    pub fn scan(dir: &Path, prefix: &str) -> NdviResult<Self> {
        if !dir.exists() {
            warn!(path = %dir.display(), "Data directory does not exist");
            return Ok(Self::default());
        }

        let mut index = Self::default();
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(2)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                NdviError::Internal(format!("failed to scan {}: {}", dir.display(), e))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(dir) else {
                continue;
            };
            match parse_composite_path(relative, prefix) {
                Some(period) => index.insert(period, entry.path().to_path_buf()),
                None => debug!(path = %entry.path().display(), "Skipping non-composite file"),
            }
        }

        info!(
            path = %dir.display(),
            count = index.len(),
            first = ?index.first().map(|p| p.to_string()),
            last = ?index.last().map(|p| p.to_string()),
            "Indexed NDVI composites"
        );
        Ok(index)
    }

    /// Add a composite. When two files claim the same period the
    /// lexicographically smaller path wins.
    pub fn insert(&mut self, period: YearMonth, path: PathBuf) {
        match self.entries.entry(period) {
            Entry::Vacant(slot) => {
                slot.insert(path);
            }
            Entry::Occupied(mut slot) => {
                warn!(
                    period = %period,
                    kept = %slot.get().min(&path).display(),
                    "Duplicate composite for period"
                );
                if path < *slot.get() {
                    slot.insert(path);
                }
            }
        }
    }

    /// Path of the composite for `period`.
    pub fn get(&self, period: &YearMonth) -> Option<&Path> {
        self.entries.get(period).map(PathBuf::as_path)
    }

    pub fn contains(&self, period: &YearMonth) -> bool {
        self.entries.contains_key(period)
    }

    /// All periods, oldest first.
    pub fn periods(&self) -> impl Iterator<Item = YearMonth> + '_ {
        self.entries.keys().copied()
    }

    /// Periods within the inclusive year range, oldest first.
    pub fn periods_in_years(&self, start_year: i32, end_year: i32) -> Vec<YearMonth> {
        if start_year > end_year {
            return Vec::new();
        }
        let from = YearMonth {
            year: start_year,
            month: 1,
        };
        let to = YearMonth {
            year: end_year,
            month: 12,
        };
        self.entries.range(from..=to).map(|(p, _)| *p).collect()
    }

    /// Indexed periods strictly before `period` and at most `max_months`
    /// calendar months earlier, newest first.
    pub fn earlier_within(&self, period: &YearMonth, max_months: u32) -> Vec<YearMonth> {
        self.entries
            .range(..*period)
            .rev()
            .map(|(p, _)| *p)
            .take_while(|p| p.months_until(period) <= max_months as i64)
            .collect()
    }

    pub fn first(&self) -> Option<YearMonth> {
        self.entries.keys().next().copied()
    }

    pub fn last(&self) -> Option<YearMonth> {
        self.entries.keys().next_back().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(YearMonth, PathBuf)> for FileIndex {
    fn from_iter<I: IntoIterator<Item = (YearMonth, PathBuf)>>(iter: I) -> Self {
        let mut index = Self::default();
        for (period, path) in iter {
            index.insert(period, path);
        }
        index
    }
}

/// Period encoded in a path relative to the data directory.
pub fn parse_composite_path(relative: &Path, prefix: &str) -> Option<YearMonth> {
    let components: Vec<&str> = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;

    match components.as_slice() {
        [file] => parse_flat_name(file, prefix),
        [dir, file] if file.eq_ignore_ascii_case(NESTED_FILE_NAME) => parse_year_month(dir),
        _ => None,
    }
}

/// `<prefix>_<YYYY>_<MM>.tif` (or `.tiff`).
fn parse_flat_name(name: &str, prefix: &str) -> Option<YearMonth> {
    let lower = name.to_ascii_lowercase();
    let stem_len = if lower.ends_with(".tiff") {
        name.len() - 5
    } else if lower.ends_with(".tif") {
        name.len() - 4
    } else {
        return None;
    };
    let stem = &name[..stem_len];
    let rest = stem.strip_prefix(prefix)?.strip_prefix('_')?;
    parse_year_month(rest)
}

/// `YYYY_MM`.
fn parse_year_month(s: &str) -> Option<YearMonth> {
    let (year, month) = s.split_once('_')?;
    if year.len() != 4 || month.is_empty() || month.len() > 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    YearMonth::new(year, month).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    #[test]
    fn test_parse_flat_names() {
        let p = "tenggeli_ndvi";
        assert_eq!(parse_flat_name("tenggeli_ndvi_2020_06.tif", p), Some(ym(2020, 6)));
        assert_eq!(parse_flat_name("tenggeli_ndvi_2020_6.TIF", p), Some(ym(2020, 6)));
        assert_eq!(parse_flat_name("tenggeli_ndvi_2021_12.tiff", p), Some(ym(2021, 12)));
        assert_eq!(parse_flat_name("tenggeli_ndvi_2020_13.tif", p), None);
        assert_eq!(parse_flat_name("tenggeli_ndvi_2020_06.tif.aux.xml", p), None);
        assert_eq!(parse_flat_name("other_ndvi_2020_06.tif", p), None);
        assert_eq!(parse_flat_name("tenggeli_ndvi_2020.tif", p), None);
        assert_eq!(parse_flat_name("tenggeli_ndvi_20_06.tif", p), None);
    }

    #[test]
    fn test_parse_nested_layout() {
        let p = "tenggeli_ndvi";
        assert_eq!(
            parse_composite_path(Path::new("2020_01/processed.tif"), p),
            Some(ym(2020, 1))
        );
        assert_eq!(parse_composite_path(Path::new("2020_01/metadata.json"), p), None);
        assert_eq!(parse_composite_path(Path::new("misc/processed.tif"), p), None);
    }

    #[test]
    fn test_duplicate_keeps_smaller_path() {
        let index: FileIndex = [
            (ym(2020, 1), PathBuf::from("/b/tenggeli_ndvi_2020_01.tif")),
            (ym(2020, 1), PathBuf::from("/a/2020_01/processed.tif")),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.len(), 1);
        assert_eq!(
            index.get(&ym(2020, 1)),
            Some(Path::new("/a/2020_01/processed.tif"))
        );
    }

    #[test]
    fn test_periods_in_years_and_lookback() {
        let index: FileIndex = [ym(2019, 12), ym(2020, 3), ym(2020, 6), ym(2021, 1)]
            .into_iter()
            .map(|p| (p, PathBuf::from(format!("{}.tif", p))))
            .collect();

        assert_eq!(index.periods_in_years(2020, 2020), vec![ym(2020, 3), ym(2020, 6)]);
        assert!(index.periods_in_years(2021, 2020).is_empty());

        assert_eq!(index.earlier_within(&ym(2020, 6), 3), vec![ym(2020, 3)]);
        assert_eq!(
            index.earlier_within(&ym(2020, 6), 6),
            vec![ym(2020, 3), ym(2019, 12)]
        );
        assert!(index.earlier_within(&ym(2019, 12), 12).is_empty());
        assert_eq!(index.first(), Some(ym(2019, 12)));
        assert_eq!(index.last(), Some(ym(2021, 1)));
    }
}
