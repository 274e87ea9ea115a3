//! Categorical (enum) field encoding and the optional color table.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use log::warn;

use super::types::ArrType;
use super::FieldError;
use crate::table;

/// Color used for labels missing from the color table
pub const PLACEHOLDER_COLOR: &str = "DDDDDD";

/// Mapping from metadata value to a hex color (without `#`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorTable {
    colors: HashMap<String, String>,
}

/// Strip whitespace and a leading `#`, then require one to six hex digits.
fn normalize_color(label: &str, raw: &str) -> Result<String, FieldError> {
    let color = raw.trim().trim_start_matches('#');
    if color.is_empty() || color.len() > 6 || !color.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(FieldError::InvalidColor {
            label: label.to_string(),
            color: raw.to_string(),
        });
    }
    Ok(color.to_string())
}

impl ColorTable {
    /// Build a table from `(value, color)` pairs, validating every color.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FieldError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut colors = HashMap::new();
        for (label, color) in pairs {
            let label = label.into();
            let color = normalize_color(&label, color.as_ref())?;
            colors.insert(label, color);
        }
        Ok(Self { colors })
    }

    /// Load a headerless `value<TAB>color` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FieldError> {
        Self::from_pairs(table::read_key_values(path)?)
    }

    /// Color for a label, if present
    pub fn get(&self, label: &str) -> Option<&str> {
        self.colors.get(label).map(String::as_str)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// An enum column turned into integer codes
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEncoding {
    /// Distinct labels, most frequent first; the position is the code
    pub labels: Vec<String>,
    /// Row count per label, same order as `labels`
    pub counts: Vec<u64>,
    /// Code of every row, in row order
    pub codes: Vec<u16>,
    /// Width of the binary codes
    pub arr_type: ArrType,
    /// Label colors, present only if the color table matched at least one label
    pub colors: Option<BTreeMap<String, String>>,
}

/// Code an enum column by descending label frequency.
///
/// Labels with equal counts keep the order in which they first appear in the
/// column, so the result only depends on the input row order.
pub fn encode_categories(
    field: &str,
    values: &[String],
    colors: Option<&ColorTable>,
) -> Result<CategoryEncoding, FieldError> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut seen: Vec<(&str, u64)> = Vec::new();
    for value in values {
        match index.get(value.as_str()) {
            Some(&i) => seen[i].1 += 1,
            None => {
                index.insert(value.as_str(), seen.len());
                seen.push((value.as_str(), 1));
            }
        }
    }

    let arr_type = ArrType::for_category_count(field, seen.len())?;

    // stable: equal counts stay in first-seen order
    seen.sort_by(|a, b| b.1.cmp(&a.1));

    let code_of: HashMap<&str, u16> = seen
        .iter()
        .enumerate()
        .map(|(code, (label, _))| (*label, code as u16))
        .collect();
    let codes = values.iter().map(|v| code_of[v.as_str()]).collect();

    let colors = colors.and_then(|table| assign_colors(field, &seen, table));

    Ok(CategoryEncoding {
        labels: seen.iter().map(|(label, _)| label.to_string()).collect(),
        counts: seen.iter().map(|(_, count)| *count).collect(),
        codes,
        arr_type,
        colors,
    })
}

fn assign_colors(
    field: &str,
    labels: &[(&str, u64)],
    table: &ColorTable,
) -> Option<BTreeMap<String, String>> {
    let mut colors = BTreeMap::new();
    let mut missing = BTreeSet::new();
    for (label, _) in labels {
        match table.get(label) {
            Some(color) => {
                colors.insert(label.to_string(), color.to_string());
            }
            None => {
                missing.insert(*label);
                colors.insert(label.to_string(), PLACEHOLDER_COLOR.to_string());
            }
        }
    }

    if missing.len() == labels.len() {
        return None;
    }
    if !missing.is_empty() {
        warn!(
            "Field '{}': no color found for {} values, using {}: {:?}",
            field,
            missing.len(),
            PLACEHOLDER_COLOR,
            missing
        );
    }
    Some(colors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_codes_by_descending_frequency() {
        let values = strings(&["b", "a", "a", "c", "a", "c"]);
        let enc = encode_categories("cluster", &values, None).unwrap();
        assert_eq!(enc.labels, vec!["a", "c", "b"]);
        assert_eq!(enc.counts, vec![3, 2, 1]);
        assert_eq!(enc.codes, vec![2, 0, 0, 1, 0, 1]);
        assert_eq!(enc.arr_type, ArrType::Uint8);
        assert!(enc.colors.is_none());
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let values = strings(&["z", "y", "x", "y", "z", "x"]);
        let enc = encode_categories("f", &values, None).unwrap();
        assert_eq!(enc.labels, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_width_boundaries() {
        let labels: Vec<String> = (0..255).map(|i| format!("l{i}")).collect();
        let enc = encode_categories("f", &labels, None).unwrap();
        assert_eq!(enc.arr_type, ArrType::Uint8);

        let labels: Vec<String> = (0..256).map(|i| format!("l{i}")).collect();
        let enc = encode_categories("f", &labels, None).unwrap();
        assert_eq!(enc.arr_type, ArrType::Uint16);
        assert_eq!(enc.codes[255], 255);

        let labels: Vec<String> = (0..65536).map(|i| format!("l{i}")).collect();
        let err = encode_categories("f", &labels, None).unwrap_err();
        assert!(matches!(err, FieldError::TooManyCategories { count: 65536, .. }));
    }

    #[test]
    fn test_colors_with_placeholder() {
        let table = ColorTable::from_pairs(vec![("a", "#FF0000 "), ("q", "00ff00")]).unwrap();
        let values = strings(&["a", "b", "a"]);
        let enc = encode_categories("f", &values, Some(&table)).unwrap();
        let colors = enc.colors.unwrap();
        assert_eq!(colors["a"], "FF0000");
        assert_eq!(colors["b"], PLACEHOLDER_COLOR);
    }

    #[test]
    fn test_no_matching_color_means_no_colors() {
        let table = ColorTable::from_pairs(vec![("q", "00ff00")]).unwrap();
        let values = strings(&["a", "b"]);
        let enc = encode_categories("f", &values, Some(&table)).unwrap();
        assert!(enc.colors.is_none());
    }

    #[test]
    fn test_invalid_colors() {
        assert!(ColorTable::from_pairs(vec![("a", "1234567")]).is_err());
        assert!(ColorTable::from_pairs(vec![("a", "red")]).is_err());
        assert!(ColorTable::from_pairs(vec![("a", "")]).is_err());
        let table = ColorTable::from_pairs(vec![("a", "abc")]).unwrap();
        assert_eq!(table.get("a"), Some("abc"));
        assert_eq!(table.len(), 1);
    }
}
