//! Gene identifier to symbol mapping.

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use log::{error, info};
use serde::{Deserialize, Serialize};

use super::ExprError;
use crate::table;

/// Remove a trailing `.version` from an identifier (`ENSG00000141510.16`).
///
/// Only the part after the last dot is removed, and only if it is a number.
pub fn strip_version(id: &str) -> &str {
    match id.rsplit_once('.') {
        Some((base, version))
            if !base.is_empty() && !version.is_empty() && version.bytes().all(|b| b.is_ascii_digit()) =>
        {
            base
        }
        _ => id,
    }
}

/// Maps matrix row identifiers (e.g. Ensembl IDs) to display symbols
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneMap {
    symbols: HashMap<String, String>,
}

impl GeneMap {
    /// Build a map from `(identifier, symbol)` pairs; empty symbols are skipped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let symbols = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        Self { symbols }
    }

    /// Load a gene table.
    ///
    /// Two layouts are accepted: a header-less `id<TAB>symbol` file, or a
    /// table whose header names a `geneId` and a `symbol` column. In the
    /// second case version suffixes are stripped from the identifiers.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ExprError> {
        let path = path.as_ref();
        info!("Reading gene to symbol mapping from {}", path.display());

        let mut first_line = String::new();
        table::open_text(path)?.read_line(&mut first_line)?;

        if !first_line.contains("geneId") {
            return Ok(Self::from_pairs(table::read_key_values(path)?));
        }

        let columns = table::read_columns(path)?;
        let find = |name: &str| {
            columns
                .iter()
                .find(|c| c.name == name)
                .ok_or_else(|| table::TableError::MissingColumn {
                    source_name: path.display().to_string(),
                    column: name.to_string(),
                })
        };
        let ids = find("geneId")?;
        let symbols = find("symbol")?;
        Ok(Self::from_pairs(
            ids.values
                .iter()
                .zip(&symbols.values)
                .map(|(id, sym)| (strip_version(id).to_string(), sym.clone())),
        ))
    }

    /// Symbol for an identifier: tried verbatim first, then without its version.
    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.symbols
            .get(id)
            .or_else(|| self.symbols.get(strip_version(id)))
            .map(String::as_str)
    }

    /// All symbols the map can produce
    pub fn symbols(&self) -> HashSet<&str> {
        self.symbols.values().map(String::as_str).collect()
    }

    /// Number of identifiers
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if the map is empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A gene highlighted in the client's gene list.
///
/// Serialized as `[symbol]`, `[symbol, desc]` or `[symbol, desc, pmid]`
/// depending on the columns of the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<String>", try_from = "Vec<String>")]
pub struct QuickGene {
    /// Gene symbol
    pub symbol: String,
    /// Short description
    pub desc: Option<String>,
    /// Supporting PubMed identifier
    pub pmid: Option<String>,
}

impl From<QuickGene> for Vec<String> {
    fn from(gene: QuickGene) -> Self {
        std::iter::once(gene.symbol)
            .chain(gene.desc)
            .chain(gene.pmid)
            .collect()
    }
}

impl TryFrom<Vec<String>> for QuickGene {
    type Error = String;

    fn try_from(fields: Vec<String>) -> Result<Self, Self::Error> {
        if fields.is_empty() || fields.len() > 3 {
            return Err(format!(
                "quick gene entries have 1 to 3 elements, found {}",
                fields.len()
            ));
        }
        let mut fields = fields.into_iter();
        Ok(Self {
            symbol: fields.next().unwrap_or_default(),
            desc: fields.next(),
            pmid: fields.next(),
        })
    }
}

/// Read a quick gene table with a `symbol` column and optional `desc` and
/// `pmid` columns. With a gene map, unknown symbols are skipped.
pub fn read_quick_genes<P: AsRef<Path>>(
    path: P,
    gene_map: Option<&GeneMap>,
) -> Result<Vec<QuickGene>, ExprError> {
    let path = path.as_ref();
    info!("Parsing quick genes from {}", path.display());
    let columns = table::read_columns(path)?;
    let column = |name: &str| columns.iter().find(|c| c.name == name);

    let symbols = column("symbol").ok_or_else(|| table::TableError::MissingColumn {
        source_name: path.display().to_string(),
        column: "symbol".to_string(),
    })?;
    let descs = column("desc");
    let pmids = column("pmid");
    let valid = gene_map.map(GeneMap::symbols);

    let mut genes = Vec::with_capacity(symbols.len());
    for (i, symbol) in symbols.values.iter().enumerate() {
        if let Some(valid) = &valid {
            if !valid.contains(symbol.as_str()) {
                error!("'{}' is not a valid gene symbol, skipping it", symbol);
                continue;
            }
        }
        genes.push(QuickGene {
            symbol: symbol.clone(),
            desc: descs.map(|c| c.values[i].clone()),
            pmid: pmids.map(|c| c.values[i].clone()),
        });
    }
    Ok(genes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_lookup_strips_version() {
        let map = GeneMap::from_pairs(vec![("ENSG1", "TP53"), ("RP11-1.2", "RP11"), ("ENSG9", "")]);
        assert_eq!(map.lookup("ENSG1"), Some("TP53"));
        assert_eq!(map.lookup("ENSG1.16"), Some("TP53"));
        assert_eq!(map.lookup("RP11-1.2"), Some("RP11"));
        assert_eq!(map.lookup("ENSG9"), None);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_strip_version_removes_last_suffix_only() {
        assert_eq!(strip_version("ENSG00000141510.16"), "ENSG00000141510");
        assert_eq!(strip_version("AC000.1.2"), "AC000.1");
        assert_eq!(strip_version("ENSG1"), "ENSG1");
        assert_eq!(strip_version("HLA.A"), "HLA.A");
        assert_eq!(strip_version(".5"), ".5");

        let map = GeneMap::from_pairs(vec![("AC000.1", "AC000")]);
        assert_eq!(map.lookup("AC000.1.2"), Some("AC000"));
    }

    #[test]
    fn test_headerless_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "ENSG1\tTP53\nENSG2\tMYC").unwrap();
        let map = GeneMap::from_file(file.path()).unwrap();
        assert_eq!(map.lookup("ENSG2"), Some("MYC"));
        assert!(map.symbols().contains("TP53"));
    }

    #[test]
    fn test_file_with_header() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "transcriptId\tgeneId\tsymbol\nENST1\tENSG1.3\tTP53\nENST2\tENSG2.1\t\nENST3\tENSG3.7\tMYC"
        )
        .unwrap();
        let map = GeneMap::from_file(file.path()).unwrap();
        assert_eq!(map.lookup("ENSG1.4"), Some("TP53"));
        assert_eq!(map.lookup("ENSG3"), Some("MYC"));
        assert_eq!(map.lookup("ENSG2"), None);
    }

    #[test]
    fn test_quick_genes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "symbol\tdesc\nTP53\ttumor suppressor\nFAKE1\tnothing").unwrap();
        let map = GeneMap::from_pairs(vec![("ENSG1", "TP53")]);

        let genes = read_quick_genes(file.path(), Some(&map)).unwrap();
        assert_eq!(genes.len(), 1);
        assert_eq!(
            serde_json::to_string(&genes).unwrap(),
            r#"[["TP53","tumor suppressor"]]"#
        );

        let all = read_quick_genes(file.path(), None).unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[1].pmid.is_none());

        let parsed: Vec<QuickGene> = serde_json::from_str(r#"[["MYC"],["TP53","p53","123"]]"#).unwrap();
        assert_eq!(parsed[0].desc, None);
        assert_eq!(parsed[1].pmid.as_deref(), Some("123"));
        assert!(serde_json::from_str::<QuickGene>("[]").is_err());
    }
}
