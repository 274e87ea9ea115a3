//! Building a whole bundle from a [`DatasetConfig`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::bundle::{
    coords_name, markers_name, CLUSTER_LABELS, COORDS_BIN, COORDS_DIR, DESCRIPTOR_FILE, EXPR_BIN,
    EXPR_INDEX, MARKERS_DIR, META_FIELDS_DIR, META_INDEX, META_TABLE,
};
use super::config::DatasetConfig;
use super::descriptor::{converter_version, CoordsEntry, DatasetDescriptor, MarkersEntry};
use super::reconcile::{clean_columns, reconcile_samples, reorder_columns, write_meta_table, SampleOrder};
use super::{DatasetError, DatasetStats};
use crate::coords::{quantize, read_coords, write_cluster_labels, write_coords};
use crate::expr::{convert_matrix, read_quick_genes, GeneMap, MatrixReader, QuickGene};
use crate::fields::{write_meta_fields, ColorTable, FieldSchema, MetaOptions};
use crate::markers::split_marker_table;
use crate::output;
use crate::row_index::write_row_index;
use crate::table::{self, Column};

/// Builds one bundle directory.
///
/// The bundle is written into a staging directory inside the output
/// directory and only moved into place once every artifact has been written,
/// `dataset.json` last. A failed build leaves the output directory as it was.
pub struct DatasetBuilder {
    config: DatasetConfig,
    out_dir: PathBuf,
}

/// Coordinate sets written, with the number of samples placed at (0,0)
struct CoordsOutput {
    entries: Vec<CoordsEntry>,
    missing: usize,
}

impl DatasetBuilder {
    /// Prepare a build of `config` into `out_dir`.
    pub fn new<P: AsRef<Path>>(config: DatasetConfig, out_dir: P) -> Result<Self, DatasetError> {
        config.validate()?;
        Ok(Self {
            config,
            out_dir: out_dir.as_ref().to_path_buf(),
        })
    }

    /// Output directory
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Run the conversion and write `dataset.json`.
    pub fn build(self) -> Result<DatasetStats, DatasetError> {
        let config = &self.config;
        info!(
            "Building dataset '{}' into {}",
            config.name,
            self.out_dir.display()
        );
        std::fs::create_dir_all(&self.out_dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".cellpack-")
            .tempdir_in(&self.out_dir)?;
        let root = staging.path();

        let gene_map = config.gene_table.as_ref().map(GeneMap::from_file).transpose()?;

        let matrix_samples = MatrixReader::open(&config.expr_matrix)?.sample_names().to_vec();
        let meta_samples = table::read_sample_names(&config.meta)?;
        let order = reconcile_samples(&matrix_samples, &meta_samples)?;

        let columns = clean_columns(reorder_columns(table::read_columns(&config.meta)?, &order.meta_rows));
        let labels = self.label_column(&columns)?;

        let meta_path = root.join(META_TABLE);
        write_meta_table(&columns, &meta_path)?;
        write_row_index(&meta_path, root.join(META_INDEX))?;

        let meta_fields = self.write_fields(root, &columns)?;

        let expr_stats = convert_matrix(
            &config.expr_matrix,
            root.join(EXPR_BIN),
            root.join(EXPR_INDEX),
            gene_map.as_ref(),
            Some(order.samples.as_slice()),
            &config.expression,
        )?;

        let coords = self.write_coords(root, &order, labels)?;
        let (markers, marker_files) = self.write_markers(root, gene_map.as_ref())?;

        let descriptor = DatasetDescriptor {
            name: config.name.clone(),
            short_label: config.short_label().to_string(),
            tags: config.tags.clone(),
            sample_count: order.samples.len(),
            matrix_was_filtered: order.matrix_was_filtered,
            matrix_arr_type: expr_stats.matrix_type,
            meta_fields,
            coords: coords.entries,
            markers,
            label_field: config.label_field.clone(),
            acronyms: self.read_acronyms()?,
            quick_genes: self.read_quick_genes(gene_map.as_ref())?,
            created: chrono::Utc::now().to_rfc3339(),
            converter: converter_version(),
        };
        output::write_json(root.join(DESCRIPTOR_FILE), &descriptor, true)?;
        publish(root, &self.out_dir)?;

        let stats = DatasetStats {
            sample_count: descriptor.sample_count,
            field_count: descriptor.meta_fields.len(),
            expr_stats,
            coord_sets: descriptor.coords.len(),
            missing_coords: coords.missing,
            marker_files,
        };
        info!("{}", stats);
        Ok(stats)
    }

    /// The label column, reordered like the other columns, if one is configured.
    fn label_column<'a>(&self, columns: &'a [Column]) -> Result<Option<&'a [String]>, DatasetError> {
        match &self.config.label_field {
            None => Ok(None),
            Some(field) => columns
                .iter()
                .find(|column| &column.name == field)
                .map(|column| Some(column.values.as_slice()))
                .ok_or_else(|| DatasetError::MissingLabelField(field.clone())),
        }
    }

    fn write_fields(&self, root: &Path, columns: &[Column]) -> Result<Vec<FieldSchema>, DatasetError> {
        let config = &self.config;
        let options = MetaOptions {
            enum_fields: config.enum_fields.iter().cloned().collect(),
            colors: config.colors.as_ref().map(ColorTable::from_file).transpose()?,
            field_opts: config
                .meta_opt
                .iter()
                .map(|(field, opt)| (field.clone(), opt.clone()))
                .collect(),
        };
        Ok(write_meta_fields(
            columns,
            root.join(META_FIELDS_DIR),
            &options,
        )?)
    }

    fn write_coords(
        &self,
        root: &Path,
        order: &SampleOrder,
        labels: Option<&[String]>,
    ) -> Result<CoordsOutput, DatasetError> {
        let options = self.config.coord_options();
        let mut output = CoordsOutput {
            entries: Vec::with_capacity(self.config.coords.len()),
            missing: 0,
        };

        for (index, input) in self.config.coords.iter().enumerate() {
            let name = coords_name(index);
            let dir = root.join(COORDS_DIR).join(&name);
            std::fs::create_dir_all(&dir)?;

            let raw = read_coords(&input.file)?;
            let set = quantize(&raw, options);
            let written = write_coords(&set, &order.samples, dir.join(COORDS_BIN))?;
            if let Some(labels) = labels {
                write_cluster_labels(&written.xs, &written.ys, labels, dir.join(CLUSTER_LABELS))?;
            }

            output.missing += written.missing;
            output.entries.push(CoordsEntry {
                name,
                short_label: input.label(),
                stats: written.stats,
            });
        }
        Ok(output)
    }

    fn write_markers(&self, root: &Path, gene_map: Option<&GeneMap>) -> Result<(Vec<MarkersEntry>, usize), DatasetError> {
        let mut entries = Vec::with_capacity(self.config.markers.len());
        let mut files = 0;
        for (index, input) in self.config.markers.iter().enumerate() {
            let name = markers_name(index);
            let dir = root.join(MARKERS_DIR).join(&name);
            files += split_marker_table(&input.file, gene_map, &dir)?.files_written;
            entries.push(MarkersEntry {
                name,
                short_label: input.label(),
            });
        }
        Ok((entries, files))
    }

    fn read_acronyms(&self) -> Result<BTreeMap<String, String>, DatasetError> {
        let path = match &self.config.acronyms {
            Some(path) => path,
            None => return Ok(BTreeMap::new()),
        };
        if !path.exists() {
            warn!("Acronym file {} does not exist, skipping it", path.display());
            return Ok(BTreeMap::new());
        }
        info!("Reading acronyms from {}", path.display());
        Ok(table::read_key_values(path)?.into_iter().collect())
    }

    fn read_quick_genes(&self, gene_map: Option<&GeneMap>) -> Result<Vec<QuickGene>, DatasetError> {
        match &self.config.quick_genes {
            Some(path) => Ok(read_quick_genes(path, gene_map)?),
            None => Ok(Vec::new()),
        }
    }
}

/// Move the staged bundle in `staging` into `out_dir`, the descriptor last.
///
/// Artifacts of an earlier build with the same names are replaced.
fn publish(staging: &Path, out_dir: &Path) -> Result<(), DatasetError> {
    for entry in std::fs::read_dir(staging)? {
        let entry = entry?;
        let name = entry.file_name();
        if name == DESCRIPTOR_FILE {
            continue;
        }
        let target = out_dir.join(&name);
        if target.is_dir() {
            std::fs::remove_dir_all(&target)?;
        }
        std::fs::rename(entry.path(), &target)?;
    }
    std::fs::rename(staging.join(DESCRIPTOR_FILE), out_dir.join(DESCRIPTOR_FILE))?;
    debug!("Moved bundle from {} into place", staging.display());
    Ok(())
}

/// Build `config` into `out_dir`.
pub fn build_dataset<P: AsRef<Path>>(config: DatasetConfig, out_dir: P) -> Result<DatasetStats, DatasetError> {
    DatasetBuilder::new(config, out_dir)?.build()
}
