// ============================================================
// Layer 4 — OGB Raw Dataset Loader
// ============================================================
// Reads ogbn-mag from the raw directory layout OGB distributes:
//
//   dataset/ogbn_mag/
//     raw/
//       num-node-dict.csv.gz            header: node types, row: counts
//       triplet-type-list.csv.gz        one "src,rel,dst" per line
//       relations/
//         author___writes___paper/
//           edge.csv.gz                 one "src,dst" per line
//         ...
//       node-feat/paper/node-feat.csv.gz    one row of floats per paper
//       node-label/paper/node-label.csv.gz  one class id per paper
//     split/time/paper/
//       train.csv.gz  valid.csv.gz  test.csv.gz
//
// Every table is accepted either gzip-compressed (as downloaded)
// or already unpacked as a plain .csv; .csv.gz wins if both exist.
//
// Node years and per-edge relation ids are also shipped but are
// not used by the model, so they are not read.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::error::DatasetError;
use crate::domain::graph::{EdgeType, HeteroGraph, NodeFeatures, SplitIndex};
use crate::domain::traits::GraphSource;

/// Loads the ogbn-mag raw tables from a dataset root directory.
pub struct OgbMagLoader {
    root:   PathBuf,
    target: String,
}

impl OgbMagLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), target: "paper".to_string() }
    }

    fn raw(&self) -> PathBuf {
        self.root.join("raw")
    }

    fn read_graph(&self) -> Result<HeteroGraph> {
        let raw = self.raw();

        // ── Node counts ───────────────────────────────────────────────────────
        let num_nodes = read_num_nodes(&raw.join("num-node-dict"))?;
        tracing::info!("Node types: {:?}", num_nodes);

        // ── Relations ─────────────────────────────────────────────────────────
        let mut edges = BTreeMap::new();
        for edge_type in read_triplets(&raw.join("triplet-type-list"))? {
            let dir   = format!("{}___{}___{}", edge_type.src, edge_type.rel, edge_type.dst);
            let pairs = read_edges(&raw.join("relations").join(dir).join("edge"))?;
            tracing::info!("Loaded {} edges for '{}'", pairs.len(), edge_type);
            edges.insert(edge_type, pairs);
        }

        // ── Features (only node types that ship them) ─────────────────────────
        let mut features = BTreeMap::new();
        for node_type in num_nodes.keys() {
            let base = raw.join("node-feat").join(node_type).join("node-feat");
            if find_table(&base).is_some() {
                let feats = read_features(&base)?;
                tracing::info!("Loaded features for '{}' (dim {})", node_type, feats.dim);
                features.insert(node_type.clone(), feats);
            }
        }

        // ── Labels and split ──────────────────────────────────────────────────
        let labels = read_column::<i64>(
            &raw.join("node-label").join(&self.target).join("node-label"),
        )?;
        let num_classes = labels.iter().copied().max().map_or(0, |m| (m + 1).max(0) as usize);

        let split_dir = self.root.join("split").join("time").join(&self.target);
        let split = SplitIndex::new(
            read_column::<usize>(&split_dir.join("train"))?,
            read_column::<usize>(&split_dir.join("valid"))?,
            read_column::<usize>(&split_dir.join("test"))?,
        );

        Ok(HeteroGraph {
            num_nodes,
            features,
            edges,
            target: self.target.clone(),
            labels,
            num_classes,
            split,
        })
    }
}

impl GraphSource for OgbMagLoader {
    fn load(&self) -> Result<HeteroGraph> {
        tracing::info!("Loading ogbn-mag from '{}'", self.root.display());
        let graph = self
            .read_graph()
            .with_context(|| format!("Cannot load dataset from '{}'", self.root.display()))?;
        graph.validate()?;
        tracing::info!(
            "Loaded graph: {} node types, {} relations, {} edges",
            graph.num_nodes.len(),
            graph.edges.len(),
            graph.num_edges()
        );
        Ok(graph)
    }

    fn describe(&self) -> String {
        format!("ogbn-mag at '{}'", self.root.display())
    }
}

// ─── Table access ─────────────────────────────────────────────────────────────

/// `base` is a path without extension; returns the .csv.gz or .csv file
fn find_table(base: &Path) -> Option<PathBuf> {
    ["csv.gz", "csv"]
        .iter()
        .map(|ext| base.with_extension(ext))
        .find(|p| p.is_file())
}

/// Opens a table as a line reader, decompressing if needed.
fn open_table(base: &Path) -> Result<(PathBuf, Box<dyn BufRead>), DatasetError> {
    let path = find_table(base)
        .ok_or_else(|| DatasetError::MissingTable { path: base.with_extension("csv") })?;

    let file = File::open(&path).map_err(|source| DatasetError::Io {
        context: format!("Cannot open '{}'", path.display()),
        source,
    })?;

    let reader: Box<dyn BufRead> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok((path, reader))
}

/// Stream the non-empty lines of a table into `f` as (path, 1-based line number, text).
/// Lines are parsed as they are read; the table is never held in memory.
fn for_each_line<F>(base: &Path, mut f: F) -> Result<PathBuf, DatasetError>
where
    F: FnMut(&Path, usize, &str) -> Result<(), DatasetError>,
{
    let (path, reader) = open_table(base)?;
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DatasetError::Io {
            context: format!("Cannot read '{}' line {}", path.display(), i + 1),
            source,
        })?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            f(&path, i + 1, trimmed)?;
        }
    }
    Ok(path)
}

fn malformed(path: &Path, line: usize, message: impl Into<String>) -> DatasetError {
    DatasetError::MalformedRow { path: path.to_path_buf(), line, message: message.into() }
}

/// Parse one cell. OGB writes some integer tables as floats ("3.0").
fn parse_cell<T: ParseCell>(path: &Path, line: usize, cell: &str) -> Result<T, DatasetError> {
    T::parse_cell(cell.trim()).ok_or_else(|| malformed(path, line, format!("cannot parse '{cell}'")))
}

trait ParseCell: Sized {
    fn parse_cell(s: &str) -> Option<Self>;
}

impl ParseCell for i64 {
    fn parse_cell(s: &str) -> Option<Self> {
        s.parse().ok().or_else(|| {
            s.parse::<f64>().ok().filter(|v| v.fract() == 0.0).map(|v| v as i64)
        })
    }
}

impl ParseCell for usize {
    fn parse_cell(s: &str) -> Option<Self> {
        i64::parse_cell(s).and_then(|v| usize::try_from(v).ok())
    }
}

impl ParseCell for f32 {
    fn parse_cell(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

// ─── Individual tables ────────────────────────────────────────────────────────

fn read_num_nodes(base: &Path) -> Result<BTreeMap<String, usize>, DatasetError> {
    // header row + count row; anything after is ignored
    let mut rows: Vec<(usize, String)> = Vec::with_capacity(2);
    let path = for_each_line(base, |_, n, line| {
        if rows.len() < 2 {
            rows.push((n, line.to_string()));
        }
        Ok(())
    })?;

    let (header, counts) = match rows.as_slice() {
        [header, counts] => (header, counts),
        _ => return Err(malformed(&path, rows.len() + 1, "expected a header row and a count row")),
    };

    let names: Vec<&str> = header.1.split(',').map(str::trim).collect();
    let values: Vec<&str> = counts.1.split(',').collect();
    if names.len() != values.len() {
        return Err(malformed(
            &path,
            counts.0,
            format!("{} node types but {} counts", names.len(), values.len()),
        ));
    }

    names
        .into_iter()
        .zip(values)
        .map(|(name, v)| Ok((name.to_string(), parse_cell(&path, counts.0, v)?)))
        .collect()
}

fn read_triplets(base: &Path) -> Result<Vec<EdgeType>, DatasetError> {
    let mut out = Vec::new();
    for_each_line(base, |path, n, line| {
        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        match parts.as_slice() {
            [src, rel, dst] => {
                out.push(EdgeType::new(*src, *rel, *dst));
                Ok(())
            }
            _ => Err(malformed(path, n, "expected 'src,rel,dst'")),
        }
    })?;
    Ok(out)
}

fn read_edges(base: &Path) -> Result<Vec<(usize, usize)>, DatasetError> {
    let mut out = Vec::new();
    for_each_line(base, |path, n, line| match line.split_once(',') {
        Some((s, d)) => {
            out.push((parse_cell(path, n, s)?, parse_cell(path, n, d)?));
            Ok(())
        }
        None => Err(malformed(path, n, "expected 'src,dst'")),
    })?;
    Ok(out)
}

fn read_features(base: &Path) -> Result<NodeFeatures, DatasetError> {
    let mut dim    = 0usize;
    let mut values = Vec::new();

    for_each_line(base, |path, n, line| {
        let before = values.len();
        for cell in line.split(',') {
            values.push(parse_cell::<f32>(path, n, cell)?);
        }
        let width = values.len() - before;
        if dim == 0 {
            dim = width;
        } else if width != dim {
            return Err(malformed(path, n, format!("expected {dim} features, found {width}")));
        }
        Ok(())
    })?;

    Ok(NodeFeatures::new(dim, values))
}

fn read_column<T: ParseCell>(base: &Path) -> Result<Vec<T>, DatasetError> {
    let mut out = Vec::new();
    for_each_line(base, |path, n, line| {
        let first = line.split(',').next().unwrap_or(line);
        out.push(parse_cell(path, n, first)?);
        Ok(())
    })?;
    Ok(out)
}
