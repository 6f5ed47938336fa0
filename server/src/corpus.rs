//! Loads pre-tokenized documents from JSON / JSONL into a [`MemoryIndex`].

use anyhow::{bail, Context, Result};
use scoring::{DocMeta, MemoryIndex, MemoryIndexBuilder, StatsProvider, CONTENT_FIELD, TITLE_FIELD};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    title: String,
    /// Normalized text; terms separated by whitespace.
    #[serde(alias = "body")]
    content: String,
    #[serde(default)]
    path: Option<String>,
}

/// Reads a file or every `.json` / `.jsonl` file below a directory.
pub fn load_corpus(input: &Path) -> Result<MemoryIndex> {
    let files = corpus_files(input)?;
    let mut builder = MemoryIndex::builder();
    for file in &files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            ingest_jsonl(file, &mut builder)?;
        } else {
            ingest_json(file, &mut builder)?;
        }
    }
    let index = builder.build();
    tracing::info!(num_docs = index.doc_count(), num_files = files.len(), input = %input.display(), "loaded corpus");
    Ok(index)
}

/// Directory that relative document paths are resolved against.
pub fn corpus_root(input: &Path) -> PathBuf {
    if input.is_dir() {
        input.to_path_buf()
    } else {
        input.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

fn corpus_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("corpus path {} does not exist", input.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
            files.push(p.to_path_buf());
        }
    }
    Ok(files)
}

fn ingest_jsonl(file: &Path, builder: &mut MemoryIndexBuilder) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        ingest_doc(doc, file, builder)?;
    }
    Ok(())
}

fn ingest_json(file: &Path, builder: &mut MemoryIndexBuilder) -> Result<()> {
    let reader = BufReader::new(File::open(file).with_context(|| format!("opening {}", file.display()))?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                ingest_doc(serde_json::from_value(v)?, file, builder)?;
            }
        }
        serde_json::Value::Object(_) => ingest_doc(serde_json::from_value(json)?, file, builder)?,
        _ => tracing::warn!(file = %file.display(), "skipping non-document JSON"),
    }
    Ok(())
}

fn ingest_doc(doc: InputDoc, file: &Path, builder: &mut MemoryIndexBuilder) -> Result<()> {
    if builder.contains_document(&doc.id) {
        bail!("duplicate document id {} in {}", doc.id, file.display());
    }
    let meta = DocMeta { external_id: doc.id, title: doc.title.clone(), path: doc.path };
    builder.add_document(meta, &[(TITLE_FIELD, &doc.title), (CONTENT_FIELD, &doc.content)]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_directory_of_json_and_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.jsonl"),
            "{\"id\":\"x\",\"title\":\"whale\",\"content\":\"whale sea\"}\n\n{\"id\":\"y\",\"title\":\"sea\",\"body\":\"sea sea\"}\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"id":"z","title":"sky","content":"blue sky","path":"z.txt"}]"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let index = load_corpus(dir.path()).unwrap();
        assert_eq!(index.doc_count(), 3);
        assert_eq!(index.doc_frequency(CONTENT_FIELD, "sea"), 2);
        assert_eq!(index.doc_frequency(TITLE_FIELD, "whale"), 1);
        assert_eq!(index.find_document("z"), Some(2));
        assert_eq!(corpus_root(dir.path()), dir.path());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("dup.jsonl");
        fs::write(
            &file,
            "{\"id\":\"x\",\"title\":\"a\",\"content\":\"a\"}\n{\"id\":\"x\",\"title\":\"b\",\"content\":\"b\"}\n",
        )
        .unwrap();
        let err = load_corpus(&file).unwrap_err();
        assert!(err.to_string().contains("duplicate document id x"));
    }

    #[test]
    fn missing_path_is_an_error() {
        assert!(load_corpus(Path::new("/definitely/not/here")).is_err());
    }
}
