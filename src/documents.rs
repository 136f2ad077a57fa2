//! Document records and their JSONL representation.
//!
//! One record per line, each an object with `page_content` and `metadata`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// A chunk of text plus whatever describes where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_owned(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(Value::as_str)
    }
}

/// On-disk line shape; `type` keeps files readable by LangChain loaders
#[derive(Serialize)]
struct StoredDocument<'a> {
    page_content: &'a str,
    metadata: &'a Map<String, Value>,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Write `documents` to `path`, one JSON object per line, replacing the file
pub fn save_documents<'a, I>(documents: I, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a Document>,
{
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);

    let mut count = 0;
    for doc in documents {
        let line = StoredDocument {
            page_content: &doc.page_content,
            metadata: &doc.metadata,
            kind: "Document",
        };
        serde_json::to_writer(&mut writer, &line)?;
        writer.write_all(b"\n").map_err(|e| Error::io(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| Error::io(path, e))?;

    info!("Saved {} documents to {}", count, path.display());
    Ok(count)
}

/// Read every non-empty line of `path` back into a [`Document`]
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let reader = BufReader::new(file);

    let mut documents = Vec::new();
    // Raw bytes, so a line that is not UTF-8 still reports where it is
    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line.map_err(|e| Error::io(path, e))?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let doc = serde_json::from_slice(&line).map_err(|source| Error::Record {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        documents.push(doc);
    }
    Ok(documents)
}
