//! RTE dataset reading and result writing
//!
//! Input records are three lines separated by a blank line:
//!
//! ```text
//! 12 T: A council worker cleans up after Tuesday's violence in Budapest.
//! 12 H: There was damage in Budapest.
//! 12 A: YES
//! ```

use crate::errors::{Result, XteError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntailmentPair {
    pub id: String,
    pub text: String,
    pub hypothesis: String,
    pub gold: Option<String>,
}

impl EntailmentPair {
    pub fn new(id: impl Into<String>, text: impl Into<String>, hypothesis: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            hypothesis: hypothesis.into(),
            gold: None,
        }
    }

    pub fn with_gold(mut self, gold: impl Into<String>) -> Self {
        self.gold = Some(gold.into());
        self
    }

    pub fn gold_is_yes(&self) -> bool {
        self.gold
            .as_deref()
            .map(|g| g.trim().eq_ignore_ascii_case("yes"))
            .unwrap_or(false)
    }
}

#[derive(Default)]
struct PartialRecord {
    id: Option<String>,
    text: Option<String>,
    hypothesis: Option<String>,
    gold: Option<String>,
    first_line: usize,
}

impl PartialRecord {
    fn is_empty(&self) -> bool {
        self.id.is_none()
    }

    fn finish(self, source: &str) -> Result<EntailmentPair> {
        let missing = |field: &str| {
            XteError::malformed(source, Some(self.first_line), format!("record has no {} line", field))
        };
        Ok(EntailmentPair {
            text: self.text.clone().ok_or_else(|| missing("T:"))?,
            hypothesis: self.hypothesis.clone().ok_or_else(|| missing("H:"))?,
            id: self.id.unwrap_or_default(),
            gold: self.gold,
        })
    }
}

/// Parse dataset content; `source` names it in errors
pub fn parse_pairs(content: &str, source: &str) -> Result<Vec<EntailmentPair>> {
    let mut pairs = Vec::new();
    let mut record = PartialRecord::default();

    for (index, line) in content.lines().enumerate() {
        let number = index + 1;
        if line.trim().is_empty() {
            if !record.is_empty() {
                pairs.push(std::mem::take(&mut record).finish(source)?);
            }
            continue;
        }

        let (id, rest) = line
            .split_once(' ')
            .ok_or_else(|| XteError::malformed(source, Some(number), "expected '<id> <T|H|A>: <content>'"))?;
        let colon = rest
            .find(':')
            .ok_or_else(|| XteError::malformed(source, Some(number), "missing ':' after the field marker"))?;
        let value = rest.get(colon + 2..).unwrap_or("").to_string();

        if record.is_empty() {
            record.id = Some(id.to_string());
            record.first_line = number;
        }
        match rest[..colon].trim() {
            "T" => record.text = Some(value),
            "H" => record.hypothesis = Some(value),
            "A" => record.gold = Some(value),
            other => {
                return Err(XteError::malformed(
                    source,
                    Some(number),
                    format!("unknown field marker '{}'", other),
                ))
            }
        }
    }

    if !record.is_empty() {
        pairs.push(record.finish(source)?);
    }
    Ok(pairs)
}

pub fn read_pairs(path: impl AsRef<Path>) -> Result<Vec<EntailmentPair>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let pairs = parse_pairs(&content, &path.display().to_string())?;
    tracing::info!(path = %path.display(), pairs = pairs.len(), "Dataset loaded");
    Ok(pairs)
}

/// Writes one result block per decided pair
pub struct ResultWriter<W: Write> {
    out: W,
}

impl ResultWriter<std::io::BufWriter<std::fs::File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(std::io::BufWriter::new(file)))
    }
}

impl<W: Write> ResultWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write(
        &mut self,
        pair: &EntailmentPair,
        entailment: &str,
        model: &str,
        justification: Option<&str>,
    ) -> Result<()> {
        writeln!(self.out, "{} T: {}", pair.id, pair.text)?;
        writeln!(self.out, "{} H: {}", pair.id, pair.hypothesis)?;
        writeln!(self.out, "{} A: {}", pair.id, pair.gold.as_deref().unwrap_or(""))?;
        writeln!(self.out, "Entailment: {}", entailment)?;
        writeln!(self.out, "Model: {}", model)?;
        if let Some(justification) = justification {
            writeln!(self.out, "Justification:")?;
            for line in justification.lines() {
                writeln!(self.out, "{}", line)?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
