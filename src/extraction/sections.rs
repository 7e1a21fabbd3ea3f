//! Section splitting.
//!
//! A section starts with a heading line underlined by a rule made only of
//! `=` characters, and runs until the next heading or the end of the text.
//! Headings may end with ` :`, which is not part of the key.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ReportError;

/// Section bodies keyed by heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sections {
    bodies: HashMap<String, String>,
}

impl Sections {
    /// Body of the section with this exact heading.
    pub fn get(&self, heading: &str) -> Result<&str, ReportError> {
        self.bodies
            .get(heading)
            .map(|s| s.as_str())
            .ok_or_else(|| ReportError::MissingSection(heading.to_string()))
    }

    pub fn contains(&self, heading: &str) -> bool {
        self.bodies.contains_key(heading)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Headings in no particular order.
    pub fn headings(&self) -> Vec<&str> {
        self.bodies.keys().map(|k| k.as_str()).collect()
    }
}

fn is_rule(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && line.chars().all(|c| c == '=')
}

fn heading_key(line: &str) -> String {
    let line = line.trim();
    line.strip_suffix(" :")
        .or_else(|| line.strip_suffix(':'))
        .unwrap_or(line)
        .trim_end()
        .to_string()
}

/// Split a raw report into its sections.
pub fn split_sections(text: &str) -> Result<Sections, ReportError> {
    // (start offset, text) of every line, line terminators included.
    let mut lines = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        lines.push((offset, line));
        offset += line.len();
    }

    // (heading key, body start offset, heading line start offset)
    let mut headings: Vec<(String, usize, usize)> = Vec::new();
    let mut i = 0;
    while i + 1 < lines.len() {
        let (start, line) = lines[i];
        let (rule_start, rule) = lines[i + 1];
        if !line.trim().is_empty() && !is_rule(line) && is_rule(rule) {
            headings.push((heading_key(line), rule_start + rule.len(), start));
            i += 2;
        } else {
            i += 1;
        }
    }

    if headings.is_empty() {
        return Err(ReportError::MalformedReport);
    }

    let mut bodies = HashMap::with_capacity(headings.len());
    for (idx, (key, body_start, _)) in headings.iter().enumerate() {
        let body_end = headings
            .get(idx + 1)
            .map(|(_, _, next_start)| *next_start)
            .unwrap_or(text.len());
        if bodies
            .insert(key.clone(), text[*body_start..body_end].to_string())
            .is_some()
        {
            return Err(ReportError::DuplicateSection(key.clone()));
        }
    }

    log::debug!(
        "SECTIONS_SPLIT count={} headings={:?}",
        bodies.len(),
        bodies.keys().collect::<Vec<_>>()
    );

    Ok(Sections { bodies })
}
