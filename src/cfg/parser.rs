//! Configuration text parser
//!
//! Single pass over the input, line by line:
//! - Lines are trimmed; blank lines are skipped
//! - Text after the first `#` accumulates into the pending comment
//! - `{` opens a section named by the pending text
//! - `}` closes the innermost open section
//! - `Name = value` sets an option (the value is the rest of the line)
//! - `Name += value` appends a list item to an existing option
//!
//! Pending comments attach to the next entry declared, even across a `}`. A
//! section name may sit on its own line with `{` on the following one; any
//! other text carried over a line break is rejected. Sections nest at most
//! [`MAX_DEPTH`] levels deep.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::{debug, trace};

use super::error::{CfgError, Result};
use super::format::{Format, MAX_DEPTH};
use super::node::CfgNode;

/// Parse configuration text into a new tree.
pub fn parse(text: &str, format: &Format) -> Result<CfgNode> {
    let mut parser = Parser::new(format);
    for (idx, line) in text.lines().enumerate() {
        parser.process_line(idx + 1, line)?;
    }
    let root = parser.finish()?;
    debug!(entries = root.len(), "parsed configuration buffer");
    Ok(root)
}

impl CfgNode {
    /// Replace the contents of this node with the parsed `text`.
    ///
    /// On error the node is left empty.
    pub fn load_from_buffer(&mut self, text: &str) -> Result<()> {
        self.load_from_buffer_with(text, &Format::default())
    }

    pub fn load_from_buffer_with(&mut self, text: &str, format: &Format) -> Result<()> {
        self.reset();
        *self = parse(text, format)?;
        Ok(())
    }

    /// Read a whole file and load it with [`CfgNode::load_from_buffer`].
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        self.reset();
        debug!(path = %path.display(), "loading configuration file");
        let text = fs::read_to_string(path)?;
        self.load_from_buffer(&text)
    }

    /// Parse a file into a new tree. Errors carry the file path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut node = CfgNode::new();
        node.load_from_file(path)
            .map_err(|e| CfgError::in_file(path, e))?;
        Ok(node)
    }
}

impl FromStr for CfgNode {
    type Err = CfgError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s, &Format::default())
    }
}

struct Parser<'f> {
    format: &'f Format,
    root: CfgNode,
    /// Open sections, innermost last: name, opening line and the section
    /// itself, detached from its parent until it is closed.
    open: Vec<(String, usize, CfgNode)>,
    pending: String,
    pending_line: usize,
    /// Pending text survived a line break; only `{` may follow.
    carried: bool,
    comment: Vec<String>,
}

impl<'f> Parser<'f> {
    fn new(format: &'f Format) -> Self {
        Self {
            format,
            root: CfgNode::new(),
            open: Vec::new(),
            pending: String::new(),
            pending_line: 0,
            carried: false,
            comment: Vec::new(),
        }
    }

    fn process_line(&mut self, line_no: usize, raw: &str) -> Result<()> {
        let mut line = raw.trim();
        if line.is_empty() {
            return Ok(());
        }
        if let Some(pos) = line.find('#') {
            self.comment.push(line[pos + 1..].trim_end().to_string());
            line = line[..pos].trim_end();
        }

        let mut chars = line.char_indices().peekable();
        while let Some((idx, ch)) = chars.next() {
            if self.carried && ch != '{' && !ch.is_whitespace() {
                return Err(CfgError::malformed(
                    self.pending_line,
                    format!("unexpected text '{}'", self.pending.trim()),
                ));
            }

            match ch {
                '{' => self.open_section(line_no)?,
                '}' => self.close_section(line_no)?,
                '=' => return self.set_option(line_no, line[idx + 1..].trim()),
                '+' if matches!(chars.peek(), Some((_, '='))) => {
                    return self.append_option(line_no, line[idx + 2..].trim());
                }
                _ => {
                    if self.pending.trim().is_empty() && !ch.is_whitespace() {
                        self.pending_line = line_no;
                    }
                    self.pending.push(ch);
                }
            }
        }

        if !self.pending.trim().is_empty() {
            self.carried = true;
        }
        Ok(())
    }

    /// The section entries are currently added to.
    fn level(&mut self) -> &mut CfgNode {
        match self.open.last_mut() {
            Some((_, _, node)) => node,
            None => &mut self.root,
        }
    }

    fn take_name(&mut self) -> String {
        self.carried = false;
        std::mem::take(&mut self.pending).trim().to_string()
    }

    fn take_comment(&mut self) -> String {
        let comment = self.comment.join("\n");
        self.comment.clear();
        comment
    }

    fn open_section(&mut self, line_no: usize) -> Result<()> {
        if self.open.len() >= MAX_DEPTH {
            return Err(CfgError::malformed(line_no, "nesting too deep"));
        }
        let name = self.take_name();
        let comment = self.take_comment();
        trace!(section = %name, line = line_no, "open section");
        // Reopening continues with the existing contents
        let section = self
            .level()
            .create_new_section(&name, &comment, None)
            .map_err(|e| CfgError::at_line(line_no, e))?;
        let node = std::mem::take(section);
        self.open.push((name, line_no, node));
        Ok(())
    }

    fn close_section(&mut self, line_no: usize) -> Result<()> {
        if !self.pending.trim().is_empty() {
            return Err(CfgError::malformed(
                line_no,
                format!("unexpected text '{}' before '}}'", self.pending.trim()),
            ));
        }
        self.pending.clear();
        let (name, _, node) = self
            .open
            .pop()
            .ok_or_else(|| CfgError::malformed(line_no, "unmatched '}'"))?;
        trace!(section = %name, line = line_no, "close section");
        let slot = self
            .level()
            .get_section_mut(&name)
            .ok_or_else(|| CfgError::KeyNotFound(name.clone()))?;
        *slot = node;
        Ok(())
    }

    fn set_option(&mut self, line_no: usize, value: &str) -> Result<()> {
        let name = self.take_name();
        let comment = self.take_comment();
        self.level()
            .set_option(&name, value, &comment)
            .map_err(|e| CfgError::at_line(line_no, e))
    }

    fn append_option(&mut self, line_no: usize, value: &str) -> Result<()> {
        let name = self.take_name();
        self.comment.clear();
        let format = self.format;
        let level = self.level();
        let suffix = match level.option(&name) {
            Some(current) if current.trim().is_empty() => value.to_string(),
            _ => format.continuation(value),
        };
        level
            .append_to_option(&name, suffix)
            .map_err(|e| CfgError::at_line(line_no, e))
    }

    fn finish(self) -> Result<CfgNode> {
        if let Some((name, line, _)) = self.open.last() {
            return Err(CfgError::malformed(
                *line,
                format!("section '{}' is never closed", name),
            ));
        }
        if !self.pending.trim().is_empty() {
            return Err(CfgError::malformed(
                self.pending_line,
                format!("unexpected text '{}' at end of input", self.pending.trim()),
            ));
        }
        Ok(self.root)
    }
}
