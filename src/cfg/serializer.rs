//! Canonical text rendering
//!
//! Output layout per entry:
//! - one `#<text>` line per comment line
//! - sections: name, `{`, body indented by two more spaces, `}`
//! - options: `Name = first`, then `Name += item` for every further item

use std::fmt;

use super::format::{Format, INDENT_STEP};
use super::node::{CfgNode, Entry};

impl CfgNode {
    /// Render with the default format.
    pub fn serialize(&self) -> String {
        self.serialize_with(&Format::default())
    }

    pub fn serialize_with(&self, format: &Format) -> String {
        let mut out = String::new();
        self.write_level(&mut out, "", format);
        out
    }

    fn write_level(&self, out: &mut String, indent: &str, format: &Format) {
        for name in &self.order {
            if let Some(comment) = self.comments.get(name) {
                for line in comment.split('\n') {
                    out.push_str(indent);
                    out.push('#');
                    out.push_str(line);
                    out.push('\n');
                }
            }

            match self.children.get(name) {
                Some(Entry::Section(child)) => {
                    out.push_str(&format!("{indent}{name}\n{indent}{{\n"));
                    child.write_level(out, &format!("{indent}{INDENT_STEP}"), format);
                    out.push_str(&format!("{indent}}}\n"));
                }
                Some(Entry::Option(value)) => {
                    let items = format.split(value);
                    match items.split_first() {
                        None => out.push_str(&format!("{indent}{name} = \n")),
                        Some((first, rest)) => {
                            out.push_str(&format!("{indent}{name} = {first}\n"));
                            for item in rest {
                                out.push_str(&format!("{indent}{name} += {item}\n"));
                            }
                        }
                    }
                }
                None => panic!("entry '{name}' in the order which is not a section nor an option"),
            }
        }
    }
}

impl fmt::Display for CfgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
