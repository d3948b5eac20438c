//! Table rendering for reports.

use crate::registry::{LibraryEntry, Registry};

/// Start marker of the generated region in the README.
pub const README_BEGIN: &str = "<!-- BEGIN LIBRARIES -->";
/// End marker of the generated region in the README.
pub const README_END: &str = "<!-- END LIBRARIES -->";

const LIBRARY_HEADERS: [&str; 5] = ["ID", "Language", "Name", "Version", "Runtime"];

#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }
        widths
    }

    /// Fixed-width text with a dashed rule under the header.
    pub fn render_fixed(&self, indent: &str) -> String {
        let widths = self.widths();
        let line = |cells: &[String]| {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = cells.get(i).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", cell, width = *w)
                })
                .collect();
            format!("{}{}", indent, padded.join("  ").trim_end())
        };

        let mut out = Vec::with_capacity(self.rows.len() + 2);
        out.push(line(&self.headers));
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push(format!("{}{}", indent, rule.join("  ")));
        for row in &self.rows {
            out.push(line(row));
        }
        out.join("\n") + "\n"
    }

    /// GitHub-flavored Markdown table.
    pub fn render_markdown(&self) -> String {
        let escape = |cell: &str| cell.replace('|', "\\|");
        let mut out = String::new();
        out.push_str(&format!("| {} |\n", self.headers.join(" | ")));
        out.push_str(&format!(
            "|{}\n",
            self.headers.iter().map(|_| " --- |").collect::<String>()
        ));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| escape(c)).collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

fn library_row(lib: &LibraryEntry, name: String) -> Vec<String> {
    vec![
        lib.id.clone(),
        lib.lang.clone(),
        name,
        lib.version.clone(),
        lib.runtime.clone(),
    ]
}

/// All declared libraries, sorted by id.
pub fn library_table(registry: &Registry) -> Table {
    let mut table = Table::new(LIBRARY_HEADERS);
    for lib in registry.libraries() {
        table.push(library_row(lib, lib.name.clone()));
    }
    table
}

/// Same columns as [`library_table`], names linked to their homepages.
pub fn library_table_markdown(registry: &Registry) -> String {
    let mut table = Table::new(LIBRARY_HEADERS);
    for lib in registry.libraries() {
        let name = match &lib.homepage {
            Some(url) => format!("[{}]({})", lib.name, url),
            None => lib.name.clone(),
        };
        table.push(library_row(lib, name));
    }
    table.render_markdown()
}

/// Replace the text between the README markers with `generated`.
///
/// Returns `None` when either marker is missing or out of order.
pub fn replace_region(document: &str, generated: &str) -> Option<String> {
    let begin = document.find(README_BEGIN)? + README_BEGIN.len();
    let end = begin + document[begin..].find(README_END)?;
    let mut out = String::with_capacity(document.len() + generated.len());
    out.push_str(&document[..begin]);
    out.push('\n');
    out.push_str(generated);
    out.push_str(&document[end..]);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_fixed_pads_to_widest_cell() {
        let mut table = Table::new(["ID", "Version"]);
        table.push(["fmt", "10.2.1"]);
        table.push(["ac-library", "1.5"]);
        assert_eq!(
            table.render_fixed(""),
            "ID          Version\n\
             ----------  -------\n\
             fmt         10.2.1\n\
             ac-library  1.5\n"
        );
    }

    #[test]
    fn test_render_markdown_escapes_pipes() {
        let mut table = Table::new(["A", "B"]);
        table.push(["x|y", "z"]);
        assert_eq!(table.render_markdown(), "| A | B |\n| --- | --- |\n| x\\|y | z |\n");
    }

    #[test]
    fn test_replace_region() {
        let doc = format!("# Title\n{}\nold\n{}\nfooter\n", README_BEGIN, README_END);
        let out = replace_region(&doc, "new\n").unwrap();
        assert_eq!(
            out,
            format!("# Title\n{}\nnew\n{}\nfooter\n", README_BEGIN, README_END)
        );
        assert_eq!(replace_region(&out, "new\n").unwrap(), out);
    }

    #[test]
    fn test_replace_region_requires_markers() {
        assert!(replace_region("no markers", "x").is_none());
        let reversed = format!("{}\n{}\n", README_END, README_BEGIN);
        assert!(replace_region(&reversed, "x").is_none());
    }
}
