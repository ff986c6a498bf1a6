//! MuPDF implementation of [`PdfBackend`].
//!
//! This crate isolates the mupdf dependency (AGPL-3.0) so that the rest of
//! the workspace does not link it directly.

use std::path::Path;

use mupdf::{Document, TextPageFlags};

use lawtextdb_core::{BackendError, PdfBackend};

/// Extracts the text of every page, one paragraph per MuPDF text block.
///
/// Blocks are separated by a blank line so that article and section
/// boundaries survive into the search index. Words hyphenated across a line
/// break inside a block are rejoined.
#[derive(Debug, Default)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;
        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        let pages = document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

        let mut paragraphs = Vec::new();
        for page in pages {
            let text_page = page
                .and_then(|p| p.to_text_page(TextPageFlags::empty()))
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            for block in text_page.blocks() {
                let lines = block.lines().map(|line| {
                    line.chars()
                        .map(|c| c.char().unwrap_or('\u{FFFD}'))
                        .collect::<String>()
                });
                let paragraph = join_block_lines(lines);
                if !paragraph.is_empty() {
                    paragraphs.push(paragraph);
                }
            }
        }

        Ok(paragraphs.join("\n\n"))
    }
}

/// Join the lines of one text block into a paragraph.
///
/// A line ending in `-` directly after a letter is glued to the next line
/// when that line starts with a lowercase letter ("Ver-" + "trag" becomes
/// "Vertrag"). Other breaks keep their newline.
fn join_block_lines(lines: impl IntoIterator<Item = String>) -> String {
    let mut out = String::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if out.is_empty() {
            out.push_str(line);
            continue;
        }

        let continues_word = line.chars().next().is_some_and(char::is_lowercase);
        if continues_word && ends_with_split_word(&out) {
            out.pop();
        } else {
            out.push('\n');
        }
        out.push_str(line);
    }
    out
}

fn ends_with_split_word(text: &str) -> bool {
    let mut rev = text.chars().rev();
    rev.next() == Some('-') && rev.next().is_some_and(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    /// Build a PDF whose pages each draw `lines` in Helvetica at the given
    /// baseline heights.
    fn build_pdf(pages: &[&[(&str, u32)]]) -> Vec<u8> {
        let page_count = pages.len();
        let font_obj = 3 + 2 * page_count;
        let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                page_count
            ),
        ];
        for (i, page) in pages.iter().enumerate() {
            let mut content = String::from("BT /F1 12 Tf\n");
            for (text, y) in page.iter() {
                content.push_str(&format!("1 0 0 1 72 {y} Tm ({text}) Tj\n"));
            }
            content.push_str("ET");
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R \
                 /Resources << /Font << /F1 {font_obj} 0 R >> >> >>",
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }
        let xref_offset = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    fn write_pdf(bytes: &[u8]) -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        std::fs::write(file.path(), bytes).unwrap();
        file
    }

    #[test]
    fn joins_hyphenated_words() {
        let joined = join_block_lines(lines(&["The lease con-", "tract ends", "on notice."]));
        assert_eq!(joined, "The lease contract ends\non notice.");
    }

    #[test]
    fn keeps_dash_before_capital_or_digit() {
        assert_eq!(
            join_block_lines(lines(&["Article 5 -", "Scope"])),
            "Article 5 -\nScope"
        );
        assert_eq!(
            join_block_lines(lines(&["North-", "Rhine"])),
            "North-\nRhine"
        );
        assert_eq!(
            join_block_lines(lines(&["sections 1-", "4 apply"])),
            "sections 1-\n4 apply"
        );
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(join_block_lines(lines(&["  ", "Art. 1  ", ""])), "Art. 1");
        assert_eq!(join_block_lines(Vec::new()), "");
    }

    #[test]
    fn extracts_text_from_every_page() {
        let file = write_pdf(&build_pdf(&[
            &[("Article 1 Scope", 700)],
            &[("Article 2 Definitions", 700)],
        ]));
        let text = MupdfBackend::new().extract_text(file.path()).unwrap();
        let first = text.find("Article 1 Scope").expect("page one text");
        let second = text.find("Article 2 Definitions").expect("page two text");
        assert!(first < second);
        assert!(text[first..second].contains("\n\n"));
    }

    #[test]
    fn garbage_file_is_an_error() {
        let file = write_pdf(b"this is not a pdf at all");
        let err = MupdfBackend::new().extract_text(file.path()).unwrap_err();
        assert!(matches!(
            err,
            BackendError::OpenError(_) | BackendError::ExtractionError(_)
        ));
    }
}
