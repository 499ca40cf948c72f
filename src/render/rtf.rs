//! Minimal RTF writer.
//!
//! A [`Document`] is a list of blocks (paragraphs and fixed-width tables) made
//! of styled runs. Styles are plain `const` values; the writer collects the
//! colours they use into the colour table when serializing.

use std::fmt;

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Justify {
    /// Flush left
    Left,
    /// Centred
    Center,
    /// Flush right
    Right,
    /// Justified
    Full,
}

impl Justify {
    const fn control(self) -> &'static str {
        match self {
            Self::Left => "\\ql",
            Self::Center => "\\qc",
            Self::Right => "\\qr",
            Self::Full => "\\qj",
        }
    }
}

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour(pub u8, pub u8, pub u8);

/// Paragraph-level formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParagraphStyle {
    /// Alignment
    pub justify: Justify,
    /// Space after the paragraph in twips
    pub space_after: u32,
}

/// Character-level formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharStyle {
    /// Bold weight
    pub bold: bool,
    /// Font size in half-points
    pub font_size: Option<u32>,
    /// Text colour, default when `None`
    pub colour: Option<Colour>,
}

impl CharStyle {
    /// Document default
    pub const PLAIN: Self = Self {
        bold: false,
        font_size: None,
        colour: None,
    };
}

/// Page size and margins in twips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStyle {
    /// Paper width
    pub width: u32,
    /// Paper height
    pub height: u32,
    /// Left margin
    pub margin_left: u32,
    /// Right margin
    pub margin_right: u32,
    /// Top margin
    pub margin_top: u32,
    /// Bottom margin
    pub margin_bottom: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline {
    Text(String),
    LineBreak,
}

/// Text sharing one character style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    style: CharStyle,
    content: Vec<Inline>,
}

/// Sequence of runs, used for paragraphs and table cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    runs: Vec<Run>,
}

impl Content {
    /// Appends text in the given style
    pub fn text(&mut self, style: CharStyle, text: impl Into<String>) -> &mut Self {
        let text = Inline::Text(text.into());
        match self.runs.last_mut() {
            Some(run) if run.style == style => run.content.push(text),
            _ => self.runs.push(Run {
                style,
                content: vec![text],
            }),
        }
        self
    }

    /// Appends plain text
    pub fn plain(&mut self, text: impl Into<String>) -> &mut Self {
        self.text(CharStyle::PLAIN, text)
    }

    /// Appends a line break inside the paragraph
    pub fn line_break(&mut self) -> &mut Self {
        match self.runs.last_mut() {
            Some(run) => run.content.push(Inline::LineBreak),
            None => self.runs.push(Run {
                style: CharStyle::PLAIN,
                content: vec![Inline::LineBreak],
            }),
        }
        self
    }

    /// Appends lines separated by line breaks
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                self.line_break();
            }
            self.plain(line);
        }
        self
    }

    /// Concatenated text without formatting, line breaks as `\n`
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for inline in self.runs.iter().flat_map(|r| &r.content) {
            match inline {
                Inline::Text(t) => out.push_str(t),
                Inline::LineBreak => out.push('\n'),
            }
        }
        out
    }

    fn colours(&self) -> impl Iterator<Item = Colour> + '_ {
        self.runs.iter().filter_map(|r| r.style.colour)
    }
}

/// A paragraph block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph formatting
    pub style: ParagraphStyle,
    /// Styled runs
    pub content: Content,
}

/// A table with fixed column widths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Column widths in twips
    widths: Vec<u32>,
    /// Border width in twips, `0` for none
    border_width: u32,
    rows: Vec<Vec<Content>>,
}

impl Table {
    /// Empty table
    #[must_use]
    pub fn new(widths: &[u32], border_width: u32) -> Self {
        Self {
            widths: widths.to_vec(),
            border_width,
            rows: Vec::new(),
        }
    }

    /// Adds a row with one empty cell per column and returns its cells
    pub fn add_row(&mut self) -> &mut [Content] {
        self.rows.push(vec![Content::default(); self.widths.len()]);
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Rows added so far
    #[must_use]
    pub fn rows(&self) -> &[Vec<Content>] {
        &self.rows
    }
}

/// Document block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph
    Paragraph(Paragraph),
    /// A table
    Table(Table),
}

/// RTF document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    font: &'static str,
    page: PageStyle,
    blocks: Vec<Block>,
}

impl Document {
    /// Empty document with a single roman font
    #[must_use]
    pub const fn new(font: &'static str, page: PageStyle) -> Self {
        Self {
            font,
            page,
            blocks: Vec::new(),
        }
    }

    /// Appends a paragraph filled by `build`
    pub fn paragraph(&mut self, style: ParagraphStyle, build: impl FnOnce(&mut Content)) {
        let mut content = Content::default();
        build(&mut content);
        self.blocks.push(Block::Paragraph(Paragraph { style, content }));
    }

    /// Appends a finished table
    pub fn push_table(&mut self, table: Table) {
        self.blocks.push(Block::Table(table));
    }

    /// Blocks in document order
    #[must_use]
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    fn colour_table(&self) -> Vec<Colour> {
        let mut colours = Vec::new();
        for block in &self.blocks {
            let used: Vec<Colour> = match block {
                Block::Paragraph(p) => p.content.colours().collect(),
                Block::Table(t) => t.rows.iter().flatten().flat_map(|c| c.colours()).collect(),
            };
            for colour in used {
                if !colours.contains(&colour) {
                    colours.push(colour);
                }
            }
        }
        colours
    }

    /// Serializes the document to RTF.
    #[must_use]
    pub fn to_rtf(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let colours = self.colour_table();

        f.write_str("{\\rtf1\\ansi\\ansicpg1251\\deff0\n")?;
        writeln!(f, "{{\\fonttbl{{\\f0\\froman {};}}}}", escape(self.font))?;
        f.write_str("{\\colortbl;")?;
        for Colour(r, g, b) in &colours {
            write!(f, "\\red{r}\\green{g}\\blue{b};")?;
        }
        f.write_str("}\n")?;
        let page = &self.page;
        writeln!(
            f,
            "\\paperw{}\\paperh{}\\margl{}\\margr{}\\margt{}\\margb{}",
            page.width,
            page.height,
            page.margin_left,
            page.margin_right,
            page.margin_top,
            page.margin_bottom
        )?;

        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => write_paragraph(f, p, &colours)?,
                Block::Table(t) => write_table(f, t, &colours)?,
            }
        }

        f.write_str("}")
    }
}

/// Escapes text for RTF: control characters get a backslash, anything outside
/// ASCII becomes `\uN?` with N the signed UTF-16 code unit.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for c in text.chars() {
        match c {
            '\\' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\line "),
            '\t' => out.push_str("\\tab "),
            c if c.is_ascii() => out.push(c),
            c => {
                for unit in c.encode_utf16(&mut units).iter() {
                    let signed = i16::from_ne_bytes(unit.to_ne_bytes());
                    out.push_str(&format!("\\u{signed}?"));
                }
            }
        }
    }
    out
}

fn write_content(
    f: &mut fmt::Formatter<'_>,
    content: &Content,
    colours: &[Colour],
) -> fmt::Result {
    for run in &content.runs {
        f.write_str("{")?;
        let style = run.style;
        if style.bold {
            f.write_str("\\b")?;
        }
        if let Some(size) = style.font_size {
            write!(f, "\\fs{size}")?;
        }
        if let Some(index) = style
            .colour
            .and_then(|c| colours.iter().position(|x| *x == c))
        {
            write!(f, "\\cf{}", index + 1)?;
        }
        f.write_str(" ")?;
        for inline in &run.content {
            match inline {
                Inline::Text(t) => f.write_str(&escape(t))?,
                Inline::LineBreak => f.write_str("\\line ")?,
            }
        }
        f.write_str("}")?;
    }
    Ok(())
}

fn write_paragraph(
    f: &mut fmt::Formatter<'_>,
    paragraph: &Paragraph,
    colours: &[Colour],
) -> fmt::Result {
    write!(
        f,
        "{{\\pard{}\\sa{} ",
        paragraph.style.justify.control(),
        paragraph.style.space_after
    )?;
    write_content(f, &paragraph.content, colours)?;
    f.write_str("\\par}\n")
}

fn write_table(f: &mut fmt::Formatter<'_>, table: &Table, colours: &[Colour]) -> fmt::Result {
    for row in &table.rows {
        f.write_str("\\trowd\\trgaph100")?;
        let mut right = 0;
        for width in &table.widths {
            if table.border_width > 0 {
                for side in ["t", "l", "b", "r"] {
                    write!(f, "\\clbrdr{side}\\brdrs\\brdrw{}", table.border_width)?;
                }
            }
            right += width;
            write!(f, "\\cellx{right}")?;
        }
        f.write_str("\n")?;
        for cell in row {
            f.write_str("\\pard\\intbl ")?;
            write_content(f, cell, colours)?;
            f.write_str("\\cell\n")?;
        }
        f.write_str("\\row\n")?;
    }
    f.write_str("\\pard\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: PageStyle = PageStyle {
        width: 11907,
        height: 16840,
        margin_left: 1000,
        margin_right: 1000,
        margin_top: 1000,
        margin_bottom: 1000,
    };

    const RED_BOLD: CharStyle = CharStyle {
        bold: true,
        font_size: Some(24),
        colour: Some(Colour(255, 0, 0)),
    };

    #[test]
    fn test_escape() {
        assert_eq!(escape("a{b}\\c"), "a\\{b\\}\\\\c");
        assert_eq!(escape("Дом"), "\\u1044?\\u1086?\\u1084?");
        assert_eq!(escape("—"), "\\u8212?");
        assert_eq!(escape("😀"), "\\u-10179?\\u-8704?");
    }

    #[test]
    fn test_content_merges_runs_with_same_style() {
        let mut content = Content::default();
        content.plain("a").plain("b").line_break().text(RED_BOLD, "c");
        assert_eq!(content.runs.len(), 2);
        assert_eq!(content.plain_text(), "ab\nc");
    }

    #[test]
    fn test_lines() {
        let mut content = Content::default();
        content.lines(["one", "two", "three"]);
        assert_eq!(content.plain_text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_document_to_rtf() {
        let mut doc = Document::new("Times New Roman", PAGE);
        doc.paragraph(
            ParagraphStyle {
                justify: Justify::Center,
                space_after: 100,
            },
            |p| {
                p.text(RED_BOLD, "Итого");
            },
        );

        let mut table = Table::new(&[6500, 4000], 5);
        let row = table.add_row();
        row[0].plain("Name");
        row[1].plain("10");
        doc.push_table(table);

        let rtf = doc.to_rtf();
        assert!(rtf.starts_with("{\\rtf1"));
        assert!(rtf.ends_with('}'));
        assert!(rtf.contains("{\\f0\\froman Times New Roman;}"));
        assert!(rtf.contains("{\\colortbl;\\red255\\green0\\blue0;}"));
        assert!(rtf.contains("{\\pard\\qc\\sa100 {\\b\\fs24\\cf1 \\u1048?"));
        assert!(rtf.contains("\\cellx6500"));
        assert!(rtf.contains("\\cellx10500"));
        assert!(rtf.contains("\\brdrw5"));
        assert!(rtf.contains("{ Name}\\cell"));
        assert_eq!(rtf.matches("\\row").count(), 1);
        assert_eq!(rtf.matches('{').count(), rtf.matches('}').count());
    }

    #[test]
    fn test_empty_document_display() {
        let doc = Document::new("Arial", PAGE);

        assert_eq!(
            format!("{doc}"),
            "{\\rtf1\\ansi\\ansicpg1251\\deff0\n\
             {\\fonttbl{\\f0\\froman Arial;}}\n\
             {\\colortbl;}\n\
             \\paperw11907\\paperh16840\\margl1000\\margr1000\\margt1000\\margb1000\n}"
        );
        assert_eq!(doc.to_rtf(), doc.to_string());
    }

    #[test]
    fn test_borderless_table() {
        let mut doc = Document::new("Times New Roman", PAGE);
        let mut table = Table::new(&[3500, 3500, 3500], 0);
        table.add_row()[2].plain("x");
        doc.push_table(table);

        let rtf = doc.to_rtf();
        assert!(!rtf.contains("\\clbrdr"));
        assert!(rtf.contains("\\cellx10500"));
        assert_eq!(doc.blocks().len(), 1);
    }
}
