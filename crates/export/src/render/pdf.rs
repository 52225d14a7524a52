//! A4 PDF rendering with lopdf.
//!
//! Each [`ReportPage`] starts a new sheet. Content that does not fit continues
//! on additional sheets. Text uses the standard Helvetica and Courier fonts in
//! WinAnsi encoding; characters outside Latin-1 are printed as `?`.

use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use testmaster_core::data_uri;
use testmaster_core::status::TaskStatus;

use super::DocumentRenderer;
use crate::document::{Figure, ReportDocument, ReportPage, SignOffPage, SummaryPage, TaskPage};
use crate::error::ExportError;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const IMAGE_MAX_WIDTH: f32 = 320.0;
const IMAGE_MAX_HEIGHT: f32 = 260.0;

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
    Mono,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Mono => "F3",
        }
    }

    /// Rough average glyph width as a fraction of the font size.
    fn char_width(self) -> f32 {
        match self {
            Self::Regular => 0.5,
            Self::Bold => 0.55,
            Self::Mono => 0.6,
        }
    }
}

type Rgb = (f32, f32, f32);

const INK: Rgb = (0.12, 0.16, 0.22);
const MUTED: Rgb = (0.45, 0.5, 0.56);
const ACCENT: Rgb = (0.31, 0.27, 0.9);

fn status_color(status: TaskStatus) -> Rgb {
    match status {
        TaskStatus::Ok => (0.06, 0.6, 0.4),
        TaskStatus::Nok => (0.88, 0.2, 0.3),
        TaskStatus::Pending => (0.55, 0.6, 0.65),
    }
}

/// Renders a [`ReportDocument`] to PDF bytes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, ExportError> {
        let mut canvas = Canvas::new();

        for page in &document.pages {
            canvas.start_sheet()?;
            match page {
                ReportPage::Summary(summary) => draw_summary(&mut canvas, document, summary)?,
                ReportPage::Task(task) => draw_task(&mut canvas, task)?,
                ReportPage::SignOff(sign_off) => draw_sign_off(&mut canvas, sign_off)?,
            }
        }

        canvas.finish()
    }
}

// ---------------------------------------------------------------------------
// Page layouts
// ---------------------------------------------------------------------------

fn draw_summary(
    canvas: &mut Canvas,
    document: &ReportDocument,
    summary: &SummaryPage,
) -> Result<(), ExportError> {
    canvas.centered(Font::Bold, 22.0, &document.title.to_uppercase(), INK)?;
    if let Some(project) = &document.project_name {
        canvas.centered(Font::Regular, 13.0, project, INK)?;
    }
    canvas.centered(
        Font::Regular,
        10.0,
        &format!("Report date: {}", document.generated_at),
        MUTED,
    )?;
    canvas.gap(30.0);

    let counts = summary.counts;
    let boxes = [
        ("Scenarios", counts.total, INK),
        ("Passed (OK)", counts.ok, status_color(TaskStatus::Ok)),
        ("Failed (NOK)", counts.nok, status_color(TaskStatus::Nok)),
        ("Pending", counts.pending, status_color(TaskStatus::Pending)),
    ];
    let box_width = CONTENT_WIDTH / boxes.len() as f32;
    let top = canvas.y;
    for (i, (label, value, color)) in boxes.iter().enumerate() {
        let x = MARGIN + i as f32 * box_width;
        canvas.stroke_rect(x + 4.0, top - 70.0, box_width - 8.0, 70.0, MUTED);
        canvas.text_at(Font::Bold, 26.0, x + 14.0, top - 38.0, &value.to_string(), *color);
        canvas.text_at(Font::Bold, 8.0, x + 14.0, top - 58.0, &label.to_uppercase(), MUTED);
    }
    canvas.y = top - 70.0;
    Ok(())
}

fn draw_task(canvas: &mut Canvas, task: &TaskPage) -> Result<(), ExportError> {
    canvas.line(Font::Bold, 9.0, &format!("SCENARIO #{}", task.number), ACCENT)?;
    canvas.paragraph(Font::Bold, 18.0, &task.title, INK, 0.0)?;
    canvas.line(Font::Regular, 8.0, &format!("ID: {}", task.task_id), MUTED)?;
    canvas.badge(task.badge(), status_color(task.status))?;
    canvas.gap(6.0);
    canvas.paragraph(Font::Regular, 10.5, &task.description, INK, 0.0)?;

    canvas.heading("EXECUTION STEPS")?;
    if task.steps.is_empty() {
        canvas.line(Font::Regular, 10.0, "No steps defined.", MUTED)?;
    }
    for step in &task.steps {
        let color = if step.completed { INK } else { MUTED };
        canvas.paragraph(
            Font::Regular,
            10.0,
            &format!("{}. [{}] {}", step.number, step.marker(), step.description),
            color,
            8.0,
        )?;
    }

    if let Some(observations) = &task.observations {
        canvas.heading("OBSERVATIONS")?;
        canvas.paragraph(Font::Regular, 10.0, &format!("\"{observations}\""), INK, 8.0)?;
    }

    if let Some(logs) = &task.logs {
        canvas.heading("LOG EVIDENCE")?;
        for raw in logs.text.lines() {
            canvas.paragraph(Font::Mono, 7.5, raw, INK, 8.0)?;
        }
        if let Some(note) = logs.note() {
            canvas.gap(4.0);
            canvas.paragraph(Font::Bold, 8.0, &note, ACCENT, 8.0)?;
        }
    }

    canvas.heading("SCREENSHOT EVIDENCE")?;
    if task.images.is_empty() {
        canvas.line(Font::Regular, 10.0, "No visual evidence.", MUTED)?;
    }
    for figure in &task.images {
        canvas.figure(figure)?;
    }
    Ok(())
}

fn draw_sign_off(canvas: &mut Canvas, sign_off: &SignOffPage) -> Result<(), ExportError> {
    canvas.gap(120.0);
    let columns = sign_off.signatures.len().max(1) as f32;
    let slot = CONTENT_WIDTH / columns;
    let y = canvas.y;
    for (i, signature) in sign_off.signatures.iter().enumerate() {
        let x = MARGIN + i as f32 * slot + 10.0;
        let width = slot - 20.0;
        canvas.hline(x, y, width, INK);
        canvas.text_at(Font::Bold, 9.0, x, y - 16.0, &signature.role.to_uppercase(), INK);
        canvas.text_at(Font::Regular, 9.0, x, y - 30.0, &signature.hint, MUTED);
    }
    canvas.y = y - 40.0;
    Ok(())
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// Accumulates drawing operations sheet by sheet and assembles the document.
struct Canvas {
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    kids: Vec<Object>,
    ops: Vec<Operation>,
    xobjects: Dictionary,
    image_seq: usize,
    open: bool,
    y: f32,
}

impl Canvas {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for (font, base) in [
            (Font::Regular, "Helvetica"),
            (Font::Bold, "Helvetica-Bold"),
            (Font::Mono, "Courier"),
        ] {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base,
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource(), id);
        }

        Self {
            doc,
            pages_id,
            fonts,
            kids: Vec::new(),
            ops: Vec::new(),
            xobjects: Dictionary::new(),
            image_seq: 0,
            open: false,
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn start_sheet(&mut self) -> Result<(), ExportError> {
        self.close_sheet()?;
        self.open = true;
        self.y = PAGE_HEIGHT - MARGIN;
        Ok(())
    }

    fn close_sheet(&mut self) -> Result<(), ExportError> {
        if !self.open {
            return Ok(());
        }
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let resources = dictionary! {
            "Font" => self.fonts.clone(),
            "XObject" => std::mem::take(&mut self.xobjects),
        };
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        self.kids.push(page_id.into());
        self.open = false;
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        self.close_sheet()?;

        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
                "MediaBox" => vec![Object::Integer(0), Object::Integer(0), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| ExportError::Document(e.to_string()))?;
        Ok(out)
    }

    /// Continue on a fresh sheet when `height` does not fit.
    fn reserve(&mut self, height: f32) -> Result<(), ExportError> {
        if self.y - height < MARGIN {
            self.start_sheet()?;
        }
        Ok(())
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn text_at(&mut self, font: Font, size: f32, x: f32, y: f32, text: &str, color: Rgb) {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("rg", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// One unwrapped line at the left margin.
    fn line(&mut self, font: Font, size: f32, text: &str, color: Rgb) -> Result<(), ExportError> {
        let leading = size * 1.4;
        self.reserve(leading)?;
        self.y -= leading;
        self.text_at(font, size, MARGIN, self.y, text, color);
        Ok(())
    }

    fn centered(&mut self, font: Font, size: f32, text: &str, color: Rgb) -> Result<(), ExportError> {
        let leading = size * 1.4;
        self.reserve(leading)?;
        self.y -= leading;
        let width = text.chars().count() as f32 * size * font.char_width();
        let x = MARGIN + ((CONTENT_WIDTH - width) / 2.0).max(0.0);
        self.text_at(font, size, x, self.y, text, color);
        Ok(())
    }

    /// Word-wrapped text, indented by `indent` points.
    fn paragraph(
        &mut self,
        font: Font,
        size: f32,
        text: &str,
        color: Rgb,
        indent: f32,
    ) -> Result<(), ExportError> {
        let max_chars = ((CONTENT_WIDTH - indent) / (size * font.char_width())).floor() as usize;
        let leading = size * 1.4;
        for line in wrap(text, max_chars.max(1)) {
            self.reserve(leading)?;
            self.y -= leading;
            self.text_at(font, size, MARGIN + indent, self.y, &line, color);
        }
        Ok(())
    }

    fn heading(&mut self, title: &str) -> Result<(), ExportError> {
        self.reserve(40.0)?;
        self.gap(12.0);
        self.line(Font::Bold, 8.0, title, MUTED)?;
        self.gap(2.0);
        Ok(())
    }

    fn badge(&mut self, label: &str, color: Rgb) -> Result<(), ExportError> {
        let height = 18.0;
        self.reserve(height + 4.0)?;
        self.y -= height + 4.0;
        let width = label.chars().count() as f32 * 9.0 * Font::Bold.char_width() + 20.0;
        self.ops.extend([
            Operation::new("rg", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("re", vec![MARGIN.into(), self.y.into(), width.into(), height.into()]),
            Operation::new("f", vec![]),
        ]);
        self.text_at(Font::Bold, 9.0, MARGIN + 10.0, self.y + 5.5, &label.to_uppercase(), (1.0, 1.0, 1.0));
        Ok(())
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.ops.extend([
            Operation::new("RG", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("w", vec![0.5_f32.into()]),
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn hline(&mut self, x: f32, y: f32, width: f32, color: Rgb) {
        self.ops.extend([
            Operation::new("RG", vec![color.0.into(), color.1.into(), color.2.into()]),
            Operation::new("w", vec![0.8_f32.into()]),
            Operation::new("m", vec![x.into(), y.into()]),
            Operation::new("l", vec![(x + width).into(), y.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    /// Embed a screenshot scaled to fit, followed by its caption.
    ///
    /// Images that are not decodable data URIs are listed by reference only.
    fn figure(&mut self, figure: &Figure) -> Result<(), ExportError> {
        match decode_image(&figure.url) {
            Some(rgb) => {
                let (w, h) = (rgb.width() as f32, rgb.height() as f32);
                let scale = (IMAGE_MAX_WIDTH / w).min(IMAGE_MAX_HEIGHT / h).min(1.0);
                let (dw, dh) = (w * scale, h * scale);

                self.reserve(dh + 8.0)?;
                self.y -= dh + 8.0;

                self.image_seq += 1;
                let name = format!("Im{}", self.image_seq);
                let image_id = self.doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => rgb.width() as i64,
                        "Height" => rgb.height() as i64,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8_i64,
                    },
                    rgb.into_raw(),
                ));
                self.xobjects.set(name.as_bytes().to_vec(), image_id);
                self.ops.extend([
                    Operation::new("q", vec![]),
                    Operation::new(
                        "cm",
                        vec![dw.into(), 0_i64.into(), 0_i64.into(), dh.into(), MARGIN.into(), self.y.into()],
                    ),
                    Operation::new("Do", vec![Object::Name(name.into_bytes())]),
                    Operation::new("Q", vec![]),
                ]);
            }
            None => {
                tracing::debug!("Screenshot is not an embeddable image, listing reference only");
                let reference: String = figure.url.chars().take(60).collect();
                self.line(Font::Regular, 8.0, &format!("[image not embedded: {reference}]"), MUTED)?;
            }
        }

        if let Some(caption) = &figure.caption {
            self.paragraph(Font::Bold, 8.5, caption, INK, 8.0)?;
        }
        self.gap(6.0);
        Ok(())
    }
}

fn decode_image(url: &str) -> Option<RgbImage> {
    let uri = data_uri::parse(url).ok()?;
    image::load_from_memory(&uri.data).ok().map(|img| img.to_rgb8())
}

/// Encode text for a WinAnsi Type1 font.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x09 => b' ',
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap to `max_chars` per line. Words longer than a line are
/// split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let word: String = word.into_iter().collect();
            let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
            if needed > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&word);
        }
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use testmaster_db::models::task::{Task, TestImage};

    use crate::document::build_document;
    use crate::evidence::EvidencePlan;
    use crate::settings::ReportSettings;

    fn png_data_uri() -> String {
        let img = RgbImage::from_pixel(4, 3, image::Rgb([200, 30, 30]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        data_uri::encode("image/png", bytes.get_ref())
    }

    fn task(id: &str, logs: &str, images: Vec<TestImage>) -> Task {
        Task {
            id: id.into(),
            project_id: "p1".into(),
            title: format!("Scenario {id}"),
            description: "Checks the basket".into(),
            steps: vec![],
            observations: String::new(),
            logs: logs.into(),
            log_file_name: None,
            images,
            status: TaskStatus::Ok,
            completed: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_one_sheet_per_page_for_short_content() {
        let tasks = [
            task(
                "t1",
                "",
                vec![TestImage {
                    url: png_data_uri(),
                    description: "basket".into(),
                }],
            ),
            task("t2", "GET /basket 200", vec![]),
        ];
        let refs: Vec<&Task> = tasks.iter().collect();
        let evidence = EvidencePlan::for_tasks(&refs);
        let doc = build_document(&refs, &evidence, &ReportSettings::default(), Some("Shop"), Utc::now());

        let bytes = PdfRenderer.render(&doc).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let parsed = Document::load_mem(&bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), doc.pages.len());
    }

    #[test]
    fn long_logs_continue_on_extra_sheets() {
        let logs = "ERROR connection reset by peer\n".repeat(200);
        let tasks = [task("t1", &logs, vec![])];
        let refs: Vec<&Task> = tasks.iter().collect();
        let settings = ReportSettings {
            log_excerpt_max_chars: logs.len(),
            ..Default::default()
        };
        let doc = build_document(&refs, &EvidencePlan::for_tasks(&refs), &settings, None, Utc::now());

        let bytes = PdfRenderer.render(&doc).unwrap();
        let parsed = Document::load_mem(&bytes).unwrap();
        assert!(parsed.get_pages().len() > doc.pages.len());
    }

    #[test]
    fn blob_references_do_not_fail_rendering() {
        let tasks = [task(
            "t1",
            "",
            vec![TestImage {
                url: "blob:http://localhost/1234".into(),
                description: String::new(),
            }],
        )];
        let refs: Vec<&Task> = tasks.iter().collect();
        let doc = build_document(&refs, &EvidencePlan::default(), &ReportSettings::default(), None, Utc::now());
        assert!(PdfRenderer.render(&doc).is_ok());
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_tokens() {
        assert_eq!(wrap("alpha beta gamma", 10), vec!["alpha beta", "gamma"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
        assert_eq!(wrap("a\n\nb", 10), vec!["a", "", "b"]);
    }

    #[test]
    fn win_ansi_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(win_ansi("Olá"), vec![b'O', b'l', 0xE1]);
        assert_eq!(win_ansi("✓\tok"), b"? ok".to_vec());
    }
}
