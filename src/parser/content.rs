//! Content stream interpretation.
//!
//! Walks the text operators of a page content stream and produces
//! [`TextSpan`]s whose characters carry page-space positions. Only the
//! state that affects where text lands is tracked: the CTM (`q`/`Q`/`cm`),
//! the text and line matrices, and the text state parameters.

use super::backend::PdfValue;

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }

    fn number(&self, i: usize) -> Option<f32> {
        self.operands.get(i).and_then(PdfValue::as_number)
    }

    fn numbers<const N: usize>(&self) -> Option<[f32; N]> {
        let mut out = [0.0; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.number(i)?;
        }
        Some(out)
    }
}

/// Glyph advance information for one font.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Base font name (e.g., "Helvetica-Bold")
    pub base_font: String,
    first_char: u32,
    widths: Vec<f32>,
    composite: bool,
    default_width: f32,
}

impl FontMetrics {
    /// Metrics from a font's `/FirstChar` and `/Widths`.
    pub fn new(base_font: String, first_char: u32, widths: Vec<f32>, composite: bool) -> Self {
        // Courier is the only fixed-pitch standard font
        let default_width = if base_font.contains("Courier") {
            600.0
        } else {
            500.0
        };
        Self {
            base_font,
            first_char,
            widths,
            composite,
            default_width,
        }
    }

    /// Advance of a single-byte code in thousandths of an em.
    pub fn width(&self, code: u32) -> f32 {
        code.checked_sub(self.first_char)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Whether codes may span several bytes (Type0 fonts).
    pub fn is_composite(&self) -> bool {
        self.composite
    }
}

/// Turns shown strings into text using the page's fonts.
pub trait TextDecoder {
    /// Decode bytes shown with the named font resource.
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String;

    /// Metrics of the named font resource.
    fn metrics(&self, font: &[u8]) -> Option<&FontMetrics>;
}

/// A character with its position on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedChar {
    /// The character
    pub ch: char,
    /// Left edge
    pub x: f32,
    /// Baseline
    pub y: f32,
    /// Advance width in page space
    pub width: f32,
    /// Effective font size
    pub font_size: f32,
}

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Characters with their positions
    pub chars: Vec<PositionedChar>,
}

impl TextSpan {
    /// Build a span from positioned characters. Returns `None` for
    /// whitespace-only input.
    pub fn from_chars(chars: Vec<PositionedChar>) -> Option<Self> {
        if chars.iter().all(|c| c.ch.is_whitespace()) {
            return None;
        }
        let first = chars.first()?;
        let last = chars.last()?;
        let x = chars.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
        let right = chars
            .iter()
            .map(|c| c.x + c.width)
            .fold(f32::NEG_INFINITY, f32::max);
        Some(Self {
            text: chars.iter().map(|c| c.ch).collect(),
            x,
            y: first.y,
            width: (right - x).max(last.x - first.x),
            font_size: first.font_size,
            chars,
        })
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn new(m: [f32; 6]) -> Self {
        Self {
            a: m[0],
            b: m[1],
            c: m[2],
            d: m[3],
            e: m[4],
            f: m[5],
        }
    }

    fn translation(tx: f32, ty: f32) -> Self {
        Self::new([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }

    fn x_scale(&self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }

    fn y_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

#[derive(Debug, Clone)]
struct TextState {
    font: Vec<u8>,
    size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scale: f32,
    leading: f32,
    rise: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GraphicsState {
    ctm: Matrix,
    text: TextState,
}

/// Interprets the text operators of a content stream.
pub struct TextInterpreter<'a> {
    decoder: &'a dyn TextDecoder,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text_block: bool,
    spans: Vec<TextSpan>,
}

impl<'a> TextInterpreter<'a> {
    /// Create an interpreter using the given fonts.
    pub fn new(decoder: &'a dyn TextDecoder) -> Self {
        Self {
            decoder,
            state: GraphicsState::default(),
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text_block: false,
            spans: Vec::new(),
        }
    }

    /// Run the operations and return the spans shown, in stream order.
    pub fn run(mut self, operations: &[ContentOp]) -> Vec<TextSpan> {
        for op in operations {
            self.apply(op);
        }
        self.spans
    }

    fn apply(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            "q" => self.stack.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.stack.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.state.ctm = Matrix::new(m).then(&self.state.ctm);
                }
            }
            "BT" => {
                self.in_text_block = true;
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.in_text_block = false,
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.state.text.font = name.clone();
                }
                self.state.text.size = op.number(1).unwrap_or(12.0);
            }
            "Tc" => self.state.text.char_spacing = op.number(0).unwrap_or(0.0),
            "Tw" => self.state.text.word_spacing = op.number(0).unwrap_or(0.0),
            "Tz" => self.state.text.horizontal_scale = op.number(0).unwrap_or(100.0) / 100.0,
            "TL" => self.state.text.leading = op.number(0).unwrap_or(0.0),
            "Ts" => self.state.text.rise = op.number(0).unwrap_or(0.0),
            "Td" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.state.text.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.line_matrix = Matrix::new(m);
                    self.text_matrix = self.line_matrix;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show_array(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                if let Some([aw, ac]) = op.numbers::<2>() {
                    self.state.text.word_spacing = aw;
                    self.state.text.char_spacing = ac;
                }
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show(bytes);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        let leading = self.state.text.leading;
        self.move_line(0.0, -leading);
    }

    fn show_array(&mut self, items: &[PdfValue]) {
        let mut chars = Vec::new();
        for item in items {
            match item {
                PdfValue::Str(bytes) => chars.extend(self.layout_string(bytes)),
                other => {
                    if let Some(n) = other.as_number() {
                        let ts = &self.state.text;
                        let tx = -n / 1000.0 * ts.size * ts.horizontal_scale;
                        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
                    }
                }
            }
        }
        self.push_span(chars);
    }

    fn show(&mut self, bytes: &[u8]) {
        let chars = self.layout_string(bytes);
        self.push_span(chars);
    }

    fn push_span(&mut self, chars: Vec<PositionedChar>) {
        if !self.in_text_block {
            return;
        }
        if let Some(span) = TextSpan::from_chars(chars) {
            self.spans.push(span);
        }
    }

    /// Position each character of a shown string and advance the text
    /// matrix past it.
    fn layout_string(&mut self, bytes: &[u8]) -> Vec<PositionedChar> {
        let ts = self.state.text.clone();
        let text: Vec<char> = self.decoder.decode(&ts.font, bytes).chars().collect();
        let metrics = self.decoder.metrics(&ts.font);

        // Simple fonts map one byte to one character, which lets us use
        // per-code widths and word spacing
        let single_byte = metrics.map_or(true, |m| !m.is_composite()) && text.len() == bytes.len();

        let mut out = Vec::with_capacity(text.len());
        for (i, &ch) in text.iter().enumerate() {
            let w0 = match (metrics, single_byte) {
                (Some(m), true) => m.width(bytes[i] as u32),
                (Some(m), false) => m.default_width,
                (None, _) => 500.0,
            } / 1000.0;

            let render = self.text_matrix.then(&self.state.ctm);
            let (x, y) = render.apply(0.0, ts.rise);

            let ch = if ch == '\t' { ' ' } else { ch };
            if !ch.is_control() {
                out.push(PositionedChar {
                    ch,
                    x,
                    y,
                    width: w0 * ts.size * ts.horizontal_scale * render.x_scale(),
                    font_size: ts.size * render.y_scale(),
                });
            }

            let word_spacing = if single_byte && bytes[i] == b' ' {
                ts.word_spacing
            } else {
                0.0
            };
            let tx = (w0 * ts.size + ts.char_spacing + word_spacing) * ts.horizontal_scale;
            self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
        }
        out
    }
}
