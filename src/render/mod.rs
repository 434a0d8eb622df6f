//! Fixed-layout PNG rendering of a [`ScoreReport`].
//!
//! Rendering is a pure function of the report: same report, same bytes.

mod font;

use crate::error::RenderError;
use crate::report::{ScoreReport, Verdict};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use font::{LINE_HEIGHT, draw_text, text_width};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage};

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 1600;

/// Commentary characters shown per category before an ellipsis.
pub const COMMENTARY_BUDGET: usize = 160;
pub const MAX_BARS: usize = 10;

const MARGIN: u32 = 60;
const HEADER_HEIGHT: u32 = 200;
const BARS_TOP: u32 = 250;
const BAR_ROW_HEIGHT: u32 = 80;
const BAR_TRACK_WIDTH: u32 = 960;
const BAR_THICKNESS: u32 = 30;
const COMMENTARY_TOP: u32 = 1100;
const COMMENTARY_BOTTOM: u32 = HEIGHT - 40;

const BACKGROUND: Rgb<u8> = Rgb([248, 248, 250]);
const HEADER: Rgb<u8> = Rgb([33, 37, 41]);
const HEADER_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const TEXT: Rgb<u8> = Rgb([33, 37, 41]);
const MUTED: Rgb<u8> = Rgb([108, 117, 125]);
const TRACK: Rgb<u8> = Rgb([222, 226, 230]);
const RED: Rgb<u8> = Rgb([220, 53, 69]);
const YELLOW: Rgb<u8> = Rgb([255, 193, 7]);
const GREEN: Rgb<u8> = Rgb([40, 167, 69]);
const TEAL: Rgb<u8> = Rgb([23, 162, 184]);

#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub image_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source: ScoreReport,
}

impl RenderedReport {
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.image_bytes)
    }

    pub fn data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.base64())
    }
}

pub fn render(report: &ScoreReport) -> Result<RenderedReport, RenderError> {
    let mut canvas = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    draw_header(&mut canvas, report);
    let bars_bottom = draw_bars(&mut canvas, report);
    draw_commentary(&mut canvas, report, bars_bottom.max(COMMENTARY_TOP));

    let mut image_bytes = Vec::new();
    PngEncoder::new(&mut image_bytes).write_image(
        canvas.as_raw(),
        WIDTH,
        HEIGHT,
        ExtendedColorType::Rgb8,
    )?;

    Ok(RenderedReport {
        image_bytes,
        width: WIDTH,
        height: HEIGHT,
        source: report.clone(),
    })
}

/// Per-category tier: red below 5, yellow below 7.5, green otherwise.
pub fn bar_color(score: u8) -> Rgb<u8> {
    let score = f64::from(score);
    if score < 5.0 {
        RED
    } else if score < 7.5 {
        YELLOW
    } else {
        GREEN
    }
}

fn verdict_color(verdict: Verdict) -> Rgb<u8> {
    match verdict {
        Verdict::Excellent => GREEN,
        Verdict::Good => TEAL,
        Verdict::Fair => YELLOW,
        Verdict::Poor => RED,
    }
}

fn draw_header(canvas: &mut RgbImage, report: &ScoreReport) {
    fill_rect(canvas, 0, 0, WIDTH, HEADER_HEIGHT, HEADER);
    draw_text(canvas, MARGIN, 50, report.kind().title(), 5, HEADER_TEXT);
    let overall = format!("Overall {:.1}/10", report.overall_score());
    draw_text(canvas, MARGIN, 125, &overall, 3, HEADER_TEXT);

    let badge_width = 260;
    let badge_x = WIDTH - MARGIN - badge_width;
    let verdict = report.verdict();
    fill_rect(canvas, badge_x, 60, badge_width, 80, verdict_color(verdict));
    let label = verdict.as_str();
    let label_x = badge_x + badge_width.saturating_sub(text_width(label, 4)) / 2;
    draw_text(canvas, label_x, 86, label, 4, HEADER);
}

/// Returns the first free y coordinate below the bar region.
fn draw_bars(canvas: &mut RgbImage, report: &ScoreReport) -> u32 {
    let categories = report.categories();
    let mut y = BARS_TOP;

    for category in categories.iter().take(MAX_BARS) {
        draw_text(canvas, MARGIN, y, &category.name, 3, TEXT);

        let track_y = y + 32;
        fill_rect(canvas, MARGIN, track_y, BAR_TRACK_WIDTH, BAR_THICKNESS, TRACK);
        let filled = BAR_TRACK_WIDTH * u32::from(category.score) / 10;
        fill_rect(canvas, MARGIN, track_y, filled, BAR_THICKNESS, bar_color(category.score));

        let score = format!("{}/10", category.score);
        draw_text(canvas, MARGIN + BAR_TRACK_WIDTH + 20, track_y + 4, &score, 3, TEXT);
        y += BAR_ROW_HEIGHT;
    }

    let hidden = categories.len().saturating_sub(MAX_BARS);
    if hidden > 0 {
        draw_text(canvas, MARGIN, y, &format!("+{hidden} more"), 3, MUTED);
        y += BAR_ROW_HEIGHT / 2;
    }
    y
}

fn draw_commentary(canvas: &mut RgbImage, report: &ScoreReport, top: u32) {
    let scale = 2;
    let line_height = LINE_HEIGHT * scale;
    let max_chars = ((WIDTH - 2 * MARGIN) / text_width("m", scale)) as usize;

    draw_text(canvas, MARGIN, top, "Commentary", 3, TEXT);
    let mut y = top + 40;

    for category in report.categories() {
        let comment = report.commentary(&category.name).unwrap_or_default();
        let entry = format!("{}: {}", category.name, truncate(comment, COMMENTARY_BUDGET));
        for line in wrap(&entry, max_chars) {
            if y + line_height > COMMENTARY_BOTTOM {
                return;
            }
            draw_text(canvas, MARGIN, y, &line, scale, TEXT);
            y += line_height;
        }
        y += 8;
    }
}

fn fill_rect(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let x_end = (x + width).min(canvas.width());
    let y_end = (y + height).min(canvas.height());
    for py in y..y_end {
        for px in x..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

pub fn truncate(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let kept: String = text.chars().take(budget).collect();
    format!("{}...", kept.trim_end())
}

/// Greedy word wrap on folded text; words longer than a line are split.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in font::fold_text(text).split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
