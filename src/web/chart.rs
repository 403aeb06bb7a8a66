use crate::prediction::ClassificationResult;

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 56.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 28.0;
const MARGIN_BOTTOM: f64 = 40.0;
/// Fraction of each slot a bar occupies.
const BAR_WIDTH: f64 = 0.8;
const PALETTE: [&str; 3] = ["#4c72b0", "#dd8452", "#55a868"];

/// Percentage text as Python prints a float: `97.5`, `100.0`, `3.25`.
pub fn format_percent(percentage: f64) -> String {
    let text = format!("{}", percentage);
    if text.contains('.') || text.contains('e') {
        text
    } else {
        format!("{}.0", text)
    }
}

/// Vertical bar chart of the class probabilities on a dark background.
pub struct BarChart {
    bars: Vec<Bar>,
}

struct Bar {
    name: &'static str,
    probability: f64,
    annotation: String,
}

impl BarChart {
    pub fn from_result(result: &ClassificationResult) -> Self {
        let bars = result
            .table
            .iter()
            .map(|row| Bar {
                name: row.gesture.name(),
                probability: f64::from(row.probability).clamp(0.0, 1.0),
                annotation: format!("{}%", format_percent(row.percentage)),
            })
            .collect();
        Self { bars }
    }

    pub fn annotations(&self) -> Vec<&str> {
        self.bars.iter().map(|b| b.annotation.as_str()).collect()
    }

    pub fn to_svg(&self) -> String {
        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + plot_h;
        let y_of = |p: f64| baseline - p * plot_h;

        let mut svg = format!(
            r##"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" role="img" aria-label="Class probabilities">"##,
            w = WIDTH,
            h = HEIGHT
        );
        svg.push_str(&format!(r##"<rect width="{}" height="{}" fill="#000"/>"##, WIDTH, HEIGHT));

        // y axis with ticks every 0.2
        for i in 0..=5 {
            let p = f64::from(i) * 0.2;
            let y = y_of(p);
            svg.push_str(&format!(
                r##"<line x1="{x0}" y1="{y:.1}" x2="{x1}" y2="{y:.1}" stroke="#333" stroke-width="1"/><text x="{tx}" y="{ty:.1}" fill="#fff" font-size="12" text-anchor="end">{p:.1}</text>"##,
                x0 = MARGIN_LEFT,
                x1 = WIDTH - MARGIN_RIGHT,
                y = y,
                tx = MARGIN_LEFT - 6.0,
                ty = y + 4.0,
                p = p
            ));
        }
        svg.push_str(&format!(
            r##"<text x="14" y="{y:.1}" fill="#fff" font-size="13" text-anchor="middle" transform="rotate(-90 14 {y:.1})">Probability</text>"##,
            y = MARGIN_TOP + plot_h / 2.0
        ));

        let slot = plot_w / self.bars.len().max(1) as f64;
        for (i, bar) in self.bars.iter().enumerate() {
            let bar_w = slot * BAR_WIDTH;
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
            let top = y_of(bar.probability);
            let centre = x + bar_w / 2.0;

            svg.push_str(&format!(
                r##"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{bw:.1}" height="{bh:.1}" fill="{fill}"/>"##,
                x = x,
                y = top,
                bw = bar_w,
                bh = baseline - top,
                fill = PALETTE[i % PALETTE.len()]
            ));
            // annotation sits 0.01 above the bar top
            svg.push_str(&format!(
                r##"<text class="annotation" x="{cx:.1}" y="{y:.1}" fill="#fff" font-size="14" text-anchor="middle">{text}</text>"##,
                cx = centre,
                y = y_of(bar.probability + 0.01) - 2.0,
                text = bar.annotation
            ));
            svg.push_str(&format!(
                r##"<text x="{cx:.1}" y="{y:.1}" fill="#fff" font-size="14" text-anchor="middle">{name}</text>"##,
                cx = centre,
                y = baseline + 22.0,
                name = bar.name
            ));
        }

        svg.push_str(&format!(
            r##"<line x1="{x0}" y1="{y}" x2="{x1}" y2="{y}" stroke="#fff" stroke-width="1"/></svg>"##,
            x0 = MARGIN_LEFT,
            x1 = WIDTH - MARGIN_RIGHT,
            y = baseline
        ));

        svg
    }
}
