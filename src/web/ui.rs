use crate::image::ImageLoader;
use crate::prediction::{PageState, Prediction};
use crate::web::chart::BarChart;
use base64::Engine;

pub const TITLE: &str = "Rock ✊🏼 Paper ✋🏼 Scissors ✌🏼";

const IDLE_ANIMATION: &str = "https://media.giphy.com/media/QWvra259h4LCvdJnxP/giphy.gif";
const BANNER: &str = "/assets/rps.svg";
const ERROR_ILLUSTRATION: &str = "/assets/error.svg";
const ATTRIBUTION_NAME: &str = "Muhammad Yusuf Aristyanto";
const ATTRIBUTION_LINK: &str = "https://www.linkedin.com/in/myarist/";

pub const RETRY_PROMPT: &str = "Please Use Another Link Image 🙏🏻";
pub const ERROR_HEADLINE: &str = "Oh, No! 😱";

const EXAMPLES: [(&str, &str); 3] = [
    (
        "Rock",
        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcREzt3OL9DdfGODyBesGVVu8i7MNh0nINfjA6r1PDOj4g8xNnpM1rz3iNootFDzIU4ukZA&usqp=CAU",
    ),
    (
        "Paper",
        "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcQ68ARUGkcMCdcIAWylFRNx8-rEO3TT4uULjXZLMEiN1Jh7SrmtWNrR0bLVC5DoqJs_AsM&usqp=CAU",
    ),
    (
        "Scissors",
        "https://thumbs.dreamstime.com/b/young-male-scissors-gesture-left-hand-concept-rock-paper-game-isolated-white-background-118950800.jpg",
    ),
];

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: #0e1117;
    color: #fafafa;
    display: flex;
    min-height: 100vh;
}
aside {
    width: 320px;
    background: #262730;
    padding: 32px 20px;
    display: flex;
    flex-direction: column;
    gap: 16px;
}
aside h2 { font-size: 1.3em; }
aside a { color: #ff4b4b; text-decoration: none; }
aside label { font-size: 0.9em; color: #bbb; }
aside input[type=text] {
    width: 100%;
    padding: 8px 10px;
    border-radius: 6px;
    border: 1px solid #555;
    background: #0e1117;
    color: #fafafa;
}
aside button {
    padding: 8px;
    border: none;
    border-radius: 6px;
    background: #ff4b4b;
    color: white;
    cursor: pointer;
}
aside img { width: 100%; border-radius: 6px; }
main {
    flex: 1;
    padding: 48px;
    display: flex;
    flex-direction: column;
    align-items: center;
    gap: 28px;
}
main h1, main h2, main h3 { text-align: center; }
main h1.error { color: red; }
main h3 a { color: white; text-decoration: none; }
.banner { width: 700px; max-width: 100%; }
.chart { width: 100%; max-width: 760px; }
"#;

/// Full HTML document for one page state.
pub fn render_page(state: &PageState, current_url: &str) -> String {
    let (sidebar_image, content) = match state {
        PageState::Idle => (
            format!(r#"<img src="{}" alt="" width="300">"#, IDLE_ANIMATION),
            idle_content(),
        ),
        PageState::Success(prediction) => (thumbnail(prediction), success_content(prediction)),
        PageState::Error => (
            format!(r#"<img src="{}" alt="error">"#, ERROR_ILLUSTRATION),
            error_content(),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<aside>
{sidebar}
{sidebar_image}
</aside>
<main>
{content}
</main>
</body>
</html>"#,
        title = TITLE,
        style = STYLE,
        sidebar = sidebar(current_url),
        sidebar_image = sidebar_image,
        content = content,
    )
}

fn sidebar(current_url: &str) -> String {
    let examples = EXAMPLES
        .iter()
        .map(|(name, href)| format!(r#"<a href="{}">{}</a>"#, escape_html(href), name))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<h2>Please Enter Image Link</h2>
<p>Example link for {examples}</p>
<form method="get" action="/">
<label for="url">Please use JPG or JPEG image for better prediction</label>
<input type="text" id="url" name="url" value="{value}" autocomplete="off">
<button type="submit">Predict</button>
</form>"#,
        examples = examples,
        value = escape_html(current_url),
    )
}

fn idle_content() -> String {
    format!(
        r#"<h1>{title}</h1>
<img class="banner" src="{banner}" alt="Rock paper scissors">
<h3>Project by <a href="{link}">{name}</a></h3>"#,
        title = TITLE,
        banner = BANNER,
        link = ATTRIBUTION_LINK,
        name = ATTRIBUTION_NAME,
    )
}

fn success_content(prediction: &Prediction) -> String {
    let chart = BarChart::from_result(&prediction.result);
    format!(
        r#"<h1>The Image is Detected as {label}</h1>
{chart}"#,
        label = prediction.result.headline(),
        chart = chart.to_svg(),
    )
}

fn error_content() -> String {
    format!(
        r#"<h1 class="error">{headline}</h1>
<img class="banner" src="{banner}" alt="Rock paper scissors">
<h2>{retry}</h2>"#,
        headline = ERROR_HEADLINE,
        banner = BANNER,
        retry = RETRY_PROMPT,
    )
}

/// The fetched bytes inlined as a `data:` URI.
fn thumbnail(prediction: &Prediction) -> String {
    let bytes = &prediction.image.bytes;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!(
        r#"<img src="data:{mime};base64,{data}" alt="{alt}">"#,
        mime = ImageLoader::mime_type(bytes),
        data = encoded,
        alt = escape_html(&prediction.image.url),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
