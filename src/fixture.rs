//! Standalone HTML page embedding every widget style.
//!
//! Used when the target site has no page rendering the shortcodes. The page is
//! self-contained: markup mirrors the plugin templates, and an inline script
//! provides the accordion, smooth-scroll, progress and audio behaviour the
//! test cases exercise.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::widgets::WidgetKind;

/// File name of the generated fixture
pub const FIXTURE_FILE_NAME: &str = "shortcode_fixture.html";

const TAKEAWAYS: [&str; 4] = [
    "AI summaries surface the main points of a long article in seconds.",
    "Structured FAQs answer reader questions before they are asked.",
    "A table of contents lets visitors jump straight to the section they need.",
    "Audio versions make every post accessible on the go.",
];

const FAQ: [(&str, &str); 4] = [
    (
        "What does the plugin generate?",
        "Key takeaways, FAQs, a table of contents and an audio version of each post.",
    ),
    (
        "Can I choose a display style?",
        "Yes. Every shortcode accepts a style attribute such as accordion, list or cards.",
    ),
    (
        "Does it work with any theme?",
        "The widgets ship their own styles and inherit the theme typography.",
    ),
    (
        "Is the generated content editable?",
        "All generated content can be reviewed and edited before publishing.",
    ),
];

const SECTIONS: [(&str, &str); 6] = [
    ("section-introduction", "Introduction"),
    ("section-getting-started", "Getting Started"),
    ("section-configuration", "Configuration"),
    ("section-shortcodes", "Using the Shortcodes"),
    ("section-best-practices", "Best Practices"),
    ("section-conclusion", "Conclusion"),
];

const STYLE: &str = r#"
:root {
    --hmg-royal-blue: #332A86;
    --hmg-lime-green: #5E9732;
    --hmg-orange: #E36F1E;
    --hmg-navy-blue: #214357;
    --hmg-sky-blue: #48A4DD;
    --hmg-light-gray: #F5F5F7;
    --hmg-white: #FFFFFF;
    --hmg-dark-gray: #111114;
    --hmg-medium-gray: #939598;
}
body { font-family: Roboto, Helvetica, Arial, sans-serif; margin: 0; padding: 32px; color: var(--hmg-dark-gray); background: var(--hmg-white); }
.hmg-fixture-layout { display: flex; gap: 32px; align-items: flex-start; }
.hmg-fixture-main { flex: 1; min-width: 0; }
.hmg-ai-takeaways, .hmg-ai-faq, .hmg-ai-toc, .hmg-ai-audio { background: var(--hmg-light-gray); border-radius: 12px; padding: 24px; margin: 0 0 32px; }
.hmg-ai-takeaways-title, .hmg-ai-faq-title, .hmg-ai-toc-title { color: var(--hmg-royal-blue); margin-top: 0; }
.hmg-ai-takeaway-item { padding: 8px 0; transition: background 0.2s ease; }
.hmg-ai-takeaway-item:hover { background: rgba(51, 42, 134, 0.08); }
.hmg-ai-takeaways-numbered ol { counter-reset: takeaway; list-style: none; padding: 0; }
.hmg-ai-takeaways-numbered .hmg-ai-takeaway-item { counter-increment: takeaway; }
.hmg-ai-takeaways-numbered .hmg-ai-takeaway-item::before { content: counter(takeaway) "."; color: var(--hmg-orange); font-weight: bold; margin-right: 8px; }
.hmg-ai-takeaways-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 16px; }
.hmg-ai-takeaway-card { background: var(--hmg-white); border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0, 0, 0, 0.1); transition: transform 0.2s ease; }
.hmg-ai-takeaway-card:hover { transform: translateY(-2px); }
.hmg-ai-card-number { display: inline-block; width: 28px; height: 28px; line-height: 28px; text-align: center; border-radius: 50%; background: var(--hmg-royal-blue); color: var(--hmg-white); }
.hmg-ai-highlight-item { display: flex; gap: 12px; align-items: flex-start; padding: 8px 0; }
.hmg-ai-highlight-marker { flex: 0 0 12px; width: 12px; height: 12px; margin-top: 4px; border-radius: 50%; background: var(--hmg-lime-green); }
.hmg-ai-branding, .hmg-ai-powered-by { font-size: 14px; color: var(--hmg-medium-gray); margin-top: 12px; }
.hmg-ai-faq-accordion-item { border-bottom: 1px solid var(--hmg-white); }
.hmg-ai-faq-accordion-button { width: 100%; text-align: left; padding: 12px 0; background: none; border: 0; font-size: 16px; cursor: pointer; color: var(--hmg-navy-blue); }
.hmg-ai-faq-accordion-button:focus { outline: 2px solid var(--hmg-sky-blue); }
.hmg-ai-faq-accordion-content { display: none; padding: 0 0 12px; }
.hmg-ai-faq-accordion-content.hmg-ai-active { display: block; }
.hmg-ai-faq-item { padding: 8px 0; }
.hmg-ai-faq-question h4 { margin: 0 0 4px; }
.hmg-ai-faq-cards:not(.hmg-ai-faq) { display: grid; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); gap: 16px; }
.hmg-ai-faq-card { background: var(--hmg-white); border-radius: 8px; padding: 16px; }
.hmg-ai-faq-card-icon { display: inline-block; width: 28px; height: 28px; line-height: 28px; text-align: center; border-radius: 6px; background: var(--hmg-orange); color: var(--hmg-white); font-weight: bold; }
.hmg-ai-toc a { color: var(--hmg-royal-blue); text-decoration: none; }
.hmg-ai-toc-scroll-container { display: flex; gap: 12px; overflow-x: auto; }
.hmg-ai-toc-horizontal-item { white-space: nowrap; padding: 6px 12px; border-radius: 16px; background: var(--hmg-white); }
.hmg-ai-toc-minimal-item { display: block; padding: 4px 0; }
.hmg-ai-toc-sidebar { width: 240px; position: sticky; top: 16px; }
.hmg-ai-toc-progress { width: 200px; height: 4px; background: var(--hmg-medium-gray); border-radius: 2px; margin-bottom: 12px; }
.hmg-ai-toc-progress-bar { height: 4px; width: 0; min-width: 2px; background: var(--hmg-lime-green); border-radius: 2px; }
.hmg-ai-toc-sidebar-item { display: block; padding: 4px 0; }
.hmg-ai-audio-element { display: block; width: 100%; height: 40px; }
.hmg-ai-audio-controls { display: flex; gap: 8px; margin-top: 8px; align-items: center; }
.hmg-ai-audio button { padding: 6px 12px; border: 0; border-radius: 6px; background: var(--hmg-royal-blue); color: var(--hmg-white); cursor: pointer; transition: background 0.2s ease; }
.hmg-ai-audio-compact:not(.hmg-ai-audio) { display: flex; gap: 12px; align-items: center; }
.hmg-ai-audio-progress-track { flex: 1; height: 6px; background: var(--hmg-medium-gray); border-radius: 3px; }
.hmg-ai-audio-progress-fill { height: 6px; width: 0; background: var(--hmg-orange); border-radius: 3px; }
.hmg-ai-audio-minimal-row { display: flex; gap: 12px; align-items: center; }
.hmg-ai-audio-minimal.hmg-ai-playing [data-hmg-audio-toggle] { background: var(--hmg-orange); }
.hmg-ai-audio-card-header { display: flex; justify-content: space-between; align-items: center; }
.hmg-ai-audio-card-actions { margin-top: 12px; }
.hmg-ai-audio-download { color: var(--hmg-royal-blue); }
.hmg-fixture-section { min-height: 640px; padding-top: 16px; }
@media (max-width: 600px) {
    body { padding: 12px; }
    .hmg-fixture-layout { flex-direction: column; }
    .hmg-ai-toc-sidebar { width: auto; position: static; }
    .hmg-ai-faq-accordion-button { min-height: 44px; font-size: 16px; }
}
@media print {
    .hmg-ai-faq-accordion-content { display: block !important; }
}
"#;

const SCRIPT: &str = r#"
(function () {
    document.addEventListener('click', function (event) {
        var toggle = event.target.closest('[data-hmg-faq-toggle]');
        if (!toggle) { return; }
        event.preventDefault();
        var expanded = toggle.getAttribute('aria-expanded') === 'true';
        var accordion = toggle.closest('.hmg-ai-faq-accordion');
        if (accordion && !expanded) {
            accordion.querySelectorAll('[data-hmg-faq-toggle]').forEach(function (other) {
                if (other === toggle) { return; }
                other.setAttribute('aria-expanded', 'false');
                other.classList.remove('hmg-ai-active');
                var otherPanel = document.getElementById(other.getAttribute('aria-controls'));
                if (otherPanel) {
                    otherPanel.classList.remove('hmg-ai-active');
                    otherPanel.setAttribute('aria-hidden', 'true');
                }
            });
        }
        toggle.setAttribute('aria-expanded', expanded ? 'false' : 'true');
        toggle.classList.toggle('hmg-ai-active', !expanded);
        var panel = document.getElementById(toggle.getAttribute('aria-controls'));
        if (panel) {
            panel.classList.toggle('hmg-ai-active', !expanded);
            panel.setAttribute('aria-hidden', expanded ? 'true' : 'false');
        }
    });

    document.addEventListener('click', function (event) {
        var link = event.target.closest('[data-hmg-smooth-scroll]');
        if (!link) { return; }
        event.preventDefault();
        var target = document.getElementById(link.getAttribute('data-target'));
        if (target) {
            target.scrollIntoView({ behavior: 'smooth', block: 'start' });
        }
    });

    var speeds = [1, 1.25, 1.5, 2];
    document.addEventListener('click', function (event) {
        var button = event.target.closest('[data-hmg-audio-speed]');
        if (!button) { return; }
        var current = parseFloat(button.textContent) || 1;
        var next = speeds[(speeds.indexOf(current) + 1) % speeds.length];
        button.textContent = next + 'x';
        var audio = button.closest('.hmg-ai-audio').querySelector('audio');
        if (audio) { audio.playbackRate = next; }
    });

    document.addEventListener('click', function (event) {
        var toggle = event.target.closest('[data-hmg-audio-toggle]');
        if (!toggle) { return; }
        var player = toggle.closest('.hmg-ai-audio');
        var playing = player.classList.toggle('hmg-ai-playing');
        toggle.textContent = playing ? 'Pause' : 'Play';
        toggle.setAttribute('aria-pressed', playing ? 'true' : 'false');
    });

    function updateProgress() {
        var scrollable = document.documentElement.scrollHeight - window.innerHeight;
        var percent = scrollable > 0 ? (window.scrollY / scrollable) * 100 : 0;
        document.querySelectorAll('.hmg-ai-toc-progress-bar').forEach(function (bar) {
            bar.style.width = Math.min(percent, 100) + '%';
        });
    }
    window.addEventListener('scroll', updateProgress);
    updateProgress();

    window.HMGAIPublic = { fixture: true, initialized: true };
})();
"#;

/// Render the complete fixture document
pub fn render_fixture() -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Shortcode Test Page</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    html.push_str("<h1>Shortcode Test Page</h1>\n");
    html.push_str("<div class=\"hmg-fixture-layout\">\n<main class=\"hmg-fixture-main\">\n");

    for style in WidgetKind::Takeaways.styles() {
        html.push_str(&render_takeaways(style));
    }
    for style in WidgetKind::Faq.styles() {
        html.push_str(&render_faq(style));
    }
    for style in WidgetKind::Toc.styles().iter().filter(|s| **s != "sidebar") {
        html.push_str(&render_toc(style));
    }
    for style in WidgetKind::Audio.styles() {
        html.push_str(&render_audio(style));
    }
    for (id, title) in SECTIONS {
        let _ = write!(
            html,
            "<section class=\"hmg-fixture-section\" id=\"{id}\"><h2>{title}</h2>\
             <p>Sample article content for the {title} section.</p></section>\n"
        );
    }

    html.push_str("</main>\n<aside>\n");
    html.push_str(&render_toc("sidebar"));
    html.push_str("</aside>\n</div>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn open_root(kind: WidgetKind, style: &str) -> String {
    format!(
        "<div class=\"{} {}\" data-post-id=\"0\">\n",
        kind.root_class(),
        kind.style_class(style)
    )
}

fn render_takeaways(style: &str) -> String {
    let mut html = open_root(WidgetKind::Takeaways, style);
    html.push_str("<h3 class=\"hmg-ai-takeaways-title\">Key Takeaways</h3>\n");

    match style {
        "cards" => {
            html.push_str("<div class=\"hmg-ai-takeaways-grid\">\n");
            for (i, text) in TAKEAWAYS.iter().enumerate() {
                let _ = write!(
                    html,
                    "<div class=\"hmg-ai-takeaway-card\"><span class=\"hmg-ai-card-number\">{}</span>\
                     <p class=\"hmg-ai-card-content\">{}</p></div>\n",
                    i + 1,
                    text
                );
            }
            html.push_str("</div>\n");
        }
        "highlights" => {
            html.push_str("<div class=\"hmg-ai-highlights\">\n");
            for text in TAKEAWAYS {
                let _ = write!(
                    html,
                    "<div class=\"hmg-ai-highlight-item\"><span class=\"hmg-ai-highlight-marker\"></span>\
                     <div class=\"hmg-ai-highlight-content\">{}</div></div>\n",
                    text
                );
            }
            html.push_str("</div>\n");
        }
        _ => {
            let tag = if style == "numbered" { "ol" } else { "ul" };
            let _ = writeln!(html, "<{} class=\"hmg-ai-takeaways-list\">", tag);
            for text in TAKEAWAYS {
                let _ = writeln!(html, "<li class=\"hmg-ai-takeaway-item\">{}</li>", text);
            }
            let _ = writeln!(html, "</{}>", tag);
        }
    }

    html.push_str("<div class=\"hmg-ai-branding\">Powered by Haley Marketing AI</div>\n</div>\n");
    html
}

fn render_faq(style: &str) -> String {
    let mut html = open_root(WidgetKind::Faq, style);
    html.push_str("<h3 class=\"hmg-ai-faq-title\">Frequently Asked Questions</h3>\n");

    match style {
        "accordion" => {
            let prefix = "hmg-faq-fixture";
            let _ = writeln!(html, "<div class=\"hmg-ai-faq-accordion\" id=\"{}\">", prefix);
            for (i, (question, answer)) in FAQ.iter().enumerate() {
                // first item starts expanded
                let open = i == 0;
                let active = if open { " hmg-ai-active" } else { "" };
                let _ = write!(
                    html,
                    "<div class=\"hmg-ai-faq-accordion-item\">\
                     <button type=\"button\" class=\"hmg-ai-faq-accordion-button{active}\" data-hmg-faq-toggle \
                     aria-expanded=\"{open}\" aria-controls=\"{prefix}-answer-{i}\">\
                     <span class=\"hmg-ai-faq-accordion-question\">{question}</span></button>\
                     <div class=\"hmg-ai-faq-accordion-content{active}\" id=\"{prefix}-answer-{i}\" aria-hidden=\"{hidden}\">\
                     <div class=\"hmg-ai-faq-answer\">{answer}</div></div></div>\n",
                    hidden = !open,
                );
            }
            html.push_str("</div>\n");
        }
        "cards" => {
            html.push_str("<div class=\"hmg-ai-faq-cards\">\n");
            for (question, answer) in FAQ {
                let _ = write!(
                    html,
                    "<div class=\"hmg-ai-faq-card\"><div class=\"hmg-ai-faq-card-header\">\
                     <span class=\"hmg-ai-faq-card-icon\">Q</span><h4 class=\"hmg-ai-faq-card-question\">{question}</h4></div>\
                     <div class=\"hmg-ai-faq-card-body\"><p class=\"hmg-ai-faq-answer\">{answer}</p></div></div>\n"
                );
            }
            html.push_str("</div>\n");
        }
        _ => {
            html.push_str("<div class=\"hmg-ai-faq-list\">\n");
            for (question, answer) in FAQ {
                let _ = write!(
                    html,
                    "<div class=\"hmg-ai-faq-item\"><div class=\"hmg-ai-faq-question\"><h4>{question}</h4></div>\
                     <div class=\"hmg-ai-faq-answer\">{answer}</div></div>\n"
                );
            }
            html.push_str("</div>\n");
        }
    }

    html.push_str("<div class=\"hmg-ai-powered-by\"><small>AI-Powered Content by Haley Marketing</small></div>\n</div>\n");
    html
}

fn render_toc(style: &str) -> String {
    let mut html = open_root(WidgetKind::Toc, style);
    html.push_str("<h3 class=\"hmg-ai-toc-title\">Table of Contents</h3>\n");

    let link = |class: &str, id: &str, title: &str| {
        format!(
            "<a class=\"{class}\" href=\"#{id}\" data-hmg-smooth-scroll data-target=\"{id}\">{title}</a>\n"
        )
    };

    match style {
        "horizontal" => {
            html.push_str("<nav class=\"hmg-ai-toc-scroll-container\">\n");
            for (id, title) in SECTIONS {
                html.push_str(&link("hmg-ai-toc-horizontal-item", id, title));
            }
            html.push_str("</nav>\n");
        }
        "minimal" => {
            html.push_str("<nav class=\"hmg-ai-toc-minimal-list\">\n");
            for (id, title) in SECTIONS {
                html.push_str(&link("hmg-ai-toc-minimal-item", id, title));
            }
            html.push_str("</nav>\n");
        }
        "sidebar" => {
            html.push_str("<div class=\"hmg-ai-toc-progress\"><div class=\"hmg-ai-toc-progress-bar\"></div></div>\n");
            html.push_str("<nav class=\"hmg-ai-toc-sidebar-list\">\n");
            for (id, title) in SECTIONS {
                html.push_str(&link("hmg-ai-toc-sidebar-item", id, title));
            }
            html.push_str("</nav>\n");
        }
        _ => {
            html.push_str("<ol class=\"hmg-ai-toc-list\">\n");
            for (id, title) in SECTIONS {
                let _ = writeln!(html, "<li class=\"hmg-ai-toc-item\">{}</li>", link("hmg-ai-toc-link", id, title).trim_end());
            }
            html.push_str("</ol>\n");
        }
    }

    html.push_str("</div>\n");
    html
}

fn render_audio(style: &str) -> String {
    let mut html = open_root(WidgetKind::Audio, style);
    let title = "Listen to this article";

    match style {
        "compact" => {
            let _ = write!(
                html,
                "<div class=\"hmg-ai-audio-compact\"><button type=\"button\" data-hmg-audio-toggle aria-pressed=\"false\">Play</button>\
                 <div class=\"hmg-ai-audio-info\"><span class=\"hmg-ai-audio-track-title\">{title}</span>\
                 <span class=\"hmg-ai-audio-duration\">4:32</span></div></div>\n"
            );
        }
        "minimal" => {
            html.push_str(
                "<div class=\"hmg-ai-audio-minimal-row\"><button type=\"button\" data-hmg-audio-toggle aria-pressed=\"false\">Play</button>\
                 <div class=\"hmg-ai-audio-progress-track\" data-hmg-audio-progress>\
                 <div class=\"hmg-ai-audio-progress-fill\"></div></div></div>\n",
            );
        }
        "card" => {
            let _ = write!(
                html,
                "<div class=\"hmg-ai-audio-card\"><div class=\"hmg-ai-audio-card-header\">\
                 <h4 class=\"hmg-ai-audio-card-title\">{title}</h4><span class=\"hmg-ai-audio-duration\">4:32</span></div>\
                 <audio class=\"hmg-ai-audio-element\" controls preload=\"none\"></audio>\
                 <div class=\"hmg-ai-audio-card-actions\"><a class=\"hmg-ai-audio-download\" href=\"#\" download>Download Audio</a></div></div>\n"
            );
        }
        _ => {
            let _ = write!(
                html,
                "<h3 class=\"hmg-ai-audio-title\">{title}</h3>\
                 <audio class=\"hmg-ai-audio-element\" controls preload=\"none\"></audio>\
                 <div class=\"hmg-ai-audio-controls\"><button type=\"button\" data-hmg-audio-speed>1x</button></div>\n"
            );
        }
    }

    html.push_str("</div>\n");
    html
}

/// Write the fixture into `dir`, returning its path
pub fn write_fixture(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(FIXTURE_FILE_NAME);
    fs::write(&path, render_fixture())?;
    Ok(path)
}

/// `file://` URL for a local file
pub fn file_url(path: &Path) -> io::Result<String> {
    let absolute = fs::canonicalize(path)?;
    let display = absolute.to_string_lossy().replace('\\', "/");
    if display.starts_with('/') {
        Ok(format!("file://{}", display))
    } else {
        Ok(format!("file:///{}", display))
    }
}
