//! Catalogue of widget test cases.
//!
//! Each case opens the page under test, drives one widget style (or a
//! cross-cutting concern) and asserts on the resulting DOM state, capturing
//! screenshots along the way.

use image::imageops;
use image::Rgb;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::brand;
use crate::browser::{BrowserError, BrowserSession, By, Element, KEY_TAB};
use crate::harness::context::CaseContext;
use crate::harness::types::{CaseGroup, HarnessError, HarnessResult, ensure};
use crate::snapshot::{SnapshotError, compare_screenshots};
use crate::widgets::{self, WidgetKind};

/// Mobile viewport used by the responsive case
pub const MOBILE_VIEWPORT: (u32, u32) = (375, 667);

/// Upper bound for all widget roots to appear
pub const LOAD_BUDGET: Duration = Duration::from_secs(10);

/// Minimum similarity between two consecutive captures of an unchanged page
pub const STABLE_CAPTURE_SIMILARITY: f64 = 0.95;

const PRINT_CSS: &str = "@media screen { * { print-color-adjust: exact !important; } }\n\
    .hmg-ai-faq-accordion-content { display: block !important; }";

const DARK_MODE_CSS: &str = ":root {\n\
    --hmg-light-gray: #2D3748;\n\
    --hmg-white: #1A202C;\n\
    --hmg-dark-gray: #E2E8F0;\n\
    --hmg-medium-gray: #A0AEC0;\n\
}\n\
.hmg-ai-takeaways, .hmg-ai-faq, .hmg-ai-toc, .hmg-ai-audio {\n\
    background: #2D3748 !important;\n\
    color: #E2E8F0 !important;\n\
}";

const JS_READY: &str = "return typeof HMGAIPublic !== 'undefined' && \
    document.querySelectorAll('.hmg-ai-takeaways').length > 0;";

/// Function driving one case
pub type CaseFn = fn(&mut CaseContext<'_>) -> HarnessResult<()>;

/// A registered test case
#[derive(Clone, Copy)]
pub struct TestCase {
    pub name: &'static str,
    pub group: CaseGroup,
    pub run: CaseFn,
}

impl TestCase {
    const fn new(name: &'static str, group: CaseGroup, run: CaseFn) -> Self {
        Self { name, group, run }
    }

    /// Case-insensitive substring match on the name or group
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.to_lowercase();
        self.name.contains(&filter) || self.group.name().contains(&filter)
    }
}

impl std::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("group", &self.group)
            .finish()
    }
}

static CASES: &[TestCase] = &[
    TestCase::new("setup_wordpress_accessible", CaseGroup::Setup, setup_wordpress_accessible),
    TestCase::new("setup_admin_login", CaseGroup::Setup, setup_admin_login),
    TestCase::new("setup_screenshot_comparison", CaseGroup::Setup, setup_screenshot_comparison),
    TestCase::new("takeaways_default", CaseGroup::Takeaways, takeaways_default),
    TestCase::new("takeaways_cards", CaseGroup::Takeaways, takeaways_cards),
    TestCase::new("takeaways_numbered", CaseGroup::Takeaways, takeaways_numbered),
    TestCase::new("takeaways_highlights", CaseGroup::Takeaways, takeaways_highlights),
    TestCase::new("faq_accordion", CaseGroup::Faq, faq_accordion),
    TestCase::new("faq_list", CaseGroup::Faq, faq_list),
    TestCase::new("faq_cards", CaseGroup::Faq, faq_cards),
    TestCase::new("toc_numbered", CaseGroup::Toc, toc_numbered),
    TestCase::new("toc_horizontal", CaseGroup::Toc, toc_horizontal),
    TestCase::new("toc_minimal", CaseGroup::Toc, toc_minimal),
    TestCase::new("toc_sidebar", CaseGroup::Toc, toc_sidebar),
    TestCase::new("audio_player", CaseGroup::Audio, audio_player),
    TestCase::new("audio_compact", CaseGroup::Audio, audio_compact),
    TestCase::new("audio_minimal", CaseGroup::Audio, audio_minimal),
    TestCase::new("audio_card", CaseGroup::Audio, audio_card),
    TestCase::new("responsive_mobile", CaseGroup::CrossCutting, responsive_mobile),
    TestCase::new("keyboard_navigation", CaseGroup::CrossCutting, keyboard_navigation),
    TestCase::new("print_styles", CaseGroup::CrossCutting, print_styles),
    TestCase::new("dark_mode", CaseGroup::CrossCutting, dark_mode),
    TestCase::new("load_performance", CaseGroup::CrossCutting, load_performance),
    TestCase::new("all_components", CaseGroup::CrossCutting, all_components),
    TestCase::new("brand_palette", CaseGroup::Brand, brand_palette),
    TestCase::new("brand_typography", CaseGroup::Brand, brand_typography),
    TestCase::new("brand_buttons", CaseGroup::Brand, brand_buttons),
    TestCase::new("brand_logos", CaseGroup::Brand, brand_logos),
];

/// Every registered case in execution order
pub fn all_cases() -> &'static [TestCase] {
    CASES
}

/// Cases selected by an optional filter
pub fn select_cases(filter: Option<&str>) -> Vec<&'static TestCase> {
    match filter {
        Some(f) if !f.trim().is_empty() => CASES.iter().filter(|c| c.matches(f.trim())).collect(),
        _ => CASES.iter().collect(),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn find_all_in(browser: &BrowserSession, root: &Element, selector: &str) -> HarnessResult<Vec<Element>> {
    Ok(browser.find_all_in(root, &By::css(selector))?)
}

fn require_at_least(items: &[Element], min: usize, what: &str) -> HarnessResult<()> {
    ensure(
        items.len() >= min,
        format!("expected at least {} {}, found {}", min, what, items.len()),
    )
}

fn require_displayed(browser: &BrowserSession, element: &Element, what: &str) -> HarnessResult<()> {
    ensure(browser.is_displayed(element)?, format!("{} is not displayed", what))
}

fn has_class(browser: &BrowserSession, element: &Element, class: &str) -> HarnessResult<bool> {
    let classes = browser.attr(element, "class")?.unwrap_or_default();
    Ok(classes.split_whitespace().any(|c| c == class))
}

fn aria_expanded(browser: &BrowserSession, element: &Element) -> HarnessResult<String> {
    Ok(browser.attr(element, "aria-expanded")?.unwrap_or_default())
}

/// Panel controlled by an accordion toggle
fn accordion_panel(browser: &BrowserSession, toggle: &Element) -> HarnessResult<Element> {
    let id = browser
        .attr(toggle, "aria-controls")?
        .ok_or_else(|| HarnessError::Assertion("accordion toggle has no aria-controls".to_string()))?;
    Ok(browser.find(&By::id(id))?)
}

/// Hover the first of `items`, then capture `name`
fn hover_and_capture(ctx: &mut CaseContext<'_>, items: &[Element], name: &str) -> HarnessResult<()> {
    if let Some(first) = items.first() {
        ctx.browser().hover(first)?;
        ctx.pause();
        ctx.screenshot(name)?;
    }
    Ok(())
}

// ============================================================================
// Setup
// ============================================================================

fn setup_wordpress_accessible(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let url = ctx.wordpress().settings().url.clone();
    let browser = ctx.browser();
    browser.goto(&url)?;
    browser.wait_until("WordPress front page", browser.wait_timeout(), |b| {
        Ok(b.title()?.contains("WordPress") || b.page_source()?.contains("wp-content"))
    })?;

    let path = ctx.screenshot("wordpress_homepage")?;
    ensure(path.exists(), "homepage screenshot was not written")
}

fn setup_admin_login(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let browser = ctx.browser();
    ctx.wordpress().login_to_admin(browser)?;

    let url = browser.current_url()?;
    ensure(url.contains("wp-admin"), format!("not in wp-admin after login: {}", url))?;
    let admin_bar = browser.wait_for(&By::id("wpadminbar"))?;
    require_displayed(browser, &admin_bar, "admin bar")?;

    ctx.screenshot("admin_dashboard")?;
    Ok(())
}

fn setup_screenshot_comparison(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;
    ctx.pause();

    let first = ctx.screenshot("comparison_test_1")?;
    let second = ctx.screenshot("comparison_test_2")?;

    let result = compare_screenshots(&first, &second, None);
    info!(similarity = result.similarity, "consecutive capture similarity");
    ensure(
        result.similarity > STABLE_CAPTURE_SIMILARITY,
        format!(
            "consecutive captures should be nearly identical, got {:.3} ({})",
            result.similarity, result.detail
        ),
    )
}

// ============================================================================
// Takeaways
// ============================================================================

fn takeaways_default(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Takeaways.style_selector("default"))?;
    ctx.screenshot("takeaways_default")?;

    let browser = ctx.browser();
    require_displayed(browser, &root, "takeaways block")?;

    let title = browser.find_in(&root, &By::css(".hmg-ai-takeaways-title"))?;
    let title = browser.text(&title)?;
    ensure(title.contains("Key Takeaways"), format!("unexpected title '{}'", title))?;

    let items = find_all_in(browser, &root, ".hmg-ai-takeaway-item")?;
    require_at_least(&items, 3, "takeaway items")?;

    let branding = browser.find_in(&root, &By::css(".hmg-ai-branding"))?;
    let branding = browser.text(&branding)?;
    ensure(
        branding.contains("Haley Marketing AI"),
        format!("branding text missing: '{}'", branding),
    )?;

    hover_and_capture(ctx, &items, "takeaways_default_hover")
}

fn takeaways_cards(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Takeaways.style_selector("cards"))?;
    ctx.screenshot("takeaways_cards")?;

    let browser = ctx.browser();
    let grid = browser.find_in(&root, &By::css(".hmg-ai-takeaways-grid"))?;
    require_displayed(browser, &grid, "takeaways grid")?;

    let cards = find_all_in(browser, &root, ".hmg-ai-takeaway-card")?;
    require_at_least(&cards, 3, "takeaway cards")?;

    for (i, card) in cards.iter().enumerate() {
        let number = browser.find_in(card, &By::css(".hmg-ai-card-number"))?;
        let text = browser.text(&number)?;
        ensure(
            text.trim() == (i + 1).to_string(),
            format!("card {} is numbered '{}'", i + 1, text),
        )?;
    }

    hover_and_capture(ctx, &cards, "takeaways_cards_hover")
}

fn takeaways_numbered(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Takeaways.style_selector("numbered"))?;
    ctx.screenshot("takeaways_numbered")?;

    let browser = ctx.browser();
    let items = find_all_in(browser, &root, ".hmg-ai-takeaway-item")?;
    require_at_least(&items, 3, "numbered takeaway items")?;
    for item in &items {
        require_displayed(browser, item, "numbered takeaway item")?;
    }
    Ok(())
}

fn takeaways_highlights(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Takeaways.style_selector("highlights"))?;
    ctx.screenshot("takeaways_highlights")?;

    let browser = ctx.browser();
    let highlights = find_all_in(browser, &root, ".hmg-ai-highlight-item")?;
    require_at_least(&highlights, 3, "highlight items")?;
    for highlight in &highlights {
        let marker = browser.find_in(highlight, &By::css(".hmg-ai-highlight-marker"))?;
        let content = browser.find_in(highlight, &By::css(".hmg-ai-highlight-content"))?;
        require_displayed(browser, &marker, "highlight marker")?;
        require_displayed(browser, &content, "highlight content")?;
    }
    Ok(())
}

// ============================================================================
// FAQ
// ============================================================================

fn faq_accordion(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Faq.style_selector("accordion"))?;
    ctx.screenshot("faq_accordion_initial")?;

    let toggles = find_all_in(ctx.browser(), &root, "[data-hmg-faq-toggle]")?;
    require_at_least(&toggles, 3, "accordion toggles")?;

    {
        let browser = ctx.browser();
        let first = &toggles[0];
        let first_panel = accordion_panel(browser, first)?;
        ensure(
            aria_expanded(browser, first)? == "true",
            "first accordion item should start expanded",
        )?;
        ensure(
            has_class(browser, &first_panel, "hmg-ai-active")?,
            "first accordion panel should carry hmg-ai-active",
        )?;

        browser.click(first)?;
    }
    ctx.pause();
    ctx.screenshot("faq_accordion_collapsed")?;

    {
        let browser = ctx.browser();
        let first = &toggles[0];
        let first_panel = accordion_panel(browser, first)?;
        ensure(
            aria_expanded(browser, first)? == "false",
            "first accordion item should collapse on click",
        )?;
        ensure(
            !has_class(browser, &first_panel, "hmg-ai-active")?,
            "collapsed panel still carries hmg-ai-active",
        )?;

        browser.click(&toggles[1])?;
    }
    ctx.pause();
    ctx.screenshot("faq_accordion_second_expanded")?;

    ensure(
        aria_expanded(ctx.browser(), &toggles[1])? == "true",
        "second accordion item should expand on click",
    )
}

fn faq_list(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Faq.style_selector("list"))?;
    ctx.screenshot("faq_list")?;

    let browser = ctx.browser();
    let items = find_all_in(browser, &root, ".hmg-ai-faq-item")?;
    require_at_least(&items, 3, "FAQ list items")?;
    for item in &items {
        let question = browser.find_in(item, &By::css(".hmg-ai-faq-question h4"))?;
        let answer = browser.find_in(item, &By::css(".hmg-ai-faq-answer"))?;
        require_displayed(browser, &question, "FAQ question")?;
        require_displayed(browser, &answer, "FAQ answer")?;
        ensure(!browser.text(&question)?.trim().is_empty(), "FAQ question is empty")?;
        ensure(!browser.text(&answer)?.trim().is_empty(), "FAQ answer is empty")?;
    }
    Ok(())
}

fn faq_cards(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Faq.style_selector("cards"))?;
    ctx.screenshot("faq_cards")?;

    let cards = find_all_in(ctx.browser(), &root, ".hmg-ai-faq-card")?;
    require_at_least(&cards, 3, "FAQ cards")?;

    {
        let browser = ctx.browser();
        for card in &cards {
            let icon = browser.find_in(card, &By::css(".hmg-ai-faq-card-icon"))?;
            let icon = browser.text(&icon)?;
            ensure(icon.trim() == "Q", format!("FAQ card icon reads '{}'", icon))?;
        }
    }

    hover_and_capture(ctx, &cards, "faq_cards_hover")
}

// ============================================================================
// Table of contents
// ============================================================================

fn toc_numbered(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Toc.style_selector("numbered"))?;
    ctx.screenshot("toc_numbered")?;

    let links = find_all_in(ctx.browser(), &root, "[data-hmg-smooth-scroll]")?;
    require_at_least(&links, 5, "TOC links")?;

    let target = {
        let browser = ctx.browser();
        let target_id = browser
            .attr(&links[0], "data-target")?
            .ok_or_else(|| HarnessError::Assertion("TOC link has no data-target".to_string()))?;
        browser.click(&links[0])?;
        target_id
    };
    // smooth scroll
    std::thread::sleep(Duration::from_secs(1));
    ctx.screenshot("toc_numbered_after_click")?;

    let browser = ctx.browser();
    let target = browser.find(&By::id(target))?;
    require_displayed(browser, &target, "TOC target section")
}

fn toc_horizontal(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Toc.style_selector("horizontal"))?;
    ctx.screenshot("toc_horizontal")?;

    let browser = ctx.browser();
    let container = browser.find_in(&root, &By::css(".hmg-ai-toc-scroll-container"))?;
    require_displayed(browser, &container, "horizontal scroll container")?;
    let items = find_all_in(browser, &root, ".hmg-ai-toc-horizontal-item")?;
    require_at_least(&items, 5, "horizontal TOC items")?;

    hover_and_capture(ctx, &items, "toc_horizontal_hover")
}

fn toc_minimal(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Toc.style_selector("minimal"))?;
    ctx.screenshot("toc_minimal")?;

    let items = find_all_in(ctx.browser(), &root, ".hmg-ai-toc-minimal-item")?;
    require_at_least(&items, 5, "minimal TOC items")?;

    hover_and_capture(ctx, &items, "toc_minimal_hover")
}

fn toc_sidebar(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Toc.style_selector("sidebar"))?;
    ctx.screenshot("toc_sidebar")?;

    let (bar, before) = {
        let browser = ctx.browser();
        let bar = browser.find_in(&root, &By::css(".hmg-ai-toc-progress-bar"))?;
        require_displayed(browser, &bar, "progress bar")?;
        let items = find_all_in(browser, &root, ".hmg-ai-toc-sidebar-item")?;
        require_at_least(&items, 5, "sidebar TOC items")?;

        let before = browser.css_value(&bar, "width")?;
        browser.execute("window.scrollTo(0, document.body.scrollHeight / 2);", vec![])?;
        (bar, before)
    };
    ctx.pause();
    ctx.screenshot("toc_sidebar_scrolled")?;

    let after = ctx.browser().css_value(&bar, "width")?;
    debug!(before = %before, after = %after, "progress bar width");
    ensure(after != "0px", "progress bar has no width after scrolling")?;
    if let (Some(before), Some(after)) = (parse_px(&before), parse_px(&after)) {
        ensure(
            after > before,
            format!("progress bar did not advance ({}px -> {}px)", before, after),
        )?;
    }
    Ok(())
}

/// Numeric value of a CSS pixel length such as `"12.5px"`
fn parse_px(value: &str) -> Option<f64> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

// ============================================================================
// Audio
// ============================================================================

fn audio_player(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Audio.style_selector("player"))?;
    ctx.screenshot("audio_player")?;

    let speed = {
        let browser = ctx.browser();
        let audio = browser.find_in(&root, &By::css(".hmg-ai-audio-element"))?;
        require_displayed(browser, &audio, "audio element")?;

        let speed = browser.find_in(&root, &By::css("[data-hmg-audio-speed]"))?;
        let label = browser.text(&speed)?;
        ensure(label.trim() == "1x", format!("speed button reads '{}'", label))?;
        browser.click(&speed)?;
        speed
    };
    ctx.pause();
    ctx.screenshot("audio_player_speed_changed")?;

    let label = ctx.browser().text(&speed)?;
    debug!(label = %label, "speed after click");
    Ok(())
}

fn audio_compact(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Audio.style_selector("compact"))?;
    ctx.screenshot("audio_compact")?;

    let browser = ctx.browser();
    let info = browser.find_in(&root, &By::css(".hmg-ai-audio-info"))?;
    require_displayed(browser, &info, "compact audio info")?;
    let title = browser.find_in(&root, &By::css(".hmg-ai-audio-track-title"))?;
    ensure(!browser.text(&title)?.trim().is_empty(), "track title is empty")
}

fn audio_minimal(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Audio.style_selector("minimal"))?;
    ctx.screenshot("audio_minimal")?;

    {
        let browser = ctx.browser();
        let toggle = browser.find_in(&root, &By::css("[data-hmg-audio-toggle]"))?;
        require_displayed(browser, &toggle, "play button")?;
        let progress = browser.find_in(&root, &By::css("[data-hmg-audio-progress]"))?;
        require_displayed(browser, &progress, "progress bar")?;
        browser.click(&toggle)?;
    }
    ctx.pause();
    ctx.screenshot("audio_minimal_playing")?;
    Ok(())
}

fn audio_card(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let root = ctx.open_widget(&WidgetKind::Audio.style_selector("card"))?;
    ctx.screenshot("audio_card")?;

    let browser = ctx.browser();
    let header = browser.find_in(&root, &By::css(".hmg-ai-audio-card-header"))?;
    require_displayed(browser, &header, "audio card header")?;
    let actions = browser.find_in(&root, &By::css(".hmg-ai-audio-card-actions"))?;
    require_displayed(browser, &actions, "audio card actions")?;

    let download = browser.find_in(&root, &By::css(".hmg-ai-audio-download"))?;
    require_displayed(browser, &download, "download link")?;
    let label = browser.text(&download)?;
    ensure(label.contains("Download"), format!("download link reads '{}'", label))
}

// ============================================================================
// Cross-cutting
// ============================================================================

fn responsive_mobile(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let (width, height) = MOBILE_VIEWPORT;
    ctx.browser().set_window_size(width, height)?;

    let result = mobile_captures(ctx);

    let (width, height) = ctx.default_window();
    ctx.browser().set_window_size(width, height)?;
    result
}

fn mobile_captures(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_widget(&WidgetKind::Takeaways.root_selector())?;
    ctx.screenshot("mobile_takeaways")?;

    let faq = ctx.browser().find_all(&By::css(WidgetKind::Faq.root_selector()))?;
    if let Some(faq) = faq.first() {
        ctx.browser().scroll_into_view(faq)?;
        ctx.pause();
        ctx.screenshot("mobile_faq")?;
    }
    Ok(())
}

fn keyboard_navigation(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;

    let faq_toggle = ctx
        .browser()
        .wait_for(&By::css(".hmg-ai-faq [data-hmg-faq-toggle], .hmg-ai-faq button"));

    match faq_toggle {
        Ok(toggle) => {
            ctx.browser().click(&toggle)?;
            ctx.screenshot("accessibility_faq_focus")?;

            ctx.browser().send_keys(&toggle, KEY_TAB)?;
            std::thread::sleep(Duration::from_millis(300));
            ctx.screenshot("accessibility_tab_navigation")?;
            Ok(())
        }
        Err(BrowserError::Timeout { .. }) => {
            debug!("no FAQ toggle, falling back to TOC keyboard navigation");
            let link = ctx.browser().find(&By::css(".hmg-ai-toc a"))?;
            ctx.browser().click(&link)?;
            ctx.pause();
            ctx.screenshot("accessibility_toc_keyboard")?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_styles(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;
    ctx.browser().inject_style(PRINT_CSS)?;
    ctx.screenshot("print_view_simulation")?;

    let browser = ctx.browser();
    let contents = browser.find_all(&By::css(".hmg-ai-faq-accordion-content"))?;
    for content in &contents {
        require_displayed(browser, content, "accordion content in print view")?;
    }
    Ok(())
}

fn dark_mode(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;
    ctx.browser().inject_style(DARK_MODE_CSS)?;
    ctx.pause();

    ctx.focus_widget(&WidgetKind::Takeaways.root_selector())?;
    ctx.screenshot("dark_mode_takeaways")?;

    ctx.focus_widget(&WidgetKind::Faq.root_selector())?;
    ctx.screenshot("dark_mode_faq")?;
    Ok(())
}

fn load_performance(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    let start = Instant::now();
    ctx.open_page()?;
    for selector in widgets::root_selectors() {
        ctx.browser().wait_for(&By::css(selector))?;
    }
    let elapsed = start.elapsed();
    info!(elapsed_ms = elapsed.as_millis() as u64, "all widget roots present");
    ensure(
        elapsed < LOAD_BUDGET,
        format!("page loaded too slowly: {:.2}s", elapsed.as_secs_f64()),
    )?;

    ctx.screenshot("performance_all_components_loaded")?;

    let ready = ctx.browser().execute(JS_READY, vec![])?;
    ensure(
        ready == Value::Bool(true),
        "widget scripts not initialised (HMGAIPublic missing)",
    )
}

fn all_components(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;
    ctx.pause();
    ctx.screenshot("all_shortcodes_overview")?;

    let mut found = Vec::new();
    for kind in WidgetKind::ALL {
        let elements = ctx.browser().find_all(&By::css(kind.root_selector()))?;
        if let Some(first) = elements.first() {
            ctx.browser().scroll_into_view(first)?;
            ctx.pause();
            ctx.screenshot(&format!("component_{}", kind.slug()))?;
            found.push(kind.slug());
        }
    }

    info!(url = %ctx.page().url, found = ?found, "widget components present");
    ensure(!found.is_empty(), "no shortcode widgets found on page")
}

// ============================================================================
// Brand
// ============================================================================

/// Viewports checked for readable widget typography
const BRAND_VIEWPORTS: [(&str, u32, u32); 3] = [("desktop", 1920, 1080), ("tablet", 768, 1024), ("mobile", 375, 667)];

const JS_RECT: &str = "var r = arguments[0].getBoundingClientRect(); var s = window.devicePixelRatio || 1;\
    return [r.left * s, r.top * s, r.width * s, r.height * s];";

const JS_WIDGET_FONTS: &str = "return Array.prototype.slice.call(document.querySelectorAll(\"[class*='hmg-ai-']\"))\
    .filter(function (el) { return el.getClientRects().length > 0; })\
    .map(function (el) { return [String(el.className), window.getComputedStyle(el).fontSize]; });";

const JS_WIDGET_BUTTONS: &str = "return Array.prototype.slice.call(document.querySelectorAll(\"[class*='hmg-ai-'] button\"))\
    .filter(function (el) { return el.getClientRects().length > 0; })\
    .map(function (el) { var s = window.getComputedStyle(el);\
        return [el.textContent.trim(), s.backgroundColor, s.color, s.borderRadius, s.transitionDuration]; });";

const JS_LOGO_WIDTHS: &str = "return Array.prototype.slice.call(document.querySelectorAll(\
    \"img[src*='logo'], img[alt*='Haley'], img[alt*='HMG']\"))\
    .filter(function (img) { return img.getClientRects().length > 0; })\
    .map(function (img) { return [img.getAttribute('src') || '', img.getBoundingClientRect().width]; });";

/// Computed style of a widget button
#[derive(Debug, Clone, PartialEq)]
struct ButtonStyle {
    label: String,
    background: Option<Rgb<u8>>,
    color: Option<Rgb<u8>>,
    radius: String,
    transition: String,
}

fn button_styles(rows: &Value) -> Vec<ButtonStyle> {
    let text = |row: &Value, i: usize| row.get(i).and_then(Value::as_str).unwrap_or_default().to_string();
    rows.as_array()
        .map(|rows| {
            rows.iter()
                .map(|row| ButtonStyle {
                    label: text(row, 0),
                    background: brand::parse_css_color(&text(row, 1)),
                    color: brand::parse_css_color(&text(row, 2)),
                    radius: text(row, 3),
                    transition: text(row, 4),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `(class, font size in px)` rows returned by `JS_WIDGET_FONTS`
fn class_font_sizes(rows: &Value) -> Vec<(String, f64)> {
    rows.as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    let class = row.get(0)?.as_str()?;
                    let size = parse_px(row.get(1)?.as_str()?)?;
                    Some((class.to_string(), size))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Clip a `[left, top, width, height]` rectangle to a `width` x `height` capture
fn clip_region(rect: &Value, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let values: Vec<f64> = rect.as_array()?.iter().map(Value::as_f64).collect::<Option<_>>()?;
    let &[left, top, w, h] = values.as_slice() else {
        return None;
    };
    let x0 = left.max(0.0).floor();
    let y0 = top.max(0.0).floor();
    let x1 = (left + w).min(f64::from(width)).ceil();
    let y1 = (top + h).min(f64::from(height)).ceil();
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

fn brand_palette(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;

    let mut sampled = 0;
    let mut off_brand = Vec::new();
    for kind in WidgetKind::ALL {
        let roots = ctx.browser().find_all(&By::css(kind.root_selector()))?;
        let Some(root) = roots.first() else {
            continue;
        };
        let rect = {
            let browser = ctx.browser();
            browser.scroll_into_view(root)?;
            browser.execute_on(JS_RECT, root)?
        };
        ctx.pause();

        let path = ctx.screenshot(&format!("brand_palette_{}", kind.slug()))?;
        let capture = image::open(&path).map_err(SnapshotError::from)?.to_rgb8();
        let Some((x, y, width, height)) = clip_region(&rect, capture.width(), capture.height()) else {
            debug!(widget = kind.slug(), "widget outside the viewport");
            continue;
        };
        let region = imageops::crop_imm(&capture, x, y, width, height).to_image();
        sampled += 1;

        for entry in brand::off_brand_colors(&region) {
            let (nearest, distance) = brand::nearest_brand_color(entry.color);
            off_brand.push(format!(
                "{} {} ({:.1}% of samples, {:.0} from {})",
                kind.slug(),
                brand::to_hex(entry.color),
                entry.share * 100.0,
                distance,
                nearest
            ));
        }
    }

    ensure(sampled > 0, "no widget could be sampled for colors")?;
    ensure(off_brand.is_empty(), format!("off-brand colors: {}", off_brand.join(", ")))
}

fn brand_typography(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    for (viewport, width, height) in BRAND_VIEWPORTS {
        ctx.browser().set_window_size(width, height)?;
        ctx.open_page()?;
        ctx.browser().wait_for(&By::css(WidgetKind::Takeaways.root_selector()))?;

        let sizes = class_font_sizes(&ctx.browser().execute(JS_WIDGET_FONTS, vec![])?);
        ensure(!sizes.is_empty(), format!("no visible widget elements at {}", viewport))?;
        debug!(viewport, elements = sizes.len(), "widget font sizes");

        if viewport == "mobile" {
            let small: Vec<String> = sizes
                .iter()
                .filter(|(_, px)| *px < brand::MIN_MOBILE_FONT_PX)
                .map(|(class, px)| format!("{} ({}px)", class, px))
                .collect();
            ensure(small.is_empty(), format!("font too small on mobile: {}", small.join(", ")))?;
        }
        ctx.screenshot(&format!("brand_compliance_{}", viewport))?;
    }
    Ok(())
}

fn brand_buttons(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_widget(&WidgetKind::Audio.root_selector())?;

    let styles = button_styles(&ctx.browser().execute(JS_WIDGET_BUTTONS, vec![])?);
    let filled: Vec<&ButtonStyle> = styles.iter().filter(|b| b.background.is_some()).collect();
    ensure(!filled.is_empty(), "no filled widget buttons found")?;

    let mut problems = Vec::new();
    for button in &filled {
        debug!(label = %button.label, radius = %button.radius, transition = %button.transition, "button style");
        if !brand::is_rounded(&button.radius) {
            problems.push(format!("'{}' has square corners ({})", button.label, button.radius));
        }
        let on_brand = [button.background, button.color]
            .into_iter()
            .flatten()
            .any(|c| brand::is_brand_color(c, brand::COLOR_TOLERANCE));
        if !on_brand {
            problems.push(format!("'{}' uses no brand color", button.label));
        }
        if !brand::has_transition(&button.transition) {
            problems.push(format!("'{}' has no hover transition", button.label));
        }
    }

    let buttons = ctx.browser().find_all(&By::css(".hmg-ai-audio button"))?;
    hover_and_capture(ctx, &buttons, "brand_button_hover")?;
    ensure(problems.is_empty(), format!("button styling: {}", problems.join("; ")))
}

fn brand_logos(ctx: &mut CaseContext<'_>) -> HarnessResult<()> {
    ctx.open_page()?;

    let logos = ctx.browser().execute(JS_LOGO_WIDTHS, vec![])?;
    let logos = logos.as_array().cloned().unwrap_or_default();
    info!(count = logos.len(), "logos on page");

    for logo in &logos {
        let src = logo.get(0).and_then(Value::as_str).unwrap_or_default();
        let width = logo.get(1).and_then(Value::as_f64).unwrap_or_default();
        ensure(
            width >= brand::MIN_LOGO_WIDTH_PX,
            format!("logo {} is {:.0}px wide", src, width),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_catalogue_names_are_unique() {
        let names: HashSet<_> = all_cases().iter().map(|c| c.name).collect();
        assert_eq!(names.len(), all_cases().len());
    }

    #[test]
    fn test_every_widget_style_has_a_case() {
        for kind in WidgetKind::ALL {
            for style in kind.styles() {
                let name = format!("{}_{}", kind.slug(), style);
                assert!(all_cases().iter().any(|c| c.name == name), "no case for {}", name);
            }
        }
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("12.5px"), Some(12.5));
        assert_eq!(parse_px("0px"), Some(0.0));
        assert_eq!(parse_px("auto"), None);
    }

    #[test]
    fn test_filter_by_name_and_group() {
        let faq: Vec<_> = select_cases(Some("faq")).iter().map(|c| c.name).collect();
        assert_eq!(faq, vec!["faq_accordion", "faq_list", "faq_cards"]);

        let names: Vec<_> = select_cases(Some("SETUP")).iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec!["setup_wordpress_accessible", "setup_admin_login", "setup_screenshot_comparison"]
        );

        assert_eq!(select_cases(Some("cross")).len(), 6);

        let brand: Vec<_> = select_cases(Some("brand")).iter().map(|c| c.name).collect();
        assert_eq!(brand, vec!["brand_palette", "brand_typography", "brand_buttons", "brand_logos"]);
        assert_eq!(select_cases(None).len(), all_cases().len());
        assert_eq!(select_cases(Some("  ")).len(), all_cases().len());
        assert!(select_cases(Some("carousel")).is_empty());
    }

    #[test]
    fn test_clip_region() {
        let rect = serde_json::json!([10.4, -20.0, 100.0, 50.0]);
        assert_eq!(clip_region(&rect, 1920, 1080), Some((10, 0, 101, 30)));

        let overflow = serde_json::json!([1900.0, 1000.0, 100.0, 200.0]);
        assert_eq!(clip_region(&overflow, 1920, 1080), Some((1900, 1000, 20, 80)));

        let below = serde_json::json!([0.0, 1200.0, 100.0, 50.0]);
        assert_eq!(clip_region(&below, 1920, 1080), None);
        assert_eq!(clip_region(&serde_json::json!([1, 2, 3]), 1920, 1080), None);
        assert_eq!(clip_region(&Value::Null, 1920, 1080), None);
    }

    #[test]
    fn test_class_font_sizes() {
        let rows = serde_json::json!([
            ["hmg-ai-takeaways hmg-ai-takeaways-default", "16px"],
            ["hmg-ai-branding", "14px"],
            ["hmg-ai-broken", "inherit"]
        ]);
        assert_eq!(
            class_font_sizes(&rows),
            vec![
                ("hmg-ai-takeaways hmg-ai-takeaways-default".to_string(), 16.0),
                ("hmg-ai-branding".to_string(), 14.0)
            ]
        );
    }

    #[test]
    fn test_button_styles() {
        let rows = serde_json::json!([
            ["1x", "rgb(51, 42, 134)", "rgb(255, 255, 255)", "6px", "0.2s"],
            ["What is this?", "rgba(0, 0, 0, 0)", "rgb(33, 67, 87)", "0px", "0s"]
        ]);
        let styles = button_styles(&rows);
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].background, Some(Rgb([51, 42, 134])));
        assert!(brand::is_rounded(&styles[0].radius));
        assert!(brand::has_transition(&styles[0].transition));
        assert_eq!(styles[1].background, None);
        assert_eq!(styles[1].color, Some(Rgb([33, 67, 87])));
    }
}
