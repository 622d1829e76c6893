//! Model output is Markdown; the page shows it as sanitized HTML.

use pulldown_cmark::{html, Options, Parser};

/// Render Markdown to HTML and strip anything that is not plain formatting.
///
/// Raw HTML in the input goes through the same allow-list, so `<script>`
/// and event-handler attributes never reach the page.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let mut unsafe_html = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut unsafe_html, Parser::new_ext(text, options));
    ammonia::clean(&unsafe_html)
}
