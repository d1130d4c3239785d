// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_html_content(size: usize) -> String {
    let base = "<section class=\"card\">\n  <h2>Title</h2>\n  <p>Paragraph with <b>bold</b> and <a href=\"#\">a link</a>.</p>\n  <ul>\n    <li>One</li><li>Two</li><li>Three</li>\n  </ul>\n  <img src=\"pic.png\" alt=\"\">\n</section>\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_nested_html(depth: usize) -> String {
    let mut content = String::new();
    for level in 0..depth {
        content.push_str(&"  ".repeat(level));
        content.push_str("<div>\n");
    }
    content.push_str(&"  ".repeat(depth));
    content.push_str("<p>Deepest</p>\n");
    for level in (0..depth).rev() {
        content.push_str(&"  ".repeat(level));
        content.push_str("</div>\n");
    }
    content
}
