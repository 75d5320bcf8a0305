//! HTML page assembly.
//!
//! One fixed page shell: header with the site title, breadcrumb line,
//! navigation menu, content, footer. Menu hrefs are emitted relative to
//! the page being rendered so the site works from `file://` as well as
//! any mount point.

use mdsite_links::{parent_dir, relative_from};
use mdsite_tree::NavItem;

/// Everything the shell needs for one page.
#[derive(Debug)]
pub struct PageContext<'a> {
    /// Page title for `<title>` and the content header.
    pub title: &'a str,
    /// Site-wide title for the masthead.
    pub site_title: &'a str,
    /// Breadcrumb display string.
    pub breadcrumb: &'a str,
    /// This page's site-relative output path.
    pub output_path: &'a str,
    /// Navigation tree with the active trail marked.
    pub nav: &'a [NavItem],
    /// Rendered body fragment.
    pub body: &'a str,
}

/// Assemble a complete HTML page.
#[must_use]
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let nav = nav_html(ctx.nav, parent_dir(ctx.output_path));
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} - {site_title}</title>
</head>
<body>
<header><strong>{site_title}</strong></header>
<p class="breadcrumb">{breadcrumb}</p>
<nav>
{nav}</nav>
<main>
{body}</main>
<footer>Generated by mdsite</footer>
</body>
</html>
"#,
        title = escape(ctx.title),
        site_title = escape(ctx.site_title),
        breadcrumb = escape(ctx.breadcrumb),
        body = ctx.body,
    )
}

/// Render the navigation tree as nested lists, hrefs relative to
/// `current_dir`.
fn nav_html(items: &[NavItem], current_dir: &str) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul>\n");
    for item in items {
        let class = if item.active { r#" class="active""# } else { "" };
        let href = relative_from(current_dir, &item.href);
        out.push_str(&format!(
            "<li{class}><a href=\"{href}\">{}</a>",
            escape(&item.title)
        ));
        if !item.children.is_empty() {
            out.push('\n');
            out.push_str(&nav_html(&item.children, current_dir));
        }
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_page_contains_all_sections() {
        let nav = vec![NavItem {
            title: "Guide".to_owned(),
            href: "guide/index.html".to_owned(),
            active: true,
            children: Vec::new(),
        }];
        let page = render_page(&PageContext {
            title: "Setup",
            site_title: "Acme Docs",
            breadcrumb: "Acme Docs › Guide",
            output_path: "guide/setup.html",
            nav: &nav,
            body: "<p>hello</p>",
        });

        assert!(page.contains("<title>Setup - Acme Docs</title>"));
        assert!(page.contains("Acme Docs › Guide"));
        assert!(page.contains("<p>hello</p>"));
        // Nav href relative to guide/.
        assert!(page.contains(r#"<a href="index.html">Guide</a>"#));
        assert!(page.contains(r#"class="active""#));
    }

    #[test]
    fn test_titles_are_escaped() {
        let page = render_page(&PageContext {
            title: "Tags & <Attributes>",
            site_title: "Docs",
            breadcrumb: "",
            output_path: "index.html",
            nav: &[],
            body: "",
        });
        assert!(page.contains("Tags &amp; &lt;Attributes&gt;"));
    }

    #[test]
    fn test_nested_nav() {
        let nav = vec![NavItem {
            title: "Guide".to_owned(),
            href: "guide/index.html".to_owned(),
            active: false,
            children: vec![NavItem {
                title: "Setup".to_owned(),
                href: "guide/setup.html".to_owned(),
                active: false,
                children: Vec::new(),
            }],
        }];
        let html = nav_html(&nav, "");
        assert_eq!(
            html,
            "<ul>\n<li><a href=\"guide/index.html\">Guide</a>\n<ul>\n<li><a href=\"guide/setup.html\">Setup</a></li>\n</ul>\n</li>\n</ul>\n"
        );
    }
}
