//! Markup Rendering
//!
//! Turns components and the optional project overview into HTML fragments,
//! assembles the recursive navigation, and wraps everything into the final
//! standalone document. All dynamic text passes through [`escape`]; the
//! document carries its own styles and interaction script so the exported
//! file works offline.

use std::collections::BTreeMap;

use crate::client::wire::DocumentationRecord;
use crate::config::SourceCodeMode;
use crate::model::path_tree::PathNode;
use crate::model::{ComponentStats, MAX_TREE_DEPTH};
use crate::types::{CodeComponent, DocRow, DocumentationJson};

/// Navigation/content anchor of the overview block
pub const OVERVIEW_ID: &str = "__overview__";

/// Escape text for use in HTML content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Wrap a rendered fragment in the hidden content block the navigation
/// script toggles.
pub fn content_block(id: &str, inner: &str) -> String {
    format!(
        "<div class=\"doc-content\" data-component-id=\"{}\" style=\"display: none;\">{}</div>\n",
        escape(id),
        inner
    )
}

// =============================================================================
// Component rendering
// =============================================================================

/// Render one component to a standalone article fragment
pub fn render_component(
    component: &CodeComponent,
    source_mode: SourceCodeMode,
    graph_base: &str,
) -> String {
    let mut out = String::new();
    out.push_str("<article class=\"doc-article\">");

    // Header: path, id, type and line range
    out.push_str("<header class=\"doc-header\">");
    out.push_str(&format!(
        "<p class=\"doc-path\">{}</p>",
        escape(&component.relative_path)
    ));
    out.push_str(&format!("<h2>{}</h2>", escape(&component.id)));
    out.push_str(&format!(
        "<p class=\"doc-meta\"><span class=\"badge\">{}</span> \
         <span class=\"badge\">lines {} &ndash; {}</span></p>",
        component.component_type, component.start_line, component.end_line
    ));
    out.push_str(&source_blocks(component, source_mode));
    out.push_str("</header>");

    if let Some(graph_url) = component
        .dependency_graph_url
        .as_deref()
        .filter(|u| !u.is_empty())
    {
        let src = format!("{}/{}", graph_base.trim_end_matches('/'), graph_url);
        out.push_str(&section(
            "Dependency Graph",
            &format!(
                "<img src=\"{}\" alt=\"Dependency graph for {}\" class=\"dep-graph\" />",
                escape(&src),
                escape(&component.id)
            ),
        ));
    }

    if let Some(doc) = component.documentation() {
        out.push_str(&render_documentation(doc));
    }

    out.push_str("</article>");
    out
}

fn source_blocks(component: &CodeComponent, mode: SourceCodeMode) -> String {
    let signature = component
        .component_signature
        .as_deref()
        .filter(|s| !s.trim().is_empty());
    let source = component
        .source_code
        .as_deref()
        .filter(|s| !s.trim().is_empty());

    let mut out = String::new();
    let (show_signature, show_source) = match mode {
        SourceCodeMode::Signature => (true, false),
        SourceCodeMode::Full => (false, true),
        SourceCodeMode::Both => (true, true),
    };
    if show_signature && let Some(text) = signature {
        out.push_str(&code_block(text));
    }
    if show_source && let Some(text) = source {
        out.push_str(&code_block(text));
    }
    out
}

fn code_block(code: &str) -> String {
    format!(
        "<div class=\"code-block\"><pre><code>{}</code></pre></div>",
        escape(code.trim())
    )
}

/// A titled section; empty bodies render nothing at all
fn section(title: &str, body: &str) -> String {
    if body.trim().is_empty() {
        return String::new();
    }
    format!(
        "<div class=\"doc-section\"><h4>{}</h4>{}</div>",
        escape(title),
        body
    )
}

fn render_documentation(doc: &DocumentationJson) -> String {
    let mut out = String::new();

    if let Some(summary) = doc.short_summary.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&format!("<p class=\"lead\">{}</p>", escape(summary)));
    }
    if let Some(extended) = doc
        .extended_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        out.push_str(&format!("<p>{}</p>", escape(extended)));
    }

    out.push_str(&section("Parameters", &doc_table(&doc.parameters, "Name", true)));
    out.push_str(&section("Returns", &doc_table(&doc.returns, "Name", true)));
    out.push_str(&section("Raises", &doc_table(&doc.raises, "Exception", false)));
    out.push_str(&section("See Also", &doc_table(&doc.see_also, "Reference", false)));

    if let Some(notes) = doc.notes.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&section("Notes", &format!("<p>{}</p>", escape(notes))));
    }
    if let Some(examples) = doc.examples.as_deref().filter(|s| !s.trim().is_empty()) {
        out.push_str(&section("Examples", &code_block(examples)));
    }

    out
}

fn doc_table(rows: &[DocRow], name_header: &str, with_type: bool) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut out = String::from("<table class=\"doc-table\"><thead><tr>");
    out.push_str(&format!("<th>{}</th>", escape(name_header)));
    if with_type {
        out.push_str("<th>Type</th>");
    }
    out.push_str("<th>Description</th></tr></thead><tbody>");

    for row in rows {
        out.push_str("<tr>");
        out.push_str(&format!(
            "<td class=\"mono\">{}</td>",
            escape(row.display_name())
        ));
        if with_type {
            out.push_str(&format!(
                "<td class=\"mono\">{}</td>",
                escape(row.row_type.as_deref().unwrap_or(""))
            ));
        }
        out.push_str(&format!(
            "<td>{}</td>",
            escape(row.description.as_deref().unwrap_or(""))
        ));
        out.push_str("</tr>");
    }

    out.push_str("</tbody></table>");
    out
}

// =============================================================================
// Overview rendering
// =============================================================================

/// Render the project overview block: headline, aggregate counts and the
/// directory structure of the analyzed repository.
pub fn render_overview(
    record: &DocumentationRecord,
    stats: &ComponentStats,
    tree: &BTreeMap<String, PathNode>,
) -> String {
    let name = record.name.as_deref().unwrap_or("Project Overview");
    let mut out = String::new();
    out.push_str("<article class=\"doc-article\">");
    out.push_str(&format!("<h2>{}</h2>", escape(name)));

    if let Some(duration) = record
        .meta_information
        .as_ref()
        .and_then(|m| m.execution_time.as_ref())
        .and_then(|t| t.formatted.as_deref())
    {
        out.push_str(&format!(
            "<p class=\"doc-meta\"><span class=\"badge\">analysis took {}</span></p>",
            escape(duration)
        ));
    }

    out.push_str(&section(
        "Statistics",
        &format!(
            "<table class=\"doc-table\"><tbody>\
             <tr><td>Total files</td><td>{}</td></tr>\
             <tr><td>Directories</td><td>{}</td></tr>\
             <tr><td>Total components</td><td>{}</td></tr>\
             <tr><td>Classes</td><td>{}</td></tr>\
             <tr><td>Functions &amp; methods</td><td>{}</td></tr>\
             </tbody></table>",
            stats.total_files,
            stats.total_folders,
            stats.total_components,
            stats.classes,
            stats.callables
        ),
    ));

    out.push_str(&section("Directory Structure", &dir_list(tree)));
    out.push_str("</article>");
    out
}

fn dir_list(nodes: &BTreeMap<String, PathNode>) -> String {
    if nodes.is_empty() {
        return String::new();
    }
    let mut out = String::from("<ul class=\"dir-tree\">");
    for (name, node) in nodes {
        match node {
            PathNode::Folder { children } => {
                out.push_str(&format!(
                    "<li class=\"dir\">{} ({} files){}</li>",
                    escape(name),
                    node.file_count(),
                    dir_list(children)
                ));
            }
            PathNode::File { .. } => {
                out.push_str(&format!("<li class=\"file\">{}</li>", escape(name)));
            }
        }
    }
    out.push_str("</ul>");
    out
}

// =============================================================================
// Navigation
// =============================================================================

/// Build the sidebar: a nested link list mirroring the component
/// hierarchy, with an "Overview" entry prepended when enabled.
pub fn nav_html(components: &[CodeComponent], include_overview: bool) -> String {
    let mut out = String::from("<ul>");
    if include_overview {
        out.push_str(&format!(
            "<li><a href=\"#{id}\" data-target-id=\"{id}\">Overview</a></li>",
            id = OVERVIEW_ID
        ));
    }
    out.push_str(&nav_entries(components, 1));
    out.push_str("</ul>");
    out
}

fn nav_entries(components: &[CodeComponent], depth: usize) -> String {
    if components.is_empty() || depth > MAX_TREE_DEPTH {
        return String::new();
    }
    let mut out = String::new();
    for component in components {
        let id = escape(&component.id);
        let children = if component.method_components.is_empty() {
            String::new()
        } else {
            format!(
                "<ul>{}</ul>",
                nav_entries(&component.method_components, depth + 1)
            )
        };
        out.push_str(&format!(
            "<li><a href=\"#{id}\" data-target-id=\"{id}\">{}</a>{}</li>",
            escape(component.short_name()),
            children
        ));
    }
    out
}

// =============================================================================
// Document assembly
// =============================================================================

/// Assemble the final standalone document
pub fn document(title: &str, nav: &str, content: &str) -> String {
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
<h1>{title}</h1>
<div class="main-container">
<aside class="sidebar"><h3>Components</h3><nav class="sidebar-menu">{nav}</nav></aside>
<main class="main-content">
{content}</main>
</div>
<footer class="doc-footer">Generated by docbridge v{version} on {date}</footer>
{script}
</body>
</html>
"#,
        title = escape(title),
        style = STYLE,
        nav = nav,
        content = content,
        version = env!("CARGO_PKG_VERSION"),
        date = chrono::Utc::now().format("%Y-%m-%d"),
        script = SCRIPT,
    )
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; padding: 1.5rem; background: #f5f5f4; color: #1c1917; }
h1 { text-align: center; }
.main-container { display: flex; gap: 1.5rem; max-width: 1400px; margin: auto; align-items: flex-start; }
.sidebar { flex-shrink: 0; width: 25%; position: sticky; top: 1.5rem; max-height: calc(100vh - 3rem); overflow-y: auto; background: #fff; border-radius: 8px; padding: 1rem; }
.sidebar-menu ul { list-style: none; padding-left: 1rem; margin: 0; }
.sidebar-menu a { display: block; padding: 0.2rem 0.4rem; color: inherit; text-decoration: none; border-radius: 4px; overflow: hidden; text-overflow: ellipsis; }
.sidebar-menu a:hover { background: #e7e5e4; }
.sidebar-menu a.active { background: #1d4ed8; color: #fff; }
.main-content { flex-grow: 1; min-width: 0; }
.doc-article { background: #fff; border-radius: 8px; padding: 1.5rem; }
.doc-header { border-bottom: 1px solid #e7e5e4; padding-bottom: 1rem; }
.doc-path { font-family: monospace; color: #78716c; font-size: 0.85rem; margin: 0; }
.doc-meta .badge { display: inline-block; background: #e7e5e4; border-radius: 9999px; padding: 0.1rem 0.6rem; font-size: 0.8rem; margin-right: 0.4rem; }
.doc-section { margin-top: 1.5rem; }
.doc-section h4 { border-bottom: 1px solid #e7e5e4; padding-bottom: 0.4rem; }
.doc-table { border-collapse: collapse; width: 100%; }
.doc-table th, .doc-table td { border: 1px solid #e7e5e4; padding: 0.4rem 0.6rem; text-align: left; }
.mono { font-family: monospace; }
.lead { font-size: 1.1rem; }
.code-block pre { background: #1c1917; color: #fafaf9; padding: 0.8rem 1rem; border-radius: 6px; overflow-x: auto; }
.dep-graph { max-width: 100%; border: 1px solid #e7e5e4; border-radius: 6px; }
.dir-tree { list-style: none; padding-left: 1rem; }
.dir-tree .dir { font-weight: 600; }
.dir-tree .file { font-weight: 400; font-family: monospace; font-size: 0.9rem; }
.doc-footer { text-align: center; color: #78716c; font-size: 0.8rem; margin-top: 2rem; }
"#;

const SCRIPT: &str = r#"<script>
document.addEventListener('DOMContentLoaded', function() {
  const links = document.querySelectorAll('.sidebar-menu a');
  const contents = document.querySelectorAll('.doc-content');
  function showContent(id) {
    contents.forEach(c => { c.style.display = 'none'; });
    links.forEach(l => { l.classList.remove('active'); });
    const contentToShow = document.querySelector(`.doc-content[data-component-id="${id}"]`);
    if (contentToShow) contentToShow.style.display = 'block';
    const activeLink = document.querySelector(`.sidebar-menu a[data-target-id="${id}"]`);
    if (activeLink) activeLink.classList.add('active');
  }
  links.forEach(link => {
    link.addEventListener('click', function(e) {
      e.preventDefault();
      const targetId = this.getAttribute('data-target-id');
      showContent(targetId);
      history.pushState(null, null, '#' + targetId);
    });
  });
  const initialHash = decodeURIComponent(window.location.hash.substring(1));
  const initialLink = document.querySelector(`.sidebar-menu a[data-target-id="${initialHash}"]`);
  if (initialLink) { showContent(initialHash); }
  else if (links.length > 0) { showContent(links[0].getAttribute('data-target-id')); }
});
</script>"#;

// =============================================================================
// Tests
// =============================================================================
