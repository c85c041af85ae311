//! HTML fragment rendering for the discussion UI.
//!
//! Comment and reply creation endpoints return a rendered fragment next
//! to the structured node, so the page can splice the new node into the
//! tree without a reload.

use lectio_core::ThreadNode;

/// Escape text for safe interpolation into HTML.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render one thread node as an HTML fragment.
///
/// Root nodes get the `thread-node` class, nested ones additionally get
/// `thread-node--nested` so the stylesheet can indent them.
pub fn render_node(node: &ThreadNode) -> String {
    let nested_class = if node.parent_id.is_some() {
        " thread-node--nested"
    } else {
        ""
    };

    let mut extras = String::new();
    if let Some(ref url) = node.image_url {
        extras.push_str(&format!(
            r#"<img class="thread-node__image" src="{}" alt="">"#,
            html_escape(url)
        ));
    }
    if let Some(ref url) = node.attachment_url {
        extras.push_str(&format!(
            r#"<a class="thread-node__attachment" href="{}">attachment</a>"#,
            html_escape(url)
        ));
    }

    format!(
        r#"<article class="thread-node{nested}" data-node-id="{id}" data-author-id="{author}">
  <div class="thread-node__body">{body}</div>
  {extras}<time class="thread-node__time" datetime="{ts}">{ts}</time>
</article>"#,
        nested = nested_class,
        id = node.id,
        author = node.author_id,
        body = html_escape(&node.body),
        extras = extras,
        ts = node.created_at.to_rfc3339(),
    )
}

/// Render a list of nodes as one fragment, in the order given.
pub fn render_nodes(nodes: &[ThreadNode]) -> String {
    nodes.iter().map(render_node).collect::<Vec<_>>().join("\n")
}
