//! End-to-end behavior of the embed normalization pipeline.
//!
//! Exercises the whole classify/convert/validate/sanitize chain through
//! the public API, with the kind of pasted input users actually produce.

use lectio_core::{EmbedClass, EmbedKind, EmbedNormalizer, Platform};

fn normalizer() -> EmbedNormalizer {
    EmbedNormalizer::default()
}

/// Every input lands in exactly one class; nothing panics.
#[test]
fn test_classification_is_total() {
    let n = normalizer();
    let inputs = [
        "",
        "   ",
        "plain prose about a book",
        "https://www.youtube.com/watch?v=abc",
        "https://unknown-site.test/page",
        r#"<iframe src="https://player.vimeo.com/video/1"></iframe>"#,
        "ftp://not-http.example/x",
        "https://",
        "<blockquote>bare quote</blockquote>",
    ];
    for input in inputs {
        let _ = n.classify(input);
        let _ = n.describe(input);
        let _ = n.convert(input);
        let _ = n.validate(input);
    }
}

/// Markup signatures short-circuit classification even when the string
/// also contains a recognizable platform URL.
#[test]
fn test_markup_wins_over_url() {
    let n = normalizer();
    let mixed = r#"<iframe src="https://www.youtube.com/embed/abc"></iframe>"#;
    assert_eq!(n.classify(mixed), EmbedClass::AlreadyMarkup);
    // Pass-through: conversion must not touch existing markup.
    assert_eq!(n.convert(mixed), mixed);
}

/// All four YouTube URL shapes converge on the same embed host and id.
#[test]
fn test_youtube_shapes_converge() {
    let n = normalizer();
    let shapes = [
        "https://www.youtube.com/watch?v=M7lc1UVf-VE",
        "https://youtu.be/M7lc1UVf-VE",
        "https://www.youtube.com/embed/M7lc1UVf-VE",
        "https://www.youtube.com/v/M7lc1UVf-VE",
    ];
    for shape in shapes {
        let markup = n.convert(shape);
        assert!(
            markup.contains("https://www.youtube-nocookie.com/embed/M7lc1UVf-VE"),
            "{} produced {}",
            shape,
            markup
        );
        let result = n.validate(shape);
        assert!(result.ok, "{}: {}", shape, result.error);
    }
}

/// A Canva design URL converts to the lazy-loading responsive wrapper.
#[test]
fn test_canva_url_roundtrip() {
    let n = normalizer();
    let result = n.validate("https://www.canva.com/design/ABC123/view");
    assert!(result.ok, "{}", result.error);
    assert!(result
        .cleaned
        .contains("https://www.canva.com/design/ABC123/view?embed"));
    assert!(result.cleaned.contains(r#"loading="lazy""#));
}

/// Extraction failures degrade to a comment marker that preserves the
/// original URL; they never surface as errors from convert.
#[test]
fn test_conversion_failure_preserves_input() {
    let n = normalizer();
    let failures = [
        "https://vimeo.com/notanumber",
        "https://www.canva.com/help",
        "https://www.instagram.com/someuser/",
        "https://x.com/someuser",
    ];
    for url in failures {
        let markup = n.convert(url);
        assert!(markup.starts_with("<!-- Error:"), "{} -> {}", url, markup);
        assert!(markup.contains(url), "original URL lost for {}", url);
    }
}

/// Unrecognized URLs get the warning banner plus a generic iframe, and
/// validation then rejects the iframe when its domain is off-list.
#[test]
fn test_unrecognized_url_banner_then_allowlist_rejection() {
    let n = normalizer();
    let url = "https://example.com/resource";
    let markup = n.convert(url);
    assert!(markup.contains("may not allow embeds"));
    assert!(markup.contains(&format!(r#"<a href="{url}" target="_blank">{url}</a>"#)));
    assert!(markup.contains(r#"height="500""#));

    let result = n.validate(url);
    assert!(!result.ok);
    assert_eq!(result.error, format!("disallowed domain: {}", url));
}

/// The allow-list covers every domain our own converters emit, so a
/// recognized URL can never be rejected by validation.
#[test]
fn test_own_conversions_always_validate() {
    let n = normalizer();
    let urls = [
        "https://www.canva.com/design/DAF1y2/view",
        "https://youtu.be/M7lc1UVf-VE",
        "https://vimeo.com/148751763",
        "https://docs.google.com/presentation/d/1a2B_c3/edit#slide=1",
        "https://drive.google.com/file/d/1xY-z9/view?usp=sharing",
        "https://www.instagram.com/reel/Cabc123/",
        "https://twitter.com/user/status/99887766",
    ];
    for url in urls {
        let result = n.validate(url);
        assert!(result.ok, "{} rejected: {}", url, result.error);
        assert!(!result.cleaned.is_empty());
        assert!(result.error.is_empty());
    }
}

/// Sanitization is scoped by platform: Canva loses margins and
/// attribution, Slides loses scripts, other markup is untouched.
#[test]
fn test_sanitize_is_platform_scoped() {
    let n = normalizer();

    let vimeo = r#"<iframe src="https://player.vimeo.com/video/1" width="640"></iframe>"#;
    assert_eq!(n.sanitize(vimeo), vimeo);

    let slides = concat!(
        r#"<iframe src="https://docs.google.com/presentation/d/X/embed"></iframe>"#,
        r#"<script src="https://docs.google.com/tracker.js"></script>"#,
    );
    let cleaned = n.sanitize(slides);
    assert!(!cleaned.contains("script"));
    assert!(cleaned.contains("iframe"));
}

/// A hand-pasted Canva snippet with attribution survives validation with
/// the attribution stripped.
#[test]
fn test_pasted_canva_snippet_cleaned_on_validate() {
    let n = normalizer();
    let pasted = concat!(
        r#"<div style="position: relative; margin-top: 1.6em; margin-bottom: 0.9em; padding-top: 56.2500%;">"#,
        r#"<iframe loading="lazy" src="https://www.canva.com/design/DAF/view?embed"></iframe>"#,
        r#"</div>"#,
        "\n",
        r#"<a href="https://www.canva.com/design/DAF/view" target="_blank" rel="noopener">Poster</a> de Ana"#,
    );
    let result = n.validate(pasted);
    assert!(result.ok, "{}", result.error);
    assert!(!result.cleaned.contains("margin-top"));
    assert!(!result.cleaned.contains("de Ana"));
    assert!(result.cleaned.contains("canva.com/design/DAF/view?embed"));
}

/// describe never mutates and reports the same platform names the
/// converter uses.
#[test]
fn test_describe_reports_without_converting() {
    let n = normalizer();
    let url = "https://vimeo.com/148751763";
    let before = url.to_string();
    let info = n.describe(url);
    assert_eq!(url, before);
    assert_eq!(info.kind, EmbedKind::Url);
    assert_eq!(info.platform.as_deref(), Some(Platform::Vimeo.name()));
    assert!(info.convertible);
    assert!(info.message.contains("Vimeo"));
}

/// A custom matcher table overrides the built-in one.
#[test]
fn test_injected_matcher_table() {
    let n = EmbedNormalizer::new(
        vec![("myvideo.example".to_string(), Platform::Vimeo)],
        vec!["player.vimeo.com".to_string()],
    );
    assert_eq!(
        n.classify("https://myvideo.example/watch/1"),
        EmbedClass::RecognizedPlatformUrl(Platform::Vimeo)
    );
    // Built-in domains are gone from the injected table.
    assert_eq!(
        n.classify("https://www.youtube.com/watch?v=abc"),
        EmbedClass::UnrecognizedUrl
    );
}
