use ecofusion::sanitize::{parse_message_text, sanitize_text, sanitize_text_input};

#[test]
fn test_script_tags_never_survive() {
    for input in [
        "<script>alert('x')</script>",
        "<<script>>",
        "\"><svg/onload=alert(1)>",
    ] {
        let escaped = sanitize_text(input);
        assert!(!escaped.contains('<'), "{escaped}");
        assert!(!escaped.contains('>'), "{escaped}");

        let rendered = parse_message_text(input);
        assert!(!rendered.contains("<script"), "{rendered}");
        assert!(!rendered.contains("<svg"), "{rendered}");
    }
}

#[test]
fn test_bold_and_link_together() {
    let html = parse_message_text("**hi** http://evil");
    assert!(html.starts_with("<strong>hi</strong> "));
    assert!(html.contains("<a href=\"http:&#x2F;&#x2F;evil\""));
    assert!(html.contains("rel=\"noopener noreferrer\""));

    // An unparseable token is left as escaped text.
    let html = parse_message_text("**hi** http://exa mple");
    assert!(html.starts_with("<strong>hi</strong> "));
    let html = parse_message_text("**hi** https://[::1");
    assert!(!html.contains("<a "));
}

#[test]
fn test_quotes_cannot_break_out_of_href() {
    let html = parse_message_text("https://example.com/\"onmouseover=\"alert(1)");
    assert!(!html.contains("\"onmouseover"));
    assert!(html.contains("&quot;onmouseover=&quot;"));
}

#[test]
fn test_multi_line_message() {
    assert_eq!(
        parse_message_text("Services:\n*AI* and `IoT`"),
        "Services:<br /><em>AI</em> and <code>IoT</code>"
    );
}

#[test]
fn test_text_input_is_trimmed_truncated_and_stripped() {
    assert_eq!(sanitize_text_input("  <b>hello</b>  ", 1000), "bhello/b");
    assert_eq!(sanitize_text_input("abcdef", 3), "abc");
    // Truncation counts characters, not bytes.
    assert_eq!(sanitize_text_input("ééééé", 2), "éé");
    assert_eq!(sanitize_text_input("   ", 10), "");
}
