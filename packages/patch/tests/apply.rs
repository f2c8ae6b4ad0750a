use pagewright_markup::{parse, resolve_str, Dom};
use pagewright_patch::{apply_patch, parse_patch, Operation, Patch, PatchBuffer};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="light">
<head><title>Studio</title></head>
<body class="home">
  <header><nav><a href="/">Home</a><a href="/work">Work</a></nav></header>
  <section id="s1">Old</section>
  <section id="s2"><p>Keep</p></section>
  <footer><p>&copy; Studio</p></footer>
</body>
</html>"#;

fn body_element_count(dom: &Dom) -> usize {
    dom.element_children(dom.body()).len()
}

#[test]
fn modify_replaces_only_the_matching_section() {
    let before = parse(PAGE);
    let patch = parse_patch(
        "MESSAGE: Reworded the intro\n---\nOPERATION: modify\n---\n<section id=\"s1\">New</section>",
    )
    .unwrap();

    let applied = apply_patch(PAGE, &patch, None).unwrap();
    let after = parse(&applied.document);

    let s1 = resolve_str(&after, "#s1").unwrap();
    assert_eq!(after.text_content(s1), "New");
    assert_eq!(body_element_count(&after), body_element_count(&before));
    assert_eq!(applied.region, "<section id=\"s1\">New</section>");
}

#[test]
fn modify_preserves_doctype_and_root_attributes() {
    let patch = Patch::new(Operation::Modify, "<section id=\"s2\"><p>Changed</p></section>");
    let applied = apply_patch(PAGE, &patch, None).unwrap();

    assert!(applied.document.starts_with("<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"light\">"));
    assert!(applied.document.contains("<body class=\"home\">"));
    assert!(applied.document.contains("&copy; Studio"));
}

#[test]
fn add_lands_before_footer() {
    let patch = Patch::new(Operation::Add, "<section id=\"s3\">Pricing</section>");
    let applied = apply_patch(PAGE, &patch, None).unwrap();
    let dom = parse(&applied.document);

    let tags: Vec<_> = dom
        .element_children(dom.body())
        .into_iter()
        .filter_map(|id| dom.tag_name(id).map(str::to_string))
        .collect();
    assert_eq!(tags, ["header", "section", "section", "section", "footer"]);
    assert_eq!(dom.attr(dom.element_children(dom.body())[3], "id"), Some("s3"));
}

#[test]
fn replace_all_is_idempotent() {
    let payload = "<!DOCTYPE html><html><body><main>Fresh</main></body></html>";
    let patch = Patch::replace_all(payload);

    let once = apply_patch(PAGE, &patch, None).unwrap();
    let twice = apply_patch(&once.document, &patch, None).unwrap();
    assert_eq!(once.document, payload);
    assert_eq!(twice.document, payload);
}

#[test]
fn streamed_buffer_applies_like_a_whole_response() {
    let response = "MESSAGE: Added a gallery\n---\nOPERATION: add\n---\n```html\n<section class=\"gallery\"></section>\n```";
    let mut buffer = PatchBuffer::new();
    for chunk in response.as_bytes().chunks(7) {
        buffer.push(std::str::from_utf8(chunk).unwrap());
        // Previews never panic on arbitrary cut points
        let _ = buffer.preview();
    }

    let patch = buffer.finish().unwrap();
    assert_eq!(patch, parse_patch(response).unwrap());
    let applied = apply_patch(PAGE, &patch, None).unwrap();
    assert!(applied
        .document
        .contains("<section class=\"gallery\"></section><footer>"));
}
