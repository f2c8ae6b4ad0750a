//! Parse/serialize round trips and address stability over realistic pages

use pagewright_markup::{address_of, parse, resolve, serialize};

const LANDING: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="light">
<head>
  <meta charset="utf-8">
  <title>Acme &mdash; Home</title>
  <style>.hero > h1 { color: red; }</style>
</head>
<body class="page">
  <header class="site-header">
    <nav class="navbar"><a href="/">Home</a><a href="/pricing">Pricing</a><a href="/blog">Blog</a></nav>
  </header>
  <main>
    <section id="hero" class="hero"><h1>Build faster</h1><p>Ship <em>today</em>.</p><button disabled>Start</button></section>
    <section><h2>Features</h2><ul><li>One</li><li>Two</li><li>Three</li></ul></section>
    <section><h2>Pricing</h2><img src="/p.png" alt="pricing"><br></section>
  </main>
  <!-- footer -->
  <footer><p>&copy; 2024 Acme</p></footer>
  <script>document.querySelectorAll("a").forEach(a => a.dataset.x = "<b>");</script>
</body>
</html>"#;

#[test]
fn test_serialize_parse_is_structurally_stable() {
    let first = parse(LANDING);
    let serialized = serialize(&first);
    let second = parse(&serialized);

    assert!(first.structurally_eq(&second));
    // A second pass is byte-stable
    assert_eq!(serialize(&second), serialized);
}

#[test]
fn test_well_formed_source_is_reproduced_exactly() {
    assert_eq!(serialize(&parse(LANDING)), LANDING);
}

#[test]
fn test_root_attributes_survive() {
    let dom = parse(&serialize(&parse(LANDING)));
    let html = dom.find_first("html").unwrap();
    assert_eq!(dom.attr(html, "lang"), Some("en"));
    assert_eq!(dom.attr(html, "data-theme"), Some("light"));
}

#[test]
fn test_address_stability_for_all_elements() {
    let dom = parse(LANDING);
    for element in dom.elements() {
        let address = address_of(&dom, element).expect("attached element has an address");
        assert_eq!(resolve(&dom, &address), Some(element), "address {}", address);
    }
}

#[test]
fn test_addresses_agree_across_independent_parses() {
    // Two parties parsing the same string compute identical addresses
    let ours = parse(LANDING);
    let theirs = parse(LANDING);

    for (a, b) in ours.elements().into_iter().zip(theirs.elements()) {
        assert_eq!(address_of(&ours, a), address_of(&theirs, b));
    }
}
