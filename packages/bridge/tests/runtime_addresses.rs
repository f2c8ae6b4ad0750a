//! The surface runtime must address elements exactly like the controller.
//! These tests run its address walk in an embedded JS engine against a
//! minimal DOM built from the instrumented tree.

use boa_engine::{Context, Source};
use pagewright_bridge::{canonical_address, instrument, RUNTIME_SCRIPT};
use pagewright_markup::{parse, resolve, Address, Dom, NodeId};
use serde_json::{json, Map, Value};

const PAGE: &str = r#"<!DOCTYPE html><html><head><title>t</title><script>boot()</script></head><body>
<header id="top"><nav><a href="/">Home</a><a href="/a">A</a></nav></header>
<section class="hero"><h1>One</h1><p>a</p><p>b<span>c</span></p></section>
<section><div id="dup">1</div><div id="dup">2</div><div id="with space">3</div></section>
<ul><li>x<li>y<li><p>z</p></ul>
<table><tr><td>1<td id="cell">2</table>
<footer><p>&copy; 2026</p></footer>
<script>track()</script>
</body></html>"#;

const SHIM: &str = r#"
globalThis.window = globalThis;
globalThis.__nodes = [];
function __build(spec, parent) {
  var node = {
    nodeType: spec.tag === null ? 9 : 1,
    tagName: spec.tag === null ? undefined : spec.tag.toUpperCase(),
    parentNode: parent,
    children: [],
    attributes: spec.attrs,
    getAttribute: function (name) {
      return Object.prototype.hasOwnProperty.call(this.attributes, name) ? this.attributes[name] : null;
    },
    hasAttribute: function (name) {
      return Object.prototype.hasOwnProperty.call(this.attributes, name);
    }
  };
  if (node.nodeType === 1) {
    __nodes.push(node);
  }
  for (var i = 0; i < spec.children.length; i++) {
    node.children.push(__build(spec.children[i], node));
  }
  return node;
}
"#;

fn tree(dom: &Dom, node: NodeId) -> Value {
    let mut attrs = Map::new();
    if let Some(element) = dom.element(node) {
        for attribute in &element.attributes {
            attrs
                .entry(attribute.name.clone())
                .or_insert_with(|| Value::String(attribute.value.clone().unwrap_or_default()));
        }
    }
    let children: Vec<Value> = dom
        .element_children(node)
        .into_iter()
        .map(|child| tree(dom, child))
        .collect();
    json!({
        "tag": dom.tag_name(node),
        "attrs": attrs,
        "children": children,
    })
}

fn eval(context: &mut Context, source: &str) -> String {
    let value = context.eval(Source::from_bytes(source.as_bytes())).unwrap();
    value.to_string(context).unwrap().to_std_string_escaped()
}

/// Load `dom` into a fresh engine running the surface runtime
fn engine(dom: &Dom) -> Context {
    let mut context = Context::default();
    eval(&mut context, SHIM);
    eval(&mut context, RUNTIME_SCRIPT);
    eval(
        &mut context,
        &format!("globalThis.__root = __build({}, null); 'ok'", tree(dom, dom.root())),
    );
    context
}

#[test]
fn test_runtime_addresses_match_controller() {
    let dom = parse(&instrument(PAGE, Some(&Address::new("#top"))));
    let mut context = engine(&dom);

    let from_runtime: Vec<Option<String>> = serde_json::from_str(&eval(
        &mut context,
        "JSON.stringify(__nodes.map(function (n) { return __pagewright.addressOf(n); }))",
    ))
    .unwrap();
    let from_controller: Vec<Option<String>> = dom
        .elements()
        .into_iter()
        .map(|node| canonical_address(&dom, node).map(|a| a.as_str().to_string()))
        .collect();

    assert_eq!(from_runtime.len(), from_controller.len());
    assert_eq!(from_runtime, from_controller);
    assert!(from_runtime.contains(&Some("#cell".to_string())));
    assert!(from_runtime.contains(&Some(
        "html > body > section:nth-of-type(2) > div:nth-of-type(3)".to_string()
    )));
    assert!(from_runtime.contains(&Some("html > body > script".to_string())));
}

#[test]
fn test_runtime_resolves_controller_addresses() {
    let dom = parse(&instrument(PAGE, None));
    let mut context = engine(&dom);
    let elements = dom.elements();

    let mut addresses: Vec<String> = elements
        .iter()
        .filter_map(|&node| canonical_address(&dom, node))
        .map(|address| address.as_str().to_string())
        .collect();
    addresses.extend(["body > main".to_string(), "html > body > ul > li:nth-of-type(9)".to_string(), "#gone".to_string()]);

    let script = format!(
        "JSON.stringify({}.map(function (a) {{ return __nodes.indexOf(__pagewright.resolve(a, __root)); }}))",
        serde_json::to_string(&addresses).unwrap()
    );
    let from_runtime: Vec<i64> = serde_json::from_str(&eval(&mut context, &script)).unwrap();
    let from_controller: Vec<i64> = addresses
        .iter()
        .map(|address| {
            resolve(&dom, &Address::new(address.as_str()))
                .and_then(|node| elements.iter().position(|&e| e == node))
                .map_or(-1, |index| index as i64)
        })
        .collect();

    assert_eq!(from_runtime, from_controller);
    assert_eq!(&from_runtime[from_runtime.len() - 3..], [-1, -1, -1]);
}
