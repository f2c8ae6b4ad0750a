//! Integration tests for the workspace crate

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use pagewright_components::{GlobalAction, Position};
use pagewright_editor::{EditorConfig, FailureKind, Mutation};
use pagewright_markup::{parse, Address};
use pagewright_workspace::{
    ComponentStore, ContentError, ContentQuery, ContentResolver, ContentService, GenerationError,
    GenerationOutcome, GenerationRequest, GenerationService, MemoryStore, Site,
};
use tokio::sync::oneshot;

const PAGE: &str = r#"<!DOCTYPE html><html lang="en"><body><header><nav><a href="/">Home</a><a href="/blog">Blog</a><a href="/about">About</a></nav></header><main><section id="s1">Old</section></main></body></html>"#;

struct Canned(Vec<&'static str>);

impl GenerationService for Canned {
    fn generate(&self, _request: &GenerationRequest) -> BoxStream<'static, Result<String, GenerationError>> {
        tokio_stream::iter(self.0.clone().into_iter().map(|chunk| Ok(chunk.to_string()))).boxed()
    }
}

struct Latest;

impl ContentService for Latest {
    fn render_entries(&self, query: &ContentQuery) -> BoxFuture<'static, Result<String, ContentError>> {
        let markup = format!("<ul data-type=\"{}\" data-limit=\"{}\"></ul>", query.content_type, query.limit);
        Box::pin(async move { Ok(markup) })
    }
}

fn site() -> Site {
    Site::new(Arc::new(MemoryStore::new()), EditorConfig::default())
}

fn header_offer(site: &Site, page: &str) -> pagewright_components::PromotionOffer {
    site.page(page)
        .unwrap()
        .plan_globals()
        .into_iter()
        .find_map(|action| match action {
            GlobalAction::Offer(offer) if offer.position == Position::Header => Some(offer),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_promotion_is_shared_across_pages() {
    let mut site = site();
    site.open_page("home", PAGE).unwrap();
    site.open_page("about", PAGE).unwrap();

    let offer = header_offer(&site, "home");
    let component = site.promote("home", &offer, "Main header").unwrap();

    assert!(site.store().get(&component.id).unwrap().is_some());
    assert!(!site.page("home").unwrap().source().contains("<header>"));

    // The other page keeps its copy until its next edit
    let about = site.page_mut("about").unwrap();
    assert!(about.source().contains("<header>"));
    let outcome = about.apply_mutation(&Mutation::SetText {
        address: Address::new("#s1"),
        text: "About us".to_string(),
    });
    assert!(outcome.is_applied());
    assert!(!about.source().contains("<header>"));
    assert_eq!(about.pipeline().history().undo_levels(), 1);

    let rendered = about.render().unwrap();
    assert_eq!(parse(&rendered).find_all("header").len(), 1);
}

#[tokio::test]
async fn test_generation_lands_as_pending_patch() {
    let mut site = site();
    site.open_page("home", PAGE).unwrap();
    let service = Canned(vec![
        "MESSAGE: Reword\n---\nOPERATION: modify\n---\n",
        "<section id=\"s1\">New</section>",
    ]);
    let (_keep, cancel) = oneshot::channel();

    let outcome = site
        .generate("home", &service, "reword the intro", cancel, |_| {})
        .await
        .unwrap();
    assert!(matches!(outcome, GenerationOutcome::Completed(_)));

    let page = site.page_mut("home").unwrap();
    assert!(page.pending_patch().is_some());
    assert_eq!(page.version(), 0);

    assert!(page.apply_pending(None).unwrap().is_applied());
    let dom = parse(page.source());
    let s1 = dom.find_by_id("s1").unwrap();
    assert_eq!(dom.text_content(s1), "New");
}

#[tokio::test]
async fn test_repeated_generation_failures_offer_retry() {
    let mut site = site();
    site.open_page("home", PAGE).unwrap();
    let service = Canned(vec!["Sorry, I can't do that."]);

    for _ in 0..2 {
        let (_keep, cancel) = oneshot::channel();
        let outcome = site.generate("home", &service, "do it", cancel, |_| {}).await.unwrap();
        assert!(matches!(outcome, GenerationOutcome::Failed { .. }));
    }

    let page = site.page("home").unwrap();
    let retry = page.retry_affordance().unwrap();
    assert_eq!(retry.kind, FailureKind::Generation);
    assert_eq!(retry.count, 2);
    assert_eq!(retry.last_raw.as_deref(), Some("Sorry, I can't do that."));
    assert_eq!(page.source(), PAGE);
}

#[tokio::test]
async fn test_render_resolves_placeholders() {
    let mut site = site();
    site.open_page(
        "blog",
        r#"<body><main>{{entries type="post" limit="5"}}</main></body>"#,
    )
    .unwrap();
    let mut content = ContentResolver::new(Arc::new(Latest), Duration::from_millis(400));

    let rendered = site.render("blog", &mut content).await.unwrap();
    assert_eq!(
        rendered,
        r#"<body><main><ul data-type="post" data-limit="5"></ul></main></body>"#
    );
    // The canonical document keeps the token
    assert!(site.page("blog").unwrap().source().contains("{{entries"));
}

#[test]
fn test_unknown_page() {
    let site = site();
    assert!(site.page("missing").is_err());
}
