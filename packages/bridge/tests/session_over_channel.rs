use pagewright_bridge::{
    channel, serve, strip_instrumentation, Controller, ControllerMessage, Realm,
};
use pagewright_editor::EditSession;
use pagewright_markup::Address;

async fn reload(realm: &mut Realm, endpoint: &mut pagewright_bridge::RealmEndpoint) {
    match endpoint.recv().await {
        Some(Ok(message @ ControllerMessage::LoadDocument { .. })) => realm.handle(message),
        other => panic!("expected a load-document, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gestures_round_trip_through_controller() {
    let session = EditSession::load(
        "<body><h1>Old</h1><section id=\"a\">A</section><section id=\"b\">B</section></body>",
    );
    let (controller_end, mut realm_end) = channel(8);
    let handle = tokio::spawn(serve(Controller::new(session), controller_end));

    let mut realm = Realm::new();
    reload(&mut realm, &mut realm_end).await;

    // Inline text edit
    let h1 = realm.find(&Address::new("body > h1")).unwrap();
    assert!(realm.begin_text_edit(h1));
    let edited = realm.commit_text("Hello").unwrap();
    realm_end.send(&edited).await.unwrap();
    reload(&mut realm, &mut realm_end).await;
    assert_eq!(
        strip_instrumentation(&realm.html()),
        "<body><h1>Hello</h1><section id=\"a\">A</section><section id=\"b\">B</section></body>"
    );

    // Unknown messages are dropped without a reply
    realm_end
        .send_raw(r#"{"type":"navigate","url":"https://example.com"}"#)
        .await
        .unwrap();

    // Section drag reports the whole document
    let b = realm.find(&Address::new("#b")).unwrap();
    let reordered = realm.reorder_section(b, 0).unwrap();
    realm_end.send(&reordered).await.unwrap();
    reload(&mut realm, &mut realm_end).await;

    // Deleting a stale address leaves the document alone
    realm_end
        .send(&pagewright_bridge::RealmMessage::DeleteElement {
            address: Address::new("body > aside"),
        })
        .await
        .unwrap();
    reload(&mut realm, &mut realm_end).await;

    drop(realm_end);
    let controller = handle.await.unwrap();
    let session = controller.into_session();

    assert_eq!(
        session.source(),
        "<body><section id=\"b\">B</section><h1>Hello</h1><section id=\"a\">A</section></body>"
    );
    assert_eq!(session.version(), 2);
}

#[tokio::test]
async fn test_realm_that_never_reads_does_not_stall_the_controller() {
    let (controller_end, mut realm_end) = channel(2);
    let handle = tokio::spawn(serve(
        Controller::new(EditSession::load("<body><p>x</p></body>")),
        controller_end,
    ));

    // Every stale delete asks for a resync the realm never reads
    for _ in 0..20 {
        let sent = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            realm_end.send(&pagewright_bridge::RealmMessage::DeleteElement {
                address: Address::new("body > aside"),
            }),
        )
        .await;
        assert!(matches!(sent, Ok(Ok(()))));
    }

    let mut realm = Realm::new();
    reload(&mut realm, &mut realm_end).await;

    drop(realm_end);
    let controller = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(controller.session().source(), "<body><p>x</p></body>");
}
