use std::sync::Arc;

use super::*;
use crate::config::SearchSettings;
use crate::error::GatewayError;
use crate::gateway::{RequestCounter, RequestId};
use crate::library::AlbumId;
use crate::test_support::{RecordingGateway, page};

fn id(s: &str) -> AlbumId {
    AlbumId::from(s)
}

fn settings(page_size: usize) -> SearchSettings {
    SearchSettings {
        page_size,
        ..SearchSettings::default()
    }
}

fn session(page_size: usize) -> (SearchSession, RecordingGateway) {
    let gateway = RecordingGateway::default();
    let search = SearchSession::new(
        Arc::new(gateway.clone()),
        RequestCounter::default(),
        &settings(page_size),
    );
    (search, gateway)
}

/// Session showing a page with rows `ids`.
fn loaded(ids: &[&str], page_size: usize) -> (SearchSession, RecordingGateway) {
    let (mut search, gateway) = session(page_size);
    let request = search.execute_search(0).unwrap();
    search.apply_reply(request, Ok(page(ids, ids.len(), 0)));
    (search, gateway)
}

#[test]
fn summary_strings() {
    assert_eq!(summarize("", 120, 50, 0, "recently added"), "recently added");
    assert_eq!(summarize("abc", 10, 50, 0, "recently added"), "10 albums");
    assert_eq!(
        summarize("abc", 120, 50, 50, "recently added"),
        "51 to 100 of 120 albums"
    );
    assert_eq!(
        summarize("abc", 120, 50, 100, "recently added"),
        "101 to 120 of 120 albums"
    );
}

#[test]
fn execute_search_sends_query_and_marks_searching() {
    let (mut search, gateway) = session(50);
    search.set_query("blue");

    let request = search.execute_search(100).unwrap();

    assert!(search.is_searching());
    let sent = gateway.searches();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, request);
    assert_eq!(sent[0].1.query, "blue");
    assert_eq!(sent[0].1.limit, 50);
    assert_eq!(sent[0].1.offset, 100);
    assert!(!sent[0].1.online);
}

#[test]
fn reply_replaces_results_and_focuses_first_row() {
    let (mut search, _gateway) = session(2);
    search.set_query("abc");
    let request = search.execute_search(2).unwrap();

    assert!(search.apply_reply(request, Ok(page(&["a", "b"], 7, 2))));

    assert!(!search.is_searching());
    let results = search.results().unwrap();
    assert_eq!(results.items.len(), 2);
    assert_eq!(results.offset, 2);
    assert_eq!(search.offset(), 2);
    assert_eq!(search.focused_id(), Some(&id("a")));
    assert_eq!(search.summary(), "3 to 4 of 7 albums");
}

#[test]
fn empty_page_has_no_focus() {
    let (search, _gateway) = loaded(&[], 50);
    assert_eq!(search.focused_id(), None);
    assert!(search.results().unwrap().items.is_empty());
}

#[test]
fn empty_query_uses_recently_added_label() {
    let (search, _gateway) = loaded(&["a"], 50);
    assert_eq!(search.summary(), "recently added");
}

#[test]
fn stale_reply_is_discarded() {
    let (mut search, _gateway) = session(50);
    search.set_query("slow");
    let first = search.execute_search(0).unwrap();
    search.set_query("fast");
    let second = search.execute_search(0).unwrap();

    assert!(search.apply_reply(second, Ok(page(&["fast"], 1, 0))));
    assert!(!search.apply_reply(first, Ok(page(&["slow"], 1, 0))));

    assert_eq!(search.focused_id(), Some(&id("fast")));
    assert_eq!(search.summary(), "1 albums");
}

#[test]
fn reply_for_superseded_request_keeps_searching_flag() {
    let (mut search, _gateway) = session(50);
    let first = search.execute_search(0).unwrap();
    search.execute_search(0).unwrap();

    search.apply_reply(first, Ok(page(&["a"], 1, 0)));

    assert!(search.is_searching());
    assert!(search.results().is_none());
}

#[test]
fn failed_search_leaves_prior_results() {
    let (mut search, _gateway) = loaded(&["a", "b"], 50);
    let request = search.execute_search(0).unwrap();

    search.apply_reply(
        request,
        Err(GatewayError::Rejected {
            command: "search",
            message: "offline".into(),
        }),
    );

    assert!(!search.is_searching());
    assert_eq!(search.results().unwrap().items.len(), 2);
    assert!(search.last_error().is_some());
}

#[test]
fn unsent_search_reports_error_and_is_not_pending() {
    let (mut search, gateway) = session(50);
    gateway.set_disconnected(true);

    assert_eq!(search.execute_search(0), Err(GatewayError::Disconnected));
    assert!(!search.is_searching());
    assert_eq!(search.last_error(), Some(&GatewayError::Disconnected));
}

#[test]
fn flag_flip_keeps_row() {
    let (mut search, _gateway) = loaded(&["a", "b"], 50);

    search.set_downloaded(&id("a"), true, false);
    assert!(search.item(&id("a")).unwrap().downloaded);
    search.set_downloaded(&id("a"), false, false);

    let item = search.item(&id("a")).unwrap();
    assert!(!item.downloaded);
    assert_eq!(search.results().unwrap().items.len(), 2);
}

#[test]
fn remove_drops_exactly_one_row() {
    let (mut search, _gateway) = loaded(&["a", "b", "c"], 50);
    search.set_downloaded(&id("b"), false, false);

    search.set_downloaded(&id("b"), true, true);

    let ids: Vec<&str> = search
        .results()
        .unwrap()
        .items
        .iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn removing_focused_row_clears_focus() {
    let (mut search, _gateway) = loaded(&["a", "b"], 50);
    assert_eq!(search.focused_id(), Some(&id("a")));

    search.set_downloaded(&id("a"), false, true);

    assert_eq!(search.focused_id(), None);
}

#[test]
fn focus_moves_without_wrapping() {
    let (mut search, _gateway) = loaded(&["a", "b", "c"], 50);

    search.focus_previous();
    assert_eq!(search.focused_id(), Some(&id("a")));

    search.focus_next();
    search.focus_next();
    assert_eq!(search.focused_id(), Some(&id("c")));
    search.focus_next();
    assert_eq!(search.focused_id(), Some(&id("c")));

    search.focus_previous();
    assert_eq!(search.focused_id(), Some(&id("b")));
}

#[test]
fn focus_next_without_focus_picks_first_row() {
    let (mut search, _gateway) = loaded(&["a", "b"], 50);
    search.set_focused_album_id(None);

    search.focus_previous();
    assert_eq!(search.focused_id(), None);

    search.focus_next();
    assert_eq!(search.focused_id(), Some(&id("a")));
}

#[test]
fn set_focused_album_id_is_direct() {
    let (mut search, _gateway) = loaded(&["a", "b"], 50);
    search.set_focused_album_id(Some(id("b")));
    assert_eq!(search.focused_item().unwrap().id, id("b"));
}

#[test]
fn mode_change_searches_again_from_start() {
    let (mut search, gateway) = session(2);
    let request = search.execute_search(4).unwrap();
    search.apply_reply(request, Ok(page(&["a", "b"], 9, 4)));

    search.set_online(false).unwrap();
    assert_eq!(gateway.searches().len(), 1);

    search.toggle_online().unwrap();

    let sent = gateway.searches();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1.offset, 0);
    assert!(sent[1].1.online);
    assert!(search.is_online());
}

#[test]
fn short_page_disables_next() {
    let (mut search, gateway) = loaded(&["a"], 2);
    assert!(!search.can_go_next());
    assert!(!search.can_go_previous());

    search.next_page().unwrap();
    search.previous_page().unwrap();
    assert_eq!(gateway.searches().len(), 1);
}

#[test]
fn full_page_enables_next_even_when_total_disagrees() {
    let (mut search, _gateway) = session(2);
    let request = search.execute_search(0).unwrap();
    search.apply_reply(request, Ok(page(&["a", "b"], 2, 0)));

    assert!(search.can_go_next());
}

#[test]
fn paging_moves_by_page_size() {
    let (mut search, gateway) = loaded(&["a", "b"], 2);

    search.next_page().unwrap();
    let (request, sent) = gateway.searches().pop().unwrap();
    assert_eq!(sent.offset, 2);
    search.apply_reply(request, Ok(page(&["c", "d"], 6, 2)));
    assert!(search.can_go_previous());

    search.previous_page().unwrap();
    assert_eq!(gateway.searches().last().unwrap().1.offset, 0);
}

#[test]
fn submit_clears_focus_and_restarts() {
    let (mut search, gateway) = loaded(&["a", "b"], 50);
    search.push_query_char('x');
    search.push_query_char('y');
    search.pop_query_char();

    search.submit().unwrap();

    assert_eq!(search.focused_id(), None);
    let (request, sent) = gateway.searches().pop().unwrap();
    assert_eq!(sent.query, "x");
    assert_eq!(sent.offset, 0);
    assert!(request > RequestId::new(1));
}
