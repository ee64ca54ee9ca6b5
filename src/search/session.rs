use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::SearchSettings;
use crate::error::GatewayError;
use crate::gateway::{CommandGateway, RequestCounter, RequestId, SearchRequest};
use crate::library::{AlbumId, ResultItem, SearchPage};

use super::summary::summarize;

/// The page currently on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
    pub total_record_count: usize,
    pub offset: usize,
    /// Always the id of a row in `items`, or `None`.
    pub focused_id: Option<AlbumId>,
}

impl ResultSet {
    fn from_page(page: SearchPage, offset: usize) -> Self {
        let focused_id = page.items.first().map(|item| item.id.clone());
        Self {
            items: page.items,
            total_record_count: page.total_record_count,
            offset,
            focused_id,
        }
    }

    pub fn position(&self, id: &AlbumId) -> Option<usize> {
        self.items.iter().position(|item| item.id == *id)
    }

    pub fn get(&self, id: &AlbumId) -> Option<&ResultItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    pub fn focused_index(&self) -> Option<usize> {
        self.focused_id.as_ref().and_then(|id| self.position(id))
    }

    pub fn focused_item(&self) -> Option<&ResultItem> {
        self.focused_index().map(|i| &self.items[i])
    }
}

#[derive(Debug)]
struct InFlight {
    request: RequestId,
    query: String,
    offset: usize,
}

pub struct SearchSession {
    gateway: Arc<dyn CommandGateway>,
    requests: RequestCounter,

    query: String,
    online: bool,
    page_size: usize,
    empty_label: String,

    offset: usize,
    results: Option<ResultSet>,
    summary: String,
    in_flight: Option<InFlight>,
    last_error: Option<GatewayError>,
}

impl SearchSession {
    pub fn new(
        gateway: Arc<dyn CommandGateway>,
        requests: RequestCounter,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            gateway,
            requests,
            query: String::new(),
            online: settings.start_online,
            page_size: settings.page_size.max(1),
            empty_label: settings.recently_added_label.clone(),
            offset: 0,
            results: None,
            summary: String::new(),
            in_flight: None,
            last_error: None,
        }
    }

    /// Ask the backend for the page at `offset`.
    ///
    /// Only the most recently issued search is applied when replies come
    /// back; earlier ones are dropped.
    pub fn execute_search(&mut self, offset: usize) -> Result<RequestId, GatewayError> {
        let request = self.requests.next_id();
        let query = SearchRequest {
            query: self.query.clone(),
            limit: self.page_size,
            offset,
            online: self.online,
        };
        debug!(%request, query = %query.query, offset, online = self.online, "searching");

        if let Err(e) = self.gateway.search(request, query) {
            warn!(error = %e, "search not sent");
            self.last_error = Some(e.clone());
            return Err(e);
        }

        self.in_flight = Some(InFlight {
            request,
            query: self.query.clone(),
            offset,
        });
        Ok(request)
    }

    /// Apply a search reply. Returns false when it was stale.
    pub fn apply_reply(
        &mut self,
        request: RequestId,
        result: Result<SearchPage, GatewayError>,
    ) -> bool {
        let Some(pending) = self.in_flight.take_if(|p| p.request == request) else {
            debug!(%request, "dropping stale search reply");
            return false;
        };

        match result {
            Ok(page) => {
                self.summary = summarize(
                    &pending.query,
                    page.total_record_count,
                    self.page_size,
                    pending.offset,
                    &self.empty_label,
                );
                info!(
                    %request,
                    items = page.items.len(),
                    total = page.total_record_count,
                    "search results"
                );
                self.results = Some(ResultSet::from_page(page, pending.offset));
                self.offset = pending.offset;
                self.last_error = None;
            }
            Err(e) => {
                warn!(%request, error = %e, "search failed");
                self.last_error = Some(e);
            }
        }
        true
    }

    /// Optimistically update one row.
    ///
    /// With `remove` the row is dropped from the page; otherwise only its
    /// `downloaded` flag changes.
    pub fn set_downloaded(&mut self, id: &AlbumId, downloaded: bool, remove: bool) {
        let Some(results) = self.results.as_mut() else {
            return;
        };

        if remove {
            results.items.retain(|item| item.id != *id);
            if results.focused_id.as_ref() == Some(id) {
                results.focused_id = None;
            }
        } else if let Some(item) = results.items.iter_mut().find(|item| item.id == *id) {
            item.downloaded = downloaded;
        }
    }

    /// Set the focus marker. The caller is responsible for `id` being on the
    /// page.
    pub fn set_focused_album_id(&mut self, id: Option<AlbumId>) {
        if let Some(results) = self.results.as_mut() {
            results.focused_id = id;
        }
    }

    pub fn focus_next(&mut self) {
        let Some(results) = self.results.as_mut() else {
            return;
        };
        let next = match results.focused_index() {
            None => 0,
            Some(i) => i + 1,
        };
        if let Some(item) = results.items.get(next) {
            results.focused_id = Some(item.id.clone());
        }
    }

    pub fn focus_previous(&mut self) {
        let Some(results) = self.results.as_mut() else {
            return;
        };
        if let Some(i) = results.focused_index().filter(|i| *i > 0) {
            results.focused_id = Some(results.items[i - 1].id.clone());
        }
    }

    /// Switch between the remote catalog and the local library. A change
    /// searches again from the first page.
    pub fn set_online(&mut self, online: bool) -> Result<(), GatewayError> {
        if self.online == online {
            return Ok(());
        }
        info!(online, "switching search mode");
        self.online = online;
        self.execute_search(0).map(|_| ())
    }

    pub fn toggle_online(&mut self) -> Result<(), GatewayError> {
        self.set_online(!self.online)
    }

    /// Clear the focus and search from the first page.
    pub fn submit(&mut self) -> Result<(), GatewayError> {
        self.set_focused_album_id(None);
        self.execute_search(0).map(|_| ())
    }

    pub fn can_go_next(&self) -> bool {
        self.results
            .as_ref()
            .is_some_and(|r| r.items.len() >= self.page_size)
    }

    pub fn can_go_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn next_page(&mut self) -> Result<(), GatewayError> {
        if !self.can_go_next() {
            return Ok(());
        }
        self.execute_search(self.offset + self.page_size).map(|_| ())
    }

    pub fn previous_page(&mut self) -> Result<(), GatewayError> {
        if !self.can_go_previous() {
            return Ok(());
        }
        self.execute_search(self.offset.saturating_sub(self.page_size))
            .map(|_| ())
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// True while a search is waiting for its reply.
    pub fn is_searching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn results(&self) -> Option<&ResultSet> {
        self.results.as_ref()
    }

    pub fn focused_id(&self) -> Option<&AlbumId> {
        self.results.as_ref().and_then(|r| r.focused_id.as_ref())
    }

    pub fn focused_item(&self) -> Option<&ResultItem> {
        self.results.as_ref().and_then(ResultSet::focused_item)
    }

    pub fn item(&self, id: &AlbumId) -> Option<&ResultItem> {
        self.results.as_ref().and_then(|r| r.get(id))
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }
}
