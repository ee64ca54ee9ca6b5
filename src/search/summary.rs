/// Human-readable line describing the current page.
///
/// An empty query shows `empty_label`. A total that fits in one page is
/// shown as a plain count; otherwise the visible window is spelled out.
pub fn summarize(
    query: &str,
    total: usize,
    page_size: usize,
    offset: usize,
    empty_label: &str,
) -> String {
    if query.is_empty() {
        return empty_label.to_string();
    }
    if total < page_size {
        return format!("{total} albums");
    }
    let last = (offset + page_size).min(total);
    format!("{} to {last} of {total} albums", offset + 1)
}
