//! Page selection grammar for partial jobs.

/// Parse a selection like `"1,3-5"` into sorted 0-indexed page numbers.
///
/// User input is 1-indexed. Duplicates collapse, whitespace around
/// numbers is tolerated, and every page must exist in a document of
/// `page_count` pages.
pub fn parse_page_range(input: &str, page_count: usize) -> Result<Vec<usize>, String> {
    let mut pages = Vec::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_page_number(start, page_count)?;
                let end = parse_page_number(end, page_count)?;
                if end < start {
                    return Err(format!("invalid range: {}-{} is backwards", start, end));
                }
                pages.extend((start..=end).map(|p| p - 1));
            }
            None => {
                let page = parse_page_number(part, page_count)?;
                pages.push(page - 1);
            }
        }
    }

    pages.sort_unstable();
    pages.dedup();
    Ok(pages)
}

fn parse_page_number(text: &str, page_count: usize) -> Result<usize, String> {
    let page: usize = text
        .trim()
        .parse()
        .map_err(|_| format!("invalid page number: '{}'", text.trim()))?;
    if page == 0 {
        return Err("page 0 is invalid (pages start at 1)".to_string());
    }
    if page > page_count {
        return Err(format!(
            "page {page} exceeds document page count ({page_count})"
        ));
    }
    Ok(page)
}
