use crate::error::{Error, Result};

/// One click on a page thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    pub page: u32,
    /// Range modifier (shift) held at click time.
    pub extend_range: bool,
}

impl Click {
    pub fn plain(page: u32) -> Self {
        Click {
            page,
            extend_range: false,
        }
    }

    pub fn range(page: u32) -> Self {
        Click {
            page,
            extend_range: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageRef {
    Number(u32),
    End,
}

impl PageRef {
    fn resolve(&self, token: &str, total_pages: u32) -> Result<u32> {
        let page = match self {
            PageRef::Number(n) => *n,
            PageRef::End => total_pages,
        };

        if page == 0 {
            return Err(invalid(token, "page numbers start at 1"));
        }
        if page > total_pages {
            return Err(Error::PageOutOfRange {
                page,
                total: total_pages,
            });
        }
        Ok(page)
    }
}

fn parse_page_ref(token: &str, s: &str) -> Result<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(PageRef::End)
    } else {
        s.parse::<u32>()
            .map(PageRef::Number)
            .map_err(|_| invalid(token, &format!("{:?} is not a page number", s)))
    }
}

fn invalid(token: &str, reason: &str) -> Error {
    Error::InvalidClick {
        token: token.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a single click token: "5", "+5", "2-7", "3-end".
fn parse_token(token: &str, total_pages: u32) -> Result<Vec<Click>> {
    if let Some(rest) = token.strip_prefix('+') {
        let page = parse_page_ref(token, rest)?.resolve(token, total_pages)?;
        return Ok(vec![Click::range(page)]);
    }

    if let Some(dash_pos) = token.find('-') {
        // "-5" is not a range
        if dash_pos == 0 {
            return Err(invalid(token, "range is missing its first page"));
        }

        let start = parse_page_ref(token, &token[..dash_pos])?.resolve(token, total_pages)?;
        let end = parse_page_ref(token, &token[dash_pos + 1..])?.resolve(token, total_pages)?;
        return Ok(vec![Click::plain(start), Click::range(end)]);
    }

    let page = parse_page_ref(token, token)?.resolve(token, total_pages)?;
    Ok(vec![Click::plain(page)])
}

/// Parse a click script like "1-5,+9 12" into the clicks it stands for.
///
/// Tokens are separated by commas or whitespace. `N` is a plain click, `+N` a
/// range click, and `A-B` a plain click on `A` followed by a range click on `B`.
pub fn parse_clicks(s: &str, total_pages: u32) -> Result<Vec<Click>> {
    let mut clicks = Vec::new();
    for token in s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        clicks.extend(parse_token(token, total_pages)?);
    }

    if clicks.is_empty() {
        return Err(invalid(s, "no pages given"));
    }
    Ok(clicks)
}
