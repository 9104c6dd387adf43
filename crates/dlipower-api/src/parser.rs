// Status page parser.
//
// The switch renders its outlet table in one of two shapes depending on the
// privilege of the logged-in account. Both are recovered by finding an
// anchor cell, climbing to the enclosing table, and reading every 5-cell row.

use scraper::{ElementRef, Html};
use tracing::{debug, trace};

use crate::model::{OutletRecord, OutletState};

/// Ancestor levels between an anchor cell and the table holding the rows.
const ANCHOR_DEPTH: usize = 3;

/// Cells in an outlet row: number, name, state, and two action links.
const ROW_CELLS: usize = 5;

/// Which table shape the page used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLayout {
    /// Admin view, anchored on the first `<td>1</td>`.
    Admin,
    /// Restricted-user view, anchored on the `<th>#</th>` header.
    Restricted,
    /// Neither anchor was present.
    Unrecognized,
}

impl PageLayout {
    pub fn is_admin(self) -> bool {
        self == Self::Admin
    }
}

/// Result of parsing one status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    pub layout: PageLayout,
    /// Outlets in page order. Empty means "outlets unknown".
    pub outlets: Vec<OutletRecord>,
}

impl ParsedPage {
    fn unrecognized() -> Self {
        Self {
            layout: PageLayout::Unrecognized,
            outlets: Vec::new(),
        }
    }
}

/// Extract the outlet table from a status page.
///
/// Never fails: a page without either anchor yields an empty outlet list.
pub fn parse_status(html: &str) -> ParsedPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let (layout, anchor) = if let Some(cell) = find_cell(root, "td", "1") {
        (PageLayout::Admin, cell)
    } else if let Some(cell) = find_cell(root, "th", "#") {
        debug!("admin outlet table not found, reading restricted-user layout");
        (PageLayout::Restricted, cell)
    } else {
        debug!("no outlet table anchor on status page");
        return ParsedPage::unrecognized();
    };

    let Some(table) = anchor
        .ancestors()
        .filter_map(ElementRef::wrap)
        .take(ANCHOR_DEPTH)
        .last()
    else {
        return ParsedPage::unrecognized();
    };

    let outlets: Vec<OutletRecord> = elements(table, "tr").filter_map(parse_row).collect();
    trace!(?layout, count = outlets.len(), "parsed status page");

    ParsedPage { layout, outlets }
}

fn parse_row(row: ElementRef<'_>) -> Option<OutletRecord> {
    let cells: Vec<ElementRef<'_>> = elements(row, "td").collect();
    if cells.len() != ROW_CELLS {
        return None;
    }
    let [number, name, state, ..] = cells.as_slice() else {
        return None;
    };

    let number = text_of(*number).parse::<u32>().ok().filter(|n| *n > 0)?;
    let state = elements(*state, "font")
        .next()
        .or_else(|| elements(*state, "span").next())
        .map_or_else(|| text_of(*state), text_of)
        .to_uppercase();

    Some(OutletRecord::new(
        number,
        &text_of(*name),
        OutletState::from_cell(&state),
    ))
}

/// First `tag` element whose text is exactly `text`, whitespace included.
fn find_cell<'a>(root: ElementRef<'a>, tag: &'static str, text: &str) -> Option<ElementRef<'a>> {
    elements(root, tag).find(|cell| cell.text().collect::<String>() == text)
}

/// All elements named `tag` at or below `root`, in document order.
fn elements<'a>(root: ElementRef<'a>, tag: &'static str) -> impl Iterator<Item = ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(move |el| el.value().name() == tag)
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ADMIN_PAGE: &str = r##"
        <html><body>
        <table width="100%"><tr><td>
          <table>
            <tr><td>#</td><td>Name</td><td>State</td><td colspan=2>Action</td></tr>
            <tr bgcolor="#F4F4F4">
              <td align=center>1</td>
              <td>A</td>
              <td><b><font color=green>ON</font></b></td>
              <td><a href="outlet?1=OFF">Switch OFF</a></td>
              <td><a href="outlet?1=CCL">Cycle</a></td>
            </tr>
            <tr bgcolor="#F4F4F4">
              <td align=center>2</td>
              <td>B</td>
              <td><b><font color=red>off</font></b></td>
              <td><a href="outlet?2=ON">Switch ON</a></td>
              <td><a href="outlet?2=CCL">Cycle</a></td>
            </tr>
            <tr><td colspan=5>Master control</td></tr>
          </table>
        </td></tr></table>
        </body></html>
    "##;

    const USER_PAGE: &str = r#"
        <html><body>
          <table>
            <tr><th>#</th><th>Name</th><th>State</th><th colspan=2>Action</th></tr>
            <tr>
              <td> 1 </td><td>A</td><td><font>ON</font></td>
              <td><a href="outlet?1=OFF">Switch OFF</a></td><td>-</td>
            </tr>
            <tr>
              <td> 2 </td><td>B</td><td><font>OFF</font></td>
              <td><a href="outlet?2=ON">Switch ON</a></td><td>-</td>
            </tr>
          </table>
        </body></html>
    "#;

    fn expected() -> Vec<OutletRecord> {
        vec![
            OutletRecord::new(1, "A", OutletState::On),
            OutletRecord::new(2, "B", OutletState::Off),
        ]
    }

    #[test]
    fn admin_layout_rows_in_order() {
        let page = parse_status(ADMIN_PAGE);
        assert_eq!(page.layout, PageLayout::Admin);
        assert_eq!(page.outlets, expected());
    }

    #[test]
    fn restricted_layout_uses_header_anchor() {
        let page = parse_status(USER_PAGE);
        assert_eq!(page.layout, PageLayout::Restricted);
        assert!(!page.layout.is_admin());
        assert_eq!(page.outlets, expected());
    }

    #[test]
    fn page_without_anchor_is_empty() {
        let page = parse_status("<html><body><p>Login failed</p></body></html>");
        assert_eq!(page.layout, PageLayout::Unrecognized);
        assert!(page.outlets.is_empty());

        assert!(parse_status("").outlets.is_empty());
    }

    #[test]
    fn rows_with_other_cell_counts_are_skipped() {
        let html = r"
            <table>
              <tr><td>1</td><td>Only</td><td><font>ON</font></td><td></td><td></td></tr>
              <tr><td>2</td><td>short row</td></tr>
              <tr><td>3</td><td>a</td><td>b</td><td>c</td><td>d</td><td>e</td></tr>
              <tr><td>x</td><td>bad number</td><td><font>ON</font></td><td></td><td></td></tr>
            </table>
        ";
        let page = parse_status(html);
        assert_eq!(page.outlets, vec![OutletRecord::new(1, "Only", OutletState::On)]);
    }

    #[test]
    fn blank_name_and_plain_state_cell() {
        let html = r"
            <table>
              <tr><td>1</td><td></td><td>on</td><td></td><td></td></tr>
            </table>
        ";
        let page = parse_status(html);
        assert_eq!(page.outlets, vec![OutletRecord::new(1, "1", OutletState::On)]);
    }
}
