use crate::utils::error::{IndicesError, Result};
use scraper::{ElementRef, Html, Node, Selector};

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// A parsed HTML page exposing the two views the extractors rely on:
/// visible text tokens in document order, and table cells.
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }

    /// Visible text nodes in document order, trimmed, with empty ones dropped.
    pub fn text_tokens(&self) -> Vec<String> {
        self.html
            .tree
            .root()
            .descendants()
            .filter_map(|node| match node.value() {
                Node::Text(text) => Some((node, text)),
                _ => None,
            })
            .filter(|(node, _)| {
                !node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()))
                })
            })
            .map(|(_, text)| text.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    }

    /// Rows of the first `<table>` in the page, each row as its `<td>` texts.
    /// Rows without data cells (header rows) are returned empty.
    pub fn first_table_rows(&self) -> Result<Vec<Vec<String>>> {
        let table_selector = selector("table")?;
        let row_selector = selector("tr")?;
        let cell_selector = selector("td")?;

        let table = self
            .html
            .select(&table_selector)
            .next()
            .ok_or_else(|| IndicesError::extraction("no table found in the page"))?;

        Ok(table
            .select(&row_selector)
            .map(|row| row.select(&cell_selector).map(cell_text).collect())
            .collect())
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| IndicesError::extraction(format!("invalid selector {:?}: {:?}", css, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_tokens_in_document_order() {
        let doc = HtmlDocument::parse(
            r#"<html><head><title>Tasas</title><style>p { color: red; }</style></head>
            <body>
              <p>  Vigencia 02/01/2025 </p>
              <script>var fecha = "01/01/1999";</script>
              <div><span>T.N.A. (30 días)</span> = <b>36,50%</b></div>
            </body></html>"#,
        );

        assert_eq!(
            doc.text_tokens(),
            vec!["Tasas", "Vigencia 02/01/2025", "T.N.A. (30 días)", "=", "36,50%"]
        );
    }

    #[test]
    fn test_first_table_rows() {
        let doc = HtmlDocument::parse(
            r#"<table>
                 <tr><th>Variable</th><th>Fecha</th><th>Valor</th></tr>
                 <tr><td> <a href="/cer">CER</a> (Base 2.2.2002=1) </td><td>31/07/2025</td><td>4,21</td></tr>
               </table>
               <table><tr><td>ignored</td></tr></table>"#,
        );

        let rows = doc.first_table_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_empty());
        assert_eq!(rows[1], vec!["CER(Base 2.2.2002=1)", "31/07/2025", "4,21"]);
    }

    #[test]
    fn test_missing_table_is_an_extraction_error() {
        let doc = HtmlDocument::parse("<p>mantenimiento</p>");
        assert!(matches!(
            doc.first_table_rows(),
            Err(IndicesError::ExtractionError { .. })
        ));
    }
}
