use std::collections::HashMap;

/// Per-column substring filters, combined conjunctively into the
/// composed query's predicate. Setting an empty value removes the entry.
#[derive(Debug, Clone, Default)]
pub struct SearchTerms {
    terms: HashMap<String, String>,
}

impl SearchTerms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, value: &str) {
        if value.is_empty() {
            self.terms.remove(column);
        } else {
            self.terms.insert(column.to_string(), value.to_string());
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.terms.get(column).map(|s| s.as_str())
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

/// A composed statement plus the parameters to bind, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedQuery {
    pub sql: String,
    pub params: Vec<String>,
}

/// Builds the single SELECT for the chosen table. Filter values travel as
/// bound `LIKE` patterns, never interpolated into the SQL text, and the
/// predicate order follows `columns` (the table's declaration order), so
/// the same terms always compose the same statement.
pub fn compose(table: &str, columns: &[String], terms: &SearchTerms) -> ComposedQuery {
    let mut sql = format!("SELECT * FROM {}", quote_ident(table));
    let mut params = Vec::new();
    let mut predicates = Vec::new();

    for column in columns {
        if let Some(term) = terms.get(column) {
            params.push(format!("%{}%", escape_like(term)));
            predicates.push(format!(
                "{} LIKE ?{} ESCAPE '\\'",
                quote_ident(column),
                params.len()
            ));
        }
    }

    if !predicates.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&predicates.join(" AND "));
    }
    sql.push(';');

    ComposedQuery { sql, params }
}

/// Quotes an identifier unless it is already a plain one, so typical
/// names read through to the SQL text unchanged.
pub fn quote_ident(name: &str) -> String {
    let plain = !name.is_empty()
        && name
            .chars()
            .next()
            .map(|c| c.is_ascii_alphabetic() || c == '_')
            .unwrap_or(false)
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Escapes `LIKE` metacharacters so the bound pattern matches the term
/// literally as a substring.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bare_select_with_no_terms() {
        let q = compose("Album", &cols(&["AlbumId", "Title"]), &SearchTerms::new());
        assert_eq!(q.sql, "SELECT * FROM Album;");
        assert!(q.params.is_empty());
    }

    #[test]
    fn test_single_term_binds_pattern() {
        let mut terms = SearchTerms::new();
        terms.set("Title", "rock");
        let q = compose("Album", &cols(&["AlbumId", "Title"]), &terms);
        assert_eq!(
            q.sql,
            "SELECT * FROM Album WHERE Title LIKE ?1 ESCAPE '\\';"
        );
        assert_eq!(q.params, vec!["%rock%"]);
    }

    #[test]
    fn test_predicates_follow_declaration_order() {
        // Insertion order is reversed relative to the columns; the
        // composed clause order must not change.
        let mut terms = SearchTerms::new();
        terms.set("Title", "rock");
        terms.set("AlbumId", "7");
        let columns = cols(&["AlbumId", "Title", "ArtistId"]);

        let q = compose("Album", &columns, &terms);
        assert_eq!(
            q.sql,
            "SELECT * FROM Album WHERE AlbumId LIKE ?1 ESCAPE '\\' AND Title LIKE ?2 ESCAPE '\\';"
        );
        assert_eq!(q.params, vec!["%7%", "%rock%"]);
    }

    #[test]
    fn test_empty_value_is_absent() {
        let mut terms = SearchTerms::new();
        terms.set("Title", "rock");
        terms.set("Title", "");
        assert!(terms.is_empty());

        let q = compose("Album", &cols(&["Title"]), &terms);
        assert_eq!(q.sql, "SELECT * FROM Album;");
    }

    #[test]
    fn test_like_metacharacters_are_escaped() {
        let mut terms = SearchTerms::new();
        terms.set("Title", "50%_off\\now");
        let q = compose("Album", &cols(&["Title"]), &terms);
        assert_eq!(q.params, vec!["%50\\%\\_off\\\\now%"]);
    }

    #[test]
    fn test_quotes_in_terms_never_reach_the_sql_text() {
        let mut terms = SearchTerms::new();
        terms.set("Title", "O'Brien' OR '1'='1");
        let q = compose("Album", &cols(&["Title"]), &terms);
        assert_eq!(
            q.sql,
            "SELECT * FROM Album WHERE Title LIKE ?1 ESCAPE '\\';"
        );
        assert_eq!(q.params, vec!["%O'Brien' OR '1'='1%"]);
    }

    #[test]
    fn test_non_plain_identifiers_are_quoted() {
        assert_eq!(quote_ident("Album"), "Album");
        assert_eq!(quote_ident("play list"), "\"play list\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
        assert_eq!(quote_ident("2fast"), "\"2fast\"");

        let q = compose("play list", &cols(&[]), &SearchTerms::new());
        assert_eq!(q.sql, "SELECT * FROM \"play list\";");
    }
}
