//! Substring search patterns for `LIKE`.

use sea_orm::sea_query::LikeExpr;

const ESCAPE: char = '\\';

/// Escape `%`, `_` and the escape character so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | ESCAPE) {
            escaped.push(ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// `%term%` on the lowercased term, with an explicit `ESCAPE` clause.
pub(crate) fn contains(term: &str) -> LikeExpr {
    LikeExpr::new(format!("%{}%", escape_like(&term.to_lowercase()))).escape(ESCAPE)
}
