use foodgram_domain::pagination::PageRequest;
use sea_orm::{
    EntityTrait, QuerySelect, Select,
    sea_query::{Expr, Func, IntoColumnRef, SimpleExpr},
};

pub trait SelectPage {
    /// Apply `LIMIT`/`OFFSET` for a clamped page request.
    fn paged(self, page: PageRequest) -> Self;
}

impl<E> SelectPage for Select<E>
where
    E: EntityTrait,
{
    fn paged(self, page: PageRequest) -> Self {
        let page = page.clamped();
        self.offset(page.offset()).limit(u64::from(page.limit))
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside `LIKE`.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `LOWER(col) LIKE 'prefix%'` with the prefix lowercased and escaped.
pub fn starts_with_ci<C: IntoColumnRef>(col: C, prefix: &str) -> SimpleExpr {
    let pattern = format!("{}%", escape_like(&prefix.to_lowercase()));
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}
