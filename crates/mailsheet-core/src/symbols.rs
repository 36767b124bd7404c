//! Literal placeholder substitution.

use mailsheet_model::SymbolTable;

/// Replaces every token of `symbols` found in `template` with its value.
///
/// Replacement is literal and runs once per token in table order, so a value
/// that contains another token may or may not be expanded depending on that
/// order. Empty tokens are ignored.
pub fn substitute(template: &str, symbols: &SymbolTable) -> String {
    symbols
        .iter()
        .filter(|(token, _)| !token.is_empty())
        .fold(template.to_string(), |text, (token, value)| {
            text.replace(token, value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_all_occurrences() {
        let symbols = SymbolTable::new().with("{name}", "Ann");
        assert_eq!(substitute("Hi {name}, bye {name}", &symbols), "Hi Ann, bye Ann");
    }

    #[test]
    fn second_pass_is_noop() {
        let symbols = SymbolTable::new().with("{name}", "Ann");
        let once = substitute("Hi {name}", &symbols);
        assert_eq!(once, "Hi Ann");
        assert_eq!(substitute(&once, &symbols), once);
    }

    #[test]
    fn applies_tokens_in_table_order() {
        let symbols = SymbolTable::new().with("{a}", "{b}").with("{b}", "B");
        assert_eq!(substitute("{a}", &symbols), "B");

        let reversed = SymbolTable::new().with("{b}", "B").with("{a}", "{b}");
        assert_eq!(substitute("{a}", &reversed), "{b}");
    }

    #[test]
    fn empty_token_is_ignored() {
        let symbols = SymbolTable::new().with("", "x");
        assert_eq!(substitute("abc", &symbols), "abc");
    }
}
