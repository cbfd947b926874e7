//! Static discovery of the prompts a program will ask for.
//!
//! A prompt is the string literal passed as the only argument of an
//! input-request call such as `input('Enter name:')`. Calls whose argument
//! is missing, computed, or otherwise not a plain literal contribute no
//! prompt; they are skipped rather than reported.

pub mod lexer;

use lexer::{Lexer, Token};

/// Name of the input-request function when none is configured.
pub const DEFAULT_PROMPT_FUNCTION: &str = "input";

/// Extract prompts for calls to [`DEFAULT_PROMPT_FUNCTION`].
pub fn extract_prompts(source: &str) -> Vec<String> {
    extract_prompts_for(source, DEFAULT_PROMPT_FUNCTION)
}

/// Extract the literal prompt of every `function(<literal>)` call site, in
/// source order. Identical prompts at different call sites are kept as
/// separate entries.
pub fn extract_prompts_for(source: &str, function: &str) -> Vec<String> {
    let tokens: Vec<Token<'_>> = Lexer::new(source).collect();
    let mut prompts = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if *token != Token::Ident(function) {
            continue;
        }
        // Attribute access and definitions are not calls to the builtin.
        if i > 0 && matches!(tokens[i - 1], Token::Punct('.') | Token::Ident("def")) {
            continue;
        }
        if let [Token::Punct('('), Token::Str(lit), Token::Punct(')'), ..] = &tokens[i + 1..]
            && let Some(prompt) = lit.value()
        {
            prompts.push(prompt);
        }
    }

    prompts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_prompt() {
        assert_eq!(
            extract_prompts("name = input('Enter name:')"),
            vec!["Enter name:"]
        );
    }

    #[test]
    fn empty_source() {
        assert!(extract_prompts("").is_empty());
    }

    #[test]
    fn no_input_calls() {
        assert!(extract_prompts("print('hello')\nx = 1 + 2\n").is_empty());
    }

    #[test]
    fn order_and_duplicates_preserved() {
        let src = "a = input(\"First:\")\nb = input('Second:')\nc = input('First:')\n";
        assert_eq!(extract_prompts(src), vec!["First:", "Second:", "First:"]);
    }

    #[test]
    fn both_quote_styles_on_one_line() {
        assert_eq!(
            extract_prompts(r#"x, y = input('a'), input("b")"#),
            vec!["a", "b"]
        );
    }

    #[test]
    fn non_literal_arguments_are_skipped() {
        let src = "p = 'Name: '\na = input(p)\nb = input()\nc = input(f'{p}')\nd = input('x' + p)\ne = input('ok')";
        assert_eq!(extract_prompts(src), vec!["ok"]);
    }

    #[test]
    fn malformed_quoting_is_skipped() {
        let src = "a = input('broken)\nb = input('fine')\n";
        assert_eq!(extract_prompts(src), vec!["fine"]);
    }

    #[test]
    fn empty_literal_is_a_prompt() {
        assert_eq!(extract_prompts("x = input('')"), vec![""]);
    }

    #[test]
    fn whitespace_inside_call() {
        assert_eq!(
            extract_prompts("x = input(\n    'Age: '\n)"),
            vec!["Age: "]
        );
    }

    #[test]
    fn comments_and_strings_do_not_count() {
        let src = "# input('commented')\ns = \"input('quoted')\"\nx = input('real')";
        assert_eq!(extract_prompts(src), vec!["real"]);
    }

    #[test]
    fn methods_and_longer_names_do_not_count() {
        let src = "a = obj.input('m')\nb = raw_input('r')\ndef input(p): pass\nc = input('yes')";
        assert_eq!(extract_prompts(src), vec!["yes"]);
    }

    #[test]
    fn escapes_are_decoded() {
        assert_eq!(
            extract_prompts(r"x = input('Name?\n> ')"),
            vec!["Name?\n> "]
        );
    }

    #[test]
    fn custom_function_name() {
        assert_eq!(
            extract_prompts_for("x = ask('Q:')\ny = input('no')", "ask"),
            vec!["Q:"]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let src = "a = input('1')\nb = input('2')";
        assert_eq!(extract_prompts(src), extract_prompts(src));
    }
}
