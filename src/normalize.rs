/// Turn a raw execution transcript into display lines.
///
/// The execution service echoes prompt text inline with the program's
/// output (`Enter name:Alice`). Since the input slots already show each
/// prompt, every occurrence of every prompt is removed from the transcript.
/// The remainder is trimmed, split on line boundaries, each line trimmed,
/// and blank lines dropped.
///
/// Prompts are removed longest first so a prompt that is a substring of
/// another cannot split the longer one. Removal is unconditional: program
/// output that happens to contain a prompt's text loses that text too.
pub fn normalize_output<S: AsRef<str>>(raw: &str, prompts: &[S]) -> Vec<String> {
    let mut distinct: Vec<&str> = prompts
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| !p.is_empty())
        .collect();
    distinct.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    distinct.dedup();

    let mut text = raw.to_string();
    for prompt in distinct {
        if text.contains(prompt) {
            text = text.replace(prompt, "");
        }
    }

    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prompts_and_blank_lines() {
        let prompts = ["Enter name:", "Enter age:"];
        assert_eq!(
            normalize_output("Enter name:Alice\nEnter age:30\n\n", &prompts),
            vec!["Alice", "30"]
        );
    }

    #[test]
    fn greeting_without_echoed_answer() {
        // Piped stdin is not echoed, so the greeting follows the prompt.
        assert_eq!(
            normalize_output("Enter name:Hello Alice\n", &["Enter name:"]),
            vec!["Hello Alice"]
        );
    }

    #[test]
    fn echoed_answer_is_kept() {
        assert_eq!(
            normalize_output("Enter name:Alice\nHello Alice\n", &["Enter name:"]),
            vec!["Alice", "Hello Alice"]
        );
    }

    #[test]
    fn prompt_only_line_disappears() {
        // Input is not echoed, so the prompt and the next print share a line.
        assert_eq!(
            normalize_output("Name: Hello Bob\n", &["Name: "]),
            vec!["Hello Bob"]
        );
    }

    #[test]
    fn empty_output() {
        assert!(normalize_output("", &["x"]).is_empty());
        assert!(normalize_output("  \n\n \r\n", &[] as &[&str]).is_empty());
    }

    #[test]
    fn no_prompts_only_cleans_whitespace() {
        assert_eq!(
            normalize_output("  a  \r\n\r\n b\n", &[] as &[&str]),
            vec!["a", "b"]
        );
    }

    #[test]
    fn every_occurrence_is_removed() {
        let prompts = ["Guess:", "Guess:"];
        assert_eq!(
            normalize_output("Guess:low\nGuess:high\nGuess:ok\n", &prompts),
            vec!["low", "high", "ok"]
        );
    }

    #[test]
    fn longer_prompt_removed_before_contained_one() {
        let prompts = ["name:", "Enter name:"];
        assert_eq!(
            normalize_output("Enter name:Al\nname:x\n", &prompts),
            vec!["Al", "x"]
        );
    }

    #[test]
    fn empty_prompt_is_ignored() {
        assert_eq!(normalize_output("abc\n", &[""]), vec!["abc"]);
    }

    #[test]
    fn matching_program_output_is_stripped_too() {
        // Compatibility behavior: legitimate output equal to a prompt is lost.
        assert_eq!(
            normalize_output("Enter name:Al\nEnter name: was asked\n", &["Enter name:"]),
            vec!["Al", "was asked"]
        );
    }
}
