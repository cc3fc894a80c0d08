/// Rewrite a summary into a conversational, podcast-like script.
///
/// This is a fixed textual template, not a generative rewrite: a spoken
/// lead-in, every period expanded to ". So, " (including periods inside
/// abbreviations and decimals), and a closing line. The expansion of a
/// trailing period produces a dangling "So, " before the closer; that
/// behavior is part of the contract and covered by tests.
pub fn rewrite_to_podcast_style(text: &str) -> String {
    format!(
        "Alright, so let's dive into this. What we're essentially looking at is... \
         {}. And that's pretty fascinating, isn't it?",
        text.replace('.', ". So, ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_summary_in_fixed_template() {
        let script = rewrite_to_podcast_style("AI is transforming industries.");
        assert_eq!(
            script,
            "Alright, so let's dive into this. What we're essentially looking at is... \
             AI is transforming industries. So, . And that's pretty fascinating, isn't it?"
        );
    }

    #[test]
    fn test_every_period_is_expanded() {
        let script = rewrite_to_podcast_style("First. Second. Third");
        assert!(script.contains("First. So,  Second. So,  Third"));
    }

    #[test]
    fn test_periods_inside_abbreviations_are_expanded_too() {
        let script = rewrite_to_podcast_style("Dr. Smith spoke");
        assert!(script.contains("Dr. So,  Smith spoke"));
    }

    #[test]
    fn test_empty_summary_still_produces_the_frame() {
        let script = rewrite_to_podcast_style("");
        assert_eq!(
            script,
            "Alright, so let's dive into this. What we're essentially looking at is... \
             . And that's pretty fascinating, isn't it?"
        );
    }
}
