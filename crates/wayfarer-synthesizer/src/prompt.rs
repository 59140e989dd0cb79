//! Prompt composition for program synthesis

use crate::config::ProgramFormat;
use crate::slicer::TokenBudgetSlicer;
use tracing::debug;
use wayfarer_domain::traits::Tokenizer;

/// Delimiter line around the embedded program and document
pub const DELIMITER: &str = "------------";

/// The instruction text sent to the oracle for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleQuery {
    /// Prompt text, within the token ceiling
    pub instructions: String,

    /// Token count of `instructions`
    pub tokens: usize,

    /// True when slicing shortened the prompt
    pub truncated: bool,
}

/// Renders the fixed synthesis template and fits it into the token budget
#[derive(Debug, Clone)]
pub struct PromptComposer<T> {
    slicer: TokenBudgetSlicer<T>,
    token_limit: usize,
    format: ProgramFormat,
    language: String,
}

impl<T: Tokenizer> PromptComposer<T> {
    /// Create a composer
    pub fn new(slicer: TokenBudgetSlicer<T>, token_limit: usize, format: ProgramFormat) -> Self {
        Self {
            slicer,
            token_limit,
            format,
            language: "Python".to_string(),
        }
    }

    /// Name the language of opaque programs
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Token ceiling applied to every prompt
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Render the full template without slicing
    pub fn render(&self, program: &str, body: &str) -> String {
        let mut prompt = String::with_capacity(program.len() + body.len() + 2_048);

        // 1. Task description
        match self.format {
            ProgramFormat::Opaque => {
                prompt.push_str(&OPAQUE_TASK.replace("{language}", &self.language));
            }
            ProgramFormat::Rules => {
                prompt.push_str(RULES_TASK);
                prompt.push_str("\n\n");
                prompt.push_str(RULES_FORMAT);
            }
        }
        prompt.push_str("\n\n");

        // 2. Output contract
        prompt.push_str(OUTPUT_FORMAT);
        prompt.push_str("\n\n");

        // 3. Current program
        prompt.push_str("The current program is between the next two lines of dashes:\n");
        prompt.push_str(DELIMITER);
        prompt.push('\n');
        prompt.push_str(program);
        prompt.push('\n');
        prompt.push_str(DELIMITER);
        prompt.push_str("\n\n");

        // 4. Document last, so slicing trims its tail first
        prompt.push_str("And the text of the email is below this line:\n");
        prompt.push_str(DELIMITER);
        prompt.push('\n');
        prompt.push_str(body);

        prompt
    }

    /// Compose the oracle query for one document against the current program
    pub fn compose(&self, program: &str, body: &str) -> Result<OracleQuery, T::Error> {
        let rendered = self.render(program, body);
        let sliced = self.slicer.fit(&rendered, self.token_limit)?;
        debug!(
            "Composed prompt: {} tokens (limit {}, truncated: {})",
            sliced.tokens,
            self.token_limit,
            !sliced.is_untouched()
        );
        Ok(OracleQuery {
            truncated: !sliced.is_untouched(),
            tokens: sliced.tokens,
            instructions: sliced.text,
        })
    }
}

const OPAQUE_TASK: &str = "Attached is the body of an email message, and a block of {language} code (which might be empty). \
The code's job is to extract flight itineraries from emails. If you detect that the email is a flight itinerary, \
modify the code so that it correctly extracts the origin and destination of the flight from this email as well as \
from every email it already knows how to parse. Do not remove or break any case the code already handles. \
The code should return JSON listing the origin and destination, like this:
{
    \"isItinerary\": true,
    \"origin\": \"San Francisco, USA\",
    \"destination\": \"New York City, USA\"
}
If the email is not an itinerary (most will not be), you do not need to modify the code.";

const RULES_TASK: &str = "Attached is the body of an email message, and a rule set in JSON (which might be empty). \
The rules extract flight itineraries from emails. If you detect that the email is a flight itinerary, \
add or adjust rules so that they correctly extract the origin and destination of the flight from this email as well as \
from every email they already match. Do not remove or break any existing rule. \
If the email is not an itinerary (most will not be), you do not need to modify the rules.";

const RULES_FORMAT: &str = r#"The rule set format is:
{
  "rules": [
    {
      "name": "sender and email kind",
      "trigger": "text that must appear in the email",
      "pattern": "regular expression shared by both fields",
      "origin": {"groups": [1]},
      "destination": {"pattern": "optional regular expression for this field only", "groups": [1, 2], "join": ", "}
    }
  ]
}
Each field reads capture groups from its own pattern when it has one, otherwise from the rule's pattern.
Every group number must exist in the pattern the field reads. Either field may be omitted."#;

const OUTPUT_FORMAT: &str = r#"In either case, or if you can't figure out what to do, return the following JSON:
{
    "was_itinerary": true or false depending on whether the email was an itinerary,
    "modified_code": true or false depending on whether you modified the program,
    "code": the complete program, unchanged if you did not modify it, enclosed in quotes and escaped for JSON
}
Return only this JSON object. Do not enclose it in backticks or any other quoting, and do not include any other information."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CharTokenizer;

    fn composer(format: ProgramFormat, limit: usize) -> PromptComposer<CharTokenizer> {
        PromptComposer::new(TokenBudgetSlicer::new(CharTokenizer, 300_000, 100), limit, format)
    }

    #[test]
    fn test_render_embeds_program_and_body() {
        let prompt = composer(ProgramFormat::Opaque, 100_000).render("def extract(): pass", "Flight SEA to JFK");

        assert!(prompt.contains("block of Python code"));
        assert!(prompt.contains(&format!("{}\ndef extract(): pass\n{}", DELIMITER, DELIMITER)));
        assert!(prompt.ends_with(&format!("{}\nFlight SEA to JFK", DELIMITER)));
        assert!(prompt.contains("\"was_itinerary\""));
        assert!(prompt.contains("\"modified_code\""));
        assert!(prompt.contains("\"code\""));
    }

    #[test]
    fn test_render_is_deterministic() {
        let composer = composer(ProgramFormat::Opaque, 100_000);
        assert_eq!(composer.render("p", "b"), composer.render("p", "b"));
    }

    #[test]
    fn test_empty_program_still_delimited() {
        let prompt = composer(ProgramFormat::Opaque, 100_000).render("", "body");
        assert!(prompt.contains(&format!("{}\n\n{}", DELIMITER, DELIMITER)));
    }

    #[test]
    fn test_language_is_configurable() {
        let prompt = composer(ProgramFormat::Opaque, 100_000)
            .with_language("JavaScript")
            .render("", "body");
        assert!(prompt.contains("block of JavaScript code"));
    }

    #[test]
    fn test_rules_format_describes_rule_sets() {
        let prompt = composer(ProgramFormat::Rules, 100_000).render("", "body");
        assert!(prompt.contains("rule set in JSON"));
        assert!(prompt.contains("\"groups\""));
        assert!(!prompt.contains("{language}"));
    }

    #[test]
    fn test_compose_fits_limit_by_trimming_body_tail() {
        let composer = composer(ProgramFormat::Opaque, 3_000);
        let body = format!("HEAD {}", "x".repeat(10_000));
        let query = composer.compose("PROGRAM", &body).unwrap();

        assert!(query.truncated);
        assert!(query.tokens <= 3_000);
        assert!(query.instructions.contains("PROGRAM"));
        assert!(query.instructions.contains("HEAD"));
    }

    #[test]
    fn test_compose_small_prompt_untouched() {
        let composer = composer(ProgramFormat::Opaque, 100_000);
        let query = composer.compose("p", "b").unwrap();
        assert!(!query.truncated);
        assert_eq!(query.instructions, composer.render("p", "b"));
    }
}
