use rust_stemmers::{Algorithm, Stemmer};

/// Lowercasing whitespace tokenizer with per-language Snowball stemming.
///
/// Languages without a stemmer keep tokens as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenizer {
    language: String,
}

impl Tokenizer {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn has_stemmer(&self) -> bool {
        stemming_algorithm(&self.language).is_some()
    }

    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let tokens = lowered.split_whitespace();
        match stemming_algorithm(&self.language) {
            Some(algorithm) => {
                let stemmer = Stemmer::create(algorithm);
                tokens.map(|t| stemmer.stem(t).into_owned()).collect()
            }
            None => tokens.map(str::to_string).collect(),
        }
    }
}

/// Convenience wrapper around [`Tokenizer::tokenize`].
#[must_use]
pub fn tokenize(text: &str, language: &str) -> Vec<String> {
    Tokenizer::new(language).tokenize(text)
}

fn stemming_algorithm(language: &str) -> Option<Algorithm> {
    let algorithm = match language.trim().to_ascii_lowercase().as_str() {
        "english" | "en" => Algorithm::English,
        "spanish" | "es" => Algorithm::Spanish,
        "french" | "fr" => Algorithm::French,
        "german" | "de" => Algorithm::German,
        "italian" | "it" => Algorithm::Italian,
        "portuguese" | "pt" => Algorithm::Portuguese,
        "dutch" | "nl" => Algorithm::Dutch,
        "danish" | "da" => Algorithm::Danish,
        "swedish" | "sv" => Algorithm::Swedish,
        "norwegian" | "no" | "nb" => Algorithm::Norwegian,
        "finnish" | "fi" => Algorithm::Finnish,
        "hungarian" | "hu" => Algorithm::Hungarian,
        "romanian" | "ro" => Algorithm::Romanian,
        "russian" | "ru" => Algorithm::Russian,
        "turkish" | "tr" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_splits_and_stems_english() {
        let tokens = tokenize("Restarting   the\tServers\n", "english");
        assert_eq!(tokens, vec!["restart", "the", "server"]);
    }

    #[test]
    fn short_language_tags_are_accepted() {
        assert_eq!(tokenize("running", "en"), tokenize("running", "english"));
        assert!(Tokenizer::new("EN").has_stemmer());
    }

    #[test]
    fn unknown_language_keeps_tokens() {
        let tokenizer = Tokenizer::new("klingon");
        assert!(!tokenizer.has_stemmer());
        assert_eq!(tokenizer.tokenize("Running Processes"), vec!["running", "processes"]);
    }

    #[test]
    fn empty_and_blank_input_yield_no_tokens() {
        assert!(tokenize("", "english").is_empty());
        assert!(tokenize(" \t\n ", "english").is_empty());
    }

    #[test]
    fn tokenization_is_deterministic() {
        let text = "list running processes";
        assert_eq!(tokenize(text, "english"), tokenize(text, "english"));
    }
}
