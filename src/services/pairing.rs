/// What the pairing rule needs to know about a submission.
#[derive(Debug, Clone, Copy)]
pub struct PairingInput<'a> {
    pub target_language: Option<&'a str>,
    pub has_target_file: bool,
    pub source_sentences: usize,
    /// `None` when the target side was not counted.
    pub target_sentences: Option<usize>,
}

pub trait FilePairValidator {
    fn validate(&self, input: &PairingInput<'_>) -> Vec<String>;
}

/// Target language and target file come together, the source is not empty
/// and both sides hold the same number of sentences.
pub struct AlignedPairValidator;

impl FilePairValidator for AlignedPairValidator {
    fn validate(&self, input: &PairingInput<'_>) -> Vec<String> {
        let mut errors = Vec::new();

        match (input.target_language, input.has_target_file) {
            (Some(_), false) => {
                errors.push("a target file is required when a target language is set".to_string())
            }
            (None, true) => {
                errors.push("a target language is required when a target file is given".to_string())
            }
            _ => {}
        }

        if input.source_sentences == 0 {
            errors.push("the source file contains no sentences".to_string());
        }

        if let Some(target) = input.target_sentences {
            if target != input.source_sentences {
                errors.push(format!(
                    "the source file has {} sentences but the target file has {}",
                    input.source_sentences, target
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(lang: Option<&str>, file: bool, src: usize, tgt: Option<usize>) -> PairingInput<'_> {
        PairingInput {
            target_language: lang,
            has_target_file: file,
            source_sentences: src,
            target_sentences: tgt,
        }
    }

    #[test]
    fn language_and_file_come_together() {
        let v = AlignedPairValidator;
        assert!(v.validate(&input(Some("de"), true, 3, Some(3))).is_empty());
        assert!(v.validate(&input(None, false, 3, None)).is_empty());
        assert_eq!(v.validate(&input(Some("de"), false, 3, None)).len(), 1);
        assert_eq!(v.validate(&input(None, true, 3, Some(3))).len(), 1);
    }

    #[test]
    fn counts_must_line_up() {
        let v = AlignedPairValidator;
        assert_eq!(
            v.validate(&input(Some("de"), true, 3, Some(2))),
            vec!["the source file has 3 sentences but the target file has 2"]
        );
        assert_eq!(
            v.validate(&input(None, false, 0, None)),
            vec!["the source file contains no sentences"]
        );
    }
}
