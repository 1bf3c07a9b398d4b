//! Keyword-matched canned replies.

use async_trait::async_trait;
use querycraft_core::error::Result;
use querycraft_core::reply::ReplyGenerator;
use tracing::debug;

/// One row of a reply table: any keyword hit selects `reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

impl KeywordRule {
    /// `text` must already be lower-cased.
    fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|keyword| text.contains(keyword))
    }
}

const GENERAL_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["hello", "hi"],
        reply: "Hello! How can I help you today?",
    },
    KeywordRule {
        keywords: &["pdf", "analyze"],
        reply: "I'd be happy to analyze a PDF for you. Please upload the file and I'll extract the relevant information.",
    },
    KeywordRule {
        keywords: &["excel", "report"],
        reply: "I can generate Excel reports based on your data. What kind of report would you like to create?",
    },
    KeywordRule {
        keywords: &["search", "find"],
        reply: "I can search for information for you. What are you looking for specifically?",
    },
];

const GENERAL_FALLBACK: &str =
    "I understand you need assistance. Could you provide more details about what you're looking for?";

const GENOMICS_RULES: &[KeywordRule] = &[
    KeywordRule {
        keywords: &["polygenic risk score", "prs"],
        reply: "A polygenic risk score (PRS) is a number that summarizes the estimated effect of many genetic variants on an individual's phenotype, typically calculated as a weighted sum of trait-associated alleles. PRS can be used to identify individuals who are at higher genetic risk for a specific disease or trait.",
    },
    KeywordRule {
        keywords: &["genetic variant", "snp"],
        reply: "Genetic variants are differences in DNA sequences that occur among individuals. Single Nucleotide Polymorphisms (SNPs) are the most common type of genetic variant, involving a change in a single DNA building block. These variants can influence various traits, including disease susceptibility.",
    },
];

const GENOMICS_FALLBACK: &str = "I'm an AI assistant specialized in helping with polygenic risk score analysis. I can answer questions about genetics, genomic data formats, and help interpret your analysis results. What specific information are you looking for?";

/// Picks the first rule whose keyword occurs in the lower-cased input.
///
/// Matching is plain substring search, so "this" hits the "hi" rule.
#[derive(Debug, Clone)]
pub struct KeywordReplyGenerator {
    rules: &'static [KeywordRule],
    fallback: &'static str,
}

impl KeywordReplyGenerator {
    pub fn new(rules: &'static [KeywordRule], fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    /// General assistant: greetings, PDFs, reports, search.
    pub fn general() -> Self {
        Self::new(GENERAL_RULES, GENERAL_FALLBACK)
    }

    /// Polygenic risk score assistant.
    pub fn genomics() -> Self {
        Self::new(GENOMICS_RULES, GENOMICS_FALLBACK)
    }

    pub fn reply_for(&self, user_text: &str) -> &'static str {
        let text = user_text.to_lowercase();
        match self.rules.iter().position(|rule| rule.matches(&text)) {
            Some(index) => {
                debug!("Reply rule {} matched", index);
                self.rules[index].reply
            }
            None => self.fallback,
        }
    }
}

#[async_trait]
impl ReplyGenerator for KeywordReplyGenerator {
    async fn generate_reply(&self, user_text: &str) -> Result<String> {
        Ok(self.reply_for(user_text).to_string())
    }
}
