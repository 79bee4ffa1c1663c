//! Insight rule table.
//!
//! Maps review vocabulary to feedback categories, and each category to the
//! statements used as a strength, a weakness, and an improvement action.
//! The table is configuration: `.sentiscope.toml` may replace it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One feedback category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRule {
    /// Category name, used to merge duplicate suggestions.
    pub category: String,
    /// Terms that indicate this category.
    pub keywords: Vec<String>,
    /// Statement used when the category dominates positive reviews.
    pub strength: String,
    /// Statement used when the category dominates negative reviews.
    pub weakness: String,
    /// Improvement action for the weakness.
    pub suggestion: String,
}

impl InsightRule {
    fn new(category: &str, keywords: &[&str], strength: &str, weakness: &str, suggestion: &str) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            strength: strength.to_string(),
            weakness: weakness.to_string(),
            suggestion: suggestion.to_string(),
        }
    }
}

/// The built-in rule table.
pub fn default_rules() -> Vec<InsightRule> {
    vec![
        InsightRule::new(
            "quality",
            &[
                "quality", "build", "built", "construction", "durability", "durable", "sturdy",
                "solid", "material", "materials", "broken", "broke", "defective", "flimsy",
            ],
            "Product quality is highly praised",
            "Customers report problems with product quality and durability",
            "Strengthen quality control and durability testing",
        ),
        InsightRule::new(
            "price",
            &[
                "price", "priced", "cost", "value", "expensive", "cheap", "affordable", "worth",
                "overpriced", "money",
            ],
            "Customers see the product as good value for money",
            "Pricing is seen as too high for what is offered",
            "Review pricing or communicate the product's value more clearly",
        ),
        InsightRule::new(
            "performance",
            &[
                "performance", "speed", "responsive", "lag", "battery", "works", "working",
                "stopped", "power",
            ],
            "Performance and reliability impress customers",
            "Performance and reliability fall short of expectations",
            "Investigate reliability issues and optimize performance",
        ),
        InsightRule::new(
            "design",
            &[
                "design", "look", "looks", "style", "appearance", "aesthetic", "beautiful",
                "ugly", "color", "colour", "size",
            ],
            "The design and look are well liked",
            "The design and appearance disappoint some customers",
            "Revisit the product design based on customer feedback",
        ),
        InsightRule::new(
            "usability",
            &[
                "easy", "intuitive", "complicated", "difficult", "simple", "setup", "set",
                "instructions", "manual", "usability", "confusing",
            ],
            "Customers find the product easy to use",
            "Customers struggle with setup and ease of use",
            "Simplify setup and improve the instructions",
        ),
        InsightRule::new(
            "customer service",
            &[
                "service", "support", "help", "helpful", "assistance", "representative",
                "warranty", "staff", "rude", "refund", "answered", "response",
            ],
            "Customer service receives strong praise",
            "Customer service experiences are a frequent complaint",
            "Train support staff and shorten response times",
        ),
        InsightRule::new(
            "delivery",
            &[
                "delivery", "delivered", "shipping", "shipped", "arrived", "package",
                "packaging", "box", "courier", "fast", "late",
            ],
            "Delivery and packaging meet customer expectations",
            "Delivery and packaging problems are frequently reported",
            "Improve packaging and work with carriers on delivery reliability",
        ),
    ]
}

/// Words never treated as topics: function words and bare opinion words.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    // function words
    "a", "about", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as", "at",
    "be", "because", "been", "before", "being", "but", "by", "can", "could", "did", "do", "does",
    "doing", "for", "from", "got", "had", "has", "have", "having", "he", "her", "here", "him",
    "his", "how", "i", "i'm", "i've", "if", "in", "into", "is", "it", "it's", "its", "just",
    "me", "more", "most", "my", "myself", "nothing", "now", "of", "off", "on", "once", "one",
    "only", "or", "other", "our", "out", "over", "own", "same", "she", "should", "so", "some",
    "such", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this",
    "those", "through", "to", "too", "two", "under", "until", "up", "very", "was", "we", "week",
    "weeks", "were", "what", "when", "where", "which", "while", "who", "why", "will", "with",
    "would", "you", "your", "product", "item", "really", "highly", "still", "even", "ever",
    "never", "not", "no",
    // opinion words
    "amazing", "awesome", "bad", "best", "excellent", "fantastic", "fine", "good", "great",
    "happy", "hate", "horrible", "love", "loved", "nice", "okay", "ok", "perfect", "poor",
    "recommend", "recommended", "special", "terrible", "awful", "worst", "disappointed",
    "unhappy", "wonderful", "satisfied",
];

/// Compiled rule table: keyword lookup plus the stopword set.
#[derive(Debug, Clone)]
pub struct RuleBook {
    rules: Vec<InsightRule>,
    by_keyword: HashMap<String, usize>,
    stopwords: HashSet<String>,
}

impl RuleBook {
    /// Compile `rules`. When a keyword appears in several rules the first wins.
    pub fn new(rules: Vec<InsightRule>, extra_stopwords: &[String]) -> Self {
        let mut by_keyword = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            for keyword in &rule.keywords {
                by_keyword.entry(keyword.to_lowercase()).or_insert(index);
            }
        }

        let stopwords = DEFAULT_STOPWORDS
            .iter()
            .map(|w| w.to_string())
            .chain(extra_stopwords.iter().map(|w| w.to_lowercase()))
            .collect();

        Self {
            rules,
            by_keyword,
            stopwords,
        }
    }

    /// Rule whose keywords include `term`.
    pub fn rule_for(&self, term: &str) -> Option<&InsightRule> {
        self.by_keyword.get(term).map(|&i| &self.rules[i])
    }

    pub fn is_stopword(&self, term: &str) -> bool {
        self.stopwords.contains(term)
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        Self::new(default_rules(), &[])
    }
}
