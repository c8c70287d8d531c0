use lazy_static::lazy_static;
use regex::Regex;

/// A fixed topic the service can recognize in a question. The catalog
/// is static and ordered: classification is first-match, so earlier
/// entries win ties.
pub struct Intent {
    pub id: &'static str,
    /// Substrings of the lowercased question that select this intent.
    pub keywords: &'static [&'static str],
    /// Related terms appended to the search query for this topic.
    pub synonyms: &'static [&'static str],
    /// Introductory phrase for composed answers.
    pub intro: &'static str,
}

/// Intro used when no intent matched.
pub const GENERIC_INTRO: &str = "Here's what I found: ";

pub static INTENTS: &[Intent] = &[
    Intent {
        id: "hours",
        keywords: &["hour", "open", "close", "schedule"],
        synonyms: &[
            "hours",
            "open",
            "close",
            "schedule",
            "front desk",
            "weekday",
            "weekend",
        ],
        intro: "Here are the hours I found: ",
    },
    Intent {
        id: "location",
        keywords: &["where", "location", "address", "building", "directions"],
        synonyms: &[
            "location",
            "address",
            "building",
            "room",
            "campus",
            "directions",
            "map",
        ],
        intro: "Here's the location information I found: ",
    },
    Intent {
        id: "contact",
        keywords: &["contact", "phone", "email", "call", "reach"],
        synonyms: &["contact", "phone", "email", "fax", "staff", "directory"],
        intro: "Here's how to get in touch: ",
    },
    Intent {
        id: "admissions",
        keywords: &["admission", "apply", "application", "enroll", "accepted"],
        synonyms: &[
            "admissions",
            "apply",
            "application",
            "enrollment",
            "requirements",
            "deadline",
            "transfer",
        ],
        intro: "Here's what I found about admissions: ",
    },
    Intent {
        id: "tuition",
        keywords: &["tuition", "cost", "fee", "price", "pay"],
        synonyms: &["tuition", "fees", "cost", "payment", "billing", "bursar"],
        intro: "Here's what I found about tuition and fees: ",
    },
    Intent {
        id: "registration",
        keywords: &["register", "registration", "add class", "drop class", "withdraw"],
        synonyms: &[
            "registration",
            "register",
            "drop",
            "withdraw",
            "enroll",
            "courses",
        ],
        intro: "Here's what I found about registration: ",
    },
    Intent {
        id: "financial_aid",
        keywords: &["financial aid", "fafsa", "scholarship", "grant", "loan"],
        synonyms: &[
            "financial aid",
            "fafsa",
            "scholarships",
            "grants",
            "loans",
            "work study",
        ],
        intro: "Here's what I found about financial aid: ",
    },
    Intent {
        id: "programs",
        keywords: &["program", "major", "degree", "course", "class"],
        synonyms: &[
            "programs",
            "majors",
            "degrees",
            "courses",
            "classes",
            "departments",
            "curriculum",
        ],
        intro: "Here's what I found about our programs: ",
    },
    Intent {
        id: "library",
        keywords: &["library", "book", "borrow", "study room"],
        synonyms: &["library", "books", "borrow", "renew", "study rooms"],
        intro: "Here's what I found about the library: ",
    },
    Intent {
        id: "parking",
        keywords: &["parking", "permit", "garage"],
        synonyms: &["parking", "permit", "lot", "garage", "visitor parking"],
        intro: "Here's what I found about parking: ",
    },
];

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"(?u)\w+").expect("valid regex");
}

/// Length threshold below which question tokens are too generic to
/// target snippets with.
const MIN_KEY_TERM_LEN: usize = 3;

/// First catalog intent with any keyword occurring in the lowercased
/// question, or None ("general").
pub fn classify(question: &str) -> Option<&'static Intent> {
    let q = question.to_lowercase();
    INTENTS
        .iter()
        .find(|intent| intent.keywords.iter().any(|kw| q.contains(kw)))
}

/// Build the expanded search string: the lowercased question, the
/// detected intent's synonyms, then every catalog synonym set that
/// shares at least one term with the string built so far. The second
/// pass deliberately trades precision for recall; duplicated terms are
/// harmless because query tokens are deduplicated at search time.
pub fn expand_query(question: &str, intent: Option<&Intent>) -> String {
    let mut expanded = question.to_lowercase();
    if let Some(intent) = intent {
        for syn in intent.synonyms {
            expanded.push(' ');
            expanded.push_str(syn);
        }
    }
    for catalog_intent in INTENTS {
        if catalog_intent
            .synonyms
            .iter()
            .any(|syn| expanded.contains(syn))
        {
            for syn in catalog_intent.synonyms {
                expanded.push(' ');
                expanded.push_str(syn);
            }
        }
    }
    expanded
}

/// Terms used for snippet targeting and the literal fallback: question
/// words of length >= 3 unioned with the words of the detected intent's
/// synonym set, order-preserving and deduplicated.
pub fn key_terms(question: &str, intent: Option<&Intent>) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut push = |word: &str, terms: &mut Vec<String>| {
        if word.chars().count() >= MIN_KEY_TERM_LEN && !terms.iter().any(|t| t == word) {
            terms.push(word.to_string());
        }
    };
    let q = question.to_lowercase();
    for mat in WORD_RE.find_iter(&q) {
        push(mat.as_str(), &mut terms);
    }
    if let Some(intent) = intent {
        for syn in intent.synonyms {
            for mat in WORD_RE.find_iter(syn) {
                push(mat.as_str(), &mut terms);
            }
        }
    }
    terms
}
