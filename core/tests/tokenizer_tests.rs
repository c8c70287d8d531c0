use sitebot_core::tokenizer::tokenize;

#[test]
fn it_normalizes_unicode() {
    let words = tokenize("The café's menu board");
    // NFKC + lowercase: café -> café, compatibility-folded and lowered
    assert!(words.iter().any(|w| w.starts_with("caf")));
    assert!(words.contains(&"menu".to_string()));
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"quick".to_string()));
}

#[test]
fn it_does_not_stem() {
    let words = tokenize("opening hours for registration");
    assert!(words.contains(&"opening".to_string()));
    assert!(words.contains(&"hours".to_string()));
    assert!(words.contains(&"registration".to_string()));
}
