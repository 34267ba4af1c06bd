use rs_langid_core::model::ngram_model::extract_n_grams;
use rs_langid_core::{
    Detector, DetectorConfig, LanguageDetector, LetterStorage, NGramModel, ProbabilityLanguageDetector,
    decode_corpus, encode_corpus, tokenize_by_sentence,
};

const ENGLISH: &str = "The weather is nice today. The children are playing in the garden. \
    We will walk to the river and have lunch there.";
const GERMAN: &str = "Das Wetter ist heute schön. Die Kinder spielen im Garten. \
    Wir gehen zum Fluss und essen dort zu Mittag.";
const UNKNOWN: &str = "The children will have lunch in the garden.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Split a text into sentences, framed tokens and letters
    let corpus = tokenize_by_sentence("She is happy. He is happy.");
    println!("Tokens: {:?}", corpus);

    // Assign ids to letters; the storage keeps growing with every encoded corpus
    let mut storage = LetterStorage::new();
    let boundary = storage.put_letter("_")?;
    println!("Id of '_': {boundary}, id of 'z': {:?}", storage.get_id('z'));
    match storage.put_letter("ab") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("Only single letters are stored: {e}"),
    }
    storage.update(&corpus)?;
    println!("{} letters known after the update", storage.len());

    let encoded = encode_corpus(&mut storage, &corpus)?;
    println!("Encoded: {:?}", encoded);
    assert_eq!(decode_corpus(&storage, &encoded)?, corpus);

    // A bigram model, stage by stage: n-grams, frequencies, log-probabilities
    let mut model = NGramModel::new(2)?;
    model.fill_n_grams(&encoded);
    model.calculate_n_grams_frequencies()?;
    model.calculate_log_probabilities()?;
    for n_gram in model.top_n_grams(3) {
        let letters: String = n_gram.iter().filter_map(|id| storage.get_letter(*id)).collect();
        println!(
            "{letters}: {} occurrences, log-probability {:.3}",
            model.frequency(&n_gram),
            model.log_probability(&n_gram).unwrap_or(f64::NEG_INFINITY)
        );
    }
    assert_eq!(NGramModel::build(2, &encoded)?.top_n_grams(3), model.top_n_grams(3));

    // Bigrams and trigrams, 20 most frequent of each compared
    let config = DetectorConfig::new().with_trie_levels([2, 3]).with_top_k(20);

    // Frequency-overlap strategy: lowest distance wins
    let mut overlap = LanguageDetector::new(config.clone())?;
    let english = encode_corpus(overlap.profiles_mut().storage_mut(), &tokenize_by_sentence(ENGLISH))?;
    overlap.learn_language(&english, "english")?;
    overlap.learn_text(GERMAN, "german")?;
    let distances = overlap.detect_text(UNKNOWN)?;
    for (language, distance) in distances.ranking() {
        println!("Distance to {language}: {distance}");
    }
    if let Some((language, _)) = distances.best() {
        println!("Closest by overlap: {language}");
    }
    let english_top = overlap.profiles().profile("english").and_then(|p| p.model(2)).map(|m| m.top_n_grams(20));
    let german_top = overlap.profiles().profile("german").and_then(|p| p.model(2)).map(|m| m.top_n_grams(20));
    if let (Some(english_top), Some(german_top)) = (english_top, german_top) {
        let distance = LanguageDetector::calculate_distance(&english_top, &german_top);
        println!("Bigram distance between english and german: {distance}");
        assert_eq!(distance, LanguageDetector::calculate_distance(&german_top, &english_top));
    }

    // Probability strategy: highest log-probability wins
    let mut probability = ProbabilityLanguageDetector::new(config)?;
    probability.learn_text(ENGLISH, "english")?;
    probability.learn_text(GERMAN, "german")?;
    let scores = probability.detect_text(UNKNOWN)?;
    for (language, score) in scores.ranking() {
        println!("Log-probability under {language}: {score:.2}");
    }
    let query = probability.profiles().encode_query(UNKNOWN)?;
    if let Some(model) = probability.profiles().profile("english").and_then(|p| p.model(2)) {
        for (index, sentence) in extract_n_grams(2, &query).iter().enumerate() {
            let sentence_score = probability.calculate_sentence_probability(model, sentence);
            println!("Sentence {index} under english bigrams: {sentence_score:.2}");
        }
    }

    // Detecting nothing is reported, not guessed
    match probability.detect_text("1234 !!!") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("No language for a text without words: {e}"),
    }

    let result = probability.best_language(UNKNOWN)?;
    println!("Detected: {}", result.as_deref().unwrap_or("unknown"));
    assert_eq!(result.as_deref(), Some("english"));

    Ok(())
}
