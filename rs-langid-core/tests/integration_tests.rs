//! End-to-end tests: raw text -> tokens -> ids -> n-grams -> detection.

use rs_langid_core::{
	Detector, DetectorConfig, LangIdError, LanguageDetector, LanguageProfiles, LetterStorage, NGramModel,
	ProbabilityLanguageDetector, ScoreOrder, decode_corpus, encode_corpus, tokenize_by_sentence,
};

const ENGLISH: &str = "It was a bright cold day in April, and the clocks were striking thirteen. \
	Winston Smith, his chin nuzzled into his breast in an effort to escape the vile wind, \
	slipped quickly through the glass doors of Victory Mansions, though not quickly enough \
	to prevent a swirl of gritty dust from entering along with him.";

const GERMAN: &str = "Es war ein heller, kalter Tag im April, und die Uhren schlugen dreizehn. \
	Winston Smith, das Kinn auf die Brust gepresst, um dem eisigen Wind zu entgehen, \
	schlüpfte rasch durch die Glastür des Victory-Hauses, wenn auch nicht schnell genug, \
	um zu verhindern, dass ein Wirbel griesigen Staubs mit ihm hereinwehte.";

const FRENCH: &str = "C'était une journée d'avril froide et claire. Les horloges sonnaient treize heures. \
	Winston Smith, le menton rentré dans le cou, s'efforçait d'éviter le vent mauvais. \
	Il franchit rapidement la porte vitrée du bloc des Maisons de la Victoire, pas assez \
	rapidement cependant pour empêcher que s'engouffre en même temps que lui un tourbillon de poussière.";

fn trained<D: Detector>(mut detector: D) -> D {
	detector.learn_text(ENGLISH, "english").unwrap();
	detector.learn_text(GERMAN, "german").unwrap();
	detector.learn_text(FRENCH, "french").unwrap();
	detector
}

fn config() -> DetectorConfig {
	DetectorConfig::new().with_trie_levels([2, 3]).with_top_k(20)
}

#[test]
fn test_happy_sample_pipeline() {
	let corpus = tokenize_by_sentence("She is happy. He is happy.");
	assert_eq!(corpus.len(), 2);
	assert!(corpus.iter().all(|sentence| sentence.len() == 3));

	let mut storage = LetterStorage::new();
	let encoded = encode_corpus(&mut storage, &corpus).unwrap();
	assert_eq!(decode_corpus(&storage, &encoded).unwrap(), corpus);

	let model = NGramModel::build(2, &encoded).unwrap();
	let top = model.top_n_grams(1);
	let underscore = storage.get_id('_').unwrap();
	let h = storage.get_id('h').unwrap();
	// _h opens she, happy, he, happy
	assert_eq!(top, vec![vec![underscore, h]]);
	assert_eq!(model.top_n_grams(1), top);
}

#[test]
fn test_empty_text_pipeline() {
	let corpus = tokenize_by_sentence("");
	assert!(corpus.is_empty());

	let mut storage = LetterStorage::new();
	let encoded = encode_corpus(&mut storage, &corpus).unwrap();
	assert!(encoded.is_empty());

	let mut model = NGramModel::new(2).unwrap();
	model.fill_n_grams(&encoded);
	assert!(matches!(model.calculate_n_grams_frequencies(), Err(LangIdError::UninitializedState(_))));
}

#[test]
fn test_overlap_detector_recognises_training_texts() {
	let detector = trained(LanguageDetector::new(config()).unwrap());
	for (text, language) in [(ENGLISH, "english"), (GERMAN, "german"), (FRENCH, "french")] {
		let result = detector.detect_text(text).unwrap();
		assert_eq!(result.len(), 3);
		assert_eq!(result.best().map(|(name, _)| name), Some(language));
		assert_eq!(result.get(language), Some(0.0));
	}
}

#[test]
fn test_probability_detector_recognises_training_texts() {
	let detector = trained(ProbabilityLanguageDetector::new(config()).unwrap());
	for (text, language) in [(ENGLISH, "english"), (GERMAN, "german"), (FRENCH, "french")] {
		assert_eq!(detector.best_language(text).unwrap().as_deref(), Some(language));
	}
}

#[test]
fn test_probability_detector_on_unseen_sentences() {
	let detector = trained(ProbabilityLanguageDetector::new(config()).unwrap());
	assert_eq!(
		detector.best_language("The wind was striking the glass doors of the mansions.").unwrap().as_deref(),
		Some("english")
	);
	assert_eq!(
		detector.best_language("Die Uhren schlugen nicht, und der Wind war kalt.").unwrap().as_deref(),
		Some("german")
	);
}

#[test]
fn test_detectors_share_learnt_profiles() {
	let mut profiles = LanguageProfiles::new(config()).unwrap();
	profiles
		.learn_languages(vec![
			("english".to_owned(), ENGLISH.to_owned()),
			("german".to_owned(), GERMAN.to_owned()),
		])
		.unwrap();

	let overlap = LanguageDetector::with_profiles(profiles.clone());
	let probability = ProbabilityLanguageDetector::with_profiles(profiles);
	assert_eq!(overlap.score_order(), ScoreOrder::LowerIsBetter);
	assert_eq!(probability.score_order(), ScoreOrder::HigherIsBetter);
	assert_eq!(overlap.best_language(GERMAN).unwrap().as_deref(), Some("german"));
	assert_eq!(probability.best_language(GERMAN).unwrap().as_deref(), Some("german"));
}

#[test]
fn test_independent_detectors_have_independent_vocabularies() {
	let mut first = LanguageDetector::new(DetectorConfig::default()).unwrap();
	let mut second = LanguageDetector::new(DetectorConfig::default()).unwrap();
	first.learn_text("abc", "one").unwrap();
	second.learn_text("cba", "one").unwrap();
	assert_eq!(first.profiles().storage().get_id('a'), Some(1));
	assert_eq!(second.profiles().storage().get_id('a'), Some(3));
}
