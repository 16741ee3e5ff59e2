//! Intent and entity extraction
//!
//! Pure pattern-table matching over raw utterance text. Each intent kind
//! owns a fixed priority weight and a set of match rules; a match yields a
//! confidence derived from the matched span length relative to the
//! utterance, rescaled into [0.5, 1.0]. Absence of a match is a valid,
//! frequent outcome: callers must treat empty results as "ask again", not
//! as an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use concierge_core::{AssistanceLevel, SeatType, ServiceKind};

/// Classified purpose of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    ProvidePnr,
    RequestSeat,
    RequestBaggage,
    RequestPriority,
    RequestWheelchair,
    RequestPet,
}

impl IntentKind {
    /// The add-on service this intent requests, if it is a service request.
    pub fn service(self) -> Option<ServiceKind> {
        match self {
            IntentKind::RequestSeat => Some(ServiceKind::Seat),
            IntentKind::RequestBaggage => Some(ServiceKind::Baggage),
            IntentKind::RequestPriority => Some(ServiceKind::Priority),
            IntentKind::RequestWheelchair => Some(ServiceKind::Wheelchair),
            IntentKind::RequestPet => Some(ServiceKind::Pet),
            IntentKind::ProvidePnr => None,
        }
    }
}

/// One matched intent candidate.
#[derive(Debug, Clone)]
pub struct IntentMatch {
    pub kind: IntentKind,
    /// Fixed priority weight of the intent kind; primary sort key.
    pub priority: u8,
    /// In [0.5, 1.0]; any match is at least moderately confident.
    pub confidence: f32,
    /// Byte span of the longest matching rule in the lowercased utterance.
    pub span: (usize, usize),
}

/// Entities extracted from an utterance, canonicalized per kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entities {
    /// Uppercased 6-character booking reference
    pub pnr: Option<String>,
    pub seat_type: Option<SeatType>,
    /// Weight in whole kilograms
    pub weight_kg: Option<u32>,
    /// Title-cased person name
    pub person_name: Option<String>,
    /// Lowercased breed keyword
    pub pet_breed: Option<String>,
    pub assistance: Option<AssistanceLevel>,
}

/// Result of extraction: ranked intents plus entities.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Each intent kind at most once, sorted by (priority desc, confidence desc)
    pub intents: Vec<IntentMatch>,
    pub entities: Entities,
}

impl Extraction {
    pub fn has_intent(&self, kind: IntentKind) -> bool {
        self.intents.iter().any(|m| m.kind == kind)
    }

    /// Service kinds requested by this utterance, ordered by first mention
    /// so compound requests keep the caller's order, deduplicated.
    pub fn requested_services(&self) -> Vec<ServiceKind> {
        let mut mentions: Vec<(usize, ServiceKind)> = self
            .intents
            .iter()
            .filter_map(|m| m.kind.service().map(|s| (m.span.0, s)))
            .collect();
        mentions.sort_by_key(|(pos, _)| *pos);

        let mut services = Vec::new();
        for (_, kind) in mentions {
            if !services.contains(&kind) {
                services.push(kind);
            }
        }
        services
    }
}

/// Utterance-initial confirmation or denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Affirmative,
    Negative,
}

struct IntentRule {
    kind: IntentKind,
    priority: u8,
    patterns: Vec<Regex>,
}

fn rule(kind: IntentKind, priority: u8, sources: &[&str]) -> IntentRule {
    IntentRule {
        kind,
        priority,
        patterns: sources
            .iter()
            .map(|s| Regex::new(s).expect("static intent pattern"))
            .collect(),
    }
}

/// Declarative intent rule table, evaluated against the lowercased
/// utterance. An explicit PNR must always dominate vaguer matches, hence
/// the top priority weight.
static INTENT_RULES: Lazy<Vec<IntentRule>> = Lazy::new(|| {
    vec![
        rule(
            IntentKind::ProvidePnr,
            100,
            &[
                r"\b[a-z]{3}\d{3}\b",
                r"\bpnr\b",
                r"\bbooking\s+(?:reference|ref|code|number)\b",
            ],
        ),
        rule(
            IntentKind::RequestWheelchair,
            80,
            &[
                r"\bwheel\s?chairs?\b",
                r"\bmobility\s+assist\w*",
                r"\bcan(?:no|')?t\s+walk\b",
            ],
        ),
        rule(
            IntentKind::RequestPet,
            75,
            &[
                r"\bpets?\b",
                r"\bdogs?\b",
                r"\bcats?\b",
                r"\bpuppy\b",
                r"\bkitten\b",
                r"\banimals?\b",
            ],
        ),
        rule(
            IntentKind::RequestSeat,
            70,
            &[
                r"(?:window|aisle|extra\s+leg\s?room|leg\s?room)\s+seats?",
                r"\bseats?\b",
                r"\bwindow\b|\baisle\b|\bleg\s?room\b",
            ],
        ),
        rule(
            IntentKind::RequestBaggage,
            70,
            &[
                r"(?:extra|additional|more)\s+(?:baggage|luggage)",
                r"\bbaggage\b|\bluggage\b",
                r"\bbags?\b",
                r"\bcheck(?:ed)?\s?-?\s?in\s+bags?\b",
            ],
        ),
        rule(
            IntentKind::RequestPriority,
            60,
            &[
                r"priority\s+(?:boarding|check\s?-?\s?in)",
                r"\bpriority\b",
                r"\bboard(?:ing)?\s+(?:first|early)\b",
                r"\bfast\s?track\b",
            ],
        ),
    ]
});

static PNR_EXACT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z]{3}[0-9]{3})\b").expect("static pattern"));
static PNR_GENERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z0-9]{6})\b").expect("static pattern"));
static WEIGHT_KG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\s*(?:kgs?|kilos?|kilograms?)\b").expect("static pattern"));
static PERSON_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:this is|my name is|name is|i am|i['’]m|call me)\s+([a-z]+(?:\s+[a-z]+)?)")
        .expect("static pattern")
});
static SEAT_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bwindow\b|\baisle\b|\b(?:extra\s+)?leg\s?room\b").expect("static pattern")
});
static GATE_TO_GATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"gate\s*(?:to|-)\s*gate").expect("static pattern"));
static CHECKIN_TO_BOARDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"check\s*-?\s*in\s*(?:to|-)\s*boarding").expect("static pattern"));

/// Words that must never be mistaken for a spoken name.
const NAME_STOPWORDS: &[&str] = &[
    "a", "an", "the", "i", "am", "is", "it", "me", "my", "our", "your", "his", "her", "their",
    "for", "not", "here", "just", "so", "very", "really", "sorry", "afraid", "good", "fine",
    "calling", "looking", "trying", "speaking", "interested", "wondering", "hoping", "going",
    "travelling", "traveling",
];

const AFFIRMATIVE_LEXICON: &[&str] = &[
    "yes", "yeah", "yep", "yup", "sure", "ok", "okay", "correct", "right", "confirm",
    "confirmed", "absolutely", "definitely", "indeed", "alright",
];

const NEGATIVE_LEXICON: &[&str] = &[
    "no", "nope", "nah", "not", "never", "cancel", "wrong", "incorrect", "negative", "skip",
    "dont", "don't",
];

/// Extract ranked intents and canonicalized entities from an utterance.
///
/// Never fails; an unintelligible utterance simply yields empty results.
pub fn extract(utterance: &str) -> Extraction {
    let text = utterance.to_lowercase();
    let total_len = text.len().max(1);

    let mut intents = Vec::new();
    for rule in INTENT_RULES.iter() {
        let mut best: Option<(usize, usize)> = None;
        for pattern in &rule.patterns {
            for found in pattern.find_iter(&text) {
                let span = (found.start(), found.end());
                if best.map_or(true, |b| span.1 - span.0 > b.1 - b.0) {
                    best = Some(span);
                }
            }
        }
        if let Some(span) = best {
            let coverage = (span.1 - span.0) as f32 / total_len as f32;
            intents.push(IntentMatch {
                kind: rule.kind,
                priority: rule.priority,
                confidence: (0.5 + 0.5 * coverage).min(1.0),
                span,
            });
        }
    }
    intents.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(b.confidence.total_cmp(&a.confidence))
    });

    Extraction {
        intents,
        entities: extract_entities(&text),
    }
}

fn extract_entities(text: &str) -> Entities {
    Entities {
        pnr: extract_pnr(text),
        seat_type: extract_seat_type(text),
        weight_kg: extract_weight(text),
        person_name: extract_person_name(text),
        pet_breed: extract_pet_breed(text),
        assistance: extract_assistance(text),
    }
}

fn extract_pnr(text: &str) -> Option<String> {
    if let Some(found) = PNR_EXACT.find(text) {
        return Some(found.as_str().to_uppercase());
    }

    // Generic 6-character token; requiring both a letter and a digit keeps
    // ordinary words like "window" from matching.
    PNR_GENERIC
        .find_iter(text)
        .map(|found| found.as_str())
        .find(|token| {
            token.chars().any(|c| c.is_ascii_digit()) && token.chars().any(|c| c.is_ascii_alphabetic())
        })
        .map(str::to_uppercase)
}

fn extract_seat_type(text: &str) -> Option<SeatType> {
    let found = SEAT_TYPE.find(text)?;
    let seat_type = match found.as_str() {
        "window" => SeatType::Window,
        "aisle" => SeatType::Aisle,
        _ => SeatType::ExtraLegroom,
    };
    Some(seat_type)
}

fn extract_weight(text: &str) -> Option<u32> {
    WEIGHT_KG
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn extract_person_name(text: &str) -> Option<String> {
    let caps = PERSON_NAME.captures(text)?;
    let words: Vec<&str> = caps
        .get(1)?
        .as_str()
        .split_whitespace()
        .take_while(|w| !NAME_STOPWORDS.contains(w))
        .collect();

    if words.is_empty() {
        return None;
    }
    Some(
        words
            .iter()
            .map(|w| title_case(w))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Breed keywords the pet desk recognizes; longest listed first so compound
/// names win over their suffixes.
const PET_BREEDS: &[&str] = &[
    "german shepherd",
    "golden retriever",
    "cocker spaniel",
    "labrador",
    "dachshund",
    "bulldog",
    "beagle",
    "poodle",
    "spaniel",
    "terrier",
    "persian",
    "siamese",
    "ragdoll",
    "indie",
    "pug",
];

fn extract_pet_breed(text: &str) -> Option<String> {
    PET_BREEDS
        .iter()
        .filter_map(|breed| text.find(breed).map(|pos| (pos, *breed)))
        .min_by_key(|(pos, breed)| (*pos, std::cmp::Reverse(breed.len())))
        .map(|(_, breed)| breed.to_string())
}

fn extract_assistance(text: &str) -> Option<AssistanceLevel> {
    if GATE_TO_GATE.is_match(text) {
        Some(AssistanceLevel::GateToGate)
    } else if CHECKIN_TO_BOARDING.is_match(text) {
        Some(AssistanceLevel::CheckinToBoarding)
    } else if text.contains("arrival") {
        Some(AssistanceLevel::ArrivalAssistance)
    } else if text.contains("full") || text.contains("everything") {
        Some(AssistanceLevel::FullAssistance)
    } else {
        None
    }
}

/// Classify a yes/no answer from the utterance-initial token only.
///
/// Deliberately separate from the intent table: a confirmation has to be
/// recognized even when the rest of the sentence contains unrelated
/// keywords ("yes, and about the baggage...").
pub fn classify_polarity(utterance: &str) -> Option<Polarity> {
    let first = utterance.split_whitespace().next()?;
    let first: String = first
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'')
        .collect::<String>()
        .to_lowercase();

    if AFFIRMATIVE_LEXICON.contains(&first.as_str()) {
        Some(Polarity::Affirmative)
    } else if NEGATIVE_LEXICON.contains(&first.as_str()) {
        Some(Polarity::Negative)
    } else {
        None
    }
}

/// Last-resort name guess for states that expect a bare name: one or two
/// purely alphabetic words, none of them a stopword.
pub fn fallback_name(utterance: &str) -> Option<String> {
    let words: Vec<String> = utterance
        .split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect();

    if words.is_empty() || words.len() > 2 {
        return None;
    }
    if words
        .iter()
        .any(|w| NAME_STOPWORDS.contains(&w.as_str()) || !w.chars().all(|c| c.is_alphabetic()))
    {
        return None;
    }

    Some(
        words
            .iter()
            .map(|w| title_case(w))
            .collect::<Vec<_>>()
            .join(" "),
    )
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pnr_extracted_anywhere() {
        let ex = extract("so my reference should be abc123 i think");
        assert_eq!(ex.entities.pnr.as_deref(), Some("ABC123"));

        let ex = extract("PNR ABC123");
        assert_eq!(ex.entities.pnr.as_deref(), Some("ABC123"));
    }

    #[test]
    fn test_generic_pnr_needs_digit_and_letter() {
        let ex = extract("it's a code like X9Y8Z7");
        assert_eq!(ex.entities.pnr.as_deref(), Some("X9Y8Z7"));

        // Plain 6-letter words are not booking references
        let ex = extract("I want a window seat");
        assert_eq!(ex.entities.pnr, None);

        let ex = extract("the code is 123456 maybe");
        assert_eq!(ex.entities.pnr, None);
    }

    #[test]
    fn test_pnr_priority_dominates() {
        let ex = extract("okay sure, PNR ABC123 and a seat please");
        assert_eq!(ex.intents[0].kind, IntentKind::ProvidePnr);
    }

    #[test]
    fn test_confidence_bounds() {
        for utterance in ["seat", "I would very much like to request a seat please"] {
            let ex = extract(utterance);
            let seat = ex
                .intents
                .iter()
                .find(|m| m.kind == IntentKind::RequestSeat)
                .unwrap();
            assert!(seat.confidence >= 0.5 && seat.confidence <= 1.0);
        }

        // A full-utterance match is maximal
        let ex = extract("seat");
        assert!((ex.intents[0].confidence - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_compound_request_keeps_mention_order() {
        let ex = extract("I need extra baggage and a window seat");
        assert_eq!(
            ex.requested_services(),
            vec![ServiceKind::Baggage, ServiceKind::Seat]
        );

        let ex = extract("window seat first, then extra baggage and priority boarding");
        assert_eq!(
            ex.requested_services(),
            vec![ServiceKind::Seat, ServiceKind::Baggage, ServiceKind::Priority]
        );
    }

    #[test]
    fn test_each_intent_reported_once() {
        let ex = extract("a seat, yes a seat, one more seat");
        let seats = ex
            .intents
            .iter()
            .filter(|m| m.kind == IntentKind::RequestSeat)
            .count();
        assert_eq!(seats, 1);
    }

    #[test]
    fn test_seat_type_canonicalized() {
        assert_eq!(
            extract("extra leg room please").entities.seat_type,
            Some(SeatType::ExtraLegroom)
        );
        assert_eq!(
            extract("a WINDOW would be nice").entities.seat_type,
            Some(SeatType::Window)
        );
    }

    #[test]
    fn test_weight_extraction() {
        assert_eq!(extract("10 kg extra baggage").entities.weight_kg, Some(10));
        assert_eq!(extract("make it 12kg").entities.weight_kg, Some(12));
        assert_eq!(extract("around 7 kilos").entities.weight_kg, Some(7));
        assert_eq!(extract("lots of baggage").entities.weight_kg, None);
    }

    #[test]
    fn test_person_name_anchors() {
        assert_eq!(
            extract("This is Rahul").entities.person_name.as_deref(),
            Some("Rahul")
        );
        assert_eq!(
            extract("hi, my name is priya nair").entities.person_name.as_deref(),
            Some("Priya Nair")
        );
        assert_eq!(extract("I am looking for a seat").entities.person_name, None);
    }

    #[test]
    fn test_pet_breed_and_intent() {
        let ex = extract("my dog is a labrador");
        assert!(ex.has_intent(IntentKind::RequestPet));
        assert_eq!(ex.entities.pet_breed.as_deref(), Some("labrador"));
    }

    #[test]
    fn test_assistance_normalization() {
        assert_eq!(
            extract("gate to gate please").entities.assistance,
            Some(AssistanceLevel::GateToGate)
        );
        assert_eq!(
            extract("from check-in to boarding").entities.assistance,
            Some(AssistanceLevel::CheckinToBoarding)
        );
        assert_eq!(
            extract("just on arrival").entities.assistance,
            Some(AssistanceLevel::ArrivalAssistance)
        );
        assert_eq!(extract("whatever works").entities.assistance, None);
    }

    #[test]
    fn test_polarity_is_first_word_anchored() {
        assert_eq!(classify_polarity("yes please"), Some(Polarity::Affirmative));
        assert_eq!(classify_polarity("Yeah, that's right"), Some(Polarity::Affirmative));
        assert_eq!(classify_polarity("nope"), Some(Polarity::Negative));
        assert_eq!(classify_polarity("no, the aisle one"), Some(Polarity::Negative));
        // "yes" later in the sentence does not count
        assert_eq!(classify_polarity("I guess yes"), None);
        assert_eq!(classify_polarity(""), None);
    }

    #[test]
    fn test_fallback_name() {
        assert_eq!(fallback_name("Rahul").as_deref(), Some("Rahul"));
        assert_eq!(fallback_name("meera sharma").as_deref(), Some("Meera Sharma"));
        assert_eq!(fallback_name("my mother"), None);
        assert_eq!(fallback_name("Rahul Sharma here"), None);
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let ex = extract("qwerty mumble");
        assert!(ex.intents.is_empty());
        assert_eq!(ex.entities, Entities::default());
    }
}
