//! Deterministic category classifier: business name + raw type tags to one
//! canonical reward category.
//!
//! No LLM needed. Three ordered steps, first hit wins:
//! 1) exact tag table
//! 2) keywords on the words of a tag ("las_vegas_casino" -> las, vegas, casino)
//! 3) merchant-name overrides (named partners)
//! and then catch-all. Inside a step, several hits resolve by the category
//! priority order, never by table order.

use cardwise_core::CanonicalCategory;
use cardwise_core::CanonicalCategory::*;
use log::debug;
use serde::Serialize;

/// Which step produced the category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStep {
    Tag,
    TagKeyword,
    MerchantName,
    Fallback,
}

/// Category plus the evidence behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: CanonicalCategory,
    pub step: MatchStep,
    /// The table entry that won, if any
    pub matched: Option<&'static str>,
}

/// One rule-table predicate. The variant decides the step it runs in.
#[derive(Debug, Clone, Copy)]
enum Matcher {
    /// Normalized tag equals the normalized key
    Tag(&'static str),
    /// Whole tag words, in sequence. "ice_cream" needs "ice" then "cream".
    TagWord(&'static str),
    /// Some tag word starts with the stem ("pharmac" covers "pharmacy")
    TagStem(&'static str),
    /// Business name contains the phrase on token boundaries
    Name(&'static str),
}

impl Matcher {
    fn step(&self) -> MatchStep {
        match self {
            Matcher::Tag(_) => MatchStep::Tag,
            Matcher::TagWord(_) | Matcher::TagStem(_) => MatchStep::TagKeyword,
            Matcher::Name(_) => MatchStep::MerchantName,
        }
    }

    fn key(&self) -> &'static str {
        match self {
            Matcher::Tag(k) | Matcher::TagWord(k) | Matcher::TagStem(k) | Matcher::Name(k) => k,
        }
    }

    fn matches(&self, input: &Normalized) -> bool {
        match self {
            Matcher::Tag(key) => {
                let key = normalize_tag(key);
                input.tags.iter().any(|t| *t == key)
            }
            Matcher::TagWord(key) => {
                let key = tag_words(key);
                input
                    .tag_words
                    .iter()
                    .any(|words| words.windows(key.len()).any(|w| w == key.as_slice()))
            }
            Matcher::TagStem(stem) => input.tag_words.iter().flatten().any(|w| w.starts_with(*stem)),
            Matcher::Name(phrase) => {
                !input.name.trim().is_empty() && input.name.contains(&format!(" {} ", phrase))
            }
        }
    }
}

#[rustfmt::skip]
const RULES: &[(Matcher, CanonicalCategory)] = &[
    // --- Step 1: exact tags (places-style type tags) ---
    (Matcher::Tag("restaurant"), Dining),
    (Matcher::Tag("cafe"), Dining),
    (Matcher::Tag("bakery"), Dining),
    (Matcher::Tag("bar"), Dining),
    (Matcher::Tag("coffee_shop"), Dining),
    (Matcher::Tag("fast_food_restaurant"), Dining),
    (Matcher::Tag("meal_takeaway"), Dining),
    (Matcher::Tag("meal_delivery"), Dining),
    (Matcher::Tag("food_court"), Dining),
    (Matcher::Tag("supermarket"), Grocery),
    (Matcher::Tag("grocery_store"), Grocery),
    (Matcher::Tag("grocery_or_supermarket"), Grocery),
    (Matcher::Tag("gas_station"), GasStations),
    (Matcher::Tag("electric_vehicle_charging_station"), GasStations),
    (Matcher::Tag("travel_agency"), TravelGeneral),
    (Matcher::Tag("car_rental"), TravelGeneral),
    (Matcher::Tag("campground"), TravelGeneral),
    (Matcher::Tag("rv_park"), TravelGeneral),
    (Matcher::Tag("airport"), TravelFlights),
    (Matcher::Tag("airline"), TravelFlights),
    (Matcher::Tag("lodging"), TravelHotels),
    (Matcher::Tag("hotel"), TravelHotels),
    (Matcher::Tag("motel"), TravelHotels),
    (Matcher::Tag("resort_hotel"), TravelHotels),
    (Matcher::Tag("bed_and_breakfast"), TravelHotels),
    (Matcher::Tag("hostel"), TravelHotels),
    (Matcher::Tag("movie_theater"), EntertainmentAndRecreation),
    (Matcher::Tag("amusement_park"), EntertainmentAndRecreation),
    (Matcher::Tag("bowling_alley"), EntertainmentAndRecreation),
    (Matcher::Tag("casino"), EntertainmentAndRecreation),
    (Matcher::Tag("museum"), EntertainmentAndRecreation),
    (Matcher::Tag("night_club"), EntertainmentAndRecreation),
    (Matcher::Tag("stadium"), EntertainmentAndRecreation),
    (Matcher::Tag("zoo"), EntertainmentAndRecreation),
    (Matcher::Tag("aquarium"), EntertainmentAndRecreation),
    (Matcher::Tag("art_gallery"), EntertainmentAndRecreation),
    (Matcher::Tag("tourist_attraction"), EntertainmentAndRecreation),
    (Matcher::Tag("performing_arts_theater"), EntertainmentAndRecreation),
    (Matcher::Tag("streaming_service"), StreamingServices),
    (Matcher::Tag("pharmacy"), DrugstoresAndPharmacies),
    (Matcher::Tag("drugstore"), DrugstoresAndPharmacies),
    (Matcher::Tag("gym"), FitnessAndWellness),
    (Matcher::Tag("fitness_center"), FitnessAndWellness),
    (Matcher::Tag("yoga_studio"), FitnessAndWellness),
    (Matcher::Tag("spa"), FitnessAndWellness),
    (Matcher::Tag("transit_station"), TransitAndRideshare),
    (Matcher::Tag("subway_station"), TransitAndRideshare),
    (Matcher::Tag("train_station"), TransitAndRideshare),
    (Matcher::Tag("bus_station"), TransitAndRideshare),
    (Matcher::Tag("light_rail_station"), TransitAndRideshare),
    (Matcher::Tag("taxi_stand"), TransitAndRideshare),
    (Matcher::Tag("parking"), TransitAndRideshare),

    // --- Step 2: keywords on tag words ---
    (Matcher::TagStem("restaurant"), Dining),
    (Matcher::TagStem("cafe"), Dining),
    (Matcher::TagStem("coffee"), Dining),
    (Matcher::TagStem("bakery"), Dining),
    (Matcher::TagStem("bakeries"), Dining),
    (Matcher::TagStem("bistro"), Dining),
    (Matcher::TagStem("pizz"), Dining),
    (Matcher::TagStem("brewer"), Dining),
    (Matcher::TagStem("takeaway"), Dining),
    (Matcher::TagStem("gastropub"), Dining),
    (Matcher::TagStem("sandwich"), Dining),
    (Matcher::TagStem("dessert"), Dining),
    (Matcher::TagWord("ice_cream"), Dining),
    (Matcher::TagWord("diner"), Dining),
    (Matcher::TagWord("pub"), Dining),
    (Matcher::TagWord("bar"), Dining),
    (Matcher::TagWord("food"), Dining),
    (Matcher::TagStem("grocer"), Grocery),
    (Matcher::TagStem("supermarket"), Grocery),
    (Matcher::TagWord("market"), Grocery),
    (Matcher::TagWord("gas"), GasStations),
    (Matcher::TagStem("fuel"), GasStations),
    (Matcher::TagStem("petrol"), GasStations),
    (Matcher::TagWord("charging"), GasStations),
    (Matcher::TagStem("travel"), TravelGeneral),
    (Matcher::TagStem("cruise"), TravelGeneral),
    (Matcher::TagStem("airport"), TravelFlights),
    (Matcher::TagStem("airline"), TravelFlights),
    (Matcher::TagStem("aviation"), TravelFlights),
    (Matcher::TagStem("hotel"), TravelHotels),
    (Matcher::TagStem("lodging"), TravelHotels),
    (Matcher::TagStem("motel"), TravelHotels),
    (Matcher::TagStem("resort"), TravelHotels),
    (Matcher::TagStem("hostel"), TravelHotels),
    (Matcher::TagStem("theater"), EntertainmentAndRecreation),
    (Matcher::TagStem("theatre"), EntertainmentAndRecreation),
    (Matcher::TagStem("cinema"), EntertainmentAndRecreation),
    (Matcher::TagStem("museum"), EntertainmentAndRecreation),
    (Matcher::TagStem("amusement"), EntertainmentAndRecreation),
    (Matcher::TagStem("concert"), EntertainmentAndRecreation),
    (Matcher::TagStem("stadium"), EntertainmentAndRecreation),
    (Matcher::TagWord("arena"), EntertainmentAndRecreation),
    (Matcher::TagStem("bowling"), EntertainmentAndRecreation),
    (Matcher::TagStem("casino"), EntertainmentAndRecreation),
    (Matcher::TagStem("entertainment"), EntertainmentAndRecreation),
    (Matcher::TagStem("recreation"), EntertainmentAndRecreation),
    (Matcher::TagStem("streaming"), StreamingServices),
    (Matcher::TagStem("pharmac"), DrugstoresAndPharmacies),
    (Matcher::TagStem("drugstore"), DrugstoresAndPharmacies),
    (Matcher::TagWord("gym"), FitnessAndWellness),
    (Matcher::TagStem("fitness"), FitnessAndWellness),
    (Matcher::TagStem("yoga"), FitnessAndWellness),
    (Matcher::TagStem("pilates"), FitnessAndWellness),
    (Matcher::TagStem("wellness"), FitnessAndWellness),
    (Matcher::TagStem("trainer"), FitnessAndWellness),
    (Matcher::TagStem("transit"), TransitAndRideshare),
    (Matcher::TagWord("taxi"), TransitAndRideshare),
    (Matcher::TagStem("rideshare"), TransitAndRideshare),
    (Matcher::TagStem("subway"), TransitAndRideshare),
    (Matcher::TagStem("railway"), TransitAndRideshare),
    (Matcher::TagWord("train"), TransitAndRideshare),

    // --- Step 3: merchant-name overrides (token phrases) ---
    (Matcher::Name("starbucks"), Dining),
    (Matcher::Name("dunkin"), Dining),
    (Matcher::Name("mcdonalds"), Dining),
    (Matcher::Name("chipotle"), Dining),
    (Matcher::Name("panera"), Dining),
    (Matcher::Name("chick fil a"), Dining),
    (Matcher::Name("uber eats"), Dining),
    (Matcher::Name("doordash"), Dining),
    (Matcher::Name("grubhub"), Dining),
    (Matcher::Name("whole foods"), Grocery),
    (Matcher::Name("trader joes"), Grocery),
    (Matcher::Name("kroger"), Grocery),
    (Matcher::Name("safeway"), Grocery),
    (Matcher::Name("aldi"), Grocery),
    (Matcher::Name("publix"), Grocery),
    (Matcher::Name("wegmans"), Grocery),
    (Matcher::Name("heb"), Grocery),
    (Matcher::Name("shell"), GasStations),
    (Matcher::Name("chevron"), GasStations),
    (Matcher::Name("exxon"), GasStations),
    (Matcher::Name("exxonmobil"), GasStations),
    (Matcher::Name("texaco"), GasStations),
    (Matcher::Name("speedway"), GasStations),
    (Matcher::Name("expedia"), TravelGeneral),
    (Matcher::Name("booking com"), TravelGeneral),
    (Matcher::Name("hertz"), TravelGeneral),
    (Matcher::Name("avis"), TravelGeneral),
    (Matcher::Name("delta"), TravelFlights),
    (Matcher::Name("united airlines"), TravelFlights),
    (Matcher::Name("american airlines"), TravelFlights),
    (Matcher::Name("southwest"), TravelFlights),
    (Matcher::Name("jetblue"), TravelFlights),
    (Matcher::Name("marriott"), TravelHotels),
    (Matcher::Name("hilton"), TravelHotels),
    (Matcher::Name("hyatt"), TravelHotels),
    (Matcher::Name("holiday inn"), TravelHotels),
    (Matcher::Name("airbnb"), TravelHotels),
    (Matcher::Name("amc"), EntertainmentAndRecreation),
    (Matcher::Name("regal"), EntertainmentAndRecreation),
    (Matcher::Name("ticketmaster"), EntertainmentAndRecreation),
    (Matcher::Name("stubhub"), EntertainmentAndRecreation),
    (Matcher::Name("netflix"), StreamingServices),
    (Matcher::Name("hulu"), StreamingServices),
    (Matcher::Name("spotify"), StreamingServices),
    (Matcher::Name("disney plus"), StreamingServices),
    (Matcher::Name("hbo max"), StreamingServices),
    (Matcher::Name("youtube premium"), StreamingServices),
    (Matcher::Name("cvs"), DrugstoresAndPharmacies),
    (Matcher::Name("walgreens"), DrugstoresAndPharmacies),
    (Matcher::Name("rite aid"), DrugstoresAndPharmacies),
    (Matcher::Name("planet fitness"), FitnessAndWellness),
    (Matcher::Name("equinox"), FitnessAndWellness),
    (Matcher::Name("peloton"), FitnessAndWellness),
    (Matcher::Name("uber"), TransitAndRideshare),
    (Matcher::Name("lyft"), TransitAndRideshare),
    (Matcher::Name("amtrak"), TransitAndRideshare),
];

const STEPS: [MatchStep; 3] = [MatchStep::Tag, MatchStep::TagKeyword, MatchStep::MerchantName];

/// Inputs after normalization, computed once per call
struct Normalized {
    /// Whole tags, squashed: "gasstation"
    tags: Vec<String>,
    /// Each tag split into words: ["gas", "station"]
    tag_words: Vec<Vec<String>>,
    /// Space-padded token string: " whole foods market "
    name: String,
}

/// Lowercase, drop everything that is not a letter or digit.
/// "Gas Station", "gas_station" and "GAS-STATION" all become "gasstation".
pub fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Split a tag on `_`, `-` and whitespace, then normalize each piece.
/// "Ice-Cream Shop" becomes ["ice", "cream", "shop"].
pub fn tag_words(tag: &str) -> Vec<String> {
    tag.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .map(normalize_tag)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Lowercase alphanumeric tokens joined by single spaces.
/// Apostrophes are dropped first so "Trader Joe's" reads "trader joes".
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Classify a business. Total: always returns a member of the closed set.
pub fn classify<S: AsRef<str>>(name: &str, tags: &[S]) -> CanonicalCategory {
    classify_explained(name, tags).category
}

/// Same as [`classify`], also reporting which step and entry matched.
pub fn classify_explained<S: AsRef<str>>(name: &str, tags: &[S]) -> Classification {
    let input = Normalized {
        tags: tags
            .iter()
            .map(|t| normalize_tag(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect(),
        tag_words: tags.iter().map(|t| tag_words(t.as_ref())).collect(),
        name: format!(" {} ", normalize_name(name)),
    };

    for step in STEPS {
        let best = RULES
            .iter()
            .filter(|(m, _)| m.step() == step && m.matches(&input))
            .min_by_key(|(_, c)| c.priority_rank());

        if let Some((m, category)) = best {
            debug!("classified {:?} as {} via {:?} ({})", name, category, step, m.key());
            return Classification {
                category: *category,
                step,
                matched: Some(m.key()),
            };
        }
    }

    debug!("classified {:?} as catch-all (no rule matched)", name);
    Classification {
        category: CanonicalCategory::CatchAllGeneralPurchases,
        step: MatchStep::Fallback,
        matched: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_TAGS: [&str; 0] = [];

    #[test]
    fn test_exact_tag_is_case_and_punctuation_insensitive() {
        assert_eq!(classify("", &["Gas Station"]), GasStations);
        assert_eq!(classify("", &["GAS-STATION"]), GasStations);
        assert_eq!(classify("", &["gas_station"]), GasStations);
    }

    #[test]
    fn test_exact_tag_beats_keyword_and_name() {
        // "Shell" would be a gas override, but the exact tag wins first
        let c = classify_explained("Shell Cafe", &["restaurant"]);
        assert_eq!(c.category, Dining);
        assert_eq!(c.step, MatchStep::Tag);
        assert_eq!(c.matched, Some("restaurant"));
    }

    #[test]
    fn test_same_step_conflict_uses_priority_order() {
        // lodging (hotels) and restaurant (dining) both match exactly: dining ranks higher
        assert_eq!(classify("", &["lodging", "restaurant"]), Dining);
        assert_eq!(classify("", &["restaurant", "lodging"]), Dining);
        // airport (flights) vs travel_agency (general): travel_general ranks higher
        assert_eq!(classify("", &["airport", "travel_agency"]), TravelGeneral);
    }

    #[test]
    fn test_tag_keyword_step() {
        let c = classify_explained("Somewhere", &["sushi_restaurant_bar_and_grill"]);
        assert_eq!(c.category, Dining);
        assert_eq!(c.step, MatchStep::TagKeyword);

        assert_eq!(classify("", &["farmers_market"]), Grocery);
        assert_eq!(classify("", &["boutique_hotel"]), TravelHotels);
        assert_eq!(classify("", &["hot-yoga"]), FitnessAndWellness);
    }

    #[test]
    fn test_keyword_conflict_uses_priority_order() {
        // hotel (hotels) and restaurant (dining) in one tag
        let c = classify_explained("", &["hotel_restaurant"]);
        assert_eq!(c.category, Dining);
        assert_eq!(c.step, MatchStep::TagKeyword);
        assert_eq!(c.matched, Some("restaurant"));

        for tags in [["boutique_hotel", "coffee_roaster"], ["coffee_roaster", "boutique_hotel"]] {
            let c = classify_explained("", &tags);
            assert_eq!(c.category, Dining);
            assert_eq!(c.step, MatchStep::TagKeyword);
        }
    }

    #[test]
    fn test_keywords_do_not_fire_inside_other_words() {
        assert_eq!(classify("", &["gastropub"]), Dining);
        assert_eq!(classify("", &["las_vegas_casino"]), EntertainmentAndRecreation);
        assert_eq!(classify("", &["personal_trainer"]), FitnessAndWellness);
        assert_eq!(classify("", &["marketing_agency"]), CatchAllGeneralPurchases);
        assert_eq!(classify("", &["barber_shop"]), CatchAllGeneralPurchases);
        assert_eq!(classify("", &["gasket_supplier"]), CatchAllGeneralPurchases);
    }

    #[test]
    fn test_common_dining_keywords() {
        for tag in ["pub", "wine_bar", "ice_cream_shop", "Ice-Cream Parlor", "sandwich_shop", "dessert_shop", "food"] {
            let c = classify_explained("", &[tag]);
            assert_eq!(c.category, Dining, "{tag}");
            assert_eq!(c.step, MatchStep::TagKeyword, "{tag}");
        }
    }

    #[test]
    fn test_merchant_override_step() {
        let c = classify_explained("Starbucks Reserve Roastery", &["point_of_interest", "establishment"]);
        assert_eq!(c.category, Dining);
        assert_eq!(c.step, MatchStep::MerchantName);
        assert_eq!(c.matched, Some("starbucks"));

        assert_eq!(classify("Trader Joe's", &NO_TAGS), Grocery);
        assert_eq!(classify("CVS/pharmacy #1234", &NO_TAGS), DrugstoresAndPharmacies);
    }

    #[test]
    fn test_merchant_override_respects_token_boundaries() {
        // "avis" must not fire inside "Mavis Tire"
        assert_eq!(classify("Mavis Tire", &NO_TAGS), CatchAllGeneralPurchases);
        // "shell" must not fire inside "Seashells by the shore"
        assert_eq!(classify("Seashells by the shore", &NO_TAGS), CatchAllGeneralPurchases);
    }

    #[test]
    fn test_uber_eats_is_dining_not_rideshare() {
        // both "uber eats" and "uber" match in the same step
        assert_eq!(classify("Uber Eats", &NO_TAGS), Dining);
        assert_eq!(classify("UBER *TRIP", &NO_TAGS), TransitAndRideshare);
    }

    #[test]
    fn test_fallback() {
        let c = classify_explained("Bob's Hardware", &["hardware_store", "point_of_interest"]);
        assert_eq!(c.category, CatchAllGeneralPurchases);
        assert_eq!(c.step, MatchStep::Fallback);
        assert_eq!(c.matched, None);
        assert_eq!(classify("", &NO_TAGS), CatchAllGeneralPurchases);
        assert_eq!(classify("   ", &["", "!!!"]), CatchAllGeneralPurchases);
    }

    #[test]
    fn test_tag_order_does_not_matter() {
        let a = classify("x", &["movie_theater", "night_club", "bar"]);
        let b = classify("x", &["bar", "night_club", "movie_theater"]);
        assert_eq!(a, b);
        assert_eq!(a, Dining);
    }

    #[test]
    fn test_normalize_helpers() {
        assert_eq!(normalize_tag("Coffee Shop!"), "coffeeshop");
        assert_eq!(tag_words("Ice-Cream  Shop!"), vec!["ice", "cream", "shop"]);
        assert!(tag_words("__").is_empty());
        assert_eq!(normalize_name("  McDonald's   #402 "), "mcdonalds 402");
        assert_eq!(normalize_name("Booking.com"), "booking com");
    }

    #[test]
    fn test_every_rule_key_can_fire_alone() {
        // each table entry classifies to its own category or to a higher-priority one
        for (m, category) in RULES {
            let got = match m {
                Matcher::Tag(k) | Matcher::TagWord(k) | Matcher::TagStem(k) => classify("", &[*k]),
                Matcher::Name(k) => classify(k, &NO_TAGS),
            };
            assert!(
                got.priority_rank() <= category.priority_rank(),
                "{:?} classified as {} (expected {} or higher)",
                m,
                got,
                category
            );
        }
    }
}
