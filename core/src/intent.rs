use crate::models::Intent;

/// Keyword rules in priority order. The first rule with a hit wins.
const INTENT_RULES: &[(Intent, &[&str])] = &[
    (Intent::LogGlucose, &["glucose", "blood sugar"]),
    (
        Intent::LogMood,
        &["mood", "feel", "happy", "sad", "tired", "excited"],
    ),
    (
        Intent::LogFood,
        &["eat", "food", "meal", "lunch", "dinner", "breakfast"],
    ),
    (
        Intent::GeneratePlan,
        &["plan", "meal plan", "generate", "suggest"],
    ),
];

/// Route free text to an intent by keyword presence. A standalone number
/// ("log 120") counts as a glucose reading.
#[must_use]
pub fn classify_intent(text: &str) -> Intent {
    let lower = text.to_lowercase();

    for (intent, keywords) in INTENT_RULES {
        let hit = keywords.iter().any(|k| lower.contains(k));
        if hit || (*intent == Intent::LogGlucose && has_standalone_number(&lower)) {
            return *intent;
        }
    }

    Intent::GeneralQuery
}

/// True when some run of ASCII word characters (`[A-Za-z0-9_]`) consists only of digits.
fn has_standalone_number(text: &str) -> bool {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .any(|token| !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glucose_keywords() {
        assert_eq!(classify_intent("What's my glucose?"), Intent::LogGlucose);
        assert_eq!(classify_intent("BLOOD SUGAR check"), Intent::LogGlucose);
        assert_eq!(classify_intent("Log glucose 120"), Intent::LogGlucose);
    }

    #[test]
    fn test_bare_number_is_glucose() {
        assert_eq!(classify_intent("120"), Intent::LogGlucose);
        assert_eq!(classify_intent("it was 95 this morning"), Intent::LogGlucose);
        assert_eq!(classify_intent("reading: 140."), Intent::LogGlucose);
    }

    #[test]
    fn test_number_inside_word_is_not_glucose() {
        assert_eq!(classify_intent("what is b12"), Intent::GeneralQuery);
        assert_eq!(classify_intent("3rd question"), Intent::GeneralQuery);
    }

    #[test]
    fn test_mood() {
        assert_eq!(classify_intent("I'm feeling happy today"), Intent::LogMood);
        assert_eq!(classify_intent("so tired"), Intent::LogMood);
    }

    #[test]
    fn test_food() {
        assert_eq!(
            classify_intent("I had dal and rice for lunch"),
            Intent::LogFood
        );
        assert_eq!(classify_intent("breakfast was idli"), Intent::LogFood);
    }

    #[test]
    fn test_plan() {
        assert_eq!(classify_intent("Generate a plan"), Intent::GeneratePlan);
        assert_eq!(classify_intent("suggest something"), Intent::GeneratePlan);
    }

    #[test]
    fn test_first_match_wins() {
        // "meal" is a food keyword, checked before the plan rule
        assert_eq!(classify_intent("Create a meal plan for me"), Intent::LogFood);
        // glucose beats mood
        assert_eq!(
            classify_intent("I feel bad, glucose is 200"),
            Intent::LogGlucose
        );
        // mood beats food
        assert_eq!(classify_intent("happy after dinner"), Intent::LogMood);
    }

    #[test]
    fn test_general_query() {
        assert_eq!(classify_intent("How do I sleep better?"), Intent::GeneralQuery);
        assert_eq!(classify_intent(""), Intent::GeneralQuery);
    }

    #[test]
    fn test_classification_is_pure() {
        let inputs = ["Log glucose 120", "feeling sad", "what now?", "plan it"];
        for input in inputs {
            assert_eq!(classify_intent(input), classify_intent(input));
        }
    }
}
