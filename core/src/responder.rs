//! Canned, profile-aware replies used when no remote agent is involved.

use crate::models::{GlucoseStatus, UserProfile};

const GLUCOSE_KEYWORDS: &[&str] = &["glucose", "sugar", "blood sugar"];
const DIET_KEYWORDS: &[&str] = &["meal", "food", "eat", "diet"];
const MOOD_KEYWORDS: &[&str] = &["mood", "stress", "anxious", "feeling"];
const CONDITION_KEYWORDS: &[&str] = &["condition", "health", "medical"];

fn mentions(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Deterministic reply to `query` for `user`. Branches are tried in order:
/// glucose, diet, mood, medical conditions, then a capability overview.
#[must_use]
pub fn contextual_response(query: &str, user: &UserProfile) -> String {
    let lower = query.to_lowercase();

    if mentions(&lower, GLUCOSE_KEYWORDS) {
        return glucose_response(user);
    }
    if mentions(&lower, DIET_KEYWORDS) {
        return diet_response(user);
    }
    if mentions(&lower, MOOD_KEYWORDS) {
        return mood_response(user);
    }
    if mentions(&lower, CONDITION_KEYWORDS) {
        return condition_response(user);
    }
    capabilities_response(user)
}

fn glucose_response(user: &UserProfile) -> String {
    let diet = &user.dietary_preference;
    let Some(glucose) = user.glucose_reading() else {
        return format!(
            "I don't have a valid glucose reading on file for you yet (recorded value: '{}'). \
             Log a reading, for example \"Log glucose 120\", and I can tell you where it stands.",
            user.latest_cgm.trim()
        );
    };

    match GlucoseStatus::from_reading(glucose) {
        GlucoseStatus::High => format!(
            "Your current glucose level is {glucose} mg/dL, which is elevated. Here are some recommendations:

1. Reduce intake of simple carbohydrates (white rice, sugary foods)
2. Increase physical activity (even a 10-minute walk helps)
3. Stay hydrated with water
4. Consider smaller, more frequent meals
5. Monitor your levels regularly

Since you follow a {diet} diet, focus on lean proteins, vegetables, and whole grains."
        ),
        GlucoseStatus::Low => format!(
            "Your glucose level of {glucose} mg/dL is low. Please:

1. Have 15g of fast-acting carbs (juice, glucose tablets)
2. Recheck in 15 minutes
3. If still low, repeat step 1
4. Once normalized, have a balanced snack

Stay safe and monitor closely!"
        ),
        GlucoseStatus::Normal => format!(
            "Your glucose level of {glucose} mg/dL is in a healthy range! Keep up the good work with your {diet} diet."
        ),
    }
}

fn diet_response(user: &UserProfile) -> String {
    let diet = &user.dietary_preference;
    let cgm = &user.latest_cgm;
    format!(
        "Based on your {diet} diet preference and current glucose level of {cgm} mg/dL, here are some meal suggestions:

**Breakfast:** Vegetable upma with sambar or idli with chutney
**Lunch:** Brown rice with dal, mixed vegetables, and yogurt
**Dinner:** Chapati with vegetable curry and salad
**Snacks:** Fresh fruits, nuts, or sprouts

Remember to:
- Eat balanced meals with protein, fiber, and healthy fats
- Avoid processed foods and excess sugar
- Stay hydrated throughout the day"
    )
}

fn mood_response(user: &UserProfile) -> String {
    let mood = user.mood.to_lowercase();
    format!(
        "I notice you're currently feeling {mood}. Here are some tips:

1. **Physical Activity:** Even light exercise can boost mood
2. **Mindfulness:** Try 5 minutes of deep breathing
3. **Social Connection:** Reach out to friends or family
4. **Sleep:** Ensure 7-8 hours of quality sleep
5. **Nutrition:** Balanced meals support mental health

Your current mood can affect glucose levels too, so managing stress is important for overall health."
    )
}

fn condition_response(user: &UserProfile) -> String {
    let conditions = if user.has_medical_conditions() {
        format!("I see you have {}. ", user.medical_conditions)
    } else {
        String::new()
    };
    let limitations = if user.has_physical_limitations() {
        format!(
            "Also noting your {}. ",
            user.physical_limitations.to_lowercase()
        )
    } else {
        String::new()
    };

    format!(
        "{conditions}{limitations}Here's some general health advice:

1. Follow your healthcare provider's recommendations
2. Take medications as prescribed
3. Monitor your symptoms regularly
4. Maintain a healthy lifestyle with proper diet and exercise
5. Stay in touch with your medical team

For specific medical advice, always consult with your healthcare provider."
    )
}

fn capabilities_response(user: &UserProfile) -> String {
    let diet = &user.dietary_preference;
    format!(
        "I'm here to help with your health journey! I can provide information about:

• Glucose management and monitoring
• Meal planning for your {diet} diet
• General health and wellness tips
• Understanding your health metrics

What would you like to know more about?"
    )
}

/// Opening message of the profile-aware assistant.
#[must_use]
pub fn assistant_greeting(user: &UserProfile) -> String {
    let name = &user.first_name;
    let diet = &user.dietary_preference;
    let cgm = &user.latest_cgm;
    let focus = if user.has_medical_conditions() {
        user.medical_conditions.as_str()
    } else {
        "health goals"
    };
    format!(
        "Hello {name}! I'm your AI health assistant. I can help you with:

• Meal planning based on your {diet} diet
• Understanding your glucose readings (current: {cgm} mg/dL)
• Managing your {focus}
• Providing health tips and advice

How can I assist you today?"
    )
}

/// Opening message of the intent-routing chat.
#[must_use]
pub fn chatbot_greeting(user: &UserProfile) -> String {
    let name = &user.first_name;
    format!(
        "Hello {name}! I'm your Health Assistant. You can ask me to:

• Log your glucose readings (e.g., \"Log glucose 120\")
• Track your mood (e.g., \"I'm feeling happy today\")
• Log food intake (e.g., \"I had dal and rice for lunch\")
• Generate meal plans (e.g., \"Create a meal plan for me\")
• Answer health questions

How can I help you today?"
    )
}
