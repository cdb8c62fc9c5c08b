use crate::models::{Macros, NutritionInfo};

struct TableEntry {
    key: &'static str,
    name: &'static str,
    macros: Macros,
    serving_size: &'static str,
}

const fn entry(
    key: &'static str,
    name: &'static str,
    macros: Macros,
    serving_size: &'static str,
) -> TableEntry {
    TableEntry {
        key,
        name,
        macros,
        serving_size,
    }
}

/// Per-serving values: carbs g, protein g, fat g, kcal.
const NUTRITION_TABLE: &[TableEntry] = &[
    // South Indian
    entry("dosa", "Dosa (Plain)", Macros::new(28.0, 4.0, 8.0, 200.0), "1 medium dosa (100g)"),
    entry("idli", "Idli", Macros::new(12.0, 2.0, 1.0, 65.0), "1 piece (30g)"),
    entry("sambar", "Sambar", Macros::new(15.0, 6.0, 3.0, 110.0), "1 cup (200ml)"),
    entry("vada", "Medu Vada", Macros::new(25.0, 7.0, 15.0, 250.0), "1 piece (80g)"),
    entry("upma", "Upma", Macros::new(35.0, 5.0, 8.0, 230.0), "1 cup (200g)"),
    // Rice and breads
    entry("rice", "White Rice (cooked)", Macros::new(45.0, 4.0, 0.5, 205.0), "1 cup (200g)"),
    entry("brown rice", "Brown Rice (cooked)", Macros::new(45.0, 5.0, 2.0, 215.0), "1 cup (200g)"),
    entry("chapati", "Chapati", Macros::new(15.0, 3.0, 3.0, 104.0), "1 piece (40g)"),
    entry("roti", "Roti", Macros::new(15.0, 3.0, 3.0, 104.0), "1 piece (40g)"),
    entry("paratha", "Paratha", Macros::new(25.0, 4.0, 10.0, 200.0), "1 piece (80g)"),
    entry("naan", "Naan", Macros::new(45.0, 8.0, 5.0, 262.0), "1 piece (90g)"),
    // Lentils and curries
    entry("dal", "Dal (Lentil Curry)", Macros::new(20.0, 9.0, 5.0, 160.0), "1 cup (200ml)"),
    entry("dal tadka", "Dal Tadka", Macros::new(22.0, 10.0, 8.0, 190.0), "1 cup (200ml)"),
    entry("rajma", "Rajma (Kidney Bean Curry)", Macros::new(30.0, 12.0, 6.0, 220.0), "1 cup (200g)"),
    entry("chana masala", "Chana Masala", Macros::new(35.0, 14.0, 8.0, 270.0), "1 cup (200g)"),
    // Vegetables
    entry("aloo gobi", "Aloo Gobi", Macros::new(25.0, 4.0, 10.0, 200.0), "1 cup (200g)"),
    entry("palak paneer", "Palak Paneer", Macros::new(12.0, 18.0, 22.0, 320.0), "1 cup (200g)"),
    entry("bhindi masala", "Bhindi Masala (Okra)", Macros::new(15.0, 3.0, 8.0, 140.0), "1 cup (150g)"),
    // Meat
    entry("curry", "Chicken Curry", Macros::new(10.0, 25.0, 15.0, 280.0), "1 cup (200g)"),
    entry("chicken curry", "Chicken Curry", Macros::new(10.0, 25.0, 15.0, 280.0), "1 cup (200g)"),
    entry("fish curry", "Fish Curry", Macros::new(8.0, 22.0, 12.0, 230.0), "1 cup (200g)"),
    entry("mutton curry", "Mutton Curry", Macros::new(8.0, 28.0, 18.0, 310.0), "1 cup (200g)"),
    // Snacks
    entry("pakora", "Pakora (Mixed Vegetable)", Macros::new(15.0, 3.0, 12.0, 180.0), "100g (4-5 pieces)"),
    entry("samosa", "Samosa", Macros::new(30.0, 5.0, 15.0, 262.0), "1 piece (100g)"),
    // Dairy
    entry("yogurt", "Yogurt (Plain)", Macros::new(12.0, 10.0, 3.0, 110.0), "1 cup (200g)"),
    entry("curd", "Curd", Macros::new(12.0, 10.0, 3.0, 110.0), "1 cup (200g)"),
    entry("paneer", "Paneer", Macros::new(3.0, 18.0, 20.0, 265.0), "100g"),
    // Beverages
    entry("chai tea", "Chai Tea (with milk)", Macros::new(10.0, 2.0, 2.0, 60.0), "1 cup (200ml)"),
    entry("lassi", "Lassi", Macros::new(25.0, 8.0, 4.0, 170.0), "1 glass (250ml)"),
];

/// Keyword categories for foods missing from the table, checked in order.
const CATEGORY_RULES: &[(&[&str], Macros)] = &[
    (&["rice", "bread", "pasta", "noodle"], Macros::new(45.0, 4.0, 1.0, 200.0)),
    (
        &["chicken", "fish", "meat", "turkey", "beef", "pork"],
        Macros::new(0.0, 25.0, 10.0, 200.0),
    ),
    (&["dal", "lentil", "bean", "legume"], Macros::new(30.0, 12.0, 1.0, 150.0)),
    (
        &["vegetable", "veggie", "broccoli", "carrot", "spinach"],
        Macros::new(10.0, 2.0, 0.5, 50.0),
    ),
    (&["fruit", "apple", "banana", "orange"], Macros::new(25.0, 1.0, 0.5, 100.0)),
    (&["milk", "yogurt", "cheese", "paneer"], Macros::new(10.0, 8.0, 5.0, 120.0)),
    (&["oil", "butter", "ghee", "cream"], Macros::new(0.0, 0.0, 15.0, 135.0)),
    (&["nut", "seed", "avocado"], Macros::new(5.0, 5.0, 15.0, 180.0)),
];

const GENERIC_ESTIMATE: Macros = Macros::new(20.0, 5.0, 5.0, 150.0);
const ESTIMATED_SERVING: &str = "1 serving (approximate)";

/// Quick-add foods offered when nothing closer matches.
pub const COMMON_FOODS: &[&str] = &[
    "dosa", "idli", "rice", "dal", "chapati", "sambar", "curry", "yogurt",
];

const MAX_SUGGESTIONS: usize = 5;

impl TableEntry {
    fn to_info(&self) -> NutritionInfo {
        NutritionInfo {
            name: self.name.to_string(),
            macros: self.macros,
            serving_size: self.serving_size.to_string(),
            estimated: false,
        }
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

fn find(normalized: &str) -> Option<&'static TableEntry> {
    NUTRITION_TABLE.iter().find(|e| e.key == normalized)
}

/// Strict lookup: exact (case-insensitive, trimmed) match against the table.
#[must_use]
pub fn lookup(food_name: &str) -> Option<NutritionInfo> {
    find(&normalize(food_name)).map(TableEntry::to_info)
}

/// Lookup that never fails: table match first, then a coarse estimate from
/// the first keyword category the name contains.
#[must_use]
pub fn estimate(food_name: &str) -> NutritionInfo {
    let normalized = normalize(food_name);
    if let Some(found) = find(&normalized) {
        return found.to_info();
    }

    let macros = CATEGORY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| normalized.contains(k)))
        .map_or(GENERIC_ESTIMATE, |(_, m)| *m);

    NutritionInfo {
        name: capitalize(food_name.trim()),
        macros,
        serving_size: ESTIMATED_SERVING.to_string(),
        estimated: true,
    }
}

/// Table foods whose display name contains the query.
#[must_use]
pub fn search(query: &str) -> Vec<NutritionInfo> {
    let q = normalize(query);
    NUTRITION_TABLE
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&q))
        .map(TableEntry::to_info)
        .collect()
}

/// Alternatives to offer after a strict lookup miss.
#[must_use]
pub fn suggest(food_name: &str) -> Vec<String> {
    let q = normalize(food_name);
    let words: Vec<&str> = q.split_whitespace().filter(|w| w.len() >= 3).collect();

    let mut out: Vec<String> = Vec::new();
    for e in NUTRITION_TABLE {
        let name = e.name.to_lowercase();
        let close = (!q.is_empty() && (name.contains(&q) || e.key.contains(q.as_str())))
            || words
                .iter()
                .any(|w| name.contains(w) || e.key.split_whitespace().any(|k| k == *w));
        if close && !out.iter().any(|s| s == e.key) {
            out.push(e.key.to_string());
        }
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    if out.is_empty() {
        out = COMMON_FOODS
            .iter()
            .take(MAX_SUGGESTIONS)
            .map(|s| (*s).to_string())
            .collect();
    }
    out
}

/// Table foods named in free text, as whole words. Longer names claim their
/// span first ("brown rice" wins over "rice"); results follow text order.
#[must_use]
pub fn foods_mentioned(text: &str) -> Vec<NutritionInfo> {
    let haystack = text.to_lowercase();
    let mut entries: Vec<&TableEntry> = NUTRITION_TABLE.iter().collect();
    entries.sort_by_key(|e| std::cmp::Reverse(e.key.len()));

    let mut claimed: Vec<(usize, usize, &TableEntry)> = Vec::new();
    for e in entries {
        for (start, _) in haystack.match_indices(e.key) {
            let end = start + e.key.len();
            if !is_word_boundary(&haystack, start, end) {
                continue;
            }
            if claimed.iter().any(|(s, en, _)| start < *en && *s < end) {
                continue;
            }
            claimed.push((start, end, e));
        }
    }

    claimed.sort_by_key(|(start, _, _)| *start);
    claimed.into_iter().map(|(_, _, e)| e.to_info()).collect()
}

fn is_word_boundary(s: &str, start: usize, end: usize) -> bool {
    let before = s[..start].chars().next_back();
    let after = s[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
