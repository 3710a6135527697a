//! Word service
//!
//! お題の候補提示、伏せ字表示、ヒントの公開、お題のカテゴリ判定。

use rand::{Rng, seq::SliceRandom};

use super::entity::{Difficulty, WordChoice};

/// 伏せ字に使う文字
pub const MASK_CHAR: char = '_';

/// 既定のカテゴリ
pub const DEFAULT_CATEGORY: &str = "Thing";

const EASY_WORDS: &[&str] = &[
    "cat", "dog", "sun", "moon", "star", "tree", "house", "car", "ball", "book", "fish", "bird",
    "apple", "pizza", "cake", "flower", "clock", "phone", "shoe", "hat", "chair", "table", "door",
    "window", "bed", "lamp", "cup", "plate", "fork", "spoon", "pen", "key", "bag", "box", "gift",
    "heart", "smile", "eye", "hand", "foot", "guitar", "piano", "camera", "rocket", "hamburger",
    "sandwich", "umbrella", "penguin", "rabbit", "duck", "owl", "frog", "whale", "shark", "seal",
    "bear", "fox", "mirror", "candle", "kite", "flag", "coin", "ring", "watch", "brush", "towel",
    "pillow", "cloud", "rain", "snow", "wind", "leaf", "stone", "grass", "river", "hill", "beach",
    "bread", "soup", "rice", "meat", "egg", "milk", "tea", "ice", "corn", "bean",
];

const MEDIUM_WORDS: &[&str] = &[
    "elephant", "giraffe", "rainbow", "mountain", "ocean", "bicycle", "dragon", "castle",
    "dinosaur", "butterfly", "computer", "keyboard", "monitor", "airplane", "helicopter",
    "submarine", "volcano", "island", "pyramid", "bridge", "crown", "sword", "shield", "potion",
    "knight", "spaceship", "caterpillar", "rhinoceros", "hippopotamus", "parachute", "gondola",
    "snowflake", "labyrinth", "kangaroo", "crocodile", "cheetah", "peacock", "parrot", "squirrel",
    "hedgehog", "beaver", "carousel", "fountain", "lantern", "microphone", "trumpet", "compass",
    "anchor", "helmet", "waterfall", "canyon", "desert", "jungle", "glacier", "lightning",
    "earthquake", "comet", "spaghetti", "pancake", "sushi", "burrito", "croissant", "pretzel",
    "muffin", "smoothie", "firefighter", "detective", "astronaut", "surgeon", "architect",
];

const HARD_WORDS: &[&str] = &[
    "microscope", "saxophone", "skyscraper", "rollercoaster", "refrigerator", "chandelier",
    "trampoline", "xylophone", "constellation", "architecture", "kaleidoscope", "periscope",
    "photography", "hieroglyphics", "trapezoid", "pentagon", "octagon", "parallelogram",
    "thermometer", "barometer", "accelerator", "incubator", "excavator", "treasure", "pirate",
    "robot", "wizard", "princess", "monster", "telescope", "journalist", "stethoscope",
    "metronome", "harmonica", "binoculars", "phenomenon", "hurricane", "tornado", "avalanche",
    "ecosystem", "equinox", "philosophy", "encyclopedia", "democracy", "ceremony", "navigation",
    "revolution", "molecule", "observatory", "laboratory", "machinery", "transformation",
    "amphitheater", "monument", "cathedral", "pavilion", "sanctuary",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Animal",
        &[
            "cat", "dog", "fish", "bird", "penguin", "rabbit", "duck", "owl", "frog", "whale",
            "shark", "seal", "bear", "fox", "elephant", "giraffe", "dragon", "dinosaur",
            "butterfly", "caterpillar", "rhinoceros", "hippopotamus", "kangaroo", "crocodile",
            "cheetah", "peacock", "parrot", "squirrel", "hedgehog", "beaver",
        ],
    ),
    (
        "Object",
        &[
            "book", "phone", "cup", "plate", "fork", "spoon", "pen", "key", "bag", "box", "clock",
            "lamp", "guitar", "piano", "camera", "mirror", "candle", "kite", "flag", "coin",
            "ring", "watch", "brush", "towel", "pillow", "umbrella", "computer", "keyboard",
            "monitor", "microphone", "trumpet", "compass", "anchor", "helmet", "lantern",
            "microscope", "saxophone", "telescope", "stethoscope", "metronome", "harmonica",
            "binoculars", "thermometer", "barometer",
        ],
    ),
    (
        "Place",
        &[
            "house", "castle", "island", "mountain", "ocean", "volcano", "pyramid", "bridge",
            "desert", "jungle", "canyon", "skyscraper", "observatory", "laboratory",
            "amphitheater", "cathedral", "pavilion", "sanctuary",
        ],
    ),
    (
        "Food",
        &[
            "apple", "pizza", "cake", "hamburger", "sandwich", "bread", "soup", "rice", "meat",
            "egg", "milk", "tea", "corn", "bean", "spaghetti", "pancake", "sushi", "burrito",
            "croissant", "pretzel", "muffin", "smoothie",
        ],
    ),
    (
        "Nature",
        &[
            "sun", "moon", "star", "tree", "flower", "rainbow", "cloud", "rain", "snow", "wind",
            "leaf", "stone", "grass", "river", "hill", "beach", "waterfall", "glacier",
            "lightning", "earthquake", "comet", "hurricane", "tornado", "avalanche",
        ],
    ),
    (
        "Profession",
        &[
            "firefighter", "detective", "astronaut", "surgeon", "architect", "journalist",
            "knight", "pirate", "wizard", "princess",
        ],
    ),
];

fn pool(difficulty: Difficulty) -> &'static [&'static str] {
    match difficulty {
        Difficulty::Easy => EASY_WORDS,
        Difficulty::Medium => MEDIUM_WORDS,
        Difficulty::Hard => HARD_WORDS,
    }
}

/// 難易度ごとに 1 語ずつ（easy, medium, hard の順）
pub fn word_options<R: Rng + ?Sized>(rng: &mut R) -> Vec<WordChoice> {
    [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .into_iter()
        .filter_map(|difficulty| {
            pool(difficulty).choose(&mut *rng).map(|word| WordChoice {
                word: (*word).to_string(),
                difficulty,
            })
        })
        .collect()
}

/// 全文字を伏せた表示
pub fn mask(word: &str) -> String {
    word.chars().map(|_| MASK_CHAR).collect()
}

/// まだ伏せられている位置からランダムに 1 文字公開する
///
/// 公開できる位置がなければ `None`。
pub fn reveal_random<R: Rng + ?Sized>(word: &str, display: &str, rng: &mut R) -> Option<String> {
    let word: Vec<char> = word.chars().collect();
    let mut display: Vec<char> = display.chars().collect();
    let hidden: Vec<usize> = display
        .iter()
        .enumerate()
        .filter(|(index, c)| **c == MASK_CHAR && *index < word.len())
        .map(|(index, _)| index)
        .collect();

    let index = *hidden.choose(rng)?;
    display[index] = word[index];
    Some(display.into_iter().collect())
}

/// 伏せ字が残っているか
pub fn has_hidden(display: &str) -> bool {
    display.contains(MASK_CHAR)
}

/// お題のカテゴリ（未分類は "Thing"）
pub fn category(word: &str) -> &'static str {
    let word = word.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, words)| words.contains(&word.as_str()))
        .map(|(name, _)| *name)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// お題の先頭文字（大文字）
pub fn first_letter(word: &str) -> Option<String> {
    word.chars().next().map(|c| c.to_uppercase().collect())
}
