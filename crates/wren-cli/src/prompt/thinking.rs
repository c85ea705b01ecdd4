use rand::seq::SliceRandom;

const THINKING_MESSAGES: &[&str] = &[
    "Thinking",
    "Pondering",
    "Looking into it",
    "Consulting the archives",
    "Gathering thoughts",
    "Connecting the dots",
    "Reading the fine print",
    "Weighing the options",
    "Checking the sources",
    "Putting it into words",
];

pub fn get_random_thinking_message() -> &'static str {
    THINKING_MESSAGES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("Thinking")
}
