pub mod time;

/// Alphabet for generated ids; lowercase alphanumerics keep them URL and SQL friendly.
const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u',
    'v', 'w', 'x', 'y', 'z',
];

/// Storage id for a new record.
pub fn longid() -> String {
    nanoid::nanoid!(21, &ID_ALPHABET)
}
